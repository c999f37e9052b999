pub mod admin;
pub mod ads;
pub mod auth;
pub mod help;
pub mod orders;
pub mod products;
pub mod review;
pub mod trend;
pub mod vendor;
pub mod watchlist;

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::context::AppContext;
use crate::session::Session;
use crate::utils::AppError;

/// Outcome of one input line
#[derive(Debug, PartialEq)]
pub enum Reply {
    Output(String),
    Quit,
    Ignored,
}

/// Parse and run one command line
///
/// Every command returns its output as text; errors are logged and turned into a
/// one-line message for the terminal.
pub async fn handle_line(
    ctx: &Arc<AppContext>,
    session: &mut Option<Session>,
    line: &str,
) -> Reply {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.is_empty() {
        return Reply::Ignored;
    }

    let command = parts[0].to_lowercase();
    let args = &parts[1..];
    // Some commands take free text after the first word
    let rest = line.trim_start()[parts[0].len()..].trim();

    debug!(command = %command, ?args, "dispatching command");

    let result = match command.as_str() {
        "help" | "?" => Ok(help::execute()),
        "quit" | "exit" => return Reply::Quit,
        "login" => auth::login(ctx, session, args).await,
        "register" => auth::register(ctx, session, args).await,
        "logout" => auth::logout(ctx, session).await,
        "whoami" => auth::whoami(ctx, session.as_ref()),
        "products" | "ls" => products::list(ctx, session.as_ref(), args).await,
        "latest" => products::latest(ctx, session.as_ref()).await,
        "product" | "show" => products::show(ctx, session.as_ref(), args).await,
        "trend" => trend::execute(ctx, session.as_ref(), args).await,
        "trends" => watchlist::trends(ctx, session.as_ref()).await,
        "watchlist" | "wl" => watchlist::list(ctx, session.as_ref(), args).await,
        "watch" => watchlist::watch(ctx, session.as_ref(), args).await,
        "unwatch" => watchlist::unwatch(ctx, session.as_ref(), args).await,
        "review" => review::execute(ctx, session.as_ref(), args).await,
        "buy" => orders::buy(ctx, session.as_ref(), args).await,
        "orders" => orders::list(ctx, session.as_ref(), args).await,
        "vendor" => vendor::execute(ctx, session.as_ref(), args).await,
        "ads" => ads::list(ctx, session.as_ref(), args).await,
        "ad" => ads::execute(ctx, session.as_ref(), args, rest).await,
        "admin" => admin::execute(ctx, session.as_ref(), args, rest).await,
        _ => Err(AppError::InvalidInput(format!(
            "Unknown command '{}'. Type `help` for a list of commands",
            parts[0]
        ))),
    };

    match result {
        Ok(output) => Reply::Output(output),
        Err(e) => {
            match &e {
                AppError::Api(_) | AppError::Io(_) | AppError::Chart(_) | AppError::Crypto(_) => {
                    error!("Error executing command {}: {}", command, e)
                }
                _ => warn!("Command {} rejected: {}", command, e),
            }
            Reply::Output(e.user_message())
        }
    }
}

/// Text after the first `skip` words of `rest`, e.g. the feedback in `reject <id> <feedback>`
pub(crate) fn tail_after(rest: &str, skip: usize) -> &str {
    let mut remaining = rest.trim_start();
    for _ in 0..skip {
        match remaining.find(char::is_whitespace) {
            Some(end) => remaining = remaining[end..].trim_start(),
            None => return "",
        }
    }
    remaining.trim_end()
}

pub(crate) fn usage(text: &str) -> AppError {
    AppError::InvalidInput(format!("Usage: `{}`", text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tail_after() {
        assert_eq!(tail_after("reject p1 Price   looks wrong ", 2), "Price   looks wrong");
        assert_eq!(tail_after("add Fresh Hilsa | Today only", 1), "Fresh Hilsa | Today only");
        assert_eq!(tail_after("reject p1", 2), "");
        assert_eq!(tail_after("", 0), "");
    }
}
