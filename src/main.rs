use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod cache;
mod commands;
mod config;
mod context;
mod models;
mod services;
mod session;
mod utils;

use commands::Reply;
use config::Config;
use context::AppContext;
use session::Session;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // Logs go to stderr so command output stays clean on stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("bazaar_track=info".parse().expect("valid log directive"))
                .add_directive("reqwest=warn".parse().expect("valid log directive")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("🧺 Starting BazaarTrack v{}...", env!("CARGO_PKG_VERSION"));

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    info!("Using market API at {}", config.api_url);

    let ctx = match AppContext::new(config) {
        Ok(ctx) => Arc::new(ctx),
        Err(e) => {
            error!("Failed to initialise: {}", e);
            std::process::exit(1);
        }
    };

    let mut session: Option<Session> = match ctx.sessions.load().await {
        Ok(restored) => restored,
        Err(e) => {
            warn!("Could not restore previous session: {}", e);
            None
        }
    };
    if let Some(s) = &session {
        info!("Restored session for {} ({})", s.email, s.role);
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    if !args.is_empty() {
        let line = args.join(" ");
        if let Reply::Output(output) = commands::handle_line(&ctx, &mut session, &line).await {
            println!("{}", output);
        }
        return;
    }

    run_prompt(&ctx, &mut session).await;
}

/// Interactive prompt over stdin; ends on `quit`, `exit` or end of input
async fn run_prompt(ctx: &Arc<AppContext>, session: &mut Option<Session>) {
    println!("🧺 BazaarTrack - type `help` for commands, `quit` to leave");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print_prompt(session.as_ref());

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!("Failed to read input: {}", e);
                break;
            }
        };

        match commands::handle_line(ctx, session, &line).await {
            Reply::Output(output) => println!("{}", output),
            Reply::Quit => break,
            Reply::Ignored => {}
        }
    }

    debug!("Prompt closed");
}

fn print_prompt(session: Option<&Session>) {
    match session {
        Some(s) => print!("{}@bazaar> ", s.display_name),
        None => print!("bazaar> "),
    }
    let _ = std::io::stdout().flush();
}
