use crate::commands::usage;
use crate::context::AppContext;
use crate::services::user_service;
use crate::session::{require_login, Session};
use crate::utils::AppError;

pub async fn login(
    ctx: &AppContext,
    session: &mut Option<Session>,
    args: &[&str],
) -> Result<String, AppError> {
    tracing::info!("🔑 Login command called");

    let (email, token) = match args {
        [email, token, ..] => (*email, *token),
        _ => return Err(usage("login <email> <access-token> [name]")),
    };
    let name = (args.len() > 2).then(|| args[2..].join(" "));

    let new_session = user_service::login(ctx, email, token, name.as_deref()).await?;
    let reply = welcome(ctx, &new_session);
    *session = Some(new_session);
    Ok(reply)
}

pub async fn register(
    ctx: &AppContext,
    session: &mut Option<Session>,
    args: &[&str],
) -> Result<String, AppError> {
    tracing::info!("📝 Register command called");

    if args.len() < 3 {
        return Err(usage("register <email> <access-token> <name>"));
    }
    let name = args[2..].join(" ");

    let new_session = user_service::register(ctx, args[0], args[1], &name, None).await?;
    let reply = format!("✅ Registered {}\n{}", new_session.email, welcome(ctx, &new_session));
    *session = Some(new_session);
    Ok(reply)
}

fn welcome(ctx: &AppContext, session: &Session) -> String {
    let mut reply = format!("👋 Welcome, {}! You are signed in as {}.", session.display_name, session.role);
    if !ctx.sessions.is_persistent() {
        reply.push_str("\n(Set BAZAAR_SESSION_KEY to stay signed in between runs.)");
    }
    reply
}

pub async fn logout(ctx: &AppContext, session: &mut Option<Session>) -> Result<String, AppError> {
    let current = require_login(session.as_ref())?;
    user_service::logout(ctx, current).await?;
    let email = current.email.clone();
    *session = None;
    Ok(format!("👋 Logged out {}", email))
}

pub fn whoami(ctx: &AppContext, session: Option<&Session>) -> Result<String, AppError> {
    let session = require_login(session)?;
    Ok(format!(
        "👤 {} <{}>\nRole: {}\nAPI: {}",
        session.display_name,
        session.email,
        session.role,
        ctx.api.base_url()
    ))
}
