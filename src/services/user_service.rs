use tracing::{info, warn};

use crate::cache::{Mutation, QueryKey};
use crate::context::AppContext;
use crate::models::{NewUser, Role, UserAccount};
use crate::session::Session;
use crate::utils::AppError;

/// Basic shape check; the identity provider does the real validation
pub fn validate_email(email: &str) -> Result<(), AppError> {
    let valid = email
        .split_once('@')
        .map(|(local, domain)| {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        })
        .unwrap_or(false);

    if valid && !email.chars().any(char::is_whitespace) {
        Ok(())
    } else {
        Err(AppError::InvalidInput(format!("'{}' is not a valid email address", email)))
    }
}

/// Display name for a session when none was given
fn name_or_local_part(email: &str, name: Option<&str>) -> String {
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => name.to_string(),
        None => email.split('@').next().unwrap_or(email).to_string(),
    }
}

/// Start a session for an already-registered user
///
/// The access token comes from the identity provider; the role is looked up
/// from the API.
pub async fn login(
    ctx: &AppContext,
    email: &str,
    access_token: &str,
    name: Option<&str>,
) -> Result<Session, AppError> {
    validate_email(email)?;
    if access_token.trim().is_empty() {
        return Err(AppError::InvalidInput("Access token cannot be empty".to_string()));
    }

    // A new user changes what every cached query returns
    ctx.cache.clear().await;

    let api = ctx.api.for_token(access_token);
    let role = ctx
        .cache
        .get_or_fetch(QueryKey::UserRole(email.to_string()), || async move {
            api.user_role(email).await.map_err(AppError::from)
        })
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("{} is not registered. Use: `register <email> <access-token> <name>`", email))
        })?;

    let session = Session {
        email: email.to_string(),
        display_name: name_or_local_part(email, name),
        access_token: access_token.to_string(),
        role,
    };

    if let Err(e) = ctx.sessions.save(&session).await {
        warn!("Could not persist session for {}: {}", email, e);
    }
    info!("{} logged in as {}", email, role);
    Ok(session)
}

/// Register a profile with the API, then log in
pub async fn register(
    ctx: &AppContext,
    email: &str,
    access_token: &str,
    name: &str,
    photo: Option<String>,
) -> Result<Session, AppError> {
    validate_email(email)?;
    if name.trim().is_empty() {
        return Err(AppError::InvalidInput("Name cannot be empty".to_string()));
    }

    let profile = NewUser {
        name: name.trim().to_string(),
        email: email.to_string(),
        photo,
        role: Role::User,
    };
    ctx.api.for_token(access_token).register_user(&profile).await?;
    ctx.cache.invalidate(&Mutation::RegisterUser).await;
    info!("Registered {}", email);

    login(ctx, email, access_token, Some(name)).await
}

pub async fn logout(ctx: &AppContext, session: &Session) -> Result<(), AppError> {
    ctx.cache.clear().await;
    ctx.sessions.clear().await?;
    info!("{} logged out", session.email);
    Ok(())
}

pub async fn list_users(ctx: &AppContext, session: &Session) -> Result<Vec<UserAccount>, AppError> {
    session.require_role(Role::Admin)?;
    let api = ctx.api_for(session);
    ctx.cache
        .get_or_fetch(QueryKey::Users, || async move {
            api.list_users().await.map_err(AppError::from)
        })
        .await
}

/// Admins cannot change their own role
pub async fn change_role(
    ctx: &AppContext,
    session: &Session,
    user_id: &str,
    role: Role,
) -> Result<UserAccount, AppError> {
    let users = list_users(ctx, session).await?;
    let target = users
        .into_iter()
        .find(|user| user.id == user_id)
        .ok_or_else(|| AppError::NotFound(format!("No user with id {}", user_id)))?;

    if target.email.eq_ignore_ascii_case(&session.email) {
        return Err(AppError::InvalidInput("You cannot change your own role".to_string()));
    }
    if target.role == role {
        return Err(AppError::InvalidInput(format!("{} is already a {}", target.email, role)));
    }

    ctx.api_for(session).update_user_role(user_id, role).await?;
    ctx.cache.invalidate(&Mutation::ChangeUserRole).await;
    info!("{} changed role of {} from {} to {}", session.email, target.email, target.role, role);

    Ok(UserAccount { role, ..target })
}
