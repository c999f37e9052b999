use tracing::info;

use crate::cache::{Mutation, QueryKey};
use crate::context::AppContext;
use crate::models::{AdDraft, AdStatus, Advertisement, Role};
use crate::session::Session;
use crate::utils::AppError;

const MAX_TITLE_LEN: usize = 80;

/// Approved ads shown to everyone
pub async fn current_ads(ctx: &AppContext) -> Result<Vec<Advertisement>, AppError> {
    let api = ctx.api.clone();
    ctx.cache
        .get_or_fetch(QueryKey::CurrentAds, || async move {
            api.current_ads().await.map_err(AppError::from)
        })
        .await
}

pub async fn my_ads(ctx: &AppContext, session: &Session) -> Result<Vec<Advertisement>, AppError> {
    session.require_role(Role::Vendor)?;
    let api = ctx.api_for(session);
    ctx.cache
        .get_or_fetch(QueryKey::MyAds(session.email.clone()), || async move {
            api.my_ads(&session.email).await.map_err(AppError::from)
        })
        .await
}

pub async fn all_ads(ctx: &AppContext, session: &Session) -> Result<Vec<Advertisement>, AppError> {
    session.require_role(Role::Admin)?;
    let api = ctx.api_for(session);
    ctx.cache
        .get_or_fetch(QueryKey::AllAds, || async move {
            api.all_ads().await.map_err(AppError::from)
        })
        .await
}

fn draft(session: &Session, title: &str, description: &str) -> Result<AdDraft, AppError> {
    let title = title.trim();
    if title.is_empty() || description.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Usage: `ad add <title> | <description>`".to_string(),
        ));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::InvalidInput(format!(
            "Ad title is limited to {} characters",
            MAX_TITLE_LEN
        )));
    }

    Ok(AdDraft {
        ad_title: title.to_string(),
        short_description: description.trim().to_string(),
        status: AdStatus::Pending,
        vendor_name: session.display_name.clone(),
        vendor_email: session.email.clone(),
        product_image: None,
    })
}

/// New ads wait for moderation
pub async fn add_ad(
    ctx: &AppContext,
    session: &Session,
    title: &str,
    description: &str,
) -> Result<(), AppError> {
    session.require_role(Role::Vendor)?;
    let ad = draft(session, title, description)?;

    ctx.api_for(session).add_ad(&ad).await?;
    ctx.cache.invalidate(&Mutation::SaveAd).await;
    info!("{} submitted ad '{}'", session.email, ad.ad_title);
    Ok(())
}

/// Find one of the vendor's own ads
async fn owned_ad(
    ctx: &AppContext,
    session: &Session,
    ad_id: &str,
) -> Result<Advertisement, AppError> {
    my_ads(ctx, session)
        .await?
        .into_iter()
        .find(|ad| ad.id == ad_id)
        .ok_or_else(|| AppError::NotFound(format!("You have no ad with id {}", ad_id)))
}

/// Editing an ad sends it back to moderation
pub async fn update_ad(
    ctx: &AppContext,
    session: &Session,
    ad_id: &str,
    title: &str,
    description: &str,
) -> Result<(), AppError> {
    let existing = owned_ad(ctx, session, ad_id).await?;
    let ad = AdDraft {
        product_image: existing.product_image,
        ..draft(session, title, description)?
    };

    ctx.api_for(session).update_ad(ad_id, &ad).await?;
    ctx.cache.invalidate(&Mutation::SaveAd).await;
    info!("{} updated ad {}", session.email, ad_id);
    Ok(())
}

/// Vendors delete their own ads; admins may delete any
pub async fn delete_ad(ctx: &AppContext, session: &Session, ad_id: &str) -> Result<(), AppError> {
    match session.role {
        Role::Admin => {}
        _ => {
            owned_ad(ctx, session, ad_id).await?;
        }
    }

    ctx.api_for(session).delete_ad(ad_id).await?;
    ctx.cache.invalidate(&Mutation::DeleteAd).await;
    info!("{} deleted ad {}", session.email, ad_id);
    Ok(())
}

/// Flip an ad between pending and approved
pub async fn toggle_status(
    ctx: &AppContext,
    session: &Session,
    ad_id: &str,
) -> Result<AdStatus, AppError> {
    let ad = all_ads(ctx, session)
        .await?
        .into_iter()
        .find(|ad| ad.id == ad_id)
        .ok_or_else(|| AppError::NotFound(format!("No ad with id {}", ad_id)))?;

    let next = ad.status.toggled();
    ctx.api_for(session).set_ad_status(ad_id, next).await?;
    ctx.cache.invalidate(&Mutation::SetAdStatus).await;
    info!("{} set ad {} from {} to {}", session.email, ad_id, ad.status, next);
    Ok(next)
}
