use crate::api::BazaarClient;
use crate::cache::QueryCache;
use crate::config::Config;
use crate::session::{Session, SessionStore};
use crate::utils::{AppError, RateLimiter, SessionCipher};

/// Long-lived state shared by every command
///
/// Identity is deliberately not stored here; the current [`Session`] is passed
/// alongside the context.
pub struct AppContext {
    pub config: Config,
    pub api: BazaarClient,
    pub cache: QueryCache,
    pub sessions: SessionStore,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self, AppError> {
        let cipher = config
            .session_key
            .as_deref()
            .map(SessionCipher::from_hex)
            .transpose()?;

        Ok(Self {
            api: BazaarClient::new(
                &config.api_url,
                RateLimiter::per_second(config.rate_limit_per_sec),
            ),
            cache: QueryCache::new(config.cache_ttl),
            sessions: SessionStore::new(config.session_file.clone(), cipher),
            config,
        })
    }

    /// API client authenticated as the session's user
    pub fn api_for(&self, session: &Session) -> BazaarClient {
        self.api.for_token(&session.access_token)
    }
}
