//! Query cache with declared invalidation
//!
//! Every read goes through [`QueryCache::get_or_fetch`] under a [`QueryKey`]. Every
//! write is described by a [`Mutation`], which names the [`QueryScope`]s it makes
//! stale; services call [`QueryCache::invalidate`] after the API accepts the write,
//! so the next read of an affected list goes back to the API.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::debug;

use crate::models::ProductFilter;

/// Identity of one cached read
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Products(ProductFilter),
    LatestProducts,
    AllProducts,
    VendorProducts(String),
    Product(String),
    Watchlist(String),
    Users,
    UserRole(String),
    MyOrders(String),
    AllOrders,
    MyAds(String),
    AllAds,
    CurrentAds,
    Overview,
}

/// A family of keys a write can make stale
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryScope {
    /// Every product list: public pages, latest, admin and vendor lists
    ProductLists,
    Product(String),
    Watchlist(String),
    AllWatchlists,
    Users,
    UserRoles,
    Orders,
    Ads,
    Overview,
}

impl QueryScope {
    pub fn covers(&self, key: &QueryKey) -> bool {
        match (self, key) {
            (
                QueryScope::ProductLists,
                QueryKey::Products(_)
                | QueryKey::LatestProducts
                | QueryKey::AllProducts
                | QueryKey::VendorProducts(_),
            ) => true,
            (QueryScope::Product(id), QueryKey::Product(key_id)) => id == key_id,
            (QueryScope::Watchlist(email), QueryKey::Watchlist(key_email)) => email == key_email,
            (QueryScope::AllWatchlists, QueryKey::Watchlist(_)) => true,
            (QueryScope::Users, QueryKey::Users) => true,
            (QueryScope::UserRoles, QueryKey::UserRole(_)) => true,
            (QueryScope::Orders, QueryKey::MyOrders(_) | QueryKey::AllOrders) => true,
            (QueryScope::Ads, QueryKey::MyAds(_) | QueryKey::AllAds | QueryKey::CurrentAds) => true,
            (QueryScope::Overview, QueryKey::Overview) => true,
            _ => false,
        }
    }
}

/// A write accepted by the API
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    AddProduct,
    UpdateProduct(String),
    DeleteProduct(String),
    ApproveProduct(String),
    RejectProduct(String),
    SubmitReview(String),
    AddToWatchlist { email: String },
    RemoveFromWatchlist { email: String },
    RegisterUser,
    ChangeUserRole,
    CreateOrder,
    SaveAd,
    DeleteAd,
    SetAdStatus,
}

impl Mutation {
    pub fn invalidates(&self) -> Vec<QueryScope> {
        match self {
            Mutation::AddProduct => vec![QueryScope::ProductLists, QueryScope::Overview],
            Mutation::UpdateProduct(id)
            | Mutation::ApproveProduct(id)
            | Mutation::RejectProduct(id) => {
                vec![QueryScope::ProductLists, QueryScope::Product(id.clone())]
            }
            Mutation::DeleteProduct(id) => vec![
                QueryScope::ProductLists,
                QueryScope::Product(id.clone()),
                QueryScope::AllWatchlists,
                QueryScope::Overview,
            ],
            Mutation::SubmitReview(id) => {
                vec![QueryScope::Product(id.clone()), QueryScope::Overview]
            }
            Mutation::AddToWatchlist { email } | Mutation::RemoveFromWatchlist { email } => {
                vec![QueryScope::Watchlist(email.clone())]
            }
            Mutation::RegisterUser => vec![QueryScope::Users, QueryScope::Overview],
            Mutation::ChangeUserRole => vec![QueryScope::Users, QueryScope::UserRoles],
            Mutation::CreateOrder => vec![QueryScope::Orders, QueryScope::Overview],
            Mutation::SaveAd | Mutation::DeleteAd | Mutation::SetAdStatus => vec![QueryScope::Ads],
        }
    }
}

struct CachedQuery {
    value: Arc<dyn Any + Send + Sync>,
    fetched_at: Instant,
}

pub struct QueryCache {
    entries: RwLock<HashMap<QueryKey, CachedQuery>>,
    ttl: Duration,
}

impl QueryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Fresh cached value for `key`, if any and of type `T`
    pub async fn peek<T>(&self, key: &QueryKey) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if entry.fetched_at.elapsed() >= self.ttl {
            return None;
        }
        entry.value.downcast_ref::<T>().cloned()
    }

    /// Return the cached value for `key`, or run `fetch` and cache its success
    ///
    /// Errors are passed through and never cached.
    pub async fn get_or_fetch<T, E, F, Fut>(&self, key: QueryKey, fetch: F) -> Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(hit) = self.peek::<T>(&key).await {
            debug!(?key, "cache hit");
            return Ok(hit);
        }

        debug!(?key, "cache miss");
        let value = fetch().await?;

        self.entries.write().await.insert(
            key,
            CachedQuery {
                value: Arc::new(value.clone()),
                fetched_at: Instant::now(),
            },
        );
        Ok(value)
    }

    /// Drop every entry the mutation makes stale; returns how many were dropped
    pub async fn invalidate(&self, mutation: &Mutation) -> usize {
        let scopes = mutation.invalidates();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !scopes.iter().any(|scope| scope.covers(key)));
        let dropped = before - entries.len();
        debug!(?mutation, dropped, "cache invalidated");
        dropped
    }

    /// Forget everything, e.g. when the signed-in user changes
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn fetch_counted(
        counter: &AtomicUsize,
        value: Vec<String>,
    ) -> Result<Vec<String>, String> {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(value)
    }

    #[tokio::test]
    async fn test_second_read_is_served_from_cache() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let calls = AtomicUsize::new(0);

        let first = cache
            .get_or_fetch(QueryKey::Users, || fetch_counted(&calls, vec!["a".into()]))
            .await
            .unwrap();
        let second = cache
            .get_or_fetch(QueryKey::Users, || fetch_counted(&calls, vec!["b".into()]))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache = QueryCache::new(Duration::from_secs(60));

        let failed: Result<u32, String> = cache
            .get_or_fetch(QueryKey::Overview, || async { Err("boom".to_string()) })
            .await;
        assert!(failed.is_err());
        assert_eq!(cache.len().await, 0);

        let ok: Result<u32, String> = cache
            .get_or_fetch(QueryKey::Overview, || async { Ok(7) })
            .await;
        assert_eq!(ok, Ok(7));
    }

    #[tokio::test]
    async fn test_expired_entries_are_refetched() {
        let cache = QueryCache::new(Duration::ZERO);
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            cache
                .get_or_fetch(QueryKey::AllAds, || fetch_counted(&calls, Vec::new()))
                .await
                .unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_mutation_invalidates_only_dependent_queries() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let keys = vec![
            QueryKey::Products(ProductFilter::new(10)),
            QueryKey::AllProducts,
            QueryKey::Product("p1".into()),
            QueryKey::Product("p2".into()),
            QueryKey::Watchlist("a@x.com".into()),
            QueryKey::Users,
        ];
        for key in keys {
            cache.get_or_fetch(key, || async { Ok::<u8, ()>(1) }).await.unwrap();
        }

        let dropped = cache.invalidate(&Mutation::ApproveProduct("p1".into())).await;
        assert_eq!(dropped, 3);
        assert!(cache.peek::<u8>(&QueryKey::Product("p2".into())).await.is_some());
        assert!(cache.peek::<u8>(&QueryKey::Product("p1".into())).await.is_none());
        assert!(cache.peek::<u8>(&QueryKey::Users).await.is_some());

        let dropped = cache
            .invalidate(&Mutation::RemoveFromWatchlist { email: "other@x.com".into() })
            .await;
        assert_eq!(dropped, 0);

        let dropped = cache.invalidate(&Mutation::DeleteProduct("p2".into())).await;
        assert_eq!(dropped, 2);
        assert_eq!(cache.len().await, 1);
    }

    #[test]
    fn test_scope_coverage() {
        assert!(QueryScope::ProductLists.covers(&QueryKey::VendorProducts("v@x.com".into())));
        assert!(!QueryScope::ProductLists.covers(&QueryKey::Product("p1".into())));
        assert!(QueryScope::Orders.covers(&QueryKey::AllOrders));
        assert!(QueryScope::Ads.covers(&QueryKey::CurrentAds));
        assert!(!QueryScope::Watchlist("a".into()).covers(&QueryKey::Watchlist("b".into())));
    }
}
