use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client as HttpClient, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use super::models::{error_message, ApiError, RateLimitResponse};
use crate::models::{
    AdDraft, AdStatus, AdStatusUpdate, Advertisement, InsertAck, NewOrder, NewUser,
    NewWatchlistItem, Order, OverviewStats, PaymentIntent, PaymentIntentRequest, Product,
    ProductFilter, ProductPage, ProductStatus, ProductSubmission, Review, Role, RoleResponse,
    RoleUpdate, UserAccount, WatchlistItem,
};
use crate::utils::RateLimiter;

const REQUEST_ID_HEADER: &str = "X-Request-Id";

#[derive(Serialize)]
struct StatusChange<'a> {
    status: ProductStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    feedback: Option<&'a str>,
}

/// Client for the BazaarTrack REST API
///
/// Cheap to clone: the HTTP connection pool and the rate limiter are shared. A
/// clone carrying a user's access token is made per command with [`for_token`].
///
/// [`for_token`]: BazaarClient::for_token
#[derive(Clone)]
pub struct BazaarClient {
    http_client: HttpClient,
    base_url: Arc<str>,
    access_token: Option<String>,
    limiter: Arc<RateLimiter>,
}

impl BazaarClient {
    pub fn new(base_url: &str, limiter: RateLimiter) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url: Arc::from(base_url.trim_end_matches('/')),
            access_token: None,
            limiter: Arc::new(limiter),
        }
    }

    /// A client that authenticates as the given user
    pub fn for_token(&self, access_token: &str) -> Self {
        Self {
            access_token: Some(access_token.to_string()),
            ..self.clone()
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn create_headers(&self, request_id: &str) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let id_value = HeaderValue::from_str(request_id).map_err(|e| {
            ApiError::RequestError(format!("Failed to create request id header: {}", e))
        })?;
        headers.insert(REQUEST_ID_HEADER, id_value);

        if let Some(token) = &self.access_token {
            let auth_value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|e| {
                ApiError::RequestError(format!("Failed to create auth header: {}", e))
            })?;
            headers.insert(AUTHORIZATION, auth_value);
        }

        Ok(headers)
    }

    /// Map a non-2xx response to an [`ApiError`]
    async fn handle_error_response(status: StatusCode, response: reqwest::Response) -> ApiError {
        let retry_header = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());
        let body_text = response.text().await.unwrap_or_default();
        let message = error_message(&body_text);
        let status_code = status.as_u16();

        match status_code {
            400 => ApiError::BadRequest(message),
            401 => ApiError::Unauthorized(message),
            403 => ApiError::Forbidden(message),
            404 => ApiError::NotFound(message),
            429 => {
                let retry_after_ms = serde_json::from_str::<RateLimitResponse>(&body_text)
                    .ok()
                    .and_then(|r| r.retry_after)
                    .or_else(|| retry_header.map(|secs| secs * 1000))
                    .unwrap_or(1000);
                warn!("Rate limited by API, retry after {} ms", retry_after_ms);
                ApiError::RateLimited { retry_after_ms }
            }
            500..=599 => {
                warn!("Server error {}: {}", status_code, message);
                ApiError::ServerError(status_code, message)
            }
            _ => ApiError::HttpError(status_code, message),
        }
    }

    /// Send a request and hand back the successful response
    async fn execute(
        &self,
        method: Method,
        path: &str,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<reqwest::Response, ApiError> {
        self.limiter.acquire().await;

        let request_id = Uuid::new_v4().to_string();
        let headers = self.create_headers(&request_id)?;
        debug!(%request_id, %method, path, "API request");

        let request = self
            .http_client
            .request(method.clone(), self.url(path))
            .headers(headers);

        let response = build(request)
            .send()
            .await
            .map_err(|e| ApiError::RequestError(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            debug!(%request_id, %method, path, status = status.as_u16(), "API request failed");
            return Err(Self::handle_error_response(status, response).await);
        }

        Ok(response)
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::DeserializationError(format!("Failed to parse response: {}", e)))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let response = self.execute(Method::GET, path, |req| req.query(query)).await?;
        Self::read_json(response).await
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.execute(method, path, |req| req.json(body)).await?;
        Self::read_json(response).await
    }

    /// For endpoints whose response body carries nothing the client needs
    async fn send_discarding<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), ApiError> {
        self.execute(method, path, |req| match body {
            Some(body) => req.json(body),
            None => req,
        })
        .await?;
        Ok(())
    }

    // ---- products ----

    /// GET /products
    pub async fn list_products(&self, filter: &ProductFilter) -> Result<ProductPage, ApiError> {
        self.get_json("/products", &filter.to_query()).await
    }

    /// GET /products/latest
    pub async fn latest_products(&self) -> Result<Vec<Product>, ApiError> {
        self.get_json("/products/latest", &[]).await
    }

    /// GET /products/all (admin)
    pub async fn all_products(&self) -> Result<Vec<Product>, ApiError> {
        self.get_json("/products/all", &[]).await
    }

    /// GET /products/vendor?email=
    pub async fn vendor_products(&self, email: &str) -> Result<Vec<Product>, ApiError> {
        self.get_json("/products/vendor", &[("email", email.to_string())]).await
    }

    /// GET /products/{id}
    pub async fn get_product(&self, product_id: &str) -> Result<Product, ApiError> {
        self.get_json(&format!("/products/{}", product_id), &[]).await
    }

    /// POST /products
    pub async fn add_product(&self, submission: &ProductSubmission) -> Result<InsertAck, ApiError> {
        self.send_json(Method::POST, "/products", submission).await
    }

    /// PATCH /products/{id}
    pub async fn update_product(
        &self,
        product_id: &str,
        submission: &ProductSubmission,
    ) -> Result<(), ApiError> {
        self.send_discarding(
            Method::PATCH,
            &format!("/products/{}", product_id),
            Some(submission),
        )
        .await
    }

    /// DELETE /products/{id}
    pub async fn delete_product(&self, product_id: &str) -> Result<(), ApiError> {
        self.send_discarding::<()>(Method::DELETE, &format!("/products/{}", product_id), None).await
    }

    /// PATCH /products/{id}/approve
    pub async fn approve_product(&self, product_id: &str) -> Result<(), ApiError> {
        let body = StatusChange { status: ProductStatus::Approved, feedback: None };
        self.send_discarding(
            Method::PATCH,
            &format!("/products/{}/approve", product_id),
            Some(&body),
        )
        .await
    }

    /// PATCH /products/{id}/reject
    pub async fn reject_product(&self, product_id: &str, feedback: &str) -> Result<(), ApiError> {
        let body = StatusChange { status: ProductStatus::Rejected, feedback: Some(feedback) };
        self.send_discarding(
            Method::PATCH,
            &format!("/products/{}/reject", product_id),
            Some(&body),
        )
        .await
    }

    /// PATCH /products/{id}/review
    pub async fn submit_review(&self, product_id: &str, review: &Review) -> Result<(), ApiError> {
        self.send_discarding(
            Method::PATCH,
            &format!("/products/{}/review", product_id),
            Some(review),
        )
        .await
    }

    // ---- watchlist ----

    /// GET /watchlists?email=
    pub async fn watchlist(&self, email: &str) -> Result<Vec<WatchlistItem>, ApiError> {
        self.get_json("/watchlists", &[("email", email.to_string())]).await
    }

    /// POST /watchlists
    pub async fn add_to_watchlist(&self, item: &NewWatchlistItem) -> Result<(), ApiError> {
        self.send_discarding(Method::POST, "/watchlists", Some(item)).await
    }

    /// DELETE /watchlists/{id}
    pub async fn remove_from_watchlist(&self, watch_id: &str) -> Result<(), ApiError> {
        self.send_discarding::<()>(Method::DELETE, &format!("/watchlists/{}", watch_id), None).await
    }

    // ---- users ----

    /// GET /users/role?email=
    pub async fn user_role(&self, email: &str) -> Result<Option<Role>, ApiError> {
        let response: RoleResponse = self
            .get_json("/users/role", &[("email", email.to_string())])
            .await?;
        Ok(response.role.map(Role::from))
    }

    /// POST /users
    pub async fn register_user(&self, user: &NewUser) -> Result<(), ApiError> {
        self.send_discarding(Method::POST, "/users", Some(user)).await
    }

    /// GET /users
    pub async fn list_users(&self) -> Result<Vec<UserAccount>, ApiError> {
        self.get_json("/users", &[]).await
    }

    /// PATCH /users/{id}
    pub async fn update_user_role(&self, user_id: &str, role: Role) -> Result<(), ApiError> {
        self.send_discarding(
            Method::PATCH,
            &format!("/users/{}", user_id),
            Some(&RoleUpdate { role }),
        )
        .await
    }

    // ---- payments & orders ----

    /// POST /create-payment-intent
    pub async fn create_payment_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> Result<PaymentIntent, ApiError> {
        self.send_json(Method::POST, "/create-payment-intent", request).await
    }

    /// POST /orders
    pub async fn create_order(&self, order: &NewOrder) -> Result<(), ApiError> {
        self.send_discarding(Method::POST, "/orders", Some(order)).await
    }

    /// GET /orders?email=
    pub async fn my_orders(&self, email: &str) -> Result<Vec<Order>, ApiError> {
        self.get_json("/orders", &[("email", email.to_string())]).await
    }

    /// GET /orders/all (admin)
    pub async fn all_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.get_json("/orders/all", &[]).await
    }

    // ---- advertisements ----

    /// GET /advertisements?email=
    pub async fn my_ads(&self, email: &str) -> Result<Vec<Advertisement>, ApiError> {
        self.get_json("/advertisements", &[("email", email.to_string())]).await
    }

    /// GET /advertisements/all (admin)
    pub async fn all_ads(&self) -> Result<Vec<Advertisement>, ApiError> {
        self.get_json("/advertisements/all", &[]).await
    }

    /// GET /ads/current
    pub async fn current_ads(&self) -> Result<Vec<Advertisement>, ApiError> {
        self.get_json("/ads/current", &[]).await
    }

    /// POST /advertisements
    pub async fn add_ad(&self, ad: &AdDraft) -> Result<(), ApiError> {
        self.send_discarding(Method::POST, "/advertisements", Some(ad)).await
    }

    /// PATCH /advertisements/{id}
    pub async fn update_ad(&self, ad_id: &str, ad: &AdDraft) -> Result<(), ApiError> {
        self.send_discarding(Method::PATCH, &format!("/advertisements/{}", ad_id), Some(ad)).await
    }

    /// DELETE /advertisements/{id}
    pub async fn delete_ad(&self, ad_id: &str) -> Result<(), ApiError> {
        self.send_discarding::<()>(
            Method::DELETE,
            &format!("/advertisements/{}", ad_id),
            None,
        )
        .await
    }

    /// PATCH /advertisements/{id}/status
    pub async fn set_ad_status(&self, ad_id: &str, status: AdStatus) -> Result<(), ApiError> {
        let body = AdStatusUpdate { status };
        self.send_discarding(
            Method::PATCH,
            &format!("/advertisements/{}/status", ad_id),
            Some(&body),
        )
        .await
    }

    // ---- dashboard ----

    /// GET /dashboard/overview (admin)
    pub async fn overview(&self) -> Result<OverviewStats, ApiError> {
        self.get_json("/dashboard/overview", &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalised() {
        let client = BazaarClient::new("https://api.example.com/", RateLimiter::per_second(5));
        assert_eq!(client.base_url(), "https://api.example.com");
        assert_eq!(client.url("/products"), "https://api.example.com/products");
    }

    #[test]
    fn test_headers_carry_token_only_when_authorized() {
        let anonymous = BazaarClient::new("http://localhost:5000", RateLimiter::per_second(5));
        let headers = anonymous.create_headers("req-1").unwrap();
        assert!(headers.get(AUTHORIZATION).is_none());
        assert_eq!(headers.get(REQUEST_ID_HEADER).unwrap(), "req-1");

        let authorized = anonymous.for_token("abc123");
        let headers = authorized.create_headers("req-2").unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer abc123");
    }

    #[test]
    fn test_invalid_token_is_rejected() {
        let client = BazaarClient::new("http://localhost:5000", RateLimiter::per_second(5))
            .for_token("bad\ntoken");
        assert!(matches!(client.create_headers("req"), Err(ApiError::RequestError(_))));
    }
}
