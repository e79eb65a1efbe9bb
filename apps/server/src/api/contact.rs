use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Router,
};
use taxdesk_core::contact::ContactRequest;

use crate::{
    api::ApiJson,
    error::{ApiResult, ErrorBody},
    main_lib::AppState,
    models::ContactBody,
};

const ANONYMOUS_CLIENT: &str = "anonymous";

/// Identifies the visitor for throttling: first `x-forwarded-for` hop, then
/// `x-real-ip`, else one shared bucket.
pub fn client_key(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    forwarded
        .or_else(real_ip)
        .unwrap_or(ANONYMOUS_CLIENT)
        .to_string()
}

#[utoipa::path(
    post,
    path = "/api/v1/contact",
    request_body = ContactBody,
    responses(
        (status = 202, description = "Message accepted"),
        (status = 400, body = ErrorBody),
        (status = 429, body = ErrorBody)
    )
)]
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    ApiJson(request): ApiJson<ContactRequest>,
) -> ApiResult<StatusCode> {
    let key = client_key(&headers);
    state.contact_service.submit(&key, request).await?;
    Ok(StatusCode::ACCEPTED)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/contact", post(submit_contact))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn forwarded_for_takes_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(client_key(&headers), "203.0.113.7");
    }

    #[test]
    fn real_ip_then_anonymous() {
        let mut headers = HeaderMap::new();
        assert_eq!(client_key(&headers), ANONYMOUS_CLIENT);
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.4"));
        assert_eq!(client_key(&headers), "198.51.100.4");
    }
}
