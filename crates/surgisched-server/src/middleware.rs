use axum::{
    body::Body,
    extract::FromRequestParts,
    http::{HeaderName, HeaderValue, Request, request::Parts},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";
pub const USER_ID_HEADER: &str = "x-user-id";

/// Assigns each request an id (honoring one supplied by the caller),
/// exposes it to the trace span via request extensions and echoes it on
/// the response.
pub async fn request_id(mut req: Request<Body>, next: Next) -> Response {
    let id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .cloned()
        .unwrap_or_else(|| {
            HeaderValue::from_str(&Uuid::new_v4().to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("unknown"))
        });

    req.extensions_mut().insert(id.clone());
    let mut res = next.run(req).await;
    res.headers_mut()
        .insert(HeaderName::from_static(REQUEST_ID_HEADER), id);
    res
}

/// The authenticated user on whose behalf a write executes, taken from the
/// `x-user-id` header the enclosing API gateway stamps. Falls back to
/// "anonymous" so audit fields are always populated.
#[derive(Debug, Clone)]
pub struct UserContext(pub String);

impl UserContext {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S: Send + Sync> FromRequestParts<S> for UserContext {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let user = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .unwrap_or("anonymous")
            .to_string();
        Ok(UserContext(user))
    }
}
