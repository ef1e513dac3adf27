use axum::extract::FromRequestParts;

use crate::error::AppError;

/// Header carrying the opaque browsing-session identifier that scopes a
/// cart. The client picks the value; the server only keys on it.
pub const SESSION_HEADER: &str = "x-session-id";

const MAX_KEY_LEN: usize = 128;

/// Extractor for the cart session key. Cart routes work for anonymous
/// visitors, so this is independent of [`super::auth::AuthUser`].
#[derive(Debug, Clone)]
pub struct SessionKey(String);

impl SessionKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for SessionKey
where
    S: Send + Sync,
{
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(SESSION_HEADER)
            .ok_or_else(|| AppError::BadRequest(format!("Missing {SESSION_HEADER} header")))?
            .to_str()
            .map_err(|_| AppError::BadRequest(format!("Invalid {SESSION_HEADER} header")))?
            .trim();

        if value.is_empty() || value.len() > MAX_KEY_LEN {
            return Err(AppError::BadRequest(format!(
                "Invalid {SESSION_HEADER} header"
            )));
        }

        Ok(SessionKey(value.to_string()))
    }
}
