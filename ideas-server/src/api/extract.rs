use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::header,
    Form, Json,
};
use serde::de::DeserializeOwned;

use super::ApiError;

/// Request body decoded from `application/json` or, failing that content type,
/// from `application/x-www-form-urlencoded`. Decode failures use the API error envelope.
#[derive(Debug)]
pub struct FormOrJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for FormOrJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|content_type| content_type.starts_with("application/json"))
            .unwrap_or(false);

        if is_json {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
            Ok(Self(value))
        } else {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
            Ok(Self(value))
        }
    }
}

/// Parse an integer id taken from the URL path
pub fn parse_id(raw: &str, what: &str) -> Result<i32, ApiError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| ApiError::BadRequest(format!("Invalid {}: {}", what, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42", "user ID").unwrap(), 42);
        assert_eq!(parse_id(" 7 ", "user ID").unwrap(), 7);
        assert!(matches!(parse_id("abc", "user ID"), Err(ApiError::BadRequest(_))));
        assert!(matches!(parse_id("", "user ID"), Err(ApiError::BadRequest(_))));
    }
}
