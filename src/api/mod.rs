use crate::infrastructure::config::GatewayConfig;
use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::{Json, Router};
use di_axum::Inject;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub mod chat;
pub mod debug;
pub mod remote;
pub mod status;

pub const X_API_KEY: &str = "X-API-Key";

#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub error: &'static str,
}

pub type ApiError = (StatusCode, Json<ErrorBody>);

pub fn api_error(status: StatusCode, error: &'static str) -> ApiError {
    (status, Json(ErrorBody { error }))
}

/// Every route the gateway serves, minus static files.
pub fn router() -> Router {
    Router::new()
        .merge(status::router())
        .merge(chat::router())
        .merge(debug::router())
        .nest("/remote", remote::router())
}

/// Guard for routes behind the shared secret.
///
/// Passes every request when no token is configured.
#[derive(Debug)]
pub struct RequireApiKey;

#[async_trait]
impl<S> FromRequestParts<S> for RequireApiKey
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, ApiError> {
        let Inject(config) = Inject::<GatewayConfig>::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                api_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "configuration unavailable",
                )
            })?;

        check_api_key(config.api_token.as_deref(), &parts.headers)
    }
}

/// Compares the `X-API-Key` header against the configured token, if any.
pub fn check_api_key(
    expected: Option<&str>,
    headers: &HeaderMap,
) -> Result<RequireApiKey, ApiError> {
    let Some(expected) = expected else {
        return Ok(RequireApiKey);
    };

    match headers.get(X_API_KEY) {
        Some(provided) if provided.as_bytes() == expected.as_bytes() => Ok(RequireApiKey),
        _ => Err(api_error(StatusCode::UNAUTHORIZED, "Unauthorized")),
    }
}

/// Reads a JSON body the forgiving way: anything unparseable counts as an empty object.
pub fn lenient_json<T>(body: &[u8]) -> T
where
    T: DeserializeOwned + Default,
{
    serde_json::from_slice(body).unwrap_or_default()
}

/// Field deserializer that keeps strings and reads any other JSON value as absent.
///
/// Pair with `#[serde(default)]` so a mistyped field does not discard the rest of the body.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize, Debug, Default)]
    struct Fields {
        #[serde(default, deserialize_with = "lenient_string")]
        name: Option<String>,
        #[serde(default, deserialize_with = "lenient_string")]
        tag: Option<String>,
    }

    #[test]
    fn test_lenient_string_drops_only_mistyped_fields() {
        let parsed: Fields = lenient_json(br#"{"name": "kouri", "tag": 5}"#);

        assert_eq!(parsed.name.as_deref(), Some("kouri"));
        assert_eq!(parsed.tag, None);
    }

    #[test]
    fn test_lenient_json_non_object_is_default() {
        let parsed: Fields = lenient_json(b"[1, 2]");

        assert_eq!(parsed.name, None);
        assert_eq!(parsed.tag, None);
    }
}
