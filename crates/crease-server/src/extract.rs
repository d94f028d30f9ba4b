use async_trait::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;

use crate::error::ServerError;

/// JSON request body whose rejections use the crease error body.
#[derive(Debug, Clone, Copy, Default)]
pub struct Payload<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        let reason = rejection.body_text();
        Self::Payload {
            status: rejection.status(),
            field: rejected_field(&reason),
            reason,
        }
    }
}

/// Path of the offending value in a deserialization message such as
/// "...target type: ballType: unknown variant `beamer`".
fn rejected_field(reason: &str) -> Option<String> {
    let (_, detail) = reason.split_once("target type: ")?;
    if let Some(rest) = detail.strip_prefix("missing field `") {
        return rest.split_once('`').map(|(name, _)| name.to_string());
    }
    let (path, _) = detail.split_once(": ")?;
    (!path.is_empty() && !path.contains(' ')).then(|| path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_from_unknown_variant() {
        let reason = "Failed to deserialize the JSON body into the target type: \
                      ballType: unknown variant `beamer`, expected one of `normal`, `wide` \
                      at line 1 column 30";
        assert_eq!(rejected_field(reason).as_deref(), Some("ballType"));
    }

    #[test]
    fn field_from_missing_field() {
        let reason = "Failed to deserialize the JSON body into the target type: \
                      missing field `playerId` at line 1 column 2";
        assert_eq!(rejected_field(reason).as_deref(), Some("playerId"));
    }

    #[test]
    fn syntax_errors_name_no_field() {
        let reason = "Failed to parse the request body as JSON: \
                      expected value at line 1 column 1";
        assert_eq!(rejected_field(reason), None);
        assert_eq!(
            rejected_field("Expected request with `Content-Type: application/json`"),
            None
        );
    }
}
