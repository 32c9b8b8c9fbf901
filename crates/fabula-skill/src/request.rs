use axum::body::Body;

use crate::SkillError;
use crate::envelope::RequestEnvelope;

/// Body limit for skill requests (256 KiB)
const BODY_LIMIT_BYTES: usize = 256 << 10;

/// Extractor for skill request envelopes
pub struct ExtractEnvelope(pub RequestEnvelope);

impl<S> axum::extract::FromRequest<S> for ExtractEnvelope
where
    S: Send + Sync,
{
    type Rejection = SkillError;

    async fn from_request(request: http::Request<Body>, _state: &S) -> Result<Self, Self::Rejection> {
        let (parts, body) = request.into_parts();

        let is_json = parts
            .headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .is_some_and(|essence| essence.trim().eq_ignore_ascii_case("application/json"));

        if !is_json {
            return Err(SkillError::UnsupportedMediaType);
        }

        let bytes = axum::body::to_bytes(body, BODY_LIMIT_BYTES).await.map_err(|err| {
            if std::error::Error::source(&err).is_some_and(|source| source.is::<http_body_util::LengthLimitError>()) {
                SkillError::PayloadTooLarge {
                    limit: BODY_LIMIT_BYTES,
                }
            } else {
                SkillError::InvalidBody(format!("failed to read request body: {err}"))
            }
        })?;

        let envelope = serde_json::from_slice::<RequestEnvelope>(&bytes)
            .map_err(|e| SkillError::InvalidBody(format!("failed to parse request body: {e}")))?;

        Ok(Self(envelope))
    }
}
