//! Request extractors that report failures as `ApiError`

use axum::{
    Json,
    async_trait,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
};
use media::MediaSource;
use serde::{Deserialize, de::DeserializeOwned};

use crate::error::ApiError;

/// JSON body whose rejections become 400 responses naming the problem
/// (missing field, unknown key, malformed number, not JSON at all).
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ValidJson(value)),
            Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
        }
    }
}

#[derive(Deserialize)]
struct UrlBody {
    url: String,
}

/// Media for a media-bearing entity: a multipart `file` part, or a JSON
/// `{"url": ...}` reference.
pub struct MediaPayload(pub MediaSource);

#[async_trait]
impl<S> FromRequest<S> for MediaPayload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"));

        if !is_multipart {
            let ValidJson(body) = ValidJson::<UrlBody>::from_request(req, state).await?;
            return Ok(MediaPayload(MediaSource::Url(body.url)));
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?
        {
            if field.name() != Some("file") {
                continue;
            }

            let file_name = field
                .file_name()
                .map(str::to_string)
                .ok_or_else(|| ApiError::BadRequest("file part has no file name".to_string()))?;
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;

            return Ok(MediaPayload(MediaSource::Upload {
                file_name,
                content_type,
                bytes,
            }));
        }

        Err(ApiError::BadRequest("Missing file".to_string()))
    }
}
