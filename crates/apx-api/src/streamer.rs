//! # Response Streamer
//!
//! Turns a committed asset into a downloadable attachment. The body is read
//! from disk in `chunk_size` pieces as the client consumes it; a client that
//! disconnects drops the stream and with it the file handle.

use apx_core::AssetId;
use apx_store::{AssetStore, StoredAsset};
use axum::body::Body;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE,
};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use tokio_util::io::ReaderStream;

use crate::error::AppError;

/// Stream the cached asset `id` back as `attachment; filename="<id>"`.
pub async fn attachment(
    store: &AssetStore,
    id: &AssetId,
    chunk_size: usize,
) -> Result<Response, AppError> {
    let StoredAsset { file, len } = store.open(id).await.map_err(AppError::Serve)?;

    let disposition = content_disposition(id)?;
    let body = Body::from_stream(ReaderStream::with_capacity(file, chunk_size));

    tracing::debug!(asset = %id, bytes = len, "streaming asset");
    Ok((
        StatusCode::OK,
        [
            (
                CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            ),
            (CONTENT_LENGTH, HeaderValue::from(len)),
            (CONTENT_DISPOSITION, disposition),
            (ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*")),
        ],
        body,
    )
        .into_response())
}

fn content_disposition(id: &AssetId) -> Result<HeaderValue, AppError> {
    let escaped = id.as_str().replace('"', "\\\"");
    HeaderValue::from_str(&format!("attachment; filename=\"{escaped}\"")).map_err(|e| {
        AppError::Internal(format!("asset name {id} is not a valid header value: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn streams_file_with_attachment_headers() {
        let dir = tempfile::tempdir().unwrap();
        let store = AssetStore::init(dir.path()).unwrap();
        let id = AssetId::new("main.pak").unwrap();
        let content: Vec<u8> = (0..30_000u32).map(|i| (i % 256) as u8).collect();
        std::fs::write(store.path_of(&id), &content).unwrap();

        let response = attachment(&store, &id, 8192).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[CONTENT_TYPE], "application/octet-stream");
        assert_eq!(headers[CONTENT_LENGTH], "30000");
        assert_eq!(headers[CONTENT_DISPOSITION], "attachment; filename=\"main.pak\"");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body.as_ref(), content.as_slice());
    }

    #[tokio::test]
    async fn empty_asset_streams_empty_body() {
        let dir = tempfile::tempdir().unwrap();
        let store = AssetStore::init(dir.path()).unwrap();
        let id = AssetId::new("empty.bin").unwrap();
        std::fs::write(store.path_of(&id), b"").unwrap();

        let response = attachment(&store, &id, 8192).await.unwrap();
        assert_eq!(response.headers()[CONTENT_LENGTH], "0");
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn missing_file_is_a_serve_failure() {
        let dir = tempfile::tempdir().unwrap();
        let store = AssetStore::init(dir.path()).unwrap();
        let id = AssetId::new("vanished.bin").unwrap();

        let err = attachment(&store, &id, 8192).await.unwrap_err();
        assert!(matches!(err, AppError::Serve(_)));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn quotes_in_names_are_escaped() {
        let id = AssetId::new("say\"hi\".txt").unwrap();
        let value = content_disposition(&id).unwrap();
        assert_eq!(value, "attachment; filename=\"say\\\"hi\\\".txt\"");
    }
}
