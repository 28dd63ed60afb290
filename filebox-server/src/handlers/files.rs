use std::io;
use std::sync::Arc;

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::PathRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::TryStreamExt;
use sha2::{Digest, Sha256};
use tokio_util::io::StreamReader;
use tracing::{info, warn};

use filebox_common::StoreError;

use crate::state::AppState;

/// Multipart field carrying the uploaded file.
const FILE_FIELD: &str = "file";

/// POST /api/v1/files/ — store the `file` part of a multipart form
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> impl IntoResponse {
    let mut multipart = match multipart {
        Ok(m) => m,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, Json(error_json(&e.body_text())));
        }
    };

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(error_json("missing form field `file`")),
                );
            }
            Err(e) => {
                return (e.status(), Json(error_json(&e.body_text())));
            }
        };

        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let Some(file_name) = field.file_name().map(ToOwned::to_owned) else {
            return (
                StatusCode::BAD_REQUEST,
                Json(error_json("form field `file` is not a file upload")),
            );
        };

        let reader = StreamReader::new(field.map_err(io::Error::other));
        let mut reader = std::pin::pin!(reader);

        return match state.store.upload(&file_name, &mut reader).await {
            Ok(name) => {
                info!(name = %name, "Upload stored");
                (
                    StatusCode::OK,
                    Json(serde_json::json!({
                        "success": "Uploaded successfully",
                        "name": name,
                    })),
                )
            }
            Err(e) => {
                warn!(error = %e, file_name = %file_name, "Upload failed");
                (upload_error_status(&e), Json(error_json(&e.to_string())))
            }
        };
    }
}

/// GET /api/v1/files/{name}/ — return a stored file as an attachment
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    name: Result<Path<String>, PathRejection>,
) -> Response {
    let name = match name {
        Ok(Path(name)) if !name.is_empty() => name,
        Ok(_) => {
            return (StatusCode::BAD_REQUEST, Json(error_json("file name is required")))
                .into_response();
        }
        Err(e) => {
            return (StatusCode::BAD_REQUEST, Json(error_json(&e.body_text()))).into_response();
        }
    };

    let file = match state.store.download(&name).await {
        Ok(f) => f,
        Err(e) if e.is_client_error() => {
            return (StatusCode::BAD_REQUEST, Json(error_json(&e.to_string()))).into_response();
        }
        Err(e) => {
            warn!(error = %e, name = %name, "Download failed");
            return (StatusCode::NOT_FOUND, Json(error_json(&e.to_string()))).into_response();
        }
    };

    let digest = format!("sha-256=:{}:", base64_encode(&Sha256::digest(&file.content)));

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, file.mime_type),
            (header::CONTENT_DISPOSITION, attachment_disposition(&name)),
            (HeaderName::from_static("digest"), digest),
        ],
        file.content,
    )
        .into_response()
}

fn upload_error_status(err: &StoreError) -> StatusCode {
    match err {
        StoreError::InvalidName(_) => StatusCode::BAD_REQUEST,
        // A body over the upload limit surfaces as a read error mid-copy.
        StoreError::Io(e) => e
            .get_ref()
            .and_then(|inner| inner.downcast_ref::<MultipartError>())
            .map(MultipartError::status)
            .filter(|status| *status == StatusCode::PAYLOAD_TOO_LARGE)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        StoreError::NotFound(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `attachment` disposition with a quoted ASCII filename plus the exact
/// name in RFC 5987 form for clients that understand `filename*`.
fn attachment_disposition(name: &str) -> String {
    let ascii: String = name
        .chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c } else { '_' })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        ascii.replace('\\', "\\\\").replace('"', "\\\""),
        urlencoding::encode(name)
    )
}

fn base64_encode(data: &[u8]) -> String {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.encode(data)
}

fn error_json(message: &str) -> serde_json::Value {
    serde_json::json!({ "error": message })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_disposition_plain_name() {
        assert_eq!(
            attachment_disposition("1700000000 - greeting.txt"),
            "attachment; filename=\"1700000000 - greeting.txt\"; \
             filename*=UTF-8''1700000000%20-%20greeting.txt"
        );
    }

    #[test]
    fn test_attachment_disposition_escapes_and_replaces() {
        let value = attachment_disposition("1 - \"résumé\".pdf");
        assert!(value.starts_with("attachment; filename=\"1 - \\\"r_sum_\\\".pdf\";"));
        assert!(value.ends_with("filename*=UTF-8''1%20-%20%22r%C3%A9sum%C3%A9%22.pdf"));
    }

    #[test]
    fn test_upload_error_status() {
        assert_eq!(
            upload_error_status(&StoreError::InvalidName("..".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            upload_error_status(&StoreError::Io(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "exists"
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
