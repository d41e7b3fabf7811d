use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use uuid::Uuid;

use crate::error::ClassifyError;
use crate::service::{AppState, Upload, classify_upload};
use crate::store::ClassificationRecord;

/// `{status, message}` wrapper for responses without a payload.
#[derive(Serialize)]
pub struct MessageEnvelope {
    pub status: &'static str,
    pub message: &'static str,
}

/// `{status, data}` wrapper for responses carrying records.
#[derive(Serialize)]
pub struct DataEnvelope<T> {
    pub status: &'static str,
    pub data: T,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/classify", get(list_results).post(create_result))
        .route("/classify/{id}", get(get_result).delete(delete_result))
        .with_state(state)
}

#[tracing::instrument(name = "GET /")]
async fn index() -> Json<MessageEnvelope> {
    Json(MessageEnvelope {
        status: "Success",
        message: "Welcome to API.",
    })
}

/// Pull the `file` part out of the multipart body, if any.
///
/// A missing filename reads as an empty one; the service layer rejects both
/// the same way.
async fn extract_file(multipart: &mut Multipart) -> Result<Option<Upload>, ClassifyError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        return Ok(Some(Upload {
            filename,
            bytes: bytes.to_vec(),
        }));
    }
    Ok(None)
}

#[tracing::instrument(name = "POST /classify", skip(state, multipart))]
async fn create_result(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ClassifyError> {
    // A request that is not even multipart reads the same as one with no
    // file part.
    let upload = match multipart {
        Ok(mut multipart) => extract_file(&mut multipart).await?,
        Err(_) => None,
    };
    let record = classify_upload(&state, upload)?;

    // The created id is intentionally not echoed back; callers discover
    // records through the list endpoint.
    tracing::info!(id = %record.id, label = %record.predicted_class, "stored classification");
    let body = MessageEnvelope {
        status: "success",
        message: "Image upload successfully",
    };
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

#[tracing::instrument(name = "GET /classify", skip(state))]
async fn list_results(
    State(state): State<AppState>,
) -> Result<Json<DataEnvelope<Vec<ClassificationRecord>>>, ClassifyError> {
    let records = state.store.list_all();
    if records.is_empty() {
        return Err(ClassifyError::NoData);
    }
    Ok(Json(DataEnvelope {
        status: "Success",
        data: records,
    }))
}

#[tracing::instrument(name = "GET /classify/{id}", skip(state))]
async fn get_result(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DataEnvelope<ClassificationRecord>>, ClassifyError> {
    let id = Uuid::parse_str(&id).map_err(|_| ClassifyError::InvalidId(id))?;
    let record = state.store.get_by_id(&id).ok_or(ClassifyError::NotFound)?;
    Ok(Json(DataEnvelope {
        status: "Success",
        data: record,
    }))
}

#[tracing::instrument(name = "DELETE /classify/{id}", skip(state))]
async fn delete_result(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageEnvelope>, ClassifyError> {
    // A malformed id cannot match any stored record, so it reads as absent
    // here rather than as a syntax error.
    let removed = Uuid::parse_str(&id)
        .map(|id| state.store.delete_by_id(&id))
        .unwrap_or(false);
    if !removed {
        return Err(ClassifyError::NotFound);
    }
    Ok(Json(MessageEnvelope {
        status: "Success",
        message: "Deleted successfully",
    }))
}
