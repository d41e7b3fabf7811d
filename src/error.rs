use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

pub const INVALID_FORMAT_MESSAGE: &str =
    "Invalid file format. Please upload an image (PNG, JPG, JPEG)";
pub const UPLOAD_FAILED_MESSAGE: &str = "Failed to upload image";

/// Everything that can go wrong while handling a classification request.
///
/// The variants stay distinguishable internally (and in logs), but several of
/// them collapse into the same generic message for the caller: decode and
/// inference failures are never leaked over the wire.
#[derive(Error, Debug)]
pub enum ClassifyError {
    /// The multipart body carried no `file` part.
    #[error("no file part in request")]
    MissingFile,

    /// The `file` part had an empty filename.
    #[error("empty filename")]
    EmptyFilename,

    /// The filename extension is not one of the accepted image formats.
    #[error("unsupported file extension: {0:?}")]
    UnsupportedExtension(String),

    /// The multipart body could not be read.
    #[error("multipart read: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    /// The upload bytes could not be decoded as an image.
    #[error("image decode: {0}")]
    Decode(#[from] image::ImageError),

    /// Resizing or tensor construction failed on a decoded image.
    #[error("{context}")]
    Preprocess {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The inference backend failed at runtime.
    #[error("inference: {0}")]
    Inference(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A path identifier that is not a well-formed UUID.
    #[error("malformed identifier: {0:?}")]
    InvalidId(String),

    /// A well-formed identifier with no matching record.
    #[error("no record for the given identifier")]
    NotFound,

    /// The store holds no records at all.
    #[error("store is empty")]
    NoData,

    /// Deployment-time configuration problem (bad model path, empty labels).
    #[error("configuration: {0}")]
    Config(String),
}

impl ClassifyError {
    pub fn preprocess(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Preprocess {
            context: context.into(),
            source: Box::new(source),
        }
    }

    pub fn inference(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Inference(source.into())
    }

    /// The HTTP status and caller-visible message for this error.
    ///
    /// Decode, preprocess, and inference failures all map to the same generic
    /// upload-failure message on purpose.
    pub fn public_parts(&self) -> (StatusCode, String) {
        match self {
            Self::MissingFile => (StatusCode::BAD_REQUEST, "No file request".into()),
            Self::EmptyFilename => (StatusCode::BAD_REQUEST, "No selected file".into()),
            Self::UnsupportedExtension(_) => {
                (StatusCode::BAD_REQUEST, INVALID_FORMAT_MESSAGE.into())
            }
            Self::Multipart(_) | Self::Decode(_) | Self::Preprocess { .. } | Self::Inference(_) => {
                (StatusCode::BAD_REQUEST, UPLOAD_FAILED_MESSAGE.into())
            }
            Self::InvalidId(_) => (StatusCode::BAD_REQUEST, "Invalid ID format".into()),
            Self::NotFound => (
                StatusCode::NOT_FOUND,
                "Not found for the given ID".into(),
            ),
            Self::NoData => (StatusCode::NOT_FOUND, "No data available".into()),
            Self::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                UPLOAD_FAILED_MESSAGE.into(),
            ),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    status: String,
    message: String,
}

impl IntoResponse for ClassifyError {
    fn into_response(self) -> Response {
        match &self {
            ClassifyError::Decode(_)
            | ClassifyError::Preprocess { .. }
            | ClassifyError::Multipart(_) => {
                tracing::warn!(error = %self, "upload rejected");
            }
            ClassifyError::Inference(_) | ClassifyError::Config(_) => {
                tracing::error!(error = %self, "classification failed");
            }
            _ => {
                tracing::debug!(error = %self, "request rejected");
            }
        }

        let (status, message) = self.public_parts();
        let body = ErrorBody {
            status: format!("ERROR {}", status.as_u16()),
            message,
        };
        (status, Json(body)).into_response()
    }
}
