pub mod classifier;
pub mod cli;
pub mod error;
pub mod model;
pub mod preprocess;
pub mod routes;
pub mod service;
pub mod store;

pub use crate::classifier::{Classifier, DEFAULT_LABELS, Infer, load_labels};
pub use crate::cli::Args;
pub use crate::error::ClassifyError;
pub use crate::model::{OnnxBackend, OnnxModel};
pub use crate::preprocess::{PreprocessConfig, Processor};
pub use crate::routes::router;
pub use crate::service::{AppState, Upload, classify_upload};
pub use crate::store::{ClassificationRecord, ResultStore};
