use std::sync::Arc;

use crate::classifier::Classifier;
use crate::error::ClassifyError;
use crate::preprocess::{Processor, allowed_extension};
use crate::store::{ClassificationRecord, ResultStore};

/// The file part extracted from a multipart upload, before any validation.
#[derive(Debug)]
pub struct Upload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Shared handles the HTTP layer threads through every request.
#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<Processor>,
    pub classifier: Arc<Classifier>,
    pub store: Arc<ResultStore>,
}

impl AppState {
    pub fn new(processor: Processor, classifier: Classifier, store: ResultStore) -> Self {
        Self {
            processor: Arc::new(processor),
            classifier: Arc::new(classifier),
            store: Arc::new(store),
        }
    }
}

/// Drive one upload through the whole create path: validate, decode,
/// classify, persist.
///
/// Validation is fail-fast and ordered: file presence, then filename, then
/// extension. Only after all three pass do the bytes get decoded. The
/// returned record is the caller's copy; the store keeps its own.
pub fn classify_upload(
    state: &AppState,
    upload: Option<Upload>,
) -> Result<ClassificationRecord, ClassifyError> {
    let upload = upload.ok_or(ClassifyError::MissingFile)?;
    if upload.filename.is_empty() {
        return Err(ClassifyError::EmptyFilename);
    }
    if !allowed_extension(&upload.filename) {
        return Err(ClassifyError::UnsupportedExtension(upload.filename));
    }

    let tensor = state.processor.preprocess(&upload.bytes)?;
    let (label, confidence) = state.classifier.classify(tensor.view().into_dyn())?;

    tracing::debug!(%label, confidence, "classified upload");
    Ok(state.store.create(label, confidence))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{DEFAULT_LABELS, Infer};
    use crate::preprocess::PreprocessConfig;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use ndarray::ArrayViewD;
    use std::io::Cursor;

    struct FixedScores(Vec<f32>);

    impl Infer for FixedScores {
        fn infer(&self, _input: ArrayViewD<'_, f32>) -> Result<Vec<f32>, ClassifyError> {
            Ok(self.0.clone())
        }
    }

    struct FailingBackend;

    impl Infer for FailingBackend {
        fn infer(&self, _input: ArrayViewD<'_, f32>) -> Result<Vec<f32>, ClassifyError> {
            Err(ClassifyError::inference("backend unavailable"))
        }
    }

    fn state_with_backend(backend: Box<dyn Infer>) -> AppState {
        let labels = DEFAULT_LABELS.iter().map(|s| s.to_string()).collect();
        AppState::new(
            Processor::new(PreprocessConfig::default()),
            Classifier::new(backend, labels).unwrap(),
            ResultStore::new(),
        )
    }

    fn state() -> AppState {
        state_with_backend(Box::new(FixedScores(vec![0.02, 0.03, 0.05, 0.1, 0.8])))
    }

    fn jpeg_upload(filename: &str) -> Upload {
        let img = RgbImage::from_pixel(10, 10, Rgb([40, 90, 200]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, ImageFormat::Jpeg)
            .unwrap();
        Upload {
            filename: filename.into(),
            bytes: buf.into_inner(),
        }
    }

    #[test]
    fn missing_file_part_fails_first() {
        let err = classify_upload(&state(), None).unwrap_err();
        assert!(matches!(err, ClassifyError::MissingFile));
    }

    #[test]
    fn empty_filename_is_rejected_before_extension_check() {
        let upload = Upload {
            filename: String::new(),
            bytes: vec![1, 2, 3],
        };
        let err = classify_upload(&state(), Some(upload)).unwrap_err();
        assert!(matches!(err, ClassifyError::EmptyFilename));
    }

    #[test]
    fn unsupported_extension_is_rejected_before_decoding() {
        // Valid JPEG bytes behind a .gif name still fail the extension check.
        let mut upload = jpeg_upload("photo.gif");
        upload.bytes = jpeg_upload("x.jpg").bytes;
        let err = classify_upload(&state(), Some(upload)).unwrap_err();
        assert!(matches!(err, ClassifyError::UnsupportedExtension(_)));
    }

    #[test]
    fn undecodable_bytes_behind_a_valid_name_fail_decoding() {
        let upload = Upload {
            filename: "photo.jpg".into(),
            bytes: b"not an image at all".to_vec(),
        };
        let err = classify_upload(&state(), Some(upload)).unwrap_err();
        assert!(matches!(err, ClassifyError::Decode(_)));
    }

    #[test]
    fn valid_upload_creates_exactly_one_record() {
        let state = state();
        let record = classify_upload(&state, Some(jpeg_upload("photo.jpg"))).unwrap();

        assert_eq!(record.predicted_class, "Plastik");
        assert!((record.confidence_score - 0.8).abs() < 1e-6);
        assert!((0.0..=1.0).contains(&record.confidence_score));
        assert!(DEFAULT_LABELS.contains(&record.predicted_class.as_str()));

        let listed = state.store.list_all();
        assert_eq!(listed, vec![record]);
    }

    #[test]
    fn inference_failure_stores_nothing() {
        let state = state_with_backend(Box::new(FailingBackend));
        let err = classify_upload(&state, Some(jpeg_upload("photo.jpg"))).unwrap_err();
        assert!(matches!(err, ClassifyError::Inference(_)));
        assert!(state.store.list_all().is_empty());
    }

    #[test]
    fn failed_upload_leaves_existing_records_intact() {
        let state = state();
        let kept = classify_upload(&state, Some(jpeg_upload("ok.jpg"))).unwrap();

        let bad = Upload {
            filename: "broken.png".into(),
            bytes: vec![0xde, 0xad],
        };
        assert!(classify_upload(&state, Some(bad)).is_err());
        assert_eq!(state.store.list_all(), vec![kept]);
    }
}
