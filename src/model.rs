use std::sync::Mutex;

use ndarray::{ArrayViewD, CowArray};
use ort::execution_providers::{CPUExecutionProvider, CUDAExecutionProvider};
use ort::session::Session;
use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};

use crate::classifier::Infer;
use crate::error::ClassifyError;

/// Builds ONNX Runtime sessions with the configured execution provider.
pub struct OnnxModel {
    provider: [ort::execution_providers::ExecutionProviderDispatch; 1],
}

impl OnnxModel {
    pub fn new(cuda: bool) -> Self {
        let provider = if cuda {
            [CUDAExecutionProvider::default().build().error_on_failure()]
        } else {
            [CPUExecutionProvider::default().build()]
        };
        Self { provider }
    }

    pub fn load_model(&self, model_path: &str) -> Result<Session, ClassifyError> {
        let session = SessionBuilder::new()
            .and_then(|b| b.with_execution_providers(self.provider.clone()))
            .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level3))
            .and_then(|b| b.commit_from_file(model_path))
            .map_err(|e| ClassifyError::Config(format!("model load from {model_path}: {e}")))?;
        Ok(session)
    }
}

/// [`Infer`] backed by a loaded ONNX session.
///
/// The session lives for the whole process. Runs are serialized behind a
/// mutex; whether the runtime could handle concurrent runs depends on the
/// provider, so the conservative choice holds here.
pub struct OnnxBackend {
    session: Mutex<Session>,
}

impl OnnxBackend {
    pub fn new(session: Session) -> Self {
        Self {
            session: Mutex::new(session),
        }
    }
}

impl Infer for OnnxBackend {
    fn infer(&self, input: ArrayViewD<'_, f32>) -> Result<Vec<f32>, ClassifyError> {
        let input = CowArray::from(input);
        let inputs = ort::inputs![input.view()].map_err(|e| ClassifyError::inference(e))?;

        let session = self
            .session
            .lock()
            .map_err(|_| ClassifyError::inference("inference session lock poisoned"))?;
        let outputs = session
            .run(inputs)
            .map_err(|e| ClassifyError::inference(e))?;

        let (_, value) = outputs
            .iter()
            .next()
            .ok_or_else(|| ClassifyError::inference("model produced no outputs"))?;
        let scores = value
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifyError::inference(e))?;
        Ok(scores.iter().copied().collect())
    }
}
