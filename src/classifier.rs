use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use ndarray::ArrayViewD;

use crate::error::ClassifyError;

/// Class vocabulary the bundled model was trained on. Order matters: it
/// indexes the model's output vector, so changing it means retraining, not
/// reconfiguring.
pub const DEFAULT_LABELS: [&str; 5] = ["Kaca", "Kardus", "Kertas", "Organik", "Plastik"];

/// The opaque inference capability: a normalized `[1, H, W, C]` tensor in,
/// one score per vocabulary entry out.
///
/// Implemented by the ONNX session wrapper in production and by deterministic
/// stubs in tests, so orchestration and store logic never depend on a real
/// model artifact.
pub trait Infer: Send + Sync {
    fn infer(&self, input: ArrayViewD<'_, f32>) -> Result<Vec<f32>, ClassifyError>;
}

/// Load a label vocabulary from a file with one label per line.
///
/// Blank lines are skipped; surrounding whitespace is trimmed.
pub fn load_labels(path: impl AsRef<Path>) -> Result<Vec<String>, ClassifyError> {
    let file = File::open(path.as_ref())
        .map_err(|e| ClassifyError::Config(format!("labels file: {e}")))?;
    let reader = BufReader::new(file);

    let mut labels = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(|e| ClassifyError::Config(format!("labels file: {e}")))?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            labels.push(trimmed.to_string());
        }
    }
    if labels.is_empty() {
        return Err(ClassifyError::Config("labels file is empty".into()));
    }
    Ok(labels)
}

/// Index and value of the maximum score. Ties go to the lowest index; an
/// empty slice yields `None`.
pub(crate) fn argmax(scores: &[f32]) -> Option<(usize, f32)> {
    if scores.is_empty() {
        return None;
    }
    Some(
        scores
            .iter()
            .enumerate()
            .fold((0, f32::NEG_INFINITY), |(max_idx, max_val), (i, &val)| {
                if val > max_val { (i, val) } else { (max_idx, max_val) }
            }),
    )
}

/// Maps normalized image tensors to a label and a confidence via an injected
/// inference backend.
pub struct Classifier {
    backend: Box<dyn Infer>,
    labels: Vec<String>,
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("labels", &self.labels)
            .finish_non_exhaustive()
    }
}

impl Classifier {
    pub fn new(backend: Box<dyn Infer>, labels: Vec<String>) -> Result<Self, ClassifyError> {
        if labels.is_empty() {
            return Err(ClassifyError::Config("label vocabulary is empty".into()));
        }
        Ok(Self { backend, labels })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Run inference and arg-max the resulting score vector.
    ///
    /// Confidence is the raw maximum score; no renormalization happens here.
    pub fn classify(&self, input: ArrayViewD<'_, f32>) -> Result<(String, f32), ClassifyError> {
        let scores = self.backend.infer(input)?;
        if scores.len() != self.labels.len() {
            return Err(ClassifyError::inference(format!(
                "model produced {} scores for {} labels",
                scores.len(),
                self.labels.len()
            )));
        }
        let (index, confidence) = argmax(&scores)
            .ok_or_else(|| ClassifyError::inference("model produced an empty score vector"))?;
        Ok((self.labels[index].clone(), confidence))
    }
}
