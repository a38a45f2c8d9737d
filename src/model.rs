// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Gesture model loading and forward passes.
//!
//! [`GestureModel`] is the seam between the classifier and the network. The
//! production implementation, [`OnnxGestureModel`], wraps an ONNX Runtime session.

use std::collections::HashMap;
use std::path::Path;

use ndarray::Array2;
#[cfg(feature = "coreml")]
use ort::execution_providers::CoreMLExecutionProvider;
#[cfg(feature = "cuda")]
use ort::execution_providers::CUDAExecutionProvider;
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use ort::value::TensorRef;
use tracing::debug;

use crate::error::{GestureError, Result};
use crate::metadata::{METADATA_KEYS, ModelMetadata};
use crate::preprocessing::FRAME_INPUT_LEN;

/// A feed-forward gesture network.
pub trait GestureModel: Send {
    /// Number of input values per forward pass.
    fn input_len(&self) -> usize;

    /// Run one forward pass over a `(1, input_len)` row and return the raw output.
    ///
    /// # Errors
    ///
    /// Returns `InferenceError` if the pass fails.
    fn forward(&mut self, input: &Array2<f32>) -> Result<Vec<f32>>;

    /// Frames consumed per inference.
    fn frames_per_gesture(&self) -> usize {
        self.input_len() / FRAME_INPUT_LEN
    }
}

/// Gesture classifier backed by ONNX Runtime.
///
/// # Example
///
/// ```no_run
/// use hand_gesture_inference::OnnxGestureModel;
///
/// let model = OnnxGestureModel::load("gesture.onnx")?;
/// println!("{} frames per gesture", model.metadata().frames_per_gesture);
/// # Ok::<(), hand_gesture_inference::GestureError>(())
/// ```
pub struct OnnxGestureModel {
    session: Session,
    metadata: ModelMetadata,
    input_name: String,
    input_len: usize,
    output_names: Vec<String>,
}

impl OnnxGestureModel {
    /// Load a gesture model, letting ONNX Runtime pick the thread count.
    ///
    /// # Errors
    ///
    /// Returns `ModelLoadError` if the file doesn't exist or can't be loaded.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_with_threads(path, 0)
    }

    /// Load a gesture model and run one warmup pass.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the ONNX model file.
    /// * `num_threads` - Intra-op threads, `0` for auto-configuration.
    ///
    /// # Errors
    ///
    /// Returns `ModelLoadError` if the file doesn't exist, can't be loaded, has no
    /// outputs or fails the warmup pass.
    pub fn load_with_threads<P: AsRef<Path>>(path: P, num_threads: usize) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(GestureError::ModelLoadError(format!(
                "Model file not found: {}",
                path.display()
            )));
        }

        #[allow(unused_mut)]
        let mut builder = Session::builder()
            .map_err(|e| GestureError::ModelLoadError(format!("Failed to create session builder: {e}")))?;

        #[cfg(feature = "coreml")]
        {
            builder = builder
                .with_execution_providers([CoreMLExecutionProvider::default().build()])
                .map_err(|e| GestureError::ModelLoadError(format!("Failed to register CoreML EP: {e}")))?;
        }

        #[cfg(feature = "cuda")]
        {
            builder = builder
                .with_execution_providers([CUDAExecutionProvider::default().build()])
                .map_err(|e| GestureError::ModelLoadError(format!("Failed to register CUDA EP: {e}")))?;
        }

        let session = builder
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| GestureError::ModelLoadError(format!("Failed to set optimization level: {e}")))?
            .with_intra_threads(num_threads)
            .map_err(|e| GestureError::ModelLoadError(format!("Failed to set intra-thread count: {e}")))?
            .commit_from_file(path)
            .map_err(|e| GestureError::ModelLoadError(format!("Failed to load model: {e}")))?;

        let mut metadata = Self::extract_metadata(&session)?;
        metadata.validate_labels()?;

        let input = session.inputs.first();
        let input_name = input.map_or_else(|| "input".to_string(), |i| i.name.clone());
        let dims: Option<Vec<i64>> = input
            .and_then(|i| i.input_type.tensor_shape())
            .map(|shape| shape.iter().copied().collect());
        metadata.frames_per_gesture = resolve_frames_per_gesture(dims.as_deref(), metadata.frames_per_gesture)?;
        let output_names: Vec<String> = session.outputs.iter().map(|o| o.name.clone()).collect();
        if output_names.is_empty() {
            return Err(GestureError::ModelLoadError("Model has no outputs".to_string()));
        }

        let mut model = Self {
            session,
            input_len: metadata.frames_per_gesture * FRAME_INPUT_LEN,
            metadata,
            input_name,
            output_names,
        };
        model
            .warmup()
            .map_err(|e| GestureError::ModelLoadError(format!("Warmup failed: {e}")))?;
        Ok(model)
    }

    fn warmup(&mut self) -> Result<()> {
        let dummy = Array2::<f32>::zeros((1, self.input_len()));
        self.forward(&dummy).map(|_| ())
    }

    fn extract_metadata(session: &Session) -> Result<ModelMetadata> {
        let model_metadata = session
            .metadata()
            .map_err(|e| GestureError::ModelLoadError(format!("Failed to get model metadata: {e}")))?;

        let mut metadata_map: HashMap<String, String> = HashMap::new();
        for key in METADATA_KEYS.iter().chain(std::iter::once(&"metadata")) {
            if let Ok(Some(value)) = model_metadata.custom(key) {
                metadata_map.insert((*key).to_string(), value);
            }
        }

        if metadata_map.is_empty() {
            return Ok(ModelMetadata::default());
        }
        ModelMetadata::from_onnx_metadata(&metadata_map)
    }

    #[must_use]
    pub const fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

impl GestureModel for OnnxGestureModel {
    fn input_len(&self) -> usize {
        self.input_len
    }

    fn forward(&mut self, input: &Array2<f32>) -> Result<Vec<f32>> {
        let input_contiguous = input.as_standard_layout();
        let input_tensor = TensorRef::from_array_view(&input_contiguous)
            .map_err(|e| GestureError::InferenceError(format!("Failed to create input tensor: {e}")))?;

        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];
        let outputs = self
            .session
            .run(inputs)
            .map_err(|e| GestureError::InferenceError(format!("Inference failed: {e}")))?;

        let output_name = &self.output_names[0];
        let output = outputs
            .get(output_name.as_str())
            .ok_or_else(|| GestureError::InferenceError(format!("Output '{output_name}' not found")))?;

        let (_, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| GestureError::InferenceError(format!("Failed to extract output: {e}")))?;

        Ok(data.to_vec())
    }

    fn frames_per_gesture(&self) -> usize {
        self.metadata.frames_per_gesture
    }
}

/// Frames per inference from the model's input dimensions.
///
/// The batch axis is skipped and the remaining axes must multiply to a whole number of
/// frames. When any of them is dynamic the declared `fallback` is used instead.
///
/// # Errors
///
/// Returns `ModelLoadError` if the static input length is not a positive multiple of
/// [`FRAME_INPUT_LEN`].
pub fn resolve_frames_per_gesture(dims: Option<&[i64]>, fallback: usize) -> Result<usize> {
    let Some(dims) = dims else {
        return Ok(fallback);
    };
    let frame_axes = if dims.len() > 1 { &dims[1..] } else { dims };
    if frame_axes.is_empty() || frame_axes.iter().any(|&d| d <= 0) {
        debug!(?dims, fallback, "dynamic input shape, using declared frames per gesture");
        return Ok(fallback);
    }

    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    let len = frame_axes.iter().product::<i64>() as usize;
    if len % FRAME_INPUT_LEN != 0 {
        return Err(GestureError::ModelLoadError(format!(
            "Model input length {len} is not a multiple of {FRAME_INPUT_LEN} values per frame"
        )));
    }
    let frames = len / FRAME_INPUT_LEN;
    if frames != fallback {
        debug!(frames, declared = fallback, "input shape overrides declared frames per gesture");
    }
    Ok(frames)
}

impl std::fmt::Debug for OnnxGestureModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxGestureModel")
            .field("input", &self.input_name)
            .field("frames_per_gesture", &self.metadata.frames_per_gesture)
            .field("num_labels", &self.metadata.num_labels())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedModel {
        frames: usize,
    }

    impl GestureModel for FixedModel {
        fn input_len(&self) -> usize {
            self.frames * FRAME_INPUT_LEN
        }

        fn forward(&mut self, input: &Array2<f32>) -> Result<Vec<f32>> {
            Ok(vec![input.sum()])
        }
    }

    #[test]
    fn test_model_not_found() {
        let result = OnnxGestureModel::load("nonexistent.onnx");
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), GestureError::ModelLoadError(_)));
    }

    #[test]
    fn test_frames_resolved_from_input_shape() {
        assert_eq!(resolve_frames_per_gesture(Some(&[1, 208][..]), 5).unwrap(), 4);
        assert_eq!(resolve_frames_per_gesture(Some(&[-1, 260][..]), 3).unwrap(), 5);
        assert_eq!(resolve_frames_per_gesture(Some(&[1, 8, 52][..]), 5).unwrap(), 8);
        assert_eq!(resolve_frames_per_gesture(Some(&[416][..]), 5).unwrap(), 8);
    }

    #[test]
    fn test_dynamic_input_shape_uses_declared_frames() {
        assert_eq!(resolve_frames_per_gesture(Some(&[1, -1][..]), 6).unwrap(), 6);
        assert_eq!(resolve_frames_per_gesture(Some(&[1, 0][..]), 5).unwrap(), 5);
        assert_eq!(resolve_frames_per_gesture(None, 5).unwrap(), 5);
    }

    #[test]
    fn test_input_shape_not_whole_frames() {
        let err = resolve_frames_per_gesture(Some(&[1, 100][..]), 5).unwrap_err();
        assert!(matches!(err, GestureError::ModelLoadError(_)));
    }

    #[test]
    fn test_frames_per_gesture_from_input_len() {
        let model = FixedModel { frames: 4 };
        assert_eq!(model.input_len(), 208);
        assert_eq!(model.frames_per_gesture(), 4);
    }
}
