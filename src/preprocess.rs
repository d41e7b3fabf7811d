use fast_image_resize::images::Image;
use fast_image_resize::{IntoImageView, ResizeAlg, ResizeOptions, Resizer};
use image::DynamicImage;
use ndarray::Array4;

use crate::error::ClassifyError;

/// Upload extensions the service accepts, matched case-insensitively.
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

#[derive(Debug, Clone, Copy)]
pub struct PreprocessConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        // Input resolution the classifier was trained on.
        Self {
            width: 256,
            height: 256,
        }
    }
}

/// Turns raw upload bytes into the normalized tensor the model expects.
#[derive(Debug)]
pub struct Processor {
    pub config: PreprocessConfig,
}

/// Whether `filename` carries an extension from [`ALLOWED_EXTENSIONS`].
///
/// Only the part after the last dot counts, so `archive.tar.jpg` passes and
/// `photo.` does not.
pub fn allowed_extension(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ALLOWED_EXTENSIONS.iter().any(|a| a.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

impl Processor {
    pub fn new(config: PreprocessConfig) -> Self {
        Self { config }
    }

    /// Decode, normalize, and shape upload bytes into a `[1, H, W, 3]` tensor.
    ///
    /// Any source format is forced to 3-channel RGB (alpha dropped, grayscale
    /// expanded), resized to the configured resolution without preserving the
    /// aspect ratio, and scaled from `[0, 255]` to `[0.0, 1.0]`. Unusual input
    /// dimensions are never an error; corrupt or unsupported bytes are.
    pub fn preprocess(&self, bytes: &[u8]) -> Result<Array4<f32>, ClassifyError> {
        let decoded = image::load_from_memory(bytes)?;
        let rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());

        let pixel_type = rgb.pixel_type().ok_or_else(|| {
            ClassifyError::Config("RGB image has no resolvable pixel type".into())
        })?;
        let mut dst_image = Image::new(self.config.width, self.config.height, pixel_type);

        let mut resizer = Resizer::new();
        let resize_options = ResizeOptions::new().resize_alg(ResizeAlg::Nearest);
        resizer
            .resize(&rgb, &mut dst_image, Some(&resize_options))
            .map_err(|e| ClassifyError::preprocess("resize failed", e))?;

        let scaled: Vec<f32> = dst_image
            .buffer()
            .iter()
            .map(|&v| f32::from(v) / 255.0)
            .collect();

        let shape = (
            1,
            self.config.height as usize,
            self.config.width as usize,
            3,
        );
        Array4::from_shape_vec(shape, scaled)
            .map_err(|e| ClassifyError::preprocess("tensor shape mismatch", e))
    }
}
