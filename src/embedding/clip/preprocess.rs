use candle_core::{DType, Device, Tensor};
use image::DynamicImage;
use image::imageops::FilterType;

use crate::embedding::error::EmbeddingError;

/// Decodes encoded image bytes, sniffing the format from the content.
pub(crate) fn decode_image(bytes: &[u8]) -> Result<DynamicImage, EmbeddingError> {
    if bytes.is_empty() {
        return Err(EmbeddingError::InvalidImage {
            reason: "empty image payload".to_string(),
        });
    }
    Ok(image::load_from_memory(bytes)?)
}

/// Resizes-to-fill a square of `size` and returns a `[1, 3, size, size]` tensor in [-1, 1].
pub(crate) fn image_to_tensor(
    img: &DynamicImage,
    size: usize,
    device: &Device,
) -> Result<Tensor, EmbeddingError> {
    let rgb = img
        .resize_to_fill(size as u32, size as u32, FilterType::Triangle)
        .to_rgb8()
        .into_raw();

    let tensor = Tensor::from_vec(rgb, (size, size, 3), device)?
        .permute((2, 0, 1))?
        .to_dtype(DType::F32)?
        .affine(2. / 255., -1.)?
        .unsqueeze(0)?;
    Ok(tensor)
}
