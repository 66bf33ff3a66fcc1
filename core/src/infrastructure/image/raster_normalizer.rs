use image::{DynamicImage, codecs::jpeg::JpegEncoder, imageops::FilterType};

use crate::domain::{
    common::entities::app_errors::CoreError,
    image::{
        entities::{EncodedImage, RawImage},
        ports::ImageNormalizer,
        value_objects::NormalizeOptions,
    },
};

const OUTPUT_MIME_TYPE: &str = "image/jpeg";

/// Decodes any format the `image` crate knows and re-encodes it as JPEG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterImageNormalizer;

impl RasterImageNormalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize_blocking(
        raw: &RawImage,
        options: NormalizeOptions,
    ) -> Result<EncodedImage, CoreError> {
        options.validate()?;
        if raw.is_empty() {
            return Err(CoreError::ImageDecode("image is empty".to_string()));
        }

        let decoded = image::load_from_memory(&raw.bytes)
            .map_err(|e| CoreError::ImageDecode(e.to_string()))?;
        let (width, height) = options.target_dimensions(decoded.width(), decoded.height());

        let resized = if (width, height) != (decoded.width(), decoded.height()) {
            decoded.resize_exact(width, height, FilterType::Lanczos3)
        } else {
            decoded
        };
        // JPEG has no alpha channel.
        let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());

        let mut buffer = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, options.jpeg_quality());
        rgb.write_with_encoder(encoder)
            .map_err(|e| CoreError::ImageDecode(format!("failed to re-encode image: {e}")))?;

        Ok(EncodedImage::new(
            OUTPUT_MIME_TYPE,
            &buffer,
            width,
            height,
            raw.len(),
        ))
    }
}

impl ImageNormalizer for RasterImageNormalizer {
    async fn normalize(
        &self,
        raw: RawImage,
        options: NormalizeOptions,
    ) -> Result<EncodedImage, CoreError> {
        tokio::task::spawn_blocking(move || Self::normalize_blocking(&raw, options))
            .await
            .map_err(|e| {
                tracing::error!("image normalization task failed: {}", e);
                CoreError::ImageDecode(format!("normalization task failed: {e}"))
            })?
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{ImageFormat, Rgba, RgbaImage};

    use super::*;

    fn png(width: u32, height: u32) -> RawImage {
        let img = RgbaImage::from_pixel(width, height, Rgba([34, 139, 34, 200]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        RawImage::new(bytes, "image/png")
    }

    #[test]
    fn test_large_image_is_downscaled_to_jpeg() {
        let raw = png(1600, 900);
        let encoded =
            RasterImageNormalizer::normalize_blocking(&raw, NormalizeOptions::new(800, 0.7))
                .unwrap();

        assert_eq!((encoded.width(), encoded.height()), (800, 450));
        assert_eq!(encoded.mime_type(), "image/jpeg");
        assert!(encoded.data_url().starts_with("data:image/jpeg;base64,"));

        let decoded = image::load_from_memory(&encoded.decode_payload().unwrap()).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (800, 450));
    }

    #[test]
    fn test_small_image_is_not_upscaled() {
        let raw = png(120, 300);
        let encoded =
            RasterImageNormalizer::normalize_blocking(&raw, NormalizeOptions::default()).unwrap();

        assert_eq!((encoded.width(), encoded.height()), (120, 300));
        assert_eq!(encoded.original_bytes(), raw.len());
    }

    #[test]
    fn test_garbage_is_a_decode_error() {
        let raw = RawImage::new(b"definitely not an image".to_vec(), "image/png");
        let result = RasterImageNormalizer::normalize_blocking(&raw, NormalizeOptions::default());
        assert!(matches!(result, Err(CoreError::ImageDecode(_))));
    }

    #[test]
    fn test_invalid_options_are_rejected() {
        let result =
            RasterImageNormalizer::normalize_blocking(&png(4, 4), NormalizeOptions::new(0, 0.9));
        assert!(matches!(result, Err(CoreError::Invalid(_))));
    }

    #[tokio::test]
    async fn test_async_normalize_runs_off_the_runtime() {
        let encoded = RasterImageNormalizer::new()
            .normalize(png(10, 10), NormalizeOptions::default())
            .await
            .unwrap();
        assert_eq!(encoded.width(), 10);
    }
}
