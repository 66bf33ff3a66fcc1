use crate::domain::common::entities::app_errors::CoreError;

pub const DEFAULT_MAX_DIMENSION: u32 = 2048;
pub const DEFAULT_QUALITY: f32 = 0.95;

/// Bounds applied when re-encoding an uploaded photo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizeOptions {
    /// Longest edge of the output, in pixels.
    pub max_dimension: u32,
    /// Lossy compression factor in `(0, 1]`.
    pub quality: f32,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            max_dimension: DEFAULT_MAX_DIMENSION,
            quality: DEFAULT_QUALITY,
        }
    }
}

impl NormalizeOptions {
    pub fn new(max_dimension: u32, quality: f32) -> Self {
        Self {
            max_dimension,
            quality,
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.max_dimension == 0 {
            return Err(CoreError::Invalid(
                "max_dimension must be at least 1 pixel".to_string(),
            ));
        }
        if !(self.quality > 0.0 && self.quality <= 1.0) {
            return Err(CoreError::Invalid(format!(
                "quality must be in (0, 1], got {}",
                self.quality
            )));
        }
        Ok(())
    }

    /// Quality expressed on the 1..=100 scale JPEG encoders use.
    pub fn jpeg_quality(&self) -> u8 {
        (self.quality * 100.0).round().clamp(1.0, 100.0) as u8
    }

    /// Output size for a `width` x `height` source.
    ///
    /// Never upscales. When either edge exceeds `max_dimension`, the longer
    /// edge becomes exactly `max_dimension` and the shorter one is rounded to
    /// the nearest pixel (at least 1).
    pub fn target_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        let max = self.max_dimension;
        if width <= max && height <= max {
            return (width, height);
        }

        let scale = |edge: u32, longer: u32| -> u32 {
            let (edge, longer, max) = (u64::from(edge), u64::from(longer), u64::from(max));
            let scaled = (edge * max + longer / 2) / longer;
            scaled.max(1) as u32
        };

        if width >= height {
            (max, scale(height, width))
        } else {
            (scale(width, height), max)
        }
    }
}
