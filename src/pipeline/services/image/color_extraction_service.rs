use image::DynamicImage;
use std::{
    convert::Infallible,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use crate::pipeline::types::AcquiredImage;
use tower::Service;
use tracing::debug;

pub const DEFAULT_SAMPLE_STRIDE: usize = 10;

/// Approximates an image's dominant tone as the mean of every `stride`-th pixel.
///
/// This is a sampling average, not a histogram mode. An image with a large
/// bright accent on a plain background averages toward a blend of the two
/// (a white shirt with a big blue logo comes out light blue-grey, neither
/// white nor blue). Callers that have an analyzer-reported color should
/// prefer it.
#[derive(Debug, Clone, Copy)]
pub struct ColorExtractor {
    stride: usize,
}

impl ColorExtractor {
    pub fn new() -> Self {
        Self {
            stride: DEFAULT_SAMPLE_STRIDE,
        }
    }

    pub fn with_stride(stride: usize) -> Self {
        Self {
            stride: stride.max(1),
        }
    }

    /// `None` when the bytes cannot be decoded or the image has no pixels.
    pub fn extract_from_bytes(&self, bytes: &[u8]) -> Option<String> {
        match image::load_from_memory(bytes) {
            Ok(image) => self.extract(&image),
            Err(e) => {
                debug!("Could not decode image for color extraction: {}", e);
                None
            }
        }
    }

    pub fn extract(&self, image: &DynamicImage) -> Option<String> {
        let rgb_image = image.to_rgb8();

        let mut sums = [0u64; 3];
        let mut count = 0u64;

        for px in rgb_image.pixels().step_by(self.stride) {
            sums[0] += px[0] as u64;
            sums[1] += px[1] as u64;
            sums[2] += px[2] as u64;
            count += 1;
        }

        if count == 0 {
            return None;
        }

        let [r, g, b] = sums.map(|sum| channel_mean(sum, count));
        Some(format!("#{r:02x}{g:02x}{b:02x}"))
    }
}

impl Default for ColorExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn channel_mean(sum: u64, count: u64) -> u8 {
    (sum as f64 / count as f64).round().clamp(0.0, 255.0) as u8
}

/// Enriches an acquired image with its locally extracted color. Never fails:
/// an undecodable or URL-only image simply carries no derived color.
#[derive(Debug, Clone, Default)]
pub struct ColorExtractionService {
    extractor: ColorExtractor,
}

impl ColorExtractionService {
    pub fn new(extractor: ColorExtractor) -> Self {
        Self { extractor }
    }
}

impl Service<AcquiredImage> for ColorExtractionService {
    type Response = AcquiredImage;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, mut acquired: AcquiredImage) -> Self::Future {
        acquired.derived_color = acquired
            .pixel_bytes()
            .and_then(|bytes| self.extractor.extract_from_bytes(&bytes));

        Box::pin(async move { Ok(acquired) })
    }
}
