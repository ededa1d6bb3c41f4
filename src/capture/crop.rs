//! Crop/resize collaborator

use async_trait::async_trait;
use image::imageops::{self, FilterType};

use super::image::CapturedImage;
use crate::domain::CropRegion;
use crate::error::CaptureError;

/// Materializes a crop region, optionally scaling the result down
#[async_trait]
pub trait ImageCropper: Send + Sync {
    async fn crop(
        &self,
        image: &CapturedImage,
        region: CropRegion,
        max_dimension: Option<u32>,
    ) -> Result<CapturedImage, CaptureError>;
}

/// Cropper backed by `image::imageops`, run on the blocking pool
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageOpsCropper;

#[async_trait]
impl ImageCropper for ImageOpsCropper {
    async fn crop(
        &self,
        image: &CapturedImage,
        region: CropRegion,
        max_dimension: Option<u32>,
    ) -> Result<CapturedImage, CaptureError> {
        let image = image.clone();
        tokio::task::spawn_blocking(move || crop_and_fit(&image, region, max_dimension)).await?
    }
}

fn crop_and_fit(
    image: &CapturedImage,
    region: CropRegion,
    max_dimension: Option<u32>,
) -> Result<CapturedImage, CaptureError> {
    let region = region.clipped_to(image.width(), image.height());
    if region.is_empty() {
        return Err(CaptureError::CropFailed(format!(
            "empty region {:?} on {}x{} image",
            region,
            image.width(),
            image.height()
        )));
    }

    let cropped = imageops::crop_imm(
        image.rgba(),
        region.origin_x,
        region.origin_y,
        region.width,
        region.height,
    )
    .to_image();

    let cropped = match max_dimension {
        Some(max) if max > 0 && cropped.width().max(cropped.height()) > max => {
            let (width, height) = fit_within(cropped.width(), cropped.height(), max);
            imageops::resize(&cropped, width, height, FilterType::Triangle)
        }
        _ => cropped,
    };

    log::debug!(
        "Cropped {:?} to {}x{}",
        region,
        cropped.width(),
        cropped.height()
    );
    Ok(CapturedImage::from_rgba(cropped))
}

/// Scale `width` x `height` so the longest side equals `max`, keeping aspect ratio
fn fit_within(width: u32, height: u32, max: u32) -> (u32, u32) {
    let longest = width.max(height) as f64;
    let scale = max as f64 / longest;
    let scaled = |side: u32| ((side as f64 * scale).round() as u32).max(1);
    (scaled(width), scaled(height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn quadrants() -> CapturedImage {
        let mut rgba = RgbaImage::from_pixel(100, 80, Rgba([0, 0, 255, 255]));
        for x in 50..100 {
            for y in 40..80 {
                rgba.put_pixel(x, y, Rgba([255, 0, 0, 255]));
            }
        }
        CapturedImage::from_rgba(rgba)
    }

    #[tokio::test]
    async fn test_crop_extracts_region() {
        let region = CropRegion {
            origin_x: 50,
            origin_y: 40,
            width: 50,
            height: 40,
        };
        let cropped = ImageOpsCropper
            .crop(&quadrants(), region, None)
            .await
            .unwrap();
        assert_eq!((cropped.width(), cropped.height()), (50, 40));
        assert_eq!(cropped.rgba().get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
    }

    #[tokio::test]
    async fn test_crop_scales_down_to_target() {
        let cropped = ImageOpsCropper
            .crop(&quadrants(), CropRegion::full(100, 80), Some(50))
            .await
            .unwrap();
        assert_eq!((cropped.width(), cropped.height()), (50, 40));
    }

    #[tokio::test]
    async fn test_region_outside_image_is_rejected() {
        let region = CropRegion {
            origin_x: 100,
            origin_y: 0,
            width: 10,
            height: 10,
        };
        let err = ImageOpsCropper
            .crop(&quadrants(), region, None)
            .await
            .unwrap_err();
        assert!(matches!(err, CaptureError::CropFailed(_)));
    }

    #[test]
    fn test_fit_within_keeps_aspect() {
        assert_eq!(fit_within(3000, 1500, 1024), (1024, 512));
        assert_eq!(fit_within(10, 4000, 100), (1, 100));
    }
}
