use crate::models::Quadrilateral;
use crate::processing::geometry::QuadCorrector;
use crate::utils::{MrzError, Result};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, GrayImage, Luma, RgbImage};
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};
use log::{debug, trace};
use std::path::Path;

/// Rectified crops larger than this multiple of the frame are treated as a
/// bad detection rather than allocated.
const MAX_CROP_SCALE: f32 = 4.0;

pub struct ImageProcessor;

impl ImageProcessor {
    pub fn load(image_path: &Path) -> Result<DynamicImage> {
        debug!("Loading frame from {:?}", image_path);
        Ok(image::open(image_path)?)
    }

    /// Rotates a camera frame upright and keeps its centered square, the
    /// region the detector is run on.
    pub fn prepare_frame(frame: &DynamicImage, rotation_degrees: u32) -> Result<DynamicImage> {
        let rotated = Self::rotate(frame, rotation_degrees)?;
        Ok(Self::crop_to_center_square(&rotated))
    }

    pub fn rotate(frame: &DynamicImage, degrees: u32) -> Result<DynamicImage> {
        match degrees % 360 {
            0 => Ok(frame.clone()),
            90 => Ok(frame.rotate90()),
            180 => Ok(frame.rotate180()),
            270 => Ok(frame.rotate270()),
            other => Err(MrzError::Config(format!(
                "frame rotation must be a multiple of 90 degrees, got {}",
                other
            ))),
        }
    }

    pub fn crop_to_center_square(frame: &DynamicImage) -> DynamicImage {
        let (width, height) = frame.dimensions();
        let size = width.min(height);
        let x = (width - size) / 2;
        let y = (height - size) / 2;
        frame.crop_imm(x, y, size, size)
    }

    /// Resizes the square crop to the detector's input resolution.
    pub fn model_input(square: &DynamicImage, width: u32, height: u32) -> RgbImage {
        square
            .resize_exact(width, height, FilterType::Triangle)
            .to_rgb8()
    }

    /// Warps the quadrilateral onto an axis-aligned rectangle sized by its
    /// longer opposite edges.
    pub fn rectify(image: &GrayImage, quad: &Quadrilateral) -> Result<GrayImage> {
        let (width, height) = QuadCorrector::crop_size(quad);
        let (out_w, out_h) = (width.round(), height.round());
        let limit = MAX_CROP_SCALE * image.width().max(image.height()) as f32;
        if out_w < 1.0 || out_h < 1.0 || out_w > limit || out_h > limit {
            return Err(MrzError::InvalidCrop { width, height });
        }

        let from = quad.corners().map(|p| (p.x, p.y));
        let to = [(0.0, 0.0), (out_w, 0.0), (out_w, out_h), (0.0, out_h)];
        let projection = Projection::from_control_points(from, to).ok_or_else(|| {
            MrzError::DegenerateGeometry(format!("no projection for corners {:?}", from))
        })?;

        let mut out = GrayImage::new(out_w as u32, out_h as u32);
        warp_into(
            image,
            &projection,
            Interpolation::Bilinear,
            Luma([0u8]),
            &mut out,
        );
        trace!("Rectified crop {}x{}", out.width(), out.height());
        Ok(out)
    }

    /// Like [`ImageProcessor::rectify`], but an unusable crop size falls back
    /// to the whole frame.
    pub fn rectify_or_whole(image: &GrayImage, quad: &Quadrilateral) -> Result<GrayImage> {
        match Self::rectify(image, quad) {
            Err(MrzError::InvalidCrop { width, height }) => {
                debug!(
                    "Crop {}x{} rejected, using the whole frame",
                    width, height
                );
                Ok(image.clone())
            }
            other => other,
        }
    }
}
