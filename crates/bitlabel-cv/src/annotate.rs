//! High-level annotation pipeline
//!
//! Ties the decoder, region extractor and emitter together the way a
//! dataset builder consumes them: one packed capture in, the visible
//! quadrant plus its normalized annotations out.

use std::path::Path;

use anyhow::Context;
use bitlabel_core::{Annotation, ModifierSet, OutputFormat, ParseError};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use serde::{Deserialize, Serialize};

use crate::decoder::decode_bitplanes;
use crate::error::DecodeError;
use crate::regions::{Region, extract_regions};

const OVERLAY_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Pipeline configuration, constructed explicitly by the caller.
/// Filename-encoded modifiers enter only through [`AnnotateConfig::from_identifier`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotateConfig {
    pub format: OutputFormat,
    /// Regions with normalized area at or below this are discarded.
    pub area_threshold: f64,
    pub modifiers: ModifierSet,
    /// Draw the retained boxes onto the returned visible quadrant. Never
    /// affects the annotation list.
    pub debug_draw: bool,
}

impl Default for AnnotateConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Center,
            area_threshold: 0.0,
            modifiers: ModifierSet::default(),
            debug_draw: false,
        }
    }
}

impl AnnotateConfig {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    /// Boundary adapter: pick up `.s`/`.mN`/`.eN`/`.dN` modifiers encoded
    /// in a source identifier (typically the file stem).
    pub fn from_identifier(identifier: &str, format: OutputFormat) -> Result<Self, ParseError> {
        Ok(Self {
            format,
            modifiers: ModifierSet::parse(identifier)?,
            ..Self::default()
        })
    }
}

/// Decode a packed bitplane capture into its visible quadrant and the
/// annotations of every entity present.
pub fn annotate_image(
    image: &RgbImage,
    config: &AnnotateConfig,
) -> Result<(RgbImage, Vec<Annotation>), DecodeError> {
    let (mut visible, raster) = decode_bitplanes(image)?;
    let regions = extract_regions(&raster, &config.modifiers, config.area_threshold)?;

    let (quad_width, quad_height) = visible.dimensions();
    let mut annotations = Vec::with_capacity(regions.len());
    for region in &regions {
        if config.debug_draw {
            draw_region_rect(&mut visible, region);
        }
        annotations.push(Annotation::from_rect(
            region.entity_id,
            region.rect,
            quad_width,
            quad_height,
            config.format,
        ));
    }

    Ok((visible, annotations))
}

/// Load an image file and annotate it, deriving modifiers from its stem.
pub fn annotate_file<P: AsRef<Path>>(
    path: P,
    format: OutputFormat,
    area_threshold: f64,
) -> crate::Result<(RgbImage, Vec<Annotation>)> {
    let path = path.as_ref();
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut config = AnnotateConfig::from_identifier(&stem, format)
        .with_context(|| format!("Bad modifier suffix in {:?}", path))?;
    config.area_threshold = area_threshold;

    let image = image::open(path)
        .with_context(|| format!("Failed to open image: {:?}", path))?
        .to_rgb8();

    let result = annotate_image(&image, &config)
        .with_context(|| format!("Failed to annotate {:?}", path))?;
    Ok(result)
}

fn draw_region_rect(canvas: &mut RgbImage, region: &Region) {
    let rect = Rect::at(region.rect.x as i32, region.rect.y as i32)
        .of_size(region.rect.width.max(1), region.rect.height.max(1));
    draw_hollow_rect_mut(canvas, rect, OVERLAY_COLOR);
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    /// One entity encoded in the red channel of all three planes over the
    /// same quadrant region: bits 8, 5 and 2 -> ID 292.
    fn red_capture() -> RgbImage {
        let mut image = RgbImage::new(200, 200);
        for &(ox, oy) in &[(100, 0), (0, 100), (100, 100)] {
            for y in 20..60 {
                for x in 20..60 {
                    image.put_pixel(ox + x, oy + y, Rgb([255, 0, 0]));
                }
            }
        }
        image
    }

    #[test]
    fn test_annotate_image_default_modifiers() {
        let capture = red_capture();
        let config = AnnotateConfig::new(OutputFormat::Center);
        let (visible, annotations) = annotate_image(&capture, &config).unwrap();

        assert_eq!(visible.dimensions(), (100, 100));
        assert_eq!(annotations.len(), 1);
        let a = annotations[0];
        assert_eq!(a.entity_id, 292);
        // close(32) shifts the 40px square to [21, 60], erode(4) trims to
        // [23, 59], dilate(8) grows to [20, 63]: a 44px box at 20.
        assert_eq!(a.x, 0.42);
        assert_eq!(a.y, 0.42);
        assert_eq!(a.width, 0.44);
        assert_eq!(a.height, 0.44);
    }

    #[test]
    fn test_annotate_image_is_single_invariant_for_one_region() {
        let capture = red_capture();
        let mut config = AnnotateConfig::new(OutputFormat::Center);
        let (_, multi) = annotate_image(&capture, &config).unwrap();
        config.modifiers.is_single = true;
        let (_, single) = annotate_image(&capture, &config).unwrap();
        assert_eq!(multi, single);
    }

    #[test]
    fn test_annotate_image_unit_kernels_exact_box() {
        let capture = red_capture();
        let mut config = AnnotateConfig::new(OutputFormat::Bbox);
        config.modifiers = ModifierSet {
            is_single: false,
            morph_close_ksize: 1,
            erode_ksize: 1,
            dilate_ksize: 1,
        };
        let (_, annotations) = annotate_image(&capture, &config).unwrap();
        assert_eq!(annotations.len(), 1);
        let a = annotations[0];
        assert_eq!((a.x, a.y, a.width, a.height), (0.20, 0.20, 0.40, 0.40));
    }

    #[test]
    fn test_debug_draw_does_not_change_annotations() {
        let capture = red_capture();
        let mut config = AnnotateConfig::new(OutputFormat::Center);
        let (plain_visible, plain) = annotate_image(&capture, &config).unwrap();
        config.debug_draw = true;
        let (drawn_visible, drawn) = annotate_image(&capture, &config).unwrap();

        assert_eq!(plain, drawn);
        assert_ne!(plain_visible, drawn_visible);
    }

    #[test]
    fn test_from_identifier_adapter() {
        let config = AnnotateConfig::from_identifier("frame-07.m16.e2", OutputFormat::Bbox).unwrap();
        assert_eq!(config.modifiers.morph_close_ksize, 16);
        assert_eq!(config.modifiers.erode_ksize, 2);
        assert!(AnnotateConfig::from_identifier("frame.mbad", OutputFormat::Bbox).is_err());
    }
}
