//! Layer-stack decoding
//!
//! The alternate capture format stores a background frame followed by one
//! nonzero-pixel mask frame per appearance of a single entity. The entity
//! ID rides in the source identifier as an `iN` segment; every annotation
//! of the stack shares it.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use bitlabel_core::{Annotation, OutputFormat, PixelRect, modifiers};
use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, DynamicImage, GrayImage, Luma, RgbImage};

use crate::error::DecodeError;
use crate::regions::external_contours;

/// Annotate a decoded layer stack: frame 0 is the background, every later
/// frame is a mask for the identifier's entity.
pub fn annotate_layers(
    frames: &[RgbImage],
    identifier: &str,
    format: OutputFormat,
) -> Result<(RgbImage, Vec<Annotation>), DecodeError> {
    if frames.len() < 2 {
        return Err(DecodeError::InsufficientLayers(frames.len()));
    }
    let entity_id = modifiers::parse_entity_id(identifier)
        .ok_or_else(|| DecodeError::MissingIdentifier(identifier.to_string()))?;

    let background = frames[0].clone();
    let (width, height) = background.dimensions();

    let mut annotations = Vec::new();
    for layer in &frames[1..] {
        let mask = nonzero_mask(layer);
        for contour in external_contours(&mask) {
            let Some(rect) = PixelRect::bounding(contour.iter().map(|p| (p.x as u32, p.y as u32)))
            else {
                continue;
            };
            annotations.push(Annotation::from_rect(entity_id, rect, width, height, format));
        }
    }

    Ok((background, annotations))
}

/// Decode a multi-frame image file and annotate it, using the file stem as
/// the identifier.
pub fn annotate_layer_file<P: AsRef<Path>>(
    path: P,
    format: OutputFormat,
) -> Result<(RgbImage, Vec<Annotation>), DecodeError> {
    let path = path.as_ref();
    let identifier = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let file = File::open(path).map_err(image::ImageError::IoError)?;
    let decoder = GifDecoder::new(BufReader::new(file))?;
    let frames: Vec<RgbImage> = decoder
        .into_frames()
        .collect_frames()?
        .into_iter()
        .map(|frame| DynamicImage::ImageRgba8(frame.into_buffer()).to_rgb8())
        .collect();

    annotate_layers(&frames, &identifier, format)
}

/// Foreground wherever any channel is nonzero.
fn nonzero_mask(layer: &RgbImage) -> GrayImage {
    GrayImage::from_fn(layer.width(), layer.height(), |x, y| {
        let pixel = layer.get_pixel(x, y);
        Luma([if pixel.0.iter().any(|&c| c != 0) { 255 } else { 0 }])
    })
}
