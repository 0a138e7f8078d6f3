//! Bitplane quadrant decoding
//!
//! A packed capture is a 2x2 grid of quadrants: the top-left is the visible
//! render, the other three are auxiliary bitplane quadrants whose channel
//! signs pack a 9-bit entity ID per pixel.

use image::{GrayImage, Luma, RgbImage, imageops};
use tracing::warn;

use crate::error::DecodeError;

/// Per-pixel entity IDs reconstructed from the auxiliary quadrants.
///
/// Values are in `[0, 511]`; 0 means "no entity here" and is never reported
/// by [`EntityRaster::unique_ids`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRaster {
    width: u32,
    height: u32,
    data: Vec<u16>,
}

impl EntityRaster {
    fn zeroed(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width * height) as usize],
        }
    }

    /// Build a raster from row-major values; `None` if the length does not
    /// match the dimensions.
    pub fn from_raw(width: u32, height: u32, data: Vec<u16>) -> Option<Self> {
        if data.len() != (width * height) as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> u16 {
        self.data[(y * self.width + x) as usize]
    }

    /// Distinct nonzero IDs present in the raster, ascending.
    pub fn unique_ids(&self) -> Vec<u16> {
        let set: std::collections::BTreeSet<u16> =
            self.data.iter().copied().filter(|&v| v != 0).collect();
        set.into_iter().collect()
    }

    /// Binary mask (255/0) of the pixels carrying `id`.
    pub fn mask_of(&self, id: u16) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            Luma([if self.get(x, y) == id { 255 } else { 0 }])
        })
    }
}

/// Bit position for `(bitplane, channel)` with channels in R, G, B order:
/// bitplane 1 maps to bits 8..=6, bitplane 2 to 5..=3, bitplane 3 to 2..=0.
/// This layout is the wire contract with the data-generation side.
fn bit_shift(plane: usize, channel: usize) -> u16 {
    (8 - 3 * plane - channel) as u16
}

/// Split a packed capture into its visible quadrant and the entity-ID
/// raster encoded by the three auxiliary quadrants.
///
/// Odd dimensions are tolerated: the middle extra row/column is skipped so
/// that all four quadrants stay `w/2 x h/2`. A warning is logged because it
/// usually means the capture was resized somewhere along the way.
pub fn decode_bitplanes(image: &RgbImage) -> Result<(RgbImage, EntityRaster), DecodeError> {
    let (width, height) = image.dimensions();
    if width % 2 != 0 || height % 2 != 0 {
        warn!(
            width,
            height, "image dimensions are not divisible by two, skipping the middle row/column"
        );
    }
    let offset_x = width % 2;
    let offset_y = height % 2;
    let half_w = width / 2;
    let half_h = height / 2;

    let visible = imageops::crop_imm(image, 0, 0, half_w, half_h).to_image();
    let planes = [
        imageops::crop_imm(image, half_w + offset_x, 0, half_w, half_h).to_image(),
        imageops::crop_imm(image, 0, half_h + offset_y, half_w, half_h).to_image(),
        imageops::crop_imm(image, half_w + offset_x, half_h + offset_y, half_w, half_h).to_image(),
    ];

    let mut raster = EntityRaster::zeroed(half_w, half_h);
    for (plane_index, plane) in planes.iter().enumerate() {
        if plane.dimensions() != visible.dimensions() {
            return Err(DecodeError::DimensionMismatch {
                visible: visible.dimensions(),
                bitplane: plane.dimensions(),
            });
        }
        for (x, y, pixel) in plane.enumerate_pixels() {
            for (channel, &value) in pixel.0.iter().enumerate() {
                if value != 0 {
                    raster.data[(y * half_w + x) as usize] |=
                        1u16 << bit_shift(plane_index, channel);
                }
            }
        }
    }

    Ok((visible, raster))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    /// Packs `id` into the three auxiliary quadrants over `region`
    /// (x, y, w, h in quadrant coordinates) of a `width x height` capture.
    fn synthetic_capture(width: u32, height: u32, id: u16, region: (u32, u32, u32, u32)) -> RgbImage {
        let (half_w, half_h) = (width / 2, height / 2);
        let mut image = RgbImage::new(width, height);
        let origins = [(half_w, 0), (0, half_h), (half_w, half_h)];
        let (rx, ry, rw, rh) = region;
        for (plane, &(ox, oy)) in origins.iter().enumerate() {
            let mut channels = [0u8; 3];
            for (channel, value) in channels.iter_mut().enumerate() {
                if id & (1u16 << bit_shift(plane, channel)) != 0 {
                    *value = 255;
                }
            }
            for y in ry..ry + rh {
                for x in rx..rx + rw {
                    image.put_pixel(ox + x, oy + y, Rgb(channels));
                }
            }
        }
        image
    }

    #[test]
    fn test_raster_matches_visible_quadrant() {
        let image = RgbImage::new(64, 48);
        let (visible, raster) = decode_bitplanes(&image).unwrap();
        assert_eq!(visible.dimensions(), (32, 24));
        assert_eq!((raster.width(), raster.height()), (32, 24));
    }

    #[test]
    fn test_all_zero_planes_decode_to_zero() {
        let image = RgbImage::new(20, 20);
        let (_, raster) = decode_bitplanes(&image).unwrap();
        assert!(raster.unique_ids().is_empty());
        assert_eq!(raster.get(3, 7), 0);
    }

    #[test]
    fn test_round_trip_known_pattern() {
        // 0b101010101 exercises every plane and channel boundary.
        let id: u16 = 0b1_0101_0101;
        let image = synthetic_capture(80, 60, id, (5, 10, 12, 8));
        let (_, raster) = decode_bitplanes(&image).unwrap();

        assert_eq!(raster.unique_ids(), vec![id]);
        for y in 0..raster.height() {
            for x in 0..raster.width() {
                let inside = (5..17).contains(&x) && (10..18).contains(&y);
                assert_eq!(raster.get(x, y), if inside { id } else { 0 });
            }
        }
    }

    #[test]
    fn test_red_only_planes_give_id_292() {
        // R set in all three planes -> bits 8, 5, 2 -> 0b100100100.
        let image = synthetic_capture(40, 40, 0b1_0010_0100, (2, 2, 6, 6));
        let (_, raster) = decode_bitplanes(&image).unwrap();
        assert_eq!(raster.unique_ids(), vec![292]);
    }

    #[test]
    fn test_odd_dimensions_drop_middle() {
        let mut image = RgbImage::new(5, 4);
        // Column 2 is the dropped middle column; marking it must not leak
        // into any quadrant.
        for y in 0..4 {
            image.put_pixel(2, y, Rgb([255, 255, 255]));
        }
        let (visible, raster) = decode_bitplanes(&image).unwrap();
        assert_eq!(visible.dimensions(), (2, 2));
        assert!(raster.unique_ids().is_empty());
    }

    #[test]
    fn test_mask_of() {
        let raster = EntityRaster::from_raw(3, 1, vec![0, 9, 9]).unwrap();
        let mask = raster.mask_of(9);
        assert_eq!(mask.get_pixel(0, 0)[0], 0);
        assert_eq!(mask.get_pixel(1, 0)[0], 255);
        assert_eq!(mask.get_pixel(2, 0)[0], 255);
    }
}
