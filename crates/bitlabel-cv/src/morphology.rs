//! Binary morphology with square structuring elements
//!
//! Masks are binary with threshold `> 0`; outputs are `0` or `255`.
//! Kernels are `k x k` squares anchored at `(k/2, k/2)`, so the window at
//! `x` covers `x - k/2 ..= x + k - 1 - k/2`. Out-of-bounds samples are
//! skipped, which leaves erosion anchored on foreground at the image border
//! and dilation on background (constant-border behavior).

use image::{GrayImage, Luma};

use crate::error::DecodeError;

const FG: u8 = 255;

#[derive(Clone, Copy)]
enum Axis {
    X,
    Y,
}

/// Grow foreground by the kernel extent.
pub fn dilate(mask: &GrayImage, ksize: u32) -> Result<GrayImage, DecodeError> {
    let k = check_ksize(ksize)?;
    let rows = axis_pass(mask, k, Axis::X, true);
    Ok(axis_pass(&rows, k, Axis::Y, true))
}

/// Shrink foreground by the kernel extent.
pub fn erode(mask: &GrayImage, ksize: u32) -> Result<GrayImage, DecodeError> {
    let k = check_ksize(ksize)?;
    let rows = axis_pass(mask, k, Axis::X, false);
    Ok(axis_pass(&rows, k, Axis::Y, false))
}

/// Close: dilate then erode with the same kernel, consolidating gaps and
/// holes up to the kernel size.
pub fn close(mask: &GrayImage, ksize: u32) -> Result<GrayImage, DecodeError> {
    let dilated = dilate(mask, ksize)?;
    erode(&dilated, ksize)
}

pub(crate) fn check_ksize(ksize: u32) -> Result<u32, DecodeError> {
    if ksize == 0 {
        return Err(DecodeError::InvalidKernelSize(ksize));
    }
    Ok(ksize)
}

/// One separable pass: any-set (dilate) or all-set (erode) over a `k`-wide
/// window along the axis. A square kernel decomposes into the two passes.
fn axis_pass(src: &GrayImage, k: u32, axis: Axis, dilating: bool) -> GrayImage {
    let (width, height) = src.dimensions();
    let anchor = (k / 2) as i64;
    let mut out = GrayImage::new(width, height);

    for y in 0..height {
        for x in 0..width {
            let mut hit = !dilating;
            for offset in -anchor..(k as i64 - anchor) {
                let (nx, ny) = match axis {
                    Axis::X => (x as i64 + offset, y as i64),
                    Axis::Y => (x as i64, y as i64 + offset),
                };
                if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                    continue;
                }
                let set = src.get_pixel(nx as u32, ny as u32)[0] > 0;
                if dilating && set {
                    hit = true;
                    break;
                }
                if !dilating && !set {
                    hit = false;
                    break;
                }
            }
            out.put_pixel(x, y, Luma([if hit { FG } else { 0 }]));
        }
    }

    out
}
