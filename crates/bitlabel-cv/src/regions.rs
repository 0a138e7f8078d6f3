//! Per-entity region extraction
//!
//! For every nonzero ID present in a raster: build the ID's binary mask,
//! clean it up (close, erode, dilate), trace external contours and keep the
//! ones whose normalized area clears the caller's threshold. Each ID's mask
//! is built fresh and discarded; iterations share nothing mutable.

use bitlabel_core::{ModifierSet, PixelRect};
use image::GrayImage;
use imageproc::contours::{BorderType, find_contours};
use imageproc::point::Point;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::decoder::EntityRaster;
use crate::error::DecodeError;
use crate::morphology;

/// One retained contour of an entity's cleaned-up mask.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub entity_id: u16,
    /// Boundary points of the traced contour (concatenated when the single
    /// flag merged several).
    pub points: Vec<Point<i32>>,
    /// Tight pixel bounding box of `points`.
    pub rect: PixelRect,
    /// Contour area divided by the quadrant pixel area.
    pub norm_area: f64,
}

/// Extract the retained regions of every entity in the raster, ID ascending,
/// contour discovery order within an ID.
pub fn extract_regions(
    raster: &EntityRaster,
    modifiers: &ModifierSet,
    area_threshold: f64,
) -> Result<Vec<Region>, DecodeError> {
    // Validate kernels up front so a bad modifier set fails identically on
    // an empty raster.
    for ksize in [
        modifiers.morph_close_ksize,
        modifiers.erode_ksize,
        modifiers.dilate_ksize,
    ] {
        morphology::check_ksize(ksize)?;
    }

    let ids = raster.unique_ids();

    #[cfg(feature = "parallel")]
    let per_id: Result<Vec<Vec<Region>>, DecodeError> = ids
        .par_iter()
        .map(|&id| regions_for_id(raster, id, modifiers, area_threshold))
        .collect();
    #[cfg(not(feature = "parallel"))]
    let per_id: Result<Vec<Vec<Region>>, DecodeError> = ids
        .iter()
        .map(|&id| regions_for_id(raster, id, modifiers, area_threshold))
        .collect();

    Ok(per_id?.into_iter().flatten().collect())
}

fn regions_for_id(
    raster: &EntityRaster,
    id: u16,
    modifiers: &ModifierSet,
    area_threshold: f64,
) -> Result<Vec<Region>, DecodeError> {
    let mask = raster.mask_of(id);
    let mask = morphology::close(&mask, modifiers.morph_close_ksize)?;
    let mask = morphology::erode(&mask, modifiers.erode_ksize)?;
    let mask = morphology::dilate(&mask, modifiers.dilate_ksize)?;

    let quadrant_area = raster.width() as f64 * raster.height() as f64;
    let contours = external_contours(&mask);

    // The single flag collapses disjoint parts of the same entity into one
    // region spanning all of them; its area is the sum of the parts.
    let candidates: Vec<(Vec<Point<i32>>, f64)> = if modifiers.is_single && !contours.is_empty() {
        let area = contours.iter().map(|c| contour_area(c)).sum();
        let merged = contours.into_iter().flatten().collect();
        vec![(merged, area)]
    } else {
        contours
            .into_iter()
            .map(|contour| {
                let area = contour_area(&contour);
                (contour, area)
            })
            .collect()
    };

    let mut regions = Vec::new();
    for (points, area) in candidates {
        let norm_area = area / quadrant_area;
        if norm_area <= area_threshold {
            continue;
        }
        let Some(rect) = PixelRect::bounding(points.iter().map(|p| (p.x as u32, p.y as u32)))
        else {
            continue;
        };
        regions.push(Region {
            entity_id: id,
            points,
            rect,
            norm_area,
        });
    }
    Ok(regions)
}

/// Outer boundaries only: holes, and outer borders nested inside holes, are
/// skipped. Matches external-retrieval contour semantics.
pub(crate) fn external_contours(mask: &GrayImage) -> Vec<Vec<Point<i32>>> {
    find_contours::<i32>(mask)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| c.points)
        .collect()
}

/// Shoelace area of a closed pixel-boundary polygon.
pub(crate) fn contour_area(points: &[Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice = 0i64;
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        twice += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
    }
    twice.abs() as f64 / 2.0
}
