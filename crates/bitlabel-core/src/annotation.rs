//! Bounding boxes, output conventions and normalized annotations

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Axis-aligned bounding box in quadrant pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Tight bounding box of a point set, or `None` when the set is empty.
    /// Extents are inclusive: a single point yields a 1x1 box.
    pub fn bounding<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        let mut iter = points.into_iter();
        let (x0, y0) = iter.next()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (x0, y0, x0, y0);
        for (x, y) in iter {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        Some(Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        })
    }

    /// Smallest rect covering both boxes.
    pub fn union(&self, other: &PixelRect) -> PixelRect {
        let min_x = self.x.min(other.x);
        let min_y = self.y.min(other.y);
        let max_x = (self.x + self.width).max(other.x + other.width);
        let max_y = (self.y + self.height).max(other.y + other.height);
        PixelRect {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        }
    }

    /// Pixel area of the box.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Geometry convention for emitted annotations.
///
/// Modeled as an enum rather than a format string so that every consumer
/// matches both conventions exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Top-left corner: `(x/W, y/H, w/W, h/H)`.
    Bbox,
    /// Box center: `((x + w/2)/W, (y + h/2)/H, w/W, h/H)`, the convention
    /// detector trainers expect in label rows.
    Center,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Bbox => "bbox",
            OutputFormat::Center => "center",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, ParseError> {
        match s {
            "bbox" => Ok(OutputFormat::Bbox),
            "center" => Ok(OutputFormat::Center),
            other => Err(ParseError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detected entity region, normalized to [0, 1] quadrant coordinates.
/// The meaning of `x`/`y` depends on the [`OutputFormat`] it was emitted in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub entity_id: u16,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Annotation {
    /// Convert a pixel-space bounding box into a normalized annotation.
    pub fn from_rect(
        entity_id: u16,
        rect: PixelRect,
        quad_width: u32,
        quad_height: u32,
        format: OutputFormat,
    ) -> Self {
        let qw = quad_width as f64;
        let qh = quad_height as f64;
        let (x, y) = (rect.x as f64, rect.y as f64);
        let (w, h) = (rect.width as f64, rect.height as f64);
        match format {
            OutputFormat::Bbox => Self {
                entity_id,
                x: x / qw,
                y: y / qh,
                width: w / qw,
                height: h / qh,
            },
            OutputFormat::Center => Self {
                entity_id,
                x: (x + w / 2.0) / qw,
                y: (y + h / 2.0) / qh,
                width: w / qw,
                height: h / qh,
            },
        }
    }

    /// Render as a YOLO label row: `id x y w h`.
    pub fn to_label_row(&self) -> String {
        format!(
            "{} {} {} {} {}",
            self.entity_id, self.x, self.y, self.width, self.height
        )
    }
}
