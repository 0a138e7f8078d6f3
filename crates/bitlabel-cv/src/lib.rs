//! Bitlabel Computer Vision Library
//!
//! Decodes screenshots that pack per-pixel entity identity into
//! steganographic bitplane quadrants, and turns them into normalized
//! object-detection annotations.

pub mod annotate;
pub mod decoder;
pub mod error;
pub mod layered;
pub mod morphology;
pub mod regions;

// Re-export commonly used types
pub use annotate::{AnnotateConfig, annotate_file, annotate_image};
pub use decoder::{EntityRaster, decode_bitplanes};
pub use error::DecodeError;
pub use layered::{annotate_layer_file, annotate_layers};
pub use regions::{Region, extract_regions};

// Error handling
pub type Result<T> = anyhow::Result<T>;
