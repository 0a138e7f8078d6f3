//! Typed errors for the decoding pipelines

use thiserror::Error;

/// Failures raised by the bitplane and layered decoding paths. All are
/// synchronous and fatal for the image being processed; skip-and-continue
/// is the caller's policy.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// An auxiliary quadrant does not match the visible quadrant's size.
    #[error("quadrant size mismatch: visible {visible:?} vs bitplane {bitplane:?}")]
    DimensionMismatch {
        visible: (u32, u32),
        bitplane: (u32, u32),
    },
    /// Structuring elements must be at least 1x1.
    #[error("invalid kernel size {0}")]
    InvalidKernelSize(u32),
    /// The layered path needs an `iN` segment in the source identifier.
    #[error("no entity id segment (`iN`) in identifier \"{0}\"")]
    MissingIdentifier(String),
    /// The layered path needs a background frame plus at least one mask.
    #[error("layer stack needs a background and at least one mask layer, got {0} frame(s)")]
    InsufficientLayers(usize),
    /// The source image or layer stack could not be decoded.
    #[error("failed to decode image data: {0}")]
    DecodeFailure(#[from] image::ImageError),
}
