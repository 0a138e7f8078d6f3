//! Bitlabel domain types
//!
//! Annotation geometry, filename-encoded processing modifiers and the
//! entity name registry shared by the decoding crate and the CLI.

pub mod annotation;
pub mod entities;
pub mod error;
pub mod modifiers;

// Re-export commonly used types
pub use annotation::{Annotation, OutputFormat, PixelRect};
pub use entities::EntityMap;
pub use error::ParseError;
pub use modifiers::ModifierSet;
