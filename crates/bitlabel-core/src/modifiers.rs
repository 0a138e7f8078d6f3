//! Filename-encoded processing modifiers
//!
//! Source identifiers (typically a file stem such as `frame-03.s.m16`)
//! carry dot-separated processing hints left by the capture side. The
//! explicit [`ModifierSet`] struct is the primary configuration; parsing it
//! out of an identifier is a boundary adapter for encoded filenames.

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Region-extraction parameters decoded from a source identifier.
///
/// Immutable once parsed; consumed by the region extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierSet {
    /// Merge all of an entity's contours into one region spanning them.
    pub is_single: bool,
    /// Square kernel side for the morphological close pass.
    pub morph_close_ksize: u32,
    /// Square kernel side for the erode pass.
    pub erode_ksize: u32,
    /// Square kernel side for the dilate pass.
    pub dilate_ksize: u32,
}

impl Default for ModifierSet {
    fn default() -> Self {
        Self {
            is_single: false,
            morph_close_ksize: 32,
            erode_ksize: 4,
            dilate_ksize: 8,
        }
    }
}

impl ModifierSet {
    /// Parse the modifier segments of an identifier.
    ///
    /// Segments are split on `.`; the first character selects the field
    /// (`s` single flag, `m`/`e`/`d` kernel sizes with an integer suffix).
    /// Unrecognized prefixes are ignored so future encoders can add
    /// segments without breaking older readers. Later occurrences of the
    /// same field overwrite earlier ones.
    pub fn parse(identifier: &str) -> Result<Self, ParseError> {
        let mut set = Self::default();
        for segment in identifier.split('.') {
            let Some(prefix) = segment.chars().next() else {
                continue;
            };
            let rest = &segment[prefix.len_utf8()..];
            match prefix {
                's' => set.is_single = true,
                'm' => set.morph_close_ksize = parse_ksize(segment, rest)?,
                'e' => set.erode_ksize = parse_ksize(segment, rest)?,
                'd' => set.dilate_ksize = parse_ksize(segment, rest)?,
                _ => {}
            }
        }
        Ok(set)
    }

    /// Canonical suffix reconstruction; feeding the result back through
    /// [`ModifierSet::parse`] yields an identical set.
    pub fn to_suffix(&self) -> String {
        let mut out = String::new();
        if self.is_single {
            out.push_str("s.");
        }
        out.push_str(&format!(
            "m{}.e{}.d{}",
            self.morph_close_ksize, self.erode_ksize, self.dilate_ksize
        ));
        out
    }
}

fn parse_ksize(segment: &str, rest: &str) -> Result<u32, ParseError> {
    rest.parse::<u32>()
        .map_err(|_| ParseError::InvalidModifier(segment.to_string()))
}

/// Entity ID for the layered path: the integer remainder of an `i`-prefixed
/// segment. Later occurrences win, like every other modifier.
pub fn parse_entity_id(identifier: &str) -> Option<u16> {
    let mut id = None;
    for segment in identifier.split('.') {
        if let Some(rest) = segment.strip_prefix('i') {
            if let Ok(value) = rest.parse::<u16>() {
                id = Some(value);
            }
        }
    }
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let set = ModifierSet::default();
        assert!(!set.is_single);
        assert_eq!(set.morph_close_ksize, 32);
        assert_eq!(set.erode_ksize, 4);
        assert_eq!(set.dilate_ksize, 8);
    }

    #[test]
    fn test_parse_mixed_segments() {
        let set = ModifierSet::parse("foo.s.m16.e2").unwrap();
        assert!(set.is_single);
        assert_eq!(set.morph_close_ksize, 16);
        assert_eq!(set.erode_ksize, 2);
        assert_eq!(set.dilate_ksize, 8); // default untouched
    }

    #[test]
    fn test_last_occurrence_wins() {
        let set = ModifierSet::parse("foo.m8.m4").unwrap();
        assert_eq!(set.morph_close_ksize, 4);
    }

    #[test]
    fn test_unrecognized_prefixes_ignored() {
        let set = ModifierSet::parse("frame-03.x9.i12").unwrap();
        assert_eq!(set, ModifierSet::default());
    }

    #[test]
    fn test_invalid_suffix() {
        assert_eq!(
            ModifierSet::parse("foo.mxyz"),
            Err(ParseError::InvalidModifier("mxyz".to_string()))
        );
        assert_eq!(
            ModifierSet::parse("foo.e"),
            Err(ParseError::InvalidModifier("e".to_string()))
        );
    }

    #[test]
    fn test_suffix_round_trip() {
        let set = ModifierSet::parse("foo.s.m16.e2").unwrap();
        assert_eq!(set.to_suffix(), "s.m16.e2.d8");
        assert_eq!(ModifierSet::parse(&set.to_suffix()).unwrap(), set);

        let plain = ModifierSet::default();
        assert_eq!(ModifierSet::parse(&plain.to_suffix()).unwrap(), plain);
    }

    #[test]
    fn test_entity_id_segment() {
        assert_eq!(parse_entity_id("clip.i7"), Some(7));
        assert_eq!(parse_entity_id("clip.i7.i12"), Some(12));
        assert_eq!(parse_entity_id("clip"), None);
        assert_eq!(parse_entity_id("clip.ix"), None);
    }
}
