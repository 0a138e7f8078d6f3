//! Entity name registry
//!
//! The dataset generator writes a `{name: id}` JSON object next to each
//! pack; lookups are needed in both directions when turning annotations
//! into class rows and back.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Bidirectional name <-> id map for tracked entities.
#[derive(Debug, Clone, Default)]
pub struct EntityMap {
    by_name: HashMap<String, u16>,
    by_id: HashMap<u16, String>,
}

impl EntityMap {
    /// Load the registry from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read entity map: {:?}", path.as_ref()))?;
        Self::from_json(&raw)
            .with_context(|| format!("Failed to parse entity map: {:?}", path.as_ref()))
    }

    /// Build the registry from raw JSON (`{"zombie": 292, ...}`).
    pub fn from_json(raw: &str) -> Result<Self> {
        let by_name: HashMap<String, u16> =
            serde_json::from_str(raw).context("entity map must be a JSON object of name -> id")?;
        let by_id = by_name
            .iter()
            .map(|(name, &id)| (id, name.clone()))
            .collect();
        Ok(Self { by_name, by_id })
    }

    pub fn id_of(&self, name: &str) -> Option<u16> {
        self.by_name.get(name).copied()
    }

    pub fn name_of(&self, id: u16) -> Option<&str> {
        self.by_id.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
