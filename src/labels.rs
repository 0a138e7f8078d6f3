//! Label-file sink for detector training sets

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use bitlabel_core::Annotation;

/// Write one `id x y w h` row per annotation, one label file per source
/// image, the line format detector trainers ingest.
pub fn write_label_file(path: &Path, annotations: &[Annotation]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create label file: {:?}", path))?;
    let mut writer = BufWriter::new(file);
    for annotation in annotations {
        writeln!(writer, "{}", annotation.to_label_row())
            .with_context(|| format!("Failed to write label file: {:?}", path))?;
    }
    Ok(())
}

/// Export annotations as pretty-printed JSON next to the label rows.
pub fn export_json(path: &Path, annotations: &[Annotation]) -> Result<()> {
    let json =
        serde_json::to_string_pretty(annotations).context("Failed to serialize annotations")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write JSON: {:?}", path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_rows_one_per_line() {
        let annotations = vec![
            Annotation {
                entity_id: 292,
                x: 0.5,
                y: 0.5,
                width: 0.25,
                height: 0.25,
            },
            Annotation {
                entity_id: 7,
                x: 0.1,
                y: 0.2,
                width: 0.05,
                height: 0.05,
            },
        ];
        let path = std::env::temp_dir().join("bitlabel_label_rows_test.txt");
        write_label_file(&path, &annotations).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let rows: Vec<&str> = written.lines().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], "292 0.5 0.5 0.25 0.25");
        assert!(rows[1].starts_with("7 "));
    }
}
