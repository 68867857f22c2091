//! Snapshot-file implementation of the system group provider.

use std::fs;
use std::path::PathBuf;

use rolodex_core::model::SystemGroup;
use rolodex_service::SystemGroupProvider;

/// Reads system groups from a JSON snapshot produced by an external
/// exporter. The file holds an array of group rows; absent fields fall
/// back to their serde defaults.
#[derive(Debug, Clone)]
pub struct JsonSnapshotProvider {
    path: PathBuf,
}

impl JsonSnapshotProvider {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SystemGroupProvider for JsonSnapshotProvider {
    fn system_groups(&self) -> anyhow::Result<Vec<SystemGroup>> {
        let text = fs::read_to_string(&self.path)?;
        let rows: Vec<SystemGroup> = serde_json::from_str(&text)?;
        tracing::debug!(count = rows.len(), path = %self.path.display(), "read snapshot");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_rows_and_applies_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("snapshot.json");
        fs::write(
            &path,
            r#"[
                { "system_id": "6", "title": "Favorites", "contact_count": 3 },
                { "title": "Coworkers" }
            ]"#,
        )
        .unwrap();

        let rows = JsonSnapshotProvider::new(&path).system_groups().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].title, "Favorites");
        assert_eq!(rows[0].contact_count, 3);
        assert!(rows[1].system_id.is_none());
        assert!(rows[1].visible);
    }

    #[test]
    fn missing_file_reports_an_error() {
        let provider = JsonSnapshotProvider::new("/nonexistent/snapshot.json");
        assert!(provider.system_groups().is_err());
    }

    #[test]
    fn malformed_json_reports_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("snapshot.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(JsonSnapshotProvider::new(&path).system_groups().is_err());
    }
}
