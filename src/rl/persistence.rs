//! Q-table persistence
//!
//! Tables are stored as a single flat JSON object mapping state keys to their
//! four action values. A missing file is not an error: training simply starts
//! from an empty table.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use super::q_table::QTable;
use crate::error::{Error, Result};

/// Save a Q-table to `path`, creating parent directories if needed
pub fn save_q_table(table: &QTable, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| Error::Io {
            operation: "create directory",
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let json = serde_json::to_string(table)?;
    fs::write(path, json).map_err(|source| Error::Io {
        operation: "write",
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(path = %path.display(), states = table.len(), "Saved Q-table");
    Ok(())
}

/// Load a Q-table from `path`
///
/// Returns an empty table when the file does not exist. Any other read error
/// or a file that is not a valid table is reported.
pub fn load_q_table(path: &Path) -> Result<QTable> {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "No Q-table found, starting empty");
            return Ok(QTable::new());
        }
        Err(source) => {
            return Err(Error::Io {
                operation: "read",
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let table: QTable = serde_json::from_str(&json).map_err(|source| Error::MalformedQTable {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(path = %path.display(), states = table.len(), "Loaded Q-table");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Direction, Position};
    use crate::rl::encoder::StateEncoder;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("q_values.json");

        let mut table = QTable::new();
        for x in [0, 100, 250] {
            let state = StateEncoder::Basic.encode(
                Direction::Up,
                &[Position::new(x, 100)],
                Position::new(500, 20),
                600,
                400,
                10,
            );
            *table.row_mut(&state.key) = [0.1 * x as f64, -3.75, 1e-9, 12.5];
        }

        save_q_table(&table, &path).unwrap();
        let loaded = load_q_table(&path).unwrap();

        assert_eq!(loaded, table);
    }

    #[test]
    fn test_missing_file_gives_empty_table() {
        let dir = TempDir::new().unwrap();
        let table = load_q_table(&dir.path().join("absent.json")).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_malformed_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{\"basic:('1', 'NA', '0000', 1)\": [1.0, 2.0]}").unwrap();

        let err = load_q_table(&path).unwrap_err();
        assert!(matches!(err, Error::MalformedQTable { .. }));
    }

    #[test]
    fn test_loads_table_written_by_hand() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("q_values.json");
        fs::write(
            &path,
            r#"{"basic:('0', '3', '1000', 2)": [0.5, -1.0, 0.0, 0.25]}"#,
        )
        .unwrap();

        let table = load_q_table(&path).unwrap();
        assert_eq!(table.len(), 1);
        let (key, row) = table.iter().next().unwrap();
        assert_eq!(key.as_str(), "basic:('0', '3', '1000', 2)");
        assert_eq!(row, &[0.5, -1.0, 0.0, 0.25]);
    }
}
