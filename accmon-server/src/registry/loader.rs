use std::fs;
use std::path::{Path, PathBuf};

use accmon_types::AccountRecord;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Failed to read auth directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Read every `*.json` record in `dir`, in file-name order.
///
/// Unreadable or malformed files are skipped with a warning. Records without
/// an `index` get their position in the loaded list.
pub fn load_auth_dir(dir: &Path) -> Result<Vec<AccountRecord>, RegistryError> {
    let read_err = |source| RegistryError::ReadDir { path: dir.to_path_buf(), source };
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(read_err)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut records = Vec::with_capacity(paths.len());
    for path in &paths {
        match load_record(path) {
            Ok((mut record, has_index)) => {
                if !has_index {
                    record.index = records.len() as u64;
                }
                records.push(record);
            },
            Err(e) => {
                tracing::warn!("[Registry] Skipping {}: {}", path.display(), e);
            },
        }
    }

    tracing::debug!("[Registry] Loaded {} of {} files from {}", records.len(), paths.len(), dir.display());
    Ok(records)
}

fn load_record(path: &Path) -> Result<(AccountRecord, bool), String> {
    let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
    let value: serde_json::Value = serde_json::from_str(&content).map_err(|e| e.to_string())?;
    let has_index = value.get("index").is_some_and(|v| !v.is_null());
    let record = serde_json::from_value(value).map_err(|e| e.to_string())?;
    Ok((record, has_index))
}
