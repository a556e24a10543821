//! Persistence of finalized receipts as JSON files.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::info;

use crate::error::StorageError;
use crate::extract::rules::strip_non_digits;
use crate::models::Receipt;

/// Serialize a receipt to pretty-printed JSON.
pub fn to_json(receipt: &Receipt) -> Result<String, StorageError> {
    Ok(serde_json::to_string_pretty(receipt)?)
}

/// Write a receipt as JSON under `output_dir`, creating the directory
/// if needed.
///
/// When `file_name` is `None` the name derives from the receipt: CNPJ
/// digits, else CPF digits, else a timestamp. The `.json` suffix is
/// always ensured. Failures are returned to the caller; the in-memory
/// receipt is never affected.
pub fn save_receipt(
    receipt: &Receipt,
    output_dir: &Path,
    file_name: Option<&str>,
) -> Result<PathBuf, StorageError> {
    let json = to_json(receipt)?;

    if !output_dir.exists() {
        fs::create_dir_all(output_dir).map_err(|source| StorageError::CreateDir {
            path: output_dir.display().to_string(),
            source,
        })?;
    }

    let mut name = file_name
        .map(str::to_string)
        .unwrap_or_else(|| derive_file_name(receipt));
    if !name.ends_with(".json") {
        name.push_str(".json");
    }

    let path = output_dir.join(name);
    fs::write(&path, json).map_err(|source| StorageError::Write {
        path: path.display().to_string(),
        source,
    })?;

    info!(path = %path.display(), "receipt written");
    Ok(path)
}

fn derive_file_name(receipt: &Receipt) -> String {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");

    if let Some(cnpj) = &receipt.cnpj {
        format!("nota_{}_{}.json", strip_non_digits(cnpj), timestamp)
    } else if let Some(cpf) = &receipt.cpf {
        format!("nota_{}_{}.json", strip_non_digits(cpf), timestamp)
    } else {
        format!("nota_fiscal_{}.json", timestamp)
    }
}
