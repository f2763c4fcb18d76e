use std::io::Read;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::ValidatorConfig;
use crate::error::{Result, SchemaError};
use crate::node::SchemaNode;
use crate::validator::Validator;

/// Suffix appended to a document's file name to find its structure file.
pub const STRUCTURE_SUFFIX: &str = ".structure";

/// Returns true if the file at `path` parses as JSON, whatever its extension.
pub fn is_json(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    match read_document(path, ValidatorConfig::default().max_document_size) {
        Ok(_) => true,
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %err, "not a json file");
            false
        }
    }
}

/// Structure file matching a document: `<dir>/<file name>.structure`.
///
/// `./jsons/players/players.json` with dir `./json_structures` maps to
/// `./json_structures/players.json.structure`.
pub fn structure_path_for(document: impl AsRef<Path>, structures_dir: impl AsRef<Path>) -> PathBuf {
    let file_name = document
        .as_ref()
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    structures_dir
        .as_ref()
        .join(format!("{file_name}{STRUCTURE_SUFFIX}"))
}

/// Read and parse a JSON file of at most `max_bytes` bytes.
pub fn read_document(path: &Path, max_bytes: usize) -> Result<Value> {
    let file = std::fs::File::open(path)
        .map_err(|err| SchemaError::Load(format!("failed opening {}: {err}", path.display())))?;
    let metadata = file
        .metadata()
        .map_err(|err| SchemaError::Load(format!("{}: {err}", path.display())))?;

    if !metadata.is_file() {
        return Err(SchemaError::Load(format!(
            "not a regular file: {}",
            path.display()
        )));
    }
    if metadata.len() > max_bytes as u64 {
        return Err(SchemaError::Load(format!(
            "file too large ({} bytes, max {max_bytes}): {}",
            metadata.len(),
            path.display()
        )));
    }

    let read_limit = u64::try_from(max_bytes.saturating_add(1)).unwrap_or(u64::MAX);
    let mut content = String::new();
    file.take(read_limit)
        .read_to_string(&mut content)
        .map_err(|err| SchemaError::Load(format!("failed reading {}: {err}", path.display())))?;
    if content.len() > max_bytes {
        return Err(SchemaError::Load(format!(
            "file too large while reading: {}",
            path.display()
        )));
    }

    Ok(serde_json::from_str(&content)?)
}

/// Check the JSON file at `document` against the structure file at `structure`.
pub fn check_file(
    document: impl AsRef<Path>,
    structure: impl AsRef<Path>,
    config: ValidatorConfig,
) -> Result<()> {
    let (document, structure) = (document.as_ref(), structure.as_ref());
    let doc = read_document(document, config.max_document_size)?;
    let contract = read_document(structure, config.max_document_size)?;

    let validator = Validator::with_config(SchemaNode::from_value(&contract)?, config);
    validator.validate(&doc).map_err(|mismatch| {
        tracing::debug!(
            document = %document.display(),
            structure = %structure.display(),
            path = %mismatch.path,
            "document does not match structure"
        );
        SchemaError::ValidationFailed(mismatch)
    })
}
