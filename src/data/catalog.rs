use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::narrative::dialogue::DialogueTree;

pub const CATALOG_SCHEMA_VERSION: u32 = 1;

/// On-disk bundle of extra dialogue trees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueCatalog {
    pub schema_version: u32,
    pub dialogues: Vec<DialogueTree>,
}

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0}")]
    Validation(String),
}

impl DialogueCatalog {
    pub fn validate(&self) -> Result<(), ContentError> {
        if self.schema_version != CATALOG_SCHEMA_VERSION {
            return Err(ContentError::Validation(format!(
                "unsupported catalog schema_version {}",
                self.schema_version
            )));
        }
        let mut ids = HashSet::new();
        for tree in &self.dialogues {
            if !ids.insert(tree.id.as_str()) {
                return Err(ContentError::Validation(format!("duplicate dialogue id {}", tree.id)));
            }
            tree.validate()
                .map_err(|err| ContentError::Validation(err.to_string()))?;
        }
        Ok(())
    }
}

pub fn load_dialogue_catalog(path: impl AsRef<Path>) -> Result<DialogueCatalog, ContentError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| ContentError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let catalog: DialogueCatalog = serde_json::from_str(&raw).map_err(|source| ContentError::Json {
        path: path.display().to_string(),
        source,
    })?;
    catalog.validate()?;
    Ok(catalog)
}

/// Load every `*.json` catalog in `dir`, in file name order.
pub fn load_content_dir(dir: impl AsRef<Path>) -> Result<Vec<DialogueTree>, ContentError> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir).map_err(|source| ContentError::Io {
        path: dir.display().to_string(),
        source,
    })?;
    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ContentError::Io {
            path: dir.display().to_string(),
            source,
        })?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut trees = Vec::new();
    for path in paths {
        let catalog = load_dialogue_catalog(&path)?;
        info!(path = %path.display(), count = catalog.dialogues.len(), "loaded dialogue catalog");
        trees.extend(catalog.dialogues);
    }
    Ok(trees)
}
