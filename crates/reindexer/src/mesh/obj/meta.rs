use std::fs;
use std::path::Path;

use log::debug;
use serde::Deserialize;

use crate::canonical::DEFAULT_EPSILON;
use crate::error::{ReindexError, Result};

/// Folder scoped meta file, applies to every `.obj` without its own meta file.
pub const FOLDER_META: &str = "obj.toml";

/// Per-asset conversion settings, read from a `.toml` file next to the model.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ObjMeta {
    /// Parsed scalars within `epsilon` of an integer are snapped to it.
    pub epsilon: f32,
    /// Fail on malformed records instead of skipping them.
    pub strict: bool,
}

impl Default for ObjMeta {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            strict: false,
        }
    }
}

impl ObjMeta {
    pub fn parse(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path).map_err(|source| ReindexError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&data).map_err(|source| ReindexError::Meta {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse meta from file called `file.toml` or alternatively from the folder scoped meta file
    /// `obj.toml`, or else use the default meta.
    pub fn locate(model: &Path) -> Result<Self> {
        let own = model.with_extension("toml");
        if own.is_file() {
            debug!("Using meta file `{}`", own.display());
            return Self::parse(&own);
        }

        if let Some(dir) = model.parent() {
            let folder = dir.join(FOLDER_META);
            if folder.is_file() {
                debug!("Using folder meta file `{}`", folder.display());
                return Self::parse(&folder);
            }
        }

        Ok(Self::default())
    }
}
