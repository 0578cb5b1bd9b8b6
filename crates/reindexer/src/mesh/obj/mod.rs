mod builder;
mod meta;
pub mod parser;

use std::path::Path;

use log::info;
use oo_format::IndexedMesh;

use crate::error::Result;
use crate::reindex::reindex;

pub use self::builder::{flatten, Face, Geometry, GeometryBuilder, MultiIndex};
pub use self::meta::{ObjMeta, FOLDER_META};
pub use self::parser::{LineOutcome, MalformedReason, ParseWarning, Parsed, Record, SkipReason};

/// Result of running one model through parse, flatten and reindex.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub geometry: Geometry,
    pub mesh: IndexedMesh,
    pub warnings: Vec<ParseWarning>,
}

impl Conversion {
    fn from_parsed(parsed: Parsed) -> Result<Self> {
        let mesh = reindex(&parsed.geometry)?;
        Ok(Conversion {
            geometry: parsed.geometry,
            mesh,
            warnings: parsed.warnings,
        })
    }
}

pub fn convert(path: &Path, meta: &ObjMeta) -> Result<Conversion> {
    info!("Processing Wavefront `.obj`-file: `{}`", path.display());
    let conversion = Conversion::from_parsed(parser::parse_file(path, meta)?)?;

    let malformed = conversion.warnings.iter().filter(|w| w.is_malformed()).count();
    if malformed > 0 {
        info!("Skipped {} malformed line(s) in `{}`", malformed, path.display());
    }

    Ok(conversion)
}

pub fn convert_str(source: &str, meta: &ObjMeta) -> Result<Conversion> {
    Conversion::from_parsed(parser::parse_str(source, meta)?)
}
