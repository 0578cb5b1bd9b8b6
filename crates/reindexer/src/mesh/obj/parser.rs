use std::fmt;
use std::fs;
use std::io::{self, BufRead};
use std::path::Path;

use log::{debug, info, warn};

use super::builder::{Face, Geometry, GeometryBuilder, MultiIndex};
use super::meta::ObjMeta;
use crate::canonical::canonicalize_with;
use crate::error::{ReindexError, Result};

/// A recognised record line.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Position([f32; 3]),
    TexCoord([f32; 2]),
    Normal([f32; 3]),
    Face(Face),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    Parsed(Record),
    Skipped(SkipReason),
    Malformed(MalformedReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Blank,
    Comment,
    /// Does not start with a keyword.
    NotARecord,
    /// A keyword this converter does not read, e.g. `g` or `usemtl`.
    Unsupported(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Blank => write!(f, "blank line"),
            SkipReason::Comment => write!(f, "comment"),
            SkipReason::NotARecord => write!(f, "not a record"),
            SkipReason::Unsupported(keyword) => write!(f, "unsupported keyword `{}`", keyword),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedReason {
    #[error("`{keyword}` expects {expected} values, found {found}")]
    FieldCount {
        keyword: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("`{0}` is not a finite number")]
    Number(String),
    #[error("face `{0}` matches none of `p`, `p//n` or `p/t/n`")]
    Face(String),
}

/// A line that did not contribute to the geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseWarning {
    Skipped { line: usize, reason: SkipReason },
    Malformed { line: usize, reason: MalformedReason },
}

impl ParseWarning {
    pub fn line(&self) -> usize {
        match self {
            ParseWarning::Skipped { line, .. } | ParseWarning::Malformed { line, .. } => *line,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, ParseWarning::Malformed { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parsed {
    pub geometry: Geometry,
    pub warnings: Vec<ParseWarning>,
}

// parses the subset of wavefront obj (https://en.wikipedia.org/wiki/Wavefront_.obj_file)
// that carries geometry: `v`, `vt`, `vn` and `f`; everything else is skipped with a notice
pub fn parse_file(filepath: &Path, meta: &ObjMeta) -> Result<Parsed> {
    let file = fs::File::open(filepath).map_err(|source| ReindexError::Read {
        path: filepath.to_path_buf(),
        source,
    })?;
    info!("Loading mesh: {}", filepath.display());

    parse_reader(io::BufReader::new(file), meta)
}

pub fn parse_str(source: &str, meta: &ObjMeta) -> Result<Parsed> {
    parse_reader(source.as_bytes(), meta)
}

pub fn parse_reader<R: BufRead>(reader: R, meta: &ObjMeta) -> Result<Parsed> {
    let mut builder = GeometryBuilder::default();
    let mut warnings = Vec::new();

    // split on raw bytes, a stray non-utf8 line must not abort the whole file
    for (i, line) in reader.split(b'\n').enumerate() {
        let line = line?;
        let line = String::from_utf8_lossy(&line);
        let number = i + 1;

        match parse_line(&line, meta.epsilon) {
            LineOutcome::Parsed(record) => {
                debug!("Parsed line {}: {:?}", number, record);
                builder.push_record(record);
            }
            LineOutcome::Skipped(reason) => {
                match &reason {
                    SkipReason::Blank => debug!("Blank line {}", number),
                    SkipReason::Comment => info!("Comment on line {}: {:?}", number, line.trim()),
                    _ => warn!("Ignoring line {} ({}): {:?}", number, reason, line.trim()),
                }
                warnings.push(ParseWarning::Skipped {
                    line: number,
                    reason,
                });
            }
            LineOutcome::Malformed(reason) => {
                if meta.strict {
                    return Err(ReindexError::Malformed {
                        line: number,
                        reason,
                    });
                }
                warn!("Malformed line {} ({}): {:?}", number, reason, line.trim());
                warnings.push(ParseWarning::Malformed {
                    line: number,
                    reason,
                });
            }
        }
    }

    Ok(Parsed {
        geometry: builder.build(),
        warnings,
    })
}

/// Classifies one line by its leading keyword and parses the rest accordingly.
pub fn parse_line(line: &str, epsilon: f32) -> LineOutcome {
    let line = line.trim();
    if line.is_empty() {
        return LineOutcome::Skipped(SkipReason::Blank);
    }
    if line.starts_with('#') {
        return LineOutcome::Skipped(SkipReason::Comment);
    }

    let (keyword, value) = match line.split_once(char::is_whitespace) {
        Some((keyword, value)) => (keyword, value.trim_start()),
        None => (line, ""),
    };
    if !keyword.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return LineOutcome::Skipped(SkipReason::NotARecord);
    }

    let record = match keyword {
        "v" => parse_scalars("v", value, epsilon).map(Record::Position),
        "vt" => parse_scalars("vt", value, epsilon).map(Record::TexCoord),
        "vn" => parse_scalars("vn", value, epsilon).map(Record::Normal),
        "f" => parse_face(value).map(Record::Face),
        _ => return LineOutcome::Skipped(SkipReason::Unsupported(keyword.to_owned())),
    };

    match record {
        Ok(record) => LineOutcome::Parsed(record),
        Err(reason) => LineOutcome::Malformed(reason),
    }
}

// parses exactly N whitespace separated scalars
fn parse_scalars<const N: usize>(
    keyword: &'static str,
    value: &str,
    epsilon: f32,
) -> std::result::Result<[f32; N], MalformedReason> {
    let fields: Vec<&str> = value.split_whitespace().collect();
    if fields.len() != N {
        return Err(MalformedReason::FieldCount {
            keyword,
            expected: N,
            found: fields.len(),
        });
    }

    let mut scalars = [0.0; N];
    for (scalar, field) in scalars.iter_mut().zip(fields) {
        let parsed: f32 = field
            .parse()
            .map_err(|_| MalformedReason::Number(field.to_owned()))?;
        if !parsed.is_finite() {
            return Err(MalformedReason::Number(field.to_owned()));
        }
        *scalar = canonicalize_with(parsed, epsilon);
    }

    Ok(scalars)
}

type GroupGrammar = fn(&str) -> Option<MultiIndex>;

// tried in order, the first grammar accepting every group of the line wins
const FACE_GRAMMARS: [GroupGrammar; 3] = [position_tex_normal, position_normal, position_only];

fn parse_face(value: &str) -> std::result::Result<Face, MalformedReason> {
    let groups: Vec<&str> = value.split_whitespace().collect();
    if groups.is_empty() {
        return Err(MalformedReason::Face(value.to_owned()));
    }

    FACE_GRAMMARS
        .iter()
        .find_map(|grammar| {
            groups
                .iter()
                .map(|group| grammar(*group))
                .collect::<Option<Vec<_>>>()
        })
        .map(|indices| Face { indices })
        .ok_or_else(|| MalformedReason::Face(value.to_owned()))
}

fn parse_index(value: &str) -> Option<usize> {
    value.parse().ok().filter(|&index| index > 0)
}

// `p/t/n`
fn position_tex_normal(group: &str) -> Option<MultiIndex> {
    let mut fields = group.split('/');
    let p = parse_index(fields.next()?)?;
    let t = parse_index(fields.next()?)?;
    let n = parse_index(fields.next()?)?;
    match fields.next() {
        None => Some(MultiIndex::PositionTexNormal(p, t, n)),
        Some(_) => None,
    }
}

// `p//n`
fn position_normal(group: &str) -> Option<MultiIndex> {
    let (p, n) = group.split_once("//")?;
    Some(MultiIndex::PositionNormal(parse_index(p)?, parse_index(n)?))
}

// `p`
fn position_only(group: &str) -> Option<MultiIndex> {
    parse_index(group).map(MultiIndex::Position)
}
