use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};

/// Extension of written containers.
pub const OUTPUT_EXTENSION: &str = "ooo";

pub fn file_stem(path: &Path) -> Result<&str> {
    let stem = path
        .file_stem()
        .ok_or_else(|| anyhow!("`{}` has no file name", path.display()))?;
    stem.to_str()
        .ok_or_else(|| anyhow!("File name of `{}` is not valid UTF-8", path.display()))
}

/// `directory/stem.extension`
pub fn combine_path(directory: &Path, stem: &str, extension: &str) -> PathBuf {
    directory.join(format!("{stem}.{extension}"))
}

pub fn write_file(target: &Path, data: &[u8]) -> Result<()> {
    let mut buffer = File::create(target)
        .with_context(|| format!("Could not create file: {}", target.display()))?;
    buffer
        .write_all(data)
        .with_context(|| format!("Could not write data to file: {}", target.display()))?;
    Ok(())
}
