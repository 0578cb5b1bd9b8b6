use std::{
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use reindexer::{
    dump,
    obj::{self, ObjMeta},
    utils::{self, OUTPUT_EXTENSION},
};
use structopt::StructOpt;
use walkdir::WalkDir;

// Cli arguments
#[derive(StructOpt, Debug)]
#[structopt(name = "reindexer")]
struct CliArgs {
    /// The `.obj` file to convert, or a folder to convert recursively
    #[structopt(parse(from_os_str))]
    input: PathBuf,
    /// Output `.ooo` file or folder; without it the converted mesh is printed instead
    #[structopt(parse(from_os_str))]
    output: Option<PathBuf>,
    /// Output debug info
    #[structopt(short = "v", long = "verbose")]
    verbose: bool,
    /// Fail on malformed records instead of skipping them
    #[structopt(long = "strict")]
    strict: bool,
    /// Print the converted mesh even when writing an output file
    #[structopt(long = "dump")]
    dump: bool,
}

/// Happens during setup
#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error("Input does not exist: {0}")]
    InputNonExistant(String),
    #[error("Converting a folder requires an output folder")]
    OutputRequired,
    #[error("Output folder structure could not be created: {0}")]
    ErrorCreatingOutputStructure(#[from] io::Error),
}

fn main() -> Result<()> {
    let args = CliArgs::from_args();

    if !args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    } else {
        env_logger::Builder::new()
            .filter(None, log::LevelFilter::Debug)
            .init();
    }

    prepare(args)
}

fn prepare(args: CliArgs) -> Result<()> {
    if !args.input.exists() {
        return Err(CliError::InputNonExistant(args.input.display().to_string()).into());
    }

    if args.input.is_dir() {
        let output = args.output.as_deref().ok_or(CliError::OutputRequired)?;
        convert_folder(&args.input, output, &args)
    } else {
        let output = match args.output.as_deref() {
            Some(output) if output.is_dir() => {
                let stem = utils::file_stem(&args.input)?;
                Some(utils::combine_path(output, stem, OUTPUT_EXTENSION))
            }
            output => output.map(Path::to_path_buf),
        };
        process(&args.input, output.as_deref(), &args)
    }
}

fn convert_folder(input_path: &Path, output_path: &Path, args: &CliArgs) -> Result<()> {
    for entry in WalkDir::new(input_path) {
        let path = match &entry {
            Err(err) => {
                warn!("Error parsing path: {}", err);
                continue;
            }
            Ok(entry) => entry.path(),
        };

        if path.is_dir() {
            continue;
        }

        // check extension
        match path.extension().and_then(|x| x.to_str()) {
            Some(extension) => match extension.to_ascii_lowercase().as_ref() {
                "obj" => {
                    let relative = path
                        .strip_prefix(input_path)
                        .context("Error handling output path: stripping prefix")?;
                    let target = output_path.join(relative).with_extension(OUTPUT_EXTENSION);

                    // creating the output folder of the input file in the same structure
                    if let Some(local_output_folder) = target.parent() {
                        if !local_output_folder.exists() {
                            fs::create_dir_all(local_output_folder)
                                .map_err(CliError::ErrorCreatingOutputStructure)?;
                        }
                    }

                    process(path, Some(&target), args)?
                }
                "toml" => debug!("Ignored toml file: {}", path.display()),
                _ => warn!("Could not handle path: {}", path.display()),
            },
            None => warn!(
                "Ignored file \"{}\", because no file extension was found.",
                path.display()
            ),
        }
    }

    Ok(())
}

fn process(path: &Path, target: Option<&Path>, args: &CliArgs) -> Result<()> {
    let mut meta = ObjMeta::locate(path)?;
    meta.strict |= args.strict;
    debug!("Using {:?} for `{}`", meta, path.display());

    let conversion = obj::convert(path, &meta)
        .with_context(|| format!("Could not convert `{}`", path.display()))?;

    if let Some(target) = target {
        let data = conversion
            .mesh
            .to_bytes()
            .context("Could not serialize IndexedMesh")?;
        utils::write_file(target, &data)?;
        info!(
            "Wrote `{}`: {} vertices, {} indices",
            target.display(),
            conversion.mesh.vertex_count(),
            conversion.mesh.indices.len()
        );
    }

    if target.is_none() || args.dump {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        dump::write_dump(&mut out, &conversion.geometry, &conversion.mesh)
            .context("Could not print the converted mesh")?;
    }

    Ok(())
}
