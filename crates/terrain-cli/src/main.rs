//! `terrain-ed`: convert compiled terrain containers into editor terrain
//! files, and inspect or compare the results.
//!
//! Run: `cargo run -p terrain-cli -- convert <scenes_dir> <out_dir>`

mod compare;
mod inspect;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use terrain::{EncodeOptions, HeightSamples, NormalLayout, convert, editor};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "terrain-ed",
    about = "Convert compiled terrain containers into editor terrain files"
)]
struct Cli {
    /// Log debug output (`RUST_LOG` takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a scene folder, or every scene folder inside a directory
    Convert {
        /// Scene folder (with scene.xscene and terrain.bin) or a directory of them
        src: PathBuf,
        /// Output root; each scene is written to <out>/<scene name>/terrain_ed.bin
        out: PathBuf,
        /// Write zeros instead of decoded heights after the level words
        #[arg(long)]
        zero_heights: bool,
        /// Write four distinct normal samples per vertex instead of a sliding window
        #[arg(long)]
        interleaved_normals: bool,
    },
    /// Print a JSON summary of an editor file
    Inspect {
        file: PathBuf,
        /// Also write the decompressed payload to this path
        #[arg(long)]
        dump: Option<PathBuf>,
    },
    /// LZ4-compress a raw editor payload
    Compress { raw: PathBuf, out: PathBuf },
    /// Compare two editor files sample by sample
    Compare { left: PathBuf, right: PathBuf },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Convert {
            src,
            out,
            zero_heights,
            interleaved_normals,
        } => {
            let options = EncodeOptions {
                height_samples: if zero_heights {
                    HeightSamples::Zeroed
                } else {
                    HeightSamples::Decoded
                },
                normal_layout: if interleaved_normals {
                    NormalLayout::Interleaved
                } else {
                    NormalLayout::Overlapping
                },
            };
            run_convert(&src, &out, &options)
        }
        Command::Inspect { file, dump } => exit_code(inspect::run(&file, dump.as_deref())),
        Command::Compress { raw, out } => exit_code(run_compress(&raw, &out)),
        Command::Compare { left, right } => match compare::run(&left, &right) {
            Ok(true) => ExitCode::SUCCESS,
            Ok(false) => ExitCode::FAILURE,
            Err(e) => {
                tracing::error!("{}", e);
                ExitCode::FAILURE
            }
        },
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn exit_code(result: terrain::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Convert every scene under `src`, logging failures and moving on.
fn run_convert(src: &Path, out: &Path, options: &EncodeOptions) -> ExitCode {
    let folders = match convert::scene_folders(src) {
        Ok(folders) => folders,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    if folders.is_empty() {
        tracing::warn!("No scene folders under {}", src.display());
    }

    let mut failed = 0;
    for folder in &folders {
        tracing::info!("Converting {}", folder.display());
        if let Err(e) = convert::convert_scene(folder, out, options) {
            tracing::error!("Failed to convert {}: {}", folder.display(), e);
            failed += 1;
        }
    }

    tracing::info!(
        "Converted {} of {} scenes",
        folders.len() - failed,
        folders.len()
    );
    if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run_compress(raw: &Path, out: &Path) -> terrain::Result<()> {
    let bytes = read_file(raw)?;
    let compressed = editor::compress_payload(&bytes);
    std::fs::write(out, &compressed).map_err(|source| terrain::Error::Io {
        path: out.to_path_buf(),
        source,
    })?;
    tracing::info!(
        "Compressed {} bytes to {} bytes in {}",
        bytes.len(),
        compressed.len(),
        out.display()
    );
    Ok(())
}

pub(crate) fn read_file(path: &Path) -> terrain::Result<Vec<u8>> {
    std::fs::read(path).map_err(|source| terrain::Error::Io {
        path: path.to_path_buf(),
        source,
    })
}
