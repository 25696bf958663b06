//! emx-bake CLI
//!
//! Bake files into a generated Rust module plus a drift-check test.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use emx_bake::codegen::{DEFAULT_CRATE_PATH, DEFAULT_MODULE};
use emx_bake::{Config, DirMode, CHUNK_SIZE};

#[derive(Parser, Debug)]
#[command(name = "emx-bake")]
#[command(author = "nzinfo <li.monan@gmail.com>")]
#[command(version)]
#[command(about = "Bake files into generated Rust source")]
struct Cli {
    /// Files and directories to bake
    paths: Vec<PathBuf>,

    /// Add the files directly inside given directories
    #[arg(short = 'd', long = "dir")]
    dir: bool,

    /// Add every file inside given directories, recursively
    #[arg(short, long)]
    recursive: bool,

    /// Directory for the generated files (default: <package>/src)
    #[arg(short = 'o', long)]
    out_dir: Option<PathBuf>,

    /// Name of the generated module
    #[arg(long, default_value = DEFAULT_MODULE)]
    module: String,

    /// Path the generated code imports the runtime from
    #[arg(long, default_value = DEFAULT_CRATE_PATH)]
    crate_path: String,

    /// Bytes per hex line for binary files
    #[arg(long, default_value_t = CHUNK_SIZE)]
    chunk_size: usize,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match bake(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("emx-bake: {err:#}");
            if matches!(err.downcast_ref::<emx_bake::Error>(), Some(emx_bake::Error::NoInputs)) {
                eprintln!("usage: emx-bake [-d|-r] [file|dir...]");
            }
            ExitCode::from(1)
        }
    }
}

fn bake(cli: Cli) -> Result<()> {
    let dir_mode = if cli.recursive {
        DirMode::Recursive
    } else if cli.dir {
        DirMode::Immediate
    } else {
        DirMode::FilesOnly
    };

    let mut config = Config::new(cli.paths)
        .dir_mode(dir_mode)
        .module(cli.module)
        .crate_path(cli.crate_path)
        .chunk_size(cli.chunk_size);
    if let Some(out_dir) = cli.out_dir {
        config = config.out_dir(out_dir);
    }

    let generated = config.generate().context("Failed to bake files")?;

    if cli.verbose {
        for path in &generated.paths {
            println!("Baked: {}", path);
        }
        println!(
            "Generated: {} ({} files, {} hex)",
            generated.module_path.display(),
            generated.entries,
            generated.hex_entries
        );
        println!("Generated: {}", generated.test_path.display());
    }

    Ok(())
}
