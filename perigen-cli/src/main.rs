//! `perigen`: generates the peripheral chain of an FPGA build.
//!
//! ```text
//! USAGE:
//!   perigen [--board NAME] [--sources PATH] [-o PATH] <PERILIST>
//!   perigen --list-peripherals
//! ```
//!
//! The netlist goes to stdout (or `--output`), the Verilog `include` lines of the peripherals to
//! `--sources`. Any error exits with status 1.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use perigen::{Board, Package, PackageError, Registry, DEFAULT_INCLUDE_DIR};
use thiserror::Error;

#[derive(Parser, Debug)]
#[command(name = "perigen", about = "Generates the peripheral chain of an FPGA build", version)]
struct Cli {
    /// Peripheral list: an 8-line header followed by peripheral names.
    #[arg(required_unless_present = "list_peripherals")]
    perilist: Option<PathBuf>,

    /// Target board.
    #[arg(long, default_value = "basys3")]
    board: String,

    /// Where to write the `include` lines of the peripherals' Verilog sources.
    #[arg(long, default_value = "sources.tmp")]
    sources: PathBuf,

    /// Directory the `include` lines point at.
    #[arg(long, default_value = DEFAULT_INCLUDE_DIR)]
    include_dir: String,

    /// Where to write the netlist (default: stdout).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the peripheral catalog and exit.
    #[arg(long)]
    list_peripherals: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("Unable to open {} for reading: {error}", .path.display())]
    Open { path: PathBuf, error: io::Error },

    #[error("Unable to open '{}' for writing: {error}", .path.display())]
    Create { path: PathBuf, error: io::Error },

    #[error("expects a single peripheral list argument")]
    Usage,

    #[error(transparent)]
    Package(#[from] PackageError),
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            // `--help` and `--version` are reported as errors too.
            return if err.use_stderr() { ExitCode::FAILURE } else { ExitCode::SUCCESS };
        }
    };

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("FATAL: {}: {}", env!("CARGO_BIN_NAME"), err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let registry = Registry::builtin();

    if cli.list_peripherals {
        return list_peripherals(&registry).map_err(|error| PackageError::Fs { error }.into());
    }

    let board = Board::builtin(&cli.board).map_err(PackageError::from)?;
    log::info!(
        "board {}: pins 0..={}, {} slots",
        board.name,
        board.chain.max_physical_pin,
        board.chain.max_slots
    );

    let sources = create(&cli.sources)?;

    let path = cli.perilist.as_ref().ok_or(CliError::Usage)?;
    let perilist = File::open(path).map_err(|error| CliError::Open { path: path.clone(), error })?;
    let package = Package::from_perilist(&registry, &board, BufReader::new(perilist))?;

    package.write_sources(sources, &cli.include_dir)?;
    match &cli.output {
        Some(path) => package.write_vir(create(path)?)?,
        None => package.write_vir(io::stdout().lock())?,
    }

    Ok(())
}

fn create(path: &Path) -> Result<BufWriter<File>, CliError> {
    File::create(path).map(BufWriter::new).map_err(|error| CliError::Create { path: path.to_path_buf(), error })
}

fn list_peripherals(registry: &Registry) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "{:<10} {:>5}  {:<10} {:>6} {:>5}", "name", "id", "module", "dirs", "pins")?;
    for descriptor in registry.iter() {
        writeln!(
            out,
            "{:<10} {:>5}  {:<10} {:>#6x} {:>5}",
            descriptor.name,
            descriptor.driver_id,
            descriptor.source_module,
            descriptor.pin_dir_mask,
            descriptor.pin_count
        )?;
    }
    Ok(())
}
