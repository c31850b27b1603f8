//! One-off preparation of downloaded stellar atmosphere grids into the
//! cdbs directory layout the lookup library expects.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod catalog;
mod cmfgen;
mod phoenix;
mod rebin;
mod table;

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// CMFGEN (Fierro+15) grid preparation.
    #[command(subcommand)]
    Cmfgen(CmfgenCommand),
    /// PHOENIX v16 (Husser+13) grid preparation.
    #[command(subcommand)]
    Phoenix(PhoenixCommand),
}

#[derive(Subcommand)]
enum CmfgenCommand {
    /// Split downloaded flux files into rotating and non-rotating
    /// subdirectories.
    Organize {
        /// Directory holding the raw download.
        dir: PathBuf,
    },
    /// Write catalog.fits for one organized model directory from its
    /// Table_* parameter file.
    Catalog {
        /// Organized model directory (rotating or non-rotating).
        dir: PathBuf,
        /// Catalog file to write.
        #[arg(long, default_value = "catalog.fits")]
        output: PathBuf,
    },
}

#[derive(Subcommand)]
enum PhoenixCommand {
    /// Combine per-model HiRes flux images into one table per temperature.
    Assemble {
        /// Directory holding the raw download, including the shared
        /// wavelength image.
        input: PathBuf,
        /// Directory to write the assembled tables to.
        output: PathBuf,
    },
    /// Write catalog.fits for a directory of assembled tables.
    Catalog {
        /// Directory of assembled phoenixm00_*.fits tables.
        dir: PathBuf,
        /// Catalog file to write.
        #[arg(long, default_value = "catalog.fits")]
        output: PathBuf,
        /// Prefix for FILENAME entries, typically the models directory
        /// name relative to the catalog plus a trailing slash.
        #[arg(long, default_value = "phoenixm00/")]
        prefix: String,
    },
    /// Convert assembled tables in place to cdbs flux units.
    Cdbs {
        /// Directory of assembled phoenixm00_*.fits tables.
        dir: PathBuf,
    },
    /// Rebin the cdbs grid onto the wavelength axis of an ATLAS grid file.
    Rebin {
        /// cdbs root containing grid/phoenix_v16/phoenixm00.
        cdbs_root: PathBuf,
        /// ATLAS grid file supplying the target wavelength axis.
        #[arg(long)]
        wave_from: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Command::Cmfgen(CmfgenCommand::Organize { dir }) => {
            cmfgen::organize(&dir)?;
        }
        Command::Cmfgen(CmfgenCommand::Catalog { dir, output }) => {
            cmfgen::catalog(&dir, &output)?;
        }
        Command::Phoenix(PhoenixCommand::Assemble { input, output }) => {
            phoenix::assemble(&input, &output)?;
        }
        Command::Phoenix(PhoenixCommand::Catalog {
            dir,
            output,
            prefix,
        }) => {
            phoenix::catalog(&dir, &output, &prefix)?;
        }
        Command::Phoenix(PhoenixCommand::Cdbs { dir }) => {
            phoenix::cdbs(&dir)?;
        }
        Command::Phoenix(PhoenixCommand::Rebin {
            cdbs_root,
            wave_from,
        }) => {
            phoenix::rebin(&cdbs_root, &wave_from)?;
        }
    }
    Ok(())
}
