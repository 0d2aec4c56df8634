//! CLI tool for unipkg package operations.

mod commands;
mod exit_codes;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Unity package editor
#[derive(Parser)]
#[command(name = "unipkg")]
#[command(author, version, about = "Lossless Unity package editor", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value = "human", global = true)]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// List the assets of a package (alias: l)
    #[command(alias = "l")]
    List {
        /// Package file
        package: PathBuf,
    },

    /// Move an asset to a new project path
    Rename {
        /// Package file
        package: PathBuf,

        /// Current asset path
        from: String,

        /// New asset path
        to: String,

        /// Write the result here instead of overwriting the package
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Give an asset a new GUID and update every reference to it
    ReplaceGuid {
        /// Package file
        package: PathBuf,

        /// Asset path
        path: String,

        /// GUID to assign (random if omitted)
        #[arg(short = 'g', long, env = "UNIPKG_GUID")]
        guid: Option<String>,

        /// Write the result here instead of overwriting the package
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// List assets referencing a GUID
    Refs {
        /// Package file
        package: PathBuf,

        /// GUID to look for
        guid: String,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            let code = if e.use_stderr() {
                exit_codes::BAD_ARGS
            } else {
                exit_codes::SUCCESS
            };
            std::process::exit(code);
        }
    };

    let exit_code = match cli.command {
        Commands::List { package } => commands::list(&package, cli.format),

        Commands::Rename {
            package,
            from,
            to,
            output,
        } => commands::rename(&package, &from, &to, output.as_deref(), cli.format),

        Commands::ReplaceGuid {
            package,
            path,
            guid,
            output,
        } => commands::replace_guid(
            &package,
            &path,
            guid.as_deref(),
            output.as_deref(),
            cli.format,
        ),

        Commands::Refs { package, guid } => commands::refs(&package, &guid, cli.format),
    };

    std::process::exit(exit_code.code());
}
