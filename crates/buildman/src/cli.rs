use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "buildman")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILDMAN_GIT_HASH"), ")"))]
#[command(about = "Load, validate and edit Gradle build manifests")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load a build script and report every invariant violation
    Check {
        /// `build.gradle.kts` or `build.gradle`
        file: PathBuf,
        /// Validation settings (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Require semantic versions
        #[arg(long)]
        strict: bool,
    },
    /// Print the loaded manifest
    Show {
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Change the version of one dependency, keeping the rest of the file intact
    SetVersion {
        file: PathBuf,
        /// Module as `group:artifact`
        module: String,
        version: String,
        /// Only touch declarations in this configuration, e.g. `testImplementation`
        #[arg(long)]
        scope: Option<String>,
        /// Write the result back instead of printing it
        #[arg(long)]
        write: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Kotlin,
    Groovy,
}
