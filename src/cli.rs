use chrono::NaiveDate;
use crate::version::Era;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pgver")]
#[command(
    author,
    version,
    about = "Validate, parse and date PostgreSQL version strings"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Versions to describe when no command is given
    #[arg()]
    pub versions: Vec<String>,

    /// Emit JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Verbose output (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Config file layered over any auto-discovered .pgverrc.toml, pgver.toml, or .pgverrc
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Describe versions: validity, fields, version number and release date (default)
    Info {
        #[arg()]
        versions: Vec<String>,
    },

    /// Check versions, exiting with code 1 if any fails
    Check {
        #[arg()]
        versions: Vec<String>,

        /// Only check grammar and numeric bounds, not the registry
        #[arg(long, conflicts_with = "released")]
        well_formed: bool,

        /// Also require each version to have been released
        #[arg(long)]
        released: bool,
    },

    /// Print the server_version_num of each version
    Num {
        #[arg()]
        versions: Vec<String>,
    },

    /// Complete versions missing their final component (9.3 -> 9.3.0, 11 -> 11.0)
    Normalize {
        #[arg()]
        versions: Vec<String>,
    },

    /// Print release dates (releases from 6.0.0 on; Postgres95 is not covered)
    Date {
        #[arg()]
        versions: Vec<String>,

        /// Print dates as YYYYMMDD integers
        #[arg(long)]
        numeric: bool,
    },

    /// Exit with code 0 if FIRST was released after SECOND, 1 otherwise
    After { first: String, second: String },

    /// List known releases from 6.0.0 on, newest first (Postgres95 is not covered)
    List {
        /// Only releases of this numbering era
        #[arg(long, value_enum)]
        era: Option<Era>,

        /// Only releases of this major series (e.g. 16 or 9.6)
        #[arg(long, value_name = "MAJOR")]
        major: Option<String>,

        /// Only releases on or after this date
        #[arg(long, value_name = "YYYY-MM-DD")]
        since: Option<NaiveDate>,
    },

    /// Show version information
    Version,
}

impl Cli {
    pub fn get_versions(&self) -> Vec<String> {
        match &self.command {
            Some(Command::Info { versions })
            | Some(Command::Check { versions, .. })
            | Some(Command::Num { versions })
            | Some(Command::Normalize { versions })
            | Some(Command::Date { versions, .. })
                if !versions.is_empty() =>
            {
                versions.clone()
            }
            _ => self.versions.clone(),
        }
    }
}
