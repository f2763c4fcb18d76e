use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod check;
pub mod emit;
pub mod events;
pub mod rooms;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check a JSON document against its structure file.
    Check(CheckArgs),
    /// Build an event taxonomy and list its events.
    Events(EventsArgs),
    /// Load hub settings and list the configured rooms.
    Rooms(RoomsArgs),
    /// Dry-run one event through an in-memory connection.
    Emit(EmitArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Check(args) => check::run(args, format),
        Command::Events(args) => events::run(args, format),
        Command::Rooms(args) => rooms::run(args, format),
        Command::Emit(args) => emit::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// JSON document to check.
    pub file: PathBuf,
    /// Structure file to check against.
    #[arg(long, value_name = "PATH", required_unless_present = "structures_dir")]
    pub structure: Option<PathBuf>,
    /// Directory holding `<file name>.structure` files.
    #[arg(long, value_name = "DIR", conflicts_with = "structure")]
    pub structures_dir: Option<PathBuf>,
    /// Reject keys the structure does not declare.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug)]
pub struct EventsArgs {
    /// Event definitions file.
    pub definitions: PathBuf,
    /// Only list events under this namespace (e.g. `chat`).
    #[arg(long, value_name = "PATH")]
    pub namespace: Option<String>,
}

#[derive(Args, Debug)]
pub struct RoomsArgs {
    /// Hub settings file.
    pub settings: PathBuf,
    /// Also report whether this identity can see and join each room.
    #[arg(long, value_name = "ID")]
    pub identity: Option<String>,
}

#[derive(Args, Debug)]
pub struct EmitArgs {
    /// Event definitions file.
    pub definitions: PathBuf,
    /// Event path, e.g. `chat.message`.
    pub event: String,
    /// Positional arguments as a JSON array.
    #[arg(long, value_name = "JSON", default_value = "[]")]
    pub args: String,
    /// Forward instead of originate (skips the direction check).
    #[arg(long)]
    pub relay: bool,
    /// Identity of the in-memory connection.
    #[arg(long, value_name = "ID", default_value = "cli")]
    pub id: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
