use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::core::version::resolver::LATEST;

#[derive(Debug, Parser)]
#[command(name = "mcserver", version, about = "Create, install and run Minecraft server instances")]
pub struct Cli {
    /// Refetch the Mojang, Fabric and Quilt manifests even if the cache is fresh.
    #[arg(short = 'r', long, global = true)]
    pub refresh: bool,

    /// Look for Java on PATH and use it from now on.
    #[arg(long, global = true)]
    pub find_java: bool,

    /// Where instances, caches and launcher.json live.
    #[arg(long, global = true, env = "MCSERVER_HOME")]
    pub data_dir: Option<PathBuf>,

    /// Be verbose.
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List instances
    List,
    /// Show the latest Minecraft and mod loader versions
    Versions {
        /// Also list the latest snapshot
        #[arg(long)]
        snapshots: bool,
    },
    /// Create a new instance
    Create(CreateArgs),
    /// Show an instance's configuration
    Show { name: String },
    /// Delete an instance and its folder
    Remove {
        name: String,
        /// Do not ask for confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Download everything an instance needs
    Install {
        name: String,
        /// Download again even if the files are intact
        #[arg(long)]
        force: bool,
    },
    /// Install if needed, then start the server
    Run { name: String },
    /// Change an instance
    Modify {
        name: String,
        #[command(subcommand)]
        change: Change,
    },
}

#[derive(Debug, clap::Args)]
pub struct CreateArgs {
    /// Instance name; a word that is a Minecraft version selects that version
    pub words: Vec<String>,

    /// Minecraft version, `latest` by default
    #[arg(short = 'v', long = "version")]
    pub version: Option<String>,

    /// Allow `latest` to pick a snapshot
    #[arg(long)]
    pub snapshot: bool,

    /// Use Fabric, optionally pinned with `--fabric=<loader version>`
    #[arg(
        long,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = LATEST,
        conflicts_with_all = ["quilt", "mod_loader"]
    )]
    pub fabric: Option<String>,

    /// Use Quilt, optionally pinned with `--quilt=<loader version>`
    #[arg(
        long,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = LATEST,
        conflicts_with = "mod_loader"
    )]
    pub quilt: Option<String>,

    /// Mod loader by name
    #[arg(long)]
    pub mod_loader: Option<String>,

    #[arg(long, requires = "mod_loader")]
    pub mod_loader_version: Option<String>,

    /// Instance folder, relative to the instances directory unless absolute
    #[arg(long)]
    pub folder: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Change {
    /// Rename the instance
    Name { new_name: String },
    /// Move the instance folder
    Move { folder: PathBuf },
    /// Switch Minecraft version
    MinecraftVersion { version: String },
    /// Switch mod loader version
    LoaderVersion { version: String },
    /// Switch mod loader: fabric, quilt or none
    Loader { loader: String },
    /// Run a custom server jar instead of vanilla (`none` to go back)
    CustomJar {
        path: String,
        /// Expected SHA-1, computed from the file when omitted
        sha1: Option<String>,
    },
    /// Replace the JVM arguments
    JavaArgs {
        #[arg(allow_hyphen_values = true, trailing_var_arg = true)]
        args: Vec<String>,
    },
    /// Replace the server arguments
    ServerArgs {
        #[arg(allow_hyphen_values = true, trailing_var_arg = true)]
        args: Vec<String>,
    },
}
