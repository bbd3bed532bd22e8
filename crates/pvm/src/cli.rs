use clap::{Parser, Subcommand};

/// Pulumi Version Manager: install and switch between Pulumi CLI versions.
#[derive(Debug, Parser)]
#[command(name = "pvm", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Disable colored output (also honored via `NO_COLOR`).
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log debug detail to stderr and to the pvm log file.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Install a version of Pulumi (`latest`, exact, or a prefix such as `3.78`).
    Install {
        version: String,

        /// Switch to this version after installing.
        #[arg(long = "use")]
        use_after: bool,
    },

    /// Switch to an installed version of Pulumi.
    Use {
        version: String,

        /// Install the version first if it is not present.
        #[arg(long)]
        install: bool,
    },

    /// List installed versions, or every available version with `--all`.
    List {
        /// Show all available versions.
        #[arg(long)]
        all: bool,

        /// Refresh the cached release list.
        #[arg(long)]
        refresh: bool,
    },

    /// Show the active Pulumi version.
    Current,

    /// Remove an installed version of Pulumi.
    Remove { version: String },

    /// Print the pvm version.
    Version,
}
