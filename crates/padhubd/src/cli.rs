use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Debug, Subcommand, PartialEq)]
pub(crate) enum Command {
    /// Poll controllers in the foreground and print notifications.
    Run {
        /// Poll interval in milliseconds
        #[arg(short, long)]
        interval: Option<u64>,
        /// Polls per second, overrides the interval
        #[arg(long)]
        fps: Option<u32>,
        /// Enable extended support for the ROG Chakram
        #[arg(long)]
        rog_chakram: bool,
    },
    /// Rumble controllers. ARGS: low high duration_ms player
    Rumble {
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Rumble adaptive triggers. ARGS: left right duration_ms player
    RumbleTriggers {
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Set LED color. ARGS: red green blue player
    Leds {
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Enable or disable gyroscopes. ARGS: enable player
    Gyroscope {
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Enable or disable accelerometers. ARGS: enable player
    Accelerometer {
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

/// Game controller hub: hot-plug tracking, player slots and controller effects.
#[derive(Parser)]
#[command(version, about, long_about = None)]
pub(crate) struct Cli {
    /// Turn debugging information on
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Config file (defaults to ./padhub.yaml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// The command to run
    #[clap(subcommand)]
    pub command: Command,
}
