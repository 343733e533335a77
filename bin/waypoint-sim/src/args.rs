use std::path::PathBuf;

use argh::FromArgs;

#[derive(Debug, Clone, FromArgs)]
#[argh(description = "Waypoint devnet simulator")]
pub struct Args {
    #[argh(option, short = 'c', description = "path to configuration")]
    pub config: PathBuf,

    /// Message to broadcast on the root chain, as 32 byte hex.
    #[argh(
        option,
        short = 'm',
        description = "message to broadcast (32 byte hex)"
    )]
    pub message: Option<String>,

    /// Empty blocks each chain seals before anything is pushed.
    #[argh(option, default = "3", description = "warmup blocks per chain")]
    pub warmup_blocks: u64,
}
