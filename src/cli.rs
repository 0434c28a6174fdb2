mod broker;
mod replay;
mod update;

use clap::{Parser, Subcommand};

pub use self::{broker::BrokerArgs, replay::ReplayArgs, update::UpdateArgs};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Apply a single charge or discharge request to a battery and publish the warning, if any.
    #[clap(name = "update")]
    Update(Box<UpdateArgs>),

    /// Register batteries from a scenario file and replay its events against them.
    #[clap(name = "replay")]
    Replay(Box<ReplayArgs>),
}
