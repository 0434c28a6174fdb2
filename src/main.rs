use batteryd::{
    cli::{Args, Command},
    prelude::*,
};
use clap::{Parser, crate_version};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().without_time().compact().init();
    info!(version = crate_version!(), "starting…");

    match Args::parse().command {
        Command::Update(args) => args.run().await?,
        Command::Replay(args) => args.run().await?,
    }

    info!("done!");
    Ok(())
}
