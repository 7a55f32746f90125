mod command;
mod config;
mod sink;
mod status;
mod transport;

use canvas::engine::EngineCore;
use clap::Parser;
use tokio::io::BufReader;
use tokio::sync::mpsc;

use crate::config::{Cli, ClientConfig, ConfigError};
use crate::sink::JsonLinesSink;
use crate::transport::Session;

const COMMAND_QUEUE: usize = 64;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), ConfigError> {
    // Stdout carries the overlay stream; logs go to stderr.
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let config = ClientConfig::from_cli(Cli::parse())?;

    let (tx, rx) = mpsc::channel(COMMAND_QUEUE);
    tokio::spawn(command::read_commands(BufReader::new(tokio::io::stdin()), tx));

    let engine = EngineCore::new(config.window, config.release);
    let sink = JsonLinesSink::new(std::io::stdout().lock());
    let mut session = Session::new(engine, sink, rx);
    session.run(&config).await;
    Ok(())
}
