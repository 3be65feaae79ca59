mod cli;
mod commands;
mod error;
mod logging;

use crate::cli::{Cli, Command};
use crate::error::{ErrorKind, Result};
use clap::Parser;
use exn::ResultExt;
use libris_catalog::Catalog;
use libris_chat::{HttpTransport, Session};
use libris_config::Config;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        },
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    match cli.command {
        Command::Catalog => {
            let mut catalog = seeded_catalog(&config);
            let stdin = std::io::stdin();
            commands::catalog::run(&mut catalog, stdin.lock(), std::io::stdout().lock())
        },
        Command::Chat { endpoint } => {
            let endpoint = endpoint.unwrap_or_else(|| config.chat.endpoint.clone());
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .or_raise(|| ErrorKind::Runtime)?;
            let result = runtime.block_on(chat(&endpoint, &config));
            // A pending stdin read would otherwise hold up shutdown.
            runtime.shutdown_background();
            result
        },
        Command::Demo => commands::demo::run(&mut Catalog::new(), std::io::stdout().lock()),
    }
}

fn seeded_catalog(config: &Config) -> Catalog {
    let (catalog, rejected) = Catalog::from_entries(config.catalog.seed.iter().cloned());
    for err in &rejected {
        tracing::warn!(error = %**err, "Skipping seed entry");
    }
    tracing::info!(entries = catalog.len(), "Catalog ready");
    catalog
}

async fn chat(endpoint: &str, config: &Config) -> Result<()> {
    let transport = HttpTransport::new(endpoint).or_raise(|| ErrorKind::Chat)?;
    tracing::info!(endpoint = %transport.endpoint(), "Chatting");
    let mut session = Session::new(transport).with_timeout(config.chat.timeout());

    let (interrupt, interrupts) = tokio::sync::mpsc::unbounded_channel();
    let signals = tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if interrupt.send(()).is_err() {
                break;
            }
        }
    });

    let input = tokio::io::BufReader::new(tokio::io::stdin());
    let mut sink = commands::chat::TerminalSink::new(std::io::stdout(), std::io::stderr());
    let result = commands::chat::run(&mut session, input, &mut sink, interrupts).await;
    signals.abort();
    result
}
