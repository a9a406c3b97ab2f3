use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{
    connection::handle_client_connection,
    database::{Database, SharedDatabase},
};

#[derive(Error, Debug, PartialEq)]
pub enum CliError {
    #[error("Invalid command line flag")]
    InvalidCommandLineFlag,
    #[error("Invalid command line flag value")]
    InvalidCommandLineFlagValue,
}

#[derive(Debug, PartialEq)]
pub struct RedisServer {
    pub port: u16,
    pub bind: String,
}

impl RedisServer {
    /// Builds the server configuration from the process arguments, the program name included.
    pub fn new<I: IntoIterator<Item = String>>(command_line_args: I) -> Result<Self, CliError> {
        let mut iter = command_line_args.into_iter().skip(1);
        let mut port: Option<u16> = None;
        let mut bind: Option<String> = None;

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--port" => {
                    let Some(port_str) = iter.next() else {
                        return Err(CliError::InvalidCommandLineFlagValue);
                    };

                    let port_number = port_str
                        .parse::<u16>()
                        .map_err(|_| CliError::InvalidCommandLineFlagValue)?;

                    if port_number < 1 {
                        return Err(CliError::InvalidCommandLineFlagValue);
                    }

                    port = Some(port_number);
                }
                "--bind" => {
                    let Some(address) = iter.next() else {
                        return Err(CliError::InvalidCommandLineFlagValue);
                    };

                    if address.is_empty() {
                        return Err(CliError::InvalidCommandLineFlagValue);
                    }

                    bind = Some(address);
                }
                _ => return Err(CliError::InvalidCommandLineFlag),
            }
        }

        Ok(RedisServer {
            port: port.unwrap_or(6379),
            bind: bind.unwrap_or_else(|| "127.0.0.1".to_string()),
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    /// Listens on the configured address until Ctrl-C is received.
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = TcpListener::bind(self.address()).await?;
        info!(address = %self.address(), "server listening");

        let shutdown = CancellationToken::new();
        let ctrl_c_token = shutdown.clone();

        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for shutdown signal");
                return;
            }

            info!("shutdown requested");
            ctrl_c_token.cancel();
        });

        serve(listener, Database::shared(), shutdown).await
    }
}

/// Accepts connections on `listener`, one task each, until `shutdown` is cancelled.
///
/// Every connection gets a child of `shutdown`, so cancelling it also wakes up clients
/// suspended in BLPOP.
pub async fn serve(
    listener: TcpListener,
    db: SharedDatabase,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    loop {
        let accepted = tokio::select! {
            accepted = listener.accept() => accepted,
            _ = shutdown.cancelled() => break,
        };

        match accepted {
            Ok((stream, address)) => {
                tokio::spawn(handle_client_connection(
                    stream,
                    address.to_string(),
                    Arc::clone(&db),
                    shutdown.clone(),
                ));
            }
            Err(e) => {
                warn!(error = %e, "failed to accept connection");
            }
        }
    }

    info!("server stopped");
    Ok(())
}
