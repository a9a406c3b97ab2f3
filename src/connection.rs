use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{tcp::OwnedReadHalf, TcpStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{
    commands::{CommandContext, CommandHandler, ErrorKind, HandleCommandError},
    database::SharedDatabase,
    input::{read_and_parse_resp, CommandReadError, MAX_PENDING_INPUT},
    resp::RespValue,
    state::ClientId,
};

/// State of the client's side of the socket once a command has finished.
#[derive(Debug, Clone, Copy, PartialEq)]
enum PeerInput {
    Open,
    Closed,
    Overflowed,
}

static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(1);

/// Hands out a process-wide unique connection id.
pub fn next_client_id() -> ClientId {
    NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Serves one client until it disconnects, sends an undecodable frame, or `shutdown` fires.
///
/// Requests are answered strictly in order. While a command runs the socket keeps being
/// read, so that a peer hanging up cancels a suspended BLPOP instead of leaving it queued.
pub async fn handle_client_connection(
    stream: TcpStream,
    client_address: String,
    db: SharedDatabase,
    shutdown: CancellationToken,
) {
    let client_id = next_client_id();
    let context = CommandContext::new(client_id, shutdown.child_token());

    debug!(client_id, client_address = %client_address, "connection accepted");

    let (mut reader, mut writer) = stream.into_split();
    let mut buffer = BytesMut::with_capacity(4096);

    loop {
        let input = tokio::select! {
            result = read_and_parse_resp(&mut reader, &mut buffer) => result,
            _ = context.cancellation.cancelled() => break,
        };

        let input = match input {
            Ok(input) => input,
            Err(CommandReadError::ConnectionClosed) => break,
            Err(e) => {
                warn!(client_id, error = %e, "failed to read request");

                if let Some(reply) = e.as_resp() {
                    if let Err(e) = write_to_stream(&mut writer, &reply).await {
                        debug!(client_id, error = %e, "failed to write framing error");
                    }
                }

                break;
            }
        };

        let command_handler = match CommandHandler::new(input) {
            Ok(handler) => handler,
            Err(e) => {
                debug!(client_id, error = %e, "invalid request");

                if let Err(e) = write_to_stream(&mut writer, &e.as_resp()).await {
                    debug!(client_id, error = %e, "failed to write response");
                    break;
                }

                continue;
            }
        };

        let (result, peer_input) = run_command(
            &command_handler,
            Arc::clone(&db),
            &context,
            &mut reader,
            &mut buffer,
        )
        .await;

        if peer_input == PeerInput::Overflowed {
            let error = CommandReadError::PendingInputTooLarge;
            warn!(client_id, error = %error, "closing connection");

            if let Some(reply) = error.as_resp() {
                if let Err(e) = write_to_stream(&mut writer, &reply).await {
                    debug!(client_id, error = %e, "failed to write response");
                }
            }

            break;
        }

        let (reply, cancelled) = match result {
            Ok(reply) => (reply, false),
            Err(e) => {
                debug!(client_id, error = %e, "command failed");
                (e.as_resp(), e.kind() == ErrorKind::Cancelled)
            }
        };

        if let Err(e) = write_to_stream(&mut writer, &reply).await {
            debug!(client_id, error = %e, "failed to write response");
            break;
        }

        if cancelled || peer_input == PeerInput::Closed {
            break;
        }
    }

    context.cancellation.cancel();
    debug!(client_id, client_address = %client_address, "connection closed");
}

/// Drives a command to completion while watching the socket for a hang-up.
///
/// Bytes that arrive in the meantime are appended to `buffer` for the next request, up to
/// [`MAX_PENDING_INPUT`]. On EOF, a read error or a buffer past that limit, the socket is
/// no longer read and the connection's token is cancelled so a suspended command returns.
async fn run_command(
    command_handler: &CommandHandler,
    db: SharedDatabase,
    context: &CommandContext,
    reader: &mut OwnedReadHalf,
    buffer: &mut BytesMut,
) -> (Result<RespValue, HandleCommandError>, PeerInput) {
    let command = command_handler.handle_command(db, context);
    tokio::pin!(command);

    let mut peer_input = PeerInput::Open;

    loop {
        tokio::select! {
            biased;
            result = &mut command => return (result, peer_input),
            read = reader.read_buf(buffer), if peer_input == PeerInput::Open => {
                peer_input = match read {
                    Ok(number_of_bytes) if number_of_bytes > 0 => {
                        if buffer.len() <= MAX_PENDING_INPUT {
                            continue;
                        }
                        PeerInput::Overflowed
                    }
                    _ => {
                        debug!(client_id = context.client_id, "peer went away while a command was running");
                        PeerInput::Closed
                    }
                };
                context.cancellation.cancel();
            }
        }
    }
}

async fn write_to_stream<W>(writer: &mut W, response: &RespValue) -> tokio::io::Result<()>
where
    W: AsyncWriteExt + Unpin,
{
    writer.write_all(&response.encode()).await?;
    writer.flush().await?;

    Ok(())
}
