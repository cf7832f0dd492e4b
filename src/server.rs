//! TCP server: the connection acceptor and per-connection sessions.
//!
//! Accepts connections and runs one session task per client. A session
//! repeatedly reads one framed request, executes it through the host
//! shell, and writes one framed response. Sessions share no state, so
//! a slow command stalls only the client that issued it.

use crate::executor::{ExecOutcome, HostShell};
use crate::protocol::{self, Request, Response, FRAME_DELIMITER};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tracing::{debug, error, info, trace, warn};

/// Result payload for a frame that could not be decoded.
const INVALID_FRAME_RESULT: &str = "Error: Invalid JSON";

/// Fallback payload when a response itself fails to encode.
const ENCODE_FALLBACK_RESULT: &str = "Error: Failed to generate JSON";

/// Server instance
pub struct Server {
    listen: String,
    shell: HostShell,
}

impl Server {
    /// Create a server that will bind to `listen`.
    pub fn new(listen: impl Into<String>) -> Self {
        Server {
            listen: listen.into(),
            shell: HostShell::detect(),
        }
    }

    /// Bind the listening endpoint and accept connections forever.
    ///
    /// Failure to bind is fatal and propagates to the caller; accept
    /// failures are logged and skipped.
    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let listener = TcpListener::bind(&self.listen).await?;
        info!(address = %self.listen, "Server listening");
        self.serve(listener).await
    }

    async fn serve(&self, listener: TcpListener) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        loop {
            match listener.accept().await {
                Ok((stream, addr)) => {
                    debug!(peer = %addr, "New connection");

                    let shell = self.shell;

                    tokio::spawn(async move {
                        if let Err(e) = handle_session(stream, shell).await {
                            debug!(error = %e, "Session error");
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }
}

/// Run one session: read a frame, execute, write a frame, repeat.
///
/// Generic over the stream so tests can drive a session with an
/// in-memory duplex pair. Returns when the peer disconnects or on a
/// transport error; a single undecodable frame only earns an error
/// response and the session continues.
pub(crate) async fn handle_session<S>(
    stream: S,
    shell: HostShell,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (reader, mut writer) = tokio::io::split(stream);
    let mut reader = BufReader::new(reader);
    let mut frame_buf = Vec::with_capacity(4096);

    loop {
        frame_buf.clear();

        let n = reader.read_until(FRAME_DELIMITER, &mut frame_buf).await?;
        if n == 0 {
            trace!("Connection closed by client");
            break;
        }

        let request: Request = match protocol::decode(&frame_buf) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "Rejecting undecodable frame");
                let error_frame = protocol::encode(&Response {
                    result: INVALID_FRAME_RESULT.to_string(),
                })?;
                writer.write_all(&error_frame).await?;
                continue;
            }
        };

        debug!(command = %request.command, "Executing command");
        let outcome = shell.run(&request.command).await;
        if let ExecOutcome::Failed(reason) = &outcome {
            warn!(reason = %reason, "Command failed");
        }

        let response = Response {
            result: outcome.into_result_text(),
        };
        let frame = match protocol::encode(&response) {
            Ok(frame) => frame,
            Err(e) => {
                error!(error = %e, "Failed to encode response");
                protocol::encode(&Response {
                    result: ENCODE_FALLBACK_RESULT.to_string(),
                })?
            }
        };
        writer.write_all(&frame).await?;
    }

    Ok(())
}
