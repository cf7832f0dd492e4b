//! Interactive client: prompt the operator for command lines, send
//! each one to the server, and display the result.

use crate::protocol::{self, Request, Response, FRAME_DELIMITER};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{info, warn};

const PROMPT: &[u8] = b"> ";

/// Connect to `address` and run the prompt loop until the operator
/// sends EOF or the connection dies.
///
/// The initial connect failure is fatal and propagates to the caller;
/// afterwards, write and read failures end the loop while a response
/// that fails to decode only skips display for that round.
pub async fn run(address: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let stream = TcpStream::connect(address).await?;
    info!(address = %address, "Connected to server");

    let (read_half, mut write_half) = stream.into_split();
    let mut server_reader = BufReader::new(read_half);
    let mut operator = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let mut input = String::new();

    loop {
        stdout.write_all(PROMPT).await?;
        stdout.flush().await?;

        input.clear();
        let n = operator.read_line(&mut input).await?;
        if n == 0 {
            // Operator EOF
            break;
        }
        let command = input.trim_end_matches(['\r', '\n']);

        if let Some(result) = round_trip(&mut server_reader, &mut write_half, command).await? {
            stdout.write_all(result.as_bytes()).await?;
            if !result.ends_with('\n') {
                stdout.write_all(b"\n").await?;
            }
            stdout.flush().await?;
        }
    }

    Ok(())
}

/// One request/response exchange.
///
/// Returns `Ok(None)` when the round completes but produced nothing to
/// display (the request failed to encode, or the response failed to
/// decode); transport failures and a server-side close are errors.
pub(crate) async fn round_trip<R, W>(
    reader: &mut R,
    writer: &mut W,
    command: &str,
) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let request = Request {
        command: command.to_string(),
    };
    let frame = match protocol::encode(&request) {
        Ok(frame) => frame,
        Err(e) => {
            warn!(error = %e, "Failed to encode request");
            return Ok(None);
        }
    };
    writer.write_all(&frame).await?;

    let mut frame_buf = Vec::with_capacity(4096);
    let n = reader.read_until(FRAME_DELIMITER, &mut frame_buf).await?;
    if n == 0 {
        return Err("server closed the connection".into());
    }

    match protocol::decode::<Response>(&frame_buf) {
        Ok(response) => Ok(Some(response.result)),
        Err(e) => {
            warn!(error = %e, "Failed to decode response");
            Ok(None)
        }
    }
}
