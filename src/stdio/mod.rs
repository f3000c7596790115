//! Stdio Transport
//!
//! One JSON request per line on the reader, one JSON response per line on
//! the writer. Lines are handled strictly in order and each response is
//! flushed before the next line is read. Lines carrying a `jsonrpc` key are
//! answered as MCP messages instead.

mod envelope;
mod mcp;
mod protocol;

pub use envelope::{parse_line, Incoming, ResponseBody, ToolRequest, ToolResponse};
pub use mcp::McpSession;
pub use protocol::{McpError, McpRequest, McpResponse, RequestId, MCP_PROTOCOL_VERSION};

use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use crate::dispatch::Dispatcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdioState {
    AwaitingLine,
    ParsingRequest,
    Dispatching,
    WritingResponse,
    Closed,
}

/// Serve requests from `reader` until EOF or an I/O error on either side.
/// Always ends in [`StdioState::Closed`].
pub async fn run_stdio<R, W>(dispatcher: Dispatcher, reader: R, mut writer: W) -> StdioState
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut mcp = McpSession::new();
    let mut line = Vec::new();
    let mut incoming = Incoming::Skip;
    let mut response: Option<String> = None;
    let mut state = StdioState::AwaitingLine;

    info!("Serving tool calls on stdio");

    while state != StdioState::Closed {
        state = match state {
            StdioState::AwaitingLine => {
                line.clear();
                match reader.read_until(b'\n', &mut line).await {
                    Ok(0) => {
                        debug!("Stdin reached EOF");
                        StdioState::Closed
                    }
                    Ok(_) => StdioState::ParsingRequest,
                    Err(e) => {
                        error!("Failed to read from stdin: {}", e);
                        StdioState::Closed
                    }
                }
            }
            StdioState::ParsingRequest => {
                incoming = parse_line(&line);
                match &incoming {
                    Incoming::Skip => StdioState::AwaitingLine,
                    Incoming::Reply(reply) => {
                        response = encode(reply);
                        StdioState::WritingResponse
                    }
                    Incoming::Tool(_) | Incoming::Mcp(_) => StdioState::Dispatching,
                }
            }
            StdioState::Dispatching => {
                response = match std::mem::replace(&mut incoming, Incoming::Skip) {
                    Incoming::Tool(request) => {
                        let parameters = request.parameters.unwrap_or_default();
                        let result = dispatcher.dispatch(&request.tool, &parameters).await;
                        encode(&ToolResponse::from_result(request.id, result))
                    }
                    Incoming::Mcp(message) => mcp
                        .handle_message(message, &dispatcher)
                        .await
                        .and_then(|reply| encode(&reply)),
                    Incoming::Reply(_) | Incoming::Skip => None,
                };
                StdioState::WritingResponse
            }
            StdioState::WritingResponse => match response.take() {
                None => StdioState::AwaitingLine,
                Some(text) => match write_line(&mut writer, &text).await {
                    Ok(()) => StdioState::AwaitingLine,
                    Err(e) => {
                        error!("Failed to write to stdout: {}", e);
                        StdioState::Closed
                    }
                },
            },
            StdioState::Closed => StdioState::Closed,
        };
    }

    info!("Stdio transport closed");
    state
}

fn encode<T: Serialize>(response: &T) -> Option<String> {
    match serde_json::to_string(response) {
        Ok(text) => Some(text),
        Err(e) => {
            warn!("Failed to serialize response: {}", e);
            None
        }
    }
}

async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, text: &str) -> std::io::Result<()> {
    writer.write_all(text.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}
