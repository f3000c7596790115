use futures::channel::mpsc::{self, UnboundedSender};
use futures::Stream;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use super::events::StreamEvent;
use super::machine::{StreamOrderError, StreamPhase};
use crate::dispatch::{Dispatcher, ToolResult};
use crate::server::metrics;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StreamError {
    #[error(transparent)]
    OutOfOrder(#[from] StreamOrderError),

    #[error("Client disconnected")]
    Disconnected,
}

/// Sending half of a stream, guarded by the phase machine.
pub struct StreamSession {
    phase: StreamPhase,
    sender: UnboundedSender<StreamEvent>,
}

impl StreamSession {
    pub fn new(sender: UnboundedSender<StreamEvent>) -> Self {
        Self {
            phase: StreamPhase::Opened,
            sender,
        }
    }

    pub fn phase(&self) -> StreamPhase {
        self.phase
    }

    /// Emit `event` if the transition is allowed. A rejected event is not
    /// sent. Reaching the terminal phase closes the stream.
    pub fn emit(&mut self, event: StreamEvent) -> Result<(), StreamError> {
        let next = self.phase.next(&event)?;
        self.phase = next;

        let sent = self.sender.unbounded_send(event);
        if next.is_terminal() {
            self.sender.close_channel();
        }
        sent.map_err(|_| StreamError::Disconnected)
    }
}

/// Run `tool` and stream its lifecycle. The backend call happens on its own
/// task; dropping the returned stream does not cancel it.
pub fn stream_tool_call(
    dispatcher: Dispatcher,
    tool: String,
    raw: Map<String, Value>,
) -> impl Stream<Item = StreamEvent> + Send + 'static {
    let (sender, receiver) = mpsc::unbounded();
    let session = StreamSession::new(sender);

    tokio::spawn(async move {
        metrics::stream_opened();
        run_session(dispatcher, tool, raw, session).await;
        metrics::stream_closed();
    });

    receiver
}

async fn run_session(
    dispatcher: Dispatcher,
    tool: String,
    raw: Map<String, Value>,
    mut session: StreamSession,
) {
    let prepared = match dispatcher.prepare(&tool, &raw) {
        Ok(prepared) => prepared,
        Err(failure) => {
            debug!("Rejected streamed call to {}: {}", tool, failure);
            let _ = session.emit(StreamEvent::start(&tool, Value::Object(raw)));
            let _ = session.emit(failure.into());
            return;
        }
    };

    if let Err(StreamError::Disconnected) =
        session.emit(StreamEvent::start(&tool, prepared.parameters()))
    {
        debug!("Client left before {} started, skipping backend call", tool);
        return;
    }

    let outcome = match dispatcher.execute(&prepared).await {
        ToolResult::Success { payload } => session
            .emit(StreamEvent::data(payload))
            .and_then(|_| session.emit(StreamEvent::complete())),
        ToolResult::Failure(failure) => session.emit(failure.into()),
    };

    if let Err(err) = outcome {
        debug!("Discarding result of {}: {}", tool, err);
    }
}
