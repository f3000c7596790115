use thiserror::Error;

use super::events::StreamEvent;

/// Lifecycle of a streamed tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamPhase {
    Opened,
    Started,
    Streaming,
    Terminated,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Cannot emit '{event}' while {phase:?}")]
pub struct StreamOrderError {
    pub phase: StreamPhase,
    pub event: &'static str,
}

impl StreamPhase {
    /// The phase reached by emitting `event`, or an error if the pair is not
    /// in the transition table.
    pub fn next(self, event: &StreamEvent) -> Result<StreamPhase, StreamOrderError> {
        use StreamPhase::*;

        match (self, event) {
            (Opened, StreamEvent::Start { .. }) => Ok(Started),
            (Started | Streaming, StreamEvent::Data { .. }) => Ok(Streaming),
            (Started | Streaming, StreamEvent::Complete { .. }) => Ok(Terminated),
            (Started, StreamEvent::Error { .. }) => Ok(Terminated),
            _ => Err(StreamOrderError {
                phase: self,
                event: event.name(),
            }),
        }
    }

    pub fn is_terminal(&self) -> bool {
        *self == StreamPhase::Terminated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{FailureKind, ToolFailure};
    use serde_json::json;

    fn error_event() -> StreamEvent {
        ToolFailure::new(FailureKind::Transient, "timeout").into()
    }

    #[test]
    fn test_success_path() {
        let phase = StreamPhase::Opened
            .next(&StreamEvent::start("search_metrics", json!({})))
            .unwrap();
        assert_eq!(phase, StreamPhase::Started);

        let phase = phase.next(&StreamEvent::data(json!([]))).unwrap();
        assert_eq!(phase, StreamPhase::Streaming);

        let phase = phase.next(&StreamEvent::data(json!([]))).unwrap();
        assert_eq!(phase, StreamPhase::Streaming);

        let phase = phase.next(&StreamEvent::complete()).unwrap();
        assert!(phase.is_terminal());
    }

    #[test]
    fn test_error_after_start() {
        let phase = StreamPhase::Started.next(&error_event()).unwrap();
        assert_eq!(phase, StreamPhase::Terminated);
    }

    #[test]
    fn test_complete_directly_after_start() {
        let phase = StreamPhase::Started.next(&StreamEvent::complete()).unwrap();
        assert_eq!(phase, StreamPhase::Terminated);
    }

    #[test]
    fn test_rejected_transitions() {
        let start = StreamEvent::start("query_metrics", json!({}));
        let rejected = vec![
            (StreamPhase::Opened, StreamEvent::data(json!(1))),
            (StreamPhase::Opened, StreamEvent::complete()),
            (StreamPhase::Opened, error_event()),
            (StreamPhase::Started, start.clone()),
            (StreamPhase::Streaming, start.clone()),
            (StreamPhase::Streaming, error_event()),
            (StreamPhase::Terminated, start),
            (StreamPhase::Terminated, StreamEvent::data(json!(1))),
            (StreamPhase::Terminated, StreamEvent::complete()),
            (StreamPhase::Terminated, error_event()),
        ];

        for (phase, event) in rejected {
            let err = phase.next(&event).unwrap_err();
            assert_eq!(err.phase, phase);
            assert_eq!(err.event, event.name());
        }
    }
}
