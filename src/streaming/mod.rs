//! Streaming Tool Calls
//!
//! A streamed call emits `start`, then either `data` and `complete` or a
//! single `error`. Ordering is enforced by [`StreamPhase`]: an event that
//! does not fit the current phase is rejected and never reaches the client.

mod events;
mod machine;
mod session;

pub use events::StreamEvent;
pub use machine::{StreamOrderError, StreamPhase};
pub use session::{stream_tool_call, StreamError, StreamSession};
