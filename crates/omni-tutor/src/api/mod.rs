//! Wire-level support for the completion endpoint.
//!
//! - [`streaming`]: incremental SSE decoding of `chat/completions` responses
//!   into [`StreamEvent`](streaming::StreamEvent) values.

pub mod streaming;

pub use streaming::{Decoded, SseDecoder, StreamEvent};
