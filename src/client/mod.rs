//! Generation client.
//!
//! [`StreamingReplyClient`] frames the prompt, sends it through a
//! [`Transport`], and feeds the response through the stream decoder. It
//! implements [`ReplyGenerator`], the capability the dialogue session
//! depends on, so a different backend can be dropped in at construction.

mod generate;
mod transport;

pub use generate::{ReplyGenerator, StreamingReplyClient};
pub use transport::{GenerateRequest, HttpTransport, ResponseBody, Transport};
