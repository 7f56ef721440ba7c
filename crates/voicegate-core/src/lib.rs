//! Types shared by the voicegate crates

mod context;
mod error;
mod headers;

pub use context::Caller;
pub use error::{HttpError, error_body};
pub use headers::{VOICE_TOKEN_HEADER, voice_token};
