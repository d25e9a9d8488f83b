//! Payload encoding for engine requests.
//!
//! Commands cross the process boundary as standard base64 so that quotes,
//! spaces and non-ASCII text reach the engine as one opaque argument.

use crate::ast::{Directive, EncodedRequest};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Encode a directive's command for the engine.
#[must_use]
pub fn encode(directive: &Directive) -> EncodedRequest {
    EncodedRequest::new(
        directive.environment,
        STANDARD.encode(directive.raw_command.as_bytes()),
    )
}

/// Recover the raw command bytes from an encoded command.
///
/// # Errors
///
/// Returns `Err` if `encoded` is not valid padded base64.
pub fn decode_command(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(encoded)
}
