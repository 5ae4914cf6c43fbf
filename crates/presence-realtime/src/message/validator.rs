//! Message validation rules.

use presence_core::error::AppError;

use super::types::PresenceAssertion;

/// Maximum allowed message size in bytes.
const MAX_MESSAGE_SIZE: usize = 8_192;

/// Validates a raw inbound payload before parsing.
pub fn validate_inbound(raw: &str) -> Result<(), AppError> {
    if raw.len() > MAX_MESSAGE_SIZE {
        return Err(AppError::validation(format!(
            "Message exceeds maximum size of {} bytes",
            MAX_MESSAGE_SIZE
        )));
    }

    if raw.trim().is_empty() {
        return Err(AppError::validation("Empty message"));
    }

    Ok(())
}

/// Validates a parsed assertion.
pub fn validate_assertion(assertion: &PresenceAssertion) -> Result<(), AppError> {
    if assertion.actor_id.is_nil() {
        return Err(AppError::validation("Assertion has a nil actor id"));
    }
    if assertion.session_id.is_nil() {
        return Err(AppError::validation("Assertion has a nil session id"));
    }
    Ok(())
}

/// Validates channel name format.
pub fn validate_channel_name(channel: &str) -> Result<(), AppError> {
    if channel.is_empty() || channel.len() > 256 {
        return Err(AppError::validation("Invalid channel name length"));
    }

    if !channel
        .chars()
        .all(|c| c.is_alphanumeric() || c == ':' || c == '-' || c == '_')
    {
        return Err(AppError::validation(
            "Channel name contains invalid characters",
        ));
    }

    Ok(())
}
