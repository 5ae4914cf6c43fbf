//! JSON serialization for bus messages.

use serde_json;

use presence_core::result::AppResult;

use super::types::{BusMessage, PresenceAssertion};
use super::validator;

/// Serialize an assertion into a bus payload.
pub fn encode_assertion(assertion: &PresenceAssertion) -> AppResult<String> {
    Ok(serde_json::to_string(&BusMessage::PresenceAssertion(
        assertion.clone(),
    ))?)
}

/// Parse and validate a bus payload.
pub fn decode_assertion(raw: &str) -> AppResult<PresenceAssertion> {
    validator::validate_inbound(raw)?;
    let BusMessage::PresenceAssertion(assertion) = serde_json::from_str::<BusMessage>(raw)?;
    validator::validate_assertion(&assertion)?;
    Ok(assertion)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use presence_core::error::ErrorKind;
    use presence_core::types::{ActorId, DeviceClass, EditingState, FocusState, SessionId};

    use super::*;
    use crate::message::types::AssertedState;

    #[test]
    fn test_wire_shape() {
        let assertion = PresenceAssertion::live(
            ActorId::new(),
            SessionId::new(),
            FocusState::Active,
            EditingState::Editing,
            Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
            DeviceClass::Constrained,
        );
        let json: serde_json::Value =
            serde_json::from_str(&encode_assertion(&assertion).unwrap()).unwrap();

        assert_eq!(json["type"], "presence_assertion");
        assert_eq!(json["state"], "active");
        assert_eq!(json["editing"], "editing");
        assert_eq!(json["device_class"], "constrained");
        assert_eq!(json["timestamp"], "2026-03-01T12:00:00Z");
    }

    #[test]
    fn test_optional_fields_default() {
        let actor = ActorId::new();
        let raw = format!(
            r#"{{"type":"presence_assertion","actor_id":"{}","session_id":"{}","state":"departed","timestamp":"2026-03-01T12:00:00Z"}}"#,
            actor,
            SessionId::new()
        );
        let assertion = decode_assertion(&raw).unwrap();
        assert_eq!(assertion.actor_id, actor);
        assert_eq!(assertion.state, AssertedState::Departed);
        assert_eq!(assertion.editing, EditingState::None);
        assert_eq!(assertion.device_class, DeviceClass::Normal);
    }

    #[test]
    fn test_malformed_inputs_are_errors() {
        assert_eq!(
            decode_assertion("not json").unwrap_err().kind,
            ErrorKind::Serialization
        );

        // missing session_id
        let raw = format!(
            r#"{{"type":"presence_assertion","actor_id":"{}","state":"idle","timestamp":"2026-03-01T12:00:00Z"}}"#,
            ActorId::new()
        );
        assert!(decode_assertion(&raw).is_err());

        // unparsable timestamp
        let raw = format!(
            r#"{{"type":"presence_assertion","actor_id":"{}","session_id":"{}","state":"idle","timestamp":"yesterday"}}"#,
            ActorId::new(),
            SessionId::new()
        );
        assert!(decode_assertion(&raw).is_err());

        let raw = format!(
            r#"{{"type":"presence_assertion","actor_id":"00000000-0000-0000-0000-000000000000","session_id":"{}","state":"idle","timestamp":"2026-03-01T12:00:00Z"}}"#,
            SessionId::new()
        );
        assert_eq!(decode_assertion(&raw).unwrap_err().kind, ErrorKind::Validation);
    }
}
