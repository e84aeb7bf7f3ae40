//! Structural checks on events.
//!
//! Body shape per kind is enforced by [`crate::event::EventContent`]; this
//! module covers the remaining field rules.

use crate::error::{CoreError, Result};
use crate::event::UnsignedEvent;

/// Validate an unsigned event's fields.
///
/// - `created_at` is strictly positive
/// - `author_did` is non-empty
///
/// Ref and media strings are free-form; empty values are accepted as sent.
pub fn validate_unsigned(event: &UnsignedEvent) -> Result<()> {
    if event.created_at <= 0 {
        return Err(CoreError::MalformedEvent(format!(
            "created_at must be positive, got {}",
            event.created_at
        )));
    }

    if event.author_did.is_empty() {
        return Err(CoreError::MalformedEvent("author_did is required".into()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Body, EventContent, EventRef};

    #[test]
    fn test_timestamp_must_be_positive() {
        assert!(UnsignedEvent::post(0, "d", "x").is_err());
        assert!(UnsignedEvent::post(-5, "d", "x").is_err());
        assert!(UnsignedEvent::post(1, "d", "x").is_ok());
    }

    #[test]
    fn test_author_required() {
        assert!(matches!(
            UnsignedEvent::post(1, "", "x"),
            Err(CoreError::MalformedEvent(_))
        ));
    }

    #[test]
    fn test_empty_ref_and_media_strings_accepted() {
        let refs = vec![EventRef::new("like", ""), EventRef::new("", "target")];
        assert!(UnsignedEvent::with_refs(1, "d", EventContent::Like, refs).is_ok());

        let media = Body::text("t").with_media("", "");
        assert!(UnsignedEvent::new(1, "d", EventContent::Post(Some(media))).is_ok());

        let json = r#"{"id":"a","kind":"like","created_at":5,"author_did":"d","refs":[{"type":"","id":""}],"sig":"s"}"#;
        assert!(crate::event::SignedEvent::from_json(json).is_ok());
    }
}
