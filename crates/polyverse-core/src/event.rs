//! Events: the signed social actions that make up a feed.
//!
//! The logical content of an event is a closed variant over its kind. Each
//! variant carries only the body shape valid for that kind, so a follow can
//! never carry post text:
//!
//! | kind      | body                                     |
//! |-----------|------------------------------------------|
//! | `post`    | optional, text and/or media              |
//! | `repost`  | optional quote                           |
//! | `follow`  | none                                     |
//! | `like`    | none                                     |
//! | `profile` | optional, text and/or media              |
//!
//! A body is kept exactly as it arrived: `{}` and `"media":[]` are part of
//! the signed bytes and survive a round trip.
//!
//! On the wire an event is a flat JSON object; [`SignedEvent`] and
//! [`UnsignedEvent`] convert through private wire structs that enforce the
//! table above.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};
use crate::types::{Did, EventId};
use crate::validation::validate_unsigned;

/// Discriminator for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Post,
    Repost,
    Follow,
    Like,
    Profile,
}

impl EventKind {
    pub const ALL: [EventKind; 5] = [
        EventKind::Post,
        EventKind::Repost,
        EventKind::Follow,
        EventKind::Like,
        EventKind::Profile,
    ];

    /// The wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Post => "post",
            EventKind::Repost => "repost",
            EventKind::Follow => "follow",
            EventKind::Like => "like",
            EventKind::Profile => "profile",
        }
    }

    /// Human-readable label for clients.
    pub fn display_name(self) -> &'static str {
        match self {
            EventKind::Post => "Post",
            EventKind::Repost => "Repost",
            EventKind::Follow => "Follow",
            EventKind::Like => "Like",
            EventKind::Profile => "Profile Update",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        EventKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| CoreError::MalformedEvent(format!("unknown kind: {s}")))
    }
}

/// Attached media, addressed by content id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MediaRef {
    pub cid: String,
    pub mime: String,
}

/// A typed reference from one event to another (reply target, liked post,
/// followed author).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventRef {
    #[serde(rename = "type")]
    pub ref_type: String,
    pub id: String,
}

impl EventRef {
    pub fn new(ref_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            ref_type: ref_type.into(),
            id: id.into(),
        }
    }
}

/// Text and media carried by posts, quotes, and profiles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Body {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<Vec<MediaRef>>,
}

impl Body {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            media: None,
        }
    }

    pub fn with_media(mut self, cid: impl Into<String>, mime: impl Into<String>) -> Self {
        self.media.get_or_insert_with(Vec::new).push(MediaRef {
            cid: cid.into(),
            mime: mime.into(),
        });
        self
    }

    /// Attached media; empty when the field is absent or `[]`.
    pub fn media_items(&self) -> &[MediaRef] {
        self.media.as_deref().unwrap_or_default()
    }
}

/// The kind-specific logical content of an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventContent {
    Post(Option<Body>),
    /// A repost, optionally quoting with its own body.
    Repost(Option<Body>),
    Follow,
    Like,
    Profile(Option<Body>),
}

impl EventContent {
    pub fn kind(&self) -> EventKind {
        match self {
            EventContent::Post(_) => EventKind::Post,
            EventContent::Repost(_) => EventKind::Repost,
            EventContent::Follow => EventKind::Follow,
            EventContent::Like => EventKind::Like,
            EventContent::Profile(_) => EventKind::Profile,
        }
    }

    /// Text post shorthand.
    pub fn text_post(text: impl Into<String>) -> Self {
        EventContent::Post(Some(Body::text(text)))
    }

    pub fn body(&self) -> Option<&Body> {
        match self {
            EventContent::Post(body) | EventContent::Repost(body) | EventContent::Profile(body) => {
                body.as_ref()
            }
            EventContent::Follow | EventContent::Like => None,
        }
    }

    /// Build from a wire kind and optional body. Follows and likes never
    /// carry a body; every other kind takes whatever body it was given.
    pub fn from_parts(kind: EventKind, body: Option<Body>) -> Result<Self> {
        match (kind, body) {
            (EventKind::Post, body) => Ok(EventContent::Post(body)),
            (EventKind::Repost, body) => Ok(EventContent::Repost(body)),
            (EventKind::Profile, body) => Ok(EventContent::Profile(body)),
            (EventKind::Follow, None) => Ok(EventContent::Follow),
            (EventKind::Like, None) => Ok(EventContent::Like),
            (EventKind::Follow | EventKind::Like, Some(_)) => Err(CoreError::MalformedEvent(
                format!("{kind} events cannot carry a body"),
            )),
        }
    }

    /// Split into wire kind and optional body.
    pub fn into_parts(self) -> (EventKind, Option<Body>) {
        let kind = self.kind();
        let body = match self {
            EventContent::Post(body) | EventContent::Repost(body) | EventContent::Profile(body) => {
                body
            }
            EventContent::Follow | EventContent::Like => None,
        };
        (kind, body)
    }
}

/// An event before it has an id or signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireUnsigned", into = "WireUnsigned")]
pub struct UnsignedEvent {
    /// Unix seconds, strictly positive.
    pub created_at: i64,
    pub author_did: Did,
    pub content: EventContent,
    pub refs: Vec<EventRef>,
}

impl UnsignedEvent {
    /// Create and validate an unsigned event with no refs.
    pub fn new(created_at: i64, author_did: impl Into<Did>, content: EventContent) -> Result<Self> {
        Self::with_refs(created_at, author_did, content, Vec::new())
    }

    /// Create and validate an unsigned event.
    pub fn with_refs(
        created_at: i64,
        author_did: impl Into<Did>,
        content: EventContent,
        refs: Vec<EventRef>,
    ) -> Result<Self> {
        let event = Self {
            created_at,
            author_did: author_did.into(),
            content,
            refs,
        };
        validate_unsigned(&event)?;
        Ok(event)
    }

    /// Shorthand for a text post.
    pub fn post(created_at: i64, author_did: impl Into<Did>, text: impl Into<String>) -> Result<Self> {
        Self::new(created_at, author_did, EventContent::text_post(text))
    }

    pub fn kind(&self) -> EventKind {
        self.content.kind()
    }

    pub fn body(&self) -> Option<&Body> {
        self.content.body()
    }

    /// Body text, if any. This is what moderation bundles evaluate.
    pub fn text(&self) -> Option<&str> {
        self.body().and_then(|b| b.text.as_deref())
    }
}

/// An event with its content id and signature.
///
/// `sig` is kept as received: a malformed signature is a verification
/// failure, not a parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireEvent", into = "WireEvent")]
pub struct SignedEvent {
    pub id: EventId,
    pub sig: String,
    pub event: UnsignedEvent,
}

impl SignedEvent {
    pub fn kind(&self) -> EventKind {
        self.event.kind()
    }

    pub fn created_at(&self) -> i64 {
        self.event.created_at
    }

    pub fn author(&self) -> &Did {
        &self.event.author_did
    }

    pub fn text(&self) -> Option<&str> {
        self.event.text()
    }

    pub fn references(&self, id: &str) -> bool {
        self.event.refs.iter().any(|r| r.id == id)
    }

    /// Parse a wire JSON event.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| CoreError::MalformedEvent(e.to_string()))
    }

    /// Serialize to wire JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| CoreError::EncodingError(e.to_string()))
    }
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct WireUnsigned {
    kind: EventKind,
    created_at: i64,
    author_did: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    body: Option<Body>,
    #[serde(default)]
    refs: Vec<EventRef>,
}

impl TryFrom<WireUnsigned> for UnsignedEvent {
    type Error = CoreError;

    fn try_from(wire: WireUnsigned) -> Result<Self> {
        let content = EventContent::from_parts(wire.kind, wire.body)?;
        UnsignedEvent::with_refs(wire.created_at, wire.author_did, content, wire.refs)
    }
}

impl From<UnsignedEvent> for WireUnsigned {
    fn from(event: UnsignedEvent) -> Self {
        let (kind, body) = event.content.into_parts();
        Self {
            kind,
            created_at: event.created_at,
            author_did: event.author_did.as_str().to_string(),
            body,
            refs: event.refs,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct WireEvent {
    id: String,
    kind: EventKind,
    created_at: i64,
    author_did: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    body: Option<Body>,
    #[serde(default)]
    refs: Vec<EventRef>,
    sig: String,
}

impl TryFrom<WireEvent> for SignedEvent {
    type Error = CoreError;

    fn try_from(wire: WireEvent) -> Result<Self> {
        if wire.id.is_empty() {
            return Err(CoreError::MalformedEvent("event id is required".into()));
        }
        if wire.sig.is_empty() {
            return Err(CoreError::MalformedEvent("signature is required".into()));
        }
        let content = EventContent::from_parts(wire.kind, wire.body)?;
        let event = UnsignedEvent::with_refs(wire.created_at, wire.author_did, content, wire.refs)?;
        Ok(SignedEvent {
            id: EventId::from(wire.id),
            sig: wire.sig,
            event,
        })
    }
}

impl From<SignedEvent> for WireEvent {
    fn from(signed: SignedEvent) -> Self {
        let (kind, body) = signed.event.content.into_parts();
        Self {
            id: signed.id.into_string(),
            kind,
            created_at: signed.event.created_at,
            author_did: signed.event.author_did.as_str().to_string(),
            body,
            refs: signed.event.refs,
            sig: signed.sig,
        }
    }
}
