//! Canonical JSON encoding for deterministic signing and hashing.
//!
//! The canonical form is compact JSON with a fixed key order:
//! - Top level: `kind, created_at, author_did, body, refs`
//! - Body: `text, media`, each omitted only when absent (`"media":[]`
//!   is written as given)
//! - Media items: `cid, mime`
//! - Refs: `type, id`
//!
//! `id` and `sig` are never part of the canonical form. `body` is omitted when
//! absent; `refs` is always present, as an empty array when there are none.
//!
//! Strings are escaped exactly as `JSON.stringify` escapes them: quote,
//! backslash, and control characters only. `/` and non-ASCII are written
//! verbatim.
//!
//! Any change to this encoding changes every event id and invalidates every
//! signature produced elsewhere.

use crate::event::{Body, EventRef, MediaRef, UnsignedEvent};

/// Field names, in the order they are written.
mod keys {
    pub const KIND: &str = "kind";
    pub const CREATED_AT: &str = "created_at";
    pub const AUTHOR_DID: &str = "author_did";
    pub const BODY: &str = "body";
    pub const REFS: &str = "refs";

    pub const TEXT: &str = "text";
    pub const MEDIA: &str = "media";

    pub const CID: &str = "cid";
    pub const MIME: &str = "mime";

    pub const REF_TYPE: &str = "type";
    pub const REF_ID: &str = "id";
}

/// Encode an unsigned event to its canonical bytes.
pub fn canonical_bytes(event: &UnsignedEvent) -> Vec<u8> {
    let mut buf = Vec::with_capacity(128);
    buf.push(b'{');

    encode_key(&mut buf, keys::KIND);
    encode_text(&mut buf, event.kind().as_str());
    buf.push(b',');

    encode_key(&mut buf, keys::CREATED_AT);
    buf.extend_from_slice(event.created_at.to_string().as_bytes());
    buf.push(b',');

    encode_key(&mut buf, keys::AUTHOR_DID);
    encode_text(&mut buf, event.author_did.as_str());
    buf.push(b',');

    if let Some(body) = event.body() {
        encode_key(&mut buf, keys::BODY);
        encode_body(&mut buf, body);
        buf.push(b',');
    }

    encode_key(&mut buf, keys::REFS);
    encode_refs(&mut buf, &event.refs);

    buf.push(b'}');
    buf
}

/// Canonical form as a string, for logging and golden vectors.
pub fn canonical_string(event: &UnsignedEvent) -> String {
    // Every byte written is either ASCII punctuation or copied from a `&str`.
    String::from_utf8_lossy(&canonical_bytes(event)).into_owned()
}

fn encode_body(buf: &mut Vec<u8>, body: &Body) {
    buf.push(b'{');
    let mut first = true;

    if let Some(text) = &body.text {
        encode_key(buf, keys::TEXT);
        encode_text(buf, text);
        first = false;
    }

    if let Some(media) = &body.media {
        if !first {
            buf.push(b',');
        }
        encode_key(buf, keys::MEDIA);
        encode_media(buf, media);
    }

    buf.push(b'}');
}

fn encode_media(buf: &mut Vec<u8>, media: &[MediaRef]) {
    buf.push(b'[');
    for (i, item) in media.iter().enumerate() {
        if i > 0 {
            buf.push(b',');
        }
        buf.push(b'{');
        encode_key(buf, keys::CID);
        encode_text(buf, &item.cid);
        buf.push(b',');
        encode_key(buf, keys::MIME);
        encode_text(buf, &item.mime);
        buf.push(b'}');
    }
    buf.push(b']');
}

fn encode_refs(buf: &mut Vec<u8>, refs: &[EventRef]) {
    buf.push(b'[');
    for (i, r) in refs.iter().enumerate() {
        if i > 0 {
            buf.push(b',');
        }
        buf.push(b'{');
        encode_key(buf, keys::REF_TYPE);
        encode_text(buf, &r.ref_type);
        buf.push(b',');
        encode_key(buf, keys::REF_ID);
        encode_text(buf, &r.id);
        buf.push(b'}');
    }
    buf.push(b']');
}

/// Write `"key":`.
fn encode_key(buf: &mut Vec<u8>, key: &str) {
    encode_text(buf, key);
    buf.push(b':');
}

/// Write a JSON string literal.
fn encode_text(buf: &mut Vec<u8>, s: &str) {
    const HEX: &[u8; 16] = b"0123456789abcdef";

    buf.push(b'"');
    for &b in s.as_bytes() {
        match b {
            b'"' => buf.extend_from_slice(b"\\\""),
            b'\\' => buf.extend_from_slice(b"\\\\"),
            b'\n' => buf.extend_from_slice(b"\\n"),
            b'\r' => buf.extend_from_slice(b"\\r"),
            b'\t' => buf.extend_from_slice(b"\\t"),
            0x08 => buf.extend_from_slice(b"\\b"),
            0x0c => buf.extend_from_slice(b"\\f"),
            0x00..=0x1f => {
                buf.extend_from_slice(b"\\u00");
                buf.push(HEX[(b >> 4) as usize]);
                buf.push(HEX[(b & 0x0f) as usize]);
            }
            _ => buf.push(b),
        }
    }
    buf.push(b'"');
}
