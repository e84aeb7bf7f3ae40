//! Golden test vectors for deterministic verification.
//!
//! Each vector pins the canonical string, content id, and Ed25519 signature
//! of one event signed with a fixed seed. Any client that canonicalizes
//! differently produces a different id and fails here first.

use polyverse_core::{
    canonical_string, Body, Did, EventContent, EventKind, EventRef, Keypair, MediaRef, Result,
    SignedEvent, UnsignedEvent,
};

/// Body fields of a golden vector.
#[derive(Debug, Clone, Copy)]
pub struct VectorBody {
    pub text: Option<&'static str>,
    /// `(cid, mime)` pairs. `Some(&[])` is signed as `"media":[]`.
    pub media: Option<&'static [(&'static str, &'static str)]>,
}

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Seed for deterministic key generation. The author is the seed's
    /// `did:key`.
    pub seed: [u8; 32],
    pub kind: EventKind,
    pub created_at: i64,
    pub body: Option<VectorBody>,
    /// `(type, id)` pairs.
    pub refs: &'static [(&'static str, &'static str)],
    pub expected_canonical: &'static str,
    pub expected_id: &'static str,
    /// Standard base64.
    pub expected_sig: &'static str,
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "text post",
            seed: [0x42; 32],
            kind: EventKind::Post,
            created_at: 1_700_000_000,
            body: Some(VectorBody {
                text: Some("hello polyverse"),
                media: None,
            }),
            refs: &[],
            expected_canonical: r#"{"kind":"post","created_at":1700000000,"author_did":"did:key:IVL40Zt5HSRFMkLhXy6rbLfP+ntqXtMAl5YOBpiB2xI=","body":{"text":"hello polyverse"},"refs":[]}"#,
            expected_id: "myaxLm4GlzSYoTIkzyo30ODyRD6HEKARniOA48yptFM",
            expected_sig: "kCpBWLE05D79qb7R/IrtcZ21r1WrtyADLWDHy9EWt+S341QZCMC/TpehDIklsiVXXb9FUtZPCiNW9NOi6lxCBQ==",
        },
        GoldenVector {
            name: "like without body",
            seed: [0x01; 32],
            kind: EventKind::Like,
            created_at: 1_700_000_001,
            body: None,
            refs: &[("like", "target-event-id")],
            expected_canonical: r#"{"kind":"like","created_at":1700000001,"author_did":"did:key:iojj3XQJ8ZX9UtstPLpdcspnCb8dlBIb83SIAbQPb1w=","refs":[{"type":"like","id":"target-event-id"}]}"#,
            expected_id: "4OzdNK00gIGvCyeqoR2uxOF0VcGTCQm4n7fioemdiZw",
            expected_sig: "se8jZyb01Fg54ExGVq9Q4W33H6QG5NxgrtZmUFglNGgz5jG3Ul6hBYme4M+xAxZjkMAsgeKM5DGnhUYtyACNAg==",
        },
        GoldenVector {
            name: "post with media and escapes",
            seed: [0x07; 32],
            kind: EventKind::Post,
            created_at: 1_700_000_002,
            body: Some(VectorBody {
                text: Some("quote \"x\"\nline\tä/→"),
                media: Some(&[("bafybeigdyr", "image/png")]),
            }),
            refs: &[],
            expected_canonical: "{\"kind\":\"post\",\"created_at\":1700000002,\"author_did\":\"did:key:6kpsY+KcUgq+9VB7Ey7F+ZVHdq6+vnuSQh7qaRRG0iw=\",\"body\":{\"text\":\"quote \\\"x\\\"\\nline\\tä/→\",\"media\":[{\"cid\":\"bafybeigdyr\",\"mime\":\"image/png\"}]},\"refs\":[]}",
            expected_id: "DRhS8YTghgBhy8rwvU766oiVcsv2ilpYYkCg5CoZywo",
            expected_sig: "fAUThHFZfZTAzrJHuuzhruez48lPwcqVMC9Cgb+k2H9PqokU/txPWh4aiL8VwpCG3uZPSnpeao8W+VH/9Q5QDQ==",
        },
        GoldenVector {
            name: "repost with empty quote and two refs",
            seed: [0x00; 32],
            kind: EventKind::Repost,
            created_at: 1,
            body: Some(VectorBody {
                text: None,
                media: None,
            }),
            refs: &[("repost", "abc"), ("reply", "def")],
            expected_canonical: r#"{"kind":"repost","created_at":1,"author_did":"did:key:O2onvM62pC1io6jQKm8Nc2UyFXcd4kOmOsBIoYtZ2ik=","body":{},"refs":[{"type":"repost","id":"abc"},{"type":"reply","id":"def"}]}"#,
            expected_id: "aRzOL7ExLGPI7-s0_t8U0pxEFY-Fw2tqBZdby6x-JZQ",
            expected_sig: "PvRKWSsdh5eoTFmZ/cun9iRZzOknd7GlBgpDytrP6xhqfUJaMiqZqu07V/0ilNPWhcXLokVTaRHglHtwW7HVDg==",
        },
        GoldenVector {
            name: "post with empty media list",
            seed: [0x09; 32],
            kind: EventKind::Post,
            created_at: 1_700_000_003,
            body: Some(VectorBody {
                text: Some("hi"),
                media: Some(&[]),
            }),
            refs: &[],
            expected_canonical: r#"{"kind":"post","created_at":1700000003,"author_did":"did:key:/RckOFqgx1tk+3jNYC+h2ZH96/drE8WO1wLqyDXp9hg=","body":{"text":"hi","media":[]},"refs":[]}"#,
            expected_id: "BVOK-VID6_Y4GfLOyXLGoevIrcLk99CdeDCNcWYaJLM",
            expected_sig: "ldFhHr3YhVXOmilswxmQc7kcDtCZiVOf1l1WUOyibqQPmJ5j8OKTxFUP3aHfP2VPvyDt8qNlbBuolhOiVYfeBA==",
        },
        GoldenVector {
            name: "bodyless post with empty ref id",
            seed: [0x0a; 32],
            kind: EventKind::Post,
            created_at: 1_700_000_004,
            body: None,
            refs: &[("reply", "")],
            expected_canonical: r#"{"kind":"post","created_at":1700000004,"author_did":"did:key:Q6cucUQBdi32a2jCbfvfJoKq7J8kdOykYT5CSg+6/Tw=","refs":[{"type":"reply","id":""}]}"#,
            expected_id: "31xKuafa6qlPrfOfBMP7ZfHLONhubijmO9o_qyFWb2U",
            expected_sig: "R6VV2lxmEOcbGD7T2qUG85b7zcdi73WDUXBhnBeyTKXkTeYKUvPgn3cDihnZ2P8raVX3pK6dMeuG/p/LK5weBw==",
        },
    ]
}

/// Build and sign the event a golden vector describes.
pub fn event_from_vector(vector: &GoldenVector) -> Result<SignedEvent> {
    let keypair = Keypair::from_seed(&vector.seed);
    let body = vector.body.map(|b| Body {
        text: b.text.map(str::to_string),
        media: b.media.map(|items| {
            items
                .iter()
                .map(|(cid, mime)| MediaRef {
                    cid: cid.to_string(),
                    mime: mime.to_string(),
                })
                .collect()
        }),
    });
    let refs = vector
        .refs
        .iter()
        .map(|(ref_type, id)| EventRef::new(*ref_type, *id))
        .collect();

    let event = UnsignedEvent::with_refs(
        vector.created_at,
        Did::from_public_key(&keypair.public_key()),
        EventContent::from_parts(vector.kind, body)?,
        refs,
    )?;
    Ok(event.sign(&keypair))
}

/// Check every vector's canonical form, id, and signature.
///
/// Returns `(name, matches, computed id)` per vector.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| match event_from_vector(v) {
            Ok(event) => {
                let matches = canonical_string(&event.event) == v.expected_canonical
                    && event.id.as_str() == v.expected_id
                    && event.sig == v.expected_sig;
                (v.name.to_string(), matches, event.id.into_string())
            }
            Err(e) => (v.name.to_string(), false, e.to_string()),
        })
        .collect()
}
