//! Proptest generators for property-based testing.

use proptest::prelude::*;

use polyverse_core::{
    Body, Did, EventContent, EventKind, EventRef, Keypair, MediaRef, PublicKey, SignedEvent,
    UnsignedEvent,
};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a random public key.
pub fn public_key() -> impl Strategy<Value = PublicKey> {
    keypair().prop_map(|kp| kp.public_key())
}

/// Generate a `did:key` handle for a random key.
pub fn did() -> impl Strategy<Value = Did> {
    public_key().prop_map(|pk| Did::from_public_key(&pk))
}

/// Generate a valid timestamp (strictly positive Unix seconds).
pub fn timestamp() -> impl Strategy<Value = i64> {
    1i64..=4_102_444_800
}

/// Generate an EventKind.
pub fn event_kind() -> impl Strategy<Value = EventKind> {
    prop_oneof![
        Just(EventKind::Post),
        Just(EventKind::Repost),
        Just(EventKind::Follow),
        Just(EventKind::Like),
        Just(EventKind::Profile),
    ]
}

/// Generate post text, including quotes, control characters, and non-ASCII.
pub fn text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 #@.,!?]{1,120}",
        "\\PC{0,80}",
        "[\"\\\\\\n\\t\\x00-\\x1Fé→😀]{1,16}",
    ]
}

/// Generate a media reference.
pub fn media_ref() -> impl Strategy<Value = MediaRef> {
    (
        "bafy[a-z2-7]{8,40}",
        prop_oneof![Just("image/png"), Just("image/jpeg"), Just("video/mp4")],
    )
        .prop_map(|(cid, mime)| MediaRef {
            cid,
            mime: mime.to_string(),
        })
}

/// Generate a body. Either field may be absent, and present media may be
/// an empty list, as JSON clients send it.
pub fn body() -> impl Strategy<Value = Body> {
    (
        proptest::option::of(text()),
        proptest::option::of(prop::collection::vec(media_ref(), 0..3)),
    )
        .prop_map(|(text, media)| Body { text, media })
}

/// Generate a reference to another event.
pub fn event_ref() -> impl Strategy<Value = EventRef> {
    (
        prop_oneof![Just("reply"), Just("repost"), Just("like"), Just("follow")],
        "[A-Za-z0-9_-]{1,43}",
    )
        .prop_map(|(ref_type, id)| EventRef::new(ref_type, id))
}

/// Generate content whose body shape fits its kind.
pub fn content() -> impl Strategy<Value = EventContent> {
    prop_oneof![
        proptest::option::of(body()).prop_map(EventContent::Post),
        proptest::option::of(body()).prop_map(EventContent::Repost),
        Just(EventContent::Follow),
        Just(EventContent::Like),
        proptest::option::of(body()).prop_map(EventContent::Profile),
    ]
}

/// Parameters for generating a signed event.
#[derive(Debug, Clone)]
pub struct EventParams {
    pub seed: [u8; 32],
    pub created_at: i64,
    pub content: EventContent,
    pub refs: Vec<EventRef>,
}

impl Arbitrary for EventParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            any::<[u8; 32]>(),
            timestamp(),
            content(),
            prop::collection::vec(event_ref(), 0..4),
        )
            .prop_map(|(seed, created_at, content, refs)| EventParams {
                seed,
                created_at,
                content,
                refs,
            })
            .boxed()
    }
}

/// Generate a signed event from parameters, with the signer's key.
pub fn event_from_params(params: &EventParams) -> (SignedEvent, Keypair) {
    let keypair = Keypair::from_seed(&params.seed);
    let event = UnsignedEvent {
        created_at: params.created_at,
        author_did: Did::from_public_key(&keypair.public_key()),
        content: params.content.clone(),
        refs: params.refs.clone(),
    }
    .sign(&keypair);
    (event, keypair)
}
