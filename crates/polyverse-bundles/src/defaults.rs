//! Built-in bundles shipped with every registry.

use crate::bundle::{AllowLists, BlockLists, Bundle, BundleMetadata, Filters};

/// Id of the bundle used when a request names none.
pub const DEFAULT_BUNDLE_ID: &str = "default-strict";

const MAINTAINER: &str = "PolyVerse Team";
const LAST_UPDATED: &str = "2025-01-01T00:00:00Z";
const TRANSPARENCY_BASE: &str = "https://github.com/lxsolutions/polyverse/bundles";

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn metadata(id: &str) -> BundleMetadata {
    BundleMetadata {
        maintainer: MAINTAINER.into(),
        last_updated: LAST_UPDATED.into(),
        transparency_url: Some(format!("{TRANSPARENCY_BASE}/{id}")),
    }
}

/// Balanced spam and hate speech filtering.
pub fn default_strict() -> Bundle {
    Bundle {
        id: "default-strict".into(),
        name: "Default Strict Moderation".into(),
        description: "Balanced moderation with basic spam and hate speech filtering".into(),
        version: "1.0.0".into(),
        allow_lists: AllowLists {
            keywords: strings(&["opensource", "decentralized", "privacy"]),
            ..Default::default()
        },
        block_lists: BlockLists {
            keywords: strings(&[
                "spam", "scam", "phishing", "malware",
                "hate speech", "racism", "bigotry",
                "nsfw", "explicit", "pornography",
            ]),
            regex_patterns: strings(&[
                "buy now|limited time|special offer",
                "free.*gift|free.*download",
                "click.*here|subscribe.*now",
            ]),
            ..Default::default()
        },
        filters: Filters {
            min_author_reputation: Some(0.3),
            max_content_length: Some(1000),
            require_verified: Some(false),
        },
        metadata: metadata("default-strict"),
    }
}

/// Extra strict filtering for family audiences.
pub fn family_friendly() -> Bundle {
    Bundle {
        id: "family-friendly".into(),
        name: "Family Friendly".into(),
        description: "Extra strict filtering for family-friendly content".into(),
        version: "1.0.0".into(),
        allow_lists: AllowLists {
            keywords: strings(&["education", "learning", "family", "kids"]),
            ..Default::default()
        },
        block_lists: BlockLists {
            keywords: strings(&[
                "nsfw", "explicit", "adult", "porn",
                "violence", "gore", "drugs", "alcohol",
                "gambling", "cursing", "profanity",
            ]),
            regex_patterns: strings(&[
                "fuck|shit|asshole|bitch",
                "drug.*use|alcohol.*abuse",
                "gambling.*site|casino.*online",
            ]),
            ..Default::default()
        },
        filters: Filters {
            min_author_reputation: Some(0.5),
            max_content_length: Some(500),
            require_verified: Some(true),
        },
        metadata: metadata("family-friendly"),
    }
}

/// Technical content with relaxed moderation.
pub fn developer_community() -> Bundle {
    Bundle {
        id: "developer-community".into(),
        name: "Developer Community".into(),
        description: "Focused on technical content with relaxed moderation".into(),
        version: "1.0.0".into(),
        allow_lists: AllowLists {
            keywords: strings(&[
                "programming", "development", "code",
                "opensource", "github", "gitlab",
                "javascript", "python", "go", "rust",
            ]),
            ..Default::default()
        },
        block_lists: BlockLists {
            keywords: strings(&["spam", "scam", "phishing", "hate speech", "harassment"]),
            regex_patterns: strings(&[
                "buy.*followers|instagram.*growth",
                "youtube.*views|tiktok.*famous",
            ]),
            ..Default::default()
        },
        filters: Filters {
            min_author_reputation: Some(0.1),
            max_content_length: Some(2000),
            require_verified: Some(false),
        },
        metadata: metadata("developer-community"),
    }
}

/// All built-in bundles, default first.
pub fn default_bundles() -> Vec<Bundle> {
    vec![default_strict(), family_friendly(), developer_community()]
}
