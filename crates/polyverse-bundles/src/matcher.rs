//! Compiled bundles and rule evaluation.
//!
//! A [`CompiledBundle`] is built once per bundle version. Keywords are
//! lowercased and patterns compiled at load time, so evaluating an event
//! never touches the regex compiler.
//!
//! Evaluation order is fixed and block rules always win:
//!
//! 1. block keyword (case-insensitive substring)
//! 2. block pattern (case-insensitive regex)
//! 3. blocked author
//! 4. if keyword or author allow lists are non-empty, require an allow
//!    keyword or an allow-listed author
//! 5. allow

use std::collections::HashSet;
use std::sync::Arc;

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use tracing::debug;

use crate::bundle::{validate, Bundle};
use crate::error::{BundleError, Result};

/// Longest accepted block pattern, in bytes.
pub const MAX_PATTERN_LEN: usize = 256;

/// Most block patterns accepted in one bundle.
pub const MAX_PATTERNS: usize = 64;

/// Upper bound on a compiled pattern's program size.
pub const REGEX_SIZE_LIMIT: usize = 1 << 20;

/// The rule that decided an evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", content = "value", rename_all = "snake_case")]
pub enum MatchedRule {
    BlockKeyword(String),
    BlockPattern(String),
    BlockAuthor(String),
    AllowKeyword(String),
    AllowAuthor(String),
    /// Allow lists are active and nothing on them matched.
    NotAllowListed,
    /// No rule applied.
    Default,
}

/// Outcome of evaluating one piece of content against a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub allowed: bool,
    pub bundle_id: String,
    pub bundle_version: String,
    pub matched: MatchedRule,
}

/// A bundle with its rules prepared for evaluation. Immutable once built.
#[derive(Debug)]
pub struct CompiledBundle {
    bundle: Arc<Bundle>,
    block_keywords: Vec<(String, String)>,
    block_patterns: Vec<(String, Regex)>,
    block_authors: HashSet<String>,
    allow_keywords: Vec<(String, String)>,
    allow_authors: HashSet<String>,
}

impl CompiledBundle {
    /// Validate and compile a bundle.
    ///
    /// Fails with [`BundleError::Config`] on missing required fields, too
    /// many or too long patterns, or a pattern that does not compile.
    pub fn compile(bundle: Bundle) -> Result<Self> {
        let errors = validate(&bundle);
        if !errors.is_empty() {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            return Err(BundleError::Config(format!(
                "bundle '{}' is invalid: {}",
                bundle.id,
                messages.join("; ")
            )));
        }

        let patterns = &bundle.block_lists.regex_patterns;
        if patterns.len() > MAX_PATTERNS {
            return Err(BundleError::Config(format!(
                "bundle '{}' has {} patterns, limit is {MAX_PATTERNS}",
                bundle.id,
                patterns.len()
            )));
        }

        let block_patterns = patterns
            .iter()
            .map(|p| compile_pattern(&bundle.id, p).map(|re| (p.clone(), re)))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            bundle_id = %bundle.id,
            version = %bundle.version,
            patterns = block_patterns.len(),
            "compiled bundle"
        );

        Ok(Self {
            block_keywords: lowered(&bundle.block_lists.keywords),
            block_patterns,
            block_authors: bundle.block_lists.authors.iter().cloned().collect(),
            allow_keywords: lowered(&bundle.allow_lists.keywords),
            allow_authors: bundle.allow_lists.authors.iter().cloned().collect(),
            bundle: Arc::new(bundle),
        })
    }

    pub fn bundle(&self) -> &Bundle {
        &self.bundle
    }

    pub fn id(&self) -> &str {
        &self.bundle.id
    }

    pub fn version(&self) -> &str {
        &self.bundle.version
    }

    /// Whether content by `author` is allowed.
    pub fn evaluate(&self, content: &str, author: &str) -> bool {
        self.evaluate_detailed(content, author).allowed
    }

    /// Evaluate and report the deciding rule.
    pub fn evaluate_detailed(&self, content: &str, author: &str) -> Decision {
        let (allowed, matched) = self.decide(content, author);
        Decision {
            allowed,
            bundle_id: self.bundle.id.clone(),
            bundle_version: self.bundle.version.clone(),
            matched,
        }
    }

    fn decide(&self, content: &str, author: &str) -> (bool, MatchedRule) {
        let lowered = content.to_lowercase();

        if let Some((original, _)) = self.block_keywords.iter().find(|(_, k)| lowered.contains(k.as_str())) {
            return (false, MatchedRule::BlockKeyword(original.clone()));
        }

        if let Some((source, _)) = self.block_patterns.iter().find(|(_, re)| re.is_match(content)) {
            return (false, MatchedRule::BlockPattern(source.clone()));
        }

        if self.block_authors.contains(author) {
            return (false, MatchedRule::BlockAuthor(author.to_string()));
        }

        if self.bundle.allow_lists.is_active() {
            if let Some((original, _)) = self.allow_keywords.iter().find(|(_, k)| lowered.contains(k.as_str())) {
                return (true, MatchedRule::AllowKeyword(original.clone()));
            }
            if self.allow_authors.contains(author) {
                return (true, MatchedRule::AllowAuthor(author.to_string()));
            }
            return (false, MatchedRule::NotAllowListed);
        }

        (true, MatchedRule::Default)
    }
}

/// Evaluate content against a compiled bundle.
pub fn evaluate(content: &str, author: &str, bundle: &CompiledBundle) -> bool {
    bundle.evaluate(content, author)
}

fn compile_pattern(bundle_id: &str, pattern: &str) -> Result<Regex> {
    if pattern.len() > MAX_PATTERN_LEN {
        return Err(BundleError::Config(format!(
            "bundle '{bundle_id}': pattern longer than {MAX_PATTERN_LEN} bytes"
        )));
    }

    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .size_limit(REGEX_SIZE_LIMIT)
        .build()
        .map_err(|e| BundleError::Config(format!("bundle '{bundle_id}': bad pattern {pattern:?}: {e}")))
}

/// Pair each keyword with its lowercased form. An empty keyword is kept and
/// matches all content, including an event with no text.
fn lowered(keywords: &[String]) -> Vec<(String, String)> {
    keywords
        .iter()
        .map(|k| (k.clone(), k.to_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::{AllowLists, BlockLists, BundleMetadata};
    use proptest::prelude::*;

    fn bundle_with(allow: AllowLists, block: BlockLists) -> Bundle {
        Bundle {
            id: "test".into(),
            name: "Test".into(),
            description: "Test".into(),
            version: "1.0.0".into(),
            allow_lists: allow,
            block_lists: block,
            filters: Default::default(),
            metadata: BundleMetadata {
                maintainer: "Test".into(),
                last_updated: "2025-01-01T00:00:00Z".into(),
                transparency_url: None,
            },
        }
    }

    fn author_lists() -> CompiledBundle {
        CompiledBundle::compile(bundle_with(
            AllowLists {
                authors: vec!["allowed-author".into()],
                ..Default::default()
            },
            BlockLists {
                authors: vec!["blocked-author".into()],
                ..Default::default()
            },
        ))
        .unwrap()
    }

    #[test]
    fn test_author_lists() {
        let compiled = author_lists();
        assert!(!compiled.evaluate("Any content", "blocked-author"));
        assert!(compiled.evaluate("Any content", "allowed-author"));
        assert!(!compiled.evaluate("Any content", "other-author"));
        assert_eq!(
            compiled.evaluate_detailed("Any content", "other-author").matched,
            MatchedRule::NotAllowListed
        );
    }

    #[test]
    fn test_block_beats_allow() {
        let compiled = CompiledBundle::compile(bundle_with(
            AllowLists {
                keywords: vec!["rust".into()],
                authors: vec!["friend".into()],
                ..Default::default()
            },
            BlockLists {
                keywords: vec!["Spam".into()],
                ..Default::default()
            },
        ))
        .unwrap();

        let decision = compiled.evaluate_detailed("rust SPAM", "friend");
        assert!(!decision.allowed);
        assert_eq!(decision.matched, MatchedRule::BlockKeyword("Spam".into()));
    }

    #[test]
    fn test_pattern_is_case_insensitive() {
        let compiled = CompiledBundle::compile(bundle_with(
            AllowLists::default(),
            BlockLists {
                regex_patterns: vec!["free.*gift".into()],
                ..Default::default()
            },
        ))
        .unwrap();

        let decision = compiled.evaluate_detailed("FREE holiday GIFT", "a");
        assert!(!decision.allowed);
        assert_eq!(decision.matched, MatchedRule::BlockPattern("free.*gift".into()));
        assert_eq!(compiled.evaluate_detailed("hello", "a").matched, MatchedRule::Default);
    }

    #[test]
    fn test_rejects_bad_patterns() {
        let compile = |patterns: Vec<String>| {
            CompiledBundle::compile(bundle_with(
                AllowLists::default(),
                BlockLists {
                    regex_patterns: patterns,
                    ..Default::default()
                },
            ))
        };

        assert!(matches!(compile(vec!["(unclosed".into()]), Err(BundleError::Config(_))));
        assert!(compile(vec!["a".repeat(MAX_PATTERN_LEN + 1)]).is_err());
        assert!(compile(vec!["x".into(); MAX_PATTERNS + 1]).is_err());
        assert!(compile(vec!["x".into(); MAX_PATTERNS]).is_ok());
        // Compiles to a program far beyond the size limit.
        assert!(compile(vec![r"(?:\w{100}){20}".into()]).is_err());
    }

    #[test]
    fn test_invalid_bundle_never_loads() {
        let mut bundle = bundle_with(AllowLists::default(), BlockLists::default());
        bundle.metadata.maintainer.clear();
        let err = CompiledBundle::compile(bundle).unwrap_err();
        assert!(err.to_string().contains("Bundle maintainer is required"));
    }

    #[test]
    fn test_decision_serializes_as_evidence() {
        let compiled = author_lists();
        let json = serde_json::to_value(compiled.evaluate_detailed("x", "blocked-author")).unwrap();
        assert_eq!(json["allowed"], false);
        assert_eq!(json["matched"]["rule"], "block_author");
        assert_eq!(json["matched"]["value"], "blocked-author");
    }

    #[test]
    fn test_empty_allow_keyword_allows_everything() {
        let compiled = CompiledBundle::compile(bundle_with(
            AllowLists {
                keywords: vec!["".into()],
                ..Default::default()
            },
            BlockLists::default(),
        ))
        .unwrap();
        for content in ["", "anything at all", "Ünïcode"] {
            let decision = compiled.evaluate_detailed(content, "stranger");
            assert!(decision.allowed, "{content:?}");
            assert_eq!(decision.matched, MatchedRule::AllowKeyword(String::new()));
        }
    }

    #[test]
    fn test_empty_block_keyword_blocks_everything() {
        let compiled = CompiledBundle::compile(bundle_with(
            AllowLists {
                authors: vec!["friend".into()],
                ..Default::default()
            },
            BlockLists {
                keywords: vec!["".into()],
                ..Default::default()
            },
        ))
        .unwrap();
        for content in ["", "hello"] {
            assert_eq!(
                compiled.evaluate_detailed(content, "friend").matched,
                MatchedRule::BlockKeyword(String::new())
            );
        }
    }

    proptest! {
        #[test]
        fn prop_blocked_author_always_rejected(content in ".{0,200}") {
            let compiled = author_lists();
            prop_assert!(!compiled.evaluate(&content, "blocked-author"));
        }

        #[test]
        fn prop_no_rules_allows_everything(content in ".{0,200}", author in "[a-z]{1,12}") {
            let compiled = CompiledBundle::compile(bundle_with(AllowLists::default(), BlockLists::default())).unwrap();
            prop_assert!(compiled.evaluate(&content, &author));
        }
    }
}
