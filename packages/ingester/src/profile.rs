//! Jurisdiction profiles and the profile registry.
//!
//! A profile bundles everything the dispatcher needs for one publishing
//! platform: the detector chain, the citation marker and the optional
//! full-text resolver. Supporting a new jurisdiction means registering a
//! profile; the dispatcher itself does not change.

use std::collections::HashMap;

use crate::boundary::{Acceptance, PatternDetector, SectionElementDetector, StrategyChain};
use crate::config::SegmentationConfig;
use crate::error::{IngesterError, Result};
use crate::resolve::FullTextResolver;
use crate::types::Jurisdiction;

/// Segmentation profile of a jurisdiction.
pub struct JurisdictionProfile {
    /// Jurisdiction this profile applies to.
    pub jurisdiction: Jurisdiction,

    /// Citation marker, e.g. "art." or "s.".
    pub citation_marker: String,

    /// Boundary detection steps, in evaluation order.
    pub chain: StrategyChain,

    /// Resolver for landing pages, if the platform has them.
    pub resolver: Option<FullTextResolver>,

    /// Minimum provision body length in characters.
    pub min_body_chars: usize,
}

impl JurisdictionProfile {
    /// Create a profile without resolver.
    #[must_use]
    pub fn new(
        jurisdiction: Jurisdiction,
        citation_marker: impl Into<String>,
        chain: StrategyChain,
        min_body_chars: usize,
    ) -> Self {
        Self {
            jurisdiction,
            citation_marker: citation_marker.into(),
            chain,
            resolver: None,
            min_body_chars,
        }
    }

    /// Attach a full-text resolver.
    #[must_use]
    pub fn with_resolver(mut self, resolver: FullTextResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }
}

/// Registry of jurisdiction profiles.
pub struct ProfileRegistry {
    profiles: HashMap<Jurisdiction, JurisdictionProfile>,
}

impl ProfileRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            profiles: HashMap::new(),
        }
    }

    /// Register a profile, replacing any previous one for the jurisdiction.
    pub fn register(&mut self, profile: JurisdictionProfile) {
        self.profiles.insert(profile.jurisdiction, profile);
    }

    /// Get the profile for a jurisdiction.
    #[must_use]
    pub fn get(&self, jurisdiction: Jurisdiction) -> Option<&JurisdictionProfile> {
        self.profiles.get(&jurisdiction)
    }

    /// Check if a jurisdiction can be segmented.
    #[must_use]
    pub fn supports(&self, jurisdiction: Jurisdiction) -> bool {
        self.profiles.contains_key(&jurisdiction)
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Marker word of LégisQuébec pages that put the article number on its own line.
pub const QUEBEC_ARTICLE_MARKER: &str = "Article";

/// LégisQuébec profile.
///
/// ```text
/// numeric-dot   "12. Texte"         accepted with >= 1 match
/// word-marker   "Article 12" line   accepted with >= 1 match
/// ```
pub fn quebec_profile(config: &SegmentationConfig) -> Result<JurisdictionProfile> {
    let word_marker = PatternDetector::word_marker(QUEBEC_ARTICLE_MARKER)
        .map_err(|e| IngesterError::Config(format!("invalid article marker pattern: {e}")))?;

    let chain = StrategyChain::new()
        .then(PatternDetector::numeric_dot(), Acceptance::AtLeast(1))
        .then(word_marker, Acceptance::AtLeast(1));

    Ok(JurisdictionProfile::new(
        Jurisdiction::Quebec,
        "art.",
        chain,
        config.min_body_chars,
    ))
}

/// Justice Laws profile.
///
/// ```text
/// section-element   DOM sections       accepted with >= federal_min_sections
/// heading-line      "12 Heading" text  always accepted
/// ```
#[must_use]
pub fn federal_profile(config: &SegmentationConfig) -> JurisdictionProfile {
    let chain = StrategyChain::new()
        .then(
            SectionElementDetector::new(config.min_candidate_chars, config.min_body_chars),
            Acceptance::AtLeast(config.federal_min_sections),
        )
        .then(PatternDetector::heading_line(), Acceptance::Always);

    JurisdictionProfile::new(Jurisdiction::Federal, "s.", chain, config.min_body_chars)
        .with_resolver(FullTextResolver::justice_laws())
}

/// Create the registry with every supported jurisdiction.
pub fn create_default_profiles(config: &SegmentationConfig) -> Result<ProfileRegistry> {
    let mut registry = ProfileRegistry::new();
    registry.register(quebec_profile(config)?);
    registry.register(federal_profile(config));
    Ok(registry)
}
