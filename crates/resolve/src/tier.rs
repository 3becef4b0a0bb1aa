//! Tier disambiguation for context-free `{{price_per_applicant}}`
//! tokens.
//!
//! The heuristic is textual and template-dependent: each occurrence is
//! matched against up to 200 characters of preceding document text
//! using an ordered rule list, most-specific band first. When no phrase
//! matches, a sequential fallback consumes the configured (non-zero
//! priced) bands in ascending order, one cursor shared across all
//! occurrences of a resolution pass.
//!
//! Rules are data, not branching: new phrasings or languages extend
//! [`TierMatcher::standard`] without touching the resolver.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use engross_pricing::TierKey;

/// One disambiguation rule: phrases that pin a specific band.
#[derive(Debug, Clone)]
pub struct TierRule {
    pub tier: TierKey,
    patterns: Vec<Regex>,
}

impl TierRule {
    pub fn new(tier: TierKey, patterns: Vec<Regex>) -> TierRule {
        TierRule { tier, patterns }
    }

    fn matches(&self, context: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(context))
    }
}

/// Counts from one resolution pass: how each `price_per_applicant`
/// occurrence was decided. Lets callers validate the heuristic against
/// the tier counts they expected instead of trusting it silently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct TierReport {
    /// Occurrences pinned by a phrase rule.
    pub matched: usize,
    /// Occurrences assigned by the sequential fallback.
    pub fallback: usize,
    /// Occurrences no band could be found for (substituted with '0').
    pub unresolved: usize,
}

// English and Hebrew phrasings per band, most-specific band first.
// Range bands match on the numeric range itself; the small bands need
// the "applicant(s)" anchor so digits inside ranges never leak.
static STANDARD_RULES: Lazy<Vec<TierRule>> = Lazy::new(|| {
    fn rule(tier: TierKey, patterns: &[&str]) -> TierRule {
        TierRule::new(
            tier,
            patterns
                .iter()
                .map(|p| Regex::new(p).expect("tier rule regex"))
                .collect(),
        )
    }

    vec![
        rule(
            TierKey::SixteenPlus,
            &[
                r"(?i)16\s*\+",
                r"(?i)\b16\s+(?:or\s+more|and\s+(?:up|above))",
                r"(?i)\bsixteen\s+or\s+more",
                r"16\s+ומעלה",
            ],
        ),
        rule(TierKey::TenToFifteen, &[r"10\s*[-–]\s*15"]),
        rule(TierKey::EightToNine, &[r"8\s*[-–]\s*9"]),
        rule(TierKey::FourToSeven, &[r"4\s*[-–]\s*7"]),
        rule(
            TierKey::Three,
            &[
                r"(?i)\b3\s+applicants",
                r"(?i)\bthree\s+applicants",
                r"שלושה\s+מבקשים",
            ],
        ),
        rule(
            TierKey::Two,
            &[
                r"(?i)\b2\s+applicants",
                r"(?i)\btwo\s+applicants",
                r"(?i)\bcouple\b",
                r"(?:ל?שני|שתי)\s+מבקשים",
                r"זוג\s+מבקשים",
            ],
        ),
        rule(
            TierKey::One,
            &[
                r"(?i)\b1\s+applicant\b",
                r"(?i)\b(?:one|single)\s+applicant\b",
                r"מבקש\s+(?:אחד|יחיד)",
            ],
        ),
    ]
});

/// How many characters of preceding text a phrase rule may see.
const CONTEXT_WINDOW: usize = 200;

/// Stateful tier disambiguator for one resolution pass.
#[derive(Debug, Clone)]
pub struct TierMatcher {
    rules: Vec<TierRule>,
    cursor: usize,
    report: TierReport,
}

impl TierMatcher {
    /// Matcher with the stock English + Hebrew rule set.
    pub fn standard() -> TierMatcher {
        TierMatcher::with_rules(STANDARD_RULES.clone())
    }

    /// Matcher with a caller-supplied rule set, ordered most-specific
    /// first.
    pub fn with_rules(rules: Vec<TierRule>) -> TierMatcher {
        TierMatcher {
            rules,
            cursor: 0,
            report: TierReport::default(),
        }
    }

    /// Decide the band for one occurrence given the text preceding it.
    /// Specific phrase matches always beat the sequential fallback,
    /// regardless of the cursor position.
    pub fn resolve(
        &mut self,
        preceding: &str,
        tiers: &BTreeMap<TierKey, Decimal>,
    ) -> Option<TierKey> {
        let window = tail_chars(preceding, CONTEXT_WINDOW);
        for rule in &self.rules {
            if rule.matches(window) {
                self.report.matched += 1;
                return Some(rule.tier);
            }
        }

        // Sequential fallback: consume configured bands in ascending
        // canonical order, skipping unpriced ones.
        let priced: Vec<TierKey> = TierKey::ALL
            .iter()
            .copied()
            .filter(|key| tiers.get(key).is_some_and(|price| !price.is_zero()))
            .collect();
        match priced.get(self.cursor) {
            Some(key) => {
                self.cursor += 1;
                self.report.fallback += 1;
                Some(*key)
            }
            None => {
                self.report.unresolved += 1;
                None
            }
        }
    }

    pub fn report(&self) -> TierReport {
        self.report
    }
}

/// Last `n` characters of `s` (character-, not byte-counted: the
/// secondary language is multi-byte).
fn tail_chars(s: &str, n: usize) -> &str {
    match s.char_indices().rev().nth(n.saturating_sub(1)) {
        Some((idx, _)) => &s[idx..],
        None => s,
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
