//! Pipeline orchestrators: thin wrappers calling the passes in order.
//!
//! Two entry points match the two moments templates are processed:
//! ingestion (once per template: normalize + bind field ids) and
//! resolution (on every pricing or input change: resolve + cleanup +
//! root guard). The owning application re-runs resolution
//! unconditionally; every pass here is cheap and re-entrant.

use engross_doc::{normalize, Node, NormalizeWarning, TemplateInput};
use engross_pricing::PricingState;

use crate::assign::assign_field_ids;
use crate::cleanup::cleanup;
use crate::context::{ClientInputMap, PartyInfo, ResolveMode};
use crate::engine::{ResolveWarning, Resolver};
use crate::tier::{TierMatcher, TierReport};

/// A normalized template with bound field ids, ready to store.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestedTemplate {
    pub doc: Node,
    pub warnings: Vec<NormalizeWarning>,
}

/// Template-load path: normalize any accepted stored shape and bind
/// addressable field ids. Single-fire by convention, but harmless to
/// re-run: already-bound tokens are left alone.
pub fn ingest_template(input: &TemplateInput) -> IngestedTemplate {
    let (doc, warnings) = normalize(input);
    IngestedTemplate {
        doc: assign_field_ids(doc),
        warnings,
    }
}

/// A fully resolved tree plus the pass's diagnostic signals.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTemplate {
    pub doc: Node,
    pub warnings: Vec<ResolveWarning>,
    pub tier_report: TierReport,
}

/// Every-change path: substitute derived tokens, clean the tree, and
/// guard the root shape. Pure over its inputs; call it as often as the
/// inputs change.
pub fn resolve_template(
    doc: &Node,
    pricing: &PricingState,
    party: &PartyInfo,
    inputs: &ClientInputMap,
    mode: ResolveMode,
) -> ResolvedTemplate {
    resolve_template_with_tiers(doc, pricing, party, inputs, mode, TierMatcher::standard())
}

/// [`resolve_template`] with a caller-supplied tier rule set.
pub fn resolve_template_with_tiers(
    doc: &Node,
    pricing: &PricingState,
    party: &PartyInfo,
    inputs: &ClientInputMap,
    mode: ResolveMode,
    tiers: TierMatcher,
) -> ResolvedTemplate {
    let mut resolver = Resolver::with_tier_matcher(pricing, party, inputs, mode, tiers);
    let resolved = resolver.resolve(doc);
    let (mut warnings, tier_report) = resolver.finish();

    let doc = if resolved.is_doc() {
        cleanup(resolved)
    } else {
        // Defensive: a malformed tree never reaches the presentation
        // layer as anything but a doc.
        tracing::warn!(
            target: "engross::resolve",
            "resolution produced a non-doc root; resetting to empty document"
        );
        warnings.push(ResolveWarning::RootReset);
        Node::empty_doc()
    };

    ResolvedTemplate {
        doc,
        warnings,
        tier_report,
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
