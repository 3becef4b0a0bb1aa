//! engross-resolve: the placeholder resolution pipeline.
//!
//! Takes a normalized contract document tree, binds stable ids to
//! interactive fields, and resolves derived tokens against pricing and
//! client state while preserving addressable fields for the
//! presentation layer. All traversal state (field counter, payment-row
//! cursor, tier cursor) is threaded through explicit context objects --
//! nothing global, every pass re-entrant.
//!
//! # Public API
//!
//! - [`ingest_template()`] -- normalize + bind field ids (template load)
//! - [`resolve_template()`] -- resolve + cleanup (every input change)
//! - [`Resolver`] / [`ResolveMode`] -- the parameterized engine
//! - [`TierMatcher`] / [`TierReport`] -- pluggable tier disambiguation
//! - [`assign_field_ids()`] / [`cleanup()`] -- individual passes

pub mod assign;
pub mod cleanup;
pub mod context;
pub mod engine;
pub mod pipeline;
pub mod tier;
pub mod token;

pub use assign::assign_field_ids;
pub use cleanup::cleanup;
pub use context::{ClientInputMap, PartyInfo, ResolveMode};
pub use engine::{ResolveWarning, Resolver};
pub use pipeline::{
    ingest_template, resolve_template, resolve_template_with_tiers, IngestedTemplate,
    ResolvedTemplate,
};
pub use tier::{TierMatcher, TierReport, TierRule};
pub use token::TokenKind;
