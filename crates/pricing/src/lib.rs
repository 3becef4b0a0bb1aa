//! engross-pricing: derived contract pricing.
//!
//! Computes total, discount, VAT, and the percentage-weighted payment
//! plan from an applicant count and a tiered price table, and keeps the
//! derived state consistent whenever an input changes. Pure over its
//! inputs: callers pass the current [`PricingState`] in, get a
//! recomputed one out, and own persistence.
//!
//! # Public API
//!
//! - [`PricingState`] / [`PaymentRow`] / [`RowValue`] -- the state model
//! - [`refresh()`] -- totals + plan derivation in one call
//! - [`TierKey`] / [`default_tiers()`] -- applicant-count bands
//! - [`format_amount()`] -- thousands-separated amount rendering

pub mod derive;
pub mod format;
pub mod state;
pub mod tiers;

pub use derive::{derive_payment_plan, recompute_totals, refresh, vat_rate, PricingWarning};
pub use format::{format_amount, format_percent};
pub use state::{Currency, CurrencyFamily, PaymentRow, PricingState, RowKind, RowValue};
pub use tiers::{default_tiers, TierKey, TierTable};
