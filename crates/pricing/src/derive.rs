//! Totals, discount, VAT, and payment plan derivation.
//!
//! All arithmetic uses `rust_decimal::Decimal`; ledger values round to
//! whole units with `MidpointAwayFromZero` (the commercial rounding of
//! the source platform). No `f64` anywhere in the derivation path.
//!
//! Derivation is idempotent: re-running any function on its own output
//! with unchanged inputs reproduces the same values, so callers may
//! re-run unconditionally on every input change.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::state::{PaymentRow, PricingState, RowKind, RowValue};
use crate::tiers::TierKey;

/// VAT rate applied in the VAT-bearing currency family: 18%.
pub fn vat_rate() -> Decimal {
    Decimal::new(18, 2)
}

/// Discount percentages the product offers; anything else snaps to 0.
const DISCOUNT_STEPS: [u8; 5] = [0, 5, 10, 15, 20];

/// Non-fatal findings from plan derivation, surfaced to the caller and
/// shown to the user; they never block derivation or save.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PricingWarning {
    /// Installment percentages do not sum to 100.
    #[error("payment plan percentages sum to {total}, expected 100")]
    PlanPercentTotal { total: Decimal },
}

fn round_unit(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

// ──────────────────────────────────────────────
// Totals
// ──────────────────────────────────────────────

/// Recompute `total_amount`, `discount_amount`, and `final_amount` from
/// the applicant count and the tier table. Clamps the count to ≥ 1 and
/// snaps an out-of-range discount percentage to 0.
pub fn recompute_totals(state: &mut PricingState) {
    if state.applicant_count < 1 {
        state.applicant_count = 1;
    }
    if !DISCOUNT_STEPS.contains(&state.discount_percentage) {
        tracing::debug!(
            target: "engross::pricing",
            "discount percentage {} outside offered steps; snapping to 0",
            state.discount_percentage
        );
        state.discount_percentage = 0;
    }

    let tier = TierKey::for_count(state.applicant_count);
    let unit = state
        .pricing_tiers
        .get(&tier)
        .copied()
        .unwrap_or(Decimal::ZERO);

    state.total_amount = unit * Decimal::from(state.applicant_count);
    state.discount_amount = round_unit(
        state.total_amount * Decimal::from(state.discount_percentage) / Decimal::from(100),
    );
    state.final_amount = state.total_amount - state.discount_amount;
}

// ──────────────────────────────────────────────
// Payment plan
// ──────────────────────────────────────────────

/// Recompute every row value of the payment plan from the current
/// totals. Existing rows keep their percent/label/payment_order/notes;
/// an empty plan is synthesized first. Returns non-fatal warnings.
pub fn derive_payment_plan(state: &mut PricingState) -> Vec<PricingWarning> {
    let mut warnings = Vec::new();

    let fee = state.archival_research_fee;
    // Installment rows split the discounted service total; the archival
    // fee travels on its own fixed row, so the whole plan sums to
    // (total + fee) − discount.
    let pool = state.total_amount - state.discount_amount;
    let vat_bearing = state.currency.is_vat_bearing();

    let mut plan = if state.payment_plan.is_empty() {
        default_plan(fee)
    } else {
        state.payment_plan.clone()
    };

    let total_percent: Decimal = plan
        .iter()
        .filter(|row| row.kind == RowKind::Installment)
        .map(|row| row.percent)
        .sum();
    if total_percent != Decimal::from(100) {
        warnings.push(PricingWarning::PlanPercentTotal {
            total: total_percent,
        });
    }
    let effective_percent = if total_percent.is_zero() {
        Decimal::from(100)
    } else {
        total_percent
    };

    for row in plan.iter_mut() {
        match row.kind {
            RowKind::Archival => {
                row.value = RowValue::plain(fee);
            }
            RowKind::Installment => {
                let base = round_unit(pool * row.percent / effective_percent);
                let vat = if vat_bearing && state.vat_included {
                    round_unit(base * vat_rate())
                } else {
                    Decimal::ZERO
                };
                row.value = RowValue::new(base, vat);
            }
        }
    }

    // Deterministic terminal label regardless of row count.
    if let Some(last) = plan
        .iter_mut()
        .rev()
        .find(|row| row.kind == RowKind::Installment)
    {
        last.label = "Final Payment".to_string();
    }

    state.payment_plan = plan;
    warnings
}

/// Stock plan for contracts without one: the archival research row
/// (only when a fee is configured) followed by a 50/25/25 split.
fn default_plan(fee: Decimal) -> Vec<PaymentRow> {
    let mut plan = Vec::with_capacity(4);
    if fee > Decimal::ZERO {
        plan.push(PaymentRow {
            label: "Archival Research".to_string(),
            percent: Decimal::from(100),
            payment_order: "Upon signing".to_string(),
            value: RowValue::plain(fee),
            notes: String::new(),
            kind: RowKind::Archival,
        });
    }
    plan.push(PaymentRow::installment("First Payment", 50, "Upon signing"));
    plan.push(PaymentRow::installment(
        "Intermediate Payment",
        25,
        "Upon document submission",
    ));
    plan.push(PaymentRow::installment(
        "Final Payment",
        25,
        "Upon completion",
    ));
    plan
}

/// Full derivation: totals, then the payment plan. This is the single
/// entry point callers trigger on any change to the applicant count, a
/// tier price, the discount, the fee, the currency, or the VAT flag.
pub fn refresh(state: &mut PricingState) -> Vec<PricingWarning> {
    recompute_totals(state);
    derive_payment_plan(state)
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
