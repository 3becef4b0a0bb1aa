//! Pricing state and payment plan types.
//!
//! `PricingState` is the single serializable object that crosses the
//! contract-record boundary: callers pass the current state in, the
//! derivation functions recompute the dependent fields in place, and
//! the caller persists the result. The engine itself does no I/O.
//!
//! `RowValue` keeps installment amounts as a structured `{base, vat}`
//! pair; the source platform's composite "1000 + 180" strings exist
//! only at the serialization boundary.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::tiers::TierKey;

// ──────────────────────────────────────────────
// Currency
// ──────────────────────────────────────────────

/// Contract currency. ILS is the sole VAT-bearing family; VAT is never
/// computed for the others regardless of the inclusion flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Ils,
    Usd,
    Eur,
}

/// Pricing family a currency belongs to; default tier tables are
/// maintained per family, not per currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencyFamily {
    Domestic,
    Foreign,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Ils => "ILS",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
        }
    }

    pub fn family(&self) -> CurrencyFamily {
        match self {
            Currency::Ils => CurrencyFamily::Domestic,
            Currency::Usd | Currency::Eur => CurrencyFamily::Foreign,
        }
    }

    pub fn is_vat_bearing(&self) -> bool {
        matches!(self, Currency::Ils)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ──────────────────────────────────────────────
// Payment rows
// ──────────────────────────────────────────────

/// Row role within a plan. The archival row carries the research fee
/// verbatim and is exempt from percentage redistribution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    Archival,
    #[default]
    Installment,
}

/// An installment amount: the discounted base plus the VAT computed on
/// it. Serializes as the boundary composite string ("1000 + 180" when
/// VAT applies, plain "1000" otherwise) and parses both forms back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowValue {
    pub base: Decimal,
    pub vat: Decimal,
}

impl RowValue {
    pub fn new(base: Decimal, vat: Decimal) -> RowValue {
        RowValue { base, vat }
    }

    pub fn plain(base: Decimal) -> RowValue {
        RowValue {
            base,
            vat: Decimal::ZERO,
        }
    }

    /// Base and VAT together: what the client actually pays.
    pub fn total(&self) -> Decimal {
        self.base + self.vat
    }

    /// Boundary composite form.
    pub fn composite(&self) -> String {
        if self.vat > Decimal::ZERO {
            format!("{} + {}", self.base.normalize(), self.vat.normalize())
        } else {
            self.base.normalize().to_string()
        }
    }

    /// Parse a boundary string: "1000 + 180", "1000", or "". Anything
    /// unparseable degrades to zero rather than failing.
    pub fn parse(raw: &str) -> RowValue {
        let mut parts = raw.splitn(2, '+');
        let base = parse_decimal(parts.next().unwrap_or(""));
        let vat = parse_decimal(parts.next().unwrap_or(""));
        RowValue { base, vat }
    }
}

fn parse_decimal(raw: &str) -> Decimal {
    raw.trim().parse().unwrap_or(Decimal::ZERO)
}

impl fmt::Display for RowValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.composite())
    }
}

impl Serialize for RowValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.composite())
    }
}

impl<'de> Deserialize<'de> for RowValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RowValueVisitor;

        impl Visitor<'_> for RowValueVisitor {
            type Value = RowValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a payment value string or number")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<RowValue, E> {
                Ok(RowValue::parse(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<RowValue, E> {
                Ok(RowValue::plain(Decimal::from(v)))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<RowValue, E> {
                Ok(RowValue::plain(Decimal::from(v)))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<RowValue, E> {
                Ok(RowValue::plain(
                    Decimal::try_from(v).unwrap_or(Decimal::ZERO),
                ))
            }
        }

        deserializer.deserialize_any(RowValueVisitor)
    }
}

/// One installment of a payment plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRow {
    pub label: String,
    pub percent: Decimal,
    /// Due / ordering text, carried verbatim ("Upon signing", a date…).
    #[serde(default)]
    pub payment_order: String,
    #[serde(default)]
    pub value: RowValue,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub kind: RowKind,
}

impl PaymentRow {
    pub fn installment(label: &str, percent: i64, payment_order: &str) -> PaymentRow {
        PaymentRow {
            label: label.to_string(),
            percent: Decimal::from(percent),
            payment_order: payment_order.to_string(),
            value: RowValue::default(),
            notes: String::new(),
            kind: RowKind::Installment,
        }
    }
}

// ──────────────────────────────────────────────
// Pricing state
// ──────────────────────────────────────────────

/// The derived-pricing state of one contract. Long-lived: recomputed in
/// place by [`crate::derive`] whenever one of its inputs changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingState {
    #[serde(default = "default_applicant_count")]
    pub applicant_count: u32,
    #[serde(default)]
    pub pricing_tiers: BTreeMap<TierKey, Decimal>,
    #[serde(default)]
    pub total_amount: Decimal,
    /// One of {0, 5, 10, 15, 20}; other values snap to 0 on derivation.
    #[serde(default)]
    pub discount_percentage: u8,
    #[serde(default)]
    pub discount_amount: Decimal,
    #[serde(default)]
    pub final_amount: Decimal,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub archival_research_fee: Decimal,
    #[serde(default)]
    pub vat_included: bool,
    #[serde(default)]
    pub payment_plan: Vec<PaymentRow>,
}

fn default_applicant_count() -> u32 {
    1
}

impl PricingState {
    /// A fresh state for a new contract: one applicant, the currency
    /// family's default tier table, no discount, empty plan. Derived
    /// fields are populated by [`crate::derive::refresh`].
    pub fn new(currency: Currency) -> PricingState {
        PricingState {
            applicant_count: 1,
            pricing_tiers: crate::tiers::default_tiers(currency),
            total_amount: Decimal::ZERO,
            discount_percentage: 0,
            discount_amount: Decimal::ZERO,
            final_amount: Decimal::ZERO,
            currency,
            archival_research_fee: Decimal::ZERO,
            vat_included: false,
            payment_plan: Vec::new(),
        }
    }

    /// Unit price for the band containing the current applicant count;
    /// zero when the tier is not configured.
    pub fn unit_price(&self) -> Decimal {
        let tier = TierKey::for_count(self.applicant_count);
        self.pricing_tiers
            .get(&tier)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
