//! Applicant-count tier bands and per-currency default price tables.
//!
//! Tier keys partition applicant counts into fixed bands; exactly one
//! band matches any count ≥ 1. Keys serialize as their band strings
//! ("1", "4-7", "16+") so tier tables round-trip as plain JSON maps.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::state::{Currency, CurrencyFamily};

/// One applicant-count band of the tiered price table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TierKey {
    One,
    Two,
    Three,
    FourToSeven,
    EightToNine,
    TenToFifteen,
    SixteenPlus,
}

impl TierKey {
    /// All bands in ascending canonical order.
    pub const ALL: [TierKey; 7] = [
        TierKey::One,
        TierKey::Two,
        TierKey::Three,
        TierKey::FourToSeven,
        TierKey::EightToNine,
        TierKey::TenToFifteen,
        TierKey::SixteenPlus,
    ];

    /// The band containing `count`. Counts below 1 are clamped to 1.
    pub fn for_count(count: u32) -> TierKey {
        match count.max(1) {
            1 => TierKey::One,
            2 => TierKey::Two,
            3 => TierKey::Three,
            4..=7 => TierKey::FourToSeven,
            8..=9 => TierKey::EightToNine,
            10..=15 => TierKey::TenToFifteen,
            _ => TierKey::SixteenPlus,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TierKey::One => "1",
            TierKey::Two => "2",
            TierKey::Three => "3",
            TierKey::FourToSeven => "4-7",
            TierKey::EightToNine => "8-9",
            TierKey::TenToFifteen => "10-15",
            TierKey::SixteenPlus => "16+",
        }
    }

    pub fn parse(s: &str) -> Option<TierKey> {
        match s {
            "1" => Some(TierKey::One),
            "2" => Some(TierKey::Two),
            "3" => Some(TierKey::Three),
            "4-7" => Some(TierKey::FourToSeven),
            "8-9" => Some(TierKey::EightToNine),
            "10-15" => Some(TierKey::TenToFifteen),
            "16+" => Some(TierKey::SixteenPlus),
            _ => None,
        }
    }
}

impl fmt::Display for TierKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TierKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TierKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TierKeyVisitor;

        impl Visitor<'_> for TierKeyVisitor {
            type Value = TierKey;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a tier band string such as \"1\" or \"4-7\"")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<TierKey, E> {
                TierKey::parse(v)
                    .ok_or_else(|| E::custom(format!("unknown tier band '{v}'")))
            }
        }

        deserializer.deserialize_str(TierKeyVisitor)
    }
}

/// A tier price table: unit price per applicant-count band.
pub type TierTable = BTreeMap<TierKey, Decimal>;

/// Default tier table for a currency family, used when a contract has
/// no table of its own yet. One table per family: domestic (ILS) and
/// foreign (USD/EUR) pricing.
pub fn default_tiers(currency: Currency) -> TierTable {
    let prices: [i64; 7] = match currency.family() {
        CurrencyFamily::Domestic => [15_000, 13_500, 12_000, 10_500, 9_500, 8_500, 7_500],
        CurrencyFamily::Foreign => [4_400, 3_900, 3_500, 3_100, 2_800, 2_500, 2_200],
    };
    TierKey::ALL
        .iter()
        .zip(prices)
        .map(|(key, price)| (*key, Decimal::from(price)))
        .collect()
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
