//! Placeholder token grammar.
//!
//! A token is a substring `{{kind}}` or `{{kind:id}}` inside a text
//! node. Addressable kinds (`text`, `signature`, `date`) survive
//! resolution and key the client input map once they carry an id;
//! every other kind resolves to plain text and is not retained.

use once_cell::sync::Lazy;
use regex::Regex;

use engross_pricing::TierKey;

/// Matches any `{{kind}}` / `{{kind:id}}` occurrence. Kind names may
/// carry the band characters (`price_4-7`, `price_16+`).
pub static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{([A-Za-z0-9_+-]+?)(?::([A-Za-z0-9_-]+))?\}\}").expect("token regex"));

/// Matches only the bare, id-less addressable fields the assignment
/// pass binds. Already-addressed tokens never match, which is what
/// makes assignment idempotent.
pub static BARE_FIELD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{(text|signature)\}\}").expect("bare field regex"));

/// Matches any addressable token, bound or not. Used by the cleanup
/// pass to keep nodes that still hold interactive fields.
pub static ADDRESSABLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{(?:text|signature|date)(?::[A-Za-z0-9_-]+)?\}\}").expect("addressable regex")
});

/// Parsed token kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Addressable fields.
    Text,
    Signature,
    Date,
    // Client projection.
    ClientName,
    ClientPhone,
    ClientEmail,
    // Pricing projection.
    Currency,
    ApplicantCount,
    TotalAmount,
    FinalAmount,
    DiscountPercentage,
    DiscountAmount,
    PricePerApplicant,
    PriceTier(TierKey),
    // Payment plan projection. Indexed variants are 1-based in the
    // template grammar.
    PaymentPlanRow,
    PaymentPercent(usize),
    PaymentValue(usize),
    PaymentDue(usize),
    PaymentRowIndexed(usize),
}

impl TokenKind {
    /// Parse a kind name as it appears between the braces (without id).
    /// Unknown names return `None`; the resolver leaves those verbatim.
    pub fn parse(kind: &str) -> Option<TokenKind> {
        match kind {
            "text" => Some(TokenKind::Text),
            "signature" => Some(TokenKind::Signature),
            "date" => Some(TokenKind::Date),
            "client_name" => Some(TokenKind::ClientName),
            "client_phone" => Some(TokenKind::ClientPhone),
            "client_email" => Some(TokenKind::ClientEmail),
            "currency" => Some(TokenKind::Currency),
            "applicant_count" => Some(TokenKind::ApplicantCount),
            "total_amount" => Some(TokenKind::TotalAmount),
            "final_amount" => Some(TokenKind::FinalAmount),
            "discount_percentage" => Some(TokenKind::DiscountPercentage),
            "discount_amount" => Some(TokenKind::DiscountAmount),
            "price_per_applicant" => Some(TokenKind::PricePerApplicant),
            "payment_plan_row" => Some(TokenKind::PaymentPlanRow),
            other => {
                if let Some(band) = other.strip_prefix("price_") {
                    return TierKey::parse(band).map(TokenKind::PriceTier);
                }
                if let Some(rest) = other.strip_prefix("payment_") {
                    let (index, field) = rest.split_once('_')?;
                    let index: usize = index.parse().ok()?;
                    if index == 0 {
                        return None;
                    }
                    return match field {
                        "percent" => Some(TokenKind::PaymentPercent(index)),
                        "value" => Some(TokenKind::PaymentValue(index)),
                        "due" => Some(TokenKind::PaymentDue(index)),
                        "row" => Some(TokenKind::PaymentRowIndexed(index)),
                        _ => None,
                    };
                }
                None
            }
        }
    }

    /// Addressable fields survive resolution; everything else is a
    /// derived token.
    pub fn is_addressable(&self) -> bool {
        matches!(self, TokenKind::Text | TokenKind::Signature | TokenKind::Date)
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fixed_kinds() {
        assert_eq!(TokenKind::parse("text"), Some(TokenKind::Text));
        assert_eq!(TokenKind::parse("client_email"), Some(TokenKind::ClientEmail));
        assert_eq!(TokenKind::parse("payment_plan_row"), Some(TokenKind::PaymentPlanRow));
        assert_eq!(TokenKind::parse("nonsense"), None);
    }

    #[test]
    fn parses_tier_price_kinds() {
        assert_eq!(
            TokenKind::parse("price_1"),
            Some(TokenKind::PriceTier(TierKey::One))
        );
        assert_eq!(
            TokenKind::parse("price_4-7"),
            Some(TokenKind::PriceTier(TierKey::FourToSeven))
        );
        assert_eq!(
            TokenKind::parse("price_16+"),
            Some(TokenKind::PriceTier(TierKey::SixteenPlus))
        );
        assert_eq!(TokenKind::parse("price_5"), None);
    }

    #[test]
    fn parses_indexed_payment_kinds() {
        assert_eq!(
            TokenKind::parse("payment_1_percent"),
            Some(TokenKind::PaymentPercent(1))
        );
        assert_eq!(
            TokenKind::parse("payment_3_value"),
            Some(TokenKind::PaymentValue(3))
        );
        assert_eq!(
            TokenKind::parse("payment_2_due"),
            Some(TokenKind::PaymentDue(2))
        );
        assert_eq!(
            TokenKind::parse("payment_2_row"),
            Some(TokenKind::PaymentRowIndexed(2))
        );
        assert_eq!(TokenKind::parse("payment_0_percent"), None);
        assert_eq!(TokenKind::parse("payment_x_percent"), None);
        assert_eq!(TokenKind::parse("payment_1_color"), None);
    }

    #[test]
    fn token_regex_captures_kind_and_id() {
        let caps = TOKEN_RE
            .captures("before {{text:text-3}} after")
            .expect("match");
        assert_eq!(&caps[1], "text");
        assert_eq!(caps.get(2).map(|m| m.as_str()), Some("text-3"));

        let caps = TOKEN_RE.captures("{{price_16+}}").expect("match");
        assert_eq!(&caps[1], "price_16+");
        assert_eq!(caps.get(2), None);
    }

    #[test]
    fn bare_field_regex_ignores_bound_tokens() {
        assert!(BARE_FIELD_RE.is_match("{{text}}"));
        assert!(BARE_FIELD_RE.is_match("{{signature}}"));
        assert!(!BARE_FIELD_RE.is_match("{{text:text-1}}"));
        assert!(!BARE_FIELD_RE.is_match("{{date}}"));
    }

    #[test]
    fn addressable_regex_matches_bound_and_unbound() {
        assert!(ADDRESSABLE_RE.is_match("{{text}}"));
        assert!(ADDRESSABLE_RE.is_match("{{signature:signature-2}}"));
        assert!(ADDRESSABLE_RE.is_match("{{date:date-1}}"));
        assert!(!ADDRESSABLE_RE.is_match("{{total_amount}}"));
    }
}
