//! Placeholder resolution: derived tokens become text, addressable
//! fields survive.
//!
//! One engine serves every rendering surface (editor, preview, public
//! link, signed view); [`ResolveMode`] parameterizes the differences.
//! A `Resolver` runs exactly one pass: the payment-row cursor, the tier
//! matcher, and the preceding-text buffer are threaded by `&mut`
//! through the whole recursion and never re-initialized per branch, so
//! the 2nd `payment_plan_row` token anywhere in the tree uses plan
//! index 1 regardless of which branch it sits in.
//!
//! The pass is a pure map over the tree: stripping may leave empty
//! text nodes behind, and the cleanup pass removes those afterwards.

use std::borrow::Cow;

use regex::Captures;
use rust_decimal::Decimal;

use engross_doc::Node;
use engross_pricing::{format_amount, format_percent, PaymentRow, PricingState};

use crate::context::{
    format_date_value, ClientInputMap, ModeProfile, PartyInfo, ResolveMode, FIELD_PLACEHOLDER,
    NO_INPUT, SIGNATURE_PLACEHOLDER,
};
use crate::tier::{TierMatcher, TierReport};
use crate::token::{TokenKind, TOKEN_RE};

/// Non-fatal findings from one resolution pass. Every condition here is
/// recovered with a safe substitute; these only make the recovery
/// visible to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolveWarning {
    /// No tier could be assigned to a `price_per_applicant` token.
    #[error("no tier could be assigned to a price_per_applicant token; substituted 0")]
    TierUnresolved,
    /// A payment token referenced a row past the end of the plan.
    #[error("payment token references row {index} but the plan has {rows} rows")]
    PaymentRowOutOfRange { index: usize, rows: usize },
    /// Resolution produced a non-doc root; the tree was reset.
    #[error("resolution produced a non-doc root; reset to an empty document")]
    RootReset,
}

/// Single-pass placeholder resolver. Build one per pass; the pipeline
/// re-creates it on every run, which keeps every cursor fresh without
/// any global state.
pub struct Resolver<'a> {
    pricing: &'a PricingState,
    party: &'a PartyInfo,
    inputs: &'a ClientInputMap,
    profile: ModeProfile,
    tiers: TierMatcher,
    payment_cursor: usize,
    /// Flattened template text already traversed, in document order.
    /// Tier disambiguation reads its tail as phrase context.
    preceding: String,
    warnings: Vec<ResolveWarning>,
}

impl<'a> Resolver<'a> {
    pub fn new(
        pricing: &'a PricingState,
        party: &'a PartyInfo,
        inputs: &'a ClientInputMap,
        mode: ResolveMode,
    ) -> Resolver<'a> {
        Resolver::with_tier_matcher(pricing, party, inputs, mode, TierMatcher::standard())
    }

    /// Resolver with a caller-supplied tier rule set.
    pub fn with_tier_matcher(
        pricing: &'a PricingState,
        party: &'a PartyInfo,
        inputs: &'a ClientInputMap,
        mode: ResolveMode,
        tiers: TierMatcher,
    ) -> Resolver<'a> {
        Resolver {
            pricing,
            party,
            inputs,
            profile: mode.profile(),
            tiers,
            payment_cursor: 0,
            preceding: String::new(),
            warnings: Vec::new(),
        }
    }

    /// Resolve the whole tree, returning a new one.
    pub fn resolve(&mut self, doc: &Node) -> Node {
        self.resolve_node(doc)
    }

    /// Warnings and the tier disambiguation report for this pass.
    pub fn finish(self) -> (Vec<ResolveWarning>, TierReport) {
        (self.warnings, self.tiers.report())
    }

    // ── Tree walk ───────────────────────────────────────────────────

    fn resolve_node(&mut self, node: &Node) -> Node {
        match node {
            Node::Text { text, marks } => {
                let resolved = self.resolve_text(text);
                // The authored text becomes context for later tokens.
                self.preceding.push_str(text);
                Node::Text {
                    text: resolved,
                    marks: marks.clone(),
                }
            }
            Node::HardBreak => {
                self.preceding.push('\n');
                Node::HardBreak
            }
            Node::HorizontalRule => Node::HorizontalRule,
            Node::Doc { content } => Node::Doc {
                content: self.resolve_children(content),
            },
            Node::BulletList { attrs, content } => Node::BulletList {
                attrs: attrs.clone(),
                content: self.resolve_children(content),
            },
            Node::OrderedList { attrs, content } => Node::OrderedList {
                attrs: attrs.clone(),
                content: self.resolve_children(content),
            },
            Node::Paragraph { attrs, content } => {
                let content = self.resolve_children(content);
                self.preceding.push('\n');
                Node::Paragraph {
                    attrs: attrs.clone(),
                    content,
                }
            }
            Node::Heading { attrs, content } => {
                let content = self.resolve_children(content);
                self.preceding.push('\n');
                Node::Heading {
                    attrs: attrs.clone(),
                    content,
                }
            }
            Node::ListItem { attrs, content } => {
                let content = self.resolve_children(content);
                self.preceding.push('\n');
                Node::ListItem {
                    attrs: attrs.clone(),
                    content,
                }
            }
            Node::Blockquote { attrs, content } => {
                let content = self.resolve_children(content);
                self.preceding.push('\n');
                Node::Blockquote {
                    attrs: attrs.clone(),
                    content,
                }
            }
        }
    }

    fn resolve_children(&mut self, content: &[Node]) -> Vec<Node> {
        content.iter().map(|child| self.resolve_node(child)).collect()
    }

    // ── Text substitution ───────────────────────────────────────────

    fn resolve_text(&mut self, text: &str) -> String {
        let source = if self.pricing.discount_percentage == 0 {
            strip_discount_lines(text)
        } else {
            Cow::Borrowed(text)
        };

        TOKEN_RE
            .replace_all(source.as_ref(), |caps: &Captures<'_>| {
                let raw = caps.get(0).map(|m| m.as_str()).unwrap_or("");
                let start = caps.get(0).map(|m| m.start()).unwrap_or(0);
                let id = caps.get(2).map(|m| m.as_str());
                match TokenKind::parse(&caps[1]) {
                    Some(kind) if kind.is_addressable() => {
                        self.resolve_addressable(kind, id, raw)
                    }
                    Some(kind) => {
                        let context = format!("{}{}", self.preceding, &source[..start]);
                        self.resolve_derived(kind, &context)
                    }
                    // Unknown kinds stay visible to the template author.
                    None => raw.to_string(),
                }
            })
            .into_owned()
    }

    fn resolve_derived(&mut self, kind: TokenKind, context: &str) -> String {
        match kind {
            TokenKind::ClientName => self.party.name().to_string(),
            TokenKind::ClientPhone => self.party.phone().to_string(),
            TokenKind::ClientEmail => self.party.email().to_string(),

            TokenKind::Currency => self.pricing.currency.code().to_string(),
            TokenKind::ApplicantCount => self.pricing.applicant_count.to_string(),
            TokenKind::TotalAmount => format_amount(self.pricing.total_amount),
            TokenKind::FinalAmount => format_amount(self.pricing.final_amount),
            TokenKind::DiscountPercentage => {
                format_percent(Decimal::from(self.pricing.discount_percentage))
            }
            TokenKind::DiscountAmount => format_amount(self.pricing.discount_amount),

            TokenKind::PriceTier(key) => self.render_tier_price(key),
            TokenKind::PricePerApplicant => {
                match self.tiers.resolve(context, &self.pricing.pricing_tiers) {
                    Some(key) => self.render_tier_price(key),
                    None => {
                        self.warnings.push(ResolveWarning::TierUnresolved);
                        "0".to_string()
                    }
                }
            }

            TokenKind::PaymentPlanRow => {
                let index = self.payment_cursor;
                self.payment_cursor += 1;
                self.render_plan_row(index)
            }
            TokenKind::PaymentRowIndexed(n) => self.render_plan_row(n - 1),
            TokenKind::PaymentPercent(n) => self
                .payment_row(n - 1)
                .map(|row| format_percent(row.percent))
                .unwrap_or_else(|| "0".to_string()),
            TokenKind::PaymentValue(n) => match self.payment_row(n - 1) {
                Some(row) => self.render_row_value(row),
                None => "0".to_string(),
            },
            TokenKind::PaymentDue(n) => self
                .payment_row(n - 1)
                .map(|row| row.payment_order.clone())
                .unwrap_or_default(),

            // Addressable kinds never reach this path.
            TokenKind::Text | TokenKind::Signature | TokenKind::Date => String::new(),
        }
    }

    fn resolve_addressable(&mut self, kind: TokenKind, id: Option<&str>, raw: &str) -> String {
        // A field that never got an id cannot hold input; outside the
        // editor it renders as a static blank.
        if id.is_none() && self.profile.staticize_unbound {
            return match kind {
                TokenKind::Signature => SIGNATURE_PLACEHOLDER.to_string(),
                _ => FIELD_PLACEHOLDER.to_string(),
            };
        }

        if self.profile.substitute_inputs {
            let value = id
                .and_then(|id| self.inputs.get(id))
                .map(String::as_str)
                .filter(|v| !v.is_empty());
            return match kind {
                TokenKind::Date => value
                    .map(format_date_value)
                    .unwrap_or_else(|| NO_INPUT.to_string()),
                TokenKind::Signature => value
                    .map(str::to_string)
                    .unwrap_or_else(|| SIGNATURE_PLACEHOLDER.to_string()),
                _ => value.unwrap_or(NO_INPUT).to_string(),
            };
        }

        // Interactive surfaces keep the token for the presentation
        // layer to render as a control.
        raw.to_string()
    }

    // ── Rendering helpers ───────────────────────────────────────────

    /// A configured tier renders as "<code> <amount>"; an unconfigured
    /// one degrades to the bare safe default.
    fn render_tier_price(&self, key: engross_pricing::TierKey) -> String {
        match self.pricing.pricing_tiers.get(&key) {
            Some(price) => format!(
                "{} {}",
                self.pricing.currency.code(),
                format_amount(*price)
            ),
            None => "0".to_string(),
        }
    }

    fn render_plan_row(&mut self, index: usize) -> String {
        match self.payment_row(index) {
            Some(row) => {
                let display = self.render_row_value(row);
                format!(
                    "{}% = {} {}",
                    format_percent(row.percent),
                    self.pricing.currency.code(),
                    display
                )
            }
            None => "0".to_string(),
        }
    }

    fn render_row_value(&self, row: &PaymentRow) -> String {
        if self.profile.composite_values {
            row.value.composite()
        } else {
            format_amount(row.value.total())
        }
    }

    fn payment_row(&mut self, index: usize) -> Option<&'a PaymentRow> {
        let pricing = self.pricing;
        let row = pricing.payment_plan.get(index);
        if row.is_none() {
            self.warnings.push(ResolveWarning::PaymentRowOutOfRange {
                index: index + 1,
                rows: pricing.payment_plan.len(),
            });
        }
        row
    }
}

// ──────────────────────────────────────────────
// Discount stripping
// ──────────────────────────────────────────────

/// With a zero discount, whole lines that mention the discount are
/// dropped instead of rendering a dangling "0%" artifact. The check is
/// textual on the authored line, so token-only mentions
/// (`{{discount_amount}}`) count too.
fn strip_discount_lines(text: &str) -> Cow<'_, str> {
    if !mentions_discount(text) {
        return Cow::Borrowed(text);
    }
    let kept: Vec<&str> = text
        .split('\n')
        .filter(|line| !mentions_discount(line))
        .collect();
    Cow::Owned(kept.join("\n"))
}

fn mentions_discount(text: &str) -> bool {
    text.to_lowercase().contains("discount") || text.contains("הנחה")
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use engross_pricing::{refresh, Currency, TierKey};

    fn pricing() -> PricingState {
        let mut state = PricingState::new(Currency::Ils);
        refresh(&mut state);
        state
    }

    fn resolve_one(text: &str, state: &PricingState, mode: ResolveMode) -> String {
        let party = PartyInfo::default();
        let inputs = ClientInputMap::new();
        let doc = Node::doc(vec![Node::paragraph(vec![Node::text(text)])]);
        let mut resolver = Resolver::new(state, &party, &inputs, mode);
        let resolved = resolver.resolve(&doc);
        resolved.children()[0].children()[0]
            .text_content()
            .expect("text node")
            .to_string()
    }

    #[test]
    fn pricing_projections_format_with_separators() {
        let state = pricing();
        assert_eq!(
            resolve_one(
                "Total: {{total_amount}} {{currency}} for {{applicant_count}}, due {{final_amount}}",
                &state,
                ResolveMode::ReadOnly
            ),
            "Total: 15,000 ILS for 1, due 15,000"
        );
    }

    #[test]
    fn client_tokens_fall_back_to_empty() {
        let state = pricing();
        assert_eq!(
            resolve_one(
                "Dear {{client_name}} ({{client_email}})",
                &state,
                ResolveMode::ReadOnly
            ),
            "Dear  ()"
        );
    }

    #[test]
    fn contact_fields_take_precedence() {
        let state = pricing();
        let party = PartyInfo {
            contact_name: Some("Dana Levi".into()),
            client_name: Some("Levi Family".into()),
            ..PartyInfo::default()
        };
        let inputs = ClientInputMap::new();
        let doc = Node::doc(vec![Node::paragraph(vec![Node::text("{{client_name}}")])]);
        let mut resolver = Resolver::new(&state, &party, &inputs, ResolveMode::ReadOnly);
        let resolved = resolver.resolve(&doc);
        assert_eq!(
            resolved.children()[0].children()[0].text_content(),
            Some("Dana Levi")
        );
    }

    #[test]
    fn price_per_applicant_uses_textual_context() {
        let mut state = pricing();
        state.currency = Currency::Usd;
        state.pricing_tiers.clear();
        state.pricing_tiers.insert(TierKey::One, Decimal::from(100));
        state.pricing_tiers.insert(TierKey::Two, Decimal::from(90));
        assert_eq!(
            resolve_one(
                "For 2 applicants- {{price_per_applicant}}",
                &state,
                ResolveMode::ReadOnly
            ),
            "For 2 applicants- USD 90"
        );
    }

    #[test]
    fn context_spans_earlier_text_nodes() {
        let mut state = pricing();
        state.currency = Currency::Usd;
        state.pricing_tiers.clear();
        state.pricing_tiers.insert(TierKey::One, Decimal::from(100));
        state
            .pricing_tiers
            .insert(TierKey::FourToSeven, Decimal::from(70));

        let party = PartyInfo::default();
        let inputs = ClientInputMap::new();
        // The phrase sits in a previous paragraph; only the shared
        // preceding-text buffer can see it.
        let doc = Node::doc(vec![
            Node::paragraph(vec![Node::text("Pricing for 4-7 applicants:")]),
            Node::paragraph(vec![Node::text("{{price_per_applicant}} per person")]),
        ]);
        let mut resolver = Resolver::new(&state, &party, &inputs, ResolveMode::ReadOnly);
        let resolved = resolver.resolve(&doc);
        assert_eq!(
            resolved.children()[1].children()[0].text_content(),
            Some("USD 70 per person")
        );
    }

    #[test]
    fn unconfigured_tier_degrades_to_zero() {
        let mut state = pricing();
        state.pricing_tiers.clear();
        assert_eq!(
            resolve_one(
                "For 2 applicants- {{price_per_applicant}}, flat {{price_2}}",
                &state,
                ResolveMode::ReadOnly
            ),
            "For 2 applicants- 0, flat 0"
        );
    }

    #[test]
    fn plan_row_cursor_is_shared_across_branches() {
        let state = pricing();
        let party = PartyInfo::default();
        let inputs = ClientInputMap::new();
        let doc = Node::doc(vec![
            Node::paragraph(vec![Node::text("{{payment_plan_row}}")]),
            Node::Blockquote {
                attrs: None,
                content: vec![Node::paragraph(vec![Node::text("{{payment_plan_row}}")])],
            },
        ]);
        let mut resolver = Resolver::new(&state, &party, &inputs, ResolveMode::ReadOnly);
        let resolved = resolver.resolve(&doc);
        assert_eq!(
            resolved.children()[0].children()[0].text_content(),
            Some("50% = ILS 7,500")
        );
        assert_eq!(
            resolved.children()[1].children()[0].children()[0].text_content(),
            Some("25% = ILS 3,750")
        );
    }

    #[test]
    fn editing_mode_keeps_composite_row_values() {
        let mut state = pricing();
        state.vat_included = true;
        refresh(&mut state);
        assert_eq!(
            resolve_one("{{payment_plan_row}}", &state, ResolveMode::Editing),
            "50% = ILS 7500 + 1350"
        );
        assert_eq!(
            resolve_one("{{payment_plan_row}}", &state, ResolveMode::ReadOnly),
            "50% = ILS 8,850"
        );
    }

    #[test]
    fn indexed_payment_tokens_do_not_consume_the_cursor() {
        let state = pricing();
        assert_eq!(
            resolve_one(
                "{{payment_2_percent}}% {{payment_1_due}}, then {{payment_plan_row}}",
                &state,
                ResolveMode::ReadOnly
            ),
            "25% Upon signing, then 50% = ILS 7,500"
        );
    }

    #[test]
    fn out_of_range_payment_tokens_substitute_defaults() {
        let state = pricing();
        let party = PartyInfo::default();
        let inputs = ClientInputMap::new();
        let doc = Node::doc(vec![Node::paragraph(vec![Node::text(
            "{{payment_9_percent}}|{{payment_9_value}}|{{payment_9_due}}",
        )])]);
        let mut resolver = Resolver::new(&state, &party, &inputs, ResolveMode::ReadOnly);
        let resolved = resolver.resolve(&doc);
        assert_eq!(
            resolved.children()[0].children()[0].text_content(),
            Some("0|0|")
        );
        let (warnings, _) = resolver.finish();
        assert_eq!(warnings.len(), 3);
    }

    #[test]
    fn zero_discount_strips_whole_lines() {
        let state = pricing();
        assert_eq!(
            resolve_one(
                "Keep this line\nYou receive a {{discount_percentage}}% discount, total savings {{discount_amount}}\nAnd this",
                &state,
                ResolveMode::ReadOnly
            ),
            "Keep this line\nAnd this"
        );
    }

    #[test]
    fn nonzero_discount_keeps_discount_lines() {
        let mut state = pricing();
        state.discount_percentage = 10;
        refresh(&mut state);
        assert_eq!(
            resolve_one(
                "You receive a {{discount_percentage}}% discount of {{discount_amount}}",
                &state,
                ResolveMode::ReadOnly
            ),
            "You receive a 10% discount of 1,500"
        );
    }

    #[test]
    fn addressable_tokens_survive_interactive_modes() {
        let state = pricing();
        for mode in [ResolveMode::Editing, ResolveMode::ReadOnly, ResolveMode::ClientFacing] {
            assert_eq!(
                resolve_one("Sign here: {{signature:signature-1}}", &state, mode),
                "Sign here: {{signature:signature-1}}",
                "mode {mode:?}"
            );
        }
    }

    #[test]
    fn unbound_fields_staticize_outside_the_editor() {
        let state = pricing();
        assert_eq!(
            resolve_one("{{text}} / {{signature}}", &state, ResolveMode::Editing),
            "{{text}} / {{signature}}"
        );
        assert_eq!(
            resolve_one("{{text}} / {{signature}}", &state, ResolveMode::ReadOnly),
            "__________ / [Client Signature]"
        );
    }

    #[test]
    fn signed_mode_substitutes_captured_values() {
        let state = pricing();
        let party = PartyInfo::default();
        let mut inputs = ClientInputMap::new();
        inputs.insert("text-1".into(), "David Cohen".into());
        inputs.insert("date-1".into(), "2026-08-06".into());
        inputs.insert("signature-1".into(), "data:image/png;base64,AAAA".into());

        let doc = Node::doc(vec![Node::paragraph(vec![Node::text(
            "{{text:text-1}}, {{date:date-1}}, {{signature:signature-1}}, {{text:text-2}}",
        )])]);
        let mut resolver = Resolver::new(&state, &party, &inputs, ResolveMode::Signed);
        let resolved = resolver.resolve(&doc);
        assert_eq!(
            resolved.children()[0].children()[0].text_content(),
            Some("David Cohen, August 6, 2026, data:image/png;base64,AAAA, [no input]")
        );
    }

    #[test]
    fn unsigned_signature_renders_placeholder_in_signed_mode() {
        let state = pricing();
        assert_eq!(
            resolve_one("{{signature:signature-1}}", &state, ResolveMode::Signed),
            "[Client Signature]"
        );
    }

    #[test]
    fn unknown_tokens_stay_verbatim() {
        let state = pricing();
        assert_eq!(
            resolve_one("{{mystery_token}} stays", &state, ResolveMode::ReadOnly),
            "{{mystery_token}} stays"
        );
    }

    #[test]
    fn resolution_is_a_pure_map_leaving_empty_nodes() {
        let state = pricing();
        let party = PartyInfo::default();
        let inputs = ClientInputMap::new();
        let doc = Node::doc(vec![Node::paragraph(vec![Node::text(
            "Special discount line",
        )])]);
        let mut resolver = Resolver::new(&state, &party, &inputs, ResolveMode::ReadOnly);
        let resolved = resolver.resolve(&doc);
        // The paragraph and its (now empty) text node are still there;
        // removal is the cleanup pass's job.
        assert_eq!(resolved.children().len(), 1);
        assert_eq!(
            resolved.children()[0].children()[0].text_content(),
            Some("")
        );
    }
}
