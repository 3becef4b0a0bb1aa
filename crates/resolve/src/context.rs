//! Resolution inputs: party info, client input map, and modes.
//!
//! These are read-only snapshots from the resolver's point of view. The
//! client input map is owned and written by the presentation layer; the
//! engine only reads it when rendering signed content.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::Date;

/// Values captured for addressable fields, keyed by field id. Free
/// text, ISO dates, or signature image data URIs.
pub type ClientInputMap = BTreeMap<String, String>;

// ──────────────────────────────────────────────
// Party info
// ──────────────────────────────────────────────

/// Contact details the client tokens project. Contract-level contact
/// fields take precedence over the client record; a token whose field
/// is absent on both levels resolves to the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyInfo {
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub client_phone: Option<String>,
    #[serde(default)]
    pub client_email: Option<String>,
}

impl PartyInfo {
    pub fn name(&self) -> &str {
        pick(&self.contact_name, &self.client_name)
    }

    pub fn phone(&self) -> &str {
        pick(&self.contact_phone, &self.client_phone)
    }

    pub fn email(&self) -> &str {
        pick(&self.contact_email, &self.client_email)
    }
}

fn pick<'a>(contact: &'a Option<String>, client: &'a Option<String>) -> &'a str {
    contact
        .as_deref()
        .filter(|v| !v.is_empty())
        .or(client.as_deref())
        .unwrap_or("")
}

// ──────────────────────────────────────────────
// Modes
// ──────────────────────────────────────────────

/// Rendering surface the resolution runs for. One engine serves every
/// surface; the mode only parameterizes token handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
    /// Template editor: tokens stay verbatim, composite row values
    /// stay visible.
    Editing,
    /// Internal preview: interactive fields keep their tokens, row
    /// values render as plain totals.
    ReadOnly,
    /// Public link the client fills in: like ReadOnly, fields stay
    /// interactive.
    ClientFacing,
    /// Frozen display after signing: fields render their captured
    /// values.
    Signed,
}

/// Token-handling parameters derived from the mode.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ModeProfile {
    /// Replace addressable tokens with client input map values.
    pub substitute_inputs: bool,
    /// Keep composite "base + vat" row values instead of plain totals.
    pub composite_values: bool,
    /// Replace id-less addressable tokens with static placeholders.
    pub staticize_unbound: bool,
}

impl ResolveMode {
    pub(crate) fn profile(&self) -> ModeProfile {
        match self {
            ResolveMode::Editing => ModeProfile {
                substitute_inputs: false,
                composite_values: true,
                staticize_unbound: false,
            },
            ResolveMode::ReadOnly | ResolveMode::ClientFacing => ModeProfile {
                substitute_inputs: false,
                composite_values: false,
                staticize_unbound: true,
            },
            ResolveMode::Signed => ModeProfile {
                substitute_inputs: true,
                composite_values: false,
                staticize_unbound: true,
            },
        }
    }
}

// ──────────────────────────────────────────────
// Input value formatting
// ──────────────────────────────────────────────

/// Placeholder shown for an addressable text/date field nobody filled.
pub const NO_INPUT: &str = "[no input]";
/// Placeholder shown where a signature belongs.
pub const SIGNATURE_PLACEHOLDER: &str = "[Client Signature]";
/// Static blank for an unbound field outside the editor.
pub const FIELD_PLACEHOLDER: &str = "__________";

/// Long-form rendering of a captured ISO date ("2026-08-06" →
/// "August 6, 2026"). Unparseable input passes through verbatim rather
/// than disappearing.
pub fn format_date_value(raw: &str) -> String {
    let iso = format_description!("[year]-[month]-[day]");
    let long = format_description!("[month repr:long] [day padding:none], [year]");
    // Captured values may carry a time suffix; the date part decides.
    let date_part = raw.split('T').next().unwrap_or(raw);
    Date::parse(date_part, &iso)
        .ok()
        .and_then(|date| date.format(&long).ok())
        .unwrap_or_else(|| raw.to_string())
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_fields_win_over_client_record() {
        let party = PartyInfo {
            contact_name: Some("Dana Levi".into()),
            client_name: Some("Levi Family".into()),
            client_phone: Some("+972-50-000-0000".into()),
            ..PartyInfo::default()
        };
        assert_eq!(party.name(), "Dana Levi");
        assert_eq!(party.phone(), "+972-50-000-0000");
        assert_eq!(party.email(), "");
    }

    #[test]
    fn empty_contact_field_falls_through() {
        let party = PartyInfo {
            contact_name: Some(String::new()),
            client_name: Some("Levi Family".into()),
            ..PartyInfo::default()
        };
        assert_eq!(party.name(), "Levi Family");
    }

    #[test]
    fn dates_render_long_form() {
        assert_eq!(format_date_value("2026-08-06"), "August 6, 2026");
        assert_eq!(format_date_value("2025-01-31"), "January 31, 2025");
        assert_eq!(
            format_date_value("2026-08-06T10:30:00Z"),
            "August 6, 2026"
        );
    }

    #[test]
    fn unparseable_dates_pass_through() {
        assert_eq!(format_date_value("next Tuesday"), "next Tuesday");
        assert_eq!(format_date_value(""), "");
    }
}
