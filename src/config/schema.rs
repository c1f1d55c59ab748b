//! Schema for the persisted settings document.
//!
//! This is exactly the set of fields that lives in `settings.json`. The
//! derived fields (`mode`, key-storage directory) are deliberately absent:
//! they are computed from whichever location won resolution, never read
//! from a document. See the [`resolver`](crate::config::resolver) module.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::ColorPreference;

/// Window placement hint carried through the settings document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSize {
    fn default() -> Self {
        Self {
            width: 960,
            height: 600,
        }
    }
}

/// How the main window opens. Opaque to the core logic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowStartState {
    #[default]
    Normal,
    Minimized,
    Maximized,
}

impl WindowStartState {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "normal" => Some(WindowStartState::Normal),
            "minimized" => Some(WindowStartState::Minimized),
            "maximized" => Some(WindowStartState::Maximized),
            _ => None,
        }
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            WindowStartState::Normal => "normal",
            WindowStartState::Minimized => "minimized",
            WindowStartState::Maximized => "maximized",
        }
    }
}

impl std::fmt::Display for WindowStartState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Font style selector. Part of the font triple, never set on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontStyle {
    #[default]
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

impl FontStyle {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "regular" => Some(FontStyle::Regular),
            "bold" => Some(FontStyle::Bold),
            "italic" => Some(FontStyle::Italic),
            "bold-italic" | "bolditalic" => Some(FontStyle::BoldItalic),
            _ => None,
        }
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            FontStyle::Regular => "regular",
            FontStyle::Bold => "bold",
            FontStyle::Italic => "italic",
            FontStyle::BoldItalic => "bold-italic",
        }
    }
}

impl std::fmt::Display for FontStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Administrative restriction policy.
///
/// Only a Global settings document carries one; the resolver strips it
/// from every other location on both the load and save paths. The fields
/// are policy data consumed by the encryption layer, opaque here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Restrictions {
    /// Smallest key size the policy allows, in bits. 0 means no floor.
    pub minimum_key_bits: u32,

    /// Cipher identifiers the policy forbids.
    pub disallowed_ciphers: BTreeSet<String>,

    /// Whether converting this install to portable mode is forbidden.
    pub forbid_portable_conversion: bool,

    /// Fingerprints of keys to attach to newly encrypted content.
    pub auto_attach_fingerprints: BTreeSet<String>,
}

/// The persisted settings document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsDocument {
    pub window_size: WindowSize,
    pub window_start_state: WindowStartState,
    pub foreground_color: ColorPreference,
    pub background_color: ColorPreference,

    /// Font triple. The three fields always change together; use
    /// [`SettingsDocument::set_font`] rather than assigning them one by one.
    pub font_name: String,
    pub font_size: f32,
    pub font_style: FontStyle,

    /// Restriction policy. Present iff the document is authoritative in
    /// Global mode; the resolver owns this field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restrictions: Option<Restrictions>,
}

impl Default for SettingsDocument {
    fn default() -> Self {
        Self {
            window_size: WindowSize::default(),
            window_start_state: WindowStartState::default(),
            foreground_color: ColorPreference::default(),
            background_color: ColorPreference::from_name("White")
                .unwrap_or_default(),
            font_name: "Sans".to_string(),
            font_size: 10.0,
            font_style: FontStyle::Regular,
            restrictions: None,
        }
    }
}

impl SettingsDocument {
    /// Set the font triple as one unit.
    pub fn set_font(&mut self, name: impl Into<String>, size: f32, style: FontStyle) {
        self.font_name = name.into();
        self.font_size = size;
        self.font_style = style;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Enum Tests ====================

    #[test]
    fn test_window_start_state_parse() {
        assert_eq!(
            WindowStartState::parse("normal"),
            Some(WindowStartState::Normal)
        );
        assert_eq!(
            WindowStartState::parse("MAXIMIZED"),
            Some(WindowStartState::Maximized)
        );
        assert_eq!(WindowStartState::parse("sideways"), None);
    }

    #[test]
    fn test_font_style_parse() {
        assert_eq!(FontStyle::parse("bold"), Some(FontStyle::Bold));
        assert_eq!(FontStyle::parse("bold-italic"), Some(FontStyle::BoldItalic));
        assert_eq!(FontStyle::parse("BoldItalic"), Some(FontStyle::BoldItalic));
        assert_eq!(FontStyle::parse("wavy"), None);
    }

    #[test]
    fn test_enum_display() {
        assert_eq!(format!("{}", WindowStartState::Minimized), "minimized");
        assert_eq!(format!("{}", FontStyle::BoldItalic), "bold-italic");
    }

    // ==================== Document Tests ====================

    #[test]
    fn test_document_defaults() {
        let doc = SettingsDocument::default();
        assert_eq!(doc.window_size, WindowSize::default());
        assert_eq!(doc.foreground_color.name(), Some("Black"));
        assert_eq!(doc.background_color.name(), Some("White"));
        assert_eq!(doc.font_name, "Sans");
        assert_eq!(doc.restrictions, None);
    }

    #[test]
    fn test_document_roundtrip() {
        let mut doc = SettingsDocument::default();
        doc.set_font("Mono", 12.5, FontStyle::Bold);
        doc.restrictions = Some(Restrictions {
            minimum_key_bits: 2048,
            ..Default::default()
        });

        let json = serde_json::to_string_pretty(&doc).unwrap();
        let back: SettingsDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let json = r#"{"font_name": "Serif"}"#;
        let doc: SettingsDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.font_name, "Serif");
        assert_eq!(doc.font_size, 10.0);
        assert_eq!(doc.window_start_state, WindowStartState::Normal);
    }

    #[test]
    fn test_null_restrictions_deserializes_to_none() {
        let json = r#"{"restrictions": null}"#;
        let doc: SettingsDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.restrictions, None);
    }

    #[test]
    fn test_absent_restrictions_not_serialized() {
        let doc = SettingsDocument::default();
        let json = serde_json::to_string(&doc).unwrap();
        assert!(!json.contains("restrictions"));
    }

    #[test]
    fn test_restrictions_default_is_permissive() {
        let restrictions = Restrictions::default();
        assert_eq!(restrictions.minimum_key_bits, 0);
        assert!(restrictions.disallowed_ciphers.is_empty());
        assert!(!restrictions.forbid_portable_conversion);
        assert!(restrictions.auto_attach_fingerprints.is_empty());
    }
}
