//! Named-or-numeric color values for the settings document.
//!
//! A `ColorPreference` keeps two slots consistent: an optional symbolic
//! name and a packed `0xAARRGGBB` value. Whichever slot a value is built
//! from, the other is derived, and the alpha byte is always forced to
//! fully opaque before the value is stored or compared.

use std::fmt;

use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

/// Alpha mask applied to every numeric color before storage.
const OPAQUE: u32 = 0xFF00_0000;

/// Known colors, packed as opaque `0xFFRRGGBB`.
///
/// Lookup by name is case-insensitive; reverse lookup by value returns the
/// first matching entry.
const KNOWN_COLORS: &[(&str, u32)] = &[
    ("Black", 0xFF00_0000),
    ("White", 0xFFFF_FFFF),
    ("Red", 0xFFFF_0000),
    ("Lime", 0xFF00_FF00),
    ("Blue", 0xFF00_00FF),
    ("Yellow", 0xFFFF_FF00),
    ("Cyan", 0xFF00_FFFF),
    ("Magenta", 0xFFFF_00FF),
    ("Silver", 0xFFC0_C0C0),
    ("Gray", 0xFF80_8080),
    ("Maroon", 0xFF80_0000),
    ("Olive", 0xFF80_8000),
    ("Green", 0xFF00_8000),
    ("Purple", 0xFF80_0080),
    ("Teal", 0xFF00_8080),
    ("Navy", 0xFF00_0080),
    ("Orange", 0xFFFF_A500),
    ("Gold", 0xFFFF_D700),
    ("Crimson", 0xFFDC_143C),
    ("Pink", 0xFFFF_C0CB),
    ("Brown", 0xFFA5_2A2A),
    ("Coral", 0xFFFF_7F50),
    ("Indigo", 0xFF4B_0082),
    ("Ivory", 0xFFFF_FFF0),
    ("Khaki", 0xFFF0_E68C),
    ("Lavender", 0xFFE6_E6FA),
    ("Salmon", 0xFFFA_8072),
    ("SkyBlue", 0xFF87_CEEB),
    ("SlateGray", 0xFF70_8090),
    ("Turquoise", 0xFF40_E0D0),
];

/// A color carried in the settings document.
///
/// Invariant: after any construction or mutation, `value == packed(name)`
/// whenever `name` is set, and the alpha byte of `value` is `0xFF`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorPreference {
    name: Option<String>,
    value: u32,
}

impl ColorPreference {
    /// Build from a known color name. Returns `None` for unknown names.
    pub fn from_name(name: &str) -> Option<Self> {
        KNOWN_COLORS
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(name))
            .map(|(known, value)| Self {
                name: Some((*known).to_string()),
                value: *value,
            })
    }

    /// Build from a packed `0xAARRGGBB` value.
    ///
    /// The alpha byte is forced to fully opaque before the name slot is
    /// derived by reverse lookup, so `0x00FF0000` and `0xFFFF0000` produce
    /// the same color.
    pub fn from_value(value: u32) -> Self {
        let value = value | OPAQUE;
        Self {
            name: Self::name_of(value).map(str::to_string),
            value,
        }
    }

    /// Replace this color from a name, keeping both slots consistent.
    /// Returns false (and leaves the color unchanged) for unknown names.
    pub fn set_name(&mut self, name: &str) -> bool {
        match Self::from_name(name) {
            Some(color) => {
                *self = color;
                true
            }
            None => false,
        }
    }

    /// Replace this color from a packed value, keeping both slots consistent.
    pub fn set_value(&mut self, value: u32) {
        *self = Self::from_value(value);
    }

    /// The symbolic name, when the value matches a known color.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The packed `0xFFRRGGBB` value. Prefers the name slot when present.
    pub fn color(&self) -> u32 {
        match self.name.as_deref().and_then(Self::packed) {
            Some(value) => value,
            None => self.value,
        }
    }

    /// Reverse lookup: the known-color name for a packed value, if any.
    pub fn name_of(value: u32) -> Option<&'static str> {
        let value = value | OPAQUE;
        KNOWN_COLORS
            .iter()
            .find(|(_, known)| *known == value)
            .map(|(name, _)| *name)
    }

    /// Forward lookup: the packed value for a known-color name, if any.
    pub fn packed(name: &str) -> Option<u32> {
        KNOWN_COLORS
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(name))
            .map(|(_, value)| *value)
    }

    /// Parse from the persisted string form: a known color name or `#RRGGBB`.
    pub fn parse(s: &str) -> Option<Self> {
        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return None;
            }
            let rgb = u32::from_str_radix(hex, 16).ok()?;
            return Some(Self::from_value(rgb));
        }
        Self::from_name(s)
    }

    /// Red, green, and blue components of the packed value.
    pub fn components(&self) -> (u8, u8, u8) {
        let value = self.value;
        ((value >> 16) as u8, (value >> 8) as u8, value as u8)
    }
}

impl Default for ColorPreference {
    fn default() -> Self {
        Self {
            name: Some("Black".to_string()),
            value: 0xFF00_0000,
        }
    }
}

impl fmt::Display for ColorPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name.as_deref() {
            Some(name) => write!(f, "{}", name),
            None => {
                let (r, g, b) = self.components();
                write!(f, "({}, {}, {})", r, g, b)
            }
        }
    }
}

impl Serialize for ColorPreference {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.name.as_deref() {
            Some(name) => serializer.serialize_str(name),
            None => {
                let (r, g, b) = self.components();
                serializer.serialize_str(&format!("#{:02X}{:02X}{:02X}", r, g, b))
            }
        }
    }
}

impl<'de> Deserialize<'de> for ColorPreference {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s)
            .ok_or_else(|| de::Error::custom(format!("unknown color: {:?}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_derives_packed_value() {
        let color = ColorPreference::from_name("Crimson").unwrap();
        assert_eq!(color.name(), Some("Crimson"));
        assert_eq!(color.color(), 0xFFDC_143C);
    }

    #[test]
    fn test_from_name_is_case_insensitive() {
        let color = ColorPreference::from_name("crimson").unwrap();
        assert_eq!(color.name(), Some("Crimson"));
    }

    #[test]
    fn test_from_name_unknown() {
        assert!(ColorPreference::from_name("NotAColor").is_none());
    }

    #[test]
    fn test_from_value_forces_opaque_alpha() {
        // Translucent red normalizes to opaque red before lookup.
        let color = ColorPreference::from_value(0x80FF_0000);
        assert_eq!(color.color(), 0xFFFF_0000);
        assert_eq!(color.name(), Some("Red"));
    }

    #[test]
    fn test_from_value_without_known_name() {
        let color = ColorPreference::from_value(0x0012_3456);
        assert_eq!(color.name(), None);
        assert_eq!(color.color(), 0xFF12_3456);
    }

    #[test]
    fn test_alpha_normalized_before_comparison() {
        let opaque = ColorPreference::from_value(0xFF12_3456);
        let translucent = ColorPreference::from_value(0x0012_3456);
        assert_eq!(opaque, translucent);
    }

    #[test]
    fn test_set_value_rederives_name() {
        let mut color = ColorPreference::from_name("White").unwrap();
        color.set_value(0x0000_8080);
        assert_eq!(color.name(), Some("Teal"));
        assert_eq!(color.color(), 0xFF00_8080);
    }

    #[test]
    fn test_set_name_unknown_leaves_color_unchanged() {
        let mut color = ColorPreference::from_name("Navy").unwrap();
        assert!(!color.set_name("Fuligin"));
        assert_eq!(color.name(), Some("Navy"));
    }

    #[test]
    fn test_reverse_lookup() {
        assert_eq!(ColorPreference::name_of(0xFF00_8080), Some("Teal"));
        assert_eq!(ColorPreference::name_of(0x0000_8080), Some("Teal"));
        assert_eq!(ColorPreference::name_of(0xFF12_3456), None);
    }

    #[test]
    fn test_display_named_and_unnamed() {
        let named = ColorPreference::from_name("Gold").unwrap();
        assert_eq!(format!("{}", named), "Gold");

        let unnamed = ColorPreference::from_value(0xFF12_3456);
        assert_eq!(format!("{}", unnamed), "(18, 52, 86)");
    }

    #[test]
    fn test_parse_hex_and_name() {
        assert_eq!(
            ColorPreference::parse("#DC143C").unwrap(),
            ColorPreference::from_name("Crimson").unwrap()
        );
        assert_eq!(
            ColorPreference::parse("teal").unwrap().name(),
            Some("Teal")
        );
        assert!(ColorPreference::parse("#12345").is_none());
        assert!(ColorPreference::parse("#12345G").is_none());
    }

    #[test]
    fn test_serde_roundtrip() {
        let named = ColorPreference::from_name("Olive").unwrap();
        let json = serde_json::to_string(&named).unwrap();
        assert_eq!(json, "\"Olive\"");
        let back: ColorPreference = serde_json::from_str(&json).unwrap();
        assert_eq!(back, named);

        let unnamed = ColorPreference::from_value(0x0012_3456);
        let json = serde_json::to_string(&unnamed).unwrap();
        assert_eq!(json, "\"#123456\"");
        let back: ColorPreference = serde_json::from_str(&json).unwrap();
        assert_eq!(back, unnamed);
    }

    #[test]
    fn test_deserialize_unknown_name_fails() {
        let result: Result<ColorPreference, _> = serde_json::from_str("\"Fuligin\"");
        assert!(result.is_err());
    }
}
