//! Value types shared across the settings and key-ring layers.

pub mod color;
pub mod key;

pub use color::ColorPreference;
pub use key::RsaKeyRecord;
