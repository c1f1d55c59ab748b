//! Settings persistence and resolution.
//!
//! One `settings.json` schema, three possible homes:
//!
//! - Portable: the directory containing the `sbx` executable
//! - Global: `/etc/sealbox` (unix) or `%ProgramData%\sealbox` (windows)
//! - Local: `~/.config/sealbox`
//!
//! Precedence is Portable > Global > Local, with Portable short-circuiting
//! resolution entirely. Only a Global document carries the restriction
//! policy; the other locations have it stripped on load and on save.
//!
//! Each location directory can be overridden through `SBX_PORTABLE_DIR`,
//! `SBX_GLOBAL_DIR`, and `SBX_LOCAL_DIR` - tests rely on this for
//! isolation.
//!
//! Use the [`resolver`] module for resolution and persistence; [`schema`]
//! holds the persisted document types.

pub mod resolver;
pub mod schema;

pub use resolver::{
    ConfigMode, ConfigPaths, GLOBAL_DIR_ENV, KEYS_SUBDIR, LOCAL_DIR_ENV, PORTABLE_DIR_ENV,
    SETTINGS_FILE, Settings, resolve,
};
pub use schema::{FontStyle, Restrictions, SettingsDocument, WindowSize, WindowStartState};
