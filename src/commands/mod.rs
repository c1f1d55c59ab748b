//! Command implementations for the sbx CLI.
//!
//! Each handler resolves settings once, performs its operation through the
//! library types, and returns a typed result that renders as JSON or
//! human-readable text via [`Output`].

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::warn;

use crate::config::{
    self, ConfigMode, ConfigPaths, FontStyle, SETTINGS_FILE, SettingsDocument, WindowStartState,
};
use crate::keystore::KeyStore;
use crate::models::{ColorPreference, RsaKeyRecord};
use crate::{Error, Result};

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

fn to_json_string<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!(r#"{{"error": "{}"}}"#, e))
}

// ==================== config ====================

/// Resolved settings, annotated with where they came from.
#[derive(Debug, Serialize)]
pub struct ConfigShowResult {
    pub mode: String,
    pub settings_file: PathBuf,
    pub key_storage_dir: PathBuf,
    pub document: SettingsDocument,
}

impl Output for ConfigShowResult {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        let doc = &self.document;
        let mut out = String::new();
        let _ = writeln!(out, "Mode:          {}", self.mode);
        let _ = writeln!(out, "Settings file: {}", self.settings_file.display());
        let _ = writeln!(out, "Key storage:   {}", self.key_storage_dir.display());
        let _ = writeln!(
            out,
            "Window:        {}x{} ({})",
            doc.window_size.width, doc.window_size.height, doc.window_start_state
        );
        let _ = writeln!(
            out,
            "Colors:        {} on {}",
            doc.foreground_color, doc.background_color
        );
        let _ = writeln!(
            out,
            "Font:          {} {} {}",
            doc.font_name, doc.font_size, doc.font_style
        );
        match &doc.restrictions {
            Some(r) => {
                let _ = writeln!(
                    out,
                    "Restrictions:  min {} bits, {} disallowed cipher(s), portable conversion {}",
                    r.minimum_key_bits,
                    r.disallowed_ciphers.len(),
                    if r.forbid_portable_conversion {
                        "forbidden"
                    } else {
                        "allowed"
                    }
                );
            }
            None => {
                let _ = writeln!(out, "Restrictions:  none");
            }
        }
        out
    }
}

/// Run resolution and report the effective settings.
pub fn config_show(paths: &ConfigPaths) -> Result<ConfigShowResult> {
    let settings = config::resolve(paths);
    Ok(describe(paths, &settings))
}

fn describe(paths: &ConfigPaths, settings: &config::Settings) -> ConfigShowResult {
    let settings_file = paths
        .dir(settings.mode())
        .map(|dir| dir.join(SETTINGS_FILE))
        .unwrap_or_default();
    ConfigShowResult {
        mode: settings.mode().to_string(),
        settings_file,
        key_storage_dir: settings.key_storage_dir().to_path_buf(),
        document: settings.document.clone(),
    }
}

/// Resolve, then persist to the requested location.
pub fn config_save(paths: &ConfigPaths, mode: &str) -> Result<ConfigShowResult> {
    let mode =
        ConfigMode::parse(mode).ok_or_else(|| Error::UnsupportedMode(mode.to_string()))?;
    let mut settings = config::resolve(paths);
    settings.save(paths, mode)?;
    Ok(describe(paths, &settings))
}

/// Field changes requested by `sbx config set`.
#[derive(Debug, Default)]
pub struct ConfigSetOptions {
    pub foreground: Option<String>,
    pub background: Option<String>,
    pub window_start_state: Option<String>,
    pub font_name: Option<String>,
    pub font_size: Option<f32>,
    pub font_style: Option<String>,
}

/// Apply field changes and persist via Auto mode.
pub fn config_set(paths: &ConfigPaths, options: ConfigSetOptions) -> Result<ConfigShowResult> {
    let mut settings = config::resolve(paths);
    let doc = &mut settings.document;

    if let Some(ref spec) = options.foreground {
        doc.foreground_color = parse_color(spec)?;
    }
    if let Some(ref spec) = options.background {
        doc.background_color = parse_color(spec)?;
    }
    if let Some(ref spec) = options.window_start_state {
        doc.window_start_state = WindowStartState::parse(spec)
            .ok_or_else(|| Error::InvalidInput(format!("unknown window state: {}", spec)))?;
    }

    // The font triple only ever changes as one unit.
    match (options.font_name, options.font_size, options.font_style) {
        (None, None, None) => {}
        (Some(name), Some(size), Some(style)) => {
            let style = FontStyle::parse(&style)
                .ok_or_else(|| Error::InvalidInput(format!("unknown font style: {}", style)))?;
            doc.set_font(name, size, style);
        }
        _ => {
            return Err(Error::InvalidInput(
                "font name, size, and style must be set together".to_string(),
            ));
        }
    }

    settings.save(paths, ConfigMode::Auto)?;
    Ok(describe(paths, &settings))
}

fn parse_color(spec: &str) -> Result<ColorPreference> {
    ColorPreference::parse(spec)
        .ok_or_else(|| Error::InvalidInput(format!("unknown color: {}", spec)))
}

// ==================== keys ====================

/// One ring entry as shown by `sbx keys list`.
#[derive(Debug, Serialize)]
pub struct KeySummary {
    pub fingerprint: String,
    pub label: String,
    pub bits: usize,
    pub private: bool,
}

/// Ring contents plus anything that had to be set aside.
#[derive(Debug, Serialize)]
pub struct KeysListResult {
    pub key_storage_dir: PathBuf,
    pub keys: Vec<KeySummary>,
    pub quarantined: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

impl Output for KeysListResult {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Key storage: {}", self.key_storage_dir.display());
        if self.keys.is_empty() {
            let _ = writeln!(out, "No keys stored.");
        }
        for key in &self.keys {
            let _ = writeln!(
                out,
                "{}  {:4} bits  {}  {}",
                &key.fingerprint[..12],
                key.bits,
                if key.private { "private" } else { "public " },
                key.label
            );
        }
        for path in &self.quarantined {
            let _ = writeln!(out, "quarantined: {}", path.display());
        }
        for path in &self.skipped {
            let _ = writeln!(out, "skipped:     {}", path.display());
        }
        out
    }
}

/// Load the ring pointed at by the resolved settings.
pub fn keys_list(paths: &ConfigPaths) -> Result<KeysListResult> {
    let settings = config::resolve(paths);
    let store = KeyStore::new(settings.key_storage_dir());
    let outcome = store.load()?;

    let mut keys = Vec::with_capacity(outcome.keys.len());
    for key in &outcome.keys {
        keys.push(KeySummary {
            fingerprint: key.fingerprint()?,
            label: key.label.clone(),
            bits: key.key_bits(),
            private: key.has_private(),
        });
    }

    Ok(KeysListResult {
        key_storage_dir: settings.key_storage_dir().to_path_buf(),
        keys,
        quarantined: outcome.quarantined,
        skipped: outcome.skipped,
    })
}

/// Result of merging record files into the ring.
#[derive(Debug, Serialize)]
pub struct KeysImportResult {
    pub key_storage_dir: PathBuf,
    pub stored: usize,
    pub deduplicated: usize,
    pub rejected: usize,
    pub purged: usize,
    pub failed: usize,
    pub unreadable: Vec<PathBuf>,
}

impl Output for KeysImportResult {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Ring now holds {} record file(s).", self.stored);
        if self.deduplicated > 0 {
            let _ = writeln!(out, "{} duplicate(s) skipped.", self.deduplicated);
        }
        if self.rejected > 0 {
            let _ = writeln!(out, "{} invalid record(s) rejected.", self.rejected);
        }
        if self.purged > 0 {
            let _ = writeln!(out, "{} old file(s) purged.", self.purged);
        }
        if self.failed > 0 {
            let _ = writeln!(out, "{} file operation(s) failed.", self.failed);
        }
        for path in &self.unreadable {
            let _ = writeln!(out, "unreadable: {}", path.display());
        }
        out
    }
}

/// Parse record files and merge them into the ring.
pub fn keys_import(paths: &ConfigPaths, files: &[PathBuf], purge: bool) -> Result<KeysImportResult> {
    let settings = config::resolve(paths);
    let store = KeyStore::new(settings.key_storage_dir());

    let mut records = Vec::new();
    let mut unreadable = Vec::new();
    for file in files {
        match read_record_file(file) {
            Ok(key) => records.push(key),
            Err(e) => {
                warn!(path = %file.display(), error = %e, "could not read key record file");
                unreadable.push(file.clone());
            }
        }
    }

    let outcome = store.save(&records, purge)?;
    Ok(KeysImportResult {
        key_storage_dir: settings.key_storage_dir().to_path_buf(),
        stored: outcome.written.len(),
        deduplicated: outcome.deduplicated,
        rejected: outcome.rejected,
        purged: outcome.purged,
        failed: outcome.failed,
        unreadable,
    })
}

fn read_record_file(path: &Path) -> Result<RsaKeyRecord> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Result of exporting one record.
#[derive(Debug, Serialize)]
pub struct KeysExportResult {
    pub fingerprint: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub written_to: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<serde_json::Value>,
}

impl Output for KeysExportResult {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        match (&self.written_to, &self.record) {
            (Some(path), _) => format!(
                "Exported {} ({}) to {}\n",
                &self.fingerprint[..12],
                self.label,
                path.display()
            ),
            (None, Some(record)) => format!(
                "{}\n",
                serde_json::to_string_pretty(record).unwrap_or_default()
            ),
            (None, None) => String::new(),
        }
    }
}

/// Write a stored record's canonical serialization to a file or inline.
///
/// Private components are stripped unless `include_private` is set.
pub fn keys_export(
    paths: &ConfigPaths,
    fingerprint: &str,
    out: Option<&Path>,
    include_private: bool,
) -> Result<KeysExportResult> {
    let settings = config::resolve(paths);
    let store = KeyStore::new(settings.key_storage_dir());

    let key = store
        .find(fingerprint)?
        .ok_or_else(|| Error::KeyNotFound(fingerprint.to_string()))?;
    let full_fingerprint = key.fingerprint()?;
    let record = if include_private {
        key.clone()
    } else {
        key.public_only()
    };
    let canonical = record.canonical_json()?;

    match out {
        Some(path) => {
            fs::write(path, &canonical)?;
            Ok(KeysExportResult {
                fingerprint: full_fingerprint,
                label: key.label,
                written_to: Some(path.to_path_buf()),
                record: None,
            })
        }
        None => Ok(KeysExportResult {
            fingerprint: full_fingerprint,
            label: key.label,
            written_to: None,
            record: Some(serde_json::from_str(&canonical)?),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Restrictions;
    use crate::test_utils::TestEnv;

    #[test]
    fn test_config_save_rejects_unknown_mode() {
        let env = TestEnv::new();
        let result = config_save(&env.paths(), "roaming");
        assert!(matches!(result, Err(Error::UnsupportedMode(_))));
    }

    #[test]
    fn test_config_save_global_then_show() {
        let env = TestEnv::new();
        let paths = env.paths();
        config_save(&paths, "global").unwrap();

        let shown = config_show(&paths).unwrap();
        assert_eq!(shown.mode, "global");
        assert_eq!(shown.document.restrictions, Some(Restrictions::default()));
    }

    #[test]
    fn test_config_set_colors() {
        let env = TestEnv::new();
        let paths = env.paths();
        let options = ConfigSetOptions {
            foreground: Some("Crimson".to_string()),
            background: Some("#123456".to_string()),
            ..Default::default()
        };

        let result = config_set(&paths, options).unwrap();
        assert_eq!(result.document.foreground_color.name(), Some("Crimson"));
        assert_eq!(result.document.background_color.color(), 0xFF12_3456);
        // Auto with no portable file lands in local mode.
        assert_eq!(result.mode, "local");
    }

    #[test]
    fn test_config_set_unknown_color_fails() {
        let env = TestEnv::new();
        let options = ConfigSetOptions {
            foreground: Some("Fuligin".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            config_set(&env.paths(), options),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_config_set_partial_font_triple_fails() {
        let env = TestEnv::new();
        let options = ConfigSetOptions {
            font_name: Some("Mono".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            config_set(&env.paths(), options),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_keys_roundtrip_through_commands() {
        let env = TestEnv::new();
        let paths = env.paths();

        let key = RsaKeyRecord::new_public("cmd-test", &[0x5A; 128], &[0x01, 0x00, 0x01]);
        let record_file = env.local_dir.path().join("incoming.json");
        fs::write(&record_file, serde_json::to_string(&key).unwrap()).unwrap();

        let imported = keys_import(&paths, &[record_file], false).unwrap();
        assert_eq!(imported.stored, 1);

        let listed = keys_list(&paths).unwrap();
        assert_eq!(listed.keys.len(), 1);
        assert_eq!(listed.keys[0].label, "cmd-test");
        assert_eq!(listed.keys[0].bits, 1024);

        let exported = keys_export(&paths, &listed.keys[0].fingerprint, None, false).unwrap();
        assert_eq!(exported.fingerprint, listed.keys[0].fingerprint);
        assert!(exported.record.is_some());
    }
}
