//! Settings location discovery, precedence resolution, and persistence.
//!
//! Three mutually-exclusive locations can hold a `settings.json`:
//!
//! 1. **Portable** - the directory containing the running executable.
//!    If a document loads from here it wins unconditionally and the other
//!    locations are not consulted.
//! 2. **Global** - the machine-wide directory. The only location whose
//!    document may carry a restriction policy.
//! 3. **Local** - the per-user directory. The fallback, and the location
//!    adopted on first run when nothing loads anywhere.
//!
//! Global dominates Local even when both load: an administrative policy
//! must not be bypassed by a stale or permissive per-user file.
//!
//! A load failure at any location (missing file, malformed document) is
//! logged and skipped; resolution always produces a usable [`Settings`].
//! The derived fields (`mode`, key-storage directory) are recomputed from
//! the location that actually won and are never read from a document.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::schema::{Restrictions, SettingsDocument};
use crate::{Error, Result};

/// File name of the settings document at every location.
pub const SETTINGS_FILE: &str = "settings.json";

/// Name of the key-storage subdirectory beside the authoritative document.
pub const KEYS_SUBDIR: &str = "Keys";

/// Environment variable overriding the portable location directory.
pub const PORTABLE_DIR_ENV: &str = "SBX_PORTABLE_DIR";

/// Environment variable overriding the global location directory.
pub const GLOBAL_DIR_ENV: &str = "SBX_GLOBAL_DIR";

/// Environment variable overriding the local location directory.
pub const LOCAL_DIR_ENV: &str = "SBX_LOCAL_DIR";

/// Settings persistence mode.
///
/// `Auto` is a save-time request ("pick the right location"), the other
/// three name concrete locations. Resolution only ever reports a concrete
/// mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigMode {
    /// Portable if a portable document already exists, otherwise Local.
    Auto,
    /// Machine-wide location.
    Global,
    /// Per-user location.
    Local,
    /// Beside the executable.
    Portable,
}

impl ConfigMode {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Some(ConfigMode::Auto),
            "global" => Some(ConfigMode::Global),
            "local" => Some(ConfigMode::Local),
            "portable" => Some(ConfigMode::Portable),
            _ => None,
        }
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigMode::Auto => "auto",
            ConfigMode::Global => "global",
            ConfigMode::Local => "local",
            ConfigMode::Portable => "portable",
        }
    }
}

impl std::fmt::Display for ConfigMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The three location directories, resolved once at startup.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    portable_dir: PathBuf,
    global_dir: PathBuf,
    local_dir: PathBuf,
}

impl ConfigPaths {
    /// Discover the platform locations, honoring the `SBX_*_DIR` overrides.
    pub fn discover() -> Self {
        let portable_dir = env::var_os(PORTABLE_DIR_ENV)
            .map(PathBuf::from)
            .or_else(|| {
                env::current_exe()
                    .ok()
                    .and_then(|exe| exe.parent().map(Path::to_path_buf))
            })
            .unwrap_or_else(|| PathBuf::from("."));

        let global_dir = env::var_os(GLOBAL_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(Self::system_dir);

        let local_dir = env::var_os(LOCAL_DIR_ENV)
            .map(PathBuf::from)
            .or_else(|| dirs::config_dir().map(|dir| dir.join("sealbox")))
            .unwrap_or_else(|| PathBuf::from(".sealbox"));

        Self {
            portable_dir,
            global_dir,
            local_dir,
        }
    }

    /// Build paths from explicit directories (dependency injection).
    pub fn with_dirs(
        portable_dir: impl Into<PathBuf>,
        global_dir: impl Into<PathBuf>,
        local_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            portable_dir: portable_dir.into(),
            global_dir: global_dir.into(),
            local_dir: local_dir.into(),
        }
    }

    #[cfg(unix)]
    fn system_dir() -> PathBuf {
        PathBuf::from("/etc/sealbox")
    }

    #[cfg(windows)]
    fn system_dir() -> PathBuf {
        env::var_os("ProgramData")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(r"C:\ProgramData"))
            .join("sealbox")
    }

    #[cfg(not(any(unix, windows)))]
    fn system_dir() -> PathBuf {
        PathBuf::from("sealbox-global")
    }

    /// The directory for a concrete location mode. `Auto` has no directory.
    pub fn dir(&self, mode: ConfigMode) -> Option<&Path> {
        match mode {
            ConfigMode::Portable => Some(&self.portable_dir),
            ConfigMode::Global => Some(&self.global_dir),
            ConfigMode::Local => Some(&self.local_dir),
            ConfigMode::Auto => None,
        }
    }

    /// The settings file for the portable location.
    pub fn portable_file(&self) -> PathBuf {
        self.portable_dir.join(SETTINGS_FILE)
    }

    /// The settings file for the global location.
    pub fn global_file(&self) -> PathBuf {
        self.global_dir.join(SETTINGS_FILE)
    }

    /// The settings file for the local location.
    pub fn local_file(&self) -> PathBuf {
        self.local_dir.join(SETTINGS_FILE)
    }
}

/// The effective settings: the winning document plus the two derived
/// fields that always reflect the location that produced it.
#[derive(Debug, Clone)]
pub struct Settings {
    /// The document as persisted, after the per-mode restriction transform.
    pub document: SettingsDocument,
    mode: ConfigMode,
    key_storage_dir: PathBuf,
}

impl Settings {
    /// The location that won resolution (or the last save target).
    /// Always concrete, never `Auto`.
    pub fn mode(&self) -> ConfigMode {
        self.mode
    }

    /// The `Keys` directory beside the authoritative settings file.
    /// Derived, never persisted.
    pub fn key_storage_dir(&self) -> &Path {
        &self.key_storage_dir
    }

    fn adopt(mut document: SettingsDocument, mode: ConfigMode, dir: &Path) -> Self {
        document.restrictions = restriction_policy(mode, document.restrictions.take());
        Self {
            document,
            mode,
            key_storage_dir: dir.join(KEYS_SUBDIR),
        }
    }

    /// Persist to the location named by `mode` and re-derive `mode` and the
    /// key-storage directory from that location.
    ///
    /// `Auto` picks Portable when a portable document already exists (its
    /// mere existence gates the decision, not its contents), otherwise
    /// Local - creating the local directory first, best-effort.
    pub fn save(&mut self, paths: &ConfigPaths, mode: ConfigMode) -> Result<()> {
        match mode {
            ConfigMode::Auto => {
                if paths.portable_file().exists() {
                    self.write_to(paths, ConfigMode::Portable)
                } else {
                    if let Err(e) = fs::create_dir_all(&paths.local_dir) {
                        // A real problem resurfaces as a write failure below.
                        warn!(error = %e, "could not create local settings directory");
                    }
                    self.write_to(paths, ConfigMode::Local)
                }
            }
            concrete => self.write_to(paths, concrete),
        }
    }

    fn write_to(&mut self, paths: &ConfigPaths, mode: ConfigMode) -> Result<()> {
        let Some(dir) = paths.dir(mode) else {
            return Err(Error::UnsupportedMode(mode.to_string()));
        };

        self.document.restrictions = restriction_policy(mode, self.document.restrictions.take());
        let json = serde_json::to_string_pretty(&self.document)?;
        fs::write(dir.join(SETTINGS_FILE), json)?;

        self.mode = mode;
        self.key_storage_dir = dir.join(KEYS_SUBDIR);
        debug!(mode = %mode, dir = %dir.display(), "settings saved");
        Ok(())
    }
}

/// Per-mode restriction transform, applied identically on the load and
/// save paths: Global keeps the policy (synthesizing a default when the
/// document had none), every other location strips it.
fn restriction_policy(mode: ConfigMode, current: Option<Restrictions>) -> Option<Restrictions> {
    match mode {
        ConfigMode::Global => Some(current.unwrap_or_default()),
        ConfigMode::Local | ConfigMode::Portable => None,
        // Auto resolves to a concrete location before the policy runs.
        ConfigMode::Auto => current,
    }
}

/// Resolve the effective settings.
///
/// Precedence is strict and short-circuiting: a loadable Portable document
/// wins without the other locations being consulted; otherwise Global and
/// Local are each attempted independently and Global dominates. When
/// nothing loads, defaults are synthesized in Local mode - the first-run
/// path, which succeeds even when the local directory does not exist yet.
pub fn resolve(paths: &ConfigPaths) -> Settings {
    if let Some(document) = try_load(&paths.portable_file(), ConfigMode::Portable) {
        return Settings::adopt(document, ConfigMode::Portable, &paths.portable_dir);
    }

    // One location failing to load must not keep the other from being read.
    let global = try_load(&paths.global_file(), ConfigMode::Global);
    let local = try_load(&paths.local_file(), ConfigMode::Local);

    if let Some(document) = global {
        return Settings::adopt(document, ConfigMode::Global, &paths.global_dir);
    }
    if let Some(document) = local {
        return Settings::adopt(document, ConfigMode::Local, &paths.local_dir);
    }

    debug!("no settings document found, synthesizing defaults in local mode");
    Settings::adopt(SettingsDocument::default(), ConfigMode::Local, &paths.local_dir)
}

/// Attempt one location. Absence is ordinary; anything else is logged.
fn try_load(file: &Path, mode: ConfigMode) -> Option<SettingsDocument> {
    let contents = match fs::read_to_string(file) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(mode = %mode, path = %file.display(), "no settings document");
            return None;
        }
        Err(e) => {
            warn!(mode = %mode, path = %file.display(), error = %e, "settings document unreadable");
            return None;
        }
    };
    match serde_json::from_str(&contents) {
        Ok(document) => Some(document),
        Err(e) => {
            warn!(mode = %mode, path = %file.display(), error = %e, "settings document malformed");
            None
        }
    }
}
