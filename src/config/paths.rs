//! Where chat-sfx keeps its settings file and its sound assets.
//!
//! Sound asset identifiers in the catalog (`emotions/laugh_1.ogg`) are
//! relative paths under [`AppPaths::sounds_dir`], which lives in the local
//! data directory:
//!
//! | Platform | `settings.toml` | sounds |
//! |----------|-----------------|--------|
//! | Linux    | `~/.config/chat-sfx/` | `~/.local/share/chat-sfx/sounds/` |
//! | macOS    | `~/Library/Application Support/chat-sfx/` | same dir + `sounds/` |
//! | Windows  | `%APPDATA%\chat-sfx\` | `%LOCALAPPDATA%\chat-sfx\sounds\` |

use std::path::{Path, PathBuf};

const APP_DIR: &str = "chat-sfx";
const SETTINGS_FILE: &str = "settings.toml";
const SOUNDS_DIR: &str = "sounds";

#[derive(Debug, Clone, PartialEq)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub settings_file: PathBuf,
    /// Default root for sound assets; `AppConfig::sounds_dir` overrides it.
    pub sounds_dir: PathBuf,
}

impl AppPaths {
    pub fn new() -> Self {
        Self::under(dirs::config_dir(), dirs::data_local_dir())
    }

    /// Lay the app directories out under the given platform bases.  A
    /// missing base falls back to the working directory.
    fn under(config_base: Option<PathBuf>, data_base: Option<PathBuf>) -> Self {
        let here = || PathBuf::from(".");
        let config_dir = config_base.unwrap_or_else(here).join(APP_DIR);
        let sounds_dir = data_base.unwrap_or_else(here).join(APP_DIR).join(SOUNDS_DIR);

        Self {
            settings_file: config_dir.join(SETTINGS_FILE),
            config_dir,
            sounds_dir,
        }
    }

    /// Root that asset identifiers resolve against: `configured` when set,
    /// otherwise the platform sounds directory.
    pub fn sounds_root(&self, configured: Option<&Path>) -> PathBuf {
        configured
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.sounds_dir.clone())
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
