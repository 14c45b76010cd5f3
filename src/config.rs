/// External configuration loader.
///
/// Reads `config.toml` from an explicit path, or searches the executable's
/// directory, the CWD and `~/.local/share/keyrace`. Every key has a default,
/// so a missing file or a partial one is fine. A file that exists but cannot
/// be read or parsed is an error; the caller decides to fall back.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

const FILE_NAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

// ── Public Config Struct ──

#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub speed: SpeedConfig,
    pub level: LevelConfig,
    pub race: RaceConfig,
    pub gamepad: GamepadConfig,
    pub general: GeneralConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpeedConfig {
    pub tick_rate_ms: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LevelConfig {
    pub width: usize,
    pub height: usize,
}

/// How the peer link is wired.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Loopback: one instance races itself.
    #[default]
    Solo,
    /// Messages on stdin/stdout, keyboard on the terminal.
    Race,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RaceConfig {
    pub mode: Mode,
    pub countdown_secs: u64,
    pub reader_poll_ms: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GamepadConfig {
    pub start: Vec<String>,
    pub reset: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GeneralConfig {
    /// `None` disables logging.
    pub log_file: Option<PathBuf>,
    pub log_level: String,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct TomlConfig {
    speed: TomlSpeed,
    level: TomlLevel,
    race: TomlRace,
    gamepad: TomlGamepad,
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlLevel {
    #[serde(default = "default_side")]
    width: usize,
    #[serde(default = "default_side")]
    height: usize,
}

#[derive(Deserialize, Debug)]
struct TomlRace {
    #[serde(default)]
    mode: Mode,
    #[serde(default = "default_countdown")]
    countdown_secs: u64,
    #[serde(default = "default_reader_poll")]
    reader_poll_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_start")]
    start: Vec<String>,
    #[serde(default = "default_reset")]
    reset: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_log_file")]
    log_file: String,
    #[serde(default = "default_log_level")]
    log_level: String,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 16 }
fn default_side() -> usize { 16 }
fn default_countdown() -> u64 { 30 }
fn default_reader_poll() -> u64 { 10 }
fn default_start() -> Vec<String> { vec!["Start".into()] }
fn default_reset() -> Vec<String> { vec!["Select".into()] }
fn default_log_file() -> String { "keyrace.log".into() }
fn default_log_level() -> String { "info".into() }

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed { tick_rate_ms: default_tick_rate() }
    }
}

impl Default for TomlLevel {
    fn default() -> Self {
        TomlLevel { width: default_side(), height: default_side() }
    }
}

impl Default for TomlRace {
    fn default() -> Self {
        TomlRace {
            mode: Mode::default(),
            countdown_secs: default_countdown(),
            reader_poll_ms: default_reader_poll(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad { start: default_start(), reset: default_reset() }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { log_file: default_log_file(), log_level: default_log_level() }
    }
}

impl From<TomlConfig> for GameConfig {
    fn from(t: TomlConfig) -> Self {
        let log_file = match t.general.log_file.trim() {
            "" => None,
            path => Some(PathBuf::from(path)),
        };
        GameConfig {
            speed: SpeedConfig { tick_rate_ms: t.speed.tick_rate_ms },
            level: LevelConfig { width: t.level.width, height: t.level.height },
            race: RaceConfig {
                mode: t.race.mode,
                countdown_secs: t.race.countdown_secs,
                reader_poll_ms: t.race.reader_poll_ms,
            },
            gamepad: GamepadConfig { start: t.gamepad.start, reset: t.gamepad.reset },
            general: GeneralConfig { log_file, log_level: t.general.log_level },
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        TomlConfig::default().into()
    }
}

// ── Loading ──

impl GameConfig {
    /// Load from `explicit` if given, else from the first `config.toml`
    /// found in the search directories. No file at all means defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => candidate_dirs()
                .into_iter()
                .map(|d| d.join(FILE_NAME))
                .find(|p| p.is_file()),
        };
        match path {
            Some(path) => Self::load_file(&path),
            None => Ok(GameConfig::default()),
        }
    }

    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::parse(&text, path)
    }

    fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str::<TomlConfig>(text)
            .map(GameConfig::from)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }
}

/// Candidate directories to search: exe dir + CWD + XDG data dir (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/keyrace");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    dirs
}
