/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub board: BoardConfig,
    pub general: GeneralConfig,
    pub gamepad: GamepadConfig,
}

/// Board dealing constants.
///
/// `multipliers.len()` is also the number of left nodes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardConfig {
    pub value_min: u32,
    pub value_max: u32,
    pub multipliers: Vec<u32>,
}

#[derive(Clone, Debug)]
pub struct GeneralConfig {
    /// 0 = seed from the clock.
    pub seed: u64,
    pub tick_rate: Duration,
    pub win_prompt_delay: Duration,
    /// Empty = no event log.
    pub event_log: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub confirm: Vec<String>,
    pub validate: Vec<String>,
    pub reset: Vec<String>,
    pub new_round: Vec<String>,
    pub quit: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    board: TomlBoard,
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlBoard {
    #[serde(default = "default_value_min")]
    value_min: u32,
    #[serde(default = "default_value_max")]
    value_max: u32,
    #[serde(default = "default_multipliers")]
    multipliers: Vec<u32>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default)]
    seed: u64,
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_win_prompt_delay")]
    win_prompt_delay_ms: u64,
    #[serde(default)]
    event_log: String,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_validate")]
    validate: Vec<String>,
    #[serde(default = "default_reset")]
    reset: Vec<String>,
    #[serde(default = "default_new_round")]
    new_round: Vec<String>,
    #[serde(default = "default_quit")]
    quit: Vec<String>,
}

// ── Defaults ──

fn default_value_min() -> u32 { 1 }
fn default_value_max() -> u32 { 30 }
fn default_multipliers() -> Vec<u32> { vec![1, 2, 10] }
fn default_tick_rate() -> u64 { 50 }
fn default_win_prompt_delay() -> u64 { 300 }

fn default_confirm() -> Vec<String> { vec!["A".into()] }
fn default_validate() -> Vec<String> { vec!["Y".into()] }
fn default_reset() -> Vec<String> { vec!["X".into()] }
fn default_new_round() -> Vec<String> { vec!["Start".into()] }
fn default_quit() -> Vec<String> { vec!["Select".into()] }

impl Default for TomlBoard {
    fn default() -> Self {
        TomlBoard {
            value_min: default_value_min(),
            value_max: default_value_max(),
            multipliers: default_multipliers(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            seed: 0,
            tick_rate_ms: default_tick_rate(),
            win_prompt_delay_ms: default_win_prompt_delay(),
            event_log: String::new(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            confirm: default_confirm(),
            validate: default_validate(),
            reset: default_reset(),
            new_round: default_new_round(),
            quit: default_quit(),
        }
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        BoardConfig {
            value_min: default_value_min(),
            value_max: default_value_max(),
            multipliers: default_multipliers(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default())
    }
}

// ── Validation ──

impl BoardConfig {
    /// Why this board section cannot be dealt from, if it can't.
    ///
    /// Dealing draws distinct values by rejection sampling, so the value
    /// range must hold at least one integer per multiplier or it never ends.
    pub fn problem(&self) -> Option<String> {
        let n = self.multipliers.len();
        if n == 0 {
            return Some("multipliers list is empty".into());
        }
        let mut sorted = self.multipliers.clone();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.len() != n {
            return Some("multipliers must be distinct".into());
        }
        if self.value_min == 0 {
            return Some("value_min must be at least 1".into());
        }
        if self.value_max < self.value_min {
            return Some(format!("value_max {} is below value_min {}", self.value_max, self.value_min));
        }
        let span = (self.value_max - self.value_min) as u64 + 1;
        if span < n as u64 {
            return Some(format!(
                "range {}..={} holds {} values, need {}",
                self.value_min, self.value_max, span, n
            ));
        }
        // Largest reachable score must fit the u32 the board and scorer use.
        let mult_sum: u64 = self.multipliers.iter().map(|&m| m as u64).sum();
        if (self.value_max as u64).saturating_mul(mult_sum) > u32::MAX as u64 {
            return Some(format!(
                "value_max {} times multiplier sum {} overflows the score",
                self.value_max, mult_sum
            ));
        }
        None
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        GameConfig::from_toml(load_toml(&search_dirs))
    }

    /// Parse config text directly. Parse errors fall back to defaults.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn parse(text: &str) -> Self {
        match toml::from_str::<TomlConfig>(text) {
            Ok(cfg) => GameConfig::from_toml(cfg),
            Err(e) => {
                eprintln!("Warning: config.toml parse error: {e}");
                GameConfig::default()
            }
        }
    }

    fn from_toml(toml_cfg: TomlConfig) -> Self {
        let mut board = BoardConfig {
            value_min: toml_cfg.board.value_min,
            value_max: toml_cfg.board.value_max,
            multipliers: toml_cfg.board.multipliers,
        };
        if let Some(problem) = board.problem() {
            eprintln!("Warning: [board] {problem}");
            eprintln!("Using default board settings.");
            board = BoardConfig::default();
        }

        let event_log = if toml_cfg.general.event_log.trim().is_empty() {
            None
        } else {
            Some(PathBuf::from(toml_cfg.general.event_log.trim()))
        };

        GameConfig {
            board,
            general: GeneralConfig {
                seed: toml_cfg.general.seed,
                tick_rate: Duration::from_millis(toml_cfg.general.tick_rate_ms.max(1)),
                win_prompt_delay: Duration::from_millis(toml_cfg.general.win_prompt_delay_ms),
                event_log,
            },
            gamepad: GamepadConfig {
                confirm: toml_cfg.gamepad.confirm,
                validate: toml_cfg.gamepad.validate,
                reset: toml_cfg.gamepad.reset,
                new_round: toml_cfg.gamepad.new_round,
                quit: toml_cfg.gamepad.quit,
            },
        }
    }
}

/// Candidate directories to search: exe dir + CWD + XDG data home (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/circuit-match");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}
