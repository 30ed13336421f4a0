use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HallConfig {
    #[serde(default = "default_target_fps")]
    pub target_fps: f64,
    /// Text drawn in the bottom-right corner. Empty hides it.
    #[serde(default = "default_signature")]
    pub signature: String,
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
    #[serde(default)]
    pub key_bindings: KeyBindings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBindings {
    #[serde(default = "default_start")]
    pub start: String,
    #[serde(default = "default_quit")]
    pub quit: String,
    #[serde(default = "default_quit_alt")]
    pub quit_alt: String,
}

fn default_target_fps() -> f64 { 75.0 }
fn default_signature() -> String { "cinema-hall".into() }
fn default_log_file() -> PathBuf { std::env::temp_dir().join("cinema-hall.log") }
fn default_start() -> String { "Enter".into() }
fn default_quit() -> String { "q".into() }
fn default_quit_alt() -> String { "Esc".into() }

impl Default for KeyBindings {
    fn default() -> Self {
        KeyBindings {
            start: default_start(),
            quit: default_quit(),
            quit_alt: default_quit_alt(),
        }
    }
}

impl Default for HallConfig {
    fn default() -> Self {
        HallConfig {
            target_fps: default_target_fps(),
            signature: default_signature(),
            log_file: default_log_file(),
            key_bindings: KeyBindings::default(),
        }
    }
}

impl HallConfig {
    /// Load from `path`, or from the per-user config file when `None`.
    ///
    /// A missing file yields the defaults; an unreadable one yields the
    /// defaults plus a warning.
    pub fn load(path: Option<&Path>) -> Self {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);
        let mut config = match std::fs::read_to_string(&config_path) {
            Ok(json) => Self::parse(&json).unwrap_or_else(|e| {
                warn!(path = %config_path.display(), "invalid config ({e}), using defaults");
                Self::default()
            }),
            Err(_) => Self::default(),
        };
        if !(config.target_fps.is_finite() && config.target_fps > 0.0) {
            warn!(fps = config.target_fps, "target_fps must be positive, using default");
            config.target_fps = default_target_fps();
        }
        config
    }

    pub fn parse(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    fn config_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        let mut path = PathBuf::from(home);
        path.push(".config");
        path.push("cinema-hall");
        path.push("config.json");
        path
    }
}

/// Check whether a crossterm `KeyEvent` matches a binding string from config.
pub fn matches_binding(binding: &str, event: &KeyEvent) -> bool {
    if let Some(rest) = binding.strip_prefix("Ctrl-") {
        if !event.modifiers.contains(KeyModifiers::CONTROL) {
            return false;
        }
        return rest
            .chars()
            .next()
            .is_some_and(|c| event.code == KeyCode::Char(c));
    }

    if event.modifiers.contains(KeyModifiers::CONTROL)
        || event.modifiers.contains(KeyModifiers::ALT)
    {
        return false;
    }

    match binding {
        "Enter" => event.code == KeyCode::Enter,
        "Esc" => event.code == KeyCode::Esc,
        "Space" => event.code == KeyCode::Char(' '),
        "Tab" => event.code == KeyCode::Tab,
        s => {
            if let Some(n) = s.strip_prefix('F').and_then(|rest| rest.parse::<u8>().ok()) {
                return event.code == KeyCode::F(n);
            }
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => event.code == KeyCode::Char(c),
                _ => false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn partial_config_fills_defaults() {
        let cfg =
            HallConfig::parse(r#"{ "target_fps": 30, "key_bindings": { "start": "s" } }"#)
                .unwrap();
        assert_eq!(cfg.target_fps, 30.0);
        assert_eq!(cfg.signature, "cinema-hall");
        assert_eq!(cfg.key_bindings.start, "s");
        assert_eq!(cfg.key_bindings.quit, "q");
    }

    #[test]
    fn empty_object_is_default() {
        let cfg = HallConfig::parse("{}").unwrap();
        assert_eq!(cfg.target_fps, 75.0);
        assert_eq!(cfg.key_bindings.start, "Enter");
    }

    #[test]
    fn missing_file_gives_defaults() {
        let cfg = HallConfig::load(Some(Path::new("/nonexistent/cinema-hall/config.json")));
        assert_eq!(cfg.target_fps, 75.0);
    }

    #[test]
    fn bindings_match_named_and_char_keys() {
        assert!(matches_binding("Enter", &key(KeyCode::Enter)));
        assert!(matches_binding("q", &key(KeyCode::Char('q'))));
        assert!(matches_binding("F5", &key(KeyCode::F(5))));
        assert!(!matches_binding("q", &key(KeyCode::Char('w'))));
        assert!(!matches_binding("qq", &key(KeyCode::Char('q'))));
    }

    #[test]
    fn modifiers_are_respected() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(matches_binding("Ctrl-c", &ctrl_c));
        assert!(!matches_binding("c", &ctrl_c));
        assert!(!matches_binding("Ctrl-c", &key(KeyCode::Char('c'))));
    }
}
