use serde::{Deserialize, Serialize};

/// A key event intercepted inside an embedded view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyboardShortcut {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyboardShortcut {
    /// Accelerator string in the `Ctrl+Shift+B` form used by the shortcut table.
    pub fn accelerator(&self) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(5);
        if self.ctrl {
            parts.push("Ctrl".to_string());
        }
        if self.meta {
            parts.push("Cmd".to_string());
        }
        if self.alt {
            parts.push("Alt".to_string());
        }
        if self.shift {
            parts.push("Shift".to_string());
        }
        parts.push(normalize_key(&self.key));
        parts.join("+")
    }
}

fn normalize_key(key: &str) -> String {
    match key {
        "+" => "Plus".to_string(),
        "-" => "Minus".to_string(),
        "," => "Comma".to_string(),
        k if k.chars().count() == 1 => k.to_uppercase(),
        k => k.to_string(),
    }
}
