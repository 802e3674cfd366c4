//! Key identifier strings for hotkey bindings
//!
//! Preferences store hotkeys as lowercase names (`"f6"`, `"a"`, `"space"`).
//! Keys without a name round-trip as `"code:<n>"`.

use rdev::Key;

use crate::ClickerError;

const KEY_NAMES: &[(&str, Key)] = &[
    ("f1", Key::F1),
    ("f2", Key::F2),
    ("f3", Key::F3),
    ("f4", Key::F4),
    ("f5", Key::F5),
    ("f6", Key::F6),
    ("f7", Key::F7),
    ("f8", Key::F8),
    ("f9", Key::F9),
    ("f10", Key::F10),
    ("f11", Key::F11),
    ("f12", Key::F12),
    ("a", Key::KeyA),
    ("b", Key::KeyB),
    ("c", Key::KeyC),
    ("d", Key::KeyD),
    ("e", Key::KeyE),
    ("f", Key::KeyF),
    ("g", Key::KeyG),
    ("h", Key::KeyH),
    ("i", Key::KeyI),
    ("j", Key::KeyJ),
    ("k", Key::KeyK),
    ("l", Key::KeyL),
    ("m", Key::KeyM),
    ("n", Key::KeyN),
    ("o", Key::KeyO),
    ("p", Key::KeyP),
    ("q", Key::KeyQ),
    ("r", Key::KeyR),
    ("s", Key::KeyS),
    ("t", Key::KeyT),
    ("u", Key::KeyU),
    ("v", Key::KeyV),
    ("w", Key::KeyW),
    ("x", Key::KeyX),
    ("y", Key::KeyY),
    ("z", Key::KeyZ),
    ("0", Key::Num0),
    ("1", Key::Num1),
    ("2", Key::Num2),
    ("3", Key::Num3),
    ("4", Key::Num4),
    ("5", Key::Num5),
    ("6", Key::Num6),
    ("7", Key::Num7),
    ("8", Key::Num8),
    ("9", Key::Num9),
    ("space", Key::Space),
    ("enter", Key::Return),
    ("tab", Key::Tab),
    ("esc", Key::Escape),
    ("backspace", Key::Backspace),
    ("delete", Key::Delete),
    ("insert", Key::Insert),
    ("home", Key::Home),
    ("end", Key::End),
    ("page up", Key::PageUp),
    ("page down", Key::PageDown),
    ("up", Key::UpArrow),
    ("down", Key::DownArrow),
    ("left", Key::LeftArrow),
    ("right", Key::RightArrow),
    ("caps lock", Key::CapsLock),
    ("num lock", Key::NumLock),
    ("scroll lock", Key::ScrollLock),
    ("print screen", Key::PrintScreen),
    ("pause", Key::Pause),
    ("`", Key::BackQuote),
    ("-", Key::Minus),
    ("=", Key::Equal),
    ("[", Key::LeftBracket),
    ("]", Key::RightBracket),
    (";", Key::SemiColon),
    ("'", Key::Quote),
    ("\\", Key::BackSlash),
    (",", Key::Comma),
    (".", Key::Dot),
    ("/", Key::Slash),
    ("intl \\", Key::IntlBackslash),
    ("kp 0", Key::Kp0),
    ("kp 1", Key::Kp1),
    ("kp 2", Key::Kp2),
    ("kp 3", Key::Kp3),
    ("kp 4", Key::Kp4),
    ("kp 5", Key::Kp5),
    ("kp 6", Key::Kp6),
    ("kp 7", Key::Kp7),
    ("kp 8", Key::Kp8),
    ("kp 9", Key::Kp9),
    ("kp enter", Key::KpReturn),
    ("kp -", Key::KpMinus),
    ("kp +", Key::KpPlus),
    ("kp *", Key::KpMultiply),
    ("kp /", Key::KpDivide),
    ("kp delete", Key::KpDelete),
    ("fn", Key::Function),
    ("alt", Key::Alt),
    ("altgr", Key::AltGr),
    ("ctrl", Key::ControlLeft),
    ("right ctrl", Key::ControlRight),
    ("super", Key::MetaLeft),
    ("right super", Key::MetaRight),
    ("shift", Key::ShiftLeft),
    ("right shift", Key::ShiftRight),
];

/// Parse a key identifier into a hook key
pub fn parse_key(name: &str) -> Result<Key, ClickerError> {
    let normalized = name.trim().to_lowercase();
    let lookup = match normalized.as_str() {
        "return" => "enter",
        "escape" => "esc",
        "pageup" | "pgup" => "page up",
        "pagedown" | "pgdn" => "page down",
        "capslock" => "caps lock",
        "control" => "ctrl",
        "meta" | "win" => "super",
        "function" => "fn",
        "intlbackslash" => "intl \\",
        "kpreturn" | "kpenter" => "kp enter",
        "kpminus" => "kp -",
        "kpplus" => "kp +",
        "kpmultiply" => "kp *",
        "kpdivide" => "kp /",
        "kpdelete" => "kp delete",
        other => other,
    };
    // "kp0" as well as "kp 0"
    let keypad_digit = lookup
        .strip_prefix("kp")
        .filter(|digit| digit.len() == 1 && digit.chars().all(|c| c.is_ascii_digit()))
        .map(|digit| format!("kp {}", digit));
    let lookup = keypad_digit.as_deref().unwrap_or(lookup);

    if let Some((_, key)) = KEY_NAMES.iter().find(|(n, _)| *n == lookup) {
        return Ok(*key);
    }

    if let Some(code) = lookup.strip_prefix("code:") {
        if let Ok(code) = code.parse::<u32>() {
            return Ok(Key::Unknown(code));
        }
    }

    Err(ClickerError::UnknownKey(name.trim().to_string()))
}

/// Identifier string for a key, the inverse of [`parse_key`]
///
/// `None` for a key with no identifier, which must not be persisted.
pub fn try_key_name(key: Key) -> Option<String> {
    if let Key::Unknown(code) = key {
        return Some(format!("code:{}", code));
    }

    KEY_NAMES
        .iter()
        .find(|(_, k)| *k == key)
        .map(|(n, _)| n.to_string())
}

/// Identifier string for logs and messages
pub fn key_name(key: Key) -> String {
    try_key_name(key).unwrap_or_else(|| format!("{:?}", key))
}

/// Alt, Ctrl and Super suppress hotkeys while held
pub fn is_system_modifier(key: Key) -> bool {
    matches!(
        key,
        Key::Alt | Key::AltGr | Key::ControlLeft | Key::ControlRight | Key::MetaLeft | Key::MetaRight
    )
}

/// Any modifier, including shift. Never bound as a hotkey on its own.
pub fn is_modifier(key: Key) -> bool {
    is_system_modifier(key) || matches!(key, Key::ShiftLeft | Key::ShiftRight)
}
