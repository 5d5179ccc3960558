//! Character to key resolution.
//!
//! A [`KeyLookup`] answers two questions for the synthesizer: which virtual
//! key (plus modifiers) produces a character on the current layout, and which
//! hardware scancode a virtual key sits on.

use crate::types::{Modifiers, ResolvedKey, Vk};
use crate::us_map::{self, *};

/// Layout query used by the synthesizers.
pub trait KeyLookup: Send + Sync {
    /// Resolve a character, or `None` when the layout cannot type it.
    fn resolve(&self, c: char) -> Option<ResolvedKey>;

    /// Hardware scancode of a virtual key, without the extended flag.
    fn scancode(&self, vk: Vk) -> Option<u16>;
}

/// Keys addressable by name in mapping files.
/// Navigation and function keys use the private-use code points that
/// AppKit assigns to them, so they can travel through the tracker as `char`.
pub const NAMED_KEYS: &[(&str, char, Vk)] = &[
    ("up", '\u{F700}', VK_UP),
    ("down", '\u{F701}', VK_DOWN),
    ("left", '\u{F702}', VK_LEFT),
    ("right", '\u{F703}', VK_RIGHT),
    ("f1", '\u{F704}', VK_F1),
    ("f2", '\u{F705}', VK_F1 + 1),
    ("f3", '\u{F706}', VK_F1 + 2),
    ("f4", '\u{F707}', VK_F1 + 3),
    ("f5", '\u{F708}', VK_F1 + 4),
    ("f6", '\u{F709}', VK_F1 + 5),
    ("f7", '\u{F70A}', VK_F1 + 6),
    ("f8", '\u{F70B}', VK_F1 + 7),
    ("f9", '\u{F70C}', VK_F1 + 8),
    ("f10", '\u{F70D}', VK_F1 + 9),
    ("f11", '\u{F70E}', VK_F1 + 10),
    ("f12", '\u{F70F}', VK_F1 + 11),
    ("insert", '\u{F727}', VK_INSERT),
    ("ins", '\u{F727}', VK_INSERT),
    ("delete", '\u{F728}', VK_DELETE),
    ("del", '\u{F728}', VK_DELETE),
    ("home", '\u{F729}', VK_HOME),
    ("end", '\u{F72B}', VK_END),
    ("pageup", '\u{F72C}', VK_PRIOR),
    ("pgup", '\u{F72C}', VK_PRIOR),
    ("pagedown", '\u{F72D}', VK_NEXT),
    ("pgdn", '\u{F72D}', VK_NEXT),
    ("enter", '\r', VK_RETURN),
    ("tab", '\t', VK_TAB),
    ("space", ' ', VK_SPACE),
    ("backspace", '\u{0008}', VK_BACK),
    ("bs", '\u{0008}', VK_BACK),
    ("escape", '\u{001B}', VK_ESCAPE),
    ("esc", '\u{001B}', VK_ESCAPE),
];

/// Character standing for a named key (`"left"`, `"F5"`, ...).
pub fn named_key_char(name: &str) -> Option<char> {
    NAMED_KEYS
        .iter()
        .find(|(n, _, _)| n.eq_ignore_ascii_case(name))
        .map(|&(_, c, _)| c)
}

/// Printable name of a named-key character, for logs.
pub fn named_key_name(c: char) -> Option<&'static str> {
    NAMED_KEYS.iter().find(|&&(_, k, _)| k == c).map(|&(n, _, _)| n)
}

/// Layout-independent resolution of named keys.
pub fn named_key(c: char) -> Option<ResolvedKey> {
    NAMED_KEYS
        .iter()
        .find(|&&(_, k, _)| k == c)
        .map(|&(_, _, vk)| ResolvedKey::new(vk, Modifiers::none()))
}

/// Fixed US-QWERTY layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsLayout;

impl KeyLookup for UsLayout {
    fn resolve(&self, c: char) -> Option<ResolvedKey> {
        if let Some(key) = named_key(c) {
            return Some(key);
        }
        us_map::us_char_to_vk(c).map(|(vk, mods)| ResolvedKey::new(vk, mods))
    }

    fn scancode(&self, vk: Vk) -> Option<u16> {
        us_map::us_vk_to_sc(vk)
    }
}
