use crate::types::{Modifiers, Vk};
use std::collections::HashMap;

pub const VK_BACK: Vk = 0x08;
pub const VK_TAB: Vk = 0x09;
pub const VK_RETURN: Vk = 0x0D;
pub const VK_SHIFT: Vk = 0x10;
pub const VK_CONTROL: Vk = 0x11;
pub const VK_MENU: Vk = 0x12;
pub const VK_ESCAPE: Vk = 0x1B;
pub const VK_SPACE: Vk = 0x20;
pub const VK_PRIOR: Vk = 0x21;
pub const VK_NEXT: Vk = 0x22;
pub const VK_END: Vk = 0x23;
pub const VK_HOME: Vk = 0x24;
pub const VK_LEFT: Vk = 0x25;
pub const VK_UP: Vk = 0x26;
pub const VK_RIGHT: Vk = 0x27;
pub const VK_DOWN: Vk = 0x28;
pub const VK_INSERT: Vk = 0x2D;
pub const VK_DELETE: Vk = 0x2E;
pub const VK_DIVIDE: Vk = 0x6F;
pub const VK_F1: Vk = 0x70;
pub const VK_LSHIFT: Vk = 0xA0;
pub const VK_RSHIFT: Vk = 0xA1;
pub const VK_LCONTROL: Vk = 0xA2;
pub const VK_RCONTROL: Vk = 0xA3;
pub const VK_LMENU: Vk = 0xA4;
pub const VK_RMENU: Vk = 0xA5;

/// Virtual-key to set-1 scancode for a standard US 104-key board.
/// The extended flag is not part of this table.
pub const US_VK_TO_SC: &[(Vk, u16)] = &[
    (VK_ESCAPE, 0x01),
    // Number row
    (0x31, 0x02), // 1
    (0x32, 0x03), // 2
    (0x33, 0x04), // 3
    (0x34, 0x05), // 4
    (0x35, 0x06), // 5
    (0x36, 0x07), // 6
    (0x37, 0x08), // 7
    (0x38, 0x09), // 8
    (0x39, 0x0A), // 9
    (0x30, 0x0B), // 0
    (0xBD, 0x0C), // - _
    (0xBB, 0x0D), // = +
    (VK_BACK, 0x0E),
    (VK_TAB, 0x0F),
    // QWERTY row
    (0x51, 0x10), // Q
    (0x57, 0x11), // W
    (0x45, 0x12), // E
    (0x52, 0x13), // R
    (0x54, 0x14), // T
    (0x59, 0x15), // Y
    (0x55, 0x16), // U
    (0x49, 0x17), // I
    (0x4F, 0x18), // O
    (0x50, 0x19), // P
    (0xDB, 0x1A), // [ {
    (0xDD, 0x1B), // ] }
    (VK_RETURN, 0x1C),
    (VK_CONTROL, 0x1D),
    (VK_LCONTROL, 0x1D),
    (VK_RCONTROL, 0x1D),
    // ASDF row
    (0x41, 0x1E), // A
    (0x53, 0x1F), // S
    (0x44, 0x20), // D
    (0x46, 0x21), // F
    (0x47, 0x22), // G
    (0x48, 0x23), // H
    (0x4A, 0x24), // J
    (0x4B, 0x25), // K
    (0x4C, 0x26), // L
    (0xBA, 0x27), // ; :
    (0xDE, 0x28), // ' "
    (0xC0, 0x29), // ` ~
    (VK_SHIFT, 0x2A),
    (VK_LSHIFT, 0x2A),
    (0xDC, 0x2B), // \ |
    // ZXCV row
    (0x5A, 0x2C), // Z
    (0x58, 0x2D), // X
    (0x43, 0x2E), // C
    (0x56, 0x2F), // V
    (0x42, 0x30), // B
    (0x4E, 0x31), // N
    (0x4D, 0x32), // M
    (0xBC, 0x33), // , <
    (0xBE, 0x34), // . >
    (0xBF, 0x35), // / ?
    (VK_DIVIDE, 0x35),
    (VK_RSHIFT, 0x36),
    (VK_MENU, 0x38),
    (VK_LMENU, 0x38),
    (VK_RMENU, 0x38),
    (VK_SPACE, 0x39),
    // Function keys
    (VK_F1, 0x3B),
    (VK_F1 + 1, 0x3C),
    (VK_F1 + 2, 0x3D),
    (VK_F1 + 3, 0x3E),
    (VK_F1 + 4, 0x3F),
    (VK_F1 + 5, 0x40),
    (VK_F1 + 6, 0x41),
    (VK_F1 + 7, 0x42),
    (VK_F1 + 8, 0x43),
    (VK_F1 + 9, 0x44),
    (VK_F1 + 10, 0x57),
    (VK_F1 + 11, 0x58),
    // Navigation cluster
    (VK_HOME, 0x47),
    (VK_UP, 0x48),
    (VK_PRIOR, 0x49),
    (VK_LEFT, 0x4B),
    (VK_RIGHT, 0x4D),
    (VK_END, 0x4F),
    (VK_DOWN, 0x50),
    (VK_NEXT, 0x51),
    (VK_INSERT, 0x52),
    (VK_DELETE, 0x53),
];

/// Printable characters of the US layout: (unshifted, shifted, vk).
const US_PRINTABLE: &[(char, char, Vk)] = &[
    ('1', '!', 0x31),
    ('2', '@', 0x32),
    ('3', '#', 0x33),
    ('4', '$', 0x34),
    ('5', '%', 0x35),
    ('6', '^', 0x36),
    ('7', '&', 0x37),
    ('8', '*', 0x38),
    ('9', '(', 0x39),
    ('0', ')', 0x30),
    ('-', '_', 0xBD),
    ('=', '+', 0xBB),
    ('[', '{', 0xDB),
    (']', '}', 0xDD),
    (';', ':', 0xBA),
    ('\'', '"', 0xDE),
    ('`', '~', 0xC0),
    ('\\', '|', 0xDC),
    (',', '<', 0xBC),
    ('.', '>', 0xBE),
    ('/', '?', 0xBF),
];

lazy_static::lazy_static! {
    static ref US_CHAR_MAP: HashMap<char, (Vk, Modifiers)> = {
        let mut m = HashMap::new();
        for c in 'a'..='z' {
            let vk = c.to_ascii_uppercase() as Vk;
            m.insert(c, (vk, Modifiers::none()));
            m.insert(c.to_ascii_uppercase(), (vk, Modifiers::shift()));
        }
        for &(plain, shifted, vk) in US_PRINTABLE {
            m.insert(plain, (vk, Modifiers::none()));
            m.insert(shifted, (vk, Modifiers::shift()));
        }
        m.insert(' ', (VK_SPACE, Modifiers::none()));
        m.insert('\t', (VK_TAB, Modifiers::none()));
        m.insert('\r', (VK_RETURN, Modifiers::none()));
        m.insert('\n', (VK_RETURN, Modifiers::none()));
        m.insert('\u{0008}', (VK_BACK, Modifiers::none()));
        m.insert('\u{001B}', (VK_ESCAPE, Modifiers::none()));
        m
    };
}

pub fn us_char_to_vk(c: char) -> Option<(Vk, Modifiers)> {
    US_CHAR_MAP.get(&c).copied()
}

pub fn us_vk_to_sc(vk: Vk) -> Option<u16> {
    US_VK_TO_SC
        .iter()
        .find(|(k, _)| *k == vk)
        .map(|(_, sc)| *sc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_carry_shift_only_when_uppercase() {
        assert_eq!(us_char_to_vk('a'), Some((0x41, Modifiers::none())));
        assert_eq!(us_char_to_vk('A'), Some((0x41, Modifiers::shift())));
        assert_eq!(us_char_to_vk('!'), Some((0x31, Modifiers::shift())));
        assert_eq!(us_char_to_vk('é'), None);
    }

    #[test]
    fn scancodes_follow_set_one() {
        assert_eq!(us_vk_to_sc(0x41), Some(0x1E));
        assert_eq!(us_vk_to_sc(0x56), Some(0x2F));
        assert_eq!(us_vk_to_sc(VK_LEFT), Some(0x4B));
        assert_eq!(us_vk_to_sc(VK_SHIFT), Some(0x2A));
        assert_eq!(us_vk_to_sc(0xFF), None);
    }
}
