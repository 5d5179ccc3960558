//! Windows input injection and live layout queries.

use crate::error::InjectError;
use crate::keymap::{self, KeyLookup};
use crate::sink::InputSink;
use crate::types::{InputEvent, KeyEdge, Modifiers, ResolvedKey, ScKey, Vk};
use tracing::info;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    MapVirtualKeyW, SendInput, VkKeyScanW, INPUT, INPUT_0, INPUT_KEYBOARD, KEYBDINPUT,
    KEYBD_EVENT_FLAGS, KEYEVENTF_EXTENDEDKEY, KEYEVENTF_KEYUP, KEYEVENTF_SCANCODE,
    KEYEVENTF_UNICODE, MAPVK_VK_TO_VSC, VIRTUAL_KEY,
};

/// Magic number to identify our own injected events.
const INJECTED_EXTRA_INFO: usize = 0xFFC3C3C3;

/// Layout of the foreground input locale, queried on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLayout;

impl KeyLookup for SystemLayout {
    fn resolve(&self, c: char) -> Option<ResolvedKey> {
        if let Some(key) = keymap::named_key(c) {
            return Some(key);
        }
        // VkKeyScanW only takes a single UTF-16 unit.
        let unit = u16::try_from(u32::from(c)).ok()?;
        let res = unsafe { VkKeyScanW(unit) };
        if res == -1 {
            return None;
        }
        let res = res as u16;
        let state = res >> 8;
        Some(ResolvedKey::new(
            res & 0xFF,
            Modifiers {
                shift: state & 0x1 != 0,
                ctrl: state & 0x2 != 0,
                alt: state & 0x4 != 0,
            },
        ))
    }

    fn scancode(&self, vk: Vk) -> Option<u16> {
        let sc = unsafe { MapVirtualKeyW(u32::from(vk), MAPVK_VK_TO_VSC) };
        u16::try_from(sc).ok().filter(|&sc| sc != 0)
    }
}

/// Sink backed by `SendInput`.
#[derive(Debug, Default)]
pub struct SendInputSink;

impl SendInputSink {
    pub fn new() -> Self {
        info!("Using SendInput for key injection");
        Self
    }
}

impl InputSink for SendInputSink {
    fn inject(&mut self, event: &InputEvent) -> Result<(), InjectError> {
        match *event {
            InputEvent::VirtualKey(vk, edge) => inject_vk(vk, edge),
            InputEvent::Scancode(key, edge) => inject_scancode(key, edge),
            InputEvent::Unicode(c, edge) => inject_unicode(c, edge),
        }
    }
}

fn keyboard_input(vk: u16, scan: u16, flags: KEYBD_EVENT_FLAGS) -> INPUT {
    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: VIRTUAL_KEY(vk),
                wScan: scan,
                dwFlags: flags,
                time: 0,
                dwExtraInfo: INJECTED_EXTRA_INFO,
            },
        },
    }
}

fn send(inputs: &[INPUT]) -> Result<(), InjectError> {
    let sent = unsafe { SendInput(inputs, std::mem::size_of::<INPUT>() as i32) };
    if sent as usize == inputs.len() {
        Ok(())
    } else {
        Err(InjectError::Rejected(
            windows::core::Error::from_win32().message().to_string(),
        ))
    }
}

fn up_flag(edge: KeyEdge) -> KEYBD_EVENT_FLAGS {
    if edge.is_up() {
        KEYEVENTF_KEYUP
    } else {
        KEYBD_EVENT_FLAGS(0)
    }
}

/// Inject a virtual-key event.
pub fn inject_vk(vk: Vk, edge: KeyEdge) -> Result<(), InjectError> {
    send(&[keyboard_input(vk, 0, up_flag(edge))])
}

/// Inject a key event (scancode).
pub fn inject_scancode(key: ScKey, edge: KeyEdge) -> Result<(), InjectError> {
    let mut flags = KEYEVENTF_SCANCODE | up_flag(edge);
    if key.ext {
        flags |= KEYEVENTF_EXTENDEDKEY;
    }
    send(&[keyboard_input(0, key.sc, flags)])
}

/// Inject a unicode character. Characters outside the BMP go out as a
/// surrogate pair in one call.
pub fn inject_unicode(c: char, edge: KeyEdge) -> Result<(), InjectError> {
    let flags = KEYEVENTF_UNICODE | up_flag(edge);
    let mut buf = [0; 2];
    let inputs: Vec<INPUT> = c
        .encode_utf16(&mut buf)
        .iter()
        .map(|&unit| keyboard_input(0, unit, flags))
        .collect();
    send(&inputs)
}
