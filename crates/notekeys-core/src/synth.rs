//! Key synthesis: logical key transition to primitive input actions.

use crate::keymap::KeyLookup;
use crate::types::{InputEvent, KeyEdge, Modifiers, ScKey, Vk};
use crate::us_map::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Keys that need `KEYEVENTF_EXTENDEDKEY` when sent as scancodes.
pub const EXTENDED_VKS: &[Vk] = &[
    VK_INSERT,
    VK_DELETE,
    VK_HOME,
    VK_END,
    VK_PRIOR,
    VK_NEXT,
    VK_LEFT,
    VK_UP,
    VK_RIGHT,
    VK_DOWN,
    VK_RCONTROL,
    VK_RMENU,
    VK_DIVIDE,
];

pub fn is_extended(vk: Vk) -> bool {
    EXTENDED_VKS.contains(&vk)
}

/// Injection strategy, chosen once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SynthMode {
    #[default]
    VirtualKey,
    Scancode,
}

/// Turns a logical key transition into primitive actions.
pub trait KeySynthesizer: Send {
    fn synthesize(&self, ch: char, edge: KeyEdge) -> Vec<InputEvent>;
}

pub fn build_synthesizer(mode: SynthMode, lookup: Arc<dyn KeyLookup>) -> Box<dyn KeySynthesizer> {
    match mode {
        SynthMode::VirtualKey => Box::new(VirtualKeySynth::new(lookup)),
        SynthMode::Scancode => Box::new(ScancodeSynth::new(lookup)),
    }
}

/// Modifier keys in acquisition order.
fn modifier_vks(mods: Modifiers) -> Vec<Vk> {
    let mut out = Vec::with_capacity(3);
    if mods.shift {
        out.push(VK_SHIFT);
    }
    if mods.ctrl {
        out.push(VK_CONTROL);
    }
    if mods.alt {
        out.push(VK_MENU);
    }
    out
}

/// Modifiers wrap the main key: pressed before it, released after it in
/// reverse order.
fn sequence<K: Copy>(
    mods: &[K],
    main: K,
    edge: KeyEdge,
    make: impl Fn(K, KeyEdge) -> InputEvent,
) -> Vec<InputEvent> {
    let mut events = Vec::with_capacity(mods.len() + 1);
    match edge {
        KeyEdge::Down => {
            events.extend(mods.iter().map(|&m| make(m, KeyEdge::Down)));
            events.push(make(main, KeyEdge::Down));
        }
        KeyEdge::Up => {
            events.push(make(main, KeyEdge::Up));
            events.extend(mods.iter().rev().map(|&m| make(m, KeyEdge::Up)));
        }
    }
    events
}

/// Sends virtual-key codes.
pub struct VirtualKeySynth {
    lookup: Arc<dyn KeyLookup>,
}

impl VirtualKeySynth {
    pub fn new(lookup: Arc<dyn KeyLookup>) -> Self {
        Self { lookup }
    }
}

impl KeySynthesizer for VirtualKeySynth {
    fn synthesize(&self, ch: char, edge: KeyEdge) -> Vec<InputEvent> {
        match self.lookup.resolve(ch) {
            Some(key) => sequence(&modifier_vks(key.mods), key.vk, edge, InputEvent::VirtualKey),
            None => {
                debug!("No key for {:?}, using unicode injection", ch);
                vec![InputEvent::Unicode(ch, edge)]
            }
        }
    }
}

/// Sends hardware scancodes, for applications that read raw scancodes.
pub struct ScancodeSynth {
    lookup: Arc<dyn KeyLookup>,
}

impl ScancodeSynth {
    pub fn new(lookup: Arc<dyn KeyLookup>) -> Self {
        Self { lookup }
    }

    fn sc_key(&self, vk: Vk) -> Option<ScKey> {
        self.lookup
            .scancode(vk)
            .filter(|&sc| sc != 0)
            .map(|sc| ScKey::new(sc, is_extended(vk)))
    }
}

impl KeySynthesizer for ScancodeSynth {
    fn synthesize(&self, ch: char, edge: KeyEdge) -> Vec<InputEvent> {
        let keys = self.lookup.resolve(ch).and_then(|key| {
            let main = self.sc_key(key.vk)?;
            let mods = modifier_vks(key.mods)
                .into_iter()
                .map(|vk| self.sc_key(vk))
                .collect::<Option<Vec<_>>>()?;
            Some((main, mods))
        });

        match keys {
            Some((main, mods)) => sequence(&mods, main, edge, InputEvent::Scancode),
            None => {
                debug!("No scancode for {:?}, using unicode injection", ch);
                vec![InputEvent::Unicode(ch, edge)]
            }
        }
    }
}
