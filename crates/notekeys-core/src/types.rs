use serde::{Deserialize, Serialize};

/// Windows Scancode + Extended flag key identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScKey {
    pub sc: u16,
    pub ext: bool,
}

impl ScKey {
    pub const fn new(sc: u16, ext: bool) -> Self {
        Self { sc, ext }
    }
}

/// Windows virtual-key code.
pub type Vk = u16;

/// Direction of a key transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyEdge {
    Down,
    Up,
}

impl KeyEdge {
    pub const fn is_up(self) -> bool {
        matches!(self, KeyEdge::Up)
    }
}

/// Primitive action handed to the input sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Virtual-key injection.
    VirtualKey(Vk, KeyEdge),
    /// Scancode injection.
    Scancode(ScKey, KeyEdge),
    /// Unicode character injection.
    Unicode(char, KeyEdge),
}

impl InputEvent {
    /// Short name used in log output.
    pub const fn kind(&self) -> &'static str {
        match self {
            InputEvent::VirtualKey(..) => "virtual-key",
            InputEvent::Scancode(..) => "scancode",
            InputEvent::Unicode(..) => "unicode",
        }
    }
}

/// Modifier keys applied to a keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const fn none() -> Self {
        Self {
            shift: false,
            ctrl: false,
            alt: false,
        }
    }

    pub const fn shift() -> Self {
        Self {
            shift: true,
            ctrl: false,
            alt: false,
        }
    }

    pub const fn is_empty(self) -> bool {
        !(self.shift || self.ctrl || self.alt)
    }
}

/// A character resolved against a keyboard layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedKey {
    pub vk: Vk,
    pub mods: Modifiers,
}

impl ResolvedKey {
    pub const fn new(vk: Vk, mods: Modifiers) -> Self {
        Self { vk, mods }
    }
}

/// Kind of a note message as delivered by the MIDI adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoteKind {
    On,
    Off,
}

/// Note message as delivered by the MIDI adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteEvent {
    pub note: u8,
    pub velocity: u8,
    pub kind: NoteKind,
}

/// What a note message means to the tracker once normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Press,
    Release,
}

impl NoteEvent {
    pub const fn on(note: u8, velocity: u8) -> Self {
        Self {
            note,
            velocity,
            kind: NoteKind::On,
        }
    }

    pub const fn off(note: u8) -> Self {
        Self {
            note,
            velocity: 0,
            kind: NoteKind::Off,
        }
    }

    /// Note-on with velocity 0 is a release.
    pub const fn transition(&self) -> Transition {
        match self.kind {
            NoteKind::On if self.velocity > 0 => Transition::Press,
            _ => Transition::Release,
        }
    }
}

/// Abstract press/release of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogicalKeyEvent {
    pub ch: char,
    pub edge: KeyEdge,
}

impl LogicalKeyEvent {
    pub const fn down(ch: char) -> Self {
        Self {
            ch,
            edge: KeyEdge::Down,
        }
    }

    pub const fn up(ch: char) -> Self {
        Self {
            ch,
            edge: KeyEdge::Up,
        }
    }
}
