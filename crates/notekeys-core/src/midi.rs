//! Raw MIDI decoding for the note adapter.

use crate::types::{NoteEvent, NoteKind};

/// Decode a Note On (0x9n) or Note Off (0x8n) message. The channel is dropped.
///
/// Running status and every other message type yield `None`.
pub fn decode_note(data: &[u8]) -> Option<NoteEvent> {
    let (&status, rest) = data.split_first()?;
    if status < 0x80 {
        return None;
    }
    let (note, velocity) = match rest {
        [note, velocity, ..] => (note & 0x7F, velocity & 0x7F),
        _ => return None,
    };
    let kind = match status & 0xF0 {
        0x80 => NoteKind::Off,
        0x90 => NoteKind::On,
        _ => return None,
    };
    Some(NoteEvent {
        note,
        velocity,
        kind,
    })
}
