//! Note state tracker.
//!
//! Turns note-on/note-off traffic into logical key transitions. Several notes
//! may map to the same character; the character goes down when the first of
//! them is pressed and up when the last of them is released. Duplicate
//! note-ons and stray note-offs are ignored.
//!
//! A single mutex serializes every event, including the synthesis and
//! injection of the resulting key actions, so actions for a character reach
//! the sink in the order the transitions were decided.

use crate::keymap::named_key_name;
use crate::mapping::MappingSelector;
use crate::sink::InputSink;
use crate::synth::KeySynthesizer;
use crate::types::{LogicalKeyEvent, NoteEvent, NoteKind, Transition};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Copy of the tracker state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackerSnapshot {
    pub active_notes: BTreeSet<u8>,
    pub ref_counts: BTreeMap<char, u32>,
}

struct State {
    active_notes: HashSet<u8>,
    ref_counts: HashMap<char, u32>,
    synth: Box<dyn KeySynthesizer>,
    sink: Box<dyn InputSink>,
}

impl State {
    fn press(&mut self, note: u8, ch: char) -> Option<LogicalKeyEvent> {
        if !self.active_notes.insert(note) {
            trace!("Note {} already held", note);
            return None;
        }
        let count = self.ref_counts.entry(ch).or_insert(0);
        *count += 1;
        if *count == 1 {
            Some(LogicalKeyEvent::down(ch))
        } else {
            debug!("Note {} joins {:?} (held by {})", note, ch, count);
            None
        }
    }

    fn release(&mut self, note: u8, ch: char) -> Option<LogicalKeyEvent> {
        if !self.active_notes.remove(&note) {
            trace!("Note {} was not held", note);
            return None;
        }
        let count = self.ref_counts.get_mut(&ch)?;
        *count -= 1;
        if *count == 0 {
            self.ref_counts.remove(&ch);
            Some(LogicalKeyEvent::up(ch))
        } else {
            debug!("Note {} leaves {:?} (still held by {})", note, ch, count);
            None
        }
    }

    fn emit(&mut self, ev: LogicalKeyEvent) {
        let actions = self.synth.synthesize(ev.ch, ev.edge);
        debug!(
            "{} {:?} -> {} action(s)",
            key_label(ev.ch),
            ev.edge,
            actions.len()
        );
        // Keep going after a failure so a modifier is never left down.
        for action in &actions {
            if let Err(e) = self.sink.inject(action) {
                warn!(
                    "Failed to inject {} {:?} for {} {:?}: {}",
                    action.kind(),
                    action,
                    key_label(ev.ch),
                    ev.edge,
                    e
                );
            }
        }
    }
}

/// `<left>` for named keys, the quoted character otherwise.
fn key_label(ch: char) -> String {
    match named_key_name(ch) {
        Some(name) => format!("<{}>", name),
        None => format!("{:?}", ch),
    }
}

/// Concurrency-safe note to key translator.
pub struct NoteTracker {
    mappings: Arc<MappingSelector>,
    state: Mutex<State>,
}

impl NoteTracker {
    pub fn new(
        mappings: Arc<MappingSelector>,
        synth: Box<dyn KeySynthesizer>,
        sink: Box<dyn InputSink>,
    ) -> Self {
        Self {
            mappings,
            state: Mutex::new(State {
                active_notes: HashSet::new(),
                ref_counts: HashMap::new(),
                synth,
                sink,
            }),
        }
    }

    pub fn mappings(&self) -> &Arc<MappingSelector> {
        &self.mappings
    }

    /// Entry point for the MIDI adapter. Returns the logical transition that
    /// was emitted, if any.
    pub fn on_note(&self, note: u8, velocity: u8, kind: NoteKind) -> Option<LogicalKeyEvent> {
        self.handle(NoteEvent {
            note,
            velocity,
            kind,
        })
    }

    pub fn handle(&self, event: NoteEvent) -> Option<LogicalKeyEvent> {
        let ch = self.mappings.lookup(event.note)?;

        let mut state = self.state.lock();
        let emitted = match event.transition() {
            Transition::Press => state.press(event.note, ch),
            Transition::Release => state.release(event.note, ch),
        }?;
        state.emit(emitted);
        Some(emitted)
    }

    /// Release every held character and forget all held notes.
    /// Call after MIDI delivery has stopped.
    pub fn release_all(&self) -> Vec<LogicalKeyEvent> {
        let mut state = self.state.lock();
        state.active_notes.clear();
        let mut held: Vec<char> = state.ref_counts.drain().map(|(c, _)| c).collect();
        held.sort_unstable();
        let released: Vec<LogicalKeyEvent> = held.into_iter().map(LogicalKeyEvent::up).collect();
        for &ev in &released {
            state.emit(ev);
        }
        if !released.is_empty() {
            debug!("Released {} held key(s)", released.len());
        }
        released
    }

    pub fn snapshot(&self) -> TrackerSnapshot {
        let state = self.state.lock();
        TrackerSnapshot {
            active_notes: state.active_notes.iter().copied().collect(),
            ref_counts: state.ref_counts.iter().map(|(&c, &n)| (c, n)).collect(),
        }
    }

    pub fn ref_count(&self, ch: char) -> u32 {
        self.state.lock().ref_counts.get(&ch).copied().unwrap_or(0)
    }

    pub fn is_active(&self, note: u8) -> bool {
        self.state.lock().active_notes.contains(&note)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::UsLayout;
    use crate::mapping::MappingTable;
    use crate::sink::ChannelSink;
    use crate::synth::VirtualKeySynth;
    use crate::error::InjectError;
    use crate::keymap::named_key_char;
    use crate::types::{InputEvent, KeyEdge};
    use crate::us_map::VK_SHIFT;
    use crossbeam_channel::Receiver;

    /// Rejects the first action it sees and records every attempt.
    struct FlakySink {
        attempted: Arc<Mutex<Vec<InputEvent>>>,
        fail_next: bool,
    }

    impl InputSink for FlakySink {
        fn inject(&mut self, event: &InputEvent) -> Result<(), InjectError> {
            self.attempted.lock().push(*event);
            if std::mem::take(&mut self.fail_next) {
                Err(InjectError::Rejected("busy".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn tracker(entries: &[(u8, char)]) -> (NoteTracker, Receiver<InputEvent>) {
        let table: MappingTable = entries.iter().copied().collect();
        let (sink, rx) = ChannelSink::new();
        let tracker = NoteTracker::new(
            Arc::new(MappingSelector::new(table)),
            Box::new(VirtualKeySynth::new(Arc::new(UsLayout))),
            Box::new(sink),
        );
        (tracker, rx)
    }

    fn drain(rx: &Receiver<InputEvent>) -> Vec<InputEvent> {
        rx.try_iter().collect()
    }

    #[test]
    fn shared_character_goes_down_once_and_up_once() {
        let (t, rx) = tracker(&[(52, 'v'), (53, 'v')]);

        assert_eq!(t.on_note(52, 100, NoteKind::On), Some(LogicalKeyEvent::down('v')));
        assert_eq!(t.on_note(53, 100, NoteKind::On), None);
        assert_eq!(t.ref_count('v'), 2);
        assert_eq!(t.on_note(52, 0, NoteKind::Off), None);
        assert_eq!(t.ref_count('v'), 1);
        assert_eq!(t.on_note(53, 0, NoteKind::Off), Some(LogicalKeyEvent::up('v')));
        assert_eq!(t.ref_count('v'), 0);

        assert_eq!(
            drain(&rx),
            vec![
                InputEvent::VirtualKey(0x56, KeyEdge::Down),
                InputEvent::VirtualKey(0x56, KeyEdge::Up),
            ]
        );
        assert_eq!(t.snapshot(), TrackerSnapshot::default());
    }

    #[test]
    fn shifted_character_wraps_in_shift() {
        let (t, rx) = tracker(&[(60, 'A')]);

        t.on_note(60, 90, NoteKind::On);
        assert_eq!(
            drain(&rx),
            vec![
                InputEvent::VirtualKey(VK_SHIFT, KeyEdge::Down),
                InputEvent::VirtualKey(0x41, KeyEdge::Down),
            ]
        );

        t.on_note(60, 0, NoteKind::Off);
        assert_eq!(
            drain(&rx),
            vec![
                InputEvent::VirtualKey(0x41, KeyEdge::Up),
                InputEvent::VirtualKey(VK_SHIFT, KeyEdge::Up),
            ]
        );
    }

    #[test]
    fn duplicate_transitions_are_ignored() {
        let (t, rx) = tracker(&[(60, 'a')]);

        assert!(t.on_note(60, 0, NoteKind::Off).is_none());
        assert!(t.on_note(60, 100, NoteKind::On).is_some());
        let before = t.snapshot();
        assert!(t.on_note(60, 100, NoteKind::On).is_none());
        assert_eq!(t.snapshot(), before);

        assert!(t.on_note(60, 0, NoteKind::Off).is_some());
        let before = t.snapshot();
        assert!(t.on_note(60, 0, NoteKind::Off).is_none());
        assert_eq!(t.snapshot(), before);

        assert_eq!(drain(&rx).len(), 2);
    }

    #[test]
    fn zero_velocity_note_on_releases() {
        let (t, _rx) = tracker(&[(60, 'a')]);
        t.on_note(60, 100, NoteKind::On);
        assert_eq!(t.on_note(60, 0, NoteKind::On), Some(LogicalKeyEvent::up('a')));
        assert!(!t.is_active(60));
    }

    #[test]
    fn unmapped_notes_and_empty_tables_do_nothing() {
        let (t, rx) = tracker(&[(60, 'a')]);
        assert!(t.on_note(61, 100, NoteKind::On).is_none());
        assert!(!t.is_active(61));

        let (empty, empty_rx) = tracker(&[]);
        for note in [0, 60, 127] {
            assert!(empty.on_note(note, 100, NoteKind::On).is_none());
            assert!(empty.on_note(note, 0, NoteKind::Off).is_none());
        }
        assert_eq!(empty.snapshot(), TrackerSnapshot::default());
        assert!(drain(&empty_rx).is_empty());
        assert!(drain(&rx).is_empty());
    }

    #[test]
    fn release_all_lifts_held_keys() {
        let (t, rx) = tracker(&[(60, 'a'), (61, 'b'), (62, 'a')]);
        t.on_note(60, 100, NoteKind::On);
        t.on_note(61, 100, NoteKind::On);
        t.on_note(62, 100, NoteKind::On);
        drain(&rx);

        let released = t.release_all();
        assert_eq!(released, vec![LogicalKeyEvent::up('a'), LogicalKeyEvent::up('b')]);
        assert_eq!(t.snapshot(), TrackerSnapshot::default());
        assert_eq!(
            drain(&rx),
            vec![
                InputEvent::VirtualKey(0x41, KeyEdge::Up),
                InputEvent::VirtualKey(0x42, KeyEdge::Up),
            ]
        );
        assert!(t.release_all().is_empty());
    }

    #[test]
    fn sink_failure_keeps_the_transition() {
        let (t, rx) = tracker(&[(60, 'A')]);
        drop(rx);
        assert_eq!(t.on_note(60, 100, NoteKind::On), Some(LogicalKeyEvent::down('A')));
        assert!(t.is_active(60));
        assert_eq!(t.ref_count('A'), 1);
    }

    #[test]
    fn failed_action_does_not_stop_the_sequence() {
        let attempted = Arc::new(Mutex::new(Vec::new()));
        let t = NoteTracker::new(
            Arc::new(MappingSelector::new([(60, 'A')].into_iter().collect())),
            Box::new(VirtualKeySynth::new(Arc::new(UsLayout))),
            Box::new(FlakySink {
                attempted: Arc::clone(&attempted),
                fail_next: true,
            }),
        );

        assert_eq!(t.on_note(60, 100, NoteKind::On), Some(LogicalKeyEvent::down('A')));
        assert_eq!(
            std::mem::take(&mut *attempted.lock()),
            vec![
                InputEvent::VirtualKey(VK_SHIFT, KeyEdge::Down),
                InputEvent::VirtualKey(0x41, KeyEdge::Down),
            ]
        );

        assert_eq!(t.on_note(60, 0, NoteKind::Off), Some(LogicalKeyEvent::up('A')));
        assert_eq!(
            *attempted.lock(),
            vec![
                InputEvent::VirtualKey(0x41, KeyEdge::Up),
                InputEvent::VirtualKey(VK_SHIFT, KeyEdge::Up),
            ]
        );
        assert_eq!(t.snapshot(), TrackerSnapshot::default());
    }

    #[test]
    fn swap_while_held_leaves_old_character_for_release_all() {
        let (t, rx) = tracker(&[(60, 'a')]);
        t.on_note(60, 100, NoteKind::On);
        t.mappings().select([(60, 'b')].into_iter().collect());

        // Released against the new table: 'b' was never down.
        assert_eq!(t.on_note(60, 0, NoteKind::Off), None);
        assert!(!t.is_active(60));
        assert_eq!(t.ref_count('a'), 1);

        assert_eq!(t.release_all(), vec![LogicalKeyEvent::up('a')]);
        assert_eq!(
            drain(&rx),
            vec![
                InputEvent::VirtualKey(0x41, KeyEdge::Down),
                InputEvent::VirtualKey(0x41, KeyEdge::Up),
            ]
        );
    }

    #[test]
    fn named_keys_are_labelled_by_name() {
        let left = named_key_char("left").expect("left");
        assert_eq!(key_label(left), "<left>");
        assert_eq!(key_label('a'), "'a'");
    }

    #[test]
    fn table_swap_applies_to_later_events() {
        let (t, _rx) = tracker(&[(60, 'a')]);
        t.mappings().select([(60, 'b')].into_iter().collect());
        assert_eq!(t.on_note(60, 100, NoteKind::On), Some(LogicalKeyEvent::down('b')));
    }
}
