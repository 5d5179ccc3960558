use criterion::{black_box, criterion_group, criterion_main, Criterion};
use notekeys_core::error::InjectError;
use notekeys_core::sink::InputSink;
use notekeys_core::synth::{build_synthesizer, SynthMode};
use notekeys_core::{InputEvent, MappingSelector, MappingTable, NoteKind, NoteTracker, UsLayout};
use std::sync::Arc;

/// Discards everything, so the benchmark measures the tracker alone.
struct NullSink;

impl InputSink for NullSink {
    fn inject(&mut self, event: &InputEvent) -> Result<(), InjectError> {
        black_box(event);
        Ok(())
    }
}

fn make_tracker(mode: SynthMode) -> NoteTracker {
    let mut table: Vec<(u8, char)> = MappingTable::default_piano().iter().collect();
    // Two notes sharing one character.
    table.push((30, 'v'));
    NoteTracker::new(
        Arc::new(MappingSelector::new(table.into_iter().collect())),
        build_synthesizer(mode, Arc::new(UsLayout)),
        Box::new(NullSink),
    )
}

fn bench_single_note(c: &mut Criterion) {
    let tracker = make_tracker(SynthMode::VirtualKey);
    c.bench_function("tracker/single_note_vk", |b| {
        b.iter(|| {
            black_box(tracker.on_note(60, 100, NoteKind::On));
            black_box(tracker.on_note(60, 0, NoteKind::Off));
        });
    });
}

fn bench_shifted_note_scancode(c: &mut Criterion) {
    let tracker = make_tracker(SynthMode::Scancode);
    c.bench_function("tracker/shifted_note_scancode", |b| {
        b.iter(|| {
            black_box(tracker.on_note(61, 100, NoteKind::On)); // 'T'
            black_box(tracker.on_note(61, 0, NoteKind::Off));
        });
    });
}

fn bench_shared_character(c: &mut Criterion) {
    let tracker = make_tracker(SynthMode::VirtualKey);
    c.bench_function("tracker/overlapping_shared_character", |b| {
        b.iter(|| {
            black_box(tracker.on_note(91, 100, NoteKind::On)); // G6 -> v
            black_box(tracker.on_note(30, 100, NoteKind::On)); // also v
            black_box(tracker.on_note(91, 0, NoteKind::Off));
            black_box(tracker.on_note(30, 0, NoteKind::Off));
        });
    });
}

fn bench_unmapped_note(c: &mut Criterion) {
    let tracker = make_tracker(SynthMode::VirtualKey);
    c.bench_function("tracker/unmapped_note", |b| {
        b.iter(|| {
            black_box(tracker.on_note(10, 100, NoteKind::On));
            black_box(tracker.on_note(10, 0, NoteKind::Off));
        });
    });
}

criterion_group!(
    benches,
    bench_single_note,
    bench_shifted_note_scancode,
    bench_shared_character,
    bench_unmapped_note
);
criterion_main!(benches);
