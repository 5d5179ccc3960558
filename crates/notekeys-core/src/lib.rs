pub mod engine;
pub mod error;
pub mod keymap;
pub mod mapping;
pub mod midi;
#[cfg(windows)]
pub mod os_input;
pub mod parser;
pub mod sink;
pub mod synth;
pub mod types;
pub mod us_map;

pub use engine::{NoteTracker, TrackerSnapshot};
pub use error::{InjectError, MappingError};
pub use keymap::{KeyLookup, UsLayout};
pub use mapping::{MappingSelector, MappingSets, MappingTable};
pub use sink::{ChannelSink, InputSink};
pub use synth::{build_synthesizer, KeySynthesizer, SynthMode};
pub use types::{InputEvent, KeyEdge, LogicalKeyEvent, NoteEvent, NoteKind, ScKey};
