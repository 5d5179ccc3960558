//! MIDI input adapter: feeds note messages from a midir port into the tracker.

use anyhow::{anyhow, bail, Result};
use midir::{MidiInput, MidiInputConnection, MidiInputPort};
use notekeys_core::midi::decode_note;
use notekeys_core::NoteTracker;
use std::sync::Arc;
use tracing::{info, trace};

const CLIENT_NAME: &str = "notekeys";

pub fn list_ports() -> Result<Vec<String>> {
    let midi_in = MidiInput::new(CLIENT_NAME)?;
    Ok(midi_in
        .ports()
        .iter()
        .map(|p| {
            midi_in
                .port_name(p)
                .unwrap_or_else(|_| "<unknown>".to_string())
        })
        .collect())
}

/// Port by index or case-insensitive name fragment; first port if `pattern`
/// is `None`.
fn find_port(midi_in: &MidiInput, pattern: Option<&str>) -> Result<(MidiInputPort, String)> {
    let ports: Vec<(MidiInputPort, String)> = midi_in
        .ports()
        .into_iter()
        .filter_map(|p| midi_in.port_name(&p).ok().map(|name| (p, name)))
        .collect();

    let Some(pattern) = pattern else {
        return match ports.into_iter().next() {
            Some(found) => Ok(found),
            None => bail!("No MIDI input ports found"),
        };
    };

    if let Ok(index) = pattern.parse::<usize>() {
        return match ports.into_iter().nth(index) {
            Some(found) => Ok(found),
            None => bail!("No MIDI input port at index {}", index),
        };
    }

    let needle = pattern.to_lowercase();
    match ports
        .into_iter()
        .find(|(_, name)| name.to_lowercase().contains(&needle))
    {
        Some(found) => Ok(found),
        None => bail!("No MIDI input port matching '{}'", pattern),
    }
}

/// Connect and start delivering notes. Delivery stops when the returned
/// connection is closed or dropped.
pub fn connect(pattern: Option<&str>, tracker: Arc<NoteTracker>) -> Result<MidiInputConnection<()>> {
    let mut midi_in = MidiInput::new(CLIENT_NAME)?;
    midi_in.ignore(midir::Ignore::All);
    let (port, name) = find_port(&midi_in, pattern)?;

    info!("Connecting to MIDI input: {}", name);
    let conn = midi_in.connect(
        &port,
        "notekeys-in",
        move |_stamp, data, _| {
            if let Some(ev) = decode_note(data) {
                trace!("MIDI {:?}", ev);
                tracker.handle(ev);
            }
        },
        (),
    )
    .map_err(|e| anyhow!("{}", e))?;
    Ok(conn)
}
