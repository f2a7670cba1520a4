/// Split table compilation.
///
/// User configuration carries an ordered list of split definitions, each
/// mapping a note range or an explicit note set to a destination channel.
/// Compilation flattens the list into a note-indexed lookup table.
/// Definitions are validated one by one; a malformed entry is discarded
/// with a diagnostic and never poisons the rest of the list.

use serde::Serialize;
use serde_json::{json, Value};

use crate::monitor::{Diagnostic, Monitor};
use crate::{CHANNEL_MAX, CHANNEL_MIN, NOTE_COUNT};

/// A validated split definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitDefinition {
    /// Reroute every note in `midi_from..=midi_to` to `channel`.
    Range { midi_from: u8, midi_to: u8, channel: u8 },
    /// Reroute each listed note to `channel`.
    Enumeration { midi: Vec<u8>, channel: u8 },
}

impl SplitDefinition {
    /// Validate one raw definition. Returns a human-readable reason on
    /// rejection; the caller decides what to do with it.
    pub fn parse(value: &Value) -> Result<Self, String> {
        let obj = value
            .as_object()
            .ok_or_else(|| "definition is not a table".to_string())?;

        let tag = obj
            .get("type")
            .ok_or_else(|| "missing `type` tag".to_string())?
            .as_str()
            .ok_or_else(|| "`type` tag is not a string".to_string())?;

        match tag {
            "range" => {
                let midi_from = note_field(obj, "midi_from")?;
                let midi_to = note_field(obj, "midi_to")?;
                let channel = channel_field(obj)?;
                if midi_from > midi_to {
                    return Err(format!(
                        "`midi_from` {} exceeds `midi_to` {}",
                        midi_from, midi_to
                    ));
                }
                Ok(Self::Range {
                    midi_from,
                    midi_to,
                    channel,
                })
            }
            "enumeration" => {
                let notes = obj
                    .get("midi")
                    .ok_or_else(|| "missing `midi` note list".to_string())?
                    .as_array()
                    .ok_or_else(|| "`midi` is not an array".to_string())?;
                let mut midi = Vec::with_capacity(notes.len());
                for note in notes {
                    let n = note
                        .as_i64()
                        .ok_or_else(|| format!("note {} is not an integer", note))?;
                    midi.push(check_note(n, "midi")?);
                }
                let channel = channel_field(obj)?;
                Ok(Self::Enumeration { midi, channel })
            }
            other => Err(format!("unknown split type `{}`", other)),
        }
    }

    /// Destination channel of this definition (1-16).
    pub fn channel(&self) -> u8 {
        match self {
            Self::Range { channel, .. } | Self::Enumeration { channel, .. } => *channel,
        }
    }

    fn apply(&self, map: &mut [Option<u8>; NOTE_COUNT]) {
        match self {
            Self::Range {
                midi_from,
                midi_to,
                channel,
            } => {
                for note in *midi_from..=*midi_to {
                    map[note as usize] = Some(*channel);
                }
            }
            Self::Enumeration { midi, channel } => {
                for note in midi {
                    map[*note as usize] = Some(*channel);
                }
            }
        }
    }
}

fn int_field(obj: &serde_json::Map<String, Value>, key: &str) -> Result<i64, String> {
    obj.get(key)
        .ok_or_else(|| format!("missing `{}`", key))?
        .as_i64()
        .ok_or_else(|| format!("`{}` is not an integer", key))
}

fn check_note(value: i64, key: &str) -> Result<u8, String> {
    if (0..=127).contains(&value) {
        Ok(value as u8)
    } else {
        Err(format!("`{}` value {} outside 0-127", key, value))
    }
}

fn note_field(obj: &serde_json::Map<String, Value>, key: &str) -> Result<u8, String> {
    check_note(int_field(obj, key)?, key)
}

fn channel_field(obj: &serde_json::Map<String, Value>) -> Result<u8, String> {
    let channel = int_field(obj, "channel")?;
    if (CHANNEL_MIN as i64..=CHANNEL_MAX as i64).contains(&channel) {
        Ok(channel as u8)
    } else {
        Err(format!("`channel` value {} outside 1-16", channel))
    }
}

/// Flat note-to-channel lookup table, immutable after compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitTable {
    map: [Option<u8>; NOTE_COUNT],
}

impl SplitTable {
    /// A table that reroutes nothing.
    pub const fn empty() -> Self {
        Self {
            map: [None; NOTE_COUNT],
        }
    }

    /// Compile an ordered list of raw split definitions.
    ///
    /// Definitions are applied in list order; a later definition overwrites
    /// earlier mappings for the same notes. Malformed entries are discarded
    /// with a diagnostic. Never fails: in the worst case the result is an
    /// empty table and the stream passes through unchanged.
    pub fn compile<D: Serialize>(definitions: &[D], monitor: &dyn Monitor) -> Self {
        let raw: Vec<Value> = definitions
            .iter()
            .map(|d| serde_json::to_value(d).unwrap_or(Value::Null))
            .collect();
        Self::compile_entries(&raw, monitor)
    }

    /// Compile from a raw configuration value that should be a list of
    /// definitions. A missing or non-list value degrades to an empty table
    /// with a diagnostic, never to a failure.
    pub fn compile_value(value: &Value, monitor: &dyn Monitor) -> Self {
        match value {
            Value::Array(entries) => Self::compile_entries(entries, monitor),
            Value::Null => {
                monitor.emit(Diagnostic::debug(
                    "no split table configured, forwarding all messages unchanged",
                ));
                Self::empty()
            }
            other => {
                monitor.emit(
                    Diagnostic::warn("split table is not a list, ignoring it")
                        .with_detail(json!({ "value": other })),
                );
                Self::empty()
            }
        }
    }

    fn compile_entries(entries: &[Value], monitor: &dyn Monitor) -> Self {
        if entries.is_empty() {
            monitor.emit(Diagnostic::debug(
                "split table is empty, forwarding all messages unchanged",
            ));
            return Self::empty();
        }

        let mut map = [None; NOTE_COUNT];
        for (index, entry) in entries.iter().enumerate() {
            match SplitDefinition::parse(entry) {
                Ok(definition) => {
                    definition.apply(&mut map);
                    monitor.emit(
                        Diagnostic::debug("split definition applied").with_detail(json!({
                            "index": index,
                            "channel": definition.channel(),
                        })),
                    );
                }
                Err(reason) => {
                    monitor.emit(
                        Diagnostic::warn("discarding malformed split definition")
                            .with_detail(json!({
                                "index": index,
                                "reason": reason,
                                "definition": entry,
                            })),
                    );
                }
            }
        }
        Self { map }
    }

    /// Destination channel (1-16) for a note, if the note is mapped.
    pub fn channel_for(&self, note: u8) -> Option<u8> {
        self.map.get(note as usize).copied().flatten()
    }

    /// Whether the table maps no notes at all.
    pub fn is_empty(&self) -> bool {
        self.map.iter().all(Option::is_none)
    }

    /// Number of notes with a mapping.
    pub fn mapped_notes(&self) -> usize {
        self.map.iter().filter(|c| c.is_some()).count()
    }
}

impl Default for SplitTable {
    fn default() -> Self {
        Self::empty()
    }
}
