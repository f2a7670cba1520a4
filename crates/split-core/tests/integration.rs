//! Integration tests for the split-core crate.
//!
//! These tests exercise the public API across module boundaries: compiling
//! split tables from loosely-typed configuration, routing realistic MIDI
//! byte streams, and admission decisions over discovered port names.

use std::sync::Mutex;

use serde_json::{json, Value};

use split_core::admission::{AdmissionPolicy, Verdict};
use split_core::monitor::{Diagnostic, Monitor, NullMonitor, Severity};
use split_core::split_table::{SplitDefinition, SplitTable};
use split_core::transform::{classify, route, MessageKind};
use split_core::wildcard;

/// Monitor that records every emitted event for inspection.
#[derive(Default)]
struct CaptureMonitor {
    events: Mutex<Vec<Diagnostic>>,
}

impl Monitor for CaptureMonitor {
    fn emit(&self, event: Diagnostic) {
        self.events.lock().unwrap().push(event);
    }
}

impl CaptureMonitor {
    fn warnings(&self) -> Vec<Diagnostic> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.severity == Severity::Warn)
            .cloned()
            .collect()
    }
}

// ---------------------------------------------------------------------------
// 1. Split table compilation
// ---------------------------------------------------------------------------

#[test]
fn range_definition_covers_exactly_its_interval() {
    let defs = vec![json!({ "type": "range", "midi_from": 48, "midi_to": 59, "channel": 2 })];
    let table = SplitTable::compile(&defs, &NullMonitor);

    for note in 48..=59u8 {
        assert_eq!(table.channel_for(note), Some(2), "note {} should map", note);
    }
    for note in (0..48u8).chain(60..=127) {
        assert_eq!(table.channel_for(note), None, "note {} should not map", note);
    }
}

#[test]
fn overwrite_law_last_definition_wins() {
    let d1 = json!({ "type": "range", "midi_from": 50, "midi_to": 70, "channel": 1 });
    let d2 = json!({ "type": "enumeration", "midi": [60], "channel": 9 });
    let table = SplitTable::compile(&[d1, d2], &NullMonitor);

    assert_eq!(table.channel_for(60), Some(9));
    assert_eq!(table.channel_for(59), Some(1));
    assert_eq!(table.channel_for(61), Some(1));
}

#[test]
fn malformed_entries_are_reported_with_index_and_reason() {
    let monitor = CaptureMonitor::default();
    let defs = vec![
        json!({ "type": "range", "midi_from": 10, "midi_to": 5, "channel": 1 }),
        json!({ "type": "range", "midi_from": 20, "midi_to": 30, "channel": 4 }),
        json!(42),
    ];
    let table = SplitTable::compile(&defs, &monitor);

    // The good entry in the middle still compiled.
    assert_eq!(table.channel_for(25), Some(4));
    assert_eq!(table.mapped_notes(), 11);

    let warnings = monitor.warnings();
    assert_eq!(warnings.len(), 2);

    let first = warnings[0].detail.as_ref().expect("detail attached");
    assert_eq!(first["index"], json!(0));
    assert!(first["reason"].as_str().unwrap().contains("midi_from"));

    let second = warnings[1].detail.as_ref().expect("detail attached");
    assert_eq!(second["index"], json!(2));
}

#[test]
fn compile_never_fails_on_garbage() {
    let garbage = vec![
        Value::Null,
        json!("not a table"),
        json!([1, 2, 3]),
        json!({ "type": "range" }),
        json!({ "type": "enumeration", "midi": [60.5], "channel": 1 }),
        json!({ "channel": 5 }),
    ];
    let table = SplitTable::compile(&garbage, &NullMonitor);
    assert!(table.is_empty());

    let table = SplitTable::compile_value(&json!({ "oops": true }), &NullMonitor);
    assert!(table.is_empty());
}

#[test]
fn parse_accepts_both_variants() {
    let range = SplitDefinition::parse(&json!({
        "type": "range", "midi_from": 0, "midi_to": 127, "channel": 16
    }))
    .unwrap();
    assert_eq!(range.channel(), 16);

    let enumeration = SplitDefinition::parse(&json!({
        "type": "enumeration", "midi": [0, 64, 127], "channel": 1
    }))
    .unwrap();
    assert_eq!(enumeration.channel(), 1);
}

// ---------------------------------------------------------------------------
// 2. Message transformation
// ---------------------------------------------------------------------------

#[test]
fn channel_rewrite_matches_the_wire_encoding() {
    let defs = vec![json!({ "type": "range", "midi_from": 60, "midi_to": 63, "channel": 3 })];
    let table = SplitTable::compile(&defs, &NullMonitor);

    // Status 144 = 0x90 (Note On, channel 1); channel nibble becomes 3-1=2.
    assert_eq!(route(&table, [144, 61, 90]), [146, 61, 90]);
    // Unmapped note forwarded unchanged.
    assert_eq!(route(&table, [144, 70, 90]), [144, 70, 90]);
}

#[test]
fn pass_through_law_for_non_note_statuses() {
    let defs = vec![json!({ "type": "range", "midi_from": 0, "midi_to": 127, "channel": 8 })];
    let table = SplitTable::compile(&defs, &NullMonitor);

    // Statuses outside [128, 159] never change, even with a full table.
    for status in (0..=127u8).chain(160..=255u8) {
        let msg = [status, 64, 100];
        assert_eq!(route(&table, msg), msg, "status {:#04x} should pass", status);
    }
}

#[test]
fn fake_note_off_follows_the_split() {
    let defs = vec![json!({ "type": "enumeration", "midi": [36], "channel": 10 })];
    let table = SplitTable::compile(&defs, &NullMonitor);

    assert_eq!(classify(0x90, 0), MessageKind::FakeNoteOff);
    // Velocity-zero Note On is still rerouted so the release lands on the
    // same channel as the press.
    assert_eq!(route(&table, [0x90, 36, 0]), [0x99, 36, 0]);
    assert_eq!(route(&table, [0x80, 36, 64]), [0x89, 36, 64]);
}

#[test]
fn repeated_application_is_stable_for_non_splittable_messages() {
    let defs = vec![json!({ "type": "range", "midi_from": 0, "midi_to": 127, "channel": 2 })];
    let table = SplitTable::compile(&defs, &NullMonitor);

    let cc = [0xB4, 7, 100];
    assert_eq!(route(&table, route(&table, cc)), cc);
}

#[test]
fn empty_table_is_a_pure_passthrough() {
    let table = SplitTable::empty();
    for status in [0x80u8, 0x90, 0x95, 0xB0, 0xE0] {
        let msg = [status, 60, 100];
        assert_eq!(route(&table, msg), msg);
    }
}

// ---------------------------------------------------------------------------
// 3. Wildcards and admission
// ---------------------------------------------------------------------------

#[test]
fn wildcard_examples_from_real_device_names() {
    assert!(wildcard::matches("Akai*", "Akai MPK Mini"));
    assert!(wildcard::matches("Alesis V??", "Alesis V61"));
    assert!(!wildcard::matches("Alesis V??", "Alesis V6"));
    assert!(wildcard::matches("*", "Arturia KeyStep 37"));
}

#[test]
fn exclusion_precedence_of_the_virtual_output() {
    let policy = AdmissionPolicy::new("MidiSplit Out", &[]);
    assert!(!policy.should_attach("MidiSplit Out"));
    assert!(policy.should_attach("MidiSplit Out 2"));
}

#[test]
fn admission_is_an_or_over_patterns() {
    let patterns = vec!["Ctrl*".to_string(), "IAC*".to_string(), "?".to_string()];
    let policy = AdmissionPolicy::new("Out", &patterns);

    assert!(!policy.should_attach("Ctrl Surface"));
    assert!(!policy.should_attach("IAC Bus 1"));
    assert!(!policy.should_attach("X"));
    assert!(policy.should_attach("Keyboard"));
}

// ---------------------------------------------------------------------------
// 4. Compile-then-route, end to end over the core
// ---------------------------------------------------------------------------

#[test]
fn keyboard_split_scenario() {
    // Lower half of the keyboard to channel 2, C4..E4 solo zone to
    // channel 3, drum pads to channel 10.
    let defs = vec![
        json!({ "type": "range", "midi_from": 0, "midi_to": 59, "channel": 2 }),
        json!({ "type": "range", "midi_from": 60, "midi_to": 64, "channel": 3 }),
        json!({ "type": "enumeration", "midi": [36, 38, 42, 46], "channel": 10 }),
    ];
    let monitor = CaptureMonitor::default();
    let table = SplitTable::compile(&defs, &monitor);
    assert!(monitor.warnings().is_empty());

    // Pad hit: the enumeration overwrote the low range for note 36.
    assert_eq!(route(&table, [0x90, 36, 120]), [0x99, 36, 120]);
    // Bass note outside the pad set stays on channel 2.
    assert_eq!(route(&table, [0x90, 40, 80]), [0x91, 40, 80]);
    // Solo zone.
    assert_eq!(route(&table, [0x90, 62, 100]), [0x92, 62, 100]);
    // Above the mapped ranges: untouched.
    assert_eq!(route(&table, [0x90, 80, 100]), [0x90, 80, 100]);
    // Sustain pedal: never rerouted.
    assert_eq!(route(&table, [0xB0, 64, 127]), [0xB0, 64, 127]);
}
