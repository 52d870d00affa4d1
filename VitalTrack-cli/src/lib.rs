// VitalTrack CLI
//
// Line-oriented terminal surface over the journal services. The binary in
// src/bin/main.rs wires storage and the undo controller together and feeds
// stdin lines through the command loop defined here.

pub mod repl;
