//! StepMania (`.sm`) support: writing converted charts and reading note streams back.
//!
//! - [`emit`] renders the header directives and the `#NOTES` block of a [`crate::convert::ConvertOutput`].
//! - [`directive`] scans `#KEY:value;` directives.
//! - [`notes`] rebuilds a timed [`NoteEvent`] stream from `.sm` text, for scoring.

pub mod directive;
pub mod emit;
pub mod notes;

pub use self::{
    directive::{Directive, Directives},
    emit::{SmHeader, to_sm_string, write_notes, write_sm},
    notes::{
        NoteEvent, NoteStreamConfig, NoteStreamOutput, NoteStreamStats, NoteStreamWarning,
        parse_note_stream,
    },
};
