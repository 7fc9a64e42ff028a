//! Conversion of osu!mania beatmaps (`.osu`) into StepMania charts (`.sm`), and reconstruction
//! of a timed note stream from `.sm` text for difficulty rating.
//!
//! ```text
//! .osu text ==[osu::parse_osu]==> osu::Chart ==[convert::convert]==> convert::ConvertOutput
//!     ==[sm::write_sm]==> .sm text ==[sm::parse_note_stream]==> sm::NoteEvent stream
//!     ==[calc::Calculator]==> calc::Skillsets
//! ```
//!
//! In detail, our policies are:
//!
//! - Work on `&str` internally. Files that are not valid UTF-8 are read as Windows-1252 instead of
//!   being rejected.
//! - Never abort on a bad line or row: skip it and report it as a warning next to the output.
//! - Fail only on chart-level problems, such as a non-mania chart or an unreadable file.
//! - Keep the difficulty engine outside: it is plugged in through [`calc::DifficultyEngine`].

pub mod calc;
pub mod convert;
pub mod diagnostics;
pub mod osu;
pub mod pipeline;
pub mod prelude;
pub mod sm;
pub mod span;
pub mod timeline;
