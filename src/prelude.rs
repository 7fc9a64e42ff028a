//! Prelude module for the crate.
//!
//! You can use `use osu2sm_rs::prelude::*;` to import the commonly used types at once.

#[cfg(feature = "diagnostics")]
pub use crate::diagnostics::{ChartSource, ToAriadne, emit_osu_warnings};

pub use crate::{
    calc::{
        CalcError, Calculator, DifficultyEngine, MsdForAllRates, MusicRate, NoteInfo, ScoreGoal,
        Skillsets,
    },
    convert::{
        ConvertOptions, ConvertOutput, ConvertWarning, GameType, Grid, HitEvent, NoteCell,
        convert,
    },
    osu::{
        Chart, GameplayMode, HitObject, Metadata, OsuOutput, OsuWarning, OsuWarningWithRange,
        Section, TimingPoint, UnsupportedMode, parse_mania, parse_osu,
    },
    pipeline::{
        ConversionSummary, ConvertError, Converted, analyze_sm_file, convert_file,
        convert_osu_text, score_sm_text,
    },
    sm::{
        NoteEvent, NoteStreamConfig, NoteStreamOutput, NoteStreamStats, NoteStreamWarning,
        parse_note_stream, to_sm_string, write_sm,
    },
    span::{SourceLine, Spanned},
    timeline::{Bpm, TempoSegment, Timeline},
};
