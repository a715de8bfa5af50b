use crate::error::{Result, SubreviewError};
use crate::sync;

#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleLine {
    pub(crate) id: String,
    pub(crate) text: String,
    pub(crate) start_time: f64,
}

impl SubtitleLine {
    pub fn new(id: impl Into<String>, text: impl Into<String>, start_time: f64) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            start_time,
        }
    }
}

/// An immutable, start-time ordered list of subtitle lines together with the
/// length of the media they belong to.
#[derive(Debug, Clone)]
pub struct Transcript {
    pub(crate) lines: Vec<SubtitleLine>,
    pub(crate) duration: f64,
}

impl Transcript {
    /// Lines must be strictly increasing by start time, and the media must
    /// run past the start of the last line.
    pub fn new(lines: Vec<SubtitleLine>, duration: f64) -> Result<Self> {
        if lines.is_empty() {
            return Err(SubreviewError::InvalidInput(
                "a transcript needs at least one subtitle line".to_string(),
            ));
        }
        if duration.is_nan() || duration <= 0.0 {
            return Err(SubreviewError::InvalidInput(format!(
                "media duration must be positive, got {}",
                duration
            )));
        }
        if let Some(pair) = lines
            .windows(2)
            .find(|pair| pair[0].start_time >= pair[1].start_time)
        {
            return Err(SubreviewError::InvalidInput(format!(
                "subtitle '{}' does not start after subtitle '{}'",
                pair[1].id, pair[0].id
            )));
        }
        let last = &lines[lines.len() - 1];
        if duration <= last.start_time {
            return Err(SubreviewError::InvalidInput(format!(
                "media duration {} ends before subtitle '{}' at {}",
                duration, last.id, last.start_time
            )));
        }
        Ok(Self { lines, duration })
    }

    pub fn lines(&self) -> &[SubtitleLine] {
        &self.lines
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn with_duration(self, duration: f64) -> Result<Self> {
        Self::new(self.lines, duration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Note,
    Recording,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineMarker {
    pub(crate) position: f64,
    pub(crate) kind: MarkerKind,
}

impl TimelineMarker {
    pub fn new(position: f64, kind: MarkerKind) -> Self {
        Self { position, kind }
    }

    pub fn at(time: f64, duration: f64, kind: MarkerKind) -> Result<Self> {
        Ok(Self {
            position: sync::marker_position(time, duration)?,
            kind,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackClock {
    pub(crate) current_time: f64,
    pub(crate) duration: f64,
}

impl PlaybackClock {
    pub fn new(duration: f64) -> Self {
        Self {
            current_time: 0.0,
            duration,
        }
    }

    /// Moves the clock, keeping it within `[0, duration]`.
    pub fn set(&mut self, time: f64) -> f64 {
        self.current_time = time.max(0.0).min(self.duration);
        self.current_time
    }

    pub fn progress(&self) -> Result<f64> {
        sync::marker_position(self.current_time, self.duration)
    }
}
