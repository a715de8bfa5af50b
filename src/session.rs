use crate::error::{Result, SubreviewError};
use crate::keys::Action;
use crate::subtitle::{MarkerKind, PlaybackClock, SubtitleLine, TimelineMarker, Transcript};
use crate::sync;

use log::{debug, info};

pub const SKIP_SECONDS: f64 = 5.0;
const VOLUME_STEP: u8 = 10;
const DEFAULT_VOLUME: u8 = 80;

#[derive(Debug, Clone, PartialEq)]
pub struct SavedDialogue {
    pub id: String,
    pub subtitle_id: String,
    pub text: String,
    pub timestamp: String,
    pub episode: String,
    pub has_recording: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub id: String,
    pub saved_dialogue_id: String,
    pub timestamp: f64,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    pub id: String,
    pub timestamp: String,
    pub start_time: f64,
    pub end_time: f64,
    pub duration: String,
    pub dialogue: String,
    pub episode: String,
}

#[derive(Debug, Clone, Copy)]
struct ActiveRecording {
    start_time: f64,
    line_index: usize,
}

#[derive(Debug)]
pub struct Session {
    transcript: Transcript,
    episode: String,
    clock: PlaybackClock,
    current_index: usize,
    playing: bool,
    volume: u8,
    recording: Option<ActiveRecording>,
    pub subtitle_panel_open: bool,
    pub notes_drawer_open: bool,
    pub recordings_panel_open: bool,
    pub show_shortcuts: bool,
    pub fullscreen: bool,
    saved: Vec<SavedDialogue>,
    notes: Vec<Note>,
    recordings: Vec<Recording>,
    fixed_markers: Vec<TimelineMarker>,
    next_id: u64,
}

impl Session {
    /// Starts a paused session positioned at the first subtitle line.
    pub fn new(transcript: Transcript, episode: impl Into<String>) -> Self {
        let mut clock = PlaybackClock::new(transcript.duration());
        clock.set(transcript.lines()[0].start_time);
        Self {
            transcript,
            episode: episode.into(),
            clock,
            current_index: 0,
            playing: false,
            volume: DEFAULT_VOLUME,
            recording: None,
            subtitle_panel_open: true,
            notes_drawer_open: false,
            recordings_panel_open: false,
            show_shortcuts: false,
            fullscreen: false,
            saved: Vec::new(),
            notes: Vec::new(),
            recordings: Vec::new(),
            fixed_markers: Vec::new(),
            next_id: 1,
        }
    }

    pub fn with_markers(mut self, markers: Vec<TimelineMarker>) -> Self {
        self.fixed_markers = markers;
        self
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn episode(&self) -> &str {
        &self.episode
    }

    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    pub fn current_time(&self) -> f64 {
        self.clock.current_time
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_line(&self) -> &SubtitleLine {
        &self.transcript.lines()[self.current_index]
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn saved(&self) -> &[SavedDialogue] {
        &self.saved
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn recordings(&self) -> &[Recording] {
        &self.recordings
    }

    /// Moves the clock to `time` and resynchronises the current line.
    ///
    /// A time before the first line keeps the previous line selected.
    pub fn seek(&mut self, time: f64) -> usize {
        let time = self.clock.set(time);
        match sync::index_for_time(self.transcript.lines(), time) {
            Ok(index) => self.current_index = index,
            Err(err) => debug!("Keeping line {} selected: {}", self.current_index, err),
        }
        self.current_index
    }

    /// Lets `seconds` of playback pass. Does nothing while paused.
    pub fn tick(&mut self, seconds: f64) {
        if !self.playing {
            return;
        }
        self.seek(self.clock.current_time + seconds);
        if self.clock.current_time >= self.clock.duration {
            info!("Reached the end of the episode");
            self.playing = false;
        }
    }

    /// Seeks to the start of a line, as clicking it in the subtitle panel does.
    pub fn jump_to_line(&mut self, index: usize) -> Result<()> {
        let start_time = match self.transcript.lines().get(index) {
            Some(line) => line.start_time,
            None => {
                return Err(SubreviewError::InvalidInput(format!(
                    "line {} is out of range for {} subtitles",
                    index,
                    self.transcript.lines().len()
                )))
            }
        };
        self.seek(start_time);
        info!("Jumped to {}", sync::format_clock(start_time)?);
        Ok(())
    }

    pub fn apply(&mut self, action: Action) -> Result<()> {
        debug!("Applying {:?}", action);
        match action {
            Action::PlayPause => {
                self.playing = !self.playing;
                info!("{}", if self.playing { "Playing" } else { "Paused" });
            }
            Action::ReplayLine => {
                info!("Replaying line...");
                self.seek(self.current_line().start_time);
            }
            Action::SaveDialogue => {
                self.save_current()?;
            }
            Action::AddNote => {
                self.add_note(String::new())?;
            }
            Action::ToggleRecording => match self.recording.take() {
                Some(active) => self.stop_recording(active)?,
                None => self.start_recording(),
            },
            Action::ToggleSubtitlePanel => self.subtitle_panel_open = !self.subtitle_panel_open,
            Action::ToggleNotesDrawer => self.notes_drawer_open = !self.notes_drawer_open,
            Action::ToggleFullscreen => self.fullscreen = !self.fullscreen,
            Action::ShowShortcuts => self.show_shortcuts = true,
            Action::Dismiss => {
                self.show_shortcuts = false;
                self.recordings_panel_open = false;
            }
            Action::SkipBack => {
                self.seek(self.clock.current_time - SKIP_SECONDS);
            }
            Action::SkipForward => {
                self.seek(self.clock.current_time + SKIP_SECONDS);
            }
            Action::VolumeUp => self.volume = self.volume.saturating_add(VOLUME_STEP).min(100),
            Action::VolumeDown => self.volume = self.volume.saturating_sub(VOLUME_STEP),
        }
        Ok(())
    }

    /// Bookmarks the current line and returns the new saved dialogue's id.
    pub fn save_current(&mut self) -> Result<String> {
        let line = self.current_line().clone();
        let dialogue = SavedDialogue {
            id: self.next_id("saved"),
            subtitle_id: line.id,
            text: line.text,
            timestamp: sync::format_clock(line.start_time)?,
            episode: self.episode.clone(),
            has_recording: false,
        };
        let id = dialogue.id.clone();
        self.saved.insert(0, dialogue);
        info!("Dialogue saved");
        Ok(id)
    }

    /// Attaches a note to the current line, bookmarking the line first when
    /// it is not saved yet. Returns the note's id.
    pub fn add_note(&mut self, content: impl Into<String>) -> Result<String> {
        let subtitle_id = self.current_line().id.clone();
        let saved_dialogue_id = match self.saved.iter().find(|s| s.subtitle_id == subtitle_id) {
            Some(saved) => saved.id.clone(),
            None => self.save_current()?,
        };
        let note = Note {
            id: self.next_id("note"),
            saved_dialogue_id,
            timestamp: self.clock.current_time,
            content: content.into(),
        };
        let id = note.id.clone();
        info!("Adding note to: \"{}\"", self.current_line().text);
        self.notes.push(note);
        Ok(id)
    }

    /// Replaces the text of an existing note.
    pub fn edit_note(&mut self, id: &str, content: impl Into<String>) -> Result<()> {
        let note = self
            .notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| SubreviewError::UnknownId {
                kind: "note",
                id: id.to_string(),
            })?;
        note.content = content.into();
        info!("Note updated");
        Ok(())
    }

    /// Seeks to the line a saved dialogue was bookmarked from.
    pub fn jump_to_saved(&mut self, id: &str) -> Result<()> {
        let subtitle_id = self
            .saved
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.subtitle_id.clone())
            .ok_or_else(|| SubreviewError::UnknownId {
                kind: "saved dialogue",
                id: id.to_string(),
            })?;
        let index = self
            .transcript
            .lines()
            .iter()
            .position(|l| l.id == subtitle_id)
            .ok_or_else(|| SubreviewError::UnknownId {
                kind: "subtitle",
                id: subtitle_id.clone(),
            })?;
        self.jump_to_line(index)
    }

    fn start_recording(&mut self) {
        self.recording = Some(ActiveRecording {
            start_time: self.clock.current_time,
            line_index: self.current_index,
        });
        self.recordings_panel_open = true;
        info!("Recording started");
    }

    fn stop_recording(&mut self, active: ActiveRecording) -> Result<()> {
        let line = self.transcript.lines()[active.line_index].clone();
        let subtitle_id = line.id;
        let end_time = self.clock.current_time.max(active.start_time);
        let recording = Recording {
            id: self.next_id("rec"),
            timestamp: sync::format_clock(line.start_time)?,
            start_time: active.start_time,
            end_time,
            duration: sync::format_timecode(end_time - active.start_time)?,
            dialogue: line.text,
            episode: self.episode.clone(),
        };
        for saved in self.saved.iter_mut().filter(|s| s.subtitle_id == subtitle_id) {
            saved.has_recording = true;
        }
        self.recordings.insert(0, recording);
        info!("Recording saved");
        Ok(())
    }

    pub fn delete_recording(&mut self, id: &str) -> Result<Recording> {
        let pos = self
            .recordings
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| SubreviewError::UnknownId {
                kind: "recording",
                id: id.to_string(),
            })?;
        info!("Recording deleted");
        Ok(self.recordings.remove(pos))
    }

    /// Removes a saved dialogue along with its notes.
    pub fn delete_saved(&mut self, id: &str) -> Result<SavedDialogue> {
        let pos = self
            .saved
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| SubreviewError::UnknownId {
                kind: "saved dialogue",
                id: id.to_string(),
            })?;
        self.notes.retain(|n| n.saved_dialogue_id != id);
        info!("Saved dialogue deleted");
        Ok(self.saved.remove(pos))
    }

    /// Timeline markers: the fixed ones followed by one per note and one per
    /// recording.
    pub fn markers(&self) -> Result<Vec<TimelineMarker>> {
        let duration = self.clock.duration;
        let mut markers = self.fixed_markers.clone();
        for note in &self.notes {
            markers.push(TimelineMarker::at(note.timestamp, duration, MarkerKind::Note)?);
        }
        for recording in &self.recordings {
            markers.push(TimelineMarker::at(
                recording.start_time,
                duration,
                MarkerKind::Recording,
            )?);
        }
        Ok(markers)
    }

    fn next_id(&mut self, prefix: &str) -> String {
        let id = format!("{}-{}", prefix, self.next_id);
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample;

    fn session() -> Session {
        let mut session = Session::new(sample::transcript(), sample::EPISODE);
        session.seek(sample::START_TIME);
        session
    }

    #[test]
    fn starts_paused_on_first_line() {
        let session = Session::new(sample::transcript(), sample::EPISODE);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.current_time(), 2535.0);
        assert!(!session.is_playing());
        assert_eq!(session.volume(), 80);
    }

    #[test]
    fn seek_updates_current_line() {
        let mut session = session();
        assert_eq!(session.current_index(), 3);
        assert_eq!(session.seek(2549.5), 4);
    }

    #[test]
    fn seek_before_first_line_keeps_selection() {
        let mut session = session();
        assert_eq!(session.seek(100.0), 3);
        assert_eq!(session.current_time(), 100.0);
    }

    #[test]
    fn seek_is_clamped_to_duration() {
        let mut session = session();
        assert_eq!(session.seek(99_999.0), 16);
        assert_eq!(session.current_time(), sample::DURATION);
    }

    #[test]
    fn tick_only_moves_while_playing() {
        let mut session = session();
        session.tick(4.0);
        assert_eq!(session.current_time(), 2544.0);
        session.apply(Action::PlayPause).unwrap();
        session.tick(4.0);
        assert_eq!(session.current_time(), 2548.0);
        assert_eq!(session.current_index(), 4);
    }

    #[test]
    fn playback_stops_at_the_end() {
        let mut session = session();
        session.apply(Action::PlayPause).unwrap();
        session.tick(1_000.0);
        assert!(!session.is_playing());
        assert_eq!(session.current_time(), sample::DURATION);
    }

    #[test]
    fn replay_returns_to_line_start() {
        let mut session = session();
        session.seek(2546.0);
        session.apply(Action::ReplayLine).unwrap();
        assert_eq!(session.current_time(), 2544.0);
    }

    #[test]
    fn skip_moves_five_seconds() {
        let mut session = session();
        session.apply(Action::SkipForward).unwrap();
        assert_eq!(session.current_time(), 2549.0);
        session.apply(Action::SkipBack).unwrap();
        session.apply(Action::SkipBack).unwrap();
        assert_eq!(session.current_time(), 2539.0);
        assert_eq!(session.current_index(), 1);
    }

    #[test]
    fn save_prepends_current_line() {
        let mut session = session();
        session.apply(Action::SaveDialogue).unwrap();
        session.seek(2553.0);
        session.apply(Action::SaveDialogue).unwrap();
        let saved = session.saved();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0].text, "No.");
        assert_eq!(saved[1].text, "I know. I kept it burning anyway.");
        assert_eq!(saved[1].timestamp, "00:42:24");
        assert_eq!(saved[1].episode, sample::EPISODE);
        assert_ne!(saved[0].id, saved[1].id);
    }

    #[test]
    fn note_reuses_existing_bookmark() {
        let mut session = session();
        let saved_id = session.save_current().unwrap();
        let note_id = session.add_note("check the tone").unwrap();
        assert_eq!(session.saved().len(), 1);
        let note = &session.notes()[0];
        assert_eq!(note.id, note_id);
        assert_eq!(note.saved_dialogue_id, saved_id);
        assert_eq!(note.content, "check the tone");
    }

    #[test]
    fn note_bookmarks_unsaved_line() {
        let mut session = session();
        session.apply(Action::AddNote).unwrap();
        assert_eq!(session.saved().len(), 1);
        assert_eq!(session.notes()[0].saved_dialogue_id, session.saved()[0].id);
    }

    #[test]
    fn recording_round_trip() {
        let mut session = session();
        session.save_current().unwrap();
        session.apply(Action::ToggleRecording).unwrap();
        assert!(session.is_recording());
        assert!(session.recordings_panel_open);
        session.apply(Action::PlayPause).unwrap();
        session.tick(3.0);
        session.apply(Action::ToggleRecording).unwrap();
        assert!(!session.is_recording());

        let recording = &session.recordings()[0];
        assert_eq!(recording.duration, "0:03");
        assert_eq!(recording.timestamp, "00:42:24");
        assert_eq!(recording.dialogue, "I know. I kept it burning anyway.");
        assert!(session.saved()[0].has_recording);
    }

    #[test]
    fn recording_flags_only_the_recorded_line() {
        let mut session = session();
        session.save_current().unwrap();
        session.seek(2553.0);
        session.save_current().unwrap();
        session.apply(Action::ToggleRecording).unwrap();
        session.apply(Action::ToggleRecording).unwrap();

        let saved = session.saved();
        assert_eq!(saved[0].text, "No.");
        assert!(saved[0].has_recording);
        assert!(!saved[1].has_recording);
    }

    #[test]
    fn edit_note_replaces_content() {
        let mut session = session();
        let id = session.add_note("first take").unwrap();
        session.edit_note(&id, "second take").unwrap();
        assert_eq!(session.notes()[0].content, "second take");

        let err = session.edit_note("note-99", "lost").unwrap_err();
        assert!(matches!(err, SubreviewError::UnknownId { kind: "note", .. }));
    }

    #[test]
    fn jump_to_saved_seeks_to_its_line() {
        let mut session = session();
        let id = session.save_current().unwrap();
        session.seek(2581.5);
        assert_eq!(session.current_index(), 13);

        session.jump_to_saved(&id).unwrap();
        assert_eq!(session.current_index(), 3);
        assert_eq!(session.current_time(), 2544.0);
        assert!(session.jump_to_saved("saved-99").is_err());
    }

    #[test]
    fn dismiss_closes_dialogs() {
        let mut session = session();
        session.apply(Action::ShowShortcuts).unwrap();
        session.apply(Action::ToggleRecording).unwrap();
        session.apply(Action::Dismiss).unwrap();
        assert!(!session.show_shortcuts);
        assert!(!session.recordings_panel_open);
        assert!(session.is_recording());
    }

    #[test]
    fn volume_stays_in_range() {
        let mut session = session();
        for _ in 0..5 {
            session.apply(Action::VolumeUp).unwrap();
        }
        assert_eq!(session.volume(), 100);
        for _ in 0..15 {
            session.apply(Action::VolumeDown).unwrap();
        }
        assert_eq!(session.volume(), 0);
    }

    #[test]
    fn toggles_flip() {
        let mut session = session();
        session.apply(Action::ToggleNotesDrawer).unwrap();
        session.apply(Action::ToggleSubtitlePanel).unwrap();
        session.apply(Action::ToggleFullscreen).unwrap();
        assert!(session.notes_drawer_open);
        assert!(!session.subtitle_panel_open);
        assert!(session.fullscreen);
    }

    #[test]
    fn delete_by_id() {
        let mut session = session();
        let saved_id = session.save_current().unwrap();
        session.add_note("gone soon").unwrap();
        session.apply(Action::ToggleRecording).unwrap();
        session.apply(Action::ToggleRecording).unwrap();
        let rec_id = session.recordings()[0].id.clone();

        session.delete_recording(&rec_id).unwrap();
        assert!(session.recordings().is_empty());
        session.delete_saved(&saved_id).unwrap();
        assert!(session.saved().is_empty());
        assert!(session.notes().is_empty());

        let err = session.delete_recording(&rec_id).unwrap_err();
        assert!(matches!(err, SubreviewError::UnknownId { .. }));
    }

    #[test]
    fn jump_to_line_seeks() {
        let mut session = session();
        session.jump_to_line(9).unwrap();
        assert_eq!(session.current_index(), 9);
        assert_eq!(session.current_time(), 2567.0);
        assert!(session.jump_to_line(17).is_err());
    }

    #[test]
    fn markers_follow_notes_and_recordings() {
        let mut session = session().with_markers(sample::markers());
        session.add_note("here").unwrap();
        session.apply(Action::ToggleRecording).unwrap();
        session.apply(Action::ToggleRecording).unwrap();
        let markers = session.markers().unwrap();
        assert_eq!(markers.len(), 5);
        assert_eq!(markers[3].kind, MarkerKind::Note);
        assert_eq!(markers[4].kind, MarkerKind::Recording);
        assert!((markers[3].position - 90.2).abs() < 0.05);
    }
}
