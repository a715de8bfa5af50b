use crate::error::SubreviewError;

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    Char(char),
    Left,
    Right,
    Up,
    Down,
    Esc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Player,
    /// A text field has focus, so keystrokes belong to it.
    TextField,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    PlayPause,
    ReplayLine,
    SaveDialogue,
    AddNote,
    ToggleRecording,
    ToggleSubtitlePanel,
    ToggleNotesDrawer,
    SkipBack,
    SkipForward,
    VolumeUp,
    VolumeDown,
    ToggleFullscreen,
    ShowShortcuts,
    Dismiss,
}

/// Key labels and descriptions, in the order the help screen lists them.
pub const SHORTCUTS: &[(&str, &str)] = &[
    ("Space", "Play / Pause"),
    ("R", "Replay last line"),
    ("S", "Save current subtitle"),
    ("N", "Add note to current line"),
    ("M", "Start / Stop recording"),
    ("T", "Toggle subtitle panel"),
    ("D", "Toggle notes drawer"),
    ("←", "Skip back 5 seconds"),
    ("→", "Skip forward 5 seconds"),
    ("↑ / ↓", "Volume up / down"),
    ("F", "Fullscreen"),
    ("?", "Show shortcuts"),
    ("Esc", "Close dialogs"),
];

pub fn dispatch(key: Key, focus: Focus) -> Option<Action> {
    if focus == Focus::TextField {
        return None;
    }
    let action = match key {
        Key::Space => Action::PlayPause,
        Key::Left => Action::SkipBack,
        Key::Right => Action::SkipForward,
        Key::Up => Action::VolumeUp,
        Key::Down => Action::VolumeDown,
        Key::Esc => Action::Dismiss,
        Key::Char(c) => match c.to_ascii_lowercase() {
            ' ' => Action::PlayPause,
            'r' => Action::ReplayLine,
            's' => Action::SaveDialogue,
            'n' => Action::AddNote,
            'm' => Action::ToggleRecording,
            't' => Action::ToggleSubtitlePanel,
            'd' => Action::ToggleNotesDrawer,
            'f' => Action::ToggleFullscreen,
            '?' => Action::ShowShortcuts,
            _ => return None,
        },
    };
    Some(action)
}

impl FromStr for Key {
    type Err = SubreviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s.to_ascii_lowercase().as_str() {
            "space" => Key::Space,
            "esc" | "escape" => Key::Esc,
            "left" => Key::Left,
            "right" => Key::Right,
            "up" => Key::Up,
            "down" => Key::Down,
            _ => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    _ => {
                        return Err(SubreviewError::ParseError(format!(
                            "Unknown key '{}'",
                            s
                        )))
                    }
                }
            }
        };
        Ok(key)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Key::Space => write!(fmt, "Space"),
            Key::Char(c) => write!(fmt, "{}", c.to_ascii_uppercase()),
            Key::Left => write!(fmt, "←"),
            Key::Right => write!(fmt, "→"),
            Key::Up => write!(fmt, "↑"),
            Key::Down => write!(fmt, "↓"),
            Key::Esc => write!(fmt, "Esc"),
        }
    }
}
