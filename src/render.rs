use crate::keys::SHORTCUTS;
use crate::session::Session;
use crate::subtitle::{MarkerKind, SubtitleLine, TimelineMarker};
use crate::sync;

use std::io::Write;

use anyhow::Result;

pub const TIMELINE_WIDTH: usize = 60;

/// Writes the lines visible around `current`, one per row, each carrying its
/// stamp and the opacity of its emphasis tier.
pub fn write_panel<W: Write>(
    buf: &mut W,
    lines: &[SubtitleLine],
    current: usize,
    radius: usize,
) -> Result<()> {
    let (start, end) = sync::visible_window(lines, current, radius)?;
    for (index, line) in lines.iter().enumerate().take(end + 1).skip(start) {
        let tier = sync::emphasis_tier(index, current);
        let pointer = match tier.class() {
            "current" => '▶',
            "adjacent" => '›',
            _ => ' ',
        };
        writeln!(
            buf,
            "{} {} {:>3}% {}",
            pointer,
            sync::format_clock(line.start_time)?,
            tier.opacity(),
            line.text
        )?;
    }
    Ok(())
}

pub fn write_status<W: Write>(buf: &mut W, session: &Session) -> Result<()> {
    let clock = session.clock();
    write!(
        buf,
        "{} {} / {}  vol {}",
        if session.is_playing() { "▶" } else { "⏸" },
        sync::format_timecode(session.current_time())?,
        sync::format_timecode(clock.duration)?,
        session.volume()
    )?;
    if session.fullscreen {
        write!(buf, "  fullscreen")?;
    }
    if session.is_recording() {
        write!(buf, "  ● Recording Dialogue")?;
    }
    writeln!(buf)?;
    Ok(())
}

/// Lays out a timeline bar: filled up to the playhead, with a glyph for
/// every marker. The playhead wins when it shares a slot with a marker.
pub fn build_timeline(width: usize, progress: f64, markers: &[TimelineMarker]) -> String {
    if width == 0 {
        return String::new();
    }
    let slot = |percent: f64| {
        let fraction = percent.max(0.0).min(100.0) / 100.0;
        (fraction * (width - 1) as f64).round() as usize
    };

    let head = slot(progress);
    let mut bar: Vec<char> = (0..width)
        .map(|i| if i < head { '━' } else { '─' })
        .collect();
    for marker in markers {
        bar[slot(marker.position)] = match marker.kind {
            MarkerKind::Note => 'n',
            MarkerKind::Recording => 'r',
        };
    }
    bar[head] = '●';
    bar.into_iter().collect()
}

pub fn write_timeline<W: Write>(buf: &mut W, session: &Session, width: usize) -> Result<()> {
    let markers = session.markers()?;
    let bar = build_timeline(width, session.clock().progress()?, &markers);
    writeln!(buf, "{}", bar)?;
    Ok(())
}

pub fn write_saved<W: Write>(buf: &mut W, session: &Session) -> Result<()> {
    writeln!(buf, "Saved Dialogues ({})", session.saved().len())?;
    for saved in session.saved() {
        write!(
            buf,
            "  [{}] {} {} · {}",
            saved.id, saved.timestamp, saved.text, saved.episode
        )?;
        if saved.has_recording {
            write!(buf, " (recorded)")?;
        }
        writeln!(buf)?;
        for note in session
            .notes()
            .iter()
            .filter(|n| n.saved_dialogue_id == saved.id)
        {
            let content = if note.content.is_empty() {
                "(empty)"
            } else {
                note.content.as_str()
            };
            writeln!(buf, "      {} {}", note.id, content)?;
        }
    }
    Ok(())
}

pub fn write_recordings<W: Write>(buf: &mut W, session: &Session) -> Result<()> {
    writeln!(buf, "Recordings ({})", session.recordings().len())?;
    for recording in session.recordings() {
        writeln!(
            buf,
            "  [{}] {} {} \"{}\" · {}",
            recording.id,
            recording.timestamp,
            recording.duration,
            recording.dialogue,
            recording.episode
        )?;
    }
    Ok(())
}

pub fn write_shortcuts<W: Write>(buf: &mut W) -> Result<()> {
    writeln!(buf, "Keyboard Shortcuts")?;
    for (keys, action) in SHORTCUTS {
        writeln!(buf, "  {:<7} {}", keys, action)?;
    }
    Ok(())
}

/// Everything the player shows for a session, honouring its panel toggles.
pub fn write_session<W: Write>(buf: &mut W, session: &Session, radius: usize) -> Result<()> {
    writeln!(buf, "{}", session.episode())?;
    write_status(buf, session)?;
    write_timeline(buf, session, TIMELINE_WIDTH)?;
    if session.subtitle_panel_open {
        writeln!(buf)?;
        write_panel(
            buf,
            session.transcript().lines(),
            session.current_index(),
            radius,
        )?;
    }
    if session.notes_drawer_open || !session.saved().is_empty() {
        writeln!(buf)?;
        write_saved(buf, session)?;
    }
    if session.recordings_panel_open || !session.recordings().is_empty() {
        writeln!(buf)?;
        write_recordings(buf, session)?;
    }
    if session.show_shortcuts {
        writeln!(buf)?;
        write_shortcuts(buf)?;
    }
    buf.flush()?;
    Ok(())
}
