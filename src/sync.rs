use crate::error::{Result, SubreviewError};
use crate::subtitle::SubtitleLine;

/// Visual weight of a subtitle line, derived from its distance to the
/// current line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmphasisTier {
    Current,
    Adjacent,
    Near,
    Distant,
}

impl EmphasisTier {
    pub fn opacity(self) -> u8 {
        match self {
            EmphasisTier::Current => 100,
            EmphasisTier::Adjacent => 75,
            EmphasisTier::Near => 50,
            EmphasisTier::Distant => 35,
        }
    }

    pub fn class(self) -> &'static str {
        match self {
            EmphasisTier::Current => "current",
            EmphasisTier::Adjacent => "adjacent",
            EmphasisTier::Near | EmphasisTier::Distant => "distant",
        }
    }
}

/// Returns the index of the last line starting at or before `time`.
///
/// Fails with `NotFound` when `time` precedes the first line, and with
/// `InvalidInput` when there are no lines at all.
pub fn index_for_time(subtitles: &[SubtitleLine], time: f64) -> Result<usize> {
    if subtitles.is_empty() {
        return Err(SubreviewError::InvalidInput(
            "cannot synchronise against an empty subtitle list".to_string(),
        ));
    }
    // Number of lines that have already started.
    let started = subtitles.partition_point(|line| line.start_time <= time);
    if started == 0 {
        return Err(SubreviewError::NotFound { time });
    }
    Ok(started - 1)
}

/// Closed index range of the lines to render around `current_index`.
pub fn visible_window(
    subtitles: &[SubtitleLine],
    current_index: usize,
    radius: usize,
) -> Result<(usize, usize)> {
    if subtitles.is_empty() {
        return Err(SubreviewError::InvalidInput(
            "cannot window an empty subtitle list".to_string(),
        ));
    }
    let last = subtitles.len() - 1;
    if current_index > last {
        return Err(SubreviewError::InvalidInput(format!(
            "current index {} is out of range for {} subtitles",
            current_index,
            subtitles.len()
        )));
    }
    let start = current_index.saturating_sub(radius);
    let end = current_index.saturating_add(radius).min(last);
    Ok((start, end))
}

pub fn emphasis_tier(index: usize, current_index: usize) -> EmphasisTier {
    let diff = if index > current_index {
        index - current_index
    } else {
        current_index - index
    };
    match diff {
        0 => EmphasisTier::Current,
        1 => EmphasisTier::Adjacent,
        2 => EmphasisTier::Near,
        _ => EmphasisTier::Distant,
    }
}

/// Position of `time` along the timeline, as a percentage of `duration`.
///
/// The result is not clamped: callers are expected to keep `time` within
/// `[0, duration]`.
pub fn marker_position(time: f64, duration: f64) -> Result<f64> {
    if duration.is_nan() || duration <= 0.0 {
        return Err(SubreviewError::InvalidInput(format!(
            "timeline duration must be positive, got {}",
            duration
        )));
    }
    Ok(100.0 * time / duration)
}

/// Formats a playback time as `M:SS`. Minutes are not wrapped into hours.
pub fn format_timecode(seconds: f64) -> Result<String> {
    let total = whole_seconds(seconds)?;
    Ok(format!("{}:{:02}", total / 60, total % 60))
}

/// Formats a playback time as `HH:MM:SS`, the stamp shown beside each line.
pub fn format_clock(seconds: f64) -> Result<String> {
    let total = whole_seconds(seconds)?;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    Ok(format!("{:02}:{:02}:{:02}", hours, minutes, total % 60))
}

fn whole_seconds(seconds: f64) -> Result<u64> {
    if seconds.is_nan() || seconds < 0.0 {
        return Err(SubreviewError::InvalidInput(format!(
            "cannot format a negative time: {}",
            seconds
        )));
    }
    Ok(seconds.floor() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample;

    fn subs() -> Vec<SubtitleLine> {
        sample::transcript().lines().to_vec()
    }

    macro_rules! test_index_for_time {
        ($($name:ident: $value:expr,)*) => {
        $(
            #[test]
            fn $name() {
                let (time, expected) = $value;

                let index = index_for_time(&subs(), time);

                assert_eq!(index, expected);
            }
        )*
        }
    }

    test_index_for_time! {
        test_index_at_line_start: (2544.0, Ok(3)),
        test_index_between_lines: (2545.0, Ok(3)),
        test_index_at_first_line: (2535.0, Ok(0)),
        test_index_just_before_second_line: (2537.999, Ok(0)),
        test_index_after_last_line: (2700.0, Ok(16)),
        test_index_before_first_line: (2534.0, Err(SubreviewError::NotFound { time: 2534.0 })),
        test_index_at_zero: (0.0, Err(SubreviewError::NotFound { time: 0.0 })),
    }

    #[test]
    fn index_for_time_rejects_empty_list() {
        let err = index_for_time(&[], 12.0).unwrap_err();
        assert!(matches!(err, SubreviewError::InvalidInput(_)));
    }

    #[test]
    fn index_is_monotonic_and_contains_time() {
        let subs = subs();
        let mut previous = 0;
        let mut time = 2535.0;
        while time < 2650.0 {
            let i = index_for_time(&subs, time).unwrap();
            assert!(i >= previous, "index went backwards at {}", time);
            assert!(subs[i].start_time <= time);
            assert!(i == subs.len() - 1 || subs[i + 1].start_time > time);
            previous = i;
            time += 0.25;
        }
    }

    macro_rules! test_visible_window {
        ($($name:ident: $value:expr,)*) => {
        $(
            #[test]
            fn $name() {
                let (current, radius, expected) = $value;

                let window = visible_window(&subs(), current, radius).unwrap();

                assert_eq!(window, expected);
            }
        )*
        }
    }

    test_visible_window! {
        test_window_near_start: (3, 3, (0, 6)),
        test_window_clipped_at_start: (1, 3, (0, 4)),
        test_window_in_middle: (8, 3, (5, 11)),
        test_window_clipped_at_end: (15, 3, (12, 16)),
        test_window_zero_radius: (7, 0, (7, 7)),
        test_window_huge_radius: (7, usize::MAX, (0, 16)),
    }

    #[test]
    fn window_always_within_bounds() {
        let subs = subs();
        for current in 0..subs.len() {
            for radius in 0..20 {
                let (start, end) = visible_window(&subs, current, radius).unwrap();
                assert!(start <= current && current <= end && end < subs.len());
            }
        }
    }

    #[test]
    fn window_rejects_bad_input() {
        assert!(visible_window(&[], 0, 3).is_err());
        assert!(visible_window(&subs(), 17, 3).is_err());
    }

    #[test]
    fn tiers_by_distance() {
        assert_eq!(emphasis_tier(5, 5), EmphasisTier::Current);
        assert_eq!(emphasis_tier(4, 5), EmphasisTier::Adjacent);
        assert_eq!(emphasis_tier(7, 5), EmphasisTier::Near);
        assert_eq!(emphasis_tier(8, 5), EmphasisTier::Distant);
        assert_eq!(emphasis_tier(0, 16), EmphasisTier::Distant);
    }

    #[test]
    fn tiers_are_symmetric() {
        let current = 10;
        for k in 0..=current {
            assert_eq!(
                emphasis_tier(current - k, current),
                emphasis_tier(current + k, current)
            );
        }
    }

    #[test]
    fn tier_presentation() {
        assert_eq!(EmphasisTier::Current.opacity(), 100);
        assert_eq!(EmphasisTier::Distant.opacity(), 35);
        assert_eq!(EmphasisTier::Near.class(), "distant");
    }

    #[test]
    fn marker_position_of_sample_time() {
        let percent = marker_position(2544.0, 2820.0).unwrap();
        assert!((percent - 90.2).abs() < 0.05);
    }

    #[test]
    fn marker_position_round_trips() {
        let duration = 2820.0;
        for &time in &[0.0, 1.5, 987.25, 2544.0, 2820.0] {
            let percent = marker_position(time, duration).unwrap();
            assert!((percent / 100.0 * duration - time).abs() < 1e-9);
        }
    }

    #[test]
    fn marker_position_is_not_clamped() {
        assert_eq!(marker_position(150.0, 100.0).unwrap(), 150.0);
    }

    #[test]
    fn marker_position_rejects_bad_duration() {
        assert!(marker_position(1.0, 0.0).is_err());
        assert!(marker_position(1.0, -10.0).is_err());
    }

    macro_rules! test_format_timecode {
        ($($name:ident: $value:expr,)*) => {
        $(
            #[test]
            fn $name() {
                let (input, expected) = $value;

                assert_eq!(format_timecode(input).unwrap(), expected);
            }
        )*
        }
    }

    test_format_timecode! {
        test_timecode_0: (0.0, "0:00"),
        test_timecode_1: (9.99, "0:09"),
        test_timecode_2: (60.0, "1:00"),
        test_timecode_3: (2544.0, "42:24"),
        test_timecode_4: (2820.0, "47:00"),
        test_timecode_5: (3725.4, "62:05"),
    }

    #[test]
    fn format_rejects_negative_seconds() {
        assert!(format_timecode(-1.0).is_err());
        assert!(format_clock(-0.5).is_err());
    }

    #[test]
    fn format_clock_has_hours() {
        assert_eq!(format_clock(2535.0).unwrap(), "00:42:15");
        assert_eq!(format_clock(3725.0).unwrap(), "01:02:05");
    }
}
