use crate::subtitle::{MarkerKind, SubtitleLine, TimelineMarker, Transcript};

pub const EPISODE: &str = "S2 E9 · The Lighthouse";
pub const DURATION: f64 = 2820.0;
pub const START_TIME: f64 = 2544.0;

const LINES: &[(f64, &str)] = &[
    (2535.0, "You kept the lamp burning all winter?"),
    (2538.0, "Every night. Somebody had to."),
    (2541.0, "The ships stopped coming in October."),
    (2544.0, "I know. I kept it burning anyway."),
    (2548.0, "Nobody asked you to stay out here alone."),
    (2553.0, "No."),
    (2555.0, "Nobody had to."),
    (2560.0, "Tom..."),
    (2563.0, "I don't know what to tell them back home."),
    (2567.0, "Tell them the light never went out."),
    (2570.0, "You used to hate the sea."),
    (2574.0, "I still do. That's why it needs watching."),
    (2577.0, "For the boats."),
    (2581.0, "There are no boats left, Tom."),
    (2584.0, "Then for whoever comes next."),
    (2588.0, "Everything I did out here, I did for them."),
    (2592.0, "You need to come home now."),
];

pub fn transcript() -> Transcript {
    let lines = LINES
        .iter()
        .enumerate()
        .map(|(i, &(start, text))| SubtitleLine::new((i + 1).to_string(), text, start))
        .collect();
    Transcript { lines, duration: DURATION }
}

pub fn markers() -> Vec<TimelineMarker> {
    vec![
        TimelineMarker::new(35.0, MarkerKind::Note),
        TimelineMarker::new(52.0, MarkerKind::Recording),
        TimelineMarker::new(78.0, MarkerKind::Note),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_is_a_valid_transcript() {
        let sample = transcript();
        let checked = Transcript::new(sample.lines.clone(), sample.duration).unwrap();
        assert_eq!(checked.lines().len(), 17);
        assert_eq!(checked.lines()[3].start_time, START_TIME);
    }
}
