use crate::error::{Result, SubreviewError};
use crate::subtitle::{SubtitleLine, Transcript};

use std::time::Duration;

use log::{debug, warn};
use nom::bytes::complete::{tag, take_while1, take_while_m_n};
use nom::character::complete::{digit1, line_ending, multispace0, multispace1, space0, space1};
use nom::combinator::{all_consuming, map_res, opt};
use nom::error::{convert_error, ErrorKind, VerboseError};
use nom::multi::{many_m_n, many_till};
use nom::sequence::{preceded, terminated};
use nom::{branch::alt, error_position, Err, IResult};

/// A cue exactly as it appears in the SRT file, before it is turned into a
/// subtitle line.
#[derive(Debug)]
struct Cue {
    sequence_number: usize,
    show_at: Duration,
    hide_at: Duration,
    text: Vec<String>,
}

pub struct Parser;
impl Parser {
    pub fn new() -> Self {
        Self {}
    }

    /// Parses an SRT file. The media duration is `duration` when given, and
    /// otherwise the latest time any cue is hidden.
    pub fn parse(&self, input: &str, duration: Option<f64>) -> Result<Transcript> {
        let cues = match srt_file(input) {
            Ok((_, cues)) => cues,
            Err(Err::Error(err)) | Err(Err::Failure(err)) => {
                return Err(SubreviewError::ParseError(convert_error(input, err)));
            }
            Err(Err::Incomplete(_)) => {
                unreachable!("Incomplete data received by non-streaming parser.")
            }
        };
        if cues.is_empty() {
            return Err(SubreviewError::InvalidInput(
                "the subtitle file contains no cues".to_string(),
            ));
        }
        debug!("Parsed {} cues", cues.len());

        let duration = duration.unwrap_or_else(|| {
            cues.iter()
                .map(|c| c.hide_at.max(c.show_at))
                .max()
                .unwrap_or_default()
                .as_secs_f64()
        });
        let lines = cues.into_iter().map(to_line).collect();
        Transcript::new(lines, duration)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

fn to_line(cue: Cue) -> SubtitleLine {
    if cue.hide_at < cue.show_at {
        warn!(
            "Cue {} is hidden before it is shown, keeping its start time only",
            cue.sequence_number
        );
    }
    SubtitleLine::new(
        cue.sequence_number.to_string(),
        cue.text.join(" "),
        cue.show_at.as_secs_f64(),
    )
}

/// Parses a playback time given on the command line.
///
/// Accepts plain seconds (`2544`, `2544.5`), `M:SS`, `H:MM:SS` and the SRT
/// form `HH:MM:SS,mmm`.
pub fn parse_time(input: &str) -> Result<f64> {
    let trimmed = input.trim();
    match all_consuming(time_arg)(trimmed) {
        Ok((_, seconds)) => Ok(seconds),
        Err(Err::Error(err)) | Err(Err::Failure(err)) => Err(SubreviewError::ParseError(
            format!("Invalid time '{}':\n{}", trimmed, convert_error(trimmed, err)),
        )),
        Err(Err::Incomplete(_)) => {
            unreachable!("Incomplete data received by non-streaming parser.")
        }
    }
}

fn time_arg(input: &str) -> IResult<&str, f64, VerboseError<&str>> {
    let sexagesimal = || {
        map_res(digit1, |s: &str| {
            s.parse::<u64>().map_err(|_| ()).and_then(|v| {
                if v < 60 {
                    Ok(v)
                } else {
                    Err(())
                }
            })
        })
    };

    let start = input;
    let (input, first): (_, u64) = map_res(digit1, |s: &str| s.parse())(input)?;
    let (input, rest) = many_m_n(0, 2, preceded(tag(":"), sexagesimal()))(input)?;
    let (input, fraction) = opt(preceded(alt((tag(","), tag("."))), digit1))(input)?;

    let whole = match rest
        .iter()
        .try_fold(first, |acc, v| acc.checked_mul(60)?.checked_add(*v))
    {
        Some(whole) => whole,
        None => return Err(Err::Failure(error_position!(start, ErrorKind::TooLarge))),
    };
    let fraction = match fraction {
        // Digits only, so this cannot fail.
        Some(digits) => format!("0.{}", digits).parse::<f64>().unwrap_or(0.0),
        None => 0.0,
    };

    Ok((input, whole as f64 + fraction))
}

fn optional_bom(input: &str) -> IResult<&str, Option<&str>, VerboseError<&str>> {
    opt(tag("\u{FEFF}"))(input)
}

fn srt_file(input: &str) -> IResult<&str, Vec<Cue>, VerboseError<&str>> {
    let (input, _) = optional_bom(input)?;
    let (input, mut cues) = all_cues(input)?;
    let (input, _) = end_of_file(input)?;
    cues.sort_by_key(|c| c.show_at);
    Ok((input, cues))
}

fn all_cues(input: &str) -> IResult<&str, Vec<Cue>, VerboseError<&str>> {
    let mut parsed_cues = Vec::new();
    let (mut input, _) = multispace0(input)?;
    loop {
        match cue(input) {
            Ok((rem_input, cue)) => {
                parsed_cues.push(cue);
                let (rem_input, _) = multispace0(rem_input)?;
                input = rem_input;
            }
            Err(err) => {
                if input.is_empty() {
                    return Ok((input, parsed_cues));
                } else {
                    return Err(err);
                }
            }
        }
    }
}

fn cue(input: &str) -> IResult<&str, Cue, VerboseError<&str>> {
    let (input, _) = multispace0(input)?;
    let (input, sequence_number) = terminated(seq_num, multispace1)(input)?;
    let (input, (show_at, hide_at)) = terminated(show_hide, line_ending)(input)?;
    let (input, text) = cue_text(input)?;

    Ok((
        input,
        Cue {
            sequence_number,
            show_at,
            hide_at,
            text,
        },
    ))
}

fn end_of_file(input: &str) -> IResult<&str, &str, VerboseError<&str>> {
    if input.is_empty() {
        Ok((input, input))
    } else {
        std::result::Result::Err(Err::Error(error_position!(input, ErrorKind::Eof)))
    }
}

fn cue_text(input: &str) -> IResult<&str, Vec<String>, VerboseError<&str>> {
    let line = terminated(
        take_while1(|c: char| c != '\n' && c != '\r'),
        alt((line_ending, end_of_file)),
    );

    let (input, (vec, _)) = many_till(line, alt((line_ending, end_of_file)))(input)?;

    Ok((input, vec.into_iter().map(|l| l.trim().to_string()).collect()))
}

fn show_hide(input: &str) -> IResult<&str, (Duration, Duration), VerboseError<&str>> {
    let (input, show_at) = timestamp(input)?;
    let (input, _) = space1(input)?;
    let (input, _) = tag("-->")(input)?;
    let (input, _) = space1(input)?;
    let (input, hide_at) = timestamp(input)?;
    let (input, _) = space0(input)?;

    Ok((input, (show_at, hide_at)))
}

fn timestamp(input: &str) -> IResult<&str, Duration, VerboseError<&str>> {
    const MILLIS_MIN: usize = 0;
    const MILLIS_MAX: usize = 3;
    let take_millis = || {
        map_res(
            take_while_m_n(MILLIS_MIN, MILLIS_MAX, |c: char| c.is_ascii_digit()),
            move |s: &str| {
                if s.len() < MILLIS_MAX {
                    // `,2` is not valid SRT but shows up in the wild; it means
                    // `,200`, so the digits are right-padded.
                    let millis = format!("{:0<3}", s);
                    millis.parse()
                } else {
                    s.parse()
                }
            },
        )
    };

    const HMS_MIN: usize = 0;
    const HMS_MAX: usize = 2;
    let take_hms = || {
        map_res(
            take_while_m_n(HMS_MIN, HMS_MAX, |c: char| c.is_ascii_digit()),
            |s: &str| {
                if s.len() < HMS_MAX {
                    // Left-padded: 1:13:45 is 01:13:45.
                    let value = format!("{:0>2}", s);
                    value.parse()
                } else {
                    s.parse()
                }
            },
        )
    };

    let (input, hours): (_, u64) = take_hms()(input)?;
    let (input, _) = tag(":")(input)?;
    let (input, minutes) = take_hms()(input)?;
    let (input, _) = tag(":")(input)?;
    let (input, seconds) = take_hms()(input)?;
    let (input, _) = alt((tag(","), tag(".")))(input)?;
    let (input, millis): (_, u64) = take_millis()(input)?;

    Ok((
        input,
        Duration::from_millis(
            millis + seconds * 1000 + minutes * 60 * 1000 + hours * 60 * 60 * 1000,
        ),
    ))
}

fn seq_num(input: &str) -> IResult<&str, usize, VerboseError<&str>> {
    map_res(digit1, |s: &str| s.parse())(input)
}
