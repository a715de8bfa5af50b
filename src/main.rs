mod error;
mod keys;
mod parser;
mod render;
mod sample;
mod script;
mod session;
mod subtitle;
mod sync;

use crate::error::SubreviewError;
use crate::parser::Parser;
use crate::session::Session;
use crate::subtitle::{TimelineMarker, Transcript};

use std::io::{self, Read, Write};
use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser as ClapParser, Subcommand};
use log::info;
use regex::Regex;

fn main() {
    env_logger::init();

    match run() {
        Ok(()) => (),
        Err(err) => {
            eprintln!("An error occurred: {}", err);
            for cause in err.chain().skip(1) {
                eprintln!("    {}", cause);
            }
            process::exit(1);
        }
    }
}

#[derive(ClapParser)]
#[command(about = "Review, bookmark and annotate subtitle dialogue")]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "The SRT file to read from, or '-' for standard input. If not supplied, a built-in sample episode is used."
    )]
    input: Option<String>,
    #[arg(
        short,
        long,
        value_name = "SECONDS",
        help = "Length of the media. Defaults to the end of the last subtitle."
    )]
    duration: Option<f64>,
    #[arg(
        short,
        long,
        value_name = "N",
        default_value_t = 3,
        help = "Number of lines shown on either side of the current line."
    )]
    radius: usize,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Show the subtitle panel at a playback time")]
    At {
        #[arg(value_name = "TIME", help = "Seconds, M:SS, H:MM:SS or HH:MM:SS,mmm")]
        time: String,
    },
    #[command(about = "Format a number of seconds as M:SS")]
    Timecode {
        #[arg(value_name = "SECONDS", allow_negative_numbers = true)]
        seconds: f64,
    },
    #[command(about = "Position of a playback time on the timeline, in percent")]
    Marker {
        #[arg(value_name = "TIME")]
        time: String,
    },
    #[command(about = "List the lines whose text matches a regular expression")]
    Search {
        #[arg(value_name = "PATTERN")]
        pattern: String,
    },
    #[command(about = "List the keyboard shortcuts")]
    Keys,
    #[command(about = "Run a keystroke script against a review session")]
    Play {
        #[arg(
            short,
            long,
            value_name = "TIME",
            help = "Where playback starts. Defaults to the first line, or the bookmarked scene of the sample episode."
        )]
        at: Option<String>,
        #[arg(
            value_name = "SCRIPT",
            help = "Whitespace separated steps: key names (space, r, s, n, m, t, d, left, right, up, down, f, ?, esc), +N to play N seconds, @TIME to seek, #N to click line N, !ID to delete a saved dialogue or recording, n=TEXT to add a note, e:NOTE_ID=TEXT to edit one, ^ID to jump to a saved dialogue. Double quotes group words."
        )]
        script: String,
    },
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Command::Timecode { seconds } => {
            writeln!(out, "{}", sync::format_timecode(*seconds)?)?;
            return Ok(());
        }
        Command::Keys => return render::write_shortcuts(&mut out),
        _ => (),
    }

    let source = load(&cli)?;
    let transcript = source.transcript;
    match cli.command {
        Command::At { time } => {
            let time = parser::parse_time(&time)?;
            let lines = transcript.lines();
            match sync::index_for_time(lines, time) {
                Ok(index) => render::write_panel(&mut out, lines, index, cli.radius)?,
                Err(SubreviewError::NotFound { .. }) => writeln!(out, "no subtitle")?,
                Err(err) => return Err(err.into()),
            }
        }
        Command::Marker { time } => {
            let time = parser::parse_time(&time)?;
            let percent = sync::marker_position(time, transcript.duration())?;
            writeln!(out, "{:.1}", percent)?;
        }
        Command::Search { pattern } => {
            let regex = Regex::new(&pattern).context("Invalid search pattern.")?;
            for (index, line) in transcript.lines().iter().enumerate() {
                if regex.is_match(&line.text) {
                    writeln!(
                        out,
                        "#{:<3} {} {}",
                        index + 1,
                        sync::format_clock(line.start_time)?,
                        line.text
                    )?;
                }
            }
        }
        Command::Play { at, script } => {
            let steps = script::parse(&script).context("Failed to parse the keystroke script")?;
            let start_time = match at {
                Some(at) => parser::parse_time(&at)?,
                None => source.start_time,
            };
            let mut session =
                Session::new(transcript, source.episode).with_markers(source.markers);
            session.seek(start_time);
            script::run(&mut session, &steps)?;
            render::write_session(&mut out, &session, cli.radius)?;
        }
        Command::Timecode { .. } | Command::Keys => unreachable!("handled before loading"),
    }
    out.flush()?;
    Ok(())
}

/// Where the subtitles come from, and what the player shows alongside them.
struct Source {
    transcript: Transcript,
    episode: String,
    markers: Vec<TimelineMarker>,
    start_time: f64,
}

fn load(cli: &Cli) -> Result<Source> {
    match cli.input.as_deref() {
        None => {
            info!("No input given, using the sample episode");
            let transcript = match cli.duration {
                Some(duration) => sample::transcript()
                    .with_duration(duration)
                    .context("Invalid --duration")?,
                None => sample::transcript(),
            };
            Ok(Source {
                transcript,
                episode: sample::EPISODE.to_string(),
                markers: sample::markers(),
                start_time: sample::START_TIME,
            })
        }
        Some(input) => {
            let data = read_input(input)?;
            let transcript = Parser::new()
                .parse(&data, cli.duration)
                .context(format!("Failed to parse SRT file: '{}'", input))?;
            info!(
                "Loaded {} subtitles from '{}'",
                transcript.lines().len(),
                input
            );
            let start_time = transcript.lines()[0].start_time;
            Ok(Source {
                transcript,
                episode: episode_name(input),
                markers: Vec::new(),
                start_time,
            })
        }
    }
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(input)
            .context(format!("Failed to open input file: '{}'", input))
    }
}

fn episode_name(input: &str) -> String {
    if input == "-" {
        return "stdin".to_string();
    }
    Path::new(input)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.to_string())
}
