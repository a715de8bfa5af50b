use crate::error::{Result, SubreviewError};
use crate::keys::{self, Focus, Key};
use crate::parser;
use crate::session::Session;

use log::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Press(Key),
    Wait(f64),
    Seek(f64),
    Click(usize),
    Delete(String),
    Note(String),
    EditNote { id: String, content: String },
    JumpToSaved(String),
}

/// Parses a whitespace separated script. Double quotes group words into a
/// single step, as in `n="check the tone"`.
pub fn parse(script: &str) -> Result<Vec<Step>> {
    tokens(script)?.iter().map(|t| parse_step(t)).collect()
}

fn tokens(script: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    for c in script.chars() {
        match c {
            '"' => quoted = !quoted,
            c if c.is_whitespace() && !quoted => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if quoted {
        return Err(SubreviewError::ParseError(
            "Unterminated quote in script".to_string(),
        ));
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    Ok(tokens)
}

fn parse_step(token: &str) -> Result<Step> {
    if let Some(content) = token.strip_prefix("n=") {
        return Ok(Step::Note(content.to_string()));
    }
    if let Some(rest) = token.strip_prefix("e:") {
        return match rest.split_once('=') {
            Some((id, content)) if !id.is_empty() => Ok(Step::EditNote {
                id: id.to_string(),
                content: content.to_string(),
            }),
            _ => Err(SubreviewError::ParseError(format!(
                "Expected e:NOTE_ID=TEXT, got '{}'",
                token
            ))),
        };
    }
    // A lone sign character is a key, not an empty argument.
    if token.len() > 1 {
        if let Some(rest) = token.strip_prefix('+') {
            return Ok(Step::Wait(parser::parse_time(rest)?));
        }
        if let Some(rest) = token.strip_prefix('@') {
            return Ok(Step::Seek(parser::parse_time(rest)?));
        }
        if let Some(rest) = token.strip_prefix('#') {
            let line: usize = rest.parse().map_err(|_| {
                SubreviewError::ParseError(format!("Invalid line number '{}'", rest))
            })?;
            if line == 0 {
                return Err(SubreviewError::ParseError(
                    "Line numbers start at 1".to_string(),
                ));
            }
            return Ok(Step::Click(line - 1));
        }
        if let Some(rest) = token.strip_prefix('!') {
            return Ok(Step::Delete(rest.to_string()));
        }
        if let Some(rest) = token.strip_prefix('^') {
            return Ok(Step::JumpToSaved(rest.to_string()));
        }
    }
    Ok(Step::Press(token.parse()?))
}

pub fn run(session: &mut Session, steps: &[Step]) -> Result<()> {
    for step in steps {
        debug!("Script step {:?}", step);
        match step {
            Step::Press(key) => match keys::dispatch(*key, Focus::Player) {
                Some(action) => session.apply(action)?,
                None => warn!("Key {} is not bound to anything", key),
            },
            Step::Wait(seconds) => session.tick(*seconds),
            Step::Seek(time) => {
                session.seek(*time);
            }
            Step::Click(line) => session.jump_to_line(*line)?,
            Step::Delete(id) if id.starts_with("rec-") => {
                session.delete_recording(id)?;
            }
            Step::Delete(id) => {
                session.delete_saved(id)?;
            }
            Step::Note(content) => {
                session.add_note(content.as_str())?;
            }
            Step::EditNote { id, content } => session.edit_note(id, content.as_str())?,
            Step::JumpToSaved(id) => session.jump_to_saved(id)?,
        }
    }
    Ok(())
}
