//! Text format for scripted sessions.
//!
//! A script is a whitespace-separated list of tokens; `#` starts a comment that
//! runs to the end of the line.
//!
//! | Token        | Meaning                                   |
//! |--------------|-------------------------------------------|
//! | `+KEY`       | key pressed                               |
//! | `-KEY`       | key released                              |
//! | `tap:KEY`    | key pressed and released                  |
//! | `gravity`    | one gravity tick                          |
//! | `repeat`     | one held-movement repeat tick             |
//! | `wait:MS`    | let `MS` milliseconds pass on the clock   |
//!
//! `KEY` is one of `left`, `right`, `down`, `rotate`, `pause`, `reset`, `quit`.

use std::time::Duration;

use blockfall_engine::{InputKey, SessionEvent};

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ScriptError {
    #[display("line {line}: unknown key {key:?}")]
    UnknownKey { line: usize, key: String },
    #[display("line {line}: unknown token {token:?}")]
    UnknownToken { line: usize, token: String },
    #[display("line {line}: invalid wait duration {value:?}")]
    InvalidWait { line: usize, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptStep {
    Event(SessionEvent),
    Wait(Duration),
}

fn parse_key(line: usize, name: &str) -> Result<InputKey, ScriptError> {
    let key = match name {
        "left" => InputKey::MoveLeft,
        "right" => InputKey::MoveRight,
        "down" => InputKey::MoveDown,
        "rotate" => InputKey::Rotate,
        "pause" => InputKey::PauseToggle,
        "reset" => InputKey::Reset,
        "quit" => InputKey::Quit,
        _ => {
            return Err(ScriptError::UnknownKey {
                line,
                key: name.to_owned(),
            });
        }
    };
    Ok(key)
}

fn parse_token(line: usize, token: &str, steps: &mut Vec<ScriptStep>) -> Result<(), ScriptError> {
    if let Some(name) = token.strip_prefix('+') {
        steps.push(ScriptStep::Event(SessionEvent::KeyDown(parse_key(line, name)?)));
    } else if let Some(name) = token.strip_prefix('-') {
        steps.push(ScriptStep::Event(SessionEvent::KeyUp(parse_key(line, name)?)));
    } else if let Some(name) = token.strip_prefix("tap:") {
        let key = parse_key(line, name)?;
        steps.push(ScriptStep::Event(SessionEvent::KeyDown(key)));
        steps.push(ScriptStep::Event(SessionEvent::KeyUp(key)));
    } else if let Some(value) = token.strip_prefix("wait:") {
        let millis = value.parse().map_err(|_| ScriptError::InvalidWait {
            line,
            value: value.to_owned(),
        })?;
        steps.push(ScriptStep::Wait(Duration::from_millis(millis)));
    } else if token == "gravity" {
        steps.push(ScriptStep::Event(SessionEvent::GravityTick));
    } else if token == "repeat" {
        steps.push(ScriptStep::Event(SessionEvent::RepeatTick));
    } else {
        return Err(ScriptError::UnknownToken {
            line,
            token: token.to_owned(),
        });
    }
    Ok(())
}

pub fn parse_script(text: &str) -> Result<Vec<ScriptStep>, ScriptError> {
    let mut steps = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let code = line.split_once('#').map_or(line, |(code, _)| code);
        for token in code.split_whitespace() {
            parse_token(index + 1, token, &mut steps)?;
        }
    }
    Ok(steps)
}
