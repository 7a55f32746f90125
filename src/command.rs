//! Line-oriented operator input.
//!
//! Each line is one pointer, wheel, key or window event:
//!
//! ```text
//! down left 120 340
//! move 180 340
//! up left 180 340
//! wheel -120 640 360
//! key Escape
//! leave
//! resize 1280 720
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use std::num::ParseFloatError;
use std::str::FromStr;

use canvas::camera::Point;
use canvas::engine::{Action, EngineCore};
use canvas::input::{Button, Key};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    #[error("unknown button `{0}`; expected left, right or middle")]
    UnknownButton(String),
    #[error("missing {0}")]
    MissingArgument(&'static str),
    #[error("invalid number `{value}`: {source}")]
    InvalidNumber { value: String, source: ParseFloatError },
    #[error("unexpected trailing input `{0}`")]
    Trailing(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Down { button: Button, at: Point },
    Up { button: Button, at: Point },
    Move(Point),
    Wheel { delta_y: f64, at: Point },
    Key(Key),
    Leave,
    Resize { width: f64, height: f64 },
}

impl Command {
    /// Feed this command to the engine.
    pub fn apply(self, engine: &mut EngineCore) -> Vec<Action> {
        match self {
            Self::Down { button, at } => engine.on_pointer_down(button, at),
            Self::Up { button, at } => engine.on_pointer_up(button, at),
            Self::Move(at) => engine.on_pointer_move(at),
            Self::Wheel { delta_y, at } => engine.on_wheel(delta_y, at),
            Self::Key(key) => engine.on_key_down(&key),
            Self::Leave => engine.on_pointer_leave(),
            Self::Resize { width, height } => engine.resize(width, height),
        }
    }
}

struct Args<'a>(std::str::SplitWhitespace<'a>);

impl<'a> Args<'a> {
    fn word(&mut self, what: &'static str) -> Result<&'a str, CommandError> {
        self.0.next().ok_or(CommandError::MissingArgument(what))
    }

    fn number(&mut self, what: &'static str) -> Result<f64, CommandError> {
        let value = self.word(what)?;
        value.parse().map_err(|source| CommandError::InvalidNumber { value: value.to_owned(), source })
    }

    fn point(&mut self) -> Result<Point, CommandError> {
        Ok(Point::new(self.number("x")?, self.number("y")?))
    }

    fn button(&mut self) -> Result<Button, CommandError> {
        match self.word("button")? {
            "left" | "primary" => Ok(Button::Primary),
            "right" | "secondary" => Ok(Button::Secondary),
            "middle" => Ok(Button::Middle),
            other => Err(CommandError::UnknownButton(other.to_owned())),
        }
    }

    fn finish(mut self) -> Result<(), CommandError> {
        match self.0.next() {
            Some(extra) => Err(CommandError::Trailing(extra.to_owned())),
            None => Ok(()),
        }
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut args = Args(line.split_whitespace());
        let command = match args.word("command")? {
            "down" => Self::Down { button: args.button()?, at: args.point()? },
            "up" => Self::Up { button: args.button()?, at: args.point()? },
            "move" => Self::Move(args.point()?),
            "wheel" => Self::Wheel { delta_y: args.number("delta")?, at: args.point()? },
            "key" => Self::Key(Key(args.word("key name")?.to_owned())),
            "leave" => Self::Leave,
            "resize" => Self::Resize { width: args.number("width")?, height: args.number("height")? },
            other => return Err(CommandError::UnknownCommand(other.to_owned())),
        };
        args.finish()?;
        Ok(command)
    }
}

/// Parse commands from `reader` until it ends or the receiver goes away.
/// Malformed lines are logged and skipped.
pub async fn read_commands<R: AsyncBufRead + Unpin>(reader: R, commands: mpsc::Sender<Command>) {
    let mut lines = reader.lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                tracing::debug!("command input closed");
                return;
            }
            Err(error) => {
                tracing::warn!(%error, "command input failed");
                return;
            }
        };

        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match line.parse::<Command>() {
            Ok(command) => {
                if commands.send(command).await.is_err() {
                    return;
                }
            }
            Err(error) => tracing::warn!(%error, line, "skipping command"),
        }
    }
}

#[cfg(test)]
#[path = "command_test.rs"]
mod tests;
