use core::str::FromStr;
use cubesweeper_core::{Coord, Coord3, GameError, coords_from_signed};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command `{0}`, type `help` for the list")]
    Unknown(String),
    #[error("`{command}` takes {expected} arguments, got {found}")]
    ArgumentCount {
        command: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("`{0}` is not a number")]
    NotANumber(String),
    #[error(transparent)]
    Game(#[from] GameError),
}

/// One line of player input.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Uncover(Coord3),
    Flag(Coord3),
    Layer(Coord),
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  uncover|u X Y Z   uncover a cube
  flag|f X Y Z      toggle the flag on a cube
  layer|l Z         show the layer at depth Z
  status|s          show counters and time
  help|h            show this help
  quit|q            stop playing";

fn numbers(
    command: &'static str,
    args: &[&str],
    expected: usize,
) -> Result<Vec<i64>, CommandError> {
    if args.len() != expected {
        return Err(CommandError::ArgumentCount {
            command,
            expected,
            found: args.len(),
        });
    }
    args.iter()
        .map(|arg| {
            arg.parse::<i64>()
                .map_err(|_| CommandError::NotANumber((*arg).to_string()))
        })
        .collect()
}

fn coords(command: &'static str, args: &[&str]) -> Result<Coord3, CommandError> {
    let values = numbers(command, args, 3)?;
    Ok(coords_from_signed(values[0], values[1], values[2])?)
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(Self::Help);
        };
        let args: Vec<_> = words.collect();

        match name.to_ascii_lowercase().as_str() {
            "uncover" | "u" => Ok(Self::Uncover(coords("uncover", &args)?)),
            "flag" | "f" => Ok(Self::Flag(coords("flag", &args)?)),
            "layer" | "l" => {
                let z = numbers("layer", &args, 1)?[0];
                let z = Coord::try_from(z).map_err(|_| GameError::InvalidCoordinates)?;
                Ok(Self::Layer(z))
            }
            "status" | "s" => Ok(Self::Status),
            "help" | "h" | "?" => Ok(Self::Help),
            "quit" | "q" | "exit" => Ok(Self::Quit),
            _ => Err(CommandError::Unknown(name.to_string())),
        }
    }
}
