use std::{num::NonZeroU32, path::PathBuf, str::FromStr};

use timelapse_common::utils::time::{Amount, TimeError};

use crate::camera::{resolution::ResolutionError, Resolution};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolutionChoice {
    Auto,
    Fixed(Resolution),
}

/// One line of user input.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Interval(Amount),
    Duration(Amount),
    Resolution(ResolutionChoice),
    Timestamp(bool),
    SaveDir(PathBuf),
    Start,
    Stop,
    SourceDir(PathBuf),
    OutputName(String),
    OutputDir(PathBuf),
    Fps(NonZeroU32),
    Encode,
    Status,
    Help,
    Quit,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}', try 'help'")]
    Unknown(String),
    #[error("'{command}' expects {expected}")]
    Arguments {
        command: &'static str,
        expected: &'static str,
    },
    #[error(transparent)]
    Time(#[from] TimeError),
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error("'{0}' is not a frame rate, expected a positive whole number")]
    Fps(String),
}

pub const HELP: &str = "\
Settings:
  interval <value> <unit>    time between photos, unit is s, min or h
  duration <value> <unit>    how long to capture for
  resolution <WxH>|auto      one of the detected resolutions, or pick automatically
  timestamp on|off           stamp the time on every photo
  save-dir <path>            where to save the photos
Capture:
  start                      start capturing
  stop                       stop capturing after the current photo
Video:
  source-dir <path>          folder with the photos to use
  output-name <name>         name of the video file
  output-dir <path>          where to save the video
  fps <n>                    frames per second of the video
  encode                     create the video
Other:
  status                     show the current settings
  help                       show this text
  quit                       stop everything and exit";

fn no_args(command: &'static str, rest: &str) -> Result<(), CommandError> {
    if rest.is_empty() {
        Ok(())
    } else {
        Err(CommandError::Arguments {
            command,
            expected: "no arguments",
        })
    }
}

fn required<'a>(
    command: &'static str,
    expected: &'static str,
    rest: &'a str,
) -> Result<&'a str, CommandError> {
    if rest.is_empty() {
        Err(CommandError::Arguments { command, expected })
    } else {
        Ok(rest)
    }
}

fn amount(command: &'static str, rest: &str) -> Result<Amount, CommandError> {
    let mut words = rest.split_whitespace();
    match (words.next(), words.next(), words.next()) {
        (Some(value), Some(unit), None) => Ok(Amount::parse(value, unit)?),
        _ => Err(CommandError::Arguments {
            command,
            expected: "a value and a unit, like '5 min'",
        }),
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map(|(word, rest)| (word, rest.trim()))
            .unwrap_or((line, ""));

        let command = match word.to_ascii_lowercase().as_str() {
            "interval" => Command::Interval(amount("interval", rest)?),
            "duration" => Command::Duration(amount("duration", rest)?),
            "resolution" => {
                let arg = required("resolution", "WxH or 'auto'", rest)?;
                if arg.eq_ignore_ascii_case("auto") {
                    Command::Resolution(ResolutionChoice::Auto)
                } else {
                    Command::Resolution(ResolutionChoice::Fixed(arg.parse()?))
                }
            }
            "timestamp" => match rest.to_ascii_lowercase().as_str() {
                "on" => Command::Timestamp(true),
                "off" => Command::Timestamp(false),
                _ => {
                    return Err(CommandError::Arguments {
                        command: "timestamp",
                        expected: "'on' or 'off'",
                    })
                }
            },
            "save-dir" => Command::SaveDir(required("save-dir", "a path", rest)?.into()),
            "start" => no_args("start", rest).map(|_| Command::Start)?,
            "stop" => no_args("stop", rest).map(|_| Command::Stop)?,
            "source-dir" => {
                Command::SourceDir(required("source-dir", "a path", rest)?.into())
            }
            "output-name" => {
                Command::OutputName(required("output-name", "a file name", rest)?.to_string())
            }
            "output-dir" => {
                Command::OutputDir(required("output-dir", "a path", rest)?.into())
            }
            "fps" => {
                let arg = required("fps", "a frame rate", rest)?;
                Command::Fps(arg.parse().map_err(|_| CommandError::Fps(arg.to_string()))?)
            }
            "encode" => no_args("encode", rest).map(|_| Command::Encode)?,
            "status" => no_args("status", rest).map(|_| Command::Status)?,
            "help" | "?" => Command::Help,
            "quit" | "exit" => no_args("quit", rest).map(|_| Command::Quit)?,
            _ => return Err(CommandError::Unknown(word.to_string())),
        };

        Ok(command)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use timelapse_common::utils::time::Unit;

    fn parse(line: &str) -> Result<Command, CommandError> {
        line.parse()
    }

    #[test]
    fn settings() {
        assert_eq!(
            Ok(Command::Interval(Amount::new(5.0, Unit::Seconds).unwrap())),
            parse("interval 5 s")
        );
        assert_eq!(
            Ok(Command::Duration(Amount::new(1.5, Unit::Hours).unwrap())),
            parse("  duration 1.5   hours ")
        );
        assert_eq!(
            Ok(Command::Resolution(ResolutionChoice::Fixed(Resolution::new(
                1920, 1080
            )))),
            parse("resolution 1920x1080")
        );
        assert_eq!(
            Ok(Command::Resolution(ResolutionChoice::Auto)),
            parse("resolution AUTO")
        );
        assert_eq!(Ok(Command::Timestamp(false)), parse("timestamp off"));
        assert_eq!(Ok(Command::Fps(NonZeroU32::new(30).unwrap())), parse("fps 30"));
    }

    #[test]
    fn paths_keep_their_spaces() {
        assert_eq!(
            Ok(Command::SaveDir(PathBuf::from("my photos/today"))),
            parse("save-dir my photos/today")
        );
        assert_eq!(
            Ok(Command::OutputName("garden timelapse".to_string())),
            parse("output-name garden timelapse")
        );
    }

    #[test]
    fn actions() {
        assert_eq!(Ok(Command::Start), parse("start"));
        assert_eq!(Ok(Command::Stop), parse("STOP"));
        assert_eq!(Ok(Command::Encode), parse("encode"));
        assert_eq!(Ok(Command::Quit), parse("exit"));
        assert_eq!(Ok(Command::Help), parse("help me"));
    }

    #[test]
    fn rejects() {
        assert!(matches!(parse("interval 0 s"), Err(CommandError::Time(_))));
        assert!(matches!(parse("interval -1 s"), Err(CommandError::Time(_))));
        assert!(matches!(parse("interval 5 days"), Err(CommandError::Time(_))));
        assert!(matches!(parse("interval 5"), Err(CommandError::Arguments { .. })));
        assert!(matches!(parse("resolution big"), Err(CommandError::Resolution(_))));
        assert!(matches!(parse("timestamp maybe"), Err(CommandError::Arguments { .. })));
        assert!(matches!(parse("fps 0"), Err(CommandError::Fps(_))));
        assert!(matches!(parse("save-dir"), Err(CommandError::Arguments { .. })));
        assert!(matches!(parse("start now"), Err(CommandError::Arguments { .. })));
        assert_eq!(Err(CommandError::Unknown("jump".to_string())), parse("jump"));
        assert_eq!(Err(CommandError::Unknown("".to_string())), parse("   "));
    }
}
