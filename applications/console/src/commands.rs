/// Text commands and their rendering
///
/// One command per line, e.g. `play never gonna`, `seek 01:10`, `loop 2`.
/// Queue positions are zero-based; position 0 is the current track.
use crate::error::{ConsoleError, Result};
use cadence_core::timestamp;
use cadence_playback::{LoopMode, PlayerEvent, PlayerState, QueueSnapshot, Repeats};
use std::fmt::Write;

pub const HELP: &str = "\
Commands:
  join [channel]        connect to a voice channel
  leave                 disconnect and clear the queue
  play <query|url>      queue a track (alias: p)
  pause | resume        pause or resume the current track
  skip                  move to the next track (alias: s)
  stop                  stop and clear the queue
  seek <time>           jump to a position (70, 01:10, 1:02:03)
  restart               replay the current track from the start
  loop [times]          toggle repeating the current track
  loopqueue             toggle repeating the whole queue
  remove <pos>          remove a queued track
  swap <pos> <pos>      exchange two queued tracks
  move <from> <to>      move a queued track
  volume <0-200>        set the volume in percent
  queue                 show the queue (alias: q)
  status                print the queue as JSON
  help                  show this message
  quit                  leave and exit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Join(Option<String>),
    Leave,
    Play(String),
    Pause,
    Resume,
    Skip,
    Stop,
    Seek(f64),
    Restart,
    Loop(Repeats),
    LoopQueue,
    Remove(usize),
    Swap(usize, usize),
    Move(usize, usize),
    Volume(u16),
    Queue,
    Status,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (name, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(name, rest)| (name, rest.trim()));
        let args: Vec<&str> = rest.split_whitespace().collect();

        let command = match name.to_lowercase().as_str() {
            "join" => Command::Join((!rest.is_empty()).then(|| rest.to_string())),
            "leave" => Command::Leave,
            "play" | "p" => {
                if rest.is_empty() {
                    return Err(ConsoleError::command("play needs a query or url"));
                }
                Command::Play(rest.to_string())
            }
            "pause" => Command::Pause,
            "resume" => Command::Resume,
            "skip" | "s" => Command::Skip,
            "stop" => Command::Stop,
            "seek" => Command::Seek(timestamp::parse(single_arg(name, &args)?)?),
            "restart" | "replay" => Command::Restart,
            "loop" => match args.as_slice() {
                [] => Command::Loop(Repeats::Unbounded),
                [times] => Command::Loop(Repeats::Times(parse_number(name, times)?)),
                _ => return Err(too_many(name)),
            },
            "loopqueue" => Command::LoopQueue,
            "remove" => Command::Remove(parse_number(name, single_arg(name, &args)?)?),
            "swap" => {
                let (i, j) = pair_args(name, &args)?;
                Command::Swap(i, j)
            }
            "move" => {
                let (from, to) = pair_args(name, &args)?;
                Command::Move(from, to)
            }
            "volume" | "vol" => Command::Volume(parse_number(name, single_arg(name, &args)?)?),
            "queue" | "q" => Command::Queue,
            "status" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            "" => return Err(ConsoleError::command("empty input")),
            other => {
                return Err(ConsoleError::command(format!(
                    "unknown command '{}', try 'help'",
                    other
                )))
            }
        };

        Ok(command)
    }
}

fn single_arg<'a>(name: &str, args: &[&'a str]) -> Result<&'a str> {
    match args {
        [arg] => Ok(arg),
        [] => Err(ConsoleError::command(format!("{} needs an argument", name))),
        _ => Err(too_many(name)),
    }
}

fn pair_args(name: &str, args: &[&str]) -> Result<(usize, usize)> {
    match args {
        [a, b] => Ok((parse_number(name, a)?, parse_number(name, b)?)),
        _ => Err(ConsoleError::command(format!(
            "{} needs two positions",
            name
        ))),
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, arg: &str) -> Result<T> {
    arg.parse()
        .map_err(|_| ConsoleError::command(format!("{}: '{}' is not a valid number", name, arg)))
}

fn too_many(name: &str) -> ConsoleError {
    ConsoleError::command(format!("{}: too many arguments", name))
}

/// Human readable queue
pub fn render_queue(snapshot: &QueueSnapshot) -> String {
    let mut out = String::new();
    let Some((head, rest)) = snapshot.songs.split_first() else {
        return "Queue is empty".to_string();
    };

    let label = if snapshot.state == PlayerState::Paused {
        "Paused"
    } else {
        "Now playing"
    };
    let _ = writeln!(
        out,
        "{}: {} - {} [{}] (requested by {})",
        label, head.title, head.author, head.length, head.requester
    );

    if !rest.is_empty() {
        let _ = writeln!(out, "Up next:");
        for song in rest {
            let _ = writeln!(
                out,
                "  {}. {} - {} [{}]",
                song.position, song.title, song.author, song.length
            );
        }
    }

    let loop_label = match (snapshot.loop_mode, snapshot.remaining_repeats) {
        (LoopMode::Single, Some(Repeats::Times(n))) => format!("track ({} left)", n),
        (LoopMode::Single, _) => "track".to_string(),
        (LoopMode::Whole, _) => "queue".to_string(),
        (LoopMode::Off, _) => "off".to_string(),
    };
    let _ = write!(
        out,
        "Loop: {} | Volume: {}% | {} track(s)",
        loop_label,
        snapshot.volume,
        snapshot.songs.len()
    );
    out
}

/// One-line description of a player event, `None` for internal chatter
pub fn describe_event(event: &PlayerEvent) -> Option<String> {
    match event {
        PlayerEvent::TrackStarted {
            title, offset_secs, ..
        } => Some(if *offset_secs > 0.0 {
            format!("> Playing {} from {}", title, timestamp::format(*offset_secs))
        } else {
            format!("> Playing {}", title)
        }),
        PlayerEvent::TrackFailed {
            title,
            message,
            consecutive,
            ..
        } => Some(format!(
            "! Could not play {} ({}), skipping [{} in a row]",
            title, message, consecutive
        )),
        PlayerEvent::SessionHalted { reason, .. } => Some(format!(
            "! Playback halted after repeated failures: {}. Use 'play' to retry.",
            reason
        )),
        PlayerEvent::SessionLost { reason, .. } => {
            Some(format!("! Voice connection lost: {}", reason))
        }
        PlayerEvent::StateChanged {
            state: PlayerState::Idle,
            ..
        } => Some("> Queue finished".to_string()),
        PlayerEvent::StateChanged { .. }
        | PlayerEvent::TrackFinished { .. }
        | PlayerEvent::QueueChanged { .. } => None,
    }
}
