//! Interactive play session.
//!
//! A single driver loop ticks once per second, polls the playback engine,
//! and advances the scheduler when a track ends. Commands typed on stdin
//! arrive over an mpsc channel from a reader thread; the reader never touches
//! the store, so all scheduling stays on the driver thread.

use crate::metadata;
use crate::playback::{PlaybackState, Player};
use crate::scheduler::Scheduler;
use anyhow::Result;
use chrono::Utc;
use log::{info, warn};
use rand::Rng;
use std::io::BufRead;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Poll cadence for playback state and progress reporting.
const TICK: Duration = Duration::from_secs(1);

/// Commands accepted during a play session.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionCommand {
    Pause,
    Skip,
    Like,
    Dislike,
    Seek(u64),
    Volume(u8),
    Quit,
    Unrecognized(String),
}

fn parse_command(line: &str) -> SessionCommand {
    let mut words = line.split_whitespace();
    match words.next() {
        Some("pause") | Some("resume") => SessionCommand::Pause,
        Some("skip") | Some("next") => SessionCommand::Skip,
        Some("like") | Some("+") => SessionCommand::Like,
        Some("dislike") | Some("-") => SessionCommand::Dislike,
        Some("seek") => match words.next().and_then(|arg| arg.parse::<u64>().ok()) {
            Some(seconds) => SessionCommand::Seek(seconds * 1000),
            None => SessionCommand::Unrecognized(line.to_string()),
        },
        Some("vol") | Some("volume") => match words.next().and_then(|arg| arg.parse::<u8>().ok()) {
            Some(percent) => SessionCommand::Volume(percent),
            None => SessionCommand::Unrecognized(line.to_string()),
        },
        Some("stop") | Some("quit") | Some("exit") => SessionCommand::Quit,
        _ => SessionCommand::Unrecognized(line.to_string()),
    }
}

fn format_time(ms: u64) -> String {
    let seconds = ms / 1000;
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Select the next track and hand it to the player. Returns false when the
/// library has nothing to offer.
fn advance_and_load<R: Rng>(
    scheduler: &mut Scheduler,
    player: &mut dyn Player,
    rng: &mut R,
) -> Result<bool> {
    match scheduler.advance(Utc::now(), rng)? {
        Some(selection) => {
            let tags = metadata::read_tags(&selection.path);
            println!("Playing: {} - {}", selection.id, tags.artist);
            player.load(&selection.path)?;
            player.play();
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Run the session until the library empties out or the user quits.
pub fn run_session(scheduler: &mut Scheduler, player: &mut dyn Player) -> Result<()> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            if tx.send(parse_command(line.trim())).is_err() {
                break;
            }
        }
    });

    let mut rng = rand::thread_rng();
    if !advance_and_load(scheduler, player, &mut rng)? {
        println!("Nothing to play.");
        return Ok(());
    }
    println!("Commands: pause, skip, like, dislike, seek <secs>, vol <0-100>, quit");

    loop {
        while let Ok(command) = rx.try_recv() {
            match command {
                SessionCommand::Pause => {
                    if player.is_playing() {
                        player.pause();
                        println!("Paused.");
                    } else {
                        player.resume();
                        println!("Resumed.");
                    }
                }
                SessionCommand::Skip => {
                    if scheduler.track_ended() && !advance_and_load(scheduler, player, &mut rng)? {
                        println!("Nothing left to play.");
                        player.stop();
                        return Ok(());
                    }
                }
                SessionCommand::Like => match scheduler.vote_current(scheduler.config().like_multiplier)? {
                    Some(weight) => println!("Liked. Weight is now {weight:.2}"),
                    None => println!("No active selection."),
                },
                SessionCommand::Dislike => {
                    match scheduler.vote_current(scheduler.config().dislike_multiplier)? {
                        Some(weight) => println!("Disliked. Weight is now {weight:.2}"),
                        None => println!("No active selection."),
                    }
                }
                SessionCommand::Seek(position_ms) => {
                    if let Err(err) = player.seek(position_ms) {
                        warn!("{err}");
                    }
                }
                SessionCommand::Volume(percent) => {
                    player.set_volume(percent);
                    println!("Volume: {}%", player.volume());
                }
                SessionCommand::Quit => {
                    player.stop();
                    scheduler.stop();
                    info!("Session ended by user");
                    return Ok(());
                }
                SessionCommand::Unrecognized(line) => {
                    println!("Unrecognized command '{line}'. Try 'pause', 'skip', or 'quit'.");
                }
            }
        }

        match player.state() {
            PlaybackState::Ended => {
                // The debounce guard swallows duplicate end-of-track polls.
                if scheduler.track_ended() && !advance_and_load(scheduler, player, &mut rng)? {
                    println!("Nothing left to play.");
                    return Ok(());
                }
            }
            PlaybackState::Playing => {
                let elapsed = format_time(player.elapsed_ms());
                // Duration can lag the load; show a placeholder until known.
                let total = player
                    .total_duration_ms()
                    .map(format_time)
                    .unwrap_or_else(|| "-:--".to_string());
                print!("\r{elapsed} / {total}  ");
                use std::io::Write;
                let _ = std::io::stdout().flush();
            }
            PlaybackState::Paused | PlaybackState::Stopped => {}
        }

        thread::sleep(TICK);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_parse_with_aliases() {
        assert_eq!(parse_command("pause"), SessionCommand::Pause);
        assert_eq!(parse_command("resume"), SessionCommand::Pause);
        assert_eq!(parse_command("skip"), SessionCommand::Skip);
        assert_eq!(parse_command("+"), SessionCommand::Like);
        assert_eq!(parse_command("-"), SessionCommand::Dislike);
        assert_eq!(parse_command("seek 90"), SessionCommand::Seek(90_000));
        assert_eq!(parse_command("vol 80"), SessionCommand::Volume(80));
        assert_eq!(parse_command("quit"), SessionCommand::Quit);
        assert_eq!(
            parse_command("blah"),
            SessionCommand::Unrecognized("blah".to_string())
        );
        assert_eq!(
            parse_command("seek soon"),
            SessionCommand::Unrecognized("seek soon".to_string())
        );
    }

    #[test]
    fn time_formatting_matches_m_ss() {
        assert_eq!(format_time(0), "0:00");
        assert_eq!(format_time(59_000), "0:59");
        assert_eq!(format_time(61_500), "1:01");
        assert_eq!(format_time(600_000), "10:00");
    }
}
