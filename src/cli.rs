//! # Command-Line Interface Module
//!
//! Defines the command-line surface for Encore using Clap derive macros.
//! Parsing is fully type-safe; each subcommand carries its own arguments.
//!
//! ## Commands
//!
//! - `add`: Register one or more audio files with the scheduler
//! - `add-dir`: Register every supported audio file in a directory
//! - `remove`: Drop a track from the library
//! - `list`: Show all tracks with their weights and current scores
//! - `play`: Start an interactive play session
//! - `next`: Print a single selection without playing it
//! - `reset`: Return every preference weight to neutral
//! - `prune`: Remove entries whose files no longer exist
//! - `completion`: Generate shell completion scripts
//!
//! ## Examples
//!
//! ```bash
//! encore add ~/Music/favourite.mp3
//! encore add-dir ~/Music
//! encore play
//! ```

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Main application arguments structure.
///
/// Contains only a subcommand; all functionality is reached through
/// specific commands.
#[derive(Parser)]
#[command(name = "encore")]
#[command(about = "Encore - adaptive track scheduling for local music")]
#[command(version)]
pub struct Args {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Enumeration of all available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Register audio files with the scheduler
    ///
    /// Each path is stored in absolute form. Files already known to the
    /// library are left untouched, so re-adding is always safe.
    ///
    /// Supported formats: MP3, FLAC, OGG, M4A, WAV
    Add {
        /// Paths of the audio files to register
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Register every supported audio file in a directory
    ///
    /// Scans the given directory (not subdirectories) and registers each
    /// audio file found. Unsupported file types are skipped silently.
    AddDir {
        /// Directory to scan for audio files
        path: PathBuf,
    },

    /// Remove a track from the library
    ///
    /// The track identifier is its file name as shown by `list`. Removing
    /// a track forgets its preference weight and play history.
    Remove {
        /// Identifier of the track to remove
        id: String,
    },

    /// List all tracks with their weights and scores
    ///
    /// Shows each track's preference weight, hours since it last played,
    /// and the score the scheduler would use right now. Listing never
    /// mutates stored weights.
    List,

    /// Start an interactive play session
    ///
    /// Selects tracks one after another, playing each through the default
    /// audio output. Type `like`, `dislike`, `skip`, `pause`, `seek <secs>`,
    /// `vol <0-100>`, or `quit` while playing.
    Play,

    /// Print the next selection without playing it
    ///
    /// Runs one full scheduling pass (decay, scoring, weighted draw) and
    /// prints the chosen track. The track is marked as played.
    Next,

    /// Reset every preference weight to neutral
    ///
    /// Sets all vote weights back to 1.0. Play history and the track list
    /// itself are kept.
    Reset,

    /// Remove entries whose files no longer exist
    ///
    /// Checks every stored path and drops entries that point at missing
    /// files. Useful after reorganizing a music collection.
    Prune,

    /// Generate shell completions
    ///
    /// Usage: encore completion bash > ~/.local/share/bash-completion/completions/encore
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },
}
