//! `play` command: an interactive game on stdin/stdout.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::cli::args::PlayArgs;
use crate::cli::terminal::{Terminal, format_leaderboard};
use crate::engine::{GameEngine, Palette, RandomSource, Signal, StartOutcome};
use crate::error::SimonError;
use crate::identity::SessionIdentity;
use crate::observability::{EventEmitter, init_metrics};
use crate::ports::{IdentityPort, Ports};
use crate::scores::JsonFileStore;

use super::{load_config, scores_path};

/// One line of player input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// One or more signals, in order.
    Signals(Vec<Signal>),
    /// Replay the sequence.
    Repeat,
    /// Abandon the game and return to idle.
    Reset,
    /// Reset and start a new game.
    New,
    /// Show the leaderboard.
    Scores,
    /// Show the command list.
    Help,
    /// Leave.
    Quit,
    /// Blank line.
    Empty,
    /// Anything else.
    Unknown(String),
}

/// Parses a line of input. Words are matched before signal names, and a
/// line of whitespace-separated signals submits each in turn.
#[must_use]
pub fn parse_command(line: &str, palette: &Palette) -> Command {
    let trimmed = line.trim();
    match trimmed.to_lowercase().as_str() {
        "" => return Command::Empty,
        "repeat" => return Command::Repeat,
        "reset" => return Command::Reset,
        "new" | "restart" => return Command::New,
        "scores" => return Command::Scores,
        "help" | "?" => return Command::Help,
        "quit" | "exit" => return Command::Quit,
        _ => {}
    }

    trimmed
        .split_whitespace()
        .map(|word| palette.parse(word))
        .collect::<Option<Vec<_>>>()
        .map_or_else(|| Command::Unknown(trimmed.to_string()), Command::Signals)
}

fn help_text(palette: &Palette) -> String {
    let names: Vec<&str> = palette.signals().map(|s| palette.name(s)).collect();
    format!(
        "Signals: {} (names, prefixes or 1-{}; several per line allowed)\n\
         Commands: repeat, reset, new, scores, help, quit",
        names.join(", "),
        palette.len()
    )
}

/// Runs an interactive game.
///
/// # Errors
///
/// Returns an error if the configuration, event file or metrics
/// endpoint cannot be set up, or if reading stdin fails.
pub async fn run(args: &PlayArgs) -> Result<(), SimonError> {
    let config = load_config(args.config.as_deref())?;

    if let Some(port) = args.metrics_port {
        init_metrics(Some(port))?;
    }
    let events = match &args.events_file {
        Some(path) => EventEmitter::from_file(path)?,
        None => EventEmitter::noop(),
    };

    let palette = Palette::new(config.palette.clone())?;
    let terminal = Arc::new(Terminal::stdout(palette, args.bell));
    let max_chars = config.scores.nickname_max_chars;
    let identity = Arc::new(
        args.nickname
            .as_deref()
            .map_or_else(|| SessionIdentity::new(max_chars), |n| {
                SessionIdentity::with_nickname(n, max_chars)
            }),
    );
    let store = JsonFileStore::new(scores_path(args.scores.as_deref()));
    tracing::debug!(scores = %store.path().display(), "using score file");

    let events = Arc::new(events);
    let mut builder = GameEngine::builder(config)
        .ports(Ports::from_shared(terminal.clone(), identity.clone()))
        .persistence(Arc::new(store))
        .events(events.clone());
    if let Some(seed) = args.seed {
        builder = builder.source(RandomSource::seeded(seed));
    }
    let engine = builder.build()?;

    let stdin = BufReader::new(tokio::io::stdin());
    run_session(&engine, &terminal, identity.as_ref(), stdin).await?;
    tracing::debug!(events = events.event_count(), "session finished");
    Ok(())
}

/// Drives `engine` from `input` until `quit` or end of input. A game
/// still in flight at the end is recorded as a loss.
///
/// # Errors
///
/// Returns an I/O error if reading `input` fails.
pub async fn run_session<R>(
    engine: &GameEngine,
    terminal: &Terminal,
    identity: &dyn IdentityPort,
    input: R,
) -> Result<(), SimonError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    terminal.say(&help_text(engine.palette()));

    if !ask_nickname(terminal, identity, &mut lines).await? {
        return Ok(());
    }
    announce_start(terminal, engine.start());

    while let Some(line) = lines.next_line().await? {
        match parse_command(&line, engine.palette()) {
            Command::Signals(signals) => {
                for signal in signals {
                    let verdict = engine.submit(signal);
                    if !verdict.was_evaluated() {
                        tracing::debug!(?verdict, "input ignored, dropping rest of line");
                        break;
                    }
                }
            }
            Command::Repeat => {
                if !engine.repeat_sequence() {
                    terminal.say("No repeat available.");
                }
            }
            Command::Reset => {
                if engine.reset() {
                    terminal.say("Game reset. Type `new` to start.");
                }
            }
            Command::New => announce_start(terminal, engine.restart()),
            Command::Scores => {
                for row in format_leaderboard(&engine.leaderboard()) {
                    terminal.say(&row);
                }
            }
            Command::Help => terminal.say(&help_text(engine.palette())),
            Command::Quit => break,
            Command::Empty => {}
            Command::Unknown(text) => terminal.say(&format!("Unknown input: {text}")),
        }
    }

    if let Some(summary) = engine.force_game_over() {
        tracing::info!(level = summary.level, "game abandoned");
    }
    Ok(())
}

/// Prompts until a nickname is accepted. Returns `false` at end of input.
async fn ask_nickname<R>(
    terminal: &Terminal,
    identity: &dyn IdentityPort,
    lines: &mut tokio::io::Lines<R>,
) -> Result<bool, SimonError>
where
    R: AsyncBufRead + Unpin,
{
    while identity.nickname().is_none() {
        terminal.say("Nickname:");
        let Some(line) = lines.next_line().await? else {
            return Ok(false);
        };
        if identity.set_nickname(&line).is_none() {
            terminal.say("A nickname cannot be blank.");
        }
    }
    Ok(true)
}

fn announce_start(terminal: &Terminal, outcome: StartOutcome) {
    match outcome {
        StartOutcome::Started => {}
        StartOutcome::NicknameRequired => terminal.say("Set a nickname first."),
        StartOutcome::AlreadyRunning => terminal.say("A game is already running."),
        StartOutcome::ResetRequired => terminal.say("Type `new` to play again."),
    }
}
