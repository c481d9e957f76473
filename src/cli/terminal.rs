//! Line-oriented terminal adapter.
//!
//! Implements the engine's output ports by printing one line per event.
//! A highlight prints the signal name; clearing it prints nothing.

use std::io::Write;
use std::sync::{Mutex, PoisonError};

use crate::engine::signal::{Palette, Signal};
use crate::engine::state::GameSummary;
use crate::ports::{AudioPort, MessageKind, MessagePort, OverlayPort, RendererPort};
use crate::scores::ScoreRecord;

/// Title and detail lines of the end-of-game overlay.
#[must_use]
pub fn game_end_text(summary: &GameSummary) -> (&'static str, String) {
    if summary.won {
        ("Congratulations, you're a robot!", "Thank you for playing!".to_string())
    } else if summary.idle_script_triggered {
        ("...?", format!("Your Score: {}", summary.level))
    } else {
        ("Game Over!", format!("Your Score: {}", summary.level))
    }
}

/// Renders a leaderboard as numbered lines.
#[must_use]
pub fn format_leaderboard(records: &[ScoreRecord]) -> Vec<String> {
    if records.is_empty() {
        return vec!["No scores yet.".to_string()];
    }
    records
        .iter()
        .enumerate()
        .map(|(i, r)| {
            format!(
                "{:>2}. {:<10}  level {:>3}  {}",
                i + 1,
                r.nickname,
                r.level,
                r.timestamp.format("%Y-%m-%d %H:%M")
            )
        })
        .collect()
}

/// Terminal implementation of the output ports.
pub struct Terminal {
    palette: Palette,
    bell: bool,
    out: Mutex<Box<dyn Write + Send>>,
}

impl std::fmt::Debug for Terminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Terminal")
            .field("palette", &self.palette)
            .field("bell", &self.bell)
            .finish_non_exhaustive()
    }
}

impl Terminal {
    /// Creates a terminal writing to `out`.
    #[must_use]
    pub fn new(palette: Palette, bell: bool, out: Box<dyn Write + Send>) -> Self {
        Self {
            palette,
            bell,
            out: Mutex::new(out),
        }
    }

    /// Creates a terminal writing to stdout.
    #[must_use]
    pub fn stdout(palette: Palette, bell: bool) -> Self {
        Self::new(palette, bell, Box::new(std::io::stdout()))
    }

    /// Prints one line. Write failures are ignored.
    pub fn say(&self, line: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writeln!(out, "{line}");
        let _ = out.flush();
    }

    fn raw(&self, text: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = write!(out, "{text}");
        let _ = out.flush();
    }
}

impl RendererPort for Terminal {
    fn highlight(&self, signal: Signal) {
        self.say(&format!("  * {}", self.palette.name(signal).to_uppercase()));
    }

    fn clear_highlight(&self, _signal: Signal) {}

    fn set_interactive(&self, interactive: bool) {
        if interactive {
            self.raw("> ");
        }
    }
}

impl AudioPort for Terminal {
    fn play(&self, _signal: Signal) {
        if self.bell {
            self.raw("\x07");
        }
    }
}

impl MessagePort for Terminal {
    fn show(&self, text: &str, kind: MessageKind) {
        match kind {
            MessageKind::Idle if text.is_empty() => {}
            MessageKind::Idle => self.say(&format!("simon: {text}")),
            MessageKind::Info | MessageKind::Correct | MessageKind::Incorrect => self.say(text),
        }
    }

    fn clear(&self) {}
}

impl OverlayPort for Terminal {
    fn show_game_end(&self, summary: &GameSummary) {
        let (title, detail) = game_end_text(summary);
        self.say("");
        self.say(title);
        self.say(&detail);
        self.say("Type `new` to play again or `quit` to leave.");
    }

    fn hide(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Capture {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn terminal(bell: bool) -> (Terminal, Capture) {
        let capture = Capture::default();
        let palette = Palette::new(vec!["red".into(), "green".into()]).unwrap();
        (
            Terminal::new(palette, bell, Box::new(capture.clone())),
            capture,
        )
    }

    #[test]
    fn test_highlight_prints_name() {
        let (term, out) = terminal(false);
        term.highlight(Signal::new(1));
        term.clear_highlight(Signal::new(1));
        assert_eq!(out.text(), "  * GREEN\n");
    }

    #[test]
    fn test_bell_only_when_enabled() {
        let (quiet, quiet_out) = terminal(false);
        quiet.play(Signal::new(0));
        assert!(quiet_out.text().is_empty());

        let (loud, loud_out) = terminal(true);
        loud.play(Signal::new(0));
        assert_eq!(loud_out.text(), "\x07");
    }

    #[test]
    fn test_blank_idle_line_is_skipped() {
        let (term, out) = terminal(false);
        term.show("", MessageKind::Idle);
        term.show("Yawn...", MessageKind::Idle);
        assert_eq!(out.text(), "simon: Yawn...\n");
    }

    #[test]
    fn test_game_end_titles() {
        let mut summary = GameSummary {
            won: true,
            level: 50,
            idle_script_triggered: false,
        };
        assert_eq!(game_end_text(&summary).0, "Congratulations, you're a robot!");

        summary.won = false;
        summary.level = 4;
        assert_eq!(
            game_end_text(&summary),
            ("Game Over!", "Your Score: 4".to_string())
        );

        summary.idle_script_triggered = true;
        assert_eq!(game_end_text(&summary).0, "...?");
    }

    #[test]
    fn test_format_leaderboard() {
        assert_eq!(format_leaderboard(&[]), vec!["No scores yet."]);
        let lines = format_leaderboard(&[ScoreRecord::now(7, "ada")]);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with(" 1. ada"));
        assert!(lines[0].contains("level   7"));
    }
}
