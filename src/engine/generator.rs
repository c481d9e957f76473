//! Sequence generation
//!
//! Each round appends one signal drawn uniformly from the palette,
//! independent of history. The randomness is injected through
//! [`SignalSource`] so tests and replays can script the sequence.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::signal::{Palette, Signal};

/// A source of palette indices.
pub trait SignalSource: Send {
    /// Returns an index in `0..palette_len`. `palette_len` is never zero.
    fn next_index(&mut self, palette_len: usize) -> usize;
}

/// Uniform random indices from a `StdRng`.
#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: StdRng,
}

impl RandomSource {
    /// Seeds from the operating system.
    #[must_use]
    pub fn from_os_rng() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic source for reproducible games.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl SignalSource for RandomSource {
    fn next_index(&mut self, palette_len: usize) -> usize {
        self.rng.random_range(0..palette_len)
    }
}

/// Replays a fixed list of indices, cycling when exhausted.
///
/// Indices beyond the palette wrap around it.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    script: Vec<usize>,
    position: usize,
}

impl ScriptedSource {
    /// Creates a source replaying `script`. An empty script always yields 0.
    #[must_use]
    pub const fn new(script: Vec<usize>) -> Self {
        Self {
            script,
            position: 0,
        }
    }
}

impl SignalSource for ScriptedSource {
    fn next_index(&mut self, palette_len: usize) -> usize {
        if self.script.is_empty() {
            return 0;
        }
        let index = self.script[self.position % self.script.len()];
        self.position = self.position.wrapping_add(1);
        index % palette_len
    }
}

/// Draws signals from a palette using an injected source.
pub struct SequenceGenerator {
    palette: Palette,
    source: Box<dyn SignalSource>,
}

impl SequenceGenerator {
    /// Creates a generator over `palette`.
    #[must_use]
    pub fn new(palette: Palette, source: Box<dyn SignalSource>) -> Self {
        Self { palette, source }
    }

    /// Draws the next signal.
    pub fn next_signal(&mut self) -> Signal {
        let len = self.palette.len();
        let index = self.source.next_index(len) % len;
        Signal::new(index)
    }
}

impl std::fmt::Debug for SequenceGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceGenerator")
            .field("palette", &self.palette)
            .finish_non_exhaustive()
    }
}
