//! Signals and the palette they are drawn from.

use std::fmt;

use serde::Serialize;

use crate::error::EngineError;

/// One member of the palette, identified by its palette index.
///
/// Two signals are equal exactly when they name the same palette member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Signal(usize);

impl Signal {
    /// Creates a signal for the given palette index.
    ///
    /// The index is not checked against any palette; use
    /// [`Palette::get`] when the index comes from outside.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the palette index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The fixed, ordered set of signal names a game is played with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    names: Vec<String>,
}

impl Palette {
    /// Builds a palette from signal names.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::EmptyPalette`] when `names` is empty.
    pub fn new(names: Vec<String>) -> Result<Self, EngineError> {
        if names.is_empty() {
            return Err(EngineError::EmptyPalette);
        }
        Ok(Self { names })
    }

    /// Number of signals in the palette.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always `false`; a palette cannot be built empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns the signal at `index`, if the palette has one.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Signal> {
        (index < self.names.len()).then_some(Signal(index))
    }

    /// Returns whether `signal` belongs to this palette.
    #[must_use]
    pub fn contains(&self, signal: Signal) -> bool {
        signal.0 < self.names.len()
    }

    /// Returns the display name of `signal`, or `"?"` for foreign signals.
    #[must_use]
    pub fn name(&self, signal: Signal) -> &str {
        self.names.get(signal.0).map_or("?", String::as_str)
    }

    /// Iterates over every signal in palette order.
    pub fn signals(&self) -> impl Iterator<Item = Signal> + '_ {
        (0..self.names.len()).map(Signal)
    }

    /// Resolves player input to a signal.
    ///
    /// Accepts a full name (case-insensitive), a 1-based position, or an
    /// unambiguous name prefix such as `r` for `red`.
    #[must_use]
    pub fn parse(&self, input: &str) -> Option<Signal> {
        let needle = input.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        if let Some(i) = self.names.iter().position(|n| n.to_lowercase() == needle) {
            return Some(Signal(i));
        }

        if let Ok(position) = needle.parse::<usize>() {
            return position.checked_sub(1).and_then(|i| self.get(i));
        }

        let mut matches = self
            .names
            .iter()
            .enumerate()
            .filter(|(_, n)| n.to_lowercase().starts_with(&needle));
        match (matches.next(), matches.next()) {
            (Some((i, _)), None) => Some(Signal(i)),
            _ => None,
        }
    }
}
