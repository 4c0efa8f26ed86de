use heapless::Vec;

use crate::{Symbol, PATTERN_LEN};

use crate::Symbol::{Long, Short};

/// The only accepted pattern: three long, three short, three long
pub const EXPECTED_PATTERN: [Symbol; PATTERN_LEN] =
    [Long, Long, Long, Short, Short, Short, Long, Long, Long];

/// Symbols recorded so far in the current attempt
#[derive(Clone, Debug, Default)]
pub struct Sequence {
    symbols: Vec<Symbol, PATTERN_LEN>,
}

impl Sequence {
    pub fn new() -> Self {
        Self { symbols: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.symbols.len() == PATTERN_LEN
    }

    /// Append a symbol. Returns false and leaves the buffer untouched when full.
    pub fn push(&mut self, symbol: Symbol) -> bool {
        self.symbols.push(symbol).is_ok()
    }

    pub fn clear(&mut self) {
        self.symbols.clear();
    }

    pub fn as_slice(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Compare against the expected pattern.
    ///
    /// Returns `None` unless exactly `PATTERN_LEN` symbols were recorded.
    pub fn validate(&self) -> Option<Verdict> {
        let entered: [Symbol; PATTERN_LEN] = self.symbols.as_slice().try_into().ok()?;
        Some(Verdict::new(entered))
    }
}

/// Outcome of comparing a complete sequence to the expected pattern
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Verdict {
    pub entered: [Symbol; PATTERN_LEN],
    pub per_position: [bool; PATTERN_LEN],
    pub approved: bool,
}

impl Verdict {
    pub fn new(entered: [Symbol; PATTERN_LEN]) -> Self {
        let mut per_position = [false; PATTERN_LEN];
        for i in 0..PATTERN_LEN {
            per_position[i] = entered[i] == EXPECTED_PATTERN[i];
        }

        Self {
            entered,
            per_position,
            approved: per_position.iter().all(|ok| *ok),
        }
    }

    /// Indices (0-based) that did not match the expected pattern
    pub fn mismatches(&self) -> impl Iterator<Item = usize> + '_ {
        self.per_position
            .iter()
            .enumerate()
            .filter(|(_, ok)| !**ok)
            .map(|(i, _)| i)
    }
}
