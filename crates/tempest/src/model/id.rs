//! Session-scoped record identifiers.
//!
//! An identifier is a plain string that starts with the configured ID
//! indicator. It names a record when used as a field name and points at that
//! record when used as a field value.

use rustc_hash::FxHashSet;
use uuid::Uuid;

use crate::config::IdStrategy;

/// Produces identifiers that are unique for the lifetime of one generator.
///
/// Each [`Encoder`](crate::codec::Encoder) owns its generator, so two
/// concurrent sessions never share counter state.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    indicator: String,
    strategy: IdStrategy,
    next: u64,
    issued: FxHashSet<String>,
}

impl IdGenerator {
    /// Creates a sequential generator for the given indicator.
    pub fn new(indicator: impl Into<String>) -> Self {
        Self::with_strategy(indicator, IdStrategy::Sequential)
    }

    /// Creates a generator with an explicit suffix strategy.
    pub fn with_strategy(indicator: impl Into<String>, strategy: IdStrategy) -> Self {
        Self {
            indicator: indicator.into(),
            strategy,
            next: 0,
            issued: FxHashSet::default(),
        }
    }

    /// Number of identifiers issued so far.
    pub fn issued(&self) -> u64 {
        self.next
    }

    /// Returns a fresh identifier.
    pub fn next_id(&mut self) -> String {
        let id = match self.strategy {
            // The counter alone guarantees uniqueness.
            IdStrategy::Sequential => format!("{}{}", self.indicator, self.next),
            IdStrategy::Random => loop {
                let candidate = format!("{}{}", self.indicator, Uuid::new_v4().simple());
                if self.issued.insert(candidate.clone()) {
                    break candidate;
                }
            },
        };
        self.next += 1;
        id
    }
}

impl Iterator for IdGenerator {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        Some(self.next_id())
    }
}
