//! Engine configuration
//!
//! Built once at start-up and passed to [`MutationEngine`](crate::MutationEngine).

use crate::sequence::SequenceRule;
use docsync_core::DocPath;

/// Default sequence rule: appends to `weeks` are numbered by `weekNumber`
pub const DEFAULT_SEQUENCE_PATH: &str = "weeks";
/// Field assigned by the default sequence rule
pub const DEFAULT_SEQUENCE_FIELD: &str = "weekNumber";

/// Mutation engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Server-computed sequence fields, first match wins
    pub sequences: Vec<SequenceRule>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sequences: vec![SequenceRule::new(
                DocPath::root().key(DEFAULT_SEQUENCE_PATH),
                DEFAULT_SEQUENCE_FIELD,
            )],
        }
    }
}

impl EngineConfig {
    /// Configuration with no sequence rules
    pub fn without_sequences() -> Self {
        Self {
            sequences: Vec::new(),
        }
    }

    /// Replace the sequence rules
    pub fn with_sequences(mut self, sequences: Vec<SequenceRule>) -> Self {
        self.sequences = sequences;
        self
    }

    /// Add a sequence rule
    pub fn with_sequence(mut self, rule: SequenceRule) -> Self {
        self.sequences.push(rule);
        self
    }

    /// First rule covering `path`
    pub fn sequence_for(&self, path: &DocPath) -> Option<&SequenceRule> {
        self.sequences.iter().find(|rule| rule.matches(path))
    }
}
