//! Answer-letter normalization.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::model::{AnswerSource, ModelAnswer, OptionLetter};

/// Uniform random source for fallback letters.
///
/// Seed it for reproducible runs. The lock is never held across an await.
pub struct FallbackPicker {
    rng: Mutex<StdRng>,
}

impl FallbackPicker {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Draw a letter uniformly from `a..=d`.
    pub fn pick(&self) -> OptionLetter {
        // A poisoned lock still holds a usable RNG.
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        OptionLetter::ALL
            .choose(&mut *rng)
            .copied()
            .unwrap_or(OptionLetter::A)
    }

    /// Normalize a raw answering reply into a letter.
    ///
    /// The first character of the reply must be exactly one of `a b c d`.
    /// Leading whitespace is deliberately skipped first, so `" a"` and
    /// `"\na"` count as `a` rather than falling back. Anything else
    /// (uppercase, an empty reply, prose) gets a random letter marked
    /// [`AnswerSource::Fallback`].
    pub fn normalize(&self, reply: &str) -> ModelAnswer {
        match reply.trim_start().chars().next().and_then(OptionLetter::from_char) {
            Some(letter) => ModelAnswer {
                letter,
                source: AnswerSource::Model,
                reply: reply.to_string(),
            },
            None => {
                let letter = self.pick();
                tracing::debug!(reply, %letter, "reply outside the option alphabet, using fallback letter");
                ModelAnswer {
                    letter,
                    source: AnswerSource::Fallback,
                    reply: reply.to_string(),
                }
            }
        }
    }
}

impl Default for FallbackPicker {
    fn default() -> Self {
        Self::new()
    }
}
