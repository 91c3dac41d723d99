use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Once played texts cover more than this share of the corpus, history is
/// cleared before the next round is built.
const RESET_NUMERATOR: usize = 2;
const RESET_DENOMINATOR: usize = 3;

/// Prompt texts that appeared in completed rounds.
///
/// Texts rather than ids: the same prompt may be re-keyed between content
/// releases but keeps its wording.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct PlayedHistory {
    texts: BTreeSet<String>,
}

impl PlayedHistory {
    pub fn contains(&self, text: &str) -> bool {
        self.texts.contains(text)
    }

    pub fn record<'a>(&mut self, texts: impl IntoIterator<Item = &'a str>) {
        self.texts.extend(texts.into_iter().map(str::to_string));
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    pub fn clear(&mut self) {
        self.texts.clear();
    }

    /// How many corpus texts have already been played
    pub fn covered(&self, corpus: &HashSet<&str>) -> usize {
        corpus.iter().filter(|text| self.contains(text)).count()
    }

    /// True when the played share of the corpus is above the reset threshold
    pub fn should_reset(&self, corpus: &HashSet<&str>) -> bool {
        let covered = self.covered(corpus);
        covered > 0 && covered * RESET_DENOMINATOR > corpus.len() * RESET_NUMERATOR
    }
}
