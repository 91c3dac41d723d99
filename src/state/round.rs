use crate::types::{Category, Prompt};

/// Output of the round builder: shuffled prompts plus the categories used
#[derive(Debug, Clone)]
pub struct RoundPlan {
    pub prompts: Vec<Prompt>,
    pub categories: Vec<Category>,
}

impl RoundPlan {
    pub fn category_ids(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.id.clone()).collect()
    }
}

/// Ordered prompts for one play-through with a cursor into them.
///
/// Never empty, and `cursor < prompts.len()` always holds. A round is replaced
/// wholesale for each game; only the cursor moves.
#[derive(Debug, Clone)]
pub struct Round {
    prompts: Vec<Prompt>,
    categories: Vec<Category>,
    cursor: usize,
}

impl Round {
    /// Returns `None` for an empty plan
    pub fn new(plan: RoundPlan) -> Option<Self> {
        if plan.prompts.is_empty() {
            return None;
        }
        Some(Self {
            prompts: plan.prompts,
            categories: plan.categories,
            cursor: 0,
        })
    }

    pub fn current(&self) -> &Prompt {
        &self.prompts[self.cursor]
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_last(&self) -> bool {
        self.cursor + 1 == self.prompts.len()
    }

    pub fn prompts(&self) -> &[Prompt] {
        &self.prompts
    }

    /// Categories resolved at build time, so display names survive a
    /// language change mid-round
    pub fn category_of(&self, prompt: &Prompt) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == prompt.category_id)
    }

    /// Move to the next prompt; false when already on the last one
    pub fn advance(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// Move to the previous prompt; false when already on the first one
    pub fn back(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }
}
