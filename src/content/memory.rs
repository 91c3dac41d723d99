use super::{ContentError, ContentProvider, ContentResult};
use crate::types::{Category, Prompt};
use async_trait::async_trait;
use std::collections::HashMap;

/// Content held in memory, keyed by category and language
#[derive(Debug, Clone, Default)]
pub struct StaticContentProvider {
    categories: Vec<Category>,
    prompts: HashMap<(String, String), Vec<Prompt>>,
}

impl StaticContentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_category(&mut self, id: &str, emoji: &str, names: &[(&str, &str)]) {
        self.categories.push(Category {
            id: id.to_string(),
            name: names
                .iter()
                .map(|(lang, name)| (lang.to_string(), name.to_string()))
                .collect(),
            emoji: emoji.to_string(),
        });
    }

    /// Append prompts for a category in one language. Ids are numbered per
    /// category and language in insertion order.
    pub fn add_prompts(&mut self, category_id: &str, language: &str, texts: &[&str]) {
        let entry = self
            .prompts
            .entry((category_id.to_string(), language.to_string()))
            .or_default();
        let offset = entry.len();
        entry.extend(texts.iter().enumerate().map(|(i, text)| Prompt {
            id: format!("{}-{}", category_id, offset + i + 1),
            category_id: category_id.to_string(),
            text: text.to_string(),
        }));
    }

    /// A small English/German catalog for demos and local play
    pub fn sample() -> Self {
        let mut p = Self::new();
        p.add_category("everyday", "☕", &[("en", "Everyday life"), ("de", "Alltag")]);
        p.add_category("party", "🎉", &[("en", "Party"), ("de", "Party")]);
        p.add_category("adventure", "🧭", &[("en", "Adventure"), ("de", "Abenteuer")]);

        p.add_prompts(
            "everyday",
            "en",
            &[
                "Who would most likely forget their own birthday?",
                "Who would most likely reply to a message three weeks late?",
                "Who would most likely own twenty houseplants?",
            ],
        );
        p.add_prompts(
            "everyday",
            "de",
            &[
                "Wer würde am ehesten den eigenen Geburtstag vergessen?",
                "Wer würde am ehesten drei Wochen später auf eine Nachricht antworten?",
                "Wer würde am ehesten zwanzig Zimmerpflanzen besitzen?",
            ],
        );
        p.add_prompts(
            "party",
            "en",
            &[
                "Who would most likely start a karaoke session?",
                "Who would most likely be the last one to leave?",
                "Who would most likely befriend the host's cat?",
            ],
        );
        p.add_prompts(
            "party",
            "de",
            &[
                "Wer würde am ehesten eine Karaoke-Runde starten?",
                "Wer würde am ehesten als Letztes gehen?",
                "Wer würde sich am ehesten mit der Katze der Gastgeber anfreunden?",
            ],
        );
        p.add_prompts(
            "adventure",
            "en",
            &[
                "Who would most likely survive a week in the wilderness?",
                "Who would most likely get lost with a map in hand?",
                "Who would most likely book a one-way ticket on a whim?",
            ],
        );
        p
    }
}

#[async_trait]
impl ContentProvider for StaticContentProvider {
    async fn list_categories(&self, _language: &str) -> ContentResult<Vec<Category>> {
        Ok(self.categories.clone())
    }

    async fn list_prompts(&self, category_id: &str, language: &str) -> ContentResult<Vec<Prompt>> {
        if !self.categories.iter().any(|c| c.id == category_id) {
            return Err(ContentError::NotFound(format!("category {}", category_id)));
        }
        Ok(self
            .prompts
            .get(&(category_id.to_string(), language.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_category_is_not_found() {
        let p = StaticContentProvider::sample();
        let result = p.list_prompts("nope", "en").await;
        assert!(matches!(result, Err(ContentError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_prompt_ids_continue_numbering() {
        let mut p = StaticContentProvider::new();
        p.add_category("c", "", &[]);
        p.add_prompts("c", "en", &["a"]);
        p.add_prompts("c", "en", &["b"]);

        let prompts = p.list_prompts("c", "en").await.unwrap();
        let ids: Vec<_> = prompts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["c-1", "c-2"]);
    }
}
