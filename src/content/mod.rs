pub mod fallback;
mod fs;
mod memory;

use crate::types::{Category, CategoryId, Prompt};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

pub use fs::FsContentProvider;
pub use memory::StaticContentProvider;

/// Result type for content operations
pub type ContentResult<T> = Result<T, ContentError>;

/// Errors a content provider can report; each call may fail independently
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("content not found: {0}")]
    NotFound(String),

    #[error("failed to read content: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse content: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("fetch failed: {0}")]
    Fetch(String),
}

/// External source of categories and localized prompt text
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// List every category known in the given language
    async fn list_categories(&self, language: &str) -> ContentResult<Vec<Category>>;

    /// List the prompts of one category, localized for the given language
    async fn list_prompts(&self, category_id: &str, language: &str) -> ContentResult<Vec<Prompt>>;

    /// Get the name of this provider
    fn name(&self) -> &str;
}

/// Categories plus their prompts, loaded for a single language
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub language: String,
    categories: Vec<Category>,
    prompts: HashMap<CategoryId, Vec<Prompt>>,
}

impl Catalog {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            ..Self::default()
        }
    }

    /// Add a category with its prompts. Later duplicates of a category id or
    /// of a prompt id within the category are dropped.
    pub fn insert(&mut self, category: Category, prompts: Vec<Prompt>) {
        if self.prompts.contains_key(&category.id) {
            tracing::warn!("Duplicate category {} ignored", category.id);
            return;
        }

        let mut seen = HashSet::new();
        let prompts: Vec<Prompt> = prompts
            .into_iter()
            .filter(|p| seen.insert(p.id.clone()))
            .map(|p| Prompt {
                category_id: category.id.clone(),
                ..p
            })
            .collect();

        self.prompts.insert(category.id.clone(), prompts);
        self.categories.push(category);
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn prompts(&self, category_id: &str) -> &[Prompt] {
        self.prompts
            .get(category_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Categories that can contribute at least one prompt
    pub fn eligible_categories(&self) -> impl Iterator<Item = &Category> {
        self.categories
            .iter()
            .filter(|c| !self.prompts(&c.id).is_empty())
    }

    /// Distinct prompt texts across the whole catalog
    pub fn corpus_texts(&self) -> HashSet<&str> {
        self.prompts
            .values()
            .flatten()
            .map(|p| p.text.as_str())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.eligible_categories().next().is_none()
    }
}

/// Fetch one category's prompts, falling back to the fallback language when the
/// requested language fails or is empty
async fn load_category_prompts(
    provider: &dyn ContentProvider,
    category_id: &str,
    language: &str,
    fallback_language: &str,
) -> ContentResult<Vec<Prompt>> {
    let primary = provider.list_prompts(category_id, language).await;
    if language == fallback_language {
        return primary;
    }

    match primary {
        Ok(prompts) if !prompts.is_empty() => Ok(prompts),
        Ok(_) => {
            tracing::info!(
                "Category {} has no {} prompts, trying {}",
                category_id,
                language,
                fallback_language
            );
            provider.list_prompts(category_id, fallback_language).await
        }
        Err(e) => {
            tracing::warn!(
                "Failed to load {} prompts for {}: {}, trying {}",
                language,
                category_id,
                e,
                fallback_language
            );
            provider.list_prompts(category_id, fallback_language).await
        }
    }
}

/// Build a catalog for `language`, excluding whatever could not be fetched.
///
/// Never fails: an empty catalog is returned when nothing loads, and the round
/// builder turns that into `NoContentAvailable`.
pub async fn load_catalog(
    provider: &dyn ContentProvider,
    language: &str,
    fallback_language: &str,
) -> Catalog {
    let mut catalog = Catalog::new(language);

    let categories = match provider.list_categories(language).await {
        Ok(categories) => categories,
        Err(e) if language != fallback_language => {
            tracing::warn!(
                "Provider {} failed to list {} categories: {}, trying {}",
                provider.name(),
                language,
                e,
                fallback_language
            );
            match provider.list_categories(fallback_language).await {
                Ok(categories) => categories,
                Err(e) => {
                    tracing::error!("Provider {} has no categories: {}", provider.name(), e);
                    return catalog;
                }
            }
        }
        Err(e) => {
            tracing::error!("Provider {} has no categories: {}", provider.name(), e);
            return catalog;
        }
    };

    let tasks = categories.iter().map(|category| {
        load_category_prompts(provider, &category.id, language, fallback_language)
    });
    let results = futures::future::join_all(tasks).await;

    let mut excluded = 0;
    for (category, result) in categories.into_iter().zip(results) {
        match result {
            Ok(prompts) => catalog.insert(category, prompts),
            Err(e) => {
                excluded += 1;
                let err = crate::error::GameError::ContentUnavailable(format!(
                    "category {}: {}",
                    category.id, e
                ));
                tracing::warn!("Excluding category: {}", err);
            }
        }
    }

    tracing::info!(
        "Loaded {} catalog from {}: {} categories ({} excluded)",
        language,
        provider.name(),
        catalog.categories().len(),
        excluded
    );
    catalog
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Provider serving a fixed set, with per-call failures
    struct FlakyProvider {
        inner: StaticContentProvider,
        failing: HashSet<(String, String)>,
        categories_fail_for: HashSet<String>,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ContentProvider for FlakyProvider {
        async fn list_categories(&self, language: &str) -> ContentResult<Vec<Category>> {
            if self.categories_fail_for.contains(language) {
                return Err(ContentError::Fetch("categories offline".to_string()));
            }
            self.inner.list_categories(language).await
        }

        async fn list_prompts(
            &self,
            category_id: &str,
            language: &str,
        ) -> ContentResult<Vec<Prompt>> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("{}:{}", category_id, language));
            if self
                .failing
                .contains(&(category_id.to_string(), language.to_string()))
            {
                return Err(ContentError::Fetch("timeout".to_string()));
            }
            self.inner.list_prompts(category_id, language).await
        }

        fn name(&self) -> &str {
            "flaky"
        }
    }

    fn provider() -> StaticContentProvider {
        let mut p = StaticContentProvider::new();
        p.add_category("animals", "🐶", &[("en", "Animals"), ("de", "Tiere")]);
        p.add_category("food", "🍕", &[("en", "Food")]);
        p.add_prompts("animals", "en", &["... adopt ten cats?", "... ride a horse?"]);
        p.add_prompts("animals", "de", &["... zehn Katzen adoptieren?"]);
        p.add_prompts("food", "en", &["... eat pizza for breakfast?"]);
        p
    }

    fn flaky(failing: &[(&str, &str)]) -> FlakyProvider {
        FlakyProvider {
            inner: provider(),
            failing: failing
                .iter()
                .map(|(c, l)| (c.to_string(), l.to_string()))
                .collect(),
            categories_fail_for: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    #[tokio::test]
    async fn test_load_catalog_in_requested_language() {
        let catalog = load_catalog(&provider(), "en", "en").await;
        assert_eq!(catalog.categories().len(), 2);
        assert_eq!(catalog.prompts("animals").len(), 2);
        assert_eq!(catalog.corpus_texts().len(), 3);
    }

    #[tokio::test]
    async fn test_missing_language_falls_back_per_category() {
        let catalog = load_catalog(&provider(), "de", "en").await;

        // animals exists in German, food only in English
        assert_eq!(catalog.prompts("animals").len(), 1);
        assert_eq!(catalog.prompts("food")[0].text, "... eat pizza for breakfast?");
        assert_eq!(catalog.language, "de");
    }

    #[tokio::test]
    async fn test_failed_category_is_excluded() {
        let p = flaky(&[("food", "en")]);
        let catalog = load_catalog(&p, "en", "en").await;

        assert!(catalog.category("food").is_none());
        assert_eq!(catalog.eligible_categories().count(), 1);
    }

    #[tokio::test]
    async fn test_failed_language_retries_fallback() {
        let p = flaky(&[("animals", "de")]);
        let catalog = load_catalog(&p, "de", "en").await;

        assert_eq!(catalog.prompts("animals").len(), 2);
        let calls = p.calls.lock().unwrap();
        assert!(calls.contains(&"animals:en".to_string()));
    }

    #[tokio::test]
    async fn test_category_listing_falls_back() {
        let mut p = flaky(&[]);
        p.categories_fail_for.insert("fr".to_string());
        let catalog = load_catalog(&p, "fr", "en").await;
        assert_eq!(catalog.categories().len(), 2);

        p.categories_fail_for.insert("en".to_string());
        let catalog = load_catalog(&p, "fr", "en").await;
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_insert_drops_duplicate_prompt_ids() {
        let mut catalog = Catalog::new("en");
        let category = Category {
            id: "c".to_string(),
            name: HashMap::new(),
            emoji: String::new(),
        };
        let prompt = |id: &str, text: &str| Prompt {
            id: id.to_string(),
            category_id: "elsewhere".to_string(),
            text: text.to_string(),
        };
        catalog.insert(category, vec![prompt("1", "a"), prompt("1", "b"), prompt("2", "c")]);

        let prompts = catalog.prompts("c");
        assert_eq!(prompts.len(), 2);
        assert!(prompts.iter().all(|p| p.category_id == "c"));
    }
}
