//! Content read from a directory of JSON files:
//!
//! ```text
//! <root>/categories.json          [{ "id", "emoji", "name": { "<lang>": "..." } }]
//! <root>/<lang>/<category>.json   [{ "id", "text" }]
//! ```

use super::{ContentError, ContentProvider, ContentResult};
use crate::types::{Category, Prompt};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct PromptFileEntry {
    id: String,
    text: String,
}

#[derive(Debug, Clone)]
pub struct FsContentProvider {
    root: PathBuf,
}

impl FsContentProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    async fn read(path: &Path) -> ContentResult<String> {
        match tokio::fs::read_to_string(path).await {
            Ok(raw) => Ok(raw),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ContentError::NotFound(path.display().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Reject anything that could escape the content root
fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[async_trait]
impl ContentProvider for FsContentProvider {
    async fn list_categories(&self, _language: &str) -> ContentResult<Vec<Category>> {
        let raw = Self::read(&self.root.join("categories.json")).await?;
        Ok(serde_json::from_str(&raw)?)
    }

    async fn list_prompts(&self, category_id: &str, language: &str) -> ContentResult<Vec<Prompt>> {
        if !is_safe_segment(category_id) || !is_safe_segment(language) {
            return Err(ContentError::NotFound(format!(
                "{}/{}",
                language, category_id
            )));
        }

        let path = self
            .root
            .join(language)
            .join(format!("{}.json", category_id));
        let raw = Self::read(&path).await?;
        let entries: Vec<PromptFileEntry> = serde_json::from_str(&raw)?;

        Ok(entries
            .into_iter()
            .map(|e| Prompt {
                id: e.id,
                category_id: category_id.to_string(),
                text: e.text,
            })
            .collect())
    }

    fn name(&self) -> &str {
        "fs"
    }
}
