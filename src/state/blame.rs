use crate::types::BlameEntry;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Append-only ledger of confirmed blames
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct BlameLog {
    entries: Vec<BlameEntry>,
}

impl BlameLog {
    pub fn record(&mut self, from: &str, to: &str, prompt_text: &str) -> &BlameEntry {
        self.entries.push(BlameEntry {
            from: from.to_string(),
            to: to.to_string(),
            prompt_text: prompt_text.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        });
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[BlameEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// How often each player was blamed
    pub fn counts_by_target(&self) -> HashMap<String, u32> {
        let mut counts: HashMap<String, u32> = HashMap::new();
        for entry in &self.entries {
            *counts.entry(entry.to.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Everyone sharing the highest blame count, sorted by name
    pub fn most_blamed(&self) -> Vec<String> {
        let counts = self.counts_by_target();
        let Some(max) = counts.values().copied().max() else {
            return Vec::new();
        };

        let mut names: Vec<String> = counts
            .into_iter()
            .filter(|(_, count)| *count == max)
            .map(|(name, _)| name)
            .collect();
        names.sort();
        names
    }

    /// Who blamed `target`, and how often
    pub fn blamed_by(&self, target: &str) -> BTreeMap<String, u32> {
        let mut counts = BTreeMap::new();
        for entry in self.entries.iter().filter(|e| e.to == target) {
            *counts.entry(entry.from.clone()).or_insert(0) += 1;
        }
        counts
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlameCount {
    pub name: String,
    pub count: u32,
    /// Blamer name -> how often they picked this player
    pub blamed_by: BTreeMap<String, u32>,
}

/// End-of-round statistics shown on the summary screen
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoundSummary {
    pub prompts_played: usize,
    /// Sorted by count descending, then name
    pub blame_counts: Vec<BlameCount>,
    pub most_blamed: Vec<String>,
}

impl RoundSummary {
    pub fn new(prompts_played: usize, log: &BlameLog) -> Self {
        let mut blame_counts: Vec<BlameCount> = log
            .counts_by_target()
            .into_iter()
            .map(|(name, count)| BlameCount {
                blamed_by: log.blamed_by(&name),
                name,
                count,
            })
            .collect();
        blame_counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));

        Self {
            prompts_played,
            blame_counts,
            most_blamed: log.most_blamed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(pairs: &[(&str, &str)]) -> BlameLog {
        let mut log = BlameLog::default();
        for (from, to) in pairs {
            log.record(from, to, "Who would most likely ...?");
        }
        log
    }

    #[test]
    fn test_counts_by_target() {
        let log = log(&[("x", "a"), ("y", "a"), ("a", "b")]);
        let counts = log.counts_by_target();

        assert_eq!(counts.len(), 2);
        assert_eq!(counts.get("a"), Some(&2));
        assert_eq!(counts.get("b"), Some(&1));
        assert_eq!(log.most_blamed(), vec!["a".to_string()]);
    }

    #[test]
    fn test_most_blamed_reports_ties() {
        let log = log(&[("x", "b"), ("y", "a")]);
        assert_eq!(log.most_blamed(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_empty_log() {
        let log = BlameLog::default();
        assert!(log.counts_by_target().is_empty());
        assert!(log.most_blamed().is_empty());
    }

    #[test]
    fn test_summary_ordering_and_breakdown() {
        let log = log(&[("P1", "P2"), ("P2", "P3"), ("P3", "P2"), ("P1", "P3"), ("P1", "P2")]);
        let summary = RoundSummary::new(5, &log);

        assert_eq!(summary.prompts_played, 5);
        assert_eq!(summary.blame_counts[0].name, "P2");
        assert_eq!(summary.blame_counts[0].count, 3);
        assert_eq!(summary.blame_counts[0].blamed_by.get("P1"), Some(&2));
        assert_eq!(summary.blame_counts[0].blamed_by.get("P3"), Some(&1));
        assert_eq!(summary.blame_counts[1].name, "P3");
        assert_eq!(summary.most_blamed, vec!["P2".to_string()]);
    }

    #[test]
    fn test_entries_carry_timestamp() {
        let mut log = BlameLog::default();
        let entry = log.record("a", "b", "text").clone();
        assert!(chrono::DateTime::parse_from_rfc3339(&entry.timestamp).is_ok());
        assert_eq!(log.len(), 1);
    }
}
