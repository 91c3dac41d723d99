//! Round preparation: turns a catalog plus played history into a bounded,
//! shuffled prompt list.

use super::history::PlayedHistory;
use super::round::RoundPlan;
use crate::content::Catalog;
use crate::error::{GameError, GameResult};
use crate::types::{Category, GameSettings, Prompt};
use rand::seq::SliceRandom;
use rand::Rng;

/// Pick the categories that will contribute to the round
fn choose_categories<'a, R: Rng + ?Sized>(
    catalog: &'a Catalog,
    settings: &GameSettings,
    rng: &mut R,
) -> Vec<&'a Category> {
    let count = settings.category_count.max(1);

    if settings.category_selection_enabled && !settings.selected_categories.is_empty() {
        let mut chosen: Vec<&Category> = Vec::new();
        for id in &settings.selected_categories {
            match catalog.category(id) {
                Some(c) if !catalog.prompts(id).is_empty() => {
                    if !chosen.iter().any(|existing| existing.id == c.id) {
                        chosen.push(c);
                    }
                }
                _ => tracing::warn!("Selected category {} has no prompts, skipping", id),
            }
        }
        chosen.truncate(count);

        if !chosen.is_empty() {
            return chosen;
        }
        tracing::warn!("None of the selected categories are usable, choosing at random");
    }

    let mut eligible: Vec<&Category> = catalog.eligible_categories().collect();
    eligible.shuffle(rng);
    eligible.truncate(count);
    eligible
}

/// Sample up to `limit` prompts from one category, preferring unplayed ones
fn sample_category<R: Rng + ?Sized>(
    prompts: &[Prompt],
    history: &PlayedHistory,
    limit: usize,
    rng: &mut R,
) -> Vec<Prompt> {
    let mut candidates: Vec<&Prompt> = prompts
        .iter()
        .filter(|p| !history.contains(&p.text))
        .collect();

    if candidates.is_empty() {
        // never let history silence a category that has prompts
        candidates = prompts.iter().collect();
    }

    candidates.shuffle(rng);
    candidates.into_iter().take(limit).cloned().collect()
}

/// Build the prompt list for one round.
///
/// Clears `history` first when it covers too much of the corpus. Fails with
/// `NoContentAvailable` only when nothing at all could be selected.
pub fn build_round<R: Rng + ?Sized>(
    catalog: &Catalog,
    settings: &GameSettings,
    history: &mut PlayedHistory,
    rng: &mut R,
) -> GameResult<RoundPlan> {
    let corpus = catalog.corpus_texts();
    if history.should_reset(&corpus) {
        tracing::info!(
            "Played history covers {}/{} prompts, clearing it",
            history.covered(&corpus),
            corpus.len()
        );
        history.clear();
    }

    let categories = choose_categories(catalog, settings, rng);
    let per_category = settings.prompts_per_category.max(1);

    let mut prompts = Vec::with_capacity(categories.len() * per_category);
    for category in &categories {
        prompts.extend(sample_category(
            catalog.prompts(&category.id),
            history,
            per_category,
            rng,
        ));
    }

    if prompts.is_empty() {
        return Err(GameError::NoContentAvailable);
    }

    prompts.shuffle(rng);

    tracing::info!(
        "Built round with {} prompts from {} categories",
        prompts.len(),
        categories.len()
    );

    Ok(RoundPlan {
        prompts,
        categories: categories.into_iter().cloned().collect(),
    })
}

/// Shuffled copy of the built-in prompts, used in degraded mode
pub fn fallback_plan<R: Rng + ?Sized>(language: &str, rng: &mut R) -> RoundPlan {
    let mut prompts = crate::content::fallback::fallback_prompts(language);
    prompts.shuffle(rng);
    RoundPlan {
        prompts,
        categories: vec![crate::content::fallback::fallback_category()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::{HashMap, HashSet};

    fn catalog(shape: &[(&str, usize)]) -> Catalog {
        let mut catalog = Catalog::new("en");
        for (id, n) in shape {
            let category = Category {
                id: id.to_string(),
                name: HashMap::new(),
                emoji: String::new(),
            };
            let prompts = (0..*n)
                .map(|i| Prompt {
                    id: i.to_string(),
                    category_id: id.to_string(),
                    text: format!("{} prompt {}", id, i),
                })
                .collect();
            catalog.insert(category, prompts);
        }
        catalog
    }

    fn settings(category_count: usize, prompts_per_category: usize) -> GameSettings {
        GameSettings {
            category_count,
            prompts_per_category,
            ..GameSettings::default()
        }
    }

    fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    #[test]
    fn test_exact_fit_uses_everything() {
        let catalog = catalog(&[("a", 2), ("b", 2), ("c", 2)]);
        let mut history = PlayedHistory::default();

        let plan = build_round(&catalog, &settings(3, 2), &mut history, &mut rng(1)).unwrap();

        assert_eq!(plan.prompts.len(), 6);
        let categories: HashSet<_> = plan.prompts.iter().map(|p| p.category_id.as_str()).collect();
        assert_eq!(categories, HashSet::from(["a", "b", "c"]));
    }

    #[test]
    fn test_round_is_bounded_and_unique() {
        let catalog = catalog(&[("a", 10), ("b", 1), ("c", 7), ("d", 4), ("e", 0)]);

        for seed in 0..50 {
            let mut history = PlayedHistory::default();
            let s = settings(3, 3);
            let plan = build_round(&catalog, &s, &mut history, &mut rng(seed)).unwrap();

            assert!(!plan.prompts.is_empty());
            assert!(plan.prompts.len() <= s.max_round_len());

            let keys: HashSet<_> = plan.prompts.iter().map(|p| p.key()).collect();
            assert_eq!(keys.len(), plan.prompts.len());

            // never picks the empty category
            assert!(plan.prompts.iter().all(|p| p.category_id != "e"));
            let used: HashSet<_> = plan.category_ids().into_iter().collect();
            assert!(plan.prompts.iter().all(|p| used.contains(&p.category_id)));
        }
    }

    #[test]
    fn test_more_categories_requested_than_available() {
        let catalog = catalog(&[("a", 3), ("b", 3)]);
        let mut history = PlayedHistory::default();

        let plan = build_round(&catalog, &settings(10, 2), &mut history, &mut rng(7)).unwrap();
        assert_eq!(plan.categories.len(), 2);
        assert_eq!(plan.prompts.len(), 4);
    }

    #[test]
    fn test_history_is_excluded() {
        let catalog = catalog(&[("a", 6)]);
        let mut history = PlayedHistory::default();
        history.record(["a prompt 0", "a prompt 1"]);

        for seed in 0..20 {
            let mut h = history.clone();
            let plan = build_round(&catalog, &settings(1, 10), &mut h, &mut rng(seed)).unwrap();
            assert_eq!(plan.prompts.len(), 4);
            assert!(plan.prompts.iter().all(|p| !history.contains(&p.text)));
            assert_eq!(h, history);
        }
    }

    #[test]
    fn test_fully_played_category_falls_back_to_all_prompts() {
        // b is fully played but the corpus as a whole is under the threshold
        let catalog = catalog(&[("a", 10), ("b", 2)]);
        let mut history = PlayedHistory::default();
        history.record(["b prompt 0", "b prompt 1"]);

        let s = GameSettings {
            category_selection_enabled: true,
            selected_categories: vec!["b".to_string()],
            ..settings(1, 5)
        };
        let plan = build_round(&catalog, &s, &mut history, &mut rng(3)).unwrap();

        assert_eq!(plan.prompts.len(), 2);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_fully_played_corpus_clears_history() {
        let catalog = catalog(&[("a", 3)]);
        let mut history = PlayedHistory::default();
        history.record(["a prompt 0", "a prompt 1", "a prompt 2"]);

        let plan = build_round(&catalog, &settings(1, 3), &mut history, &mut rng(5)).unwrap();

        assert_eq!(plan.prompts.len(), 3);
        assert!(history.is_empty());
    }

    #[test]
    fn test_explicit_selection_is_respected_and_capped() {
        let catalog = catalog(&[("a", 2), ("b", 2), ("c", 2)]);
        let s = GameSettings {
            category_selection_enabled: true,
            selected_categories: vec!["c".to_string(), "a".to_string(), "b".to_string()],
            ..settings(2, 2)
        };

        let plan = build_round(&catalog, &s, &mut PlayedHistory::default(), &mut rng(9)).unwrap();
        assert_eq!(plan.category_ids(), vec!["c".to_string(), "a".to_string()]);
        assert!(plan.prompts.iter().all(|p| p.category_id != "b"));
    }

    #[test]
    fn test_selection_ignored_when_disabled() {
        let catalog = catalog(&[("a", 2), ("b", 2)]);
        let s = GameSettings {
            category_selection_enabled: false,
            selected_categories: vec!["a".to_string()],
            ..settings(2, 2)
        };

        let plan = build_round(&catalog, &s, &mut PlayedHistory::default(), &mut rng(2)).unwrap();
        assert_eq!(plan.categories.len(), 2);
    }

    #[test]
    fn test_unusable_selection_falls_back_to_random() {
        let catalog = catalog(&[("a", 2), ("b", 0)]);
        let s = GameSettings {
            category_selection_enabled: true,
            selected_categories: vec!["b".to_string(), "missing".to_string()],
            ..settings(1, 2)
        };

        let plan = build_round(&catalog, &s, &mut PlayedHistory::default(), &mut rng(4)).unwrap();
        assert_eq!(plan.category_ids(), vec!["a".to_string()]);
    }

    #[test]
    fn test_empty_catalog_has_no_content() {
        let result = build_round(
            &Catalog::new("en"),
            &settings(3, 3),
            &mut PlayedHistory::default(),
            &mut rng(0),
        );
        assert_eq!(result.unwrap_err(), GameError::NoContentAvailable);

        let result = build_round(
            &catalog(&[("a", 0)]),
            &settings(3, 3),
            &mut PlayedHistory::default(),
            &mut rng(0),
        );
        assert_eq!(result.unwrap_err(), GameError::NoContentAvailable);
    }

    #[test]
    fn test_shuffle_mixes_categories() {
        let catalog = catalog(&[("a", 5), ("b", 5)]);
        let orders: HashSet<Vec<String>> = (0..20)
            .map(|seed| {
                build_round(&catalog, &settings(2, 5), &mut PlayedHistory::default(), &mut rng(seed))
                    .unwrap()
                    .prompts
                    .into_iter()
                    .map(|p| p.key())
                    .collect()
            })
            .collect();
        assert!(orders.len() > 1);
    }
}
