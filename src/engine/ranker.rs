//! Recommendation Ranker
//!
//! Scores recipes by the share of main ingredients the matcher considers
//! owned and orders them by that score, keeping catalog order for ties.

use serde::{Deserialize, Serialize};

use super::matcher::IngredientMatcher;
use crate::domain::{Recipe, RecipeCategory};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeCard {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub owned_main: Vec<String>,
    pub missing_main: Vec<String>,
    pub match_rate: u8,
}

impl RecipeCard {
    pub fn score(recipe: &Recipe, matcher: &IngredientMatcher) -> Self {
        let (owned_main, missing_main): (Vec<String>, Vec<String>) = recipe
            .main_ingredients
            .iter()
            .cloned()
            .partition(|ingredient| matcher.is_owned(ingredient));

        Self {
            match_rate: match_rate(owned_main.len(), recipe.main_ingredients.len()),
            recipe: recipe.clone(),
            owned_main,
            missing_main,
        }
    }

    /// Every main ingredient is on hand
    pub fn is_ready(&self) -> bool {
        self.missing_main.is_empty()
    }
}

/// Percentage of `owned` over `total`, rounded half up. No main ingredients means 100.
pub fn match_rate(owned: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let owned = owned.min(total);
    ((200 * owned + total) / (2 * total)) as u8
}

/// Score every recipe and sort by match rate, highest first.
pub fn rank_recipes(recipes: &[Recipe], matcher: &IngredientMatcher) -> Vec<RecipeCard> {
    let mut cards: Vec<RecipeCard> = recipes
        .iter()
        .map(|recipe| RecipeCard::score(recipe, matcher))
        .collect();
    // sort_by is stable, so equal rates stay in catalog order
    cards.sort_by(|a, b| b.match_rate.cmp(&a.match_rate));
    cards
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeFilter {
    /// `None` means every category
    #[serde(default)]
    pub category: Option<RecipeCategory>,
    #[serde(default)]
    pub ready_only: bool,
}

impl RecipeFilter {
    pub fn accepts(&self, card: &RecipeCard) -> bool {
        if self.ready_only && !card.is_ready() {
            return false;
        }
        self.category
            .map_or(true, |category| card.recipe.category == category)
    }
}

/// Drop cards the filter rejects without reordering the rest.
pub fn filter_cards(cards: Vec<RecipeCard>, filter: &RecipeFilter) -> Vec<RecipeCard> {
    cards.into_iter().filter(|card| filter.accepts(card)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::builtin_recipes;

    fn recipe(id: &str, category: RecipeCategory, main: &[&str]) -> Recipe {
        Recipe {
            id: id.to_string(),
            name: id.to_string(),
            category,
            time: String::new(),
            difficulty: String::new(),
            main_ingredients: main.iter().map(|s| s.to_string()).collect(),
            sub_ingredients: Vec::new(),
            steps: Vec::new(),
            source: String::new(),
            source_url: String::new(),
        }
    }

    #[test]
    fn test_half_owned_recipe() {
        let matcher = IngredientMatcher::new(["계란"]);
        let card = RecipeCard::score(&recipe("r", RecipeCategory::General, &["계란", "대파"]), &matcher);

        assert_eq!(card.match_rate, 50);
        assert_eq!(card.owned_main, vec!["계란".to_string()]);
        assert_eq!(card.missing_main, vec!["대파".to_string()]);
    }

    #[test]
    fn test_zero_main_ingredients_is_full_match() {
        let card = RecipeCard::score(&recipe("r", RecipeCategory::General, &[]), &IngredientMatcher::default());
        assert_eq!(card.match_rate, 100);
        assert!(card.is_ready());
    }

    #[test]
    fn test_match_rate_rounds_half_up() {
        assert_eq!(match_rate(1, 3), 33);
        assert_eq!(match_rate(2, 3), 67);
        assert_eq!(match_rate(1, 8), 13);
        assert_eq!(match_rate(0, 4), 0);
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let recipes = vec![
            recipe("a", RecipeCategory::General, &["김치"]),
            recipe("b", RecipeCategory::Baby, &["계란"]),
            recipe("c", RecipeCategory::General, &["두부"]),
            recipe("d", RecipeCategory::General, &["계란", "김치"]),
        ];
        let matcher = IngredientMatcher::new(["계란"]);

        let ids: Vec<_> = rank_recipes(&recipes, &matcher)
            .into_iter()
            .map(|c| c.recipe.id)
            .collect();
        assert_eq!(ids, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_filters_apply_after_ranking() {
        let matcher = IngredientMatcher::new(["계란", "대파", "두부", "버섯"]);
        let ranked = rank_recipes(&builtin_recipes(), &matcher);

        let ready = filter_cards(
            ranked.clone(),
            &RecipeFilter {
                category: None,
                ready_only: true,
            },
        );
        let ready_ids: Vec<_> = ready.iter().map(|c| c.recipe.id.as_str()).collect();
        assert_eq!(ready_ids, vec!["gyeran-mari", "baby-tofu-bites"]);

        let baby = filter_cards(
            ranked,
            &RecipeFilter {
                category: Some(RecipeCategory::Baby),
                ready_only: false,
            },
        );
        assert!(baby.iter().all(|c| c.recipe.category == RecipeCategory::Baby));
        assert_eq!(baby[0].recipe.id, "baby-tofu-bites");
    }
}
