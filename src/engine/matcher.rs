//! Ingredient Matcher
//!
//! Decides whether a recipe ingredient counts as owned. Recipes name
//! ingredients more loosely than the fridge does ("대파 (흰 부분)" vs
//! "대파"), so the check is deliberately permissive:
//!
//! 1. exact match on the normalized, lowercased name
//! 2. any query token equal to any inventory token
//! 3. substring containment in either direction against a single name

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::domain::{comparison_key, InventoryEntry};

fn token_delimiters() -> &'static Regex {
    static DELIMITERS: OnceLock<Regex> = OnceLock::new();
    DELIMITERS.get_or_init(|| Regex::new(r"[\s,./()]+").expect("token delimiter pattern is valid"))
}

/// Split an already normalized name into its non-empty tokens.
pub fn tokenize(normalized: &str) -> impl Iterator<Item = &str> {
    token_delimiters()
        .split(normalized)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[derive(Debug, Clone, Default)]
pub struct IngredientMatcher {
    names: Vec<String>,
    name_set: HashSet<String>,
    tokens: HashSet<String>,
}

impl IngredientMatcher {
    pub fn new<I, S>(inventory_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut matcher = Self::default();
        for raw in inventory_names {
            let name = comparison_key(raw.as_ref());
            if name.is_empty() {
                continue;
            }
            matcher
                .tokens
                .extend(tokenize(&name).map(str::to_string));
            if matcher.name_set.insert(name.clone()) {
                matcher.names.push(name);
            }
        }
        matcher
    }

    pub fn from_inventory(entries: &[InventoryEntry]) -> Self {
        Self::new(entries.iter().map(|e| e.name.as_str()))
    }

    /// Normalized inventory names, deduplicated, in inventory order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_owned(&self, ingredient: &str) -> bool {
        let query = comparison_key(ingredient);
        if query.is_empty() {
            return false;
        }

        if self.name_set.contains(&query) {
            return true;
        }

        if tokenize(&query).any(|token| self.tokens.contains(token)) {
            return true;
        }

        self.names
            .iter()
            .any(|name| query.contains(name.as_str()) || name.contains(query.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_ignores_case_and_spacing() {
        let matcher = IngredientMatcher::new(["Green  Onion"]);
        assert!(matcher.is_owned(" green onion "));
    }

    #[test]
    fn test_qualified_ingredient_matches_by_token() {
        let matcher = IngredientMatcher::new(["대파"]);
        assert!(matcher.is_owned("대파 (흰 부분)"));
        assert!(matcher.is_owned("양파/대파"));
    }

    #[test]
    fn test_compound_inventory_name_matches_by_token() {
        let matcher = IngredientMatcher::new(["돼지고기 삼겹살"]);
        assert!(matcher.is_owned("삼겹살"));
    }

    #[test]
    fn test_substring_matches_both_ways() {
        let holds_longer = IngredientMatcher::new(["닭가슴살"]);
        assert!(holds_longer.is_owned("가슴살"));

        let holds_shorter = IngredientMatcher::new(["두부"]);
        assert!(holds_shorter.is_owned("연두부"));
    }

    #[test]
    fn test_unrelated_and_empty_queries() {
        let matcher = IngredientMatcher::new(["계란"]);
        assert!(!matcher.is_owned("대파"));
        assert!(!matcher.is_owned("   "));
        assert!(!IngredientMatcher::default().is_owned("계란"));
    }

    #[test]
    fn test_tokenize_splits_on_delimiters() {
        let tokens: Vec<_> = tokenize("대파 (흰 부분),양파/마늘.생강").collect();
        assert_eq!(tokens, vec!["대파", "흰", "부분", "양파", "마늘", "생강"]);
    }

    #[test]
    fn test_duplicate_inventory_names_are_collapsed() {
        let matcher = IngredientMatcher::new(["우유", "우유 ", "  "]);
        assert_eq!(matcher.names(), &["우유".to_string()]);
    }
}
