//! Ingredient name rules
//!
//! Every name that enters the inventory, shopping list or essentials goes
//! through `validate_ingredient_name` first, so a rejected name never
//! partially mutates state.

use std::sync::OnceLock;

use regex::Regex;

use super::entity::{DomainError, DomainResult};

pub const INGREDIENT_NAME_MAX_LENGTH: usize = 30;

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[\p{L}\p{N}\s()\-·,./]+$").expect("ingredient name pattern is valid")
    })
}

/// Collapse whitespace runs into one space and trim.
pub fn normalize_ingredient_name(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalized, lowercased form used for comparisons.
pub fn comparison_key(raw: &str) -> String {
    normalize_ingredient_name(raw).to_lowercase()
}

pub fn validate_ingredient_name(raw: &str) -> DomainResult<String> {
    let normalized = normalize_ingredient_name(raw);

    if normalized.is_empty() {
        return Err(DomainError::InvalidInput(
            "Please enter an ingredient name.".to_string(),
        ));
    }

    if normalized.chars().count() > INGREDIENT_NAME_MAX_LENGTH {
        return Err(DomainError::InvalidInput(format!(
            "Ingredient names must be at most {} characters.",
            INGREDIENT_NAME_MAX_LENGTH
        )));
    }

    if !name_pattern().is_match(&normalized) {
        return Err(DomainError::InvalidInput(
            "Ingredient names may only contain letters, digits and ( ) - · , . /".to_string(),
        ));
    }

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize_ingredient_name("  대파   (흰  부분) "), "대파 (흰 부분)");
        assert_eq!(comparison_key(" Green  Onion"), "green onion");
    }

    #[test]
    fn test_validate_accepts_korean_and_symbols() {
        assert_eq!(validate_ingredient_name(" 돼지고기  삼겹살 ").unwrap(), "돼지고기 삼겹살");
        assert!(validate_ingredient_name("대파 (흰 부분)").is_ok());
        assert!(validate_ingredient_name("milk 1.5/L").is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_names() {
        assert!(validate_ingredient_name("   ").is_err());
        assert!(validate_ingredient_name(&"가".repeat(31)).is_err());
        assert!(validate_ingredient_name(&"가".repeat(30)).is_ok());
        assert!(validate_ingredient_name("milk!").is_err());
        assert!(validate_ingredient_name("<script>").is_err());
    }
}
