//! Shopping Entry

use serde::{Deserialize, Serialize};

use super::entity::Entity;
use super::validation::normalize_ingredient_name;

/// Provenance tags written by the engine itself
pub mod reasons {
    pub const MANUAL: &str = "직접 추가";
    pub const RECIPE_MISSING: &str = "레시피 부족 재료";
    pub const ESSENTIAL_MISSING: &str = "필수 재료 부족";
    pub const USED_UP: &str = "재료 소진";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingEntry {
    pub id: String,
    pub name: String,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe_name: Option<String>,
    #[serde(default)]
    pub checked: bool,
}

impl ShoppingEntry {
    pub fn new(id: String, name: String, reason: String, recipe_name: Option<String>) -> Self {
        Self {
            id,
            name,
            reason,
            recipe_name,
            checked: false,
        }
    }

    /// Case-insensitive name comparison used for duplicate detection
    pub fn same_name(&self, other: &str) -> bool {
        self.name.to_lowercase() == other.to_lowercase()
    }
}

impl Entity for ShoppingEntry {
    const ID_PREFIX: &'static str = "shopping";

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawShoppingEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub recipe_name: Option<String>,
    #[serde(default)]
    pub checked: Option<bool>,
}

impl RawShoppingEntry {
    pub(crate) fn into_entry(self) -> Option<ShoppingEntry> {
        let name = self
            .name
            .map(|n| normalize_ingredient_name(&n))
            .filter(|n| !n.is_empty())?;
        Some(ShoppingEntry {
            id: self.id.unwrap_or_default(),
            name,
            reason: self.reason.unwrap_or_else(|| reasons::MANUAL.to_string()),
            recipe_name: self.recipe_name.filter(|r| !r.is_empty()),
            checked: self.checked.unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_name_ignores_case() {
        let entry = ShoppingEntry::new("shopping-1".into(), "Onion".into(), reasons::MANUAL.into(), None);
        assert!(entry.same_name("onion"));
        assert!(entry.same_name("ONION"));
        assert!(!entry.same_name("onions"));
    }

    #[test]
    fn test_recipe_name_omitted_when_absent() {
        let entry = ShoppingEntry::new("shopping-1".into(), "양파".into(), reasons::MANUAL.into(), None);
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("recipeName").is_none());
        assert_eq!(json["checked"], false);
    }

    #[test]
    fn test_raw_entry_defaults() {
        let raw: RawShoppingEntry =
            serde_json::from_value(serde_json::json!({ "name": "대파" })).unwrap();
        let entry = raw.into_entry().unwrap();
        assert_eq!(entry.id, "");
        assert!(!entry.checked);
        assert_eq!(entry.reason, reasons::MANUAL);
    }

    #[test]
    fn test_raw_entry_name_matches_added_form() {
        let raw: RawShoppingEntry =
            serde_json::from_value(serde_json::json!({ "name": "대파\t 흰 부분" })).unwrap();
        let entry = raw.into_entry().unwrap();
        assert_eq!(entry.name, "대파 흰 부분");
        assert!(entry.same_name("대파 흰 부분"));
    }
}
