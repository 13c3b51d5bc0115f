//! Inventory Entry
//!
//! One perishable item in the fridge.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::clock::days_until;
use super::entity::Entity;
use super::validation::normalize_ingredient_name;

/// Days-until-expiry at or below which an item counts as urgent.
pub const EXPIRING_SOON_DAYS: i64 = 3;

/// Category assigned to manual adds and items moved from shopping.
pub const DEFAULT_CATEGORY: &str = "기타";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryEntry {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(alias = "addedDate")]
    pub date_added: NaiveDate,
    #[serde(alias = "expiryDate")]
    pub date_expires: NaiveDate,
}

/// Freshness bucket of an inventory entry relative to today
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiryStatus {
    Safe,
    Urgent,
    Expired,
}

impl ExpiryStatus {
    pub fn from_days(days: i64) -> Self {
        if days < 0 {
            ExpiryStatus::Expired
        } else if days <= EXPIRING_SOON_DAYS {
            ExpiryStatus::Urgent
        } else {
            ExpiryStatus::Safe
        }
    }
}

impl InventoryEntry {
    pub fn new(
        id: String,
        name: String,
        category: String,
        date_added: NaiveDate,
        date_expires: NaiveDate,
    ) -> Self {
        Self {
            id,
            name,
            category,
            date_added,
            date_expires,
        }
    }

    pub fn days_until_expiry(&self, today: NaiveDate) -> i64 {
        days_until(today, self.date_expires)
    }

    pub fn expiry_status(&self, today: NaiveDate) -> ExpiryStatus {
        ExpiryStatus::from_days(self.days_until_expiry(today))
    }
}

impl Entity for InventoryEntry {
    const ID_PREFIX: &'static str = "fridge";

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

/// Loosely typed inventory record as found in storage, imports or the
/// remote payload. Anything beyond `name` and `dateExpires` is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawInventoryEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, alias = "addedDate")]
    pub date_added: Option<String>,
    #[serde(default, alias = "expiryDate")]
    pub date_expires: Option<String>,
}

/// Parse `YYYY-MM-DD`, also accepting a full timestamp by its date prefix.
pub(crate) fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    let date_part = text.get(..10).unwrap_or(text);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

impl RawInventoryEntry {
    /// Build a typed entry, or `None` when the record has no usable name or
    /// expiry date. A missing identifier is left empty for re-keying.
    pub(crate) fn into_entry(self) -> Option<InventoryEntry> {
        let name = self
            .name
            .map(|n| normalize_ingredient_name(&n))
            .filter(|n| !n.is_empty())?;
        let date_expires = self.date_expires.as_deref().and_then(parse_date)?;
        let date_added = self
            .date_added
            .as_deref()
            .and_then(parse_date)
            .unwrap_or(date_expires);
        let category = self
            .category
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

        Some(InventoryEntry {
            id: self.id.unwrap_or_default(),
            name,
            category,
            date_added,
            date_expires,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, d).unwrap()
    }

    #[test]
    fn test_expiry_status_buckets() {
        let entry = InventoryEntry::new("fridge-1".into(), "우유".into(), "유제품".into(), day(1), day(10));
        assert_eq!(entry.expiry_status(day(10)), ExpiryStatus::Urgent);
        assert_eq!(entry.expiry_status(day(7)), ExpiryStatus::Urgent);
        assert_eq!(entry.expiry_status(day(6)), ExpiryStatus::Safe);
        assert_eq!(entry.expiry_status(day(11)), ExpiryStatus::Expired);
    }

    #[test]
    fn test_serialization_shape() {
        let entry = InventoryEntry::new("fridge-1".into(), "우유".into(), "유제품".into(), day(1), day(8));
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["dateAdded"], "2026-05-01");
        assert_eq!(json["dateExpires"], "2026-05-08");
    }

    #[test]
    fn test_raw_entry_accepts_legacy_field_names() {
        let raw: RawInventoryEntry = serde_json::from_value(serde_json::json!({
            "id": "fridge-9",
            "name": " 계란 ",
            "category": "유제품",
            "addedDate": "2026-05-01",
            "expiryDate": "2026-05-20T00:00:00.000Z"
        }))
        .unwrap();
        let entry = raw.into_entry().unwrap();
        assert_eq!(entry.name, "계란");
        assert_eq!(entry.date_expires, day(20));
    }

    #[test]
    fn test_raw_entry_without_expiry_is_rejected() {
        let raw: RawInventoryEntry =
            serde_json::from_value(serde_json::json!({ "name": "두부" })).unwrap();
        assert!(raw.into_entry().is_none());
    }

    #[test]
    fn test_loaded_name_is_whitespace_collapsed() {
        let raw: RawInventoryEntry = serde_json::from_value(serde_json::json!({
            "name": "  우유  팩 ",
            "dateExpires": "2026-05-20"
        }))
        .unwrap();
        let entry = raw.into_entry().unwrap();
        assert_eq!(entry.name, "우유 팩");

        let reloaded: RawInventoryEntry =
            serde_json::from_value(serde_json::to_value(&entry).unwrap()).unwrap();
        assert_eq!(reloaded.into_entry().unwrap().name, "우유 팩");
    }
}
