//! Notice Generator
//!
//! Advisory banners derived from inventory state. At most one notice per
//! kind, always in the order expired, expiring soon, missing essential.
//! Identifiers depend only on the kind and the set of implicated names, so
//! a dismissed notice stays dismissed when recomputed.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{comparison_key, ExpiryStatus, InventoryEntry, EXPIRING_SOON_DAYS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NoticeKind {
    Expired,
    ExpiringSoon,
    MissingEssential,
}

impl NoticeKind {
    pub fn tag(&self) -> &'static str {
        match self {
            NoticeKind::Expired => "expired",
            NoticeKind::ExpiringSoon => "urgent",
            NoticeKind::MissingEssential => "essential",
        }
    }

    pub fn tone(&self) -> NoticeTone {
        match self {
            NoticeKind::Expired => NoticeTone::Severe,
            NoticeKind::ExpiringSoon => NoticeTone::Caution,
            NoticeKind::MissingEssential => NoticeTone::Informational,
        }
    }

    fn headline(&self) -> String {
        match self {
            NoticeKind::Expired => "유통기한 지난 재료".to_string(),
            NoticeKind::ExpiringSoon => format!("{}일 내 소진 필요", EXPIRING_SOON_DAYS),
            NoticeKind::MissingEssential => "필수 재료 부족".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeTone {
    Severe,
    Caution,
    Informational,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub id: String,
    pub kind: NoticeKind,
    pub tone: NoticeTone,
    pub message: String,
    pub items: Vec<String>,
}

impl Notice {
    fn new(kind: NoticeKind, items: Vec<String>) -> Self {
        Self {
            id: notice_id(kind, &items),
            kind,
            tone: kind.tone(),
            message: format!("{}: {}", kind.headline(), items.join(", ")),
            items,
        }
    }
}

/// `{tag}:{hash}` over the tag and the sorted, comma-joined names.
pub fn notice_id(kind: NoticeKind, names: &[String]) -> String {
    let mut sorted: Vec<&str> = names.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    let seed = format!("{}:{}", kind.tag(), sorted.join(","));
    let hash = blake3::hash(seed.as_bytes()).to_hex();
    format!("{}:{}", kind.tag(), &hash[..16])
}

/// Essentials that no inventory name contains, case-insensitively.
pub fn missing_essentials(inventory: &[InventoryEntry], essentials: &[String]) -> Vec<String> {
    let fridge: Vec<String> = inventory.iter().map(|e| comparison_key(&e.name)).collect();
    essentials
        .iter()
        .filter(|essential| {
            let needle = comparison_key(essential);
            !fridge.iter().any(|name| name.contains(needle.as_str()))
        })
        .cloned()
        .collect()
}

/// Every notice that currently applies, dismissed or not.
pub fn generate_notices(
    inventory: &[InventoryEntry],
    essentials: &[String],
    today: NaiveDate,
) -> Vec<Notice> {
    let mut expired = Vec::new();
    let mut urgent = Vec::new();
    for entry in inventory {
        match entry.expiry_status(today) {
            ExpiryStatus::Expired => expired.push(entry.name.clone()),
            ExpiryStatus::Urgent => urgent.push(entry.name.clone()),
            ExpiryStatus::Safe => {}
        }
    }

    let mut notices = Vec::new();
    if !expired.is_empty() {
        notices.push(Notice::new(NoticeKind::Expired, expired));
    }
    if !urgent.is_empty() {
        notices.push(Notice::new(NoticeKind::ExpiringSoon, urgent));
    }
    let missing = missing_essentials(inventory, essentials);
    if !missing.is_empty() {
        notices.push(Notice::new(NoticeKind::MissingEssential, missing));
    }
    notices
}

/// Dismissed notice identifiers for one identity session
#[derive(Debug, Clone, Default)]
pub struct NoticeBoard {
    dismissed: HashSet<String>,
}

impl NoticeBoard {
    pub fn dismiss(&mut self, id: impl Into<String>) {
        self.dismissed.insert(id.into());
    }

    pub fn is_dismissed(&self, id: &str) -> bool {
        self.dismissed.contains(id)
    }

    /// Forget all dismissals (new identity session)
    pub fn clear(&mut self) {
        self.dismissed.clear();
    }

    pub fn visible(&self, notices: Vec<Notice>) -> Vec<Notice> {
        notices
            .into_iter()
            .filter(|notice| !self.is_dismissed(&notice.id))
            .collect()
    }
}
