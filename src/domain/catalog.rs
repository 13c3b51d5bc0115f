//! Static reference catalogs
//!
//! The quick-add catalog is fixed; users only persist which of its names are
//! enabled. Recipes ship built in and can be replaced by a JSON catalog file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::entity::DomainResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickItem {
    pub name: &'static str,
    pub category: &'static str,
    pub default_expiry_days: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuickItemGroup {
    pub title: &'static str,
    pub items: &'static [QuickItem],
}

const fn quick(name: &'static str, category: &'static str, default_expiry_days: i64) -> QuickItem {
    QuickItem {
        name,
        category,
        default_expiry_days,
    }
}

pub static QUICK_ITEM_GROUPS: &[QuickItemGroup] = &[
    QuickItemGroup {
        title: "🥩 자주 쓰는 고기",
        items: &[
            quick("돼지고기 삼겹살", "육류", 3),
            quick("닭가슴살", "육류", 2),
            quick("스팸", "가공식품", 180),
        ],
    },
    QuickItemGroup {
        title: "🥬 자주 쓰는 채소",
        items: &[
            quick("양파", "채소", 14),
            quick("대파", "채소", 7),
            quick("감자", "채소", 14),
            quick("버섯", "채소", 5),
        ],
    },
    QuickItemGroup {
        title: "🥚 계란/유제품",
        items: &[
            quick("계란", "유제품", 21),
            quick("우유", "유제품", 7),
            quick("두부", "유제품", 7),
        ],
    },
    QuickItemGroup {
        title: "🧂 기본 양념",
        items: &[
            quick("진간장", "양념", 365),
            quick("고추장", "양념", 180),
            quick("식용유", "양념", 365),
        ],
    },
];

/// Every catalog name once, in catalog order.
pub fn quick_item_names() -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for item in QUICK_ITEM_GROUPS.iter().flat_map(|g| g.items.iter()) {
        if !names.iter().any(|n| n == item.name) {
            names.push(item.name.to_string());
        }
    }
    names
}

pub fn find_quick_item(name: &str) -> Option<&'static QuickItem> {
    QUICK_ITEM_GROUPS
        .iter()
        .flat_map(|g| g.items.iter())
        .find(|item| item.name == name)
}

/// Keep only names that exist in the catalog, preserving order.
pub fn sanitize_quick_add_names<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names
        .into_iter()
        .map(Into::into)
        .filter(|name| find_quick_item(name).is_some())
        .collect()
}

/// Groups restricted to enabled names; groups left empty are dropped.
pub fn configured_quick_groups(enabled: &[String]) -> Vec<(&'static str, Vec<&'static QuickItem>)> {
    QUICK_ITEM_GROUPS
        .iter()
        .map(|group| {
            let items: Vec<_> = group
                .items
                .iter()
                .filter(|item| enabled.iter().any(|name| name == item.name))
                .collect();
            (group.title, items)
        })
        .filter(|(_, items)| !items.is_empty())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipeCategory {
    General,
    Baby,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub category: RecipeCategory,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub difficulty: String,
    pub main_ingredients: Vec<String>,
    #[serde(default)]
    pub sub_ingredients: Vec<String>,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub source_url: String,
}

struct RecipeSeed {
    id: &'static str,
    name: &'static str,
    category: RecipeCategory,
    time: &'static str,
    difficulty: &'static str,
    main: &'static [&'static str],
    sub: &'static [&'static str],
    steps: &'static [&'static str],
}

const RECIPE_SEEDS: &[RecipeSeed] = &[
    RecipeSeed {
        id: "kimchi-jjigae",
        name: "돼지고기 김치찌개",
        category: RecipeCategory::General,
        time: "30분",
        difficulty: "쉬움",
        main: &["돼지고기 삼겹살", "김치", "양파", "대파"],
        sub: &["고춧가루", "진간장", "두부"],
        steps: &[
            "돼지고기와 김치를 냄비에 볶는다.",
            "물을 붓고 15분 끓인다.",
            "양파와 대파를 넣고 5분 더 끓인다.",
        ],
    },
    RecipeSeed {
        id: "gyeran-mari",
        name: "계란말이",
        category: RecipeCategory::General,
        time: "15분",
        difficulty: "쉬움",
        main: &["계란", "대파"],
        sub: &["소금", "식용유"],
        steps: &[
            "계란을 풀고 다진 대파와 소금을 섞는다.",
            "기름 두른 팬에 얇게 부어 돌돌 만다.",
        ],
    },
    RecipeSeed {
        id: "spam-fried-rice",
        name: "스팸 볶음밥",
        category: RecipeCategory::General,
        time: "20분",
        difficulty: "쉬움",
        main: &["밥", "스팸", "계란", "양파"],
        sub: &["진간장", "식용유"],
        steps: &[
            "스팸과 양파를 잘게 썰어 볶는다.",
            "밥을 넣고 간장으로 간한다.",
            "계란 프라이를 올린다.",
        ],
    },
    RecipeSeed {
        id: "doenjang-jjigae",
        name: "두부 된장찌개",
        category: RecipeCategory::General,
        time: "25분",
        difficulty: "보통",
        main: &["두부", "감자", "양파", "된장"],
        sub: &["대파", "고춧가루"],
        steps: &[
            "물에 된장을 풀고 감자를 넣어 끓인다.",
            "양파와 두부를 넣고 10분 더 끓인다.",
        ],
    },
    RecipeSeed {
        id: "chicken-salad",
        name: "닭가슴살 샐러드",
        category: RecipeCategory::General,
        time: "15분",
        difficulty: "쉬움",
        main: &["닭가슴살", "양상추"],
        sub: &["올리브유", "식초"],
        steps: &["닭가슴살을 삶아 찢는다.", "채소와 함께 드레싱에 버무린다."],
    },
    RecipeSeed {
        id: "baby-egg-porridge",
        name: "계란 채소죽",
        category: RecipeCategory::Baby,
        time: "20분",
        difficulty: "쉬움",
        main: &["쌀", "계란", "감자"],
        sub: &["양파"],
        steps: &[
            "불린 쌀을 곱게 갈아 물과 함께 끓인다.",
            "잘게 다진 감자와 양파를 넣는다.",
            "풀어 둔 계란을 넣고 저어 익힌다.",
        ],
    },
    RecipeSeed {
        id: "baby-tofu-bites",
        name: "두부 버섯 핑거푸드",
        category: RecipeCategory::Baby,
        time: "20분",
        difficulty: "보통",
        main: &["두부", "버섯"],
        sub: &["계란"],
        steps: &[
            "두부의 물기를 빼고 으깬다.",
            "다진 버섯과 섞어 한입 크기로 빚는다.",
            "팬에 앞뒤로 노릇하게 굽는다.",
        ],
    },
];

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// The recipes bundled with the engine, in catalog order.
pub fn builtin_recipes() -> Vec<Recipe> {
    RECIPE_SEEDS
        .iter()
        .map(|seed| Recipe {
            id: seed.id.to_string(),
            name: seed.name.to_string(),
            category: seed.category,
            time: seed.time.to_string(),
            difficulty: seed.difficulty.to_string(),
            main_ingredients: to_strings(seed.main),
            sub_ingredients: to_strings(seed.sub),
            steps: to_strings(seed.steps),
            source: "our-fridge".to_string(),
            source_url: String::new(),
        })
        .collect()
}

/// Load a recipe catalog from a JSON array file.
pub fn load_recipe_catalog(path: &Path) -> DomainResult<Vec<Recipe>> {
    let raw = std::fs::read_to_string(path)?;
    let recipes: Vec<Recipe> = serde_json::from_str(&raw)?;
    Ok(recipes)
}
