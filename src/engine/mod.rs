//! Engine Layer
//!
//! Pure derivations over the in-memory state: ingredient ownership, recipe
//! ranking and advisory notices. Nothing here mutates state or does I/O.

mod matcher;
mod notices;
mod ranker;

pub use matcher::{tokenize, IngredientMatcher};
pub use notices::{
    generate_notices, missing_essentials, notice_id, Notice, NoticeBoard, NoticeKind, NoticeTone,
};
pub use ranker::{filter_cards, match_rate, rank_recipes, RecipeCard, RecipeFilter};
