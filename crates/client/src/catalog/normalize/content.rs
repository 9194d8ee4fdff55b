//! Banner, category, brand, and reward normalization.
//!
//! These records are presentation content; every field defaults and no
//! item is ever rejected.

use serde_json::Value;

use kirana_core::RewardId;

use super::{i64_field, string_field, string_or_empty};
use crate::catalog::types::{Banner, Brand, Category, Reward};

pub(crate) fn map_banner(raw: &Value) -> Banner {
    Banner {
        id: string_or_empty(raw, &["id"]),
        title: string_or_empty(raw, &["title", "name"]),
        image: string_or_empty(raw, &["image", "banner"]),
        target: string_field(raw, &["target", "link", "product_id"]),
    }
}

pub(crate) fn map_category(raw: &Value) -> Category {
    Category {
        id: string_or_empty(raw, &["id"]),
        name: string_or_empty(raw, &["name", "title"]),
        image: string_or_empty(raw, &["image"]),
    }
}

pub(crate) fn map_brand(raw: &Value) -> Brand {
    Brand {
        id: string_or_empty(raw, &["id"]),
        name: string_or_empty(raw, &["name", "title"]),
        image: string_or_empty(raw, &["image", "logo"]),
    }
}

pub(crate) fn map_reward(raw: &Value) -> Reward {
    Reward {
        id: RewardId::new(string_or_empty(raw, &["id"])),
        title: string_or_empty(raw, &["title", "name"]),
        description: string_or_empty(raw, &["description"]),
        points_cost: i64_field(raw, "points_cost").max(0),
        image: string_or_empty(raw, &["image"]),
    }
}
