//! Product and variant normalization.
//!
//! Product payloads carry their purchasable configurations in one of two
//! shapes, sometimes mixed within a single catalog:
//!
//! - a flat list: `{label|name|pack|size|title, regular_price|price|amount,
//!   sale_price?, image?, stock?}`
//! - an attributes list: `{attributes, price, stock, image}` where
//!   `attributes` is one object or an array of objects, each with an
//!   `options` map holding a size-like key
//!
//! Both shapes funnel into the uniform [`Variant`] record. Candidates that
//! cannot resolve a label, or whose price is present but unparseable, are
//! dropped: they cannot be selected or purchased.

use serde_json::Value;
use tracing::debug;

use kirana_core::{PriceRange, ProductId, VariantId};

use super::{
    RawPrice, coerce_string, f64_field, i64_field, opt_decimal_field, opt_u32_field, price_field,
    string_field, string_or_empty,
};
use crate::catalog::types::{Product, Variant};

/// Convert a raw product record, normalizing its variants and computing
/// the price range. Never fails; missing fields default.
pub(crate) fn map_product(raw: &Value) -> Product {
    let image = primary_image(raw);
    let variants = normalize_variants(raw, &image);
    let price_range = compute_price_range(raw, &variants);

    Product {
        id: ProductId::new(string_or_empty(raw, &["id"])),
        name: string_or_empty(raw, &["name", "title"]),
        brand: string_or_empty(raw, &["brand"]),
        category: string_or_empty(raw, &["category"]),
        image,
        images: image_list(raw),
        rating: f64_field(raw, "rating"),
        points: i64_field(raw, "points"),
        regular_price: match price_field(raw, &["regular_price", "price"]) {
            RawPrice::Value(v) => Some(v),
            RawPrice::Missing | RawPrice::Invalid => None,
        },
        sale_price: opt_decimal_field(raw, "sale_price"),
        variants,
        price_range,
    }
}

/// Normalize whatever variant structure the product carries into a flat
/// list of purchasable variants.
pub(crate) fn normalize_variants(product: &Value, parent_image: &str) -> Vec<Variant> {
    let mut out = Vec::new();

    for entry in variant_candidates(product) {
        if entry.get("attributes").is_some() {
            out.extend(expand_attribute_entry(entry, parent_image));
        } else if let Some(variant) = normalize_flat(entry, parent_image) {
            out.push(variant);
        } else {
            debug!(?entry, "dropping variant candidate without label or valid price");
        }
    }

    out
}

/// The raw candidate entries: `variants` preferred over legacy `variant`,
/// each either an array or a single object.
fn variant_candidates(product: &Value) -> Vec<&Value> {
    let raw = product
        .get("variants")
        .or_else(|| product.get("variant"));

    match raw {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(obj @ Value::Object(_)) => vec![obj],
        _ => Vec::new(),
    }
}

/// Normalize a flat-shape candidate. `None` drops the candidate.
fn normalize_flat(entry: &Value, parent_image: &str) -> Option<Variant> {
    let label = string_field(entry, &["label", "name", "pack", "size", "title"])?;

    let price = match price_field(entry, &["regular_price", "price", "amount"]) {
        RawPrice::Value(v) => v,
        RawPrice::Missing => rust_decimal::Decimal::ZERO,
        RawPrice::Invalid => return None,
    };

    Some(Variant {
        id: entry.get("id").and_then(coerce_string).map(VariantId::new),
        label,
        price,
        sale_price: opt_decimal_field(entry, "sale_price"),
        image: string_field(entry, &["image"]).unwrap_or_else(|| parent_image.to_owned()),
        stock: opt_u32_field(entry, "stock"),
    })
}

/// Expand an attributes-shape candidate: each attribute object becomes one
/// variant.
fn expand_attribute_entry(entry: &Value, parent_image: &str) -> Vec<Variant> {
    let attrs = match entry.get("attributes") {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(obj @ Value::Object(_)) => vec![obj],
        _ => Vec::new(),
    };

    let image = string_field(entry, &["image"]).unwrap_or_else(|| parent_image.to_owned());
    let id = entry.get("id").and_then(coerce_string).map(VariantId::new);
    let stock = opt_u32_field(entry, "stock");

    attrs
        .into_iter()
        .filter_map(|attr| {
            let label = label_from_options(attr.get("options")?)?;

            // Price preference: the attribute's own prices, then the
            // enclosing entry's, then zero.
            let price = match price_field(attr, &["regular_price", "price"]) {
                RawPrice::Value(v) => v,
                RawPrice::Invalid => return None,
                RawPrice::Missing => match price_field(entry, &["price"]) {
                    RawPrice::Value(v) => v,
                    RawPrice::Missing => rust_decimal::Decimal::ZERO,
                    RawPrice::Invalid => return None,
                },
            };

            Some(Variant {
                id: id.clone(),
                label,
                price,
                // Included only when the attribute itself defines one
                sale_price: opt_decimal_field(attr, "sale_price"),
                image: image.clone(),
                stock,
            })
        })
        .collect()
}

/// Resolve a size-like label from an `options` map: `Size`, then `size`,
/// then the first value in the map.
fn label_from_options(options: &Value) -> Option<String> {
    let map = options.as_object()?;

    for key in ["Size", "size"] {
        if let Some(label) = map.get(key).and_then(coerce_string) {
            let label = label.trim().to_owned();
            if !label.is_empty() {
                return Some(label);
            }
        }
    }

    map.values()
        .filter_map(coerce_string)
        .map(|s| s.trim().to_owned())
        .find(|s| !s.is_empty())
}

/// Price range over effective variant prices.
///
/// Present only when the product has 2+ normalized variants, no usable
/// single price of its own (`regular_price` absent or zero), and the
/// variants do not all cost the same.
fn compute_price_range(raw: &Value, variants: &[Variant]) -> Option<PriceRange> {
    if variants.len() < 2 {
        return None;
    }

    if let RawPrice::Value(single) = price_field(raw, &["regular_price"])
        && !single.is_zero()
    {
        return None;
    }

    let prices: Vec<_> = variants.iter().map(Variant::effective_price).collect();
    PriceRange::spanning(&prices)
}

/// Primary image: `image`, else the first entry of `images`.
fn primary_image(raw: &Value) -> String {
    string_field(raw, &["image"])
        .or_else(|| image_list(raw).into_iter().next())
        .unwrap_or_default()
}

/// All image references: strings, or objects with a `url` field.
fn image_list(raw: &Value) -> Vec<String> {
    let Some(Value::Array(items)) = raw.get("images") else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| coerce_string(item).or_else(|| string_field(item, &["url"])))
        .collect()
}
