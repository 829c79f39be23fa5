//! Builds the provider query for the session's current strategy.

use storefind_core::LatLng;

use crate::geo::Annulus;
use crate::session::Strategy;

pub const GRID_SIZE: u32 = 3;
/// Degrees of latitude/longitude between neighbouring grid cells per range.
const GRID_STEP_DEG: f64 = 0.01;

pub const PLACE_TYPES: [&str; 8] = [
    "store",
    "shopping_mall",
    "department_store",
    "supermarket",
    "electronics_store",
    "home_goods_store",
    "clothing_store",
    "furniture_store",
];

const CHAIN_RETAILERS: [&str; 13] = [
    "walmart",
    "target",
    "best buy",
    "home depot",
    "lowes",
    "costco",
    "whole foods",
    "trader joes",
    "kroger",
    "safeway",
    "publix",
    "walgreens",
    "cvs",
];

/// The parts of a session that shape a query.
#[derive(Debug, Clone, Copy)]
pub struct QueryContext<'a> {
    pub strategy: Strategy,
    pub page: u32,
    pub annulus: Annulus,
    pub center: LatLng,
    pub product: Option<&'a str>,
    pub retail_store: Option<&'a str>,
    pub category: &'a str,
}

/// A concrete nearby-search call plus whether its results go through the
/// annulus filter.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedQuery {
    pub keyword: String,
    pub center: LatLng,
    pub radius_m: u32,
    pub place_type: Option<&'static str>,
    pub annulus_filter: bool,
}

/// `"<retail store> <category>"`, either half optional.
#[must_use]
pub fn search_query(retail_store: Option<&str>, category: &str) -> String {
    [retail_store.unwrap_or_default(), category]
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Keyword variants cycled by the `keyword` strategy. Variants built from a
/// blank category are dropped, as is a missing retail store name.
#[must_use]
pub fn keyword_variants(category: &str, retail_store: Option<&str>) -> Vec<String> {
    let category = category.trim();
    let mut variants = Vec::with_capacity(6);
    if !category.is_empty() {
        variants.push(format!("{category} store"));
        variants.push(format!("buy {category}"));
        variants.push(format!("{category} retailer"));
        variants.push(format!("{category} shop"));
        variants.push(format!("purchase {category}"));
    }
    if let Some(store) = retail_store.map(str::trim).filter(|s| !s.is_empty()) {
        variants.push(store.to_owned());
    }
    variants
}

/// Names tried, in order, by the find-place leg of an extended search.
#[must_use]
pub fn extended_lookup_names(
    retail_store: Option<&str>,
    category: &str,
    product: Option<&str>,
) -> Vec<String> {
    let category = category.trim();
    let product = product.map(str::trim).filter(|p| !p.is_empty());

    let mut names = Vec::with_capacity(4 + CHAIN_RETAILERS.len());
    if let Some(store) = retail_store.map(str::trim).filter(|s| !s.is_empty()) {
        names.push(store.to_owned());
    }
    if !category.is_empty() {
        names.push(format!("{category} store"));
    }
    if let Some(product) = product {
        names.push(format!("{product} retailer"));
        names.push(format!("{product} store"));
    }
    names.extend(CHAIN_RETAILERS.iter().map(|&name| name.to_owned()));
    names
}

fn grid_center(center: LatLng, page: u32, range: u32) -> LatLng {
    let cell = page % (GRID_SIZE * GRID_SIZE);
    let row = f64::from(cell / GRID_SIZE) - 1.0;
    let col = f64::from(cell % GRID_SIZE) - 1.0;
    let step = GRID_STEP_DEG * f64::from(range);
    center.offset(row * step, col * step)
}

/// Index into a cycle of `len` entries chosen by the page counter.
fn cycle_index(page: u32, len: usize) -> usize {
    let len = u32::try_from(len).unwrap_or(u32::MAX).max(1);
    (page % len) as usize
}

/// Plans the nearby search for `ctx`.
#[must_use]
pub fn plan_query(ctx: &QueryContext<'_>) -> PlannedQuery {
    let radius_m = ctx.annulus.outer_radius_m();
    let primary_keyword = search_query(ctx.retail_store, ctx.category);

    match ctx.strategy {
        Strategy::Primary => PlannedQuery {
            keyword: primary_keyword,
            center: ctx.center,
            radius_m,
            place_type: Some("store"),
            annulus_filter: true,
        },
        Strategy::Grid => PlannedQuery {
            keyword: primary_keyword,
            center: grid_center(ctx.center, ctx.page, ctx.annulus.range),
            radius_m,
            place_type: Some("store"),
            annulus_filter: true,
        },
        Strategy::Keyword => {
            let variants = keyword_variants(ctx.category, ctx.retail_store);
            let keyword = variants
                .get(cycle_index(ctx.page, variants.len()))
                .cloned()
                .unwrap_or(primary_keyword);
            PlannedQuery {
                keyword,
                center: ctx.center,
                radius_m,
                place_type: Some("store"),
                annulus_filter: true,
            }
        }
        Strategy::Type => {
            let place_type = PLACE_TYPES[cycle_index(ctx.page, PLACE_TYPES.len())];
            let keyword = if ctx.category.trim().is_empty() {
                primary_keyword
            } else {
                ctx.category.trim().to_owned()
            };
            PlannedQuery {
                keyword,
                center: ctx.center,
                radius_m,
                place_type: Some(place_type),
                annulus_filter: ctx.annulus.range <= 3,
            }
        }
        Strategy::Fallback | Strategy::Extended => PlannedQuery {
            keyword: ctx
                .product
                .or(ctx.retail_store)
                .unwrap_or_default()
                .trim()
                .to_owned(),
            center: ctx.center,
            radius_m,
            place_type: None,
            annulus_filter: false,
        },
    }
}
