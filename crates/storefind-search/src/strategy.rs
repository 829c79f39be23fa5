//! Strategy and distance-range transitions between calls.
//!
//! Pure: the next state depends only on what this call saw. Transitions only
//! fire on a call that produced no new places and no continuation token.

use crate::session::Strategy;

/// Primary widens up to this range before switching to the grid.
pub const PRIMARY_MAX_RANGE: u32 = 15;
const GRID_MAX_RANGE: u32 = 10;
const GRID_SWITCH_PAGE: u32 = 18;
const KEYWORD_MAX_RANGE: u32 = 10;
const KEYWORD_SWITCH_PAGE: u32 = 30;
const TYPE_MAX_RANGE: u32 = 12;
const FINAL_STOP_PAGE: u32 = 50;
/// A continuation chain that ends before this page forces an escalation.
const SHORT_CHAIN_PAGE: u32 = 3;

/// What one call observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    /// Strategy that produced this call's results, after any extended
    /// search took over.
    pub strategy: Strategy,
    pub distance_range: u32,
    pub page: u32,
    pub new_places: usize,
    /// The request carried a continuation token.
    pub inbound_token: bool,
    /// The provider returned a continuation token.
    pub token_returned: bool,
}

/// State for the next call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Advance {
    pub strategy: Strategy,
    pub distance_range: u32,
    pub has_more: bool,
}

fn transition(obs: &Observation) -> (Strategy, u32) {
    let (strategy, range, page) = (obs.strategy, obs.distance_range, obs.page);
    match strategy {
        Strategy::Primary if range < PRIMARY_MAX_RANGE => (strategy, range + 1),
        Strategy::Primary => (Strategy::Grid, 1),
        Strategy::Grid if range < GRID_MAX_RANGE && page % 9 == 0 => (strategy, range + 1),
        Strategy::Grid if page >= GRID_SWITCH_PAGE => (Strategy::Keyword, range),
        Strategy::Keyword if page % 6 == 0 && range < KEYWORD_MAX_RANGE => (strategy, range + 1),
        Strategy::Keyword if page % 6 == 0 && page >= KEYWORD_SWITCH_PAGE => {
            (Strategy::Type, range)
        }
        Strategy::Type if page % 8 == 0 && range < TYPE_MAX_RANGE => (strategy, range + 1),
        _ => (strategy, range),
    }
}

/// Computes the next strategy, distance range and whether to keep going.
#[must_use]
pub fn advance(obs: &Observation) -> Advance {
    let exhausted = obs.new_places == 0 && !obs.token_returned;
    let (mut strategy, mut distance_range) = if exhausted {
        transition(obs)
    } else {
        (obs.strategy, obs.distance_range)
    };

    let changed = strategy != obs.strategy || distance_range != obs.distance_range;
    let mut has_more = obs.token_returned || obs.new_places > 0 || changed;

    if obs.inbound_token && !obs.token_returned && obs.page < SHORT_CHAIN_PAGE {
        (strategy, distance_range) = if obs.distance_range < PRIMARY_MAX_RANGE {
            (obs.strategy, obs.distance_range + 1)
        } else {
            (Strategy::Grid, 1)
        };
        has_more = true;
    }

    if obs.strategy == Strategy::Type
        && obs.new_places == 0
        && obs.distance_range >= TYPE_MAX_RANGE
        && obs.page > FINAL_STOP_PAGE
    {
        has_more = false;
    }

    Advance {
        strategy,
        distance_range,
        has_more,
    }
}
