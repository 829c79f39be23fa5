//! Duplicate removal: by place id across the session, by contact details
//! within one response.

use std::collections::HashSet;

use storefind_places::Place;

use crate::enrich::{EnrichedStore, NOT_AVAILABLE};
use crate::session::SeenIds;

/// Drops places whose id is already in `seen`, or repeats within `places`.
#[must_use]
pub fn identity_pass(places: Vec<Place>, seen: &SeenIds) -> Vec<Place> {
    let mut batch = HashSet::new();
    places
        .into_iter()
        .filter(|p| !seen.contains(&p.place_id) && batch.insert(p.place_id.clone()))
        .collect()
}

/// Orders `stores` nearest first and keeps a store only if neither its phone
/// nor its email was taken by a nearer store in the same batch. `"N/A"` never
/// counts as a duplicate.
#[must_use]
pub fn contact_pass(mut stores: Vec<EnrichedStore>) -> Vec<EnrichedStore> {
    stores.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));

    let mut phones: HashSet<String> = HashSet::new();
    let mut emails: HashSet<String> = HashSet::new();
    let mut unique = Vec::with_capacity(stores.len());

    for store in stores {
        let phone_free = store.phone == NOT_AVAILABLE || !phones.contains(&store.phone);
        let email_free = store.email == NOT_AVAILABLE || !emails.contains(&store.email);
        if !(phone_free && email_free) {
            tracing::debug!(
                name = %store.name,
                phone = %store.phone,
                email = %store.email,
                "dropping store with duplicate contact"
            );
            continue;
        }
        if store.phone != NOT_AVAILABLE {
            phones.insert(store.phone.clone());
        }
        if store.email != NOT_AVAILABLE {
            emails.insert(store.email.clone());
        }
        unique.push(store);
    }

    unique
}
