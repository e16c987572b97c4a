use serde::{Deserialize, Serialize};

use crate::models::{FilterKind, Listing};

/// Listings whose `kind` set contains `selection`, in collection order.
///
/// An empty (or blank) selection keeps every listing.
pub fn filter_listings<'a>(
    listings: &'a [Listing],
    kind: FilterKind,
    selection: &str,
) -> Vec<&'a Listing> {
    let selection = selection.trim();
    listings
        .iter()
        .filter(|l| selection.is_empty() || has_entry(l, kind, selection))
        .collect()
}

fn has_entry(listing: &Listing, kind: FilterKind, selection: &str) -> bool {
    listing
        .properties
        .entries(kind)
        .iter()
        .any(|e| e.matches(selection))
}

/// The two top-bar selections. Both apply at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    /// Matched against `itemTags`.
    pub tag: String,
    /// Matched against `itemFilters`.
    pub partnership: String,
}

impl FilterSelection {
    pub fn set(&mut self, kind: FilterKind, value: &str) {
        match kind {
            FilterKind::Tags => self.tag = value.to_string(),
            FilterKind::Filters => self.partnership = value.to_string(),
        }
    }

    pub fn get(&self, kind: FilterKind) -> &str {
        match kind {
            FilterKind::Tags => &self.tag,
            FilterKind::Filters => &self.partnership,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tag.trim().is_empty() && self.partnership.trim().is_empty()
    }

    /// Intersection of both filters, collection order preserved.
    pub fn apply<'a>(&self, listings: &'a [Listing]) -> Vec<&'a Listing> {
        let tag = self.tag.trim();
        let partnership = self.partnership.trim();
        listings
            .iter()
            .filter(|l| tag.is_empty() || has_entry(l, FilterKind::Tags, tag))
            .filter(|l| partnership.is_empty() || has_entry(l, FilterKind::Filters, partnership))
            .collect()
    }
}
