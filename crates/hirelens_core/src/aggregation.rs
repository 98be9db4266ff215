use std::collections::BTreeMap;
use std::fmt;

use hirelens_logging::{lens_debug, lens_warn};

/// Name → non-negative weight or count.
pub type WeightMap = BTreeMap<String, u64>;
/// Category → item weights.
pub type SkillMap = BTreeMap<String, WeightMap>;

/// Result data as it arrives off the wire; either map may be missing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultPayload {
    pub locations: Option<WeightMap>,
    pub skills: Option<SkillMap>,
}

impl ResultPayload {
    pub fn complete(locations: WeightMap, skills: SkillMap) -> Self {
        Self {
            locations: Some(locations),
            skills: Some(skills),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultSnapshot {
    pub locations: WeightMap,
    pub skills: SkillMap,
}

impl ResultSnapshot {
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty() && self.skills.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategorySelector {
    #[default]
    All,
    Category(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LocationBucket {
    Remote,
    Onsite,
    Undefined,
}

impl LocationBucket {
    pub fn label(self) -> &'static str {
        match self {
            LocationBucket::Remote => "Remote",
            LocationBucket::Onsite => "Onsite",
            LocationBucket::Undefined => "Undefined",
        }
    }

    /// Blank names count as missing and land in `Undefined`.
    pub fn classify(location: &str) -> Self {
        if location.trim().is_empty() {
            return LocationBucket::Undefined;
        }
        match location.to_lowercase().as_str() {
            "remote" => LocationBucket::Remote,
            "undefined" => LocationBucket::Undefined,
            _ => LocationBucket::Onsite,
        }
    }
}

impl fmt::Display for LocationBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LocationBuckets {
    pub remote: u64,
    pub onsite: u64,
    pub undefined: u64,
}

impl LocationBuckets {
    pub fn get(&self, bucket: LocationBucket) -> u64 {
        match bucket {
            LocationBucket::Remote => self.remote,
            LocationBucket::Onsite => self.onsite,
            LocationBucket::Undefined => self.undefined,
        }
    }

    /// Always three entries, in `Remote`, `Onsite`, `Undefined` order.
    pub fn entries(&self) -> [(LocationBucket, u64); 3] {
        [
            (LocationBucket::Remote, self.remote),
            (LocationBucket::Onsite, self.onsite),
            (LocationBucket::Undefined, self.undefined),
        ]
    }

    pub fn total(&self) -> u64 {
        self.remote
            .saturating_add(self.onsite)
            .saturating_add(self.undefined)
    }

    fn add(&mut self, bucket: LocationBucket, count: u64) {
        let slot = match bucket {
            LocationBucket::Remote => &mut self.remote,
            LocationBucket::Onsite => &mut self.onsite,
            LocationBucket::Undefined => &mut self.undefined,
        };
        *slot = slot.saturating_add(count);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationCount {
    pub location: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightEntry {
    pub name: String,
    pub weight: u64,
}

/// Latest result snapshot plus the drill-down view derived from it.
///
/// `current_weights` is recomputed whenever the selector or the snapshot
/// changes, so it never mixes a selector with an older snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AggregationEngine {
    snapshot: ResultSnapshot,
    selector: CategorySelector,
    current_weights: WeightMap,
}

impl AggregationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> &ResultSnapshot {
        &self.snapshot
    }

    pub fn selector(&self) -> &CategorySelector {
        &self.selector
    }

    pub fn current_weights(&self) -> &WeightMap {
        &self.current_weights
    }

    /// Replaces the snapshot. Returns `false` when the payload was absent or
    /// partial and the snapshot was reset to empty maps instead.
    pub fn set_snapshot(&mut self, data: Option<ResultPayload>) -> bool {
        let accepted = match data {
            Some(ResultPayload {
                locations: Some(locations),
                skills: Some(skills),
            }) => {
                self.snapshot = ResultSnapshot { locations, skills };
                true
            }
            _ => {
                lens_warn!("result payload missing or incomplete, using empty defaults");
                self.snapshot = ResultSnapshot::default();
                false
            }
        };

        if let CategorySelector::Category(name) = &self.selector {
            if !self.snapshot.skills.contains_key(name) {
                lens_warn!("category '{}' no longer present, showing all categories", name);
                self.selector = CategorySelector::All;
            }
        }
        self.recompute();
        lens_debug!(
            "snapshot replaced: {} locations, {} categories",
            self.snapshot.locations.len(),
            self.snapshot.skills.len()
        );
        accepted
    }

    pub fn select_all_categories(&mut self) {
        self.selector = CategorySelector::All;
        self.recompute();
    }

    /// Drills into one category. Unknown names leave the view untouched and
    /// return `false`.
    pub fn select_category(&mut self, name: &str) -> bool {
        if !self.snapshot.skills.contains_key(name) {
            lens_warn!("category '{}' is not a top-level category, no change applied", name);
            return false;
        }
        self.selector = CategorySelector::Category(name.to_string());
        self.recompute();
        true
    }

    fn recompute(&mut self) {
        self.current_weights = match &self.selector {
            CategorySelector::All => category_totals(&self.snapshot.skills),
            CategorySelector::Category(name) => {
                self.snapshot.skills.get(name).cloned().unwrap_or_default()
            }
        };
    }

    pub fn formatted_weights(&self) -> Vec<WeightEntry> {
        self.current_weights
            .iter()
            .map(|(name, weight)| WeightEntry {
                name: name.clone(),
                weight: *weight,
            })
            .collect()
    }

    pub fn formatted_locations(&self) -> Vec<LocationCount> {
        self.snapshot
            .locations
            .iter()
            .map(|(location, count)| LocationCount {
                location: location.clone(),
                count: *count,
            })
            .collect()
    }

    pub fn group_locations_three_buckets(&self) -> LocationBuckets {
        let mut buckets = LocationBuckets::default();
        for (location, count) in &self.snapshot.locations {
            buckets.add(LocationBucket::classify(location), *count);
        }
        buckets
    }

    /// Locations that name an actual place, i.e. neither remote nor undefined.
    pub fn filter_named_locations(&self) -> Vec<LocationCount> {
        self.formatted_locations()
            .into_iter()
            .filter(|entry| LocationBucket::classify(&entry.location) == LocationBucket::Onsite)
            .collect()
    }
}

/// Counts are clamped at `u64::MAX` instead of wrapping.
fn saturating_sum<'a>(values: impl IntoIterator<Item = &'a u64>) -> u64 {
    values
        .into_iter()
        .fold(0, |total, value| total.saturating_add(*value))
}

fn category_totals(skills: &SkillMap) -> WeightMap {
    skills
        .iter()
        .map(|(category, items)| (category.clone(), saturating_sum(items.values())))
        .collect()
}
