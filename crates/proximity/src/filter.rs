use std::collections::BTreeMap;

use foundation::{GeoPoint, RecordId};
use serde::Serialize;

use crate::record::MarkerRecord;
use crate::region::Region;

/// Per-record visibility, keyed by id.
///
/// Ordering contract: iteration is in ascending `RecordId` order.
pub type Visibility = BTreeMap<RecordId, bool>;

/// Change in visibility between two successive evaluations.
///
/// - `shown`: visible now, and either hidden before or newly added.
/// - `hidden`: visible before, present but outside the region now.
/// - `removed`: present before, gone from the collection now.
///
/// Each list is in ascending id order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VisibilityDelta {
    pub shown: Vec<RecordId>,
    pub hidden: Vec<RecordId>,
    pub removed: Vec<RecordId>,
}

impl VisibilityDelta {
    pub fn between(prev: &Visibility, next: &Visibility) -> Self {
        let mut delta = Self::default();
        for (id, visible) in next {
            let was_visible = prev.get(id).copied().unwrap_or(false);
            match (was_visible, *visible) {
                (false, true) => delta.shown.push(*id),
                (true, false) => delta.hidden.push(*id),
                _ => {}
            }
        }
        delta.removed = prev
            .keys()
            .filter(|id| !next.contains_key(id))
            .copied()
            .collect();
        delta
    }

    pub fn is_empty(&self) -> bool {
        self.shown.is_empty() && self.hidden.is_empty() && self.removed.is_empty()
    }
}

/// Distance-filtered marker set.
///
/// Holds the region and the record collection and re-evaluates every record on
/// every mutation. There is no incremental bookkeeping: the only state kept
/// besides the inputs is the last reported visibility, used to compute deltas.
#[derive(Debug, Clone)]
pub struct ProximityFilter {
    region: Region,
    records: Vec<MarkerRecord>,
    reported: Visibility,
}

impl ProximityFilter {
    pub fn new(region: Region) -> Self {
        Self {
            region,
            records: Vec::new(),
            reported: Visibility::new(),
        }
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn records(&self) -> &[MarkerRecord] {
        &self.records
    }

    pub fn record(&self, id: RecordId) -> Option<&MarkerRecord> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn set_region_center(&mut self, point: GeoPoint) -> VisibilityDelta {
        self.region.set_center(point);
        self.refresh()
    }

    /// Negative or non-finite radii are clamped to zero.
    pub fn set_region_radius(&mut self, meters: f64) -> VisibilityDelta {
        self.region.set_radius(meters);
        self.refresh()
    }

    /// Appends a record. A record whose id is already present is ignored.
    pub fn add_record(&mut self, record: MarkerRecord) -> VisibilityDelta {
        if self.record(record.id()).is_some() {
            tracing::warn!(id = %record.id(), "duplicate record id ignored");
            return VisibilityDelta::default();
        }
        self.records.push(record);
        self.refresh()
    }

    pub fn reset_records(&mut self, records: Vec<MarkerRecord>) -> VisibilityDelta {
        self.records.clear();
        for record in records {
            if self.record(record.id()).is_some() {
                tracing::warn!(id = %record.id(), "duplicate record id ignored");
                continue;
            }
            self.records.push(record);
        }
        self.refresh()
    }

    /// Pure evaluation of the current region against every record.
    pub fn compute_visibility(&self) -> Visibility {
        self.records
            .iter()
            .map(|r| (r.id(), self.region.contains(r.location())))
            .collect()
    }

    /// Records currently inside the region, in insertion order.
    pub fn visible_records(&self) -> impl Iterator<Item = &MarkerRecord> {
        self.records
            .iter()
            .filter(|r| self.region.contains(r.location()))
    }

    fn refresh(&mut self) -> VisibilityDelta {
        let next = self.compute_visibility();
        let delta = VisibilityDelta::between(&self.reported, &next);
        self.reported = next;
        delta
    }
}
