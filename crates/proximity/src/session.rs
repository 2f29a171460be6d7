use foundation::GeoPoint;
use serde::Serialize;

use crate::controls::km_to_meters;
use crate::filter::{ProximityFilter, Visibility, VisibilityDelta};
use crate::record::MarkerRecord;
use crate::region::Region;
use crate::render::MarkerRenderer;

/// Identifies one load of the address list.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Generation(u64);

impl Generation {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Results from a load that has since been superseded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("load generation {stale} superseded by {current}")]
pub struct StaleLoad {
    pub stale: Generation,
    pub current: Generation,
}

/// One map view: the filter, the renderer it drives and the load counter.
///
/// Every mutation recomputes visibility, applies the delta to the renderer
/// and returns it. Region changes also redraw the circle.
///
/// Loads are guarded by generation: `begin_load` (or `reset_records`) starts
/// a new generation, and results tagged with an older one are dropped.
/// The first results of a new generation replace the previous collection.
pub struct Session<R> {
    filter: ProximityFilter,
    renderer: R,
    generation: Generation,
    /// Generation the current collection was loaded by.
    loaded: Generation,
}

impl<R: MarkerRenderer> Session<R> {
    pub fn new(region: Region, mut renderer: R) -> Self {
        renderer.draw_circle(&region);
        Self {
            filter: ProximityFilter::new(region),
            renderer,
            generation: Generation(0),
            loaded: Generation(0),
        }
    }

    pub fn region(&self) -> &Region {
        self.filter.region()
    }

    pub fn records(&self) -> &[MarkerRecord] {
        self.filter.records()
    }

    pub fn filter(&self) -> &ProximityFilter {
        &self.filter
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn visibility(&self) -> Visibility {
        self.filter.compute_visibility()
    }

    pub fn set_region_center(&mut self, point: GeoPoint) -> VisibilityDelta {
        let delta = self.filter.set_region_center(point);
        self.renderer.draw_circle(self.filter.region());
        self.apply(&delta);
        delta
    }

    pub fn set_region_radius(&mut self, meters: f64) -> VisibilityDelta {
        let delta = self.filter.set_region_radius(meters);
        self.renderer.draw_circle(self.filter.region());
        self.apply(&delta);
        delta
    }

    pub fn set_region_radius_km(&mut self, km: f64) -> VisibilityDelta {
        self.set_region_radius(km_to_meters(km))
    }

    pub fn add_record(&mut self, record: MarkerRecord) -> VisibilityDelta {
        let delta = self.filter.add_record(record);
        self.apply(&delta);
        delta
    }

    /// Replaces the collection outright. Any load still in flight is stale
    /// afterwards.
    pub fn reset_records(&mut self, records: Vec<MarkerRecord>) -> VisibilityDelta {
        let generation = self.begin_load();
        self.replace(generation, records)
    }

    /// Starts a new load. Results of every earlier generation become stale.
    pub fn begin_load(&mut self) -> Generation {
        self.generation = Generation(self.generation.0 + 1);
        tracing::debug!(generation = %self.generation, "load started");
        self.generation
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        generation == self.generation
    }

    /// Replaces the collection with the results of `generation`, unless a
    /// newer load has started since.
    pub fn commit_load(
        &mut self,
        generation: Generation,
        records: Vec<MarkerRecord>,
    ) -> Result<VisibilityDelta, StaleLoad> {
        self.check(generation)?;
        tracing::info!(%generation, records = records.len(), "load committed");
        Ok(self.replace(generation, records))
    }

    /// Adds one record produced by `generation`, unless it is stale. The
    /// first record of a generation replaces the records of earlier loads.
    pub fn add_loaded_record(
        &mut self,
        generation: Generation,
        record: MarkerRecord,
    ) -> Result<VisibilityDelta, StaleLoad> {
        self.check(generation)?;
        if self.loaded != generation {
            return Ok(self.replace(generation, vec![record]));
        }
        Ok(self.add_record(record))
    }

    fn check(&self, generation: Generation) -> Result<(), StaleLoad> {
        if self.is_current(generation) {
            return Ok(());
        }
        tracing::debug!(stale = %generation, current = %self.generation, "dropping stale load results");
        Err(StaleLoad {
            stale: generation,
            current: self.generation,
        })
    }

    fn replace(&mut self, generation: Generation, records: Vec<MarkerRecord>) -> VisibilityDelta {
        self.loaded = generation;
        let delta = self.filter.reset_records(records);
        self.apply(&delta);
        delta
    }

    fn apply(&mut self, delta: &VisibilityDelta) {
        let filter = &self.filter;
        delta.apply(&mut self.renderer, |id| filter.record(id));
    }
}
