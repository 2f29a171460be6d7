use foundation::RecordId;

use crate::filter::VisibilityDelta;
use crate::record::MarkerRecord;
use crate::region::Region;

/// Whatever draws the map: receives show/hide calls driven by visibility
/// deltas and the circle for the current region.
pub trait MarkerRenderer {
    fn show(&mut self, record: &MarkerRecord);

    fn hide(&mut self, id: RecordId);

    /// The record is gone for good (the collection was reloaded).
    fn remove(&mut self, id: RecordId) {
        self.hide(id);
    }

    fn draw_circle(&mut self, region: &Region);
}

impl<R: MarkerRenderer + ?Sized> MarkerRenderer for Box<R> {
    fn show(&mut self, record: &MarkerRecord) {
        (**self).show(record);
    }

    fn hide(&mut self, id: RecordId) {
        (**self).hide(id);
    }

    fn remove(&mut self, id: RecordId) {
        (**self).remove(id);
    }

    fn draw_circle(&mut self, region: &Region) {
        (**self).draw_circle(region);
    }
}

impl VisibilityDelta {
    /// Drives `renderer` with this delta. `lookup` resolves ids in `shown` to
    /// their records; ids it can't resolve are skipped.
    pub fn apply<'a, R, F>(&self, renderer: &mut R, lookup: F)
    where
        R: MarkerRenderer + ?Sized,
        F: Fn(RecordId) -> Option<&'a MarkerRecord>,
    {
        for id in &self.removed {
            renderer.remove(*id);
        }
        for id in &self.hidden {
            renderer.hide(*id);
        }
        for id in &self.shown {
            match lookup(*id) {
                Some(record) => renderer.show(record),
                None => tracing::warn!(%id, "shown record missing from collection"),
            }
        }
    }
}
