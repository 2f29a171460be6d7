use std::collections::BTreeMap;

use foundation::{GeoPoint, RecordId};
use proximity::{MarkerRecord, MarkerRenderer, Popup, Region};
use serde::Serialize;

/// What a map widget would currently display.
///
/// This is the server-side renderer: it keeps the shown markers, the radius
/// circle and the view, and clients poll it instead of recomputing anything.
#[derive(Debug, Clone, Serialize)]
pub struct MapView {
    pub view: ViewState,
    pub circle: Option<Circle>,
    /// Ordered by record id.
    pub markers: Vec<MarkerView>,
    #[serde(skip)]
    shown: BTreeMap<RecordId, MarkerView>,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct ViewState {
    pub center: GeoPoint,
    pub zoom: u8,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Circle {
    pub center: GeoPoint,
    pub radius_m: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerView {
    pub id: RecordId,
    pub location: GeoPoint,
    pub popup: Popup,
}

impl MapView {
    pub fn new(center: GeoPoint, zoom: u8) -> Self {
        Self {
            view: ViewState { center, zoom },
            circle: None,
            markers: Vec::new(),
            shown: BTreeMap::new(),
        }
    }

    pub fn focus(&mut self, center: GeoPoint, zoom: u8) {
        self.view = ViewState { center, zoom };
    }

    pub fn is_shown(&self, id: RecordId) -> bool {
        self.shown.contains_key(&id)
    }

    fn sync_markers(&mut self) {
        self.markers = self.shown.values().cloned().collect();
    }
}

impl MarkerRenderer for MapView {
    fn show(&mut self, record: &MarkerRecord) {
        self.shown.insert(
            record.id(),
            MarkerView {
                id: record.id(),
                location: record.location(),
                popup: record.popup(),
            },
        );
        self.sync_markers();
    }

    fn hide(&mut self, id: RecordId) {
        if self.shown.remove(&id).is_some() {
            self.sync_markers();
        }
    }

    fn draw_circle(&mut self, region: &Region) {
        self.circle = Some(Circle {
            center: region.center(),
            radius_m: region.radius_m(),
        });
    }
}
