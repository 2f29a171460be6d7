use std::collections::BTreeMap;

use foundation::{GeoPoint, RecordId};
use serde::Serialize;

pub const KEY_ADDRESS: &str = "address";
pub const KEY_CATEGORY: &str = "category";
pub const KEY_THUMBNAIL_URL: &str = "thumbnailUrl";
pub const KEY_VIDEO_URL: &str = "videoUrl";

/// A geocoded address plus whatever display metadata came with it.
///
/// Records are immutable; a reload replaces the whole collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerRecord {
    id: RecordId,
    location: GeoPoint,
    metadata: BTreeMap<String, String>,
}

impl MarkerRecord {
    pub fn new(id: RecordId, location: GeoPoint, metadata: BTreeMap<String, String>) -> Self {
        Self {
            id,
            location,
            metadata,
        }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn location(&self) -> GeoPoint {
        self.location
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    pub fn address(&self) -> Option<&str> {
        self.get(KEY_ADDRESS)
    }

    pub fn category(&self) -> Option<&str> {
        self.get(KEY_CATEGORY)
    }

    pub fn popup(&self) -> Popup {
        Popup {
            title: self.address().map(str::to_string),
            category: self.category().map(str::to_string),
            thumbnail_url: non_empty(self.get(KEY_THUMBNAIL_URL)),
            video_url: non_empty(self.get(KEY_VIDEO_URL)),
        }
    }
}

fn non_empty(v: Option<&str>) -> Option<String> {
    v.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

/// Content shown when a marker is clicked: address heading, the category it was
/// listed under, a thumbnail and a link to the video.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Popup {
    pub title: Option<String>,
    pub category: Option<String>,
    pub thumbnail_url: Option<String>,
    pub video_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{MarkerRecord, Popup};
    use foundation::{GeoPoint, RecordId};
    use std::collections::BTreeMap;

    #[test]
    fn popup_reads_well_known_keys() {
        let metadata = BTreeMap::from([
            ("address".to_string(), "Oldehoofsterkerkhof 1, Leeuwarden".to_string()),
            ("category".to_string(), "Regional".to_string()),
            ("thumbnailUrl".to_string(), "https://img.example/1.jpg".to_string()),
            ("videoUrl".to_string(), "  ".to_string()),
        ]);
        let record = MarkerRecord::new(
            RecordId::new(1),
            GeoPoint::new(53.2, 5.79).unwrap(),
            metadata,
        );

        assert_eq!(
            record.popup(),
            Popup {
                title: Some("Oldehoofsterkerkhof 1, Leeuwarden".to_string()),
                category: Some("Regional".to_string()),
                thumbnail_url: Some("https://img.example/1.jpg".to_string()),
                video_url: None,
            }
        );
    }

    #[test]
    fn bare_record_has_empty_popup() {
        let record = MarkerRecord::new(
            RecordId::new(7),
            GeoPoint::new(0.0, 0.0).unwrap(),
            BTreeMap::new(),
        );
        assert_eq!(record.popup(), Popup::default());
        assert_eq!(record.address(), None);
    }
}
