use std::sync::Arc;

use formats::AddressEntry;
use foundation::IdAllocator;
use futures_util::stream::{self, StreamExt};
use proximity::MarkerRecord;

use crate::geocoder::Geocoder;
use crate::notice::Notice;
use crate::source::{LocationSource, SourceError};

/// Lookups in flight at once, unless configured otherwise.
pub const DEFAULT_GEOCODE_CONCURRENCY: usize = 4;

/// Records resolved from one address list, plus a notice per skipped address.
///
/// Ordering contract: `records` follow the order of the input entries.
#[derive(Debug, Default, Clone)]
pub struct LoadOutcome {
    pub records: Vec<MarkerRecord>,
    pub notices: Vec<Notice>,
}

impl LoadOutcome {
    pub fn skipped(&self) -> usize {
        self.notices.len()
    }
}

/// Geocodes address entries into marker records.
///
/// Lookups run concurrently (bounded by `concurrency`) and fail
/// independently: a failed address becomes a notice and the rest still load.
/// Record ids come from one allocator for the loader's lifetime, so ids from
/// different loads never collide.
pub struct Loader {
    geocoder: Arc<dyn Geocoder>,
    ids: IdAllocator,
    concurrency: usize,
}

impl Loader {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            geocoder,
            ids: IdAllocator::new(),
            concurrency: DEFAULT_GEOCODE_CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn geocoder(&self) -> &Arc<dyn Geocoder> {
        &self.geocoder
    }

    pub async fn resolve(&self, entries: Vec<AddressEntry>) -> LoadOutcome {
        let total = entries.len();
        tracing::info!(entries = total, concurrency = self.concurrency, "geocoding address list");

        let results: Vec<_> = stream::iter(entries)
            .map(|entry| async move {
                let result = self.geocoder.geocode(&entry.address).await;
                (entry, result)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut outcome = LoadOutcome::default();
        for (entry, result) in results {
            match result {
                Ok(location) => outcome.records.push(MarkerRecord::new(
                    self.ids.allocate(),
                    location,
                    entry.marker_metadata(),
                )),
                Err(err) => outcome.notices.push(Notice::from_geocode(&err)),
            }
        }

        tracing::info!(
            loaded = outcome.records.len(),
            skipped = outcome.skipped(),
            "address list geocoded"
        );
        outcome
    }

    /// Fetches the list from `source` and resolves it.
    pub async fn load(&self, source: &dyn LocationSource) -> Result<LoadOutcome, SourceError> {
        let entries = source.fetch().await?;
        tracing::debug!(source = %source.describe(), entries = entries.len(), "address list fetched");
        Ok(self.resolve(entries).await)
    }
}

#[cfg(test)]
mod tests {
    use super::Loader;
    use crate::geocoder::MemoryGeocoder;
    use crate::notice::NoticeKind;
    use crate::source::MemorySource;
    use formats::AddressEntry;
    use foundation::GeoPoint;
    use std::sync::Arc;
    use std::time::Duration;

    fn p(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    fn geocoder() -> MemoryGeocoder {
        MemoryGeocoder::new()
            .with("Dam 1, Amsterdam", p(52.373, 4.893))
            .with("Nieuwestad 1, Leeuwarden", p(53.201, 5.794))
            .with("Grote Markt 1, Groningen", p(53.219, 6.568))
            .with_failure("Coolsingel 40, Rotterdam", "connection reset")
    }

    #[tokio::test]
    async fn one_bad_address_does_not_block_the_rest() {
        let loader = Loader::new(Arc::new(geocoder()));
        let outcome = loader
            .resolve(vec![
                AddressEntry::new("Dam 1, Amsterdam"),
                AddressEntry::new("Nowhere 99"),
                AddressEntry::new("Coolsingel 40, Rotterdam"),
                AddressEntry::new("Nieuwestad 1, Leeuwarden").with_category("Regional"),
            ])
            .await;

        let addresses: Vec<_> = outcome.records.iter().filter_map(|r| r.address()).collect();
        assert_eq!(addresses, vec!["Dam 1, Amsterdam", "Nieuwestad 1, Leeuwarden"]);
        assert_eq!(outcome.records[1].category(), Some("Regional"));

        let kinds: Vec<_> = outcome.notices.iter().map(|n| n.kind).collect();
        assert_eq!(
            kinds,
            vec![NoticeKind::GeocodeNotFound, NoticeKind::NetworkError]
        );
        assert_eq!(outcome.skipped(), 2);
    }

    #[tokio::test]
    async fn input_order_survives_uneven_latency() {
        let geocoder = geocoder()
            .with_delay("Dam 1, Amsterdam", Duration::from_millis(40))
            .with_delay("Nieuwestad 1, Leeuwarden", Duration::from_millis(5));
        let loader = Loader::new(Arc::new(geocoder)).with_concurrency(3);

        let outcome = loader
            .resolve(vec![
                AddressEntry::new("Dam 1, Amsterdam"),
                AddressEntry::new("Nieuwestad 1, Leeuwarden"),
                AddressEntry::new("Grote Markt 1, Groningen"),
            ])
            .await;

        let addresses: Vec<_> = outcome.records.iter().filter_map(|r| r.address()).collect();
        assert_eq!(
            addresses,
            vec![
                "Dam 1, Amsterdam",
                "Nieuwestad 1, Leeuwarden",
                "Grote Markt 1, Groningen"
            ]
        );
        let ids: Vec<_> = outcome.records.iter().map(|r| r.id().get()).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn ids_are_unique_across_loads() {
        let loader = Loader::new(Arc::new(geocoder()));
        let source = MemorySource::new(vec![AddressEntry::new("Dam 1, Amsterdam")]);

        let first = loader.load(&source).await.unwrap();
        let second = loader.load(&source).await.unwrap();
        assert_ne!(first.records[0].id(), second.records[0].id());
    }

    #[tokio::test]
    async fn empty_list_loads_nothing() {
        let loader = Loader::new(Arc::new(geocoder()));
        let outcome = loader.resolve(vec![]).await;
        assert!(outcome.records.is_empty());
        assert!(outcome.notices.is_empty());
    }

    #[test]
    fn concurrency_is_at_least_one() {
        let loader = Loader::new(Arc::new(geocoder())).with_concurrency(0);
        assert_eq!(loader.concurrency, 1);
    }
}
