//! Where the address list comes from.
//!
//! New sources can be added by implementing the `LocationSource` trait.

use std::path::{Path, PathBuf};

use formats::{AddressEntry, AddressListError, parse_address_list};

use crate::BoxFuture;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("request to {url} failed: {source}")]
    Network { url: String, source: reqwest::Error },
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },
    #[error(transparent)]
    Format(#[from] AddressListError),
}

pub trait LocationSource: Send + Sync {
    /// Human-readable origin, for logs and notices.
    fn describe(&self) -> String;

    fn fetch(&self) -> BoxFuture<'_, Result<Vec<AddressEntry>, SourceError>>;
}

/// Address list stored as a JSON file.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl LocationSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> BoxFuture<'_, Result<Vec<AddressEntry>, SourceError>> {
        Box::pin(async move {
            let text = tokio::fs::read_to_string(&self.path)
                .await
                .map_err(|source| SourceError::Io {
                    path: self.path.clone(),
                    source,
                })?;
            Ok(parse_address_list(&text)?)
        })
    }
}

/// Address list served over HTTP.
pub struct HttpSource {
    url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }
}

impl LocationSource for HttpSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    fn fetch(&self) -> BoxFuture<'_, Result<Vec<AddressEntry>, SourceError>> {
        Box::pin(async move {
            let network = |source: reqwest::Error| SourceError::Network {
                url: self.url.clone(),
                source,
            };
            let resp = self.client.get(&self.url).send().await.map_err(network)?;
            if !resp.status().is_success() {
                return Err(SourceError::Status {
                    url: self.url.clone(),
                    status: resp.status().as_u16(),
                });
            }
            let text = resp.text().await.map_err(network)?;
            Ok(parse_address_list(&text)?)
        })
    }
}

/// Fixed in-memory list, for tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    entries: Vec<AddressEntry>,
}

impl MemorySource {
    pub fn new(entries: Vec<AddressEntry>) -> Self {
        Self { entries }
    }
}

impl LocationSource for MemorySource {
    fn describe(&self) -> String {
        format!("memory ({} entries)", self.entries.len())
    }

    fn fetch(&self) -> BoxFuture<'_, Result<Vec<AddressEntry>, SourceError>> {
        Box::pin(async move { Ok(self.entries.clone()) })
    }
}

/// Picks `HttpSource` for `http://` and `https://` locations, `FileSource`
/// for anything else.
pub fn source_for(location: &str, client: reqwest::Client) -> Box<dyn LocationSource> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Box::new(HttpSource::new(location, client))
    } else {
        Box::new(FileSource::new(location))
    }
}

#[cfg(test)]
mod tests {
    use super::{FileSource, LocationSource, SourceError, source_for};
    use formats::AddressEntry;
    use std::io::Write;

    #[tokio::test]
    async fn file_source_reads_grouped_list() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"Cup": [{{"address": "Dam 1", "videoUrl": "v"}}]}}"#
        )
        .unwrap();

        let entries = FileSource::new(file.path()).fetch().await.unwrap();
        assert_eq!(
            entries,
            vec![
                AddressEntry::new("Dam 1")
                    .with_category("Cup")
                    .with_field("videoUrl", "v")
            ]
        );
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileSource::new(dir.path().join("locations.json"))
            .fetch()
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }

    #[tokio::test]
    async fn malformed_file_is_format_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "true").unwrap();
        let err = FileSource::new(file.path()).fetch().await.unwrap_err();
        assert!(matches!(err, SourceError::Format(_)));
    }

    #[test]
    fn source_for_picks_by_scheme() {
        let client = reqwest::Client::new();
        assert_eq!(
            source_for("https://example.org/locations.json", client.clone()).describe(),
            "https://example.org/locations.json"
        );
        assert_eq!(
            source_for("data/locations.json", client).describe(),
            "data/locations.json"
        );
    }
}
