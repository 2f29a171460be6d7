use std::collections::VecDeque;

use serde::Serialize;

use crate::geocoder::GeocodeError;
use crate::source::SourceError;

/// Oldest notices are dropped past this many.
pub const MAX_NOTICES: usize = 256;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// An address lookup returned no results; the address was skipped.
    GeocodeNotFound,
    /// An address lookup failed in transit; the address was skipped.
    NetworkError,
    /// The address list itself could not be fetched or parsed.
    SourceError,
}

/// Non-fatal problem the user should hear about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub subject: String,
    pub message: String,
}

impl Notice {
    pub fn from_geocode(err: &GeocodeError) -> Self {
        let kind = if err.is_not_found() {
            NoticeKind::GeocodeNotFound
        } else {
            NoticeKind::NetworkError
        };
        Self {
            kind,
            subject: err.address().to_string(),
            message: err.to_string(),
        }
    }

    pub fn from_source(origin: impl Into<String>, err: &SourceError) -> Self {
        Self {
            kind: NoticeKind::SourceError,
            subject: origin.into(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct NoticeBoard {
    notices: VecDeque<Notice>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, notice: Notice) {
        tracing::warn!(kind = ?notice.kind, subject = %notice.subject, "{}", notice.message);
        if self.notices.len() == MAX_NOTICES {
            self.notices.pop_front();
        }
        self.notices.push_back(notice);
    }

    pub fn extend(&mut self, notices: impl IntoIterator<Item = Notice>) {
        for notice in notices {
            self.emit(notice);
        }
    }

    pub fn len(&self) -> usize {
        self.notices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }

    pub fn drain(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }
}
