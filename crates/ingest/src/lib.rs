//! Getting addresses onto the map: fetching the address list, geocoding each
//! entry and collecting user-facing notices for whatever failed.

pub mod geocoder;
pub mod loader;
pub mod notice;
pub mod source;

pub use geocoder::*;
pub use loader::*;
pub use notice::*;
pub use source::*;

use std::future::Future;
use std::pin::Pin;

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
