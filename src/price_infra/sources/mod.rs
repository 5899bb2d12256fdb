pub mod adapter;
pub mod fixture;
pub mod undercut;

use async_trait::async_trait;
use crate::error::Result;
use crate::types::row::RawRow;

pub use adapter::{BlockingSourceAdapter, ItemClient};
pub use fixture::FixtureSource;
pub use undercut::UndercutSource;

/// A pluggable provider of price rows for a raw item description.
///
/// Implementations may do their own I/O and retries. Returning `Err` (or
/// panicking) only drops this source's rows for the current call.
#[async_trait]
pub trait PriceSource: Send + Sync {
    fn name(&self) -> &str;
    async fn check_item(&self, text: &str) -> Result<Vec<RawRow>>;
}
