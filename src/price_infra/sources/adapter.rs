use std::sync::Arc;
use async_trait::async_trait;
use crate::error::{Error, Result};
use crate::price_infra::sources::PriceSource;
use crate::types::row::RawRow;

/// Synchronous single-source client, e.g. an existing blocking HTTP client.
pub trait ItemClient: Send + Sync + 'static {
    fn check_item(&self, text: &str) -> anyhow::Result<Vec<RawRow>>;
}

impl<F> ItemClient for F
where
    F: Fn(&str) -> anyhow::Result<Vec<RawRow>> + Send + Sync + 'static,
{
    fn check_item(&self, text: &str) -> anyhow::Result<Vec<RawRow>> {
        self(text)
    }
}

/// Exposes a blocking [`ItemClient`] as a [`PriceSource`].
///
/// Calls run on tokio's blocking pool so a slow client never stalls the
/// runtime's worker threads.
pub struct BlockingSourceAdapter {
    name: String,
    client: Arc<dyn ItemClient>,
}

impl BlockingSourceAdapter {
    pub fn new(name: impl Into<String>, client: impl ItemClient) -> Self {
        BlockingSourceAdapter {
            name: name.into(),
            client: Arc::new(client),
        }
    }
}

#[async_trait]
impl PriceSource for BlockingSourceAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check_item(&self, text: &str) -> Result<Vec<RawRow>> {
        let client = Arc::clone(&self.client);
        let text = text.to_string();

        let outcome = tokio::task::spawn_blocking(move || client.check_item(&text))
            .await
            .map_err(|e| Error::SourceFailed {
                source_name: self.name.clone(),
                message: format!("client task aborted: {}", e),
            })?;

        outcome.map_err(|e| Error::SourceFailed {
            source_name: self.name.clone(),
            message: format!("{:#}", e),
        })
    }
}
