use tracing::debug;

use crate::config::Config;
use crate::partition::{BatchSize, partition};
use crate::series::Series;
use crate::transport::{RemoteWrite, RemoteWriteClient, WriteError};

/// Cuts series into sample-bounded batches and delivers them one at a time.
pub struct Sender<W> {
    writer: W,
    batch_size: BatchSize,
}

impl Sender<RemoteWriteClient> {
    pub fn from_config(config: &Config) -> Result<Self, WriteError> {
        Ok(Self::new(RemoteWriteClient::new(config)?, config.batch_size))
    }
}

impl<W: RemoteWrite> Sender<W> {
    pub fn new(writer: W, batch_size: BatchSize) -> Self {
        Self { writer, batch_size }
    }

    pub fn batch_size(&self) -> BatchSize {
        self.batch_size
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Normalize `series` in place, partition it, and deliver each batch in
    /// order.
    ///
    /// Batch N+1 is only encoded once batch N has been stored. The first
    /// error ends the call and is returned as-is; batches already stored stay
    /// stored.
    pub async fn send(&self, series: &mut [Series]) -> Result<(), WriteError> {
        let batches = partition(series, self.batch_size);
        let total = batches.len();

        for (i, batch) in batches.iter().enumerate() {
            let payload = self.writer.encode(batch)?;
            debug!(
                batch = i + 1,
                total,
                fragments = batch.len(),
                samples = batch.sample_count(),
                bytes = payload.len(),
                "sending batch"
            );
            self.writer.store(payload).await?;
        }

        Ok(())
    }
}
