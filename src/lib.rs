//! Batch Prometheus series by sample count and ship them over remote write.
//!
//! [`partition`](partition::partition) cuts a set of series into batches of at
//! most N samples, splitting a series across batches when it does not fit.
//! [`Sender`](sender::Sender) drives the whole call: normalize, partition,
//! then encode and store each batch in order through a
//! [`RemoteWrite`](transport::RemoteWrite) implementation.

pub mod config;
pub mod input;
pub mod partition;
pub mod proto;
pub mod sender;
pub mod series;
pub mod transport;
pub mod wire;


pub use partition::{Batch, BatchSize, SeriesFragment, partition};
pub use sender::Sender;
pub use series::{Label, MetricMetadata, MetricType, Sample, Series};
pub use transport::{RemoteWrite, RemoteWriteClient, WriteError};
