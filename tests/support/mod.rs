// Each integration test compiles this module independently via `mod support;`,
// so items used by one test appear unused in others.
#![allow(unused)]

pub mod collector;

use remote_write_sender::{MetricMetadata, MetricType, Sample, Series};

pub fn install_crypto_provider() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}

/// Three series of 2, 3 and 4 samples with shuffled timestamps.
pub fn fixture() -> Vec<Series> {
    vec![
        Series::new(MetricMetadata::new(MetricType::Counter, "test1"))
            .with_label("t1n1", "t1v1")
            .with_label("t1n2", "t1v2")
            .with_samples([Sample::new(120_000, 0.1), Sample::new(60_000, 0.2)]),
        Series::new(MetricMetadata::new(MetricType::Gauge, "test2"))
            .with_label("t2n1", "t2v1")
            .with_samples([
                Sample::new(120_000, 0.1),
                Sample::new(60_000, 0.3),
                Sample::new(180_000, 0.2),
            ]),
        Series::new(MetricMetadata::new(MetricType::Histogram, "test3"))
            .with_label("t3n1", "t3v1")
            .with_samples([
                Sample::new(120_000, 0.1),
                Sample::new(240_000, 0.2),
                Sample::new(180_000, 0.4),
                Sample::new(60_000, 0.3),
            ]),
    ]
}
