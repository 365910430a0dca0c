use std::collections::HashSet;

use bytes::Bytes;
use prost::Message;
use thiserror::Error;

use crate::partition::{Batch, SeriesFragment};
use crate::proto::prometheus::{
    self, WriteRequest, metric_metadata::MetricType as WireMetricType,
};
use crate::series::{MetricType, Sample};

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("series {family} has duplicate label name: {name}")]
    DuplicateLabel { family: String, name: String },

    #[error("series {family} has a label with an empty name")]
    EmptyLabelName { family: String },

    #[error("snappy compression failed: {0}")]
    Compression(#[from] snap::Error),
}

/// Build the remote-write message for one batch: one `TimeSeries` and one
/// `MetricMetadata` entry per fragment, in fragment order.
pub fn write_request(batch: &Batch<'_>) -> Result<WriteRequest, EncodeError> {
    let mut timeseries = Vec::with_capacity(batch.len());
    let mut metadata = Vec::with_capacity(batch.len());

    for fragment in batch.fragments() {
        timeseries.push(time_series(fragment)?);
        metadata.push(metric_metadata(fragment));
    }

    Ok(WriteRequest {
        timeseries,
        metadata,
    })
}

/// Protobuf-encode and snappy-compress a batch, ready to be POSTed.
pub fn encode(batch: &Batch<'_>) -> Result<Bytes, EncodeError> {
    let body = write_request(batch)?.encode_to_vec();
    let compressed = snap::raw::Encoder::new().compress_vec(&body)?;
    Ok(Bytes::from(compressed))
}

fn time_series(fragment: &SeriesFragment<'_>) -> Result<prometheus::TimeSeries, EncodeError> {
    let family = &fragment.metadata().family_name;
    let mut seen = HashSet::with_capacity(fragment.labels().len());

    let mut labels = Vec::with_capacity(fragment.labels().len());
    for label in fragment.labels() {
        if label.name.is_empty() {
            return Err(EncodeError::EmptyLabelName {
                family: family.clone(),
            });
        }
        if !seen.insert(label.name.as_str()) {
            return Err(EncodeError::DuplicateLabel {
                family: family.clone(),
                name: label.name.clone(),
            });
        }
        labels.push(prometheus::Label {
            name: label.name.clone(),
            value: label.value.clone(),
        });
    }

    Ok(prometheus::TimeSeries {
        labels,
        samples: fragment.samples().iter().map(sample).collect(),
    })
}

fn sample(s: &Sample) -> prometheus::Sample {
    prometheus::Sample {
        value: s.value,
        timestamp: s.timestamp,
    }
}

fn metric_metadata(fragment: &SeriesFragment<'_>) -> prometheus::MetricMetadata {
    let metadata = fragment.metadata();
    prometheus::MetricMetadata {
        r#type: wire_type(metadata.metric_type) as i32,
        metric_family_name: metadata.family_name.clone(),
        help: metadata.help.clone(),
        unit: metadata.unit.clone(),
    }
}

fn wire_type(ty: MetricType) -> WireMetricType {
    match ty {
        MetricType::Unknown => WireMetricType::Unknown,
        MetricType::Counter => WireMetricType::Counter,
        MetricType::Gauge => WireMetricType::Gauge,
        MetricType::Histogram => WireMetricType::Histogram,
        MetricType::GaugeHistogram => WireMetricType::Gaugehistogram,
        MetricType::Summary => WireMetricType::Summary,
        MetricType::Info => WireMetricType::Info,
        MetricType::StateSet => WireMetricType::Stateset,
    }
}
