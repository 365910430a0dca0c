#![allow(clippy::question_mark)] // nanoserde DeJson derive

use nanoserde::DeJson;
use thiserror::Error;

use crate::series::{Label, MetricMetadata, MetricType, Sample, Series};

#[derive(Debug, Error)]
pub enum InputError {
    #[error("line {line}: invalid series JSON: {source}")]
    Json {
        line: usize,
        source: nanoserde::DeJsonErr,
    },

    #[error("line {line}: unknown metric type: {value}")]
    UnknownMetricType { line: usize, value: String },
}

/// One series per line, e.g.
/// `{"metric":{"name":"up","type":"gauge"},"labels":[{"name":"job","value":"api"}],"samples":[{"timestamp":1700000000000,"value":1.0}]}`
#[derive(DeJson)]
struct RawSeries {
    metric: RawMetric,
    labels: Option<Vec<RawLabel>>,
    samples: Option<Vec<RawSample>>,
}

#[derive(DeJson)]
struct RawMetric {
    name: String,
    #[nserde(rename = "type")]
    metric_type: Option<String>,
    help: Option<String>,
    unit: Option<String>,
}

#[derive(DeJson)]
struct RawLabel {
    name: String,
    value: String,
}

#[derive(DeJson)]
struct RawSample {
    timestamp: i64,
    value: f64,
}

/// Parse newline-delimited JSON series. Blank lines are skipped; line numbers
/// in errors are 1-based.
pub fn parse_series(input: &str) -> Result<Vec<Series>, InputError> {
    let mut series = Vec::new();
    for (idx, text) in input.lines().enumerate() {
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        series.push(parse_line(idx + 1, text)?);
    }
    Ok(series)
}

fn parse_line(line: usize, text: &str) -> Result<Series, InputError> {
    let raw: RawSeries =
        DeJson::deserialize_json(text).map_err(|source| InputError::Json { line, source })?;

    let type_name = raw.metric.metric_type.unwrap_or_default();
    let metric_type =
        MetricType::parse(&type_name).ok_or_else(|| InputError::UnknownMetricType {
            line,
            value: type_name.clone(),
        })?;

    let metadata = MetricMetadata {
        metric_type,
        family_name: raw.metric.name,
        help: raw.metric.help.unwrap_or_default(),
        unit: raw.metric.unit.unwrap_or_default(),
    };

    Ok(Series {
        metadata,
        labels: raw
            .labels
            .unwrap_or_default()
            .into_iter()
            .map(|l| Label::new(l.name, l.value))
            .collect(),
        samples: raw
            .samples
            .unwrap_or_default()
            .into_iter()
            .map(|s| Sample::new(s.timestamp, s.value))
            .collect(),
    })
}
