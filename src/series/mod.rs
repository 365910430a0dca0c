use std::fmt;

/// Label that carries the metric name on every series sent over remote write.
pub const METRIC_NAME_LABEL: &str = "__name__";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: i64, value: f64) -> Self {
        Self { timestamp, value }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetricType {
    #[default]
    Unknown,
    Counter,
    Gauge,
    Histogram,
    GaugeHistogram,
    Summary,
    Info,
    StateSet,
}

impl MetricType {
    /// Parse the lowercase Prometheus type name (`counter`, `gaugehistogram`, ...).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "" | "unknown" => Some(MetricType::Unknown),
            "counter" => Some(MetricType::Counter),
            "gauge" => Some(MetricType::Gauge),
            "histogram" => Some(MetricType::Histogram),
            "gaugehistogram" => Some(MetricType::GaugeHistogram),
            "summary" => Some(MetricType::Summary),
            "info" => Some(MetricType::Info),
            "stateset" => Some(MetricType::StateSet),
            _ => None,
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetricType::Unknown => "unknown",
            MetricType::Counter => "counter",
            MetricType::Gauge => "gauge",
            MetricType::Histogram => "histogram",
            MetricType::GaugeHistogram => "gaugehistogram",
            MetricType::Summary => "summary",
            MetricType::Info => "info",
            MetricType::StateSet => "stateset",
        };
        f.write_str(name)
    }
}

/// Metadata shared by every series of one metric family.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MetricMetadata {
    pub metric_type: MetricType,
    pub family_name: String,
    pub help: String,
    pub unit: String,
}

impl MetricMetadata {
    pub fn new(metric_type: MetricType, family_name: impl Into<String>) -> Self {
        Self {
            metric_type,
            family_name: family_name.into(),
            help: String::new(),
            unit: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub name: String,
    pub value: String,
}

impl Label {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One labeled time series with its samples.
///
/// Labels are kept as an ordered list because the wire format sends them as
/// ordered pairs. Label names must be unique within a series; this is checked
/// when the series is encoded, not on insertion.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Series {
    pub metadata: MetricMetadata,
    pub labels: Vec<Label>,
    pub samples: Vec<Sample>,
}

impl Series {
    pub fn new(metadata: MetricMetadata) -> Self {
        Self {
            metadata,
            labels: Vec::new(),
            samples: Vec::new(),
        }
    }

    pub fn with_label(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.push(Label::new(name, value));
        self
    }

    pub fn with_samples(mut self, samples: impl IntoIterator<Item = Sample>) -> Self {
        self.samples.extend(samples);
        self
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|l| l.name == name)
            .map(|l| l.value.as_str())
    }

    /// Sort samples by timestamp and make sure the series carries a
    /// `__name__` label. Equal timestamps keep their relative order. An
    /// existing `__name__` label is never overwritten.
    pub fn normalize(&mut self) {
        self.samples.sort_by_key(|s| s.timestamp);

        if self.label(METRIC_NAME_LABEL).is_none() {
            let name = self.metadata.family_name.clone();
            self.labels.push(Label::new(METRIC_NAME_LABEL, name));
        }
    }
}

/// Normalize every series in place. See [`Series::normalize`].
pub fn normalize(series: &mut [Series]) {
    for s in series {
        s.normalize();
    }
}
