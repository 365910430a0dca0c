use std::fmt;
use std::num::NonZeroUsize;

use crate::series::{Label, MetricMetadata, Sample, Series, normalize};

/// One week of per-minute samples.
pub const DEFAULT_BATCH_SIZE: NonZeroUsize = NonZeroUsize::new(7 * 24 * 60).unwrap();

/// Upper bound on the number of samples in one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchSize {
    Unbounded,
    Samples(NonZeroUsize),
}

impl BatchSize {
    /// Zero and negative values mean "no bound".
    pub fn from_raw(raw: i64) -> Self {
        usize::try_from(raw)
            .ok()
            .and_then(NonZeroUsize::new)
            .map_or(BatchSize::Unbounded, BatchSize::Samples)
    }

    pub fn limit(&self) -> Option<usize> {
        match self {
            BatchSize::Unbounded => None,
            BatchSize::Samples(n) => Some(n.get()),
        }
    }
}

impl Default for BatchSize {
    fn default() -> Self {
        BatchSize::Samples(DEFAULT_BATCH_SIZE)
    }
}

impl fmt::Display for BatchSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchSize::Unbounded => write!(f, "unbounded"),
            BatchSize::Samples(n) => write!(f, "{n} samples"),
        }
    }
}

/// A contiguous run of one series' samples, together with that series'
/// metadata and labels.
#[derive(Debug, Clone, Copy)]
pub struct SeriesFragment<'a> {
    series: &'a Series,
    samples: &'a [Sample],
}

impl<'a> SeriesFragment<'a> {
    fn new(series: &'a Series, samples: &'a [Sample]) -> Self {
        Self { series, samples }
    }

    fn whole(series: &'a Series) -> Self {
        Self::new(series, &series.samples)
    }

    pub fn series(&self) -> &'a Series {
        self.series
    }

    pub fn metadata(&self) -> &'a MetricMetadata {
        &self.series.metadata
    }

    pub fn labels(&self) -> &'a [Label] {
        &self.series.labels
    }

    pub fn samples(&self) -> &'a [Sample] {
        self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// An ordered set of fragments delivered in a single remote-write request.
#[derive(Debug, Clone, Default)]
pub struct Batch<'a> {
    fragments: Vec<SeriesFragment<'a>>,
    sample_count: usize,
}

impl<'a> Batch<'a> {
    fn push(&mut self, fragment: SeriesFragment<'a>) {
        self.sample_count += fragment.len();
        self.fragments.push(fragment);
    }

    pub fn fragments(&self) -> &[SeriesFragment<'a>] {
        &self.fragments
    }

    /// Total number of samples across all fragments.
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Number of fragments.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// Normalize `series` in place and cut it into batches of at most `size`
/// samples.
///
/// Series are visited in input order. A series that does not fit into the
/// space left in the open batch is split: the head tops up the open batch,
/// full-sized batches are cut from the middle, and the tail opens the next
/// batch. Every sample ends up in exactly one fragment, and a series'
/// fragments appear in timestamp order. Series without samples produce no
/// fragment, and no empty batch is ever returned.
pub fn partition(series: &mut [Series], size: BatchSize) -> Vec<Batch<'_>> {
    if series.is_empty() {
        return Vec::new();
    }

    normalize(series);
    let series: &[Series] = series;

    let total: usize = series.iter().map(Series::len).sum();
    match size.limit() {
        Some(limit) if total > limit => split(series, limit),
        _ => single(series),
    }
}

fn single(series: &[Series]) -> Vec<Batch<'_>> {
    let mut batch = Batch::default();
    for s in series.iter().filter(|s| !s.is_empty()) {
        batch.push(SeriesFragment::whole(s));
    }

    if batch.is_empty() {
        Vec::new()
    } else {
        vec![batch]
    }
}

fn split(series: &[Series], limit: usize) -> Vec<Batch<'_>> {
    let mut batches = Vec::new();
    let mut current = Batch::default();
    // Samples still needed to fill `current`. Always in 1..=limit.
    let mut remaining = limit;

    for s in series {
        let mut rest = s.samples.as_slice();
        if rest.is_empty() {
            continue;
        }

        if rest.len() < remaining {
            current.push(SeriesFragment::whole(s));
            remaining -= rest.len();
            continue;
        }

        let (head, tail) = rest.split_at(remaining);
        current.push(SeriesFragment::new(s, head));
        batches.push(std::mem::take(&mut current));
        rest = tail;

        while rest.len() >= limit {
            let (head, tail) = rest.split_at(limit);
            let mut full = Batch::default();
            full.push(SeriesFragment::new(s, head));
            batches.push(full);
            rest = tail;
        }

        if !rest.is_empty() {
            current.push(SeriesFragment::new(s, rest));
        }
        remaining = limit - rest.len();
    }

    if !current.is_empty() {
        batches.push(current);
    }
    batches
}
