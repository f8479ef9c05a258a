//! Sparse integer histograms
//!
//! A [`Histogram`] maps integer buckets to counts. Only populated buckets
//! are stored, so a projection over a few sections of a large page costs
//! memory proportional to the covered extent, not to the page size.
//!
//! Peak detection walks the populated buckets in increasing order; two
//! populated buckets separated by an unpopulated gap are still considered
//! neighbours.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;

/// A range of consecutive buckets whose counts reach a threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Peak {
    /// First bucket of the range
    pub first: i32,
    /// Bucket with the highest count (the first one on ties)
    pub best: i32,
    /// Last bucket of the range
    pub last: i32,
    /// Count of the best bucket
    pub count: i32,
}

/// A local maximum of the histogram
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Maximum {
    /// Bucket of the maximum
    pub bucket: i32,
    /// Count at that bucket
    pub count: i32,
}

/// Sparse bucket histogram
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Histogram {
    counts: BTreeMap<i32, i32>,
    total: i64,
}

impl Histogram {
    /// Create an empty histogram
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `delta` to the count of `bucket`
    pub fn increase_count(&mut self, bucket: i32, delta: i32) {
        *self.counts.entry(bucket).or_insert(0) += delta;
        self.total += delta as i64;
    }

    /// Count of a bucket, zero when unpopulated
    pub fn count(&self, bucket: i32) -> i32 {
        self.counts.get(&bucket).copied().unwrap_or(0)
    }

    /// Sum of all counts
    pub fn total_count(&self) -> i64 {
        self.total
    }

    /// Number of populated buckets
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Check if no bucket is populated
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Remove every bucket
    pub fn clear(&mut self) {
        self.counts.clear();
        self.total = 0;
    }

    /// Lowest populated bucket
    pub fn first_bucket(&self) -> Option<i32> {
        self.counts.keys().next().copied()
    }

    /// Highest populated bucket
    pub fn last_bucket(&self) -> Option<i32> {
        self.counts.keys().next_back().copied()
    }

    /// Bucket with the highest count (lowest bucket on ties)
    pub fn max_bucket(&self) -> Option<i32> {
        let mut best: Option<(i32, i32)> = None;
        for (&bucket, &count) in &self.counts {
            match best {
                Some((_, c)) if c >= count => {}
                _ => best = Some((bucket, count)),
            }
        }
        best.map(|(bucket, _)| bucket)
    }

    /// Highest count, zero for an empty histogram
    pub fn max_count(&self) -> i32 {
        self.counts.values().copied().max().unwrap_or(0)
    }

    /// Count threshold corresponding to a ratio of the total count
    pub fn quorum_value(&self, ratio: f64) -> i32 {
        (ratio * self.total as f64).round() as i32
    }

    /// Iterate over `(bucket, count)` pairs in increasing bucket order
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.counts.iter().map(|(&b, &c)| (b, c))
    }

    /// Ranges of buckets whose count is at least `min_count`
    ///
    /// Peaks are returned sorted by decreasing best count.
    pub fn peaks(&self, min_count: i32) -> Vec<Peak> {
        let mut peaks = Vec::new();
        let mut current: Option<Peak> = None;

        for (&bucket, &count) in &self.counts {
            if count >= min_count {
                match current.as_mut() {
                    Some(peak) => {
                        peak.last = bucket;
                        if count > peak.count {
                            peak.best = bucket;
                            peak.count = count;
                        }
                    }
                    None => {
                        current = Some(Peak {
                            first: bucket,
                            best: bucket,
                            last: bucket,
                            count,
                        });
                    }
                }
            } else if let Some(peak) = current.take() {
                peaks.push(peak);
            }
        }
        if let Some(peak) = current {
            peaks.push(peak);
        }

        peaks.sort_by(|a, b| b.count.cmp(&a.count));
        peaks
    }

    /// Local maxima, sorted by decreasing count
    ///
    /// A maximum is reported where a non-decreasing stretch of counts is
    /// followed by a decrease; a stretch still growing at the last bucket
    /// is not reported.
    pub fn local_maxima(&self) -> Vec<Maximum> {
        let mut maxima = Vec::new();
        let mut prev: Option<(i32, i32)> = None;
        let mut growing = false;

        for (&bucket, &count) in &self.counts {
            if let Some((prev_bucket, prev_count)) = prev {
                if count >= prev_count {
                    growing = true;
                } else {
                    if growing {
                        maxima.push(Maximum {
                            bucket: prev_bucket,
                            count: prev_count,
                        });
                    }
                    growing = false;
                }
            }
            prev = Some((bucket, count));
        }

        maxima.sort_by(|a, b| b.count.cmp(&a.count));
        maxima
    }
}

impl<'a> IntoIterator for &'a Histogram {
    type Item = (&'a i32, &'a i32);
    type IntoIter = btree_map::Iter<'a, i32, i32>;

    fn into_iter(self) -> Self::IntoIter {
        self.counts.iter()
    }
}

impl fmt::Display for Histogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{Histogram total={}", self.total)?;
        for (bucket, count) in &self.counts {
            write!(f, " {}:{}", bucket, count)?;
        }
        write!(f, "}}")
    }
}
