use std::cmp::Ordering;
use std::ops::Range;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Serialize, Deserialize};
use crate::core::config::{SamplingMode, SelectionConfig};

/// Which algorithm produced a window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPath {
    FullSort,
    Quickselect,
    Sampled,
}

/// The ordered window and how it was obtained
#[derive(Debug, Clone)]
pub struct Selection<T> {
    pub items: Vec<T>,
    pub path: SelectionPath,
}

/// Top-K window selection.
///
/// Small sets and late pages are fully sorted. Otherwise a randomized
/// quickselect places the `end`-th element and only the prefix is sorted.
/// Very large sets first estimate the pivot from an evenly strided sample.
pub struct TopKSelector {
    config: SelectionConfig,
}

impl TopKSelector {
    pub fn new(config: SelectionConfig) -> Self {
        TopKSelector { config }
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    pub fn plan(&self, len: usize, start: usize) -> SelectionPath {
        if len < self.config.full_sort_threshold || start >= self.config.early_page_limit {
            SelectionPath::FullSort
        } else if len > self.config.sampling_threshold {
            SelectionPath::Sampled
        } else {
            SelectionPath::Quickselect
        }
    }

    /// Positions `window` of `items` in `cmp` order.
    ///
    /// `cmp` must be a total order for the result to match a full sort.
    pub fn select_window<T, F>(&self, items: &[T], window: Range<usize>, cmp: F) -> Selection<T>
    where
        T: Clone,
        F: Fn(&T, &T) -> Ordering,
    {
        let start = window.start;
        let end = window.end.min(items.len());
        let path = self.plan(items.len(), start);

        if start >= end {
            return Selection { items: Vec::new(), path };
        }

        let mut prefix = match path {
            SelectionPath::FullSort => {
                let mut all = items.to_vec();
                all.sort_by(&cmp);
                all.truncate(end);
                all
            }
            SelectionPath::Quickselect => {
                let mut all = items.to_vec();
                smallest_prefix(&mut all, end, &cmp, &mut self.rng());
                all
            }
            SelectionPath::Sampled => self.sampled_prefix(items, end, &cmp),
        };

        let items = prefix.split_off(start);
        Selection { items, path }
    }

    fn rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.config.seed)
    }

    fn sample_size(&self, len: usize) -> usize {
        let by_ratio = (len as f64 * self.config.sample_ratio) as usize;
        by_ratio.min(self.config.max_sample_size).max(1)
    }

    /// Sorted prefix of length `end` using a pivot estimated from a sample.
    fn sampled_prefix<T, F>(&self, items: &[T], end: usize, cmp: &F) -> Vec<T>
    where
        T: Clone,
        F: Fn(&T, &T) -> Ordering,
    {
        let step = (items.len() / self.sample_size(items.len())).max(1);
        let mut sample: Vec<&T> = items.iter().step_by(step).collect();
        sample.sort_by(|a, b| cmp(*a, *b));
        let pivot = sample[end.min(sample.len() - 1)];

        let mut candidates: Vec<T> = items
            .iter()
            .filter(|item| cmp(*item, pivot) != Ordering::Greater)
            .cloned()
            .collect();

        tracing::trace!(
            sample = sample.len(),
            candidates = candidates.len(),
            end,
            "sampled pivot partition"
        );

        match self.config.sampling_mode {
            SamplingMode::Exact => {
                if candidates.len() >= end {
                    smallest_prefix(&mut candidates, end, cmp, &mut self.rng());
                    return candidates;
                }
                // Every element above the pivot ranks after every candidate.
                let mut rest: Vec<T> = items
                    .iter()
                    .filter(|item| cmp(*item, pivot) == Ordering::Greater)
                    .cloned()
                    .collect();
                let missing = end - candidates.len();
                smallest_prefix(&mut rest, missing, cmp, &mut self.rng());
                candidates.sort_by(cmp);
                candidates.extend(rest);
                candidates
            }
            SamplingMode::Approximate => {
                if candidates.len() < end {
                    let missing = end - candidates.len();
                    candidates.extend(
                        items
                            .iter()
                            .filter(|item| cmp(*item, pivot) == Ordering::Greater)
                            .take(missing)
                            .cloned(),
                    );
                }
                candidates.sort_by(cmp);
                candidates.truncate(end);
                candidates
            }
        }
    }
}

/// Reorders `items` so its first `k` elements are the `k` smallest, sorted,
/// and drops the rest.
fn smallest_prefix<T, F>(items: &mut Vec<T>, k: usize, cmp: &F, rng: &mut StdRng)
where
    F: Fn(&T, &T) -> Ordering,
{
    let k = k.min(items.len());
    if k == 0 {
        items.clear();
        return;
    }
    quickselect(items, k - 1, cmp, rng);
    items.truncate(k);
    items.sort_by(cmp);
}

/// Places the element of rank `k` at index `k`, smaller elements before it.
fn quickselect<T, F>(items: &mut [T], k: usize, cmp: &F, rng: &mut StdRng)
where
    F: Fn(&T, &T) -> Ordering,
{
    let mut lo = 0;
    let mut hi = items.len();
    while hi - lo > 1 {
        let pivot = rng.gen_range(lo..hi);
        let placed = partition(items, lo, hi, pivot, cmp);
        match k.cmp(&placed) {
            Ordering::Equal => return,
            Ordering::Less => hi = placed,
            Ordering::Greater => lo = placed + 1,
        }
    }
}

// Lomuto partition of items[lo..hi]; returns the pivot's final index.
fn partition<T, F>(items: &mut [T], lo: usize, hi: usize, pivot: usize, cmp: &F) -> usize
where
    F: Fn(&T, &T) -> Ordering,
{
    let last = hi - 1;
    items.swap(pivot, last);
    let mut store = lo;
    for i in lo..last {
        if cmp(&items[i], &items[last]) == Ordering::Less {
            items.swap(i, store);
            store += 1;
        }
    }
    items.swap(store, last);
    store
}
