pub mod validation;

/// Ordered frequency counter. Keys keep their first-seen position, and the
/// sort used by `top` is stable, so equal counts rank in encounter order.
#[derive(Debug, Default)]
pub struct FrequencyCounter<K> {
    counts: Vec<(K, u64)>,
}

impl<K: PartialEq + Clone> FrequencyCounter<K> {
    pub fn new() -> Self {
        Self { counts: Vec::new() }
    }

    pub fn bump(&mut self, key: K) {
        match self.counts.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 += 1,
            None => self.counts.push((key, 1)),
        }
    }

    /// Top `k` keys by descending count, first-seen order on ties.
    pub fn top(mut self, k: usize) -> Vec<K> {
        self.counts.sort_by(|a, b| b.1.cmp(&a.1));
        self.counts.into_iter().take(k).map(|(key, _)| key).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

pub fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0u64;
    for value in values {
        sum += value;
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
