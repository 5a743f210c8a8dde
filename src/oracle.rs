use super::*;

/// Judges whether items form a set and searches for sets.
/// Implementations must be pure: same input, same answer, from any thread.
pub trait Oracle: Send + Sync {
    /// True iff `items` is exactly one valid set.
    fn is_set(&self, items: &[Item]) -> bool;
    /// Up to `limit` valid sets drawn from `items`.
    fn find_sets(&self, items: &[Item], limit: usize) -> Vec<Vec<Item>>;
    /// True iff at least one valid set exists among `items`.
    fn exists(&self, items: &[Item]) -> bool {
        !self.find_sets(items, 1).is_empty()
    }
}

/// The standard game: each card carries `count` features with `size` values,
/// and `size` cards form a set when every feature is all-equal or all-distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classic {
    size: usize,
    count: usize,
}

impl Classic {
    pub fn new(size: usize, count: usize) -> Self {
        Self { size, count }
    }
    /// Feature values of a card, least significant first.
    pub fn features(&self, item: Item) -> Vec<usize> {
        std::iter::successors(Some(item), |n| Some(n / self.size))
            .take(self.count)
            .map(|n| n % self.size)
            .collect()
    }
    fn feature(&self, item: Item, index: usize) -> usize {
        (0..index).fold(item, |n, _| n / self.size) % self.size
    }
    fn is_distinct(items: &[Item]) -> bool {
        items
            .iter()
            .enumerate()
            .all(|(i, a)| items[i + 1..].iter().all(|b| a != b))
    }
}

impl From<&Config> for Classic {
    fn from(config: &Config) -> Self {
        Self::new(config.feature_size, config.feature_count)
    }
}

impl Default for Classic {
    fn default() -> Self {
        Self::new(FEATURE_SIZE, FEATURE_COUNT)
    }
}

impl Oracle for Classic {
    fn is_set(&self, items: &[Item]) -> bool {
        if items.len() != self.size || !Self::is_distinct(items) {
            return false;
        }
        (0..self.count).all(|f| {
            let mut values = items
                .iter()
                .map(|&item| self.feature(item, f))
                .collect::<Vec<usize>>();
            values.sort_unstable();
            values.dedup();
            values.len() == 1 || values.len() == self.size
        })
    }
    fn find_sets(&self, items: &[Item], limit: usize) -> Vec<Vec<Item>> {
        let k = self.size;
        let n = items.len();
        let mut found = Vec::new();
        if k == 0 || n < k || limit == 0 {
            return found;
        }
        let mut index = (0..k).collect::<Vec<usize>>();
        loop {
            let candidate = index.iter().map(|&i| items[i]).collect::<Vec<Item>>();
            if self.is_set(&candidate) {
                found.push(candidate);
                if found.len() >= limit {
                    return found;
                }
            }
            // advance to the next combination in lexicographic order
            match (0..k).rev().find(|&i| index[i] < n - k + i) {
                None => return found,
                Some(i) => {
                    index[i] += 1;
                    for j in i + 1..k {
                        index[j] = index[j - 1] + 1;
                    }
                }
            }
        }
    }
}
