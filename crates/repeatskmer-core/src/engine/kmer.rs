use crate::engine::config::{ConfigError, CountingMode};
use std::collections::HashMap;

/// Occurrence counts of k-mers, iterated in order of first occurrence.
///
/// In cumulative mode all 1-mers come first, then all 2-mers, and so on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KmerCounts {
    entries: Vec<(String, u64)>,
    index: HashMap<String, usize>,
}

impl KmerCounts {
    pub fn new() -> Self {
        Self::default()
    }

    fn increment(&mut self, kmer: &str) {
        match self.index.get(kmer) {
            Some(&i) => self.entries[i].1 += 1,
            None => {
                self.index.insert(kmer.to_string(), self.entries.len());
                self.entries.push((kmer.to_string(), 1));
            }
        }
    }

    pub fn get(&self, kmer: &str) -> Option<u64> {
        self.index.get(kmer).map(|&i| self.entries[i].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, c)| c).sum()
    }

    pub fn iter(&self) -> Iter<'_> {
        self.entries.iter().map(entry_pair as EntryFn<'_>)
    }
}

type EntryFn<'a> = fn(&'a (String, u64)) -> (&'a str, u64);
pub type Iter<'a> = std::iter::Map<std::slice::Iter<'a, (String, u64)>, EntryFn<'a>>;

fn entry_pair(entry: &(String, u64)) -> (&str, u64) {
    (entry.0.as_str(), entry.1)
}

impl<'a> IntoIterator for &'a KmerCounts {
    type Item = (&'a str, u64);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KmerCounter {
    k: usize,
    mode: CountingMode,
}

impl KmerCounter {
    pub fn new(k: usize, mode: CountingMode) -> Result<Self, ConfigError> {
        if k == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "k",
                reason: "k-mer length must be at least 1".into(),
            });
        }
        Ok(Self { k, mode })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn mode(&self) -> CountingMode {
        self.mode
    }

    /// Counts the k-mers of `sequence`. An absent sequence, or one shorter than
    /// every requested length, yields no counts.
    pub fn count(&self, sequence: Option<&str>) -> KmerCounts {
        let mut counts = KmerCounts::new();
        let Some(sequence) = sequence else {
            return counts;
        };

        // Byte offsets of every char boundary, including the end.
        let boundaries: Vec<usize> = sequence
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(sequence.len()))
            .collect();
        let char_len = boundaries.len() - 1;

        let lengths = match self.mode {
            CountingMode::Exact => self.k..=self.k,
            CountingMode::Cumulative => 1..=self.k,
        };
        for len in lengths {
            if len > char_len {
                break;
            }
            for start in 0..=(char_len - len) {
                counts.increment(&sequence[boundaries[start]..boundaries[start + len]]);
            }
        }
        counts
    }
}

/// One output row of the k-mer table before it reaches the writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KmerCountRow {
    /// Region id, or unit id for regions cut per repeat unit.
    pub region_id: String,
    pub label: String,
    pub sequence: Option<String>,
    pub counts: KmerCounts,
}

impl KmerCountRow {
    pub fn fields(&self) -> Vec<String> {
        vec![
            self.region_id.clone(),
            self.label.clone(),
            self.sequence.clone().unwrap_or_default(),
        ]
    }

    pub fn has_sequence(&self) -> bool {
        self.sequence.as_deref().is_some_and(|s| !s.is_empty())
    }
}
