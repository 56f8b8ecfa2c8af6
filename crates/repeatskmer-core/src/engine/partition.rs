use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Cannot split work into zero partitions")]
pub struct ZeroPartitionsError;

/// Splits `items` into exactly `n` disjoint partitions, assigning item `i` to
/// partition `i % n`.
///
/// Every item lands in exactly one partition and partition sizes differ by at
/// most one. When `n` exceeds the item count the trailing partitions are empty.
pub fn partition<T>(items: Vec<T>, n: usize) -> Result<Vec<Vec<T>>, ZeroPartitionsError> {
    if n == 0 {
        return Err(ZeroPartitionsError);
    }
    let per_partition = items.len().div_ceil(n);
    let mut partitions: Vec<Vec<T>> = (0..n).map(|_| Vec::with_capacity(per_partition)).collect();
    for (i, item) in items.into_iter().enumerate() {
        partitions[i % n].push(item);
    }
    Ok(partitions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_rejects_zero() {
        assert_eq!(partition(vec![1, 2, 3], 0), Err(ZeroPartitionsError));
    }

    #[test]
    fn partition_assigns_round_robin() {
        let parts = partition((0..7).collect(), 3).unwrap();
        assert_eq!(parts, vec![vec![0, 3, 6], vec![1, 4], vec![2, 5]]);
    }

    #[test]
    fn partition_preserves_every_item_exactly_once() {
        for n in 1..=12 {
            let items: Vec<u32> = (0..10).collect();
            let parts = partition(items.clone(), n).unwrap();
            assert_eq!(parts.len(), n);

            let sizes: Vec<usize> = parts.iter().map(Vec::len).collect();
            let (min, max) = (
                *sizes.iter().min().unwrap(),
                *sizes.iter().max().unwrap(),
            );
            assert!(max - min <= 1, "unbalanced sizes {:?} for n={}", sizes, n);

            let mut recombined: Vec<u32> = parts.into_iter().flatten().collect();
            recombined.sort_unstable();
            assert_eq!(recombined, items);
        }
    }

    #[test]
    fn partition_of_empty_input_yields_empty_partitions() {
        let parts: Vec<Vec<u8>> = partition(Vec::new(), 4).unwrap();
        assert_eq!(parts.len(), 4);
        assert!(parts.iter().all(Vec::is_empty));
    }
}
