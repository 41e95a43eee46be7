//! Batcher for bulk index operations.
//!
//! Pure, stateless partitioning of an ordered sequence into groups of at most
//! `batch_size`, preserving input order. No network or I/O happens here; the
//! bound exists to respect the index service's payload and throughput limits.

use crate::errors::SyncError;

/// Validate a caller-supplied batch size.
pub fn validate_batch_size(batch_size: usize) -> Result<(), SyncError> {
    if batch_size == 0 {
        return Err(SyncError::validation("batch_size must be at least 1"));
    }
    Ok(())
}

/// Partition `items` into batches of at most `batch_size`.
///
/// Order is preserved; every batch except possibly the last has exactly
/// `batch_size` items. An empty input produces zero batches.
pub fn partition<T>(items: Vec<T>, batch_size: usize) -> Result<Vec<Vec<T>>, SyncError> {
    validate_batch_size(batch_size)?;

    let mut batches = Vec::with_capacity(items.len().div_ceil(batch_size));
    let mut batch = Vec::with_capacity(batch_size.min(items.len()));
    for item in items {
        batch.push(item);
        if batch.len() == batch_size {
            batches.push(std::mem::replace(
                &mut batch,
                Vec::with_capacity(batch_size),
            ));
        }
    }
    if !batch.is_empty() {
        batches.push(batch);
    }

    Ok(batches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_preserves_order_and_sizes() {
        let items: Vec<i64> = (1..=10).collect();

        let batches = partition(items.clone(), 3).unwrap();

        assert_eq!(batches.len(), 4);
        for batch in &batches[..batches.len() - 1] {
            assert_eq!(batch.len(), 3);
        }
        assert_eq!(batches.last().unwrap().len(), 1);

        let rejoined: Vec<i64> = batches.into_iter().flatten().collect();
        assert_eq!(rejoined, items);
    }

    #[test]
    fn test_partition_exact_multiple() {
        let batches = partition(vec![1, 2, 3, 4], 2).unwrap();
        assert_eq!(batches, vec![vec![1, 2], vec![3, 4]]);
    }

    #[test]
    fn test_partition_batch_larger_than_input() {
        let batches = partition(vec![1, 2], 10).unwrap();
        assert_eq!(batches, vec![vec![1, 2]]);
    }

    #[test]
    fn test_empty_input_produces_zero_batches() {
        let batches = partition(Vec::<i64>::new(), 5).unwrap();
        assert!(batches.is_empty());
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let err = partition(vec![1, 2, 3], 0).unwrap_err();
        assert!(matches!(err, SyncError::Validation(_)));
    }

    #[test]
    fn test_three_records_batch_of_two() {
        let batches = partition(vec![1, 2, 3], 2).unwrap();
        assert_eq!(batches, vec![vec![1, 2], vec![3]]);
    }
}
