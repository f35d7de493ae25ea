// ============================================================
// Layer 4 — Train/Validation/Test Splitter
// ============================================================
// Randomly shuffles mappings and splits them into three sets:
//   - Training set:   used to update model weights
//   - Validation set: measures performance on unseen data
//                     after every epoch
//   - Test set:       held out until training is finished,
//                     used once for the final loss figure
//
// Why shuffle before splitting?
//   The driving log is ordered in time — the whole first lap
//   comes before the second. Without shuffling, the test set
//   would only contain the end of the recording session.
//   Shuffling gives every partition a representative mix.
//
// Partition sizes use floor(n * fraction) for train and valid;
// the test partition takes the remainder, including whatever
// rounding slack the floors left over. No element is ever
// duplicated or dropped.
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom
// which is the standard unbiased shuffle algorithm.
//
// Reference: Rust Book §8 (Vectors)
//            rand crate documentation

use anyhow::Result;
use rand::seq::SliceRandom;

use crate::domain::split::SplitRatio;

/// Shuffle `items` and split into (train, valid, test).
///
/// The ratio is validated before anything else happens, so a bad
/// ratio fails fast with no I/O and no shuffling done.
///
/// Generic over the element type — the pipeline passes
/// FrameMappings, the tests pass plain integers.
pub fn split_three<T>(
    mut items: Vec<T>,
    ratio:     &SplitRatio,
) -> Result<(Vec<T>, Vec<T>, Vec<T>)> {
    ratio.validate()?;

    // Fisher-Yates shuffle — every permutation is equally likely
    items.shuffle(&mut rand::thread_rng());

    let total     = items.len();
    let train_end = (total as f64 * ratio.train) as usize;
    let valid_end = train_end + (total as f64 * ratio.valid) as usize;

    // split_off(n) removes elements [n..] and returns them, so we
    // peel the test partition off first, then the validation one
    let test  = items.split_off(valid_end.min(total));
    let valid = items.split_off(train_end.min(total));

    tracing::debug!(
        "Dataset split: {} train, {} valid, {} test",
        items.len(),
        valid.len(),
        test.len(),
    );

    Ok((items, valid, test))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_partition_sizes_follow_floors() {
        let items: Vec<usize> = (0..100).collect();
        let (train, valid, test) =
            split_three(items, &SplitRatio::new(0.7, 0.2, 0.1)).unwrap();
        assert_eq!(train.len(), 70);
        assert_eq!(valid.len(), 20);
        assert_eq!(test.len(),  10);
    }

    #[test]
    fn test_no_element_duplicated_or_dropped() {
        let items: Vec<usize> = (0..103).collect();
        let (train, valid, test) =
            split_three(items, &SplitRatio::new(0.7, 0.2, 0.1)).unwrap();

        assert_eq!(train.len() + valid.len() + test.len(), 103);

        let mut seen = HashSet::new();
        for x in train.iter().chain(valid.iter()).chain(test.iter()) {
            assert!(seen.insert(*x), "element {} appeared twice", x);
        }
    }

    #[test]
    fn test_rounding_slack_goes_to_test() {
        // floor(7 * 0.7) = 4, floor(7 * 0.2) = 1, remainder 2
        let items: Vec<usize> = (0..7).collect();
        let (train, valid, test) =
            split_three(items, &SplitRatio::new(0.7, 0.2, 0.1)).unwrap();
        assert_eq!(train.len(), 4);
        assert_eq!(valid.len(), 1);
        assert_eq!(test.len(),  2);
    }

    #[test]
    fn test_everything_to_train() {
        let items: Vec<usize> = (0..10).collect();
        let (train, valid, test) =
            split_three(items, &SplitRatio::new(1.0, 0.0, 0.0)).unwrap();
        assert_eq!(train.len(), 10);
        assert!(valid.is_empty());
        assert!(test.is_empty());
    }

    #[test]
    fn test_invalid_ratio_fails_before_splitting() {
        let items: Vec<usize> = (0..10).collect();
        assert!(split_three(items, &SplitRatio::new(0.5, 0.2, 0.1)).is_err());
    }

    #[test]
    fn test_empty_input() {
        let items: Vec<usize> = Vec::new();
        let (train, valid, test) =
            split_three(items, &SplitRatio::default()).unwrap();
        assert!(train.is_empty() && valid.is_empty() && test.is_empty());
    }
}
