//! Frontier partitioning: split the depth-1 link list into one contiguous
//! slice per worker.

/// Split `titles` into exactly `n` contiguous, non-overlapping slices whose
/// concatenation reproduces the input.
///
/// Slice `i` takes `ceil(remaining / slices_left)` items, so earlier slices
/// receive the ceiling-sized chunks and trailing slices shrink (or are
/// empty when the input has fewer than `n` items). The rule is mechanical
/// and deterministic; tests depend on the exact sizes.
///
/// # Panics
///
/// Panics if `n` is zero.
pub fn partition(titles: Vec<String>, n: usize) -> Vec<Vec<String>> {
    assert!(n > 0, "partition requires at least one slice");

    let mut slices = Vec::with_capacity(n);
    let mut rest = titles;
    for slices_left in (1..=n).rev() {
        let take = rest.len().div_ceil(slices_left);
        let remainder = rest.split_off(take);
        slices.push(rest);
        rest = remainder;
    }
    slices
}
