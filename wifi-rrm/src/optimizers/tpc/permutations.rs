//! Ordered combinations with repetition.
//!
//! Combinations are numbered in lexicographic order over the positions of
//! `choices`, with the first slot varying slowest. Index `i` is `i` written in
//! base `choices.len()`, most significant digit first.

/// Number of length-`n` combinations over `k` choices, or `None` on overflow.
pub fn combination_count(k: usize, n: usize) -> Option<usize> {
    let n = u32::try_from(n).ok()?;
    k.checked_pow(n)
}

/// The combination at `index` in enumeration order.
///
/// `index` must be below `combination_count(choices.len(), n)`.
pub fn combination_at<T: Clone>(choices: &[T], n: usize, index: usize) -> Vec<T> {
    let k = choices.len();
    let mut digits = vec![0usize; n];
    let mut rest = index;
    for digit in digits.iter_mut().rev() {
        *digit = rest % k;
        rest /= k;
    }
    digits.into_iter().map(|d| choices[d].clone()).collect()
}

/// Every length-`n` ordered combination with repetition over `choices`.
///
/// Produces `choices.len()^n` combinations; `n == 0` yields one empty
/// combination and empty `choices` with `n > 0` yields none.
pub fn permutations_with_repetition<T: Clone>(choices: &[T], n: usize) -> Vec<Vec<T>> {
    let Some(total) = combination_count(choices.len(), n) else {
        return Vec::new();
    };
    (0..total).map(|index| combination_at(choices, n, index)).collect()
}
