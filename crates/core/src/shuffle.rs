//! Uniform shuffling that leaves the input untouched.

use rand::Rng;

/// Returns a uniformly random permutation of `items`.
///
/// Fisher–Yates from the last index down to 1, swapping with a uniform pick
/// in `[0, i]`.
#[must_use]
pub fn shuffled<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut out = items.to_vec();
    for i in (1..out.len()).rev() {
        let j = rng.random_range(0..=i);
        out.swap(i, j);
    }
    out
}

/// [`shuffled`] with the thread-local generator.
#[must_use]
pub fn shuffled_default<T: Clone>(items: &[T]) -> Vec<T> {
    shuffled(items, &mut rand::rng())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn output_is_permutation_and_input_untouched() {
        let input: Vec<u32> = (0..50).collect();
        let snapshot = input.clone();
        let mut rng = StdRng::seed_from_u64(7);

        let out = shuffled(&input, &mut rng);

        assert_eq!(input, snapshot);
        assert_eq!(out.len(), input.len());
        let mut sorted = out.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, input);
    }

    #[test]
    fn duplicates_are_preserved() {
        let input = vec!["a", "a", "b", "c"];
        let mut out = shuffled(&input, &mut StdRng::seed_from_u64(1));
        out.sort_unstable();
        assert_eq!(out, vec!["a", "a", "b", "c"]);
    }

    #[test]
    fn short_inputs_are_copied() {
        let empty: Vec<u8> = Vec::new();
        assert!(shuffled_default(&empty).is_empty());
        assert_eq!(shuffled_default(&[5]), vec![5]);
    }

    #[test]
    fn every_order_of_three_shows_up() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..600 {
            seen.insert(shuffled(&[1, 2, 3], &mut rng));
        }
        assert_eq!(seen.len(), 6);
    }
}
