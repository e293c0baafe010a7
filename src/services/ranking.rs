use rand::Rng;
use std::cmp::Ordering;

/// Scores within this distance of each other are ordered randomly
pub const FUZZY_TIE_THRESHOLD: f64 = 5.0;

/// Compares two scores for a descending ranking with fuzzy ties
///
/// Close scores get a random verdict in [-0.5, 0.5) instead of a stable one,
/// so near-equal games trade places between calls.
pub fn fuzzy_compare<R: Rng + ?Sized>(a: f64, b: f64, rng: &mut R) -> Ordering {
    let verdict = if (a - b).abs() <= FUZZY_TIE_THRESHOLD {
        rng.gen_range(-0.5..0.5)
    } else {
        b - a
    };

    verdict.partial_cmp(&0.0).unwrap_or(Ordering::Equal)
}

/// Top-down merge sort that tolerates comparators without a total order
///
/// `slice::sort_by` may panic when the comparator is inconsistent, which a
/// randomized comparator is by construction. Left elements win on `Equal`.
pub fn merge_sort_by<T, F>(items: Vec<T>, compare: &mut F) -> Vec<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    if items.len() <= 1 {
        return items;
    }

    let mut left = items;
    let right = left.split_off(left.len() / 2);
    let left = merge_sort_by(left, compare);
    let right = merge_sort_by(right, compare);

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();

    loop {
        let take_left = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => compare(l, r) != Ordering::Greater,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };

        if take_left {
            merged.extend(left.next());
        } else {
            merged.extend(right.next());
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_merge_sort_orders_consistent_comparator() {
        let sorted = merge_sort_by(vec![5, 3, 9, 1, 7, 2], &mut |a: &i32, b: &i32| a.cmp(b));
        assert_eq!(sorted, vec![1, 2, 3, 5, 7, 9]);
    }

    #[test]
    fn test_merge_sort_is_stable_on_equal() {
        let items = vec![(1, 'a'), (0, 'b'), (1, 'c'), (0, 'd')];
        let sorted = merge_sort_by(items, &mut |a: &(i32, char), b: &(i32, char)| a.0.cmp(&b.0));
        assert_eq!(sorted, vec![(0, 'b'), (0, 'd'), (1, 'a'), (1, 'c')]);
    }

    #[test]
    fn test_merge_sort_survives_random_comparator() {
        let mut rng = StdRng::seed_from_u64(7);
        let items: Vec<u32> = (0..200).collect();
        let sorted = merge_sort_by(items, &mut |_: &u32, _: &u32| {
            if rng.gen_bool(0.5) {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        });

        let mut check = sorted.clone();
        check.sort();
        assert_eq!(check, (0..200).collect::<Vec<u32>>());
    }

    #[test]
    fn test_fuzzy_compare_distant_scores_descend() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(fuzzy_compare(80.0, 20.0, &mut rng), Ordering::Less);
        assert_eq!(fuzzy_compare(20.0, 80.0, &mut rng), Ordering::Greater);
    }

    #[test]
    fn test_fuzzy_compare_close_scores_vary() {
        let mut rng = StdRng::seed_from_u64(3);
        let verdicts: Vec<Ordering> = (0..64)
            .map(|_| fuzzy_compare(50.0, 54.0, &mut rng))
            .collect();
        assert!(verdicts.contains(&Ordering::Less));
        assert!(verdicts.contains(&Ordering::Greater));
    }
}
