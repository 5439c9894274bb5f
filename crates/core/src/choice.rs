//! Score-weighted random choice.

use std::cmp::Ordering;

use rand::Rng;
use slotlove_storage::ScoreTable;

/// Weight of a code with a positive score.
pub const LIKED_WEIGHT: f64 = 3.0;
/// Weight of a code with a zero or absent score.
pub const NEUTRAL_WEIGHT: f64 = 1.0;
/// Weight of a code with a negative score.
pub const DISLIKED_WEIGHT: f64 = 0.5;

/// Map a feedback score to a draw weight. Only the sign matters.
pub fn weight_for_score(score: i64) -> f64 {
    match score.cmp(&0) {
        Ordering::Greater => LIKED_WEIGHT,
        Ordering::Less => DISLIKED_WEIGHT,
        Ordering::Equal => NEUTRAL_WEIGHT,
    }
}

/// Draw one candidate with probability proportional to its score weight.
///
/// Returns `None` for an empty candidate list.
pub fn weighted_choice<'a, T, R>(candidates: &'a [T], scores: &ScoreTable, rng: &mut R) -> Option<&'a T>
where
    T: AsRef<str>,
    R: Rng,
{
    if candidates.is_empty() {
        return None;
    }

    let weights: Vec<f64> = candidates
        .iter()
        .map(|code| weight_for_score(scores.get(code.as_ref())))
        .collect();
    let total: f64 = weights.iter().sum();

    let mut roll = rng.gen_range(0.0..total);
    for (candidate, weight) in candidates.iter().zip(&weights) {
        if roll < *weight {
            return Some(candidate);
        }
        roll -= weight;
    }

    // Float rounding can leave a sliver past the last bucket.
    candidates.last()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn frequency_of(target: &str, candidates: &[&str], scores: &ScoreTable, draws: usize) -> f64 {
        let mut rng = StdRng::seed_from_u64(7);
        let hits = (0..draws)
            .filter(|_| weighted_choice(candidates, scores, &mut rng) == Some(&target))
            .count();
        hits as f64 / draws as f64
    }

    #[test]
    fn weights_follow_score_sign() {
        assert_eq!(weight_for_score(5), 3.0);
        assert_eq!(weight_for_score(1), 3.0);
        assert_eq!(weight_for_score(0), 1.0);
        assert_eq!(weight_for_score(-1), 0.5);
        assert_eq!(weight_for_score(-40), 0.5);
        assert_eq!(weight_for_score(1) / weight_for_score(0), 3.0);
        assert_eq!(weight_for_score(-1) / weight_for_score(0), 0.5);
    }

    #[test]
    fn empty_candidates_yield_none() {
        let mut rng = StdRng::seed_from_u64(1);
        let empty: [&str; 0] = [];
        assert_eq!(weighted_choice(&empty, &ScoreTable::new(), &mut rng), None);
    }

    #[test]
    fn single_candidate_always_chosen() {
        let mut rng = StdRng::seed_from_u64(1);
        let scores: ScoreTable = [("only", -3)].into_iter().collect();
        for _ in 0..100 {
            assert_eq!(weighted_choice(&["only"], &scores, &mut rng), Some(&"only"));
        }
    }

    #[test]
    fn liked_code_wins_three_quarters_against_neutral() {
        let scores: ScoreTable = [("x", 5)].into_iter().collect();
        let freq = frequency_of("x", &["x", "y"], &scores, 10_000);
        assert!((freq - 0.75).abs() < 0.03, "x frequency was {freq}");
    }

    #[test]
    fn disliked_code_drawn_at_half_weight() {
        let scores: ScoreTable = [("liked", 2), ("disliked", -2)].into_iter().collect();
        let candidates = ["liked", "neutral", "disliked"];
        let draws = 45_000;

        // Weights 3 : 1 : 0.5 over a total of 4.5.
        let liked = frequency_of("liked", &candidates, &scores, draws);
        let neutral = frequency_of("neutral", &candidates, &scores, draws);
        let disliked = frequency_of("disliked", &candidates, &scores, draws);

        assert!((liked - 3.0 / 4.5).abs() < 0.02, "liked {liked}");
        assert!((neutral - 1.0 / 4.5).abs() < 0.02, "neutral {neutral}");
        assert!((disliked - 0.5 / 4.5).abs() < 0.02, "disliked {disliked}");
    }

    #[test]
    fn works_over_owned_and_borrowed_codes() {
        let mut rng = StdRng::seed_from_u64(3);
        let owned = vec!["a".to_string(), "b".to_string()];
        let borrowed: Vec<&String> = owned.iter().collect();
        let scores = ScoreTable::new();

        let from_owned = weighted_choice(&owned, &scores, &mut rng).unwrap();
        let from_borrowed = weighted_choice(&borrowed, &scores, &mut rng).unwrap();
        assert!(owned.contains(from_owned));
        assert!(owned.contains(*from_borrowed));
    }
}
