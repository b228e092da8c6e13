//! Keyword-based tone recommendation.
//!
//! Each tone has a small table of weighted keywords. A source scores one
//! weight per keyword occurrence; tones that reach [`MIN_SCORE`] are
//! recommended, ordered by score plus a little random jitter so that close
//! calls don't always come out the same way.

use postcraft_models::Tone;
use rand::Rng;

/// Minimum base score for a tone to be recommended.
pub const MIN_SCORE: f64 = 1.0;

/// Upper bound (exclusive) of the random jitter added before ranking.
pub const MAX_JITTER: f64 = 0.5;

/// Maximum number of recommendations.
pub const MAX_RECOMMENDATIONS: usize = 3;

/// Returned when no tone reaches [`MIN_SCORE`].
pub const DEFAULT_RECOMMENDATIONS: [Tone; 2] = [Tone::BehindTheBuild, Tone::ProblemSolutionResult];

const BEHIND_THE_BUILD: &[(&str, f64)] = &[
    ("built", 1.5),
    ("build", 1.5),
    ("building", 1.5),
    ("implemented", 1.5),
    ("architecture", 2.0),
    ("designed", 1.5),
    ("setup", 1.0),
    ("configured", 1.0),
    ("integrated", 1.5),
    ("prototype", 1.5),
    ("refactored", 1.5),
    ("tooling", 1.0),
];

const WHAT_BROKE: &[(&str, f64)] = &[
    ("bug", 2.0),
    ("bugs", 2.0),
    ("broke", 2.5),
    ("broken", 2.0),
    ("crash", 2.0),
    ("crashed", 2.0),
    ("error", 1.5),
    ("errors", 1.5),
    ("failed", 2.0),
    ("failure", 2.0),
    ("debug", 1.5),
    ("debugging", 1.5),
    ("outage", 2.5),
    ("regression", 2.0),
];

const FINISHED_AND_PROUD: &[(&str, f64)] = &[
    ("shipped", 2.5),
    ("launched", 2.5),
    ("released", 2.0),
    ("finished", 2.0),
    ("completed", 2.0),
    ("done", 1.0),
    ("milestone", 2.0),
    ("deployed", 1.5),
    ("live", 1.0),
    ("proud", 2.0),
];

const PROBLEM_SOLUTION_RESULT: &[(&str, f64)] = &[
    ("problem", 2.0),
    ("solution", 2.0),
    ("solved", 2.0),
    ("result", 1.5),
    ("results", 1.5),
    ("fixed", 1.5),
    ("improved", 1.5),
    ("faster", 1.5),
    ("reduced", 1.5),
    ("saves", 1.5),
    ("saved", 1.5),
    ("automated", 1.5),
    ("automation", 1.5),
];

const MINI_LESSON: &[(&str, f64)] = &[
    ("learned", 2.5),
    ("lesson", 2.5),
    ("lessons", 2.5),
    ("tip", 2.0),
    ("tips", 2.0),
    ("realized", 2.0),
    ("insight", 2.0),
    ("mistake", 1.5),
    ("advice", 2.0),
    ("takeaway", 2.0),
];

fn keywords(tone: Tone) -> &'static [(&'static str, f64)] {
    match tone {
        Tone::BehindTheBuild => BEHIND_THE_BUILD,
        Tone::WhatBroke => WHAT_BROKE,
        Tone::FinishedAndProud => FINISHED_AND_PROUD,
        Tone::ProblemSolutionResult => PROBLEM_SOLUTION_RESULT,
        Tone::MiniLesson => MINI_LESSON,
    }
}

/// A tone with its keyword score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneScore {
    pub tone: Tone,
    pub score: f64,
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Deterministic keyword scores for every tone, highest first.
///
/// Ties keep the order of [`Tone::ALL`].
pub fn score_tones(text: &str) -> Vec<ToneScore> {
    let words = words(text);
    let mut scores: Vec<ToneScore> = Tone::ALL
        .into_iter()
        .map(|tone| {
            let score = words
                .iter()
                .filter_map(|w| {
                    keywords(tone)
                        .iter()
                        .find(|(k, _)| k == w)
                        .map(|(_, weight)| *weight)
                })
                .sum();
            ToneScore { tone, score }
        })
        .collect();
    scores.sort_by(|a, b| b.score.total_cmp(&a.score));
    scores
}

/// Recommend up to three tones for `text`, with jitter drawn from `rng`.
pub fn recommend_tones_with_rng<R: Rng>(text: &str, rng: &mut R) -> Vec<Tone> {
    let mut ranked: Vec<(Tone, f64)> = score_tones(text)
        .into_iter()
        .filter(|s| s.score >= MIN_SCORE)
        .map(|s| (s.tone, s.score + rng.gen_range(0.0..MAX_JITTER)))
        .collect();

    if ranked.is_empty() {
        return DEFAULT_RECOMMENDATIONS.to_vec();
    }

    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
        .into_iter()
        .take(MAX_RECOMMENDATIONS)
        .map(|(tone, _)| tone)
        .collect()
}

/// Recommend up to three tones for `text` using the thread-local RNG.
pub fn recommend_tones(text: &str) -> Vec<Tone> {
    recommend_tones_with_rng(text, &mut rand::thread_rng())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn score_of(text: &str, tone: Tone) -> f64 {
        score_tones(text)
            .into_iter()
            .find(|s| s.tone == tone)
            .map(|s| s.score)
            .unwrap()
    }

    #[test]
    fn test_every_weight_is_at_least_one() {
        for tone in Tone::ALL {
            for (keyword, weight) in keywords(tone) {
                assert!(*weight >= 1.0, "{} has weight {}", keyword, weight);
            }
        }
    }

    #[test]
    fn test_keyword_raises_score_by_at_least_one() {
        let base = "I spent the afternoon on the thing.";
        for tone in Tone::ALL {
            for (keyword, _) in keywords(tone) {
                let with_keyword = format!("{} {}", base, keyword);
                let delta = score_of(&with_keyword, tone) - score_of(base, tone);
                assert!(delta >= 1.0, "{} only raised {:?} by {}", keyword, tone, delta);
            }
        }
    }

    #[test]
    fn test_matching_is_case_insensitive_whole_word() {
        assert_eq!(score_of("BUG", Tone::WhatBroke), 2.0);
        assert_eq!(score_of("debugger", Tone::WhatBroke), 0.0);
    }

    #[test]
    fn test_repeated_keywords_accumulate() {
        assert_eq!(score_of("bug bug bug", Tone::WhatBroke), 6.0);
    }

    #[test]
    fn test_scores_sorted_descending() {
        let scores = score_tones("I learned a lesson after the crash");
        assert_eq!(scores[0].tone, Tone::MiniLesson);
        assert!(scores.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_no_keywords_returns_default_pair() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(
            recommend_tones_with_rng("hello world", &mut rng),
            DEFAULT_RECOMMENDATIONS.to_vec()
        );
        assert_eq!(recommend_tones_with_rng("", &mut rng), DEFAULT_RECOMMENDATIONS.to_vec());
    }

    #[test]
    fn test_at_most_three_and_only_qualifying() {
        let text = "I built it, it broke, I shipped the fix, solved the problem and learned a lesson.";
        let mut rng = StdRng::seed_from_u64(42);
        let recommended = recommend_tones_with_rng(text, &mut rng);
        assert_eq!(recommended.len(), MAX_RECOMMENDATIONS);

        let mut rng = StdRng::seed_from_u64(42);
        let single = recommend_tones_with_rng("The bug was nasty", &mut rng);
        assert_eq!(single, vec![Tone::WhatBroke]);
    }

    #[test]
    fn test_jitter_never_overturns_clear_winner() {
        // A lead of more than MAX_JITTER always survives.
        let text = "outage outage shipped";
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let recommended = recommend_tones_with_rng(text, &mut rng);
            assert_eq!(recommended[0], Tone::WhatBroke);
        }
    }

    #[test]
    fn test_seeded_rng_is_deterministic() {
        let text = "built shipped learned";
        let a = recommend_tones_with_rng(text, &mut StdRng::seed_from_u64(3));
        let b = recommend_tones_with_rng(text, &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn test_bot_scenario_recommends_problem_solution() {
        let text = "I built a bot. It saves me time.";
        let recommended = recommend_tones(text);
        assert!(recommended.contains(&Tone::BehindTheBuild));
        assert!(recommended.contains(&Tone::ProblemSolutionResult));
        assert_eq!(recommended.len(), 2);
    }
}
