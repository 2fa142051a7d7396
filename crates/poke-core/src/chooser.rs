//! Weighted reply selection and the percentage roll used by command policies.
//!
//! Each call draws fresh randomness. The `*_with_rng` variants take the
//! generator explicitly so callers and tests can inject a seeded one.

use rand::Rng;

use crate::error::{PokeError, PokeResult};
use crate::types::ReplyTemplate;

/// Pick one template by weight using the thread-local generator.
pub fn pick(templates: &[ReplyTemplate]) -> PokeResult<&ReplyTemplate> {
    let mut rng = rand::thread_rng();
    pick_with_rng(&mut rng, templates)
}

/// Pick one template by weight with a provided generator.
///
/// A uniform draw `r` in `[0, total)` selects the first template whose
/// running weight sum exceeds `r`. Negative weights count as zero. When
/// every weight is zero the first template is returned.
pub fn pick_with_rng<'a, R: Rng + ?Sized>(
    rng: &mut R,
    templates: &'a [ReplyTemplate],
) -> PokeResult<&'a ReplyTemplate> {
    let first = templates.first().ok_or(PokeError::EmptyInput)?;

    let total: f64 = templates.iter().map(ReplyTemplate::effective_weight).sum();
    if total <= 0.0 {
        return Ok(first);
    }

    let r = rng.gen::<f64>() * total;
    let mut sum = 0.0;
    let mut last_weighted = first;
    for template in templates {
        let weight = template.effective_weight();
        if weight <= 0.0 {
            continue;
        }
        sum += weight;
        last_weighted = template;
        if r < sum {
            return Ok(template);
        }
    }

    // Rounding can leave r a hair above the final sum
    Ok(last_weighted)
}

/// Uniform draw in `[0, 100)` using the thread-local generator.
pub fn roll_percent() -> f64 {
    roll_percent_with_rng(&mut rand::thread_rng())
}

/// Uniform draw in `[0, 100)` with a provided generator.
pub fn roll_percent_with_rng<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen::<f64>() * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn seeded_rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn templates(weights: &[f64]) -> Vec<ReplyTemplate> {
        weights
            .iter()
            .enumerate()
            .map(|(i, w)| ReplyTemplate::new(format!("reply-{i}"), *w))
            .collect()
    }

    #[test]
    fn test_empty_input_is_an_error() {
        let err = pick(&[]).unwrap_err();
        assert!(matches!(err, PokeError::EmptyInput));
    }

    #[test]
    fn test_single_template() {
        let set = templates(&[5.0]);
        assert_eq!(pick(&set).unwrap().content, "reply-0");
    }

    #[test]
    fn test_all_zero_weights_pick_first() {
        let set = templates(&[0.0, 0.0, 0.0]);
        let mut rng = seeded_rng();
        for _ in 0..100 {
            assert_eq!(pick_with_rng(&mut rng, &set).unwrap().content, "reply-0");
        }
    }

    #[test]
    fn test_negative_weight_is_never_picked() {
        let set = templates(&[-50.0, 10.0]);
        let mut rng = seeded_rng();
        for _ in 0..1000 {
            assert_eq!(pick_with_rng(&mut rng, &set).unwrap().content, "reply-1");
        }
    }

    #[test]
    fn test_zero_weight_between_others_is_skipped() {
        let set = templates(&[10.0, 0.0, 10.0]);
        let mut rng = seeded_rng();
        for _ in 0..1000 {
            assert_ne!(pick_with_rng(&mut rng, &set).unwrap().content, "reply-1");
        }
    }

    #[test]
    fn test_weighted_distribution() {
        let set = templates(&[10.0, 90.0]);
        let mut rng = seeded_rng();
        let draws = 100_000;

        let first = (0..draws)
            .filter(|_| pick_with_rng(&mut rng, &set).unwrap().content == "reply-0")
            .count();

        let ratio = first as f64 / draws as f64;
        assert!(
            (ratio - 0.1).abs() < 0.01,
            "Ratio {} should be close to 0.1",
            ratio
        );
    }

    #[test]
    fn test_roll_percent_range() {
        let mut rng = seeded_rng();
        for _ in 0..10_000 {
            let roll = roll_percent_with_rng(&mut rng);
            assert!((0.0..100.0).contains(&roll));
        }
        assert!((0.0..100.0).contains(&roll_percent()));
    }
}
