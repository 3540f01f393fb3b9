//! Verdict functions: tolerance band, ordering and label checks.

use crate::model::Verdict;

/// Default half-width of the accepted ratio band.
pub const DEFAULT_TOLERANCE: f64 = 0.1;

/// Compare a student entry against the recomputed reference.
///
/// Correct when `student / reference` lies in `[1 - tolerance, 1 + tolerance]`,
/// or when both are exactly zero. A missing entry is Incorrect.
pub fn check_tolerance(student: Option<f64>, reference: f64, tolerance: f64) -> Verdict {
    let Some(student) = student else {
        return Verdict::Incorrect;
    };
    if student == 0.0 && reference == 0.0 {
        return Verdict::Correct;
    }
    if reference == 0.0 {
        return Verdict::Incorrect;
    }
    let ratio = student / reference;
    Verdict::from_bool(ratio.is_finite() && ratio >= 1.0 - tolerance && ratio <= 1.0 + tolerance)
}

/// Per-row check that a sequence never increases.
///
/// The first row is compared with the next one, the last row with the
/// previous one, interior rows with both neighbours.
pub fn check_non_increasing(values: &[f64]) -> Vec<Verdict> {
    let n = values.len();
    (0..n)
        .map(|i| {
            let left_ok = i == 0 || values[i] <= values[i - 1];
            let right_ok = i + 1 == n || values[i] >= values[i + 1];
            Verdict::from_bool(left_ok && right_ok)
        })
        .collect()
}

/// A single verdict for a chromatogram: the first Rf must be exactly 1 and
/// every following Rf strictly smaller than the one before.
pub fn check_rf_sequence(values: &[f64]) -> Verdict {
    match values.first() {
        Some(first) if *first == 1.0 => {
            Verdict::from_bool(values.windows(2).all(|w| w[1] < w[0]))
        }
        _ => Verdict::Incorrect,
    }
}

fn same_label(actual: &str, expected: &str) -> bool {
    actual.trim().to_lowercase() == expected.trim().to_lowercase()
}

/// Case-insensitive comparison of one label.
pub fn check_label(actual: Option<&str>, expected: &str) -> Verdict {
    Verdict::from_bool(actual.is_some_and(|a| same_label(a, expected)))
}

/// Label comparison by slot: each `(slot, label)` is checked against
/// `expected[slot]`, so gaps between slots do not shift the expectations.
/// Slots without an expected label are Incorrect.
pub fn check_labels(actual: &[(usize, Option<String>)], expected: &[&str]) -> Vec<Verdict> {
    actual
        .iter()
        .map(|(slot, a)| match expected.get(*slot) {
            Some(e) => check_label(a.as_deref(), e),
            None => Verdict::Incorrect,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use Verdict::{Correct, Incorrect};

    #[test]
    fn tolerance_band_is_inclusive() {
        assert_eq!(check_tolerance(Some(0.9), 1.0, 0.1), Correct);
        assert_eq!(check_tolerance(Some(1.1), 1.0, 0.1), Correct);
        assert_eq!(check_tolerance(Some(0.89), 1.0, 0.1), Incorrect);
        assert_eq!(check_tolerance(Some(1.11), 1.0, 0.1), Incorrect);
    }

    #[test]
    fn tolerance_works_for_negative_references() {
        assert_eq!(check_tolerance(Some(-0.25), -0.24, 0.1), Correct);
        assert_eq!(check_tolerance(Some(0.25), -0.24, 0.1), Incorrect);
    }

    #[test]
    fn zero_reference_only_accepts_zero() {
        assert_eq!(check_tolerance(Some(0.0), 0.0, 0.1), Correct);
        assert_eq!(check_tolerance(Some(0.01), 0.0, 0.1), Incorrect);
        assert_eq!(check_tolerance(Some(0.0), 2.0, 0.1), Incorrect);
    }

    #[test]
    fn missing_or_nan_entries_are_incorrect() {
        assert_eq!(check_tolerance(None, 1.0, 0.1), Incorrect);
        assert_eq!(check_tolerance(Some(f64::NAN), 1.0, 0.1), Incorrect);
        assert_eq!(check_tolerance(Some(1.0), f64::NAN, 0.1), Incorrect);
    }

    #[test]
    fn ratio_property_over_a_grid() {
        for r in [-3.0, -0.5, 0.02, 1.0, 7.5] {
            for k in 0..=40 {
                let ratio = 0.8 + k as f64 * 0.01;
                let s = r * ratio;
                let expected = Verdict::from_bool((0.9..=1.1).contains(&(s / r)));
                assert_eq!(check_tolerance(Some(s), r, 0.1), expected, "s={s} r={r}");
            }
        }
    }

    #[test]
    fn non_increasing_sequences() {
        assert_eq!(
            check_non_increasing(&[90.0, 70.0, 40.0, 10.0]),
            vec![Correct; 4]
        );
        let tags = check_non_increasing(&[90.0, 70.0, 80.0, 10.0]);
        assert_eq!(tags[2], Incorrect);
        assert_eq!(tags, vec![Correct, Incorrect, Incorrect, Correct]);
        assert_eq!(check_non_increasing(&[5.0]), vec![Correct]);
        assert_eq!(check_non_increasing(&[50.0, 50.0]), vec![Correct, Correct]);
        assert!(check_non_increasing(&[]).is_empty());
    }

    #[test]
    fn rf_sequence() {
        assert_eq!(check_rf_sequence(&[1.0, 0.8, 0.5, 0.1]), Correct);
        assert_eq!(check_rf_sequence(&[0.95, 0.8]), Incorrect);
        assert_eq!(check_rf_sequence(&[1.0, 0.8, 0.8]), Incorrect);
        assert_eq!(check_rf_sequence(&[]), Incorrect);
    }

    #[test]
    fn labels_are_case_insensitive() {
        assert_eq!(check_label(Some(" ficocianina"), "Ficocianina"), Correct);
        assert_eq!(check_label(None, "Ficocianina"), Incorrect);
        let tags = check_labels(
            &[(0, Some("Clorofila A".into())), (1, None), (2, Some("x".into()))],
            &["Clorofila a", "Clorofila b"],
        );
        assert_eq!(tags, vec![Correct, Incorrect, Incorrect]);
        let gapped = check_labels(
            &[(0, Some("β-caroteno".into())), (2, Some("Clorofila b".into()))],
            &["β-caroteno", "Clorofila a", "Clorofila b"],
        );
        assert_eq!(gapped, vec![Correct, Correct]);
    }
}
