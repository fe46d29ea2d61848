//! Categorical cross-entropy on probabilities and categorical accuracy.

use tch::{Kind, Tensor};

/// Probability clamp applied before the log.
pub const EPSILON: f64 = 1e-7;

/// Mean categorical cross-entropy of `pred` (probabilities, not logits)
/// against `target`, both [batch, classes].
///
/// Predictions are renormalised to sum to one per row and clamped to
/// `[EPSILON, 1 - EPSILON]`.
pub fn categorical_cross_entropy(pred: &Tensor, target: &Tensor) -> Tensor {
    let pred = pred / pred.sum_dim_intlist(&[-1_i64][..], true, Kind::Float);
    let pred = pred.clamp(EPSILON, 1.0 - EPSILON);
    -(target * pred.log())
        .sum_dim_intlist(&[-1_i64][..], false, Kind::Float)
        .mean(Kind::Float)
}

/// Fraction of rows whose predicted argmax equals the target argmax.
pub fn categorical_accuracy(pred: &Tensor, target: &Tensor) -> Tensor {
    pred.argmax(-1, false)
        .eq_tensor(&target.argmax(-1, false))
        .to_kind(Kind::Float)
        .mean(Kind::Float)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross_entropy_matches_hand_computation() {
        let pred = Tensor::from_slice(&[0.7f32, 0.2, 0.1, 0.25, 0.25, 0.5]).view([2, 3]);
        let target = Tensor::from_slice(&[1.0f32, 0.0, 0.0, 0.0, 0.5, 0.5]).view([2, 3]);

        let loss = categorical_cross_entropy(&pred, &target).double_value(&[]);
        let expected = (-(0.7f64).ln() + -(0.5 * 0.25f64.ln() + 0.5 * 0.5f64.ln())) / 2.0;

        assert!((loss - expected).abs() < 1e-5, "{loss} vs {expected}");
    }

    #[test]
    fn test_cross_entropy_renormalises_predictions() {
        let pred = Tensor::from_slice(&[2.0f32, 2.0]).view([1, 2]);
        let target = Tensor::from_slice(&[1.0f32, 0.0]).view([1, 2]);

        let loss = categorical_cross_entropy(&pred, &target).double_value(&[]);
        assert!((loss - 2f64.ln()).abs() < 1e-5);
    }

    #[test]
    fn test_cross_entropy_is_finite_for_zero_probability() {
        let pred = Tensor::from_slice(&[1.0f32, 0.0]).view([1, 2]);
        let target = Tensor::from_slice(&[0.0f32, 1.0]).view([1, 2]);

        let loss = categorical_cross_entropy(&pred, &target).double_value(&[]);
        assert!(loss.is_finite());
        assert!((loss - -(EPSILON.ln())).abs() < 1e-2);
    }

    #[test]
    fn test_categorical_accuracy() {
        let pred = Tensor::from_slice(&[0.6f32, 0.4, 0.3, 0.7, 0.9, 0.1]).view([3, 2]);
        let target = Tensor::from_slice(&[1.0f32, 0.0, 1.0, 0.0, 1.0, 0.0]).view([3, 2]);

        let acc = categorical_accuracy(&pred, &target).double_value(&[]);
        assert!((acc - 2.0 / 3.0).abs() < 1e-6);
    }
}
