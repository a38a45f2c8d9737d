// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Post-processing for gesture classifier outputs.
//!
//! Turns the raw output row of a forward pass into [`GestureScores`] and a
//! single [`GestureLabel`].

use ndarray::Array1;

use crate::gesture::GestureLabel;
use crate::results::GestureScores;

/// Convert raw classifier output into per-label probabilities.
///
/// NaN entries become 0. Outputs that do not already sum to roughly 1 are
/// treated as logits and passed through a softmax.
#[must_use]
pub fn postprocess(output: &[f32]) -> GestureScores {
    let mut probs: Vec<f32> = output
        .iter()
        .map(|&v| if v.is_nan() { 0.0 } else { v })
        .collect();

    let sum: f32 = probs.iter().sum();
    if !probs.is_empty() && (sum - 1.0).abs() > 0.1 {
        let max_val = probs.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let exp_vals: Vec<f32> = probs.iter().map(|&v| (v - max_val).exp()).collect();
        let exp_sum: f32 = exp_vals.iter().sum();
        if exp_sum > 0.0 && exp_sum.is_finite() {
            probs = exp_vals.iter().map(|&v| v / exp_sum).collect();
        }
    }

    GestureScores::new(Array1::from_vec(probs))
}

/// Reduce raw classifier output to a label.
#[must_use]
pub fn decode_label(output: &[f32]) -> (GestureLabel, GestureScores) {
    let scores = postprocess(output);
    (scores.label(), scores)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probabilities_pass_through() {
        let scores = postprocess(&[0.1, 0.2, 0.7]);
        assert!((scores.data[2] - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_logits_get_softmax() {
        let scores = postprocess(&[2.0, 0.0, 0.0]);
        let total: f32 = scores.data.iter().sum();
        assert!((total - 1.0).abs() < 1e-5);
        assert!(scores.data[0] > scores.data[1]);
        assert_eq!(scores.top1(), Some(0));
    }

    #[test]
    fn test_nan_scores_handled() {
        let mut output = vec![f32::NAN; 25];
        output[GestureLabel::Punch.index()] = 5.0;
        let (label, scores) = decode_label(&output);
        assert_eq!(label, GestureLabel::Punch);
        assert!(scores.data.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_empty_output() {
        let (label, scores) = decode_label(&[]);
        assert_eq!(label, GestureLabel::None);
        assert!(scores.is_empty());
    }
}
