//! Parameter initialization helpers.
//!
//! The graph itself is purely symbolic: `Parameter` nodes carry no values.
//! These helpers produce concrete `ndarray` buffers matching the parameter
//! shapes recorded by the model, for whatever runtime eventually executes
//! the graph.

use ndarray::{ArrayD, IxDyn};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;

/// Glorot (Xavier) uniform initialization: `U(-limit, limit)` with
/// `limit = sqrt(6 / (fan_in + fan_out))`.
///
/// Fan values are derived from the parameter shape:
/// - `[in, out]` for dense weights;
/// - `[out, in, kH, kW]` for convolution kernels, where the receptive field
///   size multiplies both fans.
pub fn glorot_uniform(shape: &[usize]) -> ArrayD<f32> {
    let (fan_in, fan_out) = match shape {
        [fan_in, fan_out] => (*fan_in, *fan_out),
        [out_c, in_c, kh, kw] => {
            let receptive = kh * kw;
            (in_c * receptive, out_c * receptive)
        }
        other => {
            let n: usize = other.iter().product();
            (n, n)
        }
    };

    let denom = (fan_in + fan_out).max(1);
    let limit = (6.0 / denom as f32).sqrt();
    ArrayD::random(IxDyn(shape), Uniform::new(-limit, limit))
}

/// Zero-filled buffer, used for biases and the batch-norm shift.
pub fn zeros(shape: &[usize]) -> ArrayD<f32> {
    ArrayD::zeros(IxDyn(shape))
}

/// One-filled buffer, used for the batch-norm scale.
pub fn ones(shape: &[usize]) -> ArrayD<f32> {
    ArrayD::ones(IxDyn(shape))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn glorot_respects_limit_for_dense_weights() {
        let w = glorot_uniform(&[100, 50]);
        let limit = (6.0f32 / 150.0).sqrt();
        assert_eq!(w.shape(), &[100, 50]);
        assert!(w.iter().all(|&v| v > -limit && v < limit));
    }

    #[test]
    fn glorot_uses_receptive_field_for_conv_kernels() {
        let w = glorot_uniform(&[32, 1, 3, 3]);
        let limit = (6.0f32 / ((1 * 9) + (32 * 9)) as f32).sqrt();
        assert_eq!(w.shape(), &[32, 1, 3, 3]);
        assert!(w.iter().all(|&v| v.abs() < limit));
    }

    #[test]
    fn zeros_and_ones_have_expected_values() {
        let z = zeros(&[4, 1, 1]);
        let o = ones(&[4, 1, 1]);
        assert_abs_diff_eq!(z.sum(), 0.0);
        assert_abs_diff_eq!(o.sum(), 4.0);
    }
}
