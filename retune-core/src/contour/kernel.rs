//! Sinusoidal smoothing convolution 1-D filter
//!
//! Smooths a scalar curve by convolving it with a normalized half-sine
//! kernel. Takes the jitter out of inferred pitch curves without flattening
//! larger gestures; works on any real-valued sequence.

use std::f64::consts::PI;

/// Reusable 1-D sinusoidal convolution smoother
pub struct SinusoidalKernel {
    /// Kernel length in samples
    kernel_size: usize,

    /// Precomputed half-sine weights, normalized to sum to 1
    kernel: Vec<f64>,
}

impl SinusoidalKernel {
    /// Create a smoother with the given kernel size
    ///
    /// # Arguments
    /// * `kernel_size` - Kernel length in samples; larger = more smoothing.
    ///   A size of 0 is clamped to 1, which makes the transform the identity.
    pub fn new(kernel_size: usize) -> Self {
        let kernel_size = kernel_size.max(1);

        let kernel = if kernel_size > 1 {
            let step = 1.0 / (kernel_size - 1) as f64;

            let mut kernel: Vec<f64> = (0..kernel_size)
                .map(|i| (PI * i as f64 * step).sin())
                .collect();

            // Normalize so a constant input maps to the same constant
            let kernel_sum: f64 = kernel.iter().sum();
            let inv_kernel_sum = 1.0 / kernel_sum;
            for w in kernel.iter_mut() {
                *w *= inv_kernel_sum;
            }

            kernel
        } else {
            vec![1.0]
        };

        Self {
            kernel_size,
            kernel,
        }
    }

    /// Apply the smoothing convolution
    ///
    /// "Same" convolution: the input is edge-padded by repeating its first
    /// and last values, so the output has the same length as the input.
    ///
    /// # Arguments
    /// * `x` - Input values to smooth
    ///
    /// # Returns
    /// Smoothed output values, one per input value
    pub fn forward(&self, x: &[f64]) -> Vec<f64> {
        if self.kernel_size == 1 || x.is_empty() {
            return x.to_vec();
        }

        let k = self.kernel_size;
        let total_pad = k - 1;
        let left_pad = total_pad / 2;
        let right_pad = total_pad - left_pad;

        let mut padded = Vec::with_capacity(x.len() + total_pad);
        padded.resize(left_pad, x[0]);
        padded.extend_from_slice(x);
        padded.resize(padded.len() + right_pad, x[x.len() - 1]);

        let mut output = Vec::with_capacity(x.len());
        for i in 0..x.len() {
            let mut conv_sum = 0.0;
            for (j, &w) in self.kernel.iter().enumerate() {
                conv_sum += padded[i + j] * w;
            }
            output.push(conv_sum);
        }

        output
    }

    /// Apply smoothing to f32 values (convenience wrapper over [`Self::forward`])
    pub fn smooth(&self, x: &[f32]) -> Vec<f32> {
        let x_double: Vec<f64> = x.iter().map(|&v| v as f64).collect();
        self.forward(&x_double).into_iter().map(|v| v as f32).collect()
    }

    /// Get the kernel size
    pub fn kernel_size(&self) -> usize {
        self.kernel_size
    }

    /// Get the normalized kernel weights
    pub fn weights(&self) -> &[f64] {
        &self.kernel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_weights_sum_to_one() {
        for size in 1..=25 {
            let kernel = SinusoidalKernel::new(size);
            let sum: f64 = kernel.weights().iter().sum();
            assert!(
                (sum - 1.0).abs() < 1e-12,
                "kernel size {} sums to {}",
                size,
                sum
            );
        }
    }

    #[test]
    fn test_size_one_is_identity() {
        let kernel = SinusoidalKernel::new(1);
        let x = vec![1.0, -2.0, 3.5, 0.0];
        assert_eq!(kernel.forward(&x), x);
    }

    #[test]
    fn test_zero_size_clamps_to_one() {
        let kernel = SinusoidalKernel::new(0);
        assert_eq!(kernel.kernel_size(), 1);
        let x = vec![4.0, 5.0];
        assert_eq!(kernel.forward(&x), x);
    }

    #[test]
    fn test_constant_signal_invariance() {
        for size in [2, 3, 5, 8, 15] {
            let kernel = SinusoidalKernel::new(size);
            let x = vec![440.0; 32];
            let y = kernel.forward(&x);
            assert_eq!(y.len(), x.len());
            for v in y {
                assert!((v - 440.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_output_length_matches_input() {
        let kernel = SinusoidalKernel::new(9);
        for len in [1, 2, 5, 100] {
            let x: Vec<f64> = (0..len).map(|i| i as f64).collect();
            assert_eq!(kernel.forward(&x).len(), len);
        }
    }

    #[test]
    fn test_empty_input() {
        let kernel = SinusoidalKernel::new(7);
        assert!(kernel.forward(&[]).is_empty());
    }

    #[test]
    fn test_smooths_a_spike() {
        let kernel = SinusoidalKernel::new(5);
        let mut x = vec![100.0; 21];
        x[10] = 200.0;
        let y = kernel.forward(&x);
        // Spike energy spreads but the peak stays at the center
        assert!(y[10] < 200.0);
        assert!(y[10] > y[8]);
        assert!(y[9] > 100.0 && y[11] > 100.0);
    }

    #[test]
    fn test_f32_adapter_matches_forward() {
        let kernel = SinusoidalKernel::new(7);
        let x_f32: Vec<f32> = (0..50).map(|i| 100.0 + (i as f32 * 0.3).sin() * 10.0).collect();
        let x_f64: Vec<f64> = x_f32.iter().map(|&v| v as f64).collect();
        let from_adapter = kernel.smooth(&x_f32);
        let from_forward = kernel.forward(&x_f64);
        for (a, b) in from_adapter.iter().zip(from_forward.iter()) {
            assert!((*a as f64 - b).abs() < 1e-4);
        }
    }
}
