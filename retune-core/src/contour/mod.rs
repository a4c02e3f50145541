//! F0 contour cleaning and curve smoothing

pub mod kernel;
pub mod smoother;

pub use kernel::SinusoidalKernel;
pub use smoother::{
    interpolate_unvoiced, median_filter, remove_outliers, smooth_f0, smooth_transitions,
};
