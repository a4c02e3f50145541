//! F0 contour cleaning stages
//!
//! Turns a raw, possibly glitchy per-frame pitch contour plus its voiced
//! mask into a contour suitable for natural-sounding synthesis. Each stage
//! is a pure function returning a new contour of identical length; voiced
//! flags are never rewritten. Malformed input (empty contour, mask length
//! mismatch) is returned unchanged.

/// Maximum allowed frame-to-frame pitch ratio before a frame counts as an outlier
pub const MAX_JUMP_RATIO: f32 = 1.5;

/// Median filter window used by the fixed pipeline
pub const MEDIAN_WINDOW: usize = 5;

/// Voiced-aware smoothing window used by the fixed pipeline
pub const TRANSITION_WINDOW: usize = 3;

/// Longest unvoiced gap (in frames) the fixed pipeline will interpolate across
pub const MAX_GAP_FRAMES: usize = 5;

/// Remove sudden pitch jumps that are likely estimation errors
///
/// Walks the contour left to right comparing each positive value against the
/// already-cleaned previous value. A frame whose ratio to its predecessor
/// exceeds `max_jump_ratio` (or falls below its reciprocal) is replaced with
/// the average of the cleaned previous and original next values, or with the
/// previous value alone when the next frame is not positive.
///
/// # Arguments
/// * `f0` - Input F0 values (non-positive = unvoiced/unknown)
/// * `max_jump_ratio` - Maximum allowed jump ratio (e.g. 1.5 = 50% change)
pub fn remove_outliers(f0: &[f32], max_jump_ratio: f32) -> Vec<f32> {
    if f0.is_empty() {
        return f0.to_vec();
    }

    let mut cleaned = f0.to_vec();

    for i in 1..cleaned.len() {
        let prev = cleaned[i - 1];
        let curr = f0[i];

        if curr > 0.0 && prev > 0.0 {
            let ratio = curr / prev;
            if ratio > max_jump_ratio || ratio < 1.0 / max_jump_ratio {
                let next = f0.get(i + 1).copied().unwrap_or(0.0);
                cleaned[i] = if next > 0.0 { (prev + next) / 2.0 } else { prev };
            }
        }
    }

    cleaned
}

/// Apply a voicing-aware median filter to reduce jitter
///
/// Only positive values inside the bounds-clipped symmetric window take part
/// in the median; when the window holds none, the input value passes through.
///
/// # Arguments
/// * `f0` - Input F0 values
/// * `window_size` - Window size in frames; even sizes are bumped to odd,
///   size 0 returns the input unchanged
pub fn median_filter(f0: &[f32], window_size: usize) -> Vec<f32> {
    if f0.is_empty() || window_size < 1 {
        return f0.to_vec();
    }

    // Ensure window size is odd
    let window_size = if window_size % 2 == 0 {
        window_size + 1
    } else {
        window_size
    };
    let half_window = window_size / 2;

    let mut smoothed = Vec::with_capacity(f0.len());
    let mut window = Vec::with_capacity(window_size);

    for i in 0..f0.len() {
        let start = i.saturating_sub(half_window);
        let end = (i + half_window).min(f0.len() - 1);

        window.clear();
        for &value in &f0[start..=end] {
            if value > 0.0 {
                window.push(value);
            }
        }

        if window.is_empty() {
            // No voiced frames in window, keep original
            smoothed.push(f0[i]);
        } else {
            window.sort_by(f32::total_cmp);
            let mid = window.len() / 2;
            if window.len() % 2 == 0 {
                smoothed.push((window[mid - 1] + window[mid]) / 2.0);
            } else {
                smoothed.push(window[mid]);
            }
        }
    }

    smoothed
}

/// Smooth pitch transitions with a Gaussian-like weighted average
///
/// Voiced frames with positive pitch are replaced by a weighted average over
/// the symmetric window, weighting offset `j` with `exp(-0.5 j^2 / (h^2 + 1))`
/// where `h` is the half window. Only neighbors that are themselves voiced
/// and positive contribute; unvoiced or non-positive frames pass through.
///
/// # Arguments
/// * `f0` - Input F0 values
/// * `voiced` - Voiced/unvoiced mask, one flag per frame
/// * `window_size` - Smoothing window size (clamped to at least 1)
pub fn smooth_transitions(f0: &[f32], voiced: &[bool], window_size: usize) -> Vec<f32> {
    if f0.is_empty() || f0.len() != voiced.len() {
        return f0.to_vec();
    }

    let half_window = (window_size.max(1) / 2) as i64;
    let mut smoothed = Vec::with_capacity(f0.len());

    for i in 0..f0.len() {
        if !voiced[i] || f0[i] <= 0.0 {
            smoothed.push(f0[i]);
            continue;
        }

        let mut sum = 0.0f32;
        let mut weight_sum = 0.0f32;

        for j in -half_window..=half_window {
            let idx = i as i64 + j;
            if idx < 0 || idx >= f0.len() as i64 {
                continue;
            }
            let idx = idx as usize;

            if voiced[idx] && f0[idx] > 0.0 {
                // Closer frames get more weight
                let weight =
                    (-0.5 * (j * j) as f32 / (half_window * half_window + 1) as f32).exp();
                sum += f0[idx] * weight;
                weight_sum += weight;
            }
        }

        if weight_sum > 0.0 {
            smoothed.push(sum / weight_sum);
        } else {
            smoothed.push(f0[i]);
        }
    }

    smoothed
}

/// Fill short unvoiced gaps by linear interpolation
///
/// Scans for maximal runs of unvoiced frames. A run of at most
/// `max_gap_frames` frames that does not touch the start of the contour and
/// has a positive voiced value on both sides is filled by interpolating
/// linearly between those boundary values. Gaps at the start, over-long
/// gaps, and gaps missing a boundary value (including trailing gaps) are
/// left unmodified.
///
/// # Arguments
/// * `f0` - Input F0 values
/// * `voiced` - Voiced/unvoiced mask, one flag per frame
/// * `max_gap_frames` - Longest gap, in frames, that will be filled
pub fn interpolate_unvoiced(f0: &[f32], voiced: &[bool], max_gap_frames: usize) -> Vec<f32> {
    if f0.is_empty() || f0.len() != voiced.len() {
        return f0.to_vec();
    }

    let mut interpolated = f0.to_vec();

    let mut gap_start = 0usize;
    let mut in_gap = false;

    for i in 0..f0.len() {
        if !voiced[i] && !in_gap {
            gap_start = i;
            in_gap = true;
        } else if voiced[i] && in_gap {
            let gap_end = i;
            let gap_len = gap_end - gap_start;

            if gap_len <= max_gap_frames && gap_start > 0 {
                let f0_prev = (0..gap_start)
                    .rev()
                    .find(|&j| voiced[j] && f0[j] > 0.0)
                    .map(|j| f0[j])
                    .unwrap_or(0.0);
                let f0_next = (gap_end..f0.len())
                    .find(|&j| voiced[j] && f0[j] > 0.0)
                    .map(|j| f0[j])
                    .unwrap_or(0.0);

                if f0_prev > 0.0 && f0_next > 0.0 {
                    for j in gap_start..gap_end {
                        let t = (j - gap_start) as f32 / gap_len as f32;
                        interpolated[j] = f0_prev * (1.0 - t) + f0_next * t;
                    }
                }
            }

            in_gap = false;
        }
    }

    interpolated
}

/// Full contour-cleaning pipeline
///
/// Fixed stage order: outlier removal, median filter, voiced-aware
/// transition smoothing, then unvoiced-gap interpolation, using the module
/// constants for all parameters.
pub fn smooth_f0(f0: &[f32], voiced: &[bool]) -> Vec<f32> {
    if f0.is_empty() || f0.len() != voiced.len() {
        return f0.to_vec();
    }

    let step = remove_outliers(f0, MAX_JUMP_RATIO);
    let step = median_filter(&step, MEDIAN_WINDOW);
    let step = smooth_transitions(&step, voiced, TRANSITION_WINDOW);
    interpolate_unvoiced(&step, voiced, MAX_GAP_FRAMES)
}
