//! Savitzky-Golay landmark smoothing
//!
//! Per-frame landmark coordinates off a webcam estimator are noisy; this
//! module smooths each coordinate axis of each landmark independently over a
//! sliding window of recent frames. The filter fits a local least-squares
//! polynomial over the window and evaluates it at the window center; the
//! resulting kernel is applied as a convolution and the output stands in for
//! the most recent sample.
//!
//! Degradation order: short history passes the raw latest value through, and
//! window/order combinations without a valid kernel fall back to an
//! unweighted moving average. The filter never errors.

use std::collections::VecDeque;

use crate::pose::{Landmark, PoseFrame};

/// A precomputed Savitzky-Golay convolution kernel for one (window, order) pair
#[derive(Debug, Clone)]
pub struct SavitzkyGolay {
    window: usize,
    /// Convolution kernel, oldest sample first; None means moving-average fallback
    kernel: Option<Vec<f64>>,
}

impl SavitzkyGolay {
    /// Build a filter for the given odd window size and polynomial order.
    ///
    /// Combinations the normal equations cannot support (even window, order
    /// not below the window, singular system) produce a fallback filter.
    pub fn new(window: usize, order: usize) -> Self {
        let kernel = compute_kernel(window, order);
        Self { window, kernel }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// True when this filter degraded to a moving average
    pub fn is_fallback(&self) -> bool {
        self.kernel.is_none()
    }

    /// Smooth the most recent sample of a history slice (oldest first).
    ///
    /// Histories shorter than the window return the raw latest value.
    pub fn apply(&self, history: &[f32]) -> f32 {
        let Some(&latest) = history.last() else {
            return 0.0;
        };
        if history.len() < self.window {
            return latest;
        }
        let window = &history[history.len() - self.window..];
        match &self.kernel {
            Some(kernel) => {
                let mut acc = 0.0f64;
                for (sample, coeff) in window.iter().zip(kernel.iter()) {
                    acc += f64::from(*sample) * coeff;
                }
                acc as f32
            }
            None => moving_average(window),
        }
    }
}

/// Unweighted mean over a window
pub fn moving_average(window: &[f32]) -> f32 {
    if window.is_empty() {
        return 0.0;
    }
    let sum: f64 = window.iter().map(|&v| f64::from(v)).sum();
    (sum / window.len() as f64) as f32
}

/// Compute the center-evaluation SG kernel.
///
/// Design matrix A over offsets -h..=h raised to powers 0..=order; the
/// kernel row is A * c where (A^T A) c = e and e selects the center sample
/// (which reduces to the unit vector in coefficient space since the center
/// offset is zero).
fn compute_kernel(window: usize, order: usize) -> Option<Vec<f64>> {
    if window == 0 || window % 2 == 0 || order >= window {
        return None;
    }
    let half = (window / 2) as i64;
    let terms = order + 1;

    // Normal matrix A^T A, entries are power sums of the offsets
    let mut ata = vec![vec![0.0f64; terms]; terms];
    for row in 0..terms {
        for col in 0..terms {
            let mut sum = 0.0;
            for d in -half..=half {
                sum += (d as f64).powi((row + col) as i32);
            }
            ata[row][col] = sum;
        }
    }

    // Right-hand side: center row of A, i.e. offset 0 raised to 0..=order
    let mut rhs = vec![0.0f64; terms];
    rhs[0] = 1.0;

    let coeffs = solve_gaussian(&mut ata, &mut rhs)?;

    // Kernel entry per window offset: evaluate the coefficient polynomial
    let kernel = (-half..=half)
        .map(|d| {
            let mut value = 0.0;
            let mut power = 1.0;
            for &c in &coeffs {
                value += c * power;
                power *= d as f64;
            }
            value
        })
        .collect();
    Some(kernel)
}

/// Gaussian elimination with partial pivoting; None on a singular system
fn solve_gaussian(matrix: &mut [Vec<f64>], rhs: &mut [f64]) -> Option<Vec<f64>> {
    let n = rhs.len();
    for col in 0..n {
        // Partial pivot: largest magnitude in this column
        let pivot_row = (col..n)
            .max_by(|&a, &b| {
                matrix[a][col]
                    .abs()
                    .partial_cmp(&matrix[b][col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);
        if matrix[pivot_row][col].abs() < 1e-12 {
            return None;
        }
        matrix.swap(col, pivot_row);
        rhs.swap(col, pivot_row);

        for row in (col + 1)..n {
            let factor = matrix[row][col] / matrix[col][col];
            for k in col..n {
                matrix[row][k] -= factor * matrix[col][k];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    // Back-substitution
    let mut solution = vec![0.0f64; n];
    for row in (0..n).rev() {
        let mut value = rhs[row];
        for col in (row + 1)..n {
            value -= matrix[row][col] * solution[col];
        }
        solution[row] = value / matrix[row][row];
    }
    Some(solution)
}

/// One landmark set's coordinate histories (fixed-capacity sliding window)
#[derive(Debug, Default)]
struct SetHistory {
    frames: VecDeque<Vec<Landmark>>,
}

impl SetHistory {
    fn push(&mut self, landmarks: &[Landmark], capacity: usize) {
        self.frames.push_back(landmarks.to_vec());
        while self.frames.len() > capacity {
            self.frames.pop_front();
        }
    }

    /// Per-axis history for one landmark index, oldest first.
    ///
    /// Only frames that actually carry the index contribute; a landmark that
    /// flickers in and out restarts with a shorter history.
    fn axis_history(&self, index: usize, axis: impl Fn(&Landmark) -> f32) -> Vec<f32> {
        self.frames
            .iter()
            .filter_map(|frame| frame.get(index))
            .map(|lm| axis(lm))
            .collect()
    }
}

/// Sliding-window smoother over whole pose frames.
///
/// Applies the filter independently per landmark set, per landmark index and
/// per axis; visibility is passed through unchanged.
#[derive(Debug)]
pub struct FrameSmoother {
    filter: SavitzkyGolay,
    enabled: bool,
    body: SetHistory,
    left_hand: SetHistory,
    right_hand: SetHistory,
    face: SetHistory,
}

impl FrameSmoother {
    pub fn new(window: usize, order: usize, enabled: bool) -> Self {
        Self {
            filter: SavitzkyGolay::new(window, order),
            enabled,
            body: SetHistory::default(),
            left_hand: SetHistory::default(),
            right_hand: SetHistory::default(),
            face: SetHistory::default(),
        }
    }

    pub fn from_settings(settings: &crate::settings::GameSettings) -> Self {
        Self::new(
            settings.smoothing_window,
            settings.smoothing_order,
            settings.smoothing_enabled,
        )
    }

    /// Push a frame and return its smoothed counterpart.
    ///
    /// Disabled smoothing still records history (so re-enabling has context)
    /// but returns the frame unchanged.
    pub fn push(&mut self, frame: &PoseFrame) -> PoseFrame {
        let capacity = self.filter.window();
        let mut out = PoseFrame::new(frame.timestamp_ms);

        out.body = Self::smooth_set(&mut self.body, frame.body.as_deref(), &self.filter, capacity, self.enabled);
        out.left_hand = Self::smooth_set(&mut self.left_hand, frame.left_hand.as_deref(), &self.filter, capacity, self.enabled);
        out.right_hand = Self::smooth_set(&mut self.right_hand, frame.right_hand.as_deref(), &self.filter, capacity, self.enabled);
        out.face = Self::smooth_set(&mut self.face, frame.face.as_deref(), &self.filter, capacity, self.enabled);
        out
    }

    /// Drop all history (e.g. after a tracking gap)
    pub fn reset(&mut self) {
        self.body = SetHistory::default();
        self.left_hand = SetHistory::default();
        self.right_hand = SetHistory::default();
        self.face = SetHistory::default();
    }

    fn smooth_set(
        history: &mut SetHistory,
        landmarks: Option<&[Landmark]>,
        filter: &SavitzkyGolay,
        capacity: usize,
        enabled: bool,
    ) -> Option<Vec<Landmark>> {
        let landmarks = landmarks?;
        history.push(landmarks, capacity);
        if !enabled {
            return Some(landmarks.to_vec());
        }
        let smoothed = landmarks
            .iter()
            .enumerate()
            .map(|(i, lm)| Landmark {
                x: filter.apply(&history.axis_history(i, |l| l.x)),
                y: filter.apply(&history.axis_history(i, |l| l.y)),
                z: filter.apply(&history.axis_history(i, |l| l.z)),
                visibility: lm.visibility,
            })
            .collect();
        Some(smoothed)
    }
}
