use crate::math::Real;

/// Receives progress reports from a running decomposition.
///
/// Reports are purely informative and never alter the result. Any
/// `FnMut(&str, Real)` closure is a progress callback.
pub trait ProgressCallback {
    /// Called with the name of the current phase and its completion, in `[0, 1]`.
    fn report_progress(&mut self, phase: &str, fraction: Real);
}

impl<F: FnMut(&str, Real)> ProgressCallback for F {
    fn report_progress(&mut self, phase: &str, fraction: Real) {
        self(phase, fraction)
    }
}

/// Forwards a report with its fraction clamped to `[0, 1]`.
pub(crate) fn report(progress: &mut dyn ProgressCallback, phase: &str, fraction: Real) {
    let fraction = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    progress.report_progress(phase, fraction);
}
