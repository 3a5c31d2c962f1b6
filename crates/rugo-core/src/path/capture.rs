//! Pointer-driven path capture

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::{PathGuide, resample};
use crate::interaction::PointerProvider;

/// Called once with the resampled points when a capture completes
pub type PathCompleteCallback = Box<dyn FnOnce(Vec<Vec3>) + Send>;

/// Sampling and resampling parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    /// Distance between placed gadgets, also the minimum gap between samples
    pub spacing: f32,
    /// Maximum height difference between consecutive samples
    pub height_tolerance: f32,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            spacing: 0.04,
            height_tolerance: 0.001,
        }
    }
}

/// Observable capture state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// Not accepting input
    Inactive,
    /// Waiting for the pointer to go down
    Idle,
    /// Collecting samples until the pointer is released
    Drawing,
}

enum Phase {
    Inactive,
    Idle {
        on_complete: PathCompleteCallback,
    },
    Drawing {
        on_complete: PathCompleteCallback,
        path: Vec<Vec3>,
    },
}

/// Turns a press-hold-release gesture into a resampled path.
///
/// Each capture session owns its completion callback. Completing or
/// cancelling a session deactivates the capture; a new callback must be
/// supplied to draw again.
pub struct PathCapture {
    settings: CaptureSettings,
    phase: Phase,
    guide: PathGuide,
}

impl Default for PathCapture {
    fn default() -> Self {
        Self::new(CaptureSettings::default())
    }
}

impl PathCapture {
    pub fn new(settings: CaptureSettings) -> Self {
        Self {
            settings,
            phase: Phase::Inactive,
            guide: PathGuide::default(),
        }
    }

    pub fn settings(&self) -> &CaptureSettings {
        &self.settings
    }

    pub fn state(&self) -> CaptureState {
        match self.phase {
            Phase::Inactive => CaptureState::Inactive,
            Phase::Idle { .. } => CaptureState::Idle,
            Phase::Drawing { .. } => CaptureState::Drawing,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.phase, Phase::Inactive)
    }

    /// Accepted samples of the stroke in progress
    pub fn samples(&self) -> &[Vec3] {
        match &self.phase {
            Phase::Drawing { path, .. } => path,
            _ => &[],
        }
    }

    pub fn guide(&self) -> &PathGuide {
        &self.guide
    }

    /// Start a capture session. Any stroke in progress is discarded.
    pub fn activate(&mut self, on_complete: PathCompleteCallback) {
        self.guide.reset();
        self.phase = Phase::Idle { on_complete };
    }

    /// Cancel the session without invoking its callback
    pub fn deactivate(&mut self) {
        if self.is_active() {
            tracing::debug!("Path capture deactivated");
            self.guide.reset();
            self.phase = Phase::Inactive;
        }
    }

    /// Advance the capture by one tick
    pub fn update(&mut self, pointer: &dyn PointerProvider) {
        let phase = std::mem::replace(&mut self.phase, Phase::Inactive);

        self.phase = match phase {
            Phase::Inactive => Phase::Inactive,
            Phase::Idle { on_complete } => {
                match pointer.pressed().then(|| sample(pointer)).flatten() {
                    Some(anchor) => {
                        tracing::trace!(?anchor, "Path capture started");
                        self.guide.start(anchor);
                        Phase::Drawing {
                            on_complete,
                            path: vec![anchor],
                        }
                    }
                    None => Phase::Idle { on_complete },
                }
            }
            Phase::Drawing {
                on_complete,
                mut path,
            } => {
                if path.len() == 1
                    && self.guide.is_visible()
                    && let Some(hit) = sample(pointer)
                {
                    self.guide.preview(hit);
                }

                if pointer.held() {
                    self.store_sample(&mut path, pointer);
                    Phase::Drawing { on_complete, path }
                } else if pointer.released() && path.len() > 1 {
                    self.store_sample(&mut path, pointer);
                    let points = resample(&path, self.settings.spacing);
                    tracing::debug!(
                        samples = path.len(),
                        points = points.len(),
                        "Path capture completed"
                    );
                    self.guide.reset();
                    on_complete(points);
                    Phase::Inactive
                } else {
                    Phase::Drawing { on_complete, path }
                }
            }
        };
    }

    /// Append the current hit if it stays level and far enough from the last sample
    fn store_sample(&mut self, path: &mut Vec<Vec3>, pointer: &dyn PointerProvider) {
        let Some(hit) = sample(pointer) else {
            return;
        };
        let Some(&previous) = path.last() else {
            path.push(hit);
            return;
        };

        let level = (hit.y - previous.y).abs() < self.settings.height_tolerance;
        let gap = hit.distance(previous);

        if level && gap >= self.settings.spacing {
            path.push(hit);
            self.guide.push(hit);
        } else {
            tracing::trace!(?hit, level, gap, "Sample rejected");
        }
    }
}

fn sample(pointer: &dyn PointerProvider) -> Option<Vec3> {
    pointer.raycast_hit(&pointer.current_ray())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::Ray;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default)]
    struct FakePointer {
        pressed: bool,
        held: bool,
        released: bool,
        hit: Option<Vec3>,
    }

    impl FakePointer {
        fn press(hit: Vec3) -> Self {
            Self {
                pressed: true,
                held: true,
                hit: Some(hit),
                ..Default::default()
            }
        }

        fn hold(hit: Vec3) -> Self {
            Self {
                held: true,
                hit: Some(hit),
                ..Default::default()
            }
        }

        fn release(hit: Vec3) -> Self {
            Self {
                released: true,
                hit: Some(hit),
                ..Default::default()
            }
        }
    }

    impl PointerProvider for FakePointer {
        fn current_ray(&self) -> Ray {
            Ray::down_at(self.hit.unwrap_or_default())
        }

        fn pressed(&self) -> bool {
            self.pressed
        }

        fn held(&self) -> bool {
            self.held
        }

        fn released(&self) -> bool {
            self.released
        }

        fn raycast_hit(&self, _ray: &Ray) -> Option<Vec3> {
            self.hit
        }
    }

    type Completed = Arc<Mutex<Option<Vec<Vec3>>>>;

    fn active_capture() -> (PathCapture, Completed) {
        let completed: Completed = Arc::new(Mutex::new(None));
        let sink = completed.clone();
        let mut capture = PathCapture::default();
        capture.activate(Box::new(move |points| *sink.lock() = Some(points)));
        (capture, completed)
    }

    #[test]
    fn test_inactive_ignores_input() {
        let mut capture = PathCapture::default();
        capture.update(&FakePointer::press(Vec3::ZERO));
        assert_eq!(capture.state(), CaptureState::Inactive);
        assert!(capture.samples().is_empty());
    }

    #[test]
    fn test_press_starts_drawing() {
        let (mut capture, _) = active_capture();
        assert_eq!(capture.state(), CaptureState::Idle);

        capture.update(&FakePointer::press(Vec3::ZERO));
        assert_eq!(capture.state(), CaptureState::Drawing);
        assert_eq!(capture.samples(), &[Vec3::ZERO]);
        assert_eq!(capture.guide().polyline(), vec![Vec3::ZERO, Vec3::ZERO]);
    }

    #[test]
    fn test_press_without_hit_stays_idle() {
        let (mut capture, _) = active_capture();
        capture.update(&FakePointer {
            pressed: true,
            held: true,
            ..Default::default()
        });
        assert_eq!(capture.state(), CaptureState::Idle);
    }

    #[test]
    fn test_release_with_single_sample_does_not_complete() {
        let (mut capture, completed) = active_capture();
        capture.update(&FakePointer::press(Vec3::ZERO));
        capture.update(&FakePointer::release(Vec3::ZERO));

        assert!(completed.lock().is_none());
        assert_eq!(capture.state(), CaptureState::Drawing);
        assert_eq!(capture.samples().len(), 1);
    }

    #[test]
    fn test_single_sample_previews_live_endpoint() {
        let (mut capture, _) = active_capture();
        capture.update(&FakePointer::press(Vec3::ZERO));
        // Too close to be accepted, but the guide follows it
        capture.update(&FakePointer::hold(Vec3::new(0.0, 0.0, 0.01)));

        assert_eq!(capture.samples().len(), 1);
        assert_eq!(
            capture.guide().polyline(),
            vec![Vec3::ZERO, Vec3::new(0.0, 0.0, 0.01)]
        );
    }

    #[test]
    fn test_samples_are_filtered() {
        let (mut capture, _) = active_capture();
        capture.update(&FakePointer::press(Vec3::ZERO));
        // Too close
        capture.update(&FakePointer::hold(Vec3::new(0.0, 0.0, 0.02)));
        // Off the drawing plane
        capture.update(&FakePointer::hold(Vec3::new(0.0, 0.05, 0.1)));
        // Accepted
        capture.update(&FakePointer::hold(Vec3::new(0.0, 0.0, 0.1)));

        assert_eq!(
            capture.samples(),
            &[Vec3::ZERO, Vec3::new(0.0, 0.0, 0.1)]
        );
    }

    #[test]
    fn test_full_gesture_completes_once() {
        let (mut capture, completed) = active_capture();
        capture.update(&FakePointer::press(Vec3::ZERO));
        capture.update(&FakePointer::hold(Vec3::new(0.0, 0.0, 0.1)));
        capture.update(&FakePointer::release(Vec3::new(0.0, 0.0, 0.2)));

        let points = completed.lock().take().unwrap();
        assert_eq!(points.len(), 5);
        assert_eq!(points[0], Vec3::ZERO);

        assert_eq!(capture.state(), CaptureState::Inactive);
        assert!(capture.samples().is_empty());
        assert!(!capture.guide().is_visible());

        // A further gesture needs a new callback
        capture.update(&FakePointer::press(Vec3::ZERO));
        assert_eq!(capture.state(), CaptureState::Inactive);
    }

    #[test]
    fn test_cancel_skips_callback() {
        let (mut capture, completed) = active_capture();
        capture.update(&FakePointer::press(Vec3::ZERO));
        capture.update(&FakePointer::hold(Vec3::new(0.0, 0.0, 0.1)));

        capture.deactivate();
        assert_eq!(capture.state(), CaptureState::Inactive);
        assert!(capture.samples().is_empty());
        assert!(!capture.guide().is_visible());

        capture.update(&FakePointer::release(Vec3::new(0.0, 0.0, 0.2)));
        assert!(completed.lock().is_none());
    }
}
