//! Visual guide line shown while a path is being drawn

use glam::Vec3;

/// Polyline the presentation layer draws under the pointer.
///
/// Holds the accepted samples plus an optional live endpoint that follows
/// the pointer before the second sample has been accepted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathGuide {
    visible: bool,
    committed: Vec<Vec3>,
    live_end: Option<Vec3>,
}

impl PathGuide {
    /// Show a zero-length guide anchored at `anchor`
    pub fn start(&mut self, anchor: Vec3) {
        self.visible = true;
        self.committed = vec![anchor];
        self.live_end = Some(anchor);
    }

    /// Append an accepted sample; the live endpoint is dropped
    pub fn push(&mut self, point: Vec3) {
        self.committed.push(point);
        self.live_end = None;
    }

    /// Move the live endpoint
    pub fn preview(&mut self, point: Vec3) {
        if self.visible {
            self.live_end = Some(point);
        }
    }

    /// Hide the guide and forget its points
    pub fn reset(&mut self) {
        self.visible = false;
        self.committed.clear();
        self.live_end = None;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Points to draw, in order
    pub fn polyline(&self) -> Vec<Vec3> {
        let mut points = self.committed.clone();
        points.extend(self.live_end);
        points
    }
}
