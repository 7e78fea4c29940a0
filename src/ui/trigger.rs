//! Scroll-driven "load more" trigger
//!
//! The grid ends with a sentinel row. The trigger fires once each time the
//! sentinel goes from hidden to visible; staying visible while the user keeps
//! scrolling does not fire again. The loader's in-flight guard debounces the rest.

/// Fraction of the scrollable height after which the sentinel counts as visible
pub const DEFAULT_THRESHOLD: f32 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityTrigger {
    threshold: f32,
    visible: bool,
}

impl Default for VisibilityTrigger {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl VisibilityTrigger {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
            visible: false,
        }
    }

    /// Feed a scroll position
    ///
    /// `relative_y` is the vertical offset in 0.0..=1.0, `content_fits` is
    /// true when the content is not taller than the viewport (nothing to scroll,
    /// so the sentinel is on screen). Returns `true` on a hidden -> visible transition.
    pub fn observe(&mut self, relative_y: f32, content_fits: bool) -> bool {
        let now_visible = content_fits || (relative_y.is_finite() && relative_y >= self.threshold);
        let fired = now_visible && !self.visible;
        self.visible = now_visible;
        fired
    }

    /// Forget the last observation, e.g. after new content pushed the sentinel down
    pub fn reset(&mut self) {
        self.visible = false;
    }
}
