//! Detects when accumulated samples no longer match the scene

use crate::scene::WatchedTransform;

/// Tracks the camera field of view and a set of watched poses between frames.
#[derive(Debug, Default)]
pub struct InvalidationTracker {
    last_field_of_view: Option<f32>,
}

impl InvalidationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the accumulation must restart.
    ///
    /// Any difference in field of view counts, with no tolerance. Every
    /// watched transform's dirty flag is cleared on each call, even after an
    /// earlier one already triggered the reset.
    pub fn should_reset(
        &mut self,
        field_of_view: f32,
        watched: &mut [&mut dyn WatchedTransform],
    ) -> bool {
        let mut reset = false;

        if self.last_field_of_view != Some(field_of_view) {
            log::debug!(
                "Field of view changed: {:?} -> {}",
                self.last_field_of_view,
                field_of_view
            );
            self.last_field_of_view = Some(field_of_view);
            reset = true;
        }

        for (index, transform) in watched.iter_mut().enumerate() {
            if transform.has_changed() {
                log::debug!("Watched transform {} changed", index);
                transform.clear_changed();
                reset = true;
            }
        }

        reset
    }

    /// Forget the stored field of view so the next check resets.
    pub fn clear(&mut self) {
        self.last_field_of_view = None;
    }
}
