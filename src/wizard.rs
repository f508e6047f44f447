use tracing::{debug, info, warn};

use crate::location::Coordinates;
use crate::preview::{PreviewLoader, PreviewMessage};
use crate::query::{build_query, QueryPayload};
use crate::state::{ImageFile, Step, WizardState};

/// Whether forward navigation is allowed from the current step. Never mutates.
pub fn can_advance(state: &WizardState) -> bool {
    match state.step {
        Step::Media => state.image_file.is_some() || !state.description.trim().is_empty(),
        Step::Location => state.coordinates().is_some(),
        Step::Filters | Step::Summary => true,
    }
}

/// Owns the session state and is the only thing that changes `step`.
pub struct Wizard {
    state: WizardState,
    previews: PreviewLoader,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

impl Wizard {
    pub fn new() -> Self {
        Self {
            state: WizardState::default(),
            previews: PreviewLoader::new(),
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn step(&self) -> Step {
        self.state.step
    }

    pub fn can_advance(&self) -> bool {
        can_advance(&self.state)
    }

    /// Silently ignored when the guard rejects it. Stays on the last step.
    pub fn advance(&mut self) {
        if !self.can_advance() {
            debug!(step = self.state.step.number(), "advance blocked by guard");
            return;
        }
        let next = self.state.step.next();
        if next != self.state.step {
            info!(from = self.state.step.number(), to = next.number(), "step changed");
            self.state.step = next;
        }
    }

    pub fn retreat(&mut self) {
        let prev = self.state.step.prev();
        if prev != self.state.step {
            info!(from = self.state.step.number(), to = prev.number(), "step changed");
            self.state.step = prev;
        }
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.state.description = description.into();
    }

    pub fn set_max_price(&mut self, max_price: impl Into<String>) {
        self.state.max_price = max_price.into();
    }

    pub fn set_min_rooms(&mut self, min_rooms: i64) {
        self.state.min_rooms = min_rooms;
    }

    pub fn select_point(&mut self, lat: f64, lng: f64) {
        self.state.location.on_point_selected(lat, lng);
        info!(location = %Coordinates::new(lat, lng), "location selected");
    }

    /// Replaces the reference image. The old preview goes away now; the new one
    /// arrives through [`Wizard::poll_previews`].
    pub fn select_image(&mut self, image: ImageFile) {
        info!(name = %image.name, path = %image.path.display(), "image selected");
        self.state.image_preview = None;
        self.previews.load(&image);
        self.state.image_file = Some(image);
    }

    pub fn clear_image(&mut self) {
        self.previews.invalidate();
        self.state.image_file = None;
        self.state.image_preview = None;
    }

    /// Applies every finished read without blocking. Returns whether the preview changed.
    pub fn poll_previews(&mut self) -> bool {
        let mut changed = false;
        while let Some(message) = self.previews.try_next() {
            changed |= self.apply_preview(message);
        }
        changed
    }

    pub(crate) fn apply_preview(&mut self, message: PreviewMessage) -> bool {
        if !self.previews.is_current(&message) {
            debug!(
                generation = message.generation(),
                current = self.previews.current_generation(),
                "discarding stale preview"
            );
            return false;
        }
        match message.into_result() {
            Ok(preview) => {
                debug!(mime = preview.mime, dimensions = ?preview.dimensions, "preview ready");
                self.state.image_preview = Some(preview);
                true
            }
            Err(err) => {
                // No user-facing path for this; the preview just stays as it was.
                warn!(error = %err, "image preview failed");
                false
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn previews(&self) -> &PreviewLoader {
        &self.previews
    }

    pub fn summary(&self) -> QueryPayload {
        build_query(&self.state)
    }

    /// Back to a fresh session. Pending reads are dropped on arrival.
    pub fn reset(&mut self) {
        self.previews.invalidate();
        self.state = WizardState::default();
        info!("wizard reset");
    }
}
