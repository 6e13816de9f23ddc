use glimpse_core::geom::ScreenPoint;
use std::time::Instant;

/// Pointer and wheel input, in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Starts a drag and an interaction.
    PointerDown { position: ScreenPoint },
    /// Pans by the distance moved since the previous pointer event of the drag.
    PointerMove { position: ScreenPoint },
    /// Ends the drag and the interaction.
    PointerUp { position: ScreenPoint },
    /// One wheel tick: zooms at `position`, out when `delta_y > 0`.
    ///
    /// The interaction ends once no wheel tick has arrived for the debounce delay; see
    /// [`crate::ViewportEngine::tick`].
    Wheel {
        delta_y: f64,
        position: ScreenPoint,
        at: Instant,
    },
}
