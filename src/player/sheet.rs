//! Drag-to-expand state machine of the player bottom sheet.
//!
//! Geometry only: the sheet's top edge is positioned at `offset()` within a
//! container of `total_height`, between `top_offset` (expanded) and
//! `total_height - collapsed_height` (collapsed).

pub const DEFAULT_COLLAPSED_HEIGHT: f64 = 50.0;

/// Share of the travel distance a drag must cover to flip the sheet.
const TRIGGER_FRACTION: f64 = 0.10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SheetState {
    #[default]
    Collapsed,
    Expanded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BottomSheet {
    state: SheetState,
    drag_offset: f64,
    collapsed_height: f64,
    top_offset: f64,
}

impl BottomSheet {
    pub fn new(top_offset: f64) -> Self {
        BottomSheet {
            state: SheetState::Collapsed,
            drag_offset: 0.0,
            collapsed_height: DEFAULT_COLLAPSED_HEIGHT,
            top_offset,
        }
    }

    pub fn with_collapsed_height(mut self, collapsed_height: f64) -> Self {
        self.collapsed_height = collapsed_height;
        self
    }

    pub fn state(&self) -> SheetState {
        self.state
    }

    pub fn is_expanded(&self) -> bool {
        self.state == SheetState::Expanded
    }

    pub fn drag_offset(&self) -> f64 {
        self.drag_offset
    }

    /// Height of the sheet's content when fully open.
    pub fn expanded_height(&self, total_height: f64) -> f64 {
        total_height - self.top_offset
    }

    fn collapsed_top(&self, total_height: f64) -> f64 {
        total_height - self.collapsed_height
    }

    /// Vertical position of the sheet's top edge, following an in-flight drag.
    pub fn offset(&self, total_height: f64) -> f64 {
        let collapsed_top = self.collapsed_top(total_height);
        let base = match self.state {
            SheetState::Expanded => self.top_offset,
            SheetState::Collapsed => collapsed_top,
        };
        (base + self.drag_offset).max(self.top_offset).min(collapsed_top)
    }

    /// Tracks a drag. Only movement towards the other state counts.
    pub fn drag_changed(&mut self, translation: f64) {
        self.drag_offset = match self.state {
            SheetState::Expanded => translation.max(0.0),
            SheetState::Collapsed => translation.min(0.0),
        };
    }

    /// Finishes a drag and returns the new state if the sheet flipped.
    ///
    /// The sheet flips when either the actual or the predicted end
    /// translation covers the trigger distance.
    pub fn drag_ended(&mut self, total_height: f64, translation: f64, predicted_end: f64) -> Option<SheetState> {
        let travel = self.collapsed_top(total_height) - self.top_offset;
        let trigger = travel * TRIGGER_FRACTION;

        let flipped = match self.state {
            SheetState::Collapsed if -translation >= trigger || -predicted_end >= trigger => {
                Some(SheetState::Expanded)
            }
            SheetState::Expanded if translation >= trigger || predicted_end >= trigger => {
                Some(SheetState::Collapsed)
            }
            _ => None,
        };

        if let Some(state) = flipped {
            self.state = state;
        }
        self.drag_offset = 0.0;
        flipped
    }

    /// Programmatic open/close, e.g. when a channel is picked.
    pub fn set_state(&mut self, state: SheetState) {
        self.state = state;
        self.drag_offset = 0.0;
    }
}
