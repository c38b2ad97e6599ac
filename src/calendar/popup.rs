use serde::Deserialize;

/// Edge of the screen that a poppable calendar slides in from
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum PopupPosition {
    Top,
    #[default]
    Bottom,
    Left,
    Right,
    Center,
}

/// Everything the popup host needs in order to show the calendar
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct PopupProps {
    pub visible: bool,
    pub position: PopupPosition,
    pub round: bool,
    pub close_on_click_overlay: bool,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum LifecycleEvent {
    Open,
    Opened,
    ClickOverlay,
    Close,
    Closed,
}

/// Tracks the visibility of a poppable calendar and decides which lifecycle
/// notifications each change produces.
///
/// Opening always yields `Open` then `Opened`.  Closing yields `Close` then
/// `Closed`, except that a close already announced by an overlay press is not
/// announced a second time when the host then hides the popup.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct PopupLifecycle {
    visible: bool,
    close_reported: bool,
}

impl PopupLifecycle {
    pub fn new(visible: bool) -> PopupLifecycle {
        PopupLifecycle {
            visible,
            close_reported: false,
        }
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) -> &'static [LifecycleEvent] {
        if visible == self.visible {
            return &[];
        }
        self.visible = visible;
        if visible {
            self.close_reported = false;
            &[LifecycleEvent::Open, LifecycleEvent::Opened]
        } else if std::mem::take(&mut self.close_reported) {
            &[LifecycleEvent::Closed]
        } else {
            &[LifecycleEvent::Close, LifecycleEvent::Closed]
        }
    }

    /// Handles the user pressing the overlay behind the popup.  If the
    /// overlay is configured to close the popup, `Close` is reported here,
    /// and the host is expected to hide the popup afterwards.
    pub fn overlay_pressed(&mut self, close_on_click_overlay: bool) -> &'static [LifecycleEvent] {
        if !self.visible {
            &[]
        } else if !close_on_click_overlay || self.close_reported {
            &[LifecycleEvent::ClickOverlay]
        } else {
            self.close_reported = true;
            &[LifecycleEvent::ClickOverlay, LifecycleEvent::Close]
        }
    }
}
