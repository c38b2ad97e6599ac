use super::classify::{classify_month, DayFormatter};
use super::datemath::{format_title, start_of_month, weekday_labels};
use super::memo::Memo;
use super::month::{
    build_month, build_months, continuous_default_bounds, shift_anchor, Bounds, MonthUnit,
    MonthView, SwitchMode,
};
use super::popup::{LifecycleEvent, PopupLifecycle, PopupProps};
use super::selection::{CalendarMode, OverRange, Selection, SelectionState, TapOutput};
use crate::config::CalendarConfig;
use std::fmt;
use time::Date;

/// Payload of the "month shown" notification
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct MonthShow {
    /// First day of the month
    pub date: Date,
    pub title: String,
}

/// Optional handlers for everything the calendar reports.  Handlers that are
/// not set are simply not called.
#[derive(Default)]
pub struct CalendarCallbacks {
    on_select: Option<Box<dyn FnMut(&Selection)>>,
    on_confirm: Option<Box<dyn FnMut(&Selection)>>,
    on_unselect: Option<Box<dyn FnMut(Date)>>,
    on_month_show: Option<Box<dyn FnMut(&MonthShow)>>,
    on_panel_change: Option<Box<dyn FnMut(Date)>>,
    on_click_subtitle: Option<Box<dyn FnMut()>>,
    on_click_disabled_date: Option<Box<dyn FnMut(Date)>>,
    on_click_overlay: Option<Box<dyn FnMut()>>,
    on_open: Option<Box<dyn FnMut()>>,
    on_opened: Option<Box<dyn FnMut()>>,
    on_close: Option<Box<dyn FnMut()>>,
    on_closed: Option<Box<dyn FnMut()>>,
    on_over_range: Option<Box<dyn FnMut(&OverRange)>>,
}

impl CalendarCallbacks {
    pub fn new() -> CalendarCallbacks {
        CalendarCallbacks::default()
    }

    /// Called with the new selection after every accepted tap
    pub fn on_select<F: FnMut(&Selection) + 'static>(mut self, f: F) -> Self {
        self.on_select = Some(Box::new(f));
        self
    }

    /// Called with the committed selection when it is confirmed, either
    /// explicitly or automatically when there is no confirm step
    pub fn on_confirm<F: FnMut(&Selection) + 'static>(mut self, f: F) -> Self {
        self.on_confirm = Some(Box::new(f));
        self
    }

    /// Called when a day is removed from a multiple selection
    pub fn on_unselect<F: FnMut(Date) + 'static>(mut self, f: F) -> Self {
        self.on_unselect = Some(Box::new(f));
        self
    }

    pub fn on_month_show<F: FnMut(&MonthShow) + 'static>(mut self, f: F) -> Self {
        self.on_month_show = Some(Box::new(f));
        self
    }

    /// Called with the new anchor month after paginating
    pub fn on_panel_change<F: FnMut(Date) + 'static>(mut self, f: F) -> Self {
        self.on_panel_change = Some(Box::new(f));
        self
    }

    pub fn on_click_subtitle<F: FnMut() + 'static>(mut self, f: F) -> Self {
        self.on_click_subtitle = Some(Box::new(f));
        self
    }

    pub fn on_click_disabled_date<F: FnMut(Date) + 'static>(mut self, f: F) -> Self {
        self.on_click_disabled_date = Some(Box::new(f));
        self
    }

    pub fn on_click_overlay<F: FnMut() + 'static>(mut self, f: F) -> Self {
        self.on_click_overlay = Some(Box::new(f));
        self
    }

    pub fn on_open<F: FnMut() + 'static>(mut self, f: F) -> Self {
        self.on_open = Some(Box::new(f));
        self
    }

    pub fn on_opened<F: FnMut() + 'static>(mut self, f: F) -> Self {
        self.on_opened = Some(Box::new(f));
        self
    }

    pub fn on_close<F: FnMut() + 'static>(mut self, f: F) -> Self {
        self.on_close = Some(Box::new(f));
        self
    }

    pub fn on_closed<F: FnMut() + 'static>(mut self, f: F) -> Self {
        self.on_closed = Some(Box::new(f));
        self
    }

    /// Called when a tap is rejected for exceeding the maximum range
    pub fn on_over_range<F: FnMut(&OverRange) + 'static>(mut self, f: F) -> Self {
        self.on_over_range = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for CalendarCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalendarCallbacks")
            .field("on_select", &self.on_select.is_some())
            .field("on_confirm", &self.on_confirm.is_some())
            .field("on_unselect", &self.on_unselect.is_some())
            .field("on_month_show", &self.on_month_show.is_some())
            .field("on_panel_change", &self.on_panel_change.is_some())
            .field("on_click_subtitle", &self.on_click_subtitle.is_some())
            .field("on_click_disabled_date", &self.on_click_disabled_date.is_some())
            .field("on_click_overlay", &self.on_click_overlay.is_some())
            .field("on_open", &self.on_open.is_some())
            .field("on_opened", &self.on_opened.is_some())
            .field("on_close", &self.on_close.is_some())
            .field("on_closed", &self.on_closed.is_some())
            .field("on_over_range", &self.on_over_range.is_some())
            .finish()
    }
}

/// Inputs that determine the layout of the months, ignoring selection
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct LayoutKey {
    bounds: Bounds,
    first_day_of_week: u8,
    /// The displayed month when paginated; `None` when continuous
    anchor: Option<Date>,
}

impl LayoutKey {
    fn build(&self) -> Vec<MonthView> {
        match self.anchor {
            Some(anchor) => vec![build_month(anchor, self.first_day_of_week, &self.bounds)],
            None => build_months(self.first_day_of_week, &self.bounds),
        }
    }
}

/// Owns the selection and displayed month of one calendar and turns taps,
/// pagination, and popup visibility changes into callbacks.
///
/// The controller keeps two selections: the committed value, which only
/// changes on confirmation (or on every accepted tap when there is no
/// confirm step), and the draft that taps act upon.  Each time a poppable
/// calendar is opened, the draft is reset to the committed value.
pub struct CalendarController {
    config: CalendarConfig,
    today: Date,
    bounds: Bounds,
    committed: Selection,
    draft: SelectionState,
    anchor: Date,
    popup: PopupLifecycle,
    formatter: Option<Box<dyn DayFormatter>>,
    callbacks: CalendarCallbacks,
    layout: Memo<LayoutKey, Vec<MonthView>>,
    rendered: Memo<(LayoutKey, Selection), Vec<MonthView>>,
}

impl CalendarController {
    /// Creates a calendar seeded from `config.default_date`.  An inline
    /// (non-poppable) calendar reports its months as shown immediately.
    pub fn new(config: CalendarConfig, today: Date, callbacks: CalendarCallbacks) -> Self {
        let bounds = effective_bounds(&config, today);
        let committed = Selection::from_dates(config.mode, &config.default_date);
        let draft = SelectionState::new(committed.clone())
            .max_range(config.max_range)
            .allow_same_day(config.allow_same_day);
        let anchor = bounds.clamp_month(committed.first_date().unwrap_or(today));
        let mut this = CalendarController {
            config,
            today,
            bounds,
            committed,
            draft,
            anchor,
            popup: PopupLifecycle::new(false),
            formatter: None,
            callbacks,
            layout: Memo::new(),
            rendered: Memo::new(),
        };
        if !this.config.poppable {
            this.emit_month_show();
        }
        this
    }

    pub fn with_formatter<F: DayFormatter + 'static>(mut self, formatter: F) -> Self {
        self.formatter = Some(Box::new(formatter));
        self.rendered.invalidate();
        self
    }

    pub fn config(&self) -> &CalendarConfig {
        &self.config
    }

    pub fn mode(&self) -> CalendarMode {
        self.config.mode
    }

    pub fn switch_mode(&self) -> SwitchMode {
        self.config.switch_mode
    }

    pub fn today(&self) -> Date {
        self.today
    }

    /// The bounds in effect, after applying the continuous-mode defaults
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// The first day of the displayed month, if paginated
    pub fn anchor(&self) -> Option<Date> {
        self.config.switch_mode.is_paginated().then_some(self.anchor)
    }

    /// The in-progress selection
    pub fn selection(&self) -> &Selection {
        self.draft.selection()
    }

    /// The last confirmed selection
    pub fn committed(&self) -> &Selection {
        &self.committed
    }

    pub fn is_disabled(&self, date: Date) -> bool {
        !self.bounds.contains(date)
    }

    /// Whether the confirm action is available.  An unfinished range cannot
    /// be confirmed.
    pub fn can_confirm(&self) -> bool {
        self.draft.selection().is_complete()
    }

    /// Whether the calendar is on screen: always for an inline calendar,
    /// otherwise while the popup is visible
    pub fn is_shown(&self) -> bool {
        !self.config.poppable || self.popup.visible()
    }

    pub fn popup_props(&self) -> PopupProps {
        PopupProps {
            visible: self.popup.visible(),
            position: self.config.position,
            round: self.config.round,
            close_on_click_overlay: self.config.close_on_click_overlay,
        }
    }

    pub fn weekday_labels(&self) -> [&'static str; 7] {
        weekday_labels(self.config.first_day_of_week)
    }

    /// Title of the displayed month, or of the first month when continuous
    pub fn subtitle(&self) -> String {
        if self.config.switch_mode.is_paginated() {
            format_title(self.anchor)
        } else {
            self.bounds.min.map(format_title).unwrap_or_default()
        }
    }

    /// The displayed months with every day classified against the current
    /// selection.  Layout is recomputed only when the bounds, first day of
    /// the week, or displayed month change, and classification only when the
    /// selection changes as well.
    pub fn months(&mut self) -> &[MonthView] {
        let key = self.layout_key();
        let layout = self.layout.get_or_compute(key, LayoutKey::build);
        let formatter = self.formatter.as_deref();
        self.rendered
            .get_or_compute((key, self.draft.selection().clone()), |(_, selection)| {
                layout
                    .iter()
                    .cloned()
                    .map(|mut month| {
                        classify_month(&mut month, selection, formatter);
                        month
                    })
                    .collect()
            })
    }

    /// Handles a tap on `day`.  Taps on days outside the bounds are reported
    /// to the disabled-date handler and otherwise ignored.
    pub fn tap(&mut self, day: Date) {
        if self.config.readonly {
            log::debug!("Ignoring tap on {day} in read-only calendar");
            return;
        }
        if !self.bounds.contains(day) {
            log::debug!("Tap on disabled date {day}");
            if let Some(f) = self.callbacks.on_click_disabled_date.as_mut() {
                f(day);
            }
            return;
        }
        match self.draft.handle_tap(day) {
            TapOutput::Selected => {
                log::debug!("Selection is now {:?}", self.draft.selection());
                self.selection_changed();
            }
            TapOutput::Unselected(day) => {
                log::debug!("Unselected {day}");
                if let Some(f) = self.callbacks.on_unselect.as_mut() {
                    f(day);
                }
                self.selection_changed();
            }
            TapOutput::OverRange(over) => {
                log::debug!(
                    "Rejected tap on {day}: selection would exceed {} days",
                    over.max_range
                );
                if let Some(f) = self.callbacks.on_over_range.as_mut() {
                    f(&over);
                }
            }
        }
    }

    fn selection_changed(&mut self) {
        if let Some(f) = self.callbacks.on_select.as_mut() {
            f(self.draft.selection());
        }
        if !self.config.show_confirm && self.draft.selection().is_complete() {
            self.commit();
        }
    }

    fn commit(&mut self) {
        self.committed = self.draft.selection().clone();
        if let Some(f) = self.callbacks.on_confirm.as_mut() {
            f(&self.committed);
        }
    }

    /// Commits the draft selection.  Returns `false` without doing anything
    /// if the selection is an unfinished range.
    pub fn confirm(&mut self) -> bool {
        if !self.can_confirm() {
            log::debug!("Cannot confirm incomplete range");
            return false;
        }
        self.commit();
        true
    }

    /// Discards the draft selection in favor of the committed one
    pub fn cancel(&mut self) {
        self.draft.reset(self.committed.clone());
    }

    /// Resets the draft selection to `selection`, or to the committed
    /// selection if `None`, and shows the month it starts in
    pub fn reset(&mut self, selection: Option<Selection>) {
        let selection = match selection {
            Some(sel) => self.conform(&sel),
            None => self.committed.clone(),
        };
        self.draft.reset(selection);
        if self.config.switch_mode.is_paginated() {
            self.set_anchor(self.default_anchor());
        }
    }

    /// Replaces the committed selection, as when the host's stored value
    /// changes.  The draft follows unless the popup is currently open.
    pub fn set_committed(&mut self, selection: Selection) {
        self.committed = self.conform(&selection);
        if !(self.config.poppable && self.popup.visible()) {
            self.draft.reset(self.committed.clone());
        }
    }

    /// Changes the minimum and maximum dates
    pub fn set_bounds(&mut self, min: Option<Date>, max: Option<Date>) {
        self.config.min_date = min;
        self.config.max_date = max;
        let bounds = effective_bounds(&self.config, self.today);
        if bounds == self.bounds {
            return;
        }
        self.bounds = bounds;
        let anchor = bounds.clamp_month(self.anchor);
        if anchor != self.anchor {
            self.anchor = anchor;
            if self.config.switch_mode.is_paginated() {
                if let Some(f) = self.callbacks.on_panel_change.as_mut() {
                    f(anchor);
                }
            }
        }
        if self.is_shown() {
            self.emit_month_show();
        }
    }

    /// Pages the displayed month by `delta` months or years.  Returns `false`
    /// and leaves the calendar unchanged if the move would leave the bounds,
    /// if the calendar is not paginated, or if paging by year is requested
    /// in month-only mode.
    pub fn change_month(&mut self, delta: i32, unit: MonthUnit) -> bool {
        match (self.config.switch_mode, unit) {
            (SwitchMode::None, _) | (SwitchMode::Month, MonthUnit::Year) => return false,
            _ => (),
        }
        match shift_anchor(self.anchor, delta, unit, &self.bounds) {
            Ok(anchor) => {
                self.set_anchor(anchor);
                true
            }
            Err(e) => {
                log::debug!("Not moving {delta} {unit:?}(s) from {}: {e}", self.anchor);
                false
            }
        }
    }

    /// Brings the month containing `date` into view.  When paginated, this
    /// makes it the displayed month and returns `Some(0)`; when continuous,
    /// this returns the index of the month among [`months()`](Self::months).
    /// Returns `None` if the month is outside the bounds.
    pub fn scroll_to_date(&mut self, date: Date) -> Option<usize> {
        if self.config.switch_mode.is_paginated() {
            let month = start_of_month(date);
            if !self.bounds.contains_month(month) {
                return None;
            }
            self.set_anchor(month);
            Some(0)
        } else {
            let key = self.layout_key();
            self.layout
                .get_or_compute(key, LayoutKey::build)
                .iter()
                .position(|m| m.contains(date))
        }
    }

    pub fn click_subtitle(&mut self) {
        if let Some(f) = self.callbacks.on_click_subtitle.as_mut() {
            f();
        }
    }

    /// Shows or hides a poppable calendar.  Showing it resets the draft to
    /// the committed selection.  Has no effect on an inline calendar.
    pub fn set_visible(&mut self, visible: bool) {
        if !self.config.poppable {
            return;
        }
        let opening = visible && !self.popup.visible();
        if opening {
            self.draft.reset(self.committed.clone());
            self.anchor = self.default_anchor();
        }
        let events = self.popup.set_visible(visible);
        self.dispatch(events);
        if opening {
            self.emit_month_show();
        }
    }

    /// Handles the user pressing the overlay behind the popup.  The host
    /// should hide the popup afterwards if `close_on_click_overlay` is set;
    /// the close is reported only once.
    pub fn overlay_pressed(&mut self) {
        let events = self
            .popup
            .overlay_pressed(self.config.close_on_click_overlay);
        self.dispatch(events);
    }

    fn dispatch(&mut self, events: &[LifecycleEvent]) {
        for event in events {
            let handler = match event {
                LifecycleEvent::Open => &mut self.callbacks.on_open,
                LifecycleEvent::Opened => &mut self.callbacks.on_opened,
                LifecycleEvent::ClickOverlay => &mut self.callbacks.on_click_overlay,
                LifecycleEvent::Close => &mut self.callbacks.on_close,
                LifecycleEvent::Closed => &mut self.callbacks.on_closed,
            };
            if let Some(f) = handler.as_mut() {
                f();
            }
        }
    }

    fn set_anchor(&mut self, anchor: Date) {
        if anchor == self.anchor {
            return;
        }
        log::debug!("Showing month of {anchor}");
        self.anchor = anchor;
        if let Some(f) = self.callbacks.on_panel_change.as_mut() {
            f(anchor);
        }
        self.emit_month_show();
    }

    fn emit_month_show(&mut self) {
        let key = self.layout_key();
        let months = self.layout.get_or_compute(key, LayoutKey::build);
        if let Some(f) = self.callbacks.on_month_show.as_mut() {
            for m in months {
                f(&MonthShow {
                    date: m.anchor,
                    title: m.title.clone(),
                });
            }
        }
    }

    fn layout_key(&self) -> LayoutKey {
        LayoutKey {
            bounds: self.bounds,
            first_day_of_week: self.config.first_day_of_week % 7,
            anchor: self.config.switch_mode.is_paginated().then_some(self.anchor),
        }
    }

    fn default_anchor(&self) -> Date {
        self.bounds
            .clamp_month(self.draft.selection().first_date().unwrap_or(self.today))
    }

    /// Converts a selection supplied from outside into this calendar's mode,
    /// ordering the ends of a range and dropping repeated days
    fn conform(&self, selection: &Selection) -> Selection {
        Selection::from_dates(self.config.mode, &selection.dates())
    }
}

impl fmt::Debug for CalendarController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalendarController")
            .field("config", &self.config)
            .field("today", &self.today)
            .field("bounds", &self.bounds)
            .field("committed", &self.committed)
            .field("draft", &self.draft)
            .field("anchor", &self.anchor)
            .field("popup", &self.popup)
            .field("formatter", &self.formatter.is_some())
            .field("callbacks", &self.callbacks)
            .finish_non_exhaustive()
    }
}

fn effective_bounds(config: &CalendarConfig, today: Date) -> Bounds {
    let bounds = Bounds::new(config.min_date, config.max_date);
    if config.switch_mode.is_paginated() {
        bounds
    } else {
        continuous_default_bounds(today, bounds)
    }
}
