use crate::theme::{
    day_style, BASE_STYLE, BUTTON_DISABLED_STYLE, BUTTON_STYLE, INFO_STYLE, STATUS_STYLE,
    TITLE_STYLE, WEEKDAY_STYLE,
};
use calpick::calendar::PopupPosition;
use calpick::{DayCell, MonthView};
use ratatui::{
    buffer::Buffer,
    layout::{Flex, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Text},
    widgets::{Block, BorderType, Clear, Paragraph, Widget},
};
use time::Date;

/// Number of columns per day of week
const DAY_WIDTH: u16 = 5;

/// Width of the grid of days
const MAIN_WIDTH: u16 = DAY_WIDTH * 7;

/// Lines above the first week: the title, the weekday labels, and a rule
const HEADER_LINES: u16 = 3;

/// Number of lines taken up by each week: the days and their info line
const WEEK_LINES: u16 = 2;

/// Lines below the last week: the status line, then a blank line and the
/// confirm button if there is one
const STATUS_LINES: u16 = 1;
const BUTTON_LINES: u16 = 2;

const CONFIRM_LABEL: &str = "[ 确定 ]";

const ACS_HLINE: char = '─';

/// One month of a date picker, drawn in a bordered box
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct CalendarPopup<'a> {
    month: &'a MonthView,
    weekday_labels: [&'static str; 7],
    today: Date,
    cursor: Option<Date>,
    round: bool,
    /// `Some(enabled)` if a confirm button is shown
    confirm: Option<bool>,
    status: Option<&'a str>,
}

impl<'a> CalendarPopup<'a> {
    pub(crate) fn new(
        month: &'a MonthView,
        weekday_labels: [&'static str; 7],
        today: Date,
    ) -> CalendarPopup<'a> {
        CalendarPopup {
            month,
            weekday_labels,
            today,
            cursor: None,
            round: false,
            confirm: None,
            status: None,
        }
    }

    pub(crate) fn cursor(mut self, cursor: Date) -> Self {
        self.cursor = Some(cursor);
        self
    }

    pub(crate) fn round(mut self, round: bool) -> Self {
        self.round = round;
        self
    }

    pub(crate) fn confirm_button(mut self, enabled: bool) -> Self {
        self.confirm = Some(enabled);
        self
    }

    pub(crate) fn status(mut self, status: Option<&'a str>) -> Self {
        self.status = status;
        self
    }

    /// Width & height of the popup, borders included
    pub(crate) fn size(&self) -> (u16, u16) {
        let weeks = u16::try_from(self.month.weeks.len()).unwrap_or(u16::MAX);
        let mut height = HEADER_LINES
            .saturating_add(weeks.saturating_mul(WEEK_LINES))
            .saturating_add(STATUS_LINES);
        if self.confirm.is_some() {
            height = height.saturating_add(BUTTON_LINES);
        }
        // One column of padding on either side, plus borders
        (MAIN_WIDTH + 4, height.saturating_add(2))
    }

    /// The area the popup occupies when it slides in from `position`
    pub(crate) fn place(&self, area: Rect, position: PopupPosition) -> Rect {
        let (width, height) = self.size();
        let width = width.min(area.width);
        let height = height.min(area.height);
        match position {
            PopupPosition::Top => Rect { height, ..area },
            PopupPosition::Bottom => Rect {
                y: area.bottom() - height,
                height,
                ..area
            },
            PopupPosition::Left => Rect { width, ..area },
            PopupPosition::Right => Rect {
                x: area.right() - width,
                width,
                ..area
            },
            PopupPosition::Center => {
                let [area] = Layout::horizontal([width]).flex(Flex::Center).areas(area);
                let [area] = Layout::vertical([height]).flex(Flex::Center).areas(area);
                area
            }
        }
    }
}

impl Widget for CalendarPopup<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
        let block = Block::bordered()
            .border_type(if self.round {
                BorderType::Rounded
            } else {
                BorderType::Plain
            })
            .style(BASE_STYLE);
        let inner = block.inner(area);
        block.render(area, buf);
        let [inner] = Layout::horizontal([MAIN_WIDTH])
            .flex(Flex::Center)
            .areas(inner);
        let mut canvas = BufferCanvas::new(inner, buf);
        canvas.draw_title(&self.month.title);
        canvas.draw_header(self.weekday_labels);
        for (week_no, week) in std::iter::zip(0u16.., &self.month.weeks) {
            for (col, cell) in std::iter::zip(0u16.., &week.0) {
                if let Some(cell) = cell {
                    let mut style = day_style(cell.classification);
                    if cell.date == self.today {
                        style = style.add_modifier(Modifier::UNDERLINED);
                    }
                    canvas.draw_day(week_no, col, cell, self.cursor == Some(cell.date), style);
                }
            }
        }
        let mut y = HEADER_LINES + WEEK_LINES * u16::try_from(self.month.weeks.len()).unwrap_or(0);
        if let Some(status) = self.status {
            canvas.mvprint(y, 0, status, Some(STATUS_STYLE));
        }
        y += STATUS_LINES;
        if let Some(enabled) = self.confirm {
            let style = if enabled {
                BUTTON_STYLE
            } else {
                BUTTON_DISABLED_STYLE
            };
            canvas.draw_centered(y + 1, CONFIRM_LABEL, style);
        }
    }
}

#[derive(Debug, Eq, PartialEq)]
struct BufferCanvas<'a> {
    area: Rect,
    buf: &'a mut Buffer,
}

impl<'a> BufferCanvas<'a> {
    fn new(area: Rect, buf: &'a mut Buffer) -> Self {
        Self { area, buf }
    }

    fn draw_title(&mut self, title: &str) {
        self.draw_centered(0, title, TITLE_STYLE);
    }

    fn draw_header(&mut self, labels: [&str; 7]) {
        for (col, label) in std::iter::zip(0u16.., labels) {
            self.mvprint(1, DAY_WIDTH * col + 1, label, Some(WEEKDAY_STYLE));
        }
        self.hline(2, 0, ACS_HLINE, MAIN_WIDTH);
    }

    fn draw_day(&mut self, week_no: u16, col: u16, cell: &DayCell, cursor: bool, style: Style) {
        let y = week_no * WEEK_LINES + HEADER_LINES;
        let x = DAY_WIDTH * col;
        let label = cell.label();
        let s = if cursor {
            format!("[{label:>2}]")
        } else {
            format!(" {label:>2} ")
        };
        self.mvprint(y, x, s, Some(style));
        if let Some(info) = cell.bottom_info.as_deref().or(cell.top_info.as_deref()) {
            self.mvprint(y + 1, x, info, Some(INFO_STYLE));
        }
    }

    fn draw_centered(&mut self, y: u16, s: &str, style: Style) {
        if y < self.area.height {
            Paragraph::new(Line::styled(s, style))
                .centered()
                .render(
                    Rect {
                        y: y + self.area.y,
                        height: 1,
                        ..self.area
                    },
                    self.buf,
                );
        }
    }

    fn mvprint<S: AsRef<str>>(&mut self, y: u16, x: u16, s: S, style: Option<Style>) {
        if y < self.area.height && x < self.area.width {
            let text = Text::styled(s.as_ref(), style.unwrap_or_default());
            let width = u16::try_from(text.width()).unwrap_or(u16::MAX);
            // The Rect given to the Paragraph must lie entirely within the
            // buffer, or rendering panics.
            Paragraph::new(text).render(
                Rect {
                    x: x + self.area.x,
                    y: y + self.area.y,
                    width: (self.area.width - x).min(width),
                    height: 1,
                },
                self.buf,
            );
        }
    }

    fn hline(&mut self, y: u16, x: u16, ch: char, length: u16) {
        self.mvprint(y, x, String::from(ch).repeat(length.into()), None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calpick::calendar::classify::classify_month;
    use calpick::calendar::datemath::weekday_labels;
    use calpick::calendar::month::{build_month, Bounds};
    use calpick::{DayClassification, Selection};
    use crate::theme::{DISABLED_STYLE, SELECTED_STYLE};
    use time::macros::date;

    fn row(buf: &Buffer, y: u16) -> String {
        (buf.area.left()..buf.area.right())
            .map(|x| buf[(x, y)].symbol())
            .collect()
    }

    fn july() -> MonthView {
        let bounds = Bounds::new(Some(date!(2024 - 07 - 03)), None);
        let mut month = build_month(date!(2024 - 07 - 01), 0, &bounds);
        classify_month(
            &mut month,
            &Selection::Single(Some(date!(2024 - 07 - 10))),
            None,
        );
        month
    }

    #[test]
    fn test_size() {
        let month = july();
        let popup = CalendarPopup::new(&month, weekday_labels(0), date!(2024 - 07 - 15));
        assert_eq!(popup.size(), (39, 16));
        assert_eq!(popup.confirm_button(true).size(), (39, 18));
    }

    #[test]
    fn test_place() {
        let month = july();
        let popup = CalendarPopup::new(&month, weekday_labels(0), date!(2024 - 07 - 15));
        let area = Rect::new(0, 0, 80, 24);
        assert_eq!(
            popup.place(area, PopupPosition::Bottom),
            Rect::new(0, 8, 80, 16)
        );
        assert_eq!(popup.place(area, PopupPosition::Top), Rect::new(0, 0, 80, 16));
        assert_eq!(
            popup.place(area, PopupPosition::Right),
            Rect::new(41, 0, 39, 24)
        );
        assert_eq!(
            popup.place(Rect::new(0, 0, 79, 24), PopupPosition::Center),
            Rect::new(20, 4, 39, 16)
        );
    }

    #[test]
    fn test_render_days() {
        let month = july();
        let popup = CalendarPopup::new(&month, weekday_labels(0), date!(2024 - 07 - 15))
            .cursor(date!(2024 - 07 - 16))
            .status(Some("hello"));
        let area = Rect::new(0, 0, 39, 16);
        let mut buffer = Buffer::empty(area);
        popup.render(area, &mut buffer);
        assert_eq!(row(&buffer, 4), "│        1    2    3    4    5    6   │");
        assert_eq!(row(&buffer, 6), "│   7    8    9   10   11   12   13   │");
        assert_eq!(row(&buffer, 8), "│  14   15  [16]  17   18   19   20   │");
        assert_eq!(row(&buffer, 14), "│ hello                               │");
        // Days are drawn from column 2 onwards, five columns apiece
        assert_eq!(buffer[(7, 4)].style().fg, DISABLED_STYLE.fg);
        assert_eq!(buffer[(22, 4)].style().fg, BASE_STYLE.fg);
        assert_eq!(buffer[(17, 6)].style(), SELECTED_STYLE);
        assert!(buffer[(7, 8)]
            .style()
            .add_modifier
            .contains(Modifier::UNDERLINED));
    }

    #[test]
    fn test_render_info() {
        let mut month = july();
        for cell in month.cells_mut() {
            if cell.date == date!(2024 - 07 - 04) {
                cell.classification = DayClassification::Start;
                cell.bottom_info = Some(String::from("in"));
            }
        }
        let popup = CalendarPopup::new(&month, weekday_labels(0), date!(2024 - 07 - 15));
        let area = Rect::new(0, 0, 39, 16);
        let mut buffer = Buffer::empty(area);
        popup.render(area, &mut buffer);
        assert_eq!(row(&buffer, 5), "│                     in              │");
        assert_eq!(buffer[(22, 4)].style(), SELECTED_STYLE);
    }

    #[test]
    fn test_confirm_button_row() {
        let month = july();
        let popup = CalendarPopup::new(&month, weekday_labels(0), date!(2024 - 07 - 15))
            .round(true)
            .confirm_button(false);
        let area = Rect::new(0, 0, 39, 18);
        let mut buffer = Buffer::empty(area);
        popup.render(area, &mut buffer);
        assert_eq!(buffer[(0, 0)].symbol(), "╭");
        assert_eq!(row(&buffer, 15), "│                                     │");
        assert_eq!(buffer[(0, 17)].symbol(), "╰");
    }
}
