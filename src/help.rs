use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Flex, Layout, Rect},
    style::Style,
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph, Widget},
};

static TEXT: &[&str] = &[
    "o               Open the date picker",
    "h/j/k/l, ARROWS Move the cursor",
    "SPACE, ENTER    Tap the day under the cursor",
    "c               Confirm the selection",
    "[, ]            Previous/next month",
    "{, }            Previous/next year",
    "g               Input date to go to",
    "ESC             Press outside the picker",
    "?               Show this help",
    "q               Quit",
    "",
    "Press the Any Key to dismiss.",
];

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct Help(pub(crate) Style);

impl Widget for Help {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let text = TEXT.iter().map(|&s| Line::raw(s)).collect::<Text<'_>>();
        let height = u16::try_from(text.height())
            .unwrap_or(u16::MAX)
            .min(area.height)
            .saturating_add(2);
        let width = u16::try_from(text.width())
            .unwrap_or(u16::MAX)
            .min(area.width)
            .saturating_add(2);
        let para = Paragraph::new(text)
            .block(
                Block::bordered()
                    .title(" Commands ")
                    .title_alignment(Alignment::Center),
            )
            .style(self.0);
        let [help_area] = Layout::horizontal([width]).flex(Flex::Center).areas(area);
        let [help_area] = Layout::vertical([height])
            .flex(Flex::Center)
            .areas(help_area);
        Clear.render(help_area, buf);
        para.render(help_area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::BASE_STYLE;

    #[test]
    fn test_render() {
        let area = Rect::new(0, 0, 50, 16);
        let mut buffer = Buffer::empty(area);
        Help(BASE_STYLE).render(area, &mut buffer);
        let mut expected = Buffer::with_lines([
            "                                                  ",
            "  ┌───────────────── Commands ─────────────────┐  ",
            "  │o               Open the date picker        │  ",
            "  │h/j/k/l, ARROWS Move the cursor             │  ",
            "  │SPACE, ENTER    Tap the day under the cursor│  ",
            "  │c               Confirm the selection       │  ",
            "  │[, ]            Previous/next month         │  ",
            "  │{, }            Previous/next year          │  ",
            "  │g               Input date to go to         │  ",
            "  │ESC             Press outside the picker    │  ",
            "  │?               Show this help              │  ",
            "  │q               Quit                        │  ",
            "  │                                            │  ",
            "  │Press the Any Key to dismiss.               │  ",
            "  └────────────────────────────────────────────┘  ",
            "                                                  ",
        ]);
        expected.set_style(Rect::new(2, 1, 46, 14), BASE_STYLE);
        assert_eq!(buffer, expected);
    }
}
