//! # Dyad List Widget
//!
//! This module renders the found dyads as a plain text list, one row per
//! dyad, with the selected row highlighted. Clicking a row selects and
//! plays that dyad, mirroring clicks on the fretboard markers.

use iced::widget::canvas::{self, event, Event, Geometry, Text};
use iced::widget::container;
use iced::{mouse, Color, Element, Point, Rectangle, Renderer, Theme};

/// Vertical offset of the first row.
const START_Y: f32 = 8.0;
/// Height of one text row.
const LINE_HEIGHT: f32 = 18.0;
/// Left padding before the row text.
const PADDING: f32 = 15.0;
/// Rows shown before the list truncates with a trailing count.
const MAX_ROWS: usize = 9;

/// Clickable text list of dyads.
#[derive(Debug, Clone)]
pub struct DyadList {
    /// Pairs of (dyad index, formatted row text), in display order
    rows: Vec<(usize, String)>,
    /// Index of the currently selected dyad, if any
    selected: Option<usize>,
}

impl DyadList {
    pub fn new(rows: Vec<(usize, String)>, selected: Option<usize>) -> Self {
        Self { rows, selected }
    }

    // Consumes `self`; the canvas takes ownership of the widget state.
    pub fn view(self) -> Element<'static, super::super::Message> {
        container(
            canvas::Canvas::new(self)
                .width(iced::Length::Fill)
                .height(iced::Length::Fixed(200.0)),
        )
        .into()
    }

    /// Maps a click position to the dyad index of the row under it.
    fn row_at(&self, pos: Point) -> Option<usize> {
        if pos.y < START_Y {
            return None;
        }
        let slot = ((pos.y - START_Y) / LINE_HEIGHT).floor() as usize;
        self.rows
            .iter()
            .take(MAX_ROWS)
            .nth(slot)
            .map(|(index, _)| *index)
    }
}

impl<Message> canvas::Program<Message> for DyadList
where
    Message: From<super::super::Message>,
{
    type State = ();

    fn update(
        &self,
        _state: &mut Self::State,
        event: Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> (event::Status, Option<Message>) {
        if let Some(position) = cursor.position_in(bounds) {
            if let Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) = event {
                if let Some(index) = self.row_at(position) {
                    return (
                        event::Status::Captured,
                        Some(super::super::Message::DyadSelected(index).into()),
                    );
                }
            }
        }
        (event::Status::Ignored, None)
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());

        // Show a message when no dyads are available
        if self.rows.is_empty() {
            frame.fill_text(Text {
                content: "No dyads found".to_string(),
                position: Point::new(bounds.width / 2.0, bounds.height / 2.0),
                color: theme.palette().text,
                size: 14.0.into(),
                horizontal_alignment: iced::alignment::Horizontal::Center,
                vertical_alignment: iced::alignment::Vertical::Center,
                ..Text::default()
            });
            return vec![frame.into_geometry()];
        }

        for (slot, (index, content)) in self.rows.iter().take(MAX_ROWS).enumerate() {
            let y = START_Y + slot as f32 * LINE_HEIGHT;
            let color = if Some(*index) == self.selected {
                Color::from_rgb8(0xFF, 0x33, 0x33) // Red (Selected)
            } else {
                theme.palette().text
            };
            frame.fill_text(Text {
                content: content.clone(),
                position: Point::new(PADDING, y),
                color,
                size: 14.0.into(),
                horizontal_alignment: iced::alignment::Horizontal::Left,
                vertical_alignment: iced::alignment::Vertical::Top,
                ..Text::default()
            });
        }

        // Trailing count for anything past the visible rows
        if self.rows.len() > MAX_ROWS {
            frame.fill_text(Text {
                content: format!("... and {} more", self.rows.len() - MAX_ROWS),
                position: Point::new(PADDING, START_Y + MAX_ROWS as f32 * LINE_HEIGHT),
                color: Color::from_rgb8(0x88, 0x88, 0x88),
                size: 13.0.into(),
                horizontal_alignment: iced::alignment::Horizontal::Left,
                vertical_alignment: iced::alignment::Vertical::Top,
                ..Text::default()
            });
        }

        vec![frame.into_geometry()]
    }
}
