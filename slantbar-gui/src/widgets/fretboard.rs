//! # Fretboard Widget
//!
//! This module provides the interactive fretboard canvas for the voicing
//! finder. It draws the open strings, the fret grid, and a marker pair for
//! every found dyad, connected by a bar line.
//!
//! ## Features
//! - Tab-style layout: lowest string at the bottom, nut on the left
//! - Dyad markers colored by provenance (direct, lever, substitution)
//! - Click-to-select: clicking a marker selects and plays that dyad
//! - Hover readout next to the cursor: notes, interval, bar kind, frets
//! - Fret range adapts to the highest marker on display

use iced::widget::canvas::{self, event, Event, Fill, Geometry, Path, Stroke, Text};
use iced::widget::container;
use iced::{mouse, Color, Element, Point, Rectangle, Renderer, Size, Theme};

use slantbar_core::dyads::{Dyad, DyadSource};
use slantbar_core::pitch::PitchClass;
use slantbar_core::substitutions::SubstitutionKind;

/// Margin reserved on the left for the open-string labels.
const LABEL_MARGIN: f32 = 42.0;
/// Padding past the last fret line.
const RIGHT_PAD: f32 = 12.0;
/// Vertical padding above the top string and below the bottom one.
const EDGE_MARGIN: f32 = 26.0;
/// Radius of a dyad note marker.
const MARKER_RADIUS: f32 = 7.0;
/// Extra slop around a marker that still counts as a hit.
const HIT_SLOP: f32 = 3.0;

/// Frets that get a number under the grid, matching common inlay spots.
const NUMBERED_FRETS: [u8; 10] = [3, 5, 7, 9, 12, 15, 17, 19, 21, 24];

/// Interactive fretboard widget showing every found dyad in place.
#[derive(Debug, Clone)]
pub struct Fretboard {
    /// Open-string pitches, lowest string first
    open_strings: Vec<PitchClass>,
    /// Dyads to draw, in display order
    dyads: Vec<Dyad>,
    /// Index of the dyad the user clicked, if any
    selected: Option<usize>,
    /// Last fret line drawn
    last_fret: u8,
}

impl Fretboard {
    pub fn new(open_strings: Vec<PitchClass>, dyads: Vec<Dyad>, selected: Option<usize>) -> Self {
        // Show at least an octave, and keep a couple of frets of headroom
        // past the highest marker.
        let highest = dyads
            .iter()
            .map(|d| d.low.fret.max(d.high.fret))
            .max()
            .unwrap_or(0);
        let last_fret = (highest + 2).clamp(12, 24);

        Self {
            open_strings,
            dyads,
            selected,
            last_fret,
        }
    }

    // Consumes `self`; the canvas takes ownership of the widget state.
    pub fn view(self) -> Element<'static, super::super::Message> {
        container(
            canvas::Canvas::new(self)
                .width(iced::Length::Fill)
                .height(iced::Length::Fixed(240.0)),
        )
        .into()
    }

    fn fret_x(&self, bounds: Size, fret: u8) -> f32 {
        let span = bounds.width - LABEL_MARGIN - RIGHT_PAD;
        LABEL_MARGIN + span * f32::from(fret) / f32::from(self.last_fret)
    }

    fn string_y(&self, bounds: Size, string: usize) -> f32 {
        // String 0 (lowest pitch) sits at the bottom, tab style.
        let count = self.open_strings.len().max(2);
        let gap = (bounds.height - 2.0 * EDGE_MARGIN) / (count - 1) as f32;
        bounds.height - EDGE_MARGIN - gap * string as f32
    }

    fn marker_points(&self, bounds: Size, dyad: &Dyad) -> (Point, Point) {
        (
            Point::new(
                self.fret_x(bounds, dyad.low.fret),
                self.string_y(bounds, dyad.low.string),
            ),
            Point::new(
                self.fret_x(bounds, dyad.high.fret),
                self.string_y(bounds, dyad.high.string),
            ),
        )
    }

    fn dyad_at(&self, bounds: Size, pos: Point) -> Option<usize> {
        // Walk back to front so whatever was drawn on top wins the click.
        for (index, dyad) in self.dyads.iter().enumerate().rev() {
            let (low, high) = self.marker_points(bounds, dyad);
            if distance(pos, low) <= MARKER_RADIUS + HIT_SLOP
                || distance(pos, high) <= MARKER_RADIUS + HIT_SLOP
            {
                return Some(index);
            }
        }
        None
    }

    fn dyad_color(dyad: &Dyad) -> Color {
        match &dyad.source {
            DyadSource::Direct => Color::from_rgb8(0x34, 0xDB, 0x98), // Green
            DyadSource::Altered => Color::from_rgb8(0xF5, 0xA6, 0x23), // Orange
            DyadSource::Substitute {
                kind: SubstitutionKind::Diatonic,
                ..
            } => Color::from_rgb8(0x4D, 0xA6, 0xFF), // Blue
            DyadSource::Substitute {
                kind: SubstitutionKind::Tritone,
                ..
            } => Color::from_rgb8(0xB1, 0x6C, 0xF0), // Purple
        }
    }

    fn draw_dyad(&self, frame: &mut canvas::Frame, bounds: Size, dyad: &Dyad, selected: bool) {
        let color = if selected {
            Color::from_rgb8(0xFF, 0x33, 0x33) // Red (Selected)
        } else {
            Self::dyad_color(dyad)
        };
        let (low, high) = self.marker_points(bounds, dyad);

        // The bar line first, then the note markers on top of it.
        frame.stroke(
            &Path::line(low, high),
            Stroke::default().with_color(color).with_width(3.0),
        );
        for (point, position) in [(low, &dyad.low), (high, &dyad.high)] {
            frame.fill(&Path::circle(point, MARKER_RADIUS), Fill::from(color));
            frame.stroke(
                &Path::circle(point, MARKER_RADIUS),
                Stroke::default().with_color(Color::BLACK),
            );
            // Lever-engaged notes get a white pip so the altered string
            // stands out within the pair.
            if position.engaged {
                frame.fill(&Path::circle(point, 2.5), Fill::from(Color::WHITE));
            }
        }
    }
}

impl<Message> canvas::Program<Message> for Fretboard
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
                if let Some(index) = self.dyad_at(bounds.size(), position) {
                    return (
                        event::Status::Captured,
                        Some(super::super::Message::DyadSelected(index).into()),
                    );
                }
            }
        }
        (event::Status::Ignored, None)
    }

    fn mouse_interaction(
        &self,
        _state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        let over_marker = cursor
            .position_in(bounds)
            .and_then(|position| self.dyad_at(bounds.size(), position))
            .is_some();
        if over_marker {
            mouse::Interaction::Pointer
        } else {
            mouse::Interaction::default()
        }
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        theme: &Theme,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());
        let size = bounds.size();

        // Fret lines, with a heavier nut at fret 0
        for fret in 0..=self.last_fret {
            let x = self.fret_x(size, fret);
            let top = self.string_y(size, self.open_strings.len().saturating_sub(1));
            let bottom = self.string_y(size, 0);
            let (color, width) = if fret == 0 {
                (Color::from_rgb8(0xCC, 0xCC, 0xCC), 3.0)
            } else {
                (Color::from_rgb8(0x55, 0x55, 0x55), 1.0)
            };
            frame.stroke(
                &Path::line(Point::new(x, top - 8.0), Point::new(x, bottom + 8.0)),
                Stroke::default().with_color(color).with_width(width),
            );
        }

        // Fret numbers under the grid at the usual inlay positions
        for fret in NUMBERED_FRETS {
            if fret > self.last_fret {
                break;
            }
            frame.fill_text(Text {
                content: fret.to_string(),
                position: Point::new(self.fret_x(size, fret), size.height - 4.0),
                color: Color::from_rgb8(0x88, 0x88, 0x88),
                size: 12.0.into(),
                horizontal_alignment: iced::alignment::Horizontal::Center,
                vertical_alignment: iced::alignment::Vertical::Bottom,
                ..Text::default()
            });
        }

        // Strings with open-pitch labels on the left
        for (string, pitch) in self.open_strings.iter().enumerate() {
            let y = self.string_y(size, string);
            frame.stroke(
                &Path::line(
                    Point::new(LABEL_MARGIN, y),
                    Point::new(size.width - RIGHT_PAD, y),
                ),
                Stroke::default().with_color(Color::from_rgb8(0x88, 0x88, 0x88)),
            );
            frame.fill_text(Text {
                content: pitch.name().to_string(),
                position: Point::new(LABEL_MARGIN - 8.0, y),
                color: theme.palette().text,
                size: 13.0.into(),
                horizontal_alignment: iced::alignment::Horizontal::Right,
                vertical_alignment: iced::alignment::Vertical::Center,
                ..Text::default()
            });
        }

        // Unselected dyads first so the selected pair lands on top
        for (index, dyad) in self.dyads.iter().enumerate() {
            if Some(index) != self.selected {
                self.draw_dyad(&mut frame, size, dyad, false);
            }
        }
        if let Some(index) = self.selected {
            if let Some(dyad) = self.dyads.get(index) {
                self.draw_dyad(&mut frame, size, dyad, true);
            }
        }

        // Hover readout beside the cursor, flipped to whichever side of the
        // canvas has room for it.
        if let Some(position) = cursor.position_in(bounds) {
            if let Some(index) = self.dyad_at(size, position) {
                let (horizontal, dx) = if position.x < size.width / 2.0 {
                    (iced::alignment::Horizontal::Left, 12.0)
                } else {
                    (iced::alignment::Horizontal::Right, -12.0)
                };
                let (vertical, dy) = if position.y < 34.0 {
                    (iced::alignment::Vertical::Top, 14.0)
                } else {
                    (iced::alignment::Vertical::Bottom, -10.0)
                };
                frame.fill_text(Text {
                    content: hover_text(&self.dyads[index]),
                    position: Point::new(position.x + dx, position.y + dy),
                    color: Color::WHITE,
                    size: 13.0.into(),
                    horizontal_alignment: horizontal,
                    vertical_alignment: vertical,
                    ..Text::default()
                });
            }
        }

        vec![frame.into_geometry()]
    }
}

/// One-line summary shown while hovering a marker: notes, interval label,
/// bar kind, fret span, and provenance when the dyad is not a plain one.
fn hover_text(dyad: &Dyad) -> String {
    let span = if dyad.low.fret == dyad.high.fret {
        dyad.low.fret.to_string()
    } else {
        format!("{}/{}", dyad.low.fret, dyad.high.fret)
    };
    let mut line = format!(
        "{}-{}  {}  {} @{}",
        dyad.low.pitch,
        dyad.high.pitch,
        dyad.interval_label(),
        dyad.kind.label(),
        span
    );
    match &dyad.source {
        DyadSource::Direct => {}
        DyadSource::Altered => line.push_str("  (lever)"),
        DyadSource::Substitute {
            kind,
            symbol,
            degree,
        } => {
            line.push_str(&format!("  {} sub: {} ({})", kind.label(), symbol, degree));
        }
    }
    line
}

fn distance(a: Point, b: Point) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}
