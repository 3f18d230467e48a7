//! # Main Display Module
//!
//! This module contains the main display components and layout logic
//! for the Slantbar voicing finder: the query controls, the fretboard
//! canvas, the dyad list, and the settings sidebar.

use iced::{Element, Length, Alignment, Color};
use iced::widget::{column, Space, container, row, text, button, pick_list, text_input};

use crate::widgets::{dyad_list, fretboard};
use slantbar_core::dyads::{Dyad, DyadSource};
use slantbar_core::guide_tones::GuideTonePolicy;
use slantbar_core::instrument::builtin_profiles;
use slantbar_core::substitutions::Degree;

/// Guide-tone policies offered in the pick list, default first.
const POLICIES: [GuideTonePolicy; 2] = [
    GuideTonePolicy::WeightedScore,
    GuideTonePolicy::RolePair,
];

/// Configuration for a single button in the settings sidebar
#[derive(Debug, Clone)]
struct ButtonConfig {
    label: &'static str,
    message: Option<crate::Message>,
    button_type: ButtonType,
}

/// Different types of buttons with their styling requirements
#[derive(Debug, Clone)]
enum ButtonType {
    /// Standard button with no special styling
    Standard,
    /// Search-option button that changes color while its option is on
    Toggle,
}

/// Static settings configuration - no need for a function
const SETTINGS_CONFIG: &[(&str, &[ButtonConfig])] = &[
    ("Search options", &[
        ButtonConfig { label: "Use levers/pedals", message: Some(crate::Message::ToggleMechanisms), button_type: ButtonType::Toggle },
        ButtonConfig { label: "Substitutions", message: Some(crate::Message::ToggleSubstitutions), button_type: ButtonType::Toggle },
        ButtonConfig { label: "Guide tones only", message: Some(crate::Message::ToggleGuideTones), button_type: ButtonType::Toggle },
    ]),
    ("Program", &[
        ButtonConfig { label: "Save Profile", message: Some(crate::Message::SaveProfile), button_type: ButtonType::Standard },
        ButtonConfig { label: "Load Profile", message: Some(crate::Message::LoadProfile), button_type: ButtonType::Standard },
        ButtonConfig { label: "Exit", message: Some(crate::Message::Exit), button_type: ButtonType::Standard },
    ]),
];

/// Creates the complete main application view
pub fn create_main_view(data: &crate::AppDisplayData) -> Element<'static, crate::Message> {
    eprintln!("[VIEW] Rendering GUI...");

    let title = text("Slantbar").size(28);

    // Build UI panels using dedicated helper methods
    let query_panel = create_query_panel(data);
    let fretboard_panel = create_fretboard_panel(data);
    let dyad_panel = create_dyad_panel(data);

    // Create sidebar
    let sidebar = create_sidebar(data);

    // Assemble the final layout
    let main_content = row![
        column![
            title,
            Space::with_height(10),
            query_panel,
            Space::with_height(10),
            fretboard_panel,
            Space::with_height(10),
            dyad_panel,
            Space::with_height(10),
            create_status_line(data),
        ]
        .width(Length::Fill)
        .spacing(10),
        Space::with_width(10),
        sidebar,
    ]
    .align_y(Alignment::Start)
    .padding(20);

    container(main_content)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}

/// Creates the query panel: chord and tuning inputs plus the preset,
/// degree, and guide-tone policy pick lists.
fn create_query_panel(data: &crate::AppDisplayData) -> Element<'static, crate::Message> {
    let profiles: Vec<String> = builtin_profiles()
        .iter()
        .map(|p| p.name.clone())
        .collect();

    let controls = row![
        column![
            text("Chord").size(14),
            text_input("C, Am7, Bbmaj7...", &data.chord_input)
                .on_input(crate::Message::ChordInput)
                .width(Length::Fixed(140.0)),
        ]
        .spacing(4),
        column![
            text("Tuning (low to high)").size(14),
            text_input("G B D F# A D", &data.tuning_input)
                .on_input(crate::Message::TuningInput)
                .width(Length::Fill),
        ]
        .spacing(4),
        column![
            text("Instrument").size(14),
            pick_list(
                profiles,
                Some(data.profile_name.clone()),
                crate::Message::ProfileSelected
            ),
        ]
        .spacing(4),
        column![
            text("Degree").size(14),
            pick_list(Degree::ALL, Some(data.degree), crate::Message::DegreeSelected),
        ]
        .spacing(4),
        column![
            text("Guide tones").size(14),
            pick_list(POLICIES, Some(data.policy), crate::Message::PolicySelected),
        ]
        .spacing(4),
    ]
    .spacing(10)
    .align_y(Alignment::End);

    container(controls).width(Length::Fill).into()
}

/// Creates the fretboard panel with all found dyads drawn on it.
fn create_fretboard_panel(data: &crate::AppDisplayData) -> Element<'static, crate::Message> {
    let content: Element<'static, crate::Message> = match &data.tuning {
        Some(tuning) => {
            let dyads = data
                .result
                .as_ref()
                .map(|r| r.dyads.clone())
                .unwrap_or_default();
            container(fretboard::Fretboard::new(tuning.strings().to_vec(), dyads, data.selected).view())
                .width(Length::Fill)
                .height(Length::Fill)
                .into()
        }
        None => text("Enter a tuning to see the fretboard").size(14).into(),
    };

    let panel = container(
        column![
            text("Fretboard").size(18),
            Space::with_height(10),
            content
        ]
        .spacing(5)
        .padding(15)
    )
    .width(Length::Fill)
    .height(Length::Fixed(330.0));

    panel.into()
}

/// Creates the clickable dyad list panel.
fn create_dyad_panel(data: &crate::AppDisplayData) -> Element<'static, crate::Message> {
    let rows: Vec<(usize, String)> = data
        .result
        .as_ref()
        .map(|r| {
            r.dyads
                .iter()
                .enumerate()
                .map(|(i, d)| (i, format_dyad_row(i, d)))
                .collect()
        })
        .unwrap_or_default();

    let list_content = container(dyad_list::DyadList::new(rows, data.selected).view())
        .width(Length::Fill)
        .height(Length::Fill);

    let panel = container(
        column![
            text("Dyads").size(18),
            Space::with_height(10),
            list_content
        ]
        .spacing(5)
        .padding(15)
    )
    .width(Length::Fill)
    .height(Length::Fixed(270.0));

    panel.into()
}

/// Creates the one-line search summary, or shows the current parse error.
fn create_status_line(data: &crate::AppDisplayData) -> Element<'static, crate::Message> {
    let mut line = data.status.clone();
    if !data.audio_active {
        line.push_str("  (audio unavailable)");
    }
    text(line).size(14).into()
}

/// Creates the settings sidebar widget.
///
/// Builds the right-side panel containing the search option toggles, the
/// profile management buttons, and the readout for the selected dyad.
fn create_sidebar(data: &crate::AppDisplayData) -> Element<'static, crate::Message> {
    let mut sections = column![].spacing(10);

    // Add all settings sections
    for (title, buttons) in SETTINGS_CONFIG {
        sections = sections.push(make_settings_section(title, buttons, data));
    }

    // Selected-dyad readout at the bottom
    sections = sections.push(create_details_section(data));

    container(sections.padding(15))
        .width(Length::Fixed(250.0))
        .height(Length::Fill)
        .into()
}

/// Creates the readout for the dyad the user clicked, if any.
fn create_details_section(data: &crate::AppDisplayData) -> Element<'static, crate::Message> {
    let mut lines = column![
        text("Selected Dyad").size(18),
        Space::with_height(10)
    ]
    .spacing(5);

    let selected = data
        .selected
        .and_then(|i| data.result.as_ref().and_then(|r| r.dyads.get(i)));

    match selected {
        Some(dyad) => {
            lines = lines.push(text(format!("{} + {}", dyad.low.pitch, dyad.high.pitch)).size(14));
            lines = lines.push(text(format!("Interval: {}", dyad.interval_label())).size(14));
            lines = lines.push(text(format!("Bar: {} @ {}", dyad.kind.label(), fret_span(dyad))).size(14));
            lines = lines.push(text(format!(
                "Strings: {} / {}",
                dyad.low.string + 1,
                dyad.high.string + 1
            ))
            .size(14));
            if let Some(origin) = describe_source(dyad) {
                lines = lines.push(text(origin).size(14));
            }
        }
        None => {
            lines = lines.push(text("Click a dyad to hear it").size(14));
        }
    }

    lines.into()
}

/// Creates a button based on configuration and application state.
///
/// Toggle buttons pick up a green background while the search option they
/// control is switched on.
fn make_button(
    config: &ButtonConfig,
    data: &crate::AppDisplayData,
) -> Element<'static, crate::Message> {
    let mut widget = button(text(config.label).size(14).width(Length::Fill))
        .padding([6, 10]);

    // Apply styling based on button type and state
    match config.button_type {
        ButtonType::Standard => {
            // No special styling needed
        }
        ButtonType::Toggle => {
            if toggle_is_on(config, data) {
                widget = widget.style(|_theme, _status| {
                    use iced::widget::button;
                    button::Style {
                        background: Some(iced::Background::Color(Color::from_rgb(0.18, 0.49, 0.27))), // Green background
                        text_color: Color::WHITE,
                        ..button::Style::default()
                    }
                });
            }
        }
    }

    // Add message handler if available
    if let Some(message) = &config.message {
        widget.on_press(message.clone()).into()
    } else {
        widget.into()
    }
}

/// Current state of the search option a toggle button controls.
fn toggle_is_on(config: &ButtonConfig, data: &crate::AppDisplayData) -> bool {
    match config.message {
        Some(crate::Message::ToggleMechanisms) => data.use_mechanisms,
        Some(crate::Message::ToggleSubstitutions) => data.show_substitutions,
        Some(crate::Message::ToggleGuideTones) => data.guide_tones_only,
        _ => false,
    }
}

/// Creates a settings section with title and buttons.
fn make_settings_section(
    title: &'static str,
    buttons: &[ButtonConfig],
    data: &crate::AppDisplayData,
) -> Element<'static, crate::Message> {
    let title_widget = text(title).size(18);

    let items_widget = buttons.iter().fold(
        column![].spacing(8),
        |col, config| {
            col.push(make_button(config, data))
        }
    );

    column![
        title_widget,
        Space::with_height(10),
        items_widget
    ]
    .spacing(5)
    .into()
}

/// Formats one text row of the dyad list.
fn format_dyad_row(index: usize, dyad: &Dyad) -> String {
    let mut row = format!(
        "{:>2}. {}-{}  {}  {} @{}",
        index + 1,
        dyad.low.pitch,
        dyad.high.pitch,
        dyad.interval_label(),
        dyad.kind.label(),
        fret_span(dyad)
    );
    match &dyad.source {
        DyadSource::Direct => {}
        DyadSource::Altered => row.push_str("  (lever)"),
        DyadSource::Substitute { symbol, degree, .. } => {
            row.push_str(&format!("  [{} {}]", degree, symbol));
        }
    }
    row
}

/// Fret text for a dyad: one number for a straight bar, two for a slant.
fn fret_span(dyad: &Dyad) -> String {
    if dyad.low.fret == dyad.high.fret {
        dyad.low.fret.to_string()
    } else {
        format!("{}/{}", dyad.low.fret, dyad.high.fret)
    }
}

/// Provenance line for dyads that did not come from voicing the queried
/// chord on the plain strings.
fn describe_source(dyad: &Dyad) -> Option<String> {
    match &dyad.source {
        DyadSource::Direct => None,
        DyadSource::Altered => Some("Uses an engaged lever".to_string()),
        DyadSource::Substitute { kind, symbol, degree } => {
            Some(format!("{} sub: {} ({})", kind.label(), symbol, degree))
        }
    }
}
