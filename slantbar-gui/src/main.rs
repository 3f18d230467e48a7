//! # Slantbar - Bar Voicing Finder GUI
//!
//! This module contains the main GUI application for the Slantbar voicing
//! finder. It wires chord/tuning inputs, the fretboard canvas, and the dyad
//! list to the headless search pipeline, and plays clicked voicings.
//!
//! ## Architecture
//! - **Main Thread**: Iced GUI application with dark theme
//! - **Audio Thread**: Dedicated thread owning the tone-player stream
//! - **Communication**: Crossbeam channels for thread-safe data exchange
//! - **Updates**: the whole search pipeline reruns on every input change

mod ui;
mod widgets;

use crossbeam_channel::Sender;
use cpal::traits::StreamTrait;
use iced::{Element, Theme};
use std::thread::{self, JoinHandle};
use slantbar_core::{
    VoicingResult,
    audio::{self, Envelope, PlayCommand},
    chords::expand_chord,
    dyads::{DEFAULT_MAX_SLANT, Dyad, find_dyads},
    fretboard::{FretPosition, MAX_FRET, Mechanism, Tuning},
    guide_tones::{GuideTonePolicy, filter_guide_tones},
    instrument::{InstrumentProfile, builtin_profiles},
    substitutions::{Degree, substitute_dyads},
};
use ui::main_display::create_main_view;

/// Where the current instrument configuration is saved on disk.
const PROFILE_PATH: &str = "instrument_profile.json";

/// Profile name shown once the user edits the tuning away from a preset.
const CUSTOM_PROFILE: &str = "custom";

/// Base octave per string index, lowest string first, for playback and
/// display. Frets add `fret / 12` on top; anything past twelve strings
/// clamps to the last entry.
const STRING_BASE_OCTAVES: [i32; 12] = [2, 2, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5];

/// Main entry point for the Slantbar application.
///
/// Initializes the Iced GUI application with dark theme and starts the tone
/// playback thread.
pub fn main() -> iced::Result {
    eprintln!("[MAIN] Starting Slantbar application...");
    eprintln!("[MAIN] Initializing GUI framework...");
    let result = iced::application("Slantbar", VoicingApp::update, VoicingApp::view)
        .theme(VoicingApp::theme)
        .run();
    eprintln!("[MAIN] Application finished with result: {:?}", result);
    result
}

/// Application message types for the Iced GUI framework.
#[derive(Debug, Clone)]
pub enum Message {
    // Query inputs
    ChordInput(String),       // Chord symbol text changed
    TuningInput(String),      // Tuning text changed (switches to a custom profile)
    ProfileSelected(String),  // Instrument preset picked by name
    DegreeSelected(Degree),   // Scale degree of the queried chord
    PolicySelected(GuideTonePolicy), // Active guide-tone policy

    // Search option toggles
    ToggleMechanisms,         // Use the profile's levers/pedals in the search
    ToggleSubstitutions,      // Include substitute-chord dyads
    ToggleGuideTones,         // Run the guide-tone filter on the result

    // Result interaction
    DyadSelected(usize),      // A dyad was clicked (fretboard or list); plays it

    // Profile management
    SaveProfile,              // Save the current instrument configuration
    LoadProfile,              // Load an instrument configuration from file

    // Application control
    Exit,                     // Application exit request
}

/// UI-specific data needed for rendering the interface.
///
/// This struct contains only the data that the UI components need.
#[derive(Debug, Clone)]
pub struct AppDisplayData {
    // Query inputs as typed
    pub chord_input: String,
    pub tuning_input: String,
    pub profile_name: String,
    pub degree: Degree,
    pub policy: GuideTonePolicy,

    // Search option toggles
    pub use_mechanisms: bool,
    pub show_substitutions: bool,
    pub guide_tones_only: bool,

    // Last successful parse/search
    pub tuning: Option<Tuning>,
    pub result: Option<VoicingResult>,
    pub selected: Option<usize>,

    // Parse errors or a one-line result summary
    pub status: String,

    // Audio state
    pub audio_active: bool,
}

/// Main application state for the Slantbar voicing finder.
#[derive(Debug)]
struct VoicingApp {
    // Audio processing components
    audio_worker: Option<AudioWorker>,   // Tone-player thread management
    play_tx: Option<Sender<PlayCommand>>, // Channel into the audio callback

    // Mechanisms of the active instrument profile
    mechanisms: Vec<Mechanism>,

    // Single source of truth for all display data
    display_data: AppDisplayData,
}

/// Audio worker thread management structure.
///
/// Handles the dedicated tone-player thread and provides a way to shut it
/// down gracefully.
#[derive(Debug)]
struct AudioWorker {
    shutdown_tx: Sender<()>,               // Channel to send shutdown signal
    thread_handle: Option<JoinHandle<()>>, // Handle to the audio thread
}

impl Default for VoicingApp {
    /// Creates a new VoicingApp with the first built-in instrument preset,
    /// a C-major query, and the tone player running.
    fn default() -> Self {
        eprintln!("[MAIN] Creating VoicingApp...");
        let preset = &builtin_profiles()[0];
        let mut app = Self {
            audio_worker: None,
            play_tx: None,
            mechanisms: preset.mechanisms.clone(),
            display_data: AppDisplayData {
                chord_input: "C".to_string(),
                tuning_input: preset.tuning.to_string(),
                profile_name: preset.name.clone(),
                degree: Degree::I,
                policy: GuideTonePolicy::default(),
                use_mechanisms: true,
                show_substitutions: false,
                guide_tones_only: false,
                tuning: None,
                result: None,
                selected: None,
                status: String::new(),
                audio_active: false,
            },
        };

        eprintln!("[MAIN] Starting tone player...");
        app.start_audio();
        app.recompute();
        eprintln!("[MAIN] VoicingApp created successfully");
        app
    }
}

impl VoicingApp {
    /// Starts the dedicated tone-player thread.
    ///
    /// The thread builds the output stream, then parks on the shutdown
    /// channel; all mixing happens inside the stream callback, which drains
    /// the play channel on its own.
    fn start_audio(&mut self) {
        let (play_tx, play_rx) = crossbeam_channel::unbounded();
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded(1);

        let thread_handle = thread::spawn(move || {
            eprintln!("[AUDIO-THREAD] Starting audio thread...");
            let (stream, sample_rate) = match audio::start_tone_player(play_rx) {
                Ok(tuple) => {
                    eprintln!("[AUDIO-THREAD] Tone player started successfully");
                    tuple
                }
                Err(e) => {
                    eprintln!("[AUDIO-THREAD] Fatal Error starting audio: {}", e);
                    return;
                }
            };
            eprintln!("[AUDIO-THREAD] Playing at {} Hz until shutdown", sample_rate);

            // The stream callback does all the work; just keep it alive.
            let _ = shutdown_rx.recv();

            eprintln!("[AUDIO-THREAD] Received shutdown signal");
            if let Err(e) = stream.pause() {
                eprintln!("[AUDIO-THREAD] Error pausing stream: {}", e);
            }
            drop(stream);
            eprintln!("[AUDIO-THREAD] Audio thread finished");
        });

        self.audio_worker = Some(AudioWorker {
            shutdown_tx,
            thread_handle: Some(thread_handle),
        });
        self.play_tx = Some(play_tx);
        self.display_data.audio_active = true;
    }

    /// Reruns the whole search pipeline from the current inputs.
    ///
    /// Parsing failures land in the status line and leave the previous
    /// fretboard contents alone; successes replace the result and clear the
    /// selection.
    fn recompute(&mut self) {
        let data = &mut self.display_data;
        let mechanisms: &[Mechanism] = if data.use_mechanisms {
            &self.mechanisms
        } else {
            &[]
        };

        match perform_search(
            &data.chord_input,
            &data.tuning_input,
            mechanisms,
            data.degree,
            data.policy,
            data.show_substitutions,
            data.guide_tones_only,
        ) {
            Ok((tuning, result)) => {
                let tones: Vec<&str> = result.chord.tones.iter().map(|t| t.name()).collect();
                data.status = format!(
                    "{} ({}): {} dyads",
                    result.chord.symbol,
                    tones.join(" "),
                    result.dyads.len()
                );
                data.tuning = Some(tuning);
                data.result = Some(result);
                data.selected = None;
            }
            Err(message) => {
                data.status = message;
                data.result = None;
                data.selected = None;
            }
        }
    }

    /// Sends both notes of a dyad to the tone player. Fire-and-forget; a
    /// missing or failed audio thread only logs.
    fn play_dyad(&self, dyad: &Dyad) {
        let Some(tx) = &self.play_tx else {
            return;
        };
        for position in [&dyad.low, &dyad.high] {
            let command = PlayCommand {
                pitch: position.pitch,
                octave: estimate_octave(position),
                envelope: Envelope::default(),
            };
            if tx.try_send(command).is_err() {
                eprintln!("[MAIN] Tone channel unavailable");
                return;
            }
        }
    }

    /// Handles application state updates based on incoming messages.
    fn update(&mut self, message: Message) {
        eprintln!("[UPDATE] Received message: {:?}", message);

        match message {
            Message::Exit => {
                eprintln!("[MAIN] Window close requested - starting cleanup...");
                if let Some(mut worker) = self.audio_worker.take() {
                    eprintln!("[MAIN] Shutting down audio worker...");
                    let _ = worker.shutdown_tx.send(());
                    if let Some(handle) = worker.thread_handle.take() {
                        eprintln!("[MAIN] Waiting for audio thread to finish...");
                        let _ = handle.join();
                    }
                }
                self.play_tx = None;
                eprintln!("[MAIN] Cleanup completed - exiting");
                std::process::exit(0);
            }
            Message::ChordInput(value) => {
                self.display_data.chord_input = value;
                self.recompute();
            }
            Message::TuningInput(value) => {
                // Hand-edited tunings leave the preset; its mechanisms no
                // longer line up with the strings, so they are dropped.
                self.display_data.tuning_input = value;
                self.display_data.profile_name = CUSTOM_PROFILE.to_string();
                self.mechanisms.clear();
                self.recompute();
            }
            Message::ProfileSelected(name) => {
                if let Some(preset) = builtin_profiles().iter().find(|p| p.name == name) {
                    self.display_data.profile_name = preset.name.clone();
                    self.display_data.tuning_input = preset.tuning.to_string();
                    self.mechanisms = preset.mechanisms.clone();
                    self.recompute();
                }
            }
            Message::DegreeSelected(degree) => {
                self.display_data.degree = degree;
                self.recompute();
            }
            Message::PolicySelected(policy) => {
                self.display_data.policy = policy;
                self.recompute();
            }
            Message::ToggleMechanisms => {
                let on = !self.display_data.use_mechanisms;
                eprintln!("[MAIN] Toggling mechanisms: {} -> {}", !on, on);
                self.display_data.use_mechanisms = on;
                self.recompute();
            }
            Message::ToggleSubstitutions => {
                let on = !self.display_data.show_substitutions;
                eprintln!("[MAIN] Toggling substitutions: {} -> {}", !on, on);
                self.display_data.show_substitutions = on;
                self.recompute();
            }
            Message::ToggleGuideTones => {
                let on = !self.display_data.guide_tones_only;
                eprintln!("[MAIN] Toggling guide tones: {} -> {}", !on, on);
                self.display_data.guide_tones_only = on;
                self.recompute();
            }
            Message::DyadSelected(index) => {
                let dyad = self
                    .display_data
                    .result
                    .as_ref()
                    .and_then(|r| r.dyads.get(index))
                    .cloned();
                if let Some(dyad) = dyad {
                    self.display_data.selected = Some(index);
                    self.play_dyad(&dyad);
                }
            }
            Message::SaveProfile => {
                let Some(tuning) = self.display_data.tuning.clone() else {
                    eprintln!("[MAIN] Nothing to save: tuning has not parsed yet");
                    return;
                };
                let profile = InstrumentProfile::new(
                    &self.display_data.profile_name,
                    tuning,
                    self.mechanisms.clone(),
                );
                match save_profile(&profile, PROFILE_PATH) {
                    Ok(_) => eprintln!("[MAIN] Instrument profile saved successfully."),
                    Err(e) => eprintln!("[MAIN] Error saving profile: {}", e),
                }
            }
            Message::LoadProfile => {
                match load_profile(PROFILE_PATH) {
                    Ok(profile) => {
                        eprintln!("[MAIN] Instrument profile loaded successfully.");
                        self.display_data.profile_name = profile.name.clone();
                        self.display_data.tuning_input = profile.tuning.to_string();
                        self.mechanisms = profile.mechanisms;
                        self.recompute();
                    }
                    Err(e) => eprintln!("[MAIN] Error loading profile: {}", e),
                }
            }
        }
    }

    /// Renders the main application interface.
    ///
    /// Delegates all UI rendering to the main_display module, keeping this
    /// function focused on application logic only.
    fn view(&self) -> Element<'_, Message> {
        create_main_view(&self.display_data)
    }

    /// Returns the application theme.
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Runs the full voicing pipeline for one query.
///
/// Parses the chord symbol and tuning, searches the instrument for dyads
/// (with the profile's mechanisms, if any were passed), optionally appends
/// substitute-chord dyads, and optionally reduces everything through the
/// guide-tone filter. Parse failures come back as display-ready strings.
fn perform_search(
    chord_input: &str,
    tuning_input: &str,
    mechanisms: &[Mechanism],
    degree: Degree,
    policy: GuideTonePolicy,
    show_substitutions: bool,
    guide_tones_only: bool,
) -> Result<(Tuning, VoicingResult), String> {
    let chord = expand_chord(chord_input).map_err(|e| e.to_string())?;
    let tuning = Tuning::parse(tuning_input).map_err(|e| e.to_string())?;

    let mut dyads = find_dyads(&chord.tones, DEFAULT_MAX_SLANT, &tuning, MAX_FRET, mechanisms);
    if show_substitutions {
        dyads.extend(substitute_dyads(
            chord.root,
            degree,
            DEFAULT_MAX_SLANT,
            &tuning,
            MAX_FRET,
        ));
    }
    if guide_tones_only {
        dyads = filter_guide_tones(&dyads, Some(chord.root), policy, None);
    }

    Ok((tuning, VoicingResult { chord, dyads }))
}

/// Rough octave of a fret position for playback: base octave of the string
/// plus one per twelve frets.
fn estimate_octave(position: &FretPosition) -> i32 {
    let index = position.string.min(STRING_BASE_OCTAVES.len() - 1);
    STRING_BASE_OCTAVES[index] + (position.fret / 12) as i32
}

// --- Profile Save/Load Functions ---

use std::fs::File;
use std::io::{Read, Write};

/// Saves the instrument profile to a JSON file.
///
/// Serializes the active tuning and mechanism set so a customized instrument
/// survives between sessions.
///
/// # Arguments
/// * `profile` - The instrument profile to save
/// * `path` - File path where the profile should be saved
///
/// # Returns
/// * `Ok(())` - Profile saved successfully
/// * `Err(io::Error)` - File I/O error or JSON serialization error
fn save_profile(profile: &InstrumentProfile, path: &str) -> std::io::Result<()> {
    let json_string = serde_json::to_string_pretty(profile)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    let mut file = File::create(path)?;
    file.write_all(json_string.as_bytes())?;
    Ok(())
}

/// Loads an instrument profile from a JSON file.
///
/// Deserializes a previously saved profile and checks its cross-field
/// invariants before handing it back; a profile whose mechanisms point at
/// missing strings is rejected here rather than surfacing later as a bad
/// search.
///
/// # Arguments
/// * `path` - File path to load the profile from
///
/// # Returns
/// * `Ok(InstrumentProfile)` - Successfully loaded and validated profile
/// * `Err(io::Error)` - File I/O error, JSON error, or invalid profile
fn load_profile(path: &str) -> std::io::Result<InstrumentProfile> {
    let mut file = File::open(path)?;
    let mut data = String::new();
    file.read_to_string(&mut data)?;
    let profile: InstrumentProfile = serde_json::from_str(&data)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    profile
        .validate()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    Ok(profile)
}
