//! Turns sampled mouse state into player intents.
//!
//! The event source only tells which buttons are held and which cells the pointer entered or
//! left. Pressing both buttons "at once" usually lands on different sampling ticks, and letting go
//! of them does too, so the classifier keeps a short debounce window during which a two-button
//! gesture survives one of the buttons being released early.

use std::collections::BTreeSet;
use std::time::Duration;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::*;

/// Ticks a dropped button still counts as part of a two-button chord.
pub const DEFAULT_DEBOUNCE_TICKS: u8 = 5;

/// How often a presentation layer is expected to sample the buttons.
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(30);

bitflags! {
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct MouseButtons: u8 {
        const LEFT  = 1;
        const RIGHT = 1 << 1;
    }
}

impl MouseButtons {
    pub fn from_held(left: bool, right: bool) -> Self {
        let mut buttons = Self::empty();
        buttons.set(Self::LEFT, left);
        buttons.set(Self::RIGHT, right);
        buttons
    }
}

/// What a completed press-and-release gesture means.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClickIntent {
    #[default]
    None,
    Reveal,
    ToggleFlag,
    Chord,
}

/// Where the pointer is, as reported by per-cell enter/leave notifications.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Hover {
    Outside,
    Cell(Coord2),
    /// Several cells claim the pointer, which only happens when notifications got lost.
    Ambiguous(usize),
}

/// Collects enter/leave notifications from the cells of the board.
#[derive(Clone, Debug, Default)]
pub struct HoverTracker {
    entered: BTreeSet<Coord2>,
}

impl HoverTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&mut self, coords: Coord2) {
        self.entered.insert(coords);
    }

    pub fn leave(&mut self, coords: Coord2) {
        self.entered.remove(&coords);
    }

    pub fn clear(&mut self) {
        self.entered.clear();
    }

    pub fn hover(&self) -> Hover {
        let mut cells = self.entered.iter();
        match (cells.next(), cells.next()) {
            (None, _) => Hover::Outside,
            (Some(&coords), None) => Hover::Cell(coords),
            (Some(_), Some(_)) => Hover::Ambiguous(self.entered.len()),
        }
    }
}

/// Result of one sampling tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Classified {
    /// Nothing to do this tick.
    Idle,
    Intent { intent: ClickIntent, at: Coord2 },
    /// A gesture finished but could not be attributed to a single cell.
    Anomaly(InputAnomaly),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Holder {
    Left,
    Right,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClickClassifier {
    debounce_ticks: u8,
    pending_both: bool,
    settle_counter: u8,
    holder: Option<Holder>,
}

impl Default for ClickClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_TICKS)
    }
}

impl ClickClassifier {
    pub fn new(debounce_ticks: u8) -> Self {
        Self {
            debounce_ticks,
            pending_both: false,
            settle_counter: 0,
            holder: None,
        }
    }

    pub fn debounce_ticks(&self) -> u8 {
        self.debounce_ticks
    }

    /// Intent the gesture would produce if released now, used to preview pressed cells.
    pub fn gesture(&self) -> ClickIntent {
        match (self.pending_both, self.holder) {
            (true, _) => ClickIntent::Chord,
            (false, Some(Holder::Left)) => ClickIntent::Reveal,
            (false, Some(Holder::Right)) => ClickIntent::ToggleFlag,
            (false, None) => ClickIntent::None,
        }
    }

    pub fn reset(&mut self) {
        self.pending_both = false;
        self.settle_counter = 0;
        self.holder = None;
    }

    /// Processes one sample of the held buttons together with the current hover.
    ///
    /// At most one intent comes out per gesture, on the tick where every button is up.
    pub fn sample(&mut self, buttons: MouseButtons, hover: Hover) -> Classified {
        let left = buttons.contains(MouseButtons::LEFT);
        let right = buttons.contains(MouseButtons::RIGHT);

        match (left, right) {
            (false, false) => {
                let intent = self.gesture();
                self.reset();
                if intent == ClickIntent::None {
                    return Classified::Idle;
                }
                match hover {
                    Hover::Cell(at) => {
                        log::trace!("{:?} released over {:?}", intent, at);
                        Classified::Intent { intent, at }
                    }
                    Hover::Outside => {
                        log::trace!("{:?} released outside the board", intent);
                        Classified::Idle
                    }
                    Hover::Ambiguous(count) => {
                        let anomaly = InputAnomaly::AmbiguousHover(count);
                        log::warn!("{}, dropping {:?}", anomaly, intent);
                        Classified::Anomaly(anomaly)
                    }
                }
            }
            (true, true) => {
                self.pending_both = true;
                self.settle_counter = 0;
                self.holder = None;
                Classified::Idle
            }
            (true, false) | (false, true) => {
                if self.pending_both && self.settle_counter < self.debounce_ticks {
                    self.settle_counter += 1;
                } else {
                    self.pending_both = false;
                    self.settle_counter = 0;
                    self.holder = Some(if left { Holder::Left } else { Holder::Right });
                }
                Classified::Idle
            }
        }
    }
}
