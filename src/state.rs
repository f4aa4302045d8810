//! The composition snapshot and its reducer.
//!
//! Every change is expressed as a [`Message`]; [`reduce`] returns a new
//! snapshot with exactly one field replaced. Snapshots are never mutated
//! in place, so a render always sees a consistent state.

use crate::badge::Badge;
use crate::color::AccentColor;
use crate::selection::SelectionSet;
use crate::upload::UploadedImage;

/// Everything the preview depends on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompositionState {
    /// At most one background; a new upload replaces it wholesale.
    pub background: Option<UploadedImage>,
    pub title: String,
    pub accent: AccentColor,
    pub badges: SelectionSet,
}

impl CompositionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the snapshot produced by applying `message`.
    #[must_use]
    pub fn apply(&self, message: Message) -> Self {
        reduce(self, message)
    }
}

/// A single state change. Fields are visually independent, so no message
/// validates against another field.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    SetBackground(UploadedImage),
    ClearBackground,
    SetTitle(String),
    SetAccent(AccentColor),
    ToggleBadge(Badge),
    SetBadges(SelectionSet),
}

impl Message {
    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::SetBackground(_) => "set-background",
            Message::ClearBackground => "clear-background",
            Message::SetTitle(_) => "set-title",
            Message::SetAccent(_) => "set-accent",
            Message::ToggleBadge(_) => "toggle-badge",
            Message::SetBadges(_) => "set-badges",
        }
    }
}

/// Applies one message to a snapshot.
pub fn reduce(state: &CompositionState, message: Message) -> CompositionState {
    let mut next = state.clone();
    match message {
        Message::SetBackground(image) => next.background = Some(image),
        Message::ClearBackground => next.background = None,
        Message::SetTitle(title) => next.title = title,
        Message::SetAccent(accent) => next.accent = accent,
        Message::ToggleBadge(badge) => next.badges = state.badges.toggle(&badge),
        Message::SetBadges(badges) => next.badges = badges,
    }
    next
}
