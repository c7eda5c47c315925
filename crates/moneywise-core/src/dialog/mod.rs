//! Guided expense entry
//!
//! The transport turns whatever the user did (typed a message, pressed a
//! button) into a [`DialogEvent`] and hands it to the [`DialogController`].
//! The controller answers with a [`Prompt`]: the text to show and the set of
//! [`Action`]s that are valid next. Nothing here knows how prompts are
//! rendered.
//!
//! # Resolution order
//!
//! Fields are resolved in a fixed order: category, date, amount,
//! description. After every change the controller moves to the first field
//! still missing, or records the expense once nothing is missing.

mod controller;


pub use controller::DialogController;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::Expense;
use crate::session::Step;

/// Everything a user can do in the dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DialogEvent {
    /// A typed message; interpreted according to the current step
    FreeText { text: String },
    /// A category button
    CategoryChosen { category_id: i64 },
    /// A date quick-pick button
    DateChosen { date: NaiveDate },
    AmountEntered { text: String },
    DescriptionEntered { text: String },
    SkipDescription,
    Cancel,
    /// Start a fresh guided entry (the "add another" button)
    Restart,
}

impl DialogEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FreeText { .. } => "free_text",
            Self::CategoryChosen { .. } => "category_chosen",
            Self::DateChosen { .. } => "date_chosen",
            Self::AmountEntered { .. } => "amount_entered",
            Self::DescriptionEntered { .. } => "description_entered",
            Self::SkipDescription => "skip_description",
            Self::Cancel => "cancel",
            Self::Restart => "restart",
        }
    }
}

/// A choice offered to the user alongside a prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    ChooseCategory { category_id: i64, label: String },
    PickDate { date: NaiveDate, label: String },
    SkipDescription,
    Cancel,
    AddAnother,
}

impl Action {
    /// Text for the button
    pub fn label(&self) -> &str {
        match self {
            Self::ChooseCategory { label, .. } | Self::PickDate { label, .. } => label,
            Self::SkipDescription => "Skip",
            Self::Cancel => "Cancel",
            Self::AddAnother => "Add another",
        }
    }

    /// The event the transport sends back when this action is taken
    pub fn event(&self) -> DialogEvent {
        match self {
            Self::ChooseCategory { category_id, .. } => DialogEvent::CategoryChosen {
                category_id: *category_id,
            },
            Self::PickDate { date, .. } => DialogEvent::DateChosen { date: *date },
            Self::SkipDescription => DialogEvent::SkipDescription,
            Self::Cancel => DialogEvent::Cancel,
            Self::AddAnother => DialogEvent::Restart,
        }
    }
}

/// What the transport should show after an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub text: String,
    /// Step the user's session is in after the event
    pub step: Step,
    pub actions: Vec<Action>,
    /// Set when the event completed an expense
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recorded: Option<Expense>,
}

impl Prompt {
    pub fn new(text: impl Into<String>, step: Step, actions: Vec<Action>) -> Self {
        Self {
            text: text.into(),
            step,
            actions,
            recorded: None,
        }
    }

    /// A message that leaves the user idle
    pub fn idle(text: impl Into<String>) -> Self {
        Self::new(text, Step::Idle, Vec::new())
    }
}
