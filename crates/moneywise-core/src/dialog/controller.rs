//! Dialog state machine

use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use tracing::{debug, error, info, warn};

use super::{Action, DialogEvent, Prompt};
use crate::error::{Error, Result};
use crate::extract::{parse_amount, EntityExtractor};
use crate::ledger::{CategoryLookup, Recorder};
use crate::models::{format_amount, format_date, Category, Draft, Expense, UserId};
use crate::reports::render_confirmation;
use crate::session::{Session, SessionStore, Step, UserLocks};

const NO_CATEGORIES: &str =
    "Create at least one category first, then add expenses to it.";
const NOT_UNDERSTOOD: &str = "Sorry, I didn't understand that. Send something like \
     \"taxi 2500\" or \"food 1200 yesterday lunch\", or add the expense step by step.";
const STALE_ACTION: &str = "That option is no longer available.";
const CANCELLED: &str = "Expense entry cancelled.";
const RESTART_REQUIRED: &str = "Could not finish adding the expense. Please start again.";
const CATEGORY_GONE: &str =
    "The category no longer exists, so the expense was not saved. Please start again.";

/// Quick-pick dates offered at the date step: label and days back from today
const DATE_QUICK_PICKS: &[(&str, i64)] = &[
    ("Today", 0),
    ("Yesterday", 1),
    ("Day before yesterday", 2),
];

/// The first field still missing, in resolution order
fn next_step(session: &Session) -> Option<Step> {
    let collected = &session.collected;
    if collected.category.is_none() {
        Some(Step::ChoosingCategory)
    } else if collected.spent_at.is_none() {
        Some(Step::ChoosingDate)
    } else if collected.amount.is_none() {
        Some(Step::EnteringAmount)
    } else if !session.description_resolved {
        Some(Step::EnteringDescription)
    } else {
        None
    }
}

/// Finite-state machine driving guided expense entry
///
/// Events for one user are handled one at a time; different users proceed
/// in parallel. Sessions are saved to the store before any call that may
/// suspend on a collaborator.
pub struct DialogController<C, R, S> {
    categories: C,
    recorder: R,
    sessions: S,
    extractor: EntityExtractor,
    locks: UserLocks,
    currency: Option<String>,
}

impl<C, R, S> DialogController<C, R, S>
where
    C: CategoryLookup,
    R: Recorder,
    S: SessionStore,
{
    pub fn new(categories: C, recorder: R, sessions: S) -> Result<Self> {
        Ok(Self {
            categories,
            recorder,
            sessions,
            extractor: EntityExtractor::new()?,
            locks: UserLocks::new(),
            currency: None,
        })
    }

    /// Currency label appended to amounts in confirmations (e.g. "KZT")
    pub fn with_currency(mut self, currency: Option<String>) -> Self {
        self.currency = currency.filter(|c| !c.trim().is_empty());
        self
    }

    pub fn sessions(&self) -> &S {
        &self.sessions
    }

    /// Handle an event using the local clock
    pub async fn handle(&self, user_id: UserId, event: DialogEvent) -> Result<Prompt> {
        self.handle_at(user_id, event, Local::now().naive_local())
            .await
    }

    /// Handle an event as of `now`
    pub async fn handle_at(
        &self,
        user_id: UserId,
        event: DialogEvent,
        now: NaiveDateTime,
    ) -> Result<Prompt> {
        let _guard = self.locks.acquire(user_id).await;
        let session = self.sessions.load(user_id).await?;
        debug!(user_id, step = %session.step, event = event.kind(), "Dialog event");

        match event {
            DialogEvent::FreeText { text } => self.on_text(user_id, session, &text, now).await,
            DialogEvent::CategoryChosen { category_id } => {
                self.on_category_chosen(user_id, session, category_id, now)
                    .await
            }
            DialogEvent::DateChosen { date } => {
                if !session.is_active() {
                    return self.stale(user_id, &session, now).await;
                }
                self.on_date(user_id, session, date, now).await
            }
            DialogEvent::AmountEntered { text } => {
                if !session.is_active() {
                    return self.stale(user_id, &session, now).await;
                }
                self.on_amount(user_id, session, &text, now).await
            }
            DialogEvent::DescriptionEntered { text } => {
                if session.step != Step::EnteringDescription {
                    return self.stale(user_id, &session, now).await;
                }
                let text = text.trim();
                let description = (!text.is_empty()).then(|| text.to_string());
                self.on_description(user_id, session, description).await
            }
            DialogEvent::SkipDescription => {
                if session.step != Step::EnteringDescription {
                    return self.stale(user_id, &session, now).await;
                }
                self.on_description(user_id, session, None).await
            }
            DialogEvent::Cancel => {
                self.sessions.clear(user_id).await?;
                debug!(user_id, "Dialog cancelled");
                Ok(Prompt::idle(CANCELLED))
            }
            DialogEvent::Restart => self.restart(user_id, now).await,
        }
    }

    /// Typed text means different things depending on the step
    async fn on_text(
        &self,
        user_id: UserId,
        session: Session,
        text: &str,
        now: NaiveDateTime,
    ) -> Result<Prompt> {
        match session.step {
            Step::Idle => self.on_free_text(user_id, text, now).await,
            Step::ChoosingCategory => self.on_category_name(user_id, session, text, now).await,
            Step::ChoosingDate => match self.extractor.parse_date_input(text) {
                Ok(date) => self.on_date(user_id, session, date, now).await,
                Err(Error::Validation(message)) => {
                    self.reprompt(user_id, &session, now, &message).await
                }
                Err(e) => Err(e),
            },
            Step::EnteringAmount => self.on_amount(user_id, session, text, now).await,
            Step::EnteringDescription => {
                let text = text.trim();
                let description = (!text.is_empty()).then(|| text.to_string());
                self.on_description(user_id, session, description).await
            }
        }
    }

    /// A whole expense in one sentence
    async fn on_free_text(&self, user_id: UserId, text: &str, now: NaiveDateTime) -> Result<Prompt> {
        let categories = self.categories.list(user_id).await?;
        if categories.is_empty() {
            return Ok(Prompt::idle(NO_CATEGORIES));
        }

        let draft = self.extractor.extract(text, &categories, now);
        if draft.is_empty() {
            debug!(user_id, "Nothing recognized in free text");
            return Ok(Prompt::new(NOT_UNDERSTOOD, Step::Idle, vec![Action::AddAnother]));
        }

        let Draft {
            category,
            amount,
            spent_at,
            description,
        } = draft;
        let session = Session {
            step: Step::Idle,
            collected: Draft {
                category,
                amount,
                spent_at,
                description: None,
            },
            pending_description: description,
            description_resolved: true,
        };
        self.advance(user_id, session, now).await
    }

    async fn on_category_name(
        &self,
        user_id: UserId,
        session: Session,
        text: &str,
        now: NaiveDateTime,
    ) -> Result<Prompt> {
        let name = text.trim();
        if name.is_empty() {
            return self
                .reprompt(user_id, &session, now, "Category name cannot be empty.")
                .await;
        }

        match self.categories.find_by_name(user_id, name).await? {
            Some(category) => self.set_category(user_id, session, category, now).await,
            None => {
                let message = format!(
                    "Category \"{}\" not found. Choose one with the buttons below or press Cancel.",
                    name
                );
                self.reprompt(user_id, &session, now, &message).await
            }
        }
    }

    async fn on_category_chosen(
        &self,
        user_id: UserId,
        session: Session,
        category_id: i64,
        now: NaiveDateTime,
    ) -> Result<Prompt> {
        if !session.is_active() {
            return self.stale(user_id, &session, now).await;
        }

        match self.categories.get_by_id(user_id, category_id).await? {
            Some(category) => self.set_category(user_id, session, category, now).await,
            None => {
                warn!(user_id, category_id, "Chosen category not found");
                self.reprompt(user_id, &session, now, "Category not found.")
                    .await
            }
        }
    }

    async fn set_category(
        &self,
        user_id: UserId,
        mut session: Session,
        category: Category,
        now: NaiveDateTime,
    ) -> Result<Prompt> {
        debug!(user_id, category = %category.name, "Category set");
        session.collected.category = Some(category);
        self.advance(user_id, session, now).await
    }

    async fn on_date(
        &self,
        user_id: UserId,
        mut session: Session,
        date: NaiveDate,
        now: NaiveDateTime,
    ) -> Result<Prompt> {
        if date > now.date() {
            warn!(user_id, %date, "Rejected future date");
            return self
                .reprompt(
                    user_id,
                    &session,
                    now,
                    "You cannot pick a date in the future. Choose another date.",
                )
                .await;
        }

        session.collected.spent_at = Some(date.and_time(now.time()));
        self.advance(user_id, session, now).await
    }

    async fn on_amount(
        &self,
        user_id: UserId,
        mut session: Session,
        text: &str,
        now: NaiveDateTime,
    ) -> Result<Prompt> {
        match parse_amount(text) {
            Ok(amount) => {
                session.collected.amount = Some(amount);
                self.advance(user_id, session, now).await
            }
            Err(Error::Validation(message)) => {
                debug!(user_id, "Rejected amount '{}': {}", text, message);
                self.reprompt(user_id, &session, now, &message).await
            }
            Err(e) => Err(e),
        }
    }

    /// The description is the terminal field: always finalize
    async fn on_description(
        &self,
        user_id: UserId,
        mut session: Session,
        description: Option<String>,
    ) -> Result<Prompt> {
        // Skipping keeps a description carried over from free text
        session.collected.description = description;
        session.description_resolved = true;
        self.finalize(user_id, session).await
    }

    async fn restart(&self, user_id: UserId, now: NaiveDateTime) -> Result<Prompt> {
        self.sessions.clear(user_id).await?;
        self.advance(user_id, Session::default(), now).await
    }

    /// Move to the first unresolved field, or finalize when none is left
    async fn advance(&self, user_id: UserId, mut session: Session, now: NaiveDateTime) -> Result<Prompt> {
        let Some(step) = next_step(&session) else {
            return self.finalize(user_id, session).await;
        };

        if step == Step::ChoosingCategory && self.categories.list(user_id).await?.is_empty() {
            self.sessions.clear(user_id).await?;
            return Ok(Prompt::idle(NO_CATEGORIES));
        }

        debug!(user_id, from = %session.step, to = %step, "Dialog transition");
        session.step = step;
        self.sessions.save(user_id, &session).await?;
        self.step_prompt(user_id, &session, now).await
    }

    /// Commit the collected expense and reset the session
    async fn finalize(&self, user_id: UserId, mut session: Session) -> Result<Prompt> {
        let collected = &session.collected;
        let (Some(category_id), Some(amount), Some(spent_at)) = (
            collected.category.as_ref().map(|c| c.id),
            collected.amount,
            collected.spent_at,
        ) else {
            let err = Error::Dialog(format!(
                "finalization at step {} without category, amount and date",
                session.step
            ));
            error!(user_id, "{}", err);
            self.sessions.clear(user_id).await?;
            return Ok(Prompt::new(RESTART_REQUIRED, Step::Idle, vec![Action::AddAnother]));
        };
        let description = collected
            .description
            .clone()
            .or_else(|| session.pending_description.clone());

        // Durable before suspending on the recorder. The session waits on the
        // terminal step so a failed record can be retried with Skip or a comment.
        session.step = Step::EnteringDescription;
        self.sessions.save(user_id, &session).await?;

        match self
            .recorder
            .record(user_id, amount, category_id, description.as_deref(), spent_at)
            .await
        {
            Ok(expense) => {
                self.sessions.clear(user_id).await?;
                info!(
                    user_id,
                    expense_id = expense.id,
                    category = %expense.category_name,
                    amount = %expense.amount,
                    "Expense recorded"
                );
                let text = self.render_confirmation(&expense);
                Ok(Prompt {
                    text,
                    step: Step::Idle,
                    actions: vec![Action::AddAnother],
                    recorded: Some(expense),
                })
            }
            Err(Error::NotFound(what)) => {
                warn!(user_id, "Category vanished before recording: {}", what);
                self.sessions.clear(user_id).await?;
                Ok(Prompt::new(CATEGORY_GONE, Step::Idle, vec![Action::AddAnother]))
            }
            Err(e) => {
                warn!(user_id, "Recording failed, session kept for retry: {}", e);
                Err(e)
            }
        }
    }

    /// Confirmation listing amount, category and comment
    pub fn render_confirmation(&self, expense: &Expense) -> String {
        render_confirmation(expense, self.currency.as_deref())
    }

    /// Standard question for the session's current step
    async fn step_prompt(&self, user_id: UserId, session: &Session, now: NaiveDateTime) -> Result<Prompt> {
        let text = match session.step {
            Step::Idle => return Ok(Prompt::idle("Send an expense, e.g. \"taxi 2500\".")),
            Step::ChoosingCategory => {
                let mut lines = vec!["Choose a category for the new expense:".to_string()];
                lines.extend(summary_lines(session));
                lines.join("\n")
            }
            Step::ChoosingDate => {
                let mut lines = summary_lines(session);
                lines.push(
                    "Pick the expense date with the buttons below or send it as DD.MM.YYYY \
                     (e.g. 05.09.2024)."
                        .to_string(),
                );
                lines.join("\n")
            }
            Step::EnteringAmount => {
                let mut lines = summary_lines(session);
                lines.push("Enter the expense amount:".to_string());
                lines.join("\n")
            }
            Step::EnteringDescription => {
                let mut lines = summary_lines(session);
                lines.push("Add a comment to the expense or press Skip.".to_string());
                lines.join("\n")
            }
        };
        let actions = self.step_actions(user_id, session.step, now).await?;
        Ok(Prompt::new(text, session.step, actions))
    }

    /// Actions valid at a step
    async fn step_actions(&self, user_id: UserId, step: Step, now: NaiveDateTime) -> Result<Vec<Action>> {
        let mut actions: Vec<Action> = match step {
            Step::Idle => return Ok(Vec::new()),
            Step::ChoosingCategory => self
                .categories
                .list(user_id)
                .await?
                .into_iter()
                .map(|c| Action::ChooseCategory {
                    category_id: c.id,
                    label: c.name,
                })
                .collect(),
            Step::ChoosingDate => date_quick_picks(now.date()),
            Step::EnteringAmount => Vec::new(),
            Step::EnteringDescription => vec![Action::SkipDescription],
        };
        actions.push(Action::Cancel);
        Ok(actions)
    }

    /// Repeat the current step with a message in front; the session is untouched
    async fn reprompt(
        &self,
        user_id: UserId,
        session: &Session,
        now: NaiveDateTime,
        message: &str,
    ) -> Result<Prompt> {
        let actions = self.step_actions(user_id, session.step, now).await?;
        Ok(Prompt::new(message, session.step, actions))
    }

    async fn stale(&self, user_id: UserId, session: &Session, now: NaiveDateTime) -> Result<Prompt> {
        debug!(user_id, step = %session.step, "Ignoring action not valid at this step");
        self.reprompt(user_id, session, now, STALE_ACTION).await
    }
}

/// Lines describing what has been collected so far
fn summary_lines(session: &Session) -> Vec<String> {
    let collected = &session.collected;
    let mut lines = Vec::new();
    if let Some(category) = &collected.category {
        lines.push(format!("Category \"{}\" selected.", category.name));
    }
    if let Some(spent_at) = collected.spent_at {
        lines.push(format!("Date: {}.", format_date(spent_at.date())));
    }
    if let Some(amount) = collected.amount {
        lines.push(format!("Amount: {}.", format_amount(amount)));
    }
    lines
}

/// Today, yesterday and the day before, labelled with their dates
pub(crate) fn date_quick_picks(today: NaiveDate) -> Vec<Action> {
    DATE_QUICK_PICKS
        .iter()
        .map(|(label, days_back)| {
            let date = today - Duration::days(*days_back);
            Action::PickDate {
                date,
                label: format!("{} ({})", label, format_date(date)),
            }
        })
        .collect()
}
