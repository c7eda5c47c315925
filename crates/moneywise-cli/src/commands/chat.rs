//! Interactive guided entry
//!
//! A terminal transport for the dialog: prompts are printed with numbered
//! actions, a number picks an action, anything else is sent as typed text.

use std::io::{BufRead, Write};

use anyhow::Result;
use moneywise_core::ledger::{CategoryLookup, Recorder};
use moneywise_core::session::SessionStore;
use moneywise_core::{
    Action, Database, DialogController, DialogEvent, MemorySessionStore, Prompt, Settings, Step,
    UserId,
};

const HELP: &str = "Describe an expense, e.g. \"taxi 2500 yesterday\".\n\
    Commands: /new (step by step), /skip, /cancel, /help, /quit";

/// What a line of input means in the chat
#[derive(Debug, PartialEq, Eq)]
pub enum ChatInput {
    Event(DialogEvent),
    Help,
    Quit,
    Empty,
}

/// Interpret one line against the step and actions of the last prompt
pub fn parse_chat_input(line: &str, step: Step, offered: &[Action]) -> ChatInput {
    let line = line.trim();
    match line {
        "" => return ChatInput::Empty,
        "/quit" | "/exit" => return ChatInput::Quit,
        "/help" => return ChatInput::Help,
        "/cancel" => return ChatInput::Event(DialogEvent::Cancel),
        "/skip" => return ChatInput::Event(DialogEvent::SkipDescription),
        "/new" | "/restart" => return ChatInput::Event(DialogEvent::Restart),
        _ => {}
    }

    // Numbers pick an offered action, except where a number is the answer
    if step == Step::EnteringAmount {
        return ChatInput::Event(DialogEvent::AmountEntered {
            text: line.to_string(),
        });
    }
    if let Ok(choice) = line.parse::<usize>() {
        if let Some(action) = choice.checked_sub(1).and_then(|i| offered.get(i)) {
            return ChatInput::Event(action.event());
        }
    }

    ChatInput::Event(DialogEvent::FreeText {
        text: line.to_string(),
    })
}

/// Render a prompt with its numbered actions
pub fn render_prompt(prompt: &Prompt) -> String {
    let mut out = prompt.text.clone();
    for (i, action) in prompt.actions.iter().enumerate() {
        out.push_str(&format!("\n  [{}] {}", i + 1, action.label()));
    }
    out
}

/// Drive the dialog from `input` until end of input or `/quit`
pub async fn run_chat<C, R, S, I, O>(
    controller: &DialogController<C, R, S>,
    user: UserId,
    input: I,
    mut output: O,
) -> Result<()>
where
    C: CategoryLookup,
    R: Recorder,
    S: SessionStore,
    I: BufRead,
    O: Write,
{
    writeln!(output, "💬 {}", HELP)?;
    let mut step = Step::Idle;
    let mut offered: Vec<Action> = Vec::new();

    for line in input.lines() {
        let line = line?;
        let event = match parse_chat_input(&line, step, &offered) {
            ChatInput::Event(event) => event,
            ChatInput::Help => {
                writeln!(output, "{}", HELP)?;
                continue;
            }
            ChatInput::Quit => break,
            ChatInput::Empty => continue,
        };

        let prompt = controller.handle(user, event).await?;
        writeln!(output, "{}", render_prompt(&prompt))?;
        step = prompt.step;
        offered = prompt.actions;
    }

    Ok(())
}

pub async fn cmd_chat(db: &Database, settings: &Settings, user: UserId) -> Result<()> {
    let controller = DialogController::new(db.clone(), db.clone(), MemorySessionStore::new())?
        .with_currency(settings.currency.clone());

    let stdin = std::io::stdin();
    run_chat(&controller, user, stdin.lock(), std::io::stdout()).await
}
