//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::io::Cursor;

use moneywise_core::{
    Action, Database, DialogController, DialogEvent, MemorySessionStore, NewCategory, Prompt,
    Settings, Step,
};
use rust_decimal_macros::dec;

use crate::commands::{self, parse_chat_input, render_prompt, run_chat, ChatInput};

fn setup_test_db() -> Database {
    let db = Database::in_memory().unwrap();
    db.create_category(
        1,
        &NewCategory {
            name: "Taxi".to_string(),
            monthly_limit: dec!(20000),
        },
    )
    .unwrap();
    db
}

fn settings() -> Settings {
    Settings {
        currency: Some("KZT".to_string()),
        ..Default::default()
    }
}

// ========== Categories Command Tests ==========

#[test]
fn test_cmd_categories_list() {
    let db = setup_test_db();
    assert!(commands::cmd_categories_list(&db, 1).is_ok());
    assert!(commands::cmd_categories_list(&db, 2).is_ok());
}

#[test]
fn test_cmd_categories_add() {
    let db = setup_test_db();
    commands::cmd_categories_add(&db, 1, "Food", "50000,5").unwrap();

    let food = db.find_category_by_name(1, "food").unwrap().unwrap();
    assert_eq!(food.monthly_limit, dec!(50000.5));

    // Duplicate names and bad limits are rejected
    assert!(commands::cmd_categories_add(&db, 1, "FOOD", "1").is_err());
    assert!(commands::cmd_categories_add(&db, 1, "Books", "lots").is_err());
    assert!(commands::cmd_categories_add(&db, 1, "Books", "-5").is_err());
}

#[test]
fn test_cmd_categories_limit_and_remove() {
    let db = setup_test_db();

    commands::cmd_categories_limit(&db, 1, "taxi", "15000").unwrap();
    let taxi = db.find_category_by_name(1, "Taxi").unwrap().unwrap();
    assert_eq!(taxi.monthly_limit, dec!(15000));

    assert!(commands::cmd_categories_limit(&db, 1, "books", "10").is_err());

    commands::cmd_categories_remove(&db, 1, "Taxi").unwrap();
    assert!(db.list_categories(1).unwrap().is_empty());
    assert!(commands::cmd_categories_remove(&db, 1, "Taxi").is_err());
}

#[test]
fn test_parse_money() {
    assert_eq!(commands::parse_money("0").unwrap(), dec!(0));
    assert_eq!(commands::parse_money(" 12,50 ").unwrap(), dec!(12.50));
    assert!(commands::parse_money("-1").is_err());
    assert!(commands::parse_money("ten").is_err());
}

// ========== Expense Command Tests ==========

#[tokio::test]
async fn test_cmd_add() {
    let db = setup_test_db();
    commands::cmd_add(&db, &settings(), 1, "2500 taxi airport")
        .await
        .unwrap();

    let recent = db.list_recent_expenses(1, 10).unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].amount, dec!(2500));
    assert_eq!(recent[0].description.as_deref(), Some("airport"));

    assert!(commands::cmd_add(&db, &settings(), 1, "2500 books")
        .await
        .is_err());
}

#[test]
fn test_cmd_reports() {
    let db = setup_test_db();
    for json in [false, true] {
        assert!(commands::cmd_recent(&db, &settings(), 1, 10, json).is_ok());
        assert!(commands::cmd_today(&db, &settings(), 1, json).is_ok());
        assert!(commands::cmd_month(&db, &settings(), 1, json).is_ok());
    }
}

// ========== Chat Tests ==========

#[test]
fn test_parse_chat_input() {
    let offered = vec![
        Action::ChooseCategory {
            category_id: 4,
            label: "Taxi".to_string(),
        },
        Action::Cancel,
    ];

    assert_eq!(
        parse_chat_input("1", Step::ChoosingCategory, &offered),
        ChatInput::Event(DialogEvent::CategoryChosen { category_id: 4 })
    );
    assert_eq!(
        parse_chat_input(" 2 ", Step::ChoosingCategory, &offered),
        ChatInput::Event(DialogEvent::Cancel)
    );
    // Out of range numbers are typed text
    assert_eq!(
        parse_chat_input("2500", Step::ChoosingCategory, &offered),
        ChatInput::Event(DialogEvent::FreeText {
            text: "2500".to_string()
        })
    );
    // At the amount step a number is the amount, not a menu choice
    assert_eq!(
        parse_chat_input("1", Step::EnteringAmount, &[Action::Cancel]),
        ChatInput::Event(DialogEvent::AmountEntered {
            text: "1".to_string()
        })
    );
    assert_eq!(parse_chat_input("  ", Step::Idle, &[]), ChatInput::Empty);
    assert_eq!(parse_chat_input("/quit", Step::Idle, &[]), ChatInput::Quit);
    assert_eq!(
        parse_chat_input("/skip", Step::EnteringDescription, &[]),
        ChatInput::Event(DialogEvent::SkipDescription)
    );
    assert_eq!(
        parse_chat_input("/new", Step::Idle, &[]),
        ChatInput::Event(DialogEvent::Restart)
    );
}

#[test]
fn test_render_prompt() {
    let prompt = Prompt::new(
        "Add a comment to the expense or press Skip.",
        Step::EnteringDescription,
        vec![Action::SkipDescription, Action::Cancel],
    );
    assert_eq!(
        render_prompt(&prompt),
        "Add a comment to the expense or press Skip.\n  [1] Skip\n  [2] Cancel"
    );
}

#[tokio::test]
async fn test_chat_free_text_then_quick_pick() {
    let db = setup_test_db();
    let controller = DialogController::new(db.clone(), db.clone(), MemorySessionStore::new())
        .unwrap()
        .with_currency(Some("KZT".to_string()));

    let input = Cursor::new("taxi 2500\n1\n/quit\nfood 100\n");
    let mut output = Vec::new();
    run_chat(&controller, 1, input, &mut output).await.unwrap();

    let output = String::from_utf8(output).unwrap();
    assert!(output.contains("[1] Today"));
    assert!(output.contains("Amount: 2500 KZT"));

    // Nothing after /quit is processed
    assert_eq!(db.list_recent_expenses(1, 10).unwrap().len(), 1);
}

#[tokio::test]
async fn test_chat_step_by_step() {
    let db = setup_test_db();
    let controller =
        DialogController::new(db.clone(), db.clone(), MemorySessionStore::new()).unwrap();

    let input = Cursor::new("/new\n1\n2\n12,5\n/skip\n");
    let mut output = Vec::new();
    run_chat(&controller, 1, input, &mut output).await.unwrap();

    let recent = db.list_recent_expenses(1, 10).unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].amount, dec!(12.5));
    assert_eq!(recent[0].category_name, "Taxi");
    assert_eq!(recent[0].description, None);
    assert!(controller.sessions().is_empty());
}
