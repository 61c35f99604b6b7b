//! `medbot` - line-oriented client for the diagnostic service.
//!
//! Plain lines are sent as patient answers. Lines starting with `/` are
//! commands; `/help` lists them. Exits on EOF or `/quit`.

use std::sync::Arc;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use medbot_client::adapters::{FileCredentialStore, HttpDiagnosticApi, InMemoryCredentialStore};
use medbot_client::application::{ConversationController, ExchangeOutcome, SessionContext};
use medbot_client::config::{AppConfig, ConfigError, ValidationError};
use medbot_client::domain::conversation::Role;
use medbot_client::domain::foundation::{
    AuthenticatedSession, AuthenticatedUser, Credential, HistoryRecordId, UserId,
    ValidationError as FieldError,
};
use medbot_client::ports::{ApiError, CredentialStore, CredentialStoreError};

const HELP: &str = "\
Commands:
  /login <user_id> <token> [email]   store a session
  /logout                            forget the session
  /diagnose                          ask for a diagnosis now
  /summary                           generate a doctor summary
  /continue                          continue despite flow trouble
  /new                               start a new consultation
  /history                           list saved records
  /summaries                         list saved summaries
  /view <id>                         show a saved record
  /progress                          show consultation progress
  /quit                              exit";

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid session data: {0}")]
    Session(#[from] FieldError),

    #[error("Session store error: {0}")]
    Store(#[from] CredentialStoreError),

    #[error("Client setup failed: {0}")]
    Api(#[from] ApiError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let config = AppConfig::load()?;
    config.validate()?;
    config.logging.init_tracing();

    let store: Arc<dyn CredentialStore> = match &config.session.credential_file {
        Some(path) => Arc::new(FileCredentialStore::new(path)),
        None => Arc::new(InMemoryCredentialStore::new()),
    };
    let mut session = SessionContext::new(store);
    if !session.load().await? {
        if let Some(seed) = session_from_env()? {
            session.save(seed).await?;
        }
    }

    let api = Arc::new(HttpDiagnosticApi::new(config.api.http_config())?);
    info!(base_url = %config.api.base_url, "Diagnostic service configured");

    let mut controller = ConversationController::new(api, session, config.controller_settings());
    run(&mut controller).await
}

/// Session seeded from `MEDBOT_USER_ID` / `MEDBOT_TOKEN` / `MEDBOT_EMAIL`.
fn session_from_env() -> Result<Option<AuthenticatedSession>, FieldError> {
    let (Ok(user_id), Ok(token)) = (std::env::var("MEDBOT_USER_ID"), std::env::var("MEDBOT_TOKEN"))
    else {
        return Ok(None);
    };
    let email = std::env::var("MEDBOT_EMAIL").unwrap_or_default();
    login(&user_id, &token, &email).map(Some)
}

fn login(user_id: &str, token: &str, email: &str) -> Result<AuthenticatedSession, FieldError> {
    let user = AuthenticatedUser::new(UserId::new(user_id)?, email, None);
    Ok(AuthenticatedSession::new(user, Credential::new(token)?))
}

async fn run(controller: &mut ConversationController) -> Result<(), CliError> {
    let mut printed = 0;
    print_new(controller, &mut printed);
    if !controller.session().is_authenticated() {
        println!("Not logged in. Use /login <user_id> <token> [email].");
    }

    let mut reader = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = reader.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let outcome = match line.split_once(' ').unwrap_or((line, "")) {
            ("/quit", _) => break,
            ("/help", _) => {
                println!("{HELP}");
                continue;
            }
            ("/login", args) => {
                handle_login(controller, args).await;
                continue;
            }
            ("/logout", _) => {
                if let Err(e) = controller.session_mut().clear().await {
                    warn!(error = %e, "Failed to clear stored session");
                }
                println!("Logged out.");
                continue;
            }
            ("/progress", _) => {
                print_progress(controller);
                continue;
            }
            ("/history", _) => {
                list_history(controller, false).await;
                continue;
            }
            ("/summaries", _) => {
                list_history(controller, true).await;
                continue;
            }
            ("/diagnose", _) => controller.force_diagnosis().await,
            ("/summary", _) => controller.request_summary().await,
            ("/continue", _) => controller.continue_anyway(),
            ("/new", _) => {
                controller.start_new_consultation().await;
                printed = 0;
                ExchangeOutcome::Replied { scheduled: None }
            }
            ("/view", arg) => match arg.parse::<HistoryRecordId>() {
                Ok(id) => {
                    let outcome = controller.view_history_record(id).await;
                    // only a successful view replaces the transcript
                    if outcome == ExchangeOutcome::Completed {
                        printed = 0;
                    }
                    outcome
                }
                Err(e) => {
                    println!("{e}");
                    continue;
                }
            },
            (command, _) if command.starts_with('/') => {
                println!("Unknown command {command}. Try /help.");
                continue;
            }
            _ => controller.submit(line).await,
        };

        print_new(controller, &mut printed);
        let outcome = controller.run_follow_ups(outcome).await;
        print_new(controller, &mut printed);
        report(controller, &outcome);
    }
    Ok(())
}

async fn handle_login(controller: &mut ConversationController, args: &str) {
    let mut parts = args.split_whitespace();
    let (Some(user_id), Some(token)) = (parts.next(), parts.next()) else {
        println!("Usage: /login <user_id> <token> [email]");
        return;
    };
    let email = parts.next().unwrap_or_default();

    match login(user_id, token, email) {
        Ok(session) => match controller.session_mut().save(session).await {
            Ok(()) => println!("Logged in as {user_id}."),
            Err(e) => println!("Could not store session: {e}"),
        },
        Err(e) => println!("{e}"),
    }
}

async fn list_history(controller: &mut ConversationController, summaries_only: bool) {
    if let Err(e) = controller.load_history().await {
        println!("Could not load history: {e}");
        return;
    }
    let records = if summaries_only {
        controller.summary_history()
    } else {
        controller.history()
    };
    if records.is_empty() {
        println!("No saved records.");
    }
    for record in records {
        println!(
            "{}  {}  {}  {}",
            record.id,
            record.timestamp.date_label(),
            record.title,
            record.preview()
        );
    }
}

fn print_progress(controller: &ConversationController) {
    let progress = controller.progress();
    println!(
        "{} (step {}, {} exchanges)",
        progress.label, progress.step, progress.exchange_count
    );
    for status in &progress.milestones {
        let mark = if status.completed {
            "x"
        } else if status.current {
            ">"
        } else {
            " "
        };
        println!("  [{mark}] {}", status.milestone.label());
    }
}

/// Prints transcript messages added since the last call.
fn print_new(controller: &ConversationController, printed: &mut usize) {
    // placeholders only ever trail the transcript
    let messages = controller.transcript().messages();
    let settled = messages.iter().take_while(|m| !m.is_transient()).count();
    if *printed > settled {
        *printed = 0;
    }
    for message in &messages[*printed..settled] {
        let who = match message.role() {
            Role::User => "you",
            Role::Assistant => "medbot",
        };
        println!("[{who}] {}", message.content());
        let hints = controller.hints_for(message);
        if hints.offers_continue_anyway() {
            println!("  (type /continue if the conversation seems stuck)");
        }
    }
    *printed = settled;
}

fn report(controller: &ConversationController, outcome: &ExchangeOutcome) {
    match outcome {
        ExchangeOutcome::Ignored(reason) => println!("(ignored: {reason:?})"),
        ExchangeOutcome::Reauthenticate => println!("Use /login to sign in again."),
        ExchangeOutcome::Completed if controller.state().awaiting_summary_action() => {
            println!("Consultation complete. /summary for a doctor summary, /new to start over.")
        }
        ExchangeOutcome::Failed if controller.state().awaiting_summary_action() => {
            println!("You can still try /summary or /diagnose.")
        }
        _ => {}
    }
}
