//! Sessão de chat interativa.
//!
//! Usa dialoguer para os prompts e um spinner do indicatif enquanto o
//! assistente trabalha. Quando uma consulta é escalada, o operador pode
//! responder como agente humano, alimentando o aprendizado.

use std::time::Duration;

use dialoguer::{theme::ColorfulTheme, Confirm, Input};
use indicatif::{ProgressBar, ProgressStyle};

use crate::assistant::SupportAssistant;
use crate::types::config::Config;
use crate::SupportResult;

const HELP: &str = "Commands: /stats, /tickets, /kb, /help, /quit";

/// O que o operador digitou no prompt.
#[derive(Debug, PartialEq, Eq)]
enum ChatInput<'a> {
    Empty,
    Quit,
    Stats,
    Tickets,
    Knowledge,
    Help,
    Unknown(&'a str),
    Message(&'a str),
}

impl<'a> ChatInput<'a> {
    fn parse(line: &'a str) -> Self {
        let line = line.trim();

        match line {
            "" => ChatInput::Empty,
            "/quit" | "/exit" => ChatInput::Quit,
            "/stats" => ChatInput::Stats,
            "/tickets" => ChatInput::Tickets,
            "/kb" => ChatInput::Knowledge,
            "/help" => ChatInput::Help,
            cmd if cmd.starts_with('/') => ChatInput::Unknown(cmd),
            message => ChatInput::Message(message),
        }
    }
}

/// Spinner mostrado enquanto o assistente responde.
pub fn thinking_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("thinking...");
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Executa o loop de chat até `/quit`.
pub async fn run_chat(config: &Config, session: Option<String>) -> SupportResult<()> {
    let theme = ColorfulTheme::default();
    let assistant = SupportAssistant::from_config(config)?;

    let session_id = match session {
        Some(id) => id,
        None => assistant.create_session().await,
    };

    println!("\nsupportloop chat (session {})", session_id);
    println!("{}\n", HELP);

    loop {
        let line: String = Input::with_theme(&theme)
            .with_prompt("you")
            .allow_empty(true)
            .interact_text()?;

        match ChatInput::parse(&line) {
            ChatInput::Empty => continue,
            ChatInput::Quit => break,
            ChatInput::Help => println!("{}", HELP),
            ChatInput::Unknown(cmd) => println!("Unknown command {}. {}", cmd, HELP),
            ChatInput::Stats => show_stats(&assistant),
            ChatInput::Tickets => show_tickets(&assistant).await,
            ChatInput::Knowledge => show_knowledge(&assistant).await,
            ChatInput::Message(message) => {
                handle_message(&theme, &assistant, &session_id, message).await?;
            }
        }
    }

    show_stats(&assistant);
    Ok(())
}

async fn handle_message(
    theme: &ColorfulTheme,
    assistant: &SupportAssistant,
    session_id: &str,
    message: &str,
) -> SupportResult<()> {
    let spinner = thinking_spinner();
    let reply = assistant.handle_query(session_id, message).await;
    spinner.finish_and_clear();

    println!("assistant: {}", reply.response);
    println!("           (confidence {:.2})\n", reply.confidence);

    if !reply.needs_human {
        return Ok(());
    }

    if let Some(draft) = assistant
        .conversation(session_id)
        .await
        .and_then(|c| c.last().map(|m| m.content.clone()))
    {
        println!("draft: {}\n", draft);
    }

    let take_over = Confirm::with_theme(theme)
        .with_prompt("Answer as the human agent?")
        .default(true)
        .interact()?;

    if !take_over {
        return Ok(());
    }

    let answer: String = Input::with_theme(theme)
        .with_prompt("agent")
        .interact_text()?;

    let outcome = assistant
        .handle_human_answer(session_id, message, answer.trim())
        .await?;

    if outcome.learned {
        println!("✓ Learned: the answer was added to the knowledge base.\n");
    } else {
        println!("○ Answer recorded (close to the draft, nothing learned).\n");
    }

    Ok(())
}

fn show_stats(assistant: &SupportAssistant) {
    let stats = assistant.analytics();

    println!("\nqueries: {}", stats.total_queries);
    println!(
        "ai resolved: {} ({:.0}%)",
        stats.ai_resolved,
        stats.ai_resolution_rate() * 100.0
    );
    println!("human resolved: {}", stats.human_resolved);
    println!("learning events: {}\n", stats.learning_events);
}

async fn show_tickets(assistant: &SupportAssistant) {
    let tickets = assistant.tickets().await;

    if tickets.is_empty() {
        println!("No open tickets.\n");
        return;
    }

    for ticket in tickets {
        let question = ticket
            .conversation
            .messages()
            .iter()
            .rev()
            .find(|m| m.role == crate::conversation::Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or("-");
        println!("  {} - {}", ticket.session_id, question);
    }
    println!();
}

async fn show_knowledge(assistant: &SupportAssistant) {
    for (i, record) in assistant.knowledge().await.iter().enumerate() {
        let origin = if record.source_answer.is_some() { "learned" } else { "seed" };
        println!("  {}. [{} {}] {}", i + 1, origin, record.created_at, record.question);
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chat_input() {
        assert_eq!(ChatInput::parse("   "), ChatInput::Empty);
        assert_eq!(ChatInput::parse("/quit"), ChatInput::Quit);
        assert_eq!(ChatInput::parse(" /exit "), ChatInput::Quit);
        assert_eq!(ChatInput::parse("/kb"), ChatInput::Knowledge);
        assert_eq!(ChatInput::parse("/nope"), ChatInput::Unknown("/nope"));
        assert_eq!(
            ChatInput::parse("  where is my order? "),
            ChatInput::Message("where is my order?")
        );
    }
}
