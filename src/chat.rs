//! Direct streaming chat with a rolling conversation memory.

use std::error::Error;
use std::io::Write;

use colored::Colorize;
use crag_config::{ChatConfig, CragConfig};
use crag_core::{CragError, Message, Role};
use crag_ollama::{GenerateRequest, OllamaClient};
use futures::StreamExt;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::providers;

/// Shown in place of a reply when generation fails.
const ERROR_LINE: &str = "An error occurred while generating a response.";

/// Conversation history and the settings used to render it into a prompt.
#[derive(Debug, Clone)]
pub struct ChatSession {
    system_prompt: String,
    memory_length: usize,
    history: Vec<Message>,
}

impl ChatSession {
    pub fn new(system_prompt: impl Into<String>, memory_length: usize) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            memory_length,
            history: Vec::new(),
        }
    }

    pub fn from_config(config: &ChatConfig) -> Self {
        Self::new(&config.system_prompt, config.memory_length)
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Render the prompt for `new_message`.
    ///
    /// The system prompt, then the last `memory_length` exchanges of the
    /// history recorded so far, then the new user turn and an open assistant
    /// turn.
    pub fn build_prompt(&self, new_message: &str) -> String {
        let mut prompt = format!("{}\n\n", self.system_prompt);
        let start = self.history.len().saturating_sub(self.memory_length * 2);
        for message in &self.history[start..] {
            let prefix = match message.role {
                Role::Human => "User: ",
                _ => "Assistant: ",
            };
            prompt.push_str(prefix);
            prompt.push_str(&message.content);
            prompt.push('\n');
        }
        prompt.push_str(&format!("User: {new_message}\nAssistant: "));
        prompt
    }

    pub fn record_user(&mut self, content: impl Into<String>) {
        self.history.push(Message::human(content));
    }

    pub fn record_assistant(&mut self, content: impl Into<String>) {
        self.history.push(Message::ai(content));
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }
}

/// Stream one reply to stdout, returning the full text.
async fn stream_reply(client: &OllamaClient, prompt: String, temperature: f64) -> Result<String, CragError> {
    let mut stream = client
        .generate_stream(GenerateRequest::new(prompt).with_temperature(temperature))
        .await?;
    let mut reply = String::new();
    let mut stdout = std::io::stdout();
    while let Some(piece) = stream.next().await {
        let piece = piece?;
        print!("{piece}");
        let _ = stdout.flush();
        reply.push_str(&piece);
    }
    println!();
    Ok(reply)
}

/// `crag chat`: read lines until `/exit` or EOF.
pub async fn run(config: &CragConfig) -> Result<(), Box<dyn Error>> {
    let client = providers::chat_client(config);
    let mut session = ChatSession::from_config(&config.chat);
    let mut editor = DefaultEditor::new()?;

    println!(
        "{} {} ({})",
        "Chatting with".bold(),
        config.chat.model.cyan(),
        "/reset clears history, /exit quits".dimmed()
    );

    loop {
        let line = match editor.readline("you> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(input);

        match input {
            "/exit" | "/quit" => break,
            "/reset" => {
                session.reset();
                println!("{}", "history cleared".dimmed());
                continue;
            }
            _ => {}
        }

        let prompt = session.build_prompt(input);
        session.record_user(input);
        print!("{} ", "bot>".blue().bold());
        match stream_reply(&client, prompt, config.chat.temperature).await {
            Ok(reply) => session.record_assistant(reply),
            Err(e) => {
                tracing::error!(error = %e, "chat generation failed");
                println!();
                println!("{}", ERROR_LINE.red());
            }
        }
    }
    Ok(())
}
