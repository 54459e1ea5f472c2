//! chatdialog console demo
//!
//! Runs a two-window dialog against stdin/stdout. Each line typed is a chat
//! message; `/cb <payload>` presses the control carrying that payload.

use std::sync::atomic::{AtomicI64, Ordering};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use chatdialog::config::DialogConfig;
use chatdialog::error::TransportError;
use chatdialog::paths;
use chatdialog::transport::{Delivered, Transport};
use chatdialog::widgets::{Button, Format, MessageInput, Row, ScrollingText};
use chatdialog::window::{FnLoader, RenderMode, ReplyMarkup, StaticData};
use chatdialog::{
    Data, Dialog, Event, MessageId, RenderContext, RenderDecision, SessionContext, SessionId,
    Window,
};

/// Prints decisions instead of talking to a chat platform
struct ConsoleTransport {
    next_id: AtomicI64,
    current: AtomicI64,
}

impl ConsoleTransport {
    fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            current: AtomicI64::new(0),
        }
    }
}

#[async_trait]
impl Transport for ConsoleTransport {
    async fn deliver(
        &self,
        _session_id: &SessionId,
        decision: &RenderDecision,
    ) -> Result<Delivered, TransportError> {
        let message_id = match decision.mode {
            RenderMode::SendNew => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                self.current.store(id, Ordering::SeqCst);
                id
            }
            RenderMode::Edit => self.current.load(Ordering::SeqCst),
        };

        println!("--- [{:?} #{}] ---", decision.mode, message_id);
        println!("{}", decision.text);
        match &decision.reply_markup {
            ReplyMarkup::Inline(keyboard) => {
                for row in keyboard {
                    let labels: Vec<String> = row
                        .iter()
                        .map(|b| format!("[{} -> {}]", b.text, b.callback_data))
                        .collect();
                    println!("{}", labels.join(" "));
                }
            }
            ReplyMarkup::ForceReply(prompt) => {
                println!("(reply: {})", prompt.placeholder.as_deref().unwrap_or(""));
            }
        }

        Ok(Delivered {
            message_id,
            media_id: None,
        })
    }

    async fn delete_message(
        &self,
        _session_id: &SessionId,
        message_id: MessageId,
    ) -> Result<(), TransportError> {
        println!("(deleted #{message_id})");
        Ok(())
    }
}

fn build_dialog(config: &DialogConfig) -> Result<Dialog> {
    let body: String = (1..=40)
        .map(|n| format!("Line {n}: the quick brown fox jumps over the lazy dog"))
        .collect::<Vec<_>>()
        .join("\n");

    let main = Window::new("main")
        .widget(Format::new("Hello, {name}!"))
        .widget(ScrollingText::from_config("text", "{body}", config)?)
        .widget(Row::new().child(
            Button::new("about", "About").on_click(|_, session| {
                session.state = Some("about".to_string());
            }),
        ))
        .widget(MessageInput::new("input", |message, session| {
            if message.text.as_deref() == Some("about") {
                session.state = Some("about".to_string());
            }
        }))
        .input_removing(config.input_removing)
        .loader(FnLoader(
            move |ctx: &RenderContext, _: &SessionContext| -> Result<Data> {
                let data = json!({ "name": ctx.session_id.as_str(), "body": &body });
                Ok(data.as_object().cloned().unwrap_or_default())
            },
        ));

    let about = Window::new("about")
        .widget(Format::new("chatdialog {version}"))
        .widget(Button::new("back", "Back").on_click(|_, session| {
            session.state = Some("main".to_string());
        }))
        .loader(StaticData(
            json!({ "version": env!("CARGO_PKG_VERSION") })
                .as_object()
                .cloned()
                .unwrap_or_default(),
        ));

    Ok(Dialog::in_memory().window(main).window(about))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chatdialog=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    paths::log_paths();
    let config =
        DialogConfig::load(paths::config_path()).context("failed to load dialog config")?;

    let dialog = build_dialog(&config).context("failed to build dialog")?;
    let transport = ConsoleTransport::new();
    let session = SessionId::from("console");
    info!(initial = ?dialog.initial_state(), "dialog ready");

    dialog.dispatch(&session, Event::Start, &transport).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut message_id: MessageId = 1000;
    while let Some(line) = lines.next_line().await? {
        let event = match line.strip_prefix("/cb ") {
            Some(payload) => Event::callback(payload.trim()),
            None => {
                message_id += 1;
                Event::message(message_id, line)
            }
        };

        match dialog.dispatch(&session, event, &transport).await {
            Ok(Some(_)) => {}
            Ok(None) => println!("(nothing handled that)"),
            Err(e) => eprintln!("error: {e}"),
        }
    }

    Ok(())
}
