//! End-to-end tests for the dialog runtime
//!
//! Drives `Dialog` through a recording transport: navigation, edit-vs-send
//! decisions, data load failures, media id reuse and concurrent sessions.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use serde_json::json;
use tokio_test::{assert_err, assert_ok};

use chatdialog::error::TransportError;
use chatdialog::media::MediaType;
use chatdialog::transport::{Delivered, Transport};
use chatdialog::widgets::{Button, Format, MessageInput, ScrollingText, StaticMedia};
use chatdialog::window::{FnLoader, StaticData};
use chatdialog::{
    Data, Dialog, DialogError, Event, MessageId, RenderContext, RenderDecision, RenderMode,
    SessionContext, SessionId, ShowMode, Window,
};

// ============================================================================
// Recording transport
// ============================================================================

struct RecordingTransport {
    next_id: AtomicI64,
    media_id: Option<String>,
    fail: bool,
    decisions: Mutex<Vec<RenderDecision>>,
    deleted: Mutex<Vec<MessageId>>,
}

impl RecordingTransport {
    fn starting_at(id: MessageId) -> Self {
        Self {
            next_id: AtomicI64::new(id),
            media_id: None,
            fail: false,
            decisions: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
        }
    }

    fn with_media_id(mut self, id: &str) -> Self {
        self.media_id = Some(id.to_string());
        self
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::starting_at(1)
        }
    }

    fn decisions(&self) -> Vec<RenderDecision> {
        self.decisions.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn deliver(
        &self,
        _session_id: &SessionId,
        decision: &RenderDecision,
    ) -> Result<Delivered, TransportError> {
        if self.fail {
            return Err(TransportError::SendFailed("chat not found".to_string()));
        }
        self.decisions.lock().unwrap().push(decision.clone());
        let media_id = match &decision.media {
            Some(media) if media.file_id.is_none() => self.media_id.clone(),
            _ => None,
        };
        Ok(Delivered {
            message_id: self.next_id.fetch_add(1, Ordering::SeqCst),
            media_id,
        })
    }

    async fn delete_message(
        &self,
        _session_id: &SessionId,
        message_id: MessageId,
    ) -> Result<(), TransportError> {
        self.deleted.lock().unwrap().push(message_id);
        Ok(())
    }
}

// ============================================================================
// Fixtures
// ============================================================================

fn data(value: serde_json::Value) -> Data {
    value.as_object().cloned().unwrap()
}

fn paged_dialog() -> Dialog {
    let window = Window::new("main")
        .widget(ScrollingText::new("pager", "{body}", 9, Some(" ")).unwrap())
        .loader(StaticData(data(json!({ "body": "aaaa bbbb cccc" }))));
    Dialog::in_memory().window(window)
}

fn payloads(decision: &RenderDecision) -> Vec<String> {
    decision
        .reply_markup
        .keyboard()
        .map(|kbd| {
            kbd.iter()
                .flatten()
                .map(|b| b.callback_data.clone())
                .collect()
        })
        .unwrap_or_default()
}

// ============================================================================
// Navigation
// ============================================================================

#[tokio::test]
async fn test_navigation_clamps_on_render() {
    let dialog = paged_dialog();
    let session = SessionId::from("s1");

    let first = assert_ok!(dialog.render(&session, Event::Start).await);
    assert_eq!(first.text, "aaaa bbbb");
    assert_eq!(payloads(&first), vec!["pager:0", "pager:0", "pager:1", "pager:1"]);

    assert!(assert_ok!(dialog.handle_navigation_event(&session, "pager:2").await));
    let second = assert_ok!(dialog.render(&session, Event::Start).await);
    assert_eq!(second.text, " cccc");
    assert_eq!(payloads(&second), vec!["pager:0", "pager:0", "pager:1", "pager:1"]);
}

#[tokio::test]
async fn test_foreign_payload_not_consumed() {
    let dialog = paged_dialog();
    let session = SessionId::from("s1");
    let transport = RecordingTransport::starting_at(1);

    assert!(!assert_ok!(dialog.handle_navigation_event(&session, "other:1").await));
    assert!(!assert_ok!(dialog.handle_navigation_event(&session, "pager:nope").await));

    let delivered = assert_ok!(
        dialog
            .dispatch(&session, Event::callback("other:1"), &transport)
            .await
    );
    assert!(delivered.is_none());
    assert!(transport.decisions().is_empty());
}

#[tokio::test]
async fn test_callback_dispatch_edits_in_place() {
    let dialog = paged_dialog();
    let session = SessionId::from("s1");
    let transport = RecordingTransport::starting_at(10);

    assert_ok!(dialog.show(&session, Event::Start, ShowMode::Send, &transport).await);
    let delivered = assert_ok!(
        dialog
            .dispatch(&session, Event::callback("pager:1"), &transport)
            .await
    );
    assert!(delivered.is_some());

    let decisions = transport.decisions();
    assert_eq!(decisions[0].mode, RenderMode::SendNew);
    assert_eq!(decisions[1].mode, RenderMode::Edit);
    assert_eq!(decisions[1].text, " cccc");
}

// ============================================================================
// Edit vs send
// ============================================================================

#[tokio::test]
async fn test_message_order_decides_mode() {
    let dialog = paged_dialog();
    let session = SessionId::from("s1");
    let transport = RecordingTransport::starting_at(50);
    assert_ok!(dialog.show(&session, Event::Start, ShowMode::Send, &transport).await);

    let older = assert_ok!(dialog.render(&session, Event::message(48, "hi")).await);
    assert_eq!(older.mode, RenderMode::SendNew);

    let newer = assert_ok!(dialog.render(&session, Event::message(52, "hi")).await);
    assert_eq!(newer.mode, RenderMode::Edit);

    let forced = assert_ok!(
        dialog
            .render_with(&session, Event::message(52, "hi"), ShowMode::Send)
            .await
    );
    assert_eq!(forced.mode, RenderMode::SendNew);
}

#[tokio::test]
async fn test_input_removing_deletes_and_edits() {
    let window = Window::new("main")
        .widget(Format::new("Type something"))
        .widget(MessageInput::new("input", |_, _| {}))
        .input_removing(true);
    let dialog = Dialog::in_memory().window(window);
    let session = SessionId::from("s1");
    let transport = RecordingTransport::starting_at(50);
    assert_ok!(dialog.show(&session, Event::Start, ShowMode::Send, &transport).await);

    assert_ok!(
        dialog
            .dispatch(&session, Event::message(48, "hello"), &transport)
            .await
    );
    assert_eq!(*transport.deleted.lock().unwrap(), vec![48]);
    assert_eq!(transport.decisions()[1].mode, RenderMode::Edit);
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_data_load_failure_delivers_nothing() {
    let window = Window::new("main")
        .widget(Format::new("{value}"))
        .loader(FnLoader(
            |_: &RenderContext, _: &SessionContext| -> AnyResult<Data> {
                Err(anyhow::anyhow!("backend unavailable"))
            },
        ));
    let dialog = Dialog::in_memory().window(window);
    let transport = RecordingTransport::starting_at(1);

    let err = assert_err!(
        dialog
            .show(&SessionId::from("s1"), Event::Start, ShowMode::Auto, &transport)
            .await
    );
    assert!(matches!(err, DialogError::DataLoadFailure { .. }));
    assert!(transport.decisions().is_empty());
}

#[tokio::test]
async fn test_delivery_failure_keeps_navigation() {
    let dialog = paged_dialog();
    let session = SessionId::from("s1");

    let err = assert_err!(
        dialog
            .dispatch(&session, Event::callback("pager:1"), &RecordingTransport::failing())
            .await
    );
    assert!(matches!(err, DialogError::Transport(TransportError::SendFailed(_))));

    let decision = assert_ok!(dialog.render(&session, Event::Start).await);
    assert_eq!(decision.text, " cccc");
}

// ============================================================================
// Windows and media
// ============================================================================

#[tokio::test]
async fn test_button_switches_window() {
    let main = Window::new("main").widget(Button::new("next", "Next").on_click(|_, session| {
        session.state = Some("second".to_string());
    }));
    let second = Window::new("second").widget(Format::new("second window"));
    let dialog = Dialog::in_memory().window(main).window(second);
    let session = SessionId::from("s1");
    let transport = RecordingTransport::starting_at(1);

    assert_eq!(dialog.initial_state(), Some("main"));
    assert_ok!(dialog.dispatch(&session, Event::callback("next"), &transport).await);
    assert_eq!(transport.decisions()[0].text, "second window");

    assert_ok!(dialog.switch_to(&session, "main").await);
    let err = assert_err!(dialog.switch_to(&session, "missing").await);
    assert!(matches!(err, DialogError::UnknownState { .. }));
}

#[tokio::test]
async fn test_media_id_reused() {
    let window = Window::new("main")
        .widget(Format::new("Logo"))
        .widget(StaticMedia::path(MediaType::Photo, "logo.png"));
    let dialog = Dialog::in_memory().window(window);
    let transport = RecordingTransport::starting_at(1).with_media_id("remote-1");

    assert_ok!(dialog.show(&SessionId::from("a"), Event::Start, ShowMode::Send, &transport).await);
    assert_ok!(dialog.show(&SessionId::from("b"), Event::Start, ShowMode::Send, &transport).await);

    let decisions = transport.decisions();
    assert_eq!(decisions[0].media.as_ref().unwrap().file_id, None);
    assert_eq!(
        decisions[1].media.as_ref().unwrap().file_id.as_deref(),
        Some("remote-1")
    );
}

#[tokio::test]
async fn test_close_forgets_session() {
    let dialog = paged_dialog();
    let session = SessionId::from("s1");
    assert_ok!(dialog.handle_navigation_event(&session, "pager:1").await);
    assert_ok!(dialog.close(&session).await);

    let decision = assert_ok!(dialog.render(&session, Event::Start).await);
    assert_eq!(decision.text, "aaaa bbbb");
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sessions_are_isolated() {
    let dialog = Arc::new(paged_dialog());

    let mut handles = Vec::new();
    for n in 0..16 {
        let dialog = dialog.clone();
        handles.push(tokio::spawn(async move {
            let session = SessionId::from(n as i64);
            let page = n % 2;
            dialog
                .handle_navigation_event(&session, &format!("pager:{page}"))
                .await?;
            let decision = dialog.render(&session, Event::Start).await?;
            Ok::<_, DialogError>((page, decision.text))
        }));
    }

    for handle in handles {
        let (page, text) = handle.await.unwrap().unwrap();
        let expected = if page == 0 { "aaaa bbbb" } else { " cccc" };
        assert_eq!(text, expected);
    }
}
