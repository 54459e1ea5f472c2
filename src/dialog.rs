//! Dialog runtime
//!
//! Holds a set of windows keyed by state and drives them for any number of
//! sessions. Work for one session is serialized behind a per-session lock:
//! a render pass, or an event plus the render it triggers, finishes before
//! the next one for that session starts. Different sessions run in
//! parallel and share nothing but the media id cache.
//!
//! A session's lock lives in the map only while some pass holds or waits
//! on it. The last pass out removes it, so idle sessions cost nothing.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use crate::context::{ContextStore, MemoryContextStore, SessionContext, SessionId};
use crate::error::{DialogError, Result};
use crate::event::{CallbackQuery, Event, InboundMessage, RenderContext, ShowMode};
use crate::media::{MediaIdCache, MemoryMediaIdCache};
use crate::transport::{Delivered, Transport};
use crate::window::{MessageOutcome, RenderDecision, Window};

pub struct Dialog {
    windows: HashMap<String, Window>,
    initial: Option<String>,
    store: Arc<dyn ContextStore>,
    media_cache: Arc<dyn MediaIdCache>,
    locks: DashMap<SessionId, Arc<Mutex<()>>>,
}

impl Dialog {
    pub fn new(store: Arc<dyn ContextStore>, media_cache: Arc<dyn MediaIdCache>) -> Self {
        Self {
            windows: HashMap::new(),
            initial: None,
            store,
            media_cache,
            locks: DashMap::new(),
        }
    }

    /// Dialog backed by in-process stores
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryContextStore::new()),
            Arc::new(MemoryMediaIdCache::new()),
        )
    }

    /// Add a window; the first one added is where sessions start
    pub fn window(mut self, window: Window) -> Self {
        if self.initial.is_none() {
            self.initial = Some(window.state().to_string());
        }
        self.windows.insert(window.state().to_string(), window);
        self
    }

    pub fn initial_state(&self) -> Option<&str> {
        self.initial.as_deref()
    }

    /// Render the session's current window without delivering it
    pub async fn render(&self, session_id: &SessionId, event: Event) -> Result<RenderDecision> {
        self.render_with(session_id, event, ShowMode::Auto).await
    }

    pub async fn render_with(
        &self,
        session_id: &SessionId,
        event: Event,
        show_mode: ShowMode,
    ) -> Result<RenderDecision> {
        let _guard = self.lock_session(session_id).await;

        let mut session = self.load(session_id).await?;
        let decision = self.render_locked(&mut session, event, show_mode).await?;
        self.save(&session).await?;
        Ok(decision)
    }

    /// Route a navigation payload to the current window
    ///
    /// Returns whether some widget consumed it; unconsumed payloads belong
    /// to other handlers.
    pub async fn handle_navigation_event(
        &self,
        session_id: &SessionId,
        payload: &str,
    ) -> Result<bool> {
        let query = CallbackQuery {
            id: String::new(),
            data: payload.to_string(),
            message_id: None,
        };
        self.handle_callback(session_id, &query).await
    }

    pub async fn handle_callback(
        &self,
        session_id: &SessionId,
        query: &CallbackQuery,
    ) -> Result<bool> {
        let _guard = self.lock_session(session_id).await;

        let mut session = self.load(session_id).await?;
        let consumed = self.window_for(&session)?.process_callback(query, &mut session);
        debug!(%session_id, payload = %query.data, consumed, "callback processed");
        if consumed {
            self.save(&session).await?;
        }
        Ok(consumed)
    }

    pub async fn process_message(
        &self,
        session_id: &SessionId,
        message: &InboundMessage,
    ) -> Result<MessageOutcome> {
        let _guard = self.lock_session(session_id).await;

        let mut session = self.load(session_id).await?;
        let outcome = self.window_for(&session)?.process_message(message, &mut session);
        self.save(&session).await?;
        Ok(outcome)
    }

    /// Make `state` the session's current window
    pub async fn switch_to(&self, session_id: &SessionId, state: &str) -> Result<()> {
        if !self.windows.contains_key(state) {
            return Err(DialogError::UnknownState {
                state: state.to_string(),
            });
        }
        let _guard = self.lock_session(session_id).await;

        let mut session = self.load(session_id).await?;
        info!(%session_id, from = ?session.state, to = state, "switching window");
        session.state = Some(state.to_string());
        self.save(&session).await
    }

    /// Forget everything about a session
    pub async fn close(&self, session_id: &SessionId) -> Result<()> {
        let _guard = self.lock_session(session_id).await;
        self.store
            .remove(session_id)
            .await
            .map_err(|source| DialogError::Store {
                session_id: session_id.clone(),
                source,
            })
    }

    /// Render the current window and deliver it
    pub async fn show(
        &self,
        session_id: &SessionId,
        event: Event,
        show_mode: ShowMode,
        transport: &dyn Transport,
    ) -> Result<Delivered> {
        let _guard = self.lock_session(session_id).await;

        let mut session = self.load(session_id).await?;
        self.show_locked(&mut session, event, show_mode, transport)
            .await
    }

    /// Handle one inbound event end to end
    ///
    /// Button presses nobody consumes return `Ok(None)` without rendering.
    /// Typed messages always re-render the window, since handlers may have
    /// changed what it shows.
    pub async fn dispatch(
        &self,
        session_id: &SessionId,
        event: Event,
        transport: &dyn Transport,
    ) -> Result<Option<Delivered>> {
        let _guard = self.lock_session(session_id).await;

        let mut session = self.load(session_id).await?;
        match &event {
            Event::Callback(query) => {
                let window = self.window_for(&session)?;
                if !window.process_callback(query, &mut session) {
                    debug!(%session_id, payload = %query.data, "callback not consumed");
                    return Ok(None);
                }
            }
            Event::Message(message) => {
                let outcome = self.window_for(&session)?.process_message(message, &mut session);
                if outcome.remove_input {
                    if let Err(e) = transport.delete_message(session_id, message.message_id).await {
                        warn!(
                            %session_id,
                            message_id = message.message_id,
                            "failed to remove input: {e}"
                        );
                    }
                }
            }
            Event::Start => {}
        }

        self.show_locked(&mut session, event, ShowMode::Auto, transport)
            .await
            .map(Some)
    }

    async fn show_locked(
        &self,
        session: &mut SessionContext,
        event: Event,
        show_mode: ShowMode,
        transport: &dyn Transport,
    ) -> Result<Delivered> {
        let decision = match self.render_locked(session, event, show_mode).await {
            Ok(decision) => decision,
            Err(e) => {
                // Keep what event handlers changed even if rendering failed
                self.save(session).await?;
                return Err(e);
            }
        };

        let delivered = match transport.deliver(&session.session_id, &decision).await {
            Ok(delivered) => delivered,
            Err(e) => {
                self.save(session).await?;
                return Err(e.into());
            }
        };
        info!(
            session_id = %session.session_id,
            mode = ?decision.mode,
            message_id = delivered.message_id,
            "delivered"
        );

        session.record_delivered(delivered.message_id);
        if let (Some(media), Some(media_id)) = (&decision.media, &delivered.media_id) {
            self.media_cache
                .put(media.path.as_deref(), media.media_type, media_id.clone())
                .await;
        }
        self.save(session).await?;
        Ok(delivered)
    }

    async fn render_locked(
        &self,
        session: &mut SessionContext,
        event: Event,
        show_mode: ShowMode,
    ) -> Result<RenderDecision> {
        let window = self.window_for(session)?;
        let ctx = RenderContext::new(session.session_id.clone(), event)
            .with_show_mode(show_mode)
            .with_state(window.state());
        let mut decision = window.render(&ctx, session).await?;

        if let Some(media) = decision.media.as_mut() {
            if media.file_id.is_none() {
                media.file_id = self
                    .media_cache
                    .get(media.path.as_deref(), media.media_type)
                    .await;
            }
        }
        Ok(decision)
    }

    fn window_for(&self, session: &SessionContext) -> Result<&Window> {
        let state = session
            .state
            .as_deref()
            .or(self.initial.as_deref())
            .unwrap_or_default();
        self.windows
            .get(state)
            .ok_or_else(|| DialogError::UnknownState {
                state: state.to_string(),
            })
    }

    async fn lock_session(&self, session_id: &SessionId) -> SessionGuard<'_> {
        let lock = self.locks.entry(session_id.clone()).or_default().clone();
        SessionGuard {
            locks: &self.locks,
            session_id: session_id.clone(),
            guard: Some(lock.lock_owned().await),
        }
    }

    async fn load(&self, session_id: &SessionId) -> Result<SessionContext> {
        self.store
            .load(session_id)
            .await
            .map_err(|source| DialogError::Store {
                session_id: session_id.clone(),
                source,
            })
    }

    async fn save(&self, session: &SessionContext) -> Result<()> {
        self.store
            .save(session)
            .await
            .map_err(|source| DialogError::Store {
                session_id: session.session_id.clone(),
                source,
            })
    }
}

/// Holds a session's lock for one pass
///
/// On drop the lock is released first, then the map entry is removed if
/// no other pass holds a handle to it. A pass that cloned the handle keeps
/// the entry alive, so every pass for a session sees the same mutex.
struct SessionGuard<'a> {
    locks: &'a DashMap<SessionId, Arc<Mutex<()>>>,
    session_id: SessionId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.locks
            .remove_if(&self.session_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::widgets::ScrollingText;
    use crate::window::StaticData;

    /// Store that takes its time and records how many calls overlap
    #[derive(Default)]
    struct SlowStore {
        inner: MemoryContextStore,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl SlowStore {
        async fn slow<T>(&self, op: impl std::future::Future<Output = T>) -> T {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            let out = op.await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            out
        }
    }

    #[async_trait]
    impl ContextStore for SlowStore {
        async fn load(&self, session_id: &SessionId) -> anyhow::Result<SessionContext> {
            self.slow(self.inner.load(session_id)).await
        }

        async fn save(&self, context: &SessionContext) -> anyhow::Result<()> {
            self.slow(self.inner.save(context)).await
        }

        async fn remove(&self, session_id: &SessionId) -> anyhow::Result<()> {
            self.slow(self.inner.remove(session_id)).await
        }
    }

    fn paged_window() -> Window {
        Window::new("main")
            .widget(ScrollingText::new("pager", "{body}", 9, Some(" ")).unwrap())
            .loader(StaticData(
                json!({ "body": "aaaa bbbb cccc" }).as_object().cloned().unwrap(),
            ))
    }

    #[tokio::test]
    async fn test_close_keeps_passes_serialized() {
        let store = Arc::new(SlowStore::default());
        let dialog = Arc::new(
            Dialog::new(store.clone(), Arc::new(MemoryMediaIdCache::new())).window(paged_window()),
        );
        let session = SessionId::from("s");

        let closing = {
            let (dialog, session) = (dialog.clone(), session.clone());
            tokio::spawn(async move { dialog.close(&session).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        // Queues on the lock close is holding
        let waiting = {
            let (dialog, session) = (dialog.clone(), session.clone());
            tokio::spawn(async move { dialog.handle_navigation_event(&session, "pager:1").await })
        };
        tokio::time::sleep(Duration::from_millis(60)).await;
        // Arrives after close finished while the first pass still runs
        let late = {
            let (dialog, session) = (dialog.clone(), session.clone());
            tokio::spawn(async move { dialog.handle_navigation_event(&session, "pager:2").await })
        };

        closing.await.unwrap().unwrap();
        assert!(waiting.await.unwrap().unwrap());
        assert!(late.await.unwrap().unwrap());

        assert_eq!(store.peak.load(Ordering::SeqCst), 1, "passes for one session overlapped");
        assert!(dialog.locks.is_empty());
    }

    #[tokio::test]
    async fn test_idle_session_locks_are_evicted() {
        let dialog = Arc::new(Dialog::in_memory().window(paged_window()));

        let mut handles = Vec::new();
        for n in 0..64i64 {
            let dialog = dialog.clone();
            handles.push(tokio::spawn(async move {
                let session = SessionId::from(n);
                dialog.handle_navigation_event(&session, "pager:1").await?;
                dialog.render(&session, Event::Start).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert!(dialog.locks.is_empty());
        let decision = dialog.render(&SessionId::from(7i64), Event::Start).await.unwrap();
        assert_eq!(decision.text, " cccc");
        assert!(dialog.locks.is_empty());
    }

    #[tokio::test]
    async fn test_lock_entry_lives_while_a_pass_waits() {
        let dialog = Dialog::in_memory().window(paged_window());
        let session = SessionId::from("s");

        let first = dialog.lock_session(&session).await;
        assert_eq!(dialog.locks.len(), 1);

        let second = dialog.lock_session(&session);
        tokio::pin!(second);
        assert!(is_pending(second.as_mut()).await);
        drop(first);
        assert_eq!(dialog.locks.len(), 1, "entry removed while another pass waits");

        let second = second.await;
        drop(second);
        assert!(dialog.locks.is_empty());
    }

    /// Polls once; true when the future is not ready yet
    async fn is_pending<F: std::future::Future + Unpin>(fut: F) -> bool {
        tokio::select! {
            biased;
            _ = fut => false,
            _ = tokio::task::yield_now() => true,
        }
    }
}
