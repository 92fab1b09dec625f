//! Per-connection session state machine
//!
//! ```text
//! Connecting ──(registered, welcome sent)──> Open ──(stream end | send failure)──> Closed
//!                                             │ ▲
//!                                             └─┘ frame / keep-alive tick
//! ```
//!
//! Every outbound message goes through the registry, so a failed send both
//! drops the connection and closes the session.

use crate::assistant::{Assistant, ChatOutcome};
use crate::realtime::protocol::*;
use crate::realtime::registry::{ConnectionId, ConnectionRegistry};
use futures::{Stream, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Connecting,
    Open,
    Closed,
}

/// One client conversation
pub struct Session {
    id: ConnectionId,
    registry: Arc<ConnectionRegistry>,
    assistant: Arc<Assistant>,
    keepalive: Duration,
    state: SessionState,
    last_activity: Instant,
}

impl Session {
    pub fn new(
        id: ConnectionId,
        registry: Arc<ConnectionRegistry>,
        assistant: Arc<Assistant>,
        keepalive: Duration,
    ) -> Self {
        Self {
            id,
            registry,
            assistant,
            keepalive,
            state: SessionState::Connecting,
            last_activity: Instant::now(),
        }
    }

    /// Drive the session until the client goes away or a send fails.
    ///
    /// `sender` feeds the transport writer; `frames` yields inbound text
    /// frames and ends when the transport closes.
    pub async fn run<S>(mut self, sender: mpsc::UnboundedSender<String>, mut frames: S)
    where
        S: Stream<Item = String> + Unpin,
    {
        self.registry.add(self.id, sender).await;
        self.state = SessionState::Open;
        self.last_activity = Instant::now();
        tracing::info!(connection_id = %self.id, "Session opened");

        self.send(OutboundMessage::System(WELCOME_MESSAGE.to_string()))
            .await;

        while self.state == SessionState::Open {
            match tokio::time::timeout(self.keepalive, frames.next()).await {
                Err(_) => self.on_idle().await,
                Ok(Some(raw)) => self.on_frame(&raw).await,
                Ok(None) => {
                    tracing::debug!(connection_id = %self.id, "Client stream ended");
                    self.state = SessionState::Closed;
                }
            }
        }

        self.registry.remove(self.id).await;
        tracing::info!(connection_id = %self.id, "Session closed");
    }

    async fn on_idle(&mut self) {
        if self.last_activity.elapsed() >= self.keepalive {
            tracing::debug!(connection_id = %self.id, "Sending keep-alive ping");
            self.send(OutboundMessage::keepalive()).await;
        }
    }

    async fn on_frame(&mut self, raw: &str) {
        self.last_activity = Instant::now();

        let frame = match InboundFrame::parse(raw) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!(connection_id = %self.id, "Malformed frame: {}", e);
                self.send(OutboundMessage::Error(INVALID_FORMAT_MESSAGE.to_string()))
                    .await;
                return;
            }
        };

        let kind = frame.kind();
        if kind == FrameKind::Ping {
            self.send(OutboundMessage::pong(frame.t.as_ref())).await;
            return;
        }

        if let Some(text) = frame.chat_text() {
            let reply = match self.assistant.respond(text).await {
                ChatOutcome::Quota(signal) => OutboundMessage::Quota(signal),
                ChatOutcome::Reply(reply) if kind == FrameKind::User => {
                    OutboundMessage::Assistant(reply)
                }
                ChatOutcome::Reply(reply) => OutboundMessage::Legacy(reply),
            };
            self.send(reply).await;
            return;
        }

        if kind == FrameKind::DestClick {
            let text = dest_click_reply(&frame.dest_name());
            self.send(OutboundMessage::Assistant(text)).await;
        }
    }

    async fn send(&mut self, message: OutboundMessage) {
        if !self.registry.send_to(self.id, &message.to_text()).await {
            tracing::debug!(connection_id = %self.id, "Outbound send failed");
            self.state = SessionState::Closed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::replies::default_fallback_replies;
    use crate::assistant::{AiResponse, ProviderMode, QuotaSignal, ResponseProvider};
    use crate::config::AssistantConfig;
    use crate::error::Result;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
    use tokio::task::JoinHandle;
    use tokio_stream::wrappers::UnboundedReceiverStream;

    struct Harness {
        registry: Arc<ConnectionRegistry>,
        id: ConnectionId,
        frames: UnboundedSender<String>,
        outbound: UnboundedReceiver<String>,
        task: JoinHandle<()>,
    }

    impl Harness {
        fn start(assistant: Assistant) -> Self {
            let registry = Arc::new(ConnectionRegistry::new());
            let id = ConnectionId::new();
            let session = Session::new(
                id,
                registry.clone(),
                Arc::new(assistant),
                Duration::from_secs(60),
            );

            let (frames, frames_rx) = mpsc::unbounded_channel();
            let (out_tx, outbound) = mpsc::unbounded_channel();
            let task = tokio::spawn(session.run(out_tx, UnboundedReceiverStream::new(frames_rx)));

            Self {
                registry,
                id,
                frames,
                outbound,
                task,
            }
        }

        fn mock() -> Self {
            Self::start(Assistant::from_config(&AssistantConfig::default()).unwrap())
        }

        fn send(&self, raw: &str) {
            self.frames.send(raw.to_string()).unwrap();
        }

        async fn next(&mut self) -> Value {
            let raw = self.outbound.recv().await.unwrap();
            serde_json::from_str(&raw).unwrap()
        }

        async fn opened(mut self) -> Self {
            let welcome = self.next().await;
            assert_eq!(welcome["type"], "system");
            assert_eq!(welcome["message"], WELCOME_MESSAGE);
            self
        }
    }

    struct Exhausted;

    #[async_trait]
    impl ResponseProvider for Exhausted {
        fn mode(&self) -> ProviderMode {
            ProviderMode::Live
        }
        fn model(&self) -> &str {
            "test"
        }
        async fn get_reply(&self, _text: &str) -> Result<AiResponse> {
            Ok(AiResponse::Quota(QuotaSignal::exhausted()))
        }
        async fn quick_check(&self) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_welcome_and_registration() {
        let h = Harness::mock().opened().await;
        assert!(h.registry.contains(h.id).await);
    }

    #[tokio::test]
    async fn test_ping_gets_pong_echoing_t() {
        let mut h = Harness::mock().opened().await;

        h.send(r#"{"type":"ping","t":1234}"#);
        assert_eq!(h.next().await, json!({"type": "pong", "t": 1234}));

        h.send(r#"{"type":"ping"}"#);
        let pong = h.next().await;
        assert_eq!(pong["type"], "pong");
        assert!(pong["t"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_malformed_frame_keeps_session_open() {
        let mut h = Harness::mock().opened().await;

        h.send("{not json");
        assert_eq!(
            h.next().await,
            json!({"type": "error", "message": "Formato messaggio non valido"})
        );

        h.send("[1,2,3]");
        assert_eq!(h.next().await["type"], "error");

        h.send(r#"{"type":"ping","t":1}"#);
        assert_eq!(h.next().await["type"], "pong");
        assert!(h.registry.contains(h.id).await);
        assert!(h.outbound.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_user_frame_gets_assistant_reply() {
        let mut h = Harness::mock().opened().await;

        h.send(r#"{"type":"user","text":"Quanto costa Santorini?"}"#);
        let reply = h.next().await;
        assert_eq!(reply["type"], "assistant");
        assert!(reply["text"].as_str().unwrap().contains("1800"));
    }

    #[tokio::test]
    async fn test_untyped_frame_gets_legacy_reply() {
        let mut h = Harness::mock().opened().await;

        h.send(r#"{"text":"TOKYO"}"#);
        let first = h.next().await;
        assert!(first.get("type").is_none());
        let message = first["message"].as_str().unwrap().to_string();
        assert!(message.contains("Tokyo"));

        h.send(r#"{"text":"tokyo"}"#);
        assert_eq!(h.next().await["message"], message);
    }

    #[tokio::test]
    async fn test_dest_click() {
        let mut h = Harness::mock().opened().await;

        h.send(r#"{"type":"dest-click","dest":"Maldive"}"#);
        assert_eq!(
            h.next().await,
            json!({"type": "assistant", "text": dest_click_reply("Maldive")})
        );

        h.send(r#"{"type":"dest-click"}"#);
        assert_eq!(h.next().await["text"], dest_click_reply("destinazione"));
    }

    #[tokio::test]
    async fn test_frames_without_text_are_ignored() {
        let mut h = Harness::mock().opened().await;

        h.send(r#"{"type":"user","text":"   "}"#);
        h.send(r#"{"foo":"bar"}"#);
        h.send(r#"{"type":"ping","t":"after"}"#);
        assert_eq!(h.next().await, json!({"type": "pong", "t": "after"}));
    }

    #[tokio::test]
    async fn test_quota_signal_forwarded_verbatim() {
        let assistant = Assistant::new(
            Arc::new(Exhausted),
            default_fallback_replies(),
            Duration::from_secs(10),
            Duration::from_millis(1500),
        );
        let mut h = Harness::start(assistant).opened().await;

        h.send(r#"{"type":"user","text":"Ciao"}"#);
        assert_eq!(
            h.next().await,
            json!({"error": true, "code": 429, "ui": "Credito API esaurito. Modalità demo attiva."})
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_session_gets_one_ping_before_next_frame() {
        let mut h = Harness::mock().opened().await;

        tokio::time::sleep(Duration::from_secs(61)).await;
        h.send(r#"{"type":"ping","t":"late"}"#);

        let keepalive = h.next().await;
        assert_eq!(keepalive["type"], "ping");
        assert!(keepalive["server_time"].is_i64());
        assert_eq!(h.next().await, json!({"type": "pong", "t": "late"}));
        assert!(h.outbound.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_session_pings_once_per_interval() {
        let mut h = Harness::mock().opened().await;

        tokio::time::sleep(Duration::from_secs(150)).await;
        assert_eq!(h.next().await["type"], "ping");
        assert_eq!(h.next().await["type"], "ping");
        assert!(h.outbound.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_keepalive_closes_session() {
        let h = Harness::mock().opened().await;
        let Harness {
            registry,
            id,
            frames,
            outbound,
            task,
        } = h;

        drop(outbound);
        tokio::time::sleep(Duration::from_secs(61)).await;

        task.await.unwrap();
        assert!(!registry.contains(id).await);
        drop(frames);
    }

    #[tokio::test]
    async fn test_stream_end_closes_and_unregisters() {
        let h = Harness::mock().opened().await;
        let Harness {
            registry,
            id,
            frames,
            task,
            ..
        } = h;

        drop(frames);
        task.await.unwrap();
        assert!(!registry.contains(id).await);
    }

    #[tokio::test]
    async fn test_send_failure_closes_session() {
        let h = Harness::mock().opened().await;
        let Harness {
            registry,
            id,
            frames,
            outbound,
            task,
        } = h;

        drop(outbound);
        frames.send(r#"{"type":"ping"}"#.to_string()).unwrap();
        task.await.unwrap();
        assert!(!registry.contains(id).await);
    }
}
