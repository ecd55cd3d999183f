//! WebSocket upgrade handler and message dispatch.
//!
//! Each connection owns a fresh session, registered for the lifetime of the
//! socket so REST clients can inspect it. The client receives:
//!
//! 1. A [`WsMessage::Snapshot`] on connect.
//! 2. For each question: `user_message`, a run of `text_delta` frames and
//!    either `assistant_message` or a fresh snapshot followed by `error`.
//!
//! Frames from the client are handled strictly in order, so a session runs
//! one turn at a time and control changes made while a reply streams only
//! apply to the next question.
//!
//! Outgoing frames are queued on a bounded channel of [`OUTBOX_CAPACITY`]
//! frames. When a client stops reading, `text_delta` frames that do not fit
//! are dropped; every other frame waits for room. The `assistant_message`
//! frame always carries the whole reply, so a client that missed deltas
//! still ends up with the full text.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt, stream::SplitSink};
use omni_tutor::catalog::Subject;
use omni_tutor::session::{Session, SessionConfig};
use omni_tutor::turn::run_turn;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::api::AppState;
use crate::protocol::{ClientMessage, WsMessage};
use crate::snapshot::SessionSnapshot;

/// Frames queued per connection before `text_delta` frames are dropped.
pub const OUTBOX_CAPACITY: usize = 256;

/// GET /ws: WebSocket upgrade handler.
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(app): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, app))
}

/// Handle a single WebSocket connection.
async fn handle_socket(socket: WebSocket, app: AppState) {
    let (id, session) = app.sessions.create();
    let (mut sink, mut stream) = socket.split();

    let snapshot = SessionSnapshot::from_session(&*session.lock().await);
    if ws_send(&mut sink, &WsMessage::Snapshot { data: snapshot })
        .await
        .is_err()
    {
        app.sessions.remove(&id);
        return;
    }

    debug!(session = %id, "WebSocket client connected");

    // Outgoing frames go through a channel so that fragment callbacks,
    // which are synchronous, never wait on the socket.
    let (out_tx, mut out_rx) = mpsc::channel::<WsMessage>(OUTBOX_CAPACITY);
    let forward_task = tokio::spawn(async move {
        while let Some(msg) = out_rx.recv().await {
            if ws_send(&mut sink, &msg).await.is_err() {
                break; // Client disconnected.
            }
        }
    });

    while let Some(Ok(msg)) = stream.next().await {
        match msg {
            Message::Text(text) => {
                let mut session = session.lock().await;
                handle_client_message(&text, &mut session, &app, &out_tx).await;
            }
            Message::Close(_) => break,
            _ => {} // Ignore binary, ping, pong.
        }
    }

    debug!(session = %id, "WebSocket client disconnected");
    drop(out_tx);
    let _ = forward_task.await;
    app.sessions.remove(&id);
}

/// Process one JSON frame from a client, emitting replies on `out`.
pub(crate) async fn handle_client_message(
    text: &str,
    session: &mut Session,
    app: &AppState,
    out: &mpsc::Sender<WsMessage>,
) {
    let msg = match serde_json::from_str::<ClientMessage>(text) {
        Ok(msg) => msg,
        Err(e) => {
            debug!("Rejecting malformed WebSocket message: {e}");
            emit(out, WsMessage::error("bad_request", format!("malformed message: {e}"))).await;
            return;
        }
    };

    match msg {
        ClientMessage::Chat {
            message,
            subject,
            style,
            temperature,
        } => {
            if message.trim().is_empty() {
                debug!("Ignoring blank question");
                return;
            }
            let config = match SessionConfig::parse(&subject, &style, temperature) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Rejecting turn: {e}");
                    emit(out, WsMessage::error("configuration", e.to_string())).await;
                    return;
                }
            };

            emit(
                out,
                WsMessage::UserMessage {
                    content: message.clone(),
                },
            )
            .await;

            let mut dropped = 0usize;
            let result = run_turn(
                session,
                app.client.as_ref(),
                &config,
                &app.settings,
                &message,
                |delta| {
                    let frame = WsMessage::TextDelta {
                        delta: delta.to_string(),
                    };
                    if out.try_send(frame).is_err() {
                        dropped += 1;
                    }
                },
            )
            .await;
            if dropped > 0 {
                debug!("Dropped {dropped} text_delta frames for a slow client");
            }

            match result {
                Ok(reply) => emit(out, WsMessage::AssistantMessage { content: reply }).await,
                Err(e) => {
                    let snapshot = WsMessage::Snapshot {
                        data: SessionSnapshot::from_session(session),
                    };
                    emit(out, snapshot).await;
                    emit(out, WsMessage::error(e.kind(), e.to_string())).await;
                }
            }
        }
        ClientMessage::Reset { subject } => match subject.parse::<Subject>() {
            Ok(subject) => {
                session.reset(subject);
                let snapshot = WsMessage::Snapshot {
                    data: SessionSnapshot::from_session(session),
                };
                emit(out, snapshot).await;
            }
            Err(e) => emit(out, WsMessage::error("configuration", e.to_string())).await,
        },
    }
}

/// Queue a frame, waiting for room. A closed channel means the client is gone.
async fn emit(out: &mpsc::Sender<WsMessage>, msg: WsMessage) {
    let _ = out.send(msg).await;
}

/// Serialize a `WsMessage` and send it over the WebSocket sink.
async fn ws_send(sink: &mut SplitSink<WebSocket, Message>, msg: &WsMessage) -> Result<(), ()> {
    let json = serde_json::to_string(msg).unwrap_or_default();
    sink.send(Message::Text(json.into())).await.map_err(|_| ())
}
