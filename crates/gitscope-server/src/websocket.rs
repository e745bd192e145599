//! One WebSocket session per browser tab.
//!
//! Each session owns its own [`Studio`]: pan, zoom, selection and the
//! active view are per-tab, while the snapshot itself is shared through
//! [`ServerState`] and refreshed via the broadcast channel. Client input
//! and refresh events are handled in arrival order by a single task.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use gitscope_core::{Point, RepoStats, Size, Status, Studio, View};

use crate::protocol::{BranchInfo, ClientMessage, HistoryEntry, RepoOverview, ServerMessage};
use crate::state::{RefreshEvent, ServerState};

type WsSender = SplitSink<WebSocket, Message>;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<ServerState>) {
    let session_id = state.register_session();
    info!(session_id, "session connected");

    let (mut sender, mut receiver) = socket.split();
    let mut refresh_rx = state.subscribe();

    let mut studio = Studio::new();
    if let Some(snapshot) = state.snapshot().await {
        studio.load_snapshot(snapshot);
    }
    if announce(&mut sender, &studio).await.is_err() {
        state.unregister_session(session_id);
        return;
    }

    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if handle_text(&mut sender, &mut studio, &state, &text)
                            .await
                            .is_err()
                        {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(error)) => {
                        debug!(session_id, %error, "socket error");
                        break;
                    }
                }
            }
            event = refresh_rx.recv() => {
                match event {
                    Ok(RefreshEvent::Reloaded(snapshot)) => {
                        studio.load_snapshot(snapshot);
                        if announce(&mut sender, &studio).await.is_err() {
                            break;
                        }
                    }
                    Ok(RefreshEvent::LoadFailed(message)) => {
                        studio.load_failed(&message);
                        let status = studio.status().clone();
                        if send_json(&mut sender, &ServerMessage::Status { status })
                            .await
                            .is_err()
                        {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(session_id, skipped, "refresh events lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    state.unregister_session(session_id);
}

async fn handle_text(
    sender: &mut WsSender,
    studio: &mut Studio,
    state: &Arc<ServerState>,
    text: &str,
) -> Result<(), axum::Error> {
    let msg = match serde_json::from_str::<ClientMessage>(text) {
        Ok(msg) => msg,
        Err(error) => {
            warn!(%error, "unparseable client message");
            let message = format!("invalid message: {error}");
            return send_json(sender, &ServerMessage::Error { message }).await;
        }
    };

    match msg {
        ClientMessage::PointerDown { x, y } => {
            if let Some(selection) = studio.pointer_down(Point::new(x, y)) {
                send_json(sender, &ServerMessage::Selected { selection }).await?;
            }
            Ok(())
        }
        ClientMessage::PointerMove { x, y } => {
            if studio.pointer_move(Point::new(x, y)) {
                send_frame(sender, studio).await?;
            }
            Ok(())
        }
        ClientMessage::PointerUp => {
            studio.pointer_up();
            Ok(())
        }
        ClientMessage::Wheel { delta_y } => {
            studio.wheel(delta_y);
            send_frame(sender, studio).await
        }
        ClientMessage::ZoomIn => {
            studio.zoom_in();
            send_frame(sender, studio).await
        }
        ClientMessage::ZoomOut => {
            studio.zoom_out();
            send_frame(sender, studio).await
        }
        ClientMessage::ResetView => {
            studio.reset_view();
            send_frame(sender, studio).await
        }
        ClientMessage::Resize { width, height } => {
            studio.resize(Size::new(width, height));
            send_frame(sender, studio).await
        }
        ClientMessage::SwitchView { view } => {
            studio.switch_view(view);
            send_json(sender, &ServerMessage::ActiveView { view }).await?;
            send_view_payload(sender, studio, state, view).await
        }
        ClientMessage::SelectCommit { id } => match studio.select_commit(&id) {
            Some(selection) => send_json(sender, &ServerMessage::Selected { selection }).await,
            None => {
                let message = format!("unknown commit: {id}");
                send_json(sender, &ServerMessage::Error { message }).await
            }
        },
        ClientMessage::OpenDiff => {
            let Some(id) = studio.selection().map(|s| s.id.to_string()) else {
                let message = "no commit selected".to_string();
                return send_json(sender, &ServerMessage::Error { message }).await;
            };
            studio.open_diff();
            match state.diff_summary(id).await {
                Ok(diff) => send_json(sender, &ServerMessage::Diff { diff }).await,
                Err(error) => {
                    let message = error.to_string();
                    send_json(sender, &ServerMessage::Error { message }).await
                }
            }
        }
        ClientMessage::CloseDiff => {
            studio.close_diff();
            Ok(())
        }
        ClientMessage::Refresh => {
            let status = Status::info("LOADING REPOSITORY...");
            send_json(sender, &ServerMessage::Status { status }).await?;
            let state = Arc::clone(state);
            tokio::spawn(async move {
                // Failures reach every session through LoadFailed
                let _ = state.reload().await;
            });
            Ok(())
        }
        ClientMessage::Ping => send_json(sender, &ServerMessage::Pong).await,
    }
}

/// Full sync after a connect or reload: status, then the info panel and
/// a frame when a snapshot is present.
async fn announce(sender: &mut WsSender, studio: &Studio) -> Result<(), axum::Error> {
    let status = studio.status().clone();
    send_json(sender, &ServerMessage::Status { status }).await?;
    if let Some(snapshot) = studio.snapshot() {
        let overview = RepoOverview::from_snapshot(snapshot);
        send_json(sender, &ServerMessage::Overview { overview }).await?;
        let view = studio.view().current();
        send_json(sender, &ServerMessage::ActiveView { view }).await?;
    }
    send_frame(sender, studio).await
}

async fn send_view_payload(
    sender: &mut WsSender,
    studio: &Studio,
    state: &Arc<ServerState>,
    view: View,
) -> Result<(), axum::Error> {
    match view {
        View::Graph => send_frame(sender, studio).await,
        View::Branches => {
            let branches = studio
                .snapshot()
                .map(|s| BranchInfo::from_snapshot(s))
                .unwrap_or_default();
            send_json(sender, &ServerMessage::Branches { branches }).await
        }
        View::Stats => {
            let stats = match studio.snapshot() {
                Some(snapshot) => RepoStats::from_snapshot(snapshot),
                None => RepoStats { commits: 0, branches: 0, contributors: 0 },
            };
            send_json(sender, &ServerMessage::Stats { stats }).await
        }
        View::History => {
            let entries = studio
                .snapshot()
                .map(|s| HistoryEntry::from_snapshot(s))
                .unwrap_or_default();
            send_json(sender, &ServerMessage::History { entries }).await
        }
        View::Files => match state.head_tree().await {
            Ok(entries) => send_json(sender, &ServerMessage::Files { entries }).await,
            Err(error) => {
                let message = error.to_string();
                send_json(sender, &ServerMessage::Error { message }).await
            }
        },
    }
}

async fn send_frame(sender: &mut WsSender, studio: &Studio) -> Result<(), axum::Error> {
    match studio.render() {
        Ok(list) => send_json(sender, &ServerMessage::Frame { ops: list.into_ops() }).await,
        Err(error) => {
            warn!(%error, "render failed");
            let message = format!("render failed: {error}");
            send_json(sender, &ServerMessage::Error { message }).await
        }
    }
}

/// Serialization failures are logged and swallowed; only a dead socket
/// propagates as an error.
async fn send_json(sender: &mut WsSender, msg: &ServerMessage) -> Result<(), axum::Error> {
    match serde_json::to_string(msg) {
        Ok(json) => sender.send(Message::Text(json)).await,
        Err(error) => {
            warn!(%error, "failed to serialize server message");
            Ok(())
        }
    }
}
