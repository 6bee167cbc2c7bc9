//! Dashboard push: server-sent events and the WebSocket feed

use crate::api::rest::state::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
};
use crash_types::{DashboardEvent, DashboardMessage};
use futures_util::{
    stream::{self, Stream},
    SinkExt, StreamExt,
};
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

fn render(event: &DashboardEvent) -> String {
    serde_json::to_string(&DashboardMessage::from(event)).unwrap_or_default()
}

/// Stream dashboard messages via SSE, starting with the current status
pub async fn stream_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.live.subscribe();
    let snapshot = DashboardEvent::Snapshot(state.live.snapshot().await);

    let first = stream::once(async move {
        Ok::<_, Infallible>(Event::default().data(render(&snapshot)))
    });
    let updates = stream::unfold(rx, |mut rx| async move {
        match rx.recv().await {
            Ok(event) => {
                let sse_event = Event::default().data(render(&event));
                Some((Ok(sse_event), rx))
            }
            Err(RecvError::Lagged(_)) => {
                // Client lagged behind, continue
                Some((Ok(Event::default().comment("lagged")), rx))
            }
            Err(RecvError::Closed) => None,
        }
    });

    Sse::new(first.chain(updates)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

/// WebSocket upgrade for the dashboard feed
pub async fn dashboard_socket(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| serve_dashboard(socket, state))
}

async fn serve_dashboard(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.live.subscribe();

    tracing::info!("dashboard connected");

    let snapshot = DashboardEvent::Snapshot(state.live.snapshot().await);
    if sender.send(Message::Text(render(&snapshot))).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Ok(event) => {
                    if sender.send(Message::Text(render(&event))).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "dashboard fell behind the event stream");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    tracing::debug!(%text, "ignoring dashboard message");
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!(error = %e, "dashboard socket error");
                    break;
                }
            },
        }
    }

    tracing::info!("dashboard disconnected");
}
