//! WebSocket and HTTP transport for the authority.

use std::sync::Arc;

use axum::{
    Router,
    extract::{
        Path, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use futures::{SinkExt, StreamExt};
use remote_store_core::Payload;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::{AnswerError, AnswerTarget, Authority, Visibility};

/// Handler state.
#[derive(Clone)]
pub struct WsState {
    /// Authority every connection talks to.
    pub authority: Arc<Authority>,
}

impl WsState {
    /// Create new handler state.
    #[must_use]
    pub const fn new(authority: Arc<Authority>) -> Self {
        Self { authority }
    }
}

impl IntoResponse for AnswerError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::IndexTooSmall(_) | Self::InvalidTarget(_) => StatusCode::BAD_REQUEST,
            Self::IndexOutOfRange { .. } => StatusCode::NOT_FOUND,
        };
        (status, self.to_string()).into_response()
    }
}

/// WebSocket upgrade handler.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<WsState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: WsState) {
    let (mut sender, mut receiver) = socket.split();
    let conn_id = Uuid::new_v4();
    tracing::debug!(%conn_id, "WebSocket connection opened");

    // Current state first, then every change
    let mut updates = state.authority.snapshot_plus_stream();
    let send_task = tokio::spawn(async move {
        while let Some(payload) = updates.next().await {
            let json = match payload.to_json() {
                Ok(j) => j,
                Err(e) => {
                    tracing::error!("Failed to serialize payload: {e}");
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(msg) = receiver.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text.as_str().to_owned(),
            Ok(Message::Binary(_)) => {
                tracing::debug!(%conn_id, "Ignoring binary frame");
                continue;
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::error!(%conn_id, "WebSocket error: {e}");
                break;
            }
        };

        tracing::debug!(%conn_id, "message arrived: {text}");
        match Payload::from_json(&text) {
            Ok(payload) => {
                if let Err(e) = state.authority.apply(&payload) {
                    tracing::warn!(%conn_id, "Rejected update: {e}");
                }
            }
            Err(e) => tracing::warn!(%conn_id, "Invalid client message: {e}"),
        }
    }

    send_task.abort();
    tracing::debug!(%conn_id, "WebSocket connection closed");
}

fn change_visibility(
    state: &WsState,
    target: &str,
    visibility: Visibility,
) -> Result<StatusCode, AnswerError> {
    let target: AnswerTarget = target.parse()?;
    state.authority.set_visibility(visibility, target)?;
    Ok(StatusCode::OK)
}

async fn show_handler(
    State(state): State<WsState>,
    Path(target): Path<String>,
) -> Result<StatusCode, AnswerError> {
    change_visibility(&state, &target, Visibility::Show)
}

async fn hide_handler(
    State(state): State<WsState>,
    Path(target): Path<String>,
) -> Result<StatusCode, AnswerError> {
    change_visibility(&state, &target, Visibility::Hide)
}

async fn toggle_handler(
    State(state): State<WsState>,
    Path(target): Path<String>,
) -> Result<StatusCode, AnswerError> {
    change_visibility(&state, &target, Visibility::Toggle)
}

/// Create the router.
///
/// Routes:
/// - `/ws` - payload stream in both directions
/// - `/show/{target}`, `/hide/{target}`, `/toggle/{target}` - answer
///   visibility, `target` is a 1-based index or `all`
///
/// # Example
/// ```ignore
/// let authority = Arc::new(Authority::new(GameState::new("Title")));
/// axum::serve(listener, create_router(authority)).await?;
/// ```
#[must_use]
pub fn create_router(authority: Arc<Authority>) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/show/{target}", get(show_handler))
        .route("/hide/{target}", get(hide_handler))
        .route("/toggle/{target}", get(toggle_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(WsState::new(authority))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::{body::Body, http::Request};
    use serde_json::json;
    use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, tungstenite::Message as WsMessage};
    use tower::ServiceExt;

    use super::*;
    use crate::GameState;

    type Client = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

    fn setup() -> (Arc<Authority>, Router) {
        let authority = Arc::new(Authority::new(GameState::new("Default Title")));
        let router = create_router(Arc::clone(&authority));
        (authority, router)
    }

    async fn get_status(router: Router, uri: &str) -> StatusCode {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        router.oneshot(request).await.unwrap().status()
    }

    async fn connect(router: Router) -> Client {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await });

        let (client, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws"))
            .await
            .unwrap();
        client
    }

    async fn next_payload(client: &mut Client) -> Payload {
        loop {
            let msg = tokio::time::timeout(Duration::from_secs(5), client.next())
                .await
                .expect("timed out waiting for a frame")
                .expect("socket closed")
                .unwrap();
            if msg.is_text() {
                return Payload::from_json(msg.to_text().unwrap()).unwrap();
            }
        }
    }

    #[tokio::test]
    async fn test_ws_snapshot_then_echo() {
        let (authority, router) = setup();
        let mut client = connect(router).await;

        assert_eq!(
            next_payload(&mut client).await,
            Payload::update_property("title", json!("Default Title"))
        );
        let answers = next_payload(&mut client).await;
        assert_eq!(answers.name(), "answers");

        client.send(WsMessage::text("garbage")).await.unwrap();
        client
            .send(WsMessage::text(
                r#"{"type":"update_property","data":{"name":"nope","value":1}}"#,
            ))
            .await
            .unwrap();
        client
            .send(WsMessage::binary(
                br#"{"type":"update_property","data":{"name":"title","value":"Binary"}}"#.to_vec(),
            ))
            .await
            .unwrap();
        client
            .send(WsMessage::text(
                r#"{"type":"update_property","data":{"name":"title","data":"Quiz"}}"#,
            ))
            .await
            .unwrap();

        let echoed = next_payload(&mut client).await;
        assert_eq!(echoed, Payload::update_property("title", json!("Quiz")));
        assert_eq!(
            echoed.to_json().unwrap(),
            r#"{"type":"update_property","data":{"name":"title","value":"Quiz"}}"#
        );
        assert_eq!(authority.state().title.get(), "Quiz");
    }

    #[tokio::test]
    async fn test_show_single() {
        let (authority, router) = setup();
        assert_eq!(get_status(router, "/show/1").await, StatusCode::OK);
        assert!(authority.state().answers.get()[0].shown);
    }

    #[tokio::test]
    async fn test_hide_all() {
        let (authority, router) = setup();
        assert_eq!(get_status(router, "/hide/all").await, StatusCode::OK);
        assert!(authority.state().answers.get().iter().all(|a| !a.shown));
    }

    #[tokio::test]
    async fn test_toggle_all() {
        let (authority, router) = setup();
        assert_eq!(get_status(router, "/toggle/all").await, StatusCode::OK);
        let shown: Vec<bool> = authority.state().answers.get().iter().map(|a| a.shown).collect();
        assert_eq!(shown, vec![true, false]);
    }

    #[tokio::test]
    async fn test_bad_targets() {
        let (authority, router) = setup();
        assert_eq!(
            get_status(router.clone(), "/show/0").await,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(router.clone(), "/show/3").await,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(router, "/toggle/first").await,
            StatusCode::BAD_REQUEST
        );
        assert!(!authority.state().answers.get()[0].shown);
    }
}
