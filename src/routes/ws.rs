//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use rand::{rngs::StdRng, SeedableRng};
use tracing::{info, error, instrument, debug};

use crate::engine::RequestedCount;
use crate::logic::{challenge_for_request, compute_weakness_report, submit_result};
use crate::protocol::{to_out, ClientWsMessage, ServerWsMessage};
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "vimtrainer_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "vimtrainer_backend", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "vimtrainer_backend", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state).await
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "vimtrainer_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Close(_) => break,
      // pings are answered by axum itself
      _ => {}
    }
  }
  info!(target: "vimtrainer_backend", "WebSocket disconnected");
}

#[instrument(level = "info", skip(state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::NewChallenge { language, count, user_id } => {
      let language = language.map(|l| l.to_lowercase()).unwrap_or_else(|| "python".into());
      let mut rng = StdRng::from_entropy();
      match challenge_for_request(state, &language, RequestedCount::clamped(count), user_id.as_deref(), &mut rng).await {
        Some(Ok((ch, origin))) => {
          info!(target: "challenge", %language, id = %ch.id, %origin, "WS new_challenge served");
          ServerWsMessage::Challenge { challenge: to_out(&ch) }
        }
        Some(Err(e)) => {
          error!(target: "challenge", %language, error = %e, "WS challenge generation failed");
          ServerWsMessage::Error { message: e.to_string() }
        }
        None => ServerWsMessage::Error { message: format!("Unsupported language '{}'", language) },
      }
    }

    ClientWsMessage::SubmitResult(body) => {
      let (result, applied) = submit_result(&state.store, body).await;
      info!(target: "weakness", id = %result.id, user_id = %result.user_id, "WS submit_result stored");
      ServerWsMessage::ResultSaved { result, applied }
    }

    ClientWsMessage::WeaknessReport { user_id } => {
      let report = compute_weakness_report(&state.store, &user_id).await;
      ServerWsMessage::WeaknessReport { report }
    }
  }
}
