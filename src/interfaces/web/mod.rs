pub(crate) mod auth;
pub(crate) mod error;
mod handlers;
mod router;

use std::convert::Infallible;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use tokio_stream::{Stream, StreamExt, wrappers::BroadcastStream};
use tracing::info;

use crate::core::blobs::BlobStore;
use crate::core::events::EventSender;
use crate::core::store::Store;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) store: Arc<Store>,
    pub(crate) blobs: Arc<BlobStore>,
    pub(crate) events: EventSender,
    pub(crate) operator_token: String,
}

pub struct ApiServer {
    store: Arc<Store>,
    blobs: Arc<BlobStore>,
    events: EventSender,
    operator_token: String,
    api_host: String,
    api_port: u16,
}

impl ApiServer {
    pub fn new(
        store: Arc<Store>,
        blobs: Arc<BlobStore>,
        events: EventSender,
        operator_token: String,
        api_host: String,
        api_port: u16,
    ) -> Self {
        Self {
            store,
            blobs,
            events,
            operator_token,
            api_host,
            api_port,
        }
    }

    pub async fn run(self) -> Result<()> {
        let state = AppState {
            store: self.store,
            blobs: self.blobs,
            events: self.events,
            operator_token: self.operator_token,
        };
        let app = router::build_api_router(state);

        let addr = format!("{}:{}", self.api_host, self.api_port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!("Vigil API running at http://{addr}");
        axum::serve(listener, app).await?;
        Ok(())
    }
}

// --- Change-notification fan-out (used by router) ---

/// Stream record-change events to operator clients. Each event is one
/// serialized ChangeEvent; a lagging subscriber sees a lag marker and is
/// expected to re-fetch the records it renders.
async fn sse_events_endpoint(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.events.subscribe();
    let stream = BroadcastStream::new(receiver).map(|msg| match msg {
        Ok(event) => Ok(Event::default()
            .data(serde_json::to_string(&event).unwrap_or_else(|_| "{}".to_string()))),
        Err(_) => Ok(Event::default().data("{\"lagged\":true}")),
    });
    Sse::new(stream)
}
