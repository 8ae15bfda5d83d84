use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::store::{DraftStore, StoreEvent};

use super::draft::DraftManager;

/// Keep this funnel instance consistent with writes other instances make to
/// the shared slot. Events from our own store handle are echoes and are
/// dropped; external saves are adopted last-writer-wins; an external clear
/// resets us to an empty idle draft.
pub fn spawn_draft_sync(manager: Arc<DraftManager>, store: Arc<DraftStore>) -> JoinHandle<()> {
    let mut events = BroadcastStream::new(store.subscribe());

    tokio::spawn(async move {
        while let Some(event) = events.next().await {
            let event = match event {
                Ok(event) => event,
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    // Missed events; the slot itself is the source of truth
                    tracing::warn!(skipped, "draft sync lagged, re-reading slot");
                    manager.adopt_external(store.load());
                    continue;
                }
            };

            if event.writer() == store.writer_id() {
                continue;
            }

            match event {
                StoreEvent::Saved { draft, .. } => manager.adopt_external(Some(draft)),
                StoreEvent::Cleared { .. } => manager.adopt_external(None),
            }
        }
    })
}
