//! Backend actor - runs remote calls in the Tokio runtime

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::backend::{ops, CardBackend};
use crate::messages::{BackendCommand, BackendResponse};

/// Backend actor that turns commands into remote calls, one task per command
pub struct BackendActor {
    backend: Arc<dyn CardBackend>,
    response_tx: mpsc::UnboundedSender<BackendResponse>,
    tasks: JoinSet<()>,
}

impl BackendActor {
    pub fn new(
        backend: Arc<dyn CardBackend>,
        response_tx: mpsc::UnboundedSender<BackendResponse>,
    ) -> Self {
        BackendActor {
            backend,
            response_tx,
            tasks: JoinSet::new(),
        }
    }

    /// Run the backend actor message loop
    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<BackendCommand>) {
        loop {
            tokio::select! {
                biased;

                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(BackendCommand::Shutdown) | None => break,
                        Some(cmd) => self.dispatch(cmd),
                    }
                }

                // Reap finished tasks
                Some(result) = self.tasks.join_next() => {
                    if let Err(e) = result {
                        tracing::error!(error = %e, "Backend task panicked");
                    }
                }
            }
        }

        // Uploads already sent cannot be recalled; stop waiting for them
        self.tasks.abort_all();
    }

    fn dispatch(&mut self, cmd: BackendCommand) {
        let backend = Arc::clone(&self.backend);
        let response_tx = self.response_tx.clone();

        match cmd {
            BackendCommand::LoadCollection { id } => {
                self.tasks.spawn(async move {
                    tracing::info!(id, "Loading collection");
                    let response = match backend.fetch_all().await {
                        Ok(records) => {
                            tracing::info!(id, rows = records.len(), "Collection loaded");
                            BackendResponse::CollectionLoaded { id, records }
                        }
                        Err(e) => {
                            tracing::error!(id, error = %e, "Collection load failed");
                            BackendResponse::LoadFailed { id, message: e.to_string() }
                        }
                    };
                    let _ = response_tx.send(response);
                });
            }

            BackendCommand::Archive { id, items } => {
                self.tasks.spawn(async move {
                    tracing::info!(id, count = items.len(), "Archiving batch");
                    let outcomes = ops::archive_batch(backend.as_ref(), items).await;
                    let failed: Vec<String> = outcomes
                        .iter()
                        .filter(|o| !o.is_stored())
                        .map(|o| o.slot().to_string())
                        .collect();
                    tracing::info!(
                        id,
                        stored = outcomes.len() - failed.len(),
                        failed = %failed.join(","),
                        "Archive batch finished"
                    );
                    let _ = response_tx.send(BackendResponse::ArchiveFinished { id, outcomes });
                });
            }

            BackendCommand::DeleteCard { id, slot, image_url } => {
                self.tasks.spawn(async move {
                    tracing::info!(id, %slot, "Deleting card");
                    let response = match ops::delete_slot(backend.as_ref(), slot, image_url.as_deref()).await {
                        Ok(()) => BackendResponse::CardDeleted { id, slot },
                        Err(e) => {
                            tracing::error!(id, %slot, error = %e, "Delete failed");
                            BackendResponse::DeleteFailed { id, slot, message: e.to_string() }
                        }
                    };
                    let _ = response_tx.send(response);
                });
            }

            BackendCommand::SetFavorite { id, slot, favorite } => {
                self.tasks.spawn(async move {
                    tracing::info!(id, %slot, favorite, "Saving favorite");
                    let response = match backend.update_favorite(slot, favorite).await {
                        Ok(()) => BackendResponse::FavoriteSaved { id, slot, favorite },
                        Err(e) => {
                            tracing::error!(id, %slot, error = %e, "Favorite update failed");
                            BackendResponse::FavoriteFailed { id, slot, message: e.to_string() }
                        }
                    };
                    let _ = response_tx.send(response);
                });
            }

            BackendCommand::Shutdown => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ops::tests::FakeBackend;
    use crate::models::{CardRecord, SlotNumber};

    #[tokio::test]
    async fn test_actor_round_trip() {
        let fake = FakeBackend::default();
        let slot = SlotNumber::new(2).unwrap();
        fake.rows.lock().unwrap().insert(2, CardRecord::new(slot, "https://fake/2_a.png", false));

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (resp_tx, mut resp_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(BackendActor::new(Arc::new(fake), resp_tx).run(cmd_rx));

        cmd_tx.send(BackendCommand::LoadCollection { id: 1 }).unwrap();
        let response = resp_rx.recv().await.unwrap();
        assert_eq!(response.id(), 1);
        match response {
            BackendResponse::CollectionLoaded { id, records } => {
                assert_eq!(id, 1);
                assert_eq!(records.len(), 1);
            }
            other => panic!("unexpected response {other:?}"),
        }

        cmd_tx.send(BackendCommand::SetFavorite { id: 2, slot, favorite: true }).unwrap();
        assert!(matches!(
            resp_rx.recv().await.unwrap(),
            BackendResponse::FavoriteSaved { id: 2, favorite: true, .. }
        ));

        cmd_tx.send(BackendCommand::Shutdown).unwrap();
        handle.await.unwrap();
    }
}
