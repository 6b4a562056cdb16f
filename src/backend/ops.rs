//! Multi-step remote operations built on [`CardBackend`]

use futures_util::future::join_all;

use crate::backend::naming::{content_type, object_name, object_name_from_url};
use crate::backend::CardBackend;
use crate::error::{BackendError, BackendResult};
use crate::models::{ArchiveItem, ArchiveOutcome, CardRecord, SlotNumber};

/// Archive every item concurrently and report each outcome in input order
pub async fn archive_batch(backend: &dyn CardBackend, items: Vec<ArchiveItem>) -> Vec<ArchiveOutcome> {
    let tasks = items.into_iter().map(|item| async move {
        match archive_item(backend, &item).await {
            Ok(image_url) => ArchiveOutcome::Stored {
                slot: item.slot,
                path: item.path,
                image_url,
                is_favorite: item.is_favorite,
            },
            Err(e) => {
                tracing::error!(slot = %item.slot, path = %item.path.display(), error = %e, "Archive failed");
                ArchiveOutcome::Failed {
                    slot: item.slot,
                    path: item.path,
                    message: e.to_string(),
                }
            }
        }
    });
    join_all(tasks).await
}

/// Upload one image and point its slot at it. Returns the public reference.
pub async fn archive_item(backend: &dyn CardBackend, item: &ArchiveItem) -> BackendResult<String> {
    let bytes = tokio::fs::read(&item.path)
        .await
        .map_err(|source| BackendError::ReadFile {
            path: item.path.display().to_string(),
            source,
        })?;

    let name = object_name(item.slot.get(), &bytes, &item.path);
    backend
        .upload_object(&name, bytes, content_type(&item.path))
        .await?;

    let image_url = backend.public_url(&name);
    backend
        .upsert_card(&CardRecord::new(item.slot, image_url.clone(), item.is_favorite))
        .await?;
    tracing::info!(slot = %item.slot, object = %name, "Card archived");

    // The replaced image is no longer referenced by any row
    if let Some(previous) = item.previous_url.as_deref().filter(|p| *p != image_url) {
        remove_stored_image(backend, previous).await;
    }

    Ok(image_url)
}

/// Delete the row of a slot, then its stored image on a best-effort basis
pub async fn delete_slot(
    backend: &dyn CardBackend,
    slot: SlotNumber,
    image_url: Option<&str>,
) -> BackendResult<()> {
    backend.delete_card(slot).await?;
    if let Some(url) = image_url {
        remove_stored_image(backend, url).await;
    }
    Ok(())
}

async fn remove_stored_image(backend: &dyn CardBackend, url: &str) {
    let Some(name) = object_name_from_url(url) else {
        tracing::warn!(url, "No object name in image reference");
        return;
    };
    if let Err(e) = backend.remove_object(name).await {
        tracing::warn!(object = name, error = %e, "Could not remove stored image");
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::{BTreeMap, BTreeSet};
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// In-memory backend that can be told to fail specific calls
    #[derive(Default)]
    pub struct FakeBackend {
        pub rows: Mutex<BTreeMap<i64, CardRecord>>,
        pub objects: Mutex<BTreeSet<String>>,
        pub fail_upload_for: Mutex<Vec<u16>>,
        pub fail_remove: Mutex<bool>,
        pub fail_rows: Mutex<bool>,
    }

    impl FakeBackend {
        fn row_error(&self) -> BackendResult<()> {
            if *self.fail_rows.lock().unwrap() {
                Err(BackendError::Status { status: 500, body: "row store down".into() })
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl CardBackend for FakeBackend {
        async fn fetch_all(&self) -> BackendResult<Vec<CardRecord>> {
            self.row_error()?;
            Ok(self.rows.lock().unwrap().values().cloned().collect())
        }

        async fn upsert_card(&self, record: &CardRecord) -> BackendResult<()> {
            self.row_error()?;
            self.rows.lock().unwrap().insert(record.slot_number, record.clone());
            Ok(())
        }

        async fn update_favorite(&self, slot: SlotNumber, favorite: bool) -> BackendResult<()> {
            self.row_error()?;
            if let Some(row) = self.rows.lock().unwrap().get_mut(&(slot.get() as i64)) {
                row.is_favorite = favorite;
            }
            Ok(())
        }

        async fn delete_card(&self, slot: SlotNumber) -> BackendResult<()> {
            self.row_error()?;
            self.rows.lock().unwrap().remove(&(slot.get() as i64));
            Ok(())
        }

        async fn upload_object(&self, name: &str, _bytes: Vec<u8>, _ct: &str) -> BackendResult<()> {
            let slot: u16 = name.split('_').next().and_then(|s| s.parse().ok()).unwrap_or(0);
            if self.fail_upload_for.lock().unwrap().contains(&slot) {
                return Err(BackendError::Status { status: 400, body: "upload rejected".into() });
            }
            self.objects.lock().unwrap().insert(name.to_string());
            Ok(())
        }

        async fn remove_object(&self, name: &str) -> BackendResult<()> {
            if *self.fail_remove.lock().unwrap() {
                return Err(BackendError::Status { status: 500, body: "storage down".into() });
            }
            self.objects.lock().unwrap().remove(name);
            Ok(())
        }

        fn public_url(&self, name: &str) -> String {
            format!("https://fake/storage/v1/object/public/cards/{name}")
        }
    }

    fn item(dir: &std::path::Path, slot: i64, content: &[u8]) -> ArchiveItem {
        let path = dir.join(format!("card{slot}.png"));
        std::fs::write(&path, content).unwrap();
        ArchiveItem {
            slot: SlotNumber::new(slot).unwrap(),
            path,
            is_favorite: false,
            previous_url: None,
        }
    }

    #[tokio::test]
    async fn test_archive_batch_reports_each_item() {
        let dir = tempdir().unwrap();
        let backend = FakeBackend::default();
        backend.fail_upload_for.lock().unwrap().push(2);

        let items = vec![item(dir.path(), 1, b"one"), item(dir.path(), 2, b"two"), item(dir.path(), 3, b"three")];
        let outcomes = archive_batch(&backend, items).await;

        let stored: Vec<bool> = outcomes.iter().map(|o| o.is_stored()).collect();
        assert_eq!(stored, vec![true, false, true]);
        assert_eq!(outcomes[1].slot(), SlotNumber::new(2).unwrap());
        assert_eq!(backend.rows.lock().unwrap().len(), 2);
        assert_eq!(backend.objects.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_file_is_a_failed_outcome() {
        let backend = FakeBackend::default();
        let outcomes = archive_batch(
            &backend,
            vec![ArchiveItem {
                slot: SlotNumber::new(4).unwrap(),
                path: PathBuf::from("/definitely/not/here.png"),
                is_favorite: true,
                previous_url: None,
            }],
        )
        .await;

        assert!(matches!(&outcomes[0], ArchiveOutcome::Failed { message, .. } if message.contains("Could not read")));
        assert!(backend.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_overwrite_removes_previous_object() {
        let dir = tempdir().unwrap();
        let backend = FakeBackend::default();
        backend.objects.lock().unwrap().insert("5_old.png".into());

        let mut next = item(dir.path(), 5, b"new image");
        next.previous_url = Some(backend.public_url("5_old.png"));
        next.is_favorite = true;

        let url = archive_item(&backend, &next).await.unwrap();
        let objects = backend.objects.lock().unwrap();
        assert!(!objects.contains("5_old.png"));
        assert_eq!(objects.len(), 1);
        assert!(backend.rows.lock().unwrap()[&5].is_favorite);
        assert!(url.starts_with("https://fake/"));
    }

    #[tokio::test]
    async fn test_delete_slot_tolerates_object_failure() {
        let backend = FakeBackend::default();
        let slot = SlotNumber::new(8).unwrap();
        backend.rows.lock().unwrap().insert(8, CardRecord::new(slot, "https://fake/x/8_a.png", false));
        *backend.fail_remove.lock().unwrap() = true;

        delete_slot(&backend, slot, Some("https://fake/x/8_a.png")).await.unwrap();
        assert!(backend.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_slot_row_failure_is_an_error() {
        let backend = FakeBackend::default();
        *backend.fail_rows.lock().unwrap() = true;
        let result = delete_slot(&backend, SlotNumber::new(8).unwrap(), None).await;
        assert!(result.is_err());
    }
}
