use bytes::Bytes;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    storage::StorageClient,
};

pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// Lifetime of presigned photo URLs handed to clients.
pub const PRESIGN_TTL_SECS: u64 = 30 * 60;

/// One uploaded file as received from the client.
#[derive(Debug, Clone)]
pub struct UploadItem {
    pub filename: String,
    pub body: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Report,
    Profile,
}

impl UploadKind {
    fn prefix(self) -> &'static str {
        match self {
            Self::Report => "reports",
            Self::Profile => "profiles",
        }
    }
}

/// Normalized extension of `filename` if it is one of the permitted image types.
pub fn allowed_extension(filename: &str) -> Option<&'static str> {
    let (_, ext) = filename.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    ALLOWED_EXTENSIONS.iter().copied().find(|allowed| *allowed == ext)
}

fn content_type_for(ext: &str) -> &'static str {
    match ext {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}

/// Push uploads to storage and return their keys in input order.
///
/// Every item is checked before anything is written. If a write fails the
/// objects already stored for this call are removed again.
pub async fn store_uploads(
    storage: &dyn StorageClient,
    kind: UploadKind,
    owner_id: Uuid,
    items: Vec<UploadItem>,
) -> AppResult<Vec<String>> {
    let mut prepared = Vec::with_capacity(items.len());
    for item in items {
        let ext = allowed_extension(&item.filename).ok_or_else(|| {
            AppError::validation(format!(
                "{} is not an allowed image type ({})",
                item.filename,
                ALLOWED_EXTENSIONS.join(", ")
            ))
        })?;
        if item.body.is_empty() {
            return Err(AppError::validation(format!("{} is empty", item.filename)));
        }
        let key = format!("{}/{}/{}.{}", kind.prefix(), owner_id, Uuid::new_v4(), ext);
        prepared.push((key, ext, item.body));
    }

    let mut stored: Vec<String> = Vec::with_capacity(prepared.len());
    for (key, ext, body) in prepared {
        if let Err(e) = storage.put_object(&key, body, content_type_for(ext)).await {
            remove_objects(storage, &stored).await;
            return Err(AppError::Internal(e.context(format!("put_object {}", key))));
        }
        debug!(%key, "object stored");
        stored.push(key);
    }
    Ok(stored)
}

/// Best-effort removal; failures are logged, not returned.
pub async fn remove_objects(storage: &dyn StorageClient, keys: &[String]) {
    for key in keys {
        if let Err(e) = storage.delete_object(key).await {
            warn!(error = %e, %key, "failed to remove stored object");
        }
    }
}

pub async fn presign_many(storage: &dyn StorageClient, keys: &[String]) -> AppResult<Vec<String>> {
    let mut out = Vec::with_capacity(keys.len());
    for k in keys {
        out.push(storage.presign_get(k, PRESIGN_TTL_SECS).await?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use async_trait::async_trait;

    fn item(name: &str) -> UploadItem {
        UploadItem {
            filename: name.into(),
            body: Bytes::from_static(b"\x89PNG"),
        }
    }

    #[test]
    fn only_image_extensions_are_allowed() {
        assert_eq!(allowed_extension("a.png"), Some("png"));
        assert_eq!(allowed_extension("street.JPG"), Some("jpg"));
        assert_eq!(allowed_extension("x.tar.jpeg"), Some("jpeg"));
        assert_eq!(allowed_extension("anim.Gif"), Some("gif"));
        assert_eq!(allowed_extension("photo.webp"), None);
        assert_eq!(allowed_extension("noextension"), None);
        assert_eq!(allowed_extension("script.php"), None);
    }

    #[tokio::test]
    async fn uploads_land_under_owner_prefix() {
        let storage = MemoryStorage::new();
        let owner = Uuid::new_v4();
        let keys = store_uploads(&storage, UploadKind::Report, owner, vec![item("a.PNG"), item("b.gif")])
            .await
            .unwrap();

        assert_eq!(keys.len(), 2);
        assert!(keys[0].starts_with(&format!("reports/{}/", owner)));
        assert!(keys[0].ends_with(".png"));
        assert_eq!(storage.content_type(&keys[1]).as_deref(), Some("image/gif"));
    }

    #[tokio::test]
    async fn disallowed_file_rejects_whole_batch_before_writing() {
        let storage = MemoryStorage::new();
        let err = store_uploads(
            &storage,
            UploadKind::Report,
            Uuid::new_v4(),
            vec![item("ok.jpg"), item("bad.exe")],
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert!(storage.keys().is_empty());
    }

    struct FailSecondPut {
        inner: MemoryStorage,
        puts: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl StorageClient for FailSecondPut {
        async fn put_object(&self, key: &str, body: Bytes, ct: &str) -> anyhow::Result<()> {
            if self.puts.fetch_add(1, std::sync::atomic::Ordering::SeqCst) == 1 {
                anyhow::bail!("disk full");
            }
            self.inner.put_object(key, body, ct).await
        }
        async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
            self.inner.delete_object(key).await
        }
        async fn presign_get(&self, key: &str, s: u64) -> anyhow::Result<String> {
            self.inner.presign_get(key, s).await
        }
    }

    #[tokio::test]
    async fn failed_write_rolls_back_earlier_objects() {
        let storage = FailSecondPut {
            inner: MemoryStorage::new(),
            puts: Default::default(),
        };
        let err = store_uploads(
            &storage,
            UploadKind::Profile,
            Uuid::new_v4(),
            vec![item("a.png"), item("b.png")],
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Internal(_)));
        assert!(storage.inner.keys().is_empty());
    }

    #[tokio::test]
    async fn presign_many_keeps_order() {
        let storage = MemoryStorage::new();
        let urls = presign_many(&storage, &["a/b/c.jpg".to_string(), "x/y/z.png".to_string()])
            .await
            .unwrap();
        assert_eq!(urls.len(), 2);
        assert!(urls[0].contains("a/b/c.jpg"));
        assert!(urls[1].contains("x/y/z.png"));
    }
}
