/// On-disk blob storage for uploaded audio
///
/// Blobs live flat under a single root, named by their storage key. Writes go
/// to a `.part` sibling first and are renamed into place only once fully
/// flushed, so a visible blob is always complete.
use std::io;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

const STAGING_SUFFIX: &str = ".part";

#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    pub async fn ensure_root(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root).await
    }

    /// Open a staging file that becomes `key` on [`StagedBlob::commit`]
    pub async fn create_staging(&self, key: &str) -> io::Result<StagedBlob> {
        self.ensure_root().await?;
        let final_path = self.path_for(key);
        let part_path = self.path_for(&format!("{}{}", key, STAGING_SUFFIX));
        let file = fs::File::create(&part_path).await?;
        Ok(StagedBlob {
            final_path,
            part_path,
            file,
        })
    }

    pub async fn exists(&self, key: &str) -> bool {
        fs::try_exists(self.path_for(key)).await.unwrap_or(false)
    }

    /// Remove a blob. Idempotent: returns `Ok(false)` when it was already gone.
    pub async fn remove(&self, key: &str) -> io::Result<bool> {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// A blob being written. Dropped without `commit` it leaves a `.part` file;
/// call [`StagedBlob::discard`] on failure paths.
#[derive(Debug)]
pub struct StagedBlob {
    final_path: PathBuf,
    part_path: PathBuf,
    file: fs::File,
}

impl StagedBlob {
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.file.write_all(chunk).await
    }

    /// Flush to disk and atomically move into place
    pub async fn commit(mut self) -> io::Result<PathBuf> {
        self.file.flush().await?;
        self.file.sync_all().await?;
        drop(self.file);
        fs::rename(&self.part_path, &self.final_path).await?;
        Ok(self.final_path)
    }

    pub async fn discard(self) {
        drop(self.file);
        if let Err(e) = fs::remove_file(&self.part_path).await {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!(
                    path = %self.part_path.display(),
                    error = %e,
                    "failed to remove staging file"
                );
            }
        }
    }
}
