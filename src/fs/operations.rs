use std::{
    fs::File as StdFile,
    io::{ErrorKind, Write},
    path::Path,
};

use fs4::{fs_std::FileExt, tokio::AsyncFileExt};
use tokio::{
    fs::File,
    io::{self, AsyncReadExt},
};
use tracing::debug;

/// Reads the whole file while holding a shared lock on it. A missing file is `Ok(None)`.
pub async fn read_locked(path: &Path) -> Result<Option<Vec<u8>>, io::Error> {
    let mut file = match File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    debug!("Reading {path:?}");

    // Semi-safe acquire-release for a file
    file.lock_shared()?;
    let mut content = Vec::new();
    let result = file.read_to_end(&mut content).await;
    file.unlock_async().await?;
    result?;

    Ok(Some(content))
}

/// Replaces the content of a file. The data goes into a uniquely named sibling first, which is
/// then renamed over the target, so an interrupted write leaves the previous content intact.
pub async fn write_replacing(path: &Path, content: &[u8]) -> Result<(), io::Error> {
    let path = path.to_owned();
    let content = content.to_vec();
    tokio::task::spawn_blocking(move || replace(&path, &content)).await?
}

fn replace(path: &Path, content: &[u8]) -> Result<(), io::Error> {
    let parent = path
        .parent()
        .filter(|v| !v.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    // The exclusive lock waits for readers of the current content and for other writers.
    let current = match StdFile::open(path) {
        Ok(file) => {
            file.lock_exclusive()?;
            Some(file)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => return Err(e),
    };

    let mut temporary = tempfile::Builder::new()
        .prefix(path.file_name().unwrap_or_default())
        .suffix(".tmp")
        .tempfile_in(parent)?;
    temporary.write_all(content)?;
    temporary.flush()?;
    temporary.as_file().sync_all()?;
    temporary.persist(path)?;

    if let Some(file) = current {
        FileExt::unlock(&file)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use super::{read_locked, write_replacing};

    #[tokio::test]
    async fn test_read_missing_file() -> Result<()> {
        let dir = tempdir()?;
        assert_eq!(read_locked(&dir.path().join("absent.json")).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_write_replacing_overwrites_and_cleans_up() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("all.json");

        write_replacing(&path, b"{\"first\":1}").await?;
        write_replacing(&path, b"{}").await?;

        assert_eq!(read_locked(&path).await?.as_deref(), Some(&b"{}"[..]));
        assert_eq!(std::fs::read_dir(dir.path())?.count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_simultaneous_writes_keep_one_whole_content() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("all.json");
        let first = vec![b'a'; 64 * 1024];
        let second = vec![b'b'; 64 * 1024];

        for _ in 0..50 {
            let (a, b) = tokio::join!(
                write_replacing(&path, &first),
                write_replacing(&path, &second)
            );
            a?;
            b?;

            let content = std::fs::read(&path)?;
            assert!(content == first || content == second);
        }
        assert_eq!(std::fs::read_dir(dir.path())?.count(), 1);
        Ok(())
    }
}
