use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::types::LogRow;

/// Default data directory, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Pause after creating a new file so a directory watcher sees it before rows land.
pub const DEFAULT_CREATE_PAUSE: Duration = Duration::from_secs(1);

/// Append-only CSV logs, one file per submission.
///
/// `<id>.csv` while the submission is tracked, `<id>_complete.csv` once finalized.
/// Files are never truncated or deleted.
#[derive(Debug, Clone)]
pub struct SubmissionLog {
    dir: PathBuf,
    create_pause: Duration,
}

impl SubmissionLog {
    pub fn new(dir: impl Into<PathBuf>, create_pause: Duration) -> Self {
        Self {
            dir: dir.into(),
            create_pause,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the data directory if it does not exist yet.
    pub async fn init(&self) -> io::Result<()> {
        fs::create_dir_all(&self.dir).await
    }

    pub fn path(&self, id: &str) -> io::Result<PathBuf> {
        check_id(id)?;
        Ok(self.dir.join(format!("{id}.csv")))
    }

    pub fn completed_path(&self, id: &str) -> io::Result<PathBuf> {
        check_id(id)?;
        Ok(self.dir.join(format!("{id}_complete.csv")))
    }

    /// Create an empty log for `id` unless one exists. Returns `true` if it was created.
    pub async fn ensure(&self, id: &str) -> io::Result<bool> {
        let path = self.path(id)?;
        let created = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(mut file) => {
                file.flush().await?;
                true
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => false,
            Err(e) => return Err(e),
        };
        if created {
            debug!("Created {}", path.display());
            if !self.create_pause.is_zero() {
                tokio::time::sleep(self.create_pause).await;
            }
        }
        Ok(created)
    }

    /// Append one row and sync it to disk before returning.
    ///
    /// The log must already exist (see [`ensure`](Self::ensure)).
    pub async fn append(&self, id: &str, row: &LogRow) -> io::Result<()> {
        let path = self.path(id)?;
        let mut file = OpenOptions::new().append(true).open(&path).await?;
        file.write_all(format_row(&row.fields()).as_bytes()).await?;
        file.flush().await?;
        file.sync_data().await
    }

    /// Rename the log to its completed name. Returns `false` if there was no log.
    pub async fn finalize(&self, id: &str) -> io::Result<bool> {
        let path = self.path(id)?;
        if !fs::try_exists(&path).await? {
            return Ok(false);
        }
        fs::rename(&path, self.completed_path(id)?).await?;
        Ok(true)
    }
}

/// Submission ids become file names; refuse anything that could leave the data directory.
fn check_id(id: &str) -> io::Result<()> {
    let bad = id.is_empty()
        || id == "."
        || id == ".."
        || id.contains(['/', '\\'])
        || id.contains('\0');
    if bad {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid submission id {id:?}"),
        ));
    }
    Ok(())
}

/// Join fields into one CSV line, quoting the ones that need it.
pub fn format_row<S: AsRef<str>>(fields: &[S]) -> String {
    let mut line = fields
        .iter()
        .map(|f| quote_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    line.push_str("\r\n");
    line
}

fn quote_field(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VoteEstimate;

    fn log_in(dir: &Path) -> SubmissionLog {
        SubmissionLog::new(dir, Duration::ZERO)
    }

    fn row(score: i64) -> LogRow {
        LogRow::new(1000.25, score, VoteEstimate { ups: 30, downs: 20 }, 0.6)
    }

    #[test]
    fn format_plain_and_quoted_fields() {
        assert_eq!(format_row(&["1.5", "10", "0.6"]), "1.5,10,0.6\r\n");
        assert_eq!(
            format_row(&["a,b", "say \"hi\"", "x"]),
            "\"a,b\",\"say \"\"hi\"\"\",x\r\n"
        );
    }

    #[tokio::test]
    async fn create_pause_only_after_a_new_file() {
        let tmp = tempfile::tempdir().unwrap();
        let pause = Duration::from_millis(300);
        let log = SubmissionLog::new(tmp.path(), pause);

        let start = std::time::Instant::now();
        assert!(log.ensure("abc").await.unwrap());
        assert!(start.elapsed() >= pause);

        let start = std::time::Instant::now();
        assert!(!log.ensure("abc").await.unwrap());
        assert!(start.elapsed() < pause);
    }

    #[tokio::test]
    async fn ensure_creates_once_and_never_truncates() {
        let tmp = tempfile::tempdir().unwrap();
        let log = log_in(tmp.path());

        assert!(log.ensure("abc").await.unwrap());
        log.append("abc", &row(10)).await.unwrap();
        assert!(!log.ensure("abc").await.unwrap());

        let contents = std::fs::read_to_string(tmp.path().join("abc.csv")).unwrap();
        assert_eq!(contents, "1000.25,10,30,20,0.6\r\n");
    }

    #[tokio::test]
    async fn append_accumulates_rows() {
        let tmp = tempfile::tempdir().unwrap();
        let log = log_in(tmp.path());
        log.ensure("abc").await.unwrap();
        log.append("abc", &row(10)).await.unwrap();
        log.append("abc", &row(11)).await.unwrap();

        let contents = std::fs::read_to_string(tmp.path().join("abc.csv")).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines, vec!["1000.25,10,30,20,0.6", "1000.25,11,30,20,0.6"]);
    }

    #[tokio::test]
    async fn append_without_ensure_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let log = log_in(tmp.path());
        let err = log.append("missing", &row(1)).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn finalize_renames() {
        let tmp = tempfile::tempdir().unwrap();
        let log = log_in(tmp.path());
        log.ensure("abc").await.unwrap();
        log.append("abc", &row(10)).await.unwrap();

        assert!(log.finalize("abc").await.unwrap());
        assert!(!tmp.path().join("abc.csv").exists());
        let contents = std::fs::read_to_string(tmp.path().join("abc_complete.csv")).unwrap();
        assert_eq!(contents.lines().count(), 1);
    }

    #[tokio::test]
    async fn finalize_missing_is_noop() {
        let tmp = tempfile::tempdir().unwrap();
        let log = log_in(tmp.path());
        assert!(!log.finalize("never-written").await.unwrap());
        assert!(!tmp.path().join("never-written_complete.csv").exists());
    }

    #[tokio::test]
    async fn init_creates_nested_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let log = log_in(&tmp.path().join("nested").join("data"));
        log.init().await.unwrap();
        assert!(log.dir().is_dir());
        assert!(log.ensure("abc").await.unwrap());
    }

    #[tokio::test]
    async fn rejects_path_like_ids() {
        let tmp = tempfile::tempdir().unwrap();
        let log = log_in(tmp.path());
        for id in ["", "..", "../escape", "a/b"] {
            let err = log.ensure(id).await.unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::InvalidInput, "id={id:?}");
        }
    }
}
