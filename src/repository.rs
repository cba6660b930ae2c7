//! Git repository access

use crate::{Error, Result};
use git2::{Commit, Repository};
use log::{debug, error};
use std::path::{Path, PathBuf};

/// Open the git repository whose working directory is `path`.
///
/// Parent directories are not searched. Every failure (missing path, not a
/// repository, unreadable repository) becomes [`Error::Repository`].
pub fn open_repository<P: AsRef<Path>>(path: P) -> Result<RepositoryHandle> {
    RepositoryHandle::open(path)
}

/// An opened repository
pub struct RepositoryHandle {
    repo: Repository,
    root_path: PathBuf,
}

impl RepositoryHandle {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        debug!("Opening git repository at: {}", path.display());
        if log::log_enabled!(log::Level::Debug) {
            log_directory_contents(path, log::Level::Debug);
        }

        let repo = Repository::open(path).map_err(|source| {
            error!("Git repository initialization failed at {}: {}", path.display(), source);
            log_directory_contents(path, log::Level::Error);
            Error::Repository {
                path: path.to_path_buf(),
                source,
            }
        })?;

        // Bare repositories have no working directory
        let root_path = repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf();
        debug!("Git repository opened at: {}", root_path.display());

        Ok(Self { repo, root_path })
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Name of the checked-out branch, or `None` for a detached or unborn HEAD.
    pub fn current_branch(&self) -> Option<String> {
        let head = self.repo.head().ok()?;
        if !head.is_branch() {
            return None;
        }
        head.shorthand().map(str::to_string)
    }

    /// The commit HEAD points at, if any.
    pub fn head_commit(&self) -> Option<CommitInfo> {
        let commit = self.repo.head().ok()?.peel_to_commit().ok()?;
        Some(CommitInfo::from_commit(&commit))
    }
}

fn log_directory_contents(path: &Path, level: log::Level) {
    match directory_listing(path) {
        Ok(names) => log::log!(level, "Directory contents of {}: {:?}", path.display(), names),
        Err(e) => log::log!(level, "Could not list {}: {}", path.display(), e),
    }
}

/// Sorted entry names of `path`.
fn directory_listing(path: &Path) -> std::io::Result<Vec<String>> {
    let mut names = std::fs::read_dir(path)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect::<Vec<_>>();
    names.sort();
    Ok(names)
}

/// Information about a single commit
#[derive(Debug, Clone)]
pub struct CommitInfo {
    pub hash: String,
    pub message: String,
    pub author: String,
    pub timestamp: i64,
}

impl CommitInfo {
    fn from_commit(commit: &Commit) -> Self {
        Self {
            hash: commit.id().to_string(),
            message: commit.message().unwrap_or("").to_string(),
            author: commit.author().name().unwrap_or("Unknown").to_string(),
            timestamp: commit.time().seconds(),
        }
    }

    pub fn short_hash(&self) -> &str {
        &self.hash[..self.hash.len().min(7)]
    }

    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("").trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;
    use tempfile::TempDir;

    fn create_test_repo() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let repo = Repository::init(temp_dir.path()).unwrap();

        std::fs::write(temp_dir.path().join("main.py"), "def main():\n    pass\n").unwrap();

        let mut index = repo.index().unwrap();
        index.add_path(Path::new("main.py")).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();

        let signature = Signature::now("Test User", "test@example.com").unwrap();
        repo.commit(Some("HEAD"), &signature, &signature, "Initial commit\n\nBody", &tree, &[])
            .unwrap();

        temp_dir
    }

    #[test]
    fn test_open_repository() {
        let temp_dir = create_test_repo();
        let repo = open_repository(temp_dir.path()).unwrap();

        assert!(repo.root_path().join("main.py").exists());

        let branch = repo.current_branch().unwrap();
        // Default branch could be "main" or "master"
        assert!(branch == "main" || branch == "master");

        let head = repo.head_commit().unwrap();
        assert_eq!(head.summary(), "Initial commit");
        assert_eq!(head.author, "Test User");
        assert_eq!(head.short_hash().len(), 7);
    }

    #[test]
    fn test_empty_repository_has_no_head() {
        let temp_dir = TempDir::new().unwrap();
        Repository::init(temp_dir.path()).unwrap();

        let repo = open_repository(temp_dir.path()).unwrap();
        assert!(repo.head_commit().is_none());
        assert!(repo.current_branch().is_none());
    }

    #[test]
    fn test_not_git_repo() {
        let temp_dir = TempDir::new().unwrap();
        let result = open_repository(temp_dir.path());
        assert!(matches!(result, Err(Error::Repository { .. })));
    }

    #[test]
    fn test_directory_listing() {
        let temp_dir = create_test_repo();
        std::fs::write(temp_dir.path().join("a.txt"), "").unwrap();

        let names = directory_listing(temp_dir.path()).unwrap();
        assert_eq!(names, vec![".git", "a.txt", "main.py"]);

        assert!(directory_listing(&temp_dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_missing_path() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("does-not-exist");

        match open_repository(&missing) {
            Err(Error::Repository { path, .. }) => assert_eq!(path, missing),
            other => panic!("expected repository error, got {:?}", other.map(|_| ())),
        }
    }
}
