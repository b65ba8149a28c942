// ABOUTME: In-memory shell session — username plus the logical current directory.
// ABOUTME: The process working directory is never changed; paths are resolved lexically.

use std::path::{Component, Path, PathBuf};

use crate::error::{Result, ShellError};

/// Why a `cd` was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotADirectory(pub PathBuf);

/// The state of one interactive session.
#[derive(Debug, Clone)]
pub struct Session {
    username: String,
    cwd: PathBuf,
}

impl Session {
    pub fn new(username: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            username: username.into(),
            cwd: normalize(&root.into()),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Current logical working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Resolve an argument against the current directory.
    pub fn resolve(&self, arg: &str) -> PathBuf {
        resolve(&self.cwd, arg)
    }

    /// Move to `arg` if it names an existing directory. The current
    /// directory is left unchanged otherwise.
    pub fn change_dir(&mut self, arg: &str) -> std::result::Result<(), NotADirectory> {
        let target = self.resolve(arg);
        if target.is_dir() {
            self.cwd = target;
            Ok(())
        } else {
            Err(NotADirectory(target))
        }
    }

    /// Prompt shown before each command: `user@host:/path$ `.
    pub fn prompt(&self, host: &str) -> String {
        format!("{}@{}:{}$ ", self.username, host, self.cwd.display())
    }
}

/// Join `arg` onto `base` and normalize the result lexically.
///
/// Absolute arguments replace `base`. `..` never climbs above the root.
pub fn resolve(base: &Path, arg: &str) -> PathBuf {
    normalize(&base.join(arg))
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Canonical on-disk form of a directory, used when the shell starts.
pub fn canonical_root(path: &Path) -> Result<PathBuf> {
    path.canonicalize().map_err(ShellError::Workdir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_joins_relative_paths() {
        assert_eq!(resolve(Path::new("/tmp/w"), "sub"), PathBuf::from("/tmp/w/sub"));
        assert_eq!(
            resolve(Path::new("/tmp/w"), "sub/inner/"),
            PathBuf::from("/tmp/w/sub/inner")
        );
    }

    #[test]
    fn resolve_handles_dot_and_dotdot() {
        assert_eq!(resolve(Path::new("/tmp/w/sub"), ".."), PathBuf::from("/tmp/w"));
        assert_eq!(resolve(Path::new("/tmp/w"), "./a/../b"), PathBuf::from("/tmp/w/b"));
        assert_eq!(resolve(Path::new("/"), "../.."), PathBuf::from("/"));
    }

    #[test]
    fn resolve_absolute_argument_replaces_base() {
        assert_eq!(resolve(Path::new("/tmp/w"), "/etc"), PathBuf::from("/etc"));
    }

    #[test]
    fn relative_base_keeps_leading_parent_dirs() {
        assert_eq!(resolve(Path::new("a"), "../../b"), PathBuf::from("../b"));
    }

    #[test]
    fn change_dir_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("subdir")).unwrap();
        let mut session = Session::new("alice", tmp.path());
        let start = session.cwd().to_path_buf();

        session.change_dir("subdir").unwrap();
        assert_eq!(session.cwd(), start.join("subdir"));
        session.change_dir("..").unwrap();
        assert_eq!(session.cwd(), start);
    }

    #[test]
    fn change_dir_refuses_missing_and_file_targets() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("a.txt"), "a").unwrap();
        let mut session = Session::new("alice", tmp.path());
        let start = session.cwd().to_path_buf();

        let err = session.change_dir("missing").unwrap_err();
        assert_eq!(err, NotADirectory(start.join("missing")));
        assert!(session.change_dir("a.txt").is_err());
        assert_eq!(session.cwd(), start);
    }

    #[test]
    fn prompt_format() {
        let session = Session::new("alice", "/tmp/w");
        assert_eq!(session.prompt("virtual_shell"), "alice@virtual_shell:/tmp/w$ ");
    }
}
