//! File-backed token store.
//!
//! The token lives in a single file named `token` inside a capability-scoped
//! directory. Writes go to a hidden temporary file first and are renamed into
//! place so a crash never leaves a half-written token behind.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use cap_std::ambient_authority;
use cap_std::fs::{Dir, OpenOptions};

use crate::domain::ports::{TokenStore, TokenStoreError};

const TOKEN_FILE_NAME: &str = "token";

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Token store rooted in one directory.
#[derive(Debug)]
pub struct FileTokenStore {
    dir: Dir,
    root: PathBuf,
}

impl FileTokenStore {
    /// Open (creating if needed) the token directory at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenStoreError::Write`] when the directory cannot be
    /// created and [`TokenStoreError::Read`] when it cannot be opened.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, TokenStoreError> {
        let root = root.as_ref();
        Dir::create_ambient_dir_all(root, ambient_authority()).map_err(|err| {
            TokenStoreError::write(format!("create {}: {err}", root.display()))
        })?;
        let dir = Dir::open_ambient_dir(root, ambient_authority()).map_err(|err| {
            TokenStoreError::read(format!("open {}: {err}", root.display()))
        })?;
        Ok(Self {
            dir,
            root: root.to_path_buf(),
        })
    }

    /// Full path of the token file, for diagnostics.
    pub fn token_path(&self) -> PathBuf {
        self.root.join(TOKEN_FILE_NAME)
    }

    fn write_error(&self, err: &io::Error) -> TokenStoreError {
        TokenStoreError::write(format!("{}: {err}", self.token_path().display()))
    }

    fn write_to_temp_file(&self, tmp_name: &str, token: &str) -> Result<(), TokenStoreError> {
        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        let mut file = self
            .dir
            .open_with(tmp_name, &options)
            .map_err(|err| self.write_error(&err))?;

        if let Err(err) = file.write_all(token.as_bytes()).and_then(|()| file.sync_all()) {
            drop(file);
            drop(self.dir.remove_file(tmp_name));
            return Err(self.write_error(&err));
        }
        Ok(())
    }

    fn rename_into_place(&self, tmp_name: &str) -> Result<(), TokenStoreError> {
        if let Err(err) = rename_impl(&self.dir, tmp_name) {
            drop(self.dir.remove_file(tmp_name));
            return Err(self.write_error(&err));
        }
        Ok(())
    }
}

fn temp_name() -> String {
    let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos());
    format!(
        ".{TOKEN_FILE_NAME}.tmp.{}.{suffix}.{counter}",
        std::process::id()
    )
}

#[cfg(windows)]
fn rename_impl(dir: &Dir, tmp_name: &str) -> io::Result<()> {
    // Windows rename fails if the target exists.
    match dir.remove_file(TOKEN_FILE_NAME) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    dir.rename(tmp_name, dir, TOKEN_FILE_NAME)
}

#[cfg(not(windows))]
fn rename_impl(dir: &Dir, tmp_name: &str) -> io::Result<()> {
    dir.rename(tmp_name, dir, TOKEN_FILE_NAME)
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, TokenStoreError> {
        match self.dir.read_to_string(TOKEN_FILE_NAME) {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_owned()))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(TokenStoreError::read(format!(
                "{}: {err}",
                self.token_path().display()
            ))),
        }
    }

    fn save(&self, token: &str) -> Result<(), TokenStoreError> {
        let tmp_name = temp_name();
        self.write_to_temp_file(&tmp_name, token)?;
        self.rename_into_place(&tmp_name)?;
        // Directory sync is best effort.
        drop(self.dir.open(".").and_then(|dir| dir.sync_all()));
        Ok(())
    }

    fn clear(&self) -> Result<(), TokenStoreError> {
        match self.dir.remove_file(TOKEN_FILE_NAME) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(self.write_error(&err)),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Filesystem coverage for the token store.

    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn temp_dir() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    #[rstest]
    fn missing_token_loads_as_none(temp_dir: TempDir) {
        let store = FileTokenStore::open(temp_dir.path()).expect("open store");
        assert_eq!(store.load().expect("load"), None);
    }

    #[rstest]
    fn open_creates_nested_directories(temp_dir: TempDir) {
        let root = temp_dir.path().join("a").join("b");
        let store = FileTokenStore::open(&root).expect("open store");
        assert!(root.is_dir());
        assert_eq!(store.token_path(), root.join("token"));
    }

    #[rstest]
    fn save_replaces_and_survives_reopen(temp_dir: TempDir) {
        let store = FileTokenStore::open(temp_dir.path()).expect("open store");
        store.save("first").expect("save first");
        store.save("second").expect("save second");

        let reopened = FileTokenStore::open(temp_dir.path()).expect("reopen store");
        assert_eq!(reopened.load().expect("load").as_deref(), Some("second"));

        let leftovers: Vec<_> = std::fs::read_dir(temp_dir.path())
            .expect("list dir")
            .filter_map(Result::ok)
            .map(|entry| entry.file_name())
            .filter(|name| name != "token")
            .collect();
        assert!(leftovers.is_empty(), "temporary files left: {leftovers:?}");
    }

    #[rstest]
    fn clear_is_idempotent(temp_dir: TempDir) {
        let store = FileTokenStore::open(temp_dir.path()).expect("open store");
        store.save("abc").expect("save");
        store.clear().expect("first clear");
        store.clear().expect("second clear");
        assert_eq!(store.load().expect("load"), None);
    }

    #[rstest]
    fn whitespace_only_file_is_treated_as_empty(temp_dir: TempDir) {
        std::fs::write(temp_dir.path().join("token"), "  \n").expect("write token");
        let store = FileTokenStore::open(temp_dir.path()).expect("open store");
        assert_eq!(store.load().expect("load"), None);
    }

    #[rstest]
    fn surrounding_newline_is_trimmed(temp_dir: TempDir) {
        std::fs::write(temp_dir.path().join("token"), "abc.def.ghi\n").expect("write token");
        let store = FileTokenStore::open(temp_dir.path()).expect("open store");
        assert_eq!(store.load().expect("load").as_deref(), Some("abc.def.ghi"));
    }
}
