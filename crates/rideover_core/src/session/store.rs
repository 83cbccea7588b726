use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use super::Session;
use crate::error::AuthError;

const SESSION_FILE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SessionFileV1 {
    version: u32,
    session: Option<Session>,
}

/// Persists the signed-in session as JSON so it survives restarts.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file means no saved session.
    pub fn load(&self) -> Result<Option<Session>, AuthError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(error) => {
                return Err(AuthError::Storage(format!(
                    "failed to read session file '{}': {error}",
                    self.path.display()
                )))
            }
        };
        let file: SessionFileV1 = serde_json::from_str(&contents).map_err(|error| {
            AuthError::Storage(format!(
                "invalid session file '{}': {error}",
                self.path.display()
            ))
        })?;
        if file.version != SESSION_FILE_VERSION {
            return Err(AuthError::Storage(format!(
                "unsupported session file version {} in '{}'",
                file.version,
                self.path.display()
            )));
        }
        Ok(file.session)
    }

    pub fn save(&self, session: &Session) -> Result<(), AuthError> {
        self.write(&SessionFileV1 {
            version: SESSION_FILE_VERSION,
            session: Some(session.clone()),
        })
    }

    pub fn clear(&self) -> Result<(), AuthError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(AuthError::Storage(format!(
                "failed to remove session file '{}': {error}",
                self.path.display()
            ))),
        }
    }

    fn write(&self, file: &SessionFileV1) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|error| {
                    AuthError::Storage(format!(
                        "failed to create session directory '{}': {error}",
                        parent.display()
                    ))
                })?;
            }
        }

        let serialized = serde_json::to_string_pretty(file).map_err(|error| {
            AuthError::Storage(format!("failed to serialize session: {error}"))
        })?;

        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|duration| duration.as_nanos())
            .unwrap_or(0);
        let temp_path = self.path.with_extension(format!("json.tmp.{nanos}"));
        let mut temp_file = File::create(&temp_path).map_err(|error| {
            AuthError::Storage(format!(
                "failed to create temp session file '{}': {error}",
                temp_path.display()
            ))
        })?;
        temp_file
            .write_all(serialized.as_bytes())
            .and_then(|()| temp_file.sync_all())
            .map_err(|error| {
                let _ = fs::remove_file(&temp_path);
                AuthError::Storage(format!(
                    "failed to write temp session file '{}': {error}",
                    temp_path.display()
                ))
            })?;
        drop(temp_file);

        replace_file(&temp_path, &self.path)
    }
}

fn replace_file(temp_path: &Path, target_path: &Path) -> Result<(), AuthError> {
    if fs::rename(temp_path, target_path).is_ok() {
        return Ok(());
    }
    // Some platforms refuse to rename over an existing file.
    if target_path.exists() {
        fs::remove_file(target_path).map_err(|error| {
            let _ = fs::remove_file(temp_path);
            AuthError::Storage(format!(
                "failed to replace session file '{}': {error}",
                target_path.display()
            ))
        })?;
    }
    fs::rename(temp_path, target_path).map_err(|error| {
        let _ = fs::remove_file(temp_path);
        AuthError::Storage(format!(
            "failed to move temp session file '{}' to '{}': {error}",
            temp_path.display(),
            target_path.display()
        ))
    })
}
