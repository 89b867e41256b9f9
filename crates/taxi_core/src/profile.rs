//! User profile and the on-disk session file.

use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

pub const SESSION_FILE_NAME: &str = "session.json";
pub const SESSION_FILE_VERSION: u32 = 1;

/// The rider placing orders in this session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
}

impl UserProfile {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            phone: phone.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionFileV1 {
    version: u32,
    profile: UserProfile,
}

#[derive(Debug)]
pub enum SessionStoreError {
    Io(String),
    InvalidFormat(String),
}

impl fmt::Display for SessionStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStoreError::Io(message) => write!(f, "{message}"),
            SessionStoreError::InvalidFormat(message) => write!(f, "{message}"),
        }
    }
}

pub fn session_file_path() -> Result<PathBuf, SessionStoreError> {
    let cwd = std::env::current_dir().map_err(|error| {
        SessionStoreError::Io(format!("failed to read current directory: {error}"))
    })?;
    Ok(cwd.join(SESSION_FILE_NAME))
}

/// A missing session file reads as `Ok(None)`.
pub fn read_session(path: &Path) -> Result<Option<UserProfile>, SessionStoreError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(error) => {
            return Err(SessionStoreError::Io(format!(
                "failed to read session file '{}': {error}",
                path.display()
            )))
        }
    };

    let file: SessionFileV1 = serde_json::from_str(&contents).map_err(|error| {
        SessionStoreError::InvalidFormat(format!(
            "invalid session file '{}': {error}",
            path.display()
        ))
    })?;

    if file.version != SESSION_FILE_VERSION {
        return Err(SessionStoreError::InvalidFormat(format!(
            "unsupported session file version {} in '{}'",
            file.version,
            path.display()
        )));
    }

    Ok(Some(file.profile))
}

/// Startup variant: an unreadable session file logs a warning and the
/// caller proceeds signed out.
pub fn load_session(path: &Path) -> Option<UserProfile> {
    match read_session(path) {
        Ok(profile) => profile,
        Err(error) => {
            warn!(error = %error, "session file unreadable, ignoring it");
            None
        }
    }
}

pub fn save_session(path: &Path, profile: &UserProfile) -> Result<(), SessionStoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|error| {
            SessionStoreError::Io(format!(
                "failed to create session directory '{}': {error}",
                parent.display()
            ))
        })?;
    }

    let file = SessionFileV1 {
        version: SESSION_FILE_VERSION,
        profile: profile.clone(),
    };
    let serialized = serde_json::to_string_pretty(&file).map_err(|error| {
        SessionStoreError::Io(format!("failed to serialize session to json: {error}"))
    })?;

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_nanos())
        .unwrap_or(0);
    let temp_path = path.with_extension(format!("json.tmp.{nanos}"));
    let mut temp_file = File::create(&temp_path).map_err(|error| {
        SessionStoreError::Io(format!(
            "failed to create temp session file '{}': {error}",
            temp_path.display()
        ))
    })?;
    temp_file
        .write_all(serialized.as_bytes())
        .map_err(|error| {
            SessionStoreError::Io(format!(
                "failed to write temp session file '{}': {error}",
                temp_path.display()
            ))
        })?;
    temp_file.sync_all().map_err(|error| {
        SessionStoreError::Io(format!(
            "failed to flush temp session file '{}': {error}",
            temp_path.display()
        ))
    })?;

    fs::rename(&temp_path, path).map_err(|error| {
        let _ = fs::remove_file(&temp_path);
        SessionStoreError::Io(format!(
            "failed to move temp session file '{}' to '{}': {error}",
            temp_path.display(),
            path.display()
        ))
    })
}

/// Removing an absent session file is not an error.
pub fn clear_session(path: &Path) -> Result<(), SessionStoreError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(error) => Err(SessionStoreError::Io(format!(
            "failed to remove session file '{}': {error}",
            path.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_profiles_get_distinct_ids() {
        let first = UserProfile::new("Ivan Ivanov", "+7 (916) 123-45-67");
        let second = UserProfile::new("Ivan Ivanov", "+7 (916) 123-45-67");
        assert_ne!(first.id, second.id);
        assert_eq!(first.email, None);
    }

    #[test]
    fn session_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(SESSION_FILE_NAME);

        let profile =
            UserProfile::new("Ivan Ivanov", "+7 (916) 123-45-67").with_email("ivan@example.com");
        save_session(&path, &profile).expect("save");

        assert_eq!(load_session(&path), Some(profile));
    }

    #[test]
    fn missing_session_reads_as_signed_out() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(SESSION_FILE_NAME);

        assert_eq!(read_session(&path).expect("read"), None);
        assert_eq!(load_session(&path), None);
    }

    #[test]
    fn corrupt_session_is_an_error_but_load_ignores_it() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(SESSION_FILE_NAME);
        std::fs::write(&path, "{ broken").expect("write");

        assert!(matches!(
            read_session(&path),
            Err(SessionStoreError::InvalidFormat(_))
        ));
        assert_eq!(load_session(&path), None);
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(SESSION_FILE_NAME);
        let contents =
            r#"{"version": 2, "profile": {"id": "x", "name": "n", "phone": "p", "email": null}}"#;
        std::fs::write(&path, contents).expect("write");

        assert!(matches!(
            read_session(&path),
            Err(SessionStoreError::InvalidFormat(_))
        ));
    }

    #[test]
    fn clear_session_removes_the_file_and_tolerates_absence() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(SESSION_FILE_NAME);

        let profile = UserProfile::new("Ivan Ivanov", "+7 (916) 123-45-67");
        save_session(&path, &profile).expect("save");
        clear_session(&path).expect("clear");
        assert_eq!(load_session(&path), None);

        clear_session(&path).expect("clear again");
    }
}
