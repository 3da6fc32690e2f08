use std::{
    fs::{self, File, OpenOptions},
    io::{Read, Write},
    path::{Path, PathBuf},
};

use urlencoding::encode;

use crate::model::{cli_error::CliError, forms::iam_token::CachedToken};

fn get_path(uri: &str) -> Result<PathBuf, CliError> {
    if let Some(home) = dirs::home_dir() {
        get_path_in(&home, uri)
    } else {
        Err(CliError::UnsupportedSystem)
    }
}

fn get_path_in(base: &Path, uri: &str) -> Result<PathBuf, CliError> {
    let mut path = base.join(".discovery-ingest");
    if !path.exists() {
        fs::create_dir_all(&path)?;
    }
    let encoded_uri = encode(uri);

    path.push(encoded_uri.as_ref());
    Ok(path)
}

fn read_token(path: &Path) -> Result<CachedToken, CliError> {
    let mut file = File::open(path)?;

    let mut contents = String::new();
    file.read_to_string(&mut contents)?;

    Ok(serde_json::from_str(&contents)?)
}

// The cache file is owner read/write only.
fn write_token(path: &Path, token: &CachedToken) -> Result<(), CliError> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

        options.mode(0o600);
        // mode() only applies on creation
        if path.exists() {
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }
    }
    let mut file = options.open(path)?;

    file.write_all(serde_json::to_string(token)?.as_bytes())
        .map_err(|e| e.into())
}

/// The cached IAM token for the service at `uri`, if there is one.
pub fn get(uri: &str) -> Result<CachedToken, CliError> {
    read_token(&get_path(uri)?)
}

pub fn set(uri: &str, token: &CachedToken) -> Result<(), CliError> {
    write_token(&get_path(uri)?, token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn round_trips_through_the_cache_dir() {
        let home = tempfile::tempdir().unwrap();
        let uri = "https://api.us-south.discovery.watson.cloud.ibm.com/instances/1";
        let path = get_path_in(home.path(), uri).unwrap();

        assert!(path.starts_with(home.path().join(".discovery-ingest")));
        assert!(!path.file_name().unwrap().to_string_lossy().contains('/'));

        let token = CachedToken {
            access_token: "token".into(),
            expires_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        };
        write_token(&path, &token).unwrap();
        assert_eq!(read_token(&path).unwrap(), token);
    }

    #[cfg(unix)]
    #[test]
    fn cached_token_is_private_to_its_owner() {
        use std::os::unix::fs::PermissionsExt;

        let home = tempfile::tempdir().unwrap();
        let path = get_path_in(home.path(), "https://example.com").unwrap();
        fs::write(&path, "stale").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        let token = CachedToken {
            access_token: "token".into(),
            expires_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        };
        write_token(&path, &token).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(read_token(&path).unwrap(), token);
    }

    #[test]
    fn missing_entry_is_an_error() {
        let home = tempfile::tempdir().unwrap();
        let path = get_path_in(home.path(), "https://example.com").unwrap();
        assert!(read_token(&path).is_err());
    }
}
