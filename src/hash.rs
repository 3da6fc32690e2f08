use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use sha1::{Digest, Sha1};

use crate::model::cli_error::CliError;

/// Lower-case hex SHA-1 of the file contents. This is what Discovery
/// records as `extracted_metadata.sha1`, and we use it as the document id.
pub fn hash_file(path: impl AsRef<Path>) -> Result<String, CliError> {
    let f = File::open(path)?;
    let mut reader = BufReader::new(f);

    let mut hasher = Sha1::new();

    let mut buf = [0u8; 8192];

    loop {
        let byte_count = reader.read(&mut buf)?;

        if byte_count == 0 {
            break;
        }

        hasher.update(&buf[..byte_count]);
    }

    Ok(hex::encode(hasher.finalize()))
}
