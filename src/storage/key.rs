//! API key file
//!
//! The key lives in the first line of a plain text file in the addon's data
//! directory. Without it the sync pipeline never starts.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use tracing::warn;

/// Default key file name inside the data directory
pub const DEFAULT_KEY_FILE: &str = "addon.key";

/// Reads the key from the first line of `path`
///
/// A missing file, an empty file or a blank first line all mean "no key".
pub fn read_key(path: &Path) -> Option<String> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return None,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Failed to open key file");
            return None;
        }
    };

    let mut line = String::new();
    if let Err(err) = BufReader::new(file).read_line(&mut line) {
        warn!(path = %path.display(), error = %err, "Failed to read key file");
        return None;
    }

    let key = line.trim();
    if key.is_empty() {
        None
    } else {
        Some(key.to_string())
    }
}
