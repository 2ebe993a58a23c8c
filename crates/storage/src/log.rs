//! Durable key/value log.
//!
//! Plain text, one key line followed by one value line per entry. The whole
//! file is rewritten on each mutation: the new contents go to a sibling
//! `.tmp` file which is then renamed over the log, so a reader sees either
//! the old or the new log and never a torn one.

use crate::error::Result;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct DurableLog {
    path: PathBuf,
}

impl DurableLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every entry. A missing file is an empty log.
    pub fn load(&self) -> Result<BTreeMap<String, String>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = BTreeMap::new();
        let mut lines = contents.lines();
        while let Some(key) = lines.next() {
            match lines.next() {
                Some(value) => {
                    entries.insert(key.to_string(), value.to_string());
                }
                None => warn!(path = %self.path.display(), key, "ignoring key without value"),
            }
        }
        Ok(entries)
    }

    /// Replace the log with `entries`.
    pub fn rewrite(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let mut contents = String::new();
        for (key, value) in entries {
            contents.push_str(key);
            contents.push('\n');
            contents.push_str(value);
            contents.push('\n');
        }

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let tmp = self.tmp_path();
        {
            let mut file = File::create(&tmp)?;
            file.write_all(contents.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), entries = entries.len(), "log rewritten");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}
