//! # AST Cache
//!
//! Disk cache for parsed ASTs, keyed by content hash. Entries live under
//! `.cache/ast/` as `<hex-sha256>.ast` JSON files. A stored tree is a pure
//! function of its hash, so a stale concurrent write can only be replaced by
//! identical contents; writes go through a temporary sibling and a rename to
//! stay atomic.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::ParseMode;
use super::ast_types::Program;

/// Current cache schema version; entries below this are ignored and rewritten
pub const SCHEMA_VERSION: u32 = 1;

/// On-disk shape of one cache entry
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    hash: String,
    mode: String,
    ast: Program,
    meta: CacheMeta,
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheMeta {
    version: u32,
}

/// Handle on a cache directory
#[derive(Debug, Clone)]
pub struct AstCache {
    dir: PathBuf,
}

impl AstCache {
    /// Opens a cache rooted at `dir`, creating the directory lazily on write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Default location relative to the working directory
    pub fn default_dir() -> PathBuf {
        Path::new(".cache").join("ast")
    }

    fn entry_path(&self, hash: &str) -> PathBuf {
        self.dir.join(format!("{hash}.ast"))
    }

    /// Loads a cached AST. Returns `None` on miss, version mismatch, mode
    /// mismatch, or a corrupt entry; the caller re-parses and overwrites.
    pub fn load(&self, hash: &str, mode: ParseMode) -> Option<Program> {
        let path = self.entry_path(hash);
        let contents = fs::read_to_string(&path).ok()?;
        let entry: CacheEntry = match serde_json::from_str(&contents) {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("ignoring corrupt cache entry {}: {err}", path.display());
                return None;
            }
        };
        if entry.meta.version < SCHEMA_VERSION {
            return None;
        }
        if entry.hash != hash || entry.mode != mode.as_str() {
            return None;
        }
        Some(entry.ast)
    }

    /// Stores a freshly parsed AST under its hash (atomic write + rename)
    pub fn store(&self, hash: &str, mode: ParseMode, ast: &Program) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let entry = CacheEntry {
            hash: hash.to_string(),
            mode: mode.as_str().to_string(),
            ast: ast.clone(),
            meta: CacheMeta {
                version: SCHEMA_VERSION,
            },
        };
        let json = serde_json::to_string(&entry)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        let path = self.entry_path(hash);
        let tmp = self.dir.join(format!("{hash}.ast.tmp"));
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}
