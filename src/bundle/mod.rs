//! Bundle graph view
//!
//! Read-only description of the chunks emitted by a completed bundling pass
//! and the import edges between them, as handed over by the host bundler at
//! write-event time. Nothing in this crate mutates a [`Bundle`].

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single emitted chunk and its direct imports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputChunk {
    /// Keys of the chunks this chunk imports, in declaration order.
    #[serde(default)]
    pub imports: Vec<String>,
}

impl OutputChunk {
    /// Create a chunk from its direct import keys.
    pub fn new<I, S>(imports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            imports: imports.into_iter().map(Into::into).collect(),
        }
    }

    /// A chunk with no imports.
    pub fn leaf() -> Self {
        Self::default()
    }
}

/// The chunk graph for one bundle-write event.
///
/// Keys enumerate in the order the host bundler inserted them, and the write
/// pass processes chunks in exactly that order. Every key referenced by a
/// chunk's `imports` must itself be present as a top-level entry; the host
/// bundler guarantees this.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bundle {
    chunks: IndexMap<String, OutputChunk>,
}

impl Bundle {
    /// Create an empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a chunk under its key, preserving insertion order.
    pub fn insert(&mut self, key: impl Into<String>, chunk: OutputChunk) {
        self.chunks.insert(key.into(), chunk);
    }

    /// Look up a chunk by key.
    pub fn get(&self, key: &str) -> Option<&OutputChunk> {
        self.chunks.get(key)
    }

    /// Direct import keys of `key`, in declaration order.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not present in the bundle. An import edge pointing
    /// at a missing chunk violates the host bundler's graph contract and is a
    /// caller bug, not a runtime condition to recover from.
    pub fn imports_of(&self, key: &str) -> &[String] {
        match self.chunks.get(key) {
            Some(chunk) => &chunk.imports,
            None => panic!("chunk `{}` is not present in the bundle", key),
        }
    }

    /// Chunk keys in host-enumeration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.chunks.keys().map(String::as_str)
    }

    /// Number of chunks in the bundle.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Check if the bundle has no chunks.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Per-event output options supplied by the host bundler.
#[derive(Debug, Clone)]
pub struct OutputOptions {
    /// Base directory where chunk keys live on disk; relative script paths
    /// are computed from here.
    pub dir: PathBuf,
}

impl OutputOptions {
    /// Create options anchored at the given output directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}
