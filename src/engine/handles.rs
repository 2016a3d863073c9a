use std::{collections::HashMap, fmt};

use tracing::debug;

const BLOB_PREFIX: &str = "blob:remix-studio/";

/// URL-like reference to a finished clip.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlaybackHandle {
    /// Bytes held by a [`HandleStore`]; must be released.
    Blob(String),
    /// A static asset somewhere else; nothing to release.
    Remote(String),
}

impl PlaybackHandle {
    pub fn url(&self) -> &str {
        match self {
            PlaybackHandle::Blob(url) | PlaybackHandle::Remote(url) => url,
        }
    }

    pub fn needs_release(&self) -> bool {
        matches!(self, PlaybackHandle::Blob(_))
    }
}

impl fmt::Display for PlaybackHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url())
    }
}

/// In-memory backing for blob handles.
#[derive(Debug, Default)]
pub struct HandleStore {
    blobs: HashMap<String, Vec<u8>>,
    next: u64,
}

impl HandleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, bytes: Vec<u8>) -> PlaybackHandle {
        let url = format!("{BLOB_PREFIX}{}", self.next);
        self.next += 1;
        debug!(url = %url, bytes = bytes.len(), "blob created");
        self.blobs.insert(url.clone(), bytes);
        PlaybackHandle::Blob(url)
    }

    /// Bytes behind a live blob handle. Remote and released handles resolve
    /// to nothing.
    pub fn resolve(&self, handle: &PlaybackHandle) -> Option<&[u8]> {
        match handle {
            PlaybackHandle::Blob(url) => self.blobs.get(url).map(Vec::as_slice),
            PlaybackHandle::Remote(_) => None,
        }
    }

    /// Free a blob. Returns whether anything was freed.
    pub fn release(&mut self, handle: &PlaybackHandle) -> bool {
        match handle {
            PlaybackHandle::Blob(url) => {
                let freed = self.blobs.remove(url).is_some();
                if freed {
                    debug!(url = %url, "blob released");
                }
                freed
            }
            PlaybackHandle::Remote(_) => false,
        }
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blobs_resolve_until_released() {
        let mut store = HandleStore::new();
        let a = store.create(vec![1, 2, 3]);
        let b = store.create(vec![4]);

        assert_eq!(a.url(), "blob:remix-studio/0");
        assert_eq!(b.to_string(), "blob:remix-studio/1");
        assert_eq!(store.resolve(&a), Some(&[1u8, 2, 3][..]));
        assert_eq!(store.len(), 2);

        assert!(store.release(&a));
        assert!(!store.release(&a));
        assert!(store.resolve(&a).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn remote_handles_need_no_release() {
        let mut store = HandleStore::new();
        let remote = PlaybackHandle::Remote("https://example.com/a.mp3".into());
        assert!(!remote.needs_release());
        assert!(store.resolve(&remote).is_none());
        assert!(!store.release(&remote));
        assert!(store.is_empty());
    }
}
