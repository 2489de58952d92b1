//! Image lookup by symbolic name.

use std::collections::HashMap;

/// A loaded image, as far as layout is concerned.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInfo {
    pub name: String,
    pub width: f64,
    pub height: f64,
}

impl ImageInfo {
    pub fn new(name: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            name: name.into(),
            width,
            height,
        }
    }
}

/// Source of images. Returns `None` while an image is not loaded yet; every
/// caller skips the draw in that case.
pub trait ImageStore {
    fn image(&self, name: &str) -> Option<ImageInfo>;
}

/// An image store backed by a hash map, filled by the host as images load.
#[derive(Debug, Clone, Default)]
pub struct MemoryImageStore {
    images: HashMap<String, ImageInfo>,
}

impl MemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, info: ImageInfo) {
        log::debug!("Image '{}' loaded ({}x{})", info.name, info.width, info.height);
        self.images.insert(info.name.clone(), info);
    }

    pub fn remove(&mut self, name: &str) -> Option<ImageInfo> {
        self.images.remove(name)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl ImageStore for MemoryImageStore {
    fn image(&self, name: &str) -> Option<ImageInfo> {
        self.images.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_lookup() {
        let mut store = MemoryImageStore::new();
        assert!(store.image("gear").is_none());
        store.insert(ImageInfo::new("gear", 16.0, 16.0));
        assert_eq!(store.image("gear"), Some(ImageInfo::new("gear", 16.0, 16.0)));
        assert_eq!(store.len(), 1);
        store.remove("gear");
        assert!(store.is_empty());
    }
}
