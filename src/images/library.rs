/// Sorted list of the images in one folder, with a browsing index
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{GreditError, Result};

/// Extensions shown by the browser (compared case-insensitively)
pub const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "tga"];

#[derive(Debug, Clone, PartialEq)]
pub struct ImageLibrary {
    folder: PathBuf,
    images: Vec<PathBuf>,
    index: usize,
}

impl ImageLibrary {
    /// Scan `folder` (not its subfolders) for images and sort them by path.
    /// Hidden files are skipped.
    pub fn scan(folder: &Path) -> Result<Self> {
        let mut images = Vec::new();

        // Only the folder's direct children
        for entry in WalkDir::new(folder).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| {
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("directory loop"));
                GreditError::io(folder, source)
            })?;

            // Skip subfolders and anything else that is not a plain file
            if !entry.file_type().is_file() {
                continue;
            }

            // Skip dotfiles and unsupported extensions
            let name = entry.file_name().to_string_lossy();
            if name.starts_with('.') || !is_image_file(entry.path()) {
                continue;
            }

            images.push(entry.into_path());
        }

        // Browsing order is path order
        images.sort();
        log::info!("🔍 Found {} images in {}", images.len(), folder.display());

        Ok(Self {
            folder: folder.to_path_buf(),
            images,
            index: 0,
        })
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.images.get(self.index).map(PathBuf::as_path)
    }

    /// Jump to `index`. Out of range leaves the current index unchanged.
    pub fn select(&mut self, index: usize) -> Option<&Path> {
        if index >= self.images.len() {
            return None;
        }
        self.index = index;
        self.current_path()
    }

    /// Move forward, wrapping from the last image to the first.
    pub fn next(&mut self) -> Option<&Path> {
        if self.images.is_empty() {
            return None;
        }
        self.index = (self.index + 1) % self.images.len();
        self.current_path()
    }

    /// Move back, wrapping from the first image to the last.
    pub fn previous(&mut self) -> Option<&Path> {
        if self.images.is_empty() {
            return None;
        }
        let len = self.images.len();
        self.index = (self.index + len - 1) % len;
        self.current_path()
    }
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}
