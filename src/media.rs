//! Poster file storage.
//!
//! Uploaded images land in a media directory served statically under
//! `/media`; the movie record keeps the public path as its image reference.

use std::path::{Path, PathBuf};

use uuid::Uuid;

pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes the poster bytes and returns the public `/media/...` path.
    pub async fn save_poster(
        &self,
        movie_id: i64,
        extension: &str,
        bytes: &[u8],
    ) -> std::io::Result<String> {
        let filename = format!("movie-{movie_id}-{}.{extension}", Uuid::new_v4());
        tokio::fs::write(self.root.join(&filename), bytes).await?;
        Ok(format!("/media/{filename}"))
    }
}

/// Sniffs the image format from magic bytes. Returns the file extension, or
/// `None` for anything that is not a supported image.
pub fn image_extension(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("jpg")
    } else if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        Some("png")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("gif")
    } else if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
        Some("webp")
    } else {
        None
    }
}
