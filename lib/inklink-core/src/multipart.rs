//! Multipart form data for avatar and story image uploads.
//!
//! # Example
//!
//! ```
//! use inklink_core::{Form, Part};
//!
//! let form = Form::new().part(Part::file("file", "cover.png", vec![0x89, 0x50]));
//! assert!(form.content_type().starts_with("multipart/form-data; boundary="));
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::{BufMut, Bytes, BytesMut};

const BOUNDARY_PREFIX: &str = "----InkLinkFormBoundary";

/// One named field: a plain value or an uploaded file.
#[derive(Debug, Clone)]
pub struct Part {
    name: String,
    upload: Option<Upload>,
    data: Bytes,
}

#[derive(Debug, Clone)]
struct Upload {
    filename: String,
    mime: String,
}

impl Part {
    /// Plain value field.
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            upload: None,
            data: Bytes::from(value.into()),
        }
    }

    /// File field. The MIME type follows the image extension of `filename`.
    #[must_use]
    pub fn file(
        name: impl Into<String>,
        filename: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        let filename = filename.into();
        let mime = mime_for(&filename).to_string();
        Self {
            name: name.into(),
            upload: Some(Upload { filename, mime }),
            data: data.into(),
        }
    }

    /// Force the MIME type of a file field. No effect on value fields.
    #[must_use]
    pub fn with_content_type(mut self, mime: impl Into<String>) -> Self {
        if let Some(upload) = &mut self.upload {
            upload.mime = mime.into();
        }
        self
    }

    /// Field name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Filename of a file field.
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.upload.as_ref().map(|upload| upload.filename.as_str())
    }

    /// MIME type of a file field.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.upload.as_ref().map(|upload| upload.mime.as_str())
    }

    /// Field content.
    #[must_use]
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    fn write_to(&self, boundary: &str, buf: &mut BytesMut) {
        let mut head = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{}\"",
            self.name
        );
        if let Some(upload) = &self.upload {
            head.push_str(&format!(
                "; filename=\"{}\"\r\nContent-Type: {}",
                upload.filename, upload.mime
            ));
        }
        head.push_str("\r\n\r\n");

        buf.put_slice(head.as_bytes());
        buf.put_slice(&self.data);
        buf.put_slice(b"\r\n");
    }
}

// Uploads are images; anything else goes as raw bytes.
fn mime_for(filename: &str) -> &'static str {
    let Some((_, extension)) = filename.rsplit_once('.') else {
        return "application/octet-stream";
    };
    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        _ => "application/octet-stream",
    }
}

/// Ordered multipart fields and their boundary. Repeated names are allowed.
#[derive(Debug, Clone)]
pub struct Form {
    boundary: String,
    parts: Vec<Part>,
}

impl Default for Form {
    fn default() -> Self {
        Self::new()
    }
}

impl Form {
    /// Empty form with a fresh boundary.
    #[must_use]
    pub fn new() -> Self {
        Self::with_boundary(fresh_boundary())
    }

    /// Empty form with a fixed boundary.
    #[must_use]
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            parts: Vec::new(),
        }
    }

    /// Add `part` after the existing ones.
    #[must_use]
    pub fn part(mut self, part: Part) -> Self {
        self.parts.push(part);
        self
    }

    /// Add a plain value field.
    #[must_use]
    pub fn text(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.part(Part::text(name, value))
    }

    /// Add a file field.
    #[must_use]
    pub fn file(
        self,
        name: impl Into<String>,
        filename: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        self.part(Part::file(name, filename, data))
    }

    /// Boundary.
    #[must_use]
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Fields in order.
    #[must_use]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// `Content-Type` header value for this form.
    #[must_use]
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Header value and encoded body.
    #[must_use]
    pub fn into_body(self) -> (String, Bytes) {
        let mut buf = BytesMut::new();
        for part in &self.parts {
            part.write_to(&self.boundary, &mut buf);
        }
        buf.put_slice(format!("--{}--\r\n", self.boundary).as_bytes());

        (self.content_type(), buf.freeze())
    }
}

fn fresh_boundary() -> String {
    static SEQUENCE: AtomicU64 = AtomicU64::new(0);

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos());
    let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{BOUNDARY_PREFIX}{nanos:x}{sequence:x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_part_is_not_an_upload() {
        let part = Part::text("caption", "A rainy night");
        assert_eq!(part.name(), "caption");
        assert_eq!(part.data().as_ref(), b"A rainy night");
        assert!(part.content_type().is_none());
        assert!(part.filename().is_none());

        let forced = part.with_content_type("text/markdown");
        assert!(forced.content_type().is_none());
    }

    #[test]
    fn file_part_mime_from_extension() {
        let part = Part::file("file", "Avatar.JPG", vec![0xFF, 0xD8]);
        assert_eq!(part.filename(), Some("Avatar.JPG"));
        assert_eq!(part.content_type(), Some("image/jpeg"));

        let part = Part::file("file", "noextension", vec![1]);
        assert_eq!(part.content_type(), Some("application/octet-stream"));

        let part = Part::file("file", "notes.txt", vec![1]);
        assert_eq!(part.content_type(), Some("application/octet-stream"));

        let part = Part::file("file", "cover.bin", vec![1]).with_content_type("image/heic");
        assert_eq!(part.content_type(), Some("image/heic"));
    }

    #[test]
    fn boundaries_are_unique() {
        let a = Form::new();
        let b = Form::new();
        assert!(a.parts().is_empty());
        assert!(a.boundary().starts_with(BOUNDARY_PREFIX));
        assert_ne!(a.boundary(), b.boundary());
    }

    #[test]
    fn repeated_field_names_are_kept() {
        let form = Form::new()
            .file("files", "a.png", vec![1])
            .file("files", "b.png", vec![2]);

        let names: Vec<_> = form.parts().iter().map(Part::name).collect();
        assert_eq!(names, ["files", "files"]);
    }

    #[test]
    fn wire_layout() {
        let (content_type, body) = Form::with_boundary("xyz")
            .text("title", "Dawn")
            .file("file", "cover.png", "PNGDATA")
            .into_body();

        assert_eq!(content_type, "multipart/form-data; boundary=xyz");
        assert_eq!(
            String::from_utf8_lossy(&body),
            "--xyz\r\n\
             Content-Disposition: form-data; name=\"title\"\r\n\r\n\
             Dawn\r\n\
             --xyz\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"cover.png\"\r\n\
             Content-Type: image/png\r\n\r\n\
             PNGDATA\r\n\
             --xyz--\r\n"
        );
    }
}
