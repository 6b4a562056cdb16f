//! Object naming for stored card images

use std::path::Path;

/// Content-addressed object name: `{slot}_{hash}.{ext}`.
///
/// The same bytes uploaded to the same slot always map to the same object.
pub fn object_name(slot: u16, bytes: &[u8], source: &Path) -> String {
    let hash = blake3::hash(bytes).to_hex();
    format!("{}_{}.{}", slot, &hash.as_str()[..16], extension(source))
}

/// Last path segment of a public reference, without query string
pub fn object_name_from_url(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next()?;
    path.rsplit('/').next().filter(|name| !name.is_empty())
}

/// Content type sent with an upload
pub fn content_type(source: &Path) -> &'static str {
    match extension(source).as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => "image/png",
    }
}

fn extension(source: &Path) -> String {
    source
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| String::from("png"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_name_is_stable_for_same_bytes() {
        let a = object_name(12, b"card-bytes", Path::new("front.JPG"));
        let b = object_name(12, b"card-bytes", Path::new("other/front.jpg"));
        let c = object_name(12, b"other-bytes", Path::new("front.jpg"));

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("12_"));
        assert!(a.ends_with(".jpg"));
        assert_eq!(a.len(), "12_".len() + 16 + ".jpg".len());
    }

    #[test]
    fn test_object_name_from_url() {
        assert_eq!(
            object_name_from_url("https://p.supabase.co/storage/v1/object/public/cards/3_ab.png"),
            Some("3_ab.png")
        );
        assert_eq!(object_name_from_url("https://x/cards/3_ab.png?t=1"), Some("3_ab.png"));
        assert_eq!(object_name_from_url("https://x/cards/"), None);
    }

    #[test]
    fn test_content_type_fallback() {
        assert_eq!(content_type(Path::new("a.jpeg")), "image/jpeg");
        assert_eq!(content_type(Path::new("noext")), "image/png");
    }
}
