/// Item type classification for analysed files.
///
/// The MIME type reported by the drop source wins. Sources that do not
/// report one (the filesystem walker, most pickers on Linux) fall back to
/// the file extension.

/// Broad item categories shown in the selection list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemType {
    Directory,
    Audio,
    Video,
    Text,
    Executable,
    Image,
    Other,
}

impl ItemType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Directory => "Directory",
            Self::Audio => "Audio",
            Self::Video => "Video",
            Self::Text => "Text",
            Self::Executable => "Executable",
            Self::Image => "Image",
            Self::Other => "Other",
        }
    }
}

/// Classify by MIME type; `None` when the MIME type says nothing useful.
pub fn classify_mime(mime: &str) -> Option<ItemType> {
    let mime = mime.trim();
    if mime.is_empty() || mime == "application/octet-stream" {
        return None;
    }
    if mime == "directory" {
        return Some(ItemType::Directory);
    }
    Some(if mime.starts_with("audio/") {
        ItemType::Audio
    } else if mime.starts_with("video/") {
        ItemType::Video
    } else if mime.starts_with("text/") || mime == "application/pdf" {
        ItemType::Text
    } else if mime == "application/x-msdownload" || mime == "application/x-executable" {
        ItemType::Executable
    } else if mime.starts_with("image/") {
        ItemType::Image
    } else {
        ItemType::Other
    })
}

/// Classify by lower-cased extension.
pub fn classify_extension(ext: &str) -> ItemType {
    match ext.to_ascii_lowercase().as_str() {
        "mp3" | "wav" | "flac" | "aac" | "ogg" | "wma" | "m4a" | "opus" => ItemType::Audio,
        "mp4" | "mkv" | "avi" | "mov" | "wmv" | "flv" | "webm" | "m4v" | "mpg" | "mpeg" => {
            ItemType::Video
        }
        "txt" | "md" | "csv" | "log" | "pdf" | "rtf" | "json" | "xml" | "html" | "css" | "js"
        | "ts" | "rs" | "py" | "toml" | "yaml" | "yml" => ItemType::Text,
        "exe" | "msi" | "bat" | "cmd" | "com" | "app" | "bin" => ItemType::Executable,
        "jpg" | "jpeg" | "png" | "gif" | "bmp" | "svg" | "webp" | "ico" | "tiff" | "tif"
        | "heic" => ItemType::Image,
        _ => ItemType::Other,
    }
}

/// Lower-cased extension of a file name, or empty.
pub fn extension_of(name: &str) -> String {
    std::path::Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Classify a file from its name and (possibly empty) MIME type.
pub fn classify(name: &str, mime: &str) -> ItemType {
    classify_mime(mime).unwrap_or_else(|| classify_extension(&extension_of(name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_wins_over_extension() {
        assert_eq!(classify("song.txt", "audio/mpeg"), ItemType::Audio);
        assert_eq!(classify("doc.bin", "application/pdf"), ItemType::Text);
        assert_eq!(classify("x", "application/x-msdownload"), ItemType::Executable);
        assert_eq!(classify("x", "application/zip"), ItemType::Other);
    }

    #[test]
    fn test_extension_fallback() {
        assert_eq!(classify("photo.JPG", ""), ItemType::Image);
        assert_eq!(classify("clip.webm", "application/octet-stream"), ItemType::Video);
        assert_eq!(classify("README", ""), ItemType::Other);
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("Archive.TAR.GZ"), "gz");
        assert_eq!(extension_of("Makefile"), "");
        assert_eq!(extension_of(".bashrc"), "");
    }
}
