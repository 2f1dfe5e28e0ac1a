use std::path::Path;

/// lowercased extension of a path without the leading dot, or an empty string
pub(crate) fn extension(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}
