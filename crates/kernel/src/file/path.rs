//! Image path parsing.

/// Extract the filename from a CDN URL or storage path.
///
/// Takes the last non-empty `/`-separated segment. Returns `None` when no
/// segment remains, or when the segment is `.` or `..`, which would
/// otherwise address a directory once joined into the storage URL.
pub fn image_filename(image_path: &str) -> Option<&str> {
    let name = image_path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .next_back()?;

    if name == "." || name == ".." {
        return None;
    }

    Some(name)
}
