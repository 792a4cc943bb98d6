//! Extension → MIME label table for the editor

/// Returned for any extension not in the table
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

const MIME_TYPES: &[(&str, &str)] = &[
    ("js", "application/javascript"),
    ("ts", "application/typescript"),
    ("html", "text/html"),
    ("css", "text/css"),
    ("json", "application/json"),
    ("md", "text/markdown"),
    ("txt", "text/plain"),
    ("py", "text/x-python"),
    ("sh", "text/x-sh"),
    ("php", "text/x-php"),
];

/// Look up a lower-cased extension
pub fn content_type_for(file_type: &str) -> &'static str {
    MIME_TYPES
        .iter()
        .find(|(ext, _)| *ext == file_type)
        .map_or(DEFAULT_CONTENT_TYPE, |&(_, mime)| mime)
}

/// Lower-cased text after the last `.` of the final path segment, or `""`.
pub fn file_type_of(path: &str) -> String {
    file_name_of(path)
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default()
}

/// Final path segment
pub fn file_name_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
