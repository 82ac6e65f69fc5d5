//! Path and domain rules. Every function here depends only on the record's
//! own `domain` and `relativePath`.

pub const APP_DOMAIN_PREFIX: &str = "AppDomain-";
pub const RESERVED_APP_NAMESPACE: &str = "com.apple";
pub const DOCUMENTS_PREFIX: &str = "Documents/";

pub const SHARED_DOMAIN: &str = "AppDomainGroup-group.com.apple.FileProvider.LocalStorage";
pub const PROVIDER_ROOT: &str = "File Provider Storage";
pub const PROVIDER_PREFIX: &str = "File Provider Storage/";
pub const TRASH_PREFIX: &str = ".Trash";
pub const DOWNLOADS_VARIANT: &str = "Downloads/";
pub const DOWNLOADS_CANONICAL: &str = "Download/";

pub const CAMERA_ROLL_DOMAIN: &str = "CameraRollDomain";
pub const DCIM_DIR: &str = "DCIM";
pub const THUMBNAILS_MARKER: &str = "Thumbnails";
pub const MEDIA_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "heic", "mov", "mp4"];

pub const NOTES_STORE_FILE: &str = "NoteStore.sqlite";
pub const NOTES_WAL_FILE: &str = "NoteStore.sqlite-wal";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NotesFile {
    Store,
    Wal,
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

pub fn strip_documents_prefix(path: &str) -> &str {
    path.strip_prefix(DOCUMENTS_PREFIX).unwrap_or(path)
}

pub fn strip_provider_prefix(path: &str) -> &str {
    path.strip_prefix(PROVIDER_PREFIX).unwrap_or(path)
}

/// Rename a top-level `Downloads/` folder to the target's `Download/`.
pub fn normalize_downloads(path: &str) -> String {
    match path.strip_prefix(DOWNLOADS_VARIANT) {
        Some(rest) => format!("{DOWNLOADS_CANONICAL}{rest}"),
        None => path.to_string(),
    }
}

/// Installed-app identifier for an `AppDomain-<id>` domain outside the
/// reserved vendor namespace.
pub fn app_id(domain: &str) -> Option<&str> {
    if !domain.starts_with(APP_DOMAIN_PREFIX) {
        return None;
    }
    let id = domain.rsplit('-').next().filter(|s| !s.is_empty())?;
    let reserved = id == RESERVED_APP_NAMESPACE
        || id
            .strip_prefix(RESERVED_APP_NAMESPACE)
            .is_some_and(|rest| rest.starts_with('.'));
    (!reserved).then_some(id)
}

pub fn app_document_path(relative_path: &str) -> Option<String> {
    if !relative_path.starts_with(DOCUMENTS_PREFIX) {
        return None;
    }
    let path = strip_provider_prefix(strip_documents_prefix(relative_path));
    is_plain_relative(path).then(|| path.to_string())
}

pub fn shared_document_path(domain: &str, relative_path: &str) -> Option<String> {
    if domain != SHARED_DOMAIN {
        return None;
    }
    if relative_path == PROVIDER_ROOT || relative_path == PROVIDER_PREFIX {
        return None;
    }
    if relative_path
        .split('/')
        .any(|seg| seg.starts_with(TRASH_PREFIX))
    {
        return None;
    }
    let path = normalize_downloads(strip_provider_prefix(relative_path));
    is_plain_relative(&path).then_some(path)
}

/// Non-empty, relative, and made only of real names: no empty, `.` or `..`
/// segments that would move a destination outside its root.
pub fn is_plain_relative(path: &str) -> bool {
    !path.is_empty()
        && path
            .split('/')
            .all(|seg| !seg.is_empty() && seg != "." && seg != "..")
}

pub fn is_media_extension(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => MEDIA_EXTENSIONS
            .iter()
            .any(|allowed| ext.eq_ignore_ascii_case(allowed)),
        _ => false,
    }
}

/// Display name for a camera-roll original under DCIM.
pub fn media_file_name<'a>(domain: &str, relative_path: &'a str) -> Option<&'a str> {
    if domain != CAMERA_ROLL_DOMAIN {
        return None;
    }
    let segments: Vec<&str> = relative_path.split('/').collect();
    let (name, dirs) = segments.split_last()?;
    if !dirs.contains(&DCIM_DIR) {
        return None;
    }
    if segments.iter().any(|seg| seg.contains(THUMBNAILS_MARKER)) {
        return None;
    }
    is_media_extension(name).then_some(*name)
}

pub fn notes_file(relative_path: &str) -> Option<NotesFile> {
    match file_name(relative_path) {
        NOTES_STORE_FILE => Some(NotesFile::Store),
        NOTES_WAL_FILE => Some(NotesFile::Wal),
        _ => None,
    }
}
