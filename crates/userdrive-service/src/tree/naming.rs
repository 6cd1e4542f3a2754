//! Name policies: single-segment validation, extension handling for
//! renames, and collision candidates for uploads.

use userdrive_core::error::AppError;

/// Extension of `name` including the leading dot, or `""`.
///
/// The last dot counts only when something other than dots precedes it,
/// so `.env` and `..` have no extension while `archive.tar.gz` has `.gz`.
pub fn extension(name: &str) -> &str {
    split_extension(name).1
}

/// Split `name` into stem and extension (see [`extension`]).
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if name[..idx].bytes().any(|b| b != b'.') => name.split_at(idx),
        _ => (name, ""),
    }
}

/// Require `name` to be exactly one usable path segment.
pub fn validate_segment(name: &str) -> Result<(), AppError> {
    if name.is_empty() {
        return Err(AppError::validation("Name is required"));
    }
    if name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        return Err(AppError::validation("Name must not contain path separators"));
    }
    Ok(())
}

/// Final name for a file renamed from `old` to `requested`.
///
/// The original extension is kept: a requested name without an extension
/// gets it appended, the same extension is accepted as given, and any
/// other extension is refused. Files that had no extension take the
/// requested name verbatim.
pub fn renamed_file_name(old: &str, requested: &str) -> Result<String, AppError> {
    let old_ext = extension(old);
    if old_ext.is_empty() {
        return Ok(requested.to_string());
    }

    match extension(requested) {
        ext if ext == old_ext => Ok(requested.to_string()),
        "" => Ok(format!("{requested}{old_ext}")),
        _ => Err(AppError::validation(format!(
            "Changing the file extension is not allowed (expected {old_ext})"
        ))),
    }
}

/// The `attempt`-th candidate name for an upload: the name itself first,
/// then `stem (N)ext`.
pub fn candidate_name(name: &str, attempt: u32) -> String {
    if attempt == 0 {
        return name.to_string();
    }
    let (stem, ext) = split_extension(name);
    format!("{stem} ({attempt}){ext}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use userdrive_core::error::ErrorKind;

    #[test]
    fn test_extension_rules() {
        assert_eq!(extension("report.pdf"), ".pdf");
        assert_eq!(extension("archive.tar.gz"), ".gz");
        assert_eq!(extension("notes"), "");
        assert_eq!(extension(".env"), "");
        assert_eq!(extension(".."), "");
        assert_eq!(extension("trailing."), ".");
    }

    #[test]
    fn test_rename_keeps_extension() {
        assert_eq!(
            renamed_file_name("report.pdf", "summary").unwrap(),
            "summary.pdf"
        );
        assert_eq!(
            renamed_file_name("report.pdf", "summary.pdf").unwrap(),
            "summary.pdf"
        );
        let err = renamed_file_name("report.pdf", "summary.docx").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn test_rename_without_original_extension_is_verbatim() {
        assert_eq!(renamed_file_name("notes", "ideas.txt").unwrap(), "ideas.txt");
        assert_eq!(renamed_file_name(".env", "config").unwrap(), "config");
    }

    #[test]
    fn test_candidates() {
        assert_eq!(candidate_name("photo.png", 0), "photo.png");
        assert_eq!(candidate_name("photo.png", 2), "photo (2).png");
        assert_eq!(candidate_name("archive.tar.gz", 1), "archive.tar (1).gz");
        assert_eq!(candidate_name(".env", 1), ".env (1)");
        assert_eq!(candidate_name("README", 3), "README (3)");
    }

    #[test]
    fn test_segment_validation() {
        assert!(validate_segment("ok name.txt").is_ok());
        for bad in ["", ".", "..", "a/b", "a\\b", "a\0b"] {
            assert_eq!(
                validate_segment(bad).unwrap_err().kind,
                ErrorKind::Validation,
                "{bad:?}"
            );
        }
    }
}
