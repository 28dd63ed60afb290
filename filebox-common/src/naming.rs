//! Stored-name scheme for uploaded files.
//!
//! Every upload lands directly under the base directory as
//! `{unix_seconds} - {original_name}`. Two uploads of the same name within
//! the same second map to the same stored name.

use crate::error::StoreError;

const SEPARATOR: &str = " - ";

/// Compute the stored name for an upload received at `timestamp`.
pub fn stored_name(timestamp: i64, original_name: &str) -> String {
    format!("{}{}{}", timestamp, SEPARATOR, original_name)
}

/// Reduce a client-supplied filename to its final path component, so
/// `C:\Users\x\a.txt` becomes `a.txt` and `../../etc/passwd` becomes
/// `passwd`.
pub fn upload_basename(original_name: &str) -> Result<&str, StoreError> {
    let name = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_name);

    if name.is_empty() || name == "." || name == ".." || name.contains('\0') {
        return Err(StoreError::InvalidName(original_name.to_string()));
    }
    Ok(name)
}

/// Check that a name requested for download is a single flat path segment.
pub fn validate_stored_name(name: &str) -> Result<(), StoreError> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0'])
    {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_name_format() {
        assert_eq!(stored_name(1700000000, "greeting.txt"), "1700000000 - greeting.txt");
        assert_eq!(stored_name(0, "a b.png"), "0 - a b.png");
    }

    #[test]
    fn test_upload_basename_strips_directories() {
        assert_eq!(upload_basename("report.pdf").unwrap(), "report.pdf");
        assert_eq!(upload_basename("../../etc/passwd").unwrap(), "passwd");
        assert_eq!(upload_basename("C:\\Users\\me\\notes.txt").unwrap(), "notes.txt");
        assert_eq!(upload_basename("dir/sub/..hidden").unwrap(), "..hidden");
    }

    #[test]
    fn test_upload_basename_rejects_unusable_names() {
        for bad in ["", "dir/", "..", "a/..", ".", "nul\0byte"] {
            assert!(
                matches!(upload_basename(bad), Err(StoreError::InvalidName(_))),
                "expected {:?} to be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_validate_stored_name() {
        assert!(validate_stored_name("1700000000 - greeting.txt").is_ok());
        assert!(validate_stored_name("..hidden").is_ok());
        for bad in ["", ".", "..", "../secret", "a/b", "a\\b", "x\0y"] {
            assert!(validate_stored_name(bad).is_err(), "expected {:?} to be rejected", bad);
        }
    }
}
