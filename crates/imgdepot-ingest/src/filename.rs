//! Generated storage name construction.
//!
//! Names are `<uuid>.<extension>`; the UUID is fresh per call and the
//! extension is sanitized rather than trusted, since the client filename is
//! attacker-controlled.

use uuid::Uuid;

const MAX_EXTENSION_LENGTH: usize = 16;

/// Extract a filesystem-safe extension from the client-supplied filename.
///
/// Takes the final dot-segment of the basename, keeps ASCII alphanumerics
/// only (case preserved), and gives up (`None`) when the result is empty or
/// implausibly long. Dotfiles like `.env` are treated as having no extension.
pub(crate) fn sanitized_extension(original_filename: &str) -> Option<String> {
    let basename = std::path::Path::new(original_filename)
        .file_name()?
        .to_str()?;

    let (stem, extension) = basename.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }

    let cleaned: String = extension
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();

    if cleaned.is_empty() || cleaned.len() > MAX_EXTENSION_LENGTH {
        return None;
    }

    Some(cleaned)
}

/// Generate a collision-resistant storage name for an upload.
pub(crate) fn generated_name(original_filename: &str) -> String {
    let id = Uuid::new_v4();
    match sanitized_extension(original_filename) {
        Some(extension) => format!("{}.{}", id, extension),
        None => id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_preserved_with_case() {
        assert_eq!(sanitized_extension("photo.JPG").as_deref(), Some("JPG"));
        assert_eq!(sanitized_extension("photo.jpg").as_deref(), Some("jpg"));
    }

    #[test]
    fn missing_extension_is_omitted() {
        assert_eq!(sanitized_extension("photo"), None);
        assert_eq!(sanitized_extension(""), None);
        assert_eq!(sanitized_extension(".env"), None);
    }

    #[test]
    fn unsafe_characters_are_stripped() {
        assert_eq!(sanitized_extension("a.j p:g").as_deref(), Some("jpg"));
        // path separators cut the basename first; "ng" has no dot
        assert_eq!(sanitized_extension("evil.p/ng"), None);
        assert_eq!(sanitized_extension("x.!!!"), None);
    }

    #[test]
    fn overlong_extension_is_rejected() {
        let name = format!("photo.{}", "a".repeat(MAX_EXTENSION_LENGTH + 1));
        assert_eq!(sanitized_extension(&name), None);
    }

    #[test]
    fn generated_name_is_uuid_plus_extension() {
        let name = generated_name("photo.jpg");
        let (stem, extension) = name.rsplit_once('.').expect("has extension");
        assert!(Uuid::parse_str(stem).is_ok());
        assert_eq!(extension, "jpg");
    }

    #[test]
    fn generated_name_without_extension_is_bare_uuid() {
        let name = generated_name("photo");
        assert!(Uuid::parse_str(&name).is_ok());
    }

    #[test]
    fn generated_names_are_unique_per_call() {
        let a = generated_name("photo.jpg");
        let b = generated_name("photo.jpg");
        assert_ne!(a, b);
    }
}
