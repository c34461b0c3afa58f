/// Scheduler-safe name for a slug: the repository segment, lowercased, with
/// anything outside `[a-z0-9-]` replaced by `-`.
///
/// A slug without `/` is sanitized whole.
pub fn sanitize_app_name(slug: &str) -> String {
    let repo = slug.split('/').nth(1).unwrap_or(slug);

    repo.to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' => c,
            _ => '-',
        })
        .collect()
}

/// `owner/repo` with both segments non-empty and no further `/`
pub fn is_valid_slug(slug: &str) -> bool {
    match slug.split_once('/') {
        Some((owner, repo)) => !owner.is_empty() && !repo.is_empty() && !repo.contains('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_app_name() {
        assert_eq!(sanitize_app_name("user/My_App@Name!"), "my-app-name-");
        assert_eq!(sanitize_app_name("acme/web-frontend"), "web-frontend");
        assert_eq!(sanitize_app_name("Acme/API.v2"), "api-v2");
    }

    #[test]
    fn test_sanitize_ignores_owner() {
        assert_eq!(
            sanitize_app_name("Some_Org/repo"),
            sanitize_app_name("other/repo")
        );
    }

    #[test]
    fn test_sanitize_non_ascii() {
        assert_eq!(sanitize_app_name("user/café"), "caf-");
    }

    #[test]
    fn test_sanitize_without_slash() {
        assert_eq!(sanitize_app_name("Standalone"), "standalone");
    }

    #[test]
    fn test_is_valid_slug() {
        assert!(is_valid_slug("owner/repo"));
        assert!(!is_valid_slug("owner"));
        assert!(!is_valid_slug("/repo"));
        assert!(!is_valid_slug("owner/"));
        assert!(!is_valid_slug("owner/repo/extra"));
        assert!(!is_valid_slug(""));
    }
}
