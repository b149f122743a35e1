//! Slug derivation
//!
//! A slug is the public lookup key of an article. It is derived from the title
//! once, at creation time (or when the title changes), and must be unique in the
//! `articles` table. Collisions are resolved by the caller with
//! [`with_random_suffix`]; nothing here touches the database.

use rand::Rng;

/// Length of the random collision suffix
pub const SUFFIX_LEN: usize = 8;

/// Slug used when a title contains no usable characters
pub const EMPTY_TITLE_SLUG: &str = "post";

const SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Path segments under `/api/blog/` that belong to fixed routes
///
/// An article with one of these slugs could never be fetched by slug, so the
/// storage layer treats them as already taken.
pub const RESERVED_SLUGS: [&str; 6] = [
    "stats",
    "categories",
    "generate",
    "bulk-generate",
    "update-content",
    "auto-publish",
];

/// Derive a slug from a title.
///
/// Splits the title on whitespace, drops punctuation inside each word,
/// transliterates what is left to lower-case ASCII and joins the words with
/// hyphens. Runs of hyphens collapse to one and leading/trailing hyphens are
/// trimmed, so applying `slugify` to its own output is a no-op.
///
/// # Examples
/// ```
/// use stdg_common::slug::slugify;
///
/// assert_eq!(
///     slugify("Best CRM Software for Small Business 2025"),
///     "best-crm-software-for-small-business-2025"
/// );
/// assert_eq!(slugify("Pros & Cons: HubSpot"), "pros-cons-hubspot");
/// assert_eq!(slugify("Ünïcödé Tools Guide"), "unicode-tools-guide");
/// ```
pub fn slugify(title: &str) -> String {
    let slug = title
        .split_whitespace()
        .map(|word| {
            let kept: String = word
                .chars()
                .filter(|c| c.is_alphanumeric() || *c == '-')
                .collect();
            ::slug::slugify(kept)
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if slug.is_empty() {
        EMPTY_TITLE_SLUG.to_string()
    } else {
        slug
    }
}

/// Whether `slug` collides with a fixed route
pub fn is_reserved(slug: &str) -> bool {
    RESERVED_SLUGS.contains(&slug)
}

/// Generate a random lowercase alphanumeric suffix of [`SUFFIX_LEN`] characters
pub fn random_suffix() -> String {
    let mut rng = rand::thread_rng();
    (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect()
}

/// Append a fresh random suffix to a base slug (`base-xxxxxxxx`)
pub fn with_random_suffix(base: &str) -> String {
    format!("{}-{}", base, random_suffix())
}

/// True when `s` only contains characters allowed in a slug
pub fn is_valid_slug(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_title() {
        assert_eq!(
            slugify("Top Project Management Tools Comparison"),
            "top-project-management-tools-comparison"
        );
    }

    #[test]
    fn test_punctuation_is_stripped() {
        assert_eq!(slugify("What's new in Notion? (2025)"), "whats-new-in-notion-2025");
        assert_eq!(slugify("E-commerce Platform Showdown"), "e-commerce-platform-showdown");
    }

    #[test]
    fn test_whitespace_runs_collapse() {
        assert_eq!(slugify("  CRM \t tools\n 101  "), "crm-tools-101");
        assert_eq!(slugify("A -- B"), "a-b");
    }

    #[test]
    fn test_idempotent_on_own_output() {
        let titles = [
            "Best CRM Software for Small Business 2025",
            "Pros & Cons: HubSpot vs. Salesforce!",
            "   leading and trailing   ",
            "Ünïcödé Tools Guide",
            "---",
            "",
        ];
        for title in titles {
            let once = slugify(title);
            assert_eq!(slugify(&once), once, "not idempotent for {:?}", title);
        }
    }

    #[test]
    fn test_output_charset() {
        let titles = ["Ünïcödé Tools Guide", "100% Free!!! #1 Tool", "日本語 title", "a_b.c/d"];
        for title in titles {
            let slug = slugify(title);
            assert!(is_valid_slug(&slug), "invalid slug {:?} from {:?}", slug, title);
        }
    }

    #[test]
    fn test_non_ascii_letters_are_transliterated() {
        assert_eq!(slugify("Ünïcödé Tools Guide"), "unicode-tools-guide");
        assert_eq!(slugify("Café Software Review"), "cafe-software-review");
    }

    #[test]
    fn test_reserved_slugs() {
        assert!(is_reserved("stats"));
        assert!(is_reserved(&slugify("Categories")));
        assert!(!is_reserved("stats-tools"));
        for reserved in RESERVED_SLUGS {
            assert!(is_valid_slug(reserved));
        }
    }

    #[test]
    fn test_empty_title_gets_placeholder() {
        assert_eq!(slugify(""), EMPTY_TITLE_SLUG);
        assert_eq!(slugify("!!!"), EMPTY_TITLE_SLUG);
    }

    #[test]
    fn test_random_suffix_shape() {
        let suffix = random_suffix();
        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(is_valid_slug(&suffix));
    }

    #[test]
    fn test_with_random_suffix_keeps_base() {
        let slug = with_random_suffix("crm-tools");
        assert!(slug.starts_with("crm-tools-"));
        assert_eq!(slug.len(), "crm-tools-".len() + SUFFIX_LEN);
        assert!(is_valid_slug(&slug));
        assert_eq!(slugify(&slug), slug);
    }
}
