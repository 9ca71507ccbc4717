//! Slug generation for categories, products and sellers

/// Derive a URL-safe slug from a human-readable name.
///
/// Lowercases ASCII letters, keeps digits, collapses every other run of
/// characters into a single hyphen, and trims hyphens at both ends.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_hyphen = true;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_hyphenates() {
        assert_eq!(slugify("Gaming Laptop 15"), "gaming-laptop-15");
    }

    #[test]
    fn collapses_punctuation_runs() {
        assert_eq!(slugify("A -- weird / name!"), "a-weird-name");
    }

    #[test]
    fn trims_leading_and_trailing_separators() {
        assert_eq!(slugify("  padded  "), "padded");
        assert_eq!(slugify("!!!"), "");
    }
}
