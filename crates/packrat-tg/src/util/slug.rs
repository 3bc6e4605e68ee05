/// Maximum length of a generated file name stem. Web page titles can get
/// absurdly long, and the file system has opinions about that.
const MAX_SLUG_LEN: usize = 80;

/// Turns an arbitrary string (usually a web page title) into a string that
/// is safe to use as a file name stem.
pub(crate) fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut prev_dash = true;

    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            prev_dash = false;
        } else if !prev_dash {
            slug.push('-');
            prev_dash = true;
        }

        if slug.len() >= MAX_SLUG_LEN {
            break;
        }
    }

    let slug = slug.trim_matches('-');

    if slug.is_empty() {
        return "untitled".to_owned();
    }

    slug.to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  multiple   spaces  "), "multiple-spaces");
        assert_eq!(slugify("Rust 2021: what's new?"), "rust-2021-what-s-new");
    }

    #[test]
    fn degenerate_input() {
        assert_eq!(slugify(""), "untitled");
        assert_eq!(slugify("???!!!"), "untitled");
        assert_eq!(slugify("цілком не аскі"), "untitled");
    }

    #[test]
    fn truncates_long_titles() {
        let long = "a".repeat(500);
        assert_eq!(slugify(&long).len(), MAX_SLUG_LEN);
    }
}
