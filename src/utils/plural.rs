//! Pluralization for report lines.

/// `""` for exactly one, `"s"` otherwise.
#[inline]
pub fn plural_s(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// `"1 fragment"`, `"3 fragments"`.
#[inline]
pub fn plural_count(count: usize, noun: &str) -> String {
    format!("{count} {noun}{}", plural_s(count))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural_count() {
        assert_eq!(plural_count(0, "fragment"), "0 fragments");
        assert_eq!(plural_count(1, "fragment"), "1 fragment");
        assert_eq!(plural_count(12, "heading"), "12 headings");
    }
}
