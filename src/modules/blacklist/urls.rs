use std::sync::LazyLock;

use regex::Regex;

static SEPARATORS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"[\s<>"'`,;!?()]+"#).ok());

static URL_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^((https?://)?(www\.)?([a-zA-Z0-9-]+\.)+[a-zA-Z]{2,})(/\S*)?$").ok()
});

/// Collects the URL-looking words of `text`, de-duplicated in first-seen order.
pub fn extract_urls(text: &str) -> Vec<String> {
    let (Some(separators), Some(pattern)) = (SEPARATORS.as_ref(), URL_PATTERN.as_ref()) else {
        return Vec::new();
    };
    let mut urls: Vec<String> = Vec::new();
    for word in separators.split(text) {
        if word.is_empty() || !pattern.is_match(word) {
            continue;
        }
        if !urls.iter().any(|seen| seen == word) {
            urls.push(word.to_string());
        }
    }
    urls
}

/// URLs found across several text fields, de-duplicated across all of them.
pub fn extract_urls_from(texts: &[&str]) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    for text in texts {
        for url in extract_urls(text) {
            if !urls.contains(&url) {
                urls.push(url);
            }
        }
    }
    urls
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_bare_and_schemed_urls() {
        let urls = extract_urls("see www.example.com, then http://foo.bar.io/path (or evil.org)!");
        assert_eq!(
            urls,
            vec!["www.example.com", "http://foo.bar.io/path", "evil.org"]
        );
    }

    #[test]
    fn ignores_non_urls_and_duplicates() {
        let urls = extract_urls("hello world, a.b is short; example.com example.com <example.com>");
        assert_eq!(urls, vec!["example.com"]);
        assert!(extract_urls("").is_empty());
        assert!(extract_urls("no links here at all").is_empty());
    }

    #[test]
    fn dedupes_across_fields() {
        let urls = extract_urls_from(&["bob@doar.com", "visit spam.net", "spam.net again"]);
        // the address itself is not a URL: the '@' breaks the host pattern
        assert_eq!(urls, vec!["spam.net"]);
    }
}
