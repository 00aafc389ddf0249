//! Per-page header metadata.
//!
//! The first element carrying `data-page-title` supplies the page's header
//! title and its subtitle variants `data-page-subtitle-0`, `-1`, ... The
//! run of variants stops at the first missing index.

use serde::Serialize;

use super::tree::Fragment;
use crate::utils::html::unescape;

pub const TITLE_ATTR: &str = "data-page-title";
pub const SUBTITLE_PREFIX: &str = "data-page-subtitle-";

/// Header title plus subtitle variants, most to least detailed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HeaderText {
    pub title: String,
    pub subtitles: Vec<String>,
}

impl HeaderText {
    pub fn new(title: impl Into<String>, subtitles: Vec<String>) -> Self {
        Self {
            title: title.into(),
            subtitles,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub title: Option<String>,
    pub subtitles: Vec<String>,
    /// Subtitle indices present beyond the contiguous run.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stray_subtitles: Vec<usize>,
}

impl PageMeta {
    pub fn extract(fragment: &Fragment) -> Self {
        let Some(el) = fragment
            .select_first(|el| el.has_attr(TITLE_ATTR))
            .and_then(|id| fragment.element(id))
        else {
            return Self::default();
        };

        let title = el
            .attr(TITLE_ATTR)
            .map(|v| unescape(v).trim().to_string())
            .filter(|t| !t.is_empty());

        let mut subtitles = Vec::new();
        while let Some(value) = el.attr(&format!("{SUBTITLE_PREFIX}{}", subtitles.len())) {
            subtitles.push(unescape(value).trim().to_string());
        }

        let contiguous = subtitles.len();
        let mut stray_subtitles: Vec<usize> = el
            .attrs
            .iter()
            .filter_map(|(name, _)| {
                let name = name.to_ascii_lowercase();
                name.strip_prefix(SUBTITLE_PREFIX)?.parse().ok()
            })
            .filter(|&idx: &usize| idx >= contiguous)
            .collect();
        stray_subtitles.sort_unstable();

        Self {
            title,
            subtitles,
            stray_subtitles,
        }
    }

    /// Header text for this page, or `default` when it carries no title.
    ///
    /// A title without subtitles doubles as the only subtitle variant.
    pub fn header(&self, default: &HeaderText) -> HeaderText {
        match &self.title {
            Some(title) if self.subtitles.is_empty() => HeaderText::new(title, vec![title.clone()]),
            Some(title) => HeaderText::new(title, self.subtitles.clone()),
            None => default.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(html: &str) -> PageMeta {
        PageMeta::extract(&Fragment::parse(html).unwrap())
    }

    #[test]
    fn test_extract_contiguous_subtitles() {
        let meta = meta(
            r#"<article data-page-title="On Engines" data-page-subtitle-0="a long one" data-page-subtitle-1="short"></article>"#,
        );
        assert_eq!(meta.title.as_deref(), Some("On Engines"));
        assert_eq!(meta.subtitles, ["a long one", "short"]);
        assert!(meta.stray_subtitles.is_empty());
    }

    #[test]
    fn test_gap_stops_collection() {
        let meta = meta(r#"<div data-page-title="T" data-page-subtitle-0="a" data-page-subtitle-2="c"></div>"#);
        assert_eq!(meta.subtitles, ["a"]);
        assert_eq!(meta.stray_subtitles, [2]);
    }

    #[test]
    fn test_entities_decoded() {
        let meta = meta(r#"<div data-page-title="Tom &amp; Jerry"></div>"#);
        assert_eq!(meta.title.as_deref(), Some("Tom & Jerry"));
    }

    #[test]
    fn test_header_fallbacks() {
        let default = HeaderText::new("Site", vec!["default".into()]);

        assert_eq!(meta("<p>none</p>").header(&default), default);
        assert_eq!(meta(r#"<p data-page-title=" "></p>"#).header(&default), default);

        let only_title = meta(r#"<p data-page-title="Post"></p>"#).header(&default);
        assert_eq!(only_title, HeaderText::new("Post", vec!["Post".into()]));
    }
}
