//! # Media Parameters
//!
//! Decodes the media mini-language:
//!
//! ```text
//! {{ wiki:image.png?200x100&nolink |Caption}}
//!   ^                              ^
//!   leading space: right           trailing space: left (both: center)
//! ```
//!
//! Everything after the last `?` is the parameter string. Parameters are
//! order independent and matched by keyword; anything unrecognised is
//! ignored and leaves the field at its default.
//!
//! [`MediaParams`] displays as canonical markup, and decoding that markup
//! gives back the same record.

use std::{fmt, sync::OnceLock};

use regex::Regex;
use serde::Serialize;

use crate::{
    call::{CallName, Value},
    reference::ReferenceClassifier,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Internal,
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Right,
    Center,
}

impl Alignment {
    pub fn as_str(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Right => "right",
            Alignment::Center => "center",
        }
    }
}

/// What clicking the media does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Linking {
    /// Link to the media detail page.
    #[default]
    Details,
    Nolink,
    Direct,
    /// Render a link instead of the media.
    Linkonly,
}

impl Linking {
    pub fn as_str(self) -> &'static str {
        match self {
            Linking::Details => "details",
            Linking::Nolink => "nolink",
            Linking::Direct => "direct",
            Linking::Linkonly => "linkonly",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Cache {
    #[default]
    Cache,
    Nocache,
    Recache,
}

impl Cache {
    pub fn as_str(self) -> &'static str {
        match self {
            Cache::Cache => "cache",
            Cache::Nocache => "nocache",
            Cache::Recache => "recache",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaParams {
    pub kind: MediaKind,
    pub source: String,
    pub title: Option<String>,
    pub align: Option<Alignment>,
    pub width: Option<usize>,
    pub height: Option<usize>,
    pub linking: Linking,
    pub cache: Cache,
}

impl MediaParams {
    pub fn call_name(&self) -> CallName {
        match self.kind {
            MediaKind::Internal => CallName::InternalMedia,
            MediaKind::External => CallName::ExternalMedia,
        }
    }

    /// Call arguments: source, title, align, width, height, cache, linking.
    pub fn into_args(self) -> Vec<Value> {
        vec![
            self.source.into(),
            self.title.into(),
            self.align.map(Alignment::as_str).into(),
            self.width.into(),
            self.height.into(),
            self.cache.as_str().into(),
            self.linking.as_str().into(),
        ]
    }
}

impl fmt::Display for MediaParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (lead, trail) = match self.align {
            Some(Alignment::Right) => (" ", ""),
            Some(Alignment::Left) => ("", " "),
            Some(Alignment::Center) => (" ", " "),
            None => ("", ""),
        };

        let mut params = Vec::new();
        match (self.width, self.height) {
            (Some(w), Some(h)) => params.push(format!("{w}x{h}")),
            (Some(w), None) => params.push(w.to_string()),
            (None, Some(h)) => params.push(format!("0x{h}")),
            (None, None) => {}
        }
        if self.linking != Linking::Details {
            params.push(self.linking.as_str().to_string());
        }
        if self.cache != Cache::Cache {
            params.push(self.cache.as_str().to_string());
        }

        write!(f, "{{{{{lead}{}", self.source)?;
        // Keeps a `?` or trailing whitespace in the source from being re-read,
        // and an empty source from turning one alignment space into center
        if !params.is_empty()
            || self.source.contains('?')
            || self.source.ends_with(char::is_whitespace)
            || (self.source.is_empty() && self.align.is_some())
        {
            write!(f, "?{}", params.join("&"))?;
        }
        f.write_str(trail)?;
        if let Some(title) = &self.title {
            write!(f, "|{title}")?;
        }
        f.write_str("}}")
    }
}

fn size_pattern() -> &'static Regex {
    static SIZE: OnceLock<Regex> = OnceLock::new();
    SIZE.get_or_init(|| Regex::new(r"(?i)(\d+)(x(\d+))?").expect("size pattern is valid"))
}

fn cache_pattern() -> &'static Regex {
    static CACHE: OnceLock<Regex> = OnceLock::new();
    CACHE.get_or_init(|| Regex::new(r"(?i)(nocache|recache)").expect("cache pattern is valid"))
}

/// A positive dimension. Zero, and digits too long for `usize`, are no
/// dimension.
fn dimension(digits: Option<regex::Match<'_>>) -> Option<usize> {
    digits
        .and_then(|m| m.as_str().parse::<usize>().ok())
        .filter(|&n| n > 0)
}

/// Decode a complete media match such as `{{ image.png?200|Title}}`.
pub fn decode_media_params(raw: &str, classifier: &dyn ReferenceClassifier) -> MediaParams {
    let inner = raw.strip_prefix("{{").unwrap_or(raw);
    let inner = inner.strip_suffix("}}").unwrap_or(inner);

    let (link, title) = match inner.split_once('|') {
        Some((link, title)) => (link, Some(title.to_string())),
        None => (inner, None),
    };

    let align = match (link.starts_with(' '), link.ends_with(' ')) {
        (true, true) => Some(Alignment::Center),
        (true, false) => Some(Alignment::Right),
        (false, true) => Some(Alignment::Left),
        (false, false) => None,
    };

    let link = link.trim();
    let (source, params) = link.rsplit_once('?').unwrap_or((link, ""));

    let (width, height) = match size_pattern().captures(params) {
        Some(caps) => (dimension(caps.get(1)), dimension(caps.get(3))),
        None => (None, None),
    };

    let lower = params.to_ascii_lowercase();
    let linking = if lower.contains("nolink") {
        Linking::Nolink
    } else if lower.contains("direct") {
        Linking::Direct
    } else if lower.contains("linkonly") {
        Linking::Linkonly
    } else {
        Linking::Details
    };

    let cache = match cache_pattern().find(params) {
        Some(m) if m.as_str().eq_ignore_ascii_case("nocache") => Cache::Nocache,
        Some(_) => Cache::Recache,
        None => Cache::Cache,
    };

    let kind = if classifier.is_external(source) || classifier.is_interwiki(source) {
        MediaKind::External
    } else {
        MediaKind::Internal
    };

    MediaParams {
        kind,
        source: source.to_string(),
        title,
        align,
        width,
        height,
        linking,
        cache,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::DefaultClassifier;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn decode(raw: &str) -> MediaParams {
        decode_media_params(raw, &DefaultClassifier::default())
    }

    #[test]
    fn decodes_the_full_form() {
        let params = decode("{{ wiki:image.png?200x100&nolink|My title}}");

        assert_eq!(
            params,
            MediaParams {
                kind: MediaKind::Internal,
                source: "wiki:image.png".into(),
                title: Some("My title".into()),
                align: Some(Alignment::Right),
                width: Some(200),
                height: Some(100),
                linking: Linking::Nolink,
                cache: Cache::Cache,
            }
        );
    }

    #[rstest]
    #[case("{{a.png}}", None)]
    #[case("{{ a.png}}", Some(Alignment::Right))]
    #[case("{{a.png }}", Some(Alignment::Left))]
    #[case("{{ a.png }}", Some(Alignment::Center))]
    #[case("{{ a.png |title }}", Some(Alignment::Center))]
    #[case("{{a.png| title}}", None)]
    fn spaces_set_alignment(#[case] raw: &str, #[case] align: Option<Alignment>) {
        let params = decode(raw);

        assert_eq!(params.align, align);
        assert_eq!(params.source, "a.png");
    }

    #[rstest]
    #[case("200x100", Some(200), Some(100))]
    #[case("200X100", Some(200), Some(100))]
    #[case("200", Some(200), None)]
    #[case("direct&50", Some(50), None)]
    #[case("0x40", None, Some(40))]
    #[case("4294967296", Some(4_294_967_296), None)]
    #[case("99999999999999999999999", None, None)]
    #[case("nolink", None, None)]
    #[case("", None, None)]
    fn size_from_parameters(
        #[case] param: &str,
        #[case] width: Option<usize>,
        #[case] height: Option<usize>,
    ) {
        let params = decode(&format!("{{{{a.png?{param}}}}}"));

        assert_eq!((params.width, params.height), (width, height));
    }

    #[rstest]
    #[case("direct&nolink", Linking::Nolink)]
    #[case("linkonly&direct", Linking::Direct)]
    #[case("LINKONLY", Linking::Linkonly)]
    #[case("100", Linking::Details)]
    fn linking_priority(#[case] param: &str, #[case] linking: Linking) {
        assert_eq!(decode(&format!("{{{{a.png?{param}}}}}")).linking, linking);
    }

    #[rstest]
    #[case("recache&nocache", Cache::Recache)]
    #[case("nocache&recache", Cache::Nocache)]
    #[case("NoCache", Cache::Nocache)]
    #[case("cache", Cache::Cache)]
    fn first_cache_keyword_wins(#[case] param: &str, #[case] cache: Cache) {
        assert_eq!(decode(&format!("{{{{a.png?{param}}}}}")).cache, cache);
    }

    #[test]
    fn source_keeps_its_own_question_marks() {
        let params = decode("{{https://example.com/img?id=4?300}}");

        assert_eq!(params.source, "https://example.com/img?id=4");
        assert_eq!(params.width, Some(300));
        assert_eq!(params.kind, MediaKind::External);
    }

    #[test]
    fn interwiki_source_is_external() {
        assert_eq!(decode("{{wp>Logo.png}}").kind, MediaKind::External);
    }

    #[test]
    fn title_may_contain_pipes() {
        assert_eq!(decode("{{a.png|one|two}}").title.as_deref(), Some("one|two"));
    }

    #[rstest]
    #[case("{{ wiki:image.png?200x100&nolink|My title}}")]
    #[case("{{a.png}}")]
    #[case("{{ a.png?linkonly&recache }}")]
    #[case("{{https://example.com/img?id=4}}")]
    #[case("{{a.png?direct&0x40|}}")]
    #[case("{{  weird .png ?junk&NOCACHE|t}}")]
    #[case("{{a.png ?}}")]
    #[case("{{ }}")]
    #[case("{{? }}")]
    #[case("{{ ?}}")]
    #[case("{{?é }}")]
    fn canonical_form_decodes_to_the_same_record(#[case] raw: &str) {
        let first = decode(raw);
        let second = decode(&first.to_string());

        assert_eq!(first, second);
    }

    #[test]
    fn canonical_form_orders_parameters() {
        let params = decode("{{ a.png?nocache&linkonly&20x30 |Cap}}");

        assert_eq!(params.to_string(), "{{ a.png?20x30&linkonly&nocache |Cap}}");
    }

    #[rstest]
    #[case("{{? }}", Some(Alignment::Left), "{{? }}")]
    #[case("{{ ?}}", Some(Alignment::Right), "{{ ?}}")]
    #[case("{{  }}", Some(Alignment::Center), "{{ ? }}")]
    fn empty_source_keeps_its_alignment(
        #[case] raw: &str,
        #[case] align: Option<Alignment>,
        #[case] canonical: &str,
    ) {
        let params = decode(raw);

        assert_eq!(params.source, "");
        assert_eq!(params.align, align);
        assert_eq!(params.to_string(), canonical);
    }

    #[test]
    fn call_arguments() {
        let params = decode("{{a.png?20|t}}");

        assert_eq!(params.call_name(), CallName::InternalMedia);
        assert_eq!(
            params.into_args(),
            vec![
                Value::from("a.png"),
                Value::from("t"),
                Value::Null,
                Value::Int(20),
                Value::Null,
                Value::from("cache"),
                Value::from("details"),
            ]
        );
    }
}
