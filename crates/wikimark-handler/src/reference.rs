//! Classification of link and media references.

/// Decides whether a reference points outside the wiki.
pub trait ReferenceClassifier {
    /// A URL with a recognised scheme, e.g. `https://example.com/a.png`.
    fn is_external(&self, reference: &str) -> bool;

    /// A shortcut into another wiki, e.g. `wp>Rust`.
    fn is_interwiki(&self, reference: &str) -> bool;
}

/// Scheme-based classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultClassifier {
    external_schemes: Vec<String>,
}

pub const DEFAULT_EXTERNAL_SCHEMES: [&str; 3] = ["http", "https", "ftp"];

impl DefaultClassifier {
    pub fn new<I, S>(external_schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            external_schemes: external_schemes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn external_schemes(&self) -> &[String] {
        &self.external_schemes
    }
}

impl Default for DefaultClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_EXTERNAL_SCHEMES)
    }
}

impl ReferenceClassifier for DefaultClassifier {
    fn is_external(&self, reference: &str) -> bool {
        reference.split_once("://").is_some_and(|(scheme, _)| {
            self.external_schemes
                .iter()
                .any(|known| known.eq_ignore_ascii_case(scheme))
        })
    }

    fn is_interwiki(&self, reference: &str) -> bool {
        reference.split_once('>').is_some_and(|(shortcut, _)| {
            !shortcut.is_empty()
                && shortcut
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '.')
        })
    }
}
