use std::{fmt, str::FromStr};

use serde::Serialize;

use crate::error::HandlerError;

/// The built-in lexer modes the handler knows how to process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Cdata,
    Eol,
    Media,
    Table,
    Listblock,
    Quote,
    Preformatted,
    Footnote,
}

impl Mode {
    pub const ALL: [Mode; 8] = [
        Mode::Cdata,
        Mode::Eol,
        Mode::Media,
        Mode::Table,
        Mode::Listblock,
        Mode::Quote,
        Mode::Preformatted,
        Mode::Footnote,
    ];

    /// The mode name used by the lexer.
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Cdata => "cdata",
            Mode::Eol => "eol",
            Mode::Media => "media",
            Mode::Table => "table",
            Mode::Listblock => "listblock",
            Mode::Quote => "quote",
            Mode::Preformatted => "preformatted",
            Mode::Footnote => "footnote",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a lexer mode name resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Construct {
    Mode(Mode),
    /// A registered syntax plugin, by plugin name.
    Plugin(String),
}

const PLUGIN_PREFIX: &str = "plugin_";

impl FromStr for Construct {
    type Err = HandlerError;

    /// `"table"` is a built-in mode, `"plugin_box"` is the plugin `box`.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        if let Some(plugin) = name.strip_prefix(PLUGIN_PREFIX) {
            if !plugin.is_empty() {
                return Ok(Construct::Plugin(plugin.to_string()));
            }
        }
        Mode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == name)
            .map(Construct::Mode)
            .ok_or_else(|| HandlerError::UnknownConstruct(name.to_string()))
    }
}

impl From<Mode> for Construct {
    fn from(mode: Mode) -> Self {
        Construct::Mode(mode)
    }
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Construct::Mode(mode) => write!(f, "{mode}"),
            Construct::Plugin(name) => write!(f, "{PLUGIN_PREFIX}{name}"),
        }
    }
}
