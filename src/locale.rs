use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Content language of a post. The set is closed: every locale has its own
/// directory under the content root.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Pt,
    En,
}

const PT_MONTHS: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

const EN_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::Pt, Locale::En];

    pub fn code(self) -> &'static str {
        match self {
            Locale::Pt => "pt",
            Locale::En => "en",
        }
    }

    /// BCP 47 tag used in feeds.
    pub fn language_tag(self) -> &'static str {
        match self {
            Locale::Pt => "pt-BR",
            Locale::En => "en-US",
        }
    }

    /// English name of the language, used inside LLM prompts.
    pub fn language_name(self) -> &'static str {
        match self {
            Locale::Pt => "Brazilian Portuguese",
            Locale::En => "English",
        }
    }

    /// Month name for a 1-based month; `None` outside 1..=12.
    pub fn month_name(self, month: u32) -> Option<&'static str> {
        let idx = usize::try_from(month).ok()?.checked_sub(1)?;
        let names = match self {
            Locale::Pt => &PT_MONTHS,
            Locale::En => &EN_MONTHS,
        };
        names.get(idx).copied()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pt" => Ok(Locale::Pt),
            "en" => Ok(Locale::En),
            other => anyhow::bail!("unsupported locale: {other:?} (expected pt or en)"),
        }
    }
}
