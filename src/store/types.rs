use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize};

/// Store-assigned user identifier. Never reused after deletion.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ISO 3166-1 alpha-2 style country code, always upper-case.
///
/// Decoding goes through [`CountryCode::new`], so `"fr"` on the wire reads
/// back as `FR`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    pub fn new(code: &str) -> Self {
        CountryCode(code.trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CountryCode {
    fn from(code: &str) -> Self {
        CountryCode::new(code)
    }
}

impl From<String> for CountryCode {
    fn from(code: String) -> Self {
        CountryCode::new(&code)
    }
}

impl From<CountryCode> for String {
    fn from(code: CountryCode) -> Self {
        code.0
    }
}

/// The ten colors a traveler can pick. Lowercase on the wire.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    #[default]
    Red,
    Green,
    Yellow,
    Olive,
    Orange,
    Indigo,
    Blue,
    Violet,
    Purple,
    Pink,
}

impl Color {
    pub const ALL: [Color; 10] = [
        Color::Red,
        Color::Green,
        Color::Yellow,
        Color::Olive,
        Color::Orange,
        Color::Indigo,
        Color::Blue,
        Color::Violet,
        Color::Purple,
        Color::Pink,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Green => "green",
            Color::Yellow => "yellow",
            Color::Olive => "olive",
            Color::Orange => "orange",
            Color::Indigo => "indigo",
            Color::Blue => "blue",
            Color::Violet => "violet",
            Color::Purple => "purple",
            Color::Pink => "pink",
        }
    }

    /// Case-insensitive lookup by label.
    pub fn from_label(label: &str) -> Option<Color> {
        let label = label.trim();
        Color::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub color: Color,
}

/// One (country, user) visit record. The pair is unique within a store.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VisitedCountry {
    pub country_code: CountryCode,
    pub user_id: UserId,
}

/// Number of users who visited a country (heatmap input).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CountryVisitCount {
    pub country_code: CountryCode,
    /// SQL `COUNT` results arrive as strings from some servers.
    #[serde(deserialize_with = "count_or_numeric_string")]
    pub visit_count: usize,
}

/// Point-in-time aggregate read of everything the UI and the stats need.
///
/// Field names follow the JSON served by the remote `GET /data` endpoint,
/// so both backends produce byte-compatible snapshots.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Codes visited by the current user.
    pub countries: Vec<CountryCode>,
    /// Per-country visit counts across all users.
    pub all_visits: Vec<CountryVisitCount>,
    /// Every visit record, in store order.
    pub all_user_visits: Vec<VisitedCountry>,
    pub total_world_countries: usize,
    /// Number of countries visited by the current user.
    #[serde(default)]
    pub total: usize,
    pub users: Vec<User>,
    /// Current user's color; `None` when there is no current user.
    #[serde(default, deserialize_with = "lenient_color")]
    pub color: Option<Color>,
    pub current_user_id: Option<UserId>,
}

impl Snapshot {
    pub fn current_user(&self) -> Option<&User> {
        let id = self.current_user_id?;
        self.users.iter().find(|u| u.id == id)
    }
}

/// Accepts any color string; names outside the palette decode as `None`.
fn lenient_color<'de, D>(deserializer: D) -> Result<Option<Color>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Color::from_label))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireCount {
    Number(usize),
    Text(String),
}

/// Accepts `2` or `"2"`.
fn count_or_numeric_string<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    match WireCount::deserialize(deserializer)? {
        WireCount::Number(n) => Ok(n),
        WireCount::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid visit count {s:?}"))),
    }
}
