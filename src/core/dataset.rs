//! # Country Reference Dataset
//!
//! Static, ordered list of `{code, name, continent}`. The builtin table is
//! generated at build time from `assets/countries.tsv`; a JSON file with the
//! same fields can replace it at startup.
//!
//! Iteration order matters: name resolution is first-match-wins.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::store::types::CountryCode;

include!(concat!(env!("OUT_DIR"), "/country_table.rs"));

/// Number of continents a traveler can cover.
pub const CONTINENT_COUNT: usize = 6;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Continent {
    #[serde(rename = "Africa")]
    Africa,
    #[serde(rename = "Asia")]
    Asia,
    #[serde(rename = "Europe")]
    Europe,
    #[serde(rename = "North America")]
    NorthAmerica,
    #[serde(rename = "South America")]
    SouthAmerica,
    #[serde(rename = "Oceania")]
    Oceania,
}

impl Continent {
    pub fn label(self) -> &'static str {
        match self {
            Continent::Africa => "Africa",
            Continent::Asia => "Asia",
            Continent::Europe => "Europe",
            Continent::NorthAmerica => "North America",
            Continent::SouthAmerica => "South America",
            Continent::Oceania => "Oceania",
        }
    }

    pub fn from_label(label: &str) -> Option<Continent> {
        match label {
            "Africa" => Some(Continent::Africa),
            "Asia" => Some(Continent::Asia),
            "Europe" => Some(Continent::Europe),
            "North America" => Some(Continent::NorthAmerica),
            "South America" => Some(Continent::SouthAmerica),
            "Oceania" => Some(Continent::Oceania),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Country {
    pub code: CountryCode,
    pub name: String,
    pub continent: Continent,
}

#[derive(Debug)]
pub enum DatasetError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    /// Structurally valid but unusable (e.g. duplicate codes).
    Invalid(String),
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetError::Io(e) => write!(f, "dataset I/O error: {e}"),
            DatasetError::Parse(e) => write!(f, "dataset parse error: {e}"),
            DatasetError::Invalid(msg) => write!(f, "invalid dataset: {msg}"),
        }
    }
}

impl std::error::Error for DatasetError {}

/// Immutable for the lifetime of the process; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct CountryDataset {
    countries: Vec<Country>,
    by_code: HashMap<CountryCode, usize>,
}

impl CountryDataset {
    /// Builds a dataset from an ordered list, rejecting duplicate codes.
    pub fn new(countries: Vec<Country>) -> Result<Self, DatasetError> {
        let mut by_code = HashMap::with_capacity(countries.len());
        for (idx, country) in countries.iter().enumerate() {
            if by_code.insert(country.code.clone(), idx).is_some() {
                return Err(DatasetError::Invalid(format!(
                    "duplicate country code {}",
                    country.code
                )));
            }
        }
        Ok(Self { countries, by_code })
    }

    /// The table compiled into the binary.
    pub fn builtin() -> Self {
        // build.rs has already validated codes and continent labels
        let countries: Vec<Country> = COUNTRY_ROWS
            .iter()
            .filter_map(|(code, name, continent)| {
                Continent::from_label(continent).map(|continent| Country {
                    code: CountryCode::new(code),
                    name: name.to_string(),
                    continent,
                })
            })
            .collect();
        let by_code = countries
            .iter()
            .enumerate()
            .map(|(idx, c)| (c.code.clone(), idx))
            .collect();
        Self { countries, by_code }
    }

    /// Parses a JSON array of `{code, name, continent}` objects.
    pub fn from_json_str(json: &str) -> Result<Self, DatasetError> {
        let countries: Vec<Country> = serde_json::from_str(json).map_err(DatasetError::Parse)?;
        Self::new(countries)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, DatasetError> {
        let json = fs::read_to_string(path).map_err(DatasetError::Io)?;
        let dataset = Self::from_json_str(&json)?;
        info!(
            "Loaded {} countries from {}",
            dataset.len(),
            path.display()
        );
        Ok(dataset)
    }

    /// Loads the override file when given, otherwise the builtin table.
    pub fn load(path: Option<&Path>) -> Result<Self, DatasetError> {
        match path {
            Some(p) => Self::from_json_file(p),
            None => {
                let dataset = Self::builtin();
                debug!("Using builtin dataset ({} countries)", dataset.len());
                Ok(dataset)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn get(&self, code: &CountryCode) -> Option<&Country> {
        self.by_code.get(code).map(|&idx| &self.countries[idx])
    }

    pub fn continent_of(&self, code: &CountryCode) -> Option<Continent> {
        self.get(code).map(|c| c.continent)
    }

    /// Resolves free text to a country by case-insensitive substring match.
    ///
    /// Linear scan in dataset order; the first name containing the query
    /// wins, not the closest one ("sudan" finds "South Sudan" before
    /// "Sudan"). A blank query matches nothing.
    pub fn resolve(&self, query: &str) -> Option<&Country> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.countries
            .iter()
            .find(|c| c.name.to_lowercase().contains(&needle))
    }

    /// All countries whose name contains `filter` (case-insensitive), in order.
    pub fn search<'a>(&'a self, filter: &str) -> impl Iterator<Item = &'a Country> + 'a {
        let needle = filter.trim().to_lowercase();
        self.countries
            .iter()
            .filter(move |c| c.name.to_lowercase().contains(&needle))
    }
}
