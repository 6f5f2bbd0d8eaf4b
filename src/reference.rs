//! Static lookups loaded from reference files.
//!
//! Both resolvers degrade to an empty lookup when their file is missing or
//! unparseable, so every key simply reads as unmapped.

use crate::error::InputError;
use crate::types::Coordinate;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{info, warn};

/// Region code -> coordinates, from the YAML reference file.
#[derive(Debug, Default, Clone)]
pub struct CoordinateIndex {
    entries: HashMap<String, Coordinate>,
}

impl CoordinateIndex {
    pub fn try_load(path: &Path) -> Result<Self, InputError> {
        let file = File::open(path).map_err(|e| InputError::missing_reference(path, e))?;
        // A region listed with no body at all is as unplottable as one with null fields
        let raw: HashMap<String, Option<Coordinate>> = serde_yaml::from_reader(BufReader::new(file))
            .map_err(|e| InputError::missing_reference(path, e))?;

        let entries = raw.into_iter()
            .map(|(region, coord)| (region, coord.unwrap_or_default()))
            .collect();
        Ok(Self { entries })
    }

    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(index) => {
                info!("Loaded coordinates for {} regions", index.len());
                index
            }
            Err(err) => {
                warn!("{}", err);
                Self::default()
            }
        }
    }

    pub fn lookup(&self, region: &str) -> Option<&Coordinate> {
        self.entries.get(region)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Coordinate)> for CoordinateIndex {
    fn from_iter<I: IntoIterator<Item = (String, Coordinate)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

/// Country code -> display name, from the JSON reference file.
#[derive(Debug, Default, Clone)]
pub struct CountryNames {
    names: HashMap<String, String>,
}

impl CountryNames {
    pub fn try_load(path: &Path) -> Result<Self, InputError> {
        let file = File::open(path).map_err(|e| InputError::missing_reference(path, e))?;
        let names: HashMap<String, String> = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| InputError::missing_reference(path, e))?;
        Ok(Self { names })
    }

    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(names) => {
                info!("Loaded display names for {} countries", names.len());
                names
            }
            Err(err) => {
                warn!("{}", err);
                Self::default()
            }
        }
    }

    pub fn lookup(&self, code: &str) -> Option<&str> {
        self.names.get(code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<(String, String)> for CountryNames {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self { names: iter.into_iter().collect() }
    }
}

/// Display names whose spelling differs from the country geometry source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameAlias {
    Usa,
    England,
    Russia,
    SouthKorea,
    CzechRepublic,
}

impl NameAlias {
    pub const ALL: [NameAlias; 5] = [
        NameAlias::Usa,
        NameAlias::England,
        NameAlias::Russia,
        NameAlias::SouthKorea,
        NameAlias::CzechRepublic,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            NameAlias::Usa => "USA",
            NameAlias::England => "England",
            NameAlias::Russia => "Russia",
            NameAlias::SouthKorea => "South Korea",
            NameAlias::CzechRepublic => "Czech Republic",
        }
    }

    pub fn geometry_names(self) -> &'static [&'static str] {
        match self {
            NameAlias::Usa => &["United States of America", "United States"],
            NameAlias::England => &["United Kingdom", "Great Britain"],
            NameAlias::Russia => &["Russian Federation"],
            NameAlias::SouthKorea => &["Korea", "Republic of Korea"],
            NameAlias::CzechRepublic => &["Czechia", "Czech Republic"],
        }
    }

    pub fn for_display_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.display_name() == name)
    }
}

/// Every geometry name a display name can match, the name itself first.
pub fn geometry_names_for(display_name: &str) -> Vec<&str> {
    let mut names = vec![display_name];
    if let Some(alias) = NameAlias::for_display_name(display_name) {
        for name in alias.geometry_names() {
            if *name != display_name {
                names.push(*name);
            }
        }
    }
    names
}

/// Finds the value for a geometry feature name among values keyed by display name.
///
/// The direct key wins; otherwise aliases are tried in table order.
pub fn resolve_geometry_name<'a, V>(geometry_name: &str, values: &'a HashMap<String, V>) -> Option<&'a V> {
    if let Some(value) = values.get(geometry_name) {
        return Some(value);
    }

    NameAlias::ALL
        .into_iter()
        .filter(|alias| alias.geometry_names().iter().any(|n| *n == geometry_name))
        .find_map(|alias| values.get(alias.display_name()))
}
