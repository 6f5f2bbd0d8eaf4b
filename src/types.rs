use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// Region string (e.g. "US/CA") -> cumulative bytes sent
pub type RegionTotals = HashMap<String, u64>;

// Country code (e.g. "US") -> cumulative bytes sent
pub type CountryTotals = HashMap<String, u64>;

/// Pseudo-locations that appear in the summaries but have no place on a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PseudoRegion {
    GitHub,
    Vpn,
    Bogon,
    Unknown,
}

impl PseudoRegion {
    pub const ALL: [PseudoRegion; 4] = [
        PseudoRegion::GitHub,
        PseudoRegion::Vpn,
        PseudoRegion::Bogon,
        PseudoRegion::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PseudoRegion::GitHub => "GitHub",
            PseudoRegion::Vpn => "VPN",
            PseudoRegion::Bogon => "bogon",
            PseudoRegion::Unknown => "unknown",
        }
    }

    /// Exact match against a region string, as used by the loader.
    pub fn from_region(region: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == region)
    }
}

// Cloud provider regions are geographic in name only
pub const CLOUD_PREFIXES: [&str; 2] = ["AWS/", "GCP/"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Bucket {
    Low,
    Medium,
    High,
    VeryHigh,
}

#[derive(Debug, PartialEq, Eq)]
pub struct BucketSpec {
    pub fill: &'static str,
    pub stroke: &'static str,
    pub name: &'static str,
    pub label: &'static str,
    pub size: u32,
}

const LOW: BucketSpec = BucketSpec {
    fill: "#26c6da",
    stroke: "#0097a7",
    name: "Cyan",
    label: "< 10 MB",
    size: 20,
};

const MEDIUM: BucketSpec = BucketSpec {
    fill: "#66bb6a",
    stroke: "#388e3c",
    name: "Green",
    label: "10 MB - 10 GB",
    size: 40,
};

const HIGH: BucketSpec = BucketSpec {
    fill: "#ffca28",
    stroke: "#f57f17",
    name: "Yellow",
    label: "10 GB - 10 TB",
    size: 60,
};

const VERY_HIGH: BucketSpec = BucketSpec {
    fill: "#ff7043",
    stroke: "#d84315",
    name: "Orange",
    label: "> 10 TB",
    size: 80,
};

impl Bucket {
    /// Ascending order, which is also legend order.
    pub const ALL: [Bucket; 4] = [Bucket::Low, Bucket::Medium, Bucket::High, Bucket::VeryHigh];

    pub fn spec(self) -> &'static BucketSpec {
        match self {
            Bucket::Low => &LOW,
            Bucket::Medium => &MEDIUM,
            Bucket::High => &HIGH,
            Bucket::VeryHigh => &VERY_HIGH,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Bucket::Low => "low",
            Bucket::Medium => "medium",
            Bucket::High => "high",
            Bucket::VeryHigh => "very-high",
        }
    }
}

/// Entry of the coordinate reference file. Either field may be null.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct Coordinate {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl Coordinate {
    pub fn lat_lon(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}
