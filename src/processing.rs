use crate::types::{Bucket, CountryTotals, PseudoRegion, RegionTotals, CLOUD_PREFIXES};

const MIB: u64 = 1024 * 1024;
const GIB: u64 = 1024 * MIB;
const TIB: u64 = 1024 * GIB;

const LOW_LIMIT: u64 = 10 * MIB;
const MEDIUM_LIMIT: u64 = 10 * GIB;
const HIGH_LIMIT: u64 = 10 * TIB;

const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

/// Country code for a region string, or `None` for non-geographic regions.
///
/// `"US/CA"` and `"US"` both give `"US"`; cloud regions and pseudo-regions
/// are matched by prefix and give `None`.
pub fn extract_country_code(region: &str) -> Option<&str> {
    let non_geographic = CLOUD_PREFIXES
        .iter()
        .copied()
        .chain(PseudoRegion::ALL.iter().map(|p| p.as_str()))
        .any(|prefix| region.starts_with(prefix));
    if non_geographic {
        return None;
    }

    match region.split_once('/') {
        Some((country, _)) if !country.is_empty() => Some(country),
        Some(_) => None,
        None => Some(region),
    }
}

pub fn reduce_to_countries(regions: &RegionTotals) -> CountryTotals {
    let mut countries = CountryTotals::new();

    for (region, bytes_sent) in regions {
        if let Some(country) = extract_country_code(region) {
            let total = countries.entry(country.to_string()).or_insert(0);
            *total = total.saturating_add(*bytes_sent);
        }
    }

    countries
}

// Intervals are lower-inclusive: exactly 10 MiB is medium.
pub fn classify(bytes: u64) -> Bucket {
    if bytes < LOW_LIMIT {
        Bucket::Low
    } else if bytes < MEDIUM_LIMIT {
        Bucket::Medium
    } else if bytes < HIGH_LIMIT {
        Bucket::High
    } else {
        Bucket::VeryHigh
    }
}

pub fn format_bytes(bytes: u64) -> String {
    let mut value = bytes as f64;
    for unit in UNITS {
        if value < 1024.0 {
            return format!("{:.2} {}", value, unit);
        }
        value /= 1024.0;
    }
    format!("{:.2} EB", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals(entries: &[(&str, u64)]) -> RegionTotals {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_extract_country_code() {
        assert_eq!(extract_country_code("US/CA"), Some("US"));
        assert_eq!(extract_country_code("US"), Some("US"));
        assert_eq!(extract_country_code("GB/ENG/LND"), Some("GB"));
        assert_eq!(extract_country_code("AWS/us-east-1"), None);
        assert_eq!(extract_country_code("GCP/europe-west1"), None);
        assert_eq!(extract_country_code("GitHub"), None);
        assert_eq!(extract_country_code("VPN"), None);
        assert_eq!(extract_country_code("bogon"), None);
        assert_eq!(extract_country_code("unknown"), None);
        assert_eq!(extract_country_code("/CA"), None);
    }

    #[test]
    fn test_reduce_drops_empty_country_codes() {
        let regions = totals(&[("/CA", 1536), ("US/NY", 10)]);
        let countries = reduce_to_countries(&regions);

        assert_eq!(countries.len(), 1);
        assert_eq!(countries["US"], 10);
        assert!(!countries.contains_key(""));
    }

    #[test]
    fn test_pseudo_regions_match_by_prefix() {
        // Unlike the loader's exact match, the reducer drops anything starting with a pseudo-region
        assert_eq!(extract_country_code("GitHub/actions"), None);
        assert_eq!(extract_country_code("unknown/XX"), None);
        // Prefixes are case sensitive
        assert_eq!(extract_country_code("aws/us-east-1"), Some("aws"));
    }

    #[test]
    fn test_reduce_to_countries() {
        let regions = totals(&[("US/CA", 5_000_000), ("US/NY", 20_000_000)]);
        let countries = reduce_to_countries(&regions);

        assert_eq!(countries.len(), 1);
        assert_eq!(countries["US"], 25_000_000);
    }

    #[test]
    fn test_reduce_preserves_geographic_sum() {
        let regions = totals(&[
            ("US/CA", 11),
            ("US", 7),
            ("DE/BY", 13),
            ("DE/HE", 17),
            ("AWS/us-east-1", 1000),
            ("GCP/asia-east1", 2000),
            ("IN", 19),
        ]);
        let countries = reduce_to_countries(&regions);

        let geographic: u64 = regions
            .iter()
            .filter(|(r, _)| extract_country_code(r).is_some())
            .map(|(_, b)| b)
            .sum();
        let reduced: u64 = countries.values().sum();

        assert_eq!(reduced, geographic);
        assert_eq!(reduced, 67);
        assert_eq!(countries["US"], 18);
        assert_eq!(countries["DE"], 30);
        assert!(!countries.contains_key("AWS"));
    }

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify(0), Bucket::Low);
        assert_eq!(classify(10 * 1024 * 1024 - 1), Bucket::Low);
        assert_eq!(classify(10 * 1024 * 1024), Bucket::Medium);
        assert_eq!(classify(10 * 1024 * 1024 * 1024 - 1), Bucket::Medium);
        assert_eq!(classify(10 * 1024 * 1024 * 1024), Bucket::High);
        assert_eq!(classify(10 * 1024 * 1024 * 1024 * 1024 - 1), Bucket::High);
        assert_eq!(classify(10 * 1024 * 1024 * 1024 * 1024), Bucket::VeryHigh);
        assert_eq!(classify(u64::MAX), Bucket::VeryHigh);
    }

    #[test]
    fn test_classify_is_monotonic() {
        let samples = [0, 1, LOW_LIMIT - 1, LOW_LIMIT, MEDIUM_LIMIT, HIGH_LIMIT, u64::MAX];
        for pair in samples.windows(2) {
            assert!(classify(pair[0]) <= classify(pair[1]));
        }
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0.00 B");
        assert_eq!(format_bytes(1023), "1023.00 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(25_000_000), "23.84 MB");
        assert_eq!(format_bytes(1024u64.pow(5)), "1.00 PB");
        assert_eq!(format_bytes(1024u64.pow(6)), "1.00 EB");
    }
}
