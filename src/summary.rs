use crate::processing::format_bytes;
use std::collections::HashMap;
use std::fmt;

const TOP_N: usize = 10;

/// Console summary of an aggregate, keyed by country code or region string.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub kind: &'static str,
    pub count: usize,
    pub total_bytes: u64,
    pub top: Vec<(String, u64)>,
}

impl Summary {
    pub fn from_totals(kind: &'static str, totals: &HashMap<String, u64>) -> Self {
        let mut ranked: Vec<(String, u64)> = totals.iter().map(|(k, v)| (k.clone(), *v)).collect();
        // Largest first, ties in key order so output is stable between runs
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(TOP_N);

        Self {
            kind,
            count: totals.len(),
            total_bytes: totals.values().fold(0u64, |acc, v| acc.saturating_add(*v)),
            top: ranked,
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Summary Statistics:")?;
        writeln!(f, "Total {}: {}", self.kind, self.count)?;
        writeln!(f, "Total data downloaded: {}", format_bytes(self.total_bytes))?;
        writeln!(f, "Top {} {} by download volume:", TOP_N, self.kind)?;
        for (key, bytes) in &self.top {
            writeln!(f, "  {}: {}", key, format_bytes(*bytes))?;
        }
        Ok(())
    }
}
