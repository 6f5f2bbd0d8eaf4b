use crate::processing::{classify, format_bytes};
use crate::reference::{geometry_names_for, resolve_geometry_name, CoordinateIndex, CountryNames};
use crate::types::{Bucket, CountryTotals, RegionTotals};
use anyhow::{Context, Result};
use geo::Point;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject};
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

// Points south of this are Antarctica and fall outside the map extent
const MIN_LATITUDE: f64 = -60.0;

// ColorBrewer YlOrRd, light to dark
const YL_OR_RD: [&str; 9] = [
    "#ffffcc", "#ffeda0", "#fed976", "#feb24c", "#fd8d3c", "#fc4e2a", "#e31a1c", "#bd0026", "#800026",
];

const UNIT_TICKS: [(u64, &str); 5] = [
    (1 << 10, "1 KB"),
    (1 << 20, "1 MB"),
    (1 << 30, "1 GB"),
    (1 << 40, "1 TB"),
    (1 << 50, "1 PB"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScale {
    Linear,
    Logarithmic,
}

impl ColorScale {
    pub fn from_flag(log_scale: bool) -> Self {
        if log_scale { ColorScale::Logarithmic } else { ColorScale::Linear }
    }

    pub fn apply(self, bytes: u64) -> f64 {
        match self {
            ColorScale::Linear => bytes as f64,
            ColorScale::Logarithmic => (bytes as f64 + 1.0).log10(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScatterPoint {
    pub region: String,
    pub point: Point<f64>, // x = longitude, y = latitude
    pub bytes_sent: u64,
    pub bucket: Bucket,
}

#[derive(Debug, Clone)]
pub struct ScatterLayer {
    /// Ascending by volume so the largest markers are drawn last.
    pub points: Vec<ScatterPoint>,
}

/// Places every region that has usable coordinates. `None` means nothing is plottable.
pub fn build_scatter_layer(regions: &RegionTotals, coordinates: &CoordinateIndex) -> Option<ScatterLayer> {
    let mut points: Vec<ScatterPoint> = regions
        .iter()
        .filter_map(|(region, &bytes_sent)| {
            let (lat, lon) = coordinates.lookup(region)?.lat_lon()?;
            if lat <= MIN_LATITUDE {
                return None;
            }
            Some(ScatterPoint {
                region: region.clone(),
                point: Point::new(lon, lat),
                bytes_sent,
                bucket: classify(bytes_sent),
            })
        })
        .collect();

    if points.is_empty() {
        return None;
    }

    points.sort_by(|a, b| a.bytes_sent.cmp(&b.bytes_sent).then_with(|| a.region.cmp(&b.region)));
    info!("Found {} regions with coordinates and data", points.len());

    Some(ScatterLayer { points })
}

impl ScatterLayer {
    /// Point count per bucket, in legend order.
    pub fn legend(&self) -> Vec<(Bucket, usize)> {
        Bucket::ALL
            .into_iter()
            .map(|bucket| (bucket, self.points.iter().filter(|p| p.bucket == bucket).count()))
            .collect()
    }

    pub fn legend_labels(&self) -> Vec<String> {
        self.legend()
            .into_iter()
            .map(|(bucket, count)| format!("{} ({})", bucket.spec().label, count))
            .collect()
    }

    pub fn to_feature_collection(&self) -> FeatureCollection {
        let features = self.points.iter().map(|p| {
            let spec = p.bucket.spec();
            let mut properties = JsonObject::new();
            properties.insert("region".to_string(), json!(p.region));
            properties.insert("bytes_sent".to_string(), json!(p.bytes_sent));
            properties.insert("bytes_label".to_string(), json!(format_bytes(p.bytes_sent)));
            properties.insert("bucket".to_string(), json!(p.bucket));
            properties.insert("fill".to_string(), json!(spec.fill));
            properties.insert("stroke".to_string(), json!(spec.stroke));
            properties.insert("size".to_string(), json!(spec.size));

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(geojson::Value::from(&p.point))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        });

        FeatureCollection {
            bbox: None,
            features: features.collect(),
            foreign_members: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChoroplethEntry {
    pub name: String,
    pub codes: Vec<String>,
    pub geometry_names: Vec<String>,
    pub bytes_sent: u64,
    pub value: f64,
    pub fill: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorbarTick {
    pub value: f64,
    pub label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChoroplethLayer {
    pub scale: ColorScale,
    pub vmin: f64,
    pub vmax: f64,
    pub ticks: Vec<ColorbarTick>,
    pub countries: Vec<ChoroplethEntry>,
    /// Country codes with no display name; drawn as background.
    pub unmapped: Vec<String>,
    #[serde(skip)]
    by_name: HashMap<String, usize>,
}

/// Colours countries by volume. `None` only when there are no countries at all.
pub fn build_choropleth_layer(countries: &CountryTotals, names: &CountryNames, scale: ColorScale) -> Option<ChoroplethLayer> {
    if countries.is_empty() {
        return None;
    }

    let mut codes: Vec<&String> = countries.keys().collect();
    codes.sort();

    let mut by_display: HashMap<String, (Vec<String>, u64)> = HashMap::new();
    let mut unmapped = Vec::new();

    for code in codes {
        let bytes_sent = countries[code];
        match names.lookup(code) {
            Some(name) => {
                let (entry_codes, total) = by_display.entry(name.to_string()).or_default();
                entry_codes.push(code.clone());
                *total = total.saturating_add(bytes_sent);
            }
            None => unmapped.push(code.clone()),
        }
    }

    info!(
        "Successfully mapped {} out of {} countries",
        countries.len() - unmapped.len(),
        countries.len()
    );

    let min_bytes = by_display.values().map(|(_, b)| *b).min();
    let max_bytes = by_display.values().map(|(_, b)| *b).max();

    let (vmin, vmax, ticks) = match (min_bytes, max_bytes) {
        (Some(min), Some(max)) => (scale.apply(min), scale.apply(max), colorbar_ticks(min, max, scale)),
        _ => (0.0, 1.0, Vec::new()),
    };

    let mut entries: Vec<ChoroplethEntry> = by_display
        .into_iter()
        .map(|(name, (codes, bytes_sent))| {
            let value = scale.apply(bytes_sent);
            ChoroplethEntry {
                geometry_names: geometry_names_for(&name).into_iter().map(String::from).collect(),
                fill: ramp_color(normalize(value, vmin, vmax)),
                name,
                codes,
                bytes_sent,
                value,
            }
        })
        .collect();
    entries.sort_by(|a, b| b.bytes_sent.cmp(&a.bytes_sent).then_with(|| a.name.cmp(&b.name)));

    let by_name = entries.iter().enumerate().map(|(i, e)| (e.name.clone(), i)).collect();

    Some(ChoroplethLayer {
        scale,
        vmin,
        vmax,
        ticks,
        countries: entries,
        unmapped,
        by_name,
    })
}

impl ChoroplethLayer {
    /// Entry to paint for a feature of the geometry source, direct name first, then aliases.
    pub fn value_for_geometry(&self, geometry_name: &str) -> Option<&ChoroplethEntry> {
        resolve_geometry_name(geometry_name, &self.by_name).map(|&i| &self.countries[i])
    }
}

fn colorbar_ticks(min_bytes: u64, max_bytes: u64, scale: ColorScale) -> Vec<ColorbarTick> {
    let (low, high) = match scale {
        ColorScale::Linear => (min_bytes as f64, max_bytes as f64),
        ColorScale::Logarithmic => {
            let low = if min_bytes > 0 { scale.apply(min_bytes) } else { 0.0 };
            (low, scale.apply(max_bytes))
        }
    };

    UNIT_TICKS
        .iter()
        .map(|&(bytes, label)| ColorbarTick { value: scale.apply(bytes), label })
        .filter(|tick| low <= tick.value && tick.value <= high)
        .collect()
}

fn normalize(value: f64, vmin: f64, vmax: f64) -> f64 {
    if vmax <= vmin {
        return 0.0;
    }
    ((value - vmin) / (vmax - vmin)).clamp(0.0, 1.0)
}

/// Linear interpolation along the YlOrRd ramp for `t` in `[0, 1]`.
pub fn ramp_color(t: f64) -> String {
    let t = t.clamp(0.0, 1.0);
    let pos = t * (YL_OR_RD.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = (lower + 1).min(YL_OR_RD.len() - 1);
    let frac = pos - lower as f64;

    let a = hex_to_rgb(YL_OR_RD[lower]);
    let b = hex_to_rgb(YL_OR_RD[upper]);
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * frac).round() as u8;

    format!("#{:02x}{:02x}{:02x}", mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2]))
}

fn hex_to_rgb(hex: &str) -> [u8; 3] {
    let hex = hex.trim_start_matches('#');
    let channel = |i: usize| {
        hex.get(i..i + 2)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
            .unwrap_or(0)
    };
    [channel(0), channel(2), channel(4)]
}

fn create_writer(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create output directory: {:?}", parent))?;
    }
    let file = File::create(path).with_context(|| format!("Failed to create output file: {:?}", path))?;
    Ok(BufWriter::new(file))
}

pub fn write_scatter_layer(layer: &ScatterLayer, path: &Path) -> Result<()> {
    let writer = create_writer(path)?;
    serde_json::to_writer_pretty(writer, &layer.to_feature_collection())
        .with_context(|| format!("Failed to write scatter layer: {:?}", path))?;
    info!("Scatter layer saved as: {:?}", path);
    Ok(())
}

pub fn write_choropleth_layer(layer: &ChoroplethLayer, path: &Path) -> Result<()> {
    let writer = create_writer(path)?;
    serde_json::to_writer_pretty(writer, layer)
        .with_context(|| format!("Failed to write choropleth layer: {:?}", path))?;
    info!("Choropleth layer saved as: {:?}", path);
    Ok(())
}
