use access_maps::{config, data, processing, reference, render, summary};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the country-level choropleth layer
    Choropleth {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
        /// Use logarithmic scale for colors (default: linear)
        #[arg(short, long)]
        log_scale: bool,
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Build the region-level scatter layer
    Scatter {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Choropleth { config, log_scale, output } => {
            let app_config = config::AppConfig::load_or_default(config)?;
            let output = output.clone().unwrap_or_else(|| app_config.output.choropleth.clone());

            let report = load_regions(&app_config.input.summaries_dir);
            let countries = processing::reduce_to_countries(&report.totals);
            if countries.is_empty() {
                println!("No valid country data found!");
                return Ok(());
            }
            info!("Found data for {} countries", countries.len());

            let names = reference::CountryNames::load(&app_config.input.country_mapping);
            let scale = render::ColorScale::from_flag(*log_scale);
            let Some(layer) = render::build_choropleth_layer(&countries, &names, scale) else {
                println!("No data to visualize");
                return Ok(());
            };
            render::write_choropleth_layer(&layer, &output)?;

            println!(
                "Scale: {:?} | Countries with data: {}",
                scale,
                layer.countries.len()
            );
            print!("\n{}", summary::Summary::from_totals("countries", &countries));
        }
        Commands::Scatter { config, output } => {
            let app_config = config::AppConfig::load_or_default(config)?;
            let output = output.clone().unwrap_or_else(|| app_config.output.scatter.clone());

            let report = load_regions(&app_config.input.summaries_dir);
            if report.is_empty() {
                println!("No valid region data found!");
                return Ok(());
            }
            info!("Found data for {} regions", report.totals.len());

            let coordinates = reference::CoordinateIndex::load(&app_config.input.coordinates);
            if coordinates.is_empty() {
                println!("No coordinate data found!");
                return Ok(());
            }

            let Some(layer) = render::build_scatter_layer(&report.totals, &coordinates) else {
                println!("No plottable data found");
                return Ok(());
            };
            render::write_scatter_layer(&layer, &output)?;

            println!("Download Volume:");
            for label in layer.legend_labels() {
                println!("  {}", label);
            }
            print!("\n{}", summary::Summary::from_totals("regions", &report.totals));
        }
    }

    Ok(())
}

// A missing summaries directory is reported and treated as no data.
fn load_regions(summaries_dir: &Path) -> data::LoadReport {
    match data::load_region_data(summaries_dir) {
        Ok(report) => {
            let skipped = report.skipped().count();
            if skipped > 0 {
                warn!("{} of {} region tables were skipped", skipped, report.files.len());
            }
            report
        }
        Err(err) => {
            warn!("{}", err);
            data::LoadReport::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_end_to_end_aggregation() {
        let temp = TempDir::new().unwrap();
        let first = temp.path().join("000001");
        let second = temp.path().join("000002");
        fs::create_dir_all(&first).unwrap();
        fs::create_dir_all(&second).unwrap();
        fs::write(first.join(data::REGION_TABLE), "region\tbytes_sent\nUS/CA\t5000000\n").unwrap();
        fs::write(
            second.join(data::REGION_TABLE),
            "region\tbytes_sent\nUS/NY\t20000000\nGitHub\t999\n",
        )
        .unwrap();

        let report = load_regions(temp.path());
        let countries = processing::reduce_to_countries(&report.totals);

        assert_eq!(report.totals.len(), 2);
        assert_eq!(report.totals["US/CA"], 5_000_000);
        assert_eq!(report.totals["US/NY"], 20_000_000);
        assert_eq!(countries.len(), 1);
        assert_eq!(countries["US"], 25_000_000);
    }

    #[test]
    fn test_missing_summaries_is_no_data() {
        let temp = TempDir::new().unwrap();
        let report = load_regions(&temp.path().join("missing"));
        assert!(report.is_empty());
    }

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::try_parse_from(["access-maps", "choropleth", "-l", "-o", "out/map.json"]).unwrap();
        match cli.command {
            Commands::Choropleth { config, log_scale, output } => {
                assert_eq!(config, PathBuf::from("config.toml"));
                assert!(log_scale);
                assert_eq!(output, Some(PathBuf::from("out/map.json")));
            }
            Commands::Scatter { .. } => panic!("expected choropleth"),
        }
    }
}
