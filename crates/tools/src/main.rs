use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use foundation::{GeoPoint, haversine_m};
use ingest::{
    DEFAULT_GEOCODE_CONCURRENCY, DEFAULT_NOMINATIM_URL, DEFAULT_USER_AGENT, Geocoder, Loader,
    NominatimGeocoder, source_for,
};
use proximity::{MarkerRecord, ProximityFilter, Region, parse_radius_km};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Filter geocoded addresses by distance from a point")]
struct Args {
    /// Nominatim base URL
    #[arg(long, default_value = DEFAULT_NOMINATIM_URL, global = true)]
    geocoder_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Geocode an address list and print the entries inside the radius
    Filter {
        /// Address list: JSON file path or http(s) URL
        #[arg(long)]
        locations: String,

        /// Region center as LAT,LON
        #[arg(long, allow_hyphen_values = true, conflicts_with = "center_address", required_unless_present = "center_address")]
        center: Option<GeoPoint>,

        /// Region center as an address to geocode
        #[arg(long)]
        center_address: Option<String>,

        /// Radius in kilometers; negative values clamp to zero
        #[arg(long, default_value = "5", allow_hyphen_values = true)]
        radius_km: String,

        /// Concurrent geocoding lookups
        #[arg(long, default_value_t = DEFAULT_GEOCODE_CONCURRENCY)]
        concurrency: usize,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Great-circle distance in meters between two LAT,LON points
    Distance {
        #[arg(allow_hyphen_values = true)]
        from: GeoPoint,
        #[arg(allow_hyphen_values = true)]
        to: GeoPoint,
    },
}

#[derive(Debug, Serialize)]
struct VisibleRow<'a> {
    distance_m: f64,
    #[serde(flatten)]
    record: &'a MarkerRecord,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match args.command {
        Command::Filter {
            locations,
            center,
            center_address,
            radius_km,
            concurrency,
            json,
        } => {
            let geocoder = Arc::new(
                NominatimGeocoder::new(&args.geocoder_url, DEFAULT_USER_AGENT)
                    .context("build HTTP client")?,
            );
            let center = match (center, center_address) {
                (Some(point), _) => point,
                (None, Some(address)) => geocoder
                    .geocode(&address)
                    .await
                    .with_context(|| format!("locate center {address:?}"))?,
                (None, None) => anyhow::bail!("either --center or --center-address is required"),
            };
            let radius_m = parse_radius_km(&radius_km)?;

            let loader = Loader::new(geocoder).with_concurrency(concurrency);
            let source = source_for(&locations, reqwest::Client::new());
            let outcome = loader
                .load(source.as_ref())
                .await
                .with_context(|| format!("load {}", source.describe()))?;
            for notice in &outcome.notices {
                eprintln!("skipped {:?}: {}", notice.subject, notice.message);
            }

            let mut filter = ProximityFilter::new(Region::new(center, radius_m));
            filter.reset_records(outcome.records);
            info!(
                total = filter.len(),
                radius_m = filter.region().radius_m(),
                "filtered"
            );
            print_visible(&filter, json)
        }
        Command::Distance { from, to } => {
            println!("{:.1}", haversine_m(from, to));
            Ok(())
        }
    }
}

fn visible_rows(filter: &ProximityFilter) -> Vec<VisibleRow<'_>> {
    let center = filter.region().center();
    let mut rows: Vec<_> = filter
        .visible_records()
        .map(|record| VisibleRow {
            distance_m: haversine_m(center, record.location()),
            record,
        })
        .collect();
    rows.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));
    rows
}

fn print_visible(filter: &ProximityFilter, json: bool) -> anyhow::Result<()> {
    let rows = visible_rows(filter);
    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    for row in &rows {
        println!("{}", format_row(row));
    }
    eprintln!("{} of {} inside {:.0} m", rows.len(), filter.len(), filter.region().radius_m());
    Ok(())
}

fn format_row(row: &VisibleRow<'_>) -> String {
    let address = row.record.address().unwrap_or("?");
    match row.record.category() {
        Some(category) => format!("{:>9.2} km  {address}  [{category}]", row.distance_m / 1000.0),
        None => format!("{:>9.2} km  {address}", row.distance_m / 1000.0),
    }
}

#[cfg(test)]
mod tests {
    use super::{Args, Command, format_row, visible_rows};
    use clap::Parser;
    use foundation::{GeoPoint, RecordId};
    use proximity::{MarkerRecord, ProximityFilter, Region, parse_radius_km};
    use std::collections::BTreeMap;

    fn p(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    #[test]
    fn parses_filter_with_coordinates() {
        let args = Args::try_parse_from([
            "proximity",
            "filter",
            "--locations",
            "locations.json",
            "--center",
            "53.1653,5.7815",
            "--radius-km",
            "10",
        ])
        .unwrap();
        match args.command {
            Command::Filter {
                center, radius_km, ..
            } => {
                assert_eq!(center, Some(p(53.1653, 5.7815)));
                assert_eq!(radius_km, "10");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn center_is_required_once() {
        assert!(Args::try_parse_from(["proximity", "filter", "--locations", "l.json"]).is_err());
        assert!(
            Args::try_parse_from([
                "proximity",
                "filter",
                "--locations",
                "l.json",
                "--center",
                "1,2",
                "--center-address",
                "Dam 1",
            ])
            .is_err()
        );
    }

    #[test]
    fn negative_radius_reaches_the_clamp() {
        let args = Args::try_parse_from([
            "proximity",
            "filter",
            "--locations",
            "locations.json",
            "--center",
            "53.1653,5.7815",
            "--radius-km",
            "-5",
        ])
        .unwrap();
        let Command::Filter { radius_km, .. } = args.command else {
            panic!("expected filter");
        };
        assert_eq!(radius_km, "-5");
        let region = Region::new(p(53.1653, 5.7815), parse_radius_km(&radius_km).unwrap());
        assert_eq!(region.radius_m(), 0.0);
    }

    #[test]
    fn distance_accepts_negative_coordinates() {
        let args =
            Args::try_parse_from(["proximity", "distance", "-33.86,151.21", "51.5,-0.12"]).unwrap();
        assert!(matches!(args.command, Command::Distance { .. }));
    }

    #[test]
    fn rows_are_nearest_first() {
        let mut filter = ProximityFilter::new(Region::new(p(53.1653, 5.7815), 30_000.0));
        let named = |id: u64, lat: f64, lon: f64, address: &str| {
            MarkerRecord::new(
                RecordId::new(id),
                p(lat, lon),
                BTreeMap::from([("address".to_string(), address.to_string())]),
            )
        };
        filter.reset_records(vec![
            named(1, 53.30, 5.90, "far"),
            named(2, 53.1653, 5.7815, "here"),
            named(3, 60.0, 5.0, "out"),
        ]);

        let rows = visible_rows(&filter);
        let addresses: Vec<_> = rows.iter().map(|r| r.record.address().unwrap()).collect();
        assert_eq!(addresses, vec!["here", "far"]);
        assert_eq!(format_row(&rows[0]), "     0.00 km  here");
    }
}
