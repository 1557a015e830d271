#[macro_use]
extern crate tracing;

use anyhow::{Context, Result};
use chrono::prelude::*;
use clap::Parser;
use moonapi::{
    AnalyticEphemeris, CrimeClient, Geocoder, OffenseCode, ZipDirectory, ZippopotamGeocoder,
};
use std::path::PathBuf;
use std::process::exit;
use tracing_subscriber::prelude::*;

mod config;
mod parser;
mod pipeline;
mod report;

use config::Settings;
use pipeline::{CrimeOptions, Options, Pipeline};
use report::{HtmlSink, ReportSink, TableSink, TextPanel};

#[derive(Parser)]
#[clap(author, version, about)]
struct Args {
    #[clap(short, long, action)]
    verbose: bool,

    #[clap(long, value_parser = parser::parse_date, help = "YYYY-MM-DD[THH:MM[:SS]] in UTC, defaults to today")]
    date: Option<DateTime<Utc>>,

    #[clap(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=3660), help = "Number of consecutive days, more than one prints a table")]
    days: u32,

    #[clap(long, value_parser = parser::parse_zip, help = "US ZIP code of the observer")]
    zip: Option<String>,

    #[clap(long, value_parser = parser::parse_latitude, allow_hyphen_values = true, requires = "longitude")]
    latitude: Option<f64>,

    #[clap(long, value_parser = parser::parse_longitude, allow_hyphen_values = true, requires = "latitude")]
    longitude: Option<f64>,

    #[clap(long, action, help = "Show moonrise and moonset, needs a location")]
    rise_set: bool,

    #[clap(long, action, requires = "zip", help = "Show FBI crime statistics for the state of the ZIP code")]
    crime: bool,

    #[clap(long, value_parser = parser::parse_offense, help = "Offense for --crime, e.g. V, ROB, burglary")]
    offense: Option<OffenseCode>,

    #[clap(long, help = "Year for --crime, defaults to last year")]
    crime_year: Option<i32>,

    #[clap(long, env = "FBI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[clap(
        long,
        help = "ZIP code dataset (JSON), defaults to zipcodes.json in the user data dir. A sample ships as data/zipcodes.json"
    )]
    zip_data: Option<PathBuf>,

    #[clap(long, help = "Where to cache the parsed ZIP code dataset")]
    zip_cache: Option<PathBuf>,

    #[clap(long, action, help = "Resolve ZIP codes with zippopotam.us instead of the local dataset")]
    remote_geocoder: bool,

    #[clap(long, help = "Also write an HTML report to this file")]
    html: Option<PathBuf>,

    #[clap(long, action)]
    no_color: bool,
}

fn main() {
    dotenv::dotenv().ok();

    let args = Args::parse();

    let log_level = if args.verbose {
        "info,moonapi=debug,moonphase=debug,reqwest=debug"
    } else {
        "warn"
    };

    let filter = match std::env::var("RUST_LOG") {
        Ok(filter) => tracing_subscriber::EnvFilter::builder().parse_lossy(filter),
        Err(_) => tracing_subscriber::EnvFilter::builder().parse_lossy(log_level),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_forest::ForestLayer::from(
            tracing_forest::printer::PrettyPrinter::new().writer(std::io::stderr),
        ))
        .init();

    if let Err(err) = run(args) {
        error!("{:#}", err);
        exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let settings = Settings::new().unwrap_or_else(|err| {
        warn!("cannot read settings: {}", err);
        Settings::default()
    });

    let start = args.date.unwrap_or_else(|| {
        Local::now()
            .date_naive()
            .and_time(NaiveTime::default())
            .and_utc()
    });

    let coordinates = args
        .latitude
        .zip(args.longitude)
        .or_else(|| settings.coordinates());

    let crime = if args.crime {
        let offense = match args.offense {
            Some(offense) => offense,
            None => settings
                .offense
                .as_deref()
                .map(str::parse::<OffenseCode>)
                .transpose()
                .context("invalid offense in settings")?
                .unwrap_or_default(),
        };
        let year = args.crime_year.unwrap_or_else(|| Local::now().year() - 1);
        Some(CrimeOptions { offense, year })
    } else {
        None
    };

    let options = Options {
        start,
        days: args.days,
        zip: args.zip.clone(),
        coordinates,
        rise_set: args.rise_set,
        crime,
    };

    let mut pipeline = Pipeline::new(AnalyticEphemeris::new());

    if options.zip.is_some() {
        pipeline = pipeline.with_geocoder(geocoder(&args, &settings)?);
    }

    if options.crime.is_some() {
        match args.api_key.clone().or_else(|| settings.api_key.clone()) {
            Some(api_key) => {
                let client = CrimeClient::new(api_key, settings.timeout())
                    .context("cannot create crime statistics client")?;
                pipeline = pipeline.with_crime_source(client);
            }
            None => warn!("no api key for crime statistics, use --api-key or FBI_API_KEY"),
        }
    }

    let report = pipeline.run(&options)?;

    let color = !args.no_color && termion::is_tty(&std::io::stdout());
    let output = if options.days > 1 {
        TableSink::new().render(&report)
    } else {
        TextPanel::new(color).render(&report)
    };
    print!("{}", output);

    if let Some(path) = &args.html {
        match std::fs::write(path, HtmlSink::new().render(&report)) {
            Ok(()) => info!("wrote html report to {:?}", path),
            Err(err) => warn!("cannot write html report to {:?}: {}", path, err),
        }
    }

    Ok(())
}

/// The local dataset unless --remote-geocoder is given or it cannot be read.
fn geocoder(args: &Args, settings: &Settings) -> Result<Box<dyn Geocoder>> {
    let remote = || -> Result<Box<dyn Geocoder>> {
        let geocoder = ZippopotamGeocoder::new(settings.timeout())
            .context("cannot create geocoding client")?;
        Ok(Box::new(geocoder))
    };

    if args.remote_geocoder {
        return remote();
    }

    let dataset = args
        .zip_data
        .clone()
        .or_else(|| settings.zip_data.clone())
        .or_else(config::default_zip_data);
    let cache = args
        .zip_cache
        .clone()
        .or_else(|| settings.zip_cache.clone())
        .or_else(config::default_zip_cache);

    match (dataset, cache) {
        (Some(dataset), Some(cache)) => match ZipDirectory::open(&dataset, &cache) {
            Ok(directory) => {
                debug!("{} ZIP codes loaded", directory.len());
                Ok(Box::new(directory))
            }
            Err(err) => {
                warn!(
                    "cannot load ZIP data from {:?}: {}, falling back to zippopotam.us",
                    dataset, err
                );
                remote()
            }
        },
        _ => {
            warn!("no ZIP dataset location, falling back to zippopotam.us");
            remote()
        }
    }
}
