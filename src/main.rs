//! ev-dss entry point: CLI wiring around zone validation and payload building.

use std::fs;
use std::io;
use std::path::Path;
use std::process;

use tracing_subscriber::EnvFilter;

use ev_dss::cli::{self, Command, ConfigSource};
use ev_dss::config::DssConfig;
use ev_dss::geo::FeatureCollection;
use ev_dss::io::export::export_inputs_csv;
use ev_dss::submission::AnalysisForm;
use ev_dss::zones::ZONE_INPUTS_SCHEMA;
use ev_dss::{DssError, Result};

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| DssError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn load_config(source: &ConfigSource) -> Result<DssConfig> {
    let config = match source {
        ConfigSource::File(path) => DssConfig::from_toml_file(path)?,
        ConfigSource::Preset(name) => DssConfig::from_preset(name)?,
    };
    let mut errors = config.validate().into_iter();
    let Some(first) = errors.next() else {
        return Ok(config);
    };
    for e in errors {
        eprintln!("{e}");
    }
    Err(first.into())
}

/// Validates zone inputs and prints the inputs table.
fn run_zones(geojson: &Path, inputs_out: Option<&Path>) -> Result<()> {
    let mut collection = FeatureCollection::from_json_str(&read_file(geojson)?)?;
    let report = collection.validate_inputs(ZONE_INPUTS_SCHEMA);
    let total = collection.features.len();

    println!("{:<10} {:>7}  description", "field", "valid");
    for field in ZONE_INPUTS_SCHEMA {
        let valid = format!("{}/{total}", report.count(field.name));
        println!("{:<10} {valid:>7}  {}", field.name, field.description);
    }
    println!(
        "\nall inputs valid: {}",
        if report.all_inputs_valid { "yes" } else { "no" }
    );

    if let Some(bounds) = collection.area_bounds() {
        tracing::info!(
            south_west = ?bounds.south_west,
            north_east = ?bounds.north_east,
            "zone extent"
        );
    }

    if let Some(path) = inputs_out {
        export_inputs_csv(&report, ZONE_INPUTS_SCHEMA, total, path)?;
        eprintln!("Inputs table written to {}", path.display());
    }
    Ok(())
}

/// Validates a form file and prints the backend payload as JSON.
fn run_payload(form_path: &Path, power: bool, source: &ConfigSource) -> Result<()> {
    let config = load_config(source)?;
    let form = AnalysisForm::from_toml_str(&read_file(form_path)?, &config)?;

    let errors = form.validate(&[]);
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        return Err(DssError::InvalidForm(errors));
    }

    let payload = form.to_payload_with(power, &config.output);
    serde_json::to_writer_pretty(io::stdout().lock(), &payload)?;
    println!();
    Ok(())
}

#[cfg(feature = "api")]
fn run_serve(port: u16, source: &ConfigSource) -> Result<()> {
    use std::net::SocketAddr;
    use std::sync::Arc;

    let config = load_config(source)?;
    let state = Arc::new(ev_dss::api::AppState::new(config));
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(ev_dss::api::serve(state, addr))?;
    Ok(())
}

#[cfg(not(feature = "api"))]
fn run_serve(_port: u16, _source: &ConfigSource) -> Result<()> {
    eprintln!("error: ev-dss was built without the `api` feature");
    process::exit(2);
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let opts = match cli::parse_args() {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("error: {e}");
            cli::print_usage();
            process::exit(2);
        }
    };

    let outcome = match &opts.command {
        Command::Zones {
            geojson,
            inputs_out,
        } => run_zones(geojson, inputs_out.as_deref()),
        Command::Payload {
            form,
            power,
            config,
        } => run_payload(form, *power, config),
        Command::Serve { port, config } => run_serve(*port, config),
        Command::Help => {
            cli::print_usage();
            Ok(())
        }
    };

    if let Err(e) = outcome {
        tracing::error!("{e}");
        process::exit(1);
    }
}
