use std::env;
use std::path::PathBuf;

/// Default port of `ev-dss serve`.
pub const DEFAULT_PORT: u16 = 3000;

/// Where analysis defaults are loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Preset(String),
}

impl Default for ConfigSource {
    fn default() -> Self {
        Self::Preset("baseline".to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Validate the zone inputs of a GeoJSON file.
    Zones {
        geojson: PathBuf,
        inputs_out: Option<PathBuf>,
    },
    /// Validate an analysis form and print its payload.
    Payload {
        form: PathBuf,
        power: bool,
        config: ConfigSource,
    },
    /// Serve the REST API.
    Serve { port: u16, config: ConfigSource },
    Help,
}

pub struct CliOptions {
    pub command: Command,
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

pub fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    let Some((name, rest)) = args.split_first() else {
        return Err("missing command (expected `zones`, `payload` or `serve`)".to_string());
    };
    let command = match name.as_str() {
        "zones" => parse_zones(rest)?,
        "payload" => parse_payload(rest)?,
        "serve" => parse_serve(rest)?,
        "--help" | "-h" | "help" => Command::Help,
        other => return Err(format!("unknown command: {other}")),
    };
    Ok(CliOptions { command })
}

fn parse_zones(args: &[String]) -> Result<Command, String> {
    let mut i = 0usize;
    let mut geojson = None;
    let mut inputs_out = None;

    while i < args.len() {
        match args[i].as_str() {
            "--inputs-out" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --inputs-out (expected a CSV file path)",
                )?;
                if inputs_out.replace(PathBuf::from(path)).is_some() {
                    return Err("--inputs-out provided more than once".to_string());
                }
            }
            "--help" | "-h" => return Ok(Command::Help),
            other if other.starts_with("--") => return Err(format!("unknown argument: {other}")),
            path => {
                if geojson.replace(PathBuf::from(path)).is_some() {
                    return Err("only one GeoJSON file may be given".to_string());
                }
            }
        }
        i += 1;
    }

    let geojson = geojson.ok_or_else(|| "missing GeoJSON file path".to_string())?;
    Ok(Command::Zones {
        geojson,
        inputs_out,
    })
}

fn parse_payload(args: &[String]) -> Result<Command, String> {
    let mut i = 0usize;
    let mut form = None;
    let mut power = true;
    let mut config_path = None;
    let mut preset = None;

    while i < args.len() {
        match args[i].as_str() {
            "--form" => {
                i += 1;
                let path =
                    args.next_or_err(i, "missing value for --form (expected a TOML file path)")?;
                if form.replace(PathBuf::from(path)).is_some() {
                    return Err("--form provided more than once".to_string());
                }
            }
            "--no-power" => power = false,
            "--config" | "--preset" => parse_config_flag(args, &mut i, &mut config_path, &mut preset)?,
            "--help" | "-h" => return Ok(Command::Help),
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    let form = form.ok_or_else(|| "missing required argument --form".to_string())?;
    Ok(Command::Payload {
        form,
        power,
        config: config_source(config_path, preset)?,
    })
}

fn parse_serve(args: &[String]) -> Result<Command, String> {
    let mut i = 0usize;
    let mut port = None;
    let mut config_path = None;
    let mut preset = None;

    while i < args.len() {
        match args[i].as_str() {
            "--port" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --port (expected a u16)")?;
                let parsed = raw
                    .parse::<u16>()
                    .map_err(|_| format!("--port value \"{raw}\" is not a valid u16"))?;
                if port.replace(parsed).is_some() {
                    return Err("--port provided more than once".to_string());
                }
            }
            "--config" | "--preset" => parse_config_flag(args, &mut i, &mut config_path, &mut preset)?,
            "--help" | "-h" => return Ok(Command::Help),
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    Ok(Command::Serve {
        port: port.unwrap_or(DEFAULT_PORT),
        config: config_source(config_path, preset)?,
    })
}

fn parse_config_flag(
    args: &[String],
    i: &mut usize,
    config_path: &mut Option<PathBuf>,
    preset: &mut Option<String>,
) -> Result<(), String> {
    let flag = args[*i].as_str();
    *i += 1;
    if flag == "--config" {
        let path = args.next_or_err(*i, "missing value for --config (expected a TOML file path)")?;
        if config_path.replace(PathBuf::from(path)).is_some() {
            return Err("--config provided more than once".to_string());
        }
    } else {
        let name = args.next_or_err(*i, "missing value for --preset (expected a preset name)")?;
        if preset.replace(name.to_string()).is_some() {
            return Err("--preset provided more than once".to_string());
        }
    }
    Ok(())
}

fn config_source(
    config_path: Option<PathBuf>,
    preset: Option<String>,
) -> Result<ConfigSource, String> {
    match (config_path, preset) {
        (Some(_), Some(_)) => Err(
            "arguments `--config` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        ),
        (Some(path), None) => Ok(ConfigSource::File(path)),
        (None, Some(name)) => Ok(ConfigSource::Preset(name)),
        (None, None) => Ok(ConfigSource::default()),
    }
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("ev-dss - EV charging decision-support data tools");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  ev-dss zones <geojson> [--inputs-out <csv>]");
    eprintln!(
        "  ev-dss payload --form <toml> [--no-power] [--config <toml> | --preset <name>]"
    );
    eprintln!("  ev-dss serve [--port <u16>] [--config <toml> | --preset <name>]");
    eprintln!();
    eprintln!("Log verbosity follows RUST_LOG (default: info).");
}
