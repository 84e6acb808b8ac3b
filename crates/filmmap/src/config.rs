use std::env;
use std::path::PathBuf;
use std::time::Duration;

use filmloc_catalog::LoadMode;
use filmloc_geocode::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, NominatimConfig};

const DEFAULT_CATALOG: &str = "locations.list";
const DEFAULT_WORLD: &str = "world.json";
const DEFAULT_OUTPUT: &str = "Res_Map.html";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_GEOCODER_RPS: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Prompt for a year and write the map artifact.
    Build,
    /// Serve read-only year/country queries over HTTP.
    Serve,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub command: Command,
    pub catalog_path: PathBuf,
    pub load_mode: LoadMode,
    pub world_path: PathBuf,
    pub output_path: PathBuf,
    /// Raw `--year=` value; validated like prompt input.
    pub year: Option<String>,
    pub geocoder: NominatimConfig,
    pub host: String,
    pub port: u16,
    pub disable_cache: bool,
    pub unknown_args: Vec<String>,
}

/// Command-line overrides, before environment fallbacks are applied.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CliArgs {
    pub serve: bool,
    pub catalog: Option<PathBuf>,
    pub world: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub load_mode: Option<LoadMode>,
    pub year: Option<String>,
    pub disable_cache: bool,
    pub unknown: Vec<String>,
}

pub fn parse_args<I>(args: I) -> CliArgs
where
    I: IntoIterator<Item = String>,
{
    let mut cli = CliArgs::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "serve" => cli.serve = true,
            "--no-cache" => cli.disable_cache = true,
            "--catalog" | "--world" | "--output" | "--year" | "--load-mode" => {
                if let Some(value) = args.next() {
                    apply_flag(&mut cli, &arg, value);
                }
            }
            _ => match arg.split_once('=') {
                Some((flag, value)) if flag.starts_with("--") => {
                    if !apply_flag(&mut cli, flag, value.to_string()) {
                        cli.unknown.push(arg);
                    }
                }
                _ => cli.unknown.push(arg),
            },
        }
    }
    cli
}

fn apply_flag(cli: &mut CliArgs, flag: &str, value: String) -> bool {
    match flag {
        "--catalog" => cli.catalog = Some(PathBuf::from(value)),
        "--world" => cli.world = Some(PathBuf::from(value)),
        "--output" => cli.output = Some(PathBuf::from(value)),
        "--year" => cli.year = Some(value),
        "--load-mode" => cli.load_mode = parse_load_mode(&value),
        _ => return false,
    }
    true
}

pub fn load_config() -> Config {
    let cli = parse_args(env::args().skip(1));

    let catalog_path = cli
        .catalog
        .or_else(|| env::var("CATALOG_PATH").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG));
    let load_mode = cli
        .load_mode
        .or_else(|| {
            env::var("CATALOG_LOAD_MODE")
                .ok()
                .as_deref()
                .and_then(parse_load_mode)
        })
        .unwrap_or(LoadMode::Mmap);
    let world_path = cli
        .world
        .or_else(|| env::var("WORLD_GEOJSON").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_WORLD));
    let output_path = cli
        .output
        .or_else(|| env::var("OUTPUT_PATH").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    let geocoder = NominatimConfig {
        base_url: env::var("NOMINATIM_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
        user_agent: env::var("GEOCODER_USER_AGENT")
            .unwrap_or_else(|_| concat!("filmmap/", env!("CARGO_PKG_VERSION")).to_string()),
        timeout: env::var("GEOCODER_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|v| *v > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT),
        requests_per_sec: env::var("GEOCODER_RPS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_GEOCODER_RPS),
    };

    let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);

    Config {
        command: if cli.serve {
            Command::Serve
        } else {
            Command::Build
        },
        catalog_path,
        load_mode,
        world_path,
        output_path,
        year: cli.year,
        geocoder,
        host,
        port,
        disable_cache: cli.disable_cache,
        unknown_args: cli.unknown,
    }
}

pub fn parse_load_mode(raw: &str) -> Option<LoadMode> {
    match raw.to_ascii_lowercase().as_str() {
        "mmap" => Some(LoadMode::Mmap),
        "owned" => Some(LoadMode::Owned),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> CliArgs {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn defaults_to_build_without_overrides() {
        assert_eq!(args(&[]), CliArgs::default());
    }

    #[test]
    fn accepts_both_flag_styles() {
        let cli = args(&[
            "--catalog=data/locations.list",
            "--world",
            "geo/world.json",
            "--year=1994",
            "--load-mode=OWNED",
        ]);
        assert_eq!(cli.catalog, Some(PathBuf::from("data/locations.list")));
        assert_eq!(cli.world, Some(PathBuf::from("geo/world.json")));
        assert_eq!(cli.year.as_deref(), Some("1994"));
        assert_eq!(cli.load_mode, Some(LoadMode::Owned));
        assert!(cli.unknown.is_empty());
    }

    #[test]
    fn serve_and_unknown_arguments() {
        let cli = args(&["serve", "--no-cache", "--bogus=1", "stray"]);
        assert!(cli.serve);
        assert!(cli.disable_cache);
        assert_eq!(cli.unknown, vec!["--bogus=1", "stray"]);
    }

    #[test]
    fn year_is_kept_raw_for_validation() {
        let cli = args(&["--year=abc"]);
        assert_eq!(cli.year.as_deref(), Some("abc"));
    }
}
