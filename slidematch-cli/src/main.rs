use clap::Parser;
use slidematch::{
    CannyThresholds, CompareConfig, Engine, KeypointConfig, MatchConfig, Mode, SlideMatcher,
    SlideOutcome, SlotConfig,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Slider puzzle matcher (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Overrides the mode named in the config.
    #[arg(short, long)]
    mode: Option<String>,
    /// Overrides the engine named in the config.
    #[arg(short, long)]
    engine: Option<String>,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct CannyJson {
    low: f64,
    high: f64,
}

impl From<CannyThresholds> for CannyJson {
    fn from(value: CannyThresholds) -> Self {
        Self {
            low: value.low,
            high: value.high,
        }
    }
}

impl From<CannyJson> for CannyThresholds {
    fn from(value: CannyJson) -> Self {
        CannyThresholds::new(value.low, value.high)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct CompareJson {
    diff_threshold: u8,
    min_count: usize,
    x_offset: u32,
    y_backoff: u32,
}

impl Default for CompareJson {
    fn default() -> Self {
        let cfg = CompareConfig::default();
        Self {
            diff_threshold: cfg.diff_threshold,
            min_count: cfg.min_count,
            x_offset: cfg.x_offset,
            y_backoff: cfg.y_backoff,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ThresholdsJson {
    simple_canny: CannyJson,
    standard_canny: CannyJson,
    match_min_score: f64,
    gray_min_score: f64,
    edge_low_canny: CannyJson,
    edge_low_min_score: f64,
    edge_mid_canny: CannyJson,
    edge_mid_min_score: f64,
    slot_min_energy: f64,
    keypoint_max_distance: f32,
    keypoint_min_matches: usize,
    compare: CompareJson,
}

impl Default for ThresholdsJson {
    fn default() -> Self {
        let cfg = MatchConfig::default();
        Self {
            simple_canny: cfg.simple_canny.into(),
            standard_canny: cfg.standard_canny.into(),
            match_min_score: cfg.match_min_score,
            gray_min_score: cfg.gray_min_score,
            edge_low_canny: cfg.edge_low_canny.into(),
            edge_low_min_score: cfg.edge_low_min_score,
            edge_mid_canny: cfg.edge_mid_canny.into(),
            edge_mid_min_score: cfg.edge_mid_min_score,
            slot_min_energy: cfg.slot.min_energy,
            keypoint_max_distance: cfg.keypoint.max_distance,
            keypoint_min_matches: cfg.keypoint.min_matches,
            compare: CompareJson::default(),
        }
    }
}

impl From<ThresholdsJson> for MatchConfig {
    fn from(value: ThresholdsJson) -> Self {
        MatchConfig {
            simple_canny: value.simple_canny.into(),
            standard_canny: value.standard_canny.into(),
            match_min_score: value.match_min_score,
            gray_min_score: value.gray_min_score,
            edge_low_canny: value.edge_low_canny.into(),
            edge_low_min_score: value.edge_low_min_score,
            edge_mid_canny: value.edge_mid_canny.into(),
            edge_mid_min_score: value.edge_mid_min_score,
            slot: SlotConfig {
                min_energy: value.slot_min_energy,
            },
            compare: CompareConfig {
                diff_threshold: value.compare.diff_threshold,
                min_count: value.compare.min_count,
                x_offset: value.compare.x_offset,
                y_backoff: value.compare.y_backoff,
            },
            keypoint: KeypointConfig {
                max_distance: value.keypoint_max_distance,
                min_matches: value.keypoint_min_matches,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    piece_path: String,
    background_path: String,
    output_path: Option<String>,
    mode: String,
    engine: String,
    thresholds: ThresholdsJson,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            piece_path: String::new(),
            background_path: String::new(),
            output_path: None,
            mode: Mode::Standard.as_str().to_string(),
            engine: Engine::default().as_str().to_string(),
            thresholds: ThresholdsJson::default(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Output {
    Bbox {
        mode: &'static str,
        engine: &'static str,
        target_y: i32,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
    },
    Gap {
        mode: &'static str,
        engine: &'static str,
        x: u32,
        y: u32,
    },
}

impl Output {
    fn new(outcome: SlideOutcome, mode: Mode, engine: Engine) -> Self {
        let (mode, engine) = (mode.as_str(), engine.as_str());
        match outcome {
            SlideOutcome::Bbox(r) => Output::Bbox {
                mode,
                engine,
                target_y: r.target_y_offset,
                x1: r.x1,
                y1: r.y1,
                x2: r.x2,
                y2: r.y2,
            },
            SlideOutcome::Gap(g) => Output::Gap {
                mode,
                engine,
                x: g.x,
                y: g.y,
            },
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("slidematch=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.piece_path.is_empty() || config.background_path.is_empty() {
        return Err("piece_path and background_path must be set in the config".into());
    }

    let mode: Mode = cli.mode.as_deref().unwrap_or(&config.mode).parse()?;
    let engine: Engine = cli.engine.as_deref().unwrap_or(&config.engine).parse()?;
    let matcher = SlideMatcher::new(engine)?.with_config(config.thresholds.into());

    let outcome = matcher.run_paths(mode, &config.piece_path, &config.background_path)?;
    tracing::info!(%mode, %engine, ?outcome, "matched");
    let json = serde_json::to_string_pretty(&Output::new(outcome, mode, engine))?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
