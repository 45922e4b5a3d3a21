use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use fieldconfig::{parse_position, parse_size};
use renderer::ColorSpaceMode;

#[derive(Parser, Debug)]
#[command(
    name = "wellfield",
    author,
    version,
    about = "Animated two-well scalar field viewer",
    arg_required_else_help = false
)]
pub struct Cli {
    /// Configuration file (overrides `WELLFIELD_CONFIG` and the user config directory).
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
    #[command(flatten)]
    pub view: ViewArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Args, Debug, Default)]
pub struct ViewArgs {
    /// Window size in physical pixels (e.g. `800x800`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<(u32, u32)>,

    /// Window position (`X,Y`) or `auto` to let the platform decide.
    #[arg(long, value_name = "X,Y|auto", value_parser = parse_placement)]
    pub position: Option<Placement>,

    /// Frame rate cap for the window (0 = uncapped).
    #[arg(long, value_name = "FPS", value_parser = parse_fps)]
    pub fps: Option<f32>,

    /// Output color space handling: `auto`, `gamma`, or `linear`.
    #[arg(long, value_name = "MODE", value_parser = parse_color_space)]
    pub color_space: Option<ColorSpaceMode>,

    /// Show a single frame at this many seconds instead of animating.
    #[arg(long, value_name = "SECONDS", allow_negative_numbers = true)]
    pub still_time: Option<f32>,
}

/// Requested window placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Auto,
    At(i32, i32),
}

impl Placement {
    pub fn into_position(self) -> Option<(i32, i32)> {
        match self {
            Self::Auto => None,
            Self::At(x, y) => Some((x, y)),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render headlessly to a PNG (single frame) or GIF (animation).
    Export(ExportArgs),
    /// Evaluate the field at one point and print the result.
    Probe(ProbeArgs),
    /// Inspect configuration discovery.
    Config(ConfigCommand),
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output path; the extension selects the format (`.png` or `.gif`).
    #[arg(long, short, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Timestamp in seconds for PNG exports (default 0).
    #[arg(long, value_name = "SECONDS", allow_negative_numbers = true)]
    pub time: Option<f32>,

    /// Animation length for GIF exports (e.g. `10s`, `1500ms`, or plain seconds).
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub duration: Option<Duration>,

    /// Animation frame rate for GIF exports.
    #[arg(long, value_name = "FPS", value_parser = parse_fps)]
    pub fps: Option<f32>,

    /// Image size in pixels (e.g. `800x800`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<(u32, u32)>,
}

#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Field-space x coordinate.
    #[arg(long, allow_negative_numbers = true)]
    pub x: f32,

    /// Field-space y coordinate.
    #[arg(long, allow_negative_numbers = true)]
    pub y: f32,

    /// Field-space time (already scaled).
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub t: f32,

    /// Print a JSON object instead of text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print which configuration file would be loaded.
    Where,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_placement(value: &str) -> Result<Placement, String> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("auto") {
        return Ok(Placement::Auto);
    }
    let (x, y) = parse_position(trimmed)?;
    Ok(Placement::At(x, y))
}

pub fn parse_fps(value: &str) -> Result<f32, String> {
    let fps: f32 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid frame rate '{value}'"))?;
    if !fps.is_finite() || fps < 0.0 {
        return Err(format!("frame rate must be a non-negative number (got {value})"));
    }
    Ok(fps)
}

/// Accepts humantime durations (`1m 30s`, `250ms`) or plain seconds (`2.5`).
pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let trimmed = value.trim();
    if let Ok(seconds) = trimmed.parse::<f64>() {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(format!("duration must be non-negative (got {value})"));
        }
        return Duration::try_from_secs_f64(seconds)
            .map_err(|err| format!("duration {value} is out of range: {err}"));
    }
    humantime::parse_duration(trimmed).map_err(|err| format!("invalid duration '{value}': {err}"))
}

pub fn parse_color_space(value: &str) -> Result<ColorSpaceMode, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("color space must not be empty".to_string());
    }

    let normalized = trimmed.to_ascii_lowercase();
    match normalized.as_str() {
        "auto" => Ok(ColorSpaceMode::Auto),
        "gamma" | "srgb-off" => Ok(ColorSpaceMode::Gamma),
        "linear" | "srgb" => Ok(ColorSpaceMode::Linear),
        other => Err(format!(
            "unknown color space '{other}'; expected auto, gamma, or linear"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_placement_variants() {
        assert_eq!(parse_placement("auto").unwrap(), Placement::Auto);
        assert_eq!(parse_placement("AUTO").unwrap().into_position(), None);
        assert_eq!(parse_placement("300,100").unwrap(), Placement::At(300, 100));
        assert_eq!(parse_placement("-20, 5").unwrap(), Placement::At(-20, 5));
        assert!(parse_placement("left").is_err());
    }

    #[test]
    fn parses_durations_and_seconds() {
        assert_eq!(parse_duration("10s").unwrap(), Duration::from_secs(10));
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("2.5").unwrap(), Duration::from_millis(2500));
        assert!(parse_duration("-1").is_err());
        assert!(parse_duration("soon").is_err());
    }

    #[test]
    fn oversized_duration_is_rejected() {
        assert!(parse_duration("1e20").is_err());
        let err = Cli::try_parse_from(["wellfield", "export", "-o", "a.gif", "--duration", "1e20"])
            .unwrap_err();
        assert!(err.to_string().contains("out of range"), "{err}");
    }

    #[test]
    fn fps_rejects_negative_and_nan() {
        assert_eq!(parse_fps("20").unwrap(), 20.0);
        assert_eq!(parse_fps("0").unwrap(), 0.0);
        assert!(parse_fps("-5").is_err());
        assert!(parse_fps("NaN").is_err());
    }

    #[test]
    fn color_space_aliases() {
        assert_eq!(parse_color_space("Linear").unwrap(), ColorSpaceMode::Linear);
        assert_eq!(parse_color_space("srgb").unwrap(), ColorSpaceMode::Linear);
        assert_eq!(parse_color_space("gamma").unwrap(), ColorSpaceMode::Gamma);
        assert!(parse_color_space("").is_err());
        assert!(parse_color_space("hdr").is_err());
    }

    #[test]
    fn probe_accepts_negative_coordinates() {
        let cli = Cli::try_parse_from(["wellfield", "probe", "--x", "-1.5", "--y", "0.25"]).unwrap();
        match cli.command {
            Some(Command::Probe(args)) => {
                assert_eq!(args.x, -1.5);
                assert_eq!(args.y, 0.25);
                assert_eq!(args.t, 0.0);
                assert!(!args.json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn view_flags_parse_without_subcommand() {
        let cli = Cli::try_parse_from([
            "wellfield",
            "--size",
            "640x480",
            "--position",
            "auto",
            "--still-time",
            "1.5",
        ])
        .unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.view.size, Some((640, 480)));
        assert_eq!(cli.view.position, Some(Placement::Auto));
        assert_eq!(cli.view.still_time, Some(1.5));
    }

    #[test]
    fn global_config_flag_follows_subcommand() {
        let cli = Cli::try_parse_from([
            "wellfield",
            "export",
            "--config",
            "custom.toml",
            "--output",
            "out.gif",
            "--duration",
            "1s",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        match cli.command {
            Some(Command::Export(args)) => {
                assert_eq!(args.output, Some(PathBuf::from("out.gif")));
                assert_eq!(args.duration, Some(Duration::from_secs(1)));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
