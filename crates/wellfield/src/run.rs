use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use field::{evaluate_field, FieldParams, Palette, Rgba};
use fieldconfig::{ColorSpaceSetting, FieldConfig};
use renderer::{
    AnimationSpec, ColorSpaceMode, ExportFormat, RenderPolicy, Renderer, RendererConfig,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::cli::{ExportArgs, ProbeArgs, ViewArgs};
use crate::paths::{load_config, resolve_config_location, ConfigLocation};

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Opens the animated (or still) window.
pub fn run_view(config_flag: Option<&std::path::Path>, args: &ViewArgs) -> Result<()> {
    let location = resolve_config_location(config_flag);
    let config = load_config(location.as_ref())?;
    let renderer_config = view_config(&config, args);
    tracing::info!(
        width = renderer_config.surface_size.0,
        height = renderer_config.surface_size.1,
        position = ?renderer_config.position,
        color_space = ?renderer_config.color_space,
        "starting wellfield window"
    );
    Renderer::new(renderer_config).run()
}

/// Renders to disk without opening a window.
pub fn run_export(config_flag: Option<&std::path::Path>, args: &ExportArgs) -> Result<()> {
    let location = resolve_config_location(config_flag);
    let config = load_config(location.as_ref())?;
    let renderer_config = export_config(&config, args)?;
    Renderer::new(renderer_config).run()
}

/// Evaluates the field at one point and prints every stage of the pipeline.
pub fn run_probe(config_flag: Option<&std::path::Path>, args: &ProbeArgs) -> Result<()> {
    let location = resolve_config_location(config_flag);
    let config = load_config(location.as_ref())?;
    let report = ProbeReport::new(
        &config.field_params(),
        &config.palette(),
        args.x,
        args.y,
        args.t,
    );
    if args.json {
        let json = serde_json::to_string_pretty(&report).context("failed to encode probe")?;
        println!("{json}");
    } else {
        print!("{}", report.to_text());
    }
    Ok(())
}

pub fn run_config_where(config_flag: Option<&std::path::Path>) -> Result<()> {
    match resolve_config_location(config_flag) {
        Some(ConfigLocation { path, source }) => {
            let status = if path.exists() { "exists" } else { "missing" };
            println!("config: {} ({source}, {status})", path.display());
        }
        None => println!("config: (none; using built-in defaults)"),
    }
    Ok(())
}

fn color_space(setting: ColorSpaceSetting) -> ColorSpaceMode {
    match setting {
        ColorSpaceSetting::Auto => ColorSpaceMode::Auto,
        ColorSpaceSetting::Gamma => ColorSpaceMode::Gamma,
        ColorSpaceSetting::Linear => ColorSpaceMode::Linear,
    }
}

fn base_config(config: &FieldConfig) -> RendererConfig {
    RendererConfig {
        surface_size: config.window.size,
        position: config.window.position,
        title: config.window.title.clone(),
        color_space: color_space(config.display.color_space),
        policy: RenderPolicy::default(),
        field: config.field_params(),
        palette: config.palette(),
    }
}

/// Merges CLI flags over the loaded configuration for the window path.
fn view_config(config: &FieldConfig, args: &ViewArgs) -> RendererConfig {
    let mut renderer_config = base_config(config);
    if let Some(size) = args.size {
        renderer_config.surface_size = size;
    }
    if let Some(placement) = args.position {
        renderer_config.position = placement.into_position();
    }
    if let Some(mode) = args.color_space {
        renderer_config.color_space = mode;
    }
    renderer_config.policy = match args.still_time {
        Some(time) => RenderPolicy::Still { time },
        None => RenderPolicy::Animate {
            target_fps: args.fps.or(config.window.fps).filter(|fps| *fps > 0.0),
        },
    };
    renderer_config
}

/// Merges CLI flags over the `[export]` section and picks the policy from
/// the output extension.
fn export_config(config: &FieldConfig, args: &ExportArgs) -> Result<RendererConfig> {
    let path = args.output.clone().unwrap_or_else(default_output_path);
    let format = ExportFormat::from_path(&path)?;

    let mut renderer_config = base_config(config);
    renderer_config.surface_size = args.size.unwrap_or(config.export.size);
    renderer_config.policy = match format {
        ExportFormat::Png => {
            if args.duration.is_some() || args.fps.is_some() {
                bail!(
                    "--duration and --fps only apply to GIF exports; {} is a PNG",
                    path.display()
                );
            }
            RenderPolicy::Export {
                path,
                time: args.time.unwrap_or(0.0),
            }
        }
        ExportFormat::Gif if args.time.is_some() => {
            bail!(
                "--time only applies to PNG exports; use --duration and --fps for {}",
                path.display()
            );
        }
        ExportFormat::Gif => RenderPolicy::Record {
            path,
            animation: AnimationSpec {
                duration: args.duration.unwrap_or(config.export.duration),
                fps: args.fps.unwrap_or(config.export.fps),
            },
        },
    };
    Ok(renderer_config)
}

fn default_output_path() -> PathBuf {
    PathBuf::from(
        chrono::Local::now()
            .format("wellfield-%Y%m%d-%H%M%S.png")
            .to_string(),
    )
}

#[derive(Debug, Serialize)]
struct ProbeReport {
    x: f32,
    y: f32,
    t: f32,
    z: f32,
    v: f32,
    color: Rgba,
    display: Rgba,
    display_rgba8: [u8; 4],
}

impl ProbeReport {
    fn new(params: &FieldParams, palette: &Palette, x: f32, y: f32, t: f32) -> Self {
        let z = evaluate_field(x, y, t);
        let v = params.normalize(z);
        let color = palette.colorize(v);
        let display = color.amplified(params.gain);
        Self {
            x,
            y,
            t,
            z,
            v,
            color,
            display,
            display_rgba8: display.to_rgba8(),
        }
    }

    fn to_text(&self) -> String {
        let [r, g, b, a] = self.display_rgba8;
        format!(
            "field   ({}, {}) at t = {}\n\
             z       {:.6}\n\
             v       {:.6}\n\
             color   {}\n\
             display {} #{r:02x}{g:02x}{b:02x}{a:02x}\n",
            self.x,
            self.y,
            self.t,
            self.z,
            self.v,
            format_rgba(&self.color),
            format_rgba(&self.display),
        )
    }
}

fn format_rgba(color: &Rgba) -> String {
    format!(
        "rgba({:.4}, {:.4}, {:.4}, {:.4})",
        color.r, color.g, color.b, color.a
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Placement;
    use std::time::Duration;

    fn export_args(output: &str) -> ExportArgs {
        ExportArgs {
            output: Some(PathBuf::from(output)),
            time: None,
            duration: None,
            fps: None,
            size: None,
        }
    }

    #[test]
    fn view_defaults_follow_config() {
        let renderer_config = view_config(&FieldConfig::default(), &ViewArgs::default());
        assert_eq!(renderer_config.surface_size, (800, 800));
        assert_eq!(renderer_config.position, Some((300, 100)));
        assert_eq!(renderer_config.title, "wellfield");
        assert_eq!(
            renderer_config.policy,
            RenderPolicy::Animate { target_fps: None }
        );
        assert_eq!(renderer_config.field, FieldParams::default());
    }

    #[test]
    fn view_flags_override_config() {
        let mut config = FieldConfig::default();
        config.window.fps = Some(30.0);
        let args = ViewArgs {
            size: Some((320, 240)),
            position: Some(Placement::Auto),
            fps: Some(0.0),
            color_space: Some(ColorSpaceMode::Linear),
            still_time: None,
        };
        let renderer_config = view_config(&config, &args);
        assert_eq!(renderer_config.surface_size, (320, 240));
        assert_eq!(renderer_config.position, None);
        assert_eq!(renderer_config.color_space, ColorSpaceMode::Linear);
        // An explicit zero uncaps even when the config sets a rate.
        assert_eq!(
            renderer_config.policy,
            RenderPolicy::Animate { target_fps: None }
        );
    }

    #[test]
    fn still_time_selects_still_policy() {
        let args = ViewArgs {
            still_time: Some(2.0),
            ..ViewArgs::default()
        };
        let renderer_config = view_config(&FieldConfig::default(), &args);
        assert_eq!(renderer_config.policy, RenderPolicy::Still { time: 2.0 });
    }

    #[test]
    fn export_extension_picks_policy() {
        let config = FieldConfig::default();
        let png_args = ExportArgs {
            time: Some(0.25),
            ..export_args("frame.png")
        };
        let png = export_config(&config, &png_args).unwrap();
        assert_eq!(
            png.policy,
            RenderPolicy::Export {
                path: PathBuf::from("frame.png"),
                time: 0.25
            }
        );

        let gif = export_config(&config, &export_args("loop.gif")).unwrap();
        assert_eq!(
            gif.policy,
            RenderPolicy::Record {
                path: PathBuf::from("loop.gif"),
                animation: AnimationSpec {
                    duration: Duration::from_secs(10),
                    fps: 20.0
                }
            }
        );

        assert!(export_config(&config, &export_args("clip.mp4")).is_err());
    }

    #[test]
    fn export_rejects_flags_for_the_other_format() {
        let config = FieldConfig::default();

        let gif_with_time = ExportArgs {
            time: Some(1.0),
            ..export_args("loop.gif")
        };
        let err = export_config(&config, &gif_with_time).unwrap_err();
        assert!(err.to_string().contains("--time"), "{err}");

        let png_with_fps = ExportArgs {
            fps: Some(10.0),
            ..export_args("frame.png")
        };
        let err = export_config(&config, &png_with_fps).unwrap_err();
        assert!(err.to_string().contains("--fps"), "{err}");

        let png_with_duration = ExportArgs {
            duration: Some(Duration::from_secs(1)),
            ..export_args("frame.png")
        };
        assert!(export_config(&config, &png_with_duration).is_err());

        let png = export_config(&config, &export_args("frame.png")).unwrap();
        assert!(matches!(png.policy, RenderPolicy::Export { time, .. } if time == 0.0));
    }

    #[test]
    fn default_output_is_a_timestamped_png() {
        let path = default_output_path();
        let name = path.to_string_lossy();
        assert!(name.starts_with("wellfield-"));
        assert!(name.ends_with(".png"));
    }

    #[test]
    fn probe_reports_each_stage() {
        let report = ProbeReport::new(&FieldParams::default(), &Palette::default(), 1.5, 0.0, 0.0);
        assert!((report.z - 1.0 / 42.0).abs() < 1e-6);
        assert!((report.v - (report.z + 1.5) / 2.0).abs() < 1e-6);
        assert_eq!(report.color.a, 1.0);
        assert_eq!(report.display.a, 1.5);
        assert_eq!(report.display_rgba8[3], 255);
        let text = report.to_text();
        assert!(text.contains("z       0.023810"));
        assert!(text.contains("display rgba("));
    }
}
