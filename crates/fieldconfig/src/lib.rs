use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use field::{FieldParams, Palette};
use serde::de::{self, Deserializer};
use serde::Deserialize;

pub const CONFIG_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpaceSetting {
    #[default]
    Auto,
    Gamma,
    Linear,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldConfig {
    pub version: u32,
    #[serde(default)]
    pub field: FieldSection,
    #[serde(default)]
    pub display: DisplaySection,
    #[serde(default)]
    pub palette: PaletteSection,
    #[serde(default)]
    pub window: WindowSection,
    #[serde(default)]
    pub export: ExportSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldSection {
    pub x_scale: f32,
    pub y_scale: f32,
    pub t_scale: f32,
    pub z_offset: f32,
    pub z_max: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplaySection {
    pub gain: f32,
    pub color_space: ColorSpaceSetting,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaletteSection {
    #[serde(deserialize_with = "deserialize_color")]
    pub low: [u8; 3],
    #[serde(deserialize_with = "deserialize_color")]
    pub mid: [u8; 3],
    #[serde(deserialize_with = "deserialize_color")]
    pub high: [u8; 3],
    pub lower_knee: f32,
    pub upper_knee: f32,
    pub top: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowSection {
    #[serde(deserialize_with = "deserialize_size")]
    pub size: (u32, u32),
    #[serde(deserialize_with = "deserialize_position_opt")]
    pub position: Option<(i32, i32)>,
    pub title: String,
    pub fps: Option<f32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportSection {
    #[serde(deserialize_with = "deserialize_duration")]
    pub duration: Duration,
    pub fps: f32,
    #[serde(deserialize_with = "deserialize_size")]
    pub size: (u32, u32),
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            field: FieldSection::default(),
            display: DisplaySection::default(),
            palette: PaletteSection::default(),
            window: WindowSection::default(),
            export: ExportSection::default(),
        }
    }
}

impl Default for FieldSection {
    fn default() -> Self {
        let params = FieldParams::default();
        Self {
            x_scale: params.x_scale,
            y_scale: params.y_scale,
            t_scale: params.t_scale,
            z_offset: params.z_offset,
            z_max: params.z_max,
        }
    }
}

impl Default for DisplaySection {
    fn default() -> Self {
        Self {
            gain: FieldParams::default().gain,
            color_space: ColorSpaceSetting::default(),
        }
    }
}

impl Default for PaletteSection {
    fn default() -> Self {
        let palette = Palette::default();
        Self {
            low: [0, 188, 212],
            mid: [132, 188, 212],
            high: [1, 1, 33],
            lower_knee: palette.lower_knee,
            upper_knee: palette.upper_knee,
            top: palette.top,
        }
    }
}

impl Default for WindowSection {
    fn default() -> Self {
        Self {
            size: (800, 800),
            position: Some((300, 100)),
            title: "wellfield".to_string(),
            fps: None,
        }
    }
}

impl Default for ExportSection {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(10),
            fps: 20.0,
            size: (800, 800),
        }
    }
}

impl FieldConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: FieldConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn field_params(&self) -> FieldParams {
        FieldParams {
            x_scale: self.field.x_scale,
            y_scale: self.field.y_scale,
            t_scale: self.field.t_scale,
            z_offset: self.field.z_offset,
            z_max: self.field.z_max,
            gain: self.display.gain,
        }
    }

    pub fn palette(&self) -> Palette {
        let section = &self.palette;
        Palette {
            lower_knee: section.lower_knee,
            upper_knee: section.upper_knee,
            top: section.top,
            ..Palette::default()
        }
        .with_anchors(section.low, section.mid, section.high)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected {CONFIG_VERSION}",
                self.version
            )));
        }

        self.field_params()
            .validate()
            .map_err(|err| ConfigError::Invalid(format!("[field]/[display]: {err}")))?;
        self.palette()
            .validate()
            .map_err(|err| ConfigError::Invalid(format!("[palette]: {err}")))?;

        if let Some(fps) = self.window.fps {
            if !fps.is_finite() || fps < 0.0 {
                return Err(ConfigError::Invalid("window.fps must be >= 0".into()));
            }
        }

        if self.window.title.trim().is_empty() {
            return Err(ConfigError::Invalid("window.title may not be empty".into()));
        }

        if !self.export.fps.is_finite() || self.export.fps <= 0.0 {
            return Err(ConfigError::Invalid("export.fps must be > 0".into()));
        }

        if self.export.duration.is_zero() {
            return Err(ConfigError::Invalid(
                "export.duration must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}

/// Parses `WIDTHxHEIGHT` (e.g. `1280x720`).
pub fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .trim()
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{value}'"))?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid width in '{value}'"))?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|_| format!("invalid height in '{value}'"))?;
    if width == 0 || height == 0 {
        return Err("dimensions must be greater than zero".into());
    }
    Ok((width, height))
}

/// Parses `X,Y` window coordinates; negative values are allowed.
pub fn parse_position(value: &str) -> Result<(i32, i32), String> {
    let (x, y) = value
        .trim()
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{value}'"))?;
    let x = x
        .trim()
        .parse::<i32>()
        .map_err(|_| format!("invalid x coordinate in '{value}'"))?;
    let y = y
        .trim()
        .parse::<i32>()
        .map_err(|_| format!("invalid y coordinate in '{value}'"))?;
    Ok((x, y))
}

/// Parses `#RRGGBB` (the leading `#` is optional).
pub fn parse_hex_color(value: &str) -> Result<[u8; 3], String> {
    let trimmed = value.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if digits.len() != 6 || !digits.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return Err(format!("invalid color '{value}'; expected #RRGGBB"));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16)
            .map_err(|_| format!("invalid color '{value}'; expected #RRGGBB"))
    };
    Ok([channel(0..2)?, channel(2..4)?, channel(4..6)?])
}

fn deserialize_color<'de, D>(deserializer: D) -> Result<[u8; 3], D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        Hex(String),
        Triple([u8; 3]),
    }

    match Helper::deserialize(deserializer)? {
        Helper::Hex(raw) => parse_hex_color(&raw).map_err(de::Error::custom),
        Helper::Triple(rgb) => Ok(rgb),
    }
}

fn deserialize_size<'de, D>(deserializer: D) -> Result<(u32, u32), D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_size(&raw).map_err(de::Error::custom)
}

fn deserialize_position_opt<'de, D>(deserializer: D) -> Result<Option<(i32, i32)>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("auto") {
        return Ok(None);
    }
    parse_position(trimmed).map(Some).map_err(de::Error::custom)
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Duration::from_secs(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs(v as u64))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_nan() || v.is_sign_negative() || v.is_infinite() {
                return Err(E::custom("duration must be a non-negative number"));
            }
            Duration::try_from_secs_f64(v)
                .map_err(|err| E::custom(format!("duration {v} is out of range: {err}")))
        }
    }

    deserializer.deserialize_any(Visitor)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const SAMPLE: &str = r##"
version = 1

[field]
x_scale = 4.0
t_scale = 2.5

[display]
gain = 1.0
color_space = "linear"

[palette]
low = "#00BCD4"
mid = [132, 188, 212]
high = "010121"
upper_knee = 0.9

[window]
size = "1280x720"
position = "auto"
fps = 30

[export]
duration = "2s 500ms"
fps = 10
size = "320x240"
"##;

    #[test]
    fn parses_sample_config() {
        let config = FieldConfig::from_toml_str(SAMPLE).expect("parse config");
        assert_eq!(config.field.x_scale, 4.0);
        assert_eq!(config.field.y_scale, 3.0);
        assert_eq!(config.display.color_space, ColorSpaceSetting::Linear);
        assert_eq!(config.palette.low, [0, 188, 212]);
        assert_eq!(config.palette.high, [1, 1, 33]);
        assert_eq!(config.window.size, (1280, 720));
        assert_eq!(config.window.position, None);
        assert_eq!(config.window.fps, Some(30.0));
        assert_eq!(config.export.duration, Duration::from_millis(2500));
        assert_eq!(config.export.size, (320, 240));
    }

    #[test]
    fn empty_sections_fall_back_to_reference_values() {
        let config = FieldConfig::from_toml_str("version = 1").unwrap();
        assert_eq!(config.field_params(), FieldParams::default());
        assert_eq!(config.palette(), Palette::default());
        assert_eq!(config.window.size, (800, 800));
        assert_eq!(config.window.position, Some((300, 100)));
        assert_eq!(config.export.duration, Duration::from_secs(10));
        assert_eq!(config.export.fps, 20.0);
    }

    #[test]
    fn converts_sections_into_core_types() {
        let config = FieldConfig::from_toml_str(SAMPLE).unwrap();
        let params = config.field_params();
        assert_eq!(params.x_scale, 4.0);
        assert_eq!(params.t_scale, 2.5);
        assert_eq!(params.gain, 1.0);

        let palette = config.palette();
        assert_eq!(palette.upper_knee, 0.9);
        assert_eq!(palette.lower_knee, 0.64);
        assert_eq!(palette.mid, Palette::default().mid);
    }

    #[test]
    fn rejects_wrong_version() {
        let err = FieldConfig::from_toml_str("version = 2").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_zero_range() {
        let err = FieldConfig::from_toml_str("version = 1\n[field]\nz_max = 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_unordered_knees() {
        let err = FieldConfig::from_toml_str(
            "version = 1\n[palette]\nlower_knee = 0.95\nupper_knee = 0.9\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_unknown_keys_and_bad_values() {
        assert!(matches!(
            FieldConfig::from_toml_str("version = 1\n[field]\nw_scale = 1.0\n").unwrap_err(),
            ConfigError::Parse(_)
        ));
        assert!(matches!(
            FieldConfig::from_toml_str("version = 1\n[palette]\nlow = \"#12345\"\n").unwrap_err(),
            ConfigError::Parse(_)
        ));
        assert!(matches!(
            FieldConfig::from_toml_str("version = 1\n[export]\nfps = 0\n").unwrap_err(),
            ConfigError::Invalid(_)
        ));
    }

    #[test]
    fn oversized_duration_is_a_parse_error() {
        let err = FieldConfig::from_toml_str("version = 1\n[export]\nduration = 1e20\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("out of range"), "{err}");
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let config = FieldConfig::load(file.path()).unwrap();
        assert_eq!(config.window.size, (1280, 720));

        let missing = file.path().with_extension("missing");
        assert!(matches!(
            FieldConfig::load(&missing).unwrap_err(),
            ConfigError::Io { .. }
        ));
    }

    #[test]
    fn parses_cli_style_values() {
        assert_eq!(parse_size("1920X1080"), Ok((1920, 1080)));
        assert!(parse_size("0x10").is_err());
        assert!(parse_size("wide").is_err());
        assert_eq!(parse_position("-20, 40"), Ok((-20, 40)));
        assert!(parse_position("20").is_err());
        assert_eq!(parse_hex_color("#84bcd4"), Ok([132, 188, 212]));
        assert!(parse_hex_color("#zzzzzz").is_err());
    }
}
