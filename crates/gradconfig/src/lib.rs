use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use gradient::raster::{DEFAULT_HEIGHT, DEFAULT_WIDTH, MAX_DIMENSION};
use gradient::{Gradient, RasterConfig};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILENAME: &str = "gradwall.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GradConfig {
    pub version: u32,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub presets: BTreeMap<String, Gradient>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Output {
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

impl Default for Output {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    pub preset: Option<String>,
}

impl Default for GradConfig {
    fn default() -> Self {
        Self {
            version: 1,
            output: Output::default(),
            defaults: Defaults::default(),
            presets: BTreeMap::new(),
        }
    }
}

impl GradConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: GradConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    /// Reads `path`, falling back to the defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(contents) => {
                let config = Self::from_toml_str(&contents)?;
                tracing::debug!(
                    path = %path.display(),
                    presets = config.presets.len(),
                    "loaded gradwall config"
                );
                Ok(config)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file; using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn preset(&self, name: &str) -> Option<&Gradient> {
        self.presets.get(name)
    }

    pub fn default_preset(&self) -> Option<&str> {
        self.defaults.preset.as_deref()
    }

    pub fn raster_config(&self) -> RasterConfig {
        RasterConfig::new(self.output.width, self.output.height)
    }

    /// Output directory with a leading `~` replaced by `home`.
    pub fn output_directory(&self, home: Option<&Path>) -> Option<PathBuf> {
        let directory = self.output.directory.as_ref()?;
        match (directory.strip_prefix("~"), home) {
            (Ok(rest), Some(home)) => Some(home.join(rest)),
            _ => Some(directory.clone()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        for (field, value) in [("width", self.output.width), ("height", self.output.height)] {
            if value == 0 || value > MAX_DIMENSION {
                return Err(ConfigError::Invalid(format!(
                    "output.{field} must be within 1-{MAX_DIMENSION}, found {value}"
                )));
            }
        }

        for (name, preset) in &self.presets {
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid("preset name may not be empty".into()));
            }
            if let Some(issue) = preset.issues().into_iter().next() {
                return Err(ConfigError::Invalid(format!("preset '{name}': {issue}")));
            }
        }

        if let Some(preset) = &self.defaults.preset {
            if preset.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "defaults.preset may not be empty".into(),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gradient::{GradientKind, Rgb};
    use tempfile::TempDir;

    const SAMPLE: &str = r##"
version = 1

[output]
width = 2560
height = 1440
directory = "~/Pictures"

[defaults]
preset = "ocean"

[presets.ocean]
type = "linear"
angle = 90
stops = [{ color = "#0ea5e9", position = 0 }, { color = "#6366f1", position = 100 }]

[presets.haze]
type = "atmospheric"
angle = 135
blur = 40
layers = 4
stops = [{ color = "#3b82f6", position = 0 }, { color = "#a855f7", position = 100 }]

[presets.grid]
type = "mesh"
stops = [
    { color = "#ffffff", position = 0, x = 10, y = 10 },
    { color = "#000000", position = 100, x = 90, y = 90 },
]
"##;

    #[test]
    fn parses_sample_config() {
        let config = GradConfig::from_toml_str(SAMPLE).expect("parse config");
        assert_eq!(config.version, 1);
        assert_eq!(config.raster_config(), RasterConfig::new(2560, 1440));
        assert_eq!(config.default_preset(), Some("ocean"));

        let ocean = config.preset("ocean").unwrap();
        assert_eq!(ocean.kind(), GradientKind::Linear);
        assert_eq!(ocean.angle(), Some(90.0));
        assert_eq!(ocean.color_stops()[1].color, Rgb::new(0x63, 0x66, 0xf1));

        let haze = config.preset("haze").unwrap().atmosphere().copied().unwrap();
        assert_eq!((haze.blur, haze.noise, haze.layers), (40.0, 20.0, 4));

        assert_eq!(config.preset("grid").unwrap().kind(), GradientKind::Mesh);
    }

    #[test]
    fn empty_sections_fall_back_to_defaults() {
        let config = GradConfig::from_toml_str("version = 1").unwrap();
        assert_eq!(config, GradConfig::default());
        assert_eq!(config.raster_config(), RasterConfig::default());
    }

    #[test]
    fn expands_home_in_output_directory() {
        let config = GradConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(
            config.output_directory(Some(Path::new("/home/me"))),
            Some(PathBuf::from("/home/me/Pictures"))
        );
        assert_eq!(
            config.output_directory(None),
            Some(PathBuf::from("~/Pictures"))
        );
        assert_eq!(GradConfig::default().output_directory(None), None);
    }

    #[test]
    fn rejects_unsupported_version() {
        let err = GradConfig::from_toml_str("version = 2").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("version 2")));
    }

    #[test]
    fn rejects_out_of_range_dimensions() {
        for output in ["width = 0", "height = 20000"] {
            let err = GradConfig::from_toml_str(&format!("version = 1\n[output]\n{output}\n"))
                .unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{output}");
        }
    }

    #[test]
    fn rejects_single_stop_preset() {
        let config = r##"
version = 1

[presets.flat]
type = "radial"
stops = [{ color = "#123456", position = 50 }]
"##;
        let err = GradConfig::from_toml_str(config).unwrap_err();
        assert!(
            matches!(&err, ConfigError::Invalid(msg) if msg.starts_with("preset 'flat'")),
            "{err}"
        );
    }

    #[test]
    fn rejects_out_of_range_stop_and_noise() {
        let config = r##"
version = 1

[presets.loud]
type = "atmospheric"
noise = 150
stops = [{ color = "#000000", position = 0 }, { color = "#ffffff", position = 100 }]
"##;
        assert!(matches!(
            GradConfig::from_toml_str(config),
            Err(ConfigError::Invalid(_))
        ));

        let config = r##"
version = 1

[presets.far]
type = "linear"
stops = [{ color = "#000000", position = -5 }, { color = "#ffffff", position = 100 }]
"##;
        assert!(matches!(
            GradConfig::from_toml_str(config),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_blank_default_preset() {
        let err = GradConfig::from_toml_str("version = 1\n[defaults]\npreset = \" \"\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn bad_colors_surface_as_parse_errors() {
        let config = r##"
version = 1

[presets.oops]
type = "linear"
stops = [{ color = "blue", position = 0 }, { color = "#ffffff", position = 100 }]
"##;
        let err = GradConfig::from_toml_str(config).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_or_default_handles_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        assert_eq!(
            GradConfig::load_or_default(&path).unwrap(),
            GradConfig::default()
        );

        fs::write(&path, SAMPLE).unwrap();
        let loaded = GradConfig::load_or_default(&path).unwrap();
        assert_eq!(loaded.presets.len(), 3);
    }
}
