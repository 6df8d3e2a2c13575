use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use gradient::{ColorStop, GradientKind, MeshStop, RasterConfig, Rgb, StopUpdate};

#[derive(Parser, Debug)]
#[command(
    name = "gradwall",
    author,
    version,
    about = "Gradient wallpaper designer: CSS backgrounds and PNG exports"
)]
pub struct Cli {
    /// Configuration file (defaults to `gradwall.toml` in the config directory).
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the CSS background for a gradient.
    Css(CssArgs),
    /// Rasterize a gradient and write it as PNG.
    Export(ExportArgs),
    /// Print the assembled gradient descriptor as JSON.
    Show(SourceArgs),
    /// List built-in and user presets with their CSS.
    Presets,
    /// Blend two hex colors and print the result as `rgb(r, g, b)`.
    Mix(MixArgs),
    /// Print resolved config directory and config file path.
    Where,
}

/// Selects a starting gradient and adjusts it field by field.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Start from a named preset instead of the configured default.
    #[arg(long, value_name = "NAME")]
    pub preset: Option<String>,

    /// Gradient type: `linear`, `radial`, `conic`, `atmospheric`, or `mesh`.
    #[arg(long = "type", value_name = "KIND", value_parser = parse_kind)]
    pub kind: Option<GradientKind>,

    /// Direction in degrees (linear, atmospheric, mesh) or start angle (conic).
    #[arg(long, value_name = "DEG", allow_negative_numbers = true)]
    pub angle: Option<f32>,

    /// Color stop as `COLOR@POS` or `COLOR@POS@X,Y`; repeat to build the stop list.
    #[arg(long = "stop", value_name = "COLOR@POS[@X,Y]", value_parser = parse_stop)]
    pub stops: Vec<MeshStop>,

    /// Append a stop 10% past the furthest one; repeatable.
    #[arg(long = "add-stop", action = clap::ArgAction::Count)]
    pub add_stops: u8,

    /// Change stop N (1-based); empty fields keep their value, e.g. `2=@40`.
    #[arg(
        long = "set-stop",
        value_name = "N=COLOR@POS[@X,Y]",
        value_parser = parse_stop_update
    )]
    pub stop_updates: Vec<(usize, StopUpdate)>,

    /// Remove stop N (1-based); a gradient keeps at least two stops.
    #[arg(long = "remove-stop", value_name = "N", value_parser = parse_stop_number)]
    pub removed_stops: Vec<usize>,

    /// Blur radius in pixels for atmospheric and mesh gradients.
    #[arg(long, value_name = "PX")]
    pub blur: Option<f32>,

    /// Grain strength in percent for atmospheric and mesh gradients.
    #[arg(long, value_name = "PCT")]
    pub noise: Option<f32>,

    /// Number of highlight overlays in the atmospheric preview.
    #[arg(long, value_name = "N")]
    pub layers: Option<u32>,
}

#[derive(Args, Debug)]
pub struct CssArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Also place the CSS declarations on the system clipboard.
    #[arg(long)]
    pub copy: bool,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output resolution (e.g. `2560x1440`); defaults to the configured size.
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<RasterConfig>,

    /// Destination file; defaults to `gradient.png` in the output directory.
    #[arg(long, short, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct MixArgs {
    /// First color, `#rrggbb` or `#rgb`.
    pub from: String,

    /// Second color.
    pub to: String,

    /// Blend factor from 0 (first color) to 1 (second color).
    #[arg(long, value_name = "T", default_value_t = 0.5)]
    pub at: f32,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_kind(value: &str) -> Result<GradientKind, String> {
    if value.trim().is_empty() {
        return Err("gradient type must not be empty".to_string());
    }
    value.parse()
}

pub fn parse_size(value: &str) -> Result<RasterConfig, String> {
    let (width, height) = value
        .trim()
        .split_once(['x', 'X', '×'])
        .ok_or_else(|| "expected WxH format, e.g. 1920x1080".to_string())?;
    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| "invalid width in size specification".to_string())?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| "invalid height in size specification".to_string())?;
    if width == 0 || height == 0 {
        return Err("image dimensions must be greater than zero".into());
    }
    Ok(RasterConfig::new(width, height))
}

/// Parses `COLOR@POS[@X,Y]`.
///
/// Without an anchor the stop sits on the diagonal at its own position, the
/// same placement used when a gradient is converted to mesh.
pub fn parse_stop(value: &str) -> Result<MeshStop, String> {
    let mut parts = value.trim().split('@');
    let color = parts.next().unwrap_or_default();
    let position = parts
        .next()
        .ok_or_else(|| format!("stop '{value}' is missing a position; expected COLOR@POS"))?;
    let anchor = parts.next();
    if parts.next().is_some() {
        return Err(format!(
            "stop '{value}' has too many fields; expected COLOR@POS[@X,Y]"
        ));
    }

    let color = Rgb::from_hex(color.trim()).map_err(|err| err.to_string())?;
    let position = parse_percent(position, "position")?;
    let (x, y) = match anchor {
        Some(anchor) => {
            let (x, y) = anchor
                .split_once(',')
                .ok_or_else(|| format!("stop anchor '{anchor}' must be X,Y"))?;
            (parse_percent(x, "x")?, parse_percent(y, "y")?)
        }
        None => (position, position),
    };

    Ok(MeshStop::new(ColorStop::new(color, position), x, y))
}

/// Parses a 1-based stop number into a zero-based index.
pub fn parse_stop_number(value: &str) -> Result<usize, String> {
    match value.trim().parse::<usize>() {
        Ok(number) if number >= 1 => Ok(number - 1),
        _ => Err(format!("stop number '{value}' must be 1 or greater")),
    }
}

/// Parses `N=COLOR@POS[@X,Y]` where any field may be left empty.
pub fn parse_stop_update(value: &str) -> Result<(usize, StopUpdate), String> {
    let (number, fields) = value
        .trim()
        .split_once('=')
        .ok_or_else(|| format!("stop edit '{value}' must look like N=COLOR@POS[@X,Y]"))?;
    let index = parse_stop_number(number)?;

    let mut parts = fields.split('@');
    let color = parts.next().map(str::trim).filter(|raw| !raw.is_empty());
    let position = parts.next().map(str::trim).filter(|raw| !raw.is_empty());
    let anchor = parts.next().map(str::trim).filter(|raw| !raw.is_empty());
    if parts.next().is_some() {
        return Err(format!(
            "stop edit '{value}' has too many fields; expected N=COLOR@POS[@X,Y]"
        ));
    }

    let update = StopUpdate {
        color: color
            .map(Rgb::from_hex)
            .transpose()
            .map_err(|err| err.to_string())?,
        position: position
            .map(|raw| parse_percent(raw, "position"))
            .transpose()?,
        anchor: match anchor {
            Some(anchor) => {
                let (x, y) = anchor
                    .split_once(',')
                    .ok_or_else(|| format!("stop anchor '{anchor}' must be X,Y"))?;
                Some((parse_percent(x, "x")?, parse_percent(y, "y")?))
            }
            None => None,
        },
    };
    if update == StopUpdate::default() {
        return Err(format!("stop edit '{value}' changes nothing"));
    }
    Ok((index, update))
}

fn parse_percent(raw: &str, field: &str) -> Result<f32, String> {
    let trimmed = raw.trim().trim_end_matches('%');
    let value: f32 = trimmed
        .parse()
        .map_err(|_| format!("invalid stop {field} '{raw}'"))?;
    if !(0.0..=100.0).contains(&value) {
        return Err(format!("stop {field} {value} is outside 0-100"));
    }
    Ok(value)
}
