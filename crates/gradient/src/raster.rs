//! Imperative export path: descriptor to a fixed-size pixel buffer.
//!
//! ```text
//!   Gradient ──▶ ColorRamp (sorted stops, percent offsets)
//!       │
//!       └─▶ Shader::Linear | Shader::Radial | Shader::Conic ──▶ shade(px, py) per pixel
//! ```
//!
//! Geometry follows the CSS conventions used by the preview so both paths
//! agree: angles are bearings in degrees clockwise from "up", buffer y grows
//! downwards, and pixels are sampled at their centers.
//!
//! Conic gradients have no analytic shader here. They are approximated with
//! [`CONIC_SECTORS`] one-degree wedges, each filled with a single color. Seams
//! between wedges are bounded by one degree.

use image::RgbImage;

use crate::color::{lerp, Rgb};
use crate::descriptor::{sorted_stops, ColorStop, Gradient};

pub const DEFAULT_WIDTH: u32 = 1920;
pub const DEFAULT_HEIGHT: u32 = 1080;
/// Largest edge accepted for a drawing surface.
pub const MAX_DIMENSION: u32 = 16384;
pub const CONIC_SECTORS: usize = 360;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("drawing surface of {width}x{height} pixels is unavailable")]
    SurfaceUnavailable { width: u32, height: u32 },
    #[error("invalid gradient: {0}")]
    InvalidDescriptor(String),
}

/// Output resolution for [`render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterConfig {
    pub width: u32,
    pub height: u32,
}

impl RasterConfig {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    fn check(self) -> Result<(), RenderError> {
        let valid = |edge: u32| (1..=MAX_DIMENSION).contains(&edge);
        if valid(self.width) && valid(self.height) {
            Ok(())
        } else {
            Err(RenderError::SurfaceUnavailable {
                width: self.width,
                height: self.height,
            })
        }
    }
}

impl Default for RasterConfig {
    /// 1080p, the export size of the designer.
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

/// A fully painted, opaque RGB image.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    image: RgbImage,
}

impl PixelBuffer {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Panics when `(x, y)` is outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        let [r, g, b] = self.image.get_pixel(x, y).0;
        Rgb::new(r, g, b)
    }

    pub fn as_image(&self) -> &RgbImage {
        &self.image
    }
}

/// Piecewise-linear color lookup over sorted stops.
///
/// Offsets stay in percent so conic sector percentages and stop positions are
/// compared without rescaling.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRamp {
    stops: Vec<ColorStop>,
}

impl ColorRamp {
    pub fn new(stops: &[ColorStop]) -> Self {
        Self {
            stops: sorted_stops(stops),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Color at `percent` along the ramp.
    ///
    /// Outside the stop range the nearest boundary color is used. Inside, the
    /// first pair with `a <= percent <= b` in ascending order wins; a
    /// zero-width pair yields `a`. An empty ramp is black.
    pub fn sample_percent(&self, percent: f32) -> Rgb {
        let (Some(first), Some(last)) = (self.stops.first(), self.stops.last()) else {
            return Rgb::default();
        };
        if percent.is_nan() || percent < first.position {
            return first.color;
        }
        if percent > last.position {
            return last.color;
        }

        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if a.position <= percent && percent <= b.position {
                let range = b.position - a.position;
                if range <= 0.0 {
                    return a.color;
                }
                return lerp(a.color, b.color, (percent - a.position) / range);
            }
        }
        last.color
    }

    /// Color at `t` in `[0, 1]`.
    pub fn sample(&self, t: f32) -> Rgb {
        self.sample_percent(t * 100.0)
    }
}

/// One wedge of the conic approximation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConicSector {
    /// Start of the wedge in degrees of sweep past the `from` direction.
    pub sweep_start: f32,
    pub color: Rgb,
}

/// The [`CONIC_SECTORS`] flat-filled wedges of a conic gradient, in scan order.
///
/// Sector `i` starts at `(i + from) mod 360` degrees of sweep and takes the
/// ramp color at that fraction of the full turn.
///
/// With a fractional `from` one wedge straddles the seam. [`render`] paints
/// the part of it past the seam with the 0% color, so the last color never
/// shows ahead of the first.
pub fn conic_sectors(stops: &[ColorStop], from: f32) -> Vec<ConicSector> {
    let ramp = ColorRamp::new(stops);
    conic_sectors_for(&ramp, from)
}

fn conic_sectors_for(ramp: &ColorRamp, from: f32) -> Vec<ConicSector> {
    (0..CONIC_SECTORS)
        .map(|i| {
            let sweep_start = (i as f32 + from).rem_euclid(360.0);
            let percent = sweep_start / 360.0 * 100.0;
            ConicSector {
                sweep_start,
                color: ramp.sample_percent(percent),
            }
        })
        .collect()
}

/// Renders `gradient` into a new buffer of `config` size.
///
/// Atmospheric and mesh gradients export their base linear ramp only; their
/// highlight overlays and mesh anchors exist in the CSS preview alone.
pub fn render(gradient: &Gradient, config: RasterConfig) -> Result<PixelBuffer, RenderError> {
    config.check()?;
    let ramp = ColorRamp::new(&gradient.color_stops());
    if ramp.is_empty() {
        return Err(RenderError::InvalidDescriptor(
            "gradient has no color stops".to_string(),
        ));
    }

    tracing::debug!(
        kind = %gradient.kind(),
        width = config.width,
        height = config.height,
        stops = gradient.stop_count(),
        "rasterizing gradient"
    );

    let (width, height) = (config.width as f32, config.height as f32);
    let shader = match gradient {
        Gradient::Linear { angle, .. }
        | Gradient::Atmospheric { angle, .. }
        | Gradient::Mesh { angle, .. } => Shader::linear(*angle, width, height),
        Gradient::Radial { .. } => Shader::Radial {
            radius: width.max(height) / 2.0,
        },
        Gradient::Conic { angle, .. } => Shader::Conic {
            from: *angle,
            sectors: conic_sectors_for(&ramp, *angle)
                .into_iter()
                .map(|sector| sector.color)
                .collect(),
            seam: ramp.sample_percent(0.0),
        },
    };

    let (cx, cy) = (width / 2.0, height / 2.0);
    let image = RgbImage::from_fn(config.width, config.height, |x, y| {
        let color = shader.shade(&ramp, x as f32 + 0.5 - cx, y as f32 + 0.5 - cy);
        image::Rgb(color.to_array())
    });
    Ok(PixelBuffer { image })
}

/// Per-pixel color rule; coordinates are relative to the buffer center.
enum Shader {
    Linear { dx: f32, dy: f32, half_length: f32 },
    Radial { radius: f32 },
    Conic {
        from: f32,
        sectors: Vec<Rgb>,
        seam: Rgb,
    },
}

impl Shader {
    /// Gradient line through the center pointing along the CSS bearing.
    ///
    /// The half-length is the CSS one, so the corners the line is aimed at
    /// land exactly on 0% and 100%.
    fn linear(angle: f32, width: f32, height: f32) -> Self {
        let theta = angle.to_radians();
        let direction = (angle - 90.0).to_radians();
        let half_length = ((width * theta.sin()).abs() + (height * theta.cos()).abs()) / 2.0;
        Shader::Linear {
            dx: direction.cos(),
            dy: direction.sin(),
            half_length: half_length.max(f32::EPSILON),
        }
    }

    fn shade(&self, ramp: &ColorRamp, px: f32, py: f32) -> Rgb {
        match self {
            Shader::Linear {
                dx,
                dy,
                half_length,
            } => {
                let projected = px * dx + py * dy;
                ramp.sample((projected + half_length) / (2.0 * half_length))
            }
            Shader::Radial { radius } => ramp.sample(px.hypot(py) / radius),
            Shader::Conic {
                from,
                sectors,
                seam,
            } => {
                // Clockwise from up with y pointing down.
                let bearing = px.atan2(-py).to_degrees();
                let sweep = (bearing - from).rem_euclid(360.0);
                let index = ((sweep - from).rem_euclid(360.0).floor() as usize)
                    .min(CONIC_SECTORS - 1);
                let sweep_start = (index as f32 + from).rem_euclid(360.0);
                // Past the seam, the straddling wedge restarts at 0%.
                if sweep_start - sweep > 180.0 {
                    *seam
                } else {
                    sectors[index]
                }
            }
        }
    }
}
