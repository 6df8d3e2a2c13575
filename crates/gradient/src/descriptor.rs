//! Gradient descriptors: the immutable value every render path consumes.
//!
//! Each gradient type is its own variant so that parameters only exist where
//! they mean something: radial gradients have no angle, only atmospheric and
//! mesh gradients carry an [`Atmosphere`], and only mesh stops carry 2D
//! anchors. Serialized form is internally tagged by `type`:
//!
//! ```toml
//! type = "conic"
//! angle = 0
//! stops = [{ color = "#ec4899", position = 0 }, { color = "#3b82f6", position = 100 }]
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::Rgb;

/// A color anchored at a percentage along the gradient axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub color: Rgb,
    /// Percentage in `[0, 100]`.
    pub position: f32,
}

impl ColorStop {
    pub const fn new(color: Rgb, position: f32) -> Self {
        Self { color, position }
    }
}

/// A stop that also pins a point on the canvas, in percent of width/height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshStop {
    #[serde(flatten)]
    pub stop: ColorStop,
    pub x: f32,
    pub y: f32,
}

impl MeshStop {
    pub const fn new(stop: ColorStop, x: f32, y: f32) -> Self {
        Self { stop, x, y }
    }
}

/// Fewest stops a gradient may be edited down to.
pub const MIN_STOPS: usize = 2;

/// Color given to a stop appended with [`Gradient::with_added_stop`].
pub const ADDED_STOP_COLOR: Rgb = Rgb::new(0x63, 0x66, 0xf1);

/// Rejected stop edit. Indices are zero-based.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StopEditError {
    #[error("a gradient keeps at least {} color stops; it has {count}", MIN_STOPS)]
    TooFewStops { count: usize },
    #[error("no color stop {} (gradient has {count})", .index + 1)]
    OutOfRange { index: usize, count: usize },
}

/// Partial change to one stop; `None` fields keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StopUpdate {
    pub color: Option<Rgb>,
    pub position: Option<f32>,
    /// Canvas anchor in percent; only mesh gradients keep it.
    pub anchor: Option<(f32, f32)>,
}

impl StopUpdate {
    fn apply(&self, stop: &mut MeshStop) {
        if let Some(color) = self.color {
            stop.stop.color = color;
        }
        if let Some(position) = self.position {
            stop.stop.position = position;
        }
        if let Some((x, y)) = self.anchor {
            stop.x = x;
            stop.y = y;
        }
    }
}

/// Soft-focus parameters shared by the layered variants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Atmosphere {
    /// Blur radius in pixels, applied through the exported CSS `filter`.
    pub blur: f32,
    /// Grain strength in percent. Not consumed by either render path.
    pub noise: f32,
    /// Number of highlight overlays in the atmospheric preview.
    pub layers: u32,
}

impl Default for Atmosphere {
    fn default() -> Self {
        Self {
            blur: 60.0,
            noise: 20.0,
            layers: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Gradient {
    Linear {
        #[serde(default)]
        angle: f32,
        stops: Vec<ColorStop>,
    },
    Radial {
        stops: Vec<ColorStop>,
    },
    Conic {
        #[serde(default)]
        angle: f32,
        stops: Vec<ColorStop>,
    },
    Atmospheric {
        #[serde(default)]
        angle: f32,
        stops: Vec<ColorStop>,
        #[serde(flatten)]
        atmosphere: Atmosphere,
    },
    Mesh {
        #[serde(default)]
        angle: f32,
        stops: Vec<MeshStop>,
        #[serde(flatten)]
        atmosphere: Atmosphere,
    },
}

/// Variant names without payload, used for CLI parsing and listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientKind {
    Linear,
    Radial,
    Conic,
    Atmospheric,
    Mesh,
}

impl GradientKind {
    pub const ALL: [GradientKind; 5] = [
        GradientKind::Linear,
        GradientKind::Radial,
        GradientKind::Conic,
        GradientKind::Atmospheric,
        GradientKind::Mesh,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GradientKind::Linear => "linear",
            GradientKind::Radial => "radial",
            GradientKind::Conic => "conic",
            GradientKind::Atmospheric => "atmospheric",
            GradientKind::Mesh => "mesh",
        }
    }
}

impl fmt::Display for GradientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GradientKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "linear" => Ok(GradientKind::Linear),
            "radial" => Ok(GradientKind::Radial),
            "conic" => Ok(GradientKind::Conic),
            "atmospheric" | "organic" => Ok(GradientKind::Atmospheric),
            "mesh" => Ok(GradientKind::Mesh),
            other => {
                let expected: Vec<&str> = GradientKind::ALL.iter().map(|k| k.as_str()).collect();
                Err(format!(
                    "unknown gradient type '{other}'; expected one of {}",
                    expected.join(", ")
                ))
            }
        }
    }
}

impl Default for Gradient {
    /// The session-start gradient: a three-stop blue/violet atmosphere.
    fn default() -> Self {
        Gradient::Atmospheric {
            angle: 135.0,
            stops: vec![
                ColorStop::new(Rgb::new(0x3b, 0x82, 0xf6), 0.0),
                ColorStop::new(Rgb::new(0x8b, 0x5c, 0xf6), 50.0),
                ColorStop::new(Rgb::new(0xa8, 0x55, 0xf7), 100.0),
            ],
            atmosphere: Atmosphere::default(),
        }
    }
}

impl Gradient {
    pub fn kind(&self) -> GradientKind {
        match self {
            Gradient::Linear { .. } => GradientKind::Linear,
            Gradient::Radial { .. } => GradientKind::Radial,
            Gradient::Conic { .. } => GradientKind::Conic,
            Gradient::Atmospheric { .. } => GradientKind::Atmospheric,
            Gradient::Mesh { .. } => GradientKind::Mesh,
        }
    }

    /// Angle in degrees, for the variants that have one.
    pub fn angle(&self) -> Option<f32> {
        match self {
            Gradient::Radial { .. } => None,
            Gradient::Linear { angle, .. }
            | Gradient::Conic { angle, .. }
            | Gradient::Atmospheric { angle, .. }
            | Gradient::Mesh { angle, .. } => Some(*angle),
        }
    }

    /// Stops in the order they were listed, without mesh anchors.
    pub fn color_stops(&self) -> Vec<ColorStop> {
        match self {
            Gradient::Linear { stops, .. }
            | Gradient::Radial { stops }
            | Gradient::Conic { stops, .. }
            | Gradient::Atmospheric { stops, .. } => stops.clone(),
            Gradient::Mesh { stops, .. } => stops.iter().map(|s| s.stop).collect(),
        }
    }

    /// Stops ordered by position; see [`sorted_stops`].
    pub fn sorted_stops(&self) -> Vec<ColorStop> {
        sorted_stops(&self.color_stops())
    }

    pub fn stop_count(&self) -> usize {
        match self {
            Gradient::Linear { stops, .. }
            | Gradient::Radial { stops }
            | Gradient::Conic { stops, .. }
            | Gradient::Atmospheric { stops, .. } => stops.len(),
            Gradient::Mesh { stops, .. } => stops.len(),
        }
    }

    pub fn atmosphere(&self) -> Option<&Atmosphere> {
        match self {
            Gradient::Atmospheric { atmosphere, .. } | Gradient::Mesh { atmosphere, .. } => {
                Some(atmosphere)
            }
            _ => None,
        }
    }

    /// Converts to another variant, keeping whatever parameters carry over.
    ///
    /// Variants without an angle hand over `0`; variants without an atmosphere
    /// pick up the default one. Stops gaining anchors are placed on the
    /// top-left to bottom-right diagonal at their own position.
    pub fn with_kind(&self, kind: GradientKind) -> Gradient {
        let angle = self.angle().unwrap_or(0.0);
        let atmosphere = self.atmosphere().copied().unwrap_or_default();
        match kind {
            GradientKind::Linear => Gradient::Linear {
                angle,
                stops: self.color_stops(),
            },
            GradientKind::Radial => Gradient::Radial {
                stops: self.color_stops(),
            },
            GradientKind::Conic => Gradient::Conic {
                angle,
                stops: self.color_stops(),
            },
            GradientKind::Atmospheric => Gradient::Atmospheric {
                angle,
                stops: self.color_stops(),
                atmosphere,
            },
            GradientKind::Mesh => Gradient::Mesh {
                angle,
                stops: self.mesh_stops(),
                atmosphere,
            },
        }
    }

    /// Returns a copy with a new angle; radial gradients are returned unchanged.
    pub fn with_angle(&self, new_angle: f32) -> Gradient {
        let mut next = self.clone();
        match &mut next {
            Gradient::Radial { .. } => {}
            Gradient::Linear { angle, .. }
            | Gradient::Conic { angle, .. }
            | Gradient::Atmospheric { angle, .. }
            | Gradient::Mesh { angle, .. } => *angle = new_angle,
        }
        next
    }

    /// Returns a copy with the stop list replaced.
    ///
    /// Mesh gradients need anchors; stops given here without one are placed on
    /// the diagonal as in [`Gradient::with_kind`].
    pub fn with_stops(&self, new_stops: Vec<MeshStop>) -> Gradient {
        let mut next = self.clone();
        match &mut next {
            Gradient::Linear { stops, .. }
            | Gradient::Radial { stops }
            | Gradient::Conic { stops, .. }
            | Gradient::Atmospheric { stops, .. } => {
                *stops = new_stops.iter().map(|s| s.stop).collect();
            }
            Gradient::Mesh { stops, .. } => *stops = new_stops,
        }
        next
    }

    /// Appends a stop [`ADDED_STOP_COLOR`] 10% past the furthest one, capped at
    /// 100, or at 50 when there are no stops yet. Its anchor sits on the
    /// diagonal at its position.
    pub fn with_added_stop(&self) -> Gradient {
        let position = self
            .color_stops()
            .iter()
            .map(|stop| stop.position)
            .reduce(f32::max)
            .map_or(50.0, |furthest| (furthest + 10.0).min(100.0));
        let mut stops = self.mesh_stops();
        stops.push(MeshStop::new(
            ColorStop::new(ADDED_STOP_COLOR, position),
            position,
            position,
        ));
        self.with_stops(stops)
    }

    /// Drops the stop at `index`, refusing to go below [`MIN_STOPS`].
    pub fn without_stop(&self, index: usize) -> Result<Gradient, StopEditError> {
        let count = self.stop_count();
        if count <= MIN_STOPS {
            return Err(StopEditError::TooFewStops { count });
        }
        if index >= count {
            return Err(StopEditError::OutOfRange { index, count });
        }
        let mut stops = self.mesh_stops();
        stops.remove(index);
        Ok(self.with_stops(stops))
    }

    /// Edits the stop at `index` in listed order.
    pub fn with_stop_updated(
        &self,
        index: usize,
        update: StopUpdate,
    ) -> Result<Gradient, StopEditError> {
        let mut stops = self.mesh_stops();
        let count = stops.len();
        let stop = stops
            .get_mut(index)
            .ok_or(StopEditError::OutOfRange { index, count })?;
        update.apply(stop);
        Ok(self.with_stops(stops))
    }

    /// Stops with anchors; variants without anchors report the diagonal.
    fn mesh_stops(&self) -> Vec<MeshStop> {
        match self {
            Gradient::Mesh { stops, .. } => stops.clone(),
            other => other
                .color_stops()
                .into_iter()
                .map(|stop| MeshStop::new(stop, stop.position, stop.position))
                .collect(),
        }
    }

    /// Returns a copy with the atmosphere replaced; a no-op for plain variants.
    pub fn with_atmosphere(&self, new_atmosphere: Atmosphere) -> Gradient {
        let mut next = self.clone();
        if let Gradient::Atmospheric { atmosphere, .. } | Gradient::Mesh { atmosphere, .. } =
            &mut next
        {
            *atmosphere = new_atmosphere;
        }
        next
    }

    /// Human-readable problems; empty when the descriptor is well formed.
    pub fn issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.stop_count() < 2 {
            issues.push(format!(
                "gradient needs at least 2 color stops, found {}",
                self.stop_count()
            ));
        }
        if let Some(angle) = self.angle() {
            if !angle.is_finite() {
                issues.push("angle must be a finite number of degrees".to_string());
            }
        }
        for (index, stop) in self.color_stops().iter().enumerate() {
            if !(0.0..=100.0).contains(&stop.position) {
                issues.push(format!(
                    "stop {} position {} is outside 0-100",
                    index + 1,
                    stop.position
                ));
            }
        }
        if let Gradient::Mesh { stops, .. } = self {
            for (index, stop) in stops.iter().enumerate() {
                if !(0.0..=100.0).contains(&stop.x) || !(0.0..=100.0).contains(&stop.y) {
                    issues.push(format!(
                        "stop {} anchor ({}, {}) is outside 0-100",
                        index + 1,
                        stop.x,
                        stop.y
                    ));
                }
            }
        }
        if let Some(atmosphere) = self.atmosphere() {
            if !(atmosphere.blur >= 0.0) {
                issues.push("blur must be >= 0".to_string());
            }
            if !(0.0..=100.0).contains(&atmosphere.noise) {
                issues.push("noise must be within 0-100".to_string());
            }
            if atmosphere.layers == 0 {
                issues.push("layers must be >= 1".to_string());
            }
        }
        issues
    }
}

/// Copy of `stops` ordered by ascending position.
///
/// The sort is stable: stops sharing a position keep their listed order, so
/// the first-listed one wins wherever ties are inspected.
pub fn sorted_stops(stops: &[ColorStop]) -> Vec<ColorStop> {
    let mut sorted = stops.to_vec();
    sorted.sort_by(|a, b| a.position.total_cmp(&b.position));
    sorted
}
