//! Built-in gradients and their merge with user presets from the config file.

use gradconfig::GradConfig;
use gradient::{ColorStop, Gradient, GradientKind, Rgb};

pub const DEFAULT_PRESET: &str = "default";

struct BuiltinPreset {
    name: &'static str,
    kind: GradientKind,
    angle: f32,
    stops: &'static [ColorStop],
}

const fn stop(r: u8, g: u8, b: u8, position: f32) -> ColorStop {
    ColorStop::new(Rgb::new(r, g, b), position)
}

const BUILTINS: &[BuiltinPreset] = &[
    BuiltinPreset {
        name: DEFAULT_PRESET,
        kind: GradientKind::Atmospheric,
        angle: 135.0,
        stops: &[
            stop(0x3b, 0x82, 0xf6, 0.0),
            stop(0x8b, 0x5c, 0xf6, 50.0),
            stop(0xa8, 0x55, 0xf7, 100.0),
        ],
    },
    BuiltinPreset {
        name: "azure-violet",
        kind: GradientKind::Linear,
        angle: 135.0,
        stops: &[stop(0x3b, 0x82, 0xf6, 0.0), stop(0x8b, 0x5c, 0xf6, 100.0)],
    },
    BuiltinPreset {
        name: "sunset",
        kind: GradientKind::Linear,
        angle: 45.0,
        stops: &[stop(0xec, 0x48, 0x99, 0.0), stop(0xf5, 0x9e, 0x0b, 100.0)],
    },
    BuiltinPreset {
        name: "meadow",
        kind: GradientKind::Linear,
        angle: 180.0,
        stops: &[
            stop(0x10, 0xb9, 0x81, 0.0),
            stop(0x3b, 0x82, 0xf6, 50.0),
            stop(0x8b, 0x5c, 0xf6, 100.0),
        ],
    },
    BuiltinPreset {
        name: "ember",
        kind: GradientKind::Radial,
        angle: 0.0,
        stops: &[stop(0xf5, 0x9e, 0x0b, 0.0), stop(0xef, 0x44, 0x44, 100.0)],
    },
    BuiltinPreset {
        name: "prism",
        kind: GradientKind::Conic,
        angle: 0.0,
        stops: &[
            stop(0xec, 0x48, 0x99, 0.0),
            stop(0x8b, 0x5c, 0xf6, 33.0),
            stop(0x3b, 0x82, 0xf6, 66.0),
            stop(0xec, 0x48, 0x99, 100.0),
        ],
    },
    BuiltinPreset {
        name: "ocean",
        kind: GradientKind::Linear,
        angle: 90.0,
        stops: &[stop(0x0e, 0xa5, 0xe9, 0.0), stop(0x63, 0x66, 0xf1, 100.0)],
    },
];

impl BuiltinPreset {
    fn gradient(&self) -> Gradient {
        Gradient::Linear {
            angle: self.angle,
            stops: self.stops.to_vec(),
        }
        .with_kind(self.kind)
    }
}

/// Where a listed preset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Builtin,
    User,
    /// A user preset replacing a built-in of the same name.
    Override,
}

impl Origin {
    pub fn as_str(self) -> &'static str {
        match self {
            Origin::Builtin => "built-in",
            Origin::User => "user",
            Origin::Override => "override",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PresetEntry {
    pub name: String,
    pub origin: Origin,
    pub gradient: Gradient,
}

pub fn builtin(name: &str) -> Option<Gradient> {
    BUILTINS
        .iter()
        .find(|preset| preset.name == name)
        .map(BuiltinPreset::gradient)
}

/// Looks up `name`, preferring a user preset over a built-in.
pub fn lookup(config: &GradConfig, name: &str) -> Option<Gradient> {
    config.preset(name).cloned().or_else(|| builtin(name))
}

/// Built-ins in catalog order, then user-only presets by name.
pub fn catalog(config: &GradConfig) -> Vec<PresetEntry> {
    let mut entries: Vec<PresetEntry> = BUILTINS
        .iter()
        .map(|preset| match config.preset(preset.name) {
            Some(user) => PresetEntry {
                name: preset.name.to_string(),
                origin: Origin::Override,
                gradient: user.clone(),
            },
            None => PresetEntry {
                name: preset.name.to_string(),
                origin: Origin::Builtin,
                gradient: preset.gradient(),
            },
        })
        .collect();

    entries.extend(
        config
            .presets
            .iter()
            .filter(|(name, _)| builtin(name).is_none())
            .map(|(name, gradient)| PresetEntry {
                name: name.clone(),
                origin: Origin::User,
                gradient: gradient.clone(),
            }),
    );
    entries
}
