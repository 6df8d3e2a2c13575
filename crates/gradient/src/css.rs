//! Declarative preview path: descriptor to CSS `background-image` text.
//!
//! Cheap enough to call on every descriptor change; nothing is cached.
//!
//! Atmospheric and mesh gradients have no single CSS primitive. They are
//! approximated by stacking translucent elliptical highlights over a base
//! linear gradient. The highlights are listed first so they paint on top.

use crate::descriptor::{ColorStop, Gradient, MeshStop};

/// Highlight anchors for the atmospheric preview, in percent of width/height.
/// Overlays beyond the fifth reuse the list from the start.
pub const OVERLAY_ANCHORS: [(f32, f32); 5] = [
    (20.0, 30.0),
    (80.0, 70.0),
    (50.0, 90.0),
    (10.0, 80.0),
    (90.0, 10.0),
];

pub const OVERLAY_ALPHA: f32 = 0.6;

/// Returned when there is nothing to paint.
pub const EMPTY_BACKGROUND: &str = "none";

pub fn preview_css(gradient: &Gradient) -> String {
    let sorted = gradient.sorted_stops();
    let Some(stops) = stop_list(&sorted) else {
        return EMPTY_BACKGROUND.to_string();
    };

    match gradient {
        Gradient::Linear { angle, .. } => linear(*angle, &stops),
        Gradient::Radial { .. } => format!("radial-gradient(circle, {stops})"),
        Gradient::Conic { angle, .. } => format!("conic-gradient(from {angle}deg, {stops})"),
        Gradient::Atmospheric {
            angle, atmosphere, ..
        } => {
            let overlays = (0..atmosphere.layers.max(1) as usize).map(|layer| {
                let (x, y) = OVERLAY_ANCHORS[layer % OVERLAY_ANCHORS.len()];
                let stop = sorted[layer % sorted.len()];
                overlay(x, y, stop)
            });
            layered(overlays, linear(*angle, &stops))
        }
        Gradient::Mesh {
            angle,
            stops: mesh_stops,
            ..
        } => {
            let overlays = mesh_stops
                .iter()
                .map(|MeshStop { stop, x, y }| overlay(*x, *y, *stop));
            layered(overlays, linear(*angle, &stops))
        }
    }
}

/// `"<hex> <pos>%"` entries joined by `", "`, in the order given.
///
/// A lone stop is emitted twice so the result remains a valid (flat)
/// gradient; no stops yields `None`.
pub fn stop_list(stops: &[ColorStop]) -> Option<String> {
    let entries: Vec<String> = stops
        .iter()
        .map(|stop| format!("{} {}%", stop.color.to_hex(), stop.position))
        .collect();
    match entries.as_slice() {
        [] => None,
        [only] => Some(format!("{only}, {only}")),
        _ => Some(entries.join(", ")),
    }
}

fn linear(angle: f32, stops: &str) -> String {
    format!("linear-gradient({angle}deg, {stops})")
}

fn overlay(x: f32, y: f32, stop: ColorStop) -> String {
    format!(
        "radial-gradient(ellipse at {x}% {y}%, {} 0%, transparent 50%)",
        stop.color.css_rgba(OVERLAY_ALPHA)
    )
}

fn layered(overlays: impl Iterator<Item = String>, base: String) -> String {
    let mut layers: Vec<String> = overlays.collect();
    layers.push(base);
    layers.join(", ")
}
