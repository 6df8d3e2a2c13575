use std::io;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use gradconfig::GradConfig;
use gradient::{
    clipboard_css, export_png, mix_hex, preview_css, Atmosphere, Gradient, DOWNLOAD_FILENAME,
};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, CssArgs, ExportArgs, MixArgs, SourceArgs};
use crate::clipboard;
use crate::paths::AppPaths;
use crate::presets;

pub fn run(cli: Cli) -> Result<()> {
    let paths = AppPaths::discover()?;
    let config_path = cli.config.clone().unwrap_or_else(|| paths.config_file());
    tracing::debug!(
        config_dir = %paths.config_dir().display(),
        config = %config_path.display(),
        "resolved gradwall paths"
    );

    match &cli.command {
        Command::Where => {
            println!("Configuration:");
            println!("  config dir:  {}", paths.config_dir().display());
            println!("  config file: {}", config_path.display());
            return Ok(());
        }
        Command::Mix(args) => return run_mix(args),
        _ => {}
    }

    let config = GradConfig::load_or_default(&config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;

    match cli.command {
        Command::Css(args) => run_css(&config, args),
        Command::Export(args) => run_export(&config, &paths, args),
        Command::Show(source) => run_show(&config, &source),
        Command::Presets => run_presets(&config),
        Command::Where | Command::Mix(_) => Ok(()),
    }
}

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Builds the descriptor: session default, then `defaults.preset`, then
/// `--preset`, then the individual field flags.
///
/// Stop edits run after `--stop`: additions, then `--set-stop`, then removals
/// from the highest number down so earlier numbers keep their meaning.
pub fn resolve_gradient(config: &GradConfig, source: &SourceArgs) -> Result<Gradient> {
    let mut gradient = Gradient::default();

    for name in [config.default_preset(), source.preset.as_deref()]
        .into_iter()
        .flatten()
    {
        gradient = presets::lookup(config, name).ok_or_else(|| {
            anyhow!("unknown preset '{name}'; run `gradwall presets` to list available presets")
        })?;
    }

    if let Some(kind) = source.kind {
        gradient = gradient.with_kind(kind);
    }
    if let Some(angle) = source.angle {
        gradient = gradient.with_angle(angle);
    }
    if !source.stops.is_empty() {
        gradient = gradient.with_stops(source.stops.clone());
    }
    for _ in 0..source.add_stops {
        gradient = gradient.with_added_stop();
    }
    for (index, update) in &source.stop_updates {
        gradient = gradient
            .with_stop_updated(*index, *update)
            .context("cannot apply --set-stop")?;
    }
    let mut removed = source.removed_stops.clone();
    removed.sort_unstable_by(|a, b| b.cmp(a));
    removed.dedup();
    for index in removed {
        gradient = gradient
            .without_stop(index)
            .context("cannot apply --remove-stop")?;
    }
    if let Some(current) = gradient.atmosphere().copied() {
        let atmosphere = Atmosphere {
            blur: source.blur.unwrap_or(current.blur),
            noise: source.noise.unwrap_or(current.noise),
            layers: source.layers.unwrap_or(current.layers),
        };
        gradient = gradient.with_atmosphere(atmosphere);
    } else if source.blur.is_some() || source.noise.is_some() || source.layers.is_some() {
        tracing::warn!(
            kind = %gradient.kind(),
            "blur, noise and layers only apply to atmospheric and mesh gradients"
        );
    }

    let issues = gradient.issues();
    if !issues.is_empty() {
        bail!("invalid gradient: {}", issues.join("; "));
    }

    tracing::debug!(kind = %gradient.kind(), stops = gradient.stop_count(), "resolved gradient");
    Ok(gradient)
}

fn run_css(config: &GradConfig, args: CssArgs) -> Result<()> {
    let gradient = resolve_gradient(config, &args.source)?;
    println!("{}", preview_css(&gradient));

    if args.copy {
        match clipboard::copy_text(&clipboard_css(&gradient)) {
            Ok(()) => tracing::info!("CSS copied to clipboard"),
            Err(err) => tracing::warn!("{err:#}"),
        }
    }
    Ok(())
}

fn run_export(config: &GradConfig, paths: &AppPaths, args: ExportArgs) -> Result<()> {
    let gradient = resolve_gradient(config, &args.source)?;
    let size = args.size.unwrap_or_else(|| config.raster_config());
    let target = match args.output {
        Some(path) => path,
        None => config
            .output_directory(paths.home_dir())
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DOWNLOAD_FILENAME),
    };

    let download = export_png(&gradient, size).context("failed to export gradient image")?;
    download.write_as(&target)?;
    println!("{}", target.display());
    Ok(())
}

fn run_show(config: &GradConfig, source: &SourceArgs) -> Result<()> {
    let gradient = resolve_gradient(config, source)?;
    let json = serde_json::to_string_pretty(&gradient).context("failed to serialise gradient")?;
    println!("{json}");
    Ok(())
}

fn run_mix(args: &MixArgs) -> Result<()> {
    println!("{}", mix_hex(&args.from, &args.to, args.at));
    Ok(())
}

fn run_presets(config: &GradConfig) -> Result<()> {
    for entry in presets::catalog(config) {
        println!(
            "  {:<14} {:<8} {:<11} {}",
            entry.name,
            entry.origin.as_str(),
            entry.gradient.kind().as_str(),
            preview_css(&entry.gradient)
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{parse_stop, parse_stop_update};
    use gradient::{GradientKind, Rgb};

    fn source() -> SourceArgs {
        SourceArgs::default()
    }

    #[test]
    fn no_flags_yields_session_default() {
        let gradient = resolve_gradient(&GradConfig::default(), &source()).unwrap();
        assert_eq!(gradient, Gradient::default());
    }

    #[test]
    fn presets_apply_in_order() {
        let config = GradConfig::from_toml_str("version = 1\n[defaults]\npreset = \"sunset\"\n")
            .unwrap();
        let gradient = resolve_gradient(&config, &source()).unwrap();
        assert_eq!(gradient.angle(), Some(45.0));

        let args = SourceArgs {
            preset: Some("ember".into()),
            ..source()
        };
        let gradient = resolve_gradient(&config, &args).unwrap();
        assert_eq!(gradient.kind(), GradientKind::Radial);
    }

    #[test]
    fn field_flags_override_preset() {
        let args = SourceArgs {
            preset: Some("azure-violet".into()),
            kind: Some(GradientKind::Conic),
            angle: Some(30.0),
            stops: vec![
                parse_stop("#000000@0").unwrap(),
                parse_stop("#ffffff@100").unwrap(),
            ],
            ..source()
        };
        let gradient = resolve_gradient(&GradConfig::default(), &args).unwrap();
        assert_eq!(
            preview_css(&gradient),
            "conic-gradient(from 30deg, #000000 0%, #ffffff 100%)"
        );
    }

    #[test]
    fn atmosphere_flags_merge_with_current_values() {
        let args = SourceArgs {
            blur: Some(0.0),
            layers: Some(5),
            ..source()
        };
        let gradient = resolve_gradient(&GradConfig::default(), &args).unwrap();
        let atmosphere = gradient.atmosphere().copied().unwrap();
        assert_eq!((atmosphere.blur, atmosphere.noise, atmosphere.layers), (0.0, 20.0, 5));
        assert_eq!(clipboard_css(&gradient).lines().count(), 1);
    }

    #[test]
    fn rejects_unknown_preset_and_invalid_results() {
        let args = SourceArgs {
            preset: Some("nope".into()),
            ..source()
        };
        let err = resolve_gradient(&GradConfig::default(), &args).unwrap_err();
        assert!(err.to_string().contains("unknown preset 'nope'"));

        let args = SourceArgs {
            stops: vec![parse_stop("#000000@0").unwrap()],
            ..source()
        };
        let err = resolve_gradient(&GradConfig::default(), &args).unwrap_err();
        assert!(err.to_string().contains("at least 2 color stops"));

        let args = SourceArgs {
            noise: Some(120.0),
            ..source()
        };
        assert!(resolve_gradient(&GradConfig::default(), &args).is_err());
    }

    #[test]
    fn stop_edits_follow_explicit_stops() {
        let args = SourceArgs {
            kind: Some(GradientKind::Linear),
            stops: vec![
                parse_stop("#000000@0").unwrap(),
                parse_stop("#ffffff@80").unwrap(),
            ],
            add_stops: 2,
            stop_updates: vec![parse_stop_update("3=#ff0000").unwrap()],
            removed_stops: vec![0, 0],
            ..source()
        };
        let gradient = resolve_gradient(&GradConfig::default(), &args).unwrap();
        assert_eq!(
            preview_css(&gradient),
            "linear-gradient(135deg, #ffffff 80%, #ff0000 90%, #6366f1 100%)"
        );
    }

    #[test]
    fn stop_removal_keeps_two_stops() {
        let args = SourceArgs {
            preset: Some("azure-violet".into()),
            removed_stops: vec![1],
            ..source()
        };
        let err = resolve_gradient(&GradConfig::default(), &args).unwrap_err();
        assert!(format!("{err:#}").contains("at least 2 color stops"), "{err:#}");

        let args = SourceArgs {
            preset: Some("azure-violet".into()),
            stop_updates: vec![parse_stop_update("5=@10").unwrap()],
            ..source()
        };
        let err = resolve_gradient(&GradConfig::default(), &args).unwrap_err();
        assert!(format!("{err:#}").contains("no color stop 5"), "{err:#}");
    }

    #[test]
    fn mesh_conversion_keeps_stop_anchors() {
        let args = SourceArgs {
            kind: Some(GradientKind::Mesh),
            stops: vec![
                parse_stop("#ff0000@0@10,20").unwrap(),
                parse_stop("#0000ff@100@90,80").unwrap(),
            ],
            ..source()
        };
        let gradient = resolve_gradient(&GradConfig::default(), &args).unwrap();
        let Gradient::Mesh { stops, .. } = gradient else {
            panic!("expected mesh gradient");
        };
        assert_eq!((stops[0].x, stops[0].y), (10.0, 20.0));
        assert_eq!(stops[1].stop.color, Rgb::new(0, 0, 0xff));
    }
}
