use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use mapoverlay::{
    BandAssignment, BandStats, Channel, ControlEvent, HeadlessControls, HeadlessMap,
    JsonDatasetDecoder, LoadOutcome, OverlayConfig, ParameterChangeDispatcher,
    RasterLayerController, VisualizationParams, save_layer_preview,
};

use super::args::CliArgs;
use super::errors::AppError;

type Controller = RasterLayerController<HeadlessMap, HeadlessControls>;

#[derive(Serialize)]
struct StatsReport<'a> {
    band_count: usize,
    assignment: BandAssignment,
    params: VisualizationParams,
    stats: &'a [BandStats],
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mapoverlay=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn resolve_config(args: &CliArgs) -> Result<OverlayConfig, AppError> {
    let mut config = match &args.config {
        Some(path) => OverlayConfig::from_json_file(path)?,
        None => OverlayConfig::default(),
    };
    if let Some(stride) = args.stride {
        config.sample_stride = stride;
    }
    if let Some(stats) = args.stats {
        config.stats = stats.into();
    }
    if let Some(name) = &args.display_name {
        config.display_name = name.clone();
    }
    config.validate()?;
    Ok(config)
}

fn read_events(path: &Path) -> Result<Vec<ControlEvent>, AppError> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn apply_edits(controller: &mut Controller, args: &CliArgs) -> Result<(), AppError> {
    let mut dispatcher = ParameterChangeDispatcher::new();
    let band_flags = [
        (Channel::Red, args.red),
        (Channel::Green, args.green),
        (Channel::Blue, args.blue),
    ];
    for (channel, band) in band_flags {
        if let Some(band) = band {
            dispatcher.push(ControlEvent::BandSelected { channel, band });
        }
    }
    if let Some(path) = &args.events {
        dispatcher.extend(read_events(path)?);
    }

    let outcomes = dispatcher.dispatch_all(controller);
    let rejected = outcomes.iter().filter(|o| !o.is_ok()).count();
    for outcome in &outcomes {
        if let Err(e) = &outcome.result {
            warn!("Skipped {}: {}", outcome.event, e);
        }
    }
    info!(
        "Control events applied: {}, rejected: {}",
        outcomes.len() - rejected,
        rejected
    );

    if args.opacity.is_some() || args.brightness.is_some() {
        controller.update_params(args.opacity, args.brightness)?;
    }
    Ok(())
}

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.log {
        init_logging();
    }

    let input = args.input.clone().ok_or(AppError::MissingArgument {
        arg: "--input".to_string(),
    })?;
    if args.output.is_none() && !args.print_stats {
        return Err(AppError::NoOutputRequested.into());
    }

    let config = resolve_config(&args)?;
    let background = config.background;
    let mut controller = RasterLayerController::new(
        HeadlessMap::new(),
        HeadlessControls::default(),
        config,
    )
    .map_err(AppError::from)?;

    let bytes = fs::read(&input)?;
    info!("Loading raster: {:?}", input);
    match controller
        .load_bytes(&JsonDatasetDecoder, &bytes)
        .map_err(AppError::from)?
    {
        LoadOutcome::Applied {
            band_count,
            warning,
        } => {
            info!("Loaded {} band(s)", band_count);
            if let Some(w) = warning {
                warn!("{}", w);
            }
        }
        LoadOutcome::Stale {
            ticket_epoch,
            current_epoch,
        } => warn!(
            "Load superseded (ticket epoch {}, current {})",
            ticket_epoch, current_epoch
        ),
    }

    apply_edits(&mut controller, &args)?;

    if args.print_stats {
        let report = StatsReport {
            band_count: controller.band_count().unwrap_or(0),
            assignment: controller.assignment(),
            params: controller.params(),
            stats: controller.stats().unwrap_or(&[]),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    if let Some(output) = &args.output {
        let layer = controller
            .current_layer()
            .ok_or(AppError::Overlay(mapoverlay::Error::NoRaster))?;
        let report = save_layer_preview(layer, output, background, args.world_file)
            .map_err(AppError::from)?;
        info!(
            "Successfully rendered {:?} -> {:?} ({}x{})",
            input, report.image, report.width, report.height
        );
        if let Some(world) = report.world_file {
            info!("World file: {:?}", world);
        }
    }

    Ok(())
}
