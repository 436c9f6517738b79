//! `windtrail [--config FILE] [--grid FILE] [--headless FRAMES OUT.png]`
//!
//! Without `--grid`, a generated cyclone is shown. With `--headless`, the
//! overlay is rendered for FRAMES frames at 1280x720 and written as a PNG
//! instead of opening a window.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use windtrail::viewer::{self, MapView};
use windtrail::{Controller, Cyclone, DVec2, ManualScheduler, RendererConfig, Rgba, VectorGrid};

const MAP_CENTER: DVec2 = DVec2::new(69.3451, 30.3753);
const MAP_ZOOM: f64 = 5.0;
const VIEW_SIZE: (u32, u32) = (1280, 720);

struct Args {
    config: Option<PathBuf>,
    grid: Option<PathBuf>,
    headless: Option<(u32, PathBuf)>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        config: None,
        grid: None,
        headless: None,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => args.config = Some(it.next().ok_or("--config needs a file")?.into()),
            "--grid" => args.grid = Some(it.next().ok_or("--grid needs a file")?.into()),
            "--headless" => {
                let frames = it
                    .next()
                    .and_then(|s| s.parse().ok())
                    .ok_or("--headless needs a frame count")?;
                let out = it.next().ok_or("--headless needs an output file")?;
                args.headless = Some((frames, out.into()));
            }
            other => return Err(format!("unknown argument: {}", other)),
        }
    }
    Ok(args)
}

fn main() -> ExitCode {
    env_logger::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("usage: windtrail [--config FILE] [--grid FILE] [--headless FRAMES OUT.png]");
            return ExitCode::from(2);
        }
    };

    let config = args
        .config
        .as_ref()
        .map_or_else(RendererConfig::default, RendererConfig::load_or_default);

    let grid = match &args.grid {
        Some(path) => VectorGrid::load(path),
        None => Cyclone::at(MAP_CENTER).to_grid(),
    };
    let grid = match grid {
        Ok(grid) => Arc::new(grid),
        Err(e) => {
            log::error!("cannot load wind grid: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let (w, h) = grid.dimensions();
    log::info!("wind grid {}x{}, speed range {:?}", w, h, grid.magnitude_range());

    let result = match args.headless {
        Some((frames, out)) => render_headless(grid, config, frames, out),
        None => viewer::run(grid, config, MapView::new(MAP_CENTER, MAP_ZOOM, VIEW_SIZE.0, VIEW_SIZE.1))
            .map_err(|e| e.to_string()),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn render_headless(grid: Arc<VectorGrid>, config: RendererConfig, frames: u32, out: PathBuf) -> Result<(), String> {
    let map = MapView::new(MAP_CENTER, MAP_ZOOM, VIEW_SIZE.0, VIEW_SIZE.1);
    let mut controller = Controller::new(grid, config, ManualScheduler::new());
    controller.set_fixed_delta_scale(Some(1.0));
    controller.on_viewport_change(&map.snapshot()).map_err(|e| e.to_string())?;

    let mut drawn = 0;
    while drawn < frames && controller.pump() {
        drawn += 1;
    }
    log::info!("rendered {} frames with {} particles", drawn, controller.population_len());

    controller
        .canvas()
        .save_png(&out, Some(Rgba::new(8, 13, 23, 255)))
        .map_err(|e| e.to_string())?;
    log::info!("wrote {}", out.display());
    Ok(())
}
