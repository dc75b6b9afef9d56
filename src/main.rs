//! Cardshow View: headless card viewer
//!
//! Drives one card viewer for a number of frames and prints each frame's
//! derived visuals as a JSON line on stdout. Logs go to stderr.
//!
//! ```text
//! cardshow-view [front.png] [back.png] [--config FILE] [--frames N] [--drag] [--host] [--write-config]
//! ```

use anyhow::{bail, Context, Result};
use cardshow_view::controls::{wall_clock_ms, ViewportRect};
use cardshow_view::{
    load_card_faces, AutoRotateDriver, CardViewer, FsSource, ImageCache, ViewerConfig, ViewerEvent,
};
use glam::Vec2;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

#[derive(Debug, Default)]
struct Args {
    front: Option<String>,
    back: Option<String>,
    config: Option<PathBuf>,
    frames: usize,
    drag: bool,
    host: bool,
    write_config: bool,
}

impl Args {
    fn parse() -> Result<Self> {
        let mut args = Self {
            frames: 120,
            ..Default::default()
        };
        let mut positional = Vec::new();
        let mut iter = std::env::args().skip(1);

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--config" => {
                    let path = iter.next().context("--config needs a file")?;
                    args.config = Some(PathBuf::from(path));
                }
                "--frames" => {
                    let n = iter.next().context("--frames needs a count")?;
                    args.frames = n.parse().with_context(|| format!("Bad frame count: {}", n))?;
                }
                "--drag" => args.drag = true,
                "--host" => args.host = true,
                "--write-config" => args.write_config = true,
                flag if flag.starts_with("--") => bail!("Unknown option: {}", flag),
                _ => positional.push(arg),
            }
        }

        let mut positional = positional.into_iter();
        args.front = positional.next();
        args.back = positional.next();
        Ok(args)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Cardshow View v{}", cardshow_view::VERSION);

    let args = Args::parse()?;
    let mut config = match &args.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::load_or_default(),
    };
    if args.host {
        config.auto_rotate_driver = AutoRotateDriver::Host;
    }

    if args.write_config {
        let path = ViewerConfig::default_path().context("No config directory on this platform")?;
        config.save(&path)?;
        tracing::info!("Wrote {}", path.display());
        return Ok(());
    }

    if let Some(front) = &args.front {
        let cache = ImageCache::new(FsSource::new(config.image_root.clone()));
        let back = args.back.as_deref().unwrap_or(front);
        let faces = load_card_faces(&cache, front, back).await;
        tracing::info!(
            "Card faces: front {:?}, back {:?} ({} fetches)",
            faces.front.size(),
            faces.back.size(),
            cache.stats().fetches_started
        );
    }

    let frame_interval = config.frame_interval();
    let mut viewer = CardViewer::new(config);
    viewer.handle_event(ViewerEvent::Resized(ViewportRect::from_size(VIEWPORT.x, VIEWPORT.y)));

    let drag_start = args.frames / 3;
    let drag_end = 2 * args.frames / 3;
    let center = VIEWPORT / 2.0;

    let mut ticker = tokio::time::interval(frame_interval);
    let mut out = std::io::stdout().lock();

    for i in 0..args.frames {
        ticker.tick().await;

        if args.drag {
            if i == drag_start {
                viewer.handle_event(ViewerEvent::PointerDown(center));
            } else if i > drag_start && i < drag_end {
                let offset = (i - drag_start) as f32 * 4.0;
                viewer.handle_event(ViewerEvent::PointerMove(center + Vec2::new(offset, 0.0)));
            } else if i == drag_end {
                viewer.handle_event(ViewerEvent::PointerUp);
            }
        }

        viewer.handle_event(ViewerEvent::Tick {
            now_ms: wall_clock_ms(),
        });

        let line = serde_json::to_string(&viewer.frame())?;
        writeln!(out, "{}", line)?;
    }

    tracing::info!("{} frames at {:.1} fps", args.frames, viewer.fps());
    Ok(())
}
