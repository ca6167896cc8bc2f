//! `zenview`: render every node of a simulated display cluster headless.
//!
//! Node 0 is the master: it owns the command line, broadcasts the resolved
//! configuration once, and renders the first surface. Every other surface of
//! the `--grid` gets a worker that waits for the broadcast, loads the image
//! itself, and renders its own surface. Each node writes one PNG per eye
//! pass to `--out`.

mod cli;
mod logging;

use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::Parser;
use zenview::cluster::local_broadcast;
use zenview::raster::{RasterTarget, Texture, load_texture};
use zenview::{Color, ConfigSync, DrawContext, Eye, Rect, Vec2, ViewerConfig, ViewerPass};

use cli::Cli;
use logging::init_logging;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let startup = cli.config();
    startup.log_warnings();

    let canvas = Vec2::from_pixels(cli.canvas.a, cli.canvas.b);
    let surfaces = Rect::grid(canvas, cli.grid.a, cli.grid.b);
    if surfaces.is_empty() {
        bail!("grid {} has no surfaces", cli.grid);
    }
    std::fs::create_dir_all(&cli.out)
        .with_context(|| format!("creating output directory {}", cli.out.display()))?;

    let (mut sender, receivers) = local_broadcast(surfaces.len() - 1);
    let mut master = ConfigSync::master(startup.config);
    master
        .commit(&mut sender)
        .context("broadcasting configuration")?;

    let mut nodes = vec![master];
    for (i, mut receiver) in receivers.into_iter().enumerate() {
        let mut worker = ConfigSync::worker();
        let warnings = worker
            .update(&mut receiver)
            .with_context(|| format!("node {} waiting for configuration", i + 1))?;
        for w in warnings {
            log::warn!("node {}: {w}", i + 1);
        }
        nodes.push(worker);
    }

    for (index, (node, surface)) in nodes.iter().zip(&surfaces).enumerate() {
        let config = node.config()?;
        log::debug!("node {index} ({:?}) renders {surface:?}", node.role());
        render_node(index, config, *surface, canvas, &cli)?;
    }
    log::info!(
        "rendered {} node(s) for a {} canvas into {}",
        nodes.len(),
        cli.canvas,
        cli.out.display()
    );
    Ok(())
}

/// Load the image for one node. A failed load means drawing without it.
fn node_texture(index: usize, config: &ViewerConfig) -> Option<Texture> {
    let path = config.image()?;
    match load_texture(path) {
        Ok(texture) => Some(texture),
        Err(e) => {
            log::error!("node {index}: could not load {path}: {e}");
            None
        }
    }
}

fn render_node(
    index: usize,
    config: &ViewerConfig,
    surface: Rect,
    canvas: Vec2,
    cli: &Cli,
) -> Result<()> {
    let texture = node_texture(index, config);
    let pass = ViewerPass::new(config);

    for eye in Eye::ALL {
        let ctx = DrawContext::overlay(eye, surface, canvas);
        let mut target = RasterTarget::new(surface, Color::BLACK);
        match pass.render(&mut target, &ctx, texture.as_ref()) {
            Ok(outcome) => log::debug!("node {index} {eye}: {outcome:?}"),
            Err(e) => log::warn!("node {index} {eye}: image not drawn: {e}"),
        }

        let path = cli.out.join(format!("node{index}-{eye}.png"));
        target
            .into_image()
            .save(&path)
            .with_context(|| format!("writing {}", path.display()))?;

        if cli.svg {
            write_svg(&cli.out, index, &pass, &ctx, texture.as_ref())?;
        }
    }
    Ok(())
}

fn write_svg(
    out: &Path,
    index: usize,
    pass: &ViewerPass<'_>,
    ctx: &DrawContext,
    texture: Option<&Texture>,
) -> Result<()> {
    let mut recorder = zenview::svg::SvgRecorder::<Texture>::new(ctx.surface);
    // Placement errors were already reported for the raster pass.
    let _ = pass.render(&mut recorder, ctx, texture);
    let path = out.join(format!("node{index}-{}.svg", ctx.eye));
    std::fs::write(&path, recorder.finish())
        .with_context(|| format!("writing {}", path.display()))
}

