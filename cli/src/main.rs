//! Headless driver for `impulse2d`: loads a JSON scene description, steps the
//! world a fixed number of times, and prints the resulting body transforms.
//! Not a game or renderer — a reproducible way to run the scenarios a physics
//! change should be checked against.

mod scene;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use impulse2d_core::World;

use scene::Scene;

#[derive(Parser)]
#[command(name = "impulse2d", version, about = "Headless driver for impulse2d simulations")]
struct Cli {
    /// Path to a JSON scene description (gravity, cell size, bodies).
    scene: PathBuf,

    /// Number of fixed-timestep ticks to run.
    #[arg(long, default_value_t = 60)]
    steps: u32,

    /// Fixed timestep size in seconds.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Emit the final body transforms as JSON instead of a plain table.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let scene_text = std::fs::read_to_string(&cli.scene)
        .with_context(|| format!("reading scene file {}", cli.scene.display()))?;
    let scene: Scene = serde_json::from_str(&scene_text)
        .with_context(|| format!("parsing scene file {}", cli.scene.display()))?;

    let mut world = scene.build_world().context("building world from scene")?;

    for _ in 0..cli.steps {
        world.step(cli.dt);
    }

    print_results(&world, cli.json)
}

fn print_results(world: &World, json: bool) -> Result<()> {
    if json {
        let rows: Vec<_> = (0..world.body_count())
            .filter_map(|index| world.get_body(index))
            .map(|body| {
                let tx = body.transform();
                serde_json::json!({
                    "position": { "x": tx.position.x, "y": tx.position.y },
                    "angle": tx.angle,
                    "velocity": { "x": body.velocity().x, "y": body.velocity().y },
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("{:>5}  {:>12}  {:>12}  {:>10}", "body", "x", "y", "angle");
    for index in 0..world.body_count() {
        let Some(body) = world.get_body(index) else {
            continue;
        };
        let tx = body.transform();
        println!(
            "{:>5}  {:>12.4}  {:>12.4}  {:>10.4}",
            index, tx.position.x, tx.position.y, tx.angle
        );
    }

    Ok(())
}
