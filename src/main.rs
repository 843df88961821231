//! lane-world-tool: Lane-Welten aus Map-Szenen erzeugen, prüfen, aktualisieren
//! und Pfade darin planen.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use glam::Vec2;

use em5_lane_navigation::app::{self, BakeRequest};
use em5_lane_navigation::serialization::TrafficLaneWorldBinarySerializer;
use em5_lane_navigation::{Entity, EntityComponent, NavigationOptions};

#[derive(Parser)]
#[command(name = "lane-world-tool", version)]
#[command(about = "Lane-Welten erzeugen, prüfen und befahren")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Optionen-Datei (Standard: lane_navigation.toml neben dem Programm)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Erzeugt eine Lane-Welt aus einer Szene (TOML)
    Bake {
        scene: PathBuf,
        /// Zieldatei (.tlw = binär, .json = JSON)
        #[arg(short, long)]
        output: PathBuf,
        /// Bestehende Lane-Welt anbinden
        #[arg(long)]
        merge: Option<PathBuf>,
        /// Raster und Mittelachse als PNG speichern
        #[arg(long)]
        debug_image: Option<PathBuf>,
    },
    /// Zeigt Kennzahlen und Version einer Lane-Welt
    Inspect { world: PathBuf },
    /// Schreibt eine Lane-Welt in der aktuellen Version neu
    Reserialize {
        world: PathBuf,
        /// Auch aktuelle Dateien neu schreiben
        #[arg(long)]
        force: bool,
    },
    /// Plant einen Pfad zwischen zwei Positionen
    Route {
        world: PathBuf,
        #[arg(
            long,
            required = true,
            num_args = 2,
            value_names = ["X", "Z"],
            allow_negative_numbers = true
        )]
        from: Vec<f32>,
        #[arg(
            long,
            required = true,
            num_args = 2,
            value_names = ["X", "Z"],
            allow_negative_numbers = true
        )]
        to: Vec<f32>,
        #[arg(long, value_enum, default_value = "vehicle")]
        actor: ActorArg,
        /// Fahrzeugbreite
        #[arg(long, default_value_t = 2.5)]
        width: f32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ActorArg {
    Person,
    Vehicle,
    Emergency,
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    if let Err(e) = run(Args::parse()) {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config_path = args.config.unwrap_or_else(NavigationOptions::config_path);
    let options = NavigationOptions::load_from_file(&config_path);

    match args.command {
        Command::Bake {
            scene,
            output,
            merge,
            debug_image,
        } => {
            let outcome = app::bake_lane_world(
                &options,
                &BakeRequest {
                    scene_path: scene,
                    output_path: output,
                    merge_with: merge,
                    debug_image,
                },
            )?;
            println!(
                "{}: {} Nodes, {} Lanes, {} Kreuzungen ({} Segmente, {} Verstöße)",
                outcome.output_path.display(),
                outcome.summary.node_count,
                outcome.summary.lane_count,
                outcome.summary.crossing_count,
                outcome.report.segments,
                outcome.report.validation.violations.len()
            );
        }
        Command::Inspect { world } => {
            let report = app::inspect_lane_world(&options, &world)?;
            println!("Datei:      {}", world.display());
            println!("Map:        {}", report.map_name.as_deref().unwrap_or("-"));
            println!(
                "Format:     {} v{} (aktuell v{})",
                report.format,
                report.version,
                TrafficLaneWorldBinarySerializer::CURRENT_VERSION
            );
            println!("Nodes:      {}", report.summary.node_count);
            println!(
                "Lanes:      {} ({} gesperrt)",
                report.summary.lane_count, report.summary.blocked_lanes
            );
            println!("Kreuzungen: {}", report.summary.crossing_count);
            println!("Länge:      {:.1}", report.summary.total_lane_length);
            for violation in &report.validation.violations {
                println!("Verstoß:    {}", violation);
            }
            if report.needs_reserialize {
                println!("Veraltet:   mit `reserialize` aktualisieren");
            }
        }
        Command::Reserialize { world, force } => {
            if app::reserialize_lane_world(&world, force)? {
                println!("{} neu geschrieben", world.display());
            } else {
                println!("{} ist aktuell", world.display());
            }
        }
        Command::Route {
            world,
            from,
            to,
            actor,
            width,
        } => {
            let component = match actor {
                ActorArg::Person => EntityComponent::Person,
                ActorArg::Vehicle => EntityComponent::Vehicle {
                    width,
                    emergency: false,
                },
                ActorArg::Emergency => EntityComponent::Vehicle {
                    width,
                    emergency: true,
                },
            };
            let entity =
                Entity::new(0, "route", Vec2::new(from[0], from[1])).with_component(component);
            let outcome = app::plan_route(&options, &world, &entity, Vec2::new(to[0], to[1]))?;
            match outcome.path {
                Some(path) => {
                    println!("Länge: {:.1}", path.length);
                    println!("Nodes: {:?}", path.node_ids);
                    println!("Lanes: {:?}", path.lane_ids);
                }
                None => println!("Kein Pfad gefunden"),
            }
        }
    }
    Ok(())
}
