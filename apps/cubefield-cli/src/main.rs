use clap::{Parser, Subcommand, ValueEnum};
use cubefield_input::Action;
use cubefield_render::{CameraRig, DebugTextRenderer, FrameLoop};
use cubefield_scene::{FixedStepClock, SceneBuilder, SceneConfig, TimeSource};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cubefield-cli", about = "Headless tool for the cubefield scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// YAML or JSON file overriding the scene parameters
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Yaml,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Print the effective parameter table
    Config {
        #[arg(short, long, value_enum, default_value = "yaml")]
        format: Format,
    },
    /// Run the frame loop at a fixed rate and print text frames
    Simulate {
        /// Number of frames to run
        #[arg(short, long, default_value = "60")]
        frames: u64,
        /// Frames per second of the fixed-step clock
        #[arg(long, default_value = "60")]
        fps: u32,
        /// RNG seed for colors and heights (random when omitted)
        #[arg(short, long)]
        seed: Option<u64>,
        /// Print every Nth frame (the last frame is always printed)
        #[arg(short, long, default_value = "1")]
        every: u64,
        /// Cubes listed per frame
        #[arg(long, default_value = "5")]
        cubes: usize,
        /// Horizontal pointer drag in pixels applied before the first frame
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        drag: f32,
        /// Sleep one step between frames
        #[arg(long)]
        realtime: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let config = SceneConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Info => {
            println!("cubefield-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("scene: {}", cubefield_scene::crate_info());
            println!("render: {}", cubefield_render::crate_info());
            println!("input: {}", cubefield_input::crate_info());
            let scene = SceneBuilder::new(config.clone()).build_seeded(0);
            println!(
                "layout: {} cubes in {} columns, {} nodes",
                scene.cube_count(),
                config.cubes.columns,
                scene.node_count()
            );
        }
        Commands::Config { format } => {
            let text = match format {
                Format::Json => config.to_json_pretty()?,
                Format::Yaml => config.to_yaml()?,
            };
            println!("{}", text.trim_end());
        }
        Commands::Simulate {
            frames,
            fps,
            seed,
            every,
            cubes,
            drag,
            realtime,
        } => {
            let builder = SceneBuilder::new(config.clone());
            let mut scene = match seed {
                Some(seed) => builder.build_seeded(seed),
                None => builder.build(),
            };
            let mut rig = CameraRig::new(&config, 1280.0, 720.0, 1.0);
            let mut frame_loop = FrameLoop::new(config.animation.clone());
            let mut clock = FixedStepClock::from_fps(fps);
            let renderer = DebugTextRenderer::with_max_cubes(cubes);
            let every = every.max(1);

            if drag != 0.0 {
                rig.handle(&Action::Rotate { dx: drag, dy: 0.0 });
            }

            tracing::info!(frames, fps, "simulating");
            for frame in 0..frames {
                let output = frame_loop.run_frame(
                    clock.elapsed_secs(),
                    &mut scene,
                    &mut rig.camera,
                    &renderer,
                );
                if frame % every == 0 || frame + 1 == frames {
                    print!("{output}");
                }
                if realtime {
                    std::thread::sleep(clock.step());
                }
                clock.tick();
            }
            println!(
                "Simulated {} frames ({:.3}s at {} fps)",
                frame_loop.frames(),
                scene.elapsed(),
                fps.max(1)
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn simulate_flags_parse() {
        let cli = Cli::parse_from([
            "cubefield-cli",
            "simulate",
            "--frames",
            "10",
            "--fps",
            "30",
            "--seed",
            "4",
            "--every",
            "5",
        ]);
        match cli.command {
            Commands::Simulate {
                frames,
                fps,
                seed,
                every,
                realtime,
                ..
            } => {
                assert_eq!((frames, fps, seed, every), (10, 30, Some(4), 5));
                assert!(!realtime);
            }
            _ => panic!("expected simulate"),
        }
    }

    #[test]
    fn verbose_flag_is_global() {
        let cli = Cli::try_parse_from(["cubefield-cli", "simulate", "-v", "--frames", "2"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Simulate { frames: 2, .. }));
        assert!(Cli::parse_from(["cubefield-cli", "-v", "info"]).verbose);
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::parse_from(["cubefield-cli", "config", "--format", "json", "-c", "a.yaml"]);
        assert_eq!(cli.config, Some(PathBuf::from("a.yaml")));
        assert!(matches!(cli.command, Commands::Config { format: Format::Json }));
    }
}
