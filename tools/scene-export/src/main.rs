//! scene-export - scene graph export tool
//!
//! Converts glTF/GLB scenes into chunked scene blobs (.scene) and sampled
//! transform animation blobs (.anim)

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use scene_export::source::DEFAULT_FRAME_RATE;
use scene_export::{animation, manifest, scene, ANIMATION_EXT, SCENE_EXT};

#[derive(Parser)]
#[command(name = "scene-export")]
#[command(about = "Scene graph export tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export every exportable object of a glTF scene
    Scene {
        /// Input glTF/GLB file
        input: PathBuf,

        /// Output .scene file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Scene index (default: the file's default scene)
        #[arg(short, long)]
        scene: Option<usize>,
    },

    /// Sample object transforms over a frame range
    Animation {
        /// Input glTF/GLB file
        input: PathBuf,

        /// Output .anim file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Tracked object names, comma separated
        #[arg(long, required = true, value_delimiter = ',')]
        objects: Vec<String>,

        /// First frame (default: clip start)
        #[arg(long, allow_negative_numbers = true, requires = "max_frame")]
        min_frame: Option<i32>,

        /// Last frame, inclusive (default: clip end)
        #[arg(long, allow_negative_numbers = true, requires = "min_frame")]
        max_frame: Option<i32>,

        /// Frame rate used to turn frames into clip time
        #[arg(short, long, default_value_t = DEFAULT_FRAME_RATE)]
        frame_rate: f32,

        /// Animation clip name (default: first clip)
        #[arg(short, long)]
        clip: Option<String>,

        /// Scene index (default: the file's default scene)
        #[arg(short, long)]
        scene: Option<usize>,
    },

    /// List objects of a glTF scene
    List {
        /// Input glTF/GLB file
        input: PathBuf,

        /// Scene index (default: the file's default scene)
        #[arg(short, long)]
        scene: Option<usize>,
    },

    /// Export everything listed in a manifest file
    Build {
        /// Path to scene-export.toml manifest
        #[arg(default_value = manifest::MANIFEST_FILE)]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate manifest without building
    Check {
        /// Path to scene-export.toml manifest
        #[arg(default_value = manifest::MANIFEST_FILE)]
        manifest: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scene {
            input,
            output,
            scene,
        } => {
            let output = output.unwrap_or_else(|| input.with_extension(SCENE_EXT));
            tracing::info!("Converting {:?} -> {:?}", input, output);
            scene::convert_gltf_scene(&input, &output, scene)?;
            tracing::info!("Done!");
        }

        Commands::Animation {
            input,
            output,
            objects,
            min_frame,
            max_frame,
            frame_rate,
            clip,
            scene,
        } => {
            let output = output.unwrap_or_else(|| input.with_extension(ANIMATION_EXT));
            tracing::info!("Converting {:?} -> {:?}", input, output);
            let request = animation::AnimationRequest {
                objects,
                frames: min_frame.zip(max_frame),
                frame_rate,
                clip,
                scene,
            };
            animation::convert_gltf_animation(&input, &output, &request)?;
            tracing::info!("Done!");
        }

        Commands::List { input, scene } => {
            scene::list_objects(&input, scene)?;
        }

        Commands::Build {
            manifest,
            output,
            verbose,
        } => {
            if verbose {
                tracing::info!("Building exports from {:?}", manifest);
            }
            let config = manifest::load_manifest(&manifest)?;
            manifest::validate(&config)?;
            if config.is_empty() {
                tracing::warn!("Manifest {:?} lists no scenes or animations", manifest);
            }
            let written = manifest::build_all(&config, output.as_deref())?;
            tracing::info!("Build complete! ({} files)", written);
        }

        Commands::Check { manifest } => {
            tracing::info!("Checking manifest {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            manifest::validate(&config)?;
            tracing::info!("Manifest is valid!");
        }
    }

    Ok(())
}
