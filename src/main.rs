use clap::{Parser, Subcommand, ValueEnum};
use slide_embed::config::{self, DefaultsProfile, SliderOptions};
use slide_embed::embed::{self, EmbedError, EmbedGenerator};
use slide_embed::ingest::{self, IngestOptions, IngestReport};
use slide_embed::output;
use slide_embed::types::Project;
use std::path::{Path, PathBuf};

/// Shared flags for commands that read images.
#[derive(clap::Args, Clone)]
struct ImageArgs {
    /// Image directory, or a JSON file holding an array of image descriptors
    #[arg(long)]
    images: PathBuf,

    /// Embed image bytes as base64 data URIs instead of relative paths
    #[arg(long)]
    inline: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// Standalone container + style + script
    Embed,
    /// Container with a data attribute + hosted runtime script
    Lightweight,
    /// WordPress [image_slider] shortcode
    Shortcode,
    /// React function component
    React,
}

#[derive(Parser)]
#[command(name = "slide-embed")]
#[command(about = "Generate standalone, embeddable image slider code")]
#[command(long_about = "\
Generate standalone, embeddable image slider code

Point it at a directory of images (or a JSON list of image descriptors) and
it prints a self-contained HTML/CSS/JS block you can paste into any page.

Image directory:

  photos/
  ├── 001-Blue-Hour.jpg            # Shown first, titled \"Blue Hour\"
  ├── 002-Harbor.png
  ├── 010-Night-Market.webp        # Non-contiguous numbering OK
  └── .drafts/                     # Hidden entries are skipped

Options resolve in layers (later wins):
  stock defaults → --options file.toml → --set key=value

Run 'slide-embed gen-config' to print a documented options file.")]
#[command(version)]
struct Cli {
    /// Options file (TOML) layered over the stock defaults
    #[arg(long, global = true)]
    options: Option<PathBuf>,

    /// Override a single option, e.g. --set autoPlay=false --set height=300px
    #[arg(long = "set", value_name = "KEY=VALUE", global = true)]
    set: Vec<String>,

    /// Worker threads for image ingestion (default: all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate embed code for a set of images
    Generate {
        #[command(flatten)]
        images: ImageArgs,

        /// Output flavor
        #[arg(long, value_enum, default_value_t = Format::Embed)]
        format: Format,

        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Base URL of the hosted runtime (lightweight format)
        #[arg(long)]
        cdn_base: Option<String>,
    },
    /// Generate a project-bound embed that loads its images at display time
    Dynamic {
        /// Project record (JSON); its embed count is updated in place
        #[arg(long)]
        project: PathBuf,

        /// Base URL serving /projects/<id>
        #[arg(long)]
        api_base: Option<String>,

        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Create a project record from a set of images
    Project {
        #[command(flatten)]
        images: ImageArgs,

        /// Project name
        #[arg(long, default_value = "")]
        name: String,

        /// Where to write the project JSON
        #[arg(long, default_value = "project.json")]
        output: PathBuf,
    },
    /// Check images and options without generating anything
    Validate {
        #[command(flatten)]
        images: ImageArgs,
    },
    /// Write a standalone HTML page around the embed for local viewing
    Preview {
        #[command(flatten)]
        images: ImageArgs,

        #[arg(long, default_value = "preview.html")]
        output: PathBuf,
    },
    /// Print a stock options file with all keys documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    init_thread_pool(cli.threads);
    let overlay = config::build_overlay(cli.options.as_deref(), &cli.set)?;

    match cli.command {
        Command::Generate {
            images,
            format,
            output,
            cdn_base,
        } => {
            let report = load(&images)?;
            let mut generator = EmbedGenerator::new();
            if let Some(url) = cdn_base {
                generator = generator.with_cdn_base(&url);
            }
            let (kind, artifact) = match format {
                Format::Embed => ("embed", generator.generate(&report.images, Some(&overlay))?),
                Format::Lightweight => (
                    "lightweight embed",
                    generator.generate_lightweight(&report.images, Some(&overlay))?,
                ),
                Format::Shortcode => (
                    "shortcode",
                    generator.generate_wordpress_shortcode(&report.images, Some(&overlay))?,
                ),
                Format::React => (
                    "React component",
                    generator.generate_react_component(&report.images, Some(&overlay))?,
                ),
            };
            emit(kind, &artifact, output.as_deref())?;
        }
        Command::Dynamic {
            project,
            api_base,
            output,
        } => {
            let content = std::fs::read_to_string(&project)?;
            let mut record: Project = serde_json::from_str(&content)?;
            let mut generator = EmbedGenerator::new();
            if let Some(url) = api_base {
                generator = generator.with_api_base(&url);
            }
            let artifact = generator.generate_dynamic(&mut record, Some(&overlay))?;
            std::fs::write(&project, serde_json::to_string_pretty(&record)?)?;
            emit("dynamic embed", &artifact, output.as_deref())?;
            if output.is_some() {
                output::print_project(&record);
            }
        }
        Command::Project {
            images,
            name,
            output,
        } => {
            let report = load(&images)?;
            output::print_ingest_report(&report);
            let mut project = Project::new(&name);
            project.set_images(report.images);
            std::fs::write(&output, serde_json::to_string_pretty(&project)?)?;
            println!();
            output::print_project(&project);
            println!("==> Wrote {}", output.display());
        }
        Command::Validate { images } => {
            let report = load(&images)?;
            output::print_ingest_report(&report);
            let options = SliderOptions::resolve(DefaultsProfile::Embed, Some(&overlay))?;
            let validation = embed::validate_images(&report.images);
            println!();
            output::print_embed_summary(&report.images, &options);
            println!();
            output::print_validation(&validation, report.images.len());
            if let Some(error) = validation.error {
                return Err(EmbedError::Validation(error).into());
            }
        }
        Command::Preview { images, output } => {
            let report = load(&images)?;
            let page = EmbedGenerator::new().preview_page(&report.images, Some(&overlay))?;
            std::fs::write(&output, &page)?;
            let options = SliderOptions::resolve(DefaultsProfile::Embed, Some(&overlay))?;
            output::print_embed_summary(&report.images, &options);
            output::print_artifact_summary("preview page", &page, &output);
        }
        Command::GenConfig => {
            print!("{}", config::stock_options_toml());
        }
    }

    Ok(())
}

fn load(args: &ImageArgs) -> Result<IngestReport, ingest::IngestError> {
    let options = IngestOptions {
        inline: args.inline,
        ..IngestOptions::default()
    };
    ingest::load_images(&args.images, &options)
}

/// Write the artifact to `destination`, or to stdout when none is given.
fn emit(kind: &str, artifact: &str, destination: Option<&Path>) -> std::io::Result<()> {
    match destination {
        Some(path) => {
            std::fs::write(path, artifact)?;
            output::print_artifact_summary(kind, artifact, path);
        }
        None => println!("{artifact}"),
    }
    Ok(())
}

/// Initialize the rayon thread pool.
///
/// Caps at the number of available CPU cores: users can constrain down, not up.
fn init_thread_pool(threads: Option<usize>) {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let threads = threads.map_or(cores, |t| t.clamp(1, cores));
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
