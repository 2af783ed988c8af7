use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::info;

use pdf_toolkit::config::{load_config, load_config_from};
use pdf_toolkit::render::RenderSettings;
use pdf_toolkit::{
    PdfOutput, PdfSource, PdfToolkit, RenderedImage, thumbnails_to_base64_json,
};

#[derive(Debug, Parser)]
#[command(name = "pdf-toolkit", version, about = "Extract, remove, reorder and render PDF pages")]
struct Cli {
    /// Configuration file (defaults to ./pdf-toolkit.{toml,yaml,json} when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Keep only the pages selected by a range such as "2-4,8"
    Extract {
        input: PathBuf,
        #[arg(short, long)]
        range: String,
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },
    /// Drop the pages selected by a range
    Remove {
        input: PathBuf,
        #[arg(short, long)]
        range: String,
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },
    /// Rebuild the document in the given page order, e.g. "3,1,2"
    Reorder {
        input: PathBuf,
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
        order: Vec<i64>,
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },
    /// Render one thumbnail per page
    Thumbnails {
        input: PathBuf,
        /// Bounding box as "{width}x{height}"
        #[arg(long)]
        size: Option<String>,
        #[arg(long)]
        dpi: Option<i64>,
        /// Print a JSON array of base64 images instead of writing files
        #[arg(long)]
        base64: bool,
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },
    /// Render a single page preview
    Preview {
        input: PathBuf,
        #[arg(short, long)]
        page: usize,
        #[arg(long)]
        dpi: Option<i64>,
        /// Print the image as base64 instead of writing a file
        #[arg(long)]
        base64: bool,
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    match cli.command {
        Command::Extract {
            input,
            range,
            output_dir,
        } => {
            let output = pdf_toolkit::extract_pages(&read_source(&input)?, &range)?;
            write_pdf(&output_dir, &output)?;
        }
        Command::Remove {
            input,
            range,
            output_dir,
        } => {
            let output = pdf_toolkit::remove_pages(&read_source(&input)?, &range)?;
            write_pdf(&output_dir, &output)?;
        }
        Command::Reorder {
            input,
            order,
            output_dir,
        } => {
            let output = pdf_toolkit::reorder_pages(&read_source(&input)?, &order)?;
            write_pdf(&output_dir, &output)?;
        }
        Command::Thumbnails {
            input,
            size,
            dpi,
            base64,
            output_dir,
        } => {
            let toolkit = PdfToolkit::new(config)?;
            let defaults = toolkit.thumbnail_settings();
            let settings = match size {
                Some(size) => RenderSettings::from_dimensions(&size, defaults.dpi() as i64)?
                    .with_format(defaults.format()),
                None => defaults,
            };
            let settings = match dpi {
                Some(dpi) => settings.with_dpi(dpi),
                None => settings,
            };

            let images = toolkit.render_thumbnails(&read_source(&input)?, &settings)?;
            if base64 {
                println!("{}", thumbnails_to_base64_json(&images));
            } else {
                for image in &images {
                    write_image(&output_dir, image)?;
                }
            }
        }
        Command::Preview {
            input,
            page,
            dpi,
            base64,
            output_dir,
        } => {
            let toolkit = PdfToolkit::new(config)?;
            let settings = match dpi {
                Some(dpi) => toolkit.preview_settings().with_dpi(dpi),
                None => toolkit.preview_settings(),
            };

            let image = toolkit.render_preview(&read_source(&input)?, page, &settings)?;
            if base64 {
                println!("{}", image.to_base64());
            } else {
                write_image(&output_dir, &image)?;
            }
        }
    }

    Ok(())
}

fn init_logging(json: bool) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    // Use RUST_LOG if set, otherwise default to info level for our crate
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pdf_toolkit=info"));

    // stdout carries command output, so logs go to stderr
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        let format = fmt::format()
            .with_target(true)
            .with_thread_ids(true)
            .compact();
        registry
            .with(fmt::layer().event_format(format).with_writer(std::io::stderr))
            .init();
    }
}

fn read_source(path: &Path) -> std::io::Result<PdfSource> {
    let bytes = fs::read(path)?;
    let source = PdfSource::new(bytes);
    Ok(match path.file_name().and_then(|name| name.to_str()) {
        Some(name) => source.with_filename(name),
        None => source,
    })
}

fn write_pdf(dir: &Path, output: &PdfOutput) -> std::io::Result<()> {
    write_file(dir, &output.filename, &output.bytes)
}

fn write_image(dir: &Path, image: &RenderedImage) -> std::io::Result<()> {
    write_file(dir, &image.filename, &image.bytes)
}

fn write_file(dir: &Path, filename: &str, bytes: &[u8]) -> std::io::Result<()> {
    fs::create_dir_all(dir)?;
    let path = dir.join(filename);
    fs::write(&path, bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), "Wrote output");
    Ok(())
}
