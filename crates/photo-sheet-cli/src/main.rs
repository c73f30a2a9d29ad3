mod logger;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use photo_sheet::{
    Color, CropRegion, FaceBox, FaceDetector, FixedFaceBox, MattingService, NoFaceDetector,
    PaperSize, PassthroughMatting, Pipeline, RemoveBgClient, SheetOptions, SourceImage,
    compute_sheet_layout,
};
use std::path::{Path, PathBuf};

use crate::logger::CliLogger;

#[derive(Parser)]
#[command(name = "psheet", about = "Passport photo sheet generator", version)]
struct Cli {
    /// Log every pipeline step
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Turn a portrait into a printable sheet of ID photos
    Sheet {
        /// Input photo (PNG, JPEG, WebP, ...)
        #[arg(short, long)]
        input: PathBuf,

        /// Output JPEG file
        #[arg(short, long)]
        output: PathBuf,

        /// Crop rectangle as x,y,width,height (default: largest centred region)
        #[arg(long, value_parser = parse_rect)]
        crop: Option<[f64; 4]>,

        /// Size the crop was selected at, as WIDTHxHEIGHT (default: the photo's own size)
        #[arg(long, value_parser = parse_size)]
        display: Option<(u32, u32)>,

        /// Face box in crop pixels as x,y,width,height
        #[arg(long, value_parser = parse_rect)]
        face: Option<[f64; 4]>,

        /// Background colour (#rrggbb)
        #[arg(long)]
        background: Option<Color>,

        /// Photos per row
        #[arg(long)]
        columns: Option<u32>,

        /// Output paper size
        #[arg(long, value_enum)]
        paper: Option<PaperArg>,

        /// JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Skip background removal and use the photo as is
        #[arg(long)]
        offline: bool,
    },

    /// Show how many photos fit on a sheet
    Layout {
        /// Photos per row
        #[arg(long)]
        columns: Option<u32>,

        /// Output paper size
        #[arg(long, value_enum)]
        paper: Option<PaperArg>,

        /// JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Write the default configuration to a file
    InitConfig {
        path: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PaperArg {
    A3,
    A4,
    A5,
    Letter,
}

impl From<PaperArg> for PaperSize {
    fn from(arg: PaperArg) -> Self {
        match arg {
            PaperArg::A3 => Self::A3,
            PaperArg::A4 => Self::A4,
            PaperArg::A5 => Self::A5,
            PaperArg::Letter => Self::Letter,
        }
    }
}

fn parse_rect(s: &str) -> std::result::Result<[f64; 4], String> {
    let values = s
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid number in '{s}': {e}"))?;

    values
        .try_into()
        .map_err(|_| format!("expected x,y,width,height, got '{s}'"))
}

fn parse_size(s: &str) -> std::result::Result<(u32, u32), String> {
    let (width, height) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid size '{s}': {e}"))
    };
    Ok((parse(width)?, parse(height)?))
}

async fn load_options(config: Option<&Path>, paper: Option<PaperArg>) -> Result<SheetOptions> {
    let mut options = match config {
        Some(path) => SheetOptions::load(path)
            .await
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SheetOptions::default(),
    };
    if let Some(paper) = paper {
        options.paper_size = paper.into();
    }
    options.validate()?;
    Ok(options)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    CliLogger::new(cli.verbose).init()?;

    match cli.command {
        Commands::Sheet {
            input,
            output,
            crop,
            display,
            face,
            background,
            columns,
            paper,
            config,
            offline,
        } => {
            let options = load_options(config.as_deref(), paper).await?;
            let background = background.unwrap_or(options.default_background);
            let columns = columns.unwrap_or(options.default_columns);

            let matting: Box<dyn MattingService> = if offline {
                Box::new(PassthroughMatting)
            } else {
                Box::new(RemoveBgClient::from_options(&options.matting)?)
            };

            let source = SourceImage::load(&input)
                .await
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let natural = (source.width(), source.height());

            let region = match crop {
                Some([x, y, w, h]) => {
                    CropRegion::displayed(x, y, w, h, natural, display.unwrap_or(natural))?
                }
                None => CropRegion::centered(natural.0, natural.1, options.photo_size.aspect_ratio()),
            };

            let detector: Box<dyn FaceDetector> = match face {
                Some([x, y, w, h]) => Box::new(FixedFaceBox(FaceBox::new(x, y, w, h))),
                None => Box::new(NoFaceDetector),
            };

            let mut pipeline = Pipeline::new(options)?;
            pipeline.load_source(source);
            pipeline.set_crop_region(region, detector.as_ref())?;

            let sheet = pipeline
                .run_pipeline(background, columns, matting.as_ref())
                .await?;
            for warning in pipeline.warnings() {
                log::warn!("{}", warning);
            }

            let bytes = pipeline.save(&output).await?;
            println!(
                "Placed {} photos ({} x {}) → {} ({} bytes)",
                sheet.placed_count(),
                sheet.layout.columns,
                sheet.layout.rows,
                output.display(),
                bytes
            );
        }

        Commands::Layout {
            columns,
            paper,
            config,
        } => {
            let options = load_options(config.as_deref(), paper).await?;
            let columns = columns.unwrap_or(options.default_columns);
            let (page_width, page_height) = options.page_dimensions_px();
            let (photo_width, photo_height) = options.photo_dimensions_px();

            let layout = compute_sheet_layout(
                (page_width, page_height),
                (photo_width, photo_height),
                columns,
                options.vertical_margin_px,
            )?;

            println!("Sheet Layout:");
            println!("  Page: {}x{} px at {} DPI", page_width, page_height, options.dpi);
            println!("  Photo: {}x{} px", photo_width, photo_height);
            println!("  Columns: {}", layout.columns);
            println!("  Rows: {}", layout.rows);
            println!("  Horizontal spacing: {:.2} px", layout.horizontal_spacing);
            println!("  Photos per sheet: {}", layout.total_placed());
            if layout.is_empty() {
                bail!("No photos fit on the page");
            }
        }

        Commands::InitConfig { path } => {
            SheetOptions::default().save(&path).await?;
            println!("Wrote default configuration → {}", path.display());
        }
    }

    Ok(())
}
