use libplanar::{
    session::{FilterPolicy, RandomColors},
    symbol::has_filler_high_bytes,
    DisplayMode, Session, ViewConfig,
};
use planview::{default_output, export_to_file, grid_to_image, planar_to_image};
use std::path::{Path, PathBuf};
use tracing::{info, Level};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

#[cfg(not(debug_assertions))]
const DEFAULT_DEBUG_LEVEL: u8 = 1;
#[cfg(debug_assertions)]
const DEFAULT_DEBUG_LEVEL: u8 = 99;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Turn debugging information on
    #[arg(short, long, default_value_t = DEFAULT_DEBUG_LEVEL, action = clap::ArgAction::Count)]
    verbosity: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Grid layout options
#[derive(Args, Debug)]
struct ViewArgs {
    /// Cells per row
    #[arg(short, long, default_value_t = 16, allow_negative_numbers = true)]
    row_width: i64,
    /// Cell edge length in pixels
    #[arg(short, long, default_value_t = 20, allow_negative_numbers = true)]
    cell_size: i64,
    /// First symbol shown
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    offset: i64,
    /// Symbol to stop before, 0 for all
    #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
    limit: i64,
    /// Minimum run length kept in palette mode
    #[arg(short, long, default_value_t = 32, allow_negative_numbers = true)]
    threshold: i64,
    /// How symbols are laid out: hex, bit or palette
    #[arg(short, long, default_value_t = DisplayMode::Hex)]
    mode: DisplayMode,
    /// Drop the high byte of every 16-bit value: off, on or auto
    #[arg(short, long, default_value_t = FilterPolicy::Off)]
    filter: FilterPolicy,
}

impl ViewArgs {
    fn config(&self) -> ViewConfig {
        ViewConfig::builder()
            .row_width(self.row_width)
            .cell_size(self.cell_size)
            .offset(self.offset)
            .limit(self.limit)
            .run_threshold(self.threshold)
            .build()
    }

    fn session(&self, file: &Path, seed: Option<u64>) -> Result<Session> {
        let colors = seed.map_or_else(RandomColors::from_entropy, RandomColors::seeded);
        let mut session = Session::new(colors);
        session.set_config(self.config())?;
        session.set_mode(self.mode);
        session.set_filter_policy(self.filter);
        session.load_file(file)?;
        if self.filter == FilterPolicy::Off
            && !session.symbols().is_empty()
            && has_filler_high_bytes(session.symbols())
        {
            info!("Every high byte is 00, consider --filter on");
        }
        Ok(session)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// converts planar bitplane data to a png image
    #[command(name = "merge")]
    PlanarToImage {
        /// The planar file
        planar_file: PathBuf,

        /// The output file name
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of bitplanes
        #[arg(short, long, default_value_t = 5)]
        planes: i64,

        /// Frame width in pixels
        #[arg(long, default_value_t = 320)]
        width: i64,

        /// Frame height in pixels
        #[arg(long, default_value_t = 200)]
        height: i64,

        /// File holding the palette as 16-bit color words
        #[arg(long)]
        palette: Option<PathBuf>,
    },

    /// draws a file as a grid of colored cells
    #[command(name = "grid")]
    GridToImage {
        /// The file to inspect
        file: PathBuf,

        /// The output file name
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        view: ViewArgs,

        /// Seed for the colors of hex cells
        #[arg(long)]
        seed: Option<u64>,
    },

    /// copies the bytes behind a range of cells to a file
    #[command(name = "export")]
    ExportRange {
        /// The file to export from
        file: PathBuf,

        /// First cell of the view, counted row by row
        #[arg(long)]
        start: usize,

        /// Last cell (inclusive)
        #[arg(long)]
        stop: usize,

        #[command(flatten)]
        view: ViewArgs,

        /// The output file name
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// writes the current width and offset to a text file
    #[command(name = "dump")]
    DumpSettings {
        #[command(flatten)]
        view: ViewArgs,

        /// The output file name
        #[arg(short, long, default_value = "/tmp/dump.txt")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbosity {
        0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        3 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_file(true)
        .with_line_number(true)
        .init();

    match cli.command {
        Commands::PlanarToImage {
            planar_file,
            output,
            planes,
            width,
            height,
            palette,
        } => {
            let geometry = ViewConfig::builder()
                .planes(planes)
                .frame_width(width)
                .frame_height(height)
                .build()
                .frame()?;
            let output = match output {
                Some(o) => o,
                None => default_output(&planar_file, "png")?,
            };
            planar_to_image(&planar_file, &output, geometry, palette.as_deref())?;
        }
        Commands::GridToImage {
            file,
            output,
            view,
            seed,
        } => {
            let session = view.session(&file, seed)?;
            let output = match output {
                Some(o) => o,
                None => default_output(&file, &format!("{}.png", view.mode))?,
            };
            grid_to_image(&session, &output)?;
        }
        Commands::ExportRange {
            file,
            start,
            stop,
            view,
            output,
        } => {
            let mut session = view.session(&file, None)?;
            let output = match output {
                Some(o) => o,
                None => default_output(&file, &format!("{start}-{stop}.bin"))?,
            };
            export_to_file(&mut session, start, stop, &output)?;
        }
        Commands::DumpSettings { view, output } => {
            let mut session = Session::new(RandomColors::seeded(0));
            session.set_config(view.config())?;
            session.dump_config_to(&output)?;
        }
    }
    Ok(())
}
