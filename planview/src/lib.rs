use std::{
    fs::File,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use image::{codecs::png::PngEncoder, ImageEncoder, Rgb as Pixel, RgbImage};
use libplanar::{
    image::{composite, palette::load_palette_file, DEFAULT_PALETTE},
    view::Grid,
    FrameGeometry, Rgb, Session,
};
use tracing::{debug, info, instrument, warn};

/// Derives `<dir>/<stem>.<suffix>` from `input`
///
/// # Errors
///
/// Fails if `input` has no parent directory or no valid file stem
pub fn default_output(input: &Path, suffix: &str) -> Result<PathBuf> {
    let mut output = PathBuf::new();
    let Some(dir) = input.parent() else {
        bail!("Invalid input file");
    };
    let Some(Some(filename)) = input.file_stem().map(|os| os.to_str()) else {
        bail!("Invalid input file");
    };
    output.push(dir);
    output.push(format!("{filename}.{suffix}"));
    info!("output name: {}", output.display());
    Ok(output)
}

fn write_png(output_name: &Path, rgb: &[u8], width: u32, height: u32) -> Result<()> {
    let output = File::options()
        .create(true)
        .write(true)
        .truncate(true)
        .open(output_name)
        .with_context(|| format!("Open {}", output_name.display()))?;

    let encoder = PngEncoder::new(output);
    encoder.write_image(rgb, width, height, image::ExtendedColorType::Rgb8)?;
    info!("Successfully wrote image to {}", output_name.display());
    Ok(())
}

/// Decodes a planar file into a png image
///
/// Without `palette_file` the built-in palette is used.
///
/// # Errors
///
/// Fails on unreadable input, undecodable planes, palette indices the palette
/// has no color for, or an unwritable output
#[instrument]
pub fn planar_to_image(
    planar_file: &Path,
    output_name: &Path,
    geometry: FrameGeometry,
    palette_file: Option<&Path>,
) -> Result<()> {
    let planar = std::fs::read(planar_file)
        .with_context(|| format!("Read {}", planar_file.display()))?;
    debug!("Read {} bytes of planar data", planar.len());

    let palette = match palette_file {
        Some(p) => load_palette_file(p).context("Read palette")?,
        None => DEFAULT_PALETTE.to_vec(),
    };
    debug!("Using palette of {} colors", palette.len());

    let frame = composite(&planar, geometry.planes, geometry.width, geometry.height)?;
    if let Some(max) = frame.max_index() {
        if usize::from(max) >= palette.len() {
            warn!("Frame uses index {max} but the palette only has {} colors", palette.len());
        }
    }
    let as_rgb = frame.to_rgb(&palette)?.to_rgb8_bytes();
    debug!("Length of RGB frame data: {}", as_rgb.len());

    info!("Writing planar image to {}", output_name.display());
    write_png(
        output_name,
        &as_rgb,
        u32::try_from(frame.width())?,
        u32::try_from(frame.height())?,
    )
}

/// Paints every cell of `grid` as a `cell_px` square
///
/// # Errors
///
/// Fails if the grid is empty or too large for an image
pub fn paint_grid(grid: &Grid, cell_px: u32, color: impl Fn(&str) -> Rgb) -> Result<RgbImage> {
    let columns = u32::try_from(grid.max_row_len())?;
    let rows = u32::try_from(grid.rows.len())?;
    if columns == 0 || rows == 0 {
        bail!("Nothing to draw, check offset and limit");
    }
    let (width, height) = (
        columns.checked_mul(cell_px).context("grid too wide")?,
        rows.checked_mul(cell_px).context("grid too tall")?,
    );
    let mut img = RgbImage::new(width, height);
    for (y, row) in (0..).zip(&grid.rows) {
        for (x, cell) in (0..).zip(&row.cells) {
            let c = color(cell);
            let pixel = Pixel([c.r, c.g, c.b]);
            for dy in 0..cell_px {
                for dx in 0..cell_px {
                    img.put_pixel(x * cell_px + dx, y * cell_px + dy, pixel);
                }
            }
        }
    }
    Ok(img)
}

/// Renders the current grid view of `session` into a png image
///
/// # Errors
///
/// Fails on an invalid configuration, an empty grid, or an unwritable output
#[instrument(skip(session))]
pub fn grid_to_image(session: &Session, output_name: &Path) -> Result<()> {
    let grid = session.grid()?;
    debug!("Laid out {} rows in {} mode", grid.rows.len(), grid.mode);

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let cell_px = ((session.config().cell_size as f32) * grid.scale()).round().max(1.0) as u32;
    let img = paint_grid(&grid, cell_px, |cell| session.cell_color(cell))?;

    info!("Writing {} grid to {}", grid.mode, output_name.display());
    write_png(output_name, img.as_raw(), img.width(), img.height())
}

/// Writes the bytes behind displayed cells `first..=last` to `output_name`
///
/// Cells are counted row by row in the session's current view, so offset, limit
/// and mode decide which bytes they stand for.
///
/// # Errors
///
/// Fails if a cell is not displayed or the output cannot be written
#[instrument(skip(session))]
pub fn export_to_file(
    session: &mut Session,
    first: usize,
    last: usize,
    output_name: &Path,
) -> Result<()> {
    let selection = session.select_cells(first, last)?;
    debug!("Cells {first}..={last} are {selection:?}");
    let written = session.write_selection(output_name)?;
    info!("Exported {written} bytes");
    Ok(())
}
