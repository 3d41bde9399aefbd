/// Demonstrates how to create a png file from a planar frame
/// using the [`image`] crate
///
/// Usage: `cargo run --example planes_to_png -- <planar file> [planes] [width] [height]`
use image::{codecs::png::PngEncoder, ImageEncoder};
use libplanar::image::{composite, DEFAULT_PALETTE};
use std::fs::File;

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let Some(input) = args.next() else {
        anyhow::bail!("missing planar file");
    };
    let mut next_or = |default: usize| -> anyhow::Result<usize> {
        Ok(args.next().map(|a| a.parse()).transpose()?.unwrap_or(default))
    };
    let (planes, width, height) = (next_or(5)?, next_or(320)?, next_or(200)?);

    let planar = std::fs::read(&input)?;
    let frame = composite(&planar, planes, width, height)?;
    let as_rgb = frame.to_rgb(&DEFAULT_PALETTE)?.to_rgb8_bytes();

    let output = File::options()
        .create(true)
        .write(true)
        .truncate(true)
        .open("planes_to_png_example.png")?;

    let encoder = PngEncoder::new(output);
    encoder.write_image(
        &as_rgb,
        frame.width() as u32,
        frame.height() as u32,
        image::ExtendedColorType::Rgb8,
    )?;
    Ok(())
}
