#![allow(dead_code)]

use std::{fs::File, io::Write, path::Path};

use mktemp::Temp;

/// 4x2 raster, 2 planes of 1 byte each
///
/// plane 0: 1100 0011
/// plane 1: 1010 0101
pub const TWO_PLANE_4X2: [u8; 2] = [0b1100_0011, 0b1010_0101];
pub const TWO_PLANE_4X2_INDICES: [u8; 8] = [3, 2, 1, 0, 0, 1, 2, 3];

/// Writes `bytes` to a new temporary file
pub fn temp_file_with(bytes: &[u8]) -> anyhow::Result<Temp> {
    let tmp = Temp::new_file()?;
    let mut f = File::options().write(true).truncate(true).open(&tmp)?;
    f.write_all(bytes)?;
    Ok(tmp)
}

/// Sha256 of the file at `path`
pub fn digest(path: &Path) -> String {
    sha256::try_digest(path).expect("Failed to hash file")
}
