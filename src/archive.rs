//! Archive form of a bundle: a gzip-compressed tar whose entries are rooted
//! at `wheelhouse<KEY>/…`, so unpacking into a working directory recreates
//! the bundle directory in place.

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{Read, Write};
use std::path::Path;

use crate::bundle::Bundle;

/// Pack a bundle directory into its `.tar.gz` archive form
pub fn pack<W: Write>(bundle: &Bundle, writer: W) -> Result<()> {
    let encoder = GzEncoder::new(writer, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    builder
        .append_dir_all(bundle.dir_name(), bundle.dir())
        .with_context(|| format!("failed to archive bundle dir: {}", bundle.dir().display()))?;

    let encoder = builder.into_inner().context("failed to finish archive")?;
    encoder.finish().context("failed to finish compression")?;

    Ok(())
}

/// Pack a bundle into an in-memory archive
pub fn pack_to_vec(bundle: &Bundle) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    pack(bundle, &mut data)?;
    Ok(data)
}

/// Unpack an archive into a working directory, recreating `wheelhouse<KEY>/`
pub fn unpack<R: Read>(reader: R, dest: &Path) -> Result<()> {
    let mut archive = tar::Archive::new(GzDecoder::new(reader));
    archive
        .unpack(dest)
        .with_context(|| format!("failed to unpack archive into {}", dest.display()))?;
    Ok(())
}
