use anyhow::{Context, Result};
use std::io::Read;

#[cfg(feature = "compression-bzip2")]
use bzip2::read::BzDecoder;
#[cfg(feature = "compression-gzip")]
use flate2::read::GzDecoder;
#[cfg(feature = "compression-xz")]
use xz2::read::XzDecoder;

/// Supported compression formats detected by magic bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionFormat {
    Gzip,
    Bzip2,
    Xz,
    Uncompressed,
}

/// Magic file detection and decompression utility
pub struct DecompressionService;

impl DecompressionService {
    /// Detect compression format using magic bytes
    pub fn detect_compression_format(data: &[u8]) -> CompressionFormat {
        match infer::get(data).map(|kind| kind.mime_type()) {
            Some("application/gzip") => CompressionFormat::Gzip,
            Some("application/x-bzip2") => CompressionFormat::Bzip2,
            Some("application/x-xz") => CompressionFormat::Xz,
            _ => CompressionFormat::Uncompressed,
        }
    }

    /// Decompress data with a known format, failing if the payload does not match it
    pub fn decompress_as(format: CompressionFormat, data: &[u8]) -> Result<Vec<u8>> {
        match format {
            CompressionFormat::Gzip => Self::decompress_gzip(data),
            CompressionFormat::Bzip2 => Self::decompress_bzip2(data),
            CompressionFormat::Xz => Self::decompress_xz(data),
            CompressionFormat::Uncompressed => Ok(data.to_vec()),
        }
    }

    #[cfg(feature = "compression-gzip")]
    fn decompress_gzip(data: &[u8]) -> Result<Vec<u8>> {
        let mut decoder = GzDecoder::new(data);
        let mut decompressed = Vec::new();
        decoder
            .read_to_end(&mut decompressed)
            .context("Failed to decompress gzip data")?;
        Ok(decompressed)
    }

    #[cfg(not(feature = "compression-gzip"))]
    fn decompress_gzip(_data: &[u8]) -> Result<Vec<u8>> {
        anyhow::bail!("gzip support is not enabled (feature `compression-gzip`)")
    }

    #[cfg(feature = "compression-bzip2")]
    fn decompress_bzip2(data: &[u8]) -> Result<Vec<u8>> {
        let mut decoder = BzDecoder::new(data);
        let mut decompressed = Vec::new();
        decoder
            .read_to_end(&mut decompressed)
            .context("Failed to decompress bzip2 data")?;
        Ok(decompressed)
    }

    #[cfg(not(feature = "compression-bzip2"))]
    fn decompress_bzip2(_data: &[u8]) -> Result<Vec<u8>> {
        anyhow::bail!("bzip2 support is not enabled (feature `compression-bzip2`)")
    }

    #[cfg(feature = "compression-xz")]
    fn decompress_xz(data: &[u8]) -> Result<Vec<u8>> {
        let mut decoder = XzDecoder::new(data);
        let mut decompressed = Vec::new();
        decoder
            .read_to_end(&mut decompressed)
            .context("Failed to decompress xz data")?;
        Ok(decompressed)
    }

    #[cfg(not(feature = "compression-xz"))]
    fn decompress_xz(_data: &[u8]) -> Result<Vec<u8>> {
        anyhow::bail!("xz support is not enabled (feature `compression-xz`)")
    }
}

#[cfg(all(test, feature = "compression-gzip"))]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_detect_uncompressed() {
        let data = b"<?xml version=\"1.0\"?><tv></tv>";
        let format = DecompressionService::detect_compression_format(data);
        assert_eq!(format, CompressionFormat::Uncompressed);
    }

    #[test]
    fn test_detect_and_decompress_gzip() {
        let plain = b"<tv><channel id=\"a\"></channel></tv>";
        let compressed = gzip(plain);

        let format = DecompressionService::detect_compression_format(&compressed);
        assert_eq!(format, CompressionFormat::Gzip);

        let decompressed = DecompressionService::decompress_as(format, &compressed).unwrap();
        assert_eq!(decompressed, plain);
    }

    #[test]
    fn test_decompress_uncompressed_passthrough() {
        let data = b"Hello, world!";
        let format = DecompressionService::detect_compression_format(data);
        let result = DecompressionService::decompress_as(format, data).unwrap();
        assert_eq!(result, data);
    }

    #[test]
    fn test_forced_gzip_on_plain_data_fails() {
        let result = DecompressionService::decompress_as(CompressionFormat::Gzip, b"<tv></tv>");
        assert!(result.is_err());
    }

    #[test]
    fn test_truncated_gzip_fails() {
        let compressed = gzip(&[b'x'; 4096]);
        let truncated = &compressed[..compressed.len() / 2];
        let format = DecompressionService::detect_compression_format(truncated);
        assert!(DecompressionService::decompress_as(format, truncated).is_err());
    }
}
