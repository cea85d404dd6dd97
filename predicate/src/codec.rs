//! Compression codec selection for the serializer-factory step
//! (`OpenSerializer` in the write orchestrator's state machine).

/// The compression codec a column's on-disk encoding should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionCodec {
    /// No compression — chosen for very small parts where the codec's
    /// fixed per-block overhead would outweigh any savings.
    None,
    /// A fast, low-ratio codec suited to write-heavy, sparse-valued parts.
    Lz4,
    /// A slower, higher-ratio codec chosen when the part is large or the
    /// caller has asked for a high default-value density (sparse columns
    /// compress disproportionately well under it).
    Zstd,
}

/// Threshold below which a part is too small to bother compressing.
const MIN_BYTES_TO_COMPRESS: usize = 4 * 1024;

/// Default-value ratio above which the denser `Zstd` codec is preferred
/// over `Lz4` even for moderately sized parts — a sparse column (mostly
/// the schema's default value) compresses far better under a
/// dictionary-heavy codec.
const SPARSE_RATIO_PREFERS_ZSTD: f64 = 0.5;

/// Pick a codec for a column given its uncompressed byte size and its
/// default-value ratio (`ratio_of_defaults_for_sparse_serialization`,
/// threaded down from `WriterSettings`).
pub fn choose_compression_codec(size: usize, ratio: f64) -> CompressionCodec {
    if size < MIN_BYTES_TO_COMPRESS {
        return CompressionCodec::None;
    }
    if ratio >= SPARSE_RATIO_PREFERS_ZSTD {
        CompressionCodec::Zstd
    } else {
        CompressionCodec::Lz4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiny_parts_skip_compression() {
        assert_eq!(choose_compression_codec(10, 0.9), CompressionCodec::None);
    }

    #[test]
    fn sparse_columns_prefer_zstd() {
        assert_eq!(
            choose_compression_codec(1_000_000, 0.8),
            CompressionCodec::Zstd
        );
    }

    #[test]
    fn dense_columns_prefer_lz4() {
        assert_eq!(
            choose_compression_codec(1_000_000, 0.1),
            CompressionCodec::Lz4
        );
    }
}
