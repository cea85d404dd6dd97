//! The concrete serializer: an Arrow-to-Parquet writer plus the side files
//! (`columns.txt`, `count.txt`, `partition.dat`, `minmax_*.idx`, `ttl.txt`)
//! and checksums that make up one written part's on-disk artifact set.

use std::fs::File;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::UInt64Array;
use data_types::{MinMaxIndex, SkipIndex, Value};
use iox_catalog::{Transaction, WriterSettings};
use mutable_batch::{take_rows, Block};
use observability_deps::tracing::debug;
use parquet::arrow::arrow_writer::ArrowWriter;
use parquet::file::properties::WriterProperties;
use predicate::codec::CompressionCodec;
use schema::Schema as TableSchema;
use sha2::{Digest, Sha256};
use snafu::{ResultExt, Snafu};
use uuid::Uuid;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("io error writing {}: {}", path.display(), source))]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("arrow error: {}", source))]
    Arrow { source: arrow::error::ArrowError },

    #[snafu(display("parquet error: {}", source))]
    Parquet {
        source: parquet::errors::ParquetError,
    },

    #[snafu(display("mutable_batch error: {}", source))]
    MutableBatch { source: mutable_batch::WriterError },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<arrow::error::ArrowError> for Error {
    fn from(source: arrow::error::ArrowError) -> Self {
        Error::Arrow { source }
    }
}

impl From<parquet::errors::ParquetError> for Error {
    fn from(source: parquet::errors::ParquetError) -> Self {
        Error::Parquet { source }
    }
}

impl From<mutable_batch::WriterError> for Error {
    fn from(source: mutable_batch::WriterError) -> Self {
        Error::MutableBatch { source }
    }
}

/// Opens a [`Stream`] for a newly-reserved part directory. A trait so tests
/// can substitute an in-memory fake without touching the filesystem.
pub trait SerializerFactory: std::fmt::Debug + Send + Sync {
    #[allow(clippy::too_many_arguments)]
    fn open(
        &self,
        dir: &Path,
        columns: &TableSchema,
        skip_indices: &[SkipIndex],
        codec: CompressionCodec,
        settings: &WriterSettings,
        transaction: Option<&dyn Transaction>,
    ) -> Result<Stream>;
}

/// The default, Parquet-backed [`SerializerFactory`].
#[derive(Debug, Default)]
pub struct ParquetSerializer;

impl SerializerFactory for ParquetSerializer {
    fn open(
        &self,
        dir: &Path,
        columns: &TableSchema,
        skip_indices: &[SkipIndex],
        codec: CompressionCodec,
        settings: &WriterSettings,
        transaction: Option<&dyn Transaction>,
    ) -> Result<Stream> {
        std::fs::create_dir_all(dir).context(IoSnafu {
            path: dir.to_path_buf(),
        })?;

        if let Some(txn) = transaction {
            debug!(dir = %dir.display(), transaction = txn.id(), "opening parquet serializer");
        } else {
            debug!(dir = %dir.display(), "opening parquet serializer");
        }

        let props = WriterProperties::builder()
            .set_compression(arrow_compression(codec))
            .build();

        let data_path = dir.join("data.parquet");
        let file = File::create(&data_path).context(IoSnafu {
            path: data_path.clone(),
        })?;
        let arrow_writer = ArrowWriter::try_new(file, columns.as_arrow(), Some(props))?;

        Ok(Stream {
            dir: dir.to_path_buf(),
            data_path,
            writer: Some(arrow_writer),
            skip_indices: skip_indices.to_vec(),
            settings: *settings,
            rows_written: 0,
            minmax: MinMaxIndex::new(),
            partition: Vec::new(),
        })
    }
}

fn arrow_compression(codec: CompressionCodec) -> parquet::basic::Compression {
    match codec {
        CompressionCodec::None => parquet::basic::Compression::UNCOMPRESSED,
        CompressionCodec::Lz4 => parquet::basic::Compression::LZ4,
        CompressionCodec::Zstd => parquet::basic::Compression::ZSTD,
    }
}

/// An open serializer for one part. `write_with_permutation` may be called
/// any number of times (once per projection sub-part sharing the parent's
/// stream list); `finalize_async` consumes it.
#[derive(Debug)]
pub struct Stream {
    dir: PathBuf,
    data_path: PathBuf,
    writer: Option<ArrowWriter<File>>,
    skip_indices: Vec<SkipIndex>,
    settings: WriterSettings,
    rows_written: u64,
    minmax: MinMaxIndex,
    partition: Vec<Value>,
}

impl Stream {
    /// Record the partition tuple this part was written for, included in
    /// `partition.dat` at finalization.
    pub fn set_partition(&mut self, partition: Vec<Value>) {
        self.partition = partition;
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    pub fn skip_indices(&self) -> &[SkipIndex] {
        &self.skip_indices
    }

    /// Write `block`, optionally reordered by `permutation` first (the
    /// `WritePermuted` step — the permutation is the sort plan's computed
    /// row order, or `None` for the already-sorted fast path).
    pub fn write_with_permutation(
        &mut self,
        block: &Block,
        permutation: Option<&UInt64Array>,
    ) -> Result<()> {
        let block = match permutation {
            Some(perm) => take_rows(block, perm)?,
            None => block.clone(),
        };

        for field in block.schema().fields() {
            let idx = block.schema().index_of(field.name()).expect("field came from this schema");
            let array = block.column(idx);
            for row in 0..array.len() {
                if let Some(v) = mutable_batch::value::try_value_at(array.as_ref(), row) {
                    if !matches!(v, Value::Null) {
                        self.minmax.update(field.name(), v);
                    }
                }
            }
        }

        self.rows_written += block.num_rows() as u64;
        self.writer
            .as_mut()
            .expect("stream not yet finalized")
            .write(&block)?;
        Ok(())
    }

    /// Close the Parquet writer, write the side files, checksum them, and
    /// optionally fsync per `WriterSettings`. Returns a [`Finalizer`] the
    /// caller awaits before publishing the part.
    pub fn finalize_async(mut self) -> Finalizer {
        let settings = self.settings;
        let dir = self.dir.clone();
        let data_path = self.data_path.clone();
        let rows_written = self.rows_written;
        let minmax = self.minmax.clone();
        let partition = self.partition.clone();

        let handle = tokio::task::spawn_blocking(move || -> Result<()> {
            let mut writer = self.writer.take().expect("stream not yet finalized");
            writer.close()?;

            write_side_files(&dir, rows_written, &minmax, &partition)?;
            write_checksums(&dir, &data_path)?;

            if settings.fsync_after_insert {
                File::open(&data_path)
                    .and_then(|f| f.sync_all())
                    .context(IoSnafu {
                        path: data_path.clone(),
                    })?;
            }
            if settings.fsync_part_directory {
                File::open(&dir).and_then(|f| f.sync_all()).context(IoSnafu {
                    path: dir.clone(),
                })?;
            }
            Ok(())
        });

        Finalizer { handle }
    }
}

fn write_side_files(
    dir: &Path,
    rows_written: u64,
    minmax: &MinMaxIndex,
    partition: &[Value],
) -> Result<()> {
    write_text(&dir.join("count.txt"), &rows_written.to_string())?;

    let columns_text = minmax
        .iter()
        .map(|(name, _)| name.clone())
        .collect::<Vec<_>>()
        .join("\n");
    write_text(&dir.join("columns.txt"), &columns_text)?;

    for (name, (min, max)) in minmax.iter() {
        write_text(
            &dir.join(format!("minmax_{}.idx", name)),
            &format!("{:?}\t{:?}", min, max),
        )?;
    }

    let partition_text = partition
        .iter()
        .map(|v| format!("{:?}", v))
        .collect::<Vec<_>>()
        .join("\t");
    write_text(&dir.join("partition.dat"), &partition_text)?;

    Ok(())
}

fn write_checksums(dir: &Path, data_path: &Path) -> Result<()> {
    let bytes = std::fs::read(data_path).context(IoSnafu {
        path: data_path.to_path_buf(),
    })?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let digest = hasher.finalize();
    write_text(
        &dir.join("checksums.txt"),
        &format!("data.parquet\t{:x}", digest),
    )
}

fn write_text(path: &Path, contents: &str) -> Result<()> {
    let mut f = File::create(path).context(IoSnafu {
        path: path.to_path_buf(),
    })?;
    f.write_all(contents.as_bytes()).context(IoSnafu {
        path: path.to_path_buf(),
    })
}

/// A part identity assigned at `Prepare` time, carried by
/// `ingester::write::TemporaryPart`'s descriptor when the writer settings
/// ask for one.
pub fn maybe_assign_uuid(assign: bool) -> Option<Uuid> {
    assign.then(Uuid::new_v4)
}

/// A scheduled close-and-checksum task. `await_done` resolves once every
/// side file and checksum has been written and any requested fsyncs have
/// completed.
#[derive(Debug)]
pub struct Finalizer {
    handle: tokio::task::JoinHandle<Result<()>>,
}

impl Finalizer {
    pub async fn await_done(self) -> Result<()> {
        match self.handle.await {
            Ok(result) => result,
            Err(join_err) => Err(Error::Io {
                path: PathBuf::new(),
                source: std::io::Error::new(std::io::ErrorKind::Other, join_err.to_string()),
            }),
        }
    }
}
