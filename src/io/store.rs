//! Named attribute/dataset container backing the mesh and parameter stores.
//!
//! The container plays the role an HDF5 file plays for the mesh tooling: a
//! flat namespace of attributes (single values) and datasets (row-indexed
//! arrays with a fixed row width). Readers support whole-dataset reads,
//! contiguous hyperslab reads and single-element reads. A [`StoreReader`]
//! owns a seekable cursor, so every read takes `&mut self` and reads against
//! one reader are strictly sequential.

use crate::io::wire::{Dtype, EntryRole, StoreKind, WireEntry, WireStoreHdr, STORE_MAGIC, STORE_VERSION};
use crate::mesh_error::MeshPartitionError;
use bytemuck::{bytes_of, pod_read_unaligned};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use hashbrown::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

fn malformed(message: impl Into<String>) -> MeshPartitionError {
    MeshPartitionError::StoreFormat(message.into())
}

struct PendingEntry {
    name: String,
    dtype: Dtype,
    role: EntryRole,
    width: usize,
    rows: usize,
    data: Bytes,
}

/// Accumulates entries in memory and writes them as one store file.
pub struct StoreWriter {
    kind: StoreKind,
    entries: Vec<PendingEntry>,
}

impl StoreWriter {
    pub fn new(kind: StoreKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    fn push(&mut self, entry: PendingEntry) -> &mut Self {
        // Later writes under the same name replace earlier ones.
        self.entries.retain(|e| e.name != entry.name);
        self.entries.push(entry);
        self
    }

    pub fn attr_bool(&mut self, name: &str, value: bool) -> &mut Self {
        self.push(PendingEntry {
            name: name.to_string(),
            dtype: Dtype::Bool,
            role: EntryRole::Attribute,
            width: 1,
            rows: 1,
            data: Bytes::copy_from_slice(&[value as u8]),
        })
    }

    /// Add a NUL-padded string attribute of exactly `width` bytes.
    ///
    /// The value must be strictly shorter than `width`, leaving room for the
    /// terminator.
    pub fn attr_fixed_str(
        &mut self,
        name: &str,
        value: &str,
        width: usize,
    ) -> Result<&mut Self, MeshPartitionError> {
        if value.len() >= width {
            return Err(MeshPartitionError::DatasetLayout {
                name: name.to_string(),
                expected: format!("string shorter than {width} bytes"),
                found: format!("{} bytes", value.len()),
            });
        }
        let mut buf = BytesMut::with_capacity(width);
        buf.put_slice(value.as_bytes());
        buf.put_bytes(0, width - value.len());
        Ok(self.push(PendingEntry {
            name: name.to_string(),
            dtype: Dtype::FixedStr,
            role: EntryRole::Attribute,
            width,
            rows: 1,
            data: buf.freeze(),
        }))
    }

    /// Add an `i32` dataset with `width` components per row.
    pub fn dataset_i32(&mut self, name: &str, width: usize, values: &[i32]) -> &mut Self {
        debug_assert!(width > 0 && values.len() % width == 0);
        let mut buf = BytesMut::with_capacity(values.len() * 4);
        for &v in values {
            buf.put_i32_le(v);
        }
        self.push(PendingEntry {
            name: name.to_string(),
            dtype: Dtype::I32,
            role: EntryRole::Dataset,
            width,
            rows: values.len() / width,
            data: buf.freeze(),
        })
    }

    /// Add an `f64` dataset with `width` components per row.
    pub fn dataset_f64(&mut self, name: &str, width: usize, values: &[f64]) -> &mut Self {
        debug_assert!(width > 0 && values.len() % width == 0);
        let mut buf = BytesMut::with_capacity(values.len() * 8);
        for &v in values {
            buf.put_f64_le(v);
        }
        self.push(PendingEntry {
            name: name.to_string(),
            dtype: Dtype::F64,
            role: EntryRole::Dataset,
            width,
            rows: values.len() / width,
            data: buf.freeze(),
        })
    }

    /// Serialize header, directory and data region.
    pub fn write<W: Write>(&self, mut writer: W) -> Result<(), MeshPartitionError> {
        let hdr = WireStoreHdr::new(self.kind, self.entries.len());
        writer.write_all(bytes_of(&hdr))?;

        let directory_len: usize = self
            .entries
            .iter()
            .map(|e| WireEntry::SIZE + e.name.len())
            .sum();
        let mut offset = (WireStoreHdr::SIZE + directory_len) as u64;
        for e in &self.entries {
            let record = WireEntry::new(e.name.len(), e.dtype, e.role, e.width, e.rows, offset);
            writer.write_all(bytes_of(&record))?;
            writer.write_all(e.name.as_bytes())?;
            offset += e.data.len() as u64;
        }
        for e in &self.entries {
            writer.write_all(&e.data)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Create (or truncate) `path` and write the store into it.
    pub fn write_to_path(&self, path: impl AsRef<Path>) -> Result<(), MeshPartitionError> {
        let file = File::create(path.as_ref())?;
        self.write(BufWriter::new(file))
    }
}

/// Directory entry of an opened store.
#[derive(Clone, Debug)]
pub struct EntryInfo {
    pub name: String,
    pub dtype: Dtype,
    pub role: EntryRole,
    pub width: usize,
    pub rows: usize,
    offset: u64,
}

impl EntryInfo {
    fn row_bytes(&self) -> usize {
        self.width * self.dtype.scalar_size()
    }

    fn expect_layout(&self, dtype: Dtype, width: usize) -> Result<(), MeshPartitionError> {
        if self.dtype != dtype || self.width != width {
            return Err(MeshPartitionError::DatasetLayout {
                name: self.name.clone(),
                expected: format!("{} x{width}", dtype.name()),
                found: format!("{} x{}", self.dtype.name(), self.width),
            });
        }
        Ok(())
    }
}

/// Random-access reader over a store file.
pub struct StoreReader<R> {
    inner: R,
    kind: StoreKind,
    entries: Vec<EntryInfo>,
    index: HashMap<String, usize>,
}

impl StoreReader<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, MeshPartitionError> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: Read + Seek> StoreReader<R> {
    /// Parse the header and directory; data is read lazily.
    pub fn from_reader(mut inner: R) -> Result<Self, MeshPartitionError> {
        let total_len = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(0))?;

        let mut hdr_buf = [0u8; WireStoreHdr::SIZE];
        inner
            .read_exact(&mut hdr_buf)
            .map_err(|_| malformed("file too short for store header"))?;
        let hdr: WireStoreHdr = pod_read_unaligned(&hdr_buf);
        if hdr.magic != STORE_MAGIC {
            return Err(malformed("bad magic bytes"));
        }
        if hdr.version() != STORE_VERSION {
            return Err(malformed(format!(
                "unsupported store version {} (expected {STORE_VERSION})",
                hdr.version()
            )));
        }
        let kind = StoreKind::from_code(hdr.kind())
            .ok_or_else(|| malformed(format!("unknown store kind {}", hdr.kind())))?;

        let n_entries = hdr.n_entries();
        let directory_budget = total_len.saturating_sub(WireStoreHdr::SIZE as u64);
        if n_entries as u64 > directory_budget / WireEntry::SIZE as u64 {
            return Err(malformed(format!(
                "directory of {n_entries} entries does not fit in {total_len} bytes"
            )));
        }
        let mut entries = Vec::with_capacity(n_entries);
        let mut index = HashMap::with_capacity(n_entries);
        for i in 0..n_entries {
            let mut rec_buf = [0u8; WireEntry::SIZE];
            inner
                .read_exact(&mut rec_buf)
                .map_err(|_| malformed(format!("truncated directory at entry {i}")))?;
            let rec: WireEntry = pod_read_unaligned(&rec_buf);
            if rec.name_len() as u64 > total_len {
                return Err(malformed(format!(
                    "entry {i} name length {} exceeds file size {total_len}",
                    rec.name_len()
                )));
            }
            let mut name_buf = vec![0u8; rec.name_len()];
            inner
                .read_exact(&mut name_buf)
                .map_err(|_| malformed(format!("truncated name of entry {i}")))?;
            let name = String::from_utf8(name_buf)
                .map_err(|_| malformed(format!("entry {i} name is not UTF-8")))?;
            let dtype = Dtype::from_code(rec.dtype())
                .ok_or_else(|| malformed(format!("entry `{name}` has unknown dtype {}", rec.dtype())))?;
            let role = EntryRole::from_code(rec.role())
                .ok_or_else(|| malformed(format!("entry `{name}` has unknown role {}", rec.role())))?;
            let info = EntryInfo {
                name,
                dtype,
                role,
                width: rec.width(),
                rows: rec.rows(),
                offset: rec.offset(),
            };
            let end = info
                .width
                .checked_mul(info.dtype.scalar_size())
                .and_then(|row| row.checked_mul(info.rows))
                .and_then(|len| u64::try_from(len).ok())
                .and_then(|len| info.offset.checked_add(len))
                .ok_or_else(|| {
                    malformed(format!("entry `{}` extent overflows", info.name))
                })?;
            if end > total_len {
                return Err(malformed(format!(
                    "entry `{}` extends past end of file ({end} > {total_len})",
                    info.name
                )));
            }
            index.insert(info.name.clone(), entries.len());
            entries.push(info);
        }

        Ok(Self {
            inner,
            kind,
            entries,
            index,
        })
    }

    pub fn kind(&self) -> StoreKind {
        self.kind
    }

    pub fn entries(&self) -> &[EntryInfo] {
        &self.entries
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    fn lookup(&self, name: &str, role: EntryRole) -> Option<&EntryInfo> {
        self.index
            .get(name)
            .map(|&i| &self.entries[i])
            .filter(|e| e.role == role)
    }

    /// Look up a dataset by name.
    pub fn dataset(&self, name: &str) -> Result<&EntryInfo, MeshPartitionError> {
        self.lookup(name, EntryRole::Dataset)
            .ok_or_else(|| MeshPartitionError::MissingDataset(name.to_string()))
    }

    /// Look up an attribute by name.
    pub fn attribute(&self, name: &str) -> Result<&EntryInfo, MeshPartitionError> {
        self.lookup(name, EntryRole::Attribute)
            .ok_or_else(|| MeshPartitionError::MissingAttribute(name.to_string()))
    }

    /// Names of all datasets starting with `prefix`, in directory order.
    pub fn dataset_names_with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.role == EntryRole::Dataset && e.name.starts_with(prefix))
            .map(|e| e.name.as_str())
    }

    fn read_rows(
        &mut self,
        entry: &EntryInfo,
        row_offset: usize,
        row_count: usize,
    ) -> Result<Bytes, MeshPartitionError> {
        let end = row_offset.saturating_add(row_count);
        if end > entry.rows {
            return Err(MeshPartitionError::SelectionOutOfBounds {
                name: entry.name.clone(),
                offset: row_offset,
                end,
                len: entry.rows,
            });
        }
        let row_bytes = entry.row_bytes();
        let start = entry.offset + (row_offset * row_bytes) as u64;
        self.inner.seek(SeekFrom::Start(start))?;
        let mut buf = vec![0u8; row_count * row_bytes];
        self.inner.read_exact(&mut buf)?;
        Ok(Bytes::from(buf))
    }

    /// Read a whole `i32` dataset as a flat row-major vector.
    pub fn read_i32_dataset(
        &mut self,
        name: &str,
        width: usize,
    ) -> Result<Vec<i32>, MeshPartitionError> {
        let entry = self.dataset(name)?.clone();
        entry.expect_layout(Dtype::I32, width)?;
        let mut raw = self.read_rows(&entry, 0, entry.rows)?;
        let mut out = Vec::with_capacity(entry.rows * width);
        while raw.has_remaining() {
            out.push(raw.get_i32_le());
        }
        Ok(out)
    }

    pub fn read_i32_rows<const W: usize>(
        &mut self,
        name: &str,
    ) -> Result<Vec<[i32; W]>, MeshPartitionError> {
        let flat = self.read_i32_dataset(name, W)?;
        Ok(flat
            .chunks_exact(W)
            .map(|c| {
                let mut row = [0i32; W];
                row.copy_from_slice(c);
                row
            })
            .collect())
    }

    /// Read a whole `f64` dataset as a flat row-major vector.
    pub fn read_f64_dataset(
        &mut self,
        name: &str,
        width: usize,
    ) -> Result<Vec<f64>, MeshPartitionError> {
        let entry = self.dataset(name)?.clone();
        entry.expect_layout(Dtype::F64, width)?;
        let mut raw = self.read_rows(&entry, 0, entry.rows)?;
        let mut out = Vec::with_capacity(entry.rows * width);
        while raw.has_remaining() {
            out.push(raw.get_f64_le());
        }
        Ok(out)
    }

    pub fn read_f64_rows<const W: usize>(
        &mut self,
        name: &str,
    ) -> Result<Vec<[f64; W]>, MeshPartitionError> {
        let flat = self.read_f64_dataset(name, W)?;
        Ok(flat
            .chunks_exact(W)
            .map(|c| {
                let mut row = [0f64; W];
                row.copy_from_slice(c);
                row
            })
            .collect())
    }

    /// Hyperslab read of a scalar `f64` dataset: rows `offset..offset + out.len()`
    /// land in `out`.
    pub fn read_f64_hyperslab(
        &mut self,
        name: &str,
        offset: usize,
        out: &mut [f64],
    ) -> Result<(), MeshPartitionError> {
        let entry = self.dataset(name)?.clone();
        entry.expect_layout(Dtype::F64, 1)?;
        let mut raw = self.read_rows(&entry, offset, out.len())?;
        for slot in out.iter_mut() {
            *slot = raw.get_f64_le();
        }
        Ok(())
    }

    /// Single-element read of a scalar `f64` dataset.
    pub fn read_f64_element(&mut self, name: &str, index: usize) -> Result<f64, MeshPartitionError> {
        let mut value = [0f64; 1];
        self.read_f64_hyperslab(name, index, &mut value)?;
        Ok(value[0])
    }

    pub fn read_bool_attribute(&mut self, name: &str) -> Result<bool, MeshPartitionError> {
        let entry = self.attribute(name)?.clone();
        entry.expect_layout(Dtype::Bool, 1)?;
        let raw = self.read_rows(&entry, 0, 1)?;
        Ok(raw[0] != 0)
    }

    /// Read a fixed-width string attribute, trimming the NUL padding.
    pub fn read_str_attribute(&mut self, name: &str) -> Result<String, MeshPartitionError> {
        let entry = self.attribute(name)?.clone();
        if entry.dtype != Dtype::FixedStr {
            return Err(MeshPartitionError::DatasetLayout {
                name: entry.name.clone(),
                expected: Dtype::FixedStr.name().to_string(),
                found: entry.dtype.name().to_string(),
            });
        }
        let raw = self.read_rows(&entry, 0, 1)?;
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        String::from_utf8(raw[..end].to_vec())
            .map_err(|_| malformed(format!("attribute `{name}` is not UTF-8")))
    }
}
