//! Fixed, versioned, little-endian records of the store container.
//!
//! A store file is laid out as
//!
//! ```text
//! [WireStoreHdr][WireEntry name bytes]*[data region]
//! ```
//!
//! Every multi-byte integer is stored pre-LE with `.to_le()` and decoded with
//! `.from_le()`, so the records can be cast straight to and from bytes.

use bytemuck::{Pod, Zeroable};
use static_assertions::const_assert_eq;
use std::mem::size_of;

/// Magic bytes opening every store file.
pub const STORE_MAGIC: [u8; 8] = *b"HALOSTR\0";

/// Bump when the layout or semantics change in incompatible ways.
pub const STORE_VERSION: u16 = 1;

/// What a store file holds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StoreKind {
    Mesh,
    Parameters,
}

impl StoreKind {
    pub fn code(self) -> u16 {
        match self {
            StoreKind::Mesh => 1,
            StoreKind::Parameters => 2,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            1 => Some(StoreKind::Mesh),
            2 => Some(StoreKind::Parameters),
            _ => None,
        }
    }
}

/// Element type of an entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Dtype {
    I32,
    F64,
    Bool,
    /// NUL-padded string; the entry width is the byte width.
    FixedStr,
}

impl Dtype {
    pub fn code(self) -> u16 {
        match self {
            Dtype::I32 => 1,
            Dtype::F64 => 2,
            Dtype::Bool => 3,
            Dtype::FixedStr => 4,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            1 => Some(Dtype::I32),
            2 => Some(Dtype::F64),
            3 => Some(Dtype::Bool),
            4 => Some(Dtype::FixedStr),
            _ => None,
        }
    }

    /// Size in bytes of one scalar component.
    pub fn scalar_size(self) -> usize {
        match self {
            Dtype::I32 => 4,
            Dtype::F64 => 8,
            Dtype::Bool | Dtype::FixedStr => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Dtype::I32 => "i32",
            Dtype::F64 => "f64",
            Dtype::Bool => "bool",
            Dtype::FixedStr => "string",
        }
    }
}

/// Attributes are scalar metadata; datasets are row-indexed arrays.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EntryRole {
    Attribute,
    Dataset,
}

impl EntryRole {
    pub fn code(self) -> u16 {
        match self {
            EntryRole::Attribute => 1,
            EntryRole::Dataset => 2,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            1 => Some(EntryRole::Attribute),
            2 => Some(EntryRole::Dataset),
            _ => None,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct WireStoreHdr {
    pub magic: [u8; 8],
    pub version_le: u16,
    pub kind_le: u16,
    pub n_entries_le: u32,
}

impl WireStoreHdr {
    pub const SIZE: usize = 16;

    pub fn new(kind: StoreKind, n_entries: usize) -> Self {
        Self {
            magic: STORE_MAGIC,
            version_le: STORE_VERSION.to_le(),
            kind_le: kind.code().to_le(),
            n_entries_le: (n_entries as u32).to_le(),
        }
    }
    pub fn version(&self) -> u16 {
        u16::from_le(self.version_le)
    }
    pub fn kind(&self) -> u16 {
        u16::from_le(self.kind_le)
    }
    pub fn n_entries(&self) -> usize {
        u32::from_le(self.n_entries_le) as usize
    }
}

/// Directory record; the entry name (`name_len` bytes of UTF-8) follows it.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct WireEntry {
    pub name_len_le: u32,
    pub dtype_le: u16,
    pub role_le: u16,
    pub width_le: u32,
    pub _pad: u32,
    pub rows_le: u64,
    pub offset_le: u64,
}

impl WireEntry {
    pub const SIZE: usize = 32;

    pub fn new(
        name_len: usize,
        dtype: Dtype,
        role: EntryRole,
        width: usize,
        rows: usize,
        offset: u64,
    ) -> Self {
        Self {
            name_len_le: (name_len as u32).to_le(),
            dtype_le: dtype.code().to_le(),
            role_le: role.code().to_le(),
            width_le: (width as u32).to_le(),
            _pad: 0,
            rows_le: (rows as u64).to_le(),
            offset_le: offset.to_le(),
        }
    }
    pub fn name_len(&self) -> usize {
        u32::from_le(self.name_len_le) as usize
    }
    pub fn dtype(&self) -> u16 {
        u16::from_le(self.dtype_le)
    }
    pub fn role(&self) -> u16 {
        u16::from_le(self.role_le)
    }
    pub fn width(&self) -> usize {
        u32::from_le(self.width_le) as usize
    }
    pub fn rows(&self) -> usize {
        u64::from_le(self.rows_le) as usize
    }
    pub fn offset(&self) -> u64 {
        u64::from_le(self.offset_le)
    }
}

const_assert_eq!(size_of::<WireStoreHdr>(), WireStoreHdr::SIZE);
const_assert_eq!(size_of::<WireEntry>(), WireEntry::SIZE);

#[cfg(test)]
mod tests {
    use super::*;
    use bytemuck::{cast_slice, pod_read_unaligned};

    #[test]
    fn roundtrip_entry() {
        let e = WireEntry::new(12, Dtype::F64, EntryRole::Dataset, 3, 7, 4096);
        let bytes: Vec<u8> = cast_slice(&[e]).to_vec();
        let out: WireEntry = pod_read_unaligned(&bytes);
        assert_eq!(out.name_len(), 12);
        assert_eq!(Dtype::from_code(out.dtype()), Some(Dtype::F64));
        assert_eq!(EntryRole::from_code(out.role()), Some(EntryRole::Dataset));
        assert_eq!(out.width(), 3);
        assert_eq!(out.rows(), 7);
        assert_eq!(out.offset(), 4096);
    }

    #[test]
    fn version_guard() {
        let hdr = WireStoreHdr::new(StoreKind::Parameters, 2);
        assert_eq!(hdr.version(), STORE_VERSION);
        assert_eq!(StoreKind::from_code(hdr.kind()), Some(StoreKind::Parameters));
        assert_eq!(hdr.magic, STORE_MAGIC);
    }
}
