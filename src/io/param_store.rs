//! ParameterStore: named per-face scalar fields.
//!
//! Each field is an `f64` dataset `parameters/<name>` with one value per face,
//! in the face order of the mesh store it accompanies.

use crate::io::store::StoreReader;
use crate::io::store::StoreWriter;
use crate::io::wire::StoreKind;
use crate::mesh_error::MeshPartitionError;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Group prefix of parameter datasets.
pub const PARAMETER_GROUP: &str = "parameters/";

/// Field holding per-face triangle areas, required for geographic meshes.
pub const TRIANGLE_AREA: &str = "area";

fn dataset_name(field: &str) -> String {
    format!("{PARAMETER_GROUP}{field}")
}

/// Named scalar fields sharing one face ordering.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParameterSet {
    fields: BTreeMap<String, Vec<f64>>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, returning the previous values under that name.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) -> Option<Vec<f64>> {
        self.fields.insert(name.into(), values)
    }

    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.fields.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Vec<f64>)> {
        self.fields.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Write every field of `params` into a parameter store.
pub fn write_parameter_file(
    path: impl AsRef<Path>,
    params: &ParameterSet,
) -> Result<(), MeshPartitionError> {
    let mut w = StoreWriter::new(StoreKind::Parameters);
    for (name, values) in params.iter() {
        w.dataset_f64(&dataset_name(name), 1, values);
    }
    w.write_to_path(path)
}

/// Read every field of a parameter store.
pub fn read_parameter_file(path: impl AsRef<Path>) -> Result<ParameterSet, MeshPartitionError> {
    let mut reader = ParameterReader::open(path)?;
    let mut params = ParameterSet::new();
    for name in reader.field_names() {
        let values = reader.read_field(&name)?;
        params.insert(name, values);
    }
    Ok(params)
}

/// Cursor-based reader over one parameter store.
///
/// Reads move the underlying file cursor, so a reader serves one read at a
/// time; interleaving fields on the same reader is fine, sharing it across
/// threads is not.
pub struct ParameterReader {
    path: PathBuf,
    store: StoreReader<BufReader<File>>,
}

impl ParameterReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, MeshPartitionError> {
        let path = path.as_ref().to_path_buf();
        let store = StoreReader::open(&path)?;
        if store.kind() != StoreKind::Parameters {
            return Err(MeshPartitionError::StoreFormat(format!(
                "{} is not a parameter store",
                path.display()
            )));
        }
        Ok(Self { path, store })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Field names in file order.
    pub fn field_names(&self) -> Vec<String> {
        self.store
            .dataset_names_with_prefix(PARAMETER_GROUP)
            .map(|n| n[PARAMETER_GROUP.len()..].to_string())
            .collect()
    }

    /// Number of values stored for `name`.
    pub fn field_len(&self, name: &str) -> Result<usize, MeshPartitionError> {
        Ok(self.store.dataset(&dataset_name(name))?.rows)
    }

    pub fn read_field(&mut self, name: &str) -> Result<Vec<f64>, MeshPartitionError> {
        self.store.read_f64_dataset(&dataset_name(name), 1)
    }

    /// Hyperslab read of values `offset..offset + out.len()`.
    pub fn read_range(
        &mut self,
        name: &str,
        offset: usize,
        out: &mut [f64],
    ) -> Result<(), MeshPartitionError> {
        self.store.read_f64_hyperslab(&dataset_name(name), offset, out)
    }

    /// Single value at `index`.
    pub fn read_value(&mut self, name: &str, index: usize) -> Result<f64, MeshPartitionError> {
        self.store.read_f64_element(&dataset_name(name), index)
    }
}
