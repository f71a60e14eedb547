//! Distribution of parameter fields to partitions.
//!
//! Every field is read per rank as one hyperslab over the owned global-id
//! range followed, in distributed mode, by one single-value read per ghost.
//! The per-ghost reads go through the store cursor one at a time.

use crate::io::param_store::{ParameterReader, ParameterSet};
use crate::mesh_error::MeshPartitionError;
use crate::partitioning::{DuplicatePolicy, PartitionMode};
use std::collections::BTreeMap;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Open parameter stores and the field-name registry across them.
pub struct ParameterSources {
    readers: Vec<ParameterReader>,
    /// Field name -> index of the reader serving it.
    registry: BTreeMap<String, usize>,
}

impl ParameterSources {
    /// Open every store in `paths` and register its fields.
    ///
    /// Each field must hold `n_faces` values. A name provided by more than
    /// one store is an error under [`DuplicatePolicy::Reject`]; under
    /// [`DuplicatePolicy::KeepLast`] the later store serves it.
    pub fn open(
        paths: &[PathBuf],
        policy: DuplicatePolicy,
        n_faces: usize,
    ) -> Result<Self, MeshPartitionError> {
        let mut readers = Vec::with_capacity(paths.len());
        let mut registry: BTreeMap<String, usize> = BTreeMap::new();

        for path in paths {
            let reader = ParameterReader::open(path)?;
            let idx = readers.len();
            for name in reader.field_names() {
                let len = reader.field_len(&name)?;
                if len != n_faces {
                    return Err(MeshPartitionError::ParameterLength {
                        name,
                        expected: n_faces,
                        found: len,
                    });
                }
                if let Some(&prev) = registry.get(&name) {
                    let first: &ParameterReader = &readers[prev];
                    match policy {
                        DuplicatePolicy::Reject => {
                            return Err(MeshPartitionError::DuplicateParameter {
                                name,
                                first: first.path().to_path_buf(),
                                second: path.clone(),
                            });
                        }
                        DuplicatePolicy::KeepLast => {
                            log::info!(
                                "Parameter {name} from {} replaces the one from {}",
                                path.display(),
                                first.path().display()
                            );
                        }
                    }
                } else {
                    log::info!("Inserted parameter {name} into the parameter set");
                }
                registry.insert(name, idx);
            }
            readers.push(reader);
        }

        Ok(Self { readers, registry })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.registry.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.registry.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Store serving `name`.
    pub fn source_of(&self, name: &str) -> Option<&Path> {
        self.registry.get(name).map(|&i| self.readers[i].path())
    }

    /// Load every field for one partition.
    ///
    /// Values are laid out as the owned range followed by `ghosts` in the
    /// given order; standalone mode loads the owned range only.
    pub fn load_for_partition(
        &mut self,
        owned: Range<usize>,
        ghosts: &[usize],
        mode: PartitionMode,
    ) -> Result<ParameterSet, MeshPartitionError> {
        let n_owned = owned.len();
        let n_ghosts = match mode {
            PartitionMode::Distributed => ghosts.len(),
            PartitionMode::Standalone => 0,
        };

        let mut params = ParameterSet::new();
        for (name, &idx) in &self.registry {
            let reader = &mut self.readers[idx];
            let mut values = vec![0.0; n_owned + n_ghosts];
            reader.read_range(name, owned.start, &mut values[..n_owned])?;
            for (slot, &g) in values[n_owned..].iter_mut().zip(ghosts) {
                *slot = reader.read_value(name, g)?;
            }
            params.insert(name.clone(), values);
        }
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::param_store::write_parameter_file;
    use tempfile::tempdir;

    fn store(dir: &Path, file: &str, fields: &[(&str, Vec<f64>)]) -> PathBuf {
        let path = dir.join(file);
        let mut params = ParameterSet::new();
        for (name, values) in fields {
            params.insert(*name, values.clone());
        }
        write_parameter_file(&path, &params).unwrap();
        path
    }

    #[test]
    fn owned_block_then_ghosts() {
        let dir = tempdir().unwrap();
        let values: Vec<f64> = (0..10).map(|i| i as f64 * 10.0).collect();
        let p = store(dir.path(), "a.mstore", &[("elevation", values)]);
        let mut sources = ParameterSources::open(&[p], DuplicatePolicy::Reject, 10).unwrap();

        let params = sources
            .load_for_partition(5..10, &[1, 4], PartitionMode::Distributed)
            .unwrap();
        assert_eq!(
            params.get("elevation").unwrap(),
            &[50.0, 60.0, 70.0, 80.0, 90.0, 10.0, 40.0]
        );

        let standalone = sources
            .load_for_partition(0..5, &[7], PartitionMode::Standalone)
            .unwrap();
        assert_eq!(standalone.get("elevation").unwrap().len(), 5);
    }

    #[test]
    fn duplicate_policy() {
        let dir = tempdir().unwrap();
        let a = store(dir.path(), "a.mstore", &[("slope", vec![1.0; 4])]);
        let b = store(dir.path(), "b.mstore", &[("slope", vec![2.0; 4]), ("aspect", vec![0.0; 4])]);
        let paths = [a, b.clone()];

        assert!(matches!(
            ParameterSources::open(&paths, DuplicatePolicy::Reject, 4),
            Err(MeshPartitionError::DuplicateParameter { .. })
        ));

        let mut sources = ParameterSources::open(&paths, DuplicatePolicy::KeepLast, 4).unwrap();
        assert_eq!(sources.source_of("slope"), Some(b.as_path()));
        let params = sources
            .load_for_partition(0..2, &[], PartitionMode::Distributed)
            .unwrap();
        assert_eq!(params.get("slope").unwrap(), &[2.0, 2.0]);
        assert_eq!(sources.len(), 2);
    }

    #[test]
    fn wrong_length_is_rejected() {
        let dir = tempdir().unwrap();
        let a = store(dir.path(), "a.mstore", &[("slope", vec![1.0; 3])]);
        assert!(matches!(
            ParameterSources::open(&[a], DuplicatePolicy::Reject, 4),
            Err(MeshPartitionError::ParameterLength { expected: 4, found: 3, .. })
        ));
    }
}
