//! Global triangular mesh stored as an index arena.
//!
//! Faces and vertices live in flat vectors and refer to each other by index.
//! A face's global id is its position in the face arena, and each of its three
//! neighbour slots is either `None` (a true mesh edge) or the index of the
//! adjacent face. Neighbour slot `j` is the face across the edge opposite
//! vertex `j`.
//!
//! The mesh is immutable once built; partitioning reads it and never tags it.

use crate::geometry::metric::DistanceMetric;
use crate::mesh_error::MeshPartitionError;
use hashbrown::HashMap;

/// Mesh vertex.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Vertex {
    /// Stable global vertex id (its arena index).
    pub id: usize,
    pub point: [f64; 3],
}

/// Triangular face.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Face {
    /// Stable global face id (its arena index).
    pub id: usize,
    pub vertices: [usize; 3],
    pub neighbors: [Option<usize>; 3],
}

impl Face {
    /// True if at least one edge of the face lies on the mesh boundary.
    #[inline]
    pub fn touches_mesh_boundary(&self) -> bool {
        self.neighbors.iter().any(Option::is_none)
    }
}

/// The unpartitioned mesh.
#[derive(Clone, Debug)]
pub struct GlobalMesh {
    vertices: Vec<Vertex>,
    faces: Vec<Face>,
    projection: String,
    is_geographic: bool,
    metric: DistanceMetric,
}

impl GlobalMesh {
    /// Build from raw store tables, validating every index.
    ///
    /// `elements` hold vertex indices, `neighbors` hold face indices with `-1`
    /// meaning "no neighbour".
    pub fn from_raw(
        points: Vec<[f64; 3]>,
        elements: &[[i32; 3]],
        neighbors: &[[i32; 3]],
        projection: String,
        is_geographic: bool,
    ) -> Result<Self, MeshPartitionError> {
        let n_faces = elements.len();
        ensure_addressable("faces", n_faces)?;
        ensure_addressable("vertices", points.len())?;
        if neighbors.len() != n_faces {
            return Err(MeshPartitionError::NeighborCountMismatch {
                expected: n_faces,
                found: neighbors.len(),
            });
        }
        let n_vertices = points.len();

        let mut faces = Vec::with_capacity(n_faces);
        for (i, (elem, neigh)) in elements.iter().zip(neighbors).enumerate() {
            let mut vertices = [0usize; 3];
            for (slot, &v) in vertices.iter_mut().zip(elem) {
                if v < 0 || v as usize >= n_vertices {
                    return Err(MeshPartitionError::VertexOutOfBounds {
                        face: i,
                        vertex: v as i64,
                        n_vertices,
                    });
                }
                *slot = v as usize;
            }
            let mut adjacent = [None; 3];
            for (slot, &n) in adjacent.iter_mut().zip(neigh) {
                *slot = match n {
                    -1 => None,
                    n if n >= 0 && (n as usize) < n_faces => Some(n as usize),
                    n => {
                        return Err(MeshPartitionError::NeighborOutOfBounds {
                            face: i,
                            neighbor: n as i64,
                            n_faces,
                        });
                    }
                };
            }
            faces.push(Face {
                id: i,
                vertices,
                neighbors: adjacent,
            });
        }

        let vertices = points
            .into_iter()
            .enumerate()
            .map(|(id, point)| Vertex { id, point })
            .collect();

        log::debug!("Created a mesh with {n_faces} triangles and {n_vertices} vertices");

        Ok(Self {
            vertices,
            faces,
            projection,
            is_geographic,
            metric: DistanceMetric::for_mesh(is_geographic),
        })
    }

    /// Build from vertex coordinates and triangles, deriving the neighbour
    /// slots from shared edges.
    pub fn from_triangles(
        points: Vec<[f64; 3]>,
        triangles: &[[usize; 3]],
        projection: impl Into<String>,
        is_geographic: bool,
    ) -> Result<Self, MeshPartitionError> {
        ensure_addressable("faces", triangles.len())?;
        ensure_addressable("vertices", points.len())?;
        let mut elements: Vec<[i32; 3]> = Vec::with_capacity(triangles.len());
        for (face, t) in triangles.iter().enumerate() {
            let mut elem = [0i32; 3];
            for (slot, &v) in elem.iter_mut().zip(t) {
                *slot = i32::try_from(v)
                    .ok()
                    .filter(|&v| (v as usize) < points.len())
                    .ok_or(MeshPartitionError::VertexOutOfBounds {
                        face,
                        vertex: i64::try_from(v).unwrap_or(i64::MAX),
                        n_vertices: points.len(),
                    })?;
            }
            elements.push(elem);
        }
        // face ids fit: the face count was checked above
        let neighbors: Vec<[i32; 3]> = edge_neighbors(triangles)
            .into_iter()
            .map(|slots| slots.map(|n| n.map_or(-1, |f| f as i32)))
            .collect();
        Self::from_raw(points, &elements, &neighbors, projection.into(), is_geographic)
    }

    #[inline]
    pub fn n_faces(&self) -> usize {
        self.faces.len()
    }

    #[inline]
    pub fn n_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    #[inline]
    pub fn face(&self, id: usize) -> &Face {
        &self.faces[id]
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[inline]
    pub fn vertex(&self, id: usize) -> &Vertex {
        &self.vertices[id]
    }

    pub fn projection(&self) -> &str {
        &self.projection
    }

    pub fn is_geographic(&self) -> bool {
        self.is_geographic
    }

    /// Distance metric selected from the geographic flag at load time.
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Planar reference point of a face: the mean of its vertices' (x, y).
    pub fn centroid(&self, id: usize) -> [f64; 2] {
        let f = &self.faces[id];
        let mut c = [0.0; 2];
        for &v in &f.vertices {
            let p = self.vertices[v].point;
            c[0] += p[0];
            c[1] += p[1];
        }
        [c[0] / 3.0, c[1] / 3.0]
    }
}

/// Derive neighbour slots for a triangle soup from shared edges.
///
/// Slot `j` of triangle `t` receives the other triangle sharing the edge
/// opposite vertex `j`, or `None` if the edge is on the boundary.
pub fn edge_neighbors(triangles: &[[usize; 3]]) -> Vec<[Option<usize>; 3]> {
    // undirected edge -> (first triangle, its slot)
    let mut first_seen: HashMap<(usize, usize), (usize, usize)> =
        HashMap::with_capacity(triangles.len() * 2);
    let mut out = vec![[None; 3]; triangles.len()];
    for (t, tri) in triangles.iter().enumerate() {
        for j in 0..3 {
            let a = tri[(j + 1) % 3];
            let b = tri[(j + 2) % 3];
            let key = if a < b { (a, b) } else { (b, a) };
            match first_seen.get(&key) {
                Some(&(other, other_slot)) => {
                    out[t][j] = Some(other);
                    out[other][other_slot] = Some(t);
                }
                None => {
                    first_seen.insert(key, (t, j));
                }
            }
        }
    }
    out
}

/// Largest face or vertex count whose ids fit the `i32` on-disk tables.
pub const MAX_MESH_ENTITIES: usize = i32::MAX as usize;

pub(crate) fn ensure_addressable(what: &'static str, count: usize) -> Result<(), MeshPartitionError> {
    if count > MAX_MESH_ENTITIES {
        return Err(MeshPartitionError::MeshTooLarge {
            what,
            count,
            max: MAX_MESH_ENTITIES,
        });
    }
    Ok(())
}
