use spheretree_math::{Sphere, Vec3, cast};
use thiserror::Error;

use crate::hierarchy::{Hierarchy, HullSource};

pub type TetMeshBsh<'a, N> = Hierarchy<TetMesh<'a, N>>;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Error)]
pub enum MeshError {
    #[error("tetrahedron index list has length {len}, which is not a multiple of 4")]
    IncompleteTetrahedron { len: usize },
    #[error("tetrahedron {tet} references vertex {index}, but there are only {vertex_count} vertices")]
    VertexOutOfRange {
        tet: usize,
        index: u32,
        vertex_count: usize,
    },
}

/// Check that `indices` describes whole tetrahedra over `vertex_count` vertices.
pub fn validate(vertex_count: usize, indices: &[u32]) -> Result<(), MeshError> {
    if indices.len() % 4 != 0 {
        return Err(MeshError::IncompleteTetrahedron { len: indices.len() });
    }

    for (tet, tet_indices) in indices.chunks_exact(4).enumerate() {
        for &index in tet_indices {
            if index as usize >= vertex_count {
                return Err(MeshError::VertexOutOfRange {
                    tet,
                    index,
                    vertex_count,
                });
            }
        }
    }

    Ok(())
}

/// The tetrahedra of a volumetric mesh as hierarchy entities.
///
/// Each tetrahedron is represented by its centroid, which is computed once when the mesh is bound.
/// Centroids are *not* updated when the vertices move, they are only as fresh as the last call to
/// `TetMeshBsh::init`. Hulls are computed from the current vertex positions, and are inflated by
/// `tolerance` so that near misses are still reported as candidates.
#[derive(Debug, Clone)]
pub struct TetMesh<'a, N> {
    vertices: &'a [Vec3<N>],
    indices: &'a [u32],
    com: Vec<Vec3<N>>,
    tolerance: N,
}

impl<'a, N: num::Float> Default for TetMesh<'a, N> {
    fn default() -> Self {
        Self {
            vertices: &[],
            indices: &[],
            com: Vec::new(),
            tolerance: N::zero(),
        }
    }
}

impl<'a, N: num::Float> TetMesh<'a, N> {
    /// Bind the mesh and compute tetrahedron centroids.
    ///
    /// `indices` holds 4 vertex indices per tetrahedron. Malformed meshes panic in debug builds,
    /// use [`validate`] to check untrusted input.
    pub fn new(vertices: &'a [Vec3<N>], indices: &'a [u32], tolerance: N) -> Self {
        if cfg!(debug_assertions) {
            if let Err(err) = validate(vertices.len(), indices) {
                panic!("invalid tetrahedral mesh: {err}");
            }
        }
        debug_assert!(
            tolerance.is_finite() && tolerance >= N::zero(),
            "tetrahedral mesh tolerance must be finite and non-negative"
        );

        let quarter: N = cast::cast(0.25);
        let com = indices
            .chunks_exact(4)
            .map(|tet| {
                tet.iter()
                    .fold(Vec3::zero(), |sum, &i| sum + vertices[i as usize])
                    * quarter
            })
            .collect();

        Self {
            vertices,
            indices,
            com,
            tolerance,
        }
    }

    pub fn vertices(&self) -> &'a [Vec3<N>] {
        self.vertices
    }

    pub fn indices(&self) -> &'a [u32] {
        self.indices
    }

    pub fn tolerance(&self) -> N {
        self.tolerance
    }

    pub fn tet_count(&self) -> usize {
        self.com.len()
    }

    /// The centroid of every tetrahedron as of when the mesh was bound.
    pub fn centroids(&self) -> &[Vec3<N>] {
        &self.com
    }

    pub fn tet(&self, tet: u32) -> [u32; 4] {
        let i = tet as usize * 4;
        [
            self.indices[i],
            self.indices[i + 1],
            self.indices[i + 2],
            self.indices[i + 3],
        ]
    }

    pub fn tet_vertices(&self, tet: u32) -> [Vec3<N>; 4] {
        self.tet(tet).map(|i| self.vertices[i as usize])
    }
}

impl<'a, N: num::Float> HullSource for TetMesh<'a, N> {
    type Scalar = N;

    fn entity_count(&self) -> usize {
        self.com.len()
    }

    fn entity_position(&self, entity: u32) -> Vec3<N> {
        self.com[entity as usize]
    }

    /// Tetrahedron hulls are always approximate, the tolerance margin makes up for it.
    fn compute_hull(&self, entities: &[u32]) -> Sphere<N> {
        self.compute_hull_approx(entities)
    }

    /// A sphere around the mean of all vertices of all given tetrahedra, reaching the farthest
    /// vertex plus `tolerance`.
    fn compute_hull_approx(&self, entities: &[u32]) -> Sphere<N> {
        debug_assert!(!entities.is_empty(), "hull of an empty tetrahedron set");

        let vertices = entities.iter().flat_map(|&tet| self.tet_vertices(tet));
        let center = Vec3::mean(vertices.clone()).unwrap_or_else(Vec3::zero);

        let radius_squared = vertices.fold(N::zero(), |r, p| r.max(center.distance_squared(p)));

        Sphere::new(center, radius_squared.sqrt()).inflate(self.tolerance)
    }
}

impl<'a, N: num::Float> TetMeshBsh<'a, N> {
    pub fn new(vertices: &'a [Vec3<N>], indices: &'a [u32], tolerance: N) -> Self {
        Self::from_source(TetMesh::new(vertices, indices, tolerance))
    }

    /// Bind a new mesh, recomputing centroids and discarding the tree.
    ///
    /// Call `construct` afterwards to rebuild.
    pub fn init(&mut self, vertices: &'a [Vec3<N>], indices: &'a [u32], tolerance: N) {
        self.rebind(TetMesh::new(vertices, indices, tolerance));
    }

    pub fn tolerance(&self) -> N {
        self.source().tolerance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::ROOT;

    fn unit_tet() -> [Vec3<f64>; 4] {
        [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(4.0, 0.0, 0.0),
            Vec3::new(0.0, 4.0, 0.0),
            Vec3::new(0.0, 0.0, 4.0),
        ]
    }

    #[test]
    fn test_validate() {
        assert_eq!(validate(4, &[0, 1, 2, 3]), Ok(()));
        assert_eq!(validate(0, &[]), Ok(()));
        assert_eq!(
            validate(4, &[0, 1, 2]),
            Err(MeshError::IncompleteTetrahedron { len: 3 })
        );
        assert_eq!(
            validate(5, &[0, 1, 2, 3, 1, 2, 3, 5]),
            Err(MeshError::VertexOutOfRange {
                tet: 1,
                index: 5,
                vertex_count: 5
            })
        );
        assert_eq!(
            MeshError::IncompleteTetrahedron { len: 3 }.to_string(),
            "tetrahedron index list has length 3, which is not a multiple of 4"
        );
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "invalid tetrahedral mesh")]
    fn test_malformed_mesh_panics() {
        let vertices = unit_tet();
        TetMesh::new(&vertices, &[0, 1, 2, 4], 0.0);
    }

    #[test]
    fn test_tet_mesh_centroids_and_hull() {
        let vertices = unit_tet();
        let indices = [0, 1, 2, 3, 3, 2, 1, 0];
        let mesh = TetMesh::new(&vertices, &indices, 0.5);

        assert_eq!(mesh.tet_count(), 2);
        assert_eq!(mesh.centroids(), [Vec3::splat(1.0); 2]);
        assert_eq!(mesh.tet(1), [3, 2, 1, 0]);
        assert_eq!(mesh.entity_position(0), Vec3::splat(1.0));

        let hull = mesh.compute_hull_approx(&[0]);
        assert_eq!(hull.center, Vec3::splat(1.0));
        assert_eq!(hull.radius, 11.0_f64.sqrt() + 0.5);
        assert_eq!(mesh.compute_hull(&[0, 1]), mesh.compute_hull_approx(&[0, 1]));
        for p in vertices {
            assert!(hull.center.distance(p) <= hull.radius - 0.5 + 1e-12);
        }
    }

    #[test]
    fn test_tet_mesh_hull_f32() {
        let vertices = unit_tet().map(|p| Vec3::new(p[0] as f32, p[1] as f32, p[2] as f32));
        let indices = [0, 1, 2, 3, 3, 2, 1, 0];
        let mut bsh = TetMeshBsh::new(&vertices, &indices, 0.5_f32);
        bsh.construct();

        let hull = bsh.hull(ROOT);
        assert_eq!(hull.center, Vec3::splat(1.0));
        assert!((hull.radius - (11.0_f32.sqrt() + 0.5)).abs() < 1e-5);
        bsh.update();
        assert_eq!(bsh.hull(ROOT).center, Vec3::splat(1.0));
    }

    #[test]
    fn test_tet_mesh_bsh_init() {
        let vertices = unit_tet();
        let moved = unit_tet().map(|p| p + Vec3::new(10.0, 0.0, 0.0));
        let indices = [0, 1, 2, 3];

        let mut bsh = TetMeshBsh::new(&vertices, &indices, 0.0);
        assert_eq!(bsh.settings().max_primitives_per_leaf, 1);
        bsh.construct();
        assert_eq!(bsh.hull(ROOT).center, Vec3::splat(1.0));

        bsh.init(&moved, &indices, 0.25);
        assert!(bsh.is_empty());
        assert_eq!(bsh.tolerance(), 0.25);
        assert_eq!(bsh.source().centroids(), [Vec3::new(11.0, 1.0, 1.0)]);
        bsh.construct();
        assert_eq!(bsh.hull(ROOT).center, Vec3::new(11.0, 1.0, 1.0));
        assert_eq!(bsh.hull(ROOT).radius, 11.0_f64.sqrt() + 0.25);
    }
}
