pub mod hierarchy;
pub mod miniball;
pub mod point_cloud;
pub mod tet_mesh;
pub mod traversal;

pub use self::{
    hierarchy::{Hierarchy, HullSource, Node, NodeIndex, ROOT, Settings},
    point_cloud::{PointCloud, PointCloudBsh},
    tet_mesh::{MeshError, TetMesh, TetMeshBsh},
};
