use std::time::{Duration, Instant};

use serde::Serialize;
use spheretree_collision::{
    Hierarchy, HullSource, MeshError, NodeIndex, PointCloudBsh, TetMeshBsh, tet_mesh, traversal,
};

use crate::scene::{self, SceneConfig};

#[derive(Debug, Clone, Serialize)]
pub struct TreeStats {
    pub entities: usize,
    pub nodes: usize,
    pub leaves: usize,
    pub depth: usize,
}

impl TreeStats {
    fn of<S: HullSource>(tree: &Hierarchy<S>) -> Self {
        Self {
            entities: tree.lst().len(),
            nodes: tree.nodes().len(),
            leaves: tree.leaf_count(),
            depth: tree.depth(),
        }
    }
}

/// The outcome of one broad phase pass over a generated scene.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub trees: Vec<TreeStats>,
    /// Leaf pairs reported by the traversal.
    pub leaf_pairs: usize,
    /// Entity pairs the narrow phase would have to test, summed over all reported leaf pairs.
    pub entity_pairs: usize,
    /// Entity pairs a brute force broad phase would have to test.
    pub brute_force_pairs: usize,
    pub build_time: Duration,
    pub traversal_time: Duration,
}

/// Self collision of a rod of particles.
pub fn self_collide(config: &SceneConfig) -> Report {
    let points = scene::helix(config);

    let start = Instant::now();
    let mut bsh = PointCloudBsh::new(&points);
    bsh.set_settings(config.point_hierarchy);
    build(&mut bsh, config.refit);
    let build_time = start.elapsed();

    let start = Instant::now();
    let pairs = traversal::collect_single(&bsh);
    let traversal_time = start.elapsed();
    log::debug!(
        "self collision of {} particles: built in {build_time:?}, traversed in {traversal_time:?}",
        points.len()
    );

    let n = points.len();
    Report {
        trees: vec![TreeStats::of(&bsh)],
        leaf_pairs: pairs.len(),
        entity_pairs: entity_pairs(&bsh, &bsh, &pairs),
        brute_force_pairs: n * n.saturating_sub(1) / 2,
        build_time,
        traversal_time,
    }
}

/// Collisions between a random particle cloud and a tetrahedralized box.
pub fn cross(config: &SceneConfig) -> Result<Report, MeshError> {
    let points = scene::random_cloud(config);
    let (vertices, indices) = scene::tet_box(config);
    tet_mesh::validate(vertices.len(), &indices)?;

    let start = Instant::now();
    let mut cloud = PointCloudBsh::new(&points);
    cloud.set_settings(config.point_hierarchy);
    build(&mut cloud, config.refit);
    let mut tets = TetMeshBsh::new(&vertices, &indices, config.tolerance);
    tets.set_settings(config.tet_hierarchy);
    build(&mut tets, config.refit);
    let build_time = start.elapsed();

    let start = Instant::now();
    let pairs = traversal::collect(&cloud, &tets);
    let traversal_time = start.elapsed();
    log::debug!(
        "{} particles against {} tetrahedra: built in {build_time:?}, traversed in \
         {traversal_time:?}",
        points.len(),
        tets.source().tet_count()
    );

    Ok(Report {
        trees: vec![TreeStats::of(&cloud), TreeStats::of(&tets)],
        leaf_pairs: pairs.len(),
        entity_pairs: entity_pairs(&cloud, &tets, &pairs),
        brute_force_pairs: points.len() * tets.source().tet_count(),
        build_time,
        traversal_time,
    })
}

fn build<S: HullSource>(tree: &mut Hierarchy<S>, refit: bool) {
    tree.construct();
    if refit {
        tree.update();
    }
}

fn entity_pairs<A: HullSource, B: HullSource>(
    a: &Hierarchy<A>,
    b: &Hierarchy<B>,
    pairs: &[(NodeIndex, NodeIndex)],
) -> usize {
    pairs
        .iter()
        .map(|&(n1, n2)| a.entities(n1).len() * b.entities(n2).len())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_collide_report() {
        let config = SceneConfig::default();
        let report = self_collide(&config);

        assert_eq!(report.trees[0].entities, 50);
        assert_eq!(report.trees[0].leaves, 8);
        assert_eq!(report.brute_force_pairs, 1225);
        assert!(report.leaf_pairs <= 8 * 7 / 2);
        assert!(report.entity_pairs <= report.brute_force_pairs);
    }

    #[test]
    fn test_cross_report() {
        let config = SceneConfig {
            points: 200,
            refit: true,
            ..SceneConfig::default()
        };
        let report = cross(&config).unwrap();

        assert_eq!(report.trees[1].entities, 4 * 4 * 4 * 5);
        assert_eq!(report.trees[1].leaves, 320);
        assert!(report.leaf_pairs > 0);
        assert!(report.entity_pairs < report.brute_force_pairs);
    }
}
