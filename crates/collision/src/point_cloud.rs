use spheretree_math::{Sphere, Vec3};

use crate::{
    hierarchy::{Hierarchy, HullSource, Settings},
    miniball,
};

pub type PointCloudBsh<'a, N> = Hierarchy<PointCloud<'a, N>>;

/// Individual points as hierarchy entities, borrowed from the simulation that owns them.
#[derive(Debug, Copy, Clone)]
pub struct PointCloud<'a, N> {
    vertices: &'a [Vec3<N>],
}

impl<'a, N> Default for PointCloud<'a, N> {
    fn default() -> Self {
        Self { vertices: &[] }
    }
}

impl<'a, N> PointCloud<'a, N> {
    pub fn new(vertices: &'a [Vec3<N>]) -> Self {
        Self { vertices }
    }

    pub fn vertices(&self) -> &'a [Vec3<N>] {
        self.vertices
    }
}

impl<'a, N: num::Float> HullSource for PointCloud<'a, N> {
    type Scalar = N;

    fn entity_count(&self) -> usize {
        self.vertices.len()
    }

    fn entity_position(&self, entity: u32) -> Vec3<N> {
        self.vertices[entity as usize]
    }

    /// The minimal enclosing sphere of the points.
    fn compute_hull(&self, entities: &[u32]) -> Sphere<N> {
        debug_assert!(!entities.is_empty(), "hull of an empty point set");
        let ball = miniball::min_ball(entities.len(), |i| {
            self.vertices[entities[i] as usize].into_array()
        });
        Sphere::new(Vec3::from(ball.center), ball.radius())
    }

    /// A sphere around the mean of the points, with the radius set to the distance of the farthest
    /// point.
    fn compute_hull_approx(&self, entities: &[u32]) -> Sphere<N> {
        debug_assert!(!entities.is_empty(), "hull of an empty point set");
        let points = entities.iter().map(|&e| self.vertices[e as usize]);

        let center = Vec3::mean(points.clone()).unwrap_or_else(Vec3::zero);
        let radius_squared = points.fold(N::zero(), |r, p| r.max(center.distance_squared(p)));

        Sphere::new(center, radius_squared.sqrt())
    }

    fn default_settings(&self) -> Settings {
        Settings {
            max_primitives_per_leaf: 10,
        }
    }
}

impl<'a, N: num::Float> PointCloudBsh<'a, N> {
    pub fn new(vertices: &'a [Vec3<N>]) -> Self {
        Self::from_source(PointCloud::new(vertices))
    }

    /// Bind a new vertex array, discarding the tree and resetting the permutation list.
    ///
    /// Call `construct` afterwards to rebuild.
    pub fn init(&mut self, vertices: &'a [Vec3<N>]) {
        self.rebind(PointCloud::new(vertices));
    }

    pub fn vertices(&self) -> &'a [Vec3<N>] {
        self.source().vertices()
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng, rngs::StdRng};

    use super::*;
    use crate::hierarchy::ROOT;

    fn random_points(rng: &mut impl Rng, n: usize) -> Vec<Vec3<f64>> {
        (0..n)
            .map(|_| Vec3::from_fn(|_| rng.random_range(-5.0..5.0)))
            .collect()
    }

    #[test]
    fn test_point_cloud_hulls() {
        let mut rng = StdRng::seed_from_u64(11);
        for n in [1, 2, 3, 5, 17, 64] {
            let points = random_points(&mut rng, n);
            let cloud = PointCloud::new(&points);
            let entities: Vec<u32> = (0..n as u32).collect();

            let exact = cloud.compute_hull(&entities);
            let approx = cloud.compute_hull_approx(&entities);

            for &p in &points {
                assert!(exact.center.distance(p) <= exact.radius + 1e-9);
                assert!(approx.center.distance(p) <= approx.radius + 1e-9);
            }
            assert!(exact.radius <= approx.radius + 1e-9);
        }
    }

    #[test]
    fn test_point_cloud_approx_hull() {
        let points = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(4.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 0.0),
        ];
        let cloud = PointCloud::new(&points);

        let approx = cloud.compute_hull_approx(&[0, 1, 2, 3]);
        assert_eq!(approx.center, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(approx.radius, 3.0);

        let exact = cloud.compute_hull(&[0, 1, 2, 3]);
        assert_eq!(exact.center, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(exact.radius, 2.0);

        assert_eq!(cloud.compute_hull_approx(&[1]), Sphere::point(points[1]));
    }

    #[test]
    fn test_point_cloud_offset_cluster() {
        let mut rng = StdRng::seed_from_u64(13);
        let points: Vec<Vec3<f32>> = (0..40)
            .map(|_| Vec3::from_fn(|_| 100.0 + rng.random_range(0.0..0.1)))
            .collect();
        let cloud = PointCloud::new(&points);
        let entities: Vec<u32> = (0..points.len() as u32).collect();

        let exact = cloud.compute_hull(&entities);
        assert!(exact.radius > 0.01);
        for &p in &points {
            assert!(exact.center.distance(p) <= exact.radius);
        }
        assert!(exact.radius <= cloud.compute_hull_approx(&entities).radius + 1e-4);
    }

    #[test]
    fn test_point_cloud_bsh() {
        let mut rng = StdRng::seed_from_u64(12);
        let points = random_points(&mut rng, 100);

        let mut bsh = PointCloudBsh::new(&points);
        assert_eq!(bsh.settings().max_primitives_per_leaf, 10);
        bsh.construct();

        let mut seen = vec![false; points.len()];
        for (i, node) in bsh.nodes().iter().enumerate() {
            if node.is_leaf() {
                assert!(node.count >= 1 && node.count <= 10);
                for &e in bsh.entities(i) {
                    assert!(!seen[e as usize]);
                    seen[e as usize] = true;
                    let hull = bsh.hull(i);
                    assert!(hull.center.distance(points[e as usize]) <= hull.radius + 1e-9);
                }
            }
        }
        assert!(seen.into_iter().all(|s| s));
        assert_eq!(bsh.entities(ROOT).len(), 100);

        let others = random_points(&mut rng, 7);
        bsh.init(&others);
        assert!(bsh.is_empty());
        assert_eq!(bsh.lst().len(), 7);
        assert_eq!(bsh.vertices().len(), 7);
        bsh.construct();
        assert!(bsh.node(ROOT).is_leaf());
        assert_eq!(bsh.hull(ROOT), &bsh.compute_hull(0, 7));
    }
}
