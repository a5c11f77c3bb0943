use std::{f64::consts::PI, fs::File, io::BufReader, path::Path};

use anyhow::{Context as _, Error, ensure};
use rand::{Rng as _, SeedableRng as _, rngs::StdRng};
use serde::Deserialize;
use serde_json as json;
use spheretree_collision::Settings;
use spheretree_math::Vec3;

/// Parameters of a generated test scene, loadable from JSON. Missing fields take their default
/// value.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub seed: u64,
    /// Number of particles, in the rod for self collision or in the random cloud otherwise.
    pub points: usize,
    pub helix_radius: f64,
    pub helix_height: f64,
    pub helix_total_angle: f64,
    /// Half the side length of the cube the random cloud is spread over, centered at the origin.
    pub cloud_extent: f64,
    /// The tetrahedral box has `grid_cells` cubes per side, each split into 5 tetrahedra.
    pub grid_cells: u32,
    pub cell_size: f64,
    pub tolerance: f64,
    pub point_hierarchy: Settings,
    pub tet_hierarchy: Settings,
    /// Refit the hierarchies with approximate hulls after constructing them.
    pub refit: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            points: 50,
            helix_radius: 0.5,
            helix_height: 5.0,
            helix_total_angle: 10.0 * PI,
            cloud_extent: 1.0,
            grid_cells: 4,
            cell_size: 0.5,
            tolerance: 0.01,
            point_hierarchy: Settings {
                max_primitives_per_leaf: 10,
            },
            tet_hierarchy: Settings {
                max_primitives_per_leaf: 1,
            },
            refit: false,
        }
    }
}

/// Larger grids would overflow `u32` vertex indices.
pub const MAX_GRID_CELLS: u32 = 1024;

impl SceneConfig {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let file = File::open(path).with_context(|| format!("cannot open {path:?}"))?;
        let config: Self = json::from_reader(BufReader::new(file))
            .with_context(|| format!("invalid scene configuration {path:?}"))?;
        config
            .validate()
            .with_context(|| format!("invalid scene configuration {path:?}"))?;
        Ok(config)
    }

    /// Check that the scene generators can work with these values.
    pub fn validate(&self) -> Result<(), Error> {
        ensure!(
            self.tolerance.is_finite() && self.tolerance >= 0.0,
            "tolerance must be finite and non-negative, got {}",
            self.tolerance
        );
        ensure!(
            self.cloud_extent.is_finite() && self.cloud_extent >= 0.0,
            "cloud_extent must be finite and non-negative, got {}",
            self.cloud_extent
        );
        ensure!(
            self.cell_size.is_finite() && self.cell_size > 0.0,
            "cell_size must be finite and positive, got {}",
            self.cell_size
        );
        ensure!(
            self.grid_cells <= MAX_GRID_CELLS,
            "grid_cells must be at most {MAX_GRID_CELLS}, got {}",
            self.grid_cells
        );
        ensure!(
            [self.helix_radius, self.helix_height, self.helix_total_angle]
                .iter()
                .all(|v| v.is_finite()),
            "helix parameters must be finite"
        );
        Ok(())
    }
}

/// Particles along a helix around the z axis, the way rods are laid out in the rod simulation.
pub fn helix(config: &SceneConfig) -> Vec<Vec3<f64>> {
    let n = config.points as f64;
    (0..config.points)
        .map(|i| {
            let t = i as f64 / n;
            let angle = config.helix_total_angle * t;
            Vec3::new(
                config.helix_radius * angle.cos(),
                config.helix_radius * angle.sin(),
                config.helix_height * t,
            )
        })
        .collect()
}

pub fn random_cloud(config: &SceneConfig) -> Vec<Vec3<f64>> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let extent = config.cloud_extent;
    (0..config.points)
        .map(|_| Vec3::from_fn(|_| rng.random_range(-extent..=extent)))
        .collect()
}

// Each cube of the grid is split into a central tetrahedron touching 4 of the cube's corners,
// and one tetrahedron for each of the other 4 corners. Corners are numbered with bit 0 as x,
// bit 1 as y and bit 2 as z.
const CUBE_TETS: [[usize; 4]; 5] = [
    [0, 1, 2, 4],
    [3, 1, 2, 7],
    [5, 1, 4, 7],
    [6, 2, 4, 7],
    [1, 2, 4, 7],
];

/// A tetrahedralized box centered at the origin, returning vertices and 4 indices per
/// tetrahedron.
pub fn tet_box(config: &SceneConfig) -> (Vec<Vec3<f64>>, Vec<u32>) {
    let n = config.grid_cells;
    let side = n + 1;
    let origin = Vec3::splat(-0.5 * config.cell_size * f64::from(n));

    let mut vertices = Vec::with_capacity((side * side * side) as usize);
    for k in 0..side {
        for j in 0..side {
            for i in 0..side {
                let offset = Vec3::new(f64::from(i), f64::from(j), f64::from(k));
                vertices.push(origin + offset * config.cell_size);
            }
        }
    }

    let vertex = |i: u32, j: u32, k: u32| i + side * (j + side * k);
    let mut indices = Vec::with_capacity((n * n * n) as usize * CUBE_TETS.len() * 4);
    for k in 0..n {
        for j in 0..n {
            for i in 0..n {
                let corners: [u32; 8] = std::array::from_fn(|c| {
                    let c = c as u32;
                    vertex(i + (c & 1), j + (c >> 1 & 1), k + (c >> 2 & 1))
                });
                for tet in CUBE_TETS {
                    indices.extend(tet.map(|c| corners[c]));
                }
            }
        }
    }

    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use spheretree_collision::tet_mesh;

    use super::*;

    #[test]
    fn test_tet_box() {
        let config = SceneConfig {
            grid_cells: 2,
            cell_size: 1.0,
            ..SceneConfig::default()
        };
        let (vertices, indices) = tet_box(&config);
        assert_eq!(vertices.len(), 27);
        assert_eq!(indices.len(), 8 * 5 * 4);
        assert_eq!(tet_mesh::validate(vertices.len(), &indices), Ok(()));
        assert_eq!(vertices[0], Vec3::splat(-1.0));
        assert_eq!(vertices[26], Vec3::splat(1.0));

        // The 5 tetrahedra of a unit cube fill its volume.
        let volume: f64 = indices
            .chunks_exact(4)
            .map(|t| {
                let [a, b, c, d] = [0, 1, 2, 3].map(|i| vertices[t[i] as usize]);
                (b - a).dot((c - a).cross(d - a)).abs() / 6.0
            })
            .sum();
        assert!((volume - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_helix_and_cloud() {
        let config = SceneConfig::default();
        let rod = helix(&config);
        assert_eq!(rod.len(), 50);
        assert_eq!(rod[0], Vec3::new(0.5, 0.0, 0.0));
        for p in &rod {
            assert!((p[0].hypot(p[1]) - 0.5).abs() < 1e-12);
        }

        let cloud = random_cloud(&config);
        assert_eq!(cloud.len(), 50);
        assert!(cloud.iter().flatten().all(|v| v.abs() <= 1.0));
        assert_eq!(cloud, random_cloud(&config));
    }

    #[test]
    fn test_config_defaults() {
        let config: SceneConfig = json::from_str(
            r#"{ "points": 7, "point_hierarchy": { "max_primitives_per_leaf": 2 } }"#,
        )
        .unwrap();
        assert_eq!(config.points, 7);
        assert_eq!(config.point_hierarchy.max_primitives_per_leaf, 2);
        assert_eq!(config.tet_hierarchy.max_primitives_per_leaf, 1);
        assert_eq!(config.grid_cells, 4);
        assert!(config.validate().is_ok());
    }
}
