use std::{fs, process};

use spheretree_cli::{report, scene::SceneConfig};

#[test]
fn test_load_scene_config() {
    let path = std::env::temp_dir().join(format!("spheretree-scene-{}.json", process::id()));
    fs::write(
        &path,
        r#"{
            "seed": 3,
            "points": 64,
            "grid_cells": 2,
            "tolerance": 0.0,
            "tet_hierarchy": { "max_primitives_per_leaf": 2 }
        }"#,
    )
    .unwrap();

    let config = SceneConfig::load(&path).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(config.seed, 3);
    assert_eq!(config.points, 64);
    assert_eq!(config.tet_hierarchy.max_primitives_per_leaf, 2);
    assert_eq!(config.point_hierarchy.max_primitives_per_leaf, 10);

    let report = report::cross(&config).unwrap();
    assert_eq!(report.trees[0].entities, 64);
    assert_eq!(report.trees[1].entities, 40);
    assert_eq!(report.trees[1].leaves, 24);
}

#[test]
fn test_load_missing_config() {
    let err = SceneConfig::load("/nonexistent/spheretree/scene.json".as_ref()).unwrap_err();
    assert!(err.to_string().contains("cannot open"));
}

fn parse(config: &str) -> SceneConfig {
    serde_json::from_str(config).unwrap()
}

#[test]
fn test_reject_invalid_scene_values() {
    for (config, field) in [
        (r#"{ "tolerance": -1.0, "grid_cells": 1 }"#, "tolerance"),
        (r#"{ "cloud_extent": -1.0 }"#, "cloud_extent"),
        (r#"{ "cell_size": 0.0 }"#, "cell_size"),
        (r#"{ "grid_cells": 5000 }"#, "grid_cells"),
    ] {
        let err = parse(config).validate().unwrap_err();
        assert!(err.to_string().contains(field), "{config}: {err}");
    }

    let mut config = SceneConfig::default();
    config.tolerance = f64::NAN;
    assert!(config.validate().is_err());
    config.tolerance = 0.0;
    config.cloud_extent = f64::NAN;
    assert!(config.validate().is_err());
    config.cloud_extent = 1.0;
    config.helix_height = f64::INFINITY;
    assert!(config.validate().is_err());
    config.helix_height = 5.0;
    assert!(config.validate().is_ok());
}

#[test]
fn test_load_rejects_invalid_config() {
    let path = std::env::temp_dir().join(format!("spheretree-invalid-{}.json", process::id()));
    fs::write(&path, r#"{ "cloud_extent": -1.0 }"#).unwrap();

    let err = SceneConfig::load(&path).unwrap_err();
    fs::remove_file(&path).unwrap();

    assert!(err.to_string().contains("invalid scene configuration"));
    assert!(format!("{err:#}").contains("cloud_extent"));
}
