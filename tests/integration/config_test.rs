use assetdl::core::config::{AssetDirectories, Config};
use assetdl::AssetCategory;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert!(config.auto_import);
    assert!(config.binaries_dir.is_none());
    assert!(config.asset_directories.music.ends_with("musics"));
    assert!(config.asset_directories.sound_effects.ends_with("sound-effects"));
}

#[test]
fn test_config_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.json");

    let mut config = Config::default();
    config.asset_directories = AssetDirectories::under(temp_dir.path());
    config.set_value("binaries_dir", "/opt/assetdl/binaries").unwrap();
    config.save_to(&path).unwrap();

    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"asset_directories\""));

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(
        loaded.category_dir(AssetCategory::Vfx),
        temp_dir.path().join("videos")
    );
}

#[test]
fn test_corrupt_config_falls_back_to_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.json");
    fs::write(&path, [0xff, 0x00, 0x13]).unwrap();

    assert_eq!(Config::load_from(&path).unwrap(), Config::default());

    fs::write(&path, "[\"not\", \"an\", \"object\"]").unwrap();
    assert_eq!(Config::load_from(&path).unwrap(), Config::default());
}
