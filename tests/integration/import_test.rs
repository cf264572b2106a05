use assetdl::core::{import_download, import_file, AssetCategory, AssetDirectories};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_import_into_category_directory() {
    let temp = TempDir::new().unwrap();
    let dirs = AssetDirectories::under(temp.path());
    let source = temp.path().join("boom.mp3");
    fs::write(&source, b"boom").unwrap();

    let first = import_file(&source, dirs.for_category(AssetCategory::Sfx)).unwrap();
    let second = import_file(&source, dirs.for_category(AssetCategory::Sfx)).unwrap();

    assert_eq!(first, temp.path().join("sound-effects").join("boom.mp3"));
    assert_eq!(second, temp.path().join("sound-effects").join("boom_1.mp3"));
    assert!(source.exists(), "manual import keeps the source");
}

#[test]
fn test_import_download_moves_scratch_file() {
    let temp = TempDir::new().unwrap();
    let dirs = AssetDirectories::under(temp.path());
    fs::create_dir_all(&dirs.downloads).unwrap();
    let scratch = dirs.downloads.join("take.mp4");
    fs::write(&scratch, b"video").unwrap();
    fs::create_dir_all(&dirs.videos).unwrap();
    fs::write(dirs.videos.join("take.mp4"), b"older").unwrap();

    let dest = import_download(&scratch, dirs.for_category(AssetCategory::Vfx)).unwrap();

    assert_eq!(dest, dirs.videos.join("take_1.mp4"));
    assert_eq!(fs::read(dirs.videos.join("take.mp4")).unwrap(), b"older");
    assert!(!scratch.exists());
}

#[test]
fn test_classification_by_extension() {
    use std::path::Path;

    assert_eq!(AssetCategory::classify(Path::new("a.MP3")), Some(AssetCategory::Music));
    assert_eq!(AssetCategory::classify(Path::new("a.wav")), Some(AssetCategory::Music));
    assert_eq!(AssetCategory::classify(Path::new("a.mkv")), Some(AssetCategory::Vfx));
    assert_eq!(AssetCategory::classify(Path::new("a.txt")), None);
    assert_eq!(AssetCategory::classify(Path::new("noext")), None);
}
