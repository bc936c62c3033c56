mod common;

use std::collections::HashMap;
use tempfile::tempdir;

use common::*;
use wavehash_core::{Gallery, GalleryOptions, ImageSource};

#[test]
fn test_build_skips_undecodable_images() {
    let dir = tempdir().unwrap();
    create_gallery_dir(dir.path());

    let gallery = Gallery::build(dir.path(), test_config(), &GalleryOptions::default()).unwrap();

    // 4 decodable images, the broken JPEG is skipped, notes.txt is never considered
    assert_eq!(gallery.len(), 4);
    assert_eq!(gallery.skipped().len(), 1);
    assert_eq!(gallery.skipped()[0].id, id_of(&dir.path().join("broken.jpg")));
    assert!(!gallery.contains(&dir.path().join("notes.txt").display().to_string()));

    for entry in gallery.iter() {
        assert_eq!(entry.hash.bits.len(), 64);
        assert_eq!(entry.hash.hex.len(), 16);
    }
}

#[test]
fn test_build_order_follows_scan() {
    let dir = tempdir().unwrap();
    create_gallery_dir(dir.path());

    let options = GalleryOptions {
        threads: 2,
        ..GalleryOptions::default()
    };
    let gallery = Gallery::build(dir.path(), test_config(), &options).unwrap();

    let ids: Vec<String> = gallery.iter().map(|e| e.id.clone()).collect();
    let expected: Vec<String> = [
        "board.png",
        "h_gradient.png",
        "nested/h_bright.png",
        "nested/v_gradient.png",
    ]
    .iter()
    .map(|name| id_of(&dir.path().join(name)))
    .collect();
    assert_eq!(ids, expected);
}

#[test]
fn test_non_recursive_build() {
    let dir = tempdir().unwrap();
    create_gallery_dir(dir.path());

    let options = GalleryOptions {
        recursive: false,
        ..GalleryOptions::default()
    };
    let gallery = Gallery::build(dir.path(), test_config(), &options).unwrap();
    assert_eq!(gallery.len(), 2);
    assert!(gallery.contains(&id_of(&dir.path().join("h_gradient.png"))));
}

#[test]
fn test_query_finds_itself_first() {
    let dir = tempdir().unwrap();
    create_gallery_dir(dir.path());
    let gallery = Gallery::build(dir.path(), test_config(), &GalleryOptions::default()).unwrap();

    let query = dir.path().join("h_gradient.png");
    let hits = gallery
        .retrieve(ImageSource::Path(&query), 3, None)
        .unwrap();

    assert_eq!(hits.len(), 3);
    assert_eq!(hits[0].id, id_of(&query));
    assert_eq!(hits[0].distance, 0);
    assert_eq!(hits[0].similarity, 1.0);

    // The brighter copy has the same structure
    assert_eq!(hits[1].id, id_of(&dir.path().join("nested/h_bright.png")));
    assert_eq!(hits[1].distance, 0);

    for pair in hits.windows(2) {
        assert!(pair[0].distance <= pair[1].distance);
    }
}

#[test]
fn test_max_distance_excludes_far_entries() {
    let dir = tempdir().unwrap();
    create_gallery_dir(dir.path());
    let gallery = Gallery::build(dir.path(), test_config(), &GalleryOptions::default()).unwrap();

    let query = dir.path().join("h_gradient.png");
    let hits = gallery
        .retrieve(ImageSource::Path(&query), 10, Some(0))
        .unwrap();
    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|hit| hit.distance == 0));
}

#[test]
fn test_query_decode_failure_surfaces() {
    let dir = tempdir().unwrap();
    create_gallery_dir(dir.path());
    let gallery = Gallery::build(dir.path(), test_config(), &GalleryOptions::default()).unwrap();

    let broken = dir.path().join("broken.jpg");
    assert!(gallery.retrieve(ImageSource::Path(&broken), 3, None).is_err());
}

#[test]
fn test_precision_at_k_over_directory() {
    let dir = tempdir().unwrap();
    create_gallery_dir(dir.path());
    let gallery = Gallery::build(dir.path(), test_config(), &GalleryOptions::default()).unwrap();

    let labels: HashMap<String, String> = [
        ("board.png", "board"),
        ("h_gradient.png", "horizontal"),
        ("nested/h_bright.png", "horizontal"),
        ("nested/v_gradient.png", "vertical"),
    ]
    .iter()
    .map(|(name, label)| (id_of(&dir.path().join(name)), label.to_string()))
    .collect();

    let query_img = gradient(96, 96, true, 10);
    let queries = [(ImageSource::Image(&query_img), "horizontal")];
    let precision = gallery.precision_at_k(&queries, &labels, &[1, 2]).unwrap();

    assert_eq!(precision[&1], 1.0);
    assert_eq!(precision[&2], 1.0);
}
