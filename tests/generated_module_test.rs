//! Exercises a generated module checked in under `tests/fixtures`.
//!
//! The fixture is exactly what `emx-bake tests/fixtures/hello.txt
//! tests/fixtures/pixel.bin` renders for this package, so this also checks
//! that the rendered shape compiles.

#[path = "fixtures/gen_bake.rs"]
mod gen_bake;
#[path = "fixtures/gen_bake_test.rs"]
mod gen_bake_test;

use emx_bake::Encoding;

#[test]
fn test_baked_entries() {
    let archive = gen_bake::baked();
    assert_eq!(archive.len(), 2);

    let hello = archive.get("tests/fixtures/hello.txt").unwrap();
    assert_eq!(hello.encoding(), Encoding::Raw);
    assert_eq!(hello.contents().unwrap().as_ref(), b"Hello, \"baked\" world!\n");

    let pixel = archive.get("tests/fixtures/pixel.bin").unwrap();
    assert_eq!(pixel.encoding(), Encoding::Hex);
    let data = pixel.contents().unwrap();
    assert_eq!(data.len(), 70);
    assert!(data.starts_with(b"\x89PNG\r\n\x1a\n"));
}

#[test]
fn test_baked_files_exist_relative_to_package() {
    gen_bake::baked()
        .ensure_in(env!("CARGO_MANIFEST_DIR"))
        .unwrap();
}

#[test]
fn test_baked_extract_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let archive = gen_bake::baked();
    archive.extract_to(dir.path()).unwrap();
    archive.verify_identity_in(dir.path()).unwrap();

    let original = std::fs::read(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/pixel.bin")).unwrap();
    let extracted = std::fs::read(dir.path().join("tests/fixtures/pixel.bin")).unwrap();
    assert_eq!(original, extracted);
}
