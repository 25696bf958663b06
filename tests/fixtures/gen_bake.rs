// Code generated by emx-bake. DO NOT EDIT.
// Package: emx-bake

use emx_bake::{Archive, Encoding, Entry};

static ENTRIES: [Entry<'static>; 2] = [
    Entry::from_static(
        "tests/fixtures/hello.txt",
        Encoding::Raw,
        r#"Hello, "baked" world!
"#.as_bytes(),
    ),
    Entry::from_static(
        "tests/fixtures/pixel.bin",
        Encoding::Hex,
        b"89504e470d0a1a0a808182838485868788898a8b8c8d8e8f909192939495969798999a9b9c9d9e9fa0a1a2a3a4a5a6a7a8a9aaabacadaeafb0b1b2b3b4b5b6b7
b8b9babbbcbd",
    ),
];

/// Files baked into this crate when the module was generated
pub fn baked() -> Archive<'static> {
    Archive::from_static(&ENTRIES)
}
