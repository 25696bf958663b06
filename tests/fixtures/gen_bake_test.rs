// Code generated by emx-bake. DO NOT EDIT.

#[test]
fn baked_files_match_disk() {
    if let Err(err) = super::gen_bake::baked().verify_identity() {
        panic!("{err}");
    }
}
