fn main() {
    vergen::EmitBuilder::builder()
        .build_timestamp()
        .rustc_channel()
        .rustc_commit_date()
        .rustc_commit_hash()
        .rustc_host_triple()
        .rustc_llvm_version()
        .rustc_semver()
        .cargo_target_triple()
        .cargo_debug()
        .cargo_opt_level()
        .emit()
        .unwrap();
}
