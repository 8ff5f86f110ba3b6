use std::path::{Path, PathBuf};

fn builder(out_dir: &Path) -> restgen_codegen::CodegenBuilder {
    restgen_codegen::CodegenBuilder::new("../demos/schema.toml")
        .output_dir(out_dir.join("controllers"))
        .models_dir(out_dir.join("models"))
        .core_dir(out_dir.join("core"))
}

fn main() {
    // Generate controllers for integration tests
    // The emitted TypeScript is only read by tests (via include_str!)
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").unwrap());
    let controllers = out_dir.join("controllers");
    if controllers.exists() {
        std::fs::remove_dir_all(&controllers).expect("failed to clear old output");
    }

    builder(&out_dir)
        .controller("profile", "User")
        .route("account")
        .generate()
        .expect("codegen failed");

    // Registry snapshot after the first registration, then generate the same controller again
    let registry = controllers.join("v1").join("index.ts");
    std::fs::copy(&registry, out_dir.join("registry-first.ts")).expect("registry missing");
    builder(&out_dir)
        .controller("profile", "User")
        .route("account")
        .generate()
        .expect("codegen failed");
    std::fs::copy(&registry, out_dir.join("registry-second.ts")).expect("registry missing");

    builder(&out_dir)
        .controller("note", "Note")
        .generate()
        .expect("codegen failed");

    builder(&out_dir)
        .controller("album", "Album")
        .route("/media/")
        .version("v2")
        .generate()
        .expect("codegen failed");

    builder(&out_dir)
        .controller("document", "Document")
        .generate()
        .expect("codegen failed");

    println!("cargo:rerun-if-changed=../demos/schema.toml");
}
