use base64::prelude::*;
use std::{env, fs, path::Path};

// 1x1 transparent PNG (base64)
const PNG_B64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR4nGNgYAAAAAMAASsJTYQAAAAASUVORK5CYII=";

fn ensure_png(path: &Path) {
    if path.exists() {
        return;
    }
    if let Some(dir) = path.parent() {
        let _ = fs::create_dir_all(dir);
    }
    let bytes = BASE64_STANDARD.decode(PNG_B64).expect("decode placeholder png");
    fs::write(path, bytes).expect("write placeholder png");
}

fn write_manifest(ui_dir: &Path) {
    let manifest = shell::WebAppManifest::default();
    for icon in &manifest.icons {
        ensure_png(&ui_dir.join(icon.src.trim_start_matches('/')));
    }
    let json = manifest.to_json().expect("serialize web manifest");
    fs::write(ui_dir.join("manifest.webmanifest"), json).expect("write web manifest");
}

fn main() {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let manifest_dir = Path::new(&manifest_dir);
    ensure_png(&manifest_dir.join("icons").join("icon.png"));
    write_manifest(&manifest_dir.join("..").join("ui"));
    println!("cargo:rerun-if-changed=../crates/shell/src/manifest.rs");
    tauri_build::build();
}
