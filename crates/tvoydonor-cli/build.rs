//! Stamps `TVOYDONOR_VERSION` as `<pkg version>+g<short sha>[.dirty]`.

use std::path::PathBuf;
use std::process::Command;

fn main() {
    let pkg = env!("CARGO_PKG_VERSION");

    let Some(git_dir) = git(&["rev-parse", "--absolute-git-dir"]).map(PathBuf::from) else {
        println!("cargo:rustc-env=TVOYDONOR_VERSION={pkg}");
        return;
    };
    println!("cargo:rerun-if-changed={}", git_dir.join("HEAD").display());
    println!("cargo:rerun-if-changed={}", git_dir.join("index").display());

    let version = match git(&["rev-parse", "--short=9", "HEAD"]) {
        Some(sha) if is_dirty() => format!("{pkg}+g{sha}.dirty"),
        Some(sha) => format!("{pkg}+g{sha}"),
        None => pkg.to_string(),
    };
    println!("cargo:rustc-env=TVOYDONOR_VERSION={version}");
}

fn is_dirty() -> bool {
    git(&["status", "--porcelain", "--untracked-files=no"]).is_some()
}

/// Trimmed stdout of a successful, non-empty git invocation.
fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
