use std::process::{Command, Output};

/// Resolves the `--version` string at build time into `LUMINA_VERSION`:
/// the package version on a release tag, `dev@<hash>` otherwise, with a
/// `+dirty` suffix when the work tree has uncommitted changes.
fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
    println!("cargo:rerun-if-changed=.git/index");

    let version = if git(&["describe", "--exact-match", "--tags", "HEAD"]).is_some() {
        env!("CARGO_PKG_VERSION").to_string()
    } else {
        match git(&["rev-parse", "--short", "HEAD"]) {
            Some(hash) if !hash.is_empty() => {
                let dirty = git(&["status", "--porcelain", "--untracked-files=no"])
                    .is_some_and(|status| !status.is_empty());
                format!("dev@{hash}{}", if dirty { "+dirty" } else { "" })
            }
            _ => "dev@unknown".to_string(),
        }
    };

    println!("cargo:rustc-env=LUMINA_VERSION={version}");
}

/// Trimmed stdout of a successful git invocation.
fn git(args: &[&str]) -> Option<String> {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|o: &Output| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
}
