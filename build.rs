use std::process::Command;

fn git(args: &[&str]) -> String {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

fn main() {
    println!(">>> Building version number...");

    let rustc = std::env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());
    let rustc_version = Command::new(rustc)
        .arg("--version")
        .output()
        .ok()
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown rustc".to_string());

    println!("cargo:rerun-if-env-changed=SASLPLAIND_BUILD_TAGGED_RELEASE");
    let tagged_release = option_env!("SASLPLAIND_BUILD_TAGGED_RELEASE") == Some("1");
    let version_string = if tagged_release {
        format!(
            "{version} [{rustc}]",
            version = env!("CARGO_PKG_VERSION"),
            rustc = rustc_version
        )
    } else {
        // Build version number using the current git commit id, if there is one
        let gitrev = git(&["rev-list", "HEAD", "-1"]);
        let abbrev = gitrev.get(0..9).unwrap_or("unknown");
        let commit_date = git(&["log", "-1", "--format=%as"]);

        format!(
            "{version} ({gitrev} {date}) [{rustc}]",
            version = env!("CARGO_PKG_VERSION"),
            gitrev = abbrev,
            date = commit_date,
            rustc = rustc_version
        )
    };
    println!("cargo:rustc-env=SASLPLAIND_VERSION_STRING={}", version_string);
}
