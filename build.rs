use std::process::Command;

fn main() {
    println!("cargo:rerun-if-env-changed=KRRING_REVISION");

    let revision = match std::env::var("KRRING_REVISION") {
        Ok(rev) if !rev.trim().is_empty() => rev.trim().to_string(),
        _ => git_revision().unwrap_or_else(|| "???".to_string()),
    };

    println!("cargo:rustc-env=KRRING_REVISION={}", revision)
}

fn git_revision() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let rev = String::from_utf8(output.stdout).ok()?;
    let rev = rev.trim();
    (!rev.is_empty()).then(|| rev.to_string())
}
