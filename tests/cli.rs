//! The `rootbeer` binary end to end.

mod common;

use common::{Repo, vendor};
use std::process::Command;

fn rootbeer(repo: &Repo) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_rootbeer"));
    cmd.arg("--recipes")
        .arg(repo.recipes())
        .arg("--log-dir")
        .arg(repo.root().join("logs"));
    cmd
}

#[test]
fn test_uninstall_warns_and_leaves_package() {
    let repo = Repo::new();
    let output = rootbeer(&repo)
        .args(["foo", "uninstall"])
        .output()
        .expect("failed to run rootbeer");

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("warning:"), "stderr: {stderr}");
    assert!(
        stderr.contains("uninstall is not supported yet; foo was left in place"),
        "stderr: {stderr}"
    );
}

#[test]
fn test_plan_prints_install_order() {
    let repo = Repo::new();
    let setup = repo.artifact("setup.exe", b"MZ");
    let loc = setup.to_str().unwrap();
    repo.recipe("app", vendor("app", loc, &["runtime"]));
    repo.recipe("runtime", vendor("runtime", loc, &[]));

    let output = rootbeer(&repo)
        .args(["app", "plan"])
        .output()
        .expect("failed to run rootbeer");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let runtime = stdout.find("runtime 1.0").expect("runtime missing from plan");
    let app = stdout.find("app 1.0").expect("app missing from plan");
    assert!(runtime < app, "stdout: {stdout}");
}
