//! Integration tests for the `nrl` binary.
//!
//! Every test runs against its own temporary home directory and config
//! file, so nothing touches the user's real configuration or registry.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

const NAME: &str = "Asha Patel";
const EMAIL: &str = "asha@example.com";
const PHONE: &str = "9876543210";

// =============================================================================
// Test Helpers
// =============================================================================

/// A sandboxed home directory with a config pointing at a local registry.
struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self::with_provider("file")
    }

    fn with_provider(provider: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let registry = dir.child("registry.json");
        dir.child("config.toml")
            .write_str(&format!(
                "[registry]\nprovider = \"{}\"\npath = \"{}\"\n",
                provider,
                registry.path().display()
            ))
            .unwrap();
        Self { dir }
    }

    fn config_path(&self) -> std::path::PathBuf {
        self.dir.child("config.toml").path().to_path_buf()
    }

    fn nrl(&self) -> Command {
        let mut cmd = Command::cargo_bin("nrl").unwrap();
        cmd.env("HOME", self.dir.path())
            .env_remove("NRL_CONFIG")
            .env_remove("XDG_CONFIG_HOME")
            .env_remove("RUST_LOG")
            .arg("--no-interactive")
            .arg("--config")
            .arg(self.config_path());
        cmd
    }

    fn generate(&self) -> String {
        let out = self
            .nrl()
            .args(["generate", "--name", NAME, "--email", EMAIL, "--phone", PHONE])
            .output()
            .unwrap();
        assert!(out.status.success());
        String::from_utf8(out.stdout).unwrap().trim().to_string()
    }
}

fn identity_args<'a>(phone: &'a str) -> [&'a str; 6] {
    ["--name", NAME, "--email", EMAIL, "--phone", phone]
}

// =============================================================================
// generate / validate / inspect
// =============================================================================

#[test]
fn generate_prints_a_code() {
    let sandbox = Sandbox::new();
    let code = sandbox.generate();
    assert_eq!(code.len(), 19);
    assert!(code.starts_with("NRL"));
}

#[test]
fn generate_requires_identity_without_prompts() {
    let sandbox = Sandbox::new();
    sandbox
        .nrl()
        .args(["generate", "--name", NAME, "--phone", PHONE])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--email"));
}

#[test]
fn validate_accepts_matching_identity() {
    let sandbox = Sandbox::new();
    let code = sandbox.generate();

    sandbox
        .nrl()
        .arg("validate")
        .arg(&code)
        .args(identity_args(PHONE))
        .assert()
        .success()
        .stdout(predicate::str::contains("valid"));
}

#[test]
fn validate_rejects_changed_phone() {
    let sandbox = Sandbox::new();
    let code = sandbox.generate();

    sandbox
        .nrl()
        .arg("validate")
        .arg(&code)
        .args(identity_args("9876543211"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("invalid"))
        .stderr(predicate::str::contains("does not match"));
}

#[test]
fn validate_json_reports_error() {
    let sandbox = Sandbox::new();

    let out = sandbox
        .nrl()
        .args(["--json", "validate", "XYZ1234567890123456"])
        .args(identity_args(PHONE))
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));

    let verdict: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(verdict["valid"], false);
    assert_eq!(verdict["error"], "invalid reference code format");
}

#[test]
fn inspect_decodes_segments() {
    let sandbox = Sandbox::new();
    let code = sandbox.generate();

    let out = sandbox
        .nrl()
        .args(["--json", "inspect", &code, "--expiry-hours", "48"])
        .output()
        .unwrap();
    assert!(out.status.success());

    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["validFormat"], true);
    assert_eq!(report["expiryHours"], 48);
    assert_eq!(report["expired"], false);
    assert_eq!(report["segments"]["userHashPrefix"], "K8");
    assert!(report["issuedAt"].is_string());
}

#[test]
fn inspect_rejects_malformed_code() {
    let sandbox = Sandbox::new();
    sandbox
        .nrl()
        .args(["inspect", "NRL123"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("invalid"));
}

// =============================================================================
// registry / check
// =============================================================================

#[test]
fn check_walks_the_submission_lifecycle() {
    let sandbox = Sandbox::new();
    let code = sandbox.generate();

    // Not yet recorded.
    sandbox
        .nrl()
        .args(["check", &code])
        .args(identity_args(PHONE))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not found"));

    sandbox
        .nrl()
        .args(["registry", "record", &code, "--form-id", "form_cli"])
        .assert()
        .success();

    sandbox
        .nrl()
        .args(["check", &code])
        .args(identity_args(PHONE))
        .assert()
        .success()
        .stdout(predicate::str::contains("form_cli"));

    sandbox
        .nrl()
        .args(["registry", "consume", &code])
        .assert()
        .success();

    sandbox
        .nrl()
        .args(["check", &code])
        .args(identity_args(PHONE))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already been used"));

    sandbox
        .nrl()
        .args(["registry", "consume", &code])
        .assert()
        .code(1);
}

#[test]
fn check_marks_file_submission_validated() {
    let sandbox = Sandbox::new();
    let code = sandbox.generate();
    sandbox
        .nrl()
        .args(["registry", "record", &code])
        .assert()
        .success();

    sandbox
        .nrl()
        .args(["check", &code])
        .args(identity_args(PHONE))
        .assert()
        .success();

    let out = sandbox
        .nrl()
        .args(["--json", "registry", "list"])
        .output()
        .unwrap();
    let list: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(list[0]["code"], code.as_str());
    assert_eq!(list[0]["status"], "validated");
}

#[test]
fn generate_record_adds_pending_submission() {
    let sandbox = Sandbox::new();
    let out = sandbox
        .nrl()
        .args(["--json", "generate", "--record"])
        .args(identity_args(PHONE))
        .output()
        .unwrap();
    assert!(out.status.success());
    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let code = report["code"].as_str().unwrap().to_string();
    assert_eq!(report["recorded"]["status"], "pending");

    sandbox
        .nrl()
        .args(["registry", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains(code));
}

#[test]
fn empty_registry_list() {
    let sandbox = Sandbox::new();
    sandbox
        .nrl()
        .args(["registry", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No submissions recorded."));
}

#[test]
fn check_without_registry_exits_2() {
    let sandbox = Sandbox::with_provider("none");
    let code = sandbox.generate();

    sandbox
        .nrl()
        .args(["check", &code])
        .args(identity_args(PHONE))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("temporarily unavailable"));
}

#[test]
fn check_mismatch_exits_1_without_registry() {
    let sandbox = Sandbox::with_provider("none");
    let code = sandbox.generate();

    sandbox
        .nrl()
        .args(["check", &code])
        .args(identity_args("9876543211"))
        .assert()
        .code(1);
}

// =============================================================================
// config / completion
// =============================================================================

#[test]
fn config_set_then_get() {
    let sandbox = Sandbox::new();
    sandbox
        .nrl()
        .args(["config", "set", "expiry_hours", "72"])
        .assert()
        .success();

    sandbox
        .nrl()
        .args(["config", "get", "expiry_hours"])
        .assert()
        .success()
        .stdout("72\n");

    sandbox
        .dir
        .child("config.toml")
        .assert(predicate::str::contains("expiry_hours = 72"));
}

#[test]
fn config_set_rejects_bad_provider() {
    let sandbox = Sandbox::new();
    sandbox
        .nrl()
        .args(["config", "set", "registry.provider", "carrier-pigeon"])
        .assert()
        .failure();

    sandbox
        .dir
        .child("config.toml")
        .assert(predicate::str::contains("provider = \"file\""));
}

#[test]
fn config_set_creates_missing_file() {
    let dir = TempDir::new().unwrap();
    let target = dir.child("fresh/config.toml");

    Command::cargo_bin("nrl")
        .unwrap()
        .env("HOME", dir.path())
        .env_remove("NRL_CONFIG")
        .args(["--no-interactive", "--config"])
        .arg(target.path())
        .args(["config", "set", "interactive", "false"])
        .assert()
        .success();

    target.assert(predicate::str::contains("interactive = false"));
}

#[test]
fn config_path_prints_explicit_file() {
    let sandbox = Sandbox::new();
    sandbox
        .nrl()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn invalid_config_fails_fast() {
    let sandbox = Sandbox::new();
    sandbox
        .dir
        .child("config.toml")
        .write_str("expiry_hours = \"soon\"\n")
        .unwrap();

    sandbox
        .nrl()
        .args(["config", "list"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("config"));
}

#[test]
fn completion_emits_script() {
    Command::cargo_bin("nrl")
        .unwrap()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nrl"));
}
