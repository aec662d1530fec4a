//! Inspect command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn inspect_prints_substituted_tree() {
  let env = TestEnv::from_fixture("demo.xml");

  env
    .debkit_cmd()
    .args(["inspect", "demo", "1.0", "amd64"])
    .assert()
    .success()
    .stdout(predicate::str::contains("demo_1.0_amd64/"))
    .stdout(predicate::str::contains("DEBIAN/ [0755]"))
    .stdout(predicate::str::contains("usr/share/doc/demo/"))
    .stdout(predicate::str::contains("greeting.txt (inline)"));

  assert!(!env.path().join("build").exists());
}

#[test]
fn inspect_by_id_as_json() {
  let env = TestEnv::from_fixture("demo.xml");

  let output = env
    .debkit_cmd()
    .args(["inspect", "foo", "2.0", "arm64", "control", "-o", "json"])
    .output()
    .unwrap();
  assert!(output.status.success());

  let node: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(node["type"], "file");
  assert_eq!(node["name"], "control");
  assert_eq!(node["source"]["kind"], "inline");
  assert!(node["source"]["text"].as_str().unwrap().contains("Package: foo"));
}

#[test]
fn inspect_unknown_id_fails() {
  let env = TestEnv::from_fixture("demo.xml");

  env
    .debkit_cmd()
    .args(["inspect", "demo", "1.0", "amd64", "nope"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("no node with id 'nope'"));
}
