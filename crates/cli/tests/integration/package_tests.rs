//! Package command integration tests.

use predicates::prelude::*;

use super::common::{TestEnv, has_dpkg_deb};

#[test]
fn undefined_variable_fails_without_output() {
  let env = TestEnv::from_fixture("undefined.xml");

  env
    .debkit_cmd()
    .args(["package", "foo", "1.0", "amd64"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("undefined variable 'maintainer'"));

  assert!(!env.path().join("build").exists());
  assert!(!env.path().join("foo_1.0_amd64.deb").exists());
}

#[test]
fn conflicting_sources_fail() {
  let env = TestEnv::from_fixture("conflicting.xml");

  env
    .debkit_cmd()
    .args(["package", "foo", "1.0", "amd64"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("conflicting content sources"));
}

#[test]
fn manifest_path_comes_from_environment() {
  let env = TestEnv::empty();
  env.write_file("pkg/other.xml", "<root name=\"{DEB_DIR}\"><file type=\"file\" name=\"x\">{nope}</file></root>");

  env
    .debkit_cmd()
    .env("DEBKIT_MANIFEST", "pkg/other.xml")
    .args(["package", "foo", "1.0", "amd64"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("undefined variable 'nope'"));
}

#[test]
fn builds_real_package() {
  if !has_dpkg_deb() {
    eprintln!("dpkg-deb not available, skipping");
    return;
  }
  let env = TestEnv::from_fixture("demo.xml");

  env
    .debkit_cmd()
    .args(["package", "demo", "1.0", "amd64"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Package created"))
    .stdout(predicate::str::contains("greeting.txt"));

  assert!(env.path().join("demo_1.0_amd64.deb").is_file());
  assert_eq!(
    std::fs::read_to_string(env.path().join("build/demo_1.0_amd64/usr/share/doc/demo/greeting.txt")).unwrap(),
    "hello\nworld\n"
  );
}
