//! Clean command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn clean_removes_build_and_archives() {
  let env = TestEnv::empty();
  env.write_file("build/foo_1.0_amd64/DEBIAN/control", "Package: foo\n");
  env.write_file("foo_1.0_amd64.deb", "archive");
  env.write_file("README.md", "keep me");

  env
    .debkit_cmd()
    .arg("clean")
    .assert()
    .success()
    .stdout(predicate::str::contains("Removed 2 path(s)"));

  assert!(!env.path().join("build").exists());
  assert!(!env.path().join("foo_1.0_amd64.deb").exists());
  assert!(env.path().join("README.md").exists());
}

#[test]
fn clean_with_nothing_to_do_succeeds() {
  let env = TestEnv::empty();

  env
    .debkit_cmd()
    .arg("clean")
    .assert()
    .success()
    .stdout(predicate::str::contains("Nothing to clean"));
}

#[test]
fn clean_honors_build_dir_override() {
  let env = TestEnv::empty();
  env.write_file("out/pkg/file", "x");
  env.write_file("build/keep", "x");

  env.debkit_cmd().env("DEBKIT_BUILD_DIR", "out").arg("clean").assert().success();

  assert!(!env.path().join("out").exists());
  assert!(env.path().join("build/keep").exists());
}
