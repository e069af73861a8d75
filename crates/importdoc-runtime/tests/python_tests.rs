#![cfg(unix)]

use importdoc_engine::{ImportSystem, SilentReporter};
use importdoc_runtime::{DiagnoseOptions, DoctorService, Error, PythonEnvironment};
use importdoc_testing::{FakeInterpreter, PackageTree};
use importdoc_types::{FailureKind, Finding, ImportOutcome, ModuleName, ModuleSpec};
use std::path::Path;
use tempfile::TempDir;

fn install(interpreter: &FakeInterpreter, bin: &TempDir, site: &PackageTree) -> std::path::PathBuf {
    interpreter
        .install(bin.path(), &[site.root().to_path_buf()])
        .unwrap()
}

#[test]
fn test_detect_reads_version_and_search_path() {
    let bin = TempDir::new().unwrap();
    let site = PackageTree::new().package("pkg");
    let python = install(&FakeInterpreter::new().version("3.11.9"), &bin, &site);

    let env = PythonEnvironment::detect(&python).unwrap();

    assert_eq!(env.version(), "3.11.9");
    assert_eq!(env.search_paths(), &[site.root().to_path_buf()]);
    assert!(env.describe().starts_with("Python 3.11.9 ("));
    assert!(env.find_spec(&ModuleName::parse("pkg").unwrap()).unwrap().is_package());
}

#[test]
fn test_detect_missing_interpreter_is_error() {
    let result = PythonEnvironment::detect(Path::new("/nonexistent/bin/python"));
    assert!(matches!(result, Err(Error::Interpreter(_))));
}

#[test]
fn test_import_module_success() {
    let bin = TempDir::new().unwrap();
    let site = PackageTree::new();
    let python = install(&FakeInterpreter::new(), &bin, &site);
    let env = PythonEnvironment::detect(&python).unwrap();

    let outcome = env.import_module("os").unwrap();
    assert!(outcome.is_imported());
    assert_eq!(outcome, ImportOutcome::Imported);
}

#[test]
fn test_import_module_failure_is_categorized() {
    let bin = TempDir::new().unwrap();
    let site = PackageTree::new();
    let interpreter = FakeInterpreter::new().failing(
        "pkg",
        "ImportError: cannot import name 'helper' from 'pkg.util'",
    );
    let python = install(&interpreter, &bin, &site);
    let env = PythonEnvironment::detect(&python).unwrap();

    let ImportOutcome::Failed(failure) = env.import_module("pkg").unwrap() else {
        panic!("expected import failure");
    };
    assert_eq!(failure.exception, "ImportError");
    assert_eq!(failure.kind, FailureKind::ImportError);

    let ImportOutcome::Failed(missing) = env.import_module("absent").unwrap() else {
        panic!("expected import failure");
    };
    assert_eq!(missing.kind, FailureKind::ModuleNotFound("absent".to_string()));
}

#[test]
fn test_import_module_unstartable_interpreter_is_error() {
    let site = PackageTree::new();
    let env = PythonEnvironment::with_search_paths(
        "/nonexistent/bin/python",
        vec![site.root().to_path_buf()],
    );

    assert_eq!(env.interpreter(), Path::new("/nonexistent/bin/python"));
    assert!(env.import_module("os").is_err());
}

#[test]
fn test_doctor_diagnoses_missing_module() {
    let bin = TempDir::new().unwrap();
    let site = PackageTree::new().package("present");
    let python = install(&FakeInterpreter::new(), &bin, &site);

    let options = DiagnoseOptions {
        python: Some(python.display().to_string()),
        ..DiagnoseOptions::new("absent")
    };
    let mut findings: Vec<Finding> = Vec::new();
    let outcome = DoctorService::diagnose(&options, &mut findings).unwrap();

    assert!(!outcome.imported);
    assert_eq!(outcome.report.target, "absent");
    assert!(findings
        .iter()
        .any(|f| f.message.contains("No file found matching module.")));
}

#[test]
fn test_doctor_discovers_failing_package() {
    let bin = TempDir::new().unwrap();
    let site = PackageTree::new()
        .package("pkg")
        .module("pkg/util.py")
        .package("pkg/tests")
        .module("pkg/tests/test_util.py");
    let interpreter =
        FakeInterpreter::new().failing("pkg", "ModuleNotFoundError: No module named 'requests'");
    let python = install(&interpreter, &bin, &site);
    let env = PythonEnvironment::detect(&python).unwrap();

    let options = DiagnoseOptions {
        exclude: vec![r"\.tests$".to_string()],
        ..DiagnoseOptions::new("pkg")
    };
    let outcome = DoctorService::diagnose_with(&env, &options, SilentReporter).unwrap();

    assert!(!outcome.imported);
    assert_eq!(outcome.report.discovered_modules, vec!["pkg", "pkg.util"]);
    assert_eq!(outcome.report.skipped_modules, vec!["pkg.tests"]);
    assert!(env
        .find_spec(&ModuleName::parse("pkg.tests").unwrap())
        .map(|spec| matches!(spec, ModuleSpec::Package { .. }))
        .unwrap());
}

#[test]
fn test_doctor_invalid_pattern_is_error() {
    let site = PackageTree::new();
    let env = PythonEnvironment::with_search_paths("python3", vec![site.root().to_path_buf()]);

    let options = DiagnoseOptions {
        exclude: vec!["(unclosed".to_string()],
        ..DiagnoseOptions::new("pkg")
    };
    let result = DoctorService::diagnose_with(&env, &options, SilentReporter);

    assert!(matches!(result, Err(Error::Engine(_))));
}

#[test]
fn test_doctor_follows_symlinked_subpackages_without_looping() {
    let bin = TempDir::new().unwrap();
    let site = PackageTree::new()
        .package("pkg")
        .module("pkg/util.py")
        .package("vendor/extra")
        .symlink("pkg/extra", "vendor/extra")
        .symlink("pkg/again", "pkg");
    let python = install(&FakeInterpreter::new().failing("pkg", "RuntimeError: boom"), &bin, &site);
    let env = PythonEnvironment::detect(&python).unwrap();

    let mut findings: Vec<Finding> = Vec::new();
    let outcome =
        DoctorService::diagnose_with(&env, &DiagnoseOptions::new("pkg"), &mut findings).unwrap();

    assert!(!outcome.imported);
    assert_eq!(
        outcome.report.discovered_modules,
        vec!["pkg", "pkg.again", "pkg.extra", "pkg.util"]
    );
    assert!(findings
        .iter()
        .any(|f| f.message.contains("'pkg.again'") && f.message.contains("cyclic package layout")));
}

#[test]
fn test_doctor_rejects_path_like_target() {
    let bin = TempDir::new().unwrap();
    let site = PackageTree::new().package("pkg");
    let outside = PackageTree::new().package("evil").module("inner.py");
    let python = install(&FakeInterpreter::new(), &bin, &site);
    let env = PythonEnvironment::detect(&python).unwrap();

    let target = outside.root().display().to_string();
    let mut findings: Vec<Finding> = Vec::new();
    let outcome =
        DoctorService::diagnose_with(&env, &DiagnoseOptions::new(target.as_str()), &mut findings)
            .unwrap();

    assert!(!outcome.imported);
    assert!(outcome.report.discovered_modules.is_empty());
    assert!(findings
        .iter()
        .any(|f| f.message.contains("No file found matching module.")));
    assert!(!findings.iter().any(|f| f.message.contains("resolves to")));
}
