use chrono::Utc;
use importdoc_types::*;

fn sample_report() -> DiagnosticReport {
    DiagnosticReport {
        target: "my_package".to_string(),
        package_dir: Some("/tmp/my_package".to_string()),
        success: false,
        failure: Some(categorize_import_error(
            "ModuleNotFoundError: No module named 'my_package'",
        )),
        discovered_modules: vec![],
        skipped_modules: vec![],
        findings: vec![
            Finding::new(Severity::Info, "Target package: my_package"),
            Finding::new(Severity::Error, "No file found matching module."),
        ],
        generated_at: Utc::now(),
    }
}

#[test]
fn test_report_json_shape() {
    let report = sample_report();

    insta::assert_json_snapshot!(report, { ".generated_at" => "[timestamp]" }, @r###"
    {
      "target": "my_package",
      "package_dir": "/tmp/my_package",
      "success": false,
      "failure": {
        "exception": "ModuleNotFoundError",
        "message": "No module named 'my_package'",
        "kind": {
          "type": "module_not_found",
          "module": "my_package"
        }
      },
      "discovered_modules": [],
      "skipped_modules": [],
      "findings": [
        {
          "severity": "info",
          "message": "Target package: my_package"
        },
        {
          "severity": "error",
          "message": "No file found matching module."
        }
      ],
      "generated_at": "[timestamp]"
    }
    "###);
}

#[test]
fn test_findings_with_filters_by_severity() {
    let report = sample_report();
    let errors: Vec<&str> = report
        .findings_with(Severity::Error)
        .map(|f| f.message.as_str())
        .collect();
    assert_eq!(errors, vec!["No file found matching module."]);
}

#[test]
fn test_to_json_round_trips_through_value() {
    let json = sample_report().to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["failure"]["kind"]["type"], "module_not_found");
    assert_eq!(value["findings"].as_array().map(|a| a.len()), Some(2));
}
