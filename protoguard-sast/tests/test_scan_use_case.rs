//! Integration tests for the project scan use case

mod common;

use common::create_source_file;
use protoguard_core::config::{Config, JavaScriptFrontend};
use protoguard_sast::domain::Line;
use protoguard_sast::{ParseError, ScanError, ScanProjectUseCase};

const VULNERABLE: &str = "function merge(dst, src) {\n  dst.__proto__ = src;\n}\n";
const CLEAN: &str = "const total = items.reduce((a, b) => a + b, 0);\n";

#[tokio::test]
async fn test_directory_scan_reports_each_file() {
    let dir = tempfile::tempdir().unwrap();
    create_source_file(&dir, "a_vulnerable.js", VULNERABLE).await;
    create_source_file(&dir, "b_clean.mjs", CLEAN).await;
    create_source_file(&dir, "c_broken.js", "obj.__proto__ = {").await;
    create_source_file(&dir, "notes.txt", VULNERABLE).await;
    create_source_file(&dir, "node_modules/dep/index.js", VULNERABLE).await;

    let report = ScanProjectUseCase::new().execute(dir.path()).await.unwrap();

    assert_eq!(report.files_scanned, 2);
    assert_eq!(report.files.len(), 2);
    assert!(report.files[0].path.ends_with("a_vulnerable.js"));
    assert!(report.files[1].path.ends_with("b_clean.mjs"));
    assert_eq!(report.files[0].findings.len(), 1);
    assert_eq!(report.files[0].findings.findings()[0].line, Line::Known(2));
    assert!(report.files[1].findings.is_empty());

    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].path.ends_with("c_broken.js"));
    assert!(matches!(
        report.failures[0].error,
        ScanError::Parse(ParseError::Failed { .. })
    ));

    assert_eq!(report.finding_count(), 1);
    assert!(report.has_findings());
}

#[tokio::test]
async fn test_single_file_surfaces_errors() {
    let dir = tempfile::tempdir().unwrap();
    let use_case = ScanProjectUseCase::new();

    let good = create_source_file(&dir, "good.js", VULNERABLE).await;
    let report = use_case.execute(&good).await.unwrap();
    assert_eq!(report.files_scanned, 1);
    assert_eq!(report.finding_count(), 1);

    let broken = create_source_file(&dir, "broken.js", "a.b = ;").await;
    assert!(matches!(
        use_case.execute(&broken).await,
        Err(ScanError::Parse(_))
    ));

    let text = create_source_file(&dir, "notes.txt", VULNERABLE).await;
    assert!(matches!(
        use_case.execute(&text).await,
        Err(ScanError::UnsupportedFile(_))
    ));

    assert!(matches!(
        use_case.execute(&dir.path().join("missing.js")).await,
        Err(ScanError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_file_size_limit() {
    let dir = tempfile::tempdir().unwrap();
    let path = create_source_file(&dir, "big.js", VULNERABLE).await;

    let mut config = Config::default();
    config.scan.max_file_size_bytes = Some(8);
    let err = ScanProjectUseCase::with_config(&config)
        .execute_file(&path)
        .await
        .unwrap_err();
    assert!(matches!(err, ScanError::FileTooLarge { limit: 8, .. }));
}

#[tokio::test]
async fn test_pre_parsed_mode_scans_json_documents() {
    let dir = tempfile::tempdir().unwrap();
    create_source_file(
        &dir,
        "ast.json",
        r#"{"type": "Program", "body": [{"type": "ExpressionStatement", "expression":
            {"type": "AssignmentExpression", "operator": "=",
             "left": {"type": "MemberExpression", "computed": false,
                      "object": {"type": "Identifier", "name": "a"},
                      "property": {"type": "Identifier", "name": "constructor",
                                   "loc": {"start": {"line": 5, "column": 2}}}},
             "right": {"type": "Identifier", "name": "b"}}}]}"#,
    )
    .await;
    create_source_file(&dir, "scalar.json", "7").await;
    create_source_file(&dir, "index.js", VULNERABLE).await;

    let report = ScanProjectUseCase::new()
        .pre_parsed(true)
        .execute(dir.path())
        .await
        .unwrap();

    assert_eq!(report.files.len(), 1);
    assert_eq!(report.files[0].findings.findings()[0].line, Line::Known(5));
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(report.failures[0].error, ScanError::InvalidTree(_)));
}

#[tokio::test]
async fn test_configured_properties_and_concurrency() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..12 {
        create_source_file(&dir, &format!("f{:02}.js", i), "o.__defineGetter__ = g;\no.__proto__ = p;\n").await;
    }

    let mut config = Config::default();
    config.scan.sensitive_properties = vec!["__defineGetter__".to_string()];
    config.scan.max_concurrent_files = 3;

    let report = ScanProjectUseCase::with_config(&config)
        .execute(dir.path())
        .await
        .unwrap();

    assert_eq!(report.files_scanned, 12);
    // order follows the directory walk, not completion order
    let names: Vec<String> = report
        .files
        .iter()
        .filter_map(|f| f.path.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);

    for file in &report.files {
        assert_eq!(file.findings.len(), 1);
        assert_eq!(file.findings.findings()[0].property_name, "__defineGetter__");
    }
}

#[tokio::test]
async fn test_invalid_utf8_is_replaced_not_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("latin1.js");
    tokio::fs::write(&path, b"// caf\xe9\nobj.__proto__ = 1;\n").await.unwrap();

    let report = ScanProjectUseCase::new().execute(&path).await.unwrap();
    assert_eq!(report.finding_count(), 1);
    let finding = &report.files[0].findings.findings()[0];
    assert_eq!(finding.line, Line::Known(2));
    assert_eq!(finding.snippet, "obj.__proto__");
}

#[tokio::test]
async fn test_unavailable_frontend_fails_the_directory_once() {
    let dir = tempfile::tempdir().unwrap();
    create_source_file(&dir, "a.js", VULNERABLE).await;
    create_source_file(&dir, "b.js", CLEAN).await;

    let mut config = Config::default();
    config.parser.frontend = JavaScriptFrontend::Espree;
    config.parser.node_executable = "/nonexistent/protoguard-node".to_string();

    let err = ScanProjectUseCase::with_config(&config)
        .execute(dir.path())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ScanError::Parse(ParseError::FrontendUnavailable(_))
    ));
}

#[tokio::test]
async fn test_pre_parsed_mode_ignores_configured_frontend() {
    let dir = tempfile::tempdir().unwrap();
    create_source_file(
        &dir,
        "tree.json",
        r#"{"type": "Program", "body": []}"#,
    )
    .await;

    let mut config = Config::default();
    config.parser.frontend = JavaScriptFrontend::Espree;
    config.parser.node_executable = "/nonexistent/protoguard-node".to_string();

    let report = ScanProjectUseCase::with_config(&config)
        .pre_parsed(true)
        .execute(dir.path())
        .await
        .unwrap();
    assert_eq!(report.files_scanned, 1);
    assert!(report.failures.is_empty());
}
