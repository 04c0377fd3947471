mod common;

use std::path::PathBuf;

use tempfile::tempdir;
use tmplwatch::acquire::AcquisitionConfig;
use tmplwatch::config::load_from_path;
use tmplwatch::errors::TmplwatchError;
use tmplwatch::fs::RealFileSystem;
use tmplwatch::resolver::ConfigResolver;

use common::{FULL_CONFIG, FakeCommandRunner, init_tracing, write_file};

fn resolver() -> ConfigResolver<RealFileSystem, FakeCommandRunner> {
    ConfigResolver::new(RealFileSystem, FakeCommandRunner::new())
}

#[tokio::test]
async fn resolves_yml_file_from_disk() {
    init_tracing();
    let dir = tempdir().unwrap();
    write_file(dir.path(), "conf/site.yml", FULL_CONFIG);

    let cfg = AcquisitionConfig::default().with_config_file(dir.path().join("conf/site.yml"));
    let resolved = resolver().resolve(&cfg).await.unwrap();

    assert_eq!(resolved.document.len(), 2);
    assert_eq!(resolved.config_deps, vec![dir.path().join("conf/site")]);

    let first = &resolved.document.items()[0];
    assert!(first.watch);
    assert_eq!(
        first.dependency_paths().collect::<Vec<_>>(),
        vec!["deps/base.yml", "deps/extra.yml"]
    );
}

#[tokio::test]
async fn configured_extension_is_ignored() {
    init_tracing();
    let dir = tempdir().unwrap();
    write_file(dir.path(), "site.yml", "watch: true");

    // Pointing at `.yaml` still reads the `.yml` sibling.
    let cfg = AcquisitionConfig::default().with_config_file(dir.path().join("site.yaml"));
    let resolved = resolver().resolve(&cfg).await.unwrap();
    assert!(resolved.document.items()[0].watch);
}

#[tokio::test]
async fn yaml_content_is_discarded_in_favour_of_yml() {
    init_tracing();
    let dir = tempdir().unwrap();
    write_file(dir.path(), "site.yaml", "watch: false");
    write_file(dir.path(), "site.yml", "watch: true");

    let cfg = AcquisitionConfig::default().with_config_file(dir.path().join("site.yml"));
    let resolved = resolver().resolve(&cfg).await.unwrap();
    assert!(resolved.document.items()[0].watch);
}

#[tokio::test]
async fn lone_yaml_file_is_not_enough() {
    init_tracing();
    let dir = tempdir().unwrap();
    write_file(dir.path(), "site.yaml", "watch: true");

    let cfg = AcquisitionConfig::default().with_config_file(dir.path().join("site.yml"));
    let err = resolver().resolve(&cfg).await.unwrap_err();
    match &err {
        TmplwatchError::ConfigRead { path, .. } => {
            assert_eq!(path, &dir.path().join("site.yml"));
        }
        other => panic!("expected read error, got {other:?}"),
    }
    assert_eq!(err.kind(), "config_acquisition");
}

#[tokio::test]
async fn invalid_file_reports_every_violation() {
    init_tracing();
    let dir = tempdir().unwrap();
    write_file(
        dir.path(),
        "bad.yml",
        r#"
- watch: sometimes
  datasources: [not a url]
- files:
    - output_path: out.html
"#,
    );

    let cfg = AcquisitionConfig::default().with_config_file(dir.path().join("bad.yml"));
    let err = resolver().resolve(&cfg).await.unwrap_err();
    let TmplwatchError::Validation(errors) = &err else {
        panic!("expected validation error, got {err:?}");
    };
    assert!(errors.has_path("0.watch"), "{errors}");
    assert!(errors.has_path("1.files.0.input_path"), "{errors}");
    assert_eq!(err.kind(), "validation");
}

#[test]
fn load_from_path_reads_a_single_file() {
    let dir = tempdir().unwrap();
    let path = write_file(dir.path(), "plain.yml", "templates: [a.tpl, b.tpl]");

    let doc = load_from_path(&path).unwrap();
    assert_eq!(
        doc.items()[0].template_paths().collect::<Vec<_>>(),
        vec!["a.tpl", "b.tpl"]
    );

    let missing = load_from_path(PathBuf::from("/definitely/not/here.yml")).unwrap_err();
    assert!(matches!(missing, TmplwatchError::ConfigRead { .. }));
}
