//! Dispatch against real archive fixtures and the in-process runtime.

use std::fs::File;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use modhost_modules::{
    Error, LocalRuntime, ModuleDispatcher, ModuleKind, ModuleRuntime, Properties, RuntimeError,
};
use modhost_resolver::{ArtifactLocator, ResolvedArtifact};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

fn append(builder: &mut tar::Builder<impl std::io::Write>, name: &str, content: &[u8]) {
    let mut header = tar::Header::new_gnu();
    header.set_size(content.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder.append_data(&mut header, name, content).unwrap();
}

fn write_tar(path: &Path, entries: &[(&str, &[u8])]) -> PathBuf {
    let mut builder = tar::Builder::new(File::create(path).unwrap());
    for (name, content) in entries {
        append(&mut builder, name, content);
    }
    builder.finish().unwrap();
    path.to_path_buf()
}

fn write_tar_gz(path: &Path, entries: &[(&str, &[u8])]) -> PathBuf {
    let encoder = GzEncoder::new(File::create(path).unwrap(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, content) in entries {
        append(&mut builder, name, content);
    }
    builder.into_inner().unwrap().finish().unwrap();
    path.to_path_buf()
}

fn artifact(path: PathBuf) -> ResolvedArtifact {
    let locator = ArtifactLocator::new(path.to_string_lossy());
    ResolvedArtifact::new(locator, path)
}

#[rstest]
#[case::bundle_tar("b.tar", false, "MODHOST-INF/module.json", "bundle")]
#[case::bundle_tgz("b.tar.gz", true, "MODHOST-INF/module.json", "bundle")]
#[case::application_tar("a.tar", false, "MODHOST-INF/application.json", "application")]
#[case::dot_slash_entry("d.tar", false, "./MODHOST-INF/module.json", "bundle")]
fn test_archive_claimed_by_matching_handler(
    #[case] file: &str,
    #[case] gzip: bool,
    #[case] entry: &str,
    #[case] expected: &str,
) {
    let dir = tempfile::tempdir().unwrap();
    let entries: &[(&str, &[u8])] = &[(entry, b"{}"), ("lib/code.bin", b"\x01\x02")];
    let path = if gzip {
        write_tar_gz(&dir.path().join(file), entries)
    } else {
        write_tar(&dir.path().join(file), entries)
    };

    let dispatcher = ModuleDispatcher::with_builtins(80);
    let names: Vec<_> = dispatcher
        .claimants(&artifact(path), None)
        .iter()
        .map(|h| h.name().to_string())
        .collect();

    assert_eq!(names, vec![expected.to_string()]);
}

#[test]
fn test_bundle_installs_with_start_level() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_tar(
        &dir.path().join("b.tar"),
        &[("MODHOST-INF/module.json", br#"{"name":"core","start_level":40}"#)],
    );
    let runtime = LocalRuntime::new();
    let dispatcher = ModuleDispatcher::with_builtins(80);

    let handles = dispatcher
        .dispatch(&runtime, &artifact(path), None, &Properties::new())
        .unwrap();

    assert_eq!(handles.len(), 1);
    assert_eq!(
        runtime.modules()[0].kind,
        ModuleKind::Bundle { start_level: 40 }
    );
}

#[test]
fn test_dual_manifest_archive_is_installed_twice() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_tar(
        &dir.path().join("both.tar"),
        &[
            ("MODHOST-INF/module.json", b"{}"),
            ("MODHOST-INF/application.json", br#"{"name":"web"}"#),
        ],
    );
    let runtime = LocalRuntime::new();
    let dispatcher = ModuleDispatcher::with_builtins(80);

    let handles = dispatcher
        .dispatch(&runtime, &artifact(path), None, &Properties::new())
        .unwrap();

    // Non-exclusive dispatch: one install per claiming handler.
    assert_eq!(handles.len(), 2);
    let kinds: Vec<_> = runtime.modules().into_iter().map(|m| m.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ModuleKind::Bundle { start_level: 80 },
            ModuleKind::Application { name: "web".into() },
        ]
    );
}

#[test]
fn test_type_hint_narrows_handlers() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_tar(
        &dir.path().join("both.tar"),
        &[
            ("MODHOST-INF/module.json", b"{}"),
            ("MODHOST-INF/application.json", b"{}"),
        ],
    );
    let runtime = LocalRuntime::new();
    let dispatcher = ModuleDispatcher::with_builtins(80);

    let handles = dispatcher
        .dispatch(&runtime, &artifact(path.clone()), Some("application"), &Properties::new())
        .unwrap();
    assert_eq!(handles.len(), 1);
    assert_eq!(runtime.modules()[0].kind.label(), "application");

    let none = dispatcher
        .dispatch(&runtime, &artifact(path), Some("wasm"), &Properties::new())
        .unwrap();
    assert!(none.is_empty());
}

#[test]
fn test_unknown_type_hint_falls_back_to_every_handler() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_tar(&dir.path().join("core.tar"), &[("MODHOST-INF/module.json", b"{}")]);
    let runtime = LocalRuntime::new();
    let dispatcher = ModuleDispatcher::with_builtins(80);

    let handles = dispatcher
        .dispatch(&runtime, &artifact(path), Some("osgi"), &Properties::new())
        .unwrap();

    assert_eq!(handles.len(), 1);
    assert_eq!(runtime.modules()[0].kind, ModuleKind::Bundle { start_level: 80 });
}

#[test]
fn test_type_hint_ignores_case() {
    let dispatcher = ModuleDispatcher::with_builtins(80);
    assert_eq!(dispatcher.handler("WASM").map(|h| h.name()), Some("wasm"));
    assert!(dispatcher.handler("osgi").is_none());
}

#[test]
fn test_unrecognised_file_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.json");
    std::fs::write(&path, br#"{"name":"x"}"#).unwrap();
    let runtime = LocalRuntime::new();

    let handles = ModuleDispatcher::with_builtins(80)
        .dispatch(&runtime, &artifact(path), None, &Properties::new())
        .unwrap();

    assert!(handles.is_empty());
    assert!(runtime.is_empty());
}

#[test]
fn test_properties_reach_runtime() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("m.wasm");
    std::fs::write(&path, b"\0asm\x01\0\0\0").unwrap();
    let runtime = LocalRuntime::new();
    let mut props = Properties::new();
    props.insert("memory".into(), json!(64));

    ModuleDispatcher::with_builtins(80)
        .dispatch(&runtime, &artifact(path), None, &props)
        .unwrap();

    assert_eq!(runtime.modules()[0].properties, props);
}

#[test]
fn test_invalid_manifest_fails_install() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_tar(
        &dir.path().join("bad.tar"),
        &[("MODHOST-INF/module.json", b"{ not json")],
    );
    let runtime = LocalRuntime::new();

    let err = ModuleDispatcher::with_builtins(80)
        .dispatch(&runtime, &artifact(path), None, &Properties::new())
        .unwrap_err();

    assert!(matches!(err, Error::InvalidManifest { .. }), "got {err:?}");
    assert!(runtime.is_empty());
}

#[test]
fn test_remove_uninstalls_all_units() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_tar(
        &dir.path().join("both.tar"),
        &[
            ("MODHOST-INF/module.json", b"{}"),
            ("MODHOST-INF/application.json", b"{}"),
        ],
    );
    let artifact = artifact(path);
    let runtime = LocalRuntime::new();
    let dispatcher = ModuleDispatcher::with_builtins(80);
    dispatcher
        .dispatch(&runtime, &artifact, None, &Properties::new())
        .unwrap();

    dispatcher.remove(&runtime, &artifact.locator).unwrap();

    assert!(!runtime.contains(&artifact.locator));
    let err = dispatcher.remove(&runtime, &artifact.locator).unwrap_err();
    assert!(matches!(
        err,
        Error::Runtime(RuntimeError::NotInstalled { .. })
    ));
}
