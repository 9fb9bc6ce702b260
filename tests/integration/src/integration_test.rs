//! End-to-end tests for the bootstrap core
//!
//! These exercise the complete flow: locator -> resolver (repositories and
//! cache) -> descriptor reader -> extension manager -> dispatcher -> runtime.

use std::fs;
use std::sync::Arc;

use modhost_extensions::{Error, ExtensionManager, OrchestrationContext};
use modhost_modules::{LocalRuntime, ModuleDispatcher, ModuleKind, ModuleRuntime};
use modhost_resolver::{ArtifactLocator, ArtifactResolver};
use modhost_test_utils::{ArchiveBuilder, CountingFetcher, TestHost};
use pretty_assertions::assert_eq;
use serde_json::json;

const REMOTE: &str = "https://repo.example/maven2";

const PLATFORM: &str = "mvn:org.example/platform/2.0/tar.gz";
const CORE: &str = "mvn:org.example/core/1.0/json";
const BASE: &str = "mvn:org.example/base/1.0/tar";
const ENGINE: &str = "mvn:org.example/engine/1.0/wasm";
const WEB: &str = "mvn:org.example/web/1.0/tar";

const WASM: &[u8] = b"\0asm\x01\0\0\0";

/// URL of an `org.example` artifact in the remote repository.
fn remote_url(artifact: &str, version: &str, packaging: &str) -> String {
    format!("{REMOTE}/org/example/{artifact}/{version}/{artifact}-{version}.{packaging}")
}

fn manager(resolver: Arc<ArtifactResolver>, runtime: Arc<LocalRuntime>) -> ExtensionManager {
    let context = OrchestrationContext::new(
        resolver,
        Arc::new(ModuleDispatcher::with_builtins(80)),
        runtime,
    );
    ExtensionManager::new(context)
}

fn staged(host: &TestHost, name: &str, builder: &ArchiveBuilder, gzip: bool) -> Vec<u8> {
    let path = host.path(&format!("staging/{name}"));
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    if gzip {
        builder.write_tar_gz(&path);
    } else {
        builder.write_tar(&path);
    }
    fs::read(path).unwrap()
}

/// Serve a two-level graph from the remote repository:
///
/// ```text
/// platform (tar.gz, also a bundle)
///   extension: core (plain JSON)
///     module: base (bundle, start level 10)
///   module: engine (wasm)
///   module: web (application)
/// ```
fn serve_platform(host: &TestHost, fetcher: &CountingFetcher) {
    let platform = ArchiveBuilder::new().bundle_manifest().descriptor(&json!({
        "name": "platform",
        "version": "2.0",
        "extension": [CORE],
        "module": [
            { "location": ENGINE, "type": "wasm" },
            { "location": WEB, "type": "application" },
        ],
    }));
    let core = json!({
        "name": "core",
        "version": "1.0",
        "module": [
            { "location": BASE, "type": "bundle", "properties": { "start_level": 10 } },
        ],
    });

    fetcher.serve(
        &remote_url("platform", "2.0", "tar.gz"),
        &staged(host, "platform.tar.gz", &platform, true),
    );
    fetcher.serve(
        &remote_url("core", "1.0", "json"),
        &serde_json::to_vec(&core).unwrap(),
    );
    fetcher.serve(
        &remote_url("base", "1.0", "tar"),
        &staged(host, "base.tar", &ArchiveBuilder::new().bundle_manifest(), false),
    );
    fetcher.serve(&remote_url("engine", "1.0", "wasm"), WASM);
    fetcher.serve(
        &remote_url("web", "1.0", "tar"),
        &staged(host, "web.tar", &ArchiveBuilder::new().application_manifest("web"), false),
    );
}

#[test]
fn test_remote_graph_installs_in_dependency_order() {
    let host = TestHost::new();
    let fetcher = CountingFetcher::new();
    serve_platform(&host, &fetcher);
    let resolver = Arc::new(host.resolver_with(fetcher.clone(), &[REMOTE.to_string()]));
    let runtime = Arc::new(LocalRuntime::new());
    let manager = manager(resolver, runtime.clone());

    manager.load(&PLATFORM.into()).unwrap();

    assert_eq!(
        manager.installed(),
        vec![ArtifactLocator::new(CORE), ArtifactLocator::new(PLATFORM)]
    );
    let installed: Vec<(String, ModuleKind)> = runtime
        .modules()
        .into_iter()
        .map(|m| (m.locator.to_string(), m.kind))
        .collect();
    assert_eq!(
        installed,
        vec![
            (BASE.to_string(), ModuleKind::Bundle { start_level: 10 }),
            (ENGINE.to_string(), ModuleKind::Wasm),
            (
                WEB.to_string(),
                ModuleKind::Application {
                    name: "web".to_string()
                }
            ),
            (PLATFORM.to_string(), ModuleKind::Bundle { start_level: 80 }),
        ]
    );
    assert_eq!(fetcher.total_calls(), 5);
    for (artifact, version, packaging) in [
        ("platform", "2.0", "tar.gz"),
        ("core", "1.0", "json"),
        ("base", "1.0", "tar"),
        ("engine", "1.0", "wasm"),
        ("web", "1.0", "tar"),
    ] {
        assert_eq!(fetcher.calls(&remote_url(artifact, version, packaging)), 1);
    }
}

#[test]
fn test_cache_survives_a_new_host() {
    let host = TestHost::new();
    let fetcher = CountingFetcher::new();
    serve_platform(&host, &fetcher);
    let first = manager(
        Arc::new(host.resolver_with(fetcher.clone(), &[REMOTE.to_string()])),
        Arc::new(LocalRuntime::new()),
    );
    first.load(&PLATFORM.into()).unwrap();

    // Same cache directory, but a fetcher that serves nothing.
    let offline = CountingFetcher::new();
    let runtime = Arc::new(LocalRuntime::new());
    let second = manager(
        Arc::new(host.resolver_with(offline.clone(), &[REMOTE.to_string()])),
        runtime.clone(),
    );
    second.load(&PLATFORM.into()).unwrap();

    assert_eq!(offline.total_calls(), 0);
    assert_eq!(runtime.len(), 4);
    assert!(second.is_installed(&CORE.into()));
}

#[test]
fn test_recursive_remove_tears_down_remote_graph_without_fetching() {
    let host = TestHost::new();
    let fetcher = CountingFetcher::new();
    serve_platform(&host, &fetcher);
    let runtime = Arc::new(LocalRuntime::new());
    let manager = manager(
        Arc::new(host.resolver_with(fetcher.clone(), &[REMOTE.to_string()])),
        runtime.clone(),
    );
    manager.load(&PLATFORM.into()).unwrap();

    manager.remove(&PLATFORM.into(), true).unwrap();

    assert!(manager.installed().is_empty());
    assert!(runtime.is_empty());
    assert_eq!(fetcher.total_calls(), 5);
}

#[test]
fn test_local_repository_is_searched_before_remote() {
    let host = TestHost::new();
    host.wasm("repo/org/example/engine/1.0/engine-1.0.wasm");
    let fetcher = CountingFetcher::new();
    fetcher.serve(&remote_url("engine", "1.0", "wasm"), WASM);
    fetcher.serve(&remote_url("extra", "1.0", "wasm"), WASM);
    let ext = host.descriptor_json(
        "ext.json",
        &json!({
            "name": "mixed",
            "version": "1.0",
            "module": [
                { "location": "org.example:engine:1.0:wasm" },
                { "location": "mvn:org.example/extra/1.0/wasm" },
            ],
        }),
    );
    let repositories = [
        host.path("repo").to_string_lossy().into_owned(),
        REMOTE.to_string(),
    ];
    let runtime = Arc::new(LocalRuntime::new());
    let manager = manager(
        Arc::new(host.resolver_with(fetcher.clone(), &repositories)),
        runtime.clone(),
    );

    manager.load(&ext).unwrap();

    assert_eq!(runtime.len(), 2);
    assert_eq!(fetcher.calls(&remote_url("engine", "1.0", "wasm")), 0);
    assert_eq!(fetcher.calls(&remote_url("extra", "1.0", "wasm")), 1);
}

#[test]
fn test_missing_remote_module_aborts_load_and_caches_nothing() {
    let host = TestHost::new();
    let fetcher = CountingFetcher::new();
    let missing = "mvn:org.example/ghost/1.0/wasm";
    let ext = host.descriptor_json(
        "ext.json",
        &json!({
            "name": "haunted",
            "version": "1.0",
            "module": [{ "location": missing }],
        }),
    );
    let resolver = Arc::new(host.resolver_with(fetcher.clone(), &[REMOTE.to_string()]));
    let runtime = Arc::new(LocalRuntime::new());
    let manager = manager(resolver.clone(), runtime.clone());

    let err = manager.load(&ext).unwrap_err();

    match err {
        Error::ModuleNotFound {
            module, extension, ..
        } => {
            assert_eq!(module, missing);
            assert_eq!(extension, "haunted");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!manager.is_installed(&ext));
    assert!(runtime.is_empty());
    assert_eq!(fetcher.calls(&remote_url("ghost", "1.0", "wasm")), 1);
    assert!(
        resolver
            .cache()
            .get(&remote_url("ghost", "1.0", "wasm"))
            .is_none()
    );
}

#[test]
fn test_dual_manifest_module_is_installed_and_removed_as_both() {
    let host = TestHost::new();
    let both = host.archive(
        "both.tar",
        &ArchiveBuilder::new()
            .bundle_manifest()
            .application_manifest("console"),
    );
    let ext = host.descriptor("ext.json", "dual", "1.0", &[], &[&both]);
    let runtime = Arc::new(LocalRuntime::new());
    let manager = manager(Arc::new(host.resolver()), runtime.clone());

    manager.load(&ext).unwrap();

    let kinds: Vec<&'static str> = runtime.modules().iter().map(|m| m.kind.label()).collect();
    assert_eq!(kinds, vec!["bundle", "application"]);
    assert!(runtime.contains(&both));

    manager.remove(&ext, true).unwrap();

    assert!(runtime.is_empty());
    assert!(!manager.is_installed(&ext));
}

#[test]
fn test_gzip_extension_archive_from_a_plain_path() {
    let host = TestHost::new();
    let m = host.wasm("m.wasm");
    let path = host.path("packed.tar.gz");
    ArchiveBuilder::new()
        .descriptor(&json!({
            "name": "packed",
            "version": "3.1",
            "module": [{ "location": m.as_str(), "type": "wasm" }],
        }))
        .write_tar_gz(&path);
    let packed = host.locator("packed.tar.gz");
    let runtime = Arc::new(LocalRuntime::new());
    let manager = manager(Arc::new(host.resolver()), runtime.clone());

    manager.load(&packed).unwrap();

    let extension = manager.get(&packed).unwrap();
    assert_eq!(extension.name, "packed");
    assert_eq!(extension.version, "3.1");
    // The archive carries no module manifest, so only the wasm is installed.
    assert_eq!(runtime.len(), 1);
}

#[test]
fn test_concurrent_loads_share_one_inner_extension() {
    let host = TestHost::new();
    let fetcher = CountingFetcher::new();
    let shared_url = remote_url("shared", "1.0", "json");
    fetcher.serve(
        &shared_url,
        &serde_json::to_vec(&json!({
            "name": "shared",
            "version": "1.0",
            "module": [{ "location": ENGINE }],
        }))
        .unwrap(),
    );
    fetcher.serve(&remote_url("engine", "1.0", "wasm"), WASM);
    let shared = ArtifactLocator::new("mvn:org.example/shared/1.0/json");
    let left = host.descriptor("left.json", "left", "1.0", &[&shared], &[]);
    let right = host.descriptor("right.json", "right", "1.0", &[&shared], &[]);
    let runtime = Arc::new(LocalRuntime::new());
    let manager = manager(
        Arc::new(host.resolver_with(fetcher.clone(), &[REMOTE.to_string()])),
        runtime.clone(),
    );

    std::thread::scope(|scope| {
        for locator in [&left, &right] {
            let manager = &manager;
            scope.spawn(move || manager.load(locator).unwrap());
        }
    });

    assert_eq!(manager.installed().len(), 3);
    assert_eq!(runtime.len(), 1);
    assert_eq!(fetcher.calls(&shared_url), 1);
}
