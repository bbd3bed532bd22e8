#![cfg(unix)]

use std::sync::Arc;

use mockito::{Matcher, Server, ServerGuard};
use pvm_core::{Activation, GitHubRegistry, Installer, ReleaseCache, VersionResolver};
use pvm_platform::{Platform, ToolPaths};
use pvm_types::{PvmError, SystemClock};

fn release_tarball(version: &str) -> Vec<u8> {
    let encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, body) in [
        ("pulumi/pulumi", format!("pulumi {version}")),
        ("pulumi/pulumi-language-nodejs", format!("nodejs {version}")),
    ] {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Regular);
        header.set_size(body.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, name, body.as_bytes())
            .expect("tar entry should be written");
    }
    builder
        .into_inner()
        .expect("tar archive should be finalized")
        .finish()
        .expect("gzip stream should be finalized")
}

async fn serve_release(server: &mut ServerGuard, version: &str) {
    server
        .mock(
            "GET",
            format!("/download/v{version}/pulumi-v{version}-linux-x64.tar.gz").as_str(),
        )
        .with_status(200)
        .with_body(release_tarball(version))
        .create_async()
        .await;
}

#[tokio::test]
async fn install_use_remove_lifecycle() {
    let temp = tempfile::tempdir().expect("tempdir should be created");
    let paths = ToolPaths::with_root(temp.path());
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/releases")
        .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
        .with_status(200)
        .with_body(r#"[{"tag_name": "v3.80.0"}, {"tag_name": "v3.78.1"}, {"tag_name": "v3.78.0"}]"#)
        .create_async()
        .await;
    serve_release(&mut server, "3.78.1").await;
    serve_release(&mut server, "3.80.0").await;

    let client = reqwest::Client::new();
    let registry = GitHubRegistry::new(client.clone(), format!("{}/api", server.url()));
    let resolver = VersionResolver::new(ReleaseCache::new(
        paths.cache_file(),
        Arc::new(registry),
        Arc::new(SystemClock),
    ));
    let installer = Installer::new(client, paths.clone(), format!("{}/download", server.url()))
        .with_platform(Platform::new("linux", "amd64"));
    let activation = Activation::new(paths.clone());

    let version = resolver.resolve("3.78").await.expect("prefix should resolve");
    assert_eq!(version, "3.78.1");

    let dir = installer.install(&version).await.expect("install should succeed");
    assert_eq!(dir, paths.version_dir("3.78.1"));
    assert!(dir.join("pulumi").is_file());

    activation.activate("3.78.1").expect("use should succeed");
    let target = std::fs::read_link(paths.primary_binary()).expect("bin/pulumi should be a link");
    assert!(target.starts_with(std::path::absolute(paths.version_dir("3.78.1")).unwrap()));
    assert_eq!(
        activation.current_version().expect("current should succeed"),
        Some("3.78.1".to_string())
    );

    let error = activation.remove("3.78.1").expect_err("active version cannot be removed");
    assert_eq!(
        error,
        PvmError::InUse {
            version: "3.78.1".to_string()
        }
    );
    assert!(paths.version_dir("3.78.1").is_dir());

    installer.install("3.80.0").await.expect("second install should succeed");
    activation.activate("3.80.0").expect("switch should succeed");
    activation.remove("3.78.1").expect("inactive version should be removed");

    assert!(!paths.version_dir("3.78.1").exists());
    assert_eq!(
        std::fs::read_to_string(paths.primary_binary()).expect("active binary should resolve"),
        "pulumi 3.80.0"
    );
    assert_eq!(
        activation.installed_versions().expect("listing should succeed"),
        vec!["3.80.0".to_string()]
    );
}
