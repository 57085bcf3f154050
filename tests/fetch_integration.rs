//! End-to-end tests of the discover-then-transfer pipeline.

mod support;

use solr_fetch::{FetchConfig, FetchError, ReplicationError, fetch_index};
use support::socket_guard::start_mock_server_or_skip;
use support::{
    GENERATION, VERSION, content, file_list_body, mount_file_content, mount_file_list,
    mount_index, mount_index_version, server_root, version_body,
};
use tempfile::TempDir;
use wiremock::ResponseTemplate;

#[tokio::test]
async fn test_fetch_writes_complete_file_set() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let segments = content(1, 245);
    let fdt = content(2, 70_000);
    let si = content(3, 0);
    let files: [(&str, &[u8]); 3] = [
        ("segments_d", segments.as_slice()),
        ("_8.fdt", fdt.as_slice()),
        ("_8.si", si.as_slice()),
    ];
    mount_index(&server, &files, 1).await;

    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("nested").join("data");
    let config = FetchConfig::new(server_root(&server), &output).with_worker_count(2);

    let report = fetch_index(&config).await.expect("fetch should succeed");

    assert_eq!(report.len(), 3);
    assert_eq!(report.non_success().count(), 0);
    assert_eq!(report.total_bytes(), 245 + 70_000);
    for (name, bytes) in files {
        assert_eq!(std::fs::read(output.join(name)).unwrap(), bytes, "{name}");
    }
}

#[tokio::test]
async fn test_fetch_twice_is_byte_identical() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let segments = content(9, 512);
    let doc = content(10, 33_333);
    let files: [(&str, &[u8]); 2] = [("segments_d", segments.as_slice()), ("_0.cfs", doc.as_slice())];
    mount_index(&server, &files, 2).await;

    let temp_dir = TempDir::new().unwrap();
    let config = FetchConfig::new(server_root(&server), temp_dir.path()).with_worker_count(1);

    fetch_index(&config).await.unwrap();
    let first: Vec<Vec<u8>> = files
        .iter()
        .map(|(name, _)| std::fs::read(temp_dir.path().join(name)).unwrap())
        .collect();

    fetch_index(&config).await.unwrap();
    let second: Vec<Vec<u8>> = files
        .iter()
        .map(|(name, _)| std::fs::read(temp_dir.path().join(name)).unwrap())
        .collect();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_failed_discovery_downloads_nothing() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_index_version(&server, version_body("1", VERSION, GENERATION)).await;
    mount_file_list(&server, file_list_body("0", &[("segments_d", 3)]), 0).await;
    mount_file_content(
        &server,
        "segments_d",
        ResponseTemplate::new(200).set_body_bytes(b"abc".to_vec()),
        0,
    )
    .await;

    let temp_dir = TempDir::new().unwrap();
    let config = FetchConfig::new(server_root(&server), temp_dir.path());

    let err = fetch_index(&config).await.unwrap_err();

    assert!(matches!(
        err,
        FetchError::Replication(ReplicationError::ProtocolStatus { .. })
    ));
    assert!(!temp_dir.path().join("segments_d").exists());
}

#[tokio::test]
async fn test_file_requests_use_discovered_generation() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    // Content mocks only match VERSION/GENERATION; any other pair would 404.
    let body = content(5, 100);
    mount_index(&server, &[("segments_d", body.as_slice())], 1).await;

    let temp_dir = TempDir::new().unwrap();
    let config = FetchConfig::new(server_root(&server), temp_dir.path());
    let report = fetch_index(&config).await.unwrap();

    let outcome = &report.outcomes()[0];
    assert_eq!(outcome.status, 200);
    assert!(outcome.source_url.contains("indexversion=1401508582278"));
    assert!(outcome.source_url.contains("generation=13"));
}
