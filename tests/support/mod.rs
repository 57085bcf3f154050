//! Mock replication endpoint shared by the integration tests.

#![allow(dead_code)]

pub mod socket_guard;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate, Times};

/// Core path the mock server pretends to host.
pub const CORE_PATH: &str = "/solr";

/// Replication handler below [`CORE_PATH`].
pub const REPLICATION_PATH: &str = "/solr/replication";

pub const VERSION: &str = "1401508582278";
pub const GENERATION: &str = "13";

/// Server root URL to hand to the resolver.
pub fn server_root(server: &MockServer) -> String {
    format!("{}{CORE_PATH}", server.uri())
}

pub fn version_body(status: &str, version: &str, generation: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<response>
<lst name="responseHeader"><int name="status">{status}</int><int name="QTime">0</int></lst>
<long name="indexversion">{version}</long>
<long name="generation">{generation}</long>
</response>"#
    )
}

/// A file-list body with a `filelist` group and an unrelated `confFiles` group.
pub fn file_list_body(status: &str, files: &[(&str, usize)]) -> String {
    let entries: String = files
        .iter()
        .map(|(name, size)| {
            format!(r#"<lst><str name="name">{name}</str><long name="size">{size}</long></lst>"#)
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<response>
<lst name="responseHeader"><int name="status">{status}</int><int name="QTime">1</int></lst>
<arr name="confFiles"><lst><str name="name">solrconfig.xml</str><long name="size">1</long></lst></arr>
<arr name="filelist">{entries}</arr>
</response>"#
    )
}

pub async fn mount_index_version(server: &MockServer, body: String) {
    Mock::given(method("GET"))
        .and(path(REPLICATION_PATH))
        .and(query_param("command", "indexversion"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// File list, only answered for the expected version and generation.
pub async fn mount_file_list(server: &MockServer, body: String, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(REPLICATION_PATH))
        .and(query_param("command", "filelist"))
        .and(query_param("indexversion", VERSION))
        .and(query_param("generation", GENERATION))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Raw content of one file, only answered for the expected version and generation.
pub async fn mount_file_content(
    server: &MockServer,
    name: &str,
    template: ResponseTemplate,
    expected_calls: impl Into<Times>,
) {
    Mock::given(method("GET"))
        .and(path(REPLICATION_PATH))
        .and(query_param("command", "filecontent"))
        .and(query_param("wt", "filestream"))
        .and(query_param("indexversion", VERSION))
        .and(query_param("generation", GENERATION))
        .and(query_param("file", name))
        .respond_with(template)
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Mounts all three commands for a healthy server hosting `files`.
pub async fn mount_index(server: &MockServer, files: &[(&str, &[u8])], expected_fetches: u64) {
    mount_index_version(server, version_body("0", VERSION, GENERATION)).await;

    let listing: Vec<(&str, usize)> = files.iter().map(|(name, bytes)| (*name, bytes.len())).collect();
    mount_file_list(server, file_list_body("0", &listing), expected_fetches).await;

    for (name, bytes) in files {
        mount_file_content(
            server,
            name,
            ResponseTemplate::new(200).set_body_bytes(bytes.to_vec()),
            expected_fetches,
        )
        .await;
    }
}

/// Deterministic pseudo-random content of `len` bytes.
pub fn content(seed: u8, len: usize) -> Vec<u8> {
    (0..len)
        .map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed))
        .collect()
}
