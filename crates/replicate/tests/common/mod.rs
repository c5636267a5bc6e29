//! Common test utilities and helpers

use replicate::http::RetryPolicy;
use replicate::upload::UploadPolicy;
use replicate::Client;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use wiremock::MockServer;

/// Test API token
pub const TEST_TOKEN: &str = "r8_test_token_0123456789";

/// Retry policy with millisecond backoff so retry tests stay fast
#[allow(dead_code)]
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy::builder()
        .initial_delay(Duration::from_millis(5))
        .max_delay(Duration::from_millis(20))
        .build()
}

/// Main API base URL on the mock server
#[allow(dead_code)]
pub fn api_base(server: &MockServer) -> String {
    format!("{}/v1", server.uri())
}

/// Training API base URL on the mock server
#[allow(dead_code)]
pub fn training_base(server: &MockServer) -> String {
    format!("{}/dreambooth/v1", server.uri())
}

/// Client pointing both endpoints at the mock server
#[allow(dead_code)]
pub fn client_for(server: &MockServer) -> Client {
    Client::builder()
        .api_token(TEST_TOKEN)
        .api_base_url(api_base(server))
        .training_base_url(training_base(server))
        .retry(fast_retry())
        .build()
        .expect("Failed to build client")
}

/// Client that also accepts plain-http uploads to the mock server, with zip
/// files confined to `root`
#[allow(dead_code)]
pub fn upload_client_for(server: &MockServer, root: &Path) -> Client {
    Client::builder()
        .api_token(TEST_TOKEN)
        .api_base_url(api_base(server))
        .training_base_url(training_base(server))
        .retry(fast_retry())
        .upload_policy(
            UploadPolicy::default()
                .allow_host("127.0.0.1")
                .require_https(false)
                .root(root),
        )
        .build()
        .expect("Failed to build client")
}

/// Write a small but valid-looking zip archive
#[allow(dead_code)]
pub fn write_zip(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).expect("create zip fixture");
    file.write_all(b"PK\x03\x04fixture-bytes").expect("write zip fixture");
    path
}
