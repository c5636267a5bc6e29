//! Dataset upload guards
//!
//! Local zip files are checked before anything is created server-side, and
//! the per-upload PUT target returned by the API is checked before any bytes
//! leave the machine.

use crate::error::{Error, Result};
use crate::observability::log_validation_error;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use url::Url;

/// Largest accepted dataset archive (1 GiB).
pub const MAX_ZIP_SIZE: u64 = 1024 * 1024 * 1024;

/// Local file header signature of a zip archive.
pub const ZIP_MAGIC: [u8; 4] = *b"PK\x03\x04";

/// Rules applied to dataset uploads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    /// Hosts (and their subdomains) an upload may be sent to
    pub allowed_hosts: Vec<String>,
    /// Reject upload URLs that are not HTTPS
    pub require_https: bool,
    /// Directory a zip file must live under; the working directory when unset
    pub root: Option<PathBuf>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            allowed_hosts: vec!["replicate.com".to_string(), "replicate.delivery".to_string()],
            require_https: true,
            root: None,
        }
    }
}

impl UploadPolicy {
    /// Allow an additional host.
    pub fn allow_host(mut self, host: impl Into<String>) -> Self {
        self.allowed_hosts.push(host.into());
        self
    }

    /// Toggle the HTTPS requirement.
    pub fn require_https(mut self, require: bool) -> Self {
        self.require_https = require;
        self
    }

    /// Restrict zip files to `root`.
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    fn host_allowed(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        self.allowed_hosts.iter().any(|allowed| {
            let allowed = allowed.to_ascii_lowercase();
            host == allowed || host.ends_with(&format!(".{allowed}"))
        })
    }
}

fn fail(field: &str, message: String) -> Error {
    log_validation_error(field, &message);
    Error::Validation(message)
}

/// Check a per-upload PUT target against the policy.
pub fn validate_upload_url(upload_url: &str, policy: &UploadPolicy) -> Result<Url> {
    if upload_url.trim().is_empty() {
        return Err(fail("upload_url", "Upload URL must be a non-empty string".into()));
    }
    let url = Url::parse(upload_url.trim())
        .map_err(|_| fail("upload_url", "Invalid upload URL format".into()))?;

    let scheme_ok = match url.scheme() {
        "https" => true,
        "http" => !policy.require_https,
        _ => false,
    };
    if !scheme_ok {
        return Err(fail("upload_url", "Upload URL must use HTTPS".into()));
    }

    match url.host_str() {
        Some(host) if policy.host_allowed(host) => Ok(url),
        _ => Err(fail(
            "upload_url",
            "Upload URL must be from allowed domain".into(),
        )),
    }
}

/// Validated zip archive ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipFile {
    /// Canonical path
    pub path: PathBuf,
    /// Size in bytes
    pub len: u64,
    /// Final path component
    pub filename: String,
}

/// Check a local dataset archive.
///
/// Checks run in order: non-empty path, existence, containment under the
/// policy root, regular file, `.zip` extension, size, magic bytes.
pub async fn validate_zip_file(zip_path: &Path, policy: &UploadPolicy) -> Result<ZipFile> {
    let display = zip_path.display().to_string();
    if display.trim().is_empty() {
        return Err(fail("zip_path", "Zip path must be a non-empty string".into()));
    }

    if !tokio::fs::try_exists(zip_path).await.unwrap_or(false) {
        return Err(fail("zip_path", format!("Zip file does not exist: {display}")));
    }

    let canonical = tokio::fs::canonicalize(zip_path).await?;
    let root = match &policy.root {
        Some(root) => root.clone(),
        None => std::env::current_dir()?,
    };
    let root = tokio::fs::canonicalize(&root).await?;
    if !canonical.starts_with(&root) {
        return Err(fail(
            "zip_path",
            "Zip path contains invalid characters or path traversal".into(),
        ));
    }

    let metadata = tokio::fs::metadata(&canonical).await?;
    if !metadata.is_file() {
        return Err(fail("zip_path", format!("Path is not a file: {display}")));
    }

    let is_zip = canonical
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
    if !is_zip {
        return Err(fail("zip_path", "File must have .zip extension".into()));
    }

    let len = metadata.len();
    if len > MAX_ZIP_SIZE {
        return Err(fail(
            "zip_path",
            format!("Zip file too large (max 1GB): {len} bytes"),
        ));
    }

    let mut magic = [0u8; 4];
    let read = async {
        let mut file = tokio::fs::File::open(&canonical).await?;
        file.read_exact(&mut magic).await.map(|_| ())
    }
    .await;
    match read {
        Ok(()) if magic == ZIP_MAGIC => {}
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(fail(
                "zip_path",
                "Cannot read zip file: permission denied".into(),
            ));
        }
        _ => return Err(fail("zip_path", "File is not a valid ZIP file".into())),
    }

    let filename = zip_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(ZipFile {
        path: canonical,
        len,
        filename,
    })
}
