use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use crate::handler::{Handler, Request, Response};

pub struct StaticFiles {
    base_dir: PathBuf,
}

impl StaticFiles {
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        Self {
            base_dir: base.into(),
        }
    }

    // Only plain path components may pass; `..`, roots, and prefixes are
    // rejected so the resolved path can never escape base_dir.
    fn map_path(&self, url_path: &str) -> Option<PathBuf> {
        let mut pb = self.base_dir.clone();
        for comp in Path::new(url_path.trim_start_matches('/')).components() {
            match comp {
                Component::Normal(s) => pb.push(s),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(pb)
    }

    fn content_type(path: &Path) -> &'static str {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase()
            .as_str()
        {
            "html" => "text/html",
            "css" => "text/css",
            "js" => "application/javascript",
            "json" => "application/json",
            "txt" => "text/plain",
            "svg" => "image/svg+xml",
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "ico" => "image/x-icon",
            "woff2" => "font/woff2",
            "wasm" => "application/wasm",
            _ => "application/octet-stream",
        }
    }

    pub fn load(&self, url_path: &str) -> io::Result<(Vec<u8>, &'static str)> {
        let path = self
            .map_path(url_path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "invalid path"))?;
        if !path.is_file() {
            return Err(io::Error::new(io::ErrorKind::NotFound, "file not found"));
        }
        let bytes = fs::read(&path)?;
        Ok((bytes, Self::content_type(&path)))
    }
}

/// Handler serving files for routes registered under a `{path...}` pattern.
///
/// Every failure (traversal attempt, missing file, unreadable file) maps to
/// a 404, never a 500.
pub struct StaticHandler {
    files: StaticFiles,
}

impl StaticHandler {
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        Self {
            files: StaticFiles::new(base),
        }
    }
}

impl Handler for StaticHandler {
    fn handle(&self, req: &mut Request, res: &mut Response) {
        let rel = req.get_path_param("path").unwrap_or_default();
        match self.files.load(rel) {
            Ok((bytes, content_type)) => {
                *res = Response::bytes(200, content_type, bytes);
            }
            Err(e) => {
                debug!(path = %rel, error = %e, "static file not served");
                *res = Response::error(404, "Not Found");
            }
        }
    }
}
