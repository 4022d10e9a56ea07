//! pdfium binding.
//!
//! `pdfium-render` loads the pdfium shared library at runtime. Resolution
//! order, first match wins:
//!
//! 1. `PipelineConfig::pdfium_lib_path`
//! 2. `PDFIUM_LIB_PATH`
//! 3. the platform library name in the executable's directory, then the CWD
//! 4. the system library search path

use crate::error::MarginError;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming an explicit pdfium library file.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Bind to pdfium, trying each location in turn.
pub fn bind_pdfium(explicit: Option<&Path>) -> Result<Pdfium, MarginError> {
    let mut failures = Vec::new();

    for candidate in candidate_paths(explicit) {
        if !candidate.exists() {
            continue;
        }
        match Pdfium::bind_to_library(&candidate) {
            Ok(bindings) => {
                debug!("Bound pdfium from {}", candidate.display());
                return Ok(Pdfium::new(bindings));
            }
            Err(e) => failures.push(format!("{}: {e}", candidate.display())),
        }
    }

    match Pdfium::bind_to_system_library() {
        Ok(bindings) => {
            debug!("Bound system pdfium library");
            Ok(Pdfium::new(bindings))
        }
        Err(e) => {
            failures.push(format!("system library: {e}"));
            Err(MarginError::PdfiumBindingFailed(failures.join("; ")))
        }
    }
}

/// Locations checked before falling back to the system library.
fn candidate_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(p) = explicit {
        paths.push(p.to_path_buf());
    }
    if let Ok(p) = std::env::var(PDFIUM_LIB_PATH_ENV) {
        if !p.is_empty() {
            paths.push(PathBuf::from(p));
        }
    }
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        paths.push(Pdfium::pdfium_platform_library_name_at_path(&dir));
    }
    paths.push(Pdfium::pdfium_platform_library_name_at_path("./"));

    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_is_tried_first() {
        let paths = candidate_paths(Some(Path::new("/opt/pdfium/libpdfium.so")));
        assert_eq!(paths[0], PathBuf::from("/opt/pdfium/libpdfium.so"));
    }

    #[test]
    fn platform_name_candidates_always_present() {
        let paths = candidate_paths(None);
        assert!(!paths.is_empty());
        let last = paths.last().unwrap().to_string_lossy().to_string();
        assert!(last.contains("pdfium"), "got: {last}");
    }
}
