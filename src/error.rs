// Copyright (c) 2026 rezky_nightky

use std::io;
use std::path::PathBuf;

/// Failures loading the font or shader assets. None of these are fatal: the
/// caller logs them and carries on with degraded visuals.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("font not found: {}", path.display())]
    FontNotFound { path: PathBuf },

    #[error("failed to read font {}: {source}", path.display())]
    FontUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read shader {}: {source}", path.display())]
    ShaderUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("shader {} declares no uniforms", path.display())]
    ShaderEmpty { path: PathBuf },
}
