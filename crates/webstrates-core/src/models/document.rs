//! 로컬 문서 모델.

use std::fmt;
use std::path::{Path, PathBuf};

/// 편집기에 열린 로컬 문서
///
/// Webstrate ID는 파일 이름이다 (`<workspace>/<id>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocalDocument {
    path: PathBuf,
}

impl LocalDocument {
    /// 경로로 문서 생성
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 파일 경로
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Webstrate ID (파일 이름)
    pub fn id(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl fmt::Display for LocalDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}
