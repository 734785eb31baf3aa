//! 워크스페이스 설정 파일 관리.
//!
//! `<workspace>/.webstrates/config.json`을 로드/생성한다.
//! 설정은 호출할 때마다 파일에서 다시 읽는다 (편집기에서 저장하면 즉시 반영).

use crate::config::WorkspaceConfig;
use crate::error::CoreError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 워크스페이스 설정 디렉토리 이름
pub const CONFIG_DIR_NAME: &str = ".webstrates";

/// 설정 파일 이름
pub const CONFIG_FILE_NAME: &str = "config.json";

/// 설정 관리자
///
/// 워크스페이스가 열려 있지 않으면 항상 기본 설정을 반환한다.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    /// 워크스페이스 루트
    workspace_root: Option<PathBuf>,
}

impl ConfigManager {
    /// 워크스페이스 루트로 설정 관리자 생성
    pub fn new(workspace_root: Option<PathBuf>) -> Self {
        Self { workspace_root }
    }

    /// 워크스페이스 루트
    pub fn workspace_root(&self) -> Option<&Path> {
        self.workspace_root.as_deref()
    }

    /// 설정 파일 경로 (워크스페이스가 없으면 `None`)
    pub fn config_path(&self) -> Option<PathBuf> {
        self.workspace_root
            .as_ref()
            .map(|root| root.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// 주어진 경로가 워크스페이스 설정 파일인지 확인
    pub fn is_config_file(&self, path: &Path) -> bool {
        self.config_path().is_some_and(|config| config == path)
    }

    /// 설정 로드 및 검증
    ///
    /// 워크스페이스나 설정 파일이 없으면 기본 설정.
    pub fn load(&self) -> Result<WorkspaceConfig, CoreError> {
        let Some(path) = self.config_path() else {
            debug!("워크스페이스 없음 - 기본 설정 사용");
            return Ok(WorkspaceConfig::default());
        };

        if !path.exists() {
            debug!("설정 파일 없음 - 기본 설정 사용: {}", path.display());
            return Ok(WorkspaceConfig::default());
        }

        let config = Self::load_from_file(&path)?;
        config.validate()?;
        Ok(config)
    }

    /// 워크스페이스 초기화: 기본 설정 파일 생성
    ///
    /// 이미 설정 파일이 있으면 덮어쓰지 않고 `false`를 반환한다.
    pub fn init_workspace(&self) -> Result<bool, CoreError> {
        let path = self.config_path().ok_or(CoreError::NoWorkspace)?;

        if path.exists() {
            debug!("설정 파일 이미 존재: {}", path.display());
            return Ok(false);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                CoreError::Config(format!(
                    "설정 디렉토리 생성 실패: {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        Self::save_to_file(&path, &WorkspaceConfig::default())?;
        info!("기본 설정 파일 생성: {}", path.display());
        Ok(true)
    }

    /// 파일에서 설정 로드
    fn load_from_file(path: &Path) -> Result<WorkspaceConfig, CoreError> {
        let content = fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!("설정 파일 읽기 실패: {}: {}", path.display(), e))
        })?;

        let config: WorkspaceConfig = serde_json::from_str(&content).map_err(|e| {
            CoreError::Config(format!("설정 파일 파싱 실패: {}: {}", path.display(), e))
        })?;

        debug!("설정 파일 로드 완료: {}", path.display());
        Ok(config)
    }

    /// 파일에 설정 저장
    fn save_to_file(path: &Path, config: &WorkspaceConfig) -> Result<(), CoreError> {
        let content = serde_json::to_string_pretty(config)
            .map_err(|e| CoreError::Config(format!("설정 직렬화 실패: {}", e)))?;

        fs::write(path, content).map_err(|e| {
            CoreError::Config(format!("설정 파일 저장 실패: {}: {}", path.display(), e))
        })?;

        Ok(())
    }
}
