//! 워크스페이스 설정 구조체.
//!
//! `.webstrates/config.json`에 저장되는 서버 주소, 재연결 정책, 로컬 파일 정리 설정.
//! 키 이름은 기존 설정 파일과 호환되도록 camelCase를 사용한다.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::CoreError;

/// 워크스페이스 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceConfig {
    /// Webstrates 서버 주소
    #[serde(default = "default_server_address")]
    pub server_address: String,
    /// 연결 끊김 시 자동 재연결 여부
    #[serde(default = "default_true")]
    pub reconnect: bool,
    /// 재연결 대기 시간 (밀리초)
    #[serde(default = "default_reconnect_timeout_ms")]
    pub reconnect_timeout: u64,
    /// 문서를 닫을 때 로컬 파일 삭제 여부
    #[serde(default)]
    pub delete_local_files_on_close: bool,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            server_address: default_server_address(),
            reconnect: true,
            reconnect_timeout: default_reconnect_timeout_ms(),
            delete_local_files_on_close: false,
        }
    }
}

impl WorkspaceConfig {
    /// 재연결 대기 시간
    pub fn reconnect_timeout(&self) -> Duration {
        Duration::from_millis(self.reconnect_timeout)
    }

    /// 재연결 정책
    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy {
            enabled: self.reconnect,
            timeout: self.reconnect_timeout(),
        }
    }

    /// 설정값 검증
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.server_address.trim().is_empty() {
            return Err(CoreError::Validation {
                field: "serverAddress".to_string(),
                message: "서버 주소가 비어 있음".to_string(),
            });
        }
        // 0ms 재연결은 끊김 직후 즉시 재시도를 반복한다
        if self.reconnect && self.reconnect_timeout == 0 {
            return Err(CoreError::Validation {
                field: "reconnectTimeout".to_string(),
                message: "재연결 활성화 시 0보다 커야 함".to_string(),
            });
        }
        Ok(())
    }
}

/// 재연결 정책: 고정 간격, 시도 횟수 제한 없음
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// 재연결 활성화 여부
    pub enabled: bool,
    /// 끊김 후 재연결까지 대기 시간
    pub timeout: Duration,
}

impl ReconnectPolicy {
    /// 재연결 비활성 정책
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            timeout: Duration::ZERO,
        }
    }
}

fn default_server_address() -> String {
    "ws://localhost:7007".to_string()
}

fn default_reconnect_timeout_ms() -> u64 {
    10_000
}

fn default_true() -> bool {
    true
}
