//! 사용자 메시지 포트.
//!
//! 구현: 호스트 편집기의 정보/경고/에러 메시지 창

use async_trait::async_trait;

use crate::error::CoreError;
use crate::models::error_code::{Notice, Severity};

/// 사용자 메시지 인터페이스
#[async_trait]
pub trait UserNotifier: Send + Sync {
    /// 정보 메시지 표시
    async fn show_info(&self, message: &str) -> Result<(), CoreError>;

    /// 경고 메시지 표시
    async fn show_warning(&self, message: &str) -> Result<(), CoreError>;

    /// 에러 메시지 표시
    async fn show_error(&self, message: &str) -> Result<(), CoreError>;

    /// 심각도에 맞는 창으로 알림 표시
    async fn show(&self, notice: &Notice) -> Result<(), CoreError> {
        match notice.severity {
            Severity::Info => self.show_info(&notice.message).await,
            Severity::Warning => self.show_warning(&notice.message).await,
            Severity::Error => self.show_error(&notice.message).await,
        }
    }
}
