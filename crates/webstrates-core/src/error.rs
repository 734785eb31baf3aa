//! Webstrates 핵심 에러 타입.
//!
//! 포트 구현체와 세션 컨트롤러는 모두 `CoreError`를 반환한다.

use thiserror::Error;

/// 코어 레이어 에러.
/// 설정, 유효성 검증, 원격 문서 해석 등 도메인 공통 에러를 정의한다.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// 필드 유효성 검증 실패
    #[error("유효성 검증 실패: {field}: {message}")]
    Validation {
        /// 검증 실패한 필드명
        field: String,
        /// 실패 사유
        message: String,
    },

    /// 리소스를 찾을 수 없음
    #[error("{resource_type} 미발견: {id}")]
    NotFound {
        /// 리소스 종류 (예: "Webstrate")
        resource_type: String,
        /// 리소스 식별자
        id: String,
    },

    /// 워크스페이스가 열려 있지 않음
    #[error("워크스페이스 없음")]
    NoWorkspace,

    /// 네트워크 에러: 동기화 클라이언트 구현체가 저장/닫기/요청 실패 시 반환
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 내부 에러 (예상치 못한 상황)
    #[error("내부 에러: {0}")]
    Internal(String),
}

impl CoreError {
    /// 원격 문서 미발견 에러 생성
    pub fn webstrate_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: "Webstrate".to_string(),
            id: id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_id() {
        let err = CoreError::webstrate_not_found("doc42");
        assert_eq!(err.to_string(), "Webstrate 미발견: doc42");
    }

    #[test]
    fn validation_message_names_field() {
        let err = CoreError::Validation {
            field: "serverAddress".to_string(),
            message: "비어 있음".to_string(),
        };
        assert_eq!(err.to_string(), "유효성 검증 실패: serverAddress: 비어 있음");
    }
}
