//! 서버 에러 코드와 사용자 알림 메시지.
//!
//! 서버가 보내는 문자열 코드를 닫힌 열거형으로 해석하고,
//! 각 코드의 메시지 템플릿과 심각도를 `match` 한 곳에서 정의한다.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 원격 문서 `error` 이벤트의 에러 객체
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RemoteError {
    /// 서버 에러 코드 (예: "AccessForbidden")
    #[serde(default)]
    pub code: Option<String>,
    /// 서버가 보낸 상세 메시지
    #[serde(default)]
    pub message: Option<String>,
}

impl RemoteError {
    /// 코드만 가진 에러 객체
    pub fn with_code(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: None,
        }
    }

    /// 알려진 에러 코드로 해석
    pub fn error_code(&self) -> Option<ErrorCode> {
        self.code.as_deref().and_then(ErrorCode::parse)
    }
}

/// 사용자에게 노출되는 서버 에러 코드
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// 문서 접근 거부
    AccessForbidden,
    /// 문서 없음
    WebstrateNotFound,
    /// 서버 내부 에러
    InternalServerError,
}

impl ErrorCode {
    /// 서버 코드 문자열 해석
    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "AccessForbidden" => Some(ErrorCode::AccessForbidden),
            "WebstrateNotFound" => Some(ErrorCode::WebstrateNotFound),
            "InternalServerError" => Some(ErrorCode::InternalServerError),
            _ => None,
        }
    }

    /// 서버 코드 문자열
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::AccessForbidden => "AccessForbidden",
            ErrorCode::WebstrateNotFound => "WebstrateNotFound",
            ErrorCode::InternalServerError => "InternalServerError",
        }
    }

    /// 문서 ID로 채운 사용자 알림
    pub fn notice(&self, document_id: &str) -> Notice {
        match self {
            ErrorCode::AccessForbidden => Notice::error(format!(
                "Access to webstrate '{document_id}' is forbidden."
            )),
            ErrorCode::WebstrateNotFound => {
                Notice::warning(format!("Webstrate '{document_id}' does not exist."))
            }
            ErrorCode::InternalServerError => {
                Notice::error("Internal server error.".to_string())
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 알림 심각도
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// 사용자 알림 메시지
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    /// 에러 객체가 없거나 코드를 알 수 없을 때의 알림
    pub fn unknown_error() -> Self {
        Self::error("Unknown Error")
    }
}
