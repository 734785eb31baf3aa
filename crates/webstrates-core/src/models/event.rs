//! 링크 및 원격 문서 이벤트.

use std::fmt;

use crate::models::error_code::RemoteError;

/// 서버 링크 이벤트
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    /// 연결 수립
    Connected,
    /// 연결 끊김 (정상 종료와 실패를 구분하지 않음)
    Disconnected,
}

/// 원격 문서 이벤트 종류: 구독 단위
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentEventKind {
    Connect,
    Disconnect,
    New,
    Update,
    UpdateOp,
    Error,
}

impl DocumentEventKind {
    /// 바인딩 하나가 구독하는 전체 이벤트 종류
    pub const ALL: [DocumentEventKind; 6] = [
        DocumentEventKind::Connect,
        DocumentEventKind::Disconnect,
        DocumentEventKind::New,
        DocumentEventKind::Update,
        DocumentEventKind::UpdateOp,
        DocumentEventKind::Error,
    ];
}

impl fmt::Display for DocumentEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentEventKind::Connect => "connect",
            DocumentEventKind::Disconnect => "disconnect",
            DocumentEventKind::New => "new",
            DocumentEventKind::Update => "update",
            DocumentEventKind::UpdateOp => "update-op",
            DocumentEventKind::Error => "error",
        };
        f.write_str(name)
    }
}

/// 원격 문서 이벤트
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentEvent {
    /// 문서 연결
    Connect,
    /// 문서 연결 끊김
    Disconnect,
    /// 서버에 아직 없는 문서
    New,
    /// 내용 업데이트 수신
    Update,
    /// 구조 연산 수신
    UpdateOp,
    /// 서버 에러 (에러 객체가 없을 수 있음)
    Error(Option<RemoteError>),
}

impl DocumentEvent {
    /// 이벤트 종류
    pub fn kind(&self) -> DocumentEventKind {
        match self {
            DocumentEvent::Connect => DocumentEventKind::Connect,
            DocumentEvent::Disconnect => DocumentEventKind::Disconnect,
            DocumentEvent::New => DocumentEventKind::New,
            DocumentEvent::Update => DocumentEventKind::Update,
            DocumentEvent::UpdateOp => DocumentEventKind::UpdateOp,
            DocumentEvent::Error(_) => DocumentEventKind::Error,
        }
    }
}
