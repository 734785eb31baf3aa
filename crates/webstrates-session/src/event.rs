//! 세션 이벤트.
//!
//! 편집기, 서버 링크, 원격 문서, 타이머에서 오는 통지를 하나의 큐로 모은다.
//! 컨트롤러는 이 큐를 순서대로 처리하므로 상태 전이가 직렬화된다.

use std::fmt;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use webstrates_core::error::CoreError;
use webstrates_core::models::document::LocalDocument;
use webstrates_core::models::event::{DocumentEvent, LinkEvent};
use webstrates_core::ports::sync::RemoteDocument;

use crate::server_session::ConnectionState;

/// 호스트 편집기 이벤트
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    /// 문서 열림
    DocumentOpened(LocalDocument),
    /// 문서 저장됨
    DocumentSaved(LocalDocument),
    /// 문서 닫힘
    DocumentClosed(LocalDocument),
    /// 포커스 변경 (`None`이면 포커스된 문서 없음)
    FocusChanged(Option<LocalDocument>),
    /// Webstrate 요청 (`target`이 없으면 `<workspace>/<id>`에 생성)
    RequestWebstrate {
        id: String,
        target: Option<LocalDocument>,
    },
    /// 워크스페이스 설정 파일 생성
    InitWorkspace,
}

/// 컨트롤러 상태 스냅샷
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// 연결 상태
    pub connection: ConnectionState,
    /// 연결 세대
    pub connection_generation: u64,
    /// 서버 주소
    pub address: Option<String>,
    /// 포커스된 문서
    pub focused: Option<LocalDocument>,
    /// 바인딩된 문서
    pub bound: Option<LocalDocument>,
    /// 살아 있는 문서 구독 수
    pub live_subscriptions: usize,
}

/// 컨트롤러 내부 이벤트
pub(crate) enum SessionEvent {
    Editor(EditorEvent),
    Link {
        generation: u64,
        event: LinkEvent,
    },
    ReconnectDue {
        generation: u64,
    },
    Resolved {
        generation: u64,
        document: LocalDocument,
        result: Result<Arc<dyn RemoteDocument>, CoreError>,
    },
    Document {
        generation: u64,
        event: DocumentEvent,
    },
    Snapshot(oneshot::Sender<SessionSnapshot>),
    Shutdown(oneshot::Sender<()>),
}

impl fmt::Debug for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionEvent::Editor(event) => f.debug_tuple("Editor").field(event).finish(),
            SessionEvent::Link { generation, event } => f
                .debug_struct("Link")
                .field("generation", generation)
                .field("event", event)
                .finish(),
            SessionEvent::ReconnectDue { generation } => f
                .debug_struct("ReconnectDue")
                .field("generation", generation)
                .finish(),
            SessionEvent::Resolved {
                generation,
                document,
                result,
            } => f
                .debug_struct("Resolved")
                .field("generation", generation)
                .field("document", document)
                .field("found", &result.is_ok())
                .finish(),
            SessionEvent::Document { generation, event } => f
                .debug_struct("Document")
                .field("generation", generation)
                .field("event", event)
                .finish(),
            SessionEvent::Snapshot(_) => f.write_str("Snapshot"),
            SessionEvent::Shutdown(_) => f.write_str("Shutdown"),
        }
    }
}

/// 컨트롤러 내부 송신자
///
/// 약한 참조만 보유하므로 링크 통지기, 문서 구독, 타이머가 큐를 붙잡지 않는다.
/// 모든 [`ControllerHandle`](crate::ControllerHandle)이 드롭되면 큐가 닫히고 컨트롤러가 정리 후 종료한다.
#[derive(Clone)]
pub(crate) struct SessionSender(mpsc::WeakUnboundedSender<SessionEvent>);

impl SessionSender {
    pub(crate) fn new(tx: &mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self(tx.downgrade())
    }

    /// 이벤트 전달 (컨트롤러가 종료됐으면 `false`)
    pub(crate) fn send(&self, event: SessionEvent) -> bool {
        match self.0.upgrade() {
            Some(tx) => tx.send(event).is_ok(),
            None => false,
        }
    }
}
