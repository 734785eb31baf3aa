//! 원격 동기화 클라이언트 포트.
//!
//! 와이어 프로토콜과 OT 병합은 클라이언트 구현체의 책임이다.
//! 세션 컨트롤러는 연결 수명주기와 문서 이벤트 구독만 다룬다.

use async_trait::async_trait;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::CoreError;
use crate::models::document::LocalDocument;
use crate::models::event::{DocumentEvent, DocumentEventKind, LinkEvent};

/// 링크 이벤트 통지기
///
/// 커넥터가 연결 하나마다 받아서, 연결 수립/끊김 시 호출한다.
#[derive(Clone)]
pub struct LinkNotifier {
    inner: Arc<dyn Fn(LinkEvent) + Send + Sync>,
}

impl LinkNotifier {
    pub fn new(f: impl Fn(LinkEvent) + Send + Sync + 'static) -> Self {
        Self { inner: Arc::new(f) }
    }

    /// 연결 수립 통지
    pub fn connected(&self) {
        (self.inner)(LinkEvent::Connected);
    }

    /// 연결 끊김 통지
    pub fn disconnected(&self) {
        (self.inner)(LinkEvent::Disconnected);
    }
}

impl fmt::Debug for LinkNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkNotifier").finish_non_exhaustive()
    }
}

/// 원격 문서 이벤트 수신기
#[derive(Clone)]
pub struct DocumentEventSink {
    inner: Arc<dyn Fn(DocumentEvent) + Send + Sync>,
}

impl DocumentEventSink {
    pub fn new(f: impl Fn(DocumentEvent) + Send + Sync + 'static) -> Self {
        Self { inner: Arc::new(f) }
    }

    /// 이벤트 전달
    pub fn emit(&self, event: DocumentEvent) {
        (self.inner)(event);
    }
}

impl fmt::Debug for DocumentEventSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentEventSink").finish_non_exhaustive()
    }
}

/// 구독 식별자: `subscribe`가 발급하고 `unsubscribe`로 반납
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// 원격 문서 핸들
pub trait RemoteDocument: Send + Sync {
    /// Webstrate ID
    fn id(&self) -> &str;

    /// 이벤트 종류 하나를 구독
    fn subscribe(&self, kind: DocumentEventKind, sink: DocumentEventSink) -> SubscriptionId;

    /// 구독 해제 (이미 해제된 ID는 무시)
    fn unsubscribe(&self, subscription: SubscriptionId);
}

/// 서버 연결 하나에 대한 동기화 클라이언트
#[async_trait]
pub trait SyncClient: Send + Sync {
    /// 로컬 문서에 대응하는 원격 문서 조회
    ///
    /// 서버에 문서가 없으면 `CoreError::NotFound`.
    async fn remote_document(
        &self,
        document: &LocalDocument,
    ) -> Result<Arc<dyn RemoteDocument>, CoreError>;

    /// Webstrate를 로컬 경로로 요청
    async fn request_document(&self, id: &str, local_path: &Path) -> Result<(), CoreError>;

    /// 로컬 문서 내용을 서버에 저장
    async fn save_document(&self, document: &LocalDocument) -> Result<(), CoreError>;

    /// 문서 닫기 (선택적으로 로컬 파일 삭제)
    async fn close_document(
        &self,
        document: &LocalDocument,
        delete_local_file: bool,
    ) -> Result<(), CoreError>;

    /// 연결 및 관련 리소스 해제
    ///
    /// 여러 번 호출해도 안전해야 한다.
    async fn dispose(&self, delete_local_files: bool);
}

/// 동기화 클라이언트 팩토리
pub trait SyncConnector: Send + Sync {
    /// 서버 주소로 새 연결을 연다
    ///
    /// 연결 결과는 `link`로 비동기 통지한다.
    fn open(&self, address: &str, link: LinkNotifier) -> Arc<dyn SyncClient>;
}
