//! # webstrates-session
//!
//! 로컬 문서를 Webstrates 서버와 동기화하는 클라이언트 측 세션 컨트롤러.
//!
//! ## 구조
//!
//! - [`timer`]: 재시작/취소 가능한 카운트다운 타이머
//! - [`status`]: 연결 상태/작업 상태 표시기
//! - [`server_session`]: 서버 연결과 재연결 정책
//! - [`binding`]: 포커스된 문서의 원격 이벤트 구독 관리
//! - [`controller`]: 위 구성요소를 와이어링하는 단일 이벤트 루프
//!
//! ## 사용
//!
//! 호스트 편집기는 [`SessionController::new`]로 컨트롤러와 [`ControllerHandle`]을 만들고,
//! `tokio::spawn(controller.run())` 후 핸들로 편집기 이벤트를 전달한다.

pub mod binding;
pub mod controller;
pub mod event;
pub mod server_session;
pub mod status;
pub mod timer;

pub use controller::{ControllerHandle, SessionController};
pub use event::{EditorEvent, SessionSnapshot};
pub use server_session::ConnectionState;
pub use status::StatusReporter;
