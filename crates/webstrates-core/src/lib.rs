//! # webstrates-core
//!
//! Webstrates 도메인 모델, 포트(trait) 정의, 에러 타입, 워크스페이스 설정.
//! 세션 컨트롤러와 어댑터가 공유하는 핵심 타입과 인터페이스를 제공한다.
//!
//! ## 구조
//!
//! - [`models`]: 로컬 문서, 링크/문서 이벤트, 서버 에러 코드
//! - [`ports`]: 동기화 클라이언트, 상태 표시, 사용자 메시지 포트 (async_trait)
//! - [`error`]: 핵심 에러 타입 (thiserror)
//! - [`config`]: 워크스페이스 설정 구조체
//! - [`config_manager`]: `.webstrates/config.json` 로드/생성

pub mod config;
pub mod config_manager;
pub mod error;
pub mod models;
pub mod ports;
