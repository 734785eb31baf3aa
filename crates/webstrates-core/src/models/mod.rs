//! 도메인 모델.
//!
//! 로컬 문서, 링크/문서 이벤트, 서버 에러 코드.

pub mod document;
pub mod error_code;
pub mod event;
