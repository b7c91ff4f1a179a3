//! 대시보드 핵심 로직을 라이브러리로 분리하여 GUI와 CLI가 같은 컨트롤러를 쓴다.

pub mod app;
pub mod backend;
pub mod calculation;
pub mod config;
pub mod dashboard;
pub mod dates;
pub mod i18n;
pub mod inactivity;
pub mod numfmt;
pub mod porosity;
pub mod proportions;
pub mod regression;
pub mod results;
pub mod session;
pub mod startup;
pub mod table;
pub mod ui_cli;
