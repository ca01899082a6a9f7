//! Food segmentation dashboard
//!
//! セグメンテーションAPIのクライアント・セッション・CLI

pub mod api;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod session;
pub mod source;
