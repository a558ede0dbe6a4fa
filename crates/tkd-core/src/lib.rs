pub mod config;
pub mod logging;

pub mod credentials;
pub mod downloader;
pub mod error;
pub mod fetch_head;
pub mod report;
pub mod resume;
pub mod retry;
pub mod session;
pub mod storage;
pub mod url_model;
