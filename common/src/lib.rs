//! Food Segmentation Common Library
//!
//! CLIとデスクトップで共有される型と状態機械（I/Oなし）

pub mod catalog;
pub mod error;
pub mod gallery;
pub mod history;
pub mod pagination;
pub mod render;
pub mod store;
pub mod types;
pub mod urls;

pub use catalog::{label_for, ModelOption, DEFAULT_MODEL};
pub use error::{Error, Result};
pub use gallery::{Gallery, GalleryItem, GalleryLoad, GalleryMode, GalleryTicket};
pub use history::{DetailView, FetchTicket, HistoryBrowser, ReplayRequest, LOGS_PAGE_SIZE};
pub use pagination::{PageNav, PaginationState};
pub use render::{ResultPanel, ResultView};
pub use store::{ReloadToken, ResultStore};
pub use types::{
    ErrorOrigin, ImagePayload, ImageVariant, LogEntry, LogPage, Prediction, SegmentResponse,
    SegmentationError, SegmentationResult,
};
pub use urls::ImageLocation;
