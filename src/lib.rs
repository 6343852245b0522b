pub mod clipboard;
pub mod config;
pub mod error;
pub mod export;
pub mod geometry;
pub mod highlight;
pub mod layout;
pub mod logging;
pub mod notification;
pub mod raster;
pub mod storage;
pub mod style;
pub mod theme;
mod worker;

pub use error::{AppError, AppResult};
pub use export::{ActionStatus, ExportCoordinator, ExportedImage, Preview};
pub use highlight::{tokenize, LanguageId, Token, TokenKind};
pub use layout::{Layout, LayoutComposer};
pub use raster::{rasterize, RenderTarget, RenderedImage};
pub use style::StyleConfig;
