//! Export coordinator: the user-facing actions over the render pipeline.
//!
//! Tokenizing and composing happen on the calling thread; the same
//! [`Layout`] feeds the preview and the rasterizer. Every action reports one
//! [`ActionStatus`] and shows one desktop notification.

use std::path::PathBuf;

use serde::Serialize;

use crate::clipboard::{ClipboardBackend, WlCopyBackend};
use crate::config::{self, AppConfig};
use crate::error::{AppError, AppResult};
use crate::highlight::{tokenize_language, LanguageId, SyntectLexer, Token};
use crate::layout::{Layout, LayoutComposer, TextMeasure};
use crate::notification::{DesktopNotifier, Notifier};
use crate::raster::{self, CairoMetrics, RenderedImage};
use crate::storage::{self, ExportStorage};
use crate::style::StyleConfig;
use crate::worker::spawn_worker_action;

const EXPORT_SUCCEEDED: &str = "Image exported successfully!";
const EXPORT_FAILED: &str = "Error exporting image";
const CODE_COPIED: &str = "Code copied to clipboard!";
const CODE_COPY_FAILED: &str = "Error copying code";
const IMAGE_COPIED: &str = "Image copied to clipboard!";
const IMAGE_COPY_FAILED: &str = "Error copying image";

/// What the live preview shows for the current input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preview {
    pub language: LanguageId,
    pub tokens: Vec<Token>,
    pub layout: Layout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedImage {
    pub path: PathBuf,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionStatus {
    Succeeded(String),
    Failed(String),
}

impl ActionStatus {
    pub fn message(&self) -> &str {
        match self {
            Self::Succeeded(message) | Self::Failed(message) => message,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }

    fn from_result<T>(result: &AppResult<T>, succeeded: &str, failed: &str) -> Self {
        match result {
            Ok(_) => Self::Succeeded(succeeded.to_string()),
            Err(_) => Self::Failed(failed.to_string()),
        }
    }
}

pub struct ExportCoordinator<C, N, M = CairoMetrics> {
    lexer: SyntectLexer,
    composer: LayoutComposer<M>,
    storage: ExportStorage,
    font_family: String,
    clipboard: C,
    notifier: N,
}

impl ExportCoordinator<WlCopyBackend, DesktopNotifier, CairoMetrics> {
    /// Coordinator wired to `wl-copy`, desktop notifications and the user's
    /// `config.json`.
    pub fn with_default_paths() -> AppResult<Self> {
        Self::from_app_config(&config::load_app_config())
    }

    pub fn from_app_config(app_config: &AppConfig) -> AppResult<Self> {
        let storage = match &app_config.export_dir {
            Some(dir) => ExportStorage::with_dir(dir.clone()),
            None => ExportStorage::with_default_paths()?,
        };
        let metrics = CairoMetrics::new(&app_config.font_family)?;
        Ok(Self::new(
            LayoutComposer::new(metrics, app_config.container_width),
            storage,
            &app_config.font_family,
            WlCopyBackend,
            DesktopNotifier,
        ))
    }
}

impl<C, N, M> ExportCoordinator<C, N, M>
where
    C: ClipboardBackend,
    N: Notifier,
    M: TextMeasure,
{
    pub fn new(
        composer: LayoutComposer<M>,
        storage: ExportStorage,
        font_family: &str,
        clipboard: C,
        notifier: N,
    ) -> Self {
        Self {
            lexer: SyntectLexer::new(),
            composer,
            storage,
            font_family: font_family.to_string(),
            clipboard,
            notifier,
        }
    }

    pub fn storage(&self) -> &ExportStorage {
        &self.storage
    }

    pub fn render_preview(&self, source: &str, language_id: &str, config: &StyleConfig) -> Preview {
        let language = LanguageId::resolve(language_id);
        let tokens = tokenize_language(&self.lexer, source, language);
        let layout = self.composer.compose(&tokens, config, language, source);
        Preview {
            language,
            tokens,
            layout,
        }
    }

    /// Renders and writes `code-snippet-<ms>.png` into the export directory.
    pub fn export_image(
        &self,
        source: &str,
        language_id: &str,
        config: &StyleConfig,
        scale: f64,
    ) -> AppResult<ExportedImage> {
        let preview = self.render_preview(source, language_id, config);
        let result = write_export(&preview.layout, &self.font_family, &self.storage, scale);
        self.report(&result, EXPORT_SUCCEEDED, EXPORT_FAILED);
        result
    }

    /// Like [`Self::export_image`], but rasterizes and writes on a worker
    /// thread. `on_status` runs on the glib main context once the file is
    /// written or the export failed.
    pub fn spawn_export<F>(
        &self,
        source: &str,
        language_id: &str,
        config: &StyleConfig,
        scale: f64,
        mut on_status: F,
    ) where
        N: Clone + 'static,
        F: FnMut(ActionStatus) + 'static,
    {
        let layout = self.render_preview(source, language_id, config).layout;
        let font_family = self.font_family.clone();
        let storage = self.storage.clone();
        let notifier = self.notifier.clone();

        spawn_worker_action(
            move || write_export(&layout, &font_family, &storage, scale),
            move |result: AppResult<ExportedImage>| {
                let status = ActionStatus::from_result(&result, EXPORT_SUCCEEDED, EXPORT_FAILED);
                if let Err(err) = &result {
                    tracing::error!(?err, "export failed");
                }
                notifier.notify(status.message());
                on_status(status);
            },
        );
    }

    /// Copies the raw source text, not the rendered image.
    pub fn copy_source(&self, source: &str) -> AppResult<()> {
        let result = self.clipboard.copy_text(source).map_err(AppError::from);
        self.report(&result, CODE_COPIED, CODE_COPY_FAILED);
        result
    }

    pub fn copy_image(
        &self,
        source: &str,
        language_id: &str,
        config: &StyleConfig,
        scale: f64,
    ) -> AppResult<RenderedImage> {
        let preview = self.render_preview(source, language_id, config);
        let result = raster::rasterize_layout(&preview.layout, &self.font_family, scale)
            .map_err(AppError::from)
            .and_then(|image| {
                self.clipboard.copy_png(&image.png_data)?;
                Ok(image)
            });
        self.report(&result, IMAGE_COPIED, IMAGE_COPY_FAILED);
        result
    }

    fn report<T>(&self, result: &AppResult<T>, succeeded: &str, failed: &str) {
        if let Err(err) = result {
            tracing::error!(?err, action = failed, "action failed");
        }
        let status = ActionStatus::from_result(result, succeeded, failed);
        self.notifier.notify(status.message());
    }
}

fn write_export(
    layout: &Layout,
    font_family: &str,
    storage: &ExportStorage,
    scale: f64,
) -> AppResult<ExportedImage> {
    let image = raster::rasterize_layout(layout, font_family, scale)?;
    let unix_millis = storage::unix_millis_now()?;
    let path = storage.save_png(&image.png_data, unix_millis)?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| storage::export_file_name(unix_millis));
    Ok(ExportedImage {
        path,
        file_name,
        width: image.width,
        height: image.height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::{ClipboardError, ClipboardResult};
    use crate::highlight::TokenKind;
    use crate::layout::MonospaceMetrics;
    use crate::raster::{pixel_extent, DEFAULT_FONT_FAMILY};
    use std::cell::RefCell;

    #[derive(Default)]
    struct FakeClipboard {
        texts: RefCell<Vec<String>>,
        png_sizes: RefCell<Vec<usize>>,
        fail: bool,
    }

    impl ClipboardBackend for FakeClipboard {
        fn copy_text(&self, text: &str) -> ClipboardResult<()> {
            if self.fail {
                return Err(ClipboardError::Unavailable {
                    message: "no compositor".to_string(),
                });
            }
            self.texts.borrow_mut().push(text.to_string());
            Ok(())
        }

        fn copy_png(&self, png_data: &[u8]) -> ClipboardResult<()> {
            if self.fail {
                return Err(ClipboardError::Unavailable {
                    message: "no compositor".to_string(),
                });
            }
            self.png_sizes.borrow_mut().push(png_data.len());
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeNotifier {
        messages: RefCell<Vec<String>>,
    }

    impl Notifier for FakeNotifier {
        fn notify(&self, body: &str) {
            self.messages.borrow_mut().push(body.to_string());
        }
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir =
            std::env::temp_dir().join(format!("codeshot-export-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn coordinator<'a>(
        dir: PathBuf,
        clipboard: &'a FakeClipboard,
        notifier: &'a FakeNotifier,
    ) -> ExportCoordinator<&'a FakeClipboard, &'a FakeNotifier, MonospaceMetrics> {
        ExportCoordinator::new(
            LayoutComposer::default(),
            ExportStorage::with_dir(dir),
            DEFAULT_FONT_FAMILY,
            clipboard,
            notifier,
        )
    }

    #[test]
    fn preview_resolves_language_and_keeps_source_text() {
        let clipboard = FakeClipboard::default();
        let notifier = FakeNotifier::default();
        let coordinator = coordinator(scratch_dir("preview"), &clipboard, &notifier);

        let preview = coordinator.render_preview("print(1)", " Python ", &StyleConfig::default());
        assert_eq!(preview.language, LanguageId::Python);
        assert!(preview
            .tokens
            .contains(&Token::new(TokenKind::Function, "print")));
        assert_eq!(preview.layout.lines.len(), 1);
        assert_eq!(preview.layout.lines[0].text(), "print(1)");
        assert!(notifier.messages.borrow().is_empty());
    }

    #[test]
    fn export_writes_png_and_notifies_success() {
        let dir = scratch_dir("export");
        let clipboard = FakeClipboard::default();
        let notifier = FakeNotifier::default();
        let coordinator = coordinator(dir.clone(), &clipboard, &notifier);
        let config = StyleConfig::default();

        let exported = coordinator
            .export_image("print(1)", "python", &config, config.export_scale())
            .expect("export image");
        let layout = coordinator.render_preview("print(1)", "python", &config).layout;

        assert!(exported.file_name.starts_with("code-snippet-"));
        assert!(exported.file_name.ends_with(".png"));
        assert_eq!(exported.path, dir.join(&exported.file_name));
        assert_eq!(exported.width, pixel_extent(layout.width, 2.0));
        assert_eq!(exported.height, pixel_extent(layout.height, 2.0));

        let decoded = image::open(&exported.path).expect("decode export");
        assert_eq!(decoded.width(), exported.width);
        assert_eq!(
            notifier.messages.borrow().as_slice(),
            ["Image exported successfully!"]
        );
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn failed_export_notifies_error_and_leaves_no_file() {
        let dir = scratch_dir("export-fail");
        std::fs::create_dir_all(&dir).expect("create dir");
        // A regular file where the export directory should be.
        let blocked = dir.join("not-a-dir");
        std::fs::write(&blocked, b"").expect("create blocker");
        let clipboard = FakeClipboard::default();
        let notifier = FakeNotifier::default();
        let coordinator = coordinator(blocked.clone(), &clipboard, &notifier);

        let err = coordinator
            .export_image("x = 1", "python", &StyleConfig::default(), 2.0)
            .unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
        assert_eq!(notifier.messages.borrow().as_slice(), ["Error exporting image"]);
        assert!(blocked.is_file());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn back_to_back_exports_produce_distinct_files() {
        let dir = scratch_dir("back-to-back");
        let clipboard = FakeClipboard::default();
        let notifier = FakeNotifier::default();
        let coordinator = coordinator(dir.clone(), &clipboard, &notifier);
        let config = StyleConfig::default();

        let first = coordinator
            .export_image("a", "bash", &config, 1.0)
            .expect("first export");
        let second = coordinator
            .export_image("b", "bash", &config, 1.0)
            .expect("second export");

        assert_ne!(first.path, second.path);
        assert_eq!(second.path, dir.join(&second.file_name));
        assert!(first.path.is_file() && second.path.is_file());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn copy_source_copies_raw_text() {
        let clipboard = FakeClipboard::default();
        let notifier = FakeNotifier::default();
        let coordinator = coordinator(scratch_dir("copy"), &clipboard, &notifier);

        coordinator
            .copy_source("fn main() {}\n")
            .expect("copy source");
        assert_eq!(clipboard.texts.borrow().as_slice(), ["fn main() {}\n"]);
        assert_eq!(
            notifier.messages.borrow().as_slice(),
            ["Code copied to clipboard!"]
        );
    }

    #[test]
    fn clipboard_failure_is_reported_once() {
        let clipboard = FakeClipboard {
            fail: true,
            ..FakeClipboard::default()
        };
        let notifier = FakeNotifier::default();
        let coordinator = coordinator(scratch_dir("copy-fail"), &clipboard, &notifier);

        let err = coordinator.copy_source("x").unwrap_err();
        assert!(matches!(err, AppError::Clipboard(_)));
        assert_eq!(notifier.messages.borrow().as_slice(), ["Error copying code"]);
    }

    #[test]
    fn copy_image_puts_png_on_clipboard() {
        let clipboard = FakeClipboard::default();
        let notifier = FakeNotifier::default();
        let coordinator = coordinator(scratch_dir("copy-image"), &clipboard, &notifier);

        let image = coordinator
            .copy_image("SELECT 1;", "sql", &StyleConfig::default(), 1.0)
            .expect("copy image");
        assert_eq!(clipboard.png_sizes.borrow().as_slice(), [image.png_data.len()]);
        assert_eq!(
            notifier.messages.borrow().as_slice(),
            ["Image copied to clipboard!"]
        );
    }

    #[test]
    fn action_status_carries_message() {
        let ok: AppResult<()> = Ok(());
        let status = ActionStatus::from_result(&ok, "done", "broken");
        assert!(status.is_success());
        assert_eq!(status.message(), "done");
    }
}
