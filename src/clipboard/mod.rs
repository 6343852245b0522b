use std::io::{self, Write};
use std::process::{Command, Stdio};

use thiserror::Error;

const WL_COPY_COMMAND: &str = "wl-copy";
const MIME_TEXT_PLAIN_UTF8: &str = "text/plain;charset=utf-8";
const MIME_IMAGE_PNG: &str = "image/png";

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("failed to run wl-copy command: {command}")]
    CommandIo {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {mime_type} payload to wl-copy: {source}")]
    WritePayload {
        mime_type: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("wl-copy exited with non-zero status: {status}")]
    CommandFailed { status: String },
    #[error("clipboard is unavailable: {message}")]
    Unavailable { message: String },
}

pub type ClipboardResult<T> = std::result::Result<T, ClipboardError>;

pub trait ClipboardBackend {
    fn copy_text(&self, text: &str) -> ClipboardResult<()>;
    fn copy_png(&self, png_data: &[u8]) -> ClipboardResult<()>;
}

impl<T: ClipboardBackend + ?Sized> ClipboardBackend for &T {
    fn copy_text(&self, text: &str) -> ClipboardResult<()> {
        (**self).copy_text(text)
    }

    fn copy_png(&self, png_data: &[u8]) -> ClipboardResult<()> {
        (**self).copy_png(png_data)
    }
}

/// Wayland clipboard through the `wl-copy` helper.
#[derive(Debug, Default)]
pub struct WlCopyBackend;

impl WlCopyBackend {
    fn pipe(&self, mime_type: &'static str, payload: &[u8]) -> ClipboardResult<()> {
        let mut child = Command::new(WL_COPY_COMMAND)
            .arg("--type")
            .arg(mime_type)
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|err| ClipboardError::CommandIo {
                command: WL_COPY_COMMAND.to_string(),
                source: err,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(payload)
                .map_err(|source| ClipboardError::WritePayload { mime_type, source })?;
        }

        let status = child.wait().map_err(|err| ClipboardError::CommandIo {
            command: WL_COPY_COMMAND.to_string(),
            source: err,
        })?;
        if status.success() {
            tracing::debug!(mime_type, bytes = payload.len(), "copied to clipboard");
            Ok(())
        } else {
            Err(ClipboardError::CommandFailed {
                status: status.to_string(),
            })
        }
    }
}

impl ClipboardBackend for WlCopyBackend {
    fn copy_text(&self, text: &str) -> ClipboardResult<()> {
        self.pipe(MIME_TEXT_PLAIN_UTF8, text.as_bytes())
    }

    fn copy_png(&self, png_data: &[u8]) -> ClipboardResult<()> {
        self.pipe(MIME_IMAGE_PNG, png_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingBackend {
        texts: RefCell<Vec<String>>,
        images: RefCell<Vec<usize>>,
    }

    impl ClipboardBackend for RecordingBackend {
        fn copy_text(&self, text: &str) -> ClipboardResult<()> {
            self.texts.borrow_mut().push(text.to_string());
            Ok(())
        }

        fn copy_png(&self, png_data: &[u8]) -> ClipboardResult<()> {
            self.images.borrow_mut().push(png_data.len());
            Ok(())
        }
    }

    #[test]
    fn borrowed_backend_forwards_to_inner_backend() {
        let backend = RecordingBackend::default();
        let borrowed = &backend;
        borrowed.copy_text("let x = 1;").expect("copy text");
        borrowed.copy_png(&[1, 2, 3]).expect("copy png");

        assert_eq!(backend.texts.borrow().as_slice(), ["let x = 1;"]);
        assert_eq!(backend.images.borrow().as_slice(), [3]);
    }

    #[test]
    fn command_error_contains_command_name() {
        let err = ClipboardError::CommandFailed {
            status: "exit status 1".to_string(),
        };
        assert!(format!("{err}").contains("wl-copy"));
    }

    #[test]
    fn write_error_names_mime_type() {
        let err = ClipboardError::WritePayload {
            mime_type: MIME_IMAGE_PNG,
            source: io::Error::from(io::ErrorKind::BrokenPipe),
        };
        assert!(format!("{err}").contains("image/png"));
    }
}
