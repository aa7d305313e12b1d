//! # Clipboard
//!
//! Copies text to the system clipboard through whichever backend is
//! available at the moment of the call:
//!
//! 1. **Native** (`arboard`): used whenever a platform clipboard can be opened.
//! 2. **OSC 52**: otherwise, an escape sequence asks the terminal emulator to
//!    set the clipboard. Works over SSH on terminals that support it and
//!    prints nothing visible.
//!
//! Callers only ever see `true` or `false`; failures are logged here.

use std::fmt;
use std::io::{self, Write};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::{debug, warn};

#[derive(Debug)]
pub enum ClipboardError {
    /// The platform clipboard rejected the write.
    Native(String),
    /// Writing the escape sequence to the terminal failed.
    Io(io::Error),
}

impl fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipboardError::Native(msg) => write!(f, "native clipboard error: {msg}"),
            ClipboardError::Io(e) => write!(f, "terminal clipboard error: {e}"),
        }
    }
}

impl std::error::Error for ClipboardError {}

/// One way of putting text on the clipboard.
pub trait ClipboardBackend: Send {
    fn name(&self) -> &'static str;

    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Platform clipboard via `arboard`.
pub struct NativeClipboard {
    inner: arboard::Clipboard,
}

impl NativeClipboard {
    /// Opens the platform clipboard, or `None` if there isn't one
    /// (headless session, no display server).
    pub fn probe() -> Option<Box<dyn ClipboardBackend>> {
        match arboard::Clipboard::new() {
            Ok(inner) => Some(Box::new(NativeClipboard { inner })),
            Err(e) => {
                debug!("Native clipboard unavailable: {}", e);
                None
            }
        }
    }
}

impl ClipboardBackend for NativeClipboard {
    fn name(&self) -> &'static str {
        "native"
    }

    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.inner
            .set_text(text.to_owned())
            .map_err(|e| ClipboardError::Native(e.to_string()))
    }
}

/// Terminal clipboard via the OSC 52 escape sequence.
pub struct Osc52Clipboard {
    out: Box<dyn Write + Send>,
}

impl Osc52Clipboard {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self { out }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }
}

/// `ESC ] 52 ; c ; <base64> BEL`
pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text))
}

impl ClipboardBackend for Osc52Clipboard {
    fn name(&self) -> &'static str {
        "osc52"
    }

    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.out
            .write_all(osc52_sequence(text).as_bytes())
            .and_then(|_| self.out.flush())
            .map_err(ClipboardError::Io)
    }
}

type Probe = Box<dyn FnMut() -> Option<Box<dyn ClipboardBackend>> + Send>;

/// Picks a backend per call and reports success as a plain boolean.
///
/// The primary backend is probed on each write until one opens; the open
/// handle is then kept, since some platforms drop clipboard contents along
/// with the handle that set them. A failed primary write discards it.
pub struct ClipboardService {
    probe: Probe,
    primary: Option<Box<dyn ClipboardBackend>>,
    fallback: Box<dyn ClipboardBackend>,
}

impl ClipboardService {
    pub fn new(probe: Probe, fallback: Box<dyn ClipboardBackend>) -> Self {
        Self {
            probe,
            primary: None,
            fallback,
        }
    }

    /// Native clipboard first, OSC 52 on stdout when there is none.
    pub fn system() -> Self {
        Self::new(
            Box::new(NativeClipboard::probe),
            Box::new(Osc52Clipboard::stdout()),
        )
    }

    pub fn write(&mut self, text: &str) -> bool {
        if self.primary.is_none() {
            self.primary = (self.probe)();
        }

        let used_primary = self.primary.is_some();
        let (backend, result) = match self.primary.as_mut() {
            Some(primary) => (primary.name(), primary.set_text(text)),
            None => (self.fallback.name(), self.fallback.set_text(text)),
        };

        match result {
            Ok(()) => {
                debug!("Copied {} bytes via {} clipboard", text.len(), backend);
                true
            }
            Err(e) => {
                warn!("Copy failed via {} clipboard: {}", backend, e);
                if used_primary {
                    self.primary = None;
                }
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{BrokenClipboard, MemoryClipboard, SharedBuffer};

    #[test]
    fn test_osc52_sequence_format() {
        assert_eq!(osc52_sequence("hi"), "\x1b]52;c;aGk=\x07");
    }

    #[test]
    fn test_osc52_backend_writes_sequence() {
        let buffer = SharedBuffer::default();
        let mut backend = Osc52Clipboard::new(Box::new(buffer.clone()));
        backend.set_text("Hội An").unwrap();
        assert_eq!(buffer.contents(), osc52_sequence("Hội An"));
    }

    #[test]
    fn test_uses_primary_when_available() {
        let primary = MemoryClipboard::default();
        let fallback = MemoryClipboard::default();
        let handle = primary.clone();
        let mut service = ClipboardService::new(
            Box::new(move || Some(Box::new(handle.clone()) as Box<dyn ClipboardBackend>)),
            Box::new(fallback.clone()),
        );

        assert!(service.write("Old Quarter"));
        assert_eq!(primary.writes(), vec!["Old Quarter"]);
        assert!(fallback.writes().is_empty());
    }

    #[test]
    fn test_falls_back_when_primary_absent() {
        let fallback = MemoryClipboard::default();
        let mut service = ClipboardService::new(Box::new(|| None), Box::new(fallback.clone()));

        assert!(service.write("Mekong Delta"));
        assert_eq!(fallback.writes(), vec!["Mekong Delta"]);
    }

    #[test]
    fn test_osc52_fallback_end_to_end() {
        let buffer = SharedBuffer::default();
        let mut service = ClipboardService::new(
            Box::new(|| None),
            Box::new(Osc52Clipboard::new(Box::new(buffer.clone()))),
        );
        assert!(service.write("hi"));
        assert_eq!(buffer.contents(), "\x1b]52;c;aGk=\x07");
    }

    #[test]
    fn test_primary_failure_reports_false_and_does_not_fall_back() {
        let fallback = MemoryClipboard::default();
        let mut service = ClipboardService::new(
            Box::new(|| Some(Box::new(BrokenClipboard) as Box<dyn ClipboardBackend>)),
            Box::new(fallback.clone()),
        );

        assert!(!service.write("Sapa"));
        assert!(fallback.writes().is_empty());
    }

    #[test]
    fn test_fallback_failure_reports_false() {
        let mut service = ClipboardService::new(Box::new(|| None), Box::new(BrokenClipboard));
        assert!(!service.write("Sapa"));
    }

    #[test]
    fn test_primary_is_reprobed_after_failure() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        let probes = Arc::new(AtomicUsize::new(0));
        let counter = probes.clone();
        let mut service = ClipboardService::new(
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Some(Box::new(BrokenClipboard) as Box<dyn ClipboardBackend>)
            }),
            Box::new(MemoryClipboard::default()),
        );

        service.write("a");
        service.write("b");
        assert_eq!(probes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_open_primary_is_reused() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        let probes = Arc::new(AtomicUsize::new(0));
        let counter = probes.clone();
        let primary = MemoryClipboard::default();
        let handle = primary.clone();
        let mut service = ClipboardService::new(
            Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Some(Box::new(handle.clone()) as Box<dyn ClipboardBackend>)
            }),
            Box::new(MemoryClipboard::default()),
        );

        assert!(service.write("a"));
        assert!(service.write("b"));
        assert_eq!(probes.load(Ordering::SeqCst), 1);
        assert_eq!(primary.writes(), vec!["a", "b"]);
    }
}
