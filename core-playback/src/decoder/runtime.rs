//! # Codec Runtime
//!
//! Scoped handle around Symphonia's process-wide codec and probe registries,
//! plus the bookkeeping used to prove that every session and file handle is
//! released.
//!
//! The registries themselves are static and never torn down; `CodecRuntime`
//! checks that an MP3 decoder is registered when it is created and tracks how
//! many handles are alive process-wide.

use crate::decoder::session::DecodeSession;
use crate::error::{DecodeError, Result};
use parking_lot::Mutex;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use symphonia::core::codecs::CODEC_TYPE_MP3;
use symphonia::core::io::MediaSource;
use tracing::{debug, trace};

#[derive(Debug)]
struct RuntimeState {
    active: usize,
    initializations: u64,
}

static RUNTIME_STATE: Mutex<RuntimeState> = parking_lot::const_mutex(RuntimeState {
    active: 0,
    initializations: 0,
});

// ============================================================================
// Resource Accounting
// ============================================================================

/// Live resource counters for one decoder.
///
/// Incremented when a runtime handle, session or file is acquired and
/// decremented by the owning value's `Drop`, so the counts return to zero
/// however a decode ends.
#[derive(Debug, Default)]
pub struct ResourceLedger {
    runtimes: AtomicUsize,
    sessions: AtomicUsize,
    open_files: AtomicUsize,
}

/// Point-in-time copy of a [`ResourceLedger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResourceSnapshot {
    pub runtimes: usize,
    pub sessions: usize,
    pub open_files: usize,
}

impl ResourceSnapshot {
    /// Returns `true` when nothing is held.
    pub fn is_idle(&self) -> bool {
        self.runtimes == 0 && self.sessions == 0 && self.open_files == 0
    }
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ResourceSnapshot {
        ResourceSnapshot {
            runtimes: self.runtimes.load(Ordering::SeqCst),
            sessions: self.sessions.load(Ordering::SeqCst),
            open_files: self.open_files.load(Ordering::SeqCst),
        }
    }

    pub(crate) fn acquire_session(&self) {
        self.sessions.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn release_session(&self) {
        self.sessions.fetch_sub(1, Ordering::SeqCst);
    }
}

// ============================================================================
// Runtime Handle
// ============================================================================

/// Initialized codec runtime.
///
/// Sessions borrow the runtime, so it cannot be dropped while a session is
/// still open.
#[derive(Debug)]
pub struct CodecRuntime {
    ledger: Arc<ResourceLedger>,
}

impl CodecRuntime {
    /// Bring up the runtime for one decode.
    ///
    /// # Errors
    ///
    /// Returns `DecodeError::RuntimeInit` if no MP3 decoder is registered
    /// (for example when built without the `decoder-mp3` feature).
    pub fn init(ledger: Arc<ResourceLedger>) -> Result<Self> {
        if symphonia::default::get_codecs()
            .get_codec(CODEC_TYPE_MP3)
            .is_none()
        {
            return Err(DecodeError::RuntimeInit(
                "no MP3 decoder registered; enable the 'decoder-mp3' feature".to_string(),
            ));
        }

        let mut state = RUNTIME_STATE.lock();
        state.active += 1;
        state.initializations += 1;
        ledger.runtimes.fetch_add(1, Ordering::SeqCst);

        trace!(
            active = state.active,
            initializations = state.initializations,
            "Codec runtime initialized"
        );

        Ok(Self { ledger })
    }

    /// Runtime handles currently alive in this process.
    pub fn active_handles() -> usize {
        RUNTIME_STATE.lock().active
    }

    /// Open a decode session for the file at `path`.
    pub fn open_session(
        &self,
        path: &Path,
        max_consecutive_errors: usize,
    ) -> Result<DecodeSession<'_>> {
        DecodeSession::open(self, path, max_consecutive_errors)
    }

    pub(crate) fn ledger(&self) -> &Arc<ResourceLedger> {
        &self.ledger
    }
}

impl Drop for CodecRuntime {
    fn drop(&mut self) {
        let mut state = RUNTIME_STATE.lock();
        state.active = state.active.saturating_sub(1);
        self.ledger.runtimes.fetch_sub(1, Ordering::SeqCst);
        trace!(active = state.active, "Codec runtime released");
    }
}

// ============================================================================
// Tracked File Source
// ============================================================================

/// File handed to the codec, counted in the ledger until dropped.
pub(crate) struct TrackedFile {
    file: File,
    len: Option<u64>,
    ledger: Arc<ResourceLedger>,
}

impl TrackedFile {
    pub(crate) fn open(path: &Path, ledger: Arc<ResourceLedger>) -> io::Result<Self> {
        let file = File::open(path)?;
        let len = file.metadata().ok().map(|m| m.len());
        ledger.open_files.fetch_add(1, Ordering::SeqCst);
        debug!(?len, "Opened source file");
        Ok(Self { file, len, ledger })
    }
}

impl Read for TrackedFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Seek for TrackedFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }
}

impl MediaSource for TrackedFile {
    fn is_seekable(&self) -> bool {
        true
    }

    fn byte_len(&self) -> Option<u64> {
        self.len
    }
}

impl Drop for TrackedFile {
    fn drop(&mut self) {
        self.ledger.open_files.fetch_sub(1, Ordering::SeqCst);
        trace!("Closed source file");
    }
}
