// SPDX-License-Identifier: MIT
//
// Terminal backends — the only code that touches the OS.
//
// Safety: the tty backend necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr), ioctl (TIOCGWINSZ) and raw fd writes. These are the POSIX
// interfaces for terminal control and have no safe std equivalent. Each
// unsafe block is minimal.
#![allow(unsafe_code)]
//
// The canvas needs four things from a terminal: its size in cells, a way in
// and out of raw mode, and a sink for bytes. `Backend` is exactly that, so
// the rasterizer core never names a platform.
//
// `TtyBackend` drives a POSIX terminal through a raw file descriptor. Raw
// mode here is lighter than cfmakeraw: output post-processing,
// canonical input, echo and extended input processing are turned off, but
// ISIG stays on so Ctrl-C still raises SIGINT and the frame loop can stop
// cleanly.
//
// A panic while the terminal is in raw mode on the alternate screen would
// leave the user's shell unusable and the panic message invisible. The tty
// backend installs a panic hook (once per process) that writes a restore
// sequence straight to the fd and puts the saved termios back before the
// original hook prints.
//
// `MemoryBackend` records every write separately. Tests use it to check
// that a frame leaves in exactly one write; it also renders frames without
// a terminal.

use std::io;

use crate::geometry::Size;

// ─── Backend ─────────────────────────────────────────────────────────────────

/// What a canvas needs from a terminal.
pub trait Backend {
    /// Current size in character cells.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the size cannot be determined.
    fn query_size(&mut self) -> io::Result<Size>;

    /// Switch to raw mode, remembering nothing beyond what was saved at
    /// construction.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the mode change fails.
    fn enter_raw_mode(&mut self) -> io::Result<()>;

    /// Put back the mode the terminal had when the backend was created.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the mode change fails.
    fn restore_mode(&mut self) -> io::Result<()>;

    /// Write all of `bytes`, as one logical write.
    ///
    /// # Errors
    ///
    /// Returns the OS error of the first failed write.
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()>;
}

impl<B: Backend + ?Sized> Backend for &mut B {
    fn query_size(&mut self) -> io::Result<Size> {
        (**self).query_size()
    }

    fn enter_raw_mode(&mut self) -> io::Result<()> {
        (**self).enter_raw_mode()
    }

    fn restore_mode(&mut self) -> io::Result<()> {
        (**self).restore_mode()
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        (**self).write_bytes(bytes)
    }
}

// ─── MemoryBackend ───────────────────────────────────────────────────────────

/// Headless backend that records what would have been sent to a terminal.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    size: Size,
    writes: Vec<Vec<u8>>,
    raw: bool,
    fail_writes: bool,
    fail_size: bool,
}

impl MemoryBackend {
    /// A backend reporting `size`.
    #[must_use]
    pub fn new(size: Size) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// Change the reported size, as a terminal resize would.
    pub const fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    /// Make every following write fail (or succeed again).
    pub const fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Make every following size query fail (or succeed again).
    pub const fn set_fail_size(&mut self, fail: bool) {
        self.fail_size = fail;
    }

    /// Whether raw mode is on.
    #[inline]
    #[must_use]
    pub const fn is_raw(&self) -> bool {
        self.raw
    }

    /// Every successful write, in order.
    #[inline]
    #[must_use]
    pub fn writes(&self) -> &[Vec<u8>] {
        &self.writes
    }

    /// The most recent successful write.
    #[must_use]
    pub fn last_write(&self) -> Option<&[u8]> {
        self.writes.last().map(Vec::as_slice)
    }

    /// All writes concatenated.
    #[must_use]
    pub fn output(&self) -> Vec<u8> {
        self.writes.concat()
    }

    /// Forget recorded writes.
    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }
}

impl Backend for MemoryBackend {
    fn query_size(&mut self) -> io::Result<Size> {
        if self.fail_size {
            return Err(io::Error::other("size query failed"));
        }
        Ok(self.size)
    }

    fn enter_raw_mode(&mut self) -> io::Result<()> {
        self.raw = true;
        Ok(())
    }

    fn restore_mode(&mut self) -> io::Result<()> {
        self.raw = false;
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        if self.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "write failed"));
        }
        self.writes.push(bytes.to_vec());
        Ok(())
    }
}

// ─── TtyBackend ──────────────────────────────────────────────────────────────

#[cfg(unix)]
pub use tty::TtyBackend;

#[cfg(unix)]
mod tty {
    use std::io;
    use std::os::unix::io::RawFd;
    use std::sync::{Mutex, Once};

    use super::Backend;
    use crate::geometry::Size;

    /// Restore sequence for the panic hook: default colors, cursor shown,
    /// alternate screen left last so the shell content comes back clean.
    const EMERGENCY_RESTORE: &[u8] = b"\x1b[0m\x1b[?25h\x1b[?1049l";

    /// Termios saved for the panic hook, which cannot reach the backend.
    static TERMIOS_BACKUP: Mutex<Option<(RawFd, libc::termios)>> = Mutex::new(None);

    static PANIC_HOOK_INSTALLED: Once = Once::new();

    fn install_panic_hook() {
        PANIC_HOOK_INSTALLED.call_once(|| {
            let original = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                if let Ok(guard) = TERMIOS_BACKUP.lock() {
                    if let Some((fd, ref termios)) = *guard {
                        unsafe {
                            let _ = libc::write(
                                fd,
                                EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
                                EMERGENCY_RESTORE.len(),
                            );
                            let _ = libc::tcsetattr(fd, libc::TCSANOW, termios);
                        }
                    }
                }
                original(info);
            }));
        });
    }

    fn set_backup(value: Option<(RawFd, libc::termios)>) {
        if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
            *guard = value;
        }
    }

    /// A POSIX terminal reached through a raw file descriptor.
    ///
    /// The descriptor is borrowed, not owned: dropping the backend does not
    /// close it.
    pub struct TtyBackend {
        fd: RawFd,
        original: libc::termios,
    }

    impl TtyBackend {
        /// Bind to `fd` and save its current termios.
        ///
        /// # Errors
        ///
        /// Fails if `fd` is not a terminal.
        pub fn new(fd: RawFd) -> io::Result<Self> {
            let mut original: libc::termios = unsafe { std::mem::zeroed() };
            if unsafe { libc::tcgetattr(fd, &raw mut original) } != 0 {
                return Err(io::Error::last_os_error());
            }
            Ok(Self { fd, original })
        }

        /// Bind to standard output.
        ///
        /// # Errors
        ///
        /// Fails if stdout is not a terminal.
        pub fn stdout() -> io::Result<Self> {
            Self::new(libc::STDOUT_FILENO)
        }

        /// The bound descriptor.
        #[inline]
        #[must_use]
        pub const fn fd(&self) -> RawFd {
            self.fd
        }
    }

    impl Backend for TtyBackend {
        fn query_size(&mut self) -> io::Result<Size> {
            let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
            if unsafe { libc::ioctl(self.fd, libc::TIOCGWINSZ, &raw mut ws) } != 0 {
                return Err(io::Error::last_os_error());
            }
            Ok(Size::new(ws.ws_col, ws.ws_row))
        }

        fn enter_raw_mode(&mut self) -> io::Result<()> {
            install_panic_hook();

            let mut termios = self.original;
            termios.c_oflag &= !libc::OPOST;
            termios.c_lflag &= !(libc::ICANON | libc::ECHO | libc::IEXTEN);

            if unsafe { libc::tcsetattr(self.fd, libc::TCSANOW, &raw const termios) } != 0 {
                return Err(io::Error::last_os_error());
            }
            set_backup(Some((self.fd, self.original)));
            Ok(())
        }

        fn restore_mode(&mut self) -> io::Result<()> {
            if unsafe { libc::tcsetattr(self.fd, libc::TCSANOW, &raw const self.original) } != 0 {
                return Err(io::Error::last_os_error());
            }
            set_backup(None);
            Ok(())
        }

        fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
            let mut rest = bytes;
            while !rest.is_empty() {
                let n = unsafe {
                    libc::write(self.fd, rest.as_ptr().cast::<libc::c_void>(), rest.len())
                };
                match usize::try_from(n) {
                    Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
                    Ok(written) => rest = &rest[written..],
                    Err(_) => {
                        let err = io::Error::last_os_error();
                        if err.kind() != io::ErrorKind::Interrupted {
                            return Err(err);
                        }
                    }
                }
            }
            Ok(())
        }
    }

    impl std::fmt::Debug for TtyBackend {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("TtyBackend").field("fd", &self.fd).finish_non_exhaustive()
        }
    }

}

// ─── Tests ───────────────────────────────────────────────────────────────────
