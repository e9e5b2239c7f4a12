// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Process signals — resize and interrupt notifications.
//
// Handlers only store `true` into an atomic, which is one of the few things
// a signal handler may do. Whoever polls calls `take_*`, which swaps the
// flag back to `false`, so each signal is observed once.
//
//   SIGWINCH         → resize flag
//   SIGINT, SIGTERM  → interrupt flag
//
// The frame loop forwards the resize flag into the canvas, whose own
// resize-pending flag is per canvas rather than per process.

use std::sync::atomic::{AtomicBool, Ordering};

static RESIZE_RECEIVED: AtomicBool = AtomicBool::new(false);
static INTERRUPT_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Install the SIGWINCH, SIGINT and SIGTERM handlers.
///
/// Safe to call more than once; later calls reinstall the same handlers.
#[cfg(unix)]
pub fn install_handlers() {
    install(libc::SIGWINCH, on_resize);
    install(libc::SIGINT, on_interrupt);
    install(libc::SIGTERM, on_interrupt);
}

#[cfg(not(unix))]
pub fn install_handlers() {}

#[cfg(unix)]
fn install(signal: libc::c_int, handler: extern "C" fn(libc::c_int)) {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = handler as *const () as usize;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&raw mut sa.sa_mask);
        if libc::sigaction(signal, &raw const sa, std::ptr::null_mut()) != 0 {
            tracing::warn!(signal, "failed to install signal handler");
        }
    }
}

#[cfg(unix)]
extern "C" fn on_resize(_sig: libc::c_int) {
    RESIZE_RECEIVED.store(true, Ordering::Relaxed);
}

#[cfg(unix)]
extern "C" fn on_interrupt(_sig: libc::c_int) {
    INTERRUPT_RECEIVED.store(true, Ordering::Relaxed);
}

/// Whether a resize arrived since the last call. Clears the flag.
#[inline]
pub fn take_resize() -> bool {
    RESIZE_RECEIVED.swap(false, Ordering::Relaxed)
}

/// Whether an interrupt arrived since the last call. Clears the flag.
#[inline]
pub fn take_interrupt() -> bool {
    INTERRUPT_RECEIVED.swap(false, Ordering::Relaxed)
}

/// Raise the resize flag as if SIGWINCH had arrived.
pub fn notify_resize() {
    RESIZE_RECEIVED.store(true, Ordering::Relaxed);
}

/// Raise the interrupt flag as if SIGINT had arrived.
pub fn notify_interrupt() {
    INTERRUPT_RECEIVED.store(true, Ordering::Relaxed);
}

// ─── Tests ───────────────────────────────────────────────────────────────────
