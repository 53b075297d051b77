use std::sync::atomic::{AtomicBool, Ordering};

/// Raised by SIGINT, SIGTERM or SIGHUP while a session is relaying.
pub static STOP: AtomicBool = AtomicBool::new(false);

pub fn install() {
    extern "C" fn handler(_signal: libc::c_int) {
        STOP.store(true, Ordering::Relaxed);
    }

    // SAFETY: the handler only stores to an atomic.
    unsafe {
        let handler_ptr = handler as *const () as libc::sighandler_t;
        libc::signal(libc::SIGINT, handler_ptr);
        libc::signal(libc::SIGTERM, handler_ptr);
        libc::signal(libc::SIGHUP, handler_ptr);
    }
}

pub fn requested() -> bool {
    STOP.load(Ordering::Relaxed)
}
