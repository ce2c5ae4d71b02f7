//! Interrupt handling. SIGINT and SIGTERM only raise a flag; the polling
//! accept loop and idle keep-alive waits check it between requests.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

pub fn requested() -> bool {
    SHUTDOWN.load(Ordering::SeqCst)
}

/// Asks the serve loop to stop. It notices on its next wakeup.
pub fn request() {
    SHUTDOWN.store(true, Ordering::SeqCst);
}

#[cfg(unix)]
extern "C" fn handle_signal(_sig: libc::c_int) {
    SHUTDOWN.store(true, Ordering::SeqCst);
}

/// Replaces the default terminate-on-signal action with the flag handler.
#[cfg(unix)]
pub fn install() -> io::Result<()> {
    for signal in [libc::SIGINT, libc::SIGTERM] {
        unsafe {
            let mut action: libc::sigaction = std::mem::zeroed();
            action.sa_sigaction = handle_signal as extern "C" fn(libc::c_int) as libc::sighandler_t;
            action.sa_flags = 0;
            libc::sigemptyset(&mut action.sa_mask);
            if libc::sigaction(signal, &action, std::ptr::null_mut()) != 0 {
                return Err(io::Error::last_os_error());
            }
        }
    }
    log::debug!("Signal handlers installed");
    Ok(())
}

#[cfg(not(unix))]
pub fn install() -> io::Result<()> {
    Ok(())
}
