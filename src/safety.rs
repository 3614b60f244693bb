//! Fail-safe halt.
//!
//! Some boot conditions (an unrecoverable panic loop, for instance) are
//! handled by stopping the firmware outright.  [`halt`] never returns: the
//! calling task parks forever.  Once the task stops feeding the task
//! watchdog the chip is reset by hardware; on the host the thread simply
//! stays parked.
//!
//! A rule whose action halts stops the evaluation pass at that rule, so
//! later rules and the default action never run.

use log::error;

/// Stop the current task permanently.
pub fn halt(reason: &str) -> ! {
    error!("HALT: {}", reason);
    loop {
        // Spurious unparks just go back to sleep.
        std::thread::park();
    }
}
