//! Host process liveness and signalling.

use std::io;

/// Reports whether `pid` names a live process.
///
/// A process owned by another user still counts as alive. PID 0 and PIDs
/// outside the signed 32-bit range never do.
#[cfg(unix)]
pub(crate) fn is_alive(pid: u32) -> bool {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, kill};

    let Some(os_pid) = os_pid(pid) else {
        return false;
    };

    match kill(os_pid, None::<Signal>) {
        Ok(()) | Err(Errno::EPERM) => true,
        Err(_) => false,
    }
}

#[cfg(not(unix))]
pub(crate) const fn is_alive(_pid: u32) -> bool {
    false
}

/// Asks `pid` to exit with `SIGTERM`. A process that is already gone is not
/// an error.
#[cfg(unix)]
pub(crate) fn terminate(pid: u32) -> io::Result<()> {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, kill};

    let os_pid = os_pid(pid).ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, format!("invalid PID {pid}"))
    })?;

    match kill(os_pid, Signal::SIGTERM) {
        Ok(()) | Err(Errno::ESRCH) => Ok(()),
        Err(errno) => Err(io::Error::from(errno)),
    }
}

#[cfg(not(unix))]
pub(crate) fn terminate(pid: u32) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        format!("cannot signal PID {pid} on this platform"),
    ))
}

#[cfg(unix)]
fn os_pid(pid: u32) -> Option<nix::unistd::Pid> {
    i32::try_from(pid)
        .ok()
        .filter(|raw| *raw > 0)
        .map(nix::unistd::Pid::from_raw)
}
