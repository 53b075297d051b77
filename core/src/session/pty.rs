use std::fs::File;
use std::io::{self, Read, Write};
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
use std::os::unix::process::CommandExt;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::ptr;
use std::time::Duration;

use tracing::debug;

use super::SessionError;
use super::handshake::PtyChannel;

/// A child process whose standard streams are the slave side of a fresh PTY.
pub struct PtyProcess {
    master: File,
    child: Child,
}

impl PtyProcess {
    /// Starts `program` as a session leader with the PTY as its controlling
    /// terminal. The window size is copied from our own terminal when there is
    /// one.
    pub fn spawn(program: &str, args: &[String]) -> Result<Self, SessionError> {
        let (master, slave) = open_pty().map_err(SessionError::Spawn)?;

        let mut command: Command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::from(slave.try_clone().map_err(SessionError::Spawn)?))
            .stdout(Stdio::from(slave.try_clone().map_err(SessionError::Spawn)?))
            .stderr(Stdio::from(slave));

        // SAFETY: only async-signal-safe calls between fork and exec.
        unsafe {
            command.pre_exec(|| {
                if libc::setsid() == -1 {
                    return Err(io::Error::last_os_error());
                }
                if libc::ioctl(libc::STDIN_FILENO, libc::TIOCSCTTY, 0 as libc::c_int) == -1 {
                    return Err(io::Error::last_os_error());
                }
                Ok(())
            });
        }

        let child: Child = command.spawn().map_err(SessionError::Spawn)?;
        // The slave copies held by `command` close with it.
        drop(command);
        debug!("spawned {program} as pid {}", child.id());

        Ok(Self {
            master: File::from(master),
            child,
        })
    }

    pub fn master(&mut self) -> &mut File {
        &mut self.master
    }

    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// Kills the child if it is still running and reaps it.
    pub fn terminate(mut self) -> io::Result<ExitStatus> {
        if self.child.try_wait()?.is_none() {
            let _ = self.child.kill();
        }
        self.close()
    }

    /// Closes the master, which hangs up the child's terminal, and waits for
    /// the child to exit.
    pub fn close(self) -> io::Result<ExitStatus> {
        let Self { master, mut child } = self;
        drop(master);
        child.wait()
    }
}

impl PtyChannel for PtyProcess {
    fn wait_readable(&mut self, limit: Duration) -> io::Result<bool> {
        let millis: libc::c_int = libc::c_int::try_from(limit.as_millis()).unwrap_or(libc::c_int::MAX);
        let mut fds: [libc::pollfd; 1] = [libc::pollfd {
            fd: self.master.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        }];

        loop {
            // SAFETY: `fds` is a valid array of one pollfd for the whole call.
            let rc: libc::c_int = unsafe { libc::poll(fds.as_mut_ptr(), 1, millis) };
            if rc >= 0 {
                return Ok(rc > 0);
            }
            let err: io::Error = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(err);
            }
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.master.read(buf)
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.master.write_all(data)?;
        self.master.flush()
    }
}

fn open_pty() -> io::Result<(OwnedFd, OwnedFd)> {
    let mut master: libc::c_int = -1;
    let mut slave: libc::c_int = -1;
    let size: Option<libc::winsize> = terminal_size();
    let size_ptr: *const libc::winsize = size.as_ref().map_or(ptr::null(), |s| s as *const _);

    // SAFETY: out-pointers are valid; name and termios may be null.
    let rc: libc::c_int =
        unsafe { libc::openpty(&mut master, &mut slave, ptr::null_mut(), ptr::null(), size_ptr) };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }

    // SAFETY: openpty succeeded, both descriptors are open and owned by us.
    let (master, slave) = unsafe { (OwnedFd::from_raw_fd(master), OwnedFd::from_raw_fd(slave)) };

    // Keep the master out of the child.
    // SAFETY: plain fcntl on a descriptor we own.
    if unsafe { libc::fcntl(master.as_raw_fd(), libc::F_SETFD, libc::FD_CLOEXEC) } == -1 {
        return Err(io::Error::last_os_error());
    }

    Ok((master, slave))
}

fn terminal_size() -> Option<libc::winsize> {
    let mut size: libc::winsize = libc::winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };
    // SAFETY: TIOCGWINSZ writes one winsize into `size`.
    let rc: libc::c_int = unsafe { libc::ioctl(libc::STDIN_FILENO, libc::TIOCGWINSZ, &mut size as *mut libc::winsize) };
    (rc == 0 && size.ws_col > 0).then_some(size)
}
