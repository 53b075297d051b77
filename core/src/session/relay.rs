use std::fs::File;
use std::io::{self, Read, Write};
use std::os::fd::{AsRawFd, FromRawFd};
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use super::SessionError;

const CHUNK: usize = 4096;

/// Unbuffered handle on our standard input. `std::io::Stdin` buffers, which
/// would hide bytes from `poll`.
pub fn raw_stdin() -> io::Result<File> {
    // SAFETY: dup returns a new descriptor that we then own.
    let fd: libc::c_int = unsafe { libc::dup(libc::STDIN_FILENO) };
    if fd == -1 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: `fd` is a freshly duplicated, open descriptor.
    Ok(unsafe { File::from_raw_fd(fd) })
}

/// Copies bytes between the PTY master and the operator.
///
/// The loop ends on end of data or a hang-up from either side, or once `stop`
/// is raised. Read errors other than the PTY's EIO are returned.
pub fn relay(
    master: &mut File,
    input: &mut File,
    output: &mut dyn Write,
    stop: &AtomicBool,
) -> Result<(), SessionError> {
    let mut buf: [u8; CHUNK] = [0; CHUNK];
    let mut fds: [libc::pollfd; 2] = [
        libc::pollfd {
            fd: master.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        },
        libc::pollfd {
            fd: input.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        },
    ];

    while !stop.load(Ordering::Relaxed) {
        // SAFETY: `fds` is a valid array of two pollfds for the whole call.
        let rc: libc::c_int = unsafe { libc::poll(fds.as_mut_ptr(), 2, -1) };
        if rc < 0 {
            let err: io::Error = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err.into());
        }

        if fds[0].revents & (libc::POLLIN | libc::POLLHUP | libc::POLLERR) != 0 {
            match master.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    output.write_all(&buf[..n])?;
                    output.flush()?;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                // Linux reports a hung-up slave as EIO.
                Err(e) if e.raw_os_error() == Some(libc::EIO) => break,
                Err(e) => return Err(e.into()),
            }
        }

        if fds[1].revents & (libc::POLLIN | libc::POLLHUP) != 0 {
            match input.read(&mut buf) {
                Ok(0) => {
                    debug!("input closed");
                    break;
                }
                Ok(n) => {
                    master.write_all(&buf[..n])?;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        if (fds[0].revents | fds[1].revents) & libc::POLLNVAL != 0 {
            debug!("descriptor closed under the relay");
            break;
        }
    }

    Ok(())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::fd::OwnedFd;
    use std::os::unix::net::UnixStream;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    /// One end as a `File` for the relay, the other kept as the peer.
    fn socket_pair() -> (File, UnixStream) {
        let (ours, peer) = UnixStream::pair().unwrap();
        (File::from(OwnedFd::from(ours)), peer)
    }

    /// Runs the relay on its own thread and waits up to three seconds for it
    /// to return. Returns what it wrote to the operator.
    fn relay_within_deadline(mut master: File, mut input: File, stop: bool) -> Vec<u8> {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let flag: AtomicBool = AtomicBool::new(stop);
            let mut output: Vec<u8> = Vec::new();
            let result = relay(&mut master, &mut input, &mut output, &flag);
            let _ = tx.send((result.is_ok(), output));
        });

        let (ok, output) = rx
            .recv_timeout(Duration::from_secs(3))
            .expect("relay did not return");
        assert!(ok);
        output
    }

    #[test]
    fn remote_output_should_reach_the_operator_until_eof() {
        let (master, mut remote) = socket_pair();
        let (input, _operator) = socket_pair();
        remote.write_all(b"KARSIYAKA# ").unwrap();
        drop(remote);

        let output: Vec<u8> = relay_within_deadline(master, input, false);
        assert_eq!(output, b"KARSIYAKA# ");
    }

    #[test]
    fn operator_input_should_reach_the_remote_side() {
        let (master, mut remote) = socket_pair();
        let (input, mut operator) = socket_pair();
        operator.write_all(b"show clock\n").unwrap();
        drop(operator);

        relay_within_deadline(master, input, false);

        let mut forwarded: Vec<u8> = Vec::new();
        remote
            .set_read_timeout(Some(Duration::from_secs(1)))
            .unwrap();
        let mut chunk: [u8; 64] = [0; 64];
        let n: usize = remote.read(&mut chunk).unwrap();
        forwarded.extend_from_slice(&chunk[..n]);
        assert_eq!(forwarded, b"show clock\n");
    }

    #[test]
    fn closed_input_should_end_a_quiet_session() {
        let (master, _remote) = socket_pair();
        let input: File = File::open("/dev/null").unwrap();

        let output: Vec<u8> = relay_within_deadline(master, input, false);
        assert!(output.is_empty());
    }

    #[test]
    fn raised_stop_flag_should_end_the_relay() {
        let (master, _remote) = socket_pair();
        let (input, _operator) = socket_pair();

        let output: Vec<u8> = relay_within_deadline(master, input, true);
        assert!(output.is_empty());
    }
}
