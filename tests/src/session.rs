#![cfg(all(test, target_os = "linux"))]
use std::io::Read;
use std::time::{Duration, Instant};

use secrecy::SecretString;
use tmcheck_core::session::{PtyChannel, PtyProcess, SessionError, authenticate};

fn shell(script: &str) -> PtyProcess {
    PtyProcess::spawn("sh", &["-c".to_string(), script.to_string()]).unwrap()
}

/// Reads from the PTY until `needle` shows up or `limit` passes.
fn read_until(process: &mut PtyProcess, needle: &str, limit: Duration) -> String {
    let deadline: Instant = Instant::now() + limit;
    let mut seen: String = String::new();
    let mut buf: [u8; 1024] = [0; 1024];

    while !seen.contains(needle) && Instant::now() < deadline {
        if !process.wait_readable(Duration::from_millis(200)).unwrap() {
            continue;
        }
        match process.master().read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => seen.push_str(&String::from_utf8_lossy(&buf[..n])),
        }
    }
    seen
}

#[test]
fn password_prompt_is_answered_over_a_real_pty() {
    let mut process: PtyProcess = shell("printf 'user@host password: '; read pw; echo \"got:$pw\"");
    let password: SecretString = SecretString::from("s3cret".to_string());
    let mut echo: Vec<u8> = Vec::new();

    authenticate(&mut process, &password, &mut echo, Duration::from_secs(5)).unwrap();
    assert!(String::from_utf8_lossy(&echo).contains("password:"));

    let rest: String = read_until(&mut process, "got:s3cret", Duration::from_secs(5));
    assert!(rest.contains("got:s3cret"), "unexpected output: {rest:?}");

    assert!(process.close().unwrap().success());
}

#[test]
fn client_exiting_before_the_prompt_fails_the_login() {
    let mut process: PtyProcess = shell("echo 'connection refused'; exit 3");
    let password: SecretString = SecretString::from("unused".to_string());
    let mut echo: Vec<u8> = Vec::new();

    let err = authenticate(&mut process, &password, &mut echo, Duration::from_secs(5)).unwrap_err();
    assert!(matches!(err, SessionError::ChildExited), "got {err:?}");
    let _ = process.terminate();
}

#[test]
fn silent_client_times_out() {
    let mut process: PtyProcess = shell("sleep 5");
    let password: SecretString = SecretString::from("unused".to_string());
    let mut echo: Vec<u8> = Vec::new();

    let err = authenticate(&mut process, &password, &mut echo, Duration::from_millis(300)).unwrap_err();
    assert!(matches!(err, SessionError::Timeout(_)), "got {err:?}");
    process.terminate().unwrap();
}
