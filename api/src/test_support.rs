//! Shared fixtures for unit tests

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::process::Command;
use tokio::task::JoinHandle;

use crate::detector::stream::FrameSampleStream;

/// Client that never routes through an environment proxy
pub fn test_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("build test client")
}

/// Serve one hand-written HTTP response on a loopback port.
///
/// Returns a URL pointing at the origin and a handle yielding the raw
/// request head it received.
pub async fn spawn_origin(response: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind origin");
    let addr = listener.local_addr().expect("origin addr");

    let handle = tokio::spawn(async move { serve_one(&listener, response).await });

    (format!("http://{addr}/clip.mp4"), handle)
}

/// Like [`spawn_origin`], answering one connection per response, in order.
pub async fn spawn_origins(
    responses: &'static [&'static str],
) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind origin");
    let addr = listener.local_addr().expect("origin addr");

    let handle = tokio::spawn(async move {
        let mut requests = Vec::new();
        for response in responses {
            requests.push(serve_one(&listener, response).await);
        }
        requests
    });

    (format!("http://{addr}/clip.mp4"), handle)
}

async fn serve_one(listener: &TcpListener, response: &str) -> String {
    let (mut socket, _) = listener.accept().await.expect("accept");
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut buf).await.expect("read request");
        if n == 0 {
            break;
        }
        request.extend_from_slice(&buf[..n]);
    }
    socket
        .write_all(response.as_bytes())
        .await
        .expect("write response");
    let _ = socket.shutdown().await;
    String::from_utf8_lossy(&request).into_owned()
}

/// Stand-in analyzer: a shell script whose stdout plays ffprobe's part
pub fn sh_stream(script: &str) -> FrameSampleStream {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(script);
    FrameSampleStream::spawn(cmd).expect("spawn sh")
}

/// True once `pid` has been reaped (no process-table entry left)
pub fn process_gone(pid: u32) -> bool {
    if cfg!(target_os = "linux") {
        !std::path::Path::new(&format!("/proc/{pid}")).exists()
    } else {
        true
    }
}

/// Executable shell script standing in for ffprobe, removed on drop.
///
/// Before running `body` the script records its argv in `args` and its pid in
/// `pid`, next to itself.
#[cfg(unix)]
pub struct StubAnalyzer {
    dir: PathBuf,
}

#[cfg(unix)]
impl StubAnalyzer {
    pub fn new(body: &str) -> Self {
        use std::os::unix::fs::PermissionsExt;

        static NEXT: AtomicUsize = AtomicUsize::new(0);
        let dir = std::env::temp_dir().join(format!(
            "crash-detector-stub-{}-{}",
            std::process::id(),
            NEXT.fetch_add(1, Ordering::Relaxed)
        ));
        std::fs::create_dir_all(&dir).expect("create stub dir");

        let script = format!(
            "#!/bin/sh\nprintf '%s\\n' \"$@\" > \"$(dirname \"$0\")/args\"\necho $$ > \"$(dirname \"$0\")/pid\"\n{body}\n"
        );
        let path = dir.join("ffprobe");
        std::fs::write(&path, script).expect("write stub");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("chmod stub");
        Self { dir }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join("ffprobe")
    }

    pub fn args(&self) -> Vec<String> {
        std::fs::read_to_string(self.dir.join("args"))
            .expect("read stub args")
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn pid(&self) -> u32 {
        std::fs::read_to_string(self.dir.join("pid"))
            .expect("read stub pid")
            .trim()
            .parse()
            .expect("stub pid")
    }
}

#[cfg(unix)]
impl Drop for StubAnalyzer {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}
