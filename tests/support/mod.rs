use std::{
    io,
    net::SocketAddr,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};
use tokio::{
    io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
    time::sleep,
};

use tracing::subscriber::DefaultGuard;

use mogcrab::config::{BackendAddr, Pool, PoolRole};
use mogcrab::{Config, Listener};

// -----------------------------------------------------------------------------
// ----- FakeTracker -----------------------------------------------------------

/// Scripted tracker: answers every line with `respond(line)` and records what it saw.
#[allow(dead_code)]
pub struct FakeTracker {
    pub addr: BackendAddr,
    seen: Arc<Mutex<Vec<String>>>,
    open: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl FakeTracker {
    pub async fn spawn<F>(respond: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind tracker");
        let port = listener.local_addr().unwrap().port();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let open = Arc::new(AtomicUsize::new(0));
        let respond = Arc::new(respond);

        let (seen_task, open_task) = (seen.clone(), open.clone());
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                open_task.fetch_add(1, Ordering::SeqCst);

                let (seen, open, respond) = (seen_task.clone(), open_task.clone(), respond.clone());
                tokio::spawn(async move {
                    let mut stream = BufReader::new(stream);
                    loop {
                        let mut line = String::new();
                        match stream.read_line(&mut line).await {
                            Ok(0) | Err(_) => break,
                            Ok(_) => {}
                        }
                        seen.lock().unwrap().push(line.clone());
                        let reply = respond(&line);
                        if stream.get_mut().write_all(reply.as_bytes()).await.is_err() {
                            break;
                        }
                    }
                    open.fetch_sub(1, Ordering::SeqCst);
                });
            }
        });

        Self {
            addr: BackendAddr::new("127.0.0.1", port),
            seen,
            open,
        }
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }

    pub fn open_connections(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    /// Polls until every proxy-side connection to this tracker has been closed.
    pub async fn wait_until_idle(&self) {
        for _ in 0..100 {
            if self.open_connections() == 0 {
                return;
            }
            sleep(Duration::from_millis(20)).await;
        }
        panic!(
            "tracker {} still has {} open connections",
            self.addr,
            self.open_connections()
        );
    }
}

// -----------------------------------------------------------------------------
// ----- Proxy -----------------------------------------------------------------

/// Address that refuses connections: bound once, then released.
#[allow(dead_code)]
pub async fn dead_addr() -> BackendAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    BackendAddr::new("127.0.0.1", port)
}

pub async fn spawn_proxy(primary: Vec<BackendAddr>, secondary: Vec<BackendAddr>) -> SocketAddr {
    let mut config = Config::new(
        Pool::new(PoolRole::Primary, primary),
        Pool::new(PoolRole::Secondary, secondary),
    );
    config.listen_addr = "127.0.0.1:0".parse().unwrap();

    let listener = Listener::bind(Arc::new(config)).expect("bind proxy");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(listener.serve());
    addr
}

// -----------------------------------------------------------------------------
// ----- Client ----------------------------------------------------------------

pub struct Client {
    stream: BufReader<TcpStream>,
}

#[allow(dead_code)]
impl Client {
    pub async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.expect("connect proxy");
        Self {
            stream: BufReader::new(stream),
        }
    }

    pub async fn request(&mut self, line: &str) -> String {
        self.stream
            .get_mut()
            .write_all(line.as_bytes())
            .await
            .unwrap();

        let mut resp = String::new();
        self.stream.read_line(&mut resp).await.unwrap();
        resp
    }

    /// Everything the proxy sends until it closes the connection.
    pub async fn drain(mut self) -> String {
        let mut rest = String::new();
        let _ = self.stream.read_to_string(&mut rest).await;
        rest
    }
}

// -----------------------------------------------------------------------------
// ----- LogCapture ------------------------------------------------------------

/// Buffers everything the crate logs on this thread until dropped.
///
/// `#[tokio::test]` runs spawned tasks on the test thread, so proxy sessions
/// log into the same buffer.
#[allow(dead_code)]
pub struct LogCapture {
    buf: Arc<Mutex<Vec<u8>>>,
    _guard: DefaultGuard,
}

#[allow(dead_code)]
impl LogCapture {
    pub fn start() -> Self {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let writer_buf = buf.clone();

        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || LogWriter(writer_buf.clone()))
            .with_ansi(false)
            .without_time()
            .with_target(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();

        Self {
            buf,
            _guard: tracing::subscriber::set_default(subscriber),
        }
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock().unwrap()).into_owned()
    }

    pub fn error_lines(&self) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|l| l.trim_start().starts_with("ERROR"))
            .map(str::to_string)
            .collect()
    }

    /// Polls until a line containing `needle` shows up, then returns that line.
    pub async fn wait_for(&self, needle: &str) -> String {
        for _ in 0..100 {
            if let Some(line) = self.contents().lines().find(|l| l.contains(needle)) {
                return line.to_string();
            }
            sleep(Duration::from_millis(20)).await;
        }
        panic!("no log line containing {needle:?}; got:\n{}", self.contents());
    }
}

#[allow(dead_code)]
struct LogWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
