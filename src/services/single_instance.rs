// Web Portals Single Instance
// The first process owns a loopback listener and writes its port to
// `<data dir>/instance.lock`. A later launch connects, asks the owner to show
// its window, waits for the acknowledgement and exits.
//
// Protocol: one line each way.
// Launch:  webportals:activate
// Owner:   ok

use std::io;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tracing::{debug, info, warn};

pub const LOCK_FILE: &str = "instance.lock";
const ACTIVATE: &str = "webportals:activate";
const ACK: &str = "ok";
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(1);

/// Outcome of [`acquire`].
pub enum InstanceRole {
    /// This process owns the instance. Keep the guard alive to receive relaunches.
    Primary(InstanceGuard),
    /// A running instance was asked to show itself; this process should exit.
    Secondary,
}

/// Claims the single-instance lock under `dir`, or hands off to its owner.
///
/// A lock file whose owner does not answer the handshake is stale (the owner
/// crashed, or the port was reused) and is taken over.
///
/// # Errors
/// Returns `io::Error` if the listener cannot be bound or the lock file
/// cannot be written.
pub async fn acquire(dir: &Path) -> io::Result<InstanceRole> {
    let lock_path = dir.join(LOCK_FILE);
    if let Some(port) = read_port(&lock_path).await {
        match activate_owner(port).await {
            Ok(()) => {
                info!(port, "running instance activated");
                return Ok(InstanceRole::Secondary);
            }
            Err(e) => debug!(port, error = %e, "stale instance lock, taking over"),
        }
    }

    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await?;
    let port = listener.local_addr()?.port();
    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(&lock_path, port.to_string()).await?;
    debug!(port, path = %lock_path.display(), "instance lock acquired");

    Ok(InstanceRole::Primary(InstanceGuard {
        listener,
        lock_path,
        port,
    }))
}

async fn read_port(lock_path: &Path) -> Option<u16> {
    let content = tokio::fs::read_to_string(lock_path).await.ok()?;
    content.trim().parse().ok()
}

async fn activate_owner(port: u16) -> io::Result<()> {
    timeout(HANDSHAKE_TIMEOUT, request_activation(port))
        .await
        .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "instance did not answer"))?
}

async fn request_activation(port: u16) -> io::Result<()> {
    let mut stream = TcpStream::connect((Ipv4Addr::LOCALHOST, port)).await?;
    stream.write_all(format!("{}\n", ACTIVATE).as_bytes()).await?;
    let mut reply = String::new();
    BufReader::new(stream).read_line(&mut reply).await?;
    if reply.trim() == ACK {
        Ok(())
    } else {
        Err(io::Error::new(io::ErrorKind::InvalidData, "unexpected instance reply"))
    }
}

/// Ownership of the single-instance lock. The lock file is removed on drop.
pub struct InstanceGuard {
    listener: TcpListener,
    lock_path: PathBuf,
    port: u16,
}

impl InstanceGuard {
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Waits for the next launch that asks this instance to show itself.
    /// Connections that do not speak the handshake are dropped.
    ///
    /// # Errors
    /// Returns `io::Error` if the listener stops accepting connections.
    pub async fn next_activation(&self) -> io::Result<()> {
        loop {
            let (stream, peer) = self.listener.accept().await?;
            match answer(stream).await {
                Ok(true) => return Ok(()),
                Ok(false) => debug!(%peer, "ignored connection without activation request"),
                Err(e) => debug!(%peer, error = %e, "activation handshake failed"),
            }
        }
    }

    /// Calls `on_activate` for every relaunch until the listener fails.
    pub async fn serve(self, on_activate: impl Fn() + Send + 'static) {
        loop {
            match self.next_activation().await {
                Ok(()) => on_activate(),
                Err(e) => {
                    warn!(error = %e, "instance listener stopped");
                    break;
                }
            }
        }
    }
}

async fn answer(stream: TcpStream) -> io::Result<bool> {
    let (read, mut write) = stream.into_split();
    let mut line = String::new();
    timeout(HANDSHAKE_TIMEOUT, BufReader::new(read).read_line(&mut line))
        .await
        .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "no activation request"))??;
    if line.trim() != ACTIVATE {
        return Ok(false);
    }
    write.write_all(format!("{}\n", ACK).as_bytes()).await?;
    Ok(true)
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        // Leave a lock that a newer owner has already rewritten.
        let ours = std::fs::read_to_string(&self.lock_path)
            .is_ok_and(|content| content.trim() == self.port.to_string());
        if ours {
            let _ = std::fs::remove_file(&self.lock_path);
        }
    }
}
