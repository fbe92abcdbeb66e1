//! Listener implementation for bridge sockets.

use std::io;
use std::net::{SocketAddr, TcpListener, ToSocketAddrs};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use notebridge_config::ListenEndpoint;

use super::{ConnectionHandler, ConnectionStream, LISTENER_TARGET, ListenerError};

#[cfg(unix)]
use std::fs;
#[cfg(unix)]
use std::os::unix::fs::FileTypeExt;
#[cfg(unix)]
use std::os::unix::net::{UnixListener, UnixStream};

#[cfg(unix)]
use camino::Utf8Path;

const ACCEPT_BACKOFF: Duration = Duration::from_millis(25);
const ERROR_BACKOFF: Duration = Duration::from_millis(150);
const CONNECTION_THREAD_NAME: &str = concat!(env!("CARGO_PKG_NAME"), "-connection");

/// Listener bound to a [`ListenEndpoint`].
#[derive(Debug)]
pub(crate) struct SocketListener {
    endpoint: ListenEndpoint,
    socket: BoundSocket,
}

#[derive(Debug)]
enum BoundSocket {
    Tcp(TcpListener),
    #[cfg(unix)]
    Unix(UnixListener),
}

impl SocketListener {
    pub(crate) fn bind(endpoint: &ListenEndpoint) -> Result<Self, ListenerError> {
        let socket = match endpoint {
            ListenEndpoint::Tcp { host, port } => {
                BoundSocket::Tcp(bind_tcp(endpoint, host, *port)?)
            }
            #[cfg(unix)]
            ListenEndpoint::Unix { path } => BoundSocket::Unix(bind_unix(endpoint, path)?),
            #[cfg(not(unix))]
            ListenEndpoint::Unix { .. } => {
                return Err(ListenerError::UnixUnavailable {
                    endpoint: endpoint.clone(),
                });
            }
        };
        Ok(Self {
            endpoint: endpoint.clone(),
            socket,
        })
    }

    /// Address a TCP listener actually bound, resolving port `0`.
    pub(crate) fn local_addr(&self) -> Option<SocketAddr> {
        match &self.socket {
            BoundSocket::Tcp(listener) => listener.local_addr().ok(),
            #[cfg(unix)]
            BoundSocket::Unix(_) => None,
        }
    }

    /// Switches to non-blocking accepts and serves connections on a
    /// background thread until the returned handle is shut down.
    pub(crate) fn start(
        self,
        handler: Arc<dyn ConnectionHandler>,
    ) -> Result<ListenerHandle, ListenerError> {
        let nonblocking = match &self.socket {
            BoundSocket::Tcp(listener) => listener.set_nonblocking(true),
            #[cfg(unix)]
            BoundSocket::Unix(listener) => listener.set_nonblocking(true),
        };
        if let Err(source) = nonblocking {
            #[cfg(unix)]
            remove_socket_file(&self.endpoint);
            return Err(ListenerError::Poll {
                endpoint: self.endpoint.clone(),
                source,
            });
        }

        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_flag = Arc::clone(&shutdown);
        let endpoint = self.endpoint.clone();
        let handle = thread::spawn(move || self.accept_until(&shutdown_flag, &handler));
        Ok(ListenerHandle {
            endpoint,
            shutdown,
            handle: Some(handle),
        })
    }

    fn accept_until(&self, shutdown: &AtomicBool, handler: &Arc<dyn ConnectionHandler>) {
        info!(
            target: LISTENER_TARGET,
            endpoint = %self.endpoint,
            "socket listener active"
        );
        let mut served = 0_u64;
        let mut repeated = None::<io::ErrorKind>;
        while !shutdown.load(Ordering::SeqCst) {
            match self.accept() {
                Ok(Some(stream)) => {
                    repeated = None;
                    served += 1;
                    serve(stream, handler);
                }
                Ok(None) => thread::sleep(ACCEPT_BACKOFF),
                Err(error) => {
                    // Log each distinct failure once until an accept succeeds.
                    if repeated.replace(error.kind()) != Some(error.kind()) {
                        warn!(
                            target: LISTENER_TARGET,
                            error = %error,
                            "socket accept error"
                        );
                    }
                    thread::sleep(ERROR_BACKOFF);
                }
            }
        }

        info!(
            target: LISTENER_TARGET,
            endpoint = %self.endpoint,
            connections = served,
            "socket listener stopped"
        );
        #[cfg(unix)]
        remove_socket_file(&self.endpoint);
    }

    fn accept(&self) -> io::Result<Option<ConnectionStream>> {
        let accepted = match &self.socket {
            BoundSocket::Tcp(tcp) => tcp.accept().and_then(|(stream, _)| {
                stream.set_nonblocking(false)?;
                Ok(ConnectionStream::Tcp(stream))
            }),
            #[cfg(unix)]
            BoundSocket::Unix(unix) => unix.accept().and_then(|(stream, _)| {
                stream.set_nonblocking(false)?;
                Ok(ConnectionStream::Unix(stream))
            }),
        };
        match accepted {
            Ok(stream) => Ok(Some(stream)),
            Err(error) if error.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(error) => Err(error),
        }
    }
}

/// Hands `stream` to `handler` on its own thread.
fn serve(stream: ConnectionStream, handler: &Arc<dyn ConnectionHandler>) {
    let peer = stream.peer();
    debug!(target: LISTENER_TARGET, %peer, "connection accepted");
    let handler = Arc::clone(handler);
    let spawned = thread::Builder::new()
        .name(CONNECTION_THREAD_NAME.to_owned())
        .spawn(move || handler.handle(stream));
    if let Err(error) = spawned {
        warn!(
            target: LISTENER_TARGET,
            %peer,
            %error,
            "failed to spawn connection thread"
        );
    }
}

/// Handle to the background listener thread.
///
/// Dropping the handle requests shutdown without waiting for the thread.
pub(crate) struct ListenerHandle {
    endpoint: ListenEndpoint,
    shutdown: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ListenerHandle {
    pub(crate) fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    pub(crate) fn join(mut self) -> Result<(), ListenerError> {
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| ListenerError::AcceptLoopPanicked {
                    endpoint: self.endpoint.clone(),
                }),
            None => Ok(()),
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }
}

fn bind_tcp(endpoint: &ListenEndpoint, host: &str, port: u16) -> Result<TcpListener, ListenerError> {
    let unresolved = |source| ListenerError::Unresolved {
        host: host.to_owned(),
        port,
        source,
    };
    let addr = (host, port)
        .to_socket_addrs()
        .map_err(|error| unresolved(Some(error)))?
        .next()
        .ok_or_else(|| unresolved(None))?;
    TcpListener::bind(addr).map_err(|source| ListenerError::Bind {
        endpoint: endpoint.clone(),
        source,
    })
}

#[cfg(unix)]
fn bind_unix(endpoint: &ListenEndpoint, path: &Utf8Path) -> Result<UnixListener, ListenerError> {
    if path.exists() {
        reclaim_stale_socket(path)?;
    }
    UnixListener::bind(path).map_err(|source| ListenerError::Bind {
        endpoint: endpoint.clone(),
        source,
    })
}

/// Removes a socket file left behind by a bridge that is no longer running.
#[cfg(unix)]
fn reclaim_stale_socket(path: &Utf8Path) -> Result<(), ListenerError> {
    let stale = |source| ListenerError::StaleSocket {
        path: path.to_path_buf(),
        source,
    };
    let metadata = fs::symlink_metadata(path).map_err(stale)?;
    if !metadata.file_type().is_socket() {
        return Err(ListenerError::NotASocket {
            path: path.to_path_buf(),
        });
    }
    match UnixStream::connect(path) {
        Ok(_live) => Err(ListenerError::SocketBusy {
            path: path.to_path_buf(),
        }),
        Err(error)
            if matches!(
                error.kind(),
                io::ErrorKind::ConnectionRefused | io::ErrorKind::NotFound
            ) =>
        {
            fs::remove_file(path).map_err(stale)
        }
        Err(source) => Err(stale(source)),
    }
}

#[cfg(unix)]
fn remove_socket_file(endpoint: &ListenEndpoint) {
    let Some(path) = endpoint.unix_path() else {
        return;
    };
    if let Err(error) = fs::remove_file(path)
        && error.kind() != io::ErrorKind::NotFound
    {
        warn!(
            target: LISTENER_TARGET,
            error = %error,
            path = %path,
            "failed to remove unix socket file"
        );
    }
}
