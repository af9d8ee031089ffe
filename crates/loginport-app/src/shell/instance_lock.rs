use anyhow::{bail, Result};
use std::net::{Ipv4Addr, SocketAddr, TcpListener};

/// Loopback port held for the lifetime of the shell process.
pub const LOCK_PORT: u16 = 39_217;

/// Single-instance guard; released when dropped.
#[derive(Debug)]
pub struct InstanceLock {
    _listener: TcpListener,
}

impl InstanceLock {
    pub fn acquire() -> Result<Self> {
        Self::acquire_on(LOCK_PORT)
    }

    pub fn acquire_on(port: u16) -> Result<Self> {
        let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
        match TcpListener::bind(addr) {
            Ok(listener) => Ok(Self {
                _listener: listener,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
                bail!("LoginPort is already running")
            }
            Err(e) => bail!("Failed to acquire instance lock on {}: {}", addr, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_fails() {
        let holder = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        let port = holder.local_addr().unwrap().port();

        let err = InstanceLock::acquire_on(port).unwrap_err();
        assert!(err.to_string().contains("already running"));
    }

    #[test]
    fn test_lock_released_on_drop() {
        let port = {
            let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
            listener.local_addr().unwrap().port()
        };

        let lock = InstanceLock::acquire_on(port).unwrap();
        drop(lock);
        assert!(InstanceLock::acquire_on(port).is_ok());
    }
}
