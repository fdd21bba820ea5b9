use crate::error::discovery::DiscoveryError;

use common::ErrorLocation;

use std::panic::Location;

use log::{debug, trace};
use netstat2::{
    AddressFamilyFlags, ProtocolFlags, ProtocolSocketInfo, SocketInfo, TcpState, get_sockets_info,
};
use sysinfo::{Pid, ProcessesToUpdate, System};

/// A process found listening on the server port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortOwner {
    pub port: u16,
    /// `None` when the OS did not report an owning process (e.g. insufficient permissions).
    pub pid: Option<u32>,
    pub name: Option<String>,
}

#[track_caller]
fn query_tcp_sockets() -> Result<Vec<SocketInfo>, DiscoveryError> {
    get_sockets_info(
        AddressFamilyFlags::IPV4 | AddressFamilyFlags::IPV6,
        ProtocolFlags::TCP,
    )
    .map_err(|e| DiscoveryError::NetworkQuery {
        message: format!("Failed to query network sockets: {e}"),
        location: ErrorLocation::from(Location::caller()),
        source: Box::new(e),
    })
}

fn process_name(pid: u32) -> Option<String> {
    let mut sys = System::new();
    let target = Pid::from_u32(pid);
    sys.refresh_processes(ProcessesToUpdate::Some(&[target]), true);

    sys.process(target)
        .map(|p| p.name().to_string_lossy().to_string())
}

/// Find a process already listening on `port`.
///
/// Used before spawning: a leftover server from an earlier run would answer
/// the readiness poll in place of the one we start.
///
/// # Returns
///
/// * `Ok(Some(PortOwner))` - Something is listening on the port
/// * `Ok(None)` - The port is free
/// * `Err(DiscoveryError)` - The socket table could not be read
#[track_caller]
pub fn find_listener(port: u16) -> Result<Option<PortOwner>, DiscoveryError> {
    let sockets = query_tcp_sockets()?;

    for s in sockets {
        if let ProtocolSocketInfo::Tcp(tcp) = s.protocol_socket_info
            && tcp.state == TcpState::Listen
            && tcp.local_port == port
        {
            let pid = s.associated_pids.first().copied();
            trace!("Found listener on port {port} (PID: {pid:?})");

            return Ok(Some(PortOwner {
                port,
                pid,
                name: pid.and_then(process_name),
            }));
        }
    }

    debug!("No process listening on port {port}");
    Ok(None)
}
