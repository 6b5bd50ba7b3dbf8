// # Netlink Interface Address Source
//
// This crate lists the IPv6 addresses of a network interface on Linux
// using an rtnetlink `RTM_GETADDR` dump.
//
// ## Implementation
//
// 1. Resolve the interface index with `if_nametoindex`
// 2. Open a `NETLINK_ROUTE` socket (`netlink-sys`)
// 3. Send an `AF_INET6` address dump request (`netlink-packet-route`)
// 4. Keep `IFA_ADDRESS` attributes whose message index matches the interface
//
// The socket is blocking, so the dump runs on tokio's blocking pool.
// Addresses are returned in the order the kernel reports them, with no
// scope filtering; `AddressSelector` picks the global one.
//
// ## Platform Support
//
// Netlink is Linux-specific. On other platforms the source compiles but
// every lookup fails with a configuration error.

use async_trait::async_trait;
use dynv6_core::traits::InterfaceAddressSource;
use dynv6_core::{Error, Result};

/// Netlink-based interface address enumeration
#[derive(Debug, Default, Clone, Copy)]
pub struct NetlinkInterfaceSource;

impl NetlinkInterfaceSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl InterfaceAddressSource for NetlinkInterfaceSource {
    #[cfg(target_os = "linux")]
    async fn ipv6_candidates(&self, interface: &str) -> Result<Vec<String>> {
        let interface = interface.to_string();

        let addresses = tokio::task::spawn_blocking(move || linux::dump_ipv6(&interface))
            .await
            .map_err(|e| Error::transport(format!("Netlink dump task failed: {}", e)))??;

        tracing::debug!("Netlink reported {} IPv6 address(es)", addresses.len());
        Ok(addresses.iter().map(ToString::to_string).collect())
    }

    #[cfg(not(target_os = "linux"))]
    async fn ipv6_candidates(&self, _interface: &str) -> Result<Vec<String>> {
        Err(Error::config(
            "Netlink interface source is only supported on Linux",
        ))
    }

    fn source_name(&self) -> &'static str {
        "netlink"
    }
}

#[cfg(target_os = "linux")]
mod linux {
    use dynv6_core::{Error, Result};
    use netlink_packet_core::{
        NLM_F_DUMP, NLM_F_REQUEST, NetlinkHeader, NetlinkMessage, NetlinkPayload,
    };
    use netlink_packet_route::nlas::address::Nla;
    use netlink_packet_route::{AddressMessage, RtnlMessage};
    use netlink_sys::{Socket, SocketAddr, protocols::NETLINK_ROUTE};
    use std::ffi::CString;
    use std::net::Ipv6Addr;

    const RECV_BUFFER_LEN: usize = 8192;

    /// Resolve an interface name to its kernel index
    pub(crate) fn interface_index(interface: &str) -> Result<u32> {
        let name = CString::new(interface)
            .map_err(|_| Error::config(format!("Invalid interface name: {:?}", interface)))?;

        // SAFETY: `name` is a valid NUL-terminated string for the duration of the call
        let index = unsafe { libc::if_nametoindex(name.as_ptr()) };
        if index == 0 {
            return Err(Error::config(format!("Interface not found: {}", interface)));
        }
        Ok(index)
    }

    /// IPv6 addresses carried by one address message, if it belongs to `index`
    pub(crate) fn addresses_of(message: &AddressMessage, index: u32) -> Vec<Ipv6Addr> {
        if message.header.index != index || message.header.family != libc::AF_INET6 as u8 {
            return Vec::new();
        }

        message
            .nlas
            .iter()
            .filter_map(|nla| match nla {
                Nla::Address(bytes) => <[u8; 16]>::try_from(bytes.as_slice()).ok(),
                _ => None,
            })
            .map(Ipv6Addr::from)
            .collect()
    }

    /// Dump the IPv6 addresses of `interface`
    pub(crate) fn dump_ipv6(interface: &str) -> Result<Vec<Ipv6Addr>> {
        let index = interface_index(interface)?;

        let mut socket = Socket::new(NETLINK_ROUTE)
            .map_err(|e| Error::transport(format!("Failed to open netlink socket: {}", e)))?;
        socket
            .bind_auto()
            .map_err(|e| Error::transport(format!("Failed to bind netlink socket: {}", e)))?;
        socket
            .connect(&SocketAddr::new(0, 0))
            .map_err(|e| Error::transport(format!("Failed to connect netlink socket: {}", e)))?;

        let mut header = NetlinkHeader::default();
        header.flags = NLM_F_REQUEST | NLM_F_DUMP;

        let mut request_body = AddressMessage::default();
        request_body.header.family = libc::AF_INET6 as u8;

        let mut request = NetlinkMessage::new(
            header,
            NetlinkPayload::InnerMessage(RtnlMessage::GetAddress(request_body)),
        );
        request.finalize();

        let mut send_buf = vec![0u8; request.buffer_len()];
        request.serialize(&mut send_buf[..]);
        socket
            .send(&send_buf[..], 0)
            .map_err(|e| Error::transport(format!("Failed to send netlink request: {}", e)))?;

        let mut addresses = Vec::new();
        let mut recv_buf = vec![0u8; RECV_BUFFER_LEN];

        loop {
            let size = socket
                .recv(&mut &mut recv_buf[..], 0)
                .map_err(|e| Error::transport(format!("Failed to read netlink reply: {}", e)))?;

            let mut offset = 0;
            while offset < size {
                let bytes = &recv_buf[offset..size];
                let message = NetlinkMessage::<RtnlMessage>::deserialize(bytes)
                    .map_err(|e| Error::parse(format!("Malformed netlink reply: {}", e)))?;

                match message.payload {
                    NetlinkPayload::Done(_) => return Ok(addresses),
                    NetlinkPayload::Error(err) => {
                        return Err(Error::transport(format!(
                            "Netlink address dump failed: {:?}",
                            err.code
                        )));
                    }
                    NetlinkPayload::InnerMessage(RtnlMessage::NewAddress(address)) => {
                        addresses.extend(addresses_of(&address, index));
                    }
                    _ => {}
                }

                let length = message.header.length as usize;
                if length == 0 {
                    return Err(Error::parse("Netlink reply with zero length"));
                }
                offset += length;
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn address_message(index: u32, family: u8, address: Ipv6Addr) -> AddressMessage {
            let mut message = AddressMessage::default();
            message.header.index = index;
            message.header.family = family;
            message.nlas.push(Nla::Address(address.octets().to_vec()));
            message
        }

        #[test]
        fn test_loopback_index_resolves() {
            assert!(interface_index("lo").is_ok());
        }

        #[test]
        fn test_unknown_interface_rejected() {
            assert!(matches!(
                interface_index("nosuchif0"),
                Err(Error::Config(_))
            ));
            assert!(interface_index("bad\0name").is_err());
        }

        #[test]
        fn test_addresses_filtered_by_index() {
            let global: Ipv6Addr = "2001:db8::1".parse().unwrap();
            let message = address_message(3, libc::AF_INET6 as u8, global);

            assert_eq!(addresses_of(&message, 3), vec![global]);
            assert!(addresses_of(&message, 4).is_empty());
        }

        #[test]
        fn test_non_ipv6_messages_ignored() {
            let message = address_message(3, libc::AF_INET as u8, "::1".parse().unwrap());
            assert!(addresses_of(&message, 3).is_empty());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_name() {
        assert_eq!(NetlinkInterfaceSource::new().source_name(), "netlink");
    }

    #[tokio::test]
    #[cfg(not(target_os = "linux"))]
    async fn test_unsupported_platform() {
        let result = NetlinkInterfaceSource::new().ipv6_candidates("eth0").await;
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    #[cfg(target_os = "linux")]
    async fn test_unknown_interface_is_config_error() {
        let result = NetlinkInterfaceSource::new().ipv6_candidates("nosuchif0").await;
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
