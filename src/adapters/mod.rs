#[cfg(feature = "icmp")]
pub mod icmp;
pub mod resolver;
pub mod tcp;
