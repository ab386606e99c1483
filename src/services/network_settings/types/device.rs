//! NetworkManager device types.

/// NMDeviceType values indicate the type of hardware represented by a device object.
///
/// Only the types the user settings service distinguishes are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NMDeviceType {
    /// unknown device
    Unknown = 0,
    /// a wired ethernet device
    Ethernet = 1,
    /// an 802.11 Wi-Fi device
    Wifi = 2,
}

impl NMDeviceType {
    /// Convert from D-Bus u32 representation
    pub fn from_u32(value: u32) -> Self {
        match value {
            1 => Self::Ethernet,
            2 => Self::Wifi,
            _ => Self::Unknown,
        }
    }

    /// Whether connections for this device are keyed by SSID.
    pub fn is_wireless(self) -> bool {
        self == Self::Wifi
    }
}
