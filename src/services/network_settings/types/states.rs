//! NetworkManager device states, as reported by the settings-era daemon.

/// Device-specific states.
///
/// These are the numeric values of the NetworkManager generation that looks
/// up user settings over the bus; newer daemons spread states in steps of ten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NMDeviceState {
    /// the device's state is unknown
    Unknown = 0,
    /// the device is recognized, but not managed by NetworkManager
    Unmanaged = 1,
    /// the device is managed by NetworkManager, but is not available for use
    Unavailable = 2,
    /// the device can be activated, but is currently idle and not connected to a network.
    Disconnected = 3,
    /// Device is preparing the connection to the network.
    Prepare = 4,
    /// Device is connecting to the requested network.
    Config = 5,
    /// Device requires more information to continue connecting to the requested
    /// network. This is when NetworkManager calls `GetSecrets` on a connection.
    NeedAuth = 6,
    /// the device is requesting IPv4 addresses and routing information from the network.
    IpConfig = 7,
    /// the device has a network connection.
    Activated = 8,
    /// the device failed to connect to the requested network
    Failed = 9,
}

impl NMDeviceState {
    /// Convert from D-Bus u32 representation
    pub fn from_u32(value: u32) -> Self {
        match value {
            1 => Self::Unmanaged,
            2 => Self::Unavailable,
            3 => Self::Disconnected,
            4 => Self::Prepare,
            5 => Self::Config,
            6 => Self::NeedAuth,
            7 => Self::IpConfig,
            8 => Self::Activated,
            9 => Self::Failed,
            _ => Self::Unknown,
        }
    }

    /// Whether the device is somewhere between starting activation and being connected.
    pub fn is_activating(self) -> bool {
        matches!(
            self,
            Self::Prepare | Self::Config | Self::NeedAuth | Self::IpConfig
        )
    }
}
