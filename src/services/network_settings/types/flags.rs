//! NetworkManager flag types.

use bitflags::bitflags;

bitflags! {
    /// Access point capability flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct NM80211ApFlags: u32 {
        /// No flags.
        const NONE = 0x00000000;
        /// Access point supports privacy/encryption.
        const PRIVACY = 0x00000001;
    }
}

impl NM80211ApFlags {
    /// Whether joining the access point needs secrets from a connection profile.
    pub fn requires_secrets(self) -> bool {
        self.contains(Self::PRIVACY)
    }
}
