mod constants;
mod device;
mod flags;
mod settings;
mod states;

pub use constants::*;
pub use device::*;
pub use flags::*;
pub use settings::*;
pub use states::*;
