//! Radio transceiver subsystem: command codec, HAL abstraction, vendor
//! configuration, and the link-layer driver.

pub mod codec;
pub mod config;
pub mod datarate;
pub mod driver;
pub mod hal;
pub mod irq;
pub mod persist;

pub use driver::{RadioLink, RadioMode, RfError, TxType};
pub use hal::{Hal, HalError, MockHal, Pin, PinDirection, PinState};
pub use irq::{InterruptStatus, ModemInterrupts, PacketHandlerInterrupts};
pub use persist::{InMemoryStore, PersistentStore};
