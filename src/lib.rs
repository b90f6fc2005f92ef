//! # rflink-rs - Si4463 Radio Link Layer for a CubeSat On-Board Computer
//!
//! The rflink-rs crate drives the Si4463 sub-GHz FSK/OOK transceiver over its
//! command/property SPI interface: chip bring-up (reset sequencing, firmware
//! patch, power-up, vendor configuration), interrupt-driven streaming through
//! the 64-byte hardware FIFOs, and a three-tier recovery policy
//! (retry → reinitialize → system reset) so the spacecraft's only
//! communication channel never stays silently broken.
//!
//! ## Features
//!
//! - Full command/property transport with clear-to-send polling
//! - 2-GFSK packet transmission and reception at 1200 to 115200 Bd
//! - Morse (direct OOK) beacon support keyed from a chip GPIO
//! - Chunked TX/RX streaming paced by FIFO almost-empty/full interrupts
//! - Latch-up protection interlock sequenced around every TX/RX operation
//! - Persisted transmit-enable flag (software RF mute surviving reboots)
//! - Uniform failure recovery ending in a firmware restart
//! - Scriptable mock HAL with a virtual clock for host-side testing
//!
//! ## Usage
//!
//! ```rust
//! use std::time::Duration;
//! use rflink_rs::{InMemoryStore, MockHal, RadioLink, TxType};
//!
//! let hal = MockHal::new();
//! let store = InMemoryStore::default();
//! let mut link = RadioLink::new(hal, store);
//! link.initialize(TxType::Packet);
//! link.send_and_wait(b"beacon");
//! let mut buffer = [0u8; 64];
//! let received = link.receive(&mut buffer, Duration::from_secs(1));
//! # let _ = received;
//! ```
//!
//! The driver is not reentrant: exactly one task owns the `RadioLink`, which
//! `&mut self` on every operation enforces at compile time.

pub mod logging;
pub mod radio;

pub use crate::logging::{init_logger, log_info};
pub use crate::radio::codec::PropertyGroup;
pub use crate::radio::datarate::{data_rate_config, DataRateConfig};
pub use crate::radio::driver::{
    RadioLink, RadioMode, RfError, TxType, CORRECT_PART_NUMBER, MAX_TX_DATA_LENGTH,
    RX_FIFO_SIZE, RX_FIFO_THRESHOLD, TX_FIFO_SIZE, TX_FIFO_THRESHOLD,
};
pub use crate::radio::hal::{Hal, HalError, MockHal, Pin, PinDirection, PinState, Transaction};
pub use crate::radio::irq::{InterruptStatus, ModemInterrupts, PacketHandlerInterrupts};
pub use crate::radio::persist::{InMemoryStore, PersistentStore};
