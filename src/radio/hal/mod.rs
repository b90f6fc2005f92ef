//! # Hardware Abstraction Layer for the Radio Transceiver
//!
//! This module defines the HAL trait the radio driver is generic over. A HAL
//! implementation provides exclusive SPI access to the transceiver, the named
//! GPIO pins of the RF section, edge-interrupt waits with a deadline, the
//! monotonic clock, and the non-returning system reset used as the last
//! escalation step of the recovery policy.

use std::time::{Duration, Instant};

use thiserror::Error;

/// Errors that can occur during HAL operations
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum HalError {
    #[error("SPI communication error")]
    Spi,

    #[error("GPIO operation error")]
    Gpio,

    #[error("Timeout waiting for operation")]
    Timeout,
}

/// Named pins of the RF section.
///
/// The driver only ever talks about logical pins; a board-specific HAL maps
/// them to physical lines. `LatchupDisable` in particular is driven as one
/// logical output even on board revisions that route it to two physical pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pin {
    /// SPI chip select, active low
    ChipSelect,
    /// Interrupt request from the chip, active low
    Nirq,
    /// Shutdown input of the chip, high keeps the chip in reset
    Sdn,
    /// Chip GPIO 0, used as the data source in direct (Morse) mode
    Gpio0,
    /// Chip GPIO 1
    Gpio1,
    /// Power amplifier enable
    PaEnable,
    /// Latch-up protection circuit; high disables the protection
    LatchupDisable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinDirection {
    Input,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinState {
    Low,
    High,
}

/// Hardware Abstraction Layer trait for Si4463 radio control
///
/// SPI transfers and edge waits are fallible and timeout-bounded; pin
/// configuration and writes are infallible (memory-mapped GPIO). The clock
/// methods let implementations control time, which the mock uses to run the
/// timing-sensitive tests on a virtual clock.
pub trait Hal {
    /// Configure the SPI bus used for the radio at the given baud rate
    fn configure_spi(&mut self, baudrate: u32);

    /// Write raw bytes to the radio over SPI (chip select is managed by the caller)
    fn spi_write(&mut self, data: &[u8], timeout: Duration) -> Result<(), HalError>;

    /// Read raw bytes from the radio over SPI (chip select is managed by the caller)
    fn spi_read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<(), HalError>;

    /// Configure a pin as input or output
    fn set_pin_direction(&mut self, pin: Pin, direction: PinDirection);

    /// Drive an output pin
    fn gpio_write(&mut self, pin: Pin, state: PinState);

    /// Read the current state of a pin
    fn gpio_read(&mut self, pin: Pin) -> PinState;

    /// Suspend the calling task until a falling edge occurs on the pin or the
    /// deadline is reached. Enabling, clearing, and disabling the edge
    /// detection around the wait is the implementation's concern.
    fn wait_for_falling_edge(&mut self, pin: Pin, deadline: Instant) -> Result<(), HalError>;

    /// Suspend the calling task for the given duration
    fn delay(&mut self, duration: Duration);

    /// Monotonic clock
    fn now(&self) -> Instant;

    /// Hard-reset the whole system. Does not return; the firmware restarts.
    fn system_reset(&mut self) -> !;
}

pub mod mock;

pub use mock::{MockHal, Transaction};
