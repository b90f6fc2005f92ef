//! # Si4463 Link-Layer Driver
//!
//! This module provides the link-layer driver for the Si4463 sub-GHz FSK/OOK
//! transceiver: command/property transport with clear-to-send polling,
//! chip bring-up (reset, patch, power-up, configuration), the
//! standby/transmit/receive mode machine with the latch-up protection
//! interlock, interrupt-driven FIFO streaming for payloads larger than the
//! 64-byte hardware FIFO, and the retry → reinitialize → system-reset
//! recovery policy applied to every public operation.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────┐
//! │     Telemetry / telecommand     │
//! ├─────────────────────────────────┤
//! │     RadioLink (this file)       │
//! ├─────────────────────────────────┤
//! │      Hal trait (SPI, GPIO)      │
//! ├─────────────────────────────────┤
//! │    Platform-specific Hal impl   │
//! └─────────────────────────────────┘
//! ```
//!
//! The driver is single-owner by construction: every operation takes
//! `&mut self`, and exactly one task may drive the radio at a time. All waits
//! are bounded by timeouts; a persistently failing chip ends in a firmware
//! restart, which is the only recovery with a chance of clearing a latched
//! hardware fault.

use std::time::{Duration, Instant};

use log::{debug, error, trace, warn};
use thiserror::Error;

use crate::radio::codec::{
    self, commands, PropertyGroup, CTS_READY, FIFO_INFO_ANSWER_LENGTH,
    INTERRUPT_STATUS_ANSWER_LENGTH, MODEM_STATUS_ANSWER_LENGTH, PART_INFO_ANSWER_LENGTH,
};
use crate::radio::config;
use crate::radio::datarate::{self, DataRateConfig};
use crate::radio::hal::{Hal, HalError, Pin, PinDirection, PinState};
use crate::radio::irq::{InterruptStatus, PacketHandlerInterrupts};
use crate::radio::persist::PersistentStore;

/// Hardware FIFO capacity in each direction
pub const TX_FIFO_SIZE: usize = 64;
pub const RX_FIFO_SIZE: usize = 64;
/// Free TX FIFO space that triggers the almost-empty interrupt
pub const TX_FIFO_THRESHOLD: usize = 48;
/// Stored RX FIFO bytes that trigger the almost-full interrupt
pub const RX_FIFO_THRESHOLD: usize = 32;

/// The packet length field of the chip is 13 bits wide
pub const MAX_TX_DATA_LENGTH: u16 = (1 << 13) - 1;

/// Part number reported by a healthy chip
pub const CORRECT_PART_NUMBER: u16 = 0x4463;

const SPI_BAUD_RATE: u32 = 6_000_000;

const SPI_TIMEOUT: Duration = Duration::from_millis(1);
const CTS_TIMEOUT: Duration = Duration::from_millis(100);
const POLLING_INTERVAL: Duration = Duration::from_micros(10);
const INTERRUPT_TIMEOUT: Duration = Duration::from_secs(1);

const POST_CHIP_SELECTION_DELAY: Duration = Duration::from_nanos(20);
const PRE_CHIP_DESELECTION_DELAY: Duration = Duration::from_nanos(50);

// Power-on reset timing: settle time for the PoR circuit after the shutdown
// pin goes high, and run time of the reset itself after it goes low again
const POR_CIRCUIT_SETTLE_DELAY: Duration = Duration::from_millis(100);
const POR_RUNNING_DELAY: Duration = Duration::from_millis(20);

// Receiving misbehaves without a settle time after a transmission
const POST_TX_DELAY: Duration = Duration::from_millis(100);

const RETRY_DELAY: Duration = Duration::from_millis(1);
const SYSTEM_RESET_DELAY: Duration = Duration::from_secs(1);

// CHANGE_STATE argument for the standby state
const STANDBY_STATE: u8 = 0x01;
// START_TX condition: return to the ready state once the packet is sent
const TX_COMPLETE_TO_READY: u8 = 0x30;

/// Errors that can occur during radio operations
///
/// Callers of the public API rarely observe these: the recovery policy
/// retries, reinitializes, and ultimately restarts the firmware instead of
/// propagating a persistent failure.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RfError {
    /// Hardware abstraction layer error (SPI, GPIO)
    #[error("HAL error: {0}")]
    Hal(#[from] HalError),
    /// CTS polling or an interrupt wait exceeded its deadline
    #[error("timeout")]
    Timeout,
}

/// Radio operating modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioMode {
    /// Idle, safe to configure; latch-up protection enabled
    Standby,
    /// Actively transmitting from the FIFO
    Transmit,
    /// Actively receiving into the FIFO
    Receive,
}

/// Transmission type: modulation and data source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxType {
    /// 2-GFSK, data from the packet handler FIFO
    Packet,
    /// OOK, keyed directly from GPIO0
    Morse,
}

/// Link-layer driver instance for the Si4463 transceiver
///
/// Owns the HAL and the persistent-store handle; exactly one `RadioLink`
/// should exist per radio, and `&mut self` on every operation makes
/// concurrent use impossible by construction.
///
/// The latch-up protection interlock is the driver's primary safety
/// obligation: the protection circuit is disabled only while the chip is
/// actively transmitting or receiving, and every exit path of every
/// operation re-enables it.
pub struct RadioLink<H: Hal, P: PersistentStore> {
    hal: H,
    store: P,
    mode: RadioMode,
    tx_type: TxType,
    tx_data_rate: &'static DataRateConfig,
    rx_data_rate: &'static DataRateConfig,
    /// Rate the modem is currently programmed for; TX/RX rewrite the modem
    /// properties lazily when their configured rate differs
    current_data_rate: u32,
}

impl<H: Hal, P: PersistentStore> RadioLink<H, P> {
    pub fn new(hal: H, store: P) -> Self {
        Self {
            hal,
            store,
            mode: RadioMode::Standby,
            tx_type: TxType::Packet,
            tx_data_rate: &datarate::DATA_RATE_1200,
            rx_data_rate: &datarate::DATA_RATE_1200,
            current_data_rate: datarate::DATA_RATE_1200.data_rate,
        }
    }

    // ========================== PUBLIC API ==========================
    //
    // Every operation that talks to the chip goes through
    // execute_with_recovery(): one retry after a short delay, then a full
    // reinitialization and a final attempt, then a system reset. A public
    // operation therefore either succeeds or the firmware restarts.

    /// Bring up the chip: pins and SPI, reset pulse, firmware patch,
    /// power-up, configuration, standby. The transmit-enable flag is restored
    /// from the persistent store and the PA is switched accordingly.
    pub fn initialize(&mut self, tx_type: TxType) {
        self.tx_type = tx_type;
        self.execute_with_recovery(|link| link.do_initialize(tx_type));
    }

    /// Enable transmissions: persist the flag and power the PA
    pub fn enable_tx(&mut self) {
        self.store.store_tx_enabled(true);
        self.hal.gpio_write(Pin::PaEnable, PinState::High);
    }

    /// Disable transmissions (software mute): persist the flag and unpower
    /// the PA. Send operations become no-ops until re-enabled.
    pub fn disable_tx(&mut self) {
        self.store.store_tx_enabled(false);
        self.hal.gpio_write(Pin::PaEnable, PinState::Low);
    }

    pub fn tx_enabled(&self) -> bool {
        self.store.load_tx_enabled()
    }

    /// Read the chip's part number (0x4463 for a healthy Si4463)
    pub fn read_part_number(&mut self) -> u16 {
        self.execute_with_recovery(|link| link.do_read_part_number())
    }

    /// Put the chip into standby and re-enable latch-up protection
    pub fn enter_standby_mode(&mut self) {
        self.execute_with_recovery(|link| link.do_enter_standby_mode());
    }

    /// Select the modulation type and data source for transmissions
    pub fn set_tx_type(&mut self, tx_type: TxType) {
        self.execute_with_recovery(|link| link.do_set_tx_type(tx_type));
    }

    /// Set the packet length the chip announces for the next transmission.
    /// Must be called before [`Self::send_and_continue`];
    /// [`Self::send_and_wait`] does it itself.
    pub fn set_tx_data_length(&mut self, length: u16) {
        self.execute_with_recovery(|link| link.do_set_tx_data_length(length));
    }

    /// Select the TX data rate; snapped to the nearest supported rate and
    /// applied to the modem by the next transmission
    pub fn set_tx_data_rate(&mut self, data_rate: u32) {
        self.tx_data_rate = datarate::data_rate_config(data_rate);
    }

    /// Select the RX data rate; snapped to the nearest supported rate and
    /// applied to the modem by the next reception
    pub fn set_rx_data_rate(&mut self, data_rate: u32) {
        self.rx_data_rate = datarate::data_rate_config(data_rate);
    }

    pub fn tx_data_rate(&self) -> u32 {
        self.tx_data_rate.data_rate
    }

    pub fn rx_data_rate(&self) -> u32 {
        self.rx_data_rate.data_rate
    }

    pub fn mode(&self) -> RadioMode {
        self.mode
    }

    /// Send `data` and block until the chip reports the packet sent, then
    /// enter standby. A no-op when transmissions are disabled.
    pub fn send_and_wait(&mut self, data: &[u8]) {
        self.execute_with_recovery(|link| link.do_send_and_wait(data));
    }

    /// Send `data` and return as soon as the last chunk was written to the
    /// FIFO, staying in transmit mode. This allows back-to-back packets
    /// without interrupting the transmission. A no-op when transmissions are
    /// disabled.
    pub fn send_and_continue(&mut self, data: &[u8]) {
        self.execute_with_recovery(|link| link.do_send_and_continue(data));
    }

    /// Block until the chip reports the current packet fully sent or the
    /// timeout elapses; always leaves transmit mode and re-enables latch-up
    /// protection
    pub fn suspend_until_data_sent(&mut self, timeout: Duration) {
        self.execute_with_recovery(|link| link.do_suspend_until_data_sent(timeout));
    }

    /// Receive into `data` until the buffer is full or the timeout elapses.
    /// Returns the number of bytes received; ends in standby with interrupts
    /// disabled and latch-up protection enabled on every path.
    pub fn receive(&mut self, data: &mut [u8], timeout: Duration) -> usize {
        self.execute_with_recovery(|link| link.do_receive(data, timeout))
    }

    /// Key the carrier on or off in Morse (direct OOK) mode via GPIO0
    pub fn set_morse_output(&mut self, keyed: bool) {
        let state = if keyed { PinState::High } else { PinState::Low };
        self.hal.gpio_write(Pin::Gpio0, state);
    }

    // ========================== RECOVERY POLICY ==========================

    /// Run `operation`; on failure retry once after a short delay, then
    /// reinitialize the chip (ignoring the result) and try a final time. If
    /// that also fails, reset the whole system — this call does not return
    /// then.
    fn execute_with_recovery<T>(
        &mut self,
        mut operation: impl FnMut(&mut Self) -> Result<T, RfError>,
    ) -> T {
        match operation(self) {
            Ok(value) => return value,
            Err(e) => warn!("Radio operation failed: {e}, retrying"),
        }
        self.hal.delay(RETRY_DELAY);
        match operation(self) {
            Ok(value) => return value,
            Err(e) => warn!("Radio operation failed again: {e}, reinitializing the chip"),
        }
        let tx_type = self.tx_type;
        if let Err(e) = self.do_initialize(tx_type) {
            warn!("Reinitialization failed: {e}");
        }
        match operation(self) {
            Ok(value) => return value,
            Err(e) => error!("Radio operation failed after reinitialization: {e}, resetting"),
        }
        self.hal.delay(SYSTEM_RESET_DELAY);
        self.hal.system_reset()
    }

    // ========================== CHIP BRING-UP ==========================

    fn do_initialize(&mut self, tx_type: TxType) -> Result<(), RfError> {
        self.configure_gpios_and_spi();
        self.apply_patch()?;
        self.power_up()?;
        self.configure()?;
        self.set_constant_modem_properties()?;
        self.do_set_tx_type(tx_type)?;
        self.set_data_rate(self.tx_data_rate)?;
        self.do_enter_standby_mode()?;
        if self.store.load_tx_enabled() {
            self.enable_tx();
        } else {
            self.disable_tx();
        }
        debug!("Radio initialized for {tx_type:?} transmissions");
        Ok(())
    }

    fn configure_gpios_and_spi(&mut self) {
        self.hal.set_pin_direction(Pin::ChipSelect, PinDirection::Output);
        self.hal.gpio_write(Pin::ChipSelect, PinState::High);
        self.hal.set_pin_direction(Pin::Nirq, PinDirection::Input);
        self.hal.set_pin_direction(Pin::Sdn, PinDirection::Output);
        self.hal.gpio_write(Pin::Sdn, PinState::High);
        self.hal.set_pin_direction(Pin::Gpio0, PinDirection::Output);
        self.hal.gpio_write(Pin::Gpio0, PinState::Low);
        self.hal.set_pin_direction(Pin::Gpio1, PinDirection::Input);
        self.hal.set_pin_direction(Pin::PaEnable, PinDirection::Output);
        self.hal.gpio_write(Pin::PaEnable, PinState::Low);
        self.hal
            .set_pin_direction(Pin::LatchupDisable, PinDirection::Output);
        self.enable_latchup_protection();
        self.hal.configure_spi(SPI_BAUD_RATE);
        // Holding SDN high resets the chip; release it and wait for the
        // power-on reset to finish
        self.hal.delay(POR_CIRCUIT_SETTLE_DELAY);
        self.hal.gpio_write(Pin::Sdn, PinState::Low);
        self.hal.delay(POR_RUNNING_DELAY);
    }

    // Must run after reset but before power_up()
    fn apply_patch(&mut self) -> Result<(), RfError> {
        debug!("Applying firmware patch ({} bytes)", config::PATCH.len());
        let mut i = 0;
        while i < config::PATCH.len() {
            let line_length = config::PATCH[i] as usize;
            self.send_command(&config::PATCH[i + 1..=i + line_length])?;
            i += 1 + line_length;
        }
        Ok(())
    }

    fn power_up(&mut self) -> Result<(), RfError> {
        self.send_command(&codec::power_up(
            config::BOOT_OPTIONS,
            config::XTAL_OPTIONS,
            config::XO_FREQUENCY,
        ))
    }

    fn configure(&mut self) -> Result<(), RfError> {
        self.send_command(&config::GPIO_PIN_CONFIG)?;
        for block in config::CONFIG_TABLE {
            self.set_properties(block.group, block.start_index, block.values)?;
        }
        Ok(())
    }

    fn set_constant_modem_properties(&mut self) -> Result<(), RfError> {
        for block in config::CONSTANT_MODEM_PROPERTIES {
            self.set_properties(block.group, block.start_index, block.values)?;
        }
        Ok(())
    }

    fn do_set_tx_type(&mut self, tx_type: TxType) -> Result<(), RfError> {
        // MODEM_MOD_TYPE: packet 2-GFSK from the FIFO, or direct OOK keyed
        // from GPIO0; map control and DSM stay at their defaults
        let modulation = match tx_type {
            TxType::Packet => 0x03,
            TxType::Morse => 0x09,
        };
        self.set_properties(PropertyGroup::Modem, 0x00, &[modulation, 0x00, 0x07])?;
        self.tx_type = tx_type;
        Ok(())
    }

    /// Write all data-rate dependent modem properties and track the rate the
    /// modem is now programmed for
    fn set_data_rate(&mut self, cfg: &'static DataRateConfig) -> Result<(), RfError> {
        self.set_properties(PropertyGroup::Modem, 0x03, &cfg.modem_data_rate)?;
        self.set_properties(PropertyGroup::Modem, 0x0B, &cfg.modem_freq_dev)?;
        self.set_properties(PropertyGroup::Modem, 0x1E, &cfg.modem_decimation_cfg)?;
        self.set_properties(PropertyGroup::Modem, 0x23, &cfg.modem_bcr_osr)?;
        self.set_properties(PropertyGroup::Modem, 0x2D, &cfg.modem_afc_wait)?;
        self.set_properties(PropertyGroup::Modem, 0x39, &cfg.modem_agc_rfpd_decay)?;
        self.set_properties(PropertyGroup::Modem, 0x40, &cfg.modem_ook_pdtc)?;
        self.set_properties(PropertyGroup::Modem, 0x46, &cfg.modem_raw_eye)?;
        self.set_properties(PropertyGroup::Modem, 0x54, &cfg.modem_spike_det)?;
        self.set_properties(PropertyGroup::Modem, 0x5D, &cfg.modem_dsa_qual)?;
        self.set_properties(PropertyGroup::ModemChflt, 0x00, &cfg.chflt_coefficients[0])?;
        self.set_properties(PropertyGroup::ModemChflt, 0x0C, &cfg.chflt_coefficients[1])?;
        self.set_properties(PropertyGroup::ModemChflt, 0x18, &cfg.chflt_coefficients[2])?;
        self.set_properties(PropertyGroup::Preamble, 0x00, &cfg.preamble_tx_length)?;
        self.current_data_rate = cfg.data_rate;
        debug!("Modem programmed for {} Bd", cfg.data_rate);
        Ok(())
    }

    // ========================== MODE MACHINE ==========================

    fn do_read_part_number(&mut self) -> Result<u16, RfError> {
        let answer = self
            .send_command_with_answer::<PART_INFO_ANSWER_LENGTH>(&[commands::PART_INFO])?;
        Ok(codec::part_number(&answer))
    }

    fn do_enter_standby_mode(&mut self) -> Result<(), RfError> {
        let result = self.send_command(&[commands::CHANGE_STATE, STANDBY_STATE]);
        // Latch-up protection comes back on even if the command failed
        self.mode = RadioMode::Standby;
        self.enable_latchup_protection();
        result
    }

    fn do_set_tx_data_length(&mut self, length: u16) -> Result<(), RfError> {
        assert!(
            length <= MAX_TX_DATA_LENGTH,
            "TX data length {length} exceeds the 13-bit packet length field"
        );
        const I_PKT_FIELD_1_LENGTH: u8 = 0x0D;
        self.set_properties(
            PropertyGroup::Pkt,
            I_PKT_FIELD_1_LENGTH,
            &length.to_be_bytes(),
        )
    }

    fn start_tx(&mut self) -> Result<(), RfError> {
        // Length 0: the packet length property set by set_tx_data_length()
        // is used
        self.send_command(&codec::start_tx(0, TX_COMPLETE_TO_READY, 0, 0, 0))?;
        debug!("Mode {:?} -> Transmit", self.mode);
        self.mode = RadioMode::Transmit;
        Ok(())
    }

    fn start_rx(&mut self) -> Result<(), RfError> {
        // Length 0: the packet handler field configuration is used; remain
        // in RX on preamble timeout and on both CRC outcomes (CRC is off)
        self.send_command(&codec::start_rx(0, 0x00, 0, 0x00, 0x00, 0x00))?;
        debug!("Mode {:?} -> Receive", self.mode);
        self.mode = RadioMode::Receive;
        Ok(())
    }

    /// Latch-up protection must be disabled only while the chip actively
    /// transmits or receives; the HAL fans the logical pin out to however
    /// many physical lines the board revision has.
    fn enable_latchup_protection(&mut self) {
        self.hal.gpio_write(Pin::LatchupDisable, PinState::Low);
    }

    fn disable_latchup_protection(&mut self) {
        self.hal.gpio_write(Pin::LatchupDisable, PinState::High);
    }

    // ========================== FIFO STREAMING ==========================

    fn do_send_and_wait(&mut self, data: &[u8]) -> Result<(), RfError> {
        if !self.store.load_tx_enabled() {
            return Ok(());
        }
        self.do_set_tx_data_length(data.len() as u16)?;
        let result = self
            .do_send_and_continue(data)
            .and_then(|()| self.do_suspend_until_data_sent(INTERRUPT_TIMEOUT));
        self.do_enter_standby_mode()?;
        result
    }

    fn do_send_and_continue(&mut self, data: &[u8]) -> Result<(), RfError> {
        if !self.store.load_tx_enabled() {
            return Ok(());
        }
        if self.current_data_rate != self.tx_data_rate.data_rate {
            self.set_data_rate(self.tx_data_rate)?;
        }
        if self.mode != RadioMode::Transmit {
            self.reset_fifos()?;
            self.disable_latchup_protection();
        }
        let mut index = 0;
        let result = self.stream_tx_chunks(data, &mut index);
        self.set_packet_handler_interrupts(PacketHandlerInterrupts::empty())?;
        result?;
        // The remainder fits into the reported free space; no need to
        // suspend for it
        self.write_to_fifo(&data[index..])?;
        if self.mode != RadioMode::Transmit {
            self.start_tx()?;
        }
        Ok(())
    }

    /// Feed the TX FIFO chunk by chunk, suspending on the almost-empty
    /// interrupt, while more data remains than the chip reports as free
    /// space. The free space is re-queried every iteration; the chip's
    /// answer can legitimately differ from the configured threshold.
    fn stream_tx_chunks(&mut self, data: &[u8], index: &mut usize) -> Result<(), RfError> {
        self.set_packet_handler_interrupts(PacketHandlerInterrupts::TX_FIFO_ALMOST_EMPTY)?;
        let mut free_space = usize::from(self.read_free_tx_fifo_space()?);
        while *index + free_space < data.len() {
            self.write_to_fifo(&data[*index..*index + free_space])?;
            self.read_and_clear_interrupt_status()?;
            if self.mode != RadioMode::Transmit {
                self.start_tx()?;
            }
            *index += free_space;
            self.suspend_until_interrupt_for(INTERRUPT_TIMEOUT)?;
            free_space = usize::from(self.read_free_tx_fifo_space()?);
        }
        Ok(())
    }

    fn do_suspend_until_data_sent(&mut self, timeout: Duration) -> Result<(), RfError> {
        let result = self.await_packet_sent(timeout);
        // We do not stay in TX mode, no matter how the transmission ended
        self.mode = RadioMode::Standby;
        self.enable_latchup_protection();
        // Receiving does not work without a settle time after TX
        self.hal.delay(POST_TX_DELAY);
        self.set_packet_handler_interrupts(PacketHandlerInterrupts::empty())?;
        result
    }

    fn await_packet_sent(&mut self, timeout: Duration) -> Result<(), RfError> {
        self.set_packet_handler_interrupts(PacketHandlerInterrupts::PACKET_SENT)?;
        let status = self.read_and_clear_interrupt_status()?;
        if !status.packet_sent() {
            self.suspend_until_interrupt_for(timeout)?;
        }
        Ok(())
    }

    fn do_receive(&mut self, data: &mut [u8], timeout: Duration) -> Result<usize, RfError> {
        let result = self.stream_rx(data, timeout);
        // Back to the safe state on every path: interrupts off, standby,
        // latch-up protection on, pending interrupts cleared
        let interrupt_result =
            self.set_packet_handler_interrupts(PacketHandlerInterrupts::empty());
        self.do_enter_standby_mode()?;
        interrupt_result?;
        self.read_and_clear_interrupt_status()?;
        result
    }

    /// Drain the RX FIFO in threshold-sized chunks, suspending on the
    /// almost-full interrupt; the final partial chunk reprograms the
    /// threshold to the remainder and polls the live fill level once before
    /// deciding to suspend. A deadline hit returns the bytes received so far
    /// as a successful partial reception.
    fn stream_rx(&mut self, data: &mut [u8], timeout: Duration) -> Result<usize, RfError> {
        if self.current_data_rate != self.rx_data_rate.data_rate {
            self.set_data_rate(self.rx_data_rate)?;
        }
        self.reset_fifos()?;
        self.set_packet_handler_interrupts(PacketHandlerInterrupts::RX_FIFO_ALMOST_FULL)?;
        self.read_and_clear_interrupt_status()?;
        self.disable_latchup_protection();
        let deadline = self.hal.now() + timeout;
        self.start_rx()?;
        self.log_modem_status();
        let mut index = 0;
        while index + RX_FIFO_THRESHOLD < data.len() {
            if self.suspend_until_interrupt(deadline).is_err() {
                return Ok(index);
            }
            self.log_modem_status();
            self.read_and_clear_interrupt_status()?;
            self.read_from_fifo(&mut data[index..index + RX_FIFO_THRESHOLD])?;
            index += RX_FIFO_THRESHOLD;
        }
        let remainder = data.len() - index;
        self.set_rx_fifo_threshold(remainder as u8)?;
        let fill_level = usize::from(self.read_rx_fifo_fill_level()?);
        if fill_level < remainder && self.suspend_until_interrupt(deadline).is_err() {
            return Ok(index);
        }
        self.read_from_fifo(&mut data[index..])?;
        self.set_rx_fifo_threshold(RX_FIFO_THRESHOLD as u8)?;
        index += remainder;
        Ok(index)
    }

    // ========================== FIFO AND INTERRUPT HELPERS ==========================

    fn reset_fifos(&mut self) -> Result<(), RfError> {
        const RESET_BOTH_FIFOS: u8 = 0b11;
        self.send_command(&[commands::FIFO_INFO, RESET_BOTH_FIFOS])
    }

    fn read_free_tx_fifo_space(&mut self) -> Result<u8, RfError> {
        let answer =
            self.send_command_with_answer::<FIFO_INFO_ANSWER_LENGTH>(&[commands::FIFO_INFO, 0x00])?;
        Ok(answer[1])
    }

    fn read_rx_fifo_fill_level(&mut self) -> Result<u8, RfError> {
        let answer =
            self.send_command_with_answer::<FIFO_INFO_ANSWER_LENGTH>(&[commands::FIFO_INFO, 0x00])?;
        Ok(answer[0])
    }

    fn write_to_fifo(&mut self, data: &[u8]) -> Result<(), RfError> {
        if data.is_empty() {
            return Ok(());
        }
        trace!("TX FIFO <- {}", hex::encode(data));
        self.busy_wait_for_cts(CTS_TIMEOUT)?;
        self.select_chip();
        let result = self
            .hal
            .spi_write(&[commands::WRITE_TX_FIFO], SPI_TIMEOUT)
            .and_then(|()| self.hal.spi_write(data, SPI_TIMEOUT));
        self.deselect_chip();
        Ok(result?)
    }

    fn read_from_fifo(&mut self, data: &mut [u8]) -> Result<(), RfError> {
        self.select_chip();
        let result = self
            .hal
            .spi_write(&[commands::READ_RX_FIFO], SPI_TIMEOUT)
            .and_then(|()| self.hal.spi_read(data, SPI_TIMEOUT));
        self.deselect_chip();
        result?;
        trace!("RX FIFO -> {}", hex::encode(&*data));
        Ok(())
    }

    fn set_rx_fifo_threshold(&mut self, threshold: u8) -> Result<(), RfError> {
        const I_PKT_RX_THRESHOLD: u8 = 0x0C;
        self.set_properties(PropertyGroup::Pkt, I_PKT_RX_THRESHOLD, &[threshold])
    }

    fn set_packet_handler_interrupts(
        &mut self,
        interrupts: PacketHandlerInterrupts,
    ) -> Result<(), RfError> {
        const I_INT_CTL_PH_ENABLE: u8 = 0x01;
        self.set_properties(PropertyGroup::IntCtl, I_INT_CTL_PH_ENABLE, &[interrupts.bits()])
    }

    /// Read the full interrupt status with zeroed clear masks, which also
    /// clears all pending interrupts and deasserts NIRQ
    fn read_and_clear_interrupt_status(&mut self) -> Result<InterruptStatus, RfError> {
        let answer = self.send_command_with_answer::<INTERRUPT_STATUS_ANSWER_LENGTH>(&[
            commands::GET_INT_STATUS,
            0x00,
            0x00,
            0x00,
        ])?;
        Ok(InterruptStatus::from(answer))
    }

    /// Suspend until the NIRQ pin goes low or the deadline is reached
    fn suspend_until_interrupt(&mut self, deadline: Instant) -> Result<(), RfError> {
        while self.hal.gpio_read(Pin::Nirq) == PinState::High {
            self.hal
                .wait_for_falling_edge(Pin::Nirq, deadline)
                .map_err(|e| match e {
                    HalError::Timeout => RfError::Timeout,
                    other => RfError::Hal(other),
                })?;
        }
        Ok(())
    }

    fn suspend_until_interrupt_for(&mut self, timeout: Duration) -> Result<(), RfError> {
        let deadline = self.hal.now() + timeout;
        self.suspend_until_interrupt(deadline)
    }

    fn log_modem_status(&mut self) {
        if !log::log_enabled!(log::Level::Debug) {
            return;
        }
        match self.send_command_with_answer::<MODEM_STATUS_ANSWER_LENGTH>(&[
            commands::GET_MODEM_STATUS,
        ]) {
            Ok(status) => debug!(
                "Current RSSI: {:.1} dBm, latched RSSI: {:.1} dBm, AFC offset: {}",
                f64::from(status[2]) / 2.0 - 70.0,
                f64::from(status[3]) / 2.0 - 70.0,
                u16::from_be_bytes([status[6], status[7]]),
            ),
            Err(e) => warn!("Reading modem status failed: {e}"),
        }
    }

    // ========================== COMMAND TRANSPORT ==========================

    fn set_properties(
        &mut self,
        group: PropertyGroup,
        start_index: u8,
        values: &[u8],
    ) -> Result<(), RfError> {
        self.send_command(&codec::set_property(group, start_index, values))
    }

    fn send_command(&mut self, command: &[u8]) -> Result<(), RfError> {
        self.send_command_with_answer::<0>(command).map(|_| ())
    }

    /// Write a command, then poll for clear-to-send and read the expected
    /// answer while chip select stays asserted
    fn send_command_with_answer<const N: usize>(
        &mut self,
        command: &[u8],
    ) -> Result<[u8; N], RfError> {
        self.select_chip();
        let write_result = self.hal.spi_write(command, SPI_TIMEOUT);
        self.deselect_chip();
        write_result?;
        self.busy_wait_for_answer::<N>(CTS_TIMEOUT)
    }

    fn busy_wait_for_cts(&mut self, timeout: Duration) -> Result<(), RfError> {
        self.busy_wait_for_answer::<0>(timeout).map(|_| ())
    }

    /// Poll READ_CMD_BUFF until the chip reports ready, then read the answer.
    /// This is a bounded busy loop, not a true suspension: the chip becomes
    /// ready within microseconds.
    fn busy_wait_for_answer<const N: usize>(&mut self, timeout: Duration) -> Result<[u8; N], RfError> {
        let deadline = self.hal.now() + timeout;
        loop {
            self.select_chip();
            match self.poll_cts() {
                // Chip select stays asserted for the answer read
                Ok(true) => break,
                Ok(false) => self.deselect_chip(),
                Err(e) => {
                    self.deselect_chip();
                    return Err(e.into());
                }
            }
            self.hal.delay(POLLING_INTERVAL);
            if self.hal.now() > deadline {
                return Err(RfError::Timeout);
            }
        }
        let mut answer = [0; N];
        let read_result = if N > 0 {
            self.hal.spi_read(&mut answer, SPI_TIMEOUT)
        } else {
            Ok(())
        };
        self.deselect_chip();
        read_result?;
        Ok(answer)
    }

    fn poll_cts(&mut self) -> Result<bool, HalError> {
        self.hal.spi_write(&[commands::READ_CMD_BUFF], SPI_TIMEOUT)?;
        let mut status = [0u8; 1];
        self.hal.spi_read(&mut status, SPI_TIMEOUT)?;
        Ok(status[0] == CTS_READY)
    }

    fn select_chip(&mut self) {
        self.hal.gpio_write(Pin::ChipSelect, PinState::Low);
        self.hal.delay(POST_CHIP_SELECTION_DELAY);
    }

    fn deselect_chip(&mut self) {
        self.hal.delay(PRE_CHIP_DESELECTION_DELAY);
        self.hal.gpio_write(Pin::ChipSelect, PinState::High);
    }
}
