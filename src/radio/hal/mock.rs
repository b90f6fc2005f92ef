//! Mock HAL implementation for testing
//!
//! Simulates enough of the Si4463 command protocol to drive the full driver
//! without hardware: CTS polling with a configurable ready schedule, FIFO
//! info replies, interrupt status answers, scripted edge waits, and failure
//! injection. Time is virtual: `delay()` advances an internal clock instead
//! of sleeping, so the timing-sensitive tests run instantly and
//! deterministically.
//!
//! Cloning a `MockHal` yields a handle onto the same simulated chip, so a
//! test can keep one handle for inspection while the driver owns the other.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::radio::codec::commands;
use crate::radio::hal::{Hal, HalError, Pin, PinDirection, PinState};

/// One bus or pin interaction, as seen by the simulated chip
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    /// A command write (opcode + parameters), CTS polls excluded
    Command(Vec<u8>),
    /// One READ_CMD_BUFF status poll
    CtsPoll,
    /// A TX FIFO write of this many payload bytes
    FifoWrite(usize),
    /// An RX FIFO read of this many bytes
    FifoRead(usize),
    /// An output pin change
    PinWrite(Pin, PinState),
    /// One edge-interrupt wait
    EdgeWait,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadSource {
    None,
    Cts,
    Answer,
    Fifo,
}

#[derive(Debug)]
struct MockChip {
    journal: Vec<Transaction>,
    pins: HashMap<Pin, PinState>,
    /// CTS goes ready on the n-th poll of a transaction (1-based)
    cts_ready_on_poll: usize,
    /// Number of upcoming command transactions whose CTS never goes ready
    failures_to_inject: usize,
    polls_in_transaction: usize,
    transaction_doomed: bool,
    read_source: ReadSource,
    pending_answer: Vec<u8>,
    fifo_write_pending: bool,
    part_number: u16,
    tx_free_space: u8,
    rx_fill_level: u8,
    /// PH_STATUS byte reported by GET_INT_STATUS answers
    ph_status: u8,
    rx_data: VecDeque<u8>,
    rx_counter: u8,
    edge_results: VecDeque<Result<(), HalError>>,
    reset_count: usize,
    base: Instant,
    elapsed: Duration,
}

impl MockChip {
    fn new() -> Self {
        let mut pins = HashMap::new();
        // NIRQ idles high (no interrupt pending)
        pins.insert(Pin::Nirq, PinState::High);
        Self {
            journal: Vec::new(),
            pins,
            cts_ready_on_poll: 1,
            failures_to_inject: 0,
            polls_in_transaction: 0,
            transaction_doomed: false,
            read_source: ReadSource::None,
            pending_answer: Vec::new(),
            fifo_write_pending: false,
            part_number: 0x4463,
            tx_free_space: 64,
            rx_fill_level: 64,
            ph_status: 0x20, // packet sent
            rx_data: VecDeque::new(),
            rx_counter: 0,
            edge_results: VecDeque::new(),
            reset_count: 0,
            base: Instant::now(),
            elapsed: Duration::ZERO,
        }
    }

    fn process_command(&mut self, data: &[u8]) {
        self.journal.push(Transaction::Command(data.to_vec()));
        self.polls_in_transaction = 0;
        self.transaction_doomed = self.failures_to_inject > 0;
        self.failures_to_inject = self.failures_to_inject.saturating_sub(1);
        self.pending_answer = match data[0] {
            commands::PART_INFO => {
                let part = self.part_number.to_be_bytes();
                vec![0x02, part[0], part[1], 0x00, 0x00, 0x00, 0x00, 0x00]
            }
            commands::FIFO_INFO => vec![self.rx_fill_level, self.tx_free_space],
            commands::GET_INT_STATUS => {
                // Reading the status clears pending interrupts; NIRQ deasserts
                self.pins.insert(Pin::Nirq, PinState::High);
                vec![0x00, 0x00, self.ph_status, self.ph_status, 0x00, 0x00, 0x00, 0x00]
            }
            commands::GET_MODEM_STATUS => vec![0x00; 8],
            commands::GET_PROPERTY => vec![0x00; 8],
            _ => Vec::new(),
        };
    }

    fn fill_rx(&mut self, buf: &mut [u8]) {
        for byte in buf.iter_mut() {
            *byte = self.rx_data.pop_front().unwrap_or_else(|| {
                self.rx_counter = self.rx_counter.wrapping_add(1);
                self.rx_counter
            });
        }
    }
}

/// Mock HAL handle; see the module docs
#[derive(Debug, Clone)]
pub struct MockHal {
    chip: Arc<Mutex<MockChip>>,
}

impl Default for MockHal {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHal {
    pub fn new() -> Self {
        Self {
            chip: Arc::new(Mutex::new(MockChip::new())),
        }
    }

    /// Make the chip report CTS ready on the n-th poll of each transaction
    pub fn set_cts_ready_on_poll(&self, n: usize) {
        self.chip.lock().unwrap().cts_ready_on_poll = n;
    }

    /// Make the next `n` command transactions time out (CTS never ready)
    pub fn fail_next_transactions(&self, n: usize) {
        self.chip.lock().unwrap().failures_to_inject = n;
    }

    /// Set the free space reported for the TX FIFO
    pub fn set_tx_free_space(&self, bytes: u8) {
        self.chip.lock().unwrap().tx_free_space = bytes;
    }

    /// Set the fill level reported for the RX FIFO
    pub fn set_rx_fill_level(&self, bytes: u8) {
        self.chip.lock().unwrap().rx_fill_level = bytes;
    }

    /// Set the packet handler status byte reported by GET_INT_STATUS
    pub fn set_ph_status(&self, status: u8) {
        self.chip.lock().unwrap().ph_status = status;
    }

    pub fn set_part_number(&self, part_number: u16) {
        self.chip.lock().unwrap().part_number = part_number;
    }

    /// Queue bytes to be returned by RX FIFO reads (a counter pattern is used
    /// once the queue is empty)
    pub fn queue_rx_data(&self, data: &[u8]) {
        self.chip.lock().unwrap().rx_data.extend(data);
    }

    /// Script the outcomes of upcoming edge waits; unscripted waits succeed
    pub fn push_edge_result(&self, result: Result<(), HalError>) {
        self.chip.lock().unwrap().edge_results.push_back(result);
    }

    pub fn journal(&self) -> Vec<Transaction> {
        self.chip.lock().unwrap().journal.clone()
    }

    pub fn clear_journal(&self) {
        self.chip.lock().unwrap().journal.clear();
    }

    pub fn pin(&self, pin: Pin) -> PinState {
        *self
            .chip
            .lock()
            .unwrap()
            .pins
            .get(&pin)
            .unwrap_or(&PinState::Low)
    }

    pub fn reset_count(&self) -> usize {
        self.chip.lock().unwrap().reset_count
    }

    /// Virtual time elapsed since construction
    pub fn elapsed(&self) -> Duration {
        self.chip.lock().unwrap().elapsed
    }

    /// All command writes, in order
    pub fn sent_commands(&self) -> Vec<Vec<u8>> {
        self.journal()
            .into_iter()
            .filter_map(|t| match t {
                Transaction::Command(bytes) => Some(bytes),
                _ => None,
            })
            .collect()
    }

    /// Sizes of all TX FIFO writes, in order
    pub fn fifo_writes(&self) -> Vec<usize> {
        self.journal()
            .into_iter()
            .filter_map(|t| match t {
                Transaction::FifoWrite(len) => Some(len),
                _ => None,
            })
            .collect()
    }

    /// Sizes of all RX FIFO reads, in order
    pub fn fifo_reads(&self) -> Vec<usize> {
        self.journal()
            .into_iter()
            .filter_map(|t| match t {
                Transaction::FifoRead(len) => Some(len),
                _ => None,
            })
            .collect()
    }

    /// Number of CTS polls issued
    pub fn cts_polls(&self) -> usize {
        self.journal()
            .iter()
            .filter(|t| matches!(t, Transaction::CtsPoll))
            .count()
    }
}

impl Hal for MockHal {
    fn configure_spi(&mut self, _baudrate: u32) {}

    fn spi_write(&mut self, data: &[u8], _timeout: Duration) -> Result<(), HalError> {
        let mut chip = self.chip.lock().unwrap();
        if chip.fifo_write_pending {
            chip.fifo_write_pending = false;
            chip.journal.push(Transaction::FifoWrite(data.len()));
            return Ok(());
        }
        match data {
            [commands::READ_CMD_BUFF] => {
                chip.polls_in_transaction += 1;
                chip.journal.push(Transaction::CtsPoll);
                chip.read_source = ReadSource::Cts;
            }
            [commands::WRITE_TX_FIFO] => {
                chip.fifo_write_pending = true;
            }
            [commands::READ_RX_FIFO] => {
                chip.read_source = ReadSource::Fifo;
            }
            _ => chip.process_command(data),
        }
        Ok(())
    }

    fn spi_read(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<(), HalError> {
        let mut chip = self.chip.lock().unwrap();
        match chip.read_source {
            ReadSource::Cts => {
                let ready = !chip.transaction_doomed
                    && chip.polls_in_transaction >= chip.cts_ready_on_poll;
                buf[0] = if ready { 0xFF } else { 0x00 };
                chip.read_source = if ready {
                    ReadSource::Answer
                } else {
                    ReadSource::None
                };
            }
            ReadSource::Answer => {
                let answer = chip.pending_answer.clone();
                for (target, value) in buf.iter_mut().zip(answer) {
                    *target = value;
                }
                chip.read_source = ReadSource::None;
            }
            ReadSource::Fifo => {
                let len = buf.len();
                chip.fill_rx(buf);
                chip.journal.push(Transaction::FifoRead(len));
                chip.read_source = ReadSource::None;
            }
            ReadSource::None => buf.fill(0),
        }
        Ok(())
    }

    fn set_pin_direction(&mut self, _pin: Pin, _direction: PinDirection) {}

    fn gpio_write(&mut self, pin: Pin, state: PinState) {
        let mut chip = self.chip.lock().unwrap();
        chip.pins.insert(pin, state);
        chip.journal.push(Transaction::PinWrite(pin, state));
    }

    fn gpio_read(&mut self, pin: Pin) -> PinState {
        *self
            .chip
            .lock()
            .unwrap()
            .pins
            .get(&pin)
            .unwrap_or(&PinState::Low)
    }

    fn wait_for_falling_edge(&mut self, pin: Pin, deadline: Instant) -> Result<(), HalError> {
        let mut chip = self.chip.lock().unwrap();
        chip.journal.push(Transaction::EdgeWait);
        let result = chip.edge_results.pop_front().unwrap_or(Ok(()));
        match result {
            Ok(()) => {
                chip.pins.insert(pin, PinState::Low);
                chip.elapsed += Duration::from_micros(100);
            }
            Err(_) => {
                // A timed-out wait returns at the deadline
                let now = chip.base + chip.elapsed;
                if deadline > now {
                    chip.elapsed += deadline - now;
                }
            }
        }
        result
    }

    fn delay(&mut self, duration: Duration) {
        self.chip.lock().unwrap().elapsed += duration;
    }

    fn now(&self) -> Instant {
        let chip = self.chip.lock().unwrap();
        chip.base + chip.elapsed
    }

    fn system_reset(&mut self) -> ! {
        self.chip.lock().unwrap().reset_count += 1;
        panic!("system reset requested");
    }
}
