//! # Radio Link Driver Tests
//!
//! Tests for the Si4463 link-layer driver against the scriptable mock HAL:
//! FIFO chunking, software mute, safe-state restoration, the recovery
//! escalation ladder, CTS timing, and standby idempotence. The mock runs a
//! virtual clock, so even the deadline tests finish instantly.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;

use rflink_rs::radio::codec::commands;
use rflink_rs::{
    HalError, InMemoryStore, MockHal, PacketHandlerInterrupts, Pin, PinState, RadioLink,
    RadioMode, Transaction, TxType, RX_FIFO_THRESHOLD,
};

const RX_TIMEOUT: Duration = Duration::from_secs(1);

fn new_link(tx_enabled: bool) -> (MockHal, RadioLink<MockHal, InMemoryStore>) {
    let hal = MockHal::new();
    let link = RadioLink::new(hal.clone(), InMemoryStore::new(tx_enabled));
    (hal, link)
}

/// All commands with the given opcode, in order
fn commands_with_opcode(hal: &MockHal, opcode: u8) -> Vec<Vec<u8>> {
    hal.sent_commands()
        .into_iter()
        .filter(|command| command[0] == opcode)
        .collect()
}

/// Values written to the packet handler interrupt enable property, in order
fn ph_interrupt_writes(hal: &MockHal) -> Vec<u8> {
    hal.sent_commands()
        .into_iter()
        .filter(|c| c.len() == 5 && c[0] == commands::SET_PROPERTY && c[1] == 0x01 && c[3] == 0x01)
        .map(|c| c[4])
        .collect()
}

/// Values written to the RX FIFO threshold property, in order
fn rx_threshold_writes(hal: &MockHal) -> Vec<u8> {
    hal.sent_commands()
        .into_iter()
        .filter(|c| c.len() == 5 && c[0] == commands::SET_PROPERTY && c[1] == 0x12 && c[3] == 0x0C)
        .map(|c| c[4])
        .collect()
}

fn latchup_protection_enabled(hal: &MockHal) -> bool {
    hal.pin(Pin::LatchupDisable) == PinState::Low
}

mod streaming_tests {
    use super::*;

    /// A 100-byte payload against a chip reporting 40 bytes of free FIFO
    /// space goes out as exactly three writes of 40, 40, and 20 bytes, with
    /// START_TX issued once, after the first write
    #[test]
    fn test_send_chunking() {
        let (hal, mut link) = new_link(true);
        hal.set_tx_free_space(40);

        link.send_and_wait(&[0xAB; 100]);

        assert_eq!(hal.fifo_writes(), vec![40, 40, 20]);
        let journal = hal.journal();
        let start_tx_positions: Vec<usize> = journal
            .iter()
            .enumerate()
            .filter_map(|(i, t)| match t {
                Transaction::Command(c) if c[0] == commands::START_TX => Some(i),
                _ => None,
            })
            .collect();
        assert_eq!(start_tx_positions.len(), 1, "START_TX must be issued exactly once");
        let fifo_write_positions: Vec<usize> = journal
            .iter()
            .enumerate()
            .filter_map(|(i, t)| match t {
                Transaction::FifoWrite(_) => Some(i),
                _ => None,
            })
            .collect();
        assert!(fifo_write_positions[0] < start_tx_positions[0]);
        assert!(start_tx_positions[0] < fifo_write_positions[1]);
    }

    /// A payload smaller than the reported free space is written in one
    /// chunk without any suspension
    #[test]
    fn test_send_fits_into_first_window() {
        let (hal, mut link) = new_link(true);
        hal.set_tx_free_space(64);

        link.send_and_continue(&[0x55; 30]);

        assert_eq!(hal.fifo_writes(), vec![30]);
        assert_eq!(commands_with_opcode(&hal, commands::START_TX).len(), 1);
    }

    /// The announced packet length is the payload length, big-endian
    #[test]
    fn test_send_and_wait_sets_the_payload_length() {
        let (hal, mut link) = new_link(true);

        link.send_and_wait(&[0x00; 300]);

        let length_writes: Vec<Vec<u8>> = hal
            .sent_commands()
            .into_iter()
            .filter(|c| c[0] == commands::SET_PROPERTY && c[1] == 0x12 && c[3] == 0x0D)
            .collect();
        assert_eq!(length_writes, vec![vec![0x11, 0x12, 0x02, 0x0D, 0x01, 0x2C]]);
    }

    /// A 70-byte receive drains the FIFO as 32, 32, and 6 bytes and restores
    /// the almost-full threshold afterwards
    #[test]
    fn test_receive_chunking() {
        let (hal, mut link) = new_link(true);
        hal.set_rx_fill_level(6);

        let mut buffer = [0u8; 70];
        let received = link.receive(&mut buffer, RX_TIMEOUT);

        assert_eq!(received, 70);
        assert_eq!(hal.fifo_reads(), vec![32, 32, 6]);
        let thresholds = rx_threshold_writes(&hal);
        assert_eq!(thresholds, vec![6, RX_FIFO_THRESHOLD as u8]);
    }

    /// Received bytes land in the buffer in FIFO order
    #[test]
    fn test_receive_data_ordering() {
        let (hal, mut link) = new_link(true);
        hal.set_rx_fill_level(64);
        let expected: Vec<u8> = (1..=40).collect();
        hal.queue_rx_data(&expected);

        let mut buffer = [0u8; 40];
        let received = link.receive(&mut buffer, RX_TIMEOUT);

        assert_eq!(received, 40);
        assert_eq!(buffer.to_vec(), expected);
    }

    /// A deadline hit mid-reception returns the bytes received so far
    #[test]
    fn test_receive_timeout_returns_partial_count() {
        let (hal, mut link) = new_link(true);
        hal.push_edge_result(Ok(()));
        hal.push_edge_result(Err(HalError::Timeout));

        let mut buffer = [0u8; 70];
        let received = link.receive(&mut buffer, RX_TIMEOUT);

        assert_eq!(received, 32);
        assert_eq!(hal.fifo_reads(), vec![32]);
        assert_eq!(link.mode(), RadioMode::Standby);
        assert!(latchup_protection_enabled(&hal));
        assert_eq!(hal.reset_count(), 0);
    }
}

mod mute_tests {
    use super::*;

    /// With transmissions disabled, send operations succeed without a single
    /// bus transaction
    #[test]
    fn test_sends_are_noops_when_tx_is_disabled() {
        let (hal, mut link) = new_link(false);
        hal.clear_journal();

        link.send_and_wait(&[0x01; 128]);
        link.send_and_continue(&[0x02; 128]);

        assert!(hal.sent_commands().is_empty());
        assert!(hal.fifo_writes().is_empty());
        assert_eq!(hal.cts_polls(), 0);
        assert_eq!(hal.reset_count(), 0);
    }

    /// disable_tx() persists the flag and unpowers the PA; enable_tx()
    /// reverses both
    #[test]
    fn test_tx_enable_drives_the_pa_and_the_store() {
        let (hal, mut link) = new_link(true);

        link.disable_tx();
        assert!(!link.tx_enabled());
        assert_eq!(hal.pin(Pin::PaEnable), PinState::Low);

        link.enable_tx();
        assert!(link.tx_enabled());
        assert_eq!(hal.pin(Pin::PaEnable), PinState::High);
    }
}

mod safe_state_tests {
    use super::*;

    /// After a successful send: standby, interrupts disabled, latch-up
    /// protection enabled
    #[test]
    fn test_safe_state_after_send() {
        let (hal, mut link) = new_link(true);

        link.send_and_wait(&[0x42; 100]);

        assert_eq!(link.mode(), RadioMode::Standby);
        assert!(latchup_protection_enabled(&hal));
        assert_eq!(ph_interrupt_writes(&hal).last(), Some(&0x00));
    }

    /// After a successful receive: standby, interrupts disabled, latch-up
    /// protection enabled
    #[test]
    fn test_safe_state_after_receive() {
        let (hal, mut link) = new_link(true);
        hal.set_rx_fill_level(64);

        let mut buffer = [0u8; 96];
        link.receive(&mut buffer, RX_TIMEOUT);

        assert_eq!(link.mode(), RadioMode::Standby);
        assert!(latchup_protection_enabled(&hal));
        assert_eq!(ph_interrupt_writes(&hal).last(), Some(&0x00));
    }

    /// A send whose first attempt dies on an interrupt timeout still ends in
    /// the safe state once the retry succeeds
    #[test]
    fn test_safe_state_after_recovered_send() {
        let (hal, mut link) = new_link(true);
        hal.set_tx_free_space(40);
        hal.push_edge_result(Err(HalError::Timeout));

        link.send_and_wait(&[0x99; 100]);

        assert_eq!(link.mode(), RadioMode::Standby);
        assert!(latchup_protection_enabled(&hal));
        assert_eq!(ph_interrupt_writes(&hal).last(), Some(&0x00));
        assert_eq!(hal.reset_count(), 0);
    }

    /// Latch-up protection is disabled while the receive streams and
    /// re-enabled before the call returns
    #[test]
    fn test_latchup_protection_toggles_around_receive() {
        let (hal, mut link) = new_link(true);
        hal.set_rx_fill_level(64);

        let mut buffer = [0u8; 40];
        link.receive(&mut buffer, RX_TIMEOUT);

        let latchup_writes: Vec<PinState> = hal
            .journal()
            .into_iter()
            .filter_map(|t| match t {
                Transaction::PinWrite(Pin::LatchupDisable, state) => Some(state),
                _ => None,
            })
            .collect();
        assert!(latchup_writes.contains(&PinState::High));
        assert_eq!(latchup_writes.last(), Some(&PinState::Low));
    }
}

mod recovery_tests {
    use super::*;

    /// One failing attempt is retried without reinitializing the chip
    #[test]
    fn test_single_failure_is_retried() {
        let (hal, mut link) = new_link(true);
        hal.fail_next_transactions(1);

        let part_number = link.read_part_number();

        assert_eq!(part_number, 0x4463);
        assert_eq!(commands_with_opcode(&hal, commands::PART_INFO).len(), 2);
        assert_eq!(commands_with_opcode(&hal, commands::POWER_UP).len(), 0);
        assert_eq!(hal.reset_count(), 0);
    }

    /// Two failing attempts trigger exactly one reinitialization before the
    /// third attempt succeeds
    #[test]
    fn test_two_failures_trigger_one_reinitialization() {
        let (hal, mut link) = new_link(true);
        hal.fail_next_transactions(2);

        let part_number = link.read_part_number();

        assert_eq!(part_number, 0x4463);
        assert_eq!(commands_with_opcode(&hal, commands::PART_INFO).len(), 3);
        assert_eq!(commands_with_opcode(&hal, commands::POWER_UP).len(), 1);
        assert_eq!(hal.reset_count(), 0);
    }

    /// A persistently failing chip causes exactly one system reset and no
    /// further retries
    #[test]
    fn test_persistent_failure_resets_the_system() {
        let (hal, mut link) = new_link(true);
        hal.fail_next_transactions(usize::MAX);

        let outcome = catch_unwind(AssertUnwindSafe(|| link.read_part_number()));

        assert!(outcome.is_err());
        assert_eq!(hal.reset_count(), 1);
        assert_eq!(commands_with_opcode(&hal, commands::PART_INFO).len(), 3);
        // The failed escalation attempted the reinitialization exactly once
        let sdn_resets = hal
            .journal()
            .into_iter()
            .filter(|t| matches!(t, Transaction::PinWrite(Pin::Sdn, PinState::High)))
            .count();
        assert_eq!(sdn_resets, 1);
    }
}

mod cts_tests {
    use super::*;

    /// A chip reporting ready on poll k causes exactly k polls
    #[test]
    fn test_polls_until_the_chip_reports_ready() {
        let (hal, mut link) = new_link(true);
        hal.set_cts_ready_on_poll(5);

        let part_number = link.read_part_number();

        assert_eq!(part_number, 0x4463);
        assert_eq!(hal.cts_polls(), 5);
        assert_eq!(hal.reset_count(), 0);
    }

    /// A chip that never reports ready produces a timeout only once the
    /// configured deadline has elapsed
    #[test]
    fn test_timeout_fires_at_the_deadline() {
        let (hal, mut link) = new_link(true);
        hal.fail_next_transactions(1);

        link.read_part_number();

        // 100 ms deadline at a 10 us polling interval
        assert!(hal.elapsed() >= Duration::from_millis(100));
        assert!(hal.cts_polls() >= 9_000);
        assert_eq!(hal.reset_count(), 0);
    }
}

mod mode_tests {
    use super::*;

    /// Entering standby twice ends in the same state as entering it once,
    /// even when the second change-state command fails
    #[test]
    fn test_standby_is_idempotent_under_failure() {
        let (hal, mut link) = new_link(true);

        link.enter_standby_mode();
        assert_eq!(link.mode(), RadioMode::Standby);
        assert!(latchup_protection_enabled(&hal));

        hal.fail_next_transactions(1);
        link.enter_standby_mode();

        assert_eq!(link.mode(), RadioMode::Standby);
        assert!(latchup_protection_enabled(&hal));
        assert_eq!(hal.reset_count(), 0);
    }

    /// A transmission that was already reported sent returns without any
    /// interrupt wait
    #[test]
    fn test_suspend_until_data_sent_skips_the_wait_when_done() {
        let (hal, mut link) = new_link(true);
        hal.set_ph_status(PacketHandlerInterrupts::PACKET_SENT.bits());

        link.suspend_until_data_sent(Duration::from_secs(1));

        let edge_waits = hal
            .journal()
            .into_iter()
            .filter(|t| matches!(t, Transaction::EdgeWait))
            .count();
        assert_eq!(edge_waits, 0);
        assert_eq!(link.mode(), RadioMode::Standby);
        assert!(latchup_protection_enabled(&hal));
    }

    #[test]
    fn test_morse_output_keys_gpio0() {
        let (hal, mut link) = new_link(true);

        link.set_morse_output(true);
        assert_eq!(hal.pin(Pin::Gpio0), PinState::High);
        link.set_morse_output(false);
        assert_eq!(hal.pin(Pin::Gpio0), PinState::Low);
    }
}

mod data_rate_tests {
    use super::*;

    /// Rate setters only record the selection; the modem is reprogrammed by
    /// the next send, and only once
    #[test]
    fn test_data_rate_is_applied_lazily() {
        let (hal, mut link) = new_link(true);

        link.set_tx_data_rate(9600);
        assert_eq!(link.tx_data_rate(), 9600);
        assert!(hal.sent_commands().is_empty());

        link.send_and_continue(&[0x00; 16]);
        let data_rate_writes = |hal: &MockHal| {
            hal.sent_commands()
                .into_iter()
                .filter(|c| c[0] == commands::SET_PROPERTY && c[1] == 0x20 && c[3] == 0x03)
                .count()
        };
        assert_eq!(data_rate_writes(&hal), 1);

        hal.clear_journal();
        link.send_and_continue(&[0x00; 16]);
        assert_eq!(data_rate_writes(&hal), 0);
    }

    /// Requested rates snap to the nearest supported configuration
    #[test]
    fn test_rate_snapping() {
        let (_hal, mut link) = new_link(true);

        link.set_rx_data_rate(10_000);
        assert_eq!(link.rx_data_rate(), 9600);
        link.set_rx_data_rate(200_000);
        assert_eq!(link.rx_data_rate(), 115_200);
    }
}

mod initialization_tests {
    use super::*;

    /// Bring-up runs patch, power-up, configuration, and standby in order
    /// and powers the PA per the persisted flag
    #[test]
    fn test_initialize_sequence() {
        let (hal, mut link) = new_link(true);

        link.initialize(TxType::Packet);

        let sent = hal.sent_commands();
        // The patch goes in before POWER_UP
        assert_eq!(sent[0], vec![0x04, 0x21, 0x71, 0x4B, 0x00, 0x00, 0xDC, 0x95]);
        let power_up_position = sent
            .iter()
            .position(|c| c[0] == commands::POWER_UP)
            .expect("POWER_UP must be sent");
        assert_eq!(
            sent[power_up_position],
            vec![0x02, 0x81, 0x01, 0x01, 0x8C, 0xBA, 0x80]
        );
        assert!(sent
            .iter()
            .any(|c| c[0] == commands::CHANGE_STATE && c[1] == 0x01));
        assert_eq!(link.mode(), RadioMode::Standby);
        assert!(latchup_protection_enabled(&hal));
        assert_eq!(hal.pin(Pin::PaEnable), PinState::High);
        assert_eq!(hal.reset_count(), 0);
    }

    /// A persisted mute keeps the PA off across initialization
    #[test]
    fn test_initialize_restores_the_persisted_mute() {
        let (hal, mut link) = new_link(false);

        link.initialize(TxType::Packet);

        assert_eq!(hal.pin(Pin::PaEnable), PinState::Low);
        assert!(!link.tx_enabled());
    }

    /// Morse initialization selects direct OOK modulation
    #[test]
    fn test_initialize_for_morse_selects_ook() {
        let (hal, mut link) = new_link(true);

        link.initialize(TxType::Morse);

        let modulation_writes: Vec<Vec<u8>> = hal
            .sent_commands()
            .into_iter()
            .filter(|c| c[0] == commands::SET_PROPERTY && c[1] == 0x20 && c[3] == 0x00 && c[2] == 3)
            .collect();
        assert_eq!(modulation_writes.last().unwrap()[4], 0x09);
    }

    #[test]
    fn test_read_part_number() {
        let (hal, mut link) = new_link(true);
        hal.set_part_number(0x4463);
        assert_eq!(link.read_part_number(), 0x4463);
    }
}
