//! # Si4463 Command Codec
//!
//! Builders for the chip's binary command format and views over its
//! fixed-length answers. Commands are an opcode byte followed by parameter
//! bytes; all multi-byte numeric fields are big-endian, matching the
//! over-the-air byte order. See "AN625: Si446x API Descriptions".

/// Command opcodes
pub mod commands {
    pub const PART_INFO: u8 = 0x01;
    pub const POWER_UP: u8 = 0x02;
    pub const FUNC_INFO: u8 = 0x10;
    pub const SET_PROPERTY: u8 = 0x11;
    pub const GET_PROPERTY: u8 = 0x12;
    pub const GPIO_PIN_CFG: u8 = 0x13;
    pub const FIFO_INFO: u8 = 0x15;
    pub const GET_INT_STATUS: u8 = 0x20;
    pub const GET_MODEM_STATUS: u8 = 0x22;
    pub const START_TX: u8 = 0x31;
    pub const START_RX: u8 = 0x32;
    pub const REQUEST_DEVICE_STATE: u8 = 0x33;
    pub const CHANGE_STATE: u8 = 0x34;
    pub const READ_CMD_BUFF: u8 = 0x44;
    pub const WRITE_TX_FIFO: u8 = 0x66;
    pub const READ_RX_FIFO: u8 = 0x77;
}

/// Command answer lengths
pub const PART_INFO_ANSWER_LENGTH: usize = 8;
pub const FIFO_INFO_ANSWER_LENGTH: usize = 2;
pub const INTERRUPT_STATUS_ANSWER_LENGTH: usize = 8;
pub const MODEM_STATUS_ANSWER_LENGTH: usize = 8;

/// Status byte returned by READ_CMD_BUFF once the chip is ready
pub const CTS_READY: u8 = 0xFF;

/// Max. number of property values that can be set in a single command.
/// Exceeding this corrupts the registers following the addressed ones.
pub const MAX_PROPERTIES: usize = 12;

/// Property groups of the chip's configuration space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PropertyGroup {
    Global = 0x00,
    /// Interrupt control
    IntCtl = 0x01,
    /// Fast response register control
    FrrCtl = 0x02,
    Preamble = 0x10,
    /// Sync word
    Sync = 0x11,
    /// Packet handler
    Pkt = 0x12,
    /// Selects type of modulation. TX: also selects source of modulation.
    Modem = 0x20,
    /// Channel filter coefficients
    ModemChflt = 0x21,
    /// Power amplifier
    Pa = 0x22,
    Synth = 0x23,
    Match = 0x30,
    FreqControl = 0x40,
    RxHop = 0x50,
    /// Packet trace interface
    Pti = 0xF0,
}

/// Encode a SET_PROPERTY command: `[0x11, group, count, start_index, values...]`.
///
/// The caller must pass at most [`MAX_PROPERTIES`] values; this is a
/// precondition, not a recoverable error.
pub fn set_property(group: PropertyGroup, start_index: u8, values: &[u8]) -> Vec<u8> {
    assert!(
        values.len() <= MAX_PROPERTIES,
        "SET_PROPERTY takes at most {} values, got {}",
        MAX_PROPERTIES,
        values.len()
    );
    let mut command = Vec::with_capacity(4 + values.len());
    command.push(commands::SET_PROPERTY);
    command.push(group as u8);
    command.push(values.len() as u8);
    command.push(start_index);
    command.extend_from_slice(values);
    command
}

/// Encode a GET_PROPERTY command requesting `count` values
pub fn get_property(group: PropertyGroup, start_index: u8, count: u8) -> [u8; 4] {
    [commands::GET_PROPERTY, group as u8, count, start_index]
}

/// Encode a POWER_UP command with crystal/clock parameters
pub fn power_up(boot_options: u8, xtal_options: u8, xo_frequency: u32) -> [u8; 7] {
    let freq = xo_frequency.to_be_bytes();
    [
        commands::POWER_UP,
        boot_options,
        xtal_options,
        freq[0],
        freq[1],
        freq[2],
        freq[3],
    ]
}

/// Encode a START_TX command. `length == 0` means the packet-length property
/// is used instead of an inline length.
pub fn start_tx(channel: u8, condition: u8, length: u16, tx_delay: u8, num_repeat: u8) -> [u8; 7] {
    let len = length.to_be_bytes();
    [
        commands::START_TX,
        channel,
        condition,
        len[0],
        len[1],
        tx_delay,
        num_repeat,
    ]
}

/// Encode a START_RX command with the next-state bytes for the timeout,
/// valid, and invalid packet outcomes.
pub fn start_rx(
    channel: u8,
    condition: u8,
    length: u16,
    next_state_timeout: u8,
    next_state_valid: u8,
    next_state_invalid: u8,
) -> [u8; 8] {
    let len = length.to_be_bytes();
    [
        commands::START_RX,
        channel,
        condition,
        len[0],
        len[1],
        next_state_timeout,
        next_state_valid,
        next_state_invalid,
    ]
}

/// Extract the part number from a PART_INFO answer
pub fn part_number(answer: &[u8; PART_INFO_ANSWER_LENGTH]) -> u16 {
    u16::from_be_bytes([answer[1], answer[2]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_property_layout() {
        let cmd = set_property(PropertyGroup::Pkt, 0x0C, &[0x20]);
        assert_eq!(cmd, vec![0x11, 0x12, 0x01, 0x0C, 0x20]);
    }

    #[test]
    #[should_panic(expected = "at most 12 values")]
    fn set_property_rejects_too_many_values() {
        let values = [0u8; 13];
        let _ = set_property(PropertyGroup::Modem, 0x00, &values);
    }

    #[test]
    fn start_tx_uses_big_endian_length() {
        let cmd = start_tx(0x00, 0x30, 0x1234, 0, 0);
        assert_eq!(cmd, [0x31, 0x00, 0x30, 0x12, 0x34, 0x00, 0x00]);
    }

    #[test]
    fn part_number_is_big_endian() {
        let answer = [0x02, 0x44, 0x63, 0x00, 0x00, 0x00, 0x00, 0x00];
        assert_eq!(part_number(&answer), 0x4463);
    }
}
