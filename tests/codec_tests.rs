//! # Command Codec Tests
//!
//! Wire-format tests for the Si4463 command builders: exact byte layouts for
//! the commands the driver sends, plus property-based shape checks.

use proptest::prelude::*;

use rflink_rs::radio::codec::{
    self, commands, PropertyGroup, CTS_READY, MAX_PROPERTIES,
};

mod wire_format_tests {
    use super::*;

    /// SET_PROPERTY is [0x11, group, count, start_index, values...]
    #[test]
    fn test_set_property_layout() {
        let command = codec::set_property(PropertyGroup::IntCtl, 0x01, &[0x22]);
        assert_eq!(command, vec![0x11, 0x01, 0x01, 0x01, 0x22]);

        let command = codec::set_property(PropertyGroup::Modem, 0x03, &[0x05, 0xDC, 0x00, 0x05]);
        assert_eq!(command, vec![0x11, 0x20, 0x04, 0x03, 0x05, 0xDC, 0x00, 0x05]);
    }

    /// START_TX is [0x31, channel, condition, len(2B BE), delay, repeat]
    #[test]
    fn test_start_tx_layout() {
        let command = codec::start_tx(0x00, 0x30, 0, 0, 0);
        assert_eq!(command, [0x31, 0x00, 0x30, 0x00, 0x00, 0x00, 0x00]);
    }

    /// START_RX is [0x32, channel, condition, len(2B BE), three next states]
    #[test]
    fn test_start_rx_layout() {
        let command = codec::start_rx(0x00, 0x00, 0x0102, 0x03, 0x04, 0x05);
        assert_eq!(command, [0x32, 0x00, 0x00, 0x01, 0x02, 0x03, 0x04, 0x05]);
    }

    /// POWER_UP carries the crystal frequency big-endian
    #[test]
    fn test_power_up_layout() {
        let command = codec::power_up(0x81, 0x01, 26_000_000);
        assert_eq!(command, [0x02, 0x81, 0x01, 0x01, 0x8C, 0xBA, 0x80]);
    }

    #[test]
    fn test_cts_constants() {
        assert_eq!(commands::READ_CMD_BUFF, 0x44);
        assert_eq!(CTS_READY, 0xFF);
    }

    #[test]
    fn test_part_number_extraction() {
        let answer = [0x02, 0x44, 0x63, 0x00, 0x11, 0x22, 0x33, 0x44];
        assert_eq!(codec::part_number(&answer), 0x4463);
    }
}

proptest! {
    /// Any property write up to the limit encodes header + values verbatim
    #[test]
    fn set_property_shape(start_index: u8, values in prop::collection::vec(any::<u8>(), 0..=MAX_PROPERTIES)) {
        let command = codec::set_property(PropertyGroup::Pkt, start_index, &values);
        prop_assert_eq!(command.len(), 4 + values.len());
        prop_assert_eq!(command[0], commands::SET_PROPERTY);
        prop_assert_eq!(command[2] as usize, values.len());
        prop_assert_eq!(command[3], start_index);
        prop_assert_eq!(&command[4..], &values[..]);
    }

    /// START_TX lengths survive the big-endian split
    #[test]
    fn start_tx_length_roundtrip(length: u16) {
        let command = codec::start_tx(0, 0x30, length, 0, 0);
        prop_assert_eq!(u16::from_be_bytes([command[3], command[4]]), length);
    }

    /// The snapped data rate is never farther from the request than any
    /// other supported rate
    #[test]
    fn data_rate_snapping_is_nearest(requested: u32) {
        let chosen = rflink_rs::data_rate_config(requested);
        let distance = |rate: u32| (i64::from(requested) - i64::from(rate)).abs();
        for config in &rflink_rs::radio::datarate::DATA_RATE_CONFIGS {
            prop_assert!(distance(chosen.data_rate) <= distance(config.data_rate));
        }
    }
}
