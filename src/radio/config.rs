//! # Vendor Configuration Blob
//!
//! The patch, power-up parameters, and register configuration the chip is
//! loaded with during bring-up. All values come from the vendor's
//! configuration tool and are applied verbatim; they are data, not logic.
//! Modem properties that depend on the selected data rate live in
//! [`crate::radio::datarate`] instead.

use crate::radio::codec::PropertyGroup;

/// One SET_PROPERTY write: a property group, a start index, and the values
/// for the consecutive properties beginning there (at most 12).
#[derive(Debug, Clone, Copy)]
pub struct PropertyBlock {
    pub group: PropertyGroup,
    pub start_index: u8,
    pub values: &'static [u8],
}

/// POWER_UP boot options: boot the patched firmware image
pub const BOOT_OPTIONS: u8 = 0x81;
/// POWER_UP crystal options: use the external crystal oscillator
pub const XTAL_OPTIONS: u8 = 0x01;
/// Crystal oscillator frequency in Hz
pub const XO_FREQUENCY: u32 = 26_000_000;

/// GPIO_PIN_CFG command: GPIO0/1 tristate with weak pull-up, GPIO2 active in
/// RX, GPIO3 active in TX, NIRQ and SDO with internal pull-ups, highest drive
/// strength.
pub const GPIO_PIN_CONFIG: [u8; 8] = [0x13, 0x41, 0x41, 0x21, 0x20, 0x67, 0x4B, 0x00];

/// Firmware patch applied after reset, before POWER_UP. Each line is a
/// one-byte length followed by that many raw command bytes.
#[rustfmt::skip]
pub static PATCH: &[u8] = &[
    0x08, 0x04, 0x21, 0x71, 0x4B, 0x00, 0x00, 0xDC, 0x95,
    0x08, 0x05, 0xA6, 0x22, 0x21, 0xF0, 0x41, 0x5B, 0x26,
    0x08, 0xE2, 0x2F, 0x1C, 0xBB, 0x0A, 0xA8, 0x94, 0x28,
    0x08, 0x05, 0x87, 0x67, 0xE2, 0x58, 0x1A, 0x07, 0x5B,
    0x08, 0xE1, 0xD0, 0x72, 0xD8, 0x8A, 0xB8, 0x5B, 0x7D,
    0x08, 0x05, 0x11, 0xEC, 0x9E, 0x28, 0x23, 0x1B, 0x6D,
    0x08, 0xE2, 0x4F, 0x8A, 0xB2, 0xA9, 0x29, 0x14, 0x13,
    0x08, 0x05, 0xD1, 0x2E, 0x71, 0x6A, 0x51, 0x4C, 0x2C,
    0x08, 0xE5, 0x80, 0x27, 0x42, 0xA4, 0x69, 0xB0, 0x7F,
    0x08, 0x05, 0xAA, 0x81, 0x2A, 0xBD, 0x45, 0xE8, 0xA8,
    0x08, 0xEA, 0xE4, 0xF0, 0x24, 0xC9, 0x9F, 0xCC, 0x3C,
    0x08, 0x05, 0x08, 0xF5, 0x05, 0x04, 0x27, 0x62, 0x98,
    0x08, 0xEA, 0x6B, 0x62, 0x84, 0xA1, 0xF9, 0x4A, 0xE2,
    0x08, 0x05, 0xE9, 0x77, 0x05, 0x4F, 0x84, 0xEE, 0x35,
    0x08, 0xE2, 0x43, 0xC3, 0x8D, 0xFB, 0xAD, 0x54, 0x25,
    0x08, 0x05, 0x14, 0x06, 0x5E, 0x39, 0x36, 0x2F, 0x45,
    0x08, 0xEA, 0x0C, 0x1C, 0x74, 0xD0, 0x11, 0xFC, 0x32,
    0x08, 0x05, 0xDA, 0x38, 0xBA, 0x0E, 0x3C, 0xE7, 0x8B,
    0x08, 0xEA, 0xB0, 0x09, 0xE6, 0xFF, 0x94, 0xBB, 0xA9,
    0x08, 0x05, 0xD7, 0x11, 0x29, 0xFE, 0xDC, 0x71, 0xD5,
    0x08, 0xEA, 0x7F, 0x83, 0xA7, 0x60, 0x90, 0x62, 0x18,
    0x08, 0x05, 0x84, 0x7F, 0x6A, 0xD1, 0x91, 0xC6, 0x52,
    0x08, 0xEA, 0x2A, 0xD8, 0x7B, 0x8E, 0x4A, 0x9F, 0x91,
    0x08, 0x05, 0xBD, 0xAA, 0x9D, 0x16, 0x18, 0x06, 0x15,
    0x08, 0xE2, 0x55, 0xAD, 0x2D, 0x0A, 0x14, 0x1F, 0x5D,
    0x08, 0x05, 0xD3, 0xE0, 0x7C, 0x39, 0xCF, 0x01, 0xF0,
    0x08, 0xEF, 0x3A, 0x91, 0x72, 0x6A, 0x03, 0xBB, 0x96,
    0x08, 0xE7, 0x83, 0x6D, 0xA4, 0x92, 0xFC, 0x13, 0xA7,
    0x08, 0xEF, 0xF8, 0xFD, 0xCF, 0x62, 0x07, 0x6F, 0x1E,
    0x08, 0xE7, 0x4C, 0xEA, 0x4A, 0x75, 0x4F, 0xD6, 0xCF,
    0x08, 0xE2, 0xF6, 0x11, 0xE4, 0x26, 0x0D, 0x4D, 0xC6,
    0x08, 0x05, 0xFB, 0xBF, 0xE8, 0x07, 0x89, 0xC3, 0x51,
    0x08, 0xEF, 0x82, 0x27, 0x04, 0x3F, 0x96, 0xA8, 0x58,
    0x08, 0xE7, 0x41, 0x29, 0x3C, 0x75, 0x2A, 0x03, 0x1C,
    0x08, 0xEF, 0xAF, 0x59, 0x98, 0x36, 0xAA, 0x0F, 0x06,
    0x08, 0xE6, 0xF6, 0x93, 0x41, 0x2D, 0xEC, 0x0E, 0x99,
    0x08, 0x05, 0x29, 0x19, 0x90, 0xE5, 0xAA, 0x36, 0x40,
    0x08, 0xE7, 0xFB, 0x68, 0x10, 0x7D, 0x77, 0x5D, 0xC0,
    0x08, 0xE7, 0xCB, 0xB4, 0xDD, 0xCE, 0x90, 0x54, 0xBE,
    0x08, 0xE7, 0x72, 0x8A, 0xD6, 0x02, 0xF4, 0xDD, 0xCC,
    0x08, 0xE7, 0x6A, 0x21, 0x0B, 0x02, 0x86, 0xEC, 0x15,
    0x08, 0xE7, 0x7B, 0x7C, 0x3D, 0x6B, 0x81, 0x03, 0xD0,
    0x08, 0xEF, 0x7D, 0x61, 0x36, 0x94, 0x7C, 0xA0, 0xDF,
    0x08, 0xEF, 0xCC, 0x85, 0x3B, 0xDA, 0xE0, 0x5C, 0x1C,
    0x08, 0xE7, 0xE3, 0x75, 0xBB, 0x39, 0x22, 0x4B, 0xA8,
    0x08, 0xEF, 0xF9, 0xCE, 0xE0, 0x5E, 0xEB, 0x1D, 0xCB,
    0x08, 0xE7, 0xBD, 0xE2, 0x70, 0xD5, 0xAB, 0x4E, 0x3F,
    0x08, 0xE7, 0xB7, 0x8D, 0x20, 0x68, 0x6B, 0x09, 0x52,
    0x08, 0xEF, 0xA1, 0x1B, 0x90, 0xCD, 0x98, 0x00, 0x63,
    0x08, 0xEF, 0x54, 0x67, 0x5D, 0x9C, 0x11, 0xFC, 0x45,
    0x08, 0xE7, 0xD4, 0x9B, 0xC8, 0x97, 0xBE, 0x8A, 0x07,
    0x08, 0xEF, 0x52, 0x8D, 0x90, 0x63, 0x73, 0xD5, 0x2A,
    0x08, 0xEF, 0x03, 0xBC, 0x6E, 0x1C, 0x76, 0xBE, 0x4A,
    0x08, 0xE7, 0xC2, 0xED, 0x67, 0xBA, 0x5E, 0x66, 0x21,
    0x08, 0xEF, 0xE7, 0x3F, 0x87, 0xBE, 0xE0, 0x7A, 0x6D,
    0x08, 0xE7, 0xC9, 0x70, 0x93, 0x1D, 0x64, 0xF5, 0x6C,
    0x08, 0xEF, 0xF5, 0x28, 0x08, 0x34, 0xB3, 0xB6, 0x2C,
    0x08, 0xEF, 0x3A, 0x0A, 0xEC, 0x0F, 0xDB, 0x56, 0xCA,
    0x08, 0xEF, 0x39, 0xA0, 0x6E, 0xED, 0x79, 0xD0, 0x24,
    0x08, 0xE7, 0x6C, 0x0B, 0xAF, 0xA9, 0x4E, 0x40, 0xB5,
    0x08, 0xE9, 0xB9, 0xAF, 0xBF, 0x25, 0x50, 0xD1, 0x37,
    0x08, 0x05, 0x9E, 0xDB, 0xDE, 0x3F, 0x94, 0xE9, 0x6B,
    0x08, 0xEC, 0xC5, 0x05, 0xAA, 0x57, 0xDC, 0x8A, 0x5E,
    0x08, 0x05, 0x70, 0xDA, 0x84, 0x84, 0xDD, 0xCA, 0x90,
];

/// Property configuration written after POWER_UP: crystal tuning, interrupt
/// routing, preamble, sync word, packet format, channel filter, PA, frequency
/// synthesizer, and frequency control.
pub static CONFIG_TABLE: &[PropertyBlock] = &[
    // Crystal oscillator tuning and clock config
    PropertyBlock {
        group: PropertyGroup::Global,
        start_index: 0x00,
        values: &[0x52, 0x00],
    },
    // High performance mode, generic packet format, split FIFO, fast sequencer
    PropertyBlock {
        group: PropertyGroup::Global,
        start_index: 0x03,
        values: &[0x60],
    },
    // Enable the chip, modem, and packet handler interrupt sources; no
    // individual interrupts yet (the streaming engine enables them per
    // operation)
    PropertyBlock {
        group: PropertyGroup::IntCtl,
        start_index: 0x00,
        values: &[0x07, 0x00, 0x00, 0x00],
    },
    // Preamble: TX length is data-rate dependent (see datarate), standard
    // 0101 pattern, 20-bit RX threshold
    PropertyBlock {
        group: PropertyGroup::Preamble,
        start_index: 0x00,
        values: &[0x00, 0x14, 0x00, 0x0F, 0x12, 0x00, 0x00, 0x00, 0x00],
    },
    // Sync word: 4 bytes, up to 4 bit errors tolerated on receive, not
    // transmitted (CCSDS attached sync marker)
    PropertyBlock {
        group: PropertyGroup::Sync,
        start_index: 0x00,
        values: &[0xC3, 0x58, 0xF3, 0x3F, 0xB8],
    },
    // No CRC; the channel coding above this driver protects the frames
    PropertyBlock {
        group: PropertyGroup::Pkt,
        start_index: 0x00,
        values: &[0x00],
    },
    // No whitening, shared RX/TX field config, 2(G)FSK, MSB first
    PropertyBlock {
        group: PropertyGroup::Pkt,
        start_index: 0x05,
        values: &[0x00, 0x00],
    },
    // Infinite receive, big-endian length field, TX FIFO threshold 48 (free
    // bytes), RX FIFO threshold 32 (stored bytes), field 1 length 1
    PropertyBlock {
        group: PropertyGroup::Pkt,
        start_index: 0x08,
        values: &[0x60, 0x00, 0x00, 0x30, 0x20, 0x00, 0x01, 0x00, 0x00],
    },
    // RX channel filter coefficients, blocks 1-3
    PropertyBlock {
        group: PropertyGroup::ModemChflt,
        start_index: 0x00,
        values: &[
            0xFF, 0xC4, 0x30, 0x7F, 0xF5, 0xB5, 0xB8, 0xDE, 0x05, 0x17, 0x16, 0x0C,
        ],
    },
    PropertyBlock {
        group: PropertyGroup::ModemChflt,
        start_index: 0x0C,
        values: &[
            0x03, 0x00, 0x15, 0xFF, 0x00, 0x00, 0xFF, 0xC4, 0x30, 0x7F, 0xF5, 0xB5,
        ],
    },
    PropertyBlock {
        group: PropertyGroup::ModemChflt,
        start_index: 0x18,
        values: &[
            0xB8, 0xDE, 0x05, 0x17, 0x16, 0x0C, 0x03, 0x00, 0x15, 0xFF, 0x00, 0x00,
        ],
    },
    // PA: switching amp mode, enabled finger count sets output power
    PropertyBlock {
        group: PropertyGroup::Pa,
        start_index: 0x00,
        values: &[0x08, 0x2F, 0x00, 0xFF],
    },
    // Frequency synthesizer charge pump and loop filter
    PropertyBlock {
        group: PropertyGroup::Synth,
        start_index: 0x00,
        values: &[0x2C, 0x0E, 0x0B, 0x04, 0x0C, 0x73, 0x03],
    },
    // Packet match disabled
    PropertyBlock {
        group: PropertyGroup::Match,
        start_index: 0x00,
        values: &[
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ],
    },
    // Frequency control: 437.395 MHz with 26 MHz crystal, outdiv 8
    PropertyBlock {
        group: PropertyGroup::FreqControl,
        start_index: 0x00,
        values: &[0x42, 0x0A, 0x55, 0x12, 0x4E, 0xC5, 0x20, 0xFE],
    },
];

/// Modem properties that are the same for every data rate; the per-rate parts
/// are in [`crate::radio::datarate`].
pub static CONSTANT_MODEM_PROPERTIES: &[PropertyBlock] = &[
    // MODEM_MOD_TYPE (packet 2GFSK), MODEM_MAP_CONTROL, MODEM_DSM_CTRL
    PropertyBlock {
        group: PropertyGroup::Modem,
        start_index: 0x00,
        values: &[0x03, 0x00, 0x07],
    },
    // MODEM_TX_NCO_MODE, MODEM_FREQ_DEV MSB
    PropertyBlock {
        group: PropertyGroup::Modem,
        start_index: 0x07,
        values: &[0x8C, 0xBA, 0x80, 0x00],
    },
    // MODEM_TX_RAMP_DELAY, MODEM_MDM_CTRL, MODEM_IF_CONTROL, MODEM_IF_FREQ
    PropertyBlock {
        group: PropertyGroup::Modem,
        start_index: 0x18,
        values: &[0x01, 0x00, 0x08, 0x03, 0x80, 0x00],
    },
    // MODEM_IFPKD_THRESHOLDS, MODEM_BCR_OSR LSB
    PropertyBlock {
        group: PropertyGroup::Modem,
        start_index: 0x21,
        values: &[0xE8, 0x00],
    },
    // MODEM_BCR_GEAR, MODEM_BCR_MISC1, MODEM_BCR_MISC0, MODEM_AFC_GEAR
    PropertyBlock {
        group: PropertyGroup::Modem,
        start_index: 0x29,
        values: &[0x02, 0x00, 0x00, 0x00],
    },
    // MODEM_AFC_MISC
    PropertyBlock {
        group: PropertyGroup::Modem,
        start_index: 0x32,
        values: &[0xA0],
    },
    // MODEM_AGC_CONTROL
    PropertyBlock {
        group: PropertyGroup::Modem,
        start_index: 0x35,
        values: &[0xE0],
    },
    // MODEM_AGC_WINDOW_SIZE
    PropertyBlock {
        group: PropertyGroup::Modem,
        start_index: 0x38,
        values: &[0x11],
    },
    // MODEM_FSK4_GAIN1/GAIN0/TH/MAP
    PropertyBlock {
        group: PropertyGroup::Modem,
        start_index: 0x3B,
        values: &[0x80, 0x1A, 0x40, 0x00, 0x00],
    },
    // MODEM_OOK_BLOPK, MODEM_OOK_CNT1, MODEM_OOK_MISC
    PropertyBlock {
        group: PropertyGroup::Modem,
        start_index: 0x41,
        values: &[0x0C, 0xA4, 0x23],
    },
    // MODEM_RAW_CONTROL
    PropertyBlock {
        group: PropertyGroup::Modem,
        start_index: 0x45,
        values: &[0x03],
    },
    // Antenna diversity, RSSI thresholds and control
    PropertyBlock {
        group: PropertyGroup::Modem,
        start_index: 0x48,
        values: &[0x01, 0x00, 0xFF, 0x06, 0x00, 0x18, 0x40],
    },
    // MODEM_RAW_SEARCH2
    PropertyBlock {
        group: PropertyGroup::Modem,
        start_index: 0x50,
        values: &[0x84, 0x0A],
    },
    // MODEM_ONE_SHOT_AFC
    PropertyBlock {
        group: PropertyGroup::Modem,
        start_index: 0x55,
        values: &[0x07],
    },
    // MODEM_RSSI_MUTE
    PropertyBlock {
        group: PropertyGroup::Modem,
        start_index: 0x57,
        values: &[0x00],
    },
    // MODEM_DSA_CTRL1, MODEM_DSA_CTRL2
    PropertyBlock {
        group: PropertyGroup::Modem,
        start_index: 0x5B,
        values: &[0x40, 0x04],
    },
    // MODEM_DSA_RSSI, MODEM_DSA_MISC
    PropertyBlock {
        group: PropertyGroup::Modem,
        start_index: 0x5E,
        values: &[0x78, 0x20],
    },
    // Channel filter coefficient high bits
    PropertyBlock {
        group: PropertyGroup::ModemChflt,
        start_index: 0x0E,
        values: &[0x15],
    },
    PropertyBlock {
        group: PropertyGroup::ModemChflt,
        start_index: 0x20,
        values: &[0x15],
    },
];
