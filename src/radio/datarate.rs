//! # Data-Rate Dependent Modem Configuration
//!
//! RX and TX share one property set per data rate; the sets were produced by
//! the vendor's configuration tool for 2(G)FSK at the link frequency and are
//! applied verbatim. Everything data-rate independent is in
//! [`crate::radio::config::CONSTANT_MODEM_PROPERTIES`].

/// Modem properties for one supported data rate.
///
/// Field order matches the chip's property map; the driver writes each field
/// to its group and start index (see `RadioLink::set_data_rate`).
#[derive(Debug)]
pub struct DataRateConfig {
    pub data_rate: u32,
    /// MODEM group, start 0x03
    pub modem_data_rate: [u8; 4],
    /// MODEM group, start 0x0B
    pub modem_freq_dev: [u8; 2],
    /// MODEM group, start 0x1E
    pub modem_decimation_cfg: [u8; 3],
    /// MODEM group, start 0x23
    pub modem_bcr_osr: [u8; 6],
    /// MODEM group, start 0x2D
    pub modem_afc_wait: [u8; 5],
    /// MODEM group, start 0x39
    pub modem_agc_rfpd_decay: [u8; 2],
    /// MODEM group, start 0x40
    pub modem_ook_pdtc: [u8; 1],
    /// MODEM group, start 0x46
    pub modem_raw_eye: [u8; 2],
    /// MODEM group, start 0x54
    pub modem_spike_det: [u8; 1],
    /// MODEM group, start 0x5D
    pub modem_dsa_qual: [u8; 1],
    /// MODEM_CHFLT group, starts 0x00, 0x0C, 0x18
    pub chflt_coefficients: [[u8; 12]; 3],
    /// PREAMBLE group, start 0x00
    pub preamble_tx_length: [u8; 1],
}

// The TX amplifier requires 500 us startup time -> (500e-6 * rate / 8) bytes,
// rounded up.
const fn preamble_tx_length(data_rate: u32) -> [u8; 1] {
    const STARTUP_TIME_US: u64 = 500;
    const DIVISOR: u64 = 8 * 1_000_000;
    [((STARTUP_TIME_US * data_rate as u64 + DIVISOR - 1) / DIVISOR) as u8]
}

const CHFLT_LOW_RATE: [[u8; 12]; 3] = [
    [
        0xCC, 0xA1, 0x30, 0xA0, 0x21, 0xD1, 0xB9, 0xC9, 0xEA, 0x05, 0x12, 0x11,
    ],
    [
        0x0A, 0x04, 0x15, 0xFC, 0x03, 0x00, 0xCC, 0xA1, 0x30, 0xA0, 0x21, 0xD1,
    ],
    [
        0xB9, 0xC9, 0xEA, 0x05, 0x12, 0x11, 0x0A, 0x04, 0x15, 0xFC, 0x03, 0x00,
    ],
];

const CHFLT_HIGH_RATE: [[u8; 12]; 3] = [
    [
        0xFF, 0xC4, 0x30, 0x7F, 0xF5, 0xB5, 0xB8, 0xDE, 0x05, 0x17, 0x16, 0x0C,
    ],
    [
        0x03, 0x00, 0x15, 0xFF, 0x00, 0x00, 0xFF, 0xC4, 0x30, 0x7F, 0xF5, 0xB5,
    ],
    [
        0xB8, 0xDE, 0x05, 0x17, 0x16, 0x0C, 0x03, 0x00, 0x15, 0xFF, 0x00, 0x00,
    ],
];

pub static DATA_RATE_1200: DataRateConfig = DataRateConfig {
    data_rate: 1200,
    modem_data_rate: [0x00, 0xBB, 0x80, 0x05],
    modem_freq_dev: [0x00, 0x30],
    modem_decimation_cfg: [0xF0, 0x20, 0x0C],
    modem_bcr_osr: [0xA9, 0x03, 0x06, 0x55, 0x03, 0x08],
    modem_afc_wait: [0x12, 0x80, 0x0C, 0x03, 0xB5],
    modem_agc_rfpd_decay: [0x25, 0x25],
    modem_ook_pdtc: [0x29],
    modem_raw_eye: [0x00, 0x7B],
    modem_spike_det: [0x03],
    modem_dsa_qual: [0x06],
    chflt_coefficients: CHFLT_LOW_RATE,
    preamble_tx_length: preamble_tx_length(1200),
};

pub static DATA_RATE_2400: DataRateConfig = DataRateConfig {
    data_rate: 2400,
    modem_data_rate: [0x01, 0x77, 0x00, 0x05],
    modem_freq_dev: [0x00, 0x61],
    modem_decimation_cfg: [0xF0, 0x20, 0x0C],
    modem_bcr_osr: [0x55, 0x06, 0x0C, 0xAB, 0x06, 0x06],
    modem_afc_wait: [0x12, 0x80, 0x18, 0x02, 0x4A],
    modem_agc_rfpd_decay: [0x13, 0x13],
    modem_ook_pdtc: [0x28],
    modem_raw_eye: [0x00, 0xF5],
    modem_spike_det: [0x03],
    modem_dsa_qual: [0x08],
    chflt_coefficients: [
        [
            0xFF, 0xBA, 0x0F, 0x51, 0xCF, 0xA9, 0xC9, 0xFC, 0x1B, 0x1E, 0x0F, 0x01,
        ],
        [
            0xFC, 0xFD, 0x15, 0xFF, 0x00, 0x0F, 0xFF, 0xBA, 0x0F, 0x51, 0xCF, 0xA9,
        ],
        [
            0xC9, 0xFC, 0x1B, 0x1E, 0x0F, 0x01, 0xFC, 0xFD, 0x15, 0xFF, 0x00, 0x0F,
        ],
    ],
    preamble_tx_length: preamble_tx_length(2400),
};

pub static DATA_RATE_4800: DataRateConfig = DataRateConfig {
    data_rate: 4800,
    modem_data_rate: [0x02, 0xEE, 0x00, 0x05],
    modem_freq_dev: [0x00, 0xC2],
    modem_decimation_cfg: [0xB0, 0x20, 0x0C],
    modem_bcr_osr: [0x55, 0x06, 0x0C, 0xAB, 0x06, 0x06],
    modem_afc_wait: [0x12, 0x80, 0x30, 0x01, 0xDA],
    modem_agc_rfpd_decay: [0x13, 0x13],
    modem_ook_pdtc: [0x28],
    modem_raw_eye: [0x00, 0xF5],
    modem_spike_det: [0x03],
    modem_dsa_qual: [0x07],
    chflt_coefficients: CHFLT_LOW_RATE,
    preamble_tx_length: preamble_tx_length(4800),
};

pub static DATA_RATE_9600: DataRateConfig = DataRateConfig {
    data_rate: 9600,
    modem_data_rate: [0x05, 0xDC, 0x00, 0x05],
    modem_freq_dev: [0x01, 0x83],
    modem_decimation_cfg: [0x70, 0x20, 0x00],
    modem_bcr_osr: [0x55, 0x06, 0x0C, 0xAB, 0x06, 0x06],
    modem_afc_wait: [0x12, 0x80, 0x61, 0x01, 0xD5],
    modem_agc_rfpd_decay: [0x13, 0x13],
    modem_ook_pdtc: [0x28],
    modem_raw_eye: [0x00, 0xF5],
    modem_spike_det: [0x03],
    modem_dsa_qual: [0x07],
    chflt_coefficients: CHFLT_LOW_RATE,
    preamble_tx_length: preamble_tx_length(9600),
};

pub static DATA_RATE_19200: DataRateConfig = DataRateConfig {
    data_rate: 19_200,
    modem_data_rate: [0x0B, 0xB8, 0x00, 0x05],
    modem_freq_dev: [0x03, 0x06],
    modem_decimation_cfg: [0x30, 0x20, 0x00],
    modem_bcr_osr: [0x55, 0x06, 0x0C, 0xAB, 0x06, 0x06],
    modem_afc_wait: [0x12, 0x80, 0xC2, 0x01, 0xD4],
    modem_agc_rfpd_decay: [0x13, 0x13],
    modem_ook_pdtc: [0x28],
    modem_raw_eye: [0x00, 0xF5],
    modem_spike_det: [0x03],
    modem_dsa_qual: [0x07],
    chflt_coefficients: CHFLT_LOW_RATE,
    preamble_tx_length: preamble_tx_length(19_200),
};

pub static DATA_RATE_38400: DataRateConfig = DataRateConfig {
    data_rate: 38_400,
    modem_data_rate: [0x0B, 0xB8, 0x00, 0x09],
    modem_freq_dev: [0x06, 0x0D],
    modem_decimation_cfg: [0x20, 0x20, 0x00],
    modem_bcr_osr: [0x55, 0x06, 0x0C, 0xAB, 0x06, 0x06],
    modem_afc_wait: [0x12, 0x81, 0x83, 0x01, 0xD3],
    modem_agc_rfpd_decay: [0x13, 0x13],
    modem_ook_pdtc: [0x28],
    modem_raw_eye: [0x00, 0xF5],
    modem_spike_det: [0x03],
    modem_dsa_qual: [0x07],
    chflt_coefficients: CHFLT_LOW_RATE,
    preamble_tx_length: preamble_tx_length(38_400),
};

pub static DATA_RATE_57600: DataRateConfig = DataRateConfig {
    data_rate: 57_600,
    modem_data_rate: [0x11, 0x94, 0x00, 0x09],
    modem_freq_dev: [0x09, 0x13],
    modem_decimation_cfg: [0x10, 0x10, 0x00],
    modem_bcr_osr: [0x4B, 0x06, 0xCE, 0x40, 0x06, 0xD4],
    modem_afc_wait: [0x12, 0x82, 0x45, 0x01, 0xCB],
    modem_agc_rfpd_decay: [0x10, 0x10],
    modem_ook_pdtc: [0x28],
    modem_raw_eye: [0x01, 0x14],
    modem_spike_det: [0x04],
    modem_dsa_qual: [0x08],
    chflt_coefficients: CHFLT_HIGH_RATE,
    preamble_tx_length: preamble_tx_length(57_600),
};

pub static DATA_RATE_76800: DataRateConfig = DataRateConfig {
    data_rate: 76_800,
    modem_data_rate: [0x17, 0x70, 0x00, 0x09],
    modem_freq_dev: [0x0C, 0x19],
    modem_decimation_cfg: [0x10, 0x20, 0x00],
    modem_bcr_osr: [0x55, 0x06, 0x0C, 0xAB, 0x06, 0x06],
    modem_afc_wait: [0x12, 0x83, 0x06, 0x01, 0xCF],
    modem_agc_rfpd_decay: [0x13, 0x13],
    modem_ook_pdtc: [0x28],
    modem_raw_eye: [0x00, 0xF5],
    modem_spike_det: [0x03],
    modem_dsa_qual: [0x07],
    chflt_coefficients: CHFLT_LOW_RATE,
    preamble_tx_length: preamble_tx_length(76_800),
};

pub static DATA_RATE_115200: DataRateConfig = DataRateConfig {
    data_rate: 115_200,
    modem_data_rate: [0x23, 0x28, 0x00, 0x09],
    modem_freq_dev: [0x12, 0x26],
    modem_decimation_cfg: [0x00, 0x10, 0x00],
    modem_bcr_osr: [0x4B, 0x06, 0xCE, 0x40, 0x06, 0xD4],
    modem_afc_wait: [0x23, 0x89, 0x13, 0x00, 0xD4],
    modem_agc_rfpd_decay: [0x10, 0x10],
    modem_ook_pdtc: [0x28],
    modem_raw_eye: [0x01, 0x14],
    modem_spike_det: [0x04],
    modem_dsa_qual: [0x08],
    chflt_coefficients: CHFLT_HIGH_RATE,
    preamble_tx_length: preamble_tx_length(115_200),
};

/// All supported data rates, ascending
pub static DATA_RATE_CONFIGS: [&DataRateConfig; 9] = [
    &DATA_RATE_1200,
    &DATA_RATE_2400,
    &DATA_RATE_4800,
    &DATA_RATE_9600,
    &DATA_RATE_19200,
    &DATA_RATE_38400,
    &DATA_RATE_57600,
    &DATA_RATE_76800,
    &DATA_RATE_115200,
];

/// Snap an arbitrary requested rate to the nearest supported configuration
/// (midpoint comparison between neighboring rates).
pub fn data_rate_config(data_rate: u32) -> &'static DataRateConfig {
    let mut selected = DATA_RATE_CONFIGS[0];
    for config in &DATA_RATE_CONFIGS[1..] {
        if data_rate > (selected.data_rate + config.data_rate) / 2 {
            selected = config;
        } else {
            break;
        }
    }
    selected
}
