//! # Si4463 Interrupt Handling
//!
//! Interrupt flag types for the chip's packet handler and modem, and a typed
//! view over the 8-byte GET_INT_STATUS answer. Only a small subset of flags
//! is ever enabled at once, matching the operation in progress: the TX path
//! uses the FIFO-almost-empty and packet-sent flags, the RX path the
//! FIFO-almost-full flag.

use bitflags::bitflags;

use crate::radio::codec::INTERRUPT_STATUS_ANSWER_LENGTH;

bitflags! {
    /// Packet handler interrupt flags (INT_CTL_PH_ENABLE / PH_STATUS)
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PacketHandlerInterrupts: u8 {
        const RX_FIFO_ALMOST_FULL = 1 << 0;
        const TX_FIFO_ALMOST_EMPTY = 1 << 1;
        const CRC_ERROR = 1 << 3;
        const PACKET_RX = 1 << 4;
        const PACKET_SENT = 1 << 5;
        const FILTER_MISS = 1 << 6;
        const FILTER_MATCH = 1 << 7;
    }
}

bitflags! {
    /// Modem interrupt flags (INT_CTL_MODEM_ENABLE / MODEM_STATUS)
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ModemInterrupts: u8 {
        const SYNC_DETECT = 1 << 0;
        const PREAMBLE_DETECT = 1 << 1;
        const INVALID_PREAMBLE = 1 << 2;
        const RSSI = 1 << 3;
        const RSSI_JUMP = 1 << 4;
        const INVALID_SYNC = 1 << 5;
    }
}

/// Decoded GET_INT_STATUS answer
///
/// Reading the status with clear masks of zero also clears all pending
/// interrupts, which deasserts the NIRQ line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterruptStatus {
    pub int_pend: u8,
    pub int_status: u8,
    pub ph_pend: PacketHandlerInterrupts,
    pub ph_status: PacketHandlerInterrupts,
    pub modem_pend: ModemInterrupts,
    pub modem_status: ModemInterrupts,
    pub chip_pend: u8,
    pub chip_status: u8,
}

impl From<[u8; INTERRUPT_STATUS_ANSWER_LENGTH]> for InterruptStatus {
    fn from(answer: [u8; INTERRUPT_STATUS_ANSWER_LENGTH]) -> Self {
        Self {
            int_pend: answer[0],
            int_status: answer[1],
            ph_pend: PacketHandlerInterrupts::from_bits_retain(answer[2]),
            ph_status: PacketHandlerInterrupts::from_bits_retain(answer[3]),
            modem_pend: ModemInterrupts::from_bits_retain(answer[4]),
            modem_status: ModemInterrupts::from_bits_retain(answer[5]),
            chip_pend: answer[6],
            chip_status: answer[7],
        }
    }
}

impl InterruptStatus {
    /// Check if the last packet was fully transmitted
    pub fn packet_sent(&self) -> bool {
        self.ph_status
            .contains(PacketHandlerInterrupts::PACKET_SENT)
    }

    /// Check if a complete packet was received
    pub fn packet_received(&self) -> bool {
        self.ph_status.contains(PacketHandlerInterrupts::PACKET_RX)
    }

    /// Check if the received packet failed the CRC check
    pub fn crc_error(&self) -> bool {
        self.ph_status.contains(PacketHandlerInterrupts::CRC_ERROR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packet_sent_reads_ph_status_byte() {
        let status = InterruptStatus::from([0, 0, 0, 0x20, 0, 0, 0, 0]);
        assert!(status.packet_sent());
        assert!(!status.packet_received());
    }

    #[test]
    fn unknown_bits_are_retained() {
        let status = InterruptStatus::from([0, 0, 0, 0xFF, 0, 0, 0, 0]);
        assert!(status.packet_sent());
        assert!(status.crc_error());
    }
}
