use embedded_hal::{delay::DelayNs, spi::SpiDevice};

use crate::{
    packet::{Packet, RxOutcome},
    radio::{
        prelude::{CcFifo, CcRegisters, CcState},
        Cc1200Error, CC1200,
    },
    types::{ChipState, ChipStatus, LinkStatus},
};

use super::{access, commands, fifo_headers, mnemonics, registers, BUF_LEN};

impl<SPI, DELAY> CcFifo for CC1200<SPI, DELAY>
where
    SPI: SpiDevice,
    DELAY: DelayNs,
{
    type FifoErrorType = Cc1200Error<SPI::Error>;

    fn tx_bytes(&mut self) -> Result<u8, Self::FifoErrorType> {
        self.read_register_byte(registers::NUM_TXBYTES)
    }

    fn rx_bytes(&mut self) -> Result<u8, Self::FifoErrorType> {
        self.read_register_byte(registers::NUM_RXBYTES)
    }

    fn flush_tx(&mut self) -> Result<(), Self::FifoErrorType> {
        self.strobe(commands::SFTX)?;
        Ok(())
    }

    fn flush_rx(&mut self) -> Result<(), Self::FifoErrorType> {
        self.strobe(commands::SFRX)?;
        Ok(())
    }

    fn clear_rx_fifo(&mut self) -> Result<(), Self::FifoErrorType> {
        self.set_state(ChipState::Idle)?;
        self.flush_rx()?;
        self.set_state(ChipState::Rx)?;
        Ok(())
    }

    fn tx_status(&mut self) -> Result<ChipStatus, Self::FifoErrorType> {
        // the first status byte may predate the latest FIFO access
        self.strobe(commands::SNOP)?;
        self.strobe(commands::SNOP)
    }

    fn rx_status(&mut self) -> Result<ChipStatus, Self::FifoErrorType> {
        self.strobe(commands::SNOP | access::READ)?;
        self.strobe(commands::SNOP | access::READ)
    }

    fn write_tx_fifo(&mut self, packet: &Packet) -> Result<(), Self::FifoErrorType> {
        let len = packet.len();
        self._buf[0] = fifo_headers::BURST_TXFIFO;
        self._buf[1] = packet.wire_length();
        self._buf[2] = packet.address;
        self._buf[3..3 + len].copy_from_slice(packet.payload());
        self.spi_transfer(3 + len)
    }

    /// See [`CcFifo::read_rx_fifo()`] for implementation-agnostic detail.
    ///
    /// The whole content of the RX FIFO is read in one burst. The frame is expected at the
    /// front of it: `[length][address][payload][rssi][crc|lqi]`. Anything after the frame
    /// is discarded and counted in [`CC1200::discarded_rx_bytes()`].
    fn read_rx_fifo(&mut self) -> Result<RxOutcome, Self::FifoErrorType> {
        let pending = self.rx_bytes()? as usize;
        if pending == 0 {
            return Ok(RxOutcome::Empty);
        }
        let marc_state = self.read_register_byte(registers::MARCSTATE)?;
        if marc_state & mnemonics::MARC_STATE_MASK == mnemonics::MARC_RX_FIFO_ERR {
            log::warn!("RX FIFO error; flushing {pending} pending bytes");
            self.flush_rx()?;
            return Ok(RxOutcome::FifoError);
        }

        let count = pending.min(BUF_LEN - 1);
        self._buf[0] = fifo_headers::BURST_RXFIFO;
        self._buf[1..=count].fill(0);
        self.spi_transfer(count + 1)?;

        // the status byte occupies _buf[0]
        let frame = &self._buf[1..=count];
        let wire_len = frame[0] as usize;
        if wire_len == 0 || frame.len() < wire_len + 3 {
            log::warn!("Discarding malformed frame: length byte {wire_len}, {count} bytes pending");
            self.flush_rx()?;
            return Ok(RxOutcome::Malformed);
        }
        let extra = frame.len() - (wire_len + 3);
        if extra > 0 {
            log::warn!("Discarding {extra} bytes after a frame of length byte {wire_len}");
            self._discarded = self._discarded.saturating_add(extra as u32);
        }
        let packet = Packet::received(
            frame[1],
            &frame[2..1 + wire_len],
            frame[1 + wire_len],
            LinkStatus::from_bits(frame[2 + wire_len]),
        );
        Ok(RxOutcome::Packet(packet))
    }
}
