use embedded_hal::{delay::DelayNs, spi::SpiDevice};

use crate::{
    radio::{prelude::CcState, Cc1200Error, CC1200},
    types::{ChipState, ChipStatus},
};

use super::{commands, mnemonics};

/// The strobe that moves a chip in a stable state toward `target`.
const fn strobe_toward(target: ChipState) -> u8 {
    match target {
        ChipState::Rx => commands::SRX,
        ChipState::Tx => commands::STX,
        ChipState::FastTxReady => commands::SFSTXON,
        _ => commands::SIDLE,
    }
}

impl<SPI, DELAY> CcState for CC1200<SPI, DELAY>
where
    SPI: SpiDevice,
    DELAY: DelayNs,
{
    type StateErrorType = Cc1200Error<SPI::Error>;

    fn strobe(&mut self, command: u8) -> Result<ChipStatus, Self::StateErrorType> {
        self._buf[0] = command;
        self.spi_transfer(1)?;
        Ok(self._status)
    }

    fn get_status(&self) -> ChipStatus {
        self._status
    }

    fn get_state(&mut self) -> Result<ChipState, Self::StateErrorType> {
        Ok(self.strobe(commands::SNOP)?.state())
    }

    /// See [`CcState::set_state()`] for implementation-agnostic detail.
    ///
    /// The walk is bounded by [`CC1200::state_timeout_us`].
    fn set_state(&mut self, target: ChipState) -> Result<ChipState, Self::StateErrorType> {
        if !target.is_stable() {
            return Err(Cc1200Error::InvalidTargetState(target));
        }
        let mut budget = self.state_timeout_us;
        let mut current = self.get_state()?;
        while current != target {
            if budget < mnemonics::SETTLE_POLL_US {
                return Err(Cc1200Error::StateTimeout {
                    target,
                    last: current,
                });
            }
            budget -= mnemonics::SETTLE_POLL_US;
            match current {
                ChipState::Calibrate | ChipState::Settling => {
                    self._delay_impl.delay_us(mnemonics::SETTLE_POLL_US);
                }
                ChipState::RxFifoError => {
                    self.strobe(commands::SFRX)?;
                }
                ChipState::TxFifoError => {
                    self.strobe(commands::SFTX)?;
                }
                _ => {
                    self.strobe(strobe_toward(target))?;
                }
            }
            current = self.get_state()?;
        }
        Ok(current)
    }

    fn calibrate(&mut self) -> Result<(), Self::StateErrorType> {
        self.set_state(ChipState::Idle)?;
        self.strobe(commands::SCAL)?;
        Ok(())
    }
}
