use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, MutexGuard,
};

use cc1200::{
    radio::{
        commands, mnemonics,
        prelude::{CcDetails, CcFifo, CcInit, CcRadio, CcRegisters, CcState},
        registers, RadioConfig, RegisterSetting, CC1200,
    },
    Packet, RxOutcome,
};
use embedded_hal::{delay::DelayNs, spi::SpiDevice};

use crate::{config::ModuleConfig, GatewayError, PacketQueue, Semaphore};

/// One transceiver of the gateway with its queue of received packets.
///
/// All SPI traffic to the transceiver goes through an internal lock,
/// so the interrupt worker and the dispatcher may share a module.
pub struct RadioModule<SPI, DELAY> {
    number: u8,
    channel: u8,
    radio: Mutex<CC1200<SPI, DELAY>>,
    queue: PacketQueue,
    signal: Arc<Semaphore>,
    fifo_errors: AtomicU64,
    malformed: AtomicU64,
}

impl<SPI, DELAY> RadioModule<SPI, DELAY>
where
    SPI: SpiDevice,
    DELAY: DelayNs,
{
    /// Wrap `radio` as module `config.number`.
    ///
    /// Every packet queued by [`RadioModule::handle_interrupt()`] releases one permit of `signal`.
    pub fn new(
        config: &ModuleConfig,
        radio: CC1200<SPI, DELAY>,
        queue_depth: usize,
        signal: Arc<Semaphore>,
    ) -> Self {
        let channel = if config.channel > mnemonics::MAX_CHANNEL {
            log::warn!(
                "Module {}: channel {} is out of range, using channel 0",
                config.number,
                config.channel
            );
            0
        } else {
            config.channel
        };
        Self {
            number: config.number,
            channel,
            radio: Mutex::new(radio),
            queue: PacketQueue::new(queue_depth),
            signal,
            fifo_errors: AtomicU64::new(0),
            malformed: AtomicU64::new(0),
        }
    }

    fn radio(&self) -> MutexGuard<'_, CC1200<SPI, DELAY>> {
        self.radio.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Check the part number, then apply `settings` and this module's channel.
    ///
    /// The chip is left idle. Returns the number of registers that did not
    /// read back as written.
    pub fn configure(&self, settings: &'static [RegisterSetting]) -> Result<u16, GatewayError> {
        let mut radio = self.radio();
        let part = radio
            .read_register_byte(registers::PARTNUMBER)
            .map_err(|e| GatewayError::radio(self.number, e))?;
        if part != mnemonics::PARTNUMBER_CC1200 && part != mnemonics::PARTNUMBER_CC1201 {
            return Err(GatewayError::Radio {
                module: self.number,
                detail: format!("unexpected part number {part:#04X}"),
            });
        }
        let config = RadioConfig::default()
            .with_settings(settings)
            .with_channel(self.channel);
        let errors = radio
            .with_config(&config)
            .map_err(|e| GatewayError::radio(self.number, e))?;
        radio
            .strobe(commands::SIDLE)
            .map_err(|e| GatewayError::radio(self.number, e))?;
        log::info!(
            "Module {} configured on channel {} ({errors} verification errors)",
            self.number,
            self.channel
        );
        Ok(errors)
    }

    /// Put the transceiver in RX mode.
    pub fn listen(&self) -> Result<(), GatewayError> {
        self.radio()
            .listen()
            .map_err(|e| GatewayError::radio(self.number, e))
    }

    /// Put the transceiver back in RX mode unless it was powered down.
    ///
    /// Returns `false` (without any SPI traffic) if the module is asleep.
    pub fn rearm(&self) -> Result<bool, GatewayError> {
        let mut radio = self.radio();
        if radio.is_asleep() {
            return Ok(false);
        }
        radio
            .listen()
            .map_err(|e| GatewayError::radio(self.number, e))?;
        Ok(true)
    }

    /// Drain one frame from the RX FIFO after the end-of-packet edge.
    ///
    /// A received packet is queued (whatever its CRC flag) and signalled.
    /// The transceiver is put back in RX mode before returning, even if the
    /// FIFO could not be read. Edges of a powered down module are ignored.
    /// Returns `true` if a packet was queued.
    pub fn handle_interrupt(&self) -> Result<bool, GatewayError> {
        let mut radio = self.radio();
        if radio.is_asleep() {
            log::debug!("Module {}: ignored edge while powered down", self.number);
            return Ok(false);
        }
        let outcome = radio.read_rx_fifo();
        let rearmed = radio.listen();
        let outcome = outcome.map_err(|e| GatewayError::radio(self.number, e))?;
        rearmed.map_err(|e| GatewayError::radio(self.number, e))?;
        let queued = match outcome {
            RxOutcome::Packet(packet) => {
                if let Some(old) = self.queue.push(packet) {
                    log::warn!(
                        "Module {}: queue full, dropped packet from {:#04X}",
                        self.number,
                        old.address
                    );
                }
                self.signal.release();
                true
            }
            RxOutcome::FifoError => {
                self.fifo_errors.fetch_add(1, Ordering::Relaxed);
                false
            }
            RxOutcome::Malformed => {
                self.malformed.fetch_add(1, Ordering::Relaxed);
                false
            }
            RxOutcome::Empty => false,
        };
        Ok(queued)
    }

    /// Send `packet` over the air.
    ///
    /// Returns `false` if the module was powered down.
    pub fn transmit(&self, packet: &Packet) -> Result<bool, GatewayError> {
        self.radio()
            .send(packet)
            .map_err(|e| GatewayError::radio(self.number, e))
    }

    pub fn is_asleep(&self) -> bool {
        self.radio().is_asleep()
    }

    pub fn power_down(&self) -> Result<(), GatewayError> {
        self.radio()
            .power_down()
            .map_err(|e| GatewayError::radio(self.number, e))
    }

    /// Print the transceiver's configuration to stdout.
    pub fn print_details(&self) -> Result<(), GatewayError> {
        println!("Module {}", self.number);
        self.radio()
            .print_details()
            .map_err(|e| GatewayError::radio(self.number, e))
    }

    /// Take the oldest queued packet.
    pub fn pop(&self) -> Option<Packet> {
        self.queue.pop()
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Packets dropped because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.queue.dropped()
    }

    /// RX FIFO overflows seen by [`RadioModule::handle_interrupt()`].
    pub fn fifo_errors(&self) -> u64 {
        self.fifo_errors.load(Ordering::Relaxed)
    }

    /// Incomplete frames flushed by [`RadioModule::handle_interrupt()`].
    pub fn malformed(&self) -> u64 {
        self.malformed.load(Ordering::Relaxed)
    }

    /// Bytes received after a complete frame and dropped.
    pub fn discarded_bytes(&self) -> u32 {
        self.radio().discarded_rx_bytes()
    }
}
