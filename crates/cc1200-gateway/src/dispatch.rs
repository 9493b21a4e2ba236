use std::{
    fmt::{Display, Formatter},
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use cc1200::radio::{hardware_reset, RegisterSetting, CC1200};
use embedded_hal::{delay::DelayNs, digital::OutputPin, spi::SpiDevice};

use crate::{
    irq::{spawn_listener, InterruptLine},
    ApRecord, GatewayError, ModuleConfig, PacketSink, RadioModule, RecordSource, Semaphore,
};

/// Counters reported by [`Gateway::stats()`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GatewayStats {
    pub forwarded: u64,
    pub crc_errors: u64,
    /// Packets lost to full module queues.
    pub dropped: u64,
    pub fifo_errors: u64,
    pub transmitted: u64,
}

impl Display for GatewayStats {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "forwarded {}, CRC errors {}, dropped {}, FIFO errors {}, transmitted {}",
            self.forwarded, self.crc_errors, self.dropped, self.fifo_errors, self.transmitted
        )
    }
}

/// Owns up to four [`RadioModule`]s and moves packets between them and the application.
///
/// The gateway is meant to be shared in an [`Arc`]: the interrupt workers, the
/// inbound loop, the outbound loop and the shutdown handler all borrow it.
pub struct Gateway<SPI, DELAY> {
    modules: Vec<Arc<RadioModule<SPI, DELAY>>>,
    signal: Arc<Semaphore>,
    running: Arc<AtomicBool>,
    queue_depth: usize,
    tx_holdoff: Duration,
    forwarded: AtomicU64,
    crc_errors: AtomicU64,
    transmitted: AtomicU64,
}

impl<SPI, DELAY> Gateway<SPI, DELAY>
where
    SPI: SpiDevice + Send + 'static,
    DELAY: DelayNs + Send + 'static,
{
    /// The maximum number of modules.
    pub const MAX_MODULES: usize = 4;

    /// `queue_depth` bounds every module's queue; `tx_holdoff` is the pause
    /// after each transmission before the module returns to RX.
    pub fn new(queue_depth: usize, tx_holdoff: Duration) -> Self {
        Self {
            modules: Vec::with_capacity(Self::MAX_MODULES),
            signal: Arc::new(Semaphore::new(0)),
            running: Arc::new(AtomicBool::new(true)),
            queue_depth,
            tx_holdoff,
            forwarded: AtomicU64::new(0),
            crc_errors: AtomicU64::new(0),
            transmitted: AtomicU64::new(0),
        }
    }

    /// Attach `radio` as the module described by `config`.
    pub fn add_module(
        &mut self,
        config: &ModuleConfig,
        radio: CC1200<SPI, DELAY>,
    ) -> Result<(), GatewayError> {
        if !(1..=Self::MAX_MODULES as u8).contains(&config.number)
            || self.module(config.number).is_some()
        {
            return Err(GatewayError::UnknownModule(config.number));
        }
        self.modules.push(Arc::new(RadioModule::new(
            config,
            radio,
            self.queue_depth,
            self.signal.clone(),
        )));
        Ok(())
    }

    pub fn module(&self, number: u8) -> Option<&Arc<RadioModule<SPI, DELAY>>> {
        self.modules.iter().find(|m| m.number() == number)
    }

    pub fn modules(&self) -> &[Arc<RadioModule<SPI, DELAY>>] {
        &self.modules
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Pulse the shared reset line once, then configure every module.
    ///
    /// Returns the total number of registers that did not read back as written.
    pub fn bring_up<RST, D>(
        &self,
        reset: &mut RST,
        delay: &mut D,
        settings: &'static [RegisterSetting],
    ) -> Result<u16, GatewayError>
    where
        RST: OutputPin,
        D: DelayNs,
    {
        hardware_reset(reset, delay).map_err(GatewayError::gpio)?;
        let mut errors = 0;
        for module in &self.modules {
            errors += module.configure(settings)?;
        }
        Ok(errors)
    }

    /// Put every module in RX mode and start one interrupt worker per line.
    ///
    /// `lines` pairs a module number with that module's end-of-packet line.
    pub fn start_listening<L>(
        &self,
        lines: Vec<(u8, L)>,
    ) -> Result<Vec<JoinHandle<()>>, GatewayError>
    where
        L: InterruptLine,
    {
        let mut workers = Vec::with_capacity(lines.len());
        for (number, line) in lines {
            let module = self
                .module(number)
                .ok_or(GatewayError::UnknownModule(number))?
                .clone();
            module.listen()?;
            let worker = spawn_listener(
                format!("irq-m{number}"),
                line,
                self.running.clone(),
                move || {
                    if let Err(e) = module.handle_interrupt() {
                        log::error!("{e}");
                    }
                },
            )?;
            workers.push(worker);
        }
        log::info!("Listening on {} module(s)", workers.len());
        Ok(workers)
    }

    /// Wait for the signal, then drain every module's queue.
    ///
    /// Packets with a good CRC are forwarded to `sink` tagged with their module's
    /// number; the others are dropped. Returns the number of packets forwarded.
    pub fn inbound_cycle<S: PacketSink>(&self, sink: &mut S) -> Result<usize, GatewayError> {
        self.signal.acquire();
        let mut forwarded = 0;
        for module in &self.modules {
            while let Some(packet) = module.pop() {
                if !packet.crc_ok() {
                    self.crc_errors.fetch_add(1, Ordering::Relaxed);
                    log::warn!(
                        "Module {}: dropped packet from {:#04X} with bad CRC",
                        module.number(),
                        packet.address
                    );
                    continue;
                }
                sink.forward(ApRecord::new(module.number(), packet))?;
                self.forwarded.fetch_add(1, Ordering::Relaxed);
                forwarded += 1;
            }
        }
        Ok(forwarded)
    }

    /// Run [`Gateway::inbound_cycle()`] until [`Gateway::shutdown()`].
    ///
    /// Errors of `sink` are logged; the packet is lost.
    pub fn run_inbound<S: PacketSink>(&self, sink: &mut S) {
        while self.is_running() {
            if let Err(e) = self.inbound_cycle(sink) {
                log::error!("Forwarding failed: {e}");
            }
        }
        log::debug!("Inbound loop stopped");
    }

    /// Transmit `record` on the module it names.
    ///
    /// After the holdoff the module is put back in RX mode, unless the gateway
    /// shut down in the meantime. Returns `false` if the module was powered down.
    pub fn dispatch(&self, record: &ApRecord) -> Result<bool, GatewayError> {
        let module = self
            .module(record.module)
            .ok_or(GatewayError::UnknownModule(record.module))?;
        if !module.transmit(&record.packet)? {
            return Ok(false);
        }
        self.transmitted.fetch_add(1, Ordering::Relaxed);
        log::debug!(
            "Module {}: sent {} bytes to {:#04X}",
            module.number(),
            record.packet.len(),
            record.packet.address
        );
        thread::sleep(self.tx_holdoff);
        if self.is_running() {
            module.rearm()?;
        }
        Ok(true)
    }

    /// Dispatch records from `source` until it is exhausted or the gateway shuts down.
    ///
    /// Records naming an unknown module are skipped.
    pub fn run_outbound<R: RecordSource>(&self, source: &mut R) -> Result<(), GatewayError> {
        while self.is_running() {
            let Some(record) = source.next_record()? else {
                break;
            };
            if !self.is_running() {
                break;
            }
            match self.dispatch(&record) {
                Ok(_) => (),
                Err(GatewayError::UnknownModule(n)) => {
                    log::warn!("Skipped record for unknown module {n}")
                }
                Err(e) => log::error!("{e}"),
            }
        }
        log::debug!("Outbound loop stopped");
        Ok(())
    }

    /// Stop both loops and put every module to sleep.
    pub fn shutdown(&self) {
        self.running.store(false, Ordering::Release);
        self.signal.release();
        for module in &self.modules {
            if let Err(e) = module.power_down() {
                log::error!("{e}");
            }
        }
        log::info!("Shut down: {}", self.stats());
    }

    pub fn stats(&self) -> GatewayStats {
        GatewayStats {
            forwarded: self.forwarded.load(Ordering::Relaxed),
            crc_errors: self.crc_errors.load(Ordering::Relaxed),
            dropped: self.modules.iter().map(|m| m.dropped()).sum(),
            fifo_errors: self.modules.iter().map(|m| m.fifo_errors()).sum(),
            transmitted: self.transmitted.load(Ordering::Relaxed),
        }
    }
}

/////////////////////////////////////////////////////////////////////////////////
/// unit tests
#[cfg(test)]
mod test {
    use super::Gateway;
    use crate::{ApRecord, GatewayError, ModuleConfig, PacketSink, RecordReader, RecordWriter};
    use cc1200::{
        radio::{registers, DEFAULT_SETTINGS, CC1200},
        sim::SimChip,
        ChipState, Packet,
    };
    use embedded_hal_mock::eh1::{
        delay::NoopDelay,
        digital::{Mock as PinMock, State as PinState, Transaction as PinTransaction},
    };
    use std::{
        io::Cursor,
        sync::{mpsc, Arc},
        thread,
        time::Duration,
    };

    type SimGateway = Gateway<SimChip, NoopDelay>;

    fn sim_gateway(numbers: &[u8]) -> (SimGateway, Vec<SimChip>) {
        sim_gateway_with_holdoff(numbers, Duration::ZERO)
    }

    fn sim_gateway_with_holdoff(numbers: &[u8], holdoff: Duration) -> (SimGateway, Vec<SimChip>) {
        let mut gateway = Gateway::new(8, holdoff);
        let mut chips = Vec::new();
        for n in numbers {
            let chip = SimChip::new();
            let config = ModuleConfig::slot(*n).unwrap();
            gateway
                .add_module(&config, CC1200::new(chip.clone(), NoopDelay))
                .unwrap();
            chips.push(chip);
        }
        (gateway, chips)
    }

    #[test]
    fn reject_module_numbers() {
        let (mut gateway, _chips) = sim_gateway(&[1]);
        let config = ModuleConfig::new(1, 0, 0, 0);
        let radio = CC1200::new(SimChip::new(), NoopDelay);
        assert!(matches!(
            gateway.add_module(&config, radio),
            Err(GatewayError::UnknownModule(1))
        ));
        let config = ModuleConfig::new(5, 0, 0, 0);
        let radio = CC1200::new(SimChip::new(), NoopDelay);
        assert!(gateway.add_module(&config, radio).is_err());
        assert_eq!(gateway.modules().len(), 1);
    }

    #[test]
    fn bring_up_all_modules() {
        let (gateway, chips) = sim_gateway(&[1, 2]);
        let mut reset = PinMock::new(&[
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
        ]);
        let errors = gateway
            .bring_up(&mut reset, &mut NoopDelay, DEFAULT_SETTINGS)
            .unwrap();
        assert_eq!(errors, 0);
        reset.done();
        // channel 12 and channel 1
        assert_eq!(chips[0].register(registers::FREQ1), 0x94);
        assert_eq!(chips[1].register(registers::FREQ1), 0x5C);
    }

    #[test]
    fn forward_good_crc_only() {
        let (gateway, chips) = sim_gateway(&[1, 3]);
        chips[0].inject_rx_frame(0x10, b"good", 0x40, 0x81);
        gateway.module(1).unwrap().handle_interrupt().unwrap();
        chips[1].inject_rx_frame(0x11, b"bad", 0x40, 0x01);
        gateway.module(3).unwrap().handle_interrupt().unwrap();
        chips[1].inject_rx_frame(0x12, b"also good", 0x40, 0x80);
        gateway.module(3).unwrap().handle_interrupt().unwrap();

        let mut sink = Vec::new();
        assert_eq!(gateway.inbound_cycle(&mut sink).unwrap(), 2);
        assert_eq!(sink.len(), 2);
        assert_eq!(sink[0].module, 1);
        assert_eq!(sink[0].packet.payload(), b"good");
        assert_eq!(sink[1].module, 3);
        assert_eq!(sink[1].packet.payload(), b"also good");

        let stats = gateway.stats();
        assert_eq!(stats.forwarded, 2);
        assert_eq!(stats.crc_errors, 1);
    }

    #[test]
    fn concurrent_receive() {
        let (gateway, chips) = sim_gateway(&[1, 2]);
        let gateway = Arc::new(gateway);
        let (edge1, line1) = mpsc::channel();
        let (edge2, line2) = mpsc::channel();
        let workers = gateway
            .start_listening(vec![(1, line1), (2, line2)])
            .unwrap();
        assert_eq!(chips[0].state(), ChipState::Rx);

        let (sink, forwarded) = mpsc::channel::<ApRecord>();
        let inbound = {
            let gateway = gateway.clone();
            thread::spawn(move || {
                let mut sink = sink;
                gateway.run_inbound(&mut sink);
            })
        };

        // module 1 receives three packets, module 2 two, edges interleaved
        for n in 0..5u8 {
            let (chip, edge) = if n % 2 == 0 {
                (&chips[0], &edge1)
            } else {
                (&chips[1], &edge2)
            };
            chip.inject_rx_frame(0x20 + n, &[n; 12], 0x30, 0x80 | n);
            edge.send(()).unwrap();
            // one frame in the FIFO at a time
            while chip.rx_fifo_len() > 0 {
                thread::yield_now();
            }
        }

        let received: Vec<ApRecord> = (0..5)
            .map(|_| forwarded.recv_timeout(Duration::from_secs(5)).unwrap())
            .collect();
        // modules may interleave, but each module's packets keep their arrival order
        for (module, expected) in [(1u8, vec![0u8, 2, 4]), (2, vec![1, 3])] {
            let order: Vec<u8> = received
                .iter()
                .filter(|r| r.module == module)
                .map(|r| r.packet.address - 0x20)
                .collect();
            assert_eq!(order, expected);
        }
        for record in &received {
            let n = record.packet.address - 0x20;
            assert_eq!(record.packet.payload(), &[n; 12]);
            assert_eq!(record.packet.link.lqi(), n);
        }
        assert!(forwarded.recv_timeout(Duration::from_millis(50)).is_err());

        gateway.shutdown();
        drop(edge1);
        drop(edge2);
        inbound.join().unwrap();
        for worker in workers {
            worker.join().unwrap();
        }
        assert!(chips.iter().all(|c| c.is_asleep()));
        assert_eq!(gateway.stats().forwarded, 5);
    }

    /// Forwards records, but holds every record of `held` until `gate` yields.
    struct GatedSink {
        held: u8,
        entered: mpsc::Sender<()>,
        gate: mpsc::Receiver<()>,
        out: mpsc::Sender<ApRecord>,
    }

    impl PacketSink for GatedSink {
        fn forward(&mut self, record: ApRecord) -> Result<(), GatewayError> {
            if record.module == self.held {
                let _ = self.entered.send(());
                let _ = self.gate.recv();
            }
            self.out.forward(record)
        }
    }

    #[test]
    fn receive_while_forwarding_other_module() {
        let (gateway, chips) = sim_gateway(&[1, 2]);
        let gateway = Arc::new(gateway);
        let (edge1, line1) = mpsc::channel();
        let (edge2, line2) = mpsc::channel();
        let workers = gateway
            .start_listening(vec![(1, line1), (2, line2)])
            .unwrap();

        let (entered, forwarding) = mpsc::channel();
        let (release, gate) = mpsc::channel();
        let (out, forwarded) = mpsc::channel::<ApRecord>();
        let inbound = {
            let gateway = gateway.clone();
            let mut sink = GatedSink {
                held: 2,
                entered,
                gate,
                out,
            };
            thread::spawn(move || gateway.run_inbound(&mut sink))
        };

        // the inbound loop stalls on module 2's packet
        chips[1].inject_rx_frame(0x50, b"held", 0x30, 0x80);
        edge2.send(()).unwrap();
        forwarding.recv_timeout(Duration::from_secs(5)).unwrap();

        for n in 0..5u8 {
            chips[0].inject_rx_frame(0x30 + n, &[n; 4], 0x30, 0x80);
            edge1.send(()).unwrap();
            while chips[0].rx_fifo_len() > 0 {
                thread::yield_now();
            }
        }
        let module1 = gateway.module(1).unwrap();
        while module1.queued() < 5 {
            thread::yield_now();
        }
        release.send(()).unwrap();

        let first = forwarded.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!((first.module, first.packet.address), (2, 0x50));
        for n in 0..5u8 {
            let record = forwarded.recv_timeout(Duration::from_secs(5)).unwrap();
            assert_eq!(record.module, 1);
            assert_eq!(record.packet.address, 0x30 + n);
            assert_eq!(record.packet.payload(), &[n; 4]);
        }
        assert!(forwarded.recv_timeout(Duration::from_millis(50)).is_err());
        assert_eq!(gateway.stats().dropped, 0);

        gateway.shutdown();
        drop(edge1);
        drop(edge2);
        inbound.join().unwrap();
        for worker in workers {
            worker.join().unwrap();
        }
    }

    #[test]
    fn late_edge_after_shutdown() {
        let (gateway, chips) = sim_gateway(&[1]);
        let module = gateway.module(1).unwrap();
        module.listen().unwrap();
        gateway.shutdown();
        chips[0].inject_rx_frame(0x10, b"late", 0x30, 0x80);
        assert!(!module.handle_interrupt().unwrap());
        assert!(chips[0].is_asleep());
        assert_ne!(chips[0].state(), ChipState::Rx);
        assert_eq!(module.queued(), 0);
    }

    #[test]
    fn shutdown_during_holdoff() {
        let (gateway, chips) = sim_gateway_with_holdoff(&[2], Duration::from_millis(200));
        let gateway = Arc::new(gateway);
        let sender = {
            let gateway = gateway.clone();
            thread::spawn(move || {
                let record = ApRecord::new(2, Packet::new(0x01, b"last").unwrap());
                gateway.dispatch(&record)
            })
        };
        thread::sleep(Duration::from_millis(50));
        gateway.shutdown();
        assert!(chips[0].is_asleep());
        sender.join().unwrap().unwrap();
        assert!(chips[0].is_asleep());
        assert_ne!(chips[0].state(), ChipState::Rx);
    }

    #[test]
    fn outbound_to_addressed_module() {
        let (gateway, chips) = sim_gateway(&[2, 3]);
        let mut stream = RecordWriter::new(Vec::new());
        for (module, payload) in [
            (3u8, &b"to three"[..]),
            (9, &b"nowhere"[..]),
            (2, &b"to two"[..]),
        ] {
            let record = ApRecord::new(module, Packet::new(0x05, payload).unwrap());
            stream.forward(record).unwrap();
        }
        let mut source = RecordReader::new(Cursor::new(stream.into_inner()));
        gateway.run_outbound(&mut source).unwrap();

        let sent = chips[0].sent_frames();
        assert_eq!(sent.len(), 1);
        assert_eq!(&sent[0][2..], b"to two");
        let sent = chips[1].sent_frames();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0][..2], [9, 0x05]);
        assert_eq!(&sent[0][2..], b"to three");
        assert_eq!(chips[1].state(), ChipState::Rx);
        assert_eq!(gateway.stats().transmitted, 2);
    }

    #[test]
    fn no_transmit_after_shutdown() {
        let (gateway, chips) = sim_gateway(&[4]);
        gateway.shutdown();
        assert!(!gateway.is_running());
        assert!(chips[0].is_asleep());
        let record = ApRecord::new(4, Packet::new(0x01, b"late").unwrap());
        assert!(!gateway.dispatch(&record).unwrap());
        assert!(chips[0].sent_frames().is_empty());
    }
}
