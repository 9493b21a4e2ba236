//! A behavioural model of the CC1200 for host-side testing.
//!
//! [`SimChip`] implements [`SpiDevice`] by decoding the chip's SPI protocol:
//! register accesses in both address spaces, command strobes, and both FIFOs.
//! Clones share the same chip, so a test can keep a handle to inspect the chip
//! while a [`CC1200`](crate::radio::CC1200) owns another.
extern crate std;

use core::convert::Infallible;
use std::{
    collections::{BTreeMap, VecDeque},
    sync::{Arc, Mutex, MutexGuard},
    vec::Vec,
};

use embedded_hal::spi::{ErrorType, Operation, SpiDevice};

use crate::{
    radio::{access, commands, registers},
    types::ChipState,
};

const FIFO_SIZE: usize = 128;

#[derive(Debug, Clone, Copy)]
enum Phase {
    Header,
    ExtendedAddress { read: bool },
    Register { address: u16, read: bool },
    TxFifo,
    RxFifo,
    Ignore,
}

#[derive(Debug)]
struct ChipModel {
    short: [u8; 0x2F],
    extended: [u8; 256],
    stuck: BTreeMap<u16, u8>,
    state: ChipState,
    /// State to enter once `polls` more `SNOP`s have been seen.
    pending: Option<(ChipState, u32)>,
    settling_polls: u32,
    unresponsive: bool,
    asleep: bool,
    rx_fifo: VecDeque<u8>,
    tx_fifo: Vec<u8>,
    sent: Vec<Vec<u8>>,
    phase: Phase,
    transactions: usize,
}

impl ChipModel {
    fn new() -> Self {
        let mut model = Self {
            short: [0u8; 0x2F],
            extended: [0u8; 256],
            stuck: BTreeMap::new(),
            state: ChipState::Idle,
            pending: None,
            settling_polls: 0,
            unresponsive: false,
            asleep: false,
            rx_fifo: VecDeque::new(),
            tx_fifo: Vec::new(),
            sent: Vec::new(),
            phase: Phase::Header,
            transactions: 0,
        };
        model.power_on_reset();
        model
    }

    fn power_on_reset(&mut self) {
        self.short = [0u8; 0x2F];
        self.extended = [0u8; 256];
        self.extended[(registers::PARTNUMBER & 0xFF) as usize] = 0x20;
        self.extended[(registers::PARTVERSION & 0xFF) as usize] = 0x11;
        self.extended[(registers::RSSI1 & 0xFF) as usize] = 0x80;
        self.state = ChipState::Idle;
        self.pending = None;
        self.rx_fifo.clear();
        self.tx_fifo.clear();
    }

    fn status(&self, read: bool) -> u8 {
        let fifo_bytes = if read {
            self.rx_fifo.len()
        } else {
            FIFO_SIZE.saturating_sub(self.tx_fifo.len())
        };
        (self.state.into_bits() << 4) | fifo_bytes.min(15) as u8
    }

    fn marc_state(&self) -> u8 {
        match self.state {
            ChipState::Idle => 0x41,
            ChipState::Rx => 0x6D,
            ChipState::Tx => 0x33,
            ChipState::FastTxReady => 0x52,
            ChipState::Calibrate => 0x45,
            ChipState::Settling => 0x4B,
            ChipState::RxFifoError => 0x11,
            ChipState::TxFifoError => 0x16,
        }
    }

    fn read_register(&self, address: u16) -> u8 {
        if let Some(value) = self.stuck.get(&address) {
            return *value;
        }
        match address {
            registers::NUM_TXBYTES => self.tx_fifo.len().min(255) as u8,
            registers::NUM_RXBYTES => self.rx_fifo.len().min(255) as u8,
            registers::MARCSTATE => self.marc_state(),
            _ if address >> 8 == access::EXTENDED as u16 => self.extended[(address & 0xFF) as usize],
            _ => self.short.get(address as usize).copied().unwrap_or(0),
        }
    }

    fn write_register(&mut self, address: u16, value: u8) {
        if address >> 8 == access::EXTENDED as u16 {
            self.extended[(address & 0xFF) as usize] = value;
        } else if let Some(reg) = self.short.get_mut(address as usize) {
            *reg = value;
        }
    }

    fn go(&mut self, target: ChipState) {
        if self.settling_polls > 0 {
            self.state = ChipState::Settling;
            self.pending = Some((target, self.settling_polls));
        } else {
            self.state = target;
            self.pending = None;
        }
    }

    fn strobe(&mut self, command: u8) {
        if command == commands::SNOP {
            if let Some((target, polls)) = self.pending {
                if self.unresponsive {
                    return;
                }
                if polls <= 1 {
                    self.state = target;
                    self.pending = None;
                } else {
                    self.pending = Some((target, polls - 1));
                }
            }
            return;
        }
        if self.unresponsive {
            return;
        }
        self.asleep = false;
        match command {
            commands::SRES => self.power_on_reset(),
            commands::SRX => self.go(ChipState::Rx),
            commands::SFSTXON => self.go(ChipState::FastTxReady),
            commands::STX => {
                if !self.tx_fifo.is_empty() {
                    self.sent.push(core::mem::take(&mut self.tx_fifo));
                }
                self.go(ChipState::Tx);
            }
            commands::SIDLE => {
                self.state = ChipState::Idle;
                self.pending = None;
            }
            commands::SCAL => {
                self.state = ChipState::Calibrate;
                self.pending = Some((ChipState::Idle, self.settling_polls.max(1)));
            }
            commands::SFRX => {
                self.rx_fifo.clear();
                if self.state == ChipState::RxFifoError {
                    self.state = ChipState::Idle;
                }
            }
            commands::SFTX => {
                self.tx_fifo.clear();
                if self.state == ChipState::TxFifoError {
                    self.state = ChipState::Idle;
                }
            }
            commands::SPWD => {
                self.state = ChipState::Idle;
                self.pending = None;
                self.asleep = true;
            }
            _ => (),
        }
    }

    fn exchange(&mut self, byte: u8) -> u8 {
        match self.phase {
            Phase::Header => {
                let read = byte & access::READ != 0;
                let status = self.status(read);
                let offset = byte & 0x3F;
                self.phase = match offset {
                    0x2F => Phase::ExtendedAddress { read },
                    0x30..=0x3D => {
                        self.strobe(offset);
                        Phase::Ignore
                    }
                    0x3F if read => Phase::RxFifo,
                    0x3F => Phase::TxFifo,
                    0x3E => Phase::Ignore,
                    _ => Phase::Register {
                        address: offset as u16,
                        read,
                    },
                };
                status
            }
            Phase::ExtendedAddress { read } => {
                self.phase = Phase::Register {
                    address: ((access::EXTENDED as u16) << 8) | byte as u16,
                    read,
                };
                self.status(read)
            }
            Phase::Register { address, read } => {
                let response = if read {
                    self.read_register(address)
                } else {
                    self.write_register(address, byte);
                    self.status(false)
                };
                let next = (address & 0xFF00) | ((address as u8).wrapping_add(1) as u16);
                self.phase = Phase::Register {
                    address: next,
                    read,
                };
                response
            }
            Phase::TxFifo => {
                self.tx_fifo.push(byte);
                self.status(false)
            }
            Phase::RxFifo => self.rx_fifo.pop_front().unwrap_or(0),
            Phase::Ignore => self.status(false),
        }
    }
}

/// A simulated CC1200 on its own SPI device.
#[derive(Debug, Clone)]
pub struct SimChip {
    model: Arc<Mutex<ChipModel>>,
}

impl Default for SimChip {
    fn default() -> Self {
        Self::new()
    }
}

impl SimChip {
    /// A freshly powered chip in [`ChipState::Idle`] with empty FIFOs.
    pub fn new() -> Self {
        Self {
            model: Arc::new(Mutex::new(ChipModel::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ChipModel> {
        // a panicking test thread must not hide the chip from the others
        self.model.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn state(&self) -> ChipState {
        self.lock().state
    }

    /// Put the chip in `state` (typically a FIFO error state) immediately.
    pub fn force_state(&self, state: ChipState) {
        let mut model = self.lock();
        model.state = state;
        model.pending = None;
    }

    /// Number of `SNOP` polls a chip spends settling after each RX/TX/fast-TX strobe.
    pub fn set_settling_polls(&self, polls: u32) {
        self.lock().settling_polls = polls;
    }

    /// While set, the chip ignores every command strobe.
    pub fn set_stuck(&self, stuck: bool) {
        self.lock().unresponsive = stuck;
    }

    pub fn is_asleep(&self) -> bool {
        self.lock().asleep
    }

    pub fn register(&self, address: u16) -> u8 {
        self.lock().read_register(address)
    }

    /// Make a register ignore writes and always read as `value`.
    pub fn stick_register(&self, address: u16, value: u8) {
        self.lock().stuck.insert(address, value);
    }

    /// Put a received frame `[length][address][payload][rssi][link]` in the RX FIFO.
    pub fn inject_rx_frame(&self, address: u8, payload: &[u8], rssi: u8, link: u8) {
        let mut model = self.lock();
        model.rx_fifo.push_back(payload.len() as u8 + 1);
        model.rx_fifo.push_back(address);
        model.rx_fifo.extend(payload.iter().copied());
        model.rx_fifo.push_back(rssi);
        model.rx_fifo.push_back(link);
    }

    /// Put raw bytes in the RX FIFO.
    pub fn inject_rx_bytes(&self, bytes: &[u8]) {
        self.lock().rx_fifo.extend(bytes.iter().copied());
    }

    pub fn rx_fifo_len(&self) -> usize {
        self.lock().rx_fifo.len()
    }

    /// Put stale bytes in the TX FIFO.
    pub fn preload_tx_fifo(&self, bytes: &[u8]) {
        self.lock().tx_fifo.extend_from_slice(bytes);
    }

    /// Every TX FIFO content that was sent with `STX`, oldest first.
    pub fn sent_frames(&self) -> Vec<Vec<u8>> {
        self.lock().sent.clone()
    }

    /// Receive the latest sent frame as if it came back over the air.
    pub fn loop_back_tx(&self, rssi: u8, link: u8) {
        let mut model = self.lock();
        if let Some(frame) = model.sent.last().cloned() {
            model.rx_fifo.extend(frame);
            model.rx_fifo.push_back(rssi);
            model.rx_fifo.push_back(link);
        }
    }

    /// Number of SPI transactions the chip has seen.
    pub fn transactions(&self) -> usize {
        self.lock().transactions
    }
}

impl ErrorType for SimChip {
    type Error = Infallible;
}

impl SpiDevice for SimChip {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        let mut model = self.lock();
        model.phase = Phase::Header;
        model.transactions += 1;
        for op in operations {
            match op {
                Operation::Read(buf) => {
                    for byte in buf.iter_mut() {
                        *byte = model.exchange(0);
                    }
                }
                Operation::Write(buf) => {
                    for byte in buf.iter() {
                        model.exchange(*byte);
                    }
                }
                Operation::Transfer(read, write) => {
                    for i in 0..read.len().max(write.len()) {
                        let response = model.exchange(write.get(i).copied().unwrap_or(0));
                        if let Some(byte) = read.get_mut(i) {
                            *byte = response;
                        }
                    }
                }
                Operation::TransferInPlace(buf) => {
                    for byte in buf.iter_mut() {
                        *byte = model.exchange(*byte);
                    }
                }
                Operation::DelayNs(_) => (),
            }
        }
        Ok(())
    }
}
