//! Sharing one SPI bus between several radio modules.
//!
//! Every module has its own chip select, but all of them drive the same SO line.
//! After CS is asserted, a module keeps SO high until its crystal is running,
//! so SO doubles as a "chip ready" input that must read low before clocking data.

use std::{
    sync::{Arc, Mutex},
    thread,
    time::Duration,
};

use embedded_hal::{
    digital::{InputPin, OutputPin},
    spi::{Error as SpiError, ErrorKind, ErrorType, Operation, SpiBus, SpiDevice},
};

/// Number of ready line reads before a transaction is abandoned.
pub const DEFAULT_READY_POLLS: u32 = 10_000;

/// The bus and ready line shared by all [`ReadyGatedDevice`]s.
#[derive(Debug)]
pub struct SharedBus<BUS, RDY> {
    bus: BUS,
    ready: Option<RDY>,
}

impl<BUS, RDY> SharedBus<BUS, RDY> {
    /// Wrap `bus` for sharing.
    ///
    /// Without a `ready` line, data is clocked as soon as CS is asserted.
    pub fn new(bus: BUS, ready: Option<RDY>) -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(Self { bus, ready }))
    }
}

impl<BUS, RDY> SharedBus<BUS, RDY>
where
    BUS: SpiBus,
    RDY: InputPin,
{
    fn wait_ready(&mut self, polls: u32) -> Result<(), BusError<BUS::Error, RDY::Error>> {
        let Some(ready) = self.ready.as_mut() else {
            return Ok(());
        };
        for _ in 0..polls {
            if ready.is_low().map_err(BusError::Pin)? {
                return Ok(());
            }
            thread::yield_now();
        }
        Err(BusError::NotReady)
    }

    fn run(
        &mut self,
        operations: &mut [Operation<'_, u8>],
        polls: u32,
    ) -> Result<(), BusError<BUS::Error, RDY::Error>> {
        self.wait_ready(polls)?;
        for op in operations {
            match op {
                Operation::Read(buf) => self.bus.read(buf),
                Operation::Write(buf) => self.bus.write(buf),
                Operation::Transfer(read, write) => self.bus.transfer(read, write),
                Operation::TransferInPlace(buf) => self.bus.transfer_in_place(buf),
                Operation::DelayNs(ns) => {
                    self.bus.flush().map_err(BusError::Bus)?;
                    thread::sleep(Duration::from_nanos(*ns as u64));
                    Ok(())
                }
            }
            .map_err(BusError::Bus)?;
        }
        Ok(())
    }
}

/// Errors of a [`ReadyGatedDevice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError<B, P> {
    Bus(B),
    /// Either the chip select or the ready line failed.
    Pin(P),
    /// The ready line stayed high for [`ReadyGatedDevice::ready_polls`] reads.
    NotReady,
}

impl<B, P> SpiError for BusError<B, P>
where
    B: SpiError,
    P: core::fmt::Debug,
{
    fn kind(&self) -> ErrorKind {
        match self {
            BusError::Bus(err) => err.kind(),
            BusError::Pin(_) => ErrorKind::ChipSelectFault,
            BusError::NotReady => ErrorKind::Other,
        }
    }
}

/// A [`SpiDevice`] on a [`SharedBus`], selected by its own `CS` pin.
///
/// The bus stays locked from CS assertion to deassertion.
pub struct ReadyGatedDevice<BUS, RDY, CS> {
    shared: Arc<Mutex<SharedBus<BUS, RDY>>>,
    cs: CS,
    /// Ready line reads before giving up with [`BusError::NotReady`].
    pub ready_polls: u32,
}

impl<BUS, RDY, CS> ReadyGatedDevice<BUS, RDY, CS>
where
    CS: OutputPin,
{
    /// Deassert `cs` and attach it to `shared`.
    pub fn new(shared: Arc<Mutex<SharedBus<BUS, RDY>>>, mut cs: CS) -> Result<Self, CS::Error> {
        cs.set_high()?;
        Ok(Self {
            shared,
            cs,
            ready_polls: DEFAULT_READY_POLLS,
        })
    }
}

impl<BUS, RDY, CS> ErrorType for ReadyGatedDevice<BUS, RDY, CS>
where
    BUS: SpiBus,
    RDY: InputPin,
    CS: OutputPin<Error = RDY::Error>,
{
    type Error = BusError<BUS::Error, RDY::Error>;
}

impl<BUS, RDY, CS> SpiDevice for ReadyGatedDevice<BUS, RDY, CS>
where
    BUS: SpiBus,
    RDY: InputPin,
    CS: OutputPin<Error = RDY::Error>,
{
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        // the bus itself holds no state a panicking device could corrupt
        let mut shared = self.shared.lock().unwrap_or_else(|e| e.into_inner());
        self.cs.set_low().map_err(BusError::Pin)?;
        let result = shared.run(operations, self.ready_polls);
        let flushed = shared.bus.flush().map_err(BusError::Bus);
        let deselected = self.cs.set_high().map_err(BusError::Pin);
        result?;
        flushed?;
        deselected
    }
}

/////////////////////////////////////////////////////////////////////////////////
/// unit tests
#[cfg(test)]
mod test {
    use super::{BusError, ReadyGatedDevice, SharedBus};
    use embedded_hal::spi::{Operation, SpiDevice};
    use embedded_hal_mock::eh1::{
        digital::{Mock as PinMock, State as PinState, Transaction as PinTransaction},
        spi::{Mock as SpiMock, Transaction as SpiTransaction},
    };

    #[test]
    fn wait_for_ready_line() {
        let mut bus = SpiMock::new(&[
            SpiTransaction::transfer_in_place(vec![0xBD], vec![0x0F]),
            SpiTransaction::flush(),
        ]);
        let mut ready = PinMock::new(&[
            PinTransaction::get(PinState::High),
            PinTransaction::get(PinState::High),
            PinTransaction::get(PinState::Low),
        ]);
        let mut cs = PinMock::new(&[
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
        ]);
        let shared = SharedBus::new(bus.clone(), Some(ready.clone()));
        let mut device = ReadyGatedDevice::new(shared, cs.clone()).unwrap();
        let mut buf = [0xBDu8];
        device
            .transaction(&mut [Operation::TransferInPlace(&mut buf)])
            .unwrap();
        assert_eq!(buf, [0x0F]);
        bus.done();
        ready.done();
        cs.done();
    }

    #[test]
    fn ready_line_stuck_high() {
        let mut bus = SpiMock::new(&[SpiTransaction::flush()]);
        let mut ready = PinMock::new(&[
            PinTransaction::get(PinState::High),
            PinTransaction::get(PinState::High),
        ]);
        let mut cs = PinMock::new(&[
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
        ]);
        let shared = SharedBus::new(bus.clone(), Some(ready.clone()));
        let mut device = ReadyGatedDevice::new(shared, cs.clone()).unwrap();
        device.ready_polls = 2;
        let mut buf = [0x3Du8];
        let result = device.transaction(&mut [Operation::TransferInPlace(&mut buf)]);
        assert!(matches!(result, Err(BusError::NotReady)));
        bus.done();
        ready.done();
        cs.done();
    }

    #[test]
    fn two_devices_one_bus() {
        let mut bus = SpiMock::new(&[
            SpiTransaction::transfer_in_place(vec![0x3D], vec![0x10]),
            SpiTransaction::flush(),
            SpiTransaction::write_vec(vec![0x3A]),
            SpiTransaction::flush(),
        ]);
        let select = [
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
        ];
        let mut cs1 = PinMock::new(&select);
        let mut cs2 = PinMock::new(&select);
        let shared = SharedBus::<_, PinMock>::new(bus.clone(), None);
        let mut first = ReadyGatedDevice::new(shared.clone(), cs1.clone()).unwrap();
        let mut second = ReadyGatedDevice::new(shared, cs2.clone()).unwrap();

        let mut buf = [0x3Du8];
        first
            .transaction(&mut [Operation::TransferInPlace(&mut buf)])
            .unwrap();
        assert_eq!(buf, [0x10]);
        second.transaction(&mut [Operation::Write(&[0x3A])]).unwrap();
        bus.done();
        cs1.done();
        cs2.done();
    }
}
