//! Recording mock hardware for tests
//!
//! Port, DMA channel, pins and delay all append to one shared event log so
//! tests can check ordering across them. [`MockState::frames`] replays the
//! log as the controller would see it: command bytes open a frame, data bytes
//! extend it.

use std::convert::Infallible;
use std::sync::{Arc, Mutex};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};

use crate::st7789::bus::{BusTransport, Chunk, DmaMode, DmaSource, SpiPort, TxDma, WordWidth};
use crate::st7789::config::Config;
use crate::st7789::driver::St7789;
use crate::st7789::interface::DisplayInterface;

/// One wire transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tx {
    pub dma: bool,
    pub units: usize,
    /// As clocked out, 16-bit units most significant byte first
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Select,
    Deselect,
    /// DC low
    Command,
    /// DC high
    Data,
    ResetLow,
    ResetHigh,
    Width(WordWidth),
    DmaMode(DmaMode),
    Tx(Tx),
    DmaAbort,
    DelayNs(u32),
}

/// A command and every data byte sent after it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub command: u8,
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(command: u8, data: &[u8]) -> Self {
        Frame {
            command,
            data: data.to_vec(),
        }
    }

    /// Data decoded as big-endian 16-bit words
    pub fn words(&self) -> Vec<u16> {
        self.data
            .chunks_exact(2)
            .map(|p| u16::from_be_bytes([p[0], p[1]]))
            .collect()
    }
}

/// Shared state for all mock parts
#[derive(Debug, Default)]
pub struct MockState {
    pub events: Vec<Event>,
    pub fail_writes: bool,
    pub fail_reconfigure: bool,
    /// DMA never reports ready
    pub dma_stuck: bool,
    /// Polls answered "busy" after each DMA start
    pub dma_busy_polls: u32,
    /// DMA status register reads fail
    pub dma_status_fails: bool,
    /// DMA abort is recorded, then reported as failed
    pub dma_abort_fails: bool,
    /// Total ready polls seen
    pub dma_polls: u32,
    busy_left: u32,
}

impl MockState {
    pub fn shared() -> Arc<Mutex<MockState>> {
        let _ = env_logger::builder().is_test(true).try_init();
        Arc::new(Mutex::new(MockState::default()))
    }

    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    /// SPI frame size reprogramming calls
    pub fn reconfigurations(&self) -> usize {
        self.count(|e| matches!(e, Event::Width(_)))
    }

    /// Frame size or DMA reprogramming seen while the chip was selected
    pub fn reconfigured_while_selected(&self) -> Vec<Event> {
        let mut selected = false;
        let mut seen = Vec::new();
        for event in &self.events {
            match event {
                Event::Select => selected = true,
                Event::Deselect => selected = false,
                Event::Width(_) | Event::DmaMode(_) if selected => seen.push(event.clone()),
                _ => {}
            }
        }
        seen
    }

    pub fn transfers(&self) -> Vec<Tx> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Tx(tx) => Some(tx.clone()),
                _ => None,
            })
            .collect()
    }

    /// Replay the log as the controller sees it
    ///
    /// Panics if a byte goes out while the chip is deselected or data arrives
    /// before any command.
    pub fn frames(&self) -> Vec<Frame> {
        let mut frames: Vec<Frame> = Vec::new();
        let mut selected = false;
        let mut data_mode = false;

        for event in &self.events {
            match event {
                Event::Select => selected = true,
                Event::Deselect => selected = false,
                Event::Command => data_mode = false,
                Event::Data => data_mode = true,
                Event::Tx(tx) => {
                    assert!(selected, "{} bytes sent with CS high", tx.bytes.len());
                    if data_mode {
                        frames
                            .last_mut()
                            .expect("data sent before any command")
                            .data
                            .extend_from_slice(&tx.bytes);
                    } else {
                        frames.extend(tx.bytes.iter().map(|&c| Frame::new(c, &[])));
                    }
                }
                _ => {}
            }
        }
        frames
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

fn wire_bytes(chunk: Chunk<'_>) -> Vec<u8> {
    match chunk {
        Chunk::Bytes(b) => b.to_vec(),
        Chunk::Words(w) => w.iter().flat_map(|v| v.to_be_bytes()).collect(),
    }
}

pub struct MockPort {
    state: Arc<Mutex<MockState>>,
}

impl MockPort {
    pub fn new(state: &Arc<Mutex<MockState>>) -> Self {
        MockPort {
            state: Arc::clone(state),
        }
    }
}

impl SpiPort for MockPort {
    type Error = &'static str;

    fn set_word_width(&mut self, width: WordWidth) -> Result<(), Self::Error> {
        let mut state = self.state.lock().unwrap();
        if state.fail_reconfigure {
            return Err("simulated reinit failure");
        }
        state.events.push(Event::Width(width));
        Ok(())
    }

    fn write(&mut self, chunk: Chunk<'_>) -> Result<(), Self::Error> {
        let mut state = self.state.lock().unwrap();
        if state.fail_writes {
            return Err("simulated write failure");
        }
        state.events.push(Event::Tx(Tx {
            dma: false,
            units: chunk.len(),
            bytes: wire_bytes(chunk),
        }));
        Ok(())
    }
}

pub struct MockDma {
    state: Arc<Mutex<MockState>>,
}

impl MockDma {
    pub fn new(state: &Arc<Mutex<MockState>>) -> Self {
        MockDma {
            state: Arc::clone(state),
        }
    }
}

impl TxDma for MockDma {
    type Error = &'static str;

    fn configure(&mut self, mode: DmaMode) -> Result<(), Self::Error> {
        let mut state = self.state.lock().unwrap();
        if state.fail_reconfigure {
            return Err("simulated DMA reinit failure");
        }
        state.events.push(Event::DmaMode(mode));
        Ok(())
    }

    fn start(&mut self, source: DmaSource<'_>) -> Result<(), Self::Error> {
        let mut state = self.state.lock().unwrap();
        if state.fail_writes {
            return Err("simulated DMA start failure");
        }
        let bytes = match source {
            DmaSource::Bytes(b) => wire_bytes(Chunk::Bytes(b)),
            DmaSource::Words(w) => wire_bytes(Chunk::Words(w)),
            DmaSource::Fixed { word, count } => word.to_be_bytes().repeat(usize::from(count)),
        };
        state.busy_left = state.dma_busy_polls;
        state.events.push(Event::Tx(Tx {
            dma: true,
            units: source.len(),
            bytes,
        }));
        Ok(())
    }

    fn is_ready(&mut self) -> Result<bool, Self::Error> {
        let mut state = self.state.lock().unwrap();
        state.dma_polls += 1;
        if state.dma_status_fails {
            return Err("simulated DMA status failure");
        }
        if state.dma_stuck {
            return Ok(false);
        }
        if state.busy_left > 0 {
            state.busy_left -= 1;
            return Ok(false);
        }
        Ok(true)
    }

    fn abort(&mut self) -> Result<(), Self::Error> {
        let mut state = self.state.lock().unwrap();
        state.events.push(Event::DmaAbort);
        if state.dma_abort_fails {
            return Err("simulated DMA abort failure");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub enum PinRole {
    Dc,
    Cs,
    Rst,
}

pub struct MockPin {
    role: PinRole,
    state: Arc<Mutex<MockState>>,
}

impl MockPin {
    pub fn new(role: PinRole, state: &Arc<Mutex<MockState>>) -> Self {
        MockPin {
            role,
            state: Arc::clone(state),
        }
    }

    fn record(&mut self, high: bool) {
        let event = match (self.role, high) {
            (PinRole::Dc, false) => Event::Command,
            (PinRole::Dc, true) => Event::Data,
            (PinRole::Cs, false) => Event::Select,
            (PinRole::Cs, true) => Event::Deselect,
            (PinRole::Rst, false) => Event::ResetLow,
            (PinRole::Rst, true) => Event::ResetHigh,
        };
        self.state.lock().unwrap().events.push(event);
    }
}

impl ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.record(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.record(true);
        Ok(())
    }
}

pub struct MockDelay {
    state: Arc<Mutex<MockState>>,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.state.lock().unwrap().events.push(Event::DelayNs(ns));
    }

    fn delay_us(&mut self, us: u32) {
        self.delay_ns(us.saturating_mul(1_000));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay_ns(ms.saturating_mul(1_000_000));
    }
}

pub type TestInterface = DisplayInterface<MockPort, MockDma, MockPin, MockPin, MockPin, MockDelay>;

pub type TestDisplay = St7789<MockPort, MockDma, MockPin, MockPin, MockPin, MockDelay>;

pub fn interface(state: &Arc<Mutex<MockState>>, dma: bool) -> TestInterface {
    let dma = dma.then(|| MockDma::new(state));
    DisplayInterface::new(
        BusTransport::new(MockPort::new(state), dma),
        MockPin::new(PinRole::Dc, state),
        MockPin::new(PinRole::Cs, state),
        MockPin::new(PinRole::Rst, state),
        MockDelay {
            state: Arc::clone(state),
        },
    )
}

/// Driver over mock hardware, not initialised, with an empty log
pub fn display(state: &Arc<Mutex<MockState>>, config: Config, dma: bool) -> TestDisplay {
    St7789::from_interface(interface(state, dma), config)
}
