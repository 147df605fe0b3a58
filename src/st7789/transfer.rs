//! Bulk transfer engine
//!
//! Splits a payload into chunks the peripheral can count (at most
//! [`MAX_TRANSFER`] units) and sends each one either as a blocking write or as
//! a DMA transfer followed by a busy-poll on the ready flag. Which path a chunk
//! takes depends only on its own length against the DMA threshold.

use crate::st7789::bus::{BusTransport, Chunk, DmaMode, DmaSource, SpiPort, TxDma, WordWidth};
use crate::st7789::config::WaitPolicy;
use crate::st7789::error::{DisplayError, Error};
use crate::st7789::{FILL_BUFFER_LEN, MAX_TRANSFER};

/// Data to stream after the DC line is set high
#[derive(Debug, Clone, Copy)]
pub enum Payload<'a> {
    /// Sent with 8-bit frames
    Bytes(&'a [u8]),
    /// Sent with 16-bit frames, most significant byte first
    Words(&'a [u16]),
    /// One 16-bit word repeated; DMA reads it from a fixed address
    Repeat { word: u16, count: u32 },
}

impl Payload<'_> {
    pub fn width(&self) -> WordWidth {
        match self {
            Payload::Bytes(_) => WordWidth::Bits8,
            Payload::Words(_) | Payload::Repeat { .. } => WordWidth::Bits16,
        }
    }

    /// Length in bus units
    pub fn len(&self) -> usize {
        match self {
            Payload::Bytes(b) => b.len(),
            Payload::Words(w) => w.len(),
            Payload::Repeat { count, .. } => *count as usize,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<PORT, DMA> BusTransport<PORT, DMA>
where
    PORT: SpiPort,
    DMA: TxDma,
{
    /// Program the frame size and DMA mode `payload` will need
    ///
    /// Run before chip select goes low so `transmit` only hits the cache. Later
    /// chunks either reuse this mode or fall below the threshold and go blocking.
    pub fn prepare(&mut self, payload: &Payload<'_>) -> Result<(), Error> {
        if !self.uses_dma(payload.len().min(MAX_TRANSFER)) {
            return self.set_word_width(payload.width());
        }
        match payload {
            Payload::Repeat { .. } => self.set_dma_mode(DmaMode::fixed(WordWidth::Bits16)),
            _ => self.set_dma_mode(DmaMode::streaming(payload.width())),
        }
    }

    /// Send the whole payload; the caller owns chip-select and DC
    pub fn transmit(&mut self, payload: Payload<'_>) -> Result<(), Error> {
        self.set_word_width(payload.width())?;

        if payload.len() > MAX_TRANSFER {
            log::debug!(
                "Splitting {} units into {} transfers",
                payload.len(),
                payload.len().div_ceil(MAX_TRANSFER)
            );
        }

        match payload {
            Payload::Bytes(bytes) => {
                for chunk in bytes.chunks(MAX_TRANSFER) {
                    self.send_chunk(Chunk::Bytes(chunk))?;
                }
            }
            Payload::Words(words) => {
                for chunk in words.chunks(MAX_TRANSFER) {
                    self.send_chunk(Chunk::Words(chunk))?;
                }
            }
            Payload::Repeat { word, count } => {
                let mut remaining = count as usize;
                while remaining > 0 {
                    let chunk = remaining.min(MAX_TRANSFER);
                    self.send_repeat(word, chunk)?;
                    remaining -= chunk;
                }
            }
        }
        Ok(())
    }

    fn send_chunk(&mut self, chunk: Chunk<'_>) -> Result<(), Error> {
        if self.uses_dma(chunk.len()) {
            let width = match chunk {
                Chunk::Bytes(_) => WordWidth::Bits8,
                Chunk::Words(_) => WordWidth::Bits16,
            };
            self.set_dma_mode(DmaMode::streaming(width))?;
            let source = match chunk {
                Chunk::Bytes(b) => DmaSource::Bytes(b),
                Chunk::Words(w) => DmaSource::Words(w),
            };
            return self.run_dma(source);
        }

        log::trace!("Blocking write of {} units", chunk.len());
        self.port.write(chunk).map_err(|e| {
            log::error!("SPI write of {} units failed: {:?}", chunk.len(), e);
            Error::Interface(DisplayError::BusWriteError)
        })
    }

    /// `count` never exceeds [`MAX_TRANSFER`]
    fn send_repeat(&mut self, word: u16, count: usize) -> Result<(), Error> {
        if self.uses_dma(count) {
            self.set_dma_mode(DmaMode::fixed(WordWidth::Bits16))?;
            return self.run_dma(DmaSource::Fixed {
                word,
                count: count as u16,
            });
        }

        // Short tail, or no DMA at all: expand through the stack buffer
        let block = [word; FILL_BUFFER_LEN];
        let mut remaining = count;
        while remaining > 0 {
            let n = remaining.min(FILL_BUFFER_LEN);
            self.send_chunk(Chunk::Words(&block[..n]))?;
            remaining -= n;
        }
        Ok(())
    }

    fn run_dma(&mut self, source: DmaSource<'_>) -> Result<(), Error> {
        let wait = self.dma_wait;
        let Some(dma) = self.dma.as_mut() else {
            return Err(Error::Interface(DisplayError::BusWriteError));
        };

        log::trace!("DMA transfer of {} units", source.len());
        dma.start(source).map_err(|e| {
            log::error!("DMA start of {} units failed: {:?}", source.len(), e);
            Error::Interface(DisplayError::BusWriteError)
        })?;

        let mut polls: u32 = 0;
        loop {
            match dma.is_ready() {
                Ok(true) => return Ok(()),
                Ok(false) => {}
                Err(e) => {
                    log::error!("DMA status read failed: {:?}", e);
                    if let Err(e) = dma.abort() {
                        log::error!("DMA abort failed: {:?}", e);
                    }
                    return Err(Error::Interface(DisplayError::BusWriteError));
                }
            }

            polls = polls.saturating_add(1);
            if let WaitPolicy::Bounded { polls: limit } = wait {
                if polls >= limit {
                    log::error!("DMA not ready after {} polls, aborting", polls);
                    if let Err(e) = dma.abort() {
                        log::error!("DMA abort failed: {:?}", e);
                    }
                    return Err(Error::DmaTimeout { polls });
                }
            }
            core::hint::spin_loop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::st7789::mock::{Event, MockDma, MockPort, MockState, Tx};

    fn transfers(state: &Arc<Mutex<MockState>>) -> Vec<Tx> {
        state.lock().unwrap().transfers()
    }

    #[test]
    fn test_large_buffer_splits_into_max_sized_chunks() {
        let state = MockState::shared();
        let mut bus = BusTransport::new(MockPort::new(&state), None::<MockDma>);

        let words = vec![0x1234u16; 2 * MAX_TRANSFER + 8930];
        bus.transmit(Payload::Words(&words)).unwrap();

        let sizes: Vec<usize> = transfers(&state).iter().map(|t| t.units).collect();
        assert_eq!(sizes, vec![MAX_TRANSFER, MAX_TRANSFER, 8930]);
        assert_eq!(sizes.iter().sum::<usize>(), words.len());
        assert!(transfers(&state).iter().all(|t| !t.dma));
    }

    #[test]
    fn test_chunk_count_is_ceiling() {
        for len in [1usize, MAX_TRANSFER - 1, MAX_TRANSFER, MAX_TRANSFER + 1, 3 * MAX_TRANSFER] {
            let state = MockState::shared();
            let mut bus = BusTransport::with_dma(MockPort::new(&state), MockDma::new(&state));
            let bytes = vec![0xA5u8; len];
            bus.transmit(Payload::Bytes(&bytes)).unwrap();

            let sizes: Vec<usize> = transfers(&state).iter().map(|t| t.units).collect();
            assert_eq!(sizes.len(), len.div_ceil(MAX_TRANSFER), "len {len}");
            assert!(sizes.iter().all(|&s| s <= MAX_TRANSFER));
            assert_eq!(sizes.iter().sum::<usize>(), len);
        }
    }

    #[test]
    fn test_threshold_selects_transport_per_chunk() {
        let state = MockState::shared();
        let mut bus = BusTransport::with_dma(MockPort::new(&state), MockDma::new(&state));

        bus.transmit(Payload::Bytes(&[0u8; 15])).unwrap();
        bus.transmit(Payload::Bytes(&[0u8; 16])).unwrap();

        let txs = transfers(&state);
        assert_eq!(txs.len(), 2);
        assert!(!txs[0].dma);
        assert!(txs[1].dma);
    }

    #[test]
    fn test_repeat_uses_fixed_source_dma() {
        let state = MockState::shared();
        let mut bus = BusTransport::with_dma(MockPort::new(&state), MockDma::new(&state));

        bus.transmit(Payload::Repeat {
            word: 0xF800,
            count: 1000,
        })
        .unwrap();

        let txs = transfers(&state);
        assert_eq!(txs.len(), 1);
        assert!(txs[0].dma);
        assert_eq!(txs[0].units, 1000);
        assert!(txs[0].bytes.chunks(2).all(|p| p == [0xF8u8, 0x00]));
        assert_eq!(bus.dma_mode(), Some(DmaMode::fixed(WordWidth::Bits16)));
    }

    #[test]
    fn test_repeat_tail_below_threshold_goes_blocking() {
        let state = MockState::shared();
        let mut bus = BusTransport::with_dma(MockPort::new(&state), MockDma::new(&state));

        bus.transmit(Payload::Repeat {
            word: 0x07E0,
            count: (MAX_TRANSFER + 5) as u32,
        })
        .unwrap();

        let txs = transfers(&state);
        assert_eq!(txs.len(), 2);
        assert!(txs[0].dma);
        assert_eq!(txs[0].units, MAX_TRANSFER);
        assert!(!txs[1].dma);
        assert_eq!(txs[1].units, 5);
        assert_eq!(txs[1].bytes, [0x07u8, 0xE0].repeat(5));
    }

    #[test]
    fn test_repeat_without_dma_streams_fill_buffer_blocks() {
        let state = MockState::shared();
        let mut bus = BusTransport::new(MockPort::new(&state), None::<MockDma>);

        bus.transmit(Payload::Repeat {
            word: 0xFFFF,
            count: 150,
        })
        .unwrap();

        let sizes: Vec<usize> = transfers(&state).iter().map(|t| t.units).collect();
        assert_eq!(sizes, vec![64, 64, 22]);
    }

    #[test]
    fn test_transmit_selects_payload_width() {
        let state = MockState::shared();
        let mut bus = BusTransport::new(MockPort::new(&state), None::<MockDma>);

        bus.transmit(Payload::Words(&[1, 2, 3])).unwrap();
        assert_eq!(bus.word_width(), Some(WordWidth::Bits16));
        bus.transmit(Payload::Bytes(&[1])).unwrap();
        assert_eq!(bus.word_width(), Some(WordWidth::Bits8));
    }

    #[test]
    fn test_write_failure_is_surfaced() {
        let state = MockState::shared();
        let mut bus = BusTransport::new(MockPort::new(&state), None::<MockDma>);
        state.lock().unwrap().fail_writes = true;

        let result = bus.transmit(Payload::Bytes(&[1, 2, 3]));
        assert!(matches!(
            result,
            Err(Error::Interface(DisplayError::BusWriteError))
        ));
    }

    #[test]
    fn test_bounded_wait_times_out_and_aborts() {
        let state = MockState::shared();
        let mut bus = BusTransport::with_dma(MockPort::new(&state), MockDma::new(&state));
        bus.dma_wait = WaitPolicy::Bounded { polls: 50 };
        state.lock().unwrap().dma_stuck = true;

        let result = bus.transmit(Payload::Words(&[0u16; 100]));
        assert!(matches!(result, Err(Error::DmaTimeout { polls: 50 })));
        assert!(state
            .lock()
            .unwrap()
            .events
            .iter()
            .any(|e| matches!(e, Event::DmaAbort)));
    }

    #[test]
    fn test_status_failure_aborts_even_if_abort_fails() {
        let state = MockState::shared();
        let mut bus = BusTransport::with_dma(MockPort::new(&state), MockDma::new(&state));
        {
            let mut state = state.lock().unwrap();
            state.dma_status_fails = true;
            state.dma_abort_fails = true;
        }

        let result = bus.transmit(Payload::Words(&[0u16; 100]));
        assert!(matches!(
            result,
            Err(Error::Interface(DisplayError::BusWriteError))
        ));
        assert_eq!(state.lock().unwrap().count(|e| matches!(e, Event::DmaAbort)), 1);

        // The channel is usable again once status reads recover
        {
            let mut state = state.lock().unwrap();
            state.dma_status_fails = false;
            state.dma_abort_fails = false;
            state.clear();
        }
        bus.transmit(Payload::Words(&[0u16; 100])).unwrap();
        assert_eq!(transfers(&state).len(), 1);
    }

    #[test]
    fn test_spin_wait_polls_until_ready() {
        let state = MockState::shared();
        let mut bus = BusTransport::with_dma(MockPort::new(&state), MockDma::new(&state));
        state.lock().unwrap().dma_busy_polls = 1000;

        bus.transmit(Payload::Words(&[0u16; 100])).unwrap();
        assert_eq!(state.lock().unwrap().dma_polls, 1001);
    }
}
