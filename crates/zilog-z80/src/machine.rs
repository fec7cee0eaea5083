//! Controller surface: a CPU bound to its memory and clock, with a run loop
//! that another thread can stop.

use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use emu_core::{Clock, Cpu, Cycles, Memory, MemoryError};

use crate::cpu::{CpuConfig, HaltPolicy, Z80};
use crate::error::CpuError;
use crate::registers::{Registers, Snapshot};

/// Cooperative stop flag shared between a run loop and its controllers.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the run loop to stop after its current instruction. Idempotent.
    pub fn request(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn clear(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Why a run loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunExit {
    /// A stop was requested.
    Stopped,
    /// The CPU halted under [`HaltPolicy::Stop`].
    Halted,
}

/// A Z80 with its memory and clock.
#[derive(Debug)]
pub struct Machine<M: Memory, C: Clock> {
    cpu: Z80,
    memory: M,
    clock: C,
    stop: StopSignal,
}

impl<M: Memory, C: Clock> Machine<M, C> {
    pub fn new(memory: M, clock: C) -> Self {
        Self::with_config(CpuConfig::default(), memory, clock)
    }

    pub fn with_config(config: CpuConfig, memory: M, clock: C) -> Self {
        Self {
            cpu: Z80::with_config(config),
            memory,
            clock,
            stop: StopSignal::new(),
        }
    }

    /// Execute one instruction.
    pub fn step(&mut self) -> Result<Cycles, CpuError> {
        self.cpu.step(&mut self.memory, &mut self.clock)
    }

    /// Step until a stop is requested or, under [`HaltPolicy::Stop`], the
    /// CPU halts.
    ///
    /// A stop requested before the call is discarded. Any other error ends
    /// the run and is returned as-is.
    pub fn run(&mut self) -> Result<RunExit, CpuError> {
        self.stop.clear();
        log::debug!("run from {:04X}", self.cpu.registers().pc());
        loop {
            if let Some(exit) = self.advance()? {
                return Ok(exit);
            }
        }
    }

    /// One iteration of the run loop: a step, then the stop check.
    fn advance(&mut self) -> Result<Option<RunExit>, CpuError> {
        match self.step() {
            Ok(_) => {}
            Err(CpuError::HaltRequested { pc }) => {
                if self.cpu.config().halt == HaltPolicy::Stop {
                    log::debug!("halted at {pc:04X}");
                    return Ok(Some(RunExit::Halted));
                }
            }
            Err(err) => {
                log::debug!("run ended: {err}");
                return Err(err);
            }
        }
        if self.stop.is_requested() {
            log::debug!("stopped at {:04X}", self.cpu.registers().pc());
            return Ok(Some(RunExit::Stopped));
        }
        Ok(None)
    }

    pub fn request_stop(&self) {
        self.stop.request();
    }

    /// A handle other threads can use to stop `run()`.
    #[must_use]
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        self.memory.read(address)
    }

    pub fn poke(&mut self, address: u16, value: u8) -> Result<(), MemoryError> {
        self.memory.write(address, value)
    }

    /// Copy `image` into memory at `address`. Nothing is written unless the
    /// whole image fits.
    pub fn load(&mut self, address: u16, image: &[u8]) -> Result<(), MemoryError> {
        let size = self.memory.size();
        let end = usize::from(address) + image.len();
        if end > size {
            return Err(MemoryError::AddressOutOfRange {
                address: end.saturating_sub(1).min(usize::from(u16::MAX)) as u16,
                size,
            });
        }
        for (offset, &byte) in image.iter().enumerate() {
            self.memory.write(address.wrapping_add(offset as u16), byte)?;
        }
        Ok(())
    }

    #[must_use]
    pub fn cpu(&self) -> &Z80 {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Z80 {
        &mut self.cpu
    }

    #[must_use]
    pub fn registers(&self) -> &Registers {
        self.cpu.registers()
    }

    #[must_use]
    pub fn memory(&self) -> &M {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }

    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Cold-boot the CPU. Memory and clock are left alone.
    pub fn reset(&mut self) {
        self.cpu.reset();
    }

    pub fn into_parts(self) -> (Z80, M, C) {
        (self.cpu, self.memory, self.clock)
    }
}

impl<M, C> Machine<M, C>
where
    M: Memory + Send + 'static,
    C: Clock + Send + 'static,
{
    /// Run on a background thread.
    ///
    /// The machine is locked for one instruction at a time, so the returned
    /// [`Worker`] can inspect and patch it between instructions.
    pub fn spawn(self) -> Worker<M, C> {
        self.stop.clear();
        let stop = self.stop.clone();
        let shared = Arc::new(Mutex::new(self));
        let machine = Arc::clone(&shared);
        let handle = thread::spawn(move || {
            log::debug!("worker started");
            let result = loop {
                let mut guard = machine.lock().unwrap_or_else(PoisonError::into_inner);
                match guard.advance() {
                    Ok(None) => {}
                    Ok(Some(exit)) => break Ok(exit),
                    Err(err) => break Err(err),
                }
            };
            log::debug!("worker finished: {result:?}");
            result
        });
        Worker {
            machine: shared,
            stop,
            handle,
        }
    }
}

/// A machine running on its own thread.
#[derive(Debug)]
pub struct Worker<M: Memory, C: Clock> {
    machine: Arc<Mutex<Machine<M, C>>>,
    stop: StopSignal,
    handle: JoinHandle<Result<RunExit, CpuError>>,
}

impl<M: Memory, C: Clock> Worker<M, C> {
    fn lock(&self) -> MutexGuard<'_, Machine<M, C>> {
        self.machine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn request_stop(&self) {
        self.stop.request();
    }

    #[must_use]
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Read memory between instructions.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        self.lock().peek(address)
    }

    /// Write memory between instructions.
    pub fn poke(&self, address: u16, value: u8) -> Result<(), MemoryError> {
        self.lock().poke(address, value)
    }

    /// Copy of the registers between instructions.
    #[must_use]
    pub fn registers(&self) -> Snapshot {
        self.lock().registers().snapshot()
    }

    /// Run `f` with the machine locked.
    pub fn with_machine<R>(&self, f: impl FnOnce(&mut Machine<M, C>) -> R) -> R {
        f(&mut self.lock())
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the run loop to end and take the machine back.
    ///
    /// A panic on the worker thread is resumed here.
    pub fn join(self) -> (Machine<M, C>, Result<RunExit, CpuError>) {
        let result = match self.handle.join() {
            Ok(result) => result,
            Err(payload) => panic::resume_unwind(payload),
        };
        let Some(mutex) = Arc::into_inner(self.machine) else {
            unreachable!("the worker thread has exited and dropped its handle");
        };
        (mutex.into_inner().unwrap_or_else(PoisonError::into_inner), result)
    }
}

#[cfg(test)]
mod tests {
    use emu_core::{CycleCounter, Ram};

    use super::*;

    fn machine(program: &[u8]) -> Machine<Ram, CycleCounter> {
        let mut m = Machine::new(Ram::default(), CycleCounter::new());
        m.load(0, program).expect("program fits");
        m
    }

    #[test]
    fn run_stops_at_halt() {
        // LD A,5; HALT
        let mut m = machine(&[0x3E, 0x05, 0x76]);
        assert_eq!(m.run(), Ok(RunExit::Halted));
        assert_eq!(m.registers().a(), 5);
        assert!(m.registers().halted);
        assert_eq!(m.clock().elapsed(), Cycles::new(11));
    }

    #[test]
    fn stale_stop_request_is_discarded() {
        let mut m = machine(&[0x76]);
        m.request_stop();
        assert_eq!(m.run(), Ok(RunExit::Halted));
    }

    #[test]
    fn run_returns_unimplemented_opcode() {
        let mut m = machine(&[0x00, 0xDB, 0x10]);
        assert!(matches!(
            m.run(),
            Err(CpuError::UnimplementedOpcode { opcode: 0xDB, pc: 1, .. })
        ));
    }

    #[test]
    fn load_rejects_oversized_image_without_writing() {
        let mut m = Machine::new(Ram::new(4), CycleCounter::new());
        assert!(m.load(2, &[1, 2, 3]).is_err());
        assert_eq!(m.memory().as_slice(), &[0, 0, 0, 0]);
    }

    #[test]
    fn reset_keeps_memory() {
        let mut m = machine(&[0x3E, 0x05]);
        m.step().expect("LD A,n");
        assert_eq!(m.cpu().instructions(), 1);
        m.reset();
        assert_eq!(m.cpu().instructions(), 0);
        assert_eq!(m.registers().pc(), 0);
        assert_eq!(m.registers().a(), 0xFF);
        assert_eq!(m.peek(1), 0x05);
    }
}
