//! Run-loop and background worker tests.

use std::thread;
use std::time::{Duration, Instant};

use emu_core::{Clock, CycleCounter, Cycles, MasterClock, MemoryError, PacedClock, Ram};
use zilog_z80::{CpuConfig, CpuError, HaltPolicy, Machine, RunExit};

/// `loop: INC (HL); JR loop` with HL = 0x8000.
const COUNTER_LOOP: [u8; 6] = [0x21, 0x00, 0x80, 0x34, 0x18, 0xFD];

fn wait_until(mut done: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !done() {
        assert!(Instant::now() < deadline, "timed out");
        thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn worker_runs_until_stopped() {
    let mut machine = Machine::new(Ram::default(), CycleCounter::new());
    machine.load(0, &COUNTER_LOOP).expect("fits");

    let worker = machine.spawn();
    wait_until(|| worker.peek(0x8000) >= 3);
    worker.request_stop();
    let (machine, exit) = worker.join();

    assert_eq!(exit, Ok(RunExit::Stopped));
    assert!(machine.peek(0x8000) >= 3);
    assert!(machine.clock().elapsed() > Cycles::ZERO);
}

#[test]
fn worker_poke_is_seen_by_the_program() {
    // loop: LD A,(0x9000); OR A; JR Z,loop; HALT
    let program = [0x3A, 0x00, 0x90, 0xB7, 0x28, 0xFA, 0x76];
    let mut machine = Machine::new(Ram::default(), CycleCounter::new());
    machine.load(0, &program).expect("fits");

    let worker = machine.spawn();
    wait_until(|| worker.registers().pc != 0);
    worker.poke(0x9000, 0x5A).expect("in range");
    let (machine, exit) = worker.join();

    assert_eq!(exit, Ok(RunExit::Halted));
    assert_eq!(machine.registers().a(), 0x5A);
}

#[test]
fn worker_reports_unimplemented_opcode_and_returns_machine() {
    let mut machine = Machine::new(Ram::default(), CycleCounter::new());
    machine.load(0, &[0x00, 0xED, 0x78]).expect("fits"); // NOP; IN A,(C)

    let worker = machine.spawn();
    let (machine, exit) = worker.join();

    assert!(matches!(
        exit,
        Err(CpuError::UnimplementedOpcode { opcode: 0x78, pc: 1, .. })
    ));
    assert_eq!(machine.registers().pc(), 3);
}

/// `LD BC,0x0800; LD (BC),A` against 1K of RAM.
const WRITE_PAST_END: [u8; 4] = [0x01, 0x00, 0x08, 0x02];

const WRITE_PAST_END_ERROR: CpuError = CpuError::Memory(MemoryError::AddressOutOfRange {
    address: 0x0800,
    size: 1024,
});

#[test]
fn run_returns_rejected_write() {
    let mut machine = Machine::new(Ram::new(1024), CycleCounter::new());
    machine.load(0, &WRITE_PAST_END).expect("fits");

    assert_eq!(machine.run(), Err(WRITE_PAST_END_ERROR));
    assert_eq!(machine.registers().pc(), 4);
    assert_eq!(machine.clock().elapsed(), Cycles::new(10));
}

#[test]
fn worker_join_returns_rejected_write() {
    let mut machine = Machine::new(Ram::new(1024), CycleCounter::new());
    machine.load(0, &WRITE_PAST_END).expect("fits");

    let (machine, exit) = machine.spawn().join();

    assert_eq!(exit, Err(WRITE_PAST_END_ERROR));
    assert_eq!(machine.registers().bc(), 0x0800);
}

#[test]
fn spin_policy_keeps_running_while_halted() {
    let config = CpuConfig {
        halt: HaltPolicy::Spin,
        ..CpuConfig::default()
    };
    let mut machine = Machine::with_config(config, Ram::default(), CycleCounter::new());
    machine.load(0, &[0x76]).expect("fits");

    let stop = machine.stop_signal();
    let worker = machine.spawn();
    wait_until(|| worker.registers().halted);
    wait_until(|| worker.with_machine(|m| m.clock().elapsed() >= Cycles::new(40)));
    assert!(!worker.is_finished());
    stop.request();
    let (machine, exit) = worker.join();

    assert_eq!(exit, Ok(RunExit::Stopped));
    assert_eq!(machine.registers().pc(), 1);
}

#[test]
fn stop_from_another_thread_ends_run() {
    let mut machine = Machine::new(Ram::default(), CycleCounter::new());
    machine.load(0, &COUNTER_LOOP).expect("fits");
    let stop = machine.stop_signal();

    let stopper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        stop.request();
    });
    let exit = machine.run();
    stopper.join().expect("stopper thread");

    assert_eq!(exit, Ok(RunExit::Stopped));
}

#[test]
fn paced_clock_slows_the_run_loop() {
    // 7 + 4 cycles at 1 kHz: at least ~11 ms of wall time.
    let clock = PacedClock::new(MasterClock::new(1_000));
    let mut machine = Machine::new(Ram::default(), clock);
    machine.load(0, &[0x3E, 0x01, 0x76]).expect("fits");

    let started = Instant::now();
    assert_eq!(machine.run(), Ok(RunExit::Halted));

    assert!(started.elapsed() >= Duration::from_millis(9));
    let (_, _, clock) = machine.into_parts();
    assert_eq!(clock.elapsed(), Cycles::new(11));
}
