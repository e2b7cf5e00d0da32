use core::sync::atomic::{AtomicUsize, Ordering};

use z20k14x_hal::clock::{cmu, scc, Config, Scc};
use z20k14x_hal::interrupt::{InterruptSource, Kind};
use z20k14x_hal::pac::memory_map;
use z20k14x_hal::pac::mock::Mock;
use z20k14x_hal::pac::scc::{Source, SourceCs, SOURCE_LOC};
use z20k14x_hal::pac::Register;

static LOST: AtomicUsize = AtomicUsize::new(0);

fn lost() {
    LOST.fetch_add(1, Ordering::Relaxed);
}

#[test]
fn clock_loss_kinds_are_nameable() {
    assert_eq!(scc::Event::ALL.len(), 4);
    assert_eq!(cmu::Event::ALL.len(), 3);
    assert_eq!(scc::Event::Spll.source(), Source::Spll);
}

#[test]
fn clock_loss_reaches_its_callback() {
    let mock = Mock::new();
    let mut clocks = Scc::new(mock.block(memory_map::SCC), Config::default());
    clocks.install_callback(scc::Event::Spll, Some(lost));
    clocks.enable_interrupt(scc::Event::Spll);

    let spll = memory_map::SCC + SourceCs::OFFSET + SourceCs::STRIDE * Source::Spll as u32;
    mock.set(spll, mock.get(spll) | SOURCE_LOC);
    clocks.handle();

    assert_eq!(LOST.load(Ordering::Relaxed), 1);
}
