use super::*;

use quickcheck_macros::quickcheck;

use crate::interrupt::test_support::Counters;
use crate::interrupt::InterruptSource;
use crate::pac::flash::{BLOCK_SIZE, FEIC_KEY, FSTAT_CCIF, SECTOR_SIZE};
use crate::pac::memory_map;
use crate::pac::mock::{Access, Mock, Model};
use crate::pac::{Lockable, Register};
use crate::scm::{self, Cache};

const BASE: u32 = memory_map::FLASH;
const FSTAT: u32 = BASE + Fstat::OFFSET;
const FCTRL: u32 = BASE + Fctrl::OFFSET;
const FCMD: u32 = BASE + Fcmd::OFFSET;
const FADDR: u32 = BASE + Faddr::OFFSET;
const FDATA: u32 = BASE + Fdata::OFFSET;
const FEIC: u32 = BASE + Feic::OFFSET;
const FEIA: u32 = BASE + Feia::OFFSET;
const CACHE: u32 = memory_map::SCM;

const CC_IE: u32 = 1 << 8;

type TestFlash<'a> = Flash<Cache<&'a Mock>, &'a Mock>;

fn mock() -> Mock {
    let mock = Mock::new();
    mock.model(FSTAT, Model::plain().w1c(<Fstat as Register>::W1C));
    mock.set(FSTAT, FSTAT_CCIF);
    mock.model(
        FEIC,
        Model::locked(Feic::LOCK, FEIC_KEY).write_only(0xff00_0000),
    );
    mock.set(FEIC, Feic::LOCK);
    mock.model(FEIA, Model::plain().guarded_by(FEIC, Feic::LOCK));
    mock.model(CACHE, Model::plain().write_only(0b10));
    mock.set(CACHE, 1);
    mock
}

fn flash(mock: &Mock, config: Config) -> TestFlash<'_> {
    let (cache, _) = scm::split(mock.block(CACHE));
    Flash::new(mock.block(BASE), cache, config)
}

// the running command completes with `flags` on status read `after`
fn complete_after(mock: &Mock, after: usize, flags: u32) {
    let mut reads = 0;
    mock.on_read(FSTAT, move |memory| {
        reads += 1;
        if reads == after {
            memory.update(FSTAT, |v| v | FSTAT_CCIF | flags);
        }
        memory.get(FSTAT)
    });
}

// one aligned instance of every command
fn commands(address: u32, words: [u32; 4]) -> [Command; 8] {
    [
        Command::EraseVerifyAll,
        Command::EraseVerifyBlock {
            address: address & !(BLOCK_SIZE - 1),
        },
        Command::EraseVerifySector {
            address: address & !(SECTOR_SIZE - 1),
        },
        Command::ProgramPhrase {
            address: address & !0xf,
            data: words,
        },
        Command::EraseSector {
            address: address & !(SECTOR_SIZE - 1),
        },
        Command::EraseBlock {
            address: address & !(BLOCK_SIZE - 1),
        },
        Command::EraseAll,
        Command::VerifyBackdoorKey { key: words },
    ]
}

fn nothing() {}

#[test]
fn submit_stages_then_commits() {
    let mock = mock();
    let mut flash = flash(&mock, Config::default());

    let command = Command::ProgramPhrase {
        address: 0x1230,
        data: [1, 2, 3, 4],
    };
    assert_eq!(flash.submit(&command), Ok(()));
    assert!(!flash.is_idle());

    assert_eq!(
        mock.writes(),
        [
            (FADDR, 0x1230),
            (FDATA, 1),
            (FDATA + 4, 2),
            (FDATA + 8, 3),
            (FDATA + 12, 4),
            (FCMD, 0x10),
            (FSTAT, FSTAT_FAIL | FSTAT_CMD_ABORT | FSTAT_ACC_ERR),
            (CACHE, 0),
            (FSTAT, FSTAT_CCIF),
            (CACHE, 0b10),
            (CACHE, 1),
        ]
    );

    let journal = mock.journal();
    let launch = journal
        .iter()
        .position(|a| {
            *a == Access::Write {
                address: FSTAT,
                value: FSTAT_CCIF,
            }
        })
        .unwrap();
    assert_eq!(journal[launch + 1], Access::Barrier);
}

#[quickcheck]
fn busy_submit_writes_nothing(address: u32, words: (u32, u32, u32, u32), which: u8) -> bool {
    let mock = mock();
    mock.set(FSTAT, 0);
    let mut flash = flash(&mock, Config::default());

    let all = commands(address, [words.0, words.1, words.2, words.3]);
    let command = &all[which as usize % all.len()];

    flash.submit(command) == Err(Error::Busy) && mock.writes().is_empty()
}

#[quickcheck]
fn completion_classified_by_flags(fail: bool, aborted: bool, access: bool, which: u8) -> bool {
    let mock = mock();
    let config = Config::default()
        .command_timeout(100)
        .erase_all_timeout(100);
    let mut flash = flash(&mock, config);

    let all = commands(0x4_0000, [0; 4]);
    let command = &all[which as usize % all.len()];
    if flash.submit(command).is_err() {
        return false;
    }

    let mut flags = 0;
    if fail {
        flags |= FSTAT_FAIL;
    }
    if aborted {
        flags |= FSTAT_CMD_ABORT;
    }
    if access {
        flags |= FSTAT_ACC_ERR;
    }
    complete_after(&mock, 3, flags);

    let failure = Failure {
        verify: fail,
        aborted,
        access,
    };
    let expected = if failure.any() {
        Err(Error::Failed(failure))
    } else {
        Ok(())
    };
    flash.wait_completion(None) == expected
}

#[quickcheck]
fn abort_when_idle_is_already_finished(flags: u32) -> bool {
    let mock = mock();
    mock.set(FSTAT, flags | FSTAT_CCIF);
    let mut flash = flash(&mock, Config::default());

    flash.request_abort() == AbortOutcome::AlreadyFinished && mock.writes().is_empty()
}

#[test]
fn abort_lands() {
    let mock = mock();
    let mut flash = flash(&mock, Config::default().abort_timeout(10));
    flash.submit(&Command::EraseAll).unwrap();

    mock.on_write(FCTRL, |memory, value| {
        memory.set(FCTRL, value);
        if value & 1 != 0 {
            memory.update(FSTAT, |v| v | FSTAT_CCIF | FSTAT_CMD_ABORT);
        }
    });

    assert_eq!(flash.request_abort(), AbortOutcome::Aborted);
    assert_eq!(mock.get(FSTAT), FSTAT_CCIF);
    assert_eq!(mock.get(FCTRL) & 1, 0);
    assert!(flash.is_idle());
}

#[test]
fn abort_loses_race() {
    let mock = mock();
    let mut flash = flash(&mock, Config::default().abort_timeout(10));
    flash.submit(&Command::EraseSector { address: 0 }).unwrap();

    mock.on_write(FCTRL, |memory, value| {
        memory.set(FCTRL, value);
        if value & 1 != 0 {
            memory.update(FSTAT, |v| v | FSTAT_CCIF);
        }
    });

    assert_eq!(flash.request_abort(), AbortOutcome::AlreadyFinished);
}

#[test]
fn abort_timeout() {
    let mock = mock();
    let mut flash = flash(&mock, Config::default().abort_timeout(10));
    flash.submit(&Command::EraseSector { address: 0 }).unwrap();

    assert_eq!(flash.request_abort(), AbortOutcome::Timeout);
    assert_eq!(mock.writes_to(FCTRL), [1]);
}

#[test]
fn timed_out_abort_does_not_reach_next_command() {
    let mock = mock();
    let mut flash = flash(&mock, Config::default().abort_timeout(10));
    flash.submit(&Command::EraseSector { address: 0 }).unwrap();
    assert_eq!(flash.request_abort(), AbortOutcome::Timeout);
    assert_eq!(mock.get(FCTRL) & 1, 1);

    // the command finishes on its own
    mock.set(FSTAT, FSTAT_CCIF);
    assert_eq!(flash.wait_completion(None), Ok(()));
    assert_eq!(mock.get(FCTRL) & 1, 0);

    // and a request left over from elsewhere is dropped before launch
    mock.set(FCTRL, 1);
    mock.clear_journal();
    assert_eq!(flash.submit(&Command::EraseSector { address: 0 }), Ok(()));
    assert_eq!(mock.get(FCTRL) & 1, 0);
    let writes = mock.writes();
    let cleared = writes.iter().position(|w| *w == (FCTRL, 0)).unwrap();
    let launch = writes.iter().position(|w| *w == (FSTAT, FSTAT_CCIF)).unwrap();
    assert!(cleared < launch);
}

#[test]
fn erase_all_uses_long_bound() {
    let mock = mock();
    let config = Config::default()
        .command_timeout(10)
        .erase_all_timeout(1000);
    let mut flash = flash(&mock, config);

    assert_eq!(flash.submit(&Command::EraseAll), Ok(()));
    complete_after(&mock, 500, 0);
    let mut polls = 0;
    let mut poll = || polls += 1;
    assert_eq!(flash.wait_completion(Some(&mut poll)), Ok(()));
    assert_eq!(polls, 499);

    // the same latency is too long for anything else
    assert_eq!(flash.submit(&Command::EraseSector { address: 0 }), Ok(()));
    complete_after(&mock, 500, 0);
    assert_eq!(flash.wait_completion(None), Err(Error::Timeout));

    // and while that runs, EraseAll is refused without side effects
    mock.clear_journal();
    assert_eq!(flash.submit(&Command::EraseAll), Err(Error::Busy));
    assert!(mock.writes().is_empty());
}

#[test]
fn misaligned_writes_nothing() {
    let mock = mock();
    let mut flash = flash(&mock, Config::default());

    assert_eq!(
        flash.submit(&Command::EraseSector { address: 0x10 }),
        Err(Error::Misaligned)
    );
    assert_eq!(
        flash.program_phrase(0x1008, &[0; 16], Completion::Poll(None)),
        Err(Error::Misaligned)
    );
    assert_eq!(flash.program(0, &[0; 15], None), Err(Error::Misaligned));
    assert!(mock.writes().is_empty());
}

#[test]
fn program_splits_into_phrases() {
    let mock = mock();
    // every launch completes at once
    mock.on_write(FSTAT, |memory, value| {
        memory.update(FSTAT, |v| v & !(value & !FSTAT_CCIF));
    });
    let mut flash = flash(&mock, Config::default());

    let mut data = [0u8; 32];
    data[16] = 0xaa;
    assert_eq!(flash.program(0x100, &data, None), Ok(()));
    assert_eq!(mock.writes_to(FADDR), [0x100, 0x110]);
    assert_eq!(mock.writes_to(FCMD), [0x10, 0x10]);
    assert_eq!(mock.writes_to(FDATA), [0, 0xaa]);
}

static COMPLETE: Counters<1> = Counters::new();

fn complete() {
    COMPLETE.hit(0)
}

#[test]
fn interrupt_completion() {
    let mock = mock();
    let mut flash = flash(&mock, Config::default());
    flash.install_callback(Event::CommandComplete, Some(complete));
    COMPLETE.reset();

    assert_eq!(
        flash.execute(&Command::EraseSector { address: 0x2000 }, Completion::Interrupt),
        Ok(())
    );
    assert_ne!(mock.get(FCTRL) & CC_IE, 0);
    assert_eq!(flash.take_outcome(), None);

    mock.set(FSTAT, FSTAT_CCIF | FSTAT_ACC_ERR);
    flash.handle();

    assert_eq!(COMPLETE.get(0), 1);
    assert_eq!(
        flash.take_outcome(),
        Some(Err(Error::Failed(Failure {
            access: true,
            ..Default::default()
        })))
    );
    assert_eq!(flash.take_outcome(), None);
    assert_eq!(mock.get(FCTRL) & CC_IE, 0);
    assert_eq!(mock.journal().last(), Some(&Access::Barrier));
}

#[test]
fn unhandled_events_are_masked() {
    for event in Event::ALL {
        let mock = mock();
        mock.set(
            FSTAT,
            FSTAT_CCIF | FSTAT_SINGLE_BIT_FAULT | FSTAT_DOUBLE_BIT_FAULT,
        );
        let mut flash = flash(&mock, Config::default());
        for other in Event::ALL {
            flash.enable_interrupt(*other);
            if other != event {
                flash.install_callback(*other, Some(nothing));
            }
        }

        flash.handle();
        assert_eq!(mock.journal().last(), Some(&Access::Barrier));

        let ctrl = Fctrl::from(mock.get(FCTRL));
        let expected = match event {
            // completion disables itself, handled or not
            Event::CommandComplete => (false, true, true),
            Event::SingleBitFault => (false, false, true),
            Event::DoubleBitFault => (false, true, false),
        };
        assert_eq!((ctrl.cc_ie(), ctrl.sbf_ie(), ctrl.dbf_ie()), expected);
        assert_eq!(mock.get(FSTAT), FSTAT_CCIF);
    }
}

#[test]
fn ecc_injection_under_lock() {
    let mock = mock();
    let mut flash = flash(&mock, Config::default());

    flash.inject_ecc_error(0x8000, EccError::DoubleBit);
    assert_eq!(mock.get(FEIA), 0x8000);
    let feic = Feic::from(mock.get(FEIC));
    assert!(feic.enable());
    assert_eq!(feic.mode(), 1);
    assert!(feic.lock());

    flash.stop_ecc_injection();
    let feic = Feic::from(mock.get(FEIC));
    assert!(!feic.enable());
    assert!(feic.lock());

    // outside the bracket the lock holds
    mock.write(FEIA, 0);
    assert_eq!(mock.get(FEIA), 0x8000);
}
