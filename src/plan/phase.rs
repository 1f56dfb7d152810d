//! Collection phases and the schedule that drives an increment.
//!
//! An increment is a fixed sequence of `(Schedule, Phase)` steps. Every collector thread walks
//! the sequence in lock step, meeting at a barrier after each step. The primary collector also
//! runs the global steps and the steps of every mutator.

use std::sync::{Arc, Barrier};

use probe::probe;
use strum_macros::{Display, EnumString};

use crate::global_state::GlobalState;
use crate::mmtk::MMTK;
use crate::plan::{CollectionKind, Collector, Mutator};
use crate::util::options::Options;
use crate::vm::VMBinding;

/// Who runs a step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Schedule {
    /// The plan, once, on the primary collector.
    Global,
    /// Every mutator, on the primary collector.
    Mutator,
    /// Every collector.
    Collector,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Display, EnumString)]
pub enum Phase {
    SetCollectionKind,
    Initiate,
    Prepare,
    ProcessModBuffer,
    ProcessDecBuffer,
    BackupTrace,
    Release,
    Complete,
}

/// The steps of one increment, in order.
pub const RC_SCHEDULE: &[(Schedule, Phase)] = &[
    (Schedule::Global, Phase::SetCollectionKind),
    (Schedule::Global, Phase::Initiate),
    (Schedule::Global, Phase::Prepare),
    (Schedule::Mutator, Phase::Prepare),
    (Schedule::Collector, Phase::Prepare),
    // Increments first, so that no count drops to zero while a reference to it is pending.
    (Schedule::Mutator, Phase::ProcessModBuffer),
    (Schedule::Collector, Phase::ProcessModBuffer),
    (Schedule::Mutator, Phase::ProcessDecBuffer),
    (Schedule::Collector, Phase::ProcessDecBuffer),
    (Schedule::Global, Phase::BackupTrace),
    (Schedule::Mutator, Phase::Release),
    (Schedule::Collector, Phase::Release),
    (Schedule::Global, Phase::Release),
    (Schedule::Global, Phase::Complete),
];

/// The global phases every plan handles the same way. Any other phase is a bug.
pub fn stop_the_world_phase(state: &GlobalState, options: &Options, phase: Phase) {
    match phase {
        Phase::SetCollectionKind => {
            let cycle = state.elect_collection_kind(options.cycle_collection_interval);
            debug!("Increment {}: cycle collection = {}", state.increments(), cycle);
        }
        Phase::Initiate => state.begin_increment(),
        Phase::Complete => state.end_increment(),
        _ => panic!("Global phase not handled: {}", phase),
    }
}

fn run_step<VM: VMBinding>(
    mmtk: &MMTK<VM>,
    collector: &mut Collector<VM>,
    mutators: &mut [&mut Mutator<VM>],
    step: (Schedule, Phase),
) {
    let primary = collector.is_primary();
    match step {
        (Schedule::Global, phase) if primary => {
            mmtk.plan.collection_phase(&mmtk.state, phase)
        }
        (Schedule::Mutator, phase) if primary => {
            for mutator in mutators.iter_mut() {
                mutator.collection_phase(phase);
            }
        }
        (Schedule::Collector, phase) => collector.collection_phase(phase),
        _ => {}
    }
}

/// Run one increment with every collector thread. Mutators must be stopped: the caller hands
/// over all of them.
pub fn collect<VM: VMBinding>(
    mmtk: &Arc<MMTK<VM>>,
    mutators: &mut [&mut Mutator<VM>],
    kind: CollectionKind,
) {
    let threads = mmtk.options.threads;
    mmtk.state.request_collection(kind, threads);
    info!(
        "Increment {} ({:?}) with {} collectors",
        mmtk.state.increments(),
        kind,
        threads
    );
    let barrier = Barrier::new(threads);
    std::thread::scope(|s| {
        for ordinal in 1..threads {
            let barrier = &barrier;
            let mut collector = Collector::new(ordinal, mmtk.clone());
            s.spawn(move || {
                for step in RC_SCHEDULE {
                    run_step(mmtk, &mut collector, &mut [], *step);
                    barrier.wait();
                }
            });
        }
        let mut primary = Collector::new(0, mmtk.clone());
        for step in RC_SCHEDULE {
            let (schedule, phase) = *step;
            probe!(mmtk, phase_start, phase as usize);
            debug!("Start {:?} {}", schedule, phase);
            run_step(mmtk, &mut primary, mutators, *step);
            barrier.wait();
            probe!(mmtk, phase_end, phase as usize);
            debug!("End {:?} {}", schedule, phase);
        }
    });
    info!(
        "Increment {} done, {} pages reserved",
        mmtk.state.increments(),
        mmtk.plan.get_reserved_pages()
    );
}
