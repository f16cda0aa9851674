//! One-call run: discover, initialize, sequence

use super::{discover, ClockPolicy, ProbeRange, Sequencer, StepOutcome};
use crate::error::Result;
use crate::hal::SpiHal;
use crate::plan::Plan;
use crate::spi::BusConfig;

/// Bus clock used when nothing else is configured
pub const DEFAULT_BAUD_RATE: u32 = 100_000;

/// Everything a run needs besides the HAL and the plan
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunOptions {
    /// Controller indices to probe
    pub probe: ProbeRange,
    /// Bus clock rate
    pub baud_rate: u32,
    /// What to do when clock init reports an error
    pub clock_policy: ClockPolicy,
    /// Initial bus configuration
    pub bus: BusConfig,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            probe: ProbeRange::default(),
            baud_rate: DEFAULT_BAUD_RATE,
            clock_policy: ClockPolicy::default(),
            bus: BusConfig::new(),
        }
    }
}

/// What a completed run looked like
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    /// Index the controller was found at
    pub index: u8,
    /// Steps run
    pub steps: usize,
    /// Configuration after the last step
    pub final_config: BusConfig,
}

/// Hooks called as a run progresses
///
/// All methods default to doing nothing.
pub trait Observer {
    /// A controller was found
    fn discovered(&mut self, _index: u8) {}

    /// A step succeeded
    fn step(&mut self, _outcome: &StepOutcome) {}
}

impl Observer for () {}

/// Discover a controller, set its clock and run `plan` on it
///
/// Stops at the first error; no HAL call is made after it.
pub fn execute<H, O>(hal: &mut H, options: &RunOptions, plan: &Plan, observer: &mut O) -> Result<RunSummary>
where
    H: SpiHal + ?Sized,
    O: Observer + ?Sized,
{
    let found = discover(hal, options.probe)?;
    observer.discovered(found.index);

    let mut sequencer = Sequencer::new(found.controller, options.bus);
    sequencer.initialize(options.baud_rate, options.clock_policy)?;
    let steps = sequencer.run_with(plan, |outcome| observer.step(outcome))?;

    log::info!(
        "Plan '{}' completed: {} steps on controller {}",
        plan.name,
        steps,
        found.index
    );

    Ok(RunSummary {
        index: found.index,
        steps,
        final_config: *sequencer.config(),
    })
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::error::Error;
    use crate::hal::StatusCode;
    use crate::sequence::testing::{Call, RecordingController, RecordingHal};
    use crate::spi::{opcodes, ProtocolWidth};
    use std::vec::Vec;

    #[derive(Default)]
    struct Seen {
        index: Option<u8>,
        opcodes: Vec<u8>,
    }

    impl Observer for Seen {
        fn discovered(&mut self, index: u8) {
            self.index = Some(index);
        }

        fn step(&mut self, outcome: &StepOutcome) {
            self.opcodes.push(outcome.opcode());
        }
    }

    #[test]
    fn test_discovery_failure_makes_no_calls() {
        let mut hal = RecordingHal::empty();
        let result = execute(&mut hal, &RunOptions::default(), &Plan::QSPI, &mut ());
        assert_eq!(result, Err(Error::DiscoveryFailed { probed: 10 }));
        assert_eq!(hal.probed, (0..10).collect::<Vec<u8>>());
    }

    #[test]
    fn test_reports_discovered_index() {
        let ctrl = RecordingController::new();
        let log = ctrl.log();
        let mut hal = RecordingHal::with_controller_at(3, ctrl);
        let mut seen = Seen::default();

        let summary = execute(&mut hal, &RunOptions::default(), &Plan::FLASH_READS, &mut seen).unwrap();
        assert_eq!(summary.index, 3);
        assert_eq!(seen.index, Some(3));
        assert_eq!(hal.probed, [0, 1, 2, 3]);
        assert_eq!(summary.steps, 4);
        assert_eq!(summary.final_config.protocol, ProtocolWidth::Quad);
        assert_eq!(
            seen.opcodes,
            [opcodes::RDID, opcodes::READ, opcodes::DOR, opcodes::QOR]
        );
        assert_eq!(log.calls()[0], Call::Init(DEFAULT_BAUD_RATE));
    }

    #[test]
    fn test_read_id_failure_stops_run() {
        // flash-reads: read-id is the first transfer
        let ctrl = RecordingController::failing_at(1, 1);
        let log = ctrl.log();
        let mut hal = RecordingHal::with_controller_at(0, ctrl);
        let mut seen = Seen::default();

        let err = execute(&mut hal, &RunOptions::default(), &Plan::FLASH_READS, &mut seen).unwrap_err();
        assert_eq!(
            err,
            Error::TransferFailed {
                step: "read-id",
                opcode: opcodes::RDID,
                status: StatusCode(1),
            }
        );
        assert!(seen.opcodes.is_empty());

        let transfers = log.transfers();
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].1, [opcodes::RDID, 0, 0, 0]);
    }

    #[test]
    fn test_checked_clock_aborts_before_transfers() {
        let ctrl = RecordingController::new().with_init_status(-1);
        let log = ctrl.log();
        let mut hal = RecordingHal::with_controller_at(0, ctrl);
        let options = RunOptions {
            clock_policy: ClockPolicy::Checked,
            ..RunOptions::default()
        };

        let result = execute(&mut hal, &options, &Plan::QSPI, &mut ());
        assert_eq!(
            result,
            Err(Error::ClockInitFailed {
                status: StatusCode(-1)
            })
        );
        assert!(log.transfers().is_empty());
    }

    #[test]
    fn test_init_only_runs_no_transfers() {
        let ctrl = RecordingController::new();
        let log = ctrl.log();
        let mut hal = RecordingHal::with_controller_at(9, ctrl);

        let summary = execute(&mut hal, &RunOptions::default(), &Plan::INIT_ONLY, &mut ()).unwrap();
        assert_eq!(summary.index, 9);
        assert_eq!(summary.steps, 0);
        assert_eq!(log.calls(), [Call::Init(DEFAULT_BAUD_RATE)]);
    }

    #[test]
    fn test_probe_limit() {
        let mut hal = RecordingHal::with_controller_at(5, RecordingController::new());
        let options = RunOptions {
            probe: ProbeRange::new(5),
            ..RunOptions::default()
        };
        let result = execute(&mut hal, &options, &Plan::INIT_ONLY, &mut ());
        assert_eq!(result, Err(Error::DiscoveryFailed { probed: 5 }));
    }
}
