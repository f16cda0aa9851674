//! Command sequencer

use crate::error::{Error, Result};
use crate::hal::SpiController;
use crate::plan::{Plan, Step};
use crate::spi::{BusConfig, CommandFrame, FrameBuf};

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

/// Where a run currently is
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    /// Controller handed over, clock not yet set
    Discovering,
    /// Clock set, no step issued yet
    Initialized,
    /// Running the given step (1-based)
    Running(usize),
    /// A step or the clock init failed; terminal
    Failed,
    /// Every step succeeded; terminal
    Completed,
}

/// How to treat a non-zero status from clock initialization
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClockPolicy {
    /// Log the status and carry on
    #[default]
    Trust,
    /// Abort the run with [`Error::ClockInitFailed`]
    Checked,
}

/// Result of one successful step
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepOutcome {
    /// Step name
    pub name: &'static str,
    /// 1-based position in the plan
    pub position: usize,
    /// Configuration the transfer ran with
    pub config: BusConfig,
    /// Bytes clocked out
    pub frame: CommandFrame,
    /// Bytes clocked in, same length as `frame`
    pub response: FrameBuf,
    response_offset: usize,
}

impl StepOutcome {
    /// Opcode of the frame
    pub fn opcode(&self) -> u8 {
        self.frame.opcode()
    }

    /// Response bytes from the first meaningful byte on
    pub fn payload(&self) -> &[u8] {
        &self.response[self.response_offset..]
    }
}

/// Outcomes of a whole plan
#[cfg(feature = "alloc")]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    /// One entry per step, in order
    pub outcomes: Vec<StepOutcome>,
}

/// Runs steps against one controller
///
/// Owns the controller for the whole run, so transfers on it are serialized
/// by construction. The current [`BusConfig`] is replaced, never mutated,
/// when a step switches protocol width; the new value stays in effect for
/// every later step.
pub struct Sequencer<C> {
    controller: C,
    config: BusConfig,
    state: RunState,
    steps_run: usize,
}

impl<C: SpiController> Sequencer<C> {
    /// Wrap a discovered controller
    pub fn new(controller: C, config: BusConfig) -> Self {
        Self {
            controller,
            config,
            state: RunState::Discovering,
            steps_run: 0,
        }
    }

    /// Current configuration
    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    /// Current state
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Number of steps whose transfer succeeded
    pub fn steps_run(&self) -> usize {
        self.steps_run
    }

    /// Set the bus clock
    ///
    /// Must run before the first step. Under [`ClockPolicy::Trust`] a
    /// non-zero status only produces a warning.
    pub fn initialize(&mut self, baud_rate: u32, policy: ClockPolicy) -> Result<()> {
        log::debug!("Initializing SPI clock to {} baud", baud_rate);

        if let Err(status) = self.controller.init(baud_rate) {
            match policy {
                ClockPolicy::Trust => {
                    log::warn!(
                        "SPI clock init returned status {}, continuing anyway",
                        status
                    );
                }
                ClockPolicy::Checked => {
                    self.state = RunState::Failed;
                    return Err(Error::ClockInitFailed { status });
                }
            }
        }

        self.state = RunState::Initialized;
        Ok(())
    }

    /// Run one step
    pub fn run_step(&mut self, step: &Step) -> Result<StepOutcome> {
        let result = self.try_step(step);
        if result.is_err() {
            self.state = RunState::Failed;
        }
        result
    }

    fn try_step(&mut self, step: &Step) -> Result<StepOutcome> {
        let position = self.steps_run + 1;
        self.state = RunState::Running(position);

        if let Some(width) = step.switch_to {
            log::debug!("Switching protocol {} -> {}", self.config.protocol, width);
            self.config = self.config.with_protocol(width);
        }
        let config = self.config;

        if let Some(spec) = step.spec() {
            if spec.protocol != config.protocol {
                log::warn!(
                    "{} expects {} protocol but bus is configured for {}",
                    spec.mnemonic,
                    spec.protocol,
                    config.protocol
                );
            }
        }
        if !config.protocol.supported_by(self.controller.capabilities()) {
            log::warn!(
                "Controller does not advertise {} protocol support",
                config.protocol
            );
        }

        let frame = step.build()?;
        let mut response = frame.response_buffer()?;

        log::debug!(
            "Step {} '{}': opcode 0x{:02X}, {} bytes, {} protocol",
            position,
            step.name,
            frame.opcode(),
            frame.len(),
            config.protocol
        );

        self.controller
            .transfer(&config, frame.as_bytes(), &mut response)
            .map_err(|status| Error::TransferFailed {
                step: step.name,
                opcode: frame.opcode(),
                status,
            })?;

        self.steps_run = position;
        log::trace!("Step {} response: {:02X?}", position, response.as_slice());

        Ok(StepOutcome {
            name: step.name,
            position,
            config,
            frame,
            response,
            response_offset: step.response_offset(),
        })
    }

    /// Run every step of `plan` in order, stopping at the first error
    ///
    /// `on_step` sees each successful outcome before the next step starts.
    /// Returns the number of steps run.
    pub fn run_with<F>(&mut self, plan: &Plan, mut on_step: F) -> Result<usize>
    where
        F: FnMut(&StepOutcome),
    {
        log::info!("Running plan '{}' ({} steps)", plan.name, plan.steps.len());

        for step in plan.steps {
            let outcome = self.run_step(step)?;
            on_step(&outcome);
        }

        self.state = RunState::Completed;
        Ok(self.steps_run)
    }

    /// Run every step of `plan` and collect the outcomes
    #[cfg(feature = "alloc")]
    pub fn run(&mut self, plan: &Plan) -> Result<RunReport> {
        let mut report = RunReport::default();
        self.run_with(plan, |outcome| report.outcomes.push(outcome.clone()))?;
        Ok(report)
    }
}
