//! Run command implementation

use qspi_core::sequence::{Observer, StepOutcome};
use qspi_core::Error;

use crate::backends;
use crate::config::Settings;

/// Prints the user-facing lines as a run progresses
///
/// Everything here goes to stdout; diagnostics go through `log` to stderr.
pub struct Reporter {
    dump_steps: bool,
    announce: bool,
    lines: Vec<String>,
    echo: bool,
}

impl Reporter {
    /// Reporter that prints to stdout, with a hex dump per step if `dump_steps`
    pub fn stdout(dump_steps: bool) -> Self {
        Self {
            dump_steps,
            announce: true,
            lines: Vec::new(),
            echo: true,
        }
    }

    /// Reporter that only collects lines
    #[cfg(test)]
    fn capture(dump_steps: bool) -> Self {
        Self {
            dump_steps,
            announce: true,
            lines: Vec::new(),
            echo: false,
        }
    }

    #[cfg(test)]
    fn lines(&self) -> &[String] {
        &self.lines
    }

    fn emit(&mut self, line: String) {
        if self.echo {
            println!("{}", line);
        } else {
            self.lines.push(line);
        }
    }

    /// Report a failed run
    pub fn failure(&mut self, err: &Error) {
        let line = match err {
            Error::DiscoveryFailed { .. } => "Failed to get spi device",
            Error::ClockInitFailed { .. } => "spi clock init failed.",
            Error::TransferFailed { .. }
            | Error::InvalidFrameLength { .. }
            | Error::FrameTooShort { .. } => "spi transfer failed.",
        };
        self.emit(line.to_string());
    }
}

impl Observer for Reporter {
    fn discovered(&mut self, index: u8) {
        if !self.announce {
            return;
        }
        self.emit(format!("The device id of the spi device is {}", index));
    }

    fn step(&mut self, outcome: &StepOutcome) {
        if !self.dump_steps {
            return;
        }
        self.emit(format!(
            "[{}] {} ({}): tx {}",
            outcome.position,
            outcome.name,
            outcome.config.protocol,
            hex(outcome.frame.as_bytes())
        ));
        self.emit(format!(
            "[{}] {} ({}): rx {}",
            outcome.position,
            outcome.name,
            outcome.config.protocol,
            hex(&outcome.response)
        ));
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run the configured plan; returns true on success
///
/// A plan without steps succeeds silently.
pub fn run(
    settings: &Settings,
    reporter: &mut Reporter,
) -> Result<bool, Box<dyn std::error::Error>> {
    reporter.announce = !settings.plan.steps.is_empty();
    match backends::run_backend(&settings.backend, &settings.options, settings.plan, reporter)? {
        Ok(summary) => {
            log::info!(
                "{} steps completed, final protocol {}",
                summary.steps,
                summary.final_config.protocol
            );
            Ok(true)
        }
        Err(e) => {
            log::info!("{}", e);
            reporter.failure(&e);
            Ok(false)
        }
    }
}
