//! Command plans
//!
//! A plan is a named, ordered list of steps. Plans are plain `const` data;
//! the sequencer turns each step into a frame right before it is clocked.

use crate::error::Result;
use crate::spi::{catalogue, CommandFrame, CommandSpec, ProtocolWidth};

/// What a step puts on the wire
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepFrame {
    /// A catalogue command padded with zero dummies to `len` bytes
    Command {
        /// Command layout
        spec: &'static CommandSpec,
        /// Total frame length
        len: usize,
        /// Address to assert, MSB first; `None` leaves the address bytes zero
        address: Option<u32>,
    },
    /// Literal bytes padded with zeros to `len` bytes
    Raw {
        /// Leading bytes
        bytes: &'static [u8],
        /// Total frame length
        len: usize,
    },
}

/// One step of a plan
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Step {
    /// Name used in diagnostics
    pub name: &'static str,
    /// Protocol width to switch to before this step; it stays in effect for
    /// every later step
    pub switch_to: Option<ProtocolWidth>,
    /// Frame contents
    pub frame: StepFrame,
}

impl Step {
    /// A catalogue command with zero address bytes
    pub const fn command(name: &'static str, spec: &'static CommandSpec, len: usize) -> Self {
        Self {
            name,
            switch_to: None,
            frame: StepFrame::Command {
                spec,
                len,
                address: None,
            },
        }
    }

    /// Literal bytes
    pub const fn raw(name: &'static str, bytes: &'static [u8], len: usize) -> Self {
        Self {
            name,
            switch_to: None,
            frame: StepFrame::Raw { bytes, len },
        }
    }

    /// Switch protocol width before running this step
    pub const fn switching_to(mut self, width: ProtocolWidth) -> Self {
        self.switch_to = Some(width);
        self
    }

    /// Assert a real address instead of zero bytes
    pub const fn at(mut self, addr: u32) -> Self {
        if let StepFrame::Command { spec, len, .. } = self.frame {
            self.frame = StepFrame::Command {
                spec,
                len,
                address: Some(addr),
            };
        }
        self
    }

    /// Build the frame for this step
    pub fn build(&self) -> Result<CommandFrame> {
        match self.frame {
            StepFrame::Command {
                spec,
                len,
                address: Some(addr),
            } => CommandFrame::command_at(spec, addr, len),
            StepFrame::Command {
                spec,
                len,
                address: None,
            } => CommandFrame::command(spec.opcode, len),
            StepFrame::Raw { bytes, len } => CommandFrame::raw(bytes, len),
        }
    }

    /// The catalogue entry, if this is a catalogue command
    pub fn spec(&self) -> Option<&'static CommandSpec> {
        match self.frame {
            StepFrame::Command { spec, .. } => Some(spec),
            StepFrame::Raw { .. } => None,
        }
    }

    /// Documented first byte of the frame
    pub fn opcode(&self) -> u8 {
        match self.frame {
            StepFrame::Command { spec, .. } => spec.opcode,
            StepFrame::Raw { bytes, .. } => bytes.first().copied().unwrap_or(0),
        }
    }

    /// Offset of the first meaningful response byte
    ///
    /// Raw frames carry no defined response, so their offset is the frame
    /// length.
    pub fn response_offset(&self) -> usize {
        match self.frame {
            StepFrame::Command { spec, len, .. } => spec.response_offset().min(len),
            StepFrame::Raw { len, .. } => len,
        }
    }
}

/// A named sequence of steps
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Plan {
    /// Name used to select the plan
    pub name: &'static str,
    /// One-line description
    pub description: &'static str,
    /// Ordered steps
    pub steps: &'static [Step],
}

const RAW_SINGLE: &[u8] = &[0x04, 0x02, 0xEF, 0x3B];
const RAW_DUAL: &[u8] = &[0x34, 0x12, 0x97, 0xDA];

impl Plan {
    /// Programmable-IO frames interleaved with ID, single, dual and quad reads
    pub const QSPI: Plan = Plan {
        name: "qspi",
        description: "Raw frames plus RDID, READ, dual and quad reads",
        steps: &[
            Step::raw("raw-single", RAW_SINGLE, 4),
            Step::command("read-id", &catalogue::RDID, 4),
            Step::command("read", &catalogue::READ, 70),
            Step::raw("raw-dual", RAW_DUAL, 5).switching_to(ProtocolWidth::Dual),
            Step::command("dual-read", &catalogue::DOR, 10),
            Step::command("quad-read", &catalogue::QOR, 20).switching_to(ProtocolWidth::Quad),
        ],
    };

    /// Catalogue commands only
    pub const FLASH_READS: Plan = Plan {
        name: "flash-reads",
        description: "RDID, READ, dual and quad reads",
        steps: &[
            Step::command("read-id", &catalogue::RDID, 4),
            Step::command("read", &catalogue::READ, 70),
            Step::command("dual-read", &catalogue::DOR, 10).switching_to(ProtocolWidth::Dual),
            Step::command("quad-read", &catalogue::QOR, 20).switching_to(ProtocolWidth::Quad),
        ],
    };

    /// Instruction-only 4-byte address read
    pub const READ_4B: Plan = Plan {
        name: "read-4b",
        description: "READ_4B instruction only",
        steps: &[Step::command("read-4b", &catalogue::READ_4B, 4)],
    };

    /// Discovery, clock init and bus configuration, no transfers
    pub const INIT_ONLY: Plan = Plan {
        name: "init-only",
        description: "Discover and initialize the controller, issue no commands",
        steps: &[],
    };

    /// Every built-in plan
    pub const ALL: &'static [Plan] = &[Self::QSPI, Self::FLASH_READS, Self::READ_4B, Self::INIT_ONLY];

    /// Find a built-in plan by name
    pub fn find(name: &str) -> Option<&'static Plan> {
        Self::ALL.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Protocol width in effect at each step, starting from `initial`
    pub fn widths(&self, initial: ProtocolWidth) -> impl Iterator<Item = ProtocolWidth> + '_ {
        self.steps.iter().scan(initial, |width, step| {
            if let Some(next) = step.switch_to {
                *width = next;
            }
            Some(*width)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spi::opcodes;

    #[test]
    fn test_find() {
        assert_eq!(Plan::find("qspi").map(|p| p.name), Some("qspi"));
        assert_eq!(Plan::find("INIT-ONLY").map(|p| p.steps.len()), Some(0));
        assert!(Plan::find("nope").is_none());
    }

    #[test]
    fn test_all_frames_build_with_documented_opcode() {
        for plan in Plan::ALL {
            for step in plan.steps {
                let frame = step.build().unwrap();
                assert_eq!(frame.opcode(), step.opcode(), "{}/{}", plan.name, step.name);
            }
        }
    }

    #[test]
    fn test_qspi_layout() {
        let lens: [(u8, usize); 6] = [
            (0x04, 4),
            (opcodes::RDID, 4),
            (opcodes::READ, 70),
            (0x34, 5),
            (opcodes::DOR, 10),
            (opcodes::QOR, 20),
        ];
        for (step, (opcode, len)) in Plan::QSPI.steps.iter().zip(lens) {
            let frame = step.build().unwrap();
            assert_eq!(frame.opcode(), opcode);
            assert_eq!(frame.len(), len);
        }
    }

    #[test]
    fn test_widths_persist() {
        let widths: heapless::Vec<ProtocolWidth, 8> =
            Plan::QSPI.widths(ProtocolWidth::Single).collect();
        assert_eq!(
            widths.as_slice(),
            &[
                ProtocolWidth::Single,
                ProtocolWidth::Single,
                ProtocolWidth::Single,
                ProtocolWidth::Dual,
                ProtocolWidth::Dual,
                ProtocolWidth::Quad,
            ]
        );
    }

    #[test]
    fn test_catalogue_steps_match_their_protocol() {
        for plan in Plan::ALL {
            for (step, width) in plan.steps.iter().zip(plan.widths(ProtocolWidth::Single)) {
                if let Some(spec) = step.spec() {
                    assert_eq!(spec.protocol, width, "{}/{}", plan.name, step.name);
                }
            }
        }
    }

    #[test]
    fn test_at_asserts_address() {
        let step = Step::command("read", &catalogue::READ, 8).at(0x00_1000);
        assert_eq!(step.build().unwrap().as_bytes(), &[0x03, 0x00, 0x10, 0x00, 0, 0, 0, 0]);
    }

    #[test]
    fn test_response_offset() {
        assert_eq!(Plan::QSPI.steps[1].response_offset(), 1);
        assert_eq!(Plan::QSPI.steps[0].response_offset(), 4);
        // Instruction-only frame shorter than the header has no payload
        assert_eq!(Plan::READ_4B.steps[0].response_offset(), 4);
    }
}
