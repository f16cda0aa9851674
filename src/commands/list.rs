//! List commands implementation

use crate::backends::available_backends;
use qspi_core::plan::{Plan, Step};
use qspi_core::spi::ProtocolWidth;

/// List all backends compiled into this binary
pub fn list_backends() {
    println!("Supported backends:");
    println!();
    for b in available_backends() {
        println!("  {:10} - {}", b.name, b.description);
        if !b.aliases.is_empty() {
            println!("  {:10}   aliases: {}", "", b.aliases.join(", "));
        }
    }
}

/// List all built-in plans with their steps
pub fn list_plans() {
    println!("Built-in plans:");
    println!();
    for plan in Plan::ALL {
        println!("  {:12} - {}", plan.name, plan.description);
        for (step, width) in plan.steps.iter().zip(plan.widths(ProtocolWidth::Single)) {
            println!("  {:12}   {}", "", step_line(step, width));
        }
    }
}

fn step_line(step: &Step, width: ProtocolWidth) -> String {
    let frame_len = step.build().map(|f| f.len()).unwrap_or(0);
    let about = step.spec().map(|s| s.description).unwrap_or("raw frame");
    format!(
        "{:<11} 0x{:02X}  {:>3} bytes  {:6}  {}",
        step.name,
        step.opcode(),
        frame_len,
        width.to_string(),
        about
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_line_describes_command() {
        let steps = Plan::QSPI.steps;
        let widths: Vec<_> = Plan::QSPI.widths(ProtocolWidth::Single).collect();

        let rdid = steps.iter().position(|s| s.opcode() == 0x9F).unwrap();
        let line = step_line(&steps[rdid], widths[rdid]);
        assert!(line.starts_with(steps[rdid].name));
        assert!(line.ends_with("Read device ID"));

        let raw = steps.iter().position(|s| s.spec().is_none()).unwrap();
        assert!(step_line(&steps[raw], widths[raw]).ends_with("raw frame"));
    }
}
