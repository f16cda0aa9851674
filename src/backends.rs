//! Backend registration and dispatch
//!
//! Each backend is a [`SpiHal`](qspi_core::hal::SpiHal) implementation in
//! its own crate, gated behind a cargo feature. The HAL trait has an
//! associated controller type, so dispatch is a `match` that runs the
//! generic [`execute`] once per backend arm.

use qspi_core::plan::Plan;
use qspi_core::sequence::{execute, Observer, RunOptions, RunSummary};

/// Information about a backend
pub struct BackendInfo {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Alternative names/aliases
    pub aliases: &'static [&'static str],
    /// Short description
    pub description: &'static str,
}

/// Get information about all backends enabled at compile time
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_backends() -> Vec<BackendInfo> {
    let mut backends = Vec::new();

    #[cfg(feature = "sim")]
    backends.push(BackendInfo {
        name: "sim",
        aliases: &["dummy"],
        description: "Simulated controllers with an emulated NOR flash \
                      (devices=<i|j>,fail=<n>,status=<code>,clock-status=<code>,jedec=<hex6>,caps=<single|dual|quad>)",
    });

    #[cfg(feature = "linux-spi")]
    backends.push(BackendInfo {
        name: "linux_spi",
        aliases: &["linux-spi", "spidev"],
        description: "Linux spidev interface, index N is <prefix>N.<cs> (cs=<n>,prefix=/dev/spidev)",
    });

    backends
}

/// Backend used when none is configured
pub fn default_backend() -> Option<&'static str> {
    available_backends().first().map(|b| b.name)
}

/// Generate help text listing all available backends
pub fn backend_help() -> String {
    let backends = available_backends();

    if backends.is_empty() {
        return "No backends available (recompile with backend features enabled)".to_string();
    }

    let mut help = String::from("Available backends:\n");
    for b in &backends {
        help.push_str(&format!("  {:10} - {}\n", b.name, b.description));
    }
    help
}

/// Generate a short list of backend names for CLI help
pub fn backend_names_short() -> String {
    let names: Vec<&str> = available_backends().iter().map(|b| b.name).collect();
    names.join(", ")
}

/// Resolve a backend name or alias to its primary name
pub fn find_backend(name: &str) -> Option<&'static str> {
    available_backends()
        .into_iter()
        .find(|b| b.name == name || b.aliases.contains(&name))
        .map(|b| b.name)
}

/// Parse a backend string into name and options
///
/// Format: "name" or "name:option1=value1,option2=value2"
pub fn parse_backend_string(s: &str) -> (&str, Vec<(&str, &str)>) {
    if let Some((name, opts)) = s.split_once(':') {
        let options: Vec<_> = opts
            .split(',')
            .filter_map(|opt| opt.split_once('='))
            .collect();
        (name, options)
    } else {
        (s, Vec::new())
    }
}

/// Open the backend named by `backend` and run `plan` on it
///
/// The outer error covers an unknown backend or bad options; the inner
/// result is the run itself.
#[allow(unused_variables)]
pub fn run_backend<O: Observer>(
    backend: &str,
    options: &RunOptions,
    plan: &Plan,
    observer: &mut O,
) -> Result<qspi_core::Result<RunSummary>, Box<dyn std::error::Error>> {
    let (name, backend_options) = parse_backend_string(backend);

    let canonical_name = match find_backend(name) {
        Some(n) => n,
        None => return Err(unknown_backend_error(name)),
    };

    log::info!("Using backend {}", canonical_name);

    match canonical_name {
        #[cfg(feature = "sim")]
        "sim" => {
            use qspi_sim::{SimConfig, SimHal};

            let config = SimConfig::from_options(&backend_options)?;
            let mut hal = SimHal::new(config);
            Ok(execute(&mut hal, options, plan, observer))
        }

        #[cfg(feature = "linux-spi")]
        "linux_spi" => {
            let mut hal = qspi_linux_spi::open_linux_spi(&backend_options)
                .map_err(|e| format!("Invalid linux_spi parameters: {}", e))?;
            Ok(execute(&mut hal, options, plan, observer))
        }

        _ => Err(unknown_backend_error(name)),
    }
}

fn unknown_backend_error(name: &str) -> Box<dyn std::error::Error> {
    let mut msg = format!("Unknown backend: {}\n\n", name);
    msg.push_str(&backend_help());
    msg.push_str("\nUse 'qspi-runner --list-backends' for more details");
    msg.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backend_string() {
        assert_eq!(parse_backend_string("sim"), ("sim", vec![]));
        assert_eq!(
            parse_backend_string("sim:devices=3,fail=2"),
            ("sim", vec![("devices", "3"), ("fail", "2")])
        );
        // Options without '=' are dropped
        assert_eq!(
            parse_backend_string("linux_spi:cs=1,bogus"),
            ("linux_spi", vec![("cs", "1")])
        );
    }

    #[test]
    fn test_unknown_backend() {
        let result = run_backend("nope", &RunOptions::default(), &Plan::QSPI, &mut ());
        assert!(result.is_err());
    }

    #[cfg(feature = "sim")]
    #[test]
    fn test_find_backend_alias() {
        assert_eq!(find_backend("dummy"), Some("sim"));
        assert_eq!(default_backend(), Some("sim"));
    }

    #[cfg(feature = "sim")]
    #[test]
    fn test_run_sim_backend() {
        let summary = run_backend("sim:devices=3", &RunOptions::default(), &Plan::QSPI, &mut ())
            .unwrap()
            .unwrap();
        assert_eq!(summary.index, 3);
        assert_eq!(summary.steps, Plan::QSPI.steps.len());
    }

    #[cfg(feature = "sim")]
    #[test]
    fn test_run_sim_backend_failures() {
        let run = |backend: &str| run_backend(backend, &RunOptions::default(), &Plan::QSPI, &mut ());

        assert!(matches!(
            run("sim:fail=2").unwrap(),
            Err(qspi_core::Error::TransferFailed { step: "read-id", .. })
        ));
        assert!(matches!(
            run("sim:devices=").unwrap(),
            Err(qspi_core::Error::DiscoveryFailed { probed: 10 })
        ));
        // Bad options are a configuration error, not a run error
        assert!(run("sim:fail=x").is_err());
    }
}
