use jmx_monitor::{MonitorError, ProcessDescriptor};
use tracing_subscriber::EnvFilter;

/// Log to stderr so diagnostics never land on the console status line.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn candidate_line(candidate: &ProcessDescriptor, marker: Option<&str>) -> String {
    let flag = match marker {
        Some(marker) if candidate.display_name.contains(marker) => '*',
        _ => ' ',
    };
    format!("  {} {}", flag, candidate)
}

#[allow(dead_code)]
pub fn print_candidates(candidates: &[ProcessDescriptor], marker: Option<&str>) {
    for candidate in candidates {
        println!("{}", candidate_line(candidate, marker));
    }
}

/// Print a startup failure with the processes the operator can choose from.
#[allow(dead_code)]
pub fn report_fatal(error: &MonitorError) {
    eprintln!("{}", error);
    let candidates = error.candidates();
    if !candidates.is_empty() {
        eprintln!("  detected JVMs are:");
        for candidate in candidates {
            eprintln!("{}", candidate_line(candidate, None));
        }
    } else if matches!(error, MonitorError::TargetNotFound { .. }) {
        eprintln!("  no attachable JVMs detected");
    }
}
