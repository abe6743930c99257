#[path = "../bin_common.rs"]
mod common;

use clap::Parser;
use common::{init_tracing, print_candidates};
use jmx_monitor::{
    HotspotConfig, HotspotTransport, TOMCAT_BOOTSTRAP_MARKER, Transport, hotspot::DEFAULT_TMP_DIR,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "jmx-ps")]
#[command(about = "List local JVMs jmx-monitor can attach to")]
struct Args {
    /// Display name substring to flag with '*'
    #[arg(long = "match", default_value = TOMCAT_BOOTSTRAP_MARKER)]
    marker: String,

    /// Temp directory of the JVMs
    #[arg(long, default_value = DEFAULT_TMP_DIR)]
    tmp_dir: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();

    let transport = HotspotTransport::new(HotspotConfig {
        tmp_dir: args.tmp_dir,
        ..Default::default()
    });
    let processes = transport.list_processes().await?;

    if processes.is_empty() {
        eprintln!("No attachable JVMs found");
        std::process::exit(1);
    }
    print_candidates(&processes, Some(&args.marker));
    Ok(())
}
