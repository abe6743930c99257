#[path = "../bin_common.rs"]
mod common;

use clap::Parser;
use common::{init_tracing, report_fatal};
use jmx_monitor::{
    ConnectionBroker, ConsoleSink, CsvSink, HotspotConfig, HotspotTransport, PollLoop,
    SpecResolver, SpecSources, TOMCAT_BOOTSTRAP_MARKER, WriterFanout,
    hotspot::{DEFAULT_AGENT_OPTIONS, DEFAULT_TMP_DIR},
};
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "jmx-monitor")]
#[command(about = "Sample JMX attributes of a local JVM at a fixed interval")]
struct Args {
    /// Java process id to monitor. If not specified, looks for a single process matching --match.
    #[arg(short, long)]
    pid: Option<u32>,

    /// Object name of the bean to monitor
    #[arg(short, long, requires = "attrs")]
    bean: Option<String>,

    /// Names of attributes in the bean to monitor
    #[arg(short, long, num_args = 1.., requires = "bean")]
    attrs: Vec<String>,

    /// Log used heap and old generation GC count and time
    #[arg(short, long)]
    memory: bool,

    /// Config file with one '<bean> <attribute> [alias]' per line
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Interval in ms between samples
    #[arg(short, long, default_value_t = 1000)]
    interval: u64,

    /// CSV file to append samples to
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Display name substring used to find the target when no pid is given
    #[arg(long = "match", default_value = TOMCAT_BOOTSTRAP_MARKER)]
    marker: String,

    /// Jolokia JVM agent jar, loaded into the target if it doesn't run one yet
    #[arg(long, env = "JMX_MONITOR_AGENT_JAR")]
    agent_jar: Option<PathBuf>,

    /// Options passed to the agent when loading it
    #[arg(long, default_value = DEFAULT_AGENT_OPTIONS)]
    agent_options: String,

    /// Seconds to wait for the target JVM to accept an attach
    #[arg(long, default_value_t = 10)]
    attach_timeout: u64,

    /// Temp directory of the target JVMs
    #[arg(long, default_value = DEFAULT_TMP_DIR)]
    tmp_dir: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();
    let args = Args::parse();

    let sources = SpecSources {
        memory: args.memory,
        bean: args.bean,
        attributes: args.attrs,
        config: args.config,
    };
    let specs = match SpecResolver::resolve(&sources) {
        Ok(specs) => specs,
        Err(e) => {
            report_fatal(&e);
            std::process::exit(1);
        }
    };

    let mut fanout = WriterFanout::new().with(ConsoleSink::stdout());
    if let Some(path) = &args.output {
        match CsvSink::open(path) {
            Ok(sink) => fanout.add(sink),
            Err(e) => {
                eprintln!("Cannot open output file {}: {}", path.display(), e);
                std::process::exit(1);
            }
        }
    }

    let transport = HotspotTransport::new(HotspotConfig {
        tmp_dir: args.tmp_dir,
        agent_jar: args.agent_jar,
        agent_options: args.agent_options,
        attach_timeout: Duration::from_secs(args.attach_timeout),
        ..Default::default()
    });
    let broker = ConnectionBroker::new(transport).with_marker(args.marker);
    let connection = match broker.resolve_target(args.pid).await {
        Ok(connection) => connection,
        Err(e) => {
            report_fatal(&e);
            std::process::exit(1);
        }
    };

    let cancel = CancellationToken::new();
    let cancel_signal = cancel.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        cancel_signal.cancel();
    });

    PollLoop::new(Duration::from_millis(args.interval))
        .run(&connection, &specs, &mut fanout, cancel)
        .await;
    println!();
}
