pub mod attach;
pub mod broker;
pub mod error;
pub mod hotspot;
pub mod jolokia;
pub mod metric;
pub mod monitor;
pub mod object_name;
pub mod resolver;
pub mod transport;
pub mod writer;

pub use broker::{ConnectionBroker, TOMCAT_BOOTSTRAP_MARKER};
pub use error::{MonitorError, Result};
pub use hotspot::{HotspotConfig, HotspotTransport};
pub use jolokia::JolokiaConnection;
pub use metric::{CompositeKey, MetricSpec};
pub use monitor::{DEFAULT_INTERVAL, PollLoop, SampleRow, sample_all};
pub use object_name::ObjectName;
pub use resolver::{SpecResolver, SpecSources, parse_config};
pub use transport::{MBeanConnection, ProcessDescriptor, Transport};
pub use writer::{ConsoleSink, CsvSink, Sink, WriterFanout};
