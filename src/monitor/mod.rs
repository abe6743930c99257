pub mod poll;
pub mod sampler;

pub use poll::{DEFAULT_INTERVAL, PollLoop, SampleRow};
pub use sampler::{render_value, sample_all};
