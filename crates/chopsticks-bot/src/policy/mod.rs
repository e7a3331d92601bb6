mod computer;
mod sink;

pub use computer::ComputerPolicy;
pub use sink::{EvaluationSink, TracingSink};
