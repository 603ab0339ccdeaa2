//! Six-channel sensor/valve control: the channel model and the
//! sampling pass that actuates valves from it.

pub mod channels;
pub mod sampler;
