pub mod config;
pub mod error;
pub mod queue;
pub mod sched;
pub mod sim;

#[cfg(test)]
mod test;
