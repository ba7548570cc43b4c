//! Cross-crate scenarios: tasks, the frame scheduler, and combinators driven
//! together by a mock host.

#[cfg(test)]
mod frame_sanity;

#[cfg(test)]
mod async_flow;

#[cfg(test)]
mod fan_in;

#[cfg(test)]
fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
