//! Chromium-backed session pool.
//!
//! One lazily launched browser process is shared by every execution; each
//! execution gets its own page, exclusively owned until release. Capacity is
//! enforced at acquisition time with no queueing.

mod host;
mod pool;
mod session;

pub use pool::BrowserPool;
pub use session::PooledSession;
