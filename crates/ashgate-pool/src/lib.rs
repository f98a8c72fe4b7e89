//! Recyclable object pooling for Ashgate.
//!
//! Expensive entities (enemies, projectiles) are recycled instead of
//! constructed per spawn. A [`Pool`] owns its idle instances by value in a
//! free list; [`Pool::acquire`] moves one out to the caller, and
//! [`Pool::release`] moves it back — so an instance can never be owned by
//! two callers at once. [`PoolSet`] keys one pool per entity kind and
//! tolerates late registration by auto-registering unknown kinds with
//! default settings.
//!
//! Prewarming is a suspendable sequence: it yields to the scheduler after
//! every constructed instance and honors cooperative cancellation at each
//! yield point.

mod pool;
mod set;

pub use pool::{Pool, PoolConfig, Recyclable};
pub use set::PoolSet;
