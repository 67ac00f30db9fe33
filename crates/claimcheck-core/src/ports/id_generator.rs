//! IdGenerator port - local task id generation.

use crate::domain::LocalTaskId;
use crate::ports::Clock;
use ulid::Ulid;

/// Generates local task ids.
pub trait IdGenerator: Send + Sync {
    fn generate_task_id(&self) -> LocalTaskId;
}

/// ULID-based generator. The timestamp part comes from the clock so a
/// `FixedClock` gives a deterministic prefix; the random part keeps ids unique.
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_task_id(&self) -> LocalTaskId {
        let timestamp_ms = self.clock.now().timestamp_millis() as u64;
        let ulid = Ulid::from_parts(timestamp_ms, rand::random());
        LocalTaskId::from(ulid)
    }
}
