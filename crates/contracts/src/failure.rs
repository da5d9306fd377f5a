//! WriteFailure - failure notification emitted per failed write attempt

use std::sync::Arc;

use crate::{CategoryId, LogError};

/// Emitted to failure subscribers whenever a writer attempt fails.
///
/// `fatal` is true only on the terminating exhaustion case: the category had
/// no enabled writer left to try. Delivered over a broadcast channel, so a
/// slow or dropped observer can never affect the dispatch path.
#[derive(Debug, Clone)]
pub struct WriteFailure {
    /// Category the failed attempt belonged to
    pub category: CategoryId,
    /// The writer error that triggered the notification
    pub error: Arc<LogError>,
    /// True when the category was exhausted by this failure
    pub fatal: bool,
}
