use thiserror::Error;

/// Although this is an error enum, these should be treated as warnings: the
/// table raises them through the logger and carries on.
#[derive(Error, Debug)]
pub enum LivenessWarning {
    /// The expiry handed to `update` had already passed. The entry is dead on
    /// arrival and will be collected by the next purge sweep.
    #[error("neighbour expiry already passed on update")]
    StaleExpiry,
    /// A registered resolution table was dropped by its owner without being
    /// deregistered first. The handle is skipped during lookups.
    #[error("resolution table dropped without deregistration")]
    DeadResolver,
}
