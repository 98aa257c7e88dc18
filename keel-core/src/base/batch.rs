//! Batch.

/// A batch of transitions `(o_t, a_t, o_t+1, r_t, is_terminated_t, is_truncated_t)`.
pub trait TransitionBatch {
    /// A set of observations in a batch.
    type ObsBatch;

    /// A set of actions in a batch.
    type ActBatch;

    /// Unpacks the data `(o_t, a_t, o_t+1, r_t, is_terminated_t, is_truncated_t)`.
    fn unpack(
        self,
    ) -> (
        Self::ObsBatch,
        Self::ActBatch,
        Self::ObsBatch,
        Vec<f32>,
        Vec<i8>,
        Vec<i8>,
    );

    /// Returns the number of transitions.
    fn len(&self) -> usize;

    /// Returns `o_t`.
    fn obs(&self) -> &Self::ObsBatch;

    /// Returns `a_t`.
    fn act(&self) -> &Self::ActBatch;
}
