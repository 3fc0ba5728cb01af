/// A mutation that knows how to undo itself.
pub trait Reversible<T> {
    /// Returns the mutation that undoes `self` once `self` is applied to `target`.
    fn invert(&self, target: &T) -> Self;
    fn apply(&self, target: &mut T);
}

/// A mutation applied ahead of the request that confirms it.
///
/// When the request fails, `rollback` replays the recorded inverse.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PendingOperation<M> {
    pub applied: M,
    pub inverse: M,
}

impl<M> PendingOperation<M> {
    pub fn apply<T>(target: &mut T, mutation: M) -> Self
    where
        M: Reversible<T>,
    {
        let inverse = mutation.invert(target);
        mutation.apply(target);
        PendingOperation {
            applied: mutation,
            inverse,
        }
    }
    pub fn rollback<T>(&self, target: &mut T)
    where
        M: Reversible<T>,
    {
        self.inverse.apply(target);
    }
}
