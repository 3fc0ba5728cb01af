use crate::runtime::Effects;

/// Replaces `value` with `next_value`, reporting a change only when they differ.
#[inline]
pub fn eq_update<T: PartialEq>(value: &mut T, next_value: T) -> Effects {
    if *value == next_value {
        return Effects::none().unchanged();
    }
    *value = next_value;
    Effects::none()
}
