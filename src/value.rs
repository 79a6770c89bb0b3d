use core::any::Any;
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};

use crate::ValueError;

/// Identity of one configuration cell.
///
/// Every value gets a fresh id when it is constructed (or cloned), so a `RequiredError` can be
/// traced back to the field and the flag that own the cell without comparing addresses.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ValueId(u64);

impl ValueId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A settable, self-validating configuration cell which knows the difference between
/// "never set" and "set to a zero value".
///
/// The `Display` impl renders the current value, and renders nothing if and only if the value
/// is unset. A failed [`Value::set`] always leaves the value unset, even if it held something
/// before.
///
/// This trait is object safe: providers, flag registries and the struct walker all work with
/// `&dyn Value` / `&mut dyn Value`. Typed reads go through the inherent `get` and `value`
/// methods of the concrete types.
pub trait Value: fmt::Display {
    /// Parse and validate `s`, replacing (or for slices, possibly extending) the current value.
    fn set(&mut self, s: &str) -> Result<(), ValueError>;

    /// The parsed native value, or `None` if unset.
    ///
    /// For slice values this also marks the sequence completed, so the next `set` replaces it.
    fn get_any(&self) -> Option<&dyn Any>;

    /// A fixed name for this kind of value, used in help and diagnostics.
    fn type_name(&self) -> &'static str;

    /// True for values which may appear as a flag with no argument
    fn is_bool_flag(&self) -> bool {
        false
    }

    /// The identity of this cell
    fn id(&self) -> ValueId;
}

/// Extra operations on values holding a sequence of elements.
pub trait SliceValue: Value {
    /// Parse one element (no comma splitting) and add it to the end of the sequence.
    fn append(&mut self, s: &str) -> Result<(), ValueError>;

    /// Overwrite the whole sequence with the given elements.
    fn replace(&mut self, ss: &[&str]) -> Result<(), ValueError>;

    /// The elements in the string form they were accepted in.
    fn get_slice(&self) -> Vec<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_ids_are_distinct() {
        let a = ValueId::next();
        let b = ValueId::next();
        assert_ne!(a, b);
        assert!(a < b);
    }
}
