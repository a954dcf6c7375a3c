//! Immutable shared string values.

use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

/// An immutable JavaScript string.
///
/// Strings are reference-counted leaves: they never point back into the
/// heap, so they cannot take part in a cycle and need no tracing.
/// Concatenation always produces a new allocation.
///
/// # Examples
///
/// ```
/// use core_types::JsString;
///
/// let a = JsString::from("foo");
/// let b = a.concat(&JsString::from("bar"));
/// assert_eq!(b.as_str(), "foobar");
/// assert_eq!(a.as_str(), "foo");
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct JsString(Rc<str>);

impl JsString {
    /// Returns the string contents.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a new string holding `self` followed by `other`.
    pub fn concat(&self, other: &JsString) -> JsString {
        let mut joined = String::with_capacity(self.0.len() + other.0.len());
        joined.push_str(&self.0);
        joined.push_str(&other.0);
        JsString(joined.into())
    }

    /// Length in UTF-16 code units, which is what `length` reports.
    pub fn utf16_len(&self) -> usize {
        self.0.encode_utf16().count()
    }

    /// Compares two strings by UTF-16 code units, the order used by the
    /// relational operators.
    pub fn compare_code_units(&self, other: &JsString) -> Ordering {
        self.0.encode_utf16().cmp(other.0.encode_utf16())
    }

    /// Returns true if both handles share one allocation.
    pub fn ptr_eq(&self, other: &JsString) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for JsString {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for JsString {
    fn from(s: &str) -> Self {
        JsString(s.into())
    }
}

impl From<String> for JsString {
    fn from(s: String) -> Self {
        JsString(s.into())
    }
}

impl fmt::Debug for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
