use std::fmt;
use std::rc::Rc;

/// The closed set of call shapes a slot can be installed with.
///
/// No-result families take their arguments as-is and return nothing.
/// Result-bearing families return a value from the slot side, while their
/// delegates return `Option<R>` — `Some` means the delegate produced a value,
/// `None` means it declined and defers to the previous behavior. Buffer
/// arguments are slices, so every buffer travels with its explicit length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureFamily {
    /// `fn()`
    Unit,
    /// `fn(bool)`
    Flag,
    /// `fn(f64)`
    Scalar,
    /// `fn(&mut [f64])`
    Buffer,
    /// `fn(f64, &mut [f64])`
    ScalarBuffer,
    /// `fn(f64, &mut [f64], &mut [f64])`
    ScalarBufferPair,
    /// `fn(&mut [f64], &mut [f64], &mut [f64])`
    BufferTriple,
    /// `fn(usize) -> String` — result-bearing lookup by index.
    NameOfIndex,
    /// `fn(&str) -> usize` — result-bearing lookup by name.
    IndexOfName,
    /// `fn(f64) -> f64` — result-bearing numeric evaluation.
    ScalarOfScalar,
}

impl SignatureFamily {
    /// Human-readable signature, used verbatim in error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            SignatureFamily::Unit => "fn()",
            SignatureFamily::Flag => "fn(bool)",
            SignatureFamily::Scalar => "fn(f64)",
            SignatureFamily::Buffer => "fn(&mut [f64])",
            SignatureFamily::ScalarBuffer => "fn(f64, &mut [f64])",
            SignatureFamily::ScalarBufferPair => "fn(f64, &mut [f64], &mut [f64])",
            SignatureFamily::BufferTriple => "fn(&mut [f64], &mut [f64], &mut [f64])",
            SignatureFamily::NameOfIndex => "fn(usize) -> String",
            SignatureFamily::IndexOfName => "fn(&str) -> usize",
            SignatureFamily::ScalarOfScalar => "fn(f64) -> f64",
        }
    }

    /// Whether this family carries a value result.
    pub fn has_result(&self) -> bool {
        matches!(
            self,
            SignatureFamily::NameOfIndex
                | SignatureFamily::IndexOfName
                | SignatureFamily::ScalarOfScalar
        )
    }
}

/// A callable in slot position: the base implementation installed by the host
/// type, or the currently active implementation built by composition.
///
/// Payloads are shared so the base stays retrievable after the active
/// implementation has been rewrapped by registrations.
#[derive(Clone)]
pub enum SlotFn {
    Unit(Rc<dyn Fn()>),
    Flag(Rc<dyn Fn(bool)>),
    Scalar(Rc<dyn Fn(f64)>),
    Buffer(Rc<dyn Fn(&mut [f64])>),
    ScalarBuffer(Rc<dyn Fn(f64, &mut [f64])>),
    ScalarBufferPair(Rc<dyn Fn(f64, &mut [f64], &mut [f64])>),
    BufferTriple(Rc<dyn Fn(&mut [f64], &mut [f64], &mut [f64])>),
    NameOfIndex(Rc<dyn Fn(usize) -> String>),
    IndexOfName(Rc<dyn Fn(&str) -> usize>),
    ScalarOfScalar(Rc<dyn Fn(f64) -> f64>),
}

impl SlotFn {
    pub fn unit(f: impl Fn() + 'static) -> Self {
        SlotFn::Unit(Rc::new(f))
    }

    pub fn flag(f: impl Fn(bool) + 'static) -> Self {
        SlotFn::Flag(Rc::new(f))
    }

    pub fn scalar(f: impl Fn(f64) + 'static) -> Self {
        SlotFn::Scalar(Rc::new(f))
    }

    pub fn buffer(f: impl Fn(&mut [f64]) + 'static) -> Self {
        SlotFn::Buffer(Rc::new(f))
    }

    pub fn scalar_buffer(f: impl Fn(f64, &mut [f64]) + 'static) -> Self {
        SlotFn::ScalarBuffer(Rc::new(f))
    }

    pub fn scalar_buffer_pair(f: impl Fn(f64, &mut [f64], &mut [f64]) + 'static) -> Self {
        SlotFn::ScalarBufferPair(Rc::new(f))
    }

    pub fn buffer_triple(f: impl Fn(&mut [f64], &mut [f64], &mut [f64]) + 'static) -> Self {
        SlotFn::BufferTriple(Rc::new(f))
    }

    pub fn name_of_index(f: impl Fn(usize) -> String + 'static) -> Self {
        SlotFn::NameOfIndex(Rc::new(f))
    }

    pub fn index_of_name(f: impl Fn(&str) -> usize + 'static) -> Self {
        SlotFn::IndexOfName(Rc::new(f))
    }

    pub fn scalar_of_scalar(f: impl Fn(f64) -> f64 + 'static) -> Self {
        SlotFn::ScalarOfScalar(Rc::new(f))
    }

    pub fn family(&self) -> SignatureFamily {
        match self {
            SlotFn::Unit(_) => SignatureFamily::Unit,
            SlotFn::Flag(_) => SignatureFamily::Flag,
            SlotFn::Scalar(_) => SignatureFamily::Scalar,
            SlotFn::Buffer(_) => SignatureFamily::Buffer,
            SlotFn::ScalarBuffer(_) => SignatureFamily::ScalarBuffer,
            SlotFn::ScalarBufferPair(_) => SignatureFamily::ScalarBufferPair,
            SlotFn::BufferTriple(_) => SignatureFamily::BufferTriple,
            SlotFn::NameOfIndex(_) => SignatureFamily::NameOfIndex,
            SlotFn::IndexOfName(_) => SignatureFamily::IndexOfName,
            SlotFn::ScalarOfScalar(_) => SignatureFamily::ScalarOfScalar,
        }
    }
}

impl fmt::Debug for SlotFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SlotFn").field(&self.family().describe()).finish()
    }
}

/// An externally supplied callable to be registered against a slot.
///
/// The variant tag is the delegate's declared signature family, so a
/// family/callable mismatch is unrepresentable at the registration boundary.
/// Result-bearing variants return `Option<R>` as their produced/declined
/// signal.
pub enum Delegate {
    Unit(Box<dyn Fn()>),
    Flag(Box<dyn Fn(bool)>),
    Scalar(Box<dyn Fn(f64)>),
    Buffer(Box<dyn Fn(&mut [f64])>),
    ScalarBuffer(Box<dyn Fn(f64, &mut [f64])>),
    ScalarBufferPair(Box<dyn Fn(f64, &mut [f64], &mut [f64])>),
    BufferTriple(Box<dyn Fn(&mut [f64], &mut [f64], &mut [f64])>),
    NameOfIndex(Box<dyn Fn(usize) -> Option<String>>),
    IndexOfName(Box<dyn Fn(&str) -> Option<usize>>),
    ScalarOfScalar(Box<dyn Fn(f64) -> Option<f64>>),
}

impl Delegate {
    pub fn unit(f: impl Fn() + 'static) -> Self {
        Delegate::Unit(Box::new(f))
    }

    pub fn flag(f: impl Fn(bool) + 'static) -> Self {
        Delegate::Flag(Box::new(f))
    }

    pub fn scalar(f: impl Fn(f64) + 'static) -> Self {
        Delegate::Scalar(Box::new(f))
    }

    pub fn buffer(f: impl Fn(&mut [f64]) + 'static) -> Self {
        Delegate::Buffer(Box::new(f))
    }

    pub fn scalar_buffer(f: impl Fn(f64, &mut [f64]) + 'static) -> Self {
        Delegate::ScalarBuffer(Box::new(f))
    }

    pub fn scalar_buffer_pair(f: impl Fn(f64, &mut [f64], &mut [f64]) + 'static) -> Self {
        Delegate::ScalarBufferPair(Box::new(f))
    }

    pub fn buffer_triple(f: impl Fn(&mut [f64], &mut [f64], &mut [f64]) + 'static) -> Self {
        Delegate::BufferTriple(Box::new(f))
    }

    pub fn name_of_index(f: impl Fn(usize) -> Option<String> + 'static) -> Self {
        Delegate::NameOfIndex(Box::new(f))
    }

    pub fn index_of_name(f: impl Fn(&str) -> Option<usize> + 'static) -> Self {
        Delegate::IndexOfName(Box::new(f))
    }

    pub fn scalar_of_scalar(f: impl Fn(f64) -> Option<f64> + 'static) -> Self {
        Delegate::ScalarOfScalar(Box::new(f))
    }

    pub fn family(&self) -> SignatureFamily {
        match self {
            Delegate::Unit(_) => SignatureFamily::Unit,
            Delegate::Flag(_) => SignatureFamily::Flag,
            Delegate::Scalar(_) => SignatureFamily::Scalar,
            Delegate::Buffer(_) => SignatureFamily::Buffer,
            Delegate::ScalarBuffer(_) => SignatureFamily::ScalarBuffer,
            Delegate::ScalarBufferPair(_) => SignatureFamily::ScalarBufferPair,
            Delegate::BufferTriple(_) => SignatureFamily::BufferTriple,
            Delegate::NameOfIndex(_) => SignatureFamily::NameOfIndex,
            Delegate::IndexOfName(_) => SignatureFamily::IndexOfName,
            Delegate::ScalarOfScalar(_) => SignatureFamily::ScalarOfScalar,
        }
    }
}

impl fmt::Debug for Delegate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Delegate")
            .field(&self.family().describe())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_descriptions_are_distinct() {
        let families = [
            SignatureFamily::Unit,
            SignatureFamily::Flag,
            SignatureFamily::Scalar,
            SignatureFamily::Buffer,
            SignatureFamily::ScalarBuffer,
            SignatureFamily::ScalarBufferPair,
            SignatureFamily::BufferTriple,
            SignatureFamily::NameOfIndex,
            SignatureFamily::IndexOfName,
            SignatureFamily::ScalarOfScalar,
        ];

        for (i, a) in families.iter().enumerate() {
            for b in &families[i + 1..] {
                assert_ne!(a.describe(), b.describe());
            }
        }
    }

    #[test]
    fn callable_family_matches_variant() {
        assert_eq!(SlotFn::unit(|| {}).family(), SignatureFamily::Unit);
        assert_eq!(
            SlotFn::name_of_index(|i| i.to_string()).family(),
            SignatureFamily::NameOfIndex
        );
        assert_eq!(
            Delegate::scalar_of_scalar(|_| None).family(),
            SignatureFamily::ScalarOfScalar
        );
        assert!(SignatureFamily::IndexOfName.has_result());
        assert!(!SignatureFamily::BufferTriple.has_result());
    }
}
