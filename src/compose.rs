use std::rc::Rc;
use std::str::FromStr;

use crate::error::DelegationError;
use crate::signature::{Delegate, SlotFn};

/// How a newly registered delegate combines with the slot's previous active
/// implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Run the delegate first. For result-bearing families: use the
    /// delegate's value when produced, otherwise fall through.
    Before,
    /// Run the delegate last. For result-bearing families: add the produced
    /// value to the previous result.
    After,
    /// Run only the delegate. The slot's immutable base stays retrievable.
    Replace,
}

impl FromStr for Policy {
    type Err = DelegationError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "before" => Ok(Policy::Before),
            "after" => Ok(Policy::After),
            "replace" => Ok(Policy::Replace),
            other => Err(DelegationError::InvalidPolicy(other.to_string())),
        }
    }
}

/// Build the new active implementation from the previous one and a delegate.
///
/// The result closes over `(previous_active, delegate)`, never over the fixed
/// base, so chained registrations nest: the most recently registered `before`
/// delegate runs first, the most recently registered `after` delegate runs
/// last.
///
/// A `replace` on a result-bearing family requires the delegate to produce;
/// a declining delegate yields the result type's default value.
pub(crate) fn compose(
    name: &str,
    active: &SlotFn,
    delegate: Delegate,
    policy: Policy,
) -> Result<SlotFn, DelegationError> {
    let composed = match (active, delegate) {
        (SlotFn::Unit(prev), Delegate::Unit(func)) => {
            let prev = Rc::clone(prev);
            SlotFn::Unit(match policy {
                Policy::Before => Rc::new(move || {
                    func();
                    prev();
                }),
                Policy::After => Rc::new(move || {
                    prev();
                    func();
                }),
                Policy::Replace => Rc::new(move || func()),
            })
        }
        (SlotFn::Flag(prev), Delegate::Flag(func)) => {
            let prev = Rc::clone(prev);
            SlotFn::Flag(match policy {
                Policy::Before => Rc::new(move |v: bool| {
                    func(v);
                    prev(v);
                }),
                Policy::After => Rc::new(move |v: bool| {
                    prev(v);
                    func(v);
                }),
                Policy::Replace => Rc::new(move |v: bool| func(v)),
            })
        }
        (SlotFn::Scalar(prev), Delegate::Scalar(func)) => {
            let prev = Rc::clone(prev);
            SlotFn::Scalar(match policy {
                Policy::Before => Rc::new(move |x: f64| {
                    func(x);
                    prev(x);
                }),
                Policy::After => Rc::new(move |x: f64| {
                    prev(x);
                    func(x);
                }),
                Policy::Replace => Rc::new(move |x: f64| func(x)),
            })
        }
        (SlotFn::Buffer(prev), Delegate::Buffer(func)) => {
            let prev = Rc::clone(prev);
            SlotFn::Buffer(match policy {
                Policy::Before => Rc::new(move |buf: &mut [f64]| {
                    func(&mut *buf);
                    prev(&mut *buf);
                }),
                Policy::After => Rc::new(move |buf: &mut [f64]| {
                    prev(&mut *buf);
                    func(&mut *buf);
                }),
                Policy::Replace => Rc::new(move |buf: &mut [f64]| func(buf)),
            })
        }
        (SlotFn::ScalarBuffer(prev), Delegate::ScalarBuffer(func)) => {
            let prev = Rc::clone(prev);
            SlotFn::ScalarBuffer(match policy {
                Policy::Before => Rc::new(move |x: f64, buf: &mut [f64]| {
                    func(x, &mut *buf);
                    prev(x, &mut *buf);
                }),
                Policy::After => Rc::new(move |x: f64, buf: &mut [f64]| {
                    prev(x, &mut *buf);
                    func(x, &mut *buf);
                }),
                Policy::Replace => Rc::new(move |x: f64, buf: &mut [f64]| func(x, buf)),
            })
        }
        (SlotFn::ScalarBufferPair(prev), Delegate::ScalarBufferPair(func)) => {
            let prev = Rc::clone(prev);
            SlotFn::ScalarBufferPair(match policy {
                Policy::Before => Rc::new(move |x: f64, a: &mut [f64], b: &mut [f64]| {
                    func(x, &mut *a, &mut *b);
                    prev(x, &mut *a, &mut *b);
                }),
                Policy::After => Rc::new(move |x: f64, a: &mut [f64], b: &mut [f64]| {
                    prev(x, &mut *a, &mut *b);
                    func(x, &mut *a, &mut *b);
                }),
                Policy::Replace => {
                    Rc::new(move |x: f64, a: &mut [f64], b: &mut [f64]| func(x, a, b))
                }
            })
        }
        (SlotFn::BufferTriple(prev), Delegate::BufferTriple(func)) => {
            let prev = Rc::clone(prev);
            SlotFn::BufferTriple(match policy {
                Policy::Before => {
                    Rc::new(move |a: &mut [f64], b: &mut [f64], c: &mut [f64]| {
                        func(&mut *a, &mut *b, &mut *c);
                        prev(&mut *a, &mut *b, &mut *c);
                    })
                }
                Policy::After => {
                    Rc::new(move |a: &mut [f64], b: &mut [f64], c: &mut [f64]| {
                        prev(&mut *a, &mut *b, &mut *c);
                        func(&mut *a, &mut *b, &mut *c);
                    })
                }
                Policy::Replace => {
                    Rc::new(move |a: &mut [f64], b: &mut [f64], c: &mut [f64]| func(a, b, c))
                }
            })
        }
        (SlotFn::NameOfIndex(prev), Delegate::NameOfIndex(func)) => {
            let prev = Rc::clone(prev);
            SlotFn::NameOfIndex(match policy {
                Policy::Before => Rc::new(move |i: usize| match func(i) {
                    Some(name) => name,
                    None => prev(i),
                }),
                Policy::After => Rc::new(move |i: usize| {
                    let first = prev(i);
                    match func(i) {
                        Some(second) => first + &second,
                        None => first,
                    }
                }),
                Policy::Replace => Rc::new(move |i: usize| func(i).unwrap_or_default()),
            })
        }
        (SlotFn::IndexOfName(prev), Delegate::IndexOfName(func)) => {
            let prev = Rc::clone(prev);
            SlotFn::IndexOfName(match policy {
                Policy::Before => Rc::new(move |name: &str| match func(name) {
                    Some(i) => i,
                    None => prev(name),
                }),
                Policy::After => Rc::new(move |name: &str| {
                    let first = prev(name);
                    match func(name) {
                        Some(second) => first + second,
                        None => first,
                    }
                }),
                Policy::Replace => Rc::new(move |name: &str| func(name).unwrap_or_default()),
            })
        }
        (SlotFn::ScalarOfScalar(prev), Delegate::ScalarOfScalar(func)) => {
            let prev = Rc::clone(prev);
            SlotFn::ScalarOfScalar(match policy {
                Policy::Before => Rc::new(move |x: f64| match func(x) {
                    Some(r) => r,
                    None => prev(x),
                }),
                Policy::After => Rc::new(move |x: f64| {
                    let first = prev(x);
                    match func(x) {
                        Some(second) => first + second,
                        None => first,
                    }
                }),
                Policy::Replace => Rc::new(move |x: f64| func(x).unwrap_or_default()),
            })
        }
        (_, delegate) => {
            return Err(DelegationError::NotDelegatable {
                name: name.to_string(),
                signature: delegate.family().describe(),
            });
        }
    };

    Ok(composed)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    fn run_unit(slot: &SlotFn) {
        match slot {
            SlotFn::Unit(f) => f(),
            other => panic!("expected fn() slot, got {other:?}"),
        }
    }

    fn run_name(slot: &SlotFn, i: usize) -> String {
        match slot {
            SlotFn::NameOfIndex(f) => f(i),
            other => panic!("expected fn(usize) -> String slot, got {other:?}"),
        }
    }

    #[test]
    fn policy_tokens_parse() {
        assert_eq!("before".parse::<Policy>().unwrap(), Policy::Before);
        assert_eq!("after".parse::<Policy>().unwrap(), Policy::After);
        assert_eq!("replace".parse::<Policy>().unwrap(), Policy::Replace);
        assert_eq!(
            "maybe".parse::<Policy>().unwrap_err(),
            DelegationError::InvalidPolicy("maybe".to_string())
        );
    }

    #[test]
    fn before_runs_delegate_first() {
        let log = Rc::new(RefCell::new(Vec::new()));

        let base_log = Rc::clone(&log);
        let base = SlotFn::unit(move || base_log.borrow_mut().push("base"));

        let delegate_log = Rc::clone(&log);
        let delegate = Delegate::unit(move || delegate_log.borrow_mut().push("delegate"));

        let active = compose("step", &base, delegate, Policy::Before).unwrap();
        run_unit(&active);

        assert_eq!(*log.borrow(), vec!["delegate", "base"]);
    }

    #[test]
    fn replace_discards_previous_from_call_path() {
        let log = Rc::new(RefCell::new(Vec::new()));

        let base_log = Rc::clone(&log);
        let base = SlotFn::unit(move || base_log.borrow_mut().push("base"));

        let delegate_log = Rc::clone(&log);
        let delegate = Delegate::unit(move || delegate_log.borrow_mut().push("delegate"));

        let active = compose("step", &base, delegate, Policy::Replace).unwrap();
        run_unit(&active);

        assert_eq!(*log.borrow(), vec!["delegate"]);
    }

    #[test]
    fn after_concatenates_produced_strings() {
        let base = SlotFn::name_of_index(|i| format!("X{i}"));
        let delegate = Delegate::name_of_index(|_| Some("-surf".to_string()));

        let active = compose("componentName", &base, delegate, Policy::After).unwrap();
        assert_eq!(run_name(&active, 3), "X3-surf");
    }

    #[test]
    fn replace_with_declining_delegate_yields_default() {
        let base = SlotFn::name_of_index(|i| format!("X{i}"));
        let delegate = Delegate::name_of_index(|_| None);

        let active = compose("componentName", &base, delegate, Policy::Replace).unwrap();
        assert_eq!(run_name(&active, 0), "");
    }

    #[test]
    fn family_mismatch_is_rejected() {
        let base = SlotFn::unit(|| {});
        let delegate = Delegate::scalar(|_| {});

        let err = compose("step", &base, delegate, Policy::Before).unwrap_err();
        assert_eq!(
            err,
            DelegationError::NotDelegatable {
                name: "step".to_string(),
                signature: "fn(f64)",
            }
        );
    }
}
