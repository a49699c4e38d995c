//! Owned formula state with change notification.
//!
//! The editor owns a [`FormulaStore`]; the presentation layer subscribes to
//! it instead of reading shared global state. Listeners run synchronously
//! after every mutation that changed the formula.

use std::fmt;

use crate::model::{Formula, FormulaToken, Tag};

pub type Listener = Box<dyn FnMut(&Formula)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

#[derive(Default)]
pub struct FormulaStore {
    formula: Formula,
    listeners: Vec<(Subscription, Listener)>,
    next_subscription: u64,
}

impl fmt::Debug for FormulaStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormulaStore")
            .field("formula", &self.formula)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl FormulaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_formula(formula: Formula) -> Self {
        Self {
            formula,
            ..Self::default()
        }
    }

    pub fn formula(&self) -> &Formula {
        &self.formula
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&Formula) + 'static) -> Subscription {
        let subscription = Subscription(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((subscription, Box::new(listener)));
        subscription
    }

    /// Returns false if the subscription was already gone.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(id, _)| *id != subscription);
        self.listeners.len() != before
    }

    fn notify(&mut self) {
        for (_, listener) in &mut self.listeners {
            listener(&self.formula);
        }
    }

    pub fn append(&mut self, token: FormulaToken) {
        self.formula.append(token);
        self.notify();
    }

    pub fn remove_tag(&mut self, id: &str) -> Option<Tag> {
        let removed = self.formula.remove_tag(id);
        if removed.is_some() {
            self.notify();
        }
        removed
    }

    pub fn pop_last(&mut self) -> Option<FormulaToken> {
        let popped = self.formula.pop_last();
        if popped.is_some() {
            self.notify();
        }
        popped
    }

    pub fn replace_all(&mut self, tokens: Vec<FormulaToken>) -> Vec<FormulaToken> {
        let previous = self.formula.replace_all(tokens);
        if previous != self.formula.tokens() {
            self.notify();
        }
        previous
    }

    pub fn map_tag_option(&mut self, id: &str, option: &str) -> bool {
        let found = self.formula.map_tag_option(id, option);
        if found {
            self.notify();
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::{formula, lit, tag};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recording(store: &mut FormulaStore) -> (Subscription, Rc<RefCell<Vec<String>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let subscription = store.subscribe(move |f| sink.borrow_mut().push(f.expression()));
        (subscription, seen)
    }

    #[test]
    fn test_listeners_see_each_change() {
        let mut store = FormulaStore::new();
        let (_, seen) = recording(&mut store);

        store.append(lit("2"));
        store.append(lit("+"));
        store.append(tag("t1", 5.0));
        store.remove_tag("t1");
        store.pop_last();

        assert_eq!(*seen.borrow(), vec!["2", "2+", "2+5", "2+", "2"]);
    }

    #[test]
    fn test_no_op_mutations_do_not_notify() {
        let mut store = FormulaStore::with_formula(formula(vec![lit("1")]));
        let (_, seen) = recording(&mut store);

        assert_eq!(store.remove_tag("missing"), None);
        assert!(!store.map_tag_option("missing", "Q1"));
        store.replace_all(vec![lit("1")]);
        store.replace_all(Vec::new());
        assert_eq!(store.pop_last(), None);

        assert_eq!(*seen.borrow(), vec![""]);
    }

    #[test]
    fn test_unsubscribe() {
        let mut store = FormulaStore::new();
        let (first, first_seen) = recording(&mut store);
        let (_, second_seen) = recording(&mut store);

        store.append(lit("1"));
        assert!(store.unsubscribe(first));
        assert!(!store.unsubscribe(first));
        store.append(lit("2"));

        assert_eq!(*first_seen.borrow(), vec!["1"]);
        assert_eq!(*second_seen.borrow(), vec!["1", "12"]);
    }

    #[test]
    fn test_option_selection_notifies() {
        let mut store = FormulaStore::with_formula(formula(vec![tag("t1", 5.0)]));
        let names = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&names);
        store.subscribe(move |f| {
            let name = f.last().and_then(|t| t.as_tag()).map(|t| t.name().to_string());
            sink.borrow_mut().extend(name);
        });

        assert!(store.map_tag_option("t1", "Q1"));
        assert_eq!(*names.borrow(), vec!["Tag t1 (Q1)"]);
    }
}
