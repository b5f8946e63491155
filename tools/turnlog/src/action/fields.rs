//! Field-set composition for action matching.
//!
//! Each layer of an action (base, correction, concrete variant) pushes only
//! the fields it adds, after asking its inner layer to push first. Matching
//! compares the concatenated lists, outermost layer first.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Int(i64),
    Flag(bool),
    Missing,
}

impl From<Option<i64>> for FieldValue<'_> {
    fn from(value: Option<i64>) -> Self {
        match value {
            Some(value) => FieldValue::Int(value),
            None => FieldValue::Missing,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldList<'a> {
    fields: Vec<(&'static str, FieldValue<'a>)>,
}

impl<'a> FieldList<'a> {
    pub fn push(&mut self, name: &'static str, value: FieldValue<'a>) {
        self.fields.push((name, value));
    }

    pub fn text(&mut self, name: &'static str, value: &'a str) {
        self.push(name, FieldValue::Text(value));
    }

    pub fn int(&mut self, name: &'static str, value: i64) {
        self.push(name, FieldValue::Int(value));
    }

    pub fn flag(&mut self, name: &'static str, value: bool) {
        self.push(name, FieldValue::Flag(value));
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|(name, _)| *name).collect()
    }

    pub fn is_complete(&self) -> bool {
        self.fields
            .iter()
            .all(|(_, value)| *value != FieldValue::Missing)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Implemented by every action layer.
pub trait ActionFields {
    /// Fields describing the offered choice space.
    fn precondition_fields<'a>(&'a self, out: &mut FieldList<'a>);

    /// Fields filled in by the participant when committing.
    fn postcondition_fields<'a>(&'a self, _out: &mut FieldList<'a>) {}

    fn preconditions(&self) -> FieldList<'_> {
        let mut out = FieldList::default();
        self.precondition_fields(&mut out);
        out
    }

    fn postconditions(&self) -> FieldList<'_> {
        let mut out = FieldList::default();
        self.postcondition_fields(&mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Inner {
        who: String,
    }

    struct Outer {
        inner: Inner,
        bound: i64,
        chosen: Option<i64>,
    }

    impl ActionFields for Inner {
        fn precondition_fields<'a>(&'a self, out: &mut FieldList<'a>) {
            out.text("who", &self.who);
        }
    }

    impl ActionFields for Outer {
        fn precondition_fields<'a>(&'a self, out: &mut FieldList<'a>) {
            self.inner.precondition_fields(out);
            out.int("bound", self.bound);
        }

        fn postcondition_fields<'a>(&'a self, out: &mut FieldList<'a>) {
            self.inner.postcondition_fields(out);
            out.push("chosen", self.chosen.into());
        }
    }

    #[test]
    fn layers_concatenate_inner_first() {
        let outer = Outer {
            inner: Inner {
                who: "Alice".to_string(),
            },
            bound: 5,
            chosen: None,
        };
        assert_eq!(outer.preconditions().names(), vec!["who", "bound"]);
        assert!(!outer.postconditions().is_complete());
    }

    #[test]
    fn missing_postcondition_marks_list_incomplete() {
        let mut list = FieldList::default();
        list.push("amount", None.into());
        assert!(!list.is_complete());
        let mut list = FieldList::default();
        list.push("amount", Some(3).into());
        assert!(list.is_complete());
    }
}
