//! Test cases and argument tuples

use std::fmt::Debug;

/// Argument tuple passed identically to reference and candidate.
///
/// `render` is what the report shows between the parentheses.
pub trait Args: Clone + Send + 'static {
    fn render(&self) -> String;
}

impl Args for () {
    fn render(&self) -> String {
        String::new()
    }
}

macro_rules! impl_args {
    ($($name:ident),+) => {
        impl<$($name: Debug + Clone + Send + 'static),+> Args for ($($name,)+) {
            #[allow(non_snake_case)]
            fn render(&self) -> String {
                let ($($name,)+) = self;
                [$(format!("{:?}", $name)),+].join(", ")
            }
        }
    };
}

impl_args!(T1);
impl_args!(T1, T2);
impl_args!(T1, T2, T3);
impl_args!(T1, T2, T3, T4);
impl_args!(T1, T2, T3, T4, T5);
impl_args!(T1, T2, T3, T4, T5, T6);

/// Command-line argument vector for a `main`-style program
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Argv(pub Vec<String>);

impl Argv {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(args.into_iter().map(Into::into).collect())
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Argv {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl Args for Argv {
    fn render(&self) -> String {
        self.0
            .iter()
            .map(|arg| format!("{:?}", arg))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// One concrete argument tuple, optionally labelled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase<A> {
    label: Option<String>,
    args: A,
}

impl<A: Args> TestCase<A> {
    pub fn new(args: A) -> Self {
        Self { label: None, args }
    }

    pub fn labeled(label: impl Into<String>, args: A) -> Self {
        Self {
            label: Some(label.into()),
            args,
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn args(&self) -> &A {
        &self.args
    }
}

/// Ordered list of test cases built by an exercise driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestTable<A> {
    cases: Vec<TestCase<A>>,
}

impl<A: Args> Default for TestTable<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Args> TestTable<A> {
    pub fn new() -> Self {
        Self { cases: Vec::new() }
    }

    /// Append an unlabelled case
    pub fn case(mut self, args: A) -> Self {
        self.cases.push(TestCase::new(args));
        self
    }

    /// Append a labelled case
    pub fn labeled(mut self, label: impl Into<String>, args: A) -> Self {
        self.cases.push(TestCase::labeled(label, args));
        self
    }

    pub fn push(&mut self, case: TestCase<A>) {
        self.cases.push(case);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TestCase<A>> {
        self.cases.iter()
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

impl<A: Args> FromIterator<A> for TestTable<A> {
    fn from_iter<I: IntoIterator<Item = A>>(iter: I) -> Self {
        Self {
            cases: iter.into_iter().map(TestCase::new).collect(),
        }
    }
}

impl<A: Args> Extend<A> for TestTable<A> {
    fn extend<I: IntoIterator<Item = A>>(&mut self, iter: I) {
        self.cases.extend(iter.into_iter().map(TestCase::new));
    }
}

impl<'a, A> IntoIterator for &'a TestTable<A> {
    type Item = &'a TestCase<A>;
    type IntoIter = std::slice::Iter<'a, TestCase<A>>;

    fn into_iter(self) -> Self::IntoIter {
        self.cases.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_tuples() {
        assert_eq!(().render(), "");
        assert_eq!((5,).render(), "5");
        assert_eq!((2, -3).render(), "2, -3");
        assert_eq!((1, "ab", 'c').render(), r#"1, "ab", 'c'"#);
    }

    #[test]
    fn test_render_argv() {
        assert_eq!(Argv::new(["1", "a"]).render(), r#""1", "a""#);
        assert_eq!(Argv::default().render(), "");
    }

    #[test]
    fn test_table_keeps_order_and_labels() {
        let mut table: TestTable<(i64, i64)> = [(5, 3), (0, 0)].into_iter().collect();
        table.extend([(-1, 6)]);
        let table = table.labeled("random", (7, 9));

        let args: Vec<_> = table.iter().map(|c| *c.args()).collect();
        assert_eq!(args, vec![(5, 3), (0, 0), (-1, 6), (7, 9)]);
        assert_eq!(table.iter().last().and_then(|c| c.label()), Some("random"));
        assert_eq!(table.len(), 4);
    }
}
