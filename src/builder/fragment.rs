//! Composition tree and its flattening rules.

use std::fmt;

use crate::view::View;

/// Ordered views produced by one composition pass.
///
/// Order is placement order (left-to-right or top-to-bottom). A list is
/// built fresh on every pass and replaced whole, never edited in place.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct FragmentList(Vec<View>);

impl FragmentList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn views(&self) -> &[View] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, View> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<View> {
        self.0
    }

    /// `self` followed by `other`.
    pub fn concat(mut self, other: FragmentList) -> FragmentList {
        self.0.extend(other.0);
        self
    }
}

impl fmt::Debug for FragmentList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter().map(View::id)).finish()
    }
}

impl From<Vec<View>> for FragmentList {
    fn from(views: Vec<View>) -> Self {
        Self(views)
    }
}

impl FromIterator<View> for FragmentList {
    fn from_iter<T: IntoIterator<Item = View>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for FragmentList {
    type Item = View;
    type IntoIter = std::vec::IntoIter<View>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a FragmentList {
    type Item = &'a View;
    type IntoIter = std::slice::Iter<'a, View>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// One builder expression.
///
/// `Empty` is what an untaken optional branch contributes: nothing at all.
/// No placeholder view is ever synthesized for it, whether the optional held
/// a single view or a list.
#[derive(Debug, Clone, Default)]
pub enum Fragment {
    #[default]
    Empty,
    Leaf(View),
    List(FragmentList),
    Seq(Vec<Fragment>),
}

impl Fragment {
    pub fn leaf(view: View) -> Self {
        Fragment::Leaf(view)
    }

    pub fn list(views: impl IntoIterator<Item = View>) -> Self {
        Fragment::List(views.into_iter().collect())
    }

    /// Concatenation of `parts` in written order.
    pub fn seq<I>(parts: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoFragment,
    {
        Fragment::Seq(parts.into_iter().map(IntoFragment::into_fragment).collect())
    }

    /// `if condition { branch }`. The branch is only evaluated when taken.
    pub fn optional<F, R>(condition: bool, branch: F) -> Self
    where
        F: FnOnce() -> R,
        R: IntoFragment,
    {
        if condition {
            branch().into_fragment()
        } else {
            Fragment::Empty
        }
    }

    /// `if condition { first } else { second }`. Only the branch that fires
    /// is evaluated; the two branches may produce different shapes.
    pub fn either<A, B, RA, RB>(condition: bool, first: A, second: B) -> Self
    where
        A: FnOnce() -> RA,
        B: FnOnce() -> RB,
        RA: IntoFragment,
        RB: IntoFragment,
    {
        if condition {
            first().into_fragment()
        } else {
            second().into_fragment()
        }
    }

    /// `self` followed by `next`.
    pub fn then(self, next: impl IntoFragment) -> Self {
        match self {
            Fragment::Seq(mut parts) => {
                parts.push(next.into_fragment());
                Fragment::Seq(parts)
            }
            other => Fragment::Seq(vec![other, next.into_fragment()]),
        }
    }

    pub fn flatten(self) -> FragmentList {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        FragmentList(out)
    }

    fn flatten_into(self, out: &mut Vec<View>) {
        match self {
            Fragment::Empty => {}
            Fragment::Leaf(view) => out.push(view),
            Fragment::List(list) => out.extend(list.0),
            Fragment::Seq(parts) => {
                for part in parts {
                    part.flatten_into(out);
                }
            }
        }
    }
}

/// Anything that can stand as a builder expression.
pub trait IntoFragment {
    fn into_fragment(self) -> Fragment;
}

impl IntoFragment for Fragment {
    fn into_fragment(self) -> Fragment {
        self
    }
}

impl IntoFragment for View {
    fn into_fragment(self) -> Fragment {
        Fragment::Leaf(self)
    }
}

impl IntoFragment for Vec<View> {
    fn into_fragment(self) -> Fragment {
        Fragment::List(FragmentList(self))
    }
}

impl IntoFragment for FragmentList {
    fn into_fragment(self) -> Fragment {
        Fragment::List(self)
    }
}

impl<T: IntoFragment> IntoFragment for Option<T> {
    fn into_fragment(self) -> Fragment {
        match self {
            Some(inner) => inner.into_fragment(),
            None => Fragment::Empty,
        }
    }
}

impl IntoFragment for () {
    fn into_fragment(self) -> Fragment {
        Fragment::Empty
    }
}

/// Builds a [`Fragment`] from expressions in written order.
///
/// ```
/// use herald::builder::Fragment;
/// use herald::fragments;
/// use herald::view::View;
///
/// let show_badge = false;
/// let list = fragments![
///     View::custom("title"),
///     Fragment::optional(show_badge, || View::custom("badge")),
///     vec![View::custom("a"), View::custom("b")],
/// ]
/// .flatten();
/// assert_eq!(list.len(), 3);
/// ```
#[macro_export]
macro_rules! fragments {
    () => {
        $crate::builder::Fragment::Empty
    };
    ($($expr:expr),+ $(,)?) => {
        $crate::builder::Fragment::Seq(vec![
            $($crate::builder::IntoFragment::into_fragment($expr)),+
        ])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn views(n: usize) -> Vec<View> {
        (0..n).map(|_| View::plain()).collect()
    }

    #[test]
    fn single_view_lifts_to_one_element_list() {
        let view = View::plain();
        let list = view.clone().into_fragment().flatten();
        assert_eq!(list.views(), &[view]);
    }

    #[test]
    fn list_passes_through_unchanged() {
        let items = views(3);
        let list = items.clone().into_fragment().flatten();
        assert_eq!(list.into_vec(), items);
    }

    #[test]
    fn flatten_is_concatenation_in_written_order() {
        let a = views(2);
        let b = views(3);
        let combined = fragments![a.clone(), b.clone()].flatten();
        let separate = a
            .clone()
            .into_fragment()
            .flatten()
            .concat(b.clone().into_fragment().flatten());
        assert_eq!(combined, separate);
        assert_eq!(combined.len(), 5);
        assert_eq!(combined.views()[0], a[0]);
        assert_eq!(combined.views()[4], b[2]);
    }

    #[test]
    fn nested_sequences_flatten_depth_first() {
        let [a, b, c, d]: [View; 4] = std::array::from_fn(|_| View::plain());
        let tree = fragments![
            a.clone(),
            fragments![b.clone(), fragments![c.clone()]],
            d.clone()
        ];
        assert_eq!(tree.flatten().into_vec(), vec![a, b, c, d]);
    }

    #[test]
    fn untaken_optional_contributes_nothing() {
        for _ in 0..3 {
            let single = Fragment::optional(false, View::plain).flatten();
            let list = Fragment::optional(false, || views(2)).flatten();
            let none: Option<View> = None;
            assert!(single.is_empty());
            assert!(list.is_empty());
            assert!(none.into_fragment().flatten().is_empty());
        }
    }

    #[test]
    fn untaken_optional_does_not_evaluate_branch() {
        let mut evaluated = false;
        let _ = Fragment::optional(false, || {
            evaluated = true;
            View::plain()
        });
        assert!(!evaluated);
    }

    #[test]
    fn taken_optional_yields_branch() {
        let view = View::plain();
        let list = Fragment::optional(true, || view.clone()).flatten();
        assert_eq!(list.views(), &[view]);
    }

    #[test]
    fn either_yields_the_branch_that_fired() {
        let single = View::plain();
        let many = views(2);

        let first = Fragment::either(true, || single.clone(), || many.clone()).flatten();
        assert_eq!(first.views(), &[single.clone()]);

        let second = Fragment::either(false, || single.clone(), || many.clone()).flatten();
        assert_eq!(second.into_vec(), many);
    }

    #[test]
    fn then_appends_to_sequence() {
        let a = View::plain();
        let b = View::plain();
        let c = View::plain();
        let list = Fragment::leaf(a.clone())
            .then(b.clone())
            .then(Fragment::Empty)
            .then(c.clone())
            .flatten();
        assert_eq!(list.into_vec(), vec![a, b, c]);
    }

    #[test]
    fn no_deduplication_of_repeated_view() {
        let view = View::plain();
        let list = fragments![view.clone(), view.clone()].flatten();
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn empty_macro_is_empty() {
        assert!(fragments![].flatten().is_empty());
    }
}
