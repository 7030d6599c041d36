//! Compositional layout descriptions.
//!
//! A layout is a section provider: given a section index (and the container
//! environment) it returns the [`LayoutSection`] for that section, or `None`
//! to contribute nothing.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::view::Insets;

/// One axis of an item or group size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Dimension {
    Absolute(f64),
    FractionalWidth(f64),
    FractionalHeight(f64),
    /// Starting guess; the final size comes from the content.
    Estimated(f64),
}

impl Dimension {
    /// Points this dimension occupies inside a `width` x `height` container.
    pub fn resolve(self, width: f64, height: f64) -> f64 {
        match self {
            Dimension::Absolute(points) | Dimension::Estimated(points) => points,
            Dimension::FractionalWidth(fraction) => width * fraction,
            Dimension::FractionalHeight(fraction) => height * fraction,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutSize {
    pub width: Dimension,
    pub height: Dimension,
}

impl LayoutSize {
    pub fn new(width: Dimension, height: Dimension) -> Self {
        Self { width, height }
    }

    pub fn resolve(&self, width: f64, height: f64) -> (f64, f64) {
        (
            self.width.resolve(width, height),
            self.height.resolve(width, height),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutItem {
    pub size: LayoutSize,
    pub content_insets: Insets,
}

impl LayoutItem {
    pub fn new(width: Dimension, height: Dimension) -> Self {
        Self {
            size: LayoutSize::new(width, height),
            content_insets: Insets::ZERO,
        }
    }

    pub fn with_content_insets(mut self, insets: Insets) -> Self {
        self.content_insets = insets;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupAxis {
    Horizontal,
    Vertical,
}

/// Row or column of items.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutGroup {
    pub axis: GroupAxis,
    pub size: LayoutSize,
    pub items: Vec<LayoutItem>,
    pub spacing: f64,
}

impl LayoutGroup {
    /// `count` copies of `item` side by side.
    pub fn horizontal(width: Dimension, height: Dimension, item: LayoutItem, count: usize) -> Self {
        Self::repeating(GroupAxis::Horizontal, width, height, item, count)
    }

    pub fn horizontal_items(width: Dimension, height: Dimension, items: Vec<LayoutItem>) -> Self {
        Self::with_items(GroupAxis::Horizontal, width, height, items)
    }

    /// `count` copies of `item` stacked top to bottom.
    pub fn vertical(width: Dimension, height: Dimension, item: LayoutItem, count: usize) -> Self {
        Self::repeating(GroupAxis::Vertical, width, height, item, count)
    }

    pub fn vertical_items(width: Dimension, height: Dimension, items: Vec<LayoutItem>) -> Self {
        Self::with_items(GroupAxis::Vertical, width, height, items)
    }

    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    /// Item sizes inside a group resolved against `environment`.
    ///
    /// Fractional item dimensions are taken relative to the group, and the
    /// group relative to the container.
    pub fn item_sizes(&self, environment: &LayoutEnvironment) -> Vec<(f64, f64)> {
        let (width, height) = self
            .size
            .resolve(environment.container_width, environment.container_height);
        self.items
            .iter()
            .map(|item| item.size.resolve(width, height))
            .collect()
    }

    fn repeating(
        axis: GroupAxis,
        width: Dimension,
        height: Dimension,
        item: LayoutItem,
        count: usize,
    ) -> Self {
        Self::with_items(axis, width, height, vec![item; count])
    }

    fn with_items(axis: GroupAxis, width: Dimension, height: Dimension, items: Vec<LayoutItem>) -> Self {
        Self {
            axis,
            size: LayoutSize::new(width, height),
            items,
            spacing: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutSection {
    pub group: LayoutGroup,
    pub inter_group_spacing: f64,
    pub content_insets: Insets,
}

impl LayoutSection {
    pub fn new(group: LayoutGroup) -> Self {
        Self {
            group,
            inter_group_spacing: 0.0,
            content_insets: Insets::ZERO,
        }
    }

    pub fn with_inter_group_spacing(mut self, spacing: f64) -> Self {
        self.inter_group_spacing = spacing;
        self
    }

    pub fn with_content_insets(mut self, insets: Insets) -> Self {
        self.content_insets = insets;
        self
    }
}

/// Container the layout is evaluated in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutEnvironment {
    pub container_width: f64,
    pub container_height: f64,
}

impl LayoutEnvironment {
    pub fn new(container_width: f64, container_height: f64) -> Self {
        Self {
            container_width,
            container_height,
        }
    }
}

impl Default for LayoutEnvironment {
    fn default() -> Self {
        Self::new(375.0, 667.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListAppearance {
    #[default]
    Plain,
    Grouped,
    InsetGrouped,
    Sidebar,
    SidebarPlain,
}

impl ListAppearance {
    fn insets(self) -> Insets {
        match self {
            ListAppearance::InsetGrouped => Insets {
                top: 0.0,
                leading: 20.0,
                bottom: 0.0,
                trailing: 20.0,
            },
            ListAppearance::Grouped => Insets {
                top: 18.0,
                leading: 0.0,
                bottom: 18.0,
                trailing: 0.0,
            },
            _ => Insets::ZERO,
        }
    }
}

/// Result of a section provider: a section, or nothing.
///
/// Mirrors [`Fragment`](crate::builder::Fragment) for the single-value
/// case: an untaken optional contributes nothing and a conditional yields
/// whichever branch fired.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SectionChoice {
    #[default]
    Empty,
    Section(LayoutSection),
}

impl SectionChoice {
    pub fn optional<R: IntoSection>(condition: bool, section: impl FnOnce() -> R) -> Self {
        if condition {
            section().into_section()
        } else {
            SectionChoice::Empty
        }
    }

    pub fn either<A: IntoSection, B: IntoSection>(
        condition: bool,
        first: impl FnOnce() -> A,
        second: impl FnOnce() -> B,
    ) -> Self {
        if condition {
            first().into_section()
        } else {
            second().into_section()
        }
    }

    pub fn into_option(self) -> Option<LayoutSection> {
        match self {
            SectionChoice::Empty => None,
            SectionChoice::Section(section) => Some(section),
        }
    }
}

pub trait IntoSection {
    fn into_section(self) -> SectionChoice;
}

impl IntoSection for SectionChoice {
    fn into_section(self) -> SectionChoice {
        self
    }
}

impl IntoSection for LayoutSection {
    fn into_section(self) -> SectionChoice {
        SectionChoice::Section(self)
    }
}

impl IntoSection for Option<LayoutSection> {
    fn into_section(self) -> SectionChoice {
        self.map_or(SectionChoice::Empty, SectionChoice::Section)
    }
}

type SectionProvider = Arc<dyn Fn(usize, &LayoutEnvironment) -> Option<LayoutSection> + Send + Sync>;

/// Section-provider based layout.
#[derive(Clone)]
pub struct CompositionalLayout {
    provider: SectionProvider,
    list: Option<ListAppearance>,
}

impl CompositionalLayout {
    pub fn new(
        provider: impl Fn(usize, &LayoutEnvironment) -> Option<LayoutSection> + Send + Sync + 'static,
    ) -> Self {
        Self {
            provider: Arc::new(provider),
            list: None,
        }
    }

    /// Layout whose sections depend only on their index.
    pub fn index_builder<R, F>(provider: F) -> Self
    where
        R: IntoSection,
        F: Fn(usize) -> R + Send + Sync + 'static,
    {
        Self::new(move |index, _| provider(index).into_section().into_option())
    }

    pub fn index_environment_builder<R, F>(provider: F) -> Self
    where
        R: IntoSection,
        F: Fn(usize, &LayoutEnvironment) -> R + Send + Sync + 'static,
    {
        Self::new(move |index, environment| provider(index, environment).into_section().into_option())
    }

    /// Single full-width column of self-sizing rows.
    pub fn list(appearance: ListAppearance) -> Self {
        let mut layout = Self::new(move |_, _| {
            let item = LayoutItem::new(Dimension::FractionalWidth(1.0), Dimension::Estimated(44.0));
            let group = LayoutGroup::vertical(
                Dimension::FractionalWidth(1.0),
                Dimension::Estimated(44.0),
                item,
                1,
            );
            Some(LayoutSection::new(group).with_content_insets(appearance.insets()))
        });
        layout.list = Some(appearance);
        layout
    }

    pub fn section(&self, index: usize, environment: &LayoutEnvironment) -> Option<LayoutSection> {
        (self.provider)(index, environment)
    }

    pub fn list_appearance(&self) -> Option<ListAppearance> {
        self.list
    }
}

impl Default for CompositionalLayout {
    fn default() -> Self {
        Self::list(ListAppearance::Plain)
    }
}

impl fmt::Debug for CompositionalLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositionalLayout")
            .field("list", &self.list)
            .finish_non_exhaustive()
    }
}
