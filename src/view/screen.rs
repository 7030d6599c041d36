use super::node::{View, ViewKind};

/// Screen-level host that swaps one full-size content view in and out.
pub struct Screen {
    root: View,
    content: Option<View>,
}

impl Screen {
    pub fn new() -> Self {
        Self {
            root: View::new(ViewKind::ContentView),
            content: None,
        }
    }

    pub fn root(&self) -> &View {
        &self.root
    }

    pub fn content(&self) -> Option<&View> {
        self.content.as_ref()
    }

    /// Replaces the current content with the view `build` returns, pinned to
    /// all four edges of the root.
    pub fn render(&mut self, build: impl FnOnce() -> View) {
        if let Some(previous) = self.content.take() {
            previous.remove_from_superview();
        }
        let view = build();
        self.root.add_pinned_subview(&view);
        tracing::debug!(root = %self.root.id(), content = %view.id(), "screen content replaced");
        self.content = Some(view);
    }
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_pins_content_to_root() {
        let mut screen = Screen::new();
        let view = View::plain();
        screen.render(|| view.clone());

        assert_eq!(screen.root().subviews(), vec![view.clone()]);
        assert_eq!(view.active_constraints().len(), 4);
        assert_eq!(screen.content(), Some(&view));
    }

    #[test]
    fn second_render_replaces_first() {
        let mut screen = Screen::new();
        let first = View::plain();
        let second = View::plain();
        screen.render(|| first.clone());
        screen.render(|| second.clone());

        assert_eq!(screen.root().subviews(), vec![second]);
        assert!(first.superview().is_none());
        assert!(first.active_constraints().is_empty());
    }
}
