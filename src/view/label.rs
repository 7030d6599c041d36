//! Text label with a stream-bound variant.

use serde::Serialize;

use crate::builder::{Fragment, IntoFragment};
use crate::stream::Publisher;

use super::node::{View, ViewKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum FontWeight {
    #[default]
    Regular,
    Medium,
    Semibold,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    LargeTitle,
    Title,
    Headline,
    Body,
    Callout,
    Footnote,
    Caption,
}

impl TextStyle {
    fn point_size(self) -> f64 {
        match self {
            TextStyle::LargeTitle => 34.0,
            TextStyle::Title => 28.0,
            TextStyle::Headline | TextStyle::Body => 17.0,
            TextStyle::Callout => 16.0,
            TextStyle::Footnote => 13.0,
            TextStyle::Caption => 12.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Font {
    pub size: f64,
    pub weight: FontWeight,
    pub italic: bool,
}

impl Font {
    pub fn system(size: f64) -> Self {
        Self {
            size,
            weight: FontWeight::Regular,
            italic: false,
        }
    }

    pub fn preferred(style: TextStyle) -> Self {
        let font = Self::system(style.point_size());
        match style {
            TextStyle::Headline => Self {
                weight: FontWeight::Semibold,
                ..font
            },
            _ => font,
        }
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::system(17.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: 255,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum LineBreak {
    WordWrap,
    CharWrap,
    Clip,
    TruncateHead,
    #[default]
    TruncateTail,
    TruncateMiddle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelStyle {
    pub font: Font,
    pub text_color: Color,
    pub underlined: bool,
    /// 0 means unlimited.
    pub lines: usize,
    pub line_break: LineBreak,
}

impl LabelStyle {
    /// Compact description used by the plain tree dump.
    pub fn summary(&self) -> String {
        let mut out = format!("{}pt {:?}", self.font.size, self.font.weight);
        if self.font.italic {
            out.push_str(" italic");
        }
        if self.underlined {
            out.push_str(" underlined");
        }
        if self.text_color != Color::BLACK {
            let c = self.text_color;
            out.push_str(&format!(" #{:02x}{:02x}{:02x}", c.red, c.green, c.blue));
        }
        out
    }
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            font: Font::default(),
            text_color: Color::BLACK,
            underlined: false,
            lines: 1,
            line_break: LineBreak::default(),
        }
    }
}

/// Single- or multi-line text view.
///
/// Style setters consume and return the handle so they chain at the call
/// site; every clone refers to the same label. Text and style live on the
/// underlying [`View`], so they stay visible after the label is turned into
/// a fragment.
#[derive(Clone)]
pub struct Label {
    view: View,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        let label = Self::blank();
        label.set_text(Some(text.into()));
        label
    }

    pub fn blank() -> Self {
        Self {
            view: View::new(ViewKind::Label),
        }
    }

    /// Label whose text follows `publisher`. The subscription lives as long
    /// as the label's view, so it survives being placed into a fragment.
    pub fn bound<P>(publisher: &P) -> Self
    where
        P: Publisher<Output = String> + ?Sized,
    {
        let label = Self::blank();
        label.view.bind_text(publisher);
        label
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn text(&self) -> Option<String> {
        self.view.text()
    }

    pub fn set_text(&self, text: Option<String>) {
        self.view.set_text(text);
    }

    pub fn style(&self) -> LabelStyle {
        self.view.label_style().unwrap_or_default()
    }

    fn configure(self, update: impl FnOnce(&mut LabelStyle)) -> Self {
        self.view.update_label_style(update);
        self
    }

    /// `None` restores the default system font.
    pub fn font(self, font: Option<Font>) -> Self {
        self.configure(|style| style.font = font.unwrap_or_default())
    }

    pub fn preferred_font(self, text_style: TextStyle) -> Self {
        self.font(Some(Font::preferred(text_style)))
    }

    /// System font at the current size with `weight`; `None` restores the
    /// default system font.
    pub fn font_weight(self, weight: Option<FontWeight>) -> Self {
        self.configure(|style| {
            style.font = match weight {
                Some(weight) => Font {
                    weight,
                    italic: false,
                    ..Font::system(style.font.size)
                },
                None => Font::default(),
            }
        })
    }

    /// `None` keeps the current color.
    pub fn text_color(self, color: Option<Color>) -> Self {
        self.configure(|style| {
            if let Some(color) = color {
                style.text_color = color;
            }
        })
    }

    pub fn bold(self) -> Self {
        self.font_weight(Some(FontWeight::Bold))
    }

    pub fn italic(self) -> Self {
        self.configure(|style| style.font.italic = true)
    }

    /// # Panics
    ///
    /// Panics if the label has no text. Underlining absent text is a
    /// programming error.
    pub fn underlined(self) -> Self {
        assert!(
            self.text().is_some(),
            "underlined() requires the label to have text"
        );
        self.configure(|style| style.underlined = true)
    }

    pub fn line_break(self, mode: LineBreak) -> Self {
        self.configure(|style| style.line_break = mode)
    }

    pub fn lines(self, count: usize) -> Self {
        self.configure(|style| style.lines = count)
    }
}

impl IntoFragment for Label {
    fn into_fragment(self) -> Fragment {
        Fragment::Leaf(self.view.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{CurrentValueSubject, PassthroughSubject};

    #[test]
    fn new_sets_text() {
        let label = Label::new("hello");
        assert_eq!(label.text().as_deref(), Some("hello"));
        assert_eq!(label.view().kind(), &ViewKind::Label);
    }

    #[test]
    fn style_setters_chain() {
        let label = Label::new("x")
            .preferred_font(TextStyle::Title)
            .bold()
            .italic()
            .text_color(Some(Color::rgb(255, 0, 0)))
            .text_color(None)
            .lines(0)
            .line_break(LineBreak::WordWrap);

        let style = label.style();
        assert_eq!(style.font.size, 28.0);
        assert_eq!(style.font.weight, FontWeight::Bold);
        assert!(style.font.italic);
        assert_eq!(style.text_color, Color::rgb(255, 0, 0));
        assert_eq!(style.lines, 0);
        assert_eq!(style.line_break, LineBreak::WordWrap);
    }

    #[test]
    fn clearing_font_restores_default() {
        let label = Label::new("x").bold().font(None);
        assert_eq!(label.style().font, Font::default());
    }

    #[test]
    fn underlined_marks_style() {
        assert!(Label::new("link").underlined().style().underlined);
    }

    #[test]
    #[should_panic(expected = "requires the label to have text")]
    fn underlined_without_text_panics() {
        let _ = Label::blank().underlined();
    }

    #[test]
    fn bound_label_follows_publisher() {
        let subject = PassthroughSubject::new();
        let label = Label::bound(&subject);
        assert!(label.text().is_none());

        subject.send("one".to_string());
        subject.send("two".to_string());
        assert_eq!(label.text().as_deref(), Some("two"));
    }

    #[test]
    fn bound_label_gets_current_value() {
        let subject = CurrentValueSubject::new("ready".to_string());
        let label = Label::bound(&subject);
        assert_eq!(label.text().as_deref(), Some("ready"));
    }

    #[test]
    fn binding_survives_conversion_into_fragment() {
        let subject = PassthroughSubject::new();
        let views = Label::bound(&subject).into_fragment().flatten();

        subject.send("still here".to_string());
        assert_eq!(views.views()[0].text().as_deref(), Some("still here"));
    }

    #[test]
    fn style_survives_conversion_into_fragment() {
        let views = Label::new("x").bold().into_fragment().flatten();
        let tree = views.views()[0].tree();

        let style = tree.style.as_ref().expect("label views carry a style");
        assert_eq!(style.font.weight, FontWeight::Bold);
        assert!(tree.render().contains("Bold"));
    }

    #[test]
    fn plain_views_have_no_style() {
        assert!(View::plain().tree().style.is_none());
    }

    #[test]
    fn dropping_label_ends_subscription() {
        let subject = PassthroughSubject::new();
        let label = Label::bound(&subject);
        assert_eq!(subject.subscriber_count(), 1);

        drop(label);
        subject.send("late".to_string());
        assert_eq!(subject.subscriber_count(), 0);
    }
}
