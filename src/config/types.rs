use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HeraldConfig {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub stack: StackConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Defaults for renderers bound to streams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Animate snapshot differences when a bound stream delivers (default: true).
    #[serde(default = "default_animate_differences")]
    pub animate_differences: bool,
}

/// Arrangement of a stack container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StackConfig {
    #[serde(default)]
    pub axis: Axis,
    #[serde(default)]
    pub alignment: Alignment,
    #[serde(default)]
    pub distribution: Distribution,
    /// Gap between arranged children in points (default: 0).
    #[serde(default)]
    pub spacing: f64,
    /// Lay out children relative to their baselines.
    #[serde(default, rename = "baseline_relative")]
    pub is_baseline_relative_arrangement: bool,
    /// Lay out children inside the layout margins instead of the bounds.
    #[serde(default, rename = "layout_margins_relative")]
    pub is_layout_margins_relative_arrangement: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Horizontal,
    #[default]
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    #[default]
    Fill,
    Leading,
    Center,
    Trailing,
    FirstBaseline,
    LastBaseline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Distribution {
    #[default]
    Fill,
    FillEqually,
    FillProportionally,
    EqualSpacing,
    EqualCentering,
}

/// Log output settings. `RUST_LOG` takes precedence over `filter`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive (default: "info").
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_animate_differences() -> bool {
    true
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            animate_differences: default_animate_differences(),
        }
    }
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            axis: Axis::default(),
            alignment: Alignment::default(),
            distribution: Distribution::default(),
            spacing: 0.0,
            is_baseline_relative_arrangement: false,
            is_layout_margins_relative_arrangement: false,
        }
    }
}

impl StackConfig {
    pub fn vertical() -> Self {
        Self::default()
    }

    pub fn horizontal() -> Self {
        Self {
            axis: Axis::Horizontal,
            ..Self::default()
        }
    }

    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_distribution(mut self, distribution: Distribution) -> Self {
        self.distribution = distribution;
        self
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}
