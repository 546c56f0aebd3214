pub mod measure;
pub mod placement;

pub use measure::{TextMeasure, truncate_to_fit};

/// Scaling applied to measure values before formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayUnits {
    /// Pick a unit from the magnitude of the value being formatted.
    #[default]
    Auto,
    None,
    Thousands,
    Millions,
    Billions,
}

impl DisplayUnits {
    fn divisor_suffix(self) -> (f64, &'static str) {
        match self {
            DisplayUnits::Auto | DisplayUnits::None => (1.0, ""),
            DisplayUnits::Thousands => (1e3, "K"),
            DisplayUnits::Millions => (1e6, "M"),
            DisplayUnits::Billions => (1e9, "bn"),
        }
    }

    /// Unit inferred from the digit count of the integer part: ten or more
    /// digits scale to billions, seven to nine to millions, four to six to
    /// thousands, anything smaller stays unscaled.
    pub fn auto_for(value: f64) -> DisplayUnits {
        let digits = format!("{}", value.abs().trunc() as i64).len();
        if digits > 9 {
            DisplayUnits::Billions
        } else if digits > 6 {
            DisplayUnits::Millions
        } else if digits > 3 {
            DisplayUnits::Thousands
        } else {
            DisplayUnits::None
        }
    }
}

/// Formats measure values with a display unit and fixed precision.
#[derive(Debug, Clone, Copy)]
pub struct ValueFormatter {
    pub units: DisplayUnits,
    pub precision: usize,
}

impl ValueFormatter {
    pub fn new(units: DisplayUnits, precision: usize) -> Self {
        Self { units, precision }
    }

    pub fn format(&self, value: f64) -> String {
        let units = match self.units {
            DisplayUnits::Auto => DisplayUnits::auto_for(value),
            fixed => fixed,
        };
        let (divisor, suffix) = units.divisor_suffix();
        format!("{:.*}{}", self.precision, value / divisor, suffix)
    }
}

/// What a detail label says about its arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelStyle {
    Data,
    Category,
    PercentOfTotal,
    CategoryPercent,
    DataValuePercent,
    Both,
    /// Category, value and percent together.
    #[default]
    Default,
}

impl LabelStyle {
    /// Styles that carry a second row when the combined text does not fit.
    pub fn has_second_row(self) -> bool {
        !matches!(
            self,
            LabelStyle::Data | LabelStyle::Category | LabelStyle::PercentOfTotal
        )
    }
}

/// The three renderings of one arc's label: the primary row shown when
/// space is tight, the optional second row, and the combined single-row
/// form preferred when it fits (also used for tooltips).
#[derive(Debug, Clone, PartialEq)]
pub struct LabelText {
    pub primary: String,
    pub secondary: Option<String>,
    pub combined: String,
}

/// Render an arc's label under the given style. `precision` drives the
/// single-row percent style; row-two percentages are always two decimals.
pub fn label_text(
    style: LabelStyle,
    name: &str,
    value: f64,
    total: f64,
    formatter: &ValueFormatter,
    precision: usize,
) -> LabelText {
    let percent = if total > 0.0 { value / total * 100.0 } else { 0.0 };
    let pct2 = format!("{percent:.2}");
    match style {
        LabelStyle::Data => {
            let v = formatter.format(value);
            LabelText { primary: v.clone(), secondary: None, combined: v }
        }
        LabelStyle::Category => LabelText {
            primary: name.to_string(),
            secondary: None,
            combined: name.to_string(),
        },
        LabelStyle::PercentOfTotal => {
            let text = format!("{:.*}%", precision, percent);
            LabelText { primary: text.clone(), secondary: None, combined: text }
        }
        LabelStyle::CategoryPercent => LabelText {
            primary: name.to_string(),
            secondary: Some(format!("{pct2}%")),
            combined: format!("{name} {pct2}%"),
        },
        LabelStyle::DataValuePercent => {
            let v = formatter.format(value);
            LabelText {
                primary: v.clone(),
                secondary: Some(format!("({pct2}%)")),
                combined: format!("{v} ({pct2}%)"),
            }
        }
        LabelStyle::Both => {
            let v = formatter.format(value);
            LabelText {
                primary: name.to_string(),
                secondary: Some(v.clone()),
                combined: format!("{name} {v}"),
            }
        }
        LabelStyle::Default => {
            let v = formatter.format(value);
            LabelText {
                primary: name.to_string(),
                secondary: Some(format!("{v} ({pct2}%)")),
                combined: format!("{name} {v} ({pct2}%)"),
            }
        }
    }
}

/// True when a first row that fit untruncated already spells out what the
/// second row would repeat, so the second row can be dropped.
pub fn first_row_carries_second(style: LabelStyle, first_row: &str) -> bool {
    if first_row.contains('\u{2026}') || first_row.contains("...") {
        return false;
    }
    let has_space = first_row.trim().contains(' ');
    let parenthesized_tail = first_row.trim_end().ends_with(')')
        && first_row.contains(" (");
    match style {
        LabelStyle::CategoryPercent | LabelStyle::Both => has_space,
        LabelStyle::DataValuePercent => parenthesized_tail,
        LabelStyle::Default => {
            parenthesized_tail && first_row.trim().matches(' ').count() >= 2
        }
        _ => false,
    }
}
