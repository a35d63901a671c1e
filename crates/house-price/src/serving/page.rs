//! HTML rendering for the single-page form.

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::data::{CategoricalColumn, FeatureColumn};
use crate::io::ArtifactError;
use crate::model::HousePriceModel;

use super::form::{PredictionForm, NUMERIC_FIELDS};

const STYLE: &str = "\
body { font-family: sans-serif; max-width: 40em; margin: 2em auto; background: #fafafa; }
form { display: grid; grid-template-columns: 12em 1fr; gap: 0.6em 1em; }
button { grid-column: 2; padding: 0.5em; }
.result { margin-top: 1.5em; padding: 1em; background: #e7f6ec; border-radius: 6px; }
.error { margin-top: 1.5em; padding: 1em; background: #fdecea; border-radius: 6px; }";

/// Outcome shown under the form.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    None,
    Estimate(f64),
    Invalid(String),
}

/// Format a price as `$1,234,567.89`.
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return format!("${value}");
    }

    let cents = (value.abs() * 100.0).round() as u128;
    let digits = (cents / 100).to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{:02}", cents % 100)
}

/// The prediction form, filled with `values`, with an optional notice below.
pub fn form_page(model: &HousePriceModel, values: &PredictionForm, notice: &Notice) -> String {
    let mut fields = String::new();

    for field in NUMERIC_FIELDS.iter() {
        let name = field.column.name();
        fields.push_str(&format!(
            "<label for=\"{name}\">{label}</label>\
             <input type=\"number\" id=\"{name}\" name=\"{name}\" min=\"{min}\" max=\"{max}\" step=\"1\" value=\"{value}\" required>\n",
            label = field_label(field.column),
            min = field.min,
            max = field.max,
            value = encode_double_quoted_attribute(values.numeric_text(field.column)),
        ));
    }

    for column in CategoricalColumn::ALL {
        let name = column.name();
        let selected = values.category(column);
        let mut options = String::new();
        for class in model.options(column) {
            options.push_str(&format!(
                "<option value=\"{value}\"{sel}>{text}</option>",
                value = encode_double_quoted_attribute(class),
                sel = if class == selected { " selected" } else { "" },
                text = encode_text(class),
            ));
        }
        fields.push_str(&format!(
            "<label for=\"{name}\">{label}</label><select id=\"{name}\" name=\"{name}\">{options}</select>\n",
            label = field_label(column.feature()),
        ));
    }

    let notice = match notice {
        Notice::None => String::new(),
        Notice::Estimate(price) => format!(
            "<div class=\"result\">Estimated House Price: {}</div>",
            format_currency(*price)
        ),
        Notice::Invalid(message) => {
            format!("<div class=\"error\">{}</div>", encode_text(message))
        }
    };

    layout(&format!(
        "<p>Enter the details of the house to predict its price.</p>\n\
         <form method=\"post\" action=\"/\">\n{fields}<button type=\"submit\">Predict Price</button>\n</form>\n{notice}"
    ))
}

/// Blocking page shown while no usable artifact exists.
pub fn unavailable_page(error: &ArtifactError) -> String {
    let message = match error {
        ArtifactError::NotFound { .. } => {
            "Model file not found! Please run the trainer first to generate the model.".to_string()
        }
        other => format!("Model file could not be loaded: {other}"),
    };
    layout(&format!("<div class=\"error\">{}</div>", encode_text(&message)))
}

fn layout(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>House Price Prediction</title>\
         <style>{STYLE}</style></head>\n<body>\n<h1>House Price Prediction</h1>\n{body}\n</body></html>\n"
    )
}

fn field_label(column: FeatureColumn) -> &'static str {
    match column {
        FeatureColumn::Area => "Area (sq ft)",
        FeatureColumn::Bedrooms => "Bedrooms",
        FeatureColumn::Bathrooms => "Bathrooms",
        FeatureColumn::Floors => "Floors",
        FeatureColumn::YearBuilt => "Year Built",
        FeatureColumn::Location => "Location",
        FeatureColumn::Condition => "Condition",
        FeatureColumn::Garage => "Garage",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ForestConfig;
    use crate::testing::synthetic_table;
    use rstest::rstest;
    use std::path::PathBuf;

    #[rstest]
    #[case(0.0, "$0.00")]
    #[case(5.0, "$5.00")]
    #[case(999.999, "$1,000.00")]
    #[case(1234.5, "$1,234.50")]
    #[case(1_234_567.891, "$1,234,567.89")]
    #[case(100_000.0, "$100,000.00")]
    #[case(-2500.25, "-$2,500.25")]
    fn currency_formatting(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(format_currency(value), expected);
    }

    #[test]
    fn form_lists_fitted_options() {
        let config = ForestConfig::builder().n_trees(2).build().unwrap();
        let model = HousePriceModel::train(&synthetic_table(30, 4), config).unwrap();
        let values = PredictionForm::initial(&model);
        let html = form_page(&model, &values, &Notice::None);

        for column in CategoricalColumn::ALL {
            for class in model.options(column) {
                assert!(html.contains(&format!("<option value=\"{class}\"")));
            }
        }
        assert!(html.contains("name=\"YearBuilt\" min=\"1900\" max=\"2024\""));
        assert!(html.contains("value=\"2000\""));
        assert!(!html.contains("Estimated House Price"));
    }

    #[test]
    fn submitted_values_are_escaped() {
        let config = ForestConfig::builder().n_trees(2).build().unwrap();
        let model = HousePriceModel::train(&synthetic_table(30, 4), config).unwrap();
        let values = PredictionForm {
            area: "\"><script>".into(),
            ..PredictionForm::initial(&model)
        };
        let html = form_page(&model, &values, &Notice::Invalid("<b>bad</b>".into()));

        assert!(!html.contains("value=\"\"><script>"));
        assert!(html.contains("value=\"&quot;"));
        assert!(!html.contains("<b>bad</b>"));
    }

    #[test]
    fn missing_model_message() {
        let err = ArtifactError::NotFound {
            path: PathBuf::from("house_model.pkl"),
        };
        let html = unavailable_page(&err);
        assert!(html.contains("Model file not found!"));
        assert!(!html.contains("<form"));
    }
}
