//! HTML rendering for the prediction form

use predictor_lib::predictor::{FieldSpec, PredictorKind};
use predictor_lib::FieldKind;
use std::fmt::Write;

/// Escape text for inclusion in HTML content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_tabs(out: &mut String, active: PredictorKind) {
    out.push_str("<nav>");
    for kind in PredictorKind::ALL {
        let class = if kind == active { " class=\"active\"" } else { "" };
        let _ = write!(
            out,
            "<a href=\"/?mode={}\"{}>{}</a>",
            kind.mode(),
            class,
            kind.display_name()
        );
    }
    out.push_str("</nav>");
}

fn render_field(out: &mut String, field: &FieldSpec) {
    let inputmode = match field.kind {
        FieldKind::Float => " inputmode=\"decimal\"",
        FieldKind::Integer => " inputmode=\"numeric\"",
        FieldKind::Text => "",
    };
    let _ = write!(
        out,
        "<label>{label}<input type=\"text\" name=\"{name}\"{inputmode} required></label>",
        label = escape_html(field.prompt),
        name = field.form_key,
        inputmode = inputmode,
    );
}

fn render_form(out: &mut String, kind: PredictorKind) {
    let _ = write!(
        out,
        "<form method=\"post\" action=\"/predict/{}\"><h2>{} Prediction</h2>",
        kind.mode(),
        kind.display_name()
    );
    for field in kind.contract().fields() {
        render_field(out, field);
    }
    out.push_str("<button type=\"submit\">Predict</button></form>");
}

/// Render the index page for a mode with an optional result or error
pub fn render_index(mode: PredictorKind, result: Option<&str>, error: Option<&str>) -> String {
    let mut out = String::from(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>Weather Predictor</title></head><body><h1>Weather Predictor</h1>",
    );
    render_tabs(&mut out, mode);

    if let Some(result) = result {
        let _ = write!(
            out,
            "<div class=\"result\">Prediction: <strong>{}</strong></div>",
            escape_html(result)
        );
    }
    if let Some(error) = error {
        let _ = write!(out, "<div class=\"error\">{}</div>", escape_html(error));
    }

    render_form(&mut out, mode);
    out.push_str("</body></html>");
    out
}
