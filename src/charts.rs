//! Plotly figure builders.
//!
//! Figures are assembled server side as `{data, layout}` JSON and rendered in
//! the browser by plotly.js, so the exact chart styling lives here rather
//! than in the page scripts.

use chrono::Utc;
use serde_json::{Value, json};

use crate::model::Simulation;
use crate::stats::correlation::{CorrelationMatrix, ScatterSample};
use crate::stats::prevalence::{PrevalenceBucket, PrevalenceFilter};

/// Bar chart of diabetes prevalence per age bucket.
pub fn prevalence_bar(buckets: &[PrevalenceBucket], filter: PrevalenceFilter) -> Value {
    let labels: Vec<&str> = buckets.iter().map(|b| b.label).collect();
    let rates: Vec<Option<f64>> = buckets.iter().map(|b| b.rate_pct).collect();
    let texts: Vec<String> = buckets
        .iter()
        .map(|b| match b.rate_pct {
            Some(rate) => format!("{:.1}%", rate),
            None => String::new(),
        })
        .collect();
    let max_rate = rates.iter().flatten().fold(0.0f64, |acc, r| acc.max(*r));

    let title = match (filter.gender, filter.smoking_history) {
        (None, None) => "Diabetes prevalence by age group".to_string(),
        (Some(g), None) => format!("Diabetes prevalence by age group ({})", g.label()),
        (None, Some(s)) => {
            format!("Diabetes prevalence by age group (smoking: {})", s.label())
        }
        (Some(g), Some(s)) => format!(
            "Diabetes prevalence by age group ({}, smoking: {})",
            g.label(),
            s.label()
        ),
    };

    json!({
        "data": [{
            "type": "bar",
            "x": labels,
            "y": rates,
            "text": texts,
            "textposition": "outside",
            "marker": {
                "color": rates,
                "colorscale": "Reds",
                "colorbar": {"title": "Prevalence (%)"},
            },
            "hovertemplate": "%{x}: %{y:.1f}%<extra></extra>",
        }],
        "layout": {
            "title": {"text": title},
            "xaxis": {"title": {"text": "Age group"}},
            "yaxis": {
                "title": {"text": "Diabetes prevalence (%)"},
                "range": [0.0, (max_rate * 1.2).max(1.0)],
            },
            "height": 600,
        },
    })
}

/// Heatmap of the pairwise Pearson matrix, red for positive and blue for
/// negative coefficients.
pub fn correlation_heatmap(matrix: &CorrelationMatrix) -> Value {
    json!({
        "data": [{
            "type": "heatmap",
            "x": matrix.features,
            "y": matrix.features,
            "z": matrix.matrix,
            "zmin": -1.0,
            "zmax": 1.0,
            "colorscale": "RdBu",
            "reversescale": true,
            "colorbar": {"title": "r"},
        }],
        "layout": {
            "title": {"text": "Correlation between health indicators"},
            "height": 500,
        },
    })
}

/// Lower-triangle scatter matrix of the sampled rows, colored by outcome.
pub fn scatter_matrix(sample: &ScatterSample) -> Value {
    json!({
        "data": [{
            "type": "splom",
            "dimensions": [
                {"label": "AGE", "values": sample.age},
                {"label": "BMI", "values": sample.bmi},
                {"label": "BLOOD_GLUCOSE_LEVEL", "values": sample.blood_glucose_level},
            ],
            "showupperhalf": false,
            "diagonal": {"visible": false},
            "marker": {
                "color": sample.diabetes,
                "colorscale": [[0, "#1f77b4"], [1, "#d62728"]],
                "cmin": 0,
                "cmax": 1,
                "opacity": 0.6,
                "size": 4,
            },
        }],
        "layout": {
            "title": {"text": "Pairwise view of age, BMI and blood glucose"},
            "height": 700,
            "dragmode": "select",
        },
    })
}

/// Gauge showing the adjusted risk, with a delta against the baseline.
pub fn risk_gauge(simulation: &Simulation) -> Value {
    json!({
        "data": [{
            "type": "indicator",
            "mode": "gauge+number+delta",
            "value": simulation.adjusted_pct,
            "number": {"suffix": "%"},
            "delta": {
                "reference": simulation.baseline_pct,
                "increasing": {"color": "red"},
                "decreasing": {"color": "green"},
            },
            "gauge": {
                "axis": {"range": [0, 100]},
                "bar": {"color": "darkblue"},
                "steps": [
                    {"range": [0, 30], "color": "lightgreen"},
                    {"range": [30, 70], "color": "yellow"},
                    {"range": [70, 100], "color": "red"},
                ],
            },
            "title": {"text": "Predicted diabetes risk (%)"},
        }],
        "layout": {"height": 450},
    })
}

/// Wraps one figure in a self-contained HTML document for download.
pub fn standalone_html(title: &str, figure: &Value) -> String {
    format!(
        concat!(
            "<!DOCTYPE html>\n",
            "<html lang=\"en\">\n",
            "<head>\n",
            "  <meta charset=\"utf-8\">\n",
            "  <title>{title}</title>\n",
            "  <script src=\"https://cdn.plot.ly/plotly-2.32.0.min.js\"></script>\n",
            "</head>\n",
            "<body>\n",
            "  <div id=\"chart\" style=\"max-width: 960px; margin: 0 auto;\"></div>\n",
            "  <script>\n",
            "    const figure = {figure};\n",
            "    Plotly.newPlot(\"chart\", figure.data, figure.layout);\n",
            "  </script>\n",
            "  <!-- exported {exported_at} -->\n",
            "</body>\n",
            "</html>\n",
        ),
        title = title,
        figure = figure,
        exported_at = Utc::now().to_rfc3339(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Gender;
    use crate::model::Verdict;

    fn buckets() -> Vec<PrevalenceBucket> {
        vec![
            PrevalenceBucket {
                label: "20s",
                total: 10,
                positives: 2,
                rate_pct: Some(20.0),
            },
            PrevalenceBucket {
                label: "30s",
                total: 0,
                positives: 0,
                rate_pct: None,
            },
        ]
    }

    #[test]
    fn test_prevalence_bar_shape() {
        let figure = prevalence_bar(&buckets(), PrevalenceFilter::default());

        assert_eq!(figure["data"][0]["type"], "bar");
        assert_eq!(figure["data"][0]["x"][0], "20s");
        assert_eq!(figure["data"][0]["y"][0], 20.0);
        assert!(figure["data"][0]["y"][1].is_null());
        assert_eq!(figure["data"][0]["text"][0], "20.0%");
        assert_eq!(figure["data"][0]["text"][1], "");
        assert_eq!(figure["layout"]["yaxis"]["range"][1], 24.0);
        assert_eq!(
            figure["layout"]["title"]["text"],
            "Diabetes prevalence by age group"
        );
    }

    #[test]
    fn test_prevalence_bar_title_includes_filters() {
        let filter = PrevalenceFilter {
            gender: Some(Gender::Female),
            smoking_history: None,
        };
        let figure = prevalence_bar(&buckets(), filter);
        assert_eq!(
            figure["layout"]["title"]["text"],
            "Diabetes prevalence by age group (Female)"
        );
    }

    #[test]
    fn test_prevalence_bar_axis_floor_for_empty_data() {
        let empty = vec![PrevalenceBucket {
            label: "20s",
            total: 0,
            positives: 0,
            rate_pct: None,
        }];
        let figure = prevalence_bar(&empty, PrevalenceFilter::default());
        assert_eq!(figure["layout"]["yaxis"]["range"][1], 1.0);
    }

    #[test]
    fn test_heatmap_bounds_and_nulls() {
        let matrix = CorrelationMatrix {
            features: vec!["age", "bmi"],
            matrix: vec![vec![Some(1.0), None], vec![None, Some(1.0)]],
        };
        let figure = correlation_heatmap(&matrix);

        assert_eq!(figure["data"][0]["type"], "heatmap");
        assert_eq!(figure["data"][0]["zmin"], -1.0);
        assert_eq!(figure["data"][0]["zmax"], 1.0);
        assert!(figure["data"][0]["z"][0][1].is_null());
    }

    #[test]
    fn test_scatter_matrix_hides_upper_half() {
        let sample = ScatterSample {
            age: vec![20.0, 40.0],
            bmi: vec![22.0, 30.0],
            blood_glucose_level: vec![90.0, 180.0],
            diabetes: vec![0, 1],
            sampled: false,
        };
        let figure = scatter_matrix(&sample);

        assert_eq!(figure["data"][0]["type"], "splom");
        assert_eq!(figure["data"][0]["showupperhalf"], false);
        assert_eq!(figure["data"][0]["dimensions"][0]["label"], "AGE");
        assert_eq!(figure["data"][0]["marker"]["color"][1], 1);
    }

    #[test]
    fn test_risk_gauge_uses_baseline_as_reference() {
        let simulation = Simulation {
            baseline_pct: 62.0,
            adjusted_pct: 38.0,
            delta_pct: -24.0,
            verdict: Verdict::Improved,
            message: String::new(),
        };
        let figure = risk_gauge(&simulation);

        assert_eq!(figure["data"][0]["type"], "indicator");
        assert_eq!(figure["data"][0]["value"], 38.0);
        assert_eq!(figure["data"][0]["delta"]["reference"], 62.0);
        assert_eq!(
            figure["data"][0]["gauge"]["steps"]
                .as_array()
                .unwrap()
                .len(),
            3
        );
    }

    #[test]
    fn test_standalone_html_embeds_figure() {
        let figure = json!({"data": [], "layout": {"height": 600}});
        let html = standalone_html("Prevalence", &figure);

        assert!(html.contains("cdn.plot.ly"));
        assert!(html.contains("<title>Prevalence</title>"));
        assert!(html.contains(r#""height":600"#));
        assert!(html.contains("Plotly.newPlot"));
    }
}
