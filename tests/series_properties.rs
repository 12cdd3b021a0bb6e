use chartprep::history::ChartRecord;
use chartprep::synthesize::{self, MAX_POINT_SIZE, MIN_POINT_SIZE};
use chartprep::{prepare, synthesize_geography, ChartSpec, ChartType, PreparedSeries, Row, Table, Value};
use std::io::Cursor;

fn sales_rows() -> Vec<Row> {
    vec![
        Row::new().with("region", "North").with("sales", 100.0),
        Row::new().with("region", "South").with("sales", "80"),
        Row::new().with("region", "North").with("sales", "abc"),
        Row::new().with("sales", 5.0),
        Row::new().with("region", "").with("sales", Value::Missing),
        Row::new().with("region", "East").with("sales", -20.0),
    ]
}

#[test]
fn test_length_preserved_for_row_wise_types() {
    let rows = sales_rows();
    for chart_type in ChartType::ALL {
        if chart_type == ChartType::Pie {
            continue;
        }
        let spec = ChartSpec::new("", chart_type, "region", "sales");
        assert_eq!(prepare(&rows, &spec).len(), rows.len(), "{}", chart_type);
    }
}

#[test]
fn test_pie_sum_conserved_and_labels_unique() {
    let rows = sales_rows();
    let spec = ChartSpec::new("", ChartType::Pie, "region", "sales");
    let PreparedSeries::Categorical { labels, values } = prepare(&rows, &spec) else {
        panic!("pie must prepare a categorical series");
    };

    assert_eq!(labels, vec!["North", "South", "Unknown", "East"]);
    assert_eq!(values, vec![100.0, 80.0, 5.0, -20.0]);

    let total: f64 = values.iter().sum();
    assert_eq!(total, 100.0 + 80.0 + 0.0 + 5.0 + 0.0 - 20.0);
}

#[test]
fn test_prepare_is_idempotent() {
    let rows: Vec<Row> = (0..8)
        .map(|i| {
            Row::new()
                .with("place", if i % 2 == 0 { "Paris" } else { "Nowhere" })
                .with("v", i as f64)
        })
        .collect();
    for chart_type in ChartType::ALL {
        let spec = ChartSpec::new("", chart_type, "place", "v");
        assert_eq!(prepare(&rows, &spec), prepare(&rows, &spec), "{}", chart_type);
    }
}

#[test]
fn test_every_number_is_finite() {
    let rows = vec![
        Row::new().with("a", "NaN").with("b", "inf"),
        Row::new().with("a", f64::INFINITY).with("b", f64::NAN),
        Row::new().with("a", "1e400").with("b", "-1e400"),
    ];
    for chart_type in ChartType::ALL {
        let spec = ChartSpec::new("", chart_type, "a", "b").with_z("b");
        let json = serde_json::to_value(prepare(&rows, &spec)).unwrap();
        // serde_json writes non-finite floats as null
        assert!(!json.to_string().contains("null"), "{}: {}", chart_type, json);
    }
}

#[test]
fn test_empty_table_gives_empty_series() {
    let table = Table::from_csv(Cursor::new("region,sales\n")).unwrap();
    assert!(table.is_empty());
    for chart_type in ChartType::ALL {
        let spec = ChartSpec::new("", chart_type, "region", "sales");
        assert!(prepare(&table.rows, &spec).is_empty());
    }
}

#[test]
fn test_geography_known_and_unknown_places() {
    let rows = vec![
        Row::new().with("city", "London").with("pop", 9.0),
        Row::new().with("city", "london").with("pop", 3.0),
        Row::new().with("pop", 1.0),
    ];
    let points = synthesize_geography(&rows, "city", "pop");
    assert_eq!(points.len(), 3);

    assert!(points[0].matched);
    assert_eq!((points[0].latitude, points[0].longitude), (51.5074, -0.1278));
    assert_eq!(points[0].size, MAX_POINT_SIZE);

    // Lookup is case-sensitive.
    assert!(!points[1].matched);
    assert_eq!((points[1].latitude, points[1].longitude), (0.0, 0.0));

    assert_eq!(points[2].label, "Point 2");
    for p in &points {
        assert!((0.0..360.0).contains(&p.hue));
        assert!(p.size >= MIN_POINT_SIZE && p.size <= MAX_POINT_SIZE);
    }
}

#[test]
fn test_map_chart_spreads_unmatched_points() {
    let rows: Vec<Row> = ["Atlantis", "Tokyo", "El Dorado"]
        .iter()
        .map(|name| Row::new().with("place", *name).with("v", 10.0))
        .collect();
    let spec = ChartSpec::new("", ChartType::Map3d, "place", "v");
    let PreparedSeries::Geographic { points } = prepare(&rows, &spec) else {
        panic!("map3d must prepare a geographic series");
    };

    assert_eq!((points[1].latitude, points[1].longitude), (35.6762, 139.6503));
    for p in [&points[0], &points[2]] {
        assert!(!p.matched);
        assert!((-180.0..180.0).contains(&p.longitude));
        assert!((-40.0..40.0).contains(&p.latitude));
    }
    assert_ne!(points[0].longitude, points[2].longitude);
}

#[test]
fn test_time_frames_partition_points() {
    let rows = vec![
        Row::new().with("c", "Paris").with("v", 1.0).with("t", 2021.0),
        Row::new().with("c", "Tokyo").with("v", 2.0).with("t", 2020.0),
        Row::new().with("c", "Sydney").with("v", 3.0).with("t", 2021.0),
    ];
    let frames = synthesize::time_frames(&rows, "t");
    assert_eq!(frames, vec!["2020", "2021"]);

    let points = synthesize::synthesize_geography_over_time(&rows, "c", "v", "t");
    let in_2021: Vec<&str> = synthesize::frame(&points, "2021").map(|p| p.label.as_str()).collect();
    assert_eq!(in_2021, vec!["Paris", "Sydney"]);
}

#[test]
fn test_history_record_matches_series_length() {
    let rows = sales_rows();
    for chart_type in ChartType::ALL {
        let spec = ChartSpec::new("", chart_type, "region", "sales");
        let series = prepare(&rows, &spec);
        let record = ChartRecord::from_series(&spec, &series);
        assert_eq!(record.labels.len(), series.len());
        assert_eq!(record.values.len(), series.len());
        assert_eq!(record.chart_type, chart_type);
    }
}
