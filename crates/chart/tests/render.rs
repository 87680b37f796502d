use progress_chart::{ChartOptions, render_svg};
use progress_core::{NaiveDate, TimeSeries};

fn day(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("date")
}

fn circle_xs(svg: &str) -> Vec<f64> {
    svg.lines()
        .filter_map(|line| line.trim().strip_prefix("<circle cx=\""))
        .filter_map(|rest| rest.split('"').next())
        .map(|value| value.parse::<f64>().expect("cx"))
        .collect()
}

fn three_day_series() -> TimeSeries {
    let mut series = TimeSeries::new();
    series.upsert(day("2024-01-01"), 500);
    series.upsert(day("2024-01-02"), 650);
    series.upsert(day("2024-01-03"), 700);
    series
}

#[test]
fn rendering_is_byte_identical() {
    let series = three_day_series();
    let options = ChartOptions::default();
    let first = render_svg(&series, &options).expect("render");
    let second = render_svg(&series, &options).expect("render");
    assert_eq!(first, second);
}

#[test]
fn three_points_in_increasing_date_order() {
    let svg = render_svg(&three_day_series(), &ChartOptions::default()).expect("render");

    let xs = circle_xs(&svg);
    assert_eq!(xs.len(), 3);
    assert!(xs.windows(2).all(|pair| pair[0] < pair[1]));

    let first = svg.find("2024-01-01: 500 words").expect("first point");
    let second = svg.find("2024-01-02: 650 words").expect("second point");
    let third = svg.find("2024-01-03: 700 words").expect("third point");
    assert!(first < second && second < third);

    assert!(svg.contains(">700 words</text>"));
    assert!(svg.contains("+50 words today"));
    assert!(svg.contains("Updated: 2024-01-03"));
    assert!(svg.contains("3 days since 2024-01-01"));
}

#[test]
fn back_dated_entry_is_plotted_in_date_order() {
    let mut series = TimeSeries::new();
    series.upsert(day("2024-03-05"), 10);
    series.upsert(day("2024-03-01"), 5);
    let svg = render_svg(&series, &ChartOptions::default()).expect("render");
    let earlier = svg.find("2024-03-01: 5 words").expect("earlier");
    let later = svg.find("2024-03-05: 10 words").expect("later");
    assert!(earlier < later);
}

#[test]
fn empty_series_renders_placeholder() {
    let svg = render_svg(&TimeSeries::new(), &ChartOptions::default()).expect("render");
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("No data yet. Start writing!"));
    assert!(circle_xs(&svg).is_empty());
}

#[test]
fn zero_total_day_is_still_plotted() {
    let mut series = TimeSeries::new();
    series.upsert(day("2024-05-01"), 0);
    let svg = render_svg(&series, &ChartOptions::default()).expect("render");
    assert_eq!(circle_xs(&svg).len(), 1);
    assert!(svg.contains("No change today"));
    assert!(svg.contains("1 day since 2024-05-01"));
}

#[test]
fn title_is_escaped() {
    let options = ChartOptions {
        title: "Thesis <draft> & notes".to_string(),
    };
    let svg = render_svg(&three_day_series(), &options).expect("render");
    assert!(svg.contains("Thesis &lt;draft&gt; &amp; notes"));
    assert!(!svg.contains("<draft>"));
}

#[test]
fn word_loss_is_shown_in_red() {
    let mut series = three_day_series();
    series.upsert(day("2024-01-04"), 400);
    let svg = render_svg(&series, &ChartOptions::default()).expect("render");
    assert!(svg.contains("-300 words today"));
    assert!(svg.contains("fill: #cf222e;"));
}
