use color_eyre::Result;
use polars::prelude::*;
use titlestat::config::{AppConfig, FieldKind, FieldSpec};
use titlestat::statistics::{AnalysisFlag, Statistic};
use titlestat::{render, source, AnalysisContext};

/// A small cleaned catalog: ten titles, one row with missing country and cast.
fn sample_catalog() -> Result<DataFrame> {
    let df = DataFrame::new(vec![
        Series::new(
            "type".into(),
            &[
                "Movie", "Movie", "TV Show", "Movie", "TV Show", "Movie", "Movie", "TV Show",
                "Movie", "TV Show",
            ],
        )
        .into(),
        Series::new(
            "rating".into(),
            &[
                "PG-13", "TV-MA", "TV-MA", "R", "TV-MA", "PG-13", "PG", "TV-MA", "R", "PG-13",
            ],
        )
        .into(),
        Series::new(
            "listed_in".into(),
            &[
                Some("Drama, Comedy"),
                Some("Drama"),
                Some("Drama, Action"),
                Some("Comedy"),
                Some("Drama"),
                Some("Action, Drama"),
                Some("Documentaries"),
                Some("Drama, Comedy"),
                Some("Comedy"),
                Some("Drama"),
            ],
        )
        .into(),
        Series::new(
            "country".into(),
            &[
                Some("United States"),
                Some("United States"),
                Some("India, United Kingdom"),
                Some("United States"),
                Some("India"),
                Some("United States"),
                Some("United Kingdom"),
                Some("United States"),
                None,
                Some("United States, India"),
            ],
        )
        .into(),
        Series::new(
            "cast".into(),
            &[
                Some("Actor A, Actor B"),
                Some("Actor A"),
                Some("Actor C"),
                Some("Actor B, Actor D"),
                Some("Actor A, Actor C"),
                Some("Actor E"),
                Some("Actor F"),
                Some("Actor A"),
                None,
                Some("Actor B"),
            ],
        )
        .into(),
        Series::new(
            "release_year".into(),
            &[2015i64, 2018, 2020, 2020, 2019, 2021, 2017, 2020, 2018, 2021],
        )
        .into(),
        Series::new(
            "year_added".into(),
            &[2019i64, 2020, 2020, 2021, 2020, 2021, 2019, 2021, 2020, 2021],
        )
        .into(),
        Series::new(
            "month_added".into(),
            &[
                "January", "July", "July", "December", "March", "July", "October", "January",
                "December", "July",
            ],
        )
        .into(),
    ])?;
    Ok(df)
}

#[test]
fn full_report_covers_all_configured_fields() -> Result<()> {
    let ctx = AnalysisContext::new(sample_catalog()?, AppConfig::default());
    let report = ctx.analyze_all()?;

    assert_eq!(report.total_rows, 10);
    for name in [
        "type",
        "rating",
        "genre",
        "country",
        "cast",
        "release_year",
        "year_added",
        "month_added",
    ] {
        assert!(report.fields.contains_key(name), "missing field {name}");
    }

    let types = &report.fields["type"];
    assert_eq!(types.frequency.get("Movie"), Some(6));
    assert_eq!(types.frequency.get("TV Show"), Some(4));
    // scalar field: occurrences equal non-missing rows
    assert_eq!(types.frequency.total_occurrences(), 10);
    Ok(())
}

#[test]
fn multi_valued_field_counts_exceed_rows() -> Result<()> {
    let ctx = AnalysisContext::new(sample_catalog()?, AppConfig::default());
    let report = ctx.analyze_all()?;

    let genre = &report.fields["genre"];
    assert_eq!(genre.frequency.get("Drama"), Some(7));
    assert_eq!(genre.frequency.get("Comedy"), Some(4));
    assert_eq!(genre.frequency.get("Action"), Some(2));
    assert_eq!(genre.frequency.get("Documentaries"), Some(1));
    assert!(genre.frequency.total_occurrences() as usize >= genre.frequency.non_missing_rows());
    Ok(())
}

#[test]
fn missing_percentages_sum_to_one_hundred() -> Result<()> {
    let ctx = AnalysisContext::new(sample_catalog()?, AppConfig::default());
    let report = ctx.analyze_all()?;

    for field in report.fields.values() {
        let total = field.missing.percent + field.missing.percent_present();
        assert!((total - 100.0).abs() < 1e-9, "field {}", field.field);
    }
    let country = &report.fields["country"];
    assert_eq!(country.missing.missing, 1);
    assert!((country.missing.percent - 10.0).abs() < 1e-9);
    Ok(())
}

#[test]
fn missing_required_column_is_fatal() -> Result<()> {
    let df = DataFrame::new(vec![
        Series::new("type".into(), &["Movie"]).into(),
        Series::new("rating".into(), &["PG"]).into(),
    ])?;
    assert!(source::validate_columns(&df, &AppConfig::default()).is_err());

    let ctx = AnalysisContext::new(df, AppConfig::default());
    let err = ctx.analyze_all().unwrap_err();
    assert!(err.to_string().contains("missing"));
    Ok(())
}

#[test]
fn all_null_column_reports_insufficient_data() -> Result<()> {
    let mut df = sample_catalog()?;
    let nulls: Vec<Option<&str>> = vec![None; 10];
    df.replace("country", Series::new("country".into(), nulls))?;

    let ctx = AnalysisContext::new(df, AppConfig::default());
    let report = ctx.analyze_all()?;
    let country = &report.fields["country"];
    assert!(country.flags.contains(&AnalysisFlag::InsufficientData));
    assert!(country.distribution.is_none());
    assert!(country.outliers_iqr.is_empty());
    assert!(country.outliers_zscore.is_empty());
    assert_eq!(country.missing.missing, 10);
    Ok(())
}

#[test]
fn non_string_multi_valued_column_is_flagged_not_fatal() -> Result<()> {
    let mut config = AppConfig::default();
    config.fields.push(FieldSpec {
        name: "broken".to_string(),
        column: "release_year".to_string(),
        kind: FieldKind::MultiValued,
        z_threshold: None,
        high_cardinality: false,
        type_split: false,
    });

    let ctx = AnalysisContext::new(sample_catalog()?, config);
    let report = ctx.analyze_all()?;
    let broken = &report.fields["broken"];
    assert!(broken.flags.contains(&AnalysisFlag::InvalidFieldFormat));
    assert!(broken.distribution.is_none());
    // the rest of the report is intact
    assert!(report.fields["type"].distribution.is_some());
    Ok(())
}

#[test]
fn dominant_country_is_an_upper_outlier() -> Result<()> {
    // counts: United States 20, India 3, United Kingdom 2, Canada 2, France 1
    let mut countries = Vec::new();
    countries.extend(std::iter::repeat("United States").take(20));
    countries.extend(std::iter::repeat("India").take(3));
    countries.extend(std::iter::repeat("United Kingdom").take(2));
    countries.extend(std::iter::repeat("Canada").take(2));
    countries.push("France");
    let types: Vec<&str> = countries.iter().map(|_| "Movie").collect();

    let df = DataFrame::new(vec![
        Series::new("country".into(), countries).into(),
        Series::new("type".into(), types).into(),
    ])?;

    let mut config = AppConfig::default();
    config.fields.retain(|f| f.name == "country");

    let ctx = AnalysisContext::new(df, config);
    let report = ctx.analyze_fields(&["country".to_string()])?;
    let country = &report.fields["country"];

    let iqr_labels: Vec<&str> = country
        .outliers_iqr
        .iter()
        .map(|o| o.label.as_str())
        .collect();
    assert_eq!(iqr_labels, vec!["United States"]);
    assert!(country.outliers_iqr[0].z_score.unwrap() > 0.0);
    // high-cardinality default cutoff applies to the country field
    assert_eq!(country.z_threshold, 2.5);
    Ok(())
}

#[test]
fn flat_scalar_distribution_has_no_zscore_outliers() -> Result<()> {
    let df = DataFrame::new(vec![
        Series::new("rating".into(), &["PG", "R", "PG", "R", "TV-MA", "TV-MA"]).into(),
        Series::new("type".into(), &["Movie"; 6]).into(),
    ])?;
    let mut config = AppConfig::default();
    config.fields.retain(|f| f.name == "rating");

    let ctx = AnalysisContext::new(df, config);
    let report = ctx.analyze_fields(&["rating".to_string()])?;
    let rating = &report.fields["rating"];
    let dist = rating.distribution.as_ref().unwrap();
    assert_eq!(dist.std, 0.0);
    assert!(rating.outliers_zscore.is_empty());
    assert!(rating.flags.contains(&AnalysisFlag::DegenerateSample));
    // three equal counts: skewness needs variance, kurtosis and normality need n >= 4
    assert!(rating
        .flags
        .contains(&AnalysisFlag::InsufficientSampleSize(Statistic::Kurtosis)));
    Ok(())
}

#[test]
fn type_split_uses_exact_token_membership() -> Result<()> {
    let df = DataFrame::new(vec![
        Series::new(
            "country".into(),
            &[
                Some("United States"),
                Some("United States"),
                Some("United States, India"),
                Some("India"),
                None,
            ],
        )
        .into(),
        Series::new(
            "type".into(),
            &["Movie", "Movie", "TV Show", "TV Show", "Movie"],
        )
        .into(),
    ])?;

    let mut config = AppConfig::default();
    config.fields.retain(|f| f.name == "country");

    let ctx = AnalysisContext::new(df, config);
    let report = ctx.analyze_fields(&["country".to_string()])?;
    let splits = report.fields["country"].type_split.as_ref().unwrap();

    let us = splits
        .iter()
        .find(|s| s.category == "United States")
        .unwrap();
    assert_eq!(us.types.get("Movie"), Some(&2));
    assert_eq!(us.types.get("TV Show"), Some(&1));

    let india = splits.iter().find(|s| s.category == "India").unwrap();
    assert_eq!(india.types.get("TV Show"), Some(&2));
    assert_eq!(india.types.get("Movie"), None);
    Ok(())
}

#[test]
fn report_serializes_with_stable_shape() -> Result<()> {
    let ctx = AnalysisContext::new(sample_catalog()?, AppConfig::default());
    let report = ctx.analyze_all()?;

    let value = serde_json::to_value(&report)?;
    let genre = &value["fields"]["genre"];
    assert!(genre["distribution"]["mean"].is_number());
    assert!(genre["outliers_iqr"].is_array());
    assert!(genre["outliers_zscore"].is_array());
    assert!(genre["missing"]["percent"].is_number());
    assert_eq!(value["total_rows"], 10);
    Ok(())
}

#[test]
fn text_report_orders_months_by_calendar() -> Result<()> {
    let ctx = AnalysisContext::new(sample_catalog()?, AppConfig::default());
    let report = ctx.analyze_all()?;
    let text = render::render_report(&report);

    let january = text.find("January:").expect("January row");
    let july = text.find("July:").expect("July row");
    let december = text.find("December:").expect("December row");
    assert!(january < july && july < december);
    assert!(text.contains("catalog analysis: 10 rows"));
    Ok(())
}

#[test]
fn field_selection_rejects_unknown_names() -> Result<()> {
    let ctx = AnalysisContext::new(sample_catalog()?, AppConfig::default());
    assert!(ctx.analyze_fields(&["director".to_string()]).is_err());
    Ok(())
}
