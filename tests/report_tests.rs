use simlog_studio::aggregator::{analyze_log, to_report};
use simlog_studio::chart::{generate_chart, ChartConfig, ChartSeries, LineStyle};
use simlog_studio::output::{read_report, write_report, write_series_csv};
use simlog_studio::parser::parse_log;
use simlog_studio::utils::config::SCHEMA_VERSION;

const SAMPLE_LOG: &str = r#"{
    "tests": [{
        "roundInfo": {"roundCount": 6, "byzantineRound": 1},
        "peerInfo": {"peerCount": 8},
        "walletInfo": {"walletCount": 16},
        "corruptWallets": [3],
        "transactions": [
            {"seqNum": 0, "round": 1, "coin": 5, "sender": 1, "receiver": 2,
             "honest": true, "validatorsNeeded": 3},
            {"seqNum": 1, "round": 2, "coin": 6, "sender": 2, "receiver": 4,
             "honest": true, "validatorsNeeded": 3}
        ],
        "validations": [
            {"seqNum": 0, "round": 2},
            {"seqNum": 0, "round": 3}
        ],
        "messages": [
            {"round": 1, "batchSize": 4, "transactionType": "local"},
            {"round": 3, "batchSize": 2, "transactionType": "global"}
        ]
    }]
}"#;

#[test]
fn test_report_round_trip_through_disk() {
    let log = parse_log(SAMPLE_LOG).unwrap();
    let mut timelines = analyze_log(&log).unwrap();
    let report = to_report(&mut timelines, "sample.json").unwrap();

    assert_eq!(report.version, SCHEMA_VERSION);
    assert_eq!(report.run_count, 1);
    assert_eq!(report.round_count, 6);
    assert_eq!(report.peer_count, Some(8));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");
    write_report(&report, &path).unwrap();
    let loaded = read_report(&path).unwrap();

    assert_eq!(loaded.run_count, report.run_count);
    assert_eq!(loaded.series.len(), report.series.len());
    assert_eq!(loaded.summary.transactions_started, 2.0);
    assert_eq!(loaded.summary.transactions_confirmed, 1.0);
    assert_eq!(loaded.summary.corrupt_wallets, 1.0);
}

#[test]
fn test_report_includes_normalized_series_when_counts_known() {
    let log = parse_log(SAMPLE_LOG).unwrap();
    let mut timelines = analyze_log(&log).unwrap();
    let report = to_report(&mut timelines, "sample.json").unwrap();

    let metrics: Vec<&str> = report.series.iter().map(|s| s.metric.as_str()).collect();
    assert!(metrics.contains(&"transactions_started"));
    assert!(metrics.contains(&"messages_per_peer"));
    assert!(metrics.contains(&"corrupt_wallet_fraction"));

    let per_peer = report
        .series
        .iter()
        .find(|s| s.metric == "messages_per_peer")
        .unwrap();
    assert!(per_peer.normalized);
    // 6 messages across 8 peers by the final round
    assert_eq!(per_peer.points.last().unwrap().value, 0.75);
}

#[test]
fn test_series_csv_export() {
    let log = parse_log(SAMPLE_LOG).unwrap();
    let mut timelines = analyze_log(&log).unwrap();
    let report = to_report(&mut timelines, "sample.json").unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("series.csv");
    write_series_csv(&report.series, &path).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let mut lines = contents.lines();
    let header = lines.next().unwrap();

    assert!(header.starts_with("round,"));
    assert!(header.contains("transactions_started"));
    // Header plus one row per round
    assert_eq!(lines.count(), 6);
}

#[test]
fn test_report_series_render_as_charts() {
    let log = parse_log(SAMPLE_LOG).unwrap();
    let mut timelines = analyze_log(&log).unwrap();
    let report = to_report(&mut timelines, "sample.json").unwrap();

    let series: Vec<ChartSeries> = report
        .series
        .iter()
        .filter(|s| s.metric.starts_with("transactions"))
        .map(|s| ChartSeries::new(s.metric.clone(), LineStyle::Solid, s.points.clone()))
        .collect();

    let config = ChartConfig::new().with_title("Transactions Over Time");
    let svg = generate_chart(&series, Some(&config)).unwrap();

    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("Transactions Over Time"));
    assert!(svg.contains("transactions_started"));
}
