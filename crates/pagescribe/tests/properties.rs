//! End-to-end tests for extraction and apply against an in-memory page.
//!
//! The fixture is a backtest results page that also carries the strategy
//! builder form, so a record extracted from it can be applied straight back.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use pagescribe::apply::controls::{
    find_labeled_input, find_labeled_switch, find_leg_groups, find_leg_input, find_selector,
    find_weekday_button, find_word_button, LegInput,
};
use pagescribe::*;

// ─────────────────────── helpers ───────────────────────

const PAGE: &str = r#"<html>
<head><title>Backtest Results</title><style>.x { color: red }</style></head>
<body>
  <div>
    <h1 id="message-heading"><span>SPX</span> <span class="bg-ooGold">Put Spread</span> <span class="rounded-full text-xs">0DTE</span></h1>
    <p>https://example.test/backtest/42</p>
  </div>

  <dl>
    <dt>Dates:</dt><dd>from: 2024-01-05 to: 2024-02-10</dd>
    <dt>Starting Capital</dt><dd>$100,000</dd>
    <dt>Opening Fees:</dt><dd>$1.00</dd>
    <dt>Win Rate</dt><dd>71%</dd>
    <dt>Total Premium</dt><dd>$12,000 over 120 trades</dd>
    <dt>Legs</dt>
    <dd><table>
      <thead><tr><th>Side</th><th>Type</th><th>Size</th></tr></thead>
      <tbody>
        <tr>
          <td><button class="bg-ooRed">S</button><button>B</button></td>
          <td><button>C</button><button class="bg-ooGreen">P</button></td>
          <td><input value="1"><input value="0.16"><input value="45"></td>
        </tr>
        <tr>
          <td><button>S</button><button>B</button></td>
          <td><button class="bg-ooGreen">C</button><button>P</button></td>
          <td><input value="3"><input value="0.30"><input value="7"></td>
        </tr>
      </tbody>
    </table></dd>
  </dl>

  <section>
    <div class="tile"><span>Win Rate</span><span>12%</span></div>
    <div class="tile"><span>Annualized Probabilistic Sharpe Coefficient</span><span>1.42</span></div>
    <div class="tile"><span>Max Drawdown</span><span>-8.2%</span></div>
  </section>

  <div style="display:none"><dl><dt>Secret</dt><dd>42</dd></dl></div>

  <ul><li>Open trades at 9:35 AM</li><li>Every Monday, Wednesday</li><li>VIX max 30</li></ul>
  <ul><li>Exit trades at 3:15 PM</li><li>Profit target 50%</li><li>Cap profits</li></ul>

  <form>
    <div><label>Start Date</label><input type="date" value="2023-01-01"></div>
    <div><label>End Date</label><input type="date"></div>
    <div><p>Ticker</p><div><button type="button" class="selectInput"><span class="block truncate">SPY</span></button></div></div>
    <div class="flex flex-wrap gap-2 items-center text-white">
      <button type="button" aria-pressed="false">S</button><button type="button" class="bg-ooGreen" aria-pressed="true">B</button>
      <button type="button" class="bg-ooGreen" aria-pressed="true">C</button><button type="button" aria-pressed="false">P</button>
      <input value="2"><span>QTY</span><input value="10"><span>delta</span><input value="7"><span>DTE</span>
    </div>
    <div><label>Use VIX</label><button type="button" role="switch" aria-checked="false"></button></div>
    <div><label>Max VIX</label><input></div>
    <div><label>Cap Profits</label><input type="checkbox"></div>
    <div><label>Entry Time</label><input value="09:30"></div>
    <div><label>Exit Time</label><input></div>
    <div>
      <label>Profit Target</label><input>
      <p>Profit Target Type</p><div><button type="button" class="selectInput"><span class="block truncate">$</span></button></div>
    </div>
    <div>
      <button type="button" aria-pressed="false">Mon</button>
      <button type="button" aria-pressed="true">Tue</button>
      <button type="button" aria-pressed="false">Wed</button>
    </div>
    <div><label>Starting Funds</label><input></div>
    <div><label>Opening Fees</label><input></div>
  </form>
</body>
</html>"#;

fn page() -> MemoryDocument {
    MemoryDocument::parse(PAGE, "https://example.test/backtest/42").expect("fixture parses")
}

fn fixed_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-03-01T14:30:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn extract(doc: &MemoryDocument) -> StructuredRecord {
    Extractor::default().extract_at(doc, fixed_time())
}

fn value_of(doc: &MemoryDocument, label: &str) -> Option<String> {
    let input = find_labeled_input(doc, label, &ApplyConfig::default())?;
    doc.value(input)
}

// ─────────────────────── extraction ───────────────────────

#[test]
fn test_extraction_is_idempotent() {
    let doc = page();
    let first = extract(&doc).to_json_pretty();
    let second = extract(&doc).to_json_pretty();
    assert_eq!(first, second);
}

#[test]
fn test_definition_list_beats_two_child() {
    let record = extract(&page());
    assert_eq!(record.labeled_values.get("Win Rate"), Some("71%"));
    assert_eq!(record.labeled_values.get("Max Drawdown"), Some("-8.2%"));
}

#[test]
fn test_keys_are_unique() {
    let record = extract(&page());
    for map in [&record.labeled_values, &record.metrics] {
        let keys: HashSet<&str> = map.keys().collect();
        assert_eq!(keys.len(), map.len());
    }
}

#[test]
fn test_long_two_child_labels_never_captured() {
    let record = extract(&page());
    assert!(!record
        .labeled_values
        .contains_key("Annualized Probabilistic Sharpe Coefficient"));

    let config = ExtractConfig {
        max_label_chars: 64,
        ..Default::default()
    };
    let record = Extractor::new(config).unwrap().extract_at(&page(), fixed_time());
    assert_eq!(
        record.labeled_values.get("Annualized Probabilistic Sharpe Coefficient"),
        Some("1.42")
    );
}

#[test]
fn test_combined_metrics_and_hidden_content_excluded() {
    let record = extract(&page());
    assert!(!record.labeled_values.contains_key("Total Premium"));
    assert!(!record.labeled_values.contains_key("Secret"));
    assert!(!record.metrics.contains_key("Secret"));
}

#[test]
fn test_legs_are_always_resolved() {
    let record = extract(&page());
    assert_eq!(record.legs.len(), 1);
    let leg = &record.legs[0];
    assert_eq!((leg.side, leg.option_type), (Side::Sell, OptionType::Put));
    assert_eq!(leg.display_text, "Sell Put qty 1 dte 45");

    let json = record.to_value();
    assert_eq!(json["legs"][0]["quantity"], 1);
    assert_eq!(json["legs"][0]["daysToExpiry"], 45);
}

#[test]
fn test_header_and_dates() {
    let record = extract(&page());
    assert_eq!(record.title, "Backtest Results");
    assert_eq!(record.header.title, "SPX");
    assert_eq!(record.header.tags, vec!["Put Spread", "0DTE"]);
    assert_eq!(record.header.link, "https://example.test/backtest/42");

    let range = record.date_range.expect("dates present");
    assert_eq!(range.from.as_deref(), Some("2024-01-05"));
    assert_eq!(range.to.as_deref(), Some("2024-02-10"));
}

#[test]
fn test_textual_dates_normalize() {
    let doc = MemoryDocument::parse(
        "<body><dl><dt>Dates</dt><dd>From: Jan 5, 2024 To: February 10, 2024</dd></dl></body>",
        "https://example.test/",
    )
    .unwrap();
    let range = extract(&doc).date_range.expect("dates present");
    assert_eq!(range.from.as_deref(), Some("2024-01-05"));
    assert_eq!(range.to.as_deref(), Some("2024-02-10"));

    let doc = MemoryDocument::parse(
        "<body><dl><dt>Dates:</dt><dd>from: someday soon to: 2024-02-10</dd></dl></body>",
        "https://example.test/",
    )
    .unwrap();
    let range = extract(&doc).date_range.expect("dates present");
    assert_eq!(range.from.as_deref(), Some("someday soon"));
    assert_eq!(range.to.as_deref(), Some("2024-02-10"));
}

#[test]
fn test_derived_fields_and_buckets() {
    let record = extract(&page());
    let d = &record.derived;
    assert_eq!(d.entry_time.as_deref(), Some("09:35"));
    assert_eq!(d.exit_time.as_deref(), Some("15:15"));
    assert_eq!(d.vix_max, Some(30.0));
    assert_eq!(d.use_vix, Some(true));
    assert_eq!(d.profit_target, Some(50.0));
    assert_eq!(d.cap_profits, Some(true));
    assert_eq!(
        d.entry_days.as_deref(),
        Some(&["Monday".to_string(), "Wednesday".to_string()][..])
    );
    assert_eq!(d.max_contracts, None);

    assert!(record.metrics.get("Entry").is_some_and(|v| v.contains("Open trades")));
    assert!(record.metrics.get("Exit").is_some_and(|v| v.contains("Exit trades")));
    assert_eq!(record.metrics.get("Misc"), None);

    let json = record.to_value();
    assert!(json.get("maxContracts").is_none());
    assert_eq!(json["entryTime"], "09:35");
}

// ─────────────────────── apply ───────────────────────

#[test]
fn test_round_trip_restores_every_located_field() {
    let mut doc = page();
    let config = ApplyConfig::default();
    let record = extract(&doc);

    let report = apply_value(&mut doc, &record.to_value(), &config).expect("record is an object");
    assert_eq!(report.status, ApplyStatus::Applied, "skipped: {:?}", report.skipped);

    assert_eq!(value_of(&doc, "Start Date").as_deref(), Some("2024-01-05"));
    assert_eq!(value_of(&doc, "End Date").as_deref(), Some("2024-02-10"));
    assert_eq!(value_of(&doc, "Entry Time").as_deref(), Some("09:35"));
    assert_eq!(value_of(&doc, "Exit Time").as_deref(), Some("15:15"));
    assert_eq!(value_of(&doc, "Max VIX").as_deref(), Some("30"));
    assert_eq!(value_of(&doc, "Profit Target").as_deref(), Some("50"));
    assert_eq!(value_of(&doc, "Starting Funds").as_deref(), Some("100000"));
    assert_eq!(value_of(&doc, "Opening").as_deref(), Some("1.00"));

    let ticker = find_selector(&doc, "ticker", &config).unwrap();
    assert_eq!(doc.clean_text(ticker), "SPX");
    let mode = find_selector(&doc, "Profit Target", &config).unwrap();
    assert_eq!(doc.clean_text(mode), "%");

    let vix = find_labeled_switch(&doc, "Use VIX", &config).unwrap();
    assert_eq!(doc.attr(vix, "aria-checked"), Some("true"));
    let cap = find_labeled_switch(&doc, "Cap Profits", &config).unwrap();
    assert!(doc.attr(cap, "checked").is_some());

    let group = find_leg_groups(&doc, &config)[0];
    let sell = find_word_button(&doc, group, "Sell").unwrap();
    let put = find_word_button(&doc, group, "Put").unwrap();
    assert_eq!(doc.attr(sell, "aria-pressed"), Some("true"));
    assert_eq!(doc.attr(put, "aria-pressed"), Some("true"));
    let qty = find_leg_input(&doc, group, LegInput::Quantity).unwrap();
    let dte = find_leg_input(&doc, group, LegInput::DaysToExpiry).unwrap();
    assert_eq!(doc.value(qty).as_deref(), Some("1"));
    assert_eq!(doc.value(dte).as_deref(), Some("45"));

    let pressed = |day| {
        let button = find_weekday_button(&doc, day).unwrap();
        doc.attr(button, "aria-pressed") == Some("true")
    };
    assert!(pressed("Monday"));
    assert!(!pressed("Tuesday"));
    assert!(pressed("Wednesday"));
}

#[test]
fn test_second_apply_clicks_nothing() {
    let mut doc = page();
    let config = ApplyConfig::default();
    let json = extract(&doc).to_json_pretty();

    apply_text(&mut doc, &json, &config).unwrap();
    assert!(doc.mutations().iter().any(|m| m.kind == MutationKind::Click));
    doc.take_mutations();

    apply_text(&mut doc, &json, &config).unwrap();
    assert!(doc.mutations().iter().all(|m| m.kind != MutationKind::Click));
}

#[test]
fn test_malformed_input_mutates_nothing() {
    let mut doc = page();
    let result = apply_text(&mut doc, "not json", &ApplyConfig::default());
    assert_eq!(ApplyStatus::of(&result), ApplyStatus::ParseError);
    assert!(matches!(result, Err(ApplyError::InvalidJson(_))));
    assert!(doc.mutations().is_empty());
    assert_eq!(value_of(&doc, "Start Date"), None);
}

#[test]
fn test_input_shape_record() {
    let mut doc = page();
    let report = apply_text(
        &mut doc,
        r#"{
            "dates": {"from": "2023-06-01", "to": "2023-12-29"},
            "ticker": "QQQ",
            "legs": [{"side": "Buy", "type": "Call", "qty": 2, "dte": 14}],
            "startingFunds": "25000",
            "entrySlippage": 0.05
        }"#,
        &ApplyConfig::default(),
    )
    .unwrap();
    assert_eq!(report.status, ApplyStatus::AppliedPartial);
    assert_eq!(report.skipped, vec!["Entry Slippage".to_string()]);
    assert_eq!(value_of(&doc, "Start Date").as_deref(), Some("2023-06-01"));
    assert_eq!(value_of(&doc, "Starting Funds").as_deref(), Some("25000"));

    let ticker = find_selector(&doc, "ticker", &ApplyConfig::default()).unwrap();
    assert_eq!(doc.clean_text(ticker), "QQQ");
}
