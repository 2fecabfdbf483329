use postwatch::render::{Trend, build_card, build_cards, trend, updated_line};
use postwatch::state::{Comparison, DeltaValue, Entry, GenderDetail, Snapshot};

fn entry(name: &str, count: u64) -> Entry {
    Entry {
        display_name: name.to_string(),
        count,
        url: None,
        image_url: None,
        gender: None,
        comparison: None,
    }
}

fn delta(diff: f64, diff_text: &str, rate_text: &str) -> DeltaValue {
    DeltaValue {
        diff,
        diff_text: diff_text.to_string(),
        rate_text: rate_text.to_string(),
    }
}

#[test]
fn builds_one_card_per_entry_in_snapshot_order() {
    let snapshot = Snapshot {
        last_updated: "2025-07-01 09:00:00".to_string(),
        entries: vec![entry("A", 5), entry("B", 0), entry("C", 12)],
    };

    let cards = build_cards(&snapshot);
    assert_eq!(cards.len(), 3);
    let titles: Vec<&str> = cards.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, ["A", "B", "C"]);
    assert_eq!(updated_line(&snapshot), "Updated: 2025-07-01 09:00:00");
}

#[test]
fn plain_entry_renders_name_and_count_only() {
    let card = build_card(&entry("A", 5));
    assert_eq!(card.title, "A");
    assert_eq!(card.count_text, "5 posts");
    assert!(card.gender_line.is_none());
    assert!(card.ratio_line.is_none());
    assert!(card.comparison_rows.is_empty());
}

#[test]
fn gender_entry_renders_subcounts_and_verbatim_ratio() {
    let mut e = entry("Cedar Room", 6);
    e.gender = Some(GenderDetail {
        male: 3,
        female: 2,
        unknown: 1,
        ratio: "3:2:1".to_string(),
    });

    let card = build_card(&e);
    assert_eq!(card.gender_line.as_deref(), Some("M 3 / F 2 / ? 1"));
    assert_eq!(card.ratio_line.as_deref(), Some("ratio 3:2:1"));
}

#[test]
fn trend_classification_follows_diff_sign() {
    assert_eq!(trend(7.0), Trend::Up);
    assert_eq!(trend(-4.0), Trend::Down);
    assert_eq!(trend(0.0), Trend::Flat);
}

#[test]
fn comparison_rows_carry_trend_and_formatted_value() {
    let mut e = entry("A", 5);
    e.comparison = Some(Comparison {
        vs_yesterday: delta(-4.0, "-4", "-10%"),
        vs_last_week: delta(0.0, "+0", "0%"),
    });

    let card = build_card(&e);
    assert_eq!(card.comparison_rows.len(), 2);

    let day = &card.comparison_rows[0];
    assert_eq!(day.label, "vs yesterday");
    assert_eq!(day.value, "-4 (-10%)");
    assert_eq!(day.trend, Trend::Down);

    let week = &card.comparison_rows[1];
    assert_eq!(week.label, "vs last week");
    assert_eq!(week.trend, Trend::Flat);
}
