//! Integration tests: layout + data → resolved text, images and bounds.

use card_core::binding::{DefaultTable, resolve_image, resolve_text};
use card_core::config::EngineConfig;
use card_core::coords::{ScreenMapping, percent_to_px, to_percent};
use card_core::id::ElementKey;
use card_core::import::{build_layout, parse_imported};
use card_core::layout::{EstimateMeasure, resolve_bounds};
use card_core::lint::{LintSeverity, lint_layout};
use card_core::model::*;
use card_core::parser::{parse_data, parse_layout};
use card_core::store::{MemoryStore, TemplateStore};

const LAYOUT: &str = include_str!("fixtures/classic_layout.json");
const DATA: &str = include_str!("fixtures/classic_data.json");

fn key(s: &str) -> ElementKey {
    ElementKey::intern(s)
}

// ─── Coordinates ─────────────────────────────────────────────────────────

#[test]
fn groom_percentages_match_css_placement() {
    let doc = parse_layout(LAYOUT).unwrap();
    let groom = doc.get(key("groom")).unwrap();
    assert_eq!(to_percent(groom.x, doc.canvas.width).to_string(), "7.164%");
    assert_eq!(to_percent(groom.y, doc.canvas.height).to_string(), "76.699%");
    let back = percent_to_px(to_percent(groom.x, doc.canvas.width), doc.canvas.width);
    assert!((back - 24.0).abs() < 1e-9);
}

#[test]
fn screen_mapping_for_half_size_preview() {
    let doc = parse_layout(LAYOUT).unwrap();
    let mapping = ScreenMapping {
        origin_x: 10.0,
        origin_y: 10.0,
        width_px: 167.5,
        height_px: 257.5,
    };
    assert_eq!(mapping.to_canvas(22.0, 207.5, &doc.canvas), (24.0, 395.0));
}

// ─── Binding ─────────────────────────────────────────────────────────────

#[test]
fn data_then_defaults_then_echo() {
    let data = parse_data(DATA).unwrap();
    let defaults = DefaultTable::builtin();
    assert_eq!(resolve_text("groom", &data, &defaults), "김민수");
    assert_eq!(resolve_text("separator", &data, &defaults), "&");
    assert_eq!(resolve_text("mysteryField", &data, &defaults), "mysteryField");
}

#[test]
fn images_resolve_through_aliases() {
    let data = parse_data(DATA).unwrap();
    assert_eq!(
        resolve_image("background", &data).as_deref(),
        Some("https://cdn.example.com/cards/classic/bg.png")
    );
    assert_eq!(resolve_image("decoration", &data), None);
}

// ─── Bounds ──────────────────────────────────────────────────────────────

#[test]
fn classic_bounds() {
    let doc = parse_layout(LAYOUT).unwrap();
    let data = parse_data(DATA).unwrap();
    let bounds = resolve_bounds(&doc, &data, &EngineConfig::default(), &EstimateMeasure);

    assert_eq!(bounds[&key("background")], doc.canvas.bounds());
    assert_eq!(bounds[&key("separator")].x, 157.5);
    assert_eq!(bounds[&key("bride")].x, 193.0);
    // Two lines of 13px at line-height 1.5.
    assert_eq!(bounds[&key("date")].height, 39.0);
    assert!(!bounds.contains_key(&key("sparkle")));
    assert!(!bounds.contains_key(&key("notes")));
}

// ─── Lint ────────────────────────────────────────────────────────────────

#[test]
fn classic_lint_findings() {
    let doc = parse_layout(LAYOUT).unwrap();
    let data = parse_data(DATA).unwrap();
    let diags = lint_layout(&doc, &data, &EngineConfig::default());

    let warnings: Vec<(&str, &str)> = diags
        .iter()
        .filter(|d| d.severity == LintSeverity::Warning)
        .map(|d| (d.rule, d.key.as_str()))
        .collect();
    assert_eq!(warnings, [("malformed-element", "notes")]);
    assert!(diags.iter().any(|d| d.rule == "unknown-type" && d.key == key("sparkle")));
    assert!(diags.iter().any(|d| d.rule == "unresolved-binding" && d.key == key("decoration")));
}

// ─── Import ──────────────────────────────────────────────────────────────

#[test]
fn import_fixture_builds_layout() {
    let elements = parse_imported(include_str!("fixtures/import_elements.json")).unwrap();
    let doc = build_layout(Canvas::new(335.0, 515.0).unwrap(), &elements, &EngineConfig::default());

    let keys: Vec<&str> = doc.keys().map(|k| k.as_str()).collect();
    assert_eq!(
        keys,
        ["background", "mainPhoto", "groom", "separator", "bride", "decoration", "decoration2"]
    );

    // 158 + 10 = 168, within tolerance of 167.5.
    let separator = doc.get(key("separator")).unwrap();
    assert_eq!(separator.x, 167.5);
    assert!(separator.text().unwrap().center_align);

    let groom = doc.get(key("groom")).unwrap();
    assert_eq!(groom.text().unwrap().align, Some(TextAlign::Right));
    assert_eq!(groom.text().unwrap().font_weight.as_deref(), Some("700"));
    assert!(!groom.text().unwrap().center_align);
}

// ─── Store ───────────────────────────────────────────────────────────────

#[test]
fn store_round_trip_keeps_quarantined_entries() {
    let mut store = MemoryStore::new();
    store.insert_json("classic", LAYOUT, DATA);
    let bundle = store.load("classic").unwrap();
    assert_eq!(bundle.malformed_keys(), ["notes"]);

    store.save("classic", &bundle).unwrap();
    let (layout, _) = store.json("classic").unwrap();
    assert_eq!(layout, LAYOUT);
}
