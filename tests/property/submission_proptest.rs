//! Property-based tests for submission validation

use chrono::{FixedOffset, TimeZone};
use proptest::prelude::*;
use price_survey::shared::{GeoFix, ProductLine, ProductName, SubmissionDraft};

fn product() -> impl Strategy<Value = ProductName> {
    prop::sample::select(ProductName::ALL.to_vec())
}

fn name() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z ]{1,30}[A-Za-z]"
}

fn draft(customer: String, outlet: String, area: String, items: Vec<ProductLine>) -> SubmissionDraft {
    SubmissionDraft::new(customer, outlet, area, items)
}

proptest! {
    #[test]
    fn test_positive_prices_validate(
        customer in name(),
        outlet in name(),
        area in name(),
        lines in prop::collection::vec((product(), 0.01f64..1e6, 0.01f64..1e6), 1..6),
    ) {
        let items = lines
            .into_iter()
            .map(|(p, buy, sell)| ProductLine::new(p, buy, sell))
            .collect();
        prop_assert!(draft(customer, outlet, area, items).validate().is_ok());
    }

    #[test]
    fn test_non_positive_price_names_the_line(
        index in 0usize..4,
        bad in prop_oneof![Just(0.0f64), -1e6f64..0.0, Just(f64::NAN)],
    ) {
        let mut items: Vec<ProductLine> = (0..4)
            .map(|_| ProductLine::new(ProductName::Nbc40cl, 100.0, 120.0))
            .collect();
        items[index].sell_price = bad;

        let err = draft("Ada Obi".into(), "Mama Put".into(), "Ikeja".into(), items)
            .validate()
            .unwrap_err();
        let field = format!("items.{}.sellPrice", index);
        prop_assert!(err.issues().iter().any(|i| i.field == field));
        prop_assert_eq!(err.issues().len(), 1);
    }

    #[test]
    fn test_short_names_rejected(outlet in "[A-Za-z]?", pad in " {0,3}") {
        let d = draft(
            "Ada Obi".into(),
            format!("{}{}{}", pad, outlet, pad),
            "Ikeja".into(),
            vec![ProductLine::new(ProductName::Sbc40cl, 150.0, 200.0)],
        );
        let err = d.validate().unwrap_err();
        prop_assert!(err.issues().iter().any(|i| i.field == "outletName"));
    }

    #[test]
    fn test_geo_range_checked(lat in -200.0f64..200.0, lng in -400.0f64..400.0) {
        let d = draft(
            "Ada Obi".into(),
            "Mama Put".into(),
            "Ikeja".into(),
            vec![ProductLine::new(ProductName::Sbc40cl, 150.0, 200.0)],
        )
        .with_geo(GeoFix { lat, lng, accuracy: None });

        let in_range = (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng);
        prop_assert_eq!(d.validate().is_ok(), in_range);
    }

    #[test]
    fn test_collection_day_uses_own_offset(
        offset_hours in -11i32..=13,
        secs in 1_700_000_000i64..1_900_000_000,
    ) {
        let offset = FixedOffset::east_opt(offset_hours * 3600).unwrap();
        let at = offset.timestamp_opt(secs, 0).unwrap();
        let d = draft(
            "Ada Obi".into(),
            "Mama Put".into(),
            "Ikeja".into(),
            vec![ProductLine::new(ProductName::Sbc40cl, 150.0, 200.0)],
        )
        .with_collected_at(at);

        prop_assert_eq!(d.collection_day(), at.format("%Y-%m-%d").to_string());
    }

    #[test]
    fn test_normalized_is_idempotent(
        outlet in " {0,3}[A-Za-z ]{0,12} {0,3}",
        phone in prop::option::of(" {0,2}[0-9]{0,11} {0,2}"),
    ) {
        let mut d = draft(
            "Ada Obi".into(),
            outlet,
            "Ikeja".into(),
            vec![ProductLine::new(ProductName::Sbc40cl, 150.0, 200.0)],
        );
        d.customer_phone = phone;

        let once = d.normalized();
        let twice = once.clone().normalized();
        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(once.outlet_name.trim(), once.outlet_name.as_str());
        prop_assert!(once.customer_phone.as_deref() != Some(""));
    }
}
