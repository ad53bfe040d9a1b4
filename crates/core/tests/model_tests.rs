// ═══════════════════════════════════════════════════════════════════
// Model Tests — FieldValue detection, Asset/Portfolio, Settings, views
// ═══════════════════════════════════════════════════════════════════

use serde_json::json;
use uuid::Uuid;

use privatefolio_core::crypto::{FieldCodec, KdfParams, KeyDeriver};
use privatefolio_core::models::asset::Asset;
use privatefolio_core::models::field::FieldValue;
use privatefolio_core::models::portfolio::Portfolio;
use privatefolio_core::models::settings::{Settings, WritePolicy};
use privatefolio_core::models::view::{
    FieldReading, LockReason, PortfolioView, PositionView, LOCKED_PLACEHOLDER,
};

fn encrypted_value(amount: f64) -> FieldValue {
    let key = KeyDeriver::new(KdfParams::Pbkdf2Sha256 { iterations: 1_000 })
        .derive("p1", "alice")
        .unwrap();
    FieldValue::Encrypted(FieldCodec::encrypt_amount(amount, &key).unwrap())
}

// ═══════════════════════════════════════════════════════════════════
// FieldValue — structural detection
// ═══════════════════════════════════════════════════════════════════

mod field_value_detect {
    use super::*;

    #[test]
    fn stringified_number_is_plain() {
        assert_eq!(FieldValue::detect("42.0"), FieldValue::Plain(42.0));
        assert_eq!(FieldValue::detect(" 7 "), FieldValue::Plain(7.0));
        assert_eq!(FieldValue::detect("-1.5e3"), FieldValue::Plain(-1500.0));
    }

    #[test]
    fn well_formed_ciphertext_is_encrypted() {
        let wire = match encrypted_value(1.0) {
            FieldValue::Encrypted(f) => f.to_string(),
            other => panic!("Expected Encrypted, got {:?}", other),
        };
        assert!(matches!(FieldValue::detect(&wire), FieldValue::Encrypted(_)));
    }

    #[test]
    fn separator_with_bad_hex_is_invalid() {
        let v = FieldValue::detect("notvalidhex:zz");
        assert_eq!(v, FieldValue::Invalid("notvalidhex:zz".into()));
        assert!(v.is_encrypted());
    }

    #[test]
    fn non_numeric_text_is_invalid_but_not_encrypted() {
        let v = FieldValue::detect("lots");
        assert_eq!(v, FieldValue::Invalid("lots".into()));
        assert!(!v.is_encrypted());
    }

    #[test]
    fn non_finite_text_is_invalid() {
        assert!(matches!(FieldValue::detect("NaN"), FieldValue::Invalid(_)));
        assert!(matches!(FieldValue::detect("inf"), FieldValue::Invalid(_)));
    }

    #[test]
    fn is_plain() {
        assert!(FieldValue::Plain(1.0).is_plain());
        assert!(!encrypted_value(1.0).is_plain());
        assert!(!FieldValue::Invalid("x".into()).is_plain());
    }
}

// ═══════════════════════════════════════════════════════════════════
// FieldValue — serde against the untyped slot
// ═══════════════════════════════════════════════════════════════════

mod field_value_serde {
    use super::*;

    #[test]
    fn plain_serializes_as_number() {
        let json = serde_json::to_value(FieldValue::Plain(42.5)).unwrap();
        assert_eq!(json, json!(42.5));
    }

    #[test]
    fn encrypted_serializes_as_string() {
        let value = encrypted_value(3.0);
        let json = serde_json::to_value(&value).unwrap();
        let s = json.as_str().expect("ciphertext is stored as a string");
        assert!(FieldCodec::is_encrypted(s));

        let back: FieldValue = serde_json::from_value(json).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn integer_number_reads_as_plain() {
        let v: FieldValue = serde_json::from_value(json!(42)).unwrap();
        assert_eq!(v, FieldValue::Plain(42.0));
    }

    #[test]
    fn legacy_string_number_reads_as_plain() {
        let v: FieldValue = serde_json::from_value(json!("42.0")).unwrap();
        assert_eq!(v, FieldValue::Plain(42.0));
    }

    #[test]
    fn null_reads_as_invalid() {
        let v: FieldValue = serde_json::from_value(json!(null)).unwrap();
        assert_eq!(v, FieldValue::Invalid(json!(null)));
    }

    #[test]
    fn non_text_slots_are_written_back_unchanged() {
        for raw in [json!(null), json!(true), json!({"amount": 3}), json!([1, 2])] {
            let v: FieldValue = serde_json::from_value(raw.clone()).unwrap();
            assert!(matches!(v, FieldValue::Invalid(_)));
            assert!(!v.is_encrypted());
            assert_eq!(serde_json::to_value(&v).unwrap(), raw);
        }
    }

    #[test]
    fn invalid_text_is_kept_verbatim() {
        let json = serde_json::to_value(FieldValue::Invalid("abc:xyz".into())).unwrap();
        assert_eq!(json, json!("abc:xyz"));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Asset / Portfolio
// ═══════════════════════════════════════════════════════════════════

mod asset {
    use super::*;

    #[test]
    fn new_uppercases_and_trims_symbol() {
        let a = Asset::new(Uuid::new_v4(), "  btc ", FieldValue::Plain(1.0), FieldValue::Plain(2.0));
        assert_eq!(a.symbol, "BTC");
    }

    #[test]
    fn ids_are_unique() {
        let pid = Uuid::new_v4();
        let a = Asset::new(pid, "A", FieldValue::Plain(1.0), FieldValue::Plain(1.0));
        let b = Asset::new(pid, "A", FieldValue::Plain(1.0), FieldValue::Plain(1.0));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn row_keeps_fields_in_same_slots() {
        let a = Asset::new(Uuid::new_v4(), "ETH", FieldValue::Plain(2.0), encrypted_value(1800.0));
        let row = serde_json::to_value(&a).unwrap();
        assert!(row["quantity"].is_number());
        assert!(row["cost_basis"].is_string());
        assert_eq!(row["symbol"], "ETH");
    }

    #[test]
    fn legacy_row_deserializes() {
        let row = json!({
            "id": Uuid::new_v4(),
            "portfolio_id": Uuid::new_v4(),
            "symbol": "AAPL",
            "quantity": "42.0",
            "cost_basis": 150,
            "created_at": "2025-01-15T12:00:00Z"
        });
        let a: Asset = serde_json::from_value(row).unwrap();
        assert_eq!(a.quantity, FieldValue::Plain(42.0));
        assert_eq!(a.cost_basis, FieldValue::Plain(150.0));
    }

    #[test]
    fn unix_seconds_created_at() {
        let row = json!({
            "id": Uuid::new_v4(),
            "portfolio_id": Uuid::new_v4(),
            "symbol": "AAPL",
            "quantity": 1,
            "cost_basis": 2,
            "created_at": 1_700_000_000
        });
        let a: Asset = serde_json::from_value(row).unwrap();
        assert_eq!(a.created_at.timestamp(), 1_700_000_000);

        // written back as RFC 3339
        assert!(serde_json::to_value(&a).unwrap()["created_at"].is_string());
    }

    #[test]
    fn missing_slots_and_timestamp_default() {
        let row = json!({ "id": Uuid::new_v4(), "portfolio_id": Uuid::new_v4(), "symbol": "X" });
        let a: Asset = serde_json::from_value(row).unwrap();
        assert_eq!(a.quantity, FieldValue::missing());
        assert_eq!(a.cost_basis, FieldValue::missing());
        assert_eq!(a.created_at.timestamp(), 0);
    }

    #[test]
    fn unreadable_row_stand_in_keeps_raw_slots() {
        let (id, pid) = (Uuid::new_v4(), Uuid::new_v4());
        let row = json!({ "symbol": 7, "quantity": "1.5" });
        let a = Asset::from_unreadable_row(id, pid, &row);
        assert_eq!(a.id, id);
        assert_eq!(a.portfolio_id, pid);
        assert_eq!(a.symbol, "");
        assert_eq!(a.quantity, FieldValue::Invalid(json!("1.5")));
        assert_eq!(a.cost_basis, FieldValue::missing());
    }
}

mod portfolio {
    use super::*;

    #[test]
    fn default_currency_is_usd() {
        let p = Portfolio::new("alice", "Main", None);
        assert_eq!(p.currency, "USD");
        assert_eq!(p.owner, "alice");
        assert_eq!(p.name, "Main");
    }

    #[test]
    fn currency_is_normalized() {
        let p = Portfolio::new("alice", "Main", Some(" eur ".into()));
        assert_eq!(p.currency, "EUR");
    }

    #[test]
    fn blank_currency_falls_back_to_usd() {
        let p = Portfolio::new("alice", "Main", Some("  ".into()));
        assert_eq!(p.currency, "USD");
    }

    #[test]
    fn missing_currency_in_row_defaults() {
        let row = json!({
            "id": Uuid::new_v4(),
            "owner": "alice",
            "name": "Old",
            "created_at": "2025-01-15T12:00:00Z"
        });
        let p: Portfolio = serde_json::from_value(row).unwrap();
        assert_eq!(p.currency, "USD");
    }
}

// ═══════════════════════════════════════════════════════════════════
// Settings
// ═══════════════════════════════════════════════════════════════════

mod settings {
    use super::*;

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.default_currency, "USD");
        assert_eq!(s.kdf, KdfParams::default());
        assert_eq!(s.write_policy, WritePolicy::PlaintextFallback);
    }

    #[test]
    fn from_json_partial_document() {
        let s = Settings::from_json(r#"{"write_policy":"require_key"}"#).unwrap();
        assert_eq!(s.write_policy, WritePolicy::RequireKey);
        assert_eq!(s.default_currency, "USD");
        assert_eq!(s.kdf, KdfParams::default());
    }

    #[test]
    fn from_json_full_document() {
        let s = Settings::from_json(
            r#"{
                "default_currency": "PLN",
                "kdf": {"algorithm": "pbkdf2_sha256", "iterations": 5000},
                "write_policy": "plaintext_fallback"
            }"#,
        )
        .unwrap();
        assert_eq!(s.default_currency, "PLN");
        assert_eq!(s.kdf, KdfParams::Pbkdf2Sha256 { iterations: 5000 });
    }

    #[test]
    fn from_json_rejects_garbage() {
        let err = Settings::from_json("{not json").unwrap_err();
        assert!(matches!(
            err,
            privatefolio_core::errors::CoreError::Deserialization(_)
        ));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Views
// ═══════════════════════════════════════════════════════════════════

mod views {
    use super::*;

    fn position(quantity: FieldReading, cost_basis: FieldReading) -> PositionView {
        PositionView {
            asset_id: Uuid::new_v4(),
            symbol: "BTC".into(),
            quantity,
            cost_basis,
            encrypted: true,
        }
    }

    #[test]
    fn reading_values() {
        assert_eq!(FieldReading::Plain(1.5).value(), Some(1.5));
        assert_eq!(FieldReading::Decrypted(2.5).value(), Some(2.5));
        assert_eq!(FieldReading::Locked(LockReason::NoKey).value(), None);
    }

    #[test]
    fn every_lock_reason_displays_the_same() {
        for reason in [
            LockReason::NoKey,
            LockReason::Malformed,
            LockReason::AuthenticationFailure,
            LockReason::Corrupted,
        ] {
            assert_eq!(FieldReading::Locked(reason).display(), LOCKED_PLACEHOLDER);
        }
    }

    #[test]
    fn readable_display() {
        assert_eq!(FieldReading::Plain(42.0).display(), "42.0");
        assert_eq!(FieldReading::Decrypted(12.5).display(), "12.5");
        assert_eq!(FieldReading::Decrypted(-0.25).display(), "-0.25");
    }

    #[test]
    fn lock_reason_display_for_logs() {
        assert_eq!(LockReason::AuthenticationFailure.to_string(), "authentication failure");
        assert_eq!(LockReason::NoKey.to_string(), "no key");
    }

    #[test]
    fn position_total_cost() {
        let p = position(FieldReading::Decrypted(2.0), FieldReading::Plain(150.0));
        assert_eq!(p.total_cost(), Some(300.0));

        let locked = position(
            FieldReading::Decrypted(2.0),
            FieldReading::Locked(LockReason::NoKey),
        );
        assert_eq!(locked.total_cost(), None);
    }

    #[test]
    fn portfolio_view_completeness() {
        let view = PortfolioView {
            portfolio_id: Uuid::new_v4(),
            name: "Main".into(),
            currency: "USD".into(),
            positions: vec![],
            total_cost: 0.0,
            locked_count: 0,
        };
        assert!(view.is_complete());

        let partial = PortfolioView {
            locked_count: 1,
            ..view
        };
        assert!(!partial.is_complete());
    }
}
