use finroute_core::data::{Table, Value};
use finroute_core::router::{is_affirmative, parse_label};
use finroute_core::Classification;
use proptest::prelude::*;

proptest! {
    #[test]
    fn label_parsing_never_panics(s in ".{0,200}") {
        let label = parse_label(&s);
        prop_assert!(matches!(label, Classification::Analytical | Classification::General));
    }

    #[test]
    fn labelless_replies_are_general(s in "[0-9 .,!?xyz]{0,80}") {
        prop_assert_eq!(parse_label(&s), Classification::General);
    }

    #[test]
    fn leading_analytical_label_wins(suffix in "[a-z ]{0,60}") {
        let reply = format!("Analytical. {}", suffix);
        prop_assert_eq!(parse_label(&reply), Classification::Analytical);
    }

    #[test]
    fn gate_rejects_replies_without_yes_word(reply in "[a-xzA-XZ .,!:']{0,60}") {
        prop_assert!(!is_affirmative(&reply));
    }

    #[test]
    fn gate_ignores_echoed_choice(rest in "[a-xz .,:]{0,40}") {
        let reply = format!("y/n: {}", rest);
        prop_assert!(!is_affirmative(&reply));
    }

    #[test]
    fn gate_accepts_yes_anywhere(prefix in "[a-xz ]{0,20}", rest in "[ .,!][a-z ]{0,40}") {
        let yes = format!("{} yes{}", prefix, rest);
        let y = format!("{} Y{}", prefix, rest);
        prop_assert!(is_affirmative(&yes));
        prop_assert!(is_affirmative(&y));
    }

    #[test]
    fn finite_numbers_parse_as_numbers(n in -1.0e12f64..1.0e12f64) {
        prop_assert_eq!(Value::parse(&n.to_string()), Value::Number(n));
    }

    #[test]
    fn csv_rows_keep_column_count(cells in prop::collection::vec("[a-z0-9]{0,6}", 1..6)) {
        let header = (0..4).map(|i| format!("c{}", i)).collect::<Vec<_>>().join(",");
        let csv = format!("{}\n{}\n", header, cells.join(","));
        let table = Table::from_csv_str("t", &csv).unwrap();
        for row in &table.rows {
            prop_assert_eq!(row.len(), 4);
        }
    }
}
