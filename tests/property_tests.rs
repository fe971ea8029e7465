//! Property-based tests for the accumulators and the MySQL grammar

use proptest::prelude::*;
use table_migrations::core::command::Command;
use table_migrations::core::migration::sanitize_identity;
use table_migrations::grammars::QueryProducer;
use table_migrations::prelude::*;

fn identifier() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,15}"
}

// ============================================================================
// Blueprint Tests
// ============================================================================

proptest! {
    /// Implied commands come first (change, then add) and are added only once
    #[test]
    fn test_implied_commands_idempotent(
        added in proptest::collection::hash_set(identifier(), 0..5),
        changed in proptest::collection::hash_set(identifier(), 0..5),
        calls in 1usize..4,
    ) {
        let mut table = Blueprint::new("items");
        for name in &added {
            table.text(format!("a_{}", name));
        }
        for name in &changed {
            table.text(format!("c_{}", name)).change();
        }
        table.drop_column(&["legacy"]);

        for _ in 0..calls {
            table.add_implied_commands();
        }

        let mut expected = Vec::new();
        if !changed.is_empty() {
            expected.push("change");
        }
        if !added.is_empty() {
            expected.push("add");
        }
        expected.push("dropColumn");

        let names: Vec<_> = table.commands().iter().map(Command::name).collect();
        prop_assert_eq!(names, expected);
    }

    /// Creating a table never synthesizes add/change
    #[test]
    fn test_create_has_no_implied_commands(
        columns in proptest::collection::hash_set(identifier(), 1..6),
    ) {
        let mut table = Blueprint::new("items");
        table.create();
        for name in &columns {
            table.string(name.clone(), 50);
        }
        table.add_implied_commands();

        prop_assert_eq!(table.commands().len(), 1);
        let sql = table.to_sql(&MySqlGrammar::new("p_")).unwrap();
        prop_assert_eq!(sql.len(), 1);
        for name in &columns {
            let wrapped = format!("`{}` varchar(50) NOT NULL", name);
            prop_assert!(sql[0].contains(&wrapped));
        }
    }
}

// ============================================================================
// WHERE / LIMIT Tests
// ============================================================================

proptest! {
    /// Declaration order of the limit clause does not change the SQL
    #[test]
    fn test_limit_position_independent(
        key in identifier().prop_filter("not limit", |k| k != "limit"),
        value in "[a-z0-9 ']{0,20}",
        limit in 1u64..1000,
    ) {
        let grammar = MySqlGrammar::new("");
        let before = Query::new("t").find().limit(limit).where_eq(key.clone(), value.clone());
        let after = Query::new("t").find().where_eq(key.clone(), value.clone()).limit(limit);

        let before_sql = before.to_sql(&grammar).unwrap();
        let after_sql = after.to_sql(&grammar).unwrap();
        prop_assert_eq!(&before_sql, &after_sql);

        let limit_suffix = format!(" LIMIT {}", limit);
        prop_assert!(before_sql[0].ends_with(&limit_suffix));
        prop_assert_eq!(before_sql[0].matches("LIMIT").count(), 1);
    }

    /// Quoted literals always have balanced quotes
    #[test]
    fn test_literal_quotes_are_doubled(value in ".{0,30}") {
        let grammar = MySqlGrammar::new("");
        let query = Query::new("t").where_eq("k", value.clone());
        let clause = grammar.compile_where(&query);

        let expected = format!(" WHERE `k` = '{}'", value.replace('\'', "''"));
        prop_assert_eq!(clause, expected);
    }

    /// N predicates are joined by N - 1 operators
    #[test]
    fn test_predicate_joining(
        keys in proptest::collection::btree_set(identifier(), 1..6),
        or in any::<bool>(),
    ) {
        let mut query = Query::new("t");
        for key in &keys {
            query = query.where_eq(key.clone(), 1);
        }
        if or {
            query = query.or_where();
        }

        let clause = MySqlGrammar::new("").compile_where(&query);
        let operator = if or { " OR " } else { " AND " };
        prop_assert_eq!(clause.matches(operator).count(), keys.len() - 1);
        prop_assert_eq!(query.where_operator().as_sql(), operator.trim());
    }
}

// ============================================================================
// Identity Tests
// ============================================================================

proptest! {
    /// Sanitized names are lower-case, dash-separated and never start or end with a dash
    #[test]
    fn test_sanitize_identity_shape(identity in "[ -~]{0,40}") {
        let name = sanitize_identity(&identity);

        prop_assert!(!name.starts_with('-'));
        prop_assert!(!name.ends_with('-'));
        prop_assert!(!name.contains("--"));
        prop_assert!(name.chars().all(|c| c == '-' || c.is_alphanumeric()));
        prop_assert_eq!(sanitize_identity(&name), name.clone());
    }
}
