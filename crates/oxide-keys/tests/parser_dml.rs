//! Statement parser tests: statement forms, table names and RETURNING detection.

use oxide_keys::{DmlParser, StatementKind, StatementModel, StatementParser};

fn parse(sql: &str) -> StatementModel {
    DmlParser::new()
        .parse_insert_statement(sql)
        .unwrap_or_else(|e| panic!("failed to parse {sql:?}: {e}"))
}

fn rejects(sql: &str) -> bool {
    DmlParser::new().parse_insert_statement(sql).is_err()
}

#[test]
fn insert_forms() {
    for sql in [
        "INSERT INTO customer (name) VALUES (?)",
        "insert into customer values (1, 'a')",
        "INSERT INTO customer DEFAULT VALUES",
        "INSERT INTO customer (name) SELECT name FROM prospect",
        "INSERT INTO customer WITH x AS (SELECT 1 AS n FROM rdb$database) SELECT n FROM x",
    ] {
        let stmt = parse(sql);
        assert_eq!(stmt.kind(), StatementKind::Insert, "{sql}");
        assert_eq!(stmt.table_name().to_ascii_uppercase(), "CUSTOMER", "{sql}");
        assert!(!stmt.has_returning(), "{sql}");
    }
}

#[test]
fn schema_qualified_table() {
    let stmt = parse("INSERT INTO app.\"Orders\" (id) VALUES (1)");
    assert_eq!(stmt.schema(), Some("app"));
    assert_eq!(stmt.table_name(), "\"Orders\"");
}

#[test]
fn quoted_identifiers_with_escaped_quotes() {
    let stmt = parse("DELETE FROM \"odd\"\"name\" WHERE 1 = 1");
    assert_eq!(stmt.table_name(), "\"odd\"\"name\"");
}

#[test]
fn update_forms() {
    let stmt = parse("UPDATE customer AS c SET c.name = 'x' WHERE c.id = ?");
    assert_eq!(stmt.kind(), StatementKind::Update);
    assert_eq!(stmt.table_name(), "customer");

    let stmt = parse("update customer set name = 'x'");
    assert_eq!(stmt.kind(), StatementKind::Update);
}

#[test]
fn update_or_insert() {
    let stmt = parse("UPDATE OR INSERT INTO t (id) VALUES (1) MATCHING (id) RETURNING id");
    assert_eq!(stmt.kind(), StatementKind::UpdateOrInsert);
    assert_eq!(stmt.table_name(), "t");
    assert!(stmt.has_returning());
}

#[test]
fn delete_with_alias() {
    let stmt = parse("DELETE FROM customer c WHERE c.id = 1");
    assert_eq!(stmt.kind(), StatementKind::Delete);
    assert_eq!(stmt.table_name(), "customer");
}

#[test]
fn returning_detection() {
    assert!(parse("INSERT INTO t (a) VALUES (1) RETURNING a").has_returning());
    assert!(parse("delete from t returning id;").has_returning());
    assert!(parse("UPDATE t SET a = 1 RETURNING OLD.a, NEW.a").has_returning());

    // Only top-level RETURNING counts
    assert!(!parse("INSERT INTO t (a) VALUES ((SELECT returning FROM u))").has_returning());
    // Inside literals and comments
    assert!(!parse("INSERT INTO t (a) VALUES ('RETURNING')").has_returning());
    assert!(!parse("DELETE FROM t -- RETURNING id").has_returning());
    assert!(!parse("DELETE FROM t /* RETURNING id */").has_returning());
    assert!(!parse("DELETE FROM t WHERE \"RETURNING\" = 1").has_returning());
}

#[test]
fn parameters_and_operators_in_body() {
    let stmt = parse("UPDATE t SET a = a || :name, b = ? * 2 WHERE c <> 1.5e3 AND d >= -1");
    assert_eq!(stmt.kind(), StatementKind::Update);
    assert!(!stmt.has_returning());
}

#[test]
fn numeric_literals_of_any_precision() {
    let stmt = parse("INSERT INTO t (a, b) VALUES (123456789012345678901234567890, 1.5e-400)");
    assert_eq!(stmt.kind(), StatementKind::Insert);
    assert!(!stmt.has_returning());
}

#[test]
fn negated_comparison_operators() {
    for op in ["!=", "!<", "!>", "^=", "^<", "^>", "~=", "~<", "~>"] {
        let sql = format!("DELETE FROM t WHERE id {op} 5 RETURNING id");
        let stmt = parse(&sql);
        assert_eq!(stmt.kind(), StatementKind::Delete, "{sql}");
        assert!(stmt.has_returning(), "{sql}");
    }
    assert!(rejects("DELETE FROM t WHERE NOT ! id"));
}

#[test]
fn rejected_statements() {
    assert!(rejects(""));
    assert!(rejects("SELECT * FROM t"));
    assert!(rejects("EXECUTE PROCEDURE p"));
    assert!(rejects("MERGE INTO t USING u ON t.id = u.id WHEN MATCHED THEN DELETE"));
    assert!(rejects("INSERT t VALUES (1)"));
    assert!(rejects("INSERT INTO t"));
    assert!(rejects("UPDATE t"));
    assert!(rejects("DELETE t"));
    assert!(rejects("INSERT INTO t VALUES (1, 'unterminated)"));
    assert!(rejects("INSERT INTO \"\" VALUES (1)"));
    assert!(rejects("DELETE FROM t; DELETE FROM u"));
}
