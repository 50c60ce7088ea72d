use pggen::{
    count_clause, limit_offset_clause, select_clause, Direction, Filter, QueryError,
    SelectOptions, SelectResult, SqlValue,
};

#[test]
fn test_filter_and_order_clause() {
    let options = SelectOptions::new()
        .filter(Filter::new("tier", "!=", "free"))
        .order_by(Direction::parse("name", "asc").unwrap());

    let clause = select_clause(Some(&options)).unwrap();

    assert_eq!(clause.sql, " WHERE \"tier\" != $1 ORDER BY name ASC");
    assert_eq!(clause.values, vec![SqlValue::Text("free".to_string())]);
}

#[test]
fn test_placeholders_follow_filter_order() {
    let options = SelectOptions::new()
        .filter(Filter::eq("owner_id", 7i64))
        .filter(Filter::new("name", "like", "a%"))
        .filter(Filter::gte("score", 1.5f64));

    let clause = count_clause(Some(&options)).unwrap();

    assert_eq!(
        clause.sql,
        " WHERE \"owner_id\" = $1 AND \"name\" LIKE $2 AND \"score\" >= $3"
    );
    assert_eq!(
        clause.values,
        vec![
            SqlValue::Int(7),
            SqlValue::Text("a%".to_string()),
            SqlValue::Float(1.5),
        ]
    );
}

#[test]
fn test_count_clause_ignores_order_and_pagination() {
    let options = SelectOptions::new()
        .filter(Filter::eq("active", true))
        .order_by(Direction::desc("created_at"))
        .limit(10)
        .offset(20);

    let count = count_clause(Some(&options)).unwrap();
    assert_eq!(count.sql, " WHERE \"active\" = $1");

    let select = select_clause(Some(&options)).unwrap();
    assert_eq!(
        select.sql,
        " WHERE \"active\" = $1 ORDER BY created_at DESC LIMIT 10 OFFSET 20"
    );
    assert_eq!(select.values, count.values);
}

#[test]
fn test_empty_options_behave_like_none() {
    let empty = SelectOptions::new();

    for clause in [
        select_clause(Some(&empty)).unwrap(),
        select_clause(None).unwrap(),
        count_clause(Some(&empty)).unwrap(),
        count_clause(None).unwrap(),
    ] {
        assert!(clause.is_empty(), "expected empty clause, got {:?}", clause);
    }
}

#[test]
fn test_zero_limit_and_offset_are_omitted() {
    assert_eq!(limit_offset_clause(Some(0), Some(0)), "");
    assert_eq!(limit_offset_clause(None, Some(5)), " OFFSET 5");
    assert_eq!(limit_offset_clause(Some(5), None), " LIMIT 5");

    let options = SelectOptions::new().limit(0).offset(3);
    assert_eq!(select_clause(Some(&options)).unwrap().sql, " OFFSET 3");
}

#[test]
fn test_multiple_order_terms() {
    let options = SelectOptions::new()
        .order_by(Direction::asc("tier"))
        .order_by(Direction::desc("name"));

    assert_eq!(
        select_clause(Some(&options)).unwrap().sql,
        " ORDER BY tier ASC, name DESC"
    );
}

#[test]
fn test_invalid_order_column_is_rejected() {
    let options = SelectOptions::new().order_by(Direction::asc("name; DROP TABLE projects"));

    let err = select_clause(Some(&options)).unwrap_err();
    assert_eq!(
        err,
        QueryError::InvalidIdentifier("name; DROP TABLE projects".to_string())
    );
}

#[test]
fn test_invalid_operator_is_rejected() {
    let options = SelectOptions::new().filter(Filter::new("tier", "= 1 OR 1 =", "free"));

    let err = count_clause(Some(&options)).unwrap_err();
    assert!(matches!(err, QueryError::UnsupportedOperator { ref column, .. } if column == "tier"));
}

#[test]
fn test_filter_column_quotes_are_escaped() {
    let options = SelectOptions::new().filter(Filter::eq("odd\"name", 1i32));

    assert_eq!(
        count_clause(Some(&options)).unwrap().sql,
        " WHERE \"odd\"\"name\" = $1"
    );
}

#[test]
fn test_select_result_counts_rows() {
    let result = SelectResult::new(42, vec!["a", "b", "c"]);

    assert_eq!(result.total(), 42);
    assert_eq!(result.selected(), 3);
    assert_eq!(result.rows(), &["a", "b", "c"]);

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["total"], 42);
    assert_eq!(json["selected"], 3);
}
