//! Integration tests
//!
//! Exercises the complete pipeline: method-name parsing, value binding,
//! MySQL translation and named-placeholder rewriting, plus the ordering and
//! rendering invariants the phases guarantee each other.

use pretty_assertions::assert_eq;
use rulesql::{
    rewrite_named, Deriver, Filter, FilterGroup, LogicOperator, MySqlDialect, PageRequest,
    ParseError, Predicate, Query, RdbTranslator, Scalar, Subject, SubjectModifier, Table,
};

fn deriver() -> Deriver {
    Deriver::new(Box::new(MySqlDialect))
}

fn translator() -> RdbTranslator {
    RdbTranslator::new(Box::new(MySqlDialect))
}

fn placeholders(sql: &str) -> usize {
    sql.matches('?').count()
}

#[test]
fn test_find_by_id_without_table() {
    let sql = deriver().derive("FindById").unwrap();
    assert_eq!(sql, "SELECT * FROM `$$_table_$$` WHERE (`id` = ?)");
}

#[test]
fn test_find_and_with_pager() {
    let query = deriver()
        .parse("FindByIdAndName")
        .unwrap()
        .with_table(Table::new("user"))
        .with_pager(PageRequest::new(1, 10, false));

    assert_eq!(
        translator().translate(&query).unwrap(),
        "SELECT * FROM `user` WHERE ((`id` = ?) AND (`name` = ?)) LIMIT ?, ?"
    );
}

#[test]
fn test_find_or() {
    let query = deriver()
        .parse("FindByIdOrName")
        .unwrap()
        .with_table(Table::new("user"));

    assert_eq!(
        translator().translate(&query).unwrap(),
        "SELECT * FROM `user` WHERE ((`id` = ?) OR (`name` = ?))"
    );
}

#[test]
fn test_mixed_groups_with_sorts_and_pager() {
    let query = deriver()
        .parse("FindByIdIsAndNameContainsOrAgeGTEOrderByFirstnameAscLastnameDesc")
        .unwrap()
        .with_table(Table::new("user"))
        .with_pager(PageRequest::new(1, 10, false));

    assert_eq!(
        translator().translate(&query).unwrap(),
        "SELECT * FROM `user` \
         WHERE (((`id` = ?) AND (`name` LIKE CONCAT('%',?,'%'))) OR (`age` >= ?)) \
         ORDER BY `firstname` ASC, `lastname` DESC LIMIT ?, ?"
    );
}

#[test]
fn test_find_distinct_with_sort_and_pager() {
    let query = deriver()
        .parse("FindDistinctByIdAndNameOrderByFirstname")
        .unwrap()
        .with_table(Table::new("user"))
        .with_pager(PageRequest::new(1, 10, false));

    assert_eq!(
        translator().translate(&query).unwrap(),
        "SELECT DISTINCT * FROM `user` WHERE ((`id` = ?) AND (`name` = ?)) \
         ORDER BY `firstname` ASC LIMIT ?, ?"
    );
}

#[test]
fn test_find_top_carries_limit_in_ir() {
    let query = deriver()
        .parse("FindTop10ByIdAndNameOrderByFirstname")
        .unwrap();

    assert_eq!(query.subject(), Subject::Find);
    assert_eq!(query.modifier(), Some(SubjectModifier::Top));
    assert_eq!(query.limit(), Some(10));
    assert_eq!(query.num_values(), 2);
    assert_eq!(query.sorts().len(), 1);

    // Top limits the result set at execution time; translation renders no
    // LIMIT of its own without a pager.
    let sql = translator()
        .translate(&query.with_table(Table::new("user")))
        .unwrap();
    assert!(!sql.contains("LIMIT"), "{sql}");
}

#[test]
fn test_count() {
    let query = deriver()
        .parse("CountByIdAndName")
        .unwrap()
        .with_table(Table::new("user"));

    assert_eq!(
        translator().translate(&query).unwrap(),
        "SELECT COUNT(*) FROM `user` WHERE ((`id` = ?) AND (`name` = ?))"
    );
}

#[test]
fn test_count_with_order_by_fails_to_parse() {
    let err = deriver().parse("CountByIdOrderByFirstname").unwrap_err();
    assert!(matches!(err, ParseError::Unparsed { .. }), "{err:?}");
}

#[test]
fn test_exists_renders_one_row_limit() {
    let query = deriver()
        .parse("ExistsById")
        .unwrap()
        .with_table(Table::new("user"))
        .with_pager(PageRequest::new(4, 25, true));

    let sql = translator().translate(&query).unwrap();
    assert_eq!(sql, "SELECT 1 FROM `user` WHERE (`id` = ?) LIMIT 0, 1");
    assert!(sql.ends_with("LIMIT 0, 1"));
}

#[test]
fn test_delete_with_mixed_groups_sorts_and_pager() {
    let query = deriver()
        .parse("DeleteByIdIsAndNameContainsOrAgeGTEOrderByFirstnameAscLastnameDesc")
        .unwrap()
        .with_table(Table::new("user"))
        .with_pager(PageRequest::new(1, 10, false));

    assert_eq!(
        translator().translate(&query).unwrap(),
        "DELETE FROM `user` \
         WHERE (((`id` = ?) AND (`name` LIKE CONCAT('%',?,'%'))) OR (`age` >= ?)) \
         ORDER BY `firstname` ASC, `lastname` DESC LIMIT ?, ?"
    );
}

#[test]
fn test_fill_values_align_with_placeholders() {
    let mut query = deriver()
        .parse("FindByIdIsAndNameContainsOrAgeGTE")
        .unwrap()
        .with_table(Table::new("user"));

    assert_eq!(query.num_values(), 3);
    query
        .fill_values(vec![
            Scalar::from(7),
            Scalar::from("bob"),
            Scalar::from(21),
        ])
        .unwrap();

    // DFS order of the bound values matches the textual placeholder order.
    let values = query.values();
    assert_eq!(*values[0], Scalar::Int(7));
    assert_eq!(*values[1], Scalar::Str("bob".to_string()));
    assert_eq!(*values[2], Scalar::Int(21));

    let sql = translator().translate(&query).unwrap();
    assert_eq!(placeholders(&sql), 3);
}

fn tree_of_depth(depth: usize, predicates: &mut dyn Iterator<Item = Predicate>) -> FilterGroup {
    if depth == 1 {
        let filters = (0..3)
            .map(|i| {
                let predicate = predicates.next().expect("cycled iterator");
                Filter::new(format!("Field{i}"), predicate)
            })
            .collect();
        FilterGroup::leaf(filters, LogicOperator::And)
    } else {
        let children = (0..2)
            .map(|_| tree_of_depth(depth - 1, &mut *predicates))
            .collect();
        let op = if depth % 2 == 0 {
            LogicOperator::Or
        } else {
            LogicOperator::And
        };
        FilterGroup::group(children, op)
    }
}

#[test]
fn test_placeholder_count_matches_bound_values() {
    for depth in 1..=4 {
        for offset in 0..Predicate::ALL.len() {
            let mut predicates = Predicate::ALL.iter().copied().cycle().skip(offset);
            let mut tree = tree_of_depth(depth, &mut predicates);

            let expected = tree.num_values();
            let values: Vec<Scalar> = (0..expected).map(|i| Scalar::from(i as i64)).collect();
            tree.fill_values(values).unwrap();

            let base = Query::new(Subject::Find)
                .with_table(Table::new("t"))
                .with_filter_group(tree);
            let sql = translator().translate(&base).unwrap();
            assert_eq!(placeholders(&sql), expected, "depth {depth} offset {offset}");

            let paged = base.with_pager(PageRequest::new(2, 20, false));
            let sql = translator().translate(&paged).unwrap();
            assert_eq!(
                placeholders(&sql),
                expected + 2,
                "depth {depth} offset {offset} paged"
            );
        }
    }
}

#[test]
fn test_translation_is_deterministic() {
    let query = deriver()
        .parse("FindByIdOrNameOrderByFirstnameDesc")
        .unwrap()
        .with_table(Table::new("user"));
    let translator = translator();
    assert_eq!(
        translator.translate(&query).unwrap(),
        translator.translate(&query).unwrap()
    );
}

#[test]
fn test_named_args_pipeline() {
    let mut query = deriver()
        .parse("FindByIdAndName")
        .unwrap()
        .with_table(Table::new("user"));
    query.fill_named_args(&["id", "name"]).unwrap();

    let sql = translator().translate(&query).unwrap();
    assert_eq!(
        sql,
        "SELECT * FROM `user` WHERE ((`id` = :id) AND (`name` = :name))"
    );

    let (positional, names) = rewrite_named(&sql, "mysql").unwrap();
    assert_eq!(
        positional,
        "SELECT * FROM `user` WHERE ((`id` = ?) AND (`name` = ?))"
    );
    assert_eq!(names, vec!["id".to_string(), "name".to_string()]);

    let (dollars, names) = rewrite_named(&sql, "cockroach").unwrap();
    assert_eq!(
        dollars,
        "SELECT * FROM `user` WHERE ((`id` = $1) AND (`name` = $2))"
    );
    assert_eq!(names, vec!["id".to_string(), "name".to_string()]);
}

#[test]
fn test_arity_mismatch_surfaces() {
    let mut query = deriver().parse("FindByAgeBetween").unwrap();
    assert_eq!(query.num_values(), 2);
    assert!(query.fill_values(vec![Scalar::from(1)]).is_err());
}

#[test]
fn test_subject_synonyms_share_semantics() {
    let deriver = deriver();
    let find = deriver.derive("FindByIdAndName").unwrap();
    for synonym in ["QueryByIdAndName", "GetByIdAndName", "SearchByIdAndName"] {
        assert_eq!(deriver.derive(synonym).unwrap(), find, "{synonym}");
    }
}
