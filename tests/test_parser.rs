use validate_sql::facts::{InsertTarget, TableFact, TableOp};
use validate_sql::parser::rows::{insert_table_name, paren_groups, parse_insert_rows};
use validate_sql::parser::{
    FactExtractor, extract_statements, is_database_statement, parse_charset, parse_create_table,
    parse_drop_table,
};

#[test]
fn test_drop_table() {
    let cases = [
        ("DROP TABLE IF EXISTS `wp_posts`", "wp_posts"),
        ("DROP TABLE wp_users;", "wp_users"),
        ("DROP TABLE IF EXISTS \"Custom_Table\"", "Custom_Table"),
        ("DROP TABLE 'wp_links' ", "wp_links"),
    ];
    for (sql, name) in cases {
        println!("Testing DROP TABLE for SQL: {}", sql);
        assert_eq!(
            parse_drop_table(sql),
            Some(TableFact::new(TableOp::Drop, name))
        );
    }
    assert_eq!(parse_drop_table("DROP TABLE IF EXISTS ``"), None);
    assert_eq!(parse_drop_table("drop table wp_posts"), None);
    assert_eq!(parse_drop_table("SELECT 1"), None);
}

#[test]
fn test_create_table() {
    let cases = [
        ("CREATE TABLE `wp_posts` (\n  `ID` bigint(20)\n)", "wp_posts"),
        ("CREATE TABLE wp_foo (id int)", "wp_foo"),
        ("CREATE TABLE IF NOT EXISTS `shop_orders` (id int)", "shop_orders"),
        ("SET x = 1;\nCREATE TABLE `WP_Mixed` (id int)", "WP_Mixed"),
    ];
    for (sql, name) in cases {
        println!("Testing CREATE TABLE for SQL: {}", sql);
        assert_eq!(
            parse_create_table(sql),
            Some(TableFact::new(TableOp::Create, name))
        );
    }
    // The name must be followed by an opening parenthesis on the same line.
    assert_eq!(parse_create_table("CREATE TABLE wp_foo\n(id int)"), None);
    assert_eq!(parse_create_table("CREATE TABLE wp_foo LIKE wp_bar"), None);
}

#[test]
fn test_charset() {
    let cases = [
        (") ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci", Some("utf8mb4")),
        (") ENGINE=MyISAM DEFAULT CHARSET latin1", Some("latin1")),
        (") DEFAULT CHARSET = utf8", Some("utf8")),
        (") ENGINE=InnoDB", None),
        (") DEFAULT CHARSET=", None),
    ];
    for (sql, charset) in cases {
        assert_eq!(parse_charset(sql), charset, "Charset of {}", sql);
    }
}

#[test]
fn test_database_statements() {
    assert!(is_database_statement("CREATE DATABASE wordpress"));
    assert!(is_database_statement("drop database `wordpress`"));
    assert!(is_database_statement("  Create Database IF NOT EXISTS wp"));
    assert!(!is_database_statement("USE wordpress"));
    assert!(!is_database_statement("SELECT 'CREATE DATABASE x'"));
}

#[test]
fn test_extractor_accumulates_facts() {
    let statements = [
        "DROP TABLE IF EXISTS `wp_posts`",
        "CREATE TABLE `wp_posts` (\n  `ID` bigint(20)\n) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4",
        "CREATE TABLE `custom` (\n  `id` int\n) ENGINE=InnoDB DEFAULT CHARSET=latin1",
        "CREATE DATABASE wordpress",
        "INSERT INTO `wp_options` (`option_id`, `option_name`, `option_value`) VALUES (1,'siteurl','http://x'),(2,'home','http://x')",
        "INSERT INTO `wp_blogs` (`blog_id`, `site_id`, `domain`, `path`) VALUES (1,1,'example.com','/')",
        "INSERT INTO `wp_posts` (`ID`) VALUES (1)",
    ];
    let facts = extract_statements(statements);

    assert_eq!(facts.drop_tables, vec![TableFact::new(TableOp::Drop, "wp_posts")]);
    assert_eq!(
        facts.create_tables,
        vec![
            TableFact::new(TableOp::Create, "wp_posts"),
            TableFact::new(TableOp::Create, "custom"),
        ]
    );
    assert_eq!(facts.charsets, vec!["utf8mb4", "latin1"]);
    assert_eq!(facts.database_statements, vec!["CREATE DATABASE wordpress"]);
    assert_eq!(facts.records(InsertTarget::Options).len(), 2);
    assert_eq!(facts.records(InsertTarget::Blogs).len(), 1);
    assert_eq!(facts.table_names(TableOp::Create, true), vec!["wp_posts"]);
    assert_eq!(facts.table_names(TableOp::Create, false), vec!["custom"]);
}

#[test]
fn test_extractor_keeps_insert_order_across_statements() {
    let mut extractor = FactExtractor::new();
    extractor.extract(
        "INSERT INTO wp_options (option_name, option_value) VALUES ('a','1'),('b','2')",
    );
    extractor.extract("INSERT INTO wp_options (option_name, option_value) VALUES ('c','3')");
    let names: Vec<_> = extractor
        .facts()
        .options_records
        .iter()
        .map(|record| record.value("option_name"))
        .collect();
    assert_eq!(names, vec![Some("a"), Some("b"), Some("c")]);
}

#[test]
fn test_charset_only_read_from_create_table() {
    let facts = extract_statements(["SET NAMES utf8mb4", "ALTER TABLE x DEFAULT CHARSET=latin1"]);
    assert!(facts.charsets.is_empty());
}

#[test]
fn test_insert_table_name() {
    assert_eq!(insert_table_name("INSERT INTO `wp_options` VALUES (1)"), Some("wp_options"));
    assert_eq!(insert_table_name("insert into wp_blogs(blog_id) values (1)"), Some("wp_blogs"));
    assert_eq!(insert_table_name("INSERT INTO `db`.`wp_blogs` VALUES (1)"), Some("wp_blogs"));
    assert_eq!(insert_table_name("INSERT INTOwp_blogs VALUES (1)"), None);
    assert_eq!(insert_table_name("SELECT 1"), None);
}

#[test]
fn test_paren_groups_are_balanced() {
    let sql = "INSERT INTO t (a, b) VALUES (1,'f(x)'),(2,'((y))')";
    assert_eq!(paren_groups(sql), vec!["(a, b)", "(1,'f(x)')", "(2,'((y))')"]);

    // A group still open at the end is dropped, stray closers are ignored.
    assert_eq!(paren_groups(") (a) (b"), vec!["(a)"]);
}

#[test]
fn test_insert_rows() {
    let sql = "INSERT INTO wp_options (option_name, option_value) VALUES ('siteurl','http://x')";
    let records = parse_insert_rows(sql, "wp_options");
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.table, "wp_options");
    assert_eq!(
        record.fields.iter().collect::<Vec<_>>(),
        vec![
            (&"option_name".to_owned(), &Some("siteurl".to_owned())),
            (&"option_value".to_owned(), &Some("http://x".to_owned())),
        ]
    );
}

#[test]
fn test_insert_rows_short_and_long_tuples() {
    let sql = "INSERT INTO `wp_blogs` (`blog_id`, `site_id`, `domain`, `path`) VALUES (1,1,'a.com'),(2,1,'b.com','/b/','extra')";
    let records = parse_insert_rows(sql, "wp_blogs");
    assert_eq!(records.len(), 2);

    assert_eq!(records[0].fields.len(), 4);
    assert_eq!(records[0].value("domain"), Some("a.com"));
    assert_eq!(records[0].fields["path"], None);

    assert_eq!(records[1].fields.len(), 4);
    assert_eq!(records[1].value("path"), Some("/b/"));
    assert!(!records[1].fields.values().any(|v| v.as_deref() == Some("extra")));
}

#[test]
fn test_insert_rows_nested_parentheses() {
    let sql = "INSERT INTO wp_options (option_name, option_value) VALUES ('blogdescription','Just (another) site'),('home','http://x')";
    let records = parse_insert_rows(sql, "wp_options");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].value("option_value"), Some("Just (another) site"));
    assert_eq!(records[1].value("option_name"), Some("home"));
}

#[test]
fn test_insert_rows_quoted_comma_is_split() {
    // Known limitation: commas inside quotes still separate values.
    let sql = "INSERT INTO wp_options (option_name, option_value) VALUES ('blogname','Hello, World')";
    let records = parse_insert_rows(sql, "wp_options");
    assert_eq!(records[0].value("option_value"), Some("Hello"));
}

#[test]
fn test_insert_rows_without_column_list_known_ambiguous() {
    // Known-ambiguous input shape: with no explicit column list the first
    // row is read as the header and disappears from the result.
    let sql = "INSERT INTO `wp_options` VALUES (1,'siteurl','http://x','yes'),(2,'home','http://y','yes')";
    let records = parse_insert_rows(sql, "wp_options");
    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0].fields.keys().collect::<Vec<_>>(),
        vec!["1", "siteurl", "http://x", "yes"]
    );
    assert_eq!(records[0].value("siteurl"), Some("home"));
}

#[test]
fn test_insert_rows_repeated_header_column() {
    let sql = "INSERT INTO wp_options (a, a, b) VALUES (1,2,3)";
    let records = parse_insert_rows(sql, "wp_options");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].fields.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    assert_eq!(records[0].value("a"), Some("2"));
    assert_eq!(records[0].value("b"), Some("3"));
}

#[test]
fn test_insert_rows_other_table() {
    let sql = "INSERT INTO wp_options_backup (option_name) VALUES ('siteurl')";
    assert!(parse_insert_rows(sql, "wp_options").is_empty());
    assert!(parse_insert_rows("INSERT INTO wp_options", "wp_options").is_empty());
}
