use jcmp_core::{DiffOptions, JsonPath, Node};

#[test]
fn jcmp_core_readme_example() -> Result<(), Box<dyn std::error::Error>> {
    let old = Node::from_yaml_str("orders:\n  - id: 7\n    total: 10\n  - id: 8\n    total: 4\n")?;
    let new = Node::from_json_str(r#"{"orders":[{"id":8,"total":4},{"id":7,"total":12}]}"#)?;

    let totals: JsonPath = "$.orders[*].total".parse()?;
    let found: Vec<_> = old.select(&totals)?.iter().map(ToString::to_string).collect();
    assert_eq!(found, ["$.orders[0].total\n10", "$.orders[1].total\n4"]);

    let options = DiffOptions::default()
        .with_mapping("$.orders=id".parse()?)
        .with_ignore("$..total{<}".parse()?);
    let report = old.diff(&new, &options)?;
    assert!(report.is_empty());

    let strict = DiffOptions::default().with_mapping("$.orders=id".parse()?);
    let report = old.diff(&new, &strict)?;
    println!("{}", report.render());
    assert_eq!(report.render(), "-$.orders[0].total = 10\n+$.orders[0].total = 12\n\n");
    Ok(())
}
