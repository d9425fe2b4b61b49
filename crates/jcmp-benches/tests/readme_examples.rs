use jcmp_benches::available_corpora;
use jcmp_core::JsonPath;

#[test]
fn jcmp_benches_readme_example() -> Result<(), Box<dyn std::error::Error>> {
    let corpora = available_corpora();
    let corpus = corpora.iter().find(|c| c.name() == "orders").expect("registered corpus");
    let dataset = corpus.load()?;
    let report = dataset.diff()?;
    assert!(report.has_differences());

    let rendered = report.render();
    println!("{rendered}");
    assert!(rendered.starts_with("-$.orders[0].customer.tier = 0\n+$.orders[0].customer.tier = 9\n\n"));
    Ok(())
}

#[test]
fn nested_probe_reaches_the_innermost_leaf() -> Result<(), Box<dyn std::error::Error>> {
    let corpora = available_corpora();
    let corpus = corpora.iter().find(|c| c.name() == "nested").expect("registered corpus");
    let dataset = corpus.load()?;
    let path: JsonPath = corpus.probe().parse()?;
    let found = path.extract(dataset.after())?;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].value().to_json_string(), "2");
    Ok(())
}
