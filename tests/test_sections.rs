use smap::{Error, MapIndex, MappingOrder};

const INDEX_MAP: &str = r#"{
    "version": 3,
    "file": "bundle.js",
    "sections": [
        {
            "offset": { "line": 0, "column": 0 },
            "map": { "version": 3, "sources": ["a.js"], "sourcesContent": ["A"], "mappings": "AAAA" }
        },
        {
            "offset": { "line": 1, "column": 4 },
            "map": { "version": 3, "sources": ["b.js"], "names": ["n"], "mappings": "AAAAA;EAAC" }
        }
    ]
}"#;

fn sections<S>(sections: &[S]) -> String
where
    S: AsRef<str>,
{
    let sections = sections.iter().map(AsRef::as_ref).collect::<Vec<_>>();
    format!(r#"{{"version":3,"sections":[{}]}}"#, sections.join(","))
}

#[test]
fn test_original_position_for() {
    let index = MapIndex::from_str(INDEX_MAP).unwrap();
    assert!(matches!(index, MapIndex::Sectioned(_)));
    assert_eq!(index.file(), Some("bundle.js"));

    let lookups = [
        ((1, 9), Some("a.js:1:0")),
        ((2, 0), None),
        ((2, 4), Some("b.js:1:0 (n)")),
        ((2, 10), Some("b.js:1:0 (n)")),
        ((3, 5), Some("b.js:1:1")),
    ];
    for ((line, column), expected) in lookups {
        let found = index.original_position_for(line, column).unwrap();
        assert_eq!(
            found.map(|loc| loc.to_string()).as_deref(),
            expected,
            "{line}:{column}"
        );
    }
}

#[test]
fn test_generated_position_for() {
    let mut index = MapIndex::from_str(INDEX_MAP).unwrap();

    let found = index.generated_position_for("b.js", 1, 1).unwrap().unwrap();
    assert_eq!((found.line, found.column), (3, 2));
    let found = index.generated_position_for("b.js", 1, 0).unwrap().unwrap();
    assert_eq!((found.line, found.column), (2, 4));
    let found = index.generated_position_for("a.js", 1, 0).unwrap().unwrap();
    assert_eq!((found.line, found.column), (1, 0));
    assert_eq!(index.generated_position_for("c.js", 1, 0).unwrap(), None);

    index.compute_column_spans().unwrap();
    let all = index
        .all_generated_positions_for("b.js", 1)
        .unwrap()
        .into_iter()
        .map(|loc| (loc.line, loc.column, loc.last_column))
        .collect::<Vec<_>>();
    assert_eq!(all, [(2, 4, Some(u32::MAX)), (3, 2, Some(u32::MAX))]);

    let found = index.generated_position_for("b.js", 1, 0).unwrap().unwrap();
    assert_eq!(found.last_column, Some(u32::MAX));
}

#[test]
fn test_generated_position_for_skips_sections_without_match() {
    let index = MapIndex::from_str(&sections(&[
        r#"{"offset":{"line":0,"column":0},"map":{"version":3,"sources":["a.js"],"mappings":"AAIA"}}"#,
        r#"{"offset":{"line":3,"column":0},"map":{"version":3,"sources":["a.js"],"mappings":"AAAA"}}"#,
    ]))
    .unwrap();

    let found = index.generated_position_for("a.js", 1, 0).unwrap().unwrap();
    assert_eq!((found.line, found.column), (4, 0));
    let found = index.generated_position_for("a.js", 5, 0).unwrap().unwrap();
    assert_eq!((found.line, found.column), (1, 0));
}

#[test]
fn test_each_mapping() {
    let index = MapIndex::from_str(INDEX_MAP).unwrap();
    let rendered = index
        .each_mapping(MappingOrder::Generated)
        .unwrap()
        .map(|m| m.to_string())
        .collect::<Vec<_>>();
    assert_eq!(
        rendered,
        ["1:0 -> a.js:1:0", "2:4 -> b.js:1:0 (n)", "3:2 -> b.js:1:1"]
    );

    assert_eq!(
        index.sources().iter().map(|s| &**s).collect::<Vec<_>>(),
        ["a.js", "b.js"]
    );
    assert_eq!(index.names().len(), 1);
    assert_eq!(index.source_root(), None);
}

#[test]
fn test_source_content_for() {
    let index = MapIndex::from_str(INDEX_MAP).unwrap();
    assert_eq!(index.source_content_for("a.js", false).unwrap(), Some("A"));
    assert_eq!(index.source_content_for("b.js", true).unwrap(), None);
    assert!(matches!(
        index.source_content_for("b.js", false),
        Err(Error::SourceNotFound(_))
    ));
}

#[test]
fn test_offset_zero_is_transparent() {
    let map = r#"{"version":3,"sources":["a.js","b.js"],"names":["x"],"mappings":"AAAA,GAAC,GCCAA;;IDAE"}"#;
    let basic = MapIndex::from_str(map).unwrap();
    let sectioned =
        MapIndex::from_str(&sections(&[&format!(r#"{{"offset":{{"line":0,"column":0}},"map":{map}}}"#)]))
            .unwrap();

    for line in 1..=4 {
        for column in 0..10 {
            assert_eq!(
                basic.original_position_for(line, column).unwrap(),
                sectioned.original_position_for(line, column).unwrap(),
                "{line}:{column}"
            );
        }
    }
    for (source, line, column) in [("a.js", 1, 0), ("a.js", 2, 5), ("b.js", 2, 1), ("b.js", 1, 0)] {
        assert_eq!(
            basic.generated_position_for(source, line, column).unwrap(),
            sectioned.generated_position_for(source, line, column).unwrap(),
            "{source}:{line}:{column}"
        );
    }
}

#[test]
fn test_nested_sections() {
    let inner = sections(&[
        r#"{"offset":{"line":0,"column":2},"map":{"version":3,"sources":["a.js"],"mappings":"AAAA"}}"#,
    ]);
    let outer = sections(&[&format!(r#"{{"offset":{{"line":1,"column":0}},"map":{inner}}}"#)]);
    let index = MapIndex::from_str(&outer).unwrap();

    let found = index.original_position_for(2, 2).unwrap().unwrap();
    assert_eq!(found.to_string(), "a.js:1:0");
    assert_eq!(index.original_position_for(2, 1).unwrap(), None);

    let found = index.generated_position_for("a.js", 1, 0).unwrap().unwrap();
    assert_eq!((found.line, found.column), (2, 2));
}

#[test]
fn test_invalid_sections() {
    let map = r#"{"version":3,"sources":[],"mappings":""}"#;

    let err = MapIndex::from_str(&sections(&[
        r#"{"offset":{"line":0,"column":0},"url":"a.js.map"}"#,
    ]))
    .unwrap_err();
    assert!(matches!(err, Error::UnsupportedSectionUrl(0)));

    let err = MapIndex::from_str(&sections(&[
        &format!(r#"{{"offset":{{"line":1,"column":0}},"map":{map}}}"#),
        &format!(r#"{{"offset":{{"line":0,"column":5}},"map":{map}}}"#),
    ]))
    .unwrap_err();
    assert!(matches!(err, Error::UnorderedSections(1)));

    let err = MapIndex::from_str(&sections(&[
        &format!(r#"{{"offset":{{"line":1,"column":5}},"map":{map}}}"#),
        &format!(r#"{{"offset":{{"line":1,"column":2}},"map":{map}}}"#),
    ]))
    .unwrap_err();
    assert!(matches!(err, Error::UnorderedSections(1)));
    assert_eq!(
        err.to_string(),
        "section #1 is out of order: its offset precedes the previous section"
    );

    let err = MapIndex::from_str(&sections(&[&format!(r#"{{"map":{map}}}"#)])).unwrap_err();
    assert!(matches!(err, Error::MissingRequiredField("offset")));

    let err = MapIndex::from_str(&sections(&[&format!(r#"{{"offset":{{"line":0}},"map":{map}}}"#)]))
        .unwrap_err();
    assert!(matches!(err, Error::MissingRequiredField("column")));

    let err = MapIndex::from_str(&sections(&[r#"{"offset":{"line":0,"column":0}}"#])).unwrap_err();
    assert!(matches!(err, Error::MissingRequiredField("map")));

    let err = MapIndex::from_str(r#"{"version":4,"sections":[]}"#).unwrap_err();
    assert!(matches!(err, Error::UnsupportedVersion(4)));
}
