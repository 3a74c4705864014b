#![cfg(feature = "builder")]

use smap::{Error, MapBuilder, MapIndex, Mapping, MappingOrder};

#[test]
fn test_map_builder() {
    let mut builder = MapBuilder::new().with_file("min.js");
    builder
        .add_mapping(Mapping::new(1, 0).with_source("a.js", 1, 0))
        .unwrap();
    builder
        .add_mapping(Mapping::new(1, 5).with_source("a.js", 1, 2).with_name("x"))
        .unwrap();
    insta::assert_snapshot!(builder.to_string().unwrap(), @r###"{"version":3,"file":"min.js","sources":["a.js"],"names":["x"],"mappings":"AAAA,KAAEA"}"###);

    builder.set_source_content("a.js", Some("let x;".to_string()));
    insta::assert_snapshot!(builder.to_string().unwrap(), @r###"{"version":3,"file":"min.js","sources":["a.js"],"sourcesContent":["let x;"],"names":["x"],"mappings":"AAAA,KAAEA"}"###);

    let err = builder.add_mapping(Mapping::new(1, 0).with_name("x"));
    assert!(matches!(err, Err(Error::InvalidMapping(_))));
}

#[test]
fn test_round_trip() {
    let mappings = [
        Mapping::new(3, 2).with_source("b.js", 10, 4).with_name("bar"),
        Mapping::new(1, 0).with_source("a.js", 1, 0),
        Mapping::new(1, 9).with_source("a.js", 2, 3).with_name("foo"),
        Mapping::new(2, 0),
        Mapping::new(2, 7).with_source("b.js", 1, 0),
    ];

    let mut builder = MapBuilder::new().with_file("out.js");
    for mapping in mappings.iter().cloned() {
        builder.add_mapping(mapping).unwrap();
    }
    let json = builder.to_string().unwrap();
    let index = MapIndex::from_str(&json).unwrap();

    for mapping in &mappings {
        let (Some(source), Some(original)) = (&mapping.source, mapping.original) else {
            continue;
        };

        let found = index
            .original_position_for(mapping.generated.line, mapping.generated.column)
            .unwrap()
            .unwrap();
        assert_eq!(found.source, *source);
        assert_eq!((found.line, found.column), (original.line, original.column));
        assert_eq!(found.name, mapping.name);

        let found = index
            .generated_position_for(source, original.line, original.column)
            .unwrap()
            .unwrap();
        assert_eq!(
            (found.line, found.column),
            (mapping.generated.line, mapping.generated.column)
        );
    }

    // (2, 0) maps to nothing, and so does the rest of that line before (2, 7)
    assert_eq!(index.original_position_for(2, 3).unwrap(), None);

    let replayed = index
        .each_mapping(MappingOrder::Generated)
        .unwrap()
        .map(|m| m.to_string())
        .collect::<Vec<_>>();
    assert_eq!(
        replayed,
        [
            "1:0 -> a.js:1:0",
            "1:9 -> a.js:2:3 (foo)",
            "2:0",
            "2:7 -> b.js:1:0",
            "3:2 -> b.js:10:4 (bar)"
        ]
    );
}

#[test]
fn test_from_index() {
    let index = MapIndex::from_str(
        r#"{"version":3,"sourceRoot":"http://x/","sources":["a.js"],"sourcesContent":["A"],"names":["n"],"mappings":"AAAA,IAAIA"}"#,
    )
    .unwrap();
    let mut builder = MapBuilder::from_index(&index).unwrap();
    insta::assert_snapshot!(builder.to_string().unwrap(), @r###"{"version":3,"sourceRoot":"http://x/","sources":["a.js"],"sourcesContent":["A"],"names":["n"],"mappings":"AAAA,IAAIA"}"###);
}

#[test]
fn test_from_builder() {
    let mut builder = MapBuilder::new().with_source_root("src");
    builder
        .add_mapping(Mapping::new(2, 4).with_source("a.js", 1, 0))
        .unwrap();
    builder
        .add_mapping(Mapping::new(1, 0).with_source("b.js", 3, 1).with_name("b"))
        .unwrap();
    builder.set_source_content("src/b.js", Some("b".to_string()));

    let index = MapIndex::from_builder(&mut builder);
    assert_eq!(
        index.sources().iter().map(|s| &**s).collect::<Vec<_>>(),
        ["src/a.js", "src/b.js"]
    );

    let found = index.original_position_for(1, 3).unwrap().unwrap();
    assert_eq!(found.to_string(), "src/b.js:3:1 (b)");
    let found = index.generated_position_for("src/a.js", 1, 0).unwrap().unwrap();
    assert_eq!((found.line, found.column), (2, 4));

    assert_eq!(index.source_content_for("b.js", false).unwrap(), Some("b"));
    assert_eq!(index.source_content_for("src/a.js", false).unwrap(), None);
}

#[test]
fn test_apply_map_without_matches() {
    let mut builder = MapBuilder::new();
    builder
        .add_mapping(Mapping::new(1, 0).with_source("a.js", 1, 0))
        .unwrap();
    builder
        .add_mapping(Mapping::new(1, 4).with_source("b.js", 2, 0))
        .unwrap();
    let before = builder.to_string().unwrap();

    let other = MapIndex::from_str(
        r#"{"version":3,"file":"c.js","sources":["d.js"],"mappings":"AAAA"}"#,
    )
    .unwrap();
    builder.apply_map(&other, None, None).unwrap();

    assert_eq!(builder.to_string().unwrap(), before);
}
