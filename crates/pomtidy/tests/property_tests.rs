//! Property-based tests for the rewrite pipeline
//!
//! These tests use proptest to verify:
//! 1. Fixed point: a second pipeline run changes nothing
//! 2. Properties survive set -> write -> parse unchanged
//! 3. Sorting does not depend on the input order

use proptest::prelude::*;
use pomtidy::{tidy, Layout, PipelineConfig, PomDocument};

#[derive(Clone, Debug)]
struct Dep {
    group: String,
    artifact: String,
    version: Option<String>,
    scope: Option<&'static str>,
}

impl Dep {
    fn to_xml(&self) -> String {
        let version = self
            .version
            .as_ref()
            .map(|v| format!("<version>{v}</version>"))
            .unwrap_or_default();
        let scope = self
            .scope
            .map(|s| format!("<scope>{s}</scope>"))
            .unwrap_or_default();
        // children deliberately out of canonical order
        format!(
            "<dependency>{scope}{version}<artifactId>{}</artifactId><groupId>{}</groupId></dependency>",
            self.artifact, self.group
        )
    }
}

fn arb_dep() -> impl Strategy<Value = Dep> {
    (
        prop::sample::select(vec!["org.acme", "com.example", "io.test"]),
        "[a-z]{1,5}",
        prop::option::of("[0-9]\\.[0-9]{1,2}"),
        prop::option::of(prop::sample::select(vec![
            "compile", "test", "runtime", "provided",
        ])),
    )
        .prop_map(|(group, artifact, version, scope)| Dep {
            group: group.to_string(),
            artifact,
            version,
            scope,
        })
}

fn arb_plugin() -> impl Strategy<Value = String> {
    ("[a-z]{1,5}-maven-plugin", "[0-9]\\.[0-9]")
        .prop_map(|(artifact, version)| {
            format!("<plugin><version>{version}</version><artifactId>{artifact}</artifactId></plugin>")
        })
}

fn pom(direct: &[Dep], managed: &[Dep], plugins: &[String]) -> String {
    let join = |deps: &[Dep]| deps.iter().map(Dep::to_xml).collect::<String>();
    format!(
        "<project><modelVersion>4.0.0</modelVersion>\
         <dependencyManagement><dependencies>{}</dependencies></dependencyManagement>\
         <dependencies>{}</dependencies>\
         <build><plugins>{}</plugins></build></project>",
        join(managed),
        join(direct),
        plugins.concat()
    )
}

proptest! {
    /// Running the default pipeline on its own output is a no-op
    #[test]
    fn pipeline_reaches_fixed_point(
        direct in prop::collection::vec(arb_dep(), 0..8),
        managed in prop::collection::vec(arb_dep(), 0..4),
        plugins in prop::collection::vec(arb_plugin(), 0..4),
        by_scope in any::<bool>(),
        organize in any::<bool>(),
    ) {
        let mut config = PipelineConfig {
            organize,
            ..PipelineConfig::default()
        };
        config.sort.by_scope = by_scope;
        let once = tidy(&pom(&direct, &managed, &plugins), &config).unwrap();
        let twice = tidy(&once, &config).unwrap();
        prop_assert_eq!(once, twice);
    }

    /// Sorting yields the same section whatever order dependencies arrive in
    #[test]
    fn sorting_ignores_input_order(
        (deps, shuffled) in prop::collection::vec(arb_dep(), 1..8)
            .prop_flat_map(|deps| (Just(deps.clone()), Just(deps).prop_shuffle())),
        by_scope in any::<bool>(),
    ) {
        let mut config = PipelineConfig::passthrough();
        config.sort.enabled = true;
        config.sort.by_scope = by_scope;
        config.layout = Layout::Compact;

        // identical coordinates keep the first declaration, so make duplicates indistinguishable
        let mut seen = std::collections::BTreeMap::new();
        let canonical = |list: &[Dep], seen: &mut std::collections::BTreeMap<String, Dep>| {
            list.iter()
                .map(|dep| {
                    let key = format!("{}:{}:{:?}", dep.group, dep.artifact, dep.version);
                    seen.entry(key).or_insert_with(|| dep.clone()).clone()
                })
                .collect::<Vec<_>>()
        };
        let deps = canonical(&deps, &mut seen);
        let shuffled = canonical(&shuffled, &mut seen);

        let first = tidy(&pom(&deps, &[], &[]), &config).unwrap();
        let second = tidy(&pom(&shuffled, &[], &[]), &config).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Property values survive serialization, including markup characters
    /// and surrounding spaces
    #[test]
    fn property_roundtrip(
        name in "[a-z][a-z0-9]{0,6}(\\.[a-z0-9]{1,6}){0,3}",
        value in "(( ?[a-zA-Z0-9.<>&\"'-]{1,6}){1,3} ?)?",
        pretty in any::<bool>(),
    ) {
        let mut doc = PomDocument::parse("<project><dependencies/></project>").unwrap();
        doc.set_property(&name, &value);
        prop_assert_eq!(doc.get_property(&name), value.clone());

        let layout = if pretty { Layout::default() } else { Layout::Compact };
        let mut reparsed = PomDocument::parse(&doc.write(layout)).unwrap();
        prop_assert!(reparsed.has_property(&name));
        prop_assert_eq!(reparsed.get_property(&name), value);

        reparsed.delete_property(&name);
        prop_assert!(!reparsed.has_property(&name));
        prop_assert_eq!(reparsed.get_property(&name), "");
    }

    /// Arbitrary input never panics the pipeline
    #[test]
    fn arbitrary_input_does_not_panic(input in "<project>[a-z<>/ ]{0,64}") {
        let _ = tidy(&input, &PipelineConfig::default());
    }
}
