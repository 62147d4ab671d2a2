use energy_dashboard::charts::{
    build, distribution, flow_graph, hierarchy, proportion, radial_series, stacked_totals,
    time_series, ChartData, ChartRequest, FlowNode, HierarchyFilter, RegionFilter, YearValue,
};
use energy_dashboard::error::{EmptyReason, ErrorKind};
use energy_dashboard::loader::{load_dataset, DatasetCache, LoadOptions};
use energy_dashboard::source::EnergySource;
use energy_dashboard::types::Dataset;
use std::path::PathBuf;
use std::sync::Arc;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/departement_sample.csv")
}

fn dataset() -> Dataset {
    load_dataset(fixture(), &LoadOptions::default()).unwrap().0
}

#[test]
fn fixture_loads_with_diagnostics() {
    let (ds, report) = load_dataset(fixture(), &LoadOptions::default()).unwrap();
    assert_eq!(report.total_rows, 11);
    assert_eq!(report.loaded_rows, 10);
    assert_eq!(report.skipped_rows, 1);
    assert_eq!(report.imputed_zeros, 1);
    assert_eq!(ds.regions(), vec!["Bretagne", "Corse", "Occitanie"]);
    assert_eq!(ds.years(), vec![2020, 2021, 2022]);
}

#[test]
fn time_series_for_a_region() {
    let ts = time_series(&dataset(), EnergySource::Photovoltaic);
    assert_eq!(
        ts.region("Bretagne").unwrap(),
        &[
            YearValue { year: 2020, value: 218.5 },
            YearValue { year: 2021, value: 240.0 },
            YearValue { year: 2022, value: 140.0 },
        ]
    );
    assert_eq!(ts.region("Corse").unwrap().len(), 1);
}

#[test]
fn stacked_totals_match_record_sums_for_every_source() {
    let ds = dataset();
    let st = stacked_totals(&ds);
    assert_eq!(st.departments.len(), 5);
    for source in EnergySource::ALL {
        let expected: f64 = ds.records().iter().map(|r| r.value(source)).sum();
        assert!((st.column_total(source) - expected).abs() < 1e-9, "{:?}", source);
    }
}

#[test]
fn distribution_keeps_raw_values() {
    let d = distribution(&dataset(), EnergySource::Other);
    // The blank Finistère 2021 cell is not an observation.
    assert_eq!(d.years[&2021], vec![1.0, 6.0, 0.0]);
    assert_eq!(d.years[&2020].len(), 5);
}

#[test]
fn proportion_sums_to_year_total() {
    let ds = dataset();
    let out = proportion(&ds, 2020);
    assert!(out.warning.is_none());
    assert_eq!(out.data.get(EnergySource::Photovoltaic), 1768.5);
    let year_total: f64 = ds
        .records()
        .iter()
        .filter(|r| r.year == 2020)
        .map(|r| r.production.total())
        .sum();
    assert!((out.data.total() - year_total).abs() < 1e-9);

    let empty = proportion(&ds, 2015);
    assert_eq!(empty.warning.unwrap().reason, EmptyReason::NoRecords);
}

#[test]
fn flow_graph_has_only_positive_edges() {
    let g = flow_graph(&dataset());
    assert_eq!(g.nodes.len(), 3 + 5);
    assert!(g.edges.iter().all(|e| e.value > 0.0));
    let corse: Vec<_> = g.edges.iter().filter(|e| e.source == 1).collect();
    assert_eq!(corse.len(), 1);
    assert_eq!(g.nodes[corse[0].target], FlowNode::Source(EnergySource::Photovoltaic));
    assert_eq!(g.edges.len(), 11);
}

#[test]
fn hierarchy_for_one_region() {
    let filter = HierarchyFilter { region: RegionFilter::parse("Occitanie"), year: Some(2021) };
    let out = hierarchy(&dataset(), EnergySource::Wind, &filter);
    assert!(out.warning.is_none());
    let root = &out.data.root;
    assert_eq!(root.children.len(), 1);
    let occitanie = root.child("Occitanie").unwrap();
    let names: Vec<&str> = occitanie.children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Aude", "Gard"]);
    assert_eq!(occitanie.value, 980.0);

    let corse = HierarchyFilter { region: RegionFilter::parse("Corse"), year: None };
    let out = hierarchy(&dataset(), EnergySource::Hydraulic, &corse);
    assert_eq!(out.warning.unwrap().reason, EmptyReason::ZeroTotal);
}

#[test]
fn radial_series_is_closed_over_all_departments() {
    let ds = dataset();
    let r = radial_series(&ds, EnergySource::Wind);
    assert_eq!(r.categories, ds.departments());
    assert_eq!(r.points.len(), ds.departments().len() + 1);
    assert_eq!(r.points.first(), r.points.last());
    // Corse-du-Sud has no wind production but still gets a point.
    assert_eq!(r.points[1].value, 0.0);
}

#[test]
fn requests_round_trip_through_json() {
    let ds = dataset();
    let out = build(&ds, &ChartRequest::FlowGraph);
    let json = serde_json::to_value(&out).unwrap();
    assert_eq!(json["data"]["chart"], "flow_graph");
    assert_eq!(json["data"]["data"]["nodes"][0]["name"], "Bretagne");
    assert!(matches!(out.data, ChartData::FlowGraph(_)));
}

#[test]
fn cache_reuses_then_reloads() {
    let mut cache = DatasetCache::new(LoadOptions::default());
    let first = cache.get_or_load(fixture()).unwrap();
    let second = cache.get_or_load(fixture()).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.report(fixture()).unwrap().loaded_rows, 10);

    assert!(cache.invalidate(fixture()));
    let third = cache.get_or_load(fixture()).unwrap();
    assert!(!Arc::ptr_eq(&first, &third));
    assert_eq!(*first, *third);
}

#[test]
fn cache_notices_file_changes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("departement.csv");
    let original = std::fs::read_to_string(fixture()).unwrap();
    std::fs::write(&path, &original).unwrap();

    let mut cache = DatasetCache::default();
    let before = cache.get_or_load(&path).unwrap();
    assert_eq!(before.len(), 10);

    let extended = format!("{}2023;29;Finistère;53;Bretagne;150;0;0;0;0\n", original);
    std::fs::write(&path, extended).unwrap();
    let after = cache.get_or_load(&path).unwrap();
    assert_eq!(after.len(), 11);
    // The earlier handle is still valid and unchanged.
    assert_eq!(before.len(), 10);
}

#[test]
fn invalidate_forces_reload_of_same_length_rewrite() {
    let header = "annee;nom_region;nom_departement;\
energie_produite_annuelle_photovoltaique_enedis_mwh;\
energie_produite_annuelle_eolien_enedis_mwh;\
energie_produite_annuelle_hydraulique_enedis_mwh;\
energie_produite_annuelle_bio_energie_enedis_mwh;\
energie_produite_annuelle_autres_filieres_enedis_mwh";
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("departement.csv");
    std::fs::write(&path, format!("{}\n2020;A;A1;1;0;0;0;0\n", header)).unwrap();

    let mut cache = DatasetCache::default();
    let before = cache.get_or_load(&path).unwrap();
    assert_eq!(before.records()[0].value(EnergySource::Photovoltaic), 1.0);

    std::fs::write(&path, format!("{}\n2020;A;A1;7;0;0;0;0\n", header)).unwrap();
    assert!(cache.invalidate(&path));
    let after = cache.get_or_load(&path).unwrap();
    assert_eq!(after.records()[0].value(EnergySource::Photovoltaic), 7.0);
}

#[test]
fn schema_errors_do_not_poison_the_cache() {
    let dir = tempfile::tempdir().unwrap();
    let bad = dir.path().join("bad.csv");
    std::fs::write(&bad, "annee;nom_region;nom_departement\n2020;A;A1\n").unwrap();

    let mut cache = DatasetCache::default();
    let good = cache.get_or_load(fixture()).unwrap();
    let err = cache.get_or_load(&bad).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Schema);
    assert_eq!(cache.len(), 1);
    assert!(Arc::ptr_eq(&good, &cache.get_or_load(fixture()).unwrap()));
}
