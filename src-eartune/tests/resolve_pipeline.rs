//! End-to-end checks over a synthetic measurement database: index build,
//! rig resolution, search, profile resolution and engine hand-off.

use std::fs;
use std::path::Path;

use eartune::db::{Form, Rig};
use eartune::dsp::{AudioProcessor, Equalizer};
use eartune::resolver::ResolveError;
use eartune::{ProfileStore, Resolver, select_profile};

const WH1000XM4_EQ: &str = "Preamp: -5.9 dB\n\
Filter 1: ON PK Fc 31 Hz Gain 5.90 dB Q 0.62\n\
Filter 2: ON PK Fc 230 Hz Gain -2.20 dB Q 0.61\n\
Filter 3: ON HSC Fc 10000 Hz Gain 3.00 dB Q 0.70\n";

const GENERIC_EQ: &str = "Preamp: -2.0 dB\n\
Filter 1: ON PK Fc 1000 Hz Gain 2.00 dB Q 1.00\n";

fn write_device(root: &Path, source: &str, token: &str, device: &str, text: &str) {
    let dir = root.join("results").join(source).join(token).join(device);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(format!("{} ParametricEQ.txt", device)), text).unwrap();
}

/// Five entries across two sources, exercising every rig-resolution step.
fn sample_database() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    // rig parsed straight from the directory token
    write_device(
        root,
        "oratory1990",
        "Bruel & Kjaer 5128 in-ear",
        "Sony WF-1000XM4",
        GENERIC_EQ,
    );
    // token carries no rig; oratory1990 is a single-rig source
    write_device(root, "oratory1990", "over-ear", "Sony WH-1000XM4", WH1000XM4_EQ);
    let wh_dir = root
        .join("results/oratory1990/over-ear/Sony WH-1000XM4");
    fs::write(
        wh_dir.join("Sony WH-1000XM4 GraphicEQ.txt"),
        "GraphicEQ: 20 5.9; 230 -2.2; 10000 3.0; 20000 3.0\n",
    )
    .unwrap();
    fs::write(
        wh_dir.join("Sony WH-1000XM4 FixedBandEQ.txt"),
        "Preamp: -5.9 dB\n\
         Filter 1: ON PK Fc 31 Hz Gain 5.90 dB Q 1.41\n\
         Filter 2: ON PK Fc 250 Hz Gain -2.00 dB Q 1.41\n",
    )
    .unwrap();
    // token carries no rig; the crinacle side-file knows these
    write_device(root, "crinacle", "in-ear", "Moondrop Blessing 2", GENERIC_EQ);
    write_device(root, "crinacle", "in-ear", "Sony WF-1000XM4", GENERIC_EQ);
    // not in the side-file and crinacle has no fixed rig
    write_device(
        root,
        "crinacle",
        "in-ear",
        "Moondrop Blessing 2 (foam tips)",
        GENERIC_EQ,
    );

    fs::create_dir_all(root.join("measurements/crinacle")).unwrap();
    fs::write(
        root.join("measurements/crinacle/name_index.tsv"),
        "url\tsource_name\tname\tform\trig\n\
         http://c\tMoondrop Blessing 2\tMoondrop Blessing 2\tin-ear\t711\n\
         http://c\tSony WF-1000XM4\tSony WF-1000XM4\tin-ear\t711\n",
    )
    .unwrap();

    dir
}

#[test]
fn test_build_and_search() {
    let db = sample_database();
    let mut resolver = Resolver::new(db.path());
    assert_eq!(resolver.build_index().unwrap(), 5);
    assert!(resolver.index().is_indexed());

    let brands = resolver.index().search_brands("o", 10);
    assert_eq!(brands, vec!["Moondrop".to_string(), "Sony".to_string()]);

    let models = resolver.index().search_models("Sony", Some("WF-1000XM4"), 10);
    assert_eq!(models.len(), 2);

    let groups = resolver.index().group_by_model();
    let wf = groups.iter().find(|g| g.name == "Sony WF-1000XM4").unwrap();
    assert_eq!(wf.variants.len(), 2);
    let blessing = groups
        .iter()
        .find(|g| g.name == "Moondrop Blessing 2")
        .unwrap();
    assert_eq!(blessing.variants.len(), 2);
}

#[test]
fn test_rig_resolution_steps() {
    let db = sample_database();
    let mut resolver = Resolver::new(db.path());
    resolver.build_index().unwrap();
    let index = resolver.index();

    let rig_of = |source: &str, label: &str| {
        index
            .entries()
            .iter()
            .find(|e| e.source == source && e.label == label)
            .map(|e| e.rig.clone())
            .unwrap()
    };

    assert_eq!(
        rig_of("oratory1990", "Sony WF-1000XM4"),
        Rig::Named("Bruel & Kjaer 5128".to_string())
    );
    assert_eq!(
        rig_of("oratory1990", "Sony WH-1000XM4"),
        Rig::Named("GRAS 43AG-7".to_string())
    );
    assert_eq!(
        rig_of("crinacle", "Moondrop Blessing 2"),
        Rig::Named("711".to_string())
    );
    assert_eq!(rig_of("crinacle", "Moondrop Blessing 2 (foam tips)"), Rig::Unknown);
}

#[test]
fn test_resolve_profile_fields() {
    let db = sample_database();
    let mut resolver = Resolver::new(db.path());
    resolver.build_index().unwrap();

    let profile = resolver.resolve_label("Sony WH-1000XM4").unwrap();
    assert_eq!(profile.id, "oratory1990/over-ear/Sony WH-1000XM4");
    assert_eq!(profile.rig, "GRAS 43AG-7");
    assert_eq!(profile.source, "oratory1990");
    assert!((profile.preamp_db + 5.9).abs() < 1e-9);
    assert_eq!(profile.bands.len(), 3);
    assert!(!profile.is_custom);

    let entry = resolver.index().entries_for_label("Sony WH-1000XM4")[0];
    assert_eq!(entry.form, Form::OverEar);
}

#[test]
fn test_resolve_sibling_eq_formats() {
    let db = sample_database();
    let mut resolver = Resolver::new(db.path());
    resolver.build_index().unwrap();

    let entry = resolver.index().entries_for_label("Sony WH-1000XM4")[0];

    let graphic = resolver.resolve_graphic(entry).unwrap();
    assert_eq!(graphic.bands().len(), 4);
    assert!((graphic.interpolate_gain(230.0) + 2.2).abs() < 1e-9);

    let fixed = resolver.resolve_fixed_band(entry).unwrap();
    assert!((fixed.preamp_db + 5.9).abs() < 1e-9);
    assert_eq!(fixed.bands().len(), 2);

    // the in-ear devices ship only the parametric description
    let entry = resolver.index().entries_for_label("Moondrop Blessing 2")[0];
    assert!(resolver.resolve_graphic(entry).is_err());
}

#[test]
fn test_resolve_label_never_guesses() {
    let db = sample_database();
    let mut resolver = Resolver::new(db.path());
    resolver.build_index().unwrap();

    // measured by both sources, so the label alone is ambiguous
    let err = resolver.resolve_label("Sony WF-1000XM4").unwrap_err();
    assert!(matches!(err, ResolveError::AmbiguousLabel { count: 2, .. }));

    // but each entry resolves fine explicitly
    for entry in resolver.index().entries_for_label("Sony WF-1000XM4") {
        assert!(resolver.resolve_entry(entry).is_ok());
    }

    let err = resolver.resolve_label("does not exist").unwrap_err();
    assert!(matches!(err, ResolveError::NoMatch(_)));
}

#[test]
fn test_selection_boundary_drives_engine() {
    let db = sample_database();
    let mut resolver = Resolver::new(db.path());
    resolver.build_index().unwrap();

    let profile = resolver.resolve_label("Sony WH-1000XM4").unwrap();
    let id = profile.id.clone();

    let mut store = ProfileStore::new();
    store.save(profile);

    let mut engine = Equalizer::new(48000.0);
    let control = engine.controller();

    // activate: the engine rebuilds its chain at the next buffer boundary
    select_profile(&mut store, &control, Some(&id)).unwrap();
    assert_eq!(store.active().unwrap().id, id);

    let mut buffer = vec![0.25f32; 2048];
    let original = buffer.clone();
    engine.process(&mut buffer);
    assert!(engine.is_active());
    assert_eq!(engine.band_count(), 3);
    assert_ne!(buffer, original);
    assert!(buffer.iter().all(|s| s.is_finite()));

    // null selection: engine reaches the Disabled state, audio passes through
    select_profile(&mut store, &control, None).unwrap();
    let mut buffer = vec![0.25f32; 2048];
    engine.process(&mut buffer);
    assert!(!engine.is_active());
    assert_eq!(buffer, vec![0.25f32; 2048]);
    assert!(store.active().is_none());

    // unknown ids are reported, not guessed
    assert!(select_profile(&mut store, &control, Some("nope")).is_err());
}
