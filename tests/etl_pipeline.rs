use std::fs;

use rna_etl::data::loader::{load_csv, LoadOptions};
use rna_etl::{etl, RnaError, Settings};

const HEADER: &str = "id;titre;objet;objet_social1;date_creat;date_publi;adr1;adr2;adr3;adrs_codepostal;libcom;siteweb;position";

fn write_source(dir: &std::path::Path, rows: &[&str]) {
    let mut text = String::from(HEADER);
    text.push('\n');
    for r in rows {
        text.push_str(r);
        text.push('\n');
    }
    fs::write(dir.join("rna_import_20250901_dpt_75.csv"), text).unwrap();
}

fn reload(path: &std::path::Path) -> rna_etl::data::model::Table {
    let opts = LoadOptions {
        delimiter: b',',
        ..LoadOptions::default()
    };
    load_csv(path, &opts).unwrap().table
}

#[test]
fn test_full_run_writes_outputs() {
    let dir = tempfile::tempdir().unwrap();
    write_source(
        dir.path(),
        &[
            "W1; Club de quartier ;Jeux;Sports, activités de plein air;2001-05-01;2001-06-01;3 rue de Lyon;;;75012; PARIS ;https://club.fr;A",
            "W1;Doublon;Jeux;Sports, activités de plein air;2001-05-01;2001-06-01;3 rue de Lyon;;;75012;PARIS;;A",
            "W2;Atelier;Peinture;Culture;1850-01-01;2001-06-01;;;;75012;PARIS;;A",
            "W3;Ailleurs;Autre;Culture;2010-01-01;2010-02-01;1 rue X;;;75011;PARIS;;A",
            "W4;Ligne cassée",
            ";Sans identifiant;;Culture;2012-01-01;;;;;75012;PARIS;;A",
        ],
    );

    let report = etl::run(dir.path(), &Settings::default()).unwrap();

    assert_eq!(report.loaded_rows, 5);
    assert_eq!(report.skipped_rows, 1);
    assert_eq!(report.matched, 4);
    assert_eq!(report.duplicates_removed, 1);
    assert_eq!(report.null_ids_dropped, 1);
    assert_eq!(report.stats.total, 2);
    assert_eq!(report.examples, vec!["Club de quartier", "Atelier"]);
    assert_eq!(
        report.columns,
        vec![
            "id",
            "titre",
            "objet",
            "date_creat",
            "date_publi",
            "adr1",
            "adr2",
            "adr3",
            "adrs_codepostal",
            "libcom",
            "siteweb"
        ]
    );
    assert!(!report.columns.contains(&"position".to_string()));
    assert!(!report.columns.contains(&"objet_social1".to_string()));

    let website = report.stats.with_website.unwrap();
    assert_eq!(website.count, 1);
    assert_eq!(website.percent, 50.0);
    // purposes are counted before projection, first row of each id only
    assert_eq!(
        report.stats.top_purposes.clone().unwrap(),
        vec![
            ("Sports, activités de plein air".to_string(), 1),
            ("Culture".to_string(), 1)
        ]
    );

    let cleaned = reload(&report.clean_output);
    assert_eq!(cleaned.len(), 2);
    assert_eq!(cleaned.value(0, "titre"), Some("Club de quartier"));
    assert_eq!(cleaned.value(0, "libcom"), Some("PARIS"));
    assert_eq!(cleaned.value(0, "siteweb"), Some("https://club.fr"));
    assert_eq!(cleaned.value(1, "adr1"), None);

    let sample = reload(&report.sample_output);
    assert_eq!(sample.len(), 2);

    let stats = fs::read_to_string(&report.stats_output).unwrap();
    assert!(stats.starts_with("STATISTIQUES - ASSOCIATIONS PARIS 12\n"));
    assert!(stats.contains("Total associations : 2"));
    assert!(stats.contains("Associations avec site web : 1 (50.0%)"));
    assert!(stats.contains("Source : RNA - data.gouv.fr"));
}

#[test]
fn test_identifier_unique_in_cleaned_output() {
    let dir = tempfile::tempdir().unwrap();
    let rows: Vec<String> = (0..300)
        .map(|i| format!("W{};Asso {i};;;2000-01-01;;;;;75012;PARIS;;A", i % 120))
        .collect();
    let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
    write_source(dir.path(), &rows);

    let report = etl::run(dir.path(), &Settings::default()).unwrap();
    assert_eq!(report.stats.total, 120);
    assert_eq!(report.duplicates_removed, 180);

    let cleaned = reload(&report.clean_output);
    let mut ids: Vec<_> = cleaned.column_values("id").into_iter().flatten().collect();
    let n = ids.len();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), n);
    // first occurrence kept
    assert_eq!(cleaned.value(0, "titre"), Some("Asso 0"));

    let sample = reload(&report.sample_output);
    assert_eq!(sample.len(), 100);
}

#[test]
fn test_missing_input_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let err = etl::run(dir.path(), &Settings::default()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<RnaError>(),
        Some(RnaError::MissingInput(_))
    ));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_no_match_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    write_source(dir.path(), &["W1;Asso;;;2000-01-01;;;;;75011;PARIS;;A"]);

    let err = etl::run(dir.path(), &Settings::default()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<RnaError>(),
        Some(RnaError::NoMatch(code)) if code == "75012"
    ));
    assert!(!dir.path().join("associations_paris12_clean.csv").exists());
    assert!(!dir.path().join("sample_data.csv").exists());
    assert!(!dir.path().join("stats_paris12.txt").exists());
}

#[test]
fn test_regional_variant_without_optional_columns() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("rna_import_20250901_dpt_75.csv"),
        "id;titre;adrs_codepostal\nW1;Asso;75012\n",
    )
    .unwrap();

    let report = etl::run(dir.path(), &Settings::default()).unwrap();
    assert_eq!(report.columns, vec!["id", "titre", "adrs_codepostal"]);
    assert_eq!(report.stats.with_website, None);
    assert_eq!(report.stats.top_purposes, None);

    let stats = fs::read_to_string(&report.stats_output).unwrap();
    assert!(stats.contains("site web : non disponible"));
}

#[test]
fn test_latin1_source_with_config() {
    let dir = tempfile::tempdir().unwrap();
    let mut bytes = b"id;titre;adrs_codepostal\nW1;Soci".to_vec();
    bytes.push(0xe9);
    bytes.extend_from_slice(b"t\xe9;75012\n");
    fs::write(dir.path().join("rna_import_20250901_dpt_75.csv"), &bytes).unwrap();

    let err = etl::run(dir.path(), &Settings::default()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<RnaError>(),
        Some(RnaError::Decode { .. })
    ));

    fs::write(
        dir.path().join("rna_etl.json"),
        r#"{ "source": { "encoding": "latin-1" } }"#,
    )
    .unwrap();
    let settings = Settings::from_file(&dir.path().join("rna_etl.json")).unwrap();
    let report = etl::run(dir.path(), &settings).unwrap();
    assert_eq!(report.examples, vec!["Société"]);
}
