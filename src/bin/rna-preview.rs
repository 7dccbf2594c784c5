use std::process::ExitCode;

use rna_etl::console::{banner, pause, report_error};
use rna_etl::discovery::{self, PostalMatch, PreviewOutcome, PreviewReport};
use rna_etl::Settings;

fn main() -> ExitCode {
    env_logger::init();

    let dir = match std::env::current_dir() {
        Ok(d) => d,
        Err(e) => {
            eprintln!("ERREUR : dossier courant illisible : {e}");
            return ExitCode::FAILURE;
        }
    };
    let settings = match Settings::load(&dir) {
        Ok(s) => s,
        Err(e) => {
            report_error(&e);
            return ExitCode::FAILURE;
        }
    };

    banner("ANALYSE RNA - ASSOCIATIONS FRANCAISES", 50);

    let code = match discovery::run(&dir, &settings) {
        Ok(report) => {
            print_report(&report, &settings);
            ExitCode::SUCCESS
        }
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    };

    pause(&settings.console);
    code
}

fn print_report(r: &PreviewReport, settings: &Settings) {
    println!("\n[1/5] Vérification des fichiers...");
    println!("Fichiers trouvés : {}", r.total_entries);
    for f in &r.data_files {
        println!("  - {} ({:.1} MB)", f.name, f.size_mb);
    }

    println!("\n[2/5] Fichiers CSV trouvés : {}", r.csv_count);

    let loaded = match &r.outcome {
        PreviewOutcome::NoCsv => {
            println!("\n*** ATTENTION ***");
            println!("Aucun fichier CSV trouvé !");
            println!("1. Télécharge le ZIP depuis data.gouv.fr");
            println!("2. Extrais-le dans ce dossier");
            println!("3. Relance ce programme");
            return;
        }
        PreviewOutcome::Loaded(l) => l,
    };

    println!("\n[3/5] Lecture de {}...", loaded.file.display());
    println!("OK ! {} lignes chargées", loaded.rows);
    if loaded.skipped_rows > 0 {
        println!("{} lignes mal formées ignorées", loaded.skipped_rows);
    }
    println!("Colonnes : {}", loaded.columns.len());

    println!("\n[4/5] Colonnes disponibles :");
    for (i, col) in loaded.columns.iter().enumerate() {
        println!("  {:2}. {col}", i + 1);
    }

    println!("\n[5/5] Recherche {}...", settings.preview.postal_prefix);
    match &loaded.postal {
        PostalMatch::ColumnMissing => println!("Colonne code postal non trouvée"),
        PostalMatch::Matched {
            column,
            count,
            written,
        } => {
            println!("Colonne code postal : {column}");
            println!("Associations {} : {count}", settings.preview.postal_prefix);
            if let Some(path) = written {
                println!("Sauvegarde dans : {}", path.display());
            }
        }
    }

    println!();
    banner("TERMINÉ !", 50);
}
