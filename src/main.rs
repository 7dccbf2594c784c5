use std::process::ExitCode;

use rna_etl::console::{banner, pause, report_error, rule};
use rna_etl::etl::{self, EtlReport};
use rna_etl::{RnaError, Settings};

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

    banner(
        &format!("ETL PIPELINE - ASSOCIATIONS {}", settings.etl.area_label),
        60,
    );
    println!("\n[EXTRACT] Chargement de {}...", settings.etl.input.display());
    println!("Patience, ça peut prendre 1-2 minutes...");

    let code = match etl::run(&dir, &settings) {
        Ok(report) => {
            print_report(&report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            if let Some(RnaError::NoMatch(code)) = e.downcast_ref::<RnaError>() {
                println!("\nAucune association trouvée pour le code postal {code} !");
            } else {
                report_error(&e);
            }
            ExitCode::FAILURE
        }
    };

    pause(&settings.console);
    code
}

fn print_report(r: &EtlReport) {
    println!("{} associations chargées", r.loaded_rows);
    println!("{} colonnes", r.loaded_columns);
    if r.skipped_rows > 0 {
        println!("{} lignes mal formées ignorées", r.skipped_rows);
    }

    println!("\n[TRANSFORM] Nettoyage et filtrage...");
    println!("Associations retenues : {}", r.matched);
    println!("Doublons supprimés : {}", r.duplicates_removed);
    if r.null_ids_dropped > 0 {
        println!("Lignes sans identifiant supprimées : {}", r.null_ids_dropped);
    }
    println!("Données nettoyées : {} associations", r.stats.total);

    println!("\n[LOAD] Sauvegarde des données...");
    println!("  {}", r.clean_output.display());
    println!("  {} (échantillon)", r.sample_output.display());

    println!("\n[ANALYSE] Statistiques...");
    println!("  Total associations : {}", r.stats.total);
    if let Some(top) = &r.stats.top_purposes {
        println!("\n  Top {} objets sociaux :", top.len());
        for (label, n) in top {
            println!("    {label}: {n}");
        }
    }
    if let Some(share) = &r.stats.with_website {
        println!("\n  Associations avec site web : {share}");
    }
    println!("  {}", r.stats_output.display());

    if !r.examples.is_empty() {
        println!("\nExemples d'associations :");
        for (i, title) in r.examples.iter().enumerate() {
            println!("  {}. {title}", i + 1);
        }
    }

    println!("\n{}", rule(60));
    println!("ETL TERMINÉ AVEC SUCCÈS !");
    println!("{}", rule(60));
}
